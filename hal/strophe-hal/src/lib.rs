//! Strophe Hardware Abstraction Layer
//!
//! This crate defines the register-level seams the Strophe drivers are
//! written against. Each peripheral gets one trait describing its hardware
//! side effects; chip crates (STM32F446 today) implement the traits with
//! real register access, and the driver tests implement them with mocks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (strophe-firmware)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  strophe-drivers (engines, generic)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  strophe-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  strophe-hal-stm32f446 (registers)      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::GpioPins`] - pin configuration and digital I/O
//! - [`exti::ExtiLines`] - external interrupt line routing
//! - [`serial::SerialPort`] - USART register operations
//! - [`tick::TickTimer`] - periodic tick interrupt source
//! - [`adc::AdcConversion`] - single-channel A/D conversion
//! - [`pwm::PwmTimer`] - PWM timer configuration
//!
//! All trait methods take `&self`: hardware registers are interior-mutable
//! by nature, and `&self` seams let drivers live in plain statics shared
//! with interrupt handlers.

#![no_std]
#![deny(unsafe_code)]

pub mod adc;
pub mod exti;
pub mod gpio;
pub mod pwm;
pub mod serial;
pub mod tick;

// Re-export key traits at crate root for convenience
pub use adc::AdcConversion;
pub use exti::ExtiLines;
pub use gpio::GpioPins;
pub use pwm::PwmTimer;
pub use serial::SerialPort;
pub use tick::TickTimer;
