//! Interrupt-driven peripheral engines for the Strophe firmware
//!
//! Each driver here is generic over its register seam from `strophe-hal`
//! and owns the state that crosses between interrupt context and the
//! main loop:
//!
//! - [`serial::SerialTransport`] - ring-buffered USART byte transport
//! - [`exti::ExtiRouter`] - external interrupt line-to-callback dispatch
//! - [`tick::TickClock`] - millisecond/microsecond time base
//! - [`adc::AdcReader`] - single-channel conversion with a ready flag
//! - [`pwm::PwmGenerator`] - three-channel PWM timebase and duty control
//!
//! All drivers are const-constructible and expose `&self` APIs backed by
//! atomics, so firmware can keep them in plain statics and call the
//! `on_*` entry points straight from interrupt handlers. The test suite
//! runs on the host against mock register implementations.

#![cfg_attr(not(test), no_std)]

pub mod adc;
pub mod exti;
pub mod pwm;
pub mod serial;
pub mod tick;

pub use adc::AdcReader;
pub use exti::ExtiRouter;
pub use pwm::PwmGenerator;
pub use serial::SerialTransport;
pub use tick::TickClock;
