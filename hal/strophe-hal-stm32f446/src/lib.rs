//! STM32F446 implementation of the Strophe hardware seams
//!
//! Direct register access for the peripherals the bring-up phase needs:
//! GPIO ports A-H, the external interrupt controller, USART2, ADC1, TIM1
//! and the SysTick timer. Core peripherals (NVIC, SCB, SysTick) go
//! through `cortex-m`; the STM32-specific blocks are memory-mapped here.
//!
//! Every seam handle is a zero-sized `const fn new()` type, so drivers
//! parameterized over them can live in plain statics. The handles do not
//! enforce exclusive ownership of their register blocks; the firmware
//! layer creates exactly one driver per peripheral.
//!
//! This crate also provides the interrupt vector plumbing a device crate
//! normally would: the [`irq::Interrupt`] numbering, the partial
//! `__INTERRUPTS` table and `device.x` (see `build.rs`).

#![no_std]

pub mod adc;
pub mod exti;
pub mod gpio;
pub mod irq;
pub mod pwm;
pub mod serial;
pub mod tick;

mod mmio;
mod rcc;

pub use adc::Adc1;
pub use exti::ExtiController;
pub use gpio::{DigitalInput, DigitalOutput, Stm32Gpio};
pub use irq::Interrupt;
pub use pwm::Tim1Pwm;
pub use serial::Usart2;
pub use tick::SysTickTimer;
