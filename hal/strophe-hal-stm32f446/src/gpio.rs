//! GPIO register programming for ports A-H
//!
//! Implements the `GpioPins` seam with direct MODER/PUPDR/OTYPER/
//! OSPEEDR/AFR access, plus `embedded-hal` digital pin wrappers for code
//! that wants to hold a single pin as an object.

use core::convert::Infallible;

use strophe_hal::gpio::{
    GpioError, GpioPins, OutputType, PinConfig, PinId, PinMode, Pull, Speed,
};

use crate::mmio::Reg;
use crate::rcc;

const GPIOA_BASE: u32 = 0x4002_0000;
const PORT_STRIDE: u32 = 0x400;

const MODER: u32 = 0x00;
const OTYPER: u32 = 0x04;
const OSPEEDR: u32 = 0x08;
const PUPDR: u32 = 0x0C;
const IDR: u32 = 0x10;
const ODR: u32 = 0x14;
const BSRR: u32 = 0x18;
const AFRL: u32 = 0x20;

fn reg(pin: PinId, offset: u32) -> Reg {
    Reg::new(GPIOA_BASE + PORT_STRIDE * pin.port.index() as u32 + offset)
}

/// Mask of `width` bits at `shift`
fn field_mask(width: u32, shift: u32) -> u32 {
    ((1 << width) - 1) << shift
}

fn mode_bits(mode: PinMode) -> u32 {
    match mode {
        PinMode::Input => 0b00,
        PinMode::Output => 0b01,
        PinMode::Alternate => 0b10,
        PinMode::Analog => 0b11,
    }
}

fn pull_bits(pull: Pull) -> u32 {
    match pull {
        Pull::None => 0b00,
        Pull::Up => 0b01,
        Pull::Down => 0b10,
    }
}

fn speed_bits(speed: Speed) -> u32 {
    match speed {
        Speed::Low => 0b00,
        Speed::Medium => 0b01,
        Speed::Fast => 0b10,
        Speed::High => 0b11,
    }
}

/// GPIO ports of the STM32F446
#[derive(Clone, Copy)]
pub struct Stm32Gpio {
    _private: (),
}

impl Stm32Gpio {
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Configure a pin as a push-pull output and wrap it as an
    /// `embedded-hal` output pin
    pub fn configure_output(&self, config: &PinConfig) -> Result<DigitalOutput, GpioError> {
        self.configure(config)?;
        Ok(DigitalOutput { pin: config.pin })
    }

    /// Configure a pin as an input and wrap it as an `embedded-hal`
    /// input pin
    pub fn configure_input(&self, config: &PinConfig) -> Result<DigitalInput, GpioError> {
        self.configure(config)?;
        Ok(DigitalInput { pin: config.pin })
    }
}

impl Default for Stm32Gpio {
    fn default() -> Self {
        Self::new()
    }
}

impl GpioPins for Stm32Gpio {
    fn configure(&self, config: &PinConfig) -> Result<(), GpioError> {
        let pin = config.pin;
        if !pin.is_valid() {
            return Err(GpioError::InvalidPin);
        }
        if config.mode == PinMode::Alternate && config.alternate > 15 {
            return Err(GpioError::InvalidAlternate);
        }

        rcc::enable_gpio_port(pin.port.index());

        let index = pin.index as u32;
        let shift2 = index * 2;

        reg(pin, MODER).modify(|v| {
            v & !field_mask(2, shift2) | (mode_bits(config.mode) << shift2)
        });
        reg(pin, PUPDR).modify(|v| {
            v & !field_mask(2, shift2) | (pull_bits(config.pull) << shift2)
        });

        if matches!(config.mode, PinMode::Output | PinMode::Alternate) {
            let otype: u32 = match config.output_type {
                OutputType::PushPull => 0,
                OutputType::OpenDrain => 1,
            };
            reg(pin, OTYPER).modify(|v| v & !(1 << index) | (otype << index));
            reg(pin, OSPEEDR).modify(|v| {
                v & !field_mask(2, shift2) | (speed_bits(config.speed) << shift2)
            });
        }

        if config.mode == PinMode::Alternate {
            // AFRL covers pins 0..=7, AFRH pins 8..=15, one nibble each
            let afr = Reg::new(
                GPIOA_BASE + PORT_STRIDE * pin.port.index() as u32 + AFRL + 4 * (index >> 3),
            );
            let shift4 = (index & 7) * 4;
            afr.modify(|v| v & !field_mask(4, shift4) | ((config.alternate as u32) << shift4));
        }

        Ok(())
    }

    fn read(&self, pin: PinId) -> bool {
        if !pin.is_valid() {
            return false;
        }
        reg(pin, IDR).read() & (1 << pin.index) != 0
    }

    fn write(&self, pin: PinId, high: bool) {
        if !pin.is_valid() {
            return;
        }
        if high {
            reg(pin, BSRR).write(1 << pin.index);
        } else {
            reg(pin, BSRR).write(1 << (pin.index + 16));
        }
    }

    fn toggle(&self, pin: PinId) {
        if !pin.is_valid() {
            return;
        }
        reg(pin, ODR).modify(|v| v ^ (1 << pin.index));
    }
}

/// A configured output pin as an `embedded-hal` object
pub struct DigitalOutput {
    pin: PinId,
}

impl embedded_hal::digital::ErrorType for DigitalOutput {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for DigitalOutput {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Stm32Gpio::new().write(self.pin, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Stm32Gpio::new().write(self.pin, true);
        Ok(())
    }
}

impl embedded_hal::digital::StatefulOutputPin for DigitalOutput {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(reg(self.pin, ODR).read() & (1 << self.pin.index) != 0)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        self.is_set_high().map(|high| !high)
    }
}

/// A configured input pin as an `embedded-hal` object
pub struct DigitalInput {
    pin: PinId,
}

impl embedded_hal::digital::ErrorType for DigitalInput {
    type Error = Infallible;
}

impl embedded_hal::digital::InputPin for DigitalInput {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(Stm32Gpio::new().read(self.pin))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}
