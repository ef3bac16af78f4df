//! Reset and clock control: peripheral clock enables
//!
//! Each driver enables its own peripheral clock during init, so only the
//! enable registers are mapped here.

use crate::mmio::Reg;

const RCC_BASE: u32 = 0x4002_3800;

const AHB1ENR: Reg = Reg::new(RCC_BASE + 0x30);
const APB1ENR: Reg = Reg::new(RCC_BASE + 0x40);
const APB2ENR: Reg = Reg::new(RCC_BASE + 0x44);

/// GPIOAEN..GPIOHEN occupy bits 0..=7 in port order
pub(crate) fn enable_gpio_port(port_index: u8) {
    AHB1ENR.set_bits(1 << port_index);
}

/// SYSCFGEN, bit 14
pub(crate) fn enable_syscfg() {
    APB2ENR.set_bits(1 << 14);
}

/// USART2EN, bit 17
pub(crate) fn enable_usart2() {
    APB1ENR.set_bits(1 << 17);
}

/// ADC1EN, bit 8
pub(crate) fn enable_adc1() {
    APB2ENR.set_bits(1 << 8);
}

/// TIM1EN, bit 0
pub(crate) fn enable_tim1() {
    APB2ENR.set_bits(1 << 0);
}
