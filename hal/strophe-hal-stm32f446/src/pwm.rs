//! TIM1 registers in PWM mode
//!
//! Three outputs in PWM mode 1 with preload, active-high polarity and no
//! complementary channels. TIM1 is an advanced timer, so the outputs are
//! additionally gated by the master output enable bit in BDTR.

use strophe_hal::pwm::{Alignment, PwmChannel, PwmTimer};

use crate::mmio::Reg;
use crate::rcc;

const TIM1_BASE: u32 = 0x4001_0000;
const CR1: Reg = Reg::new(TIM1_BASE + 0x00);
const EGR: Reg = Reg::new(TIM1_BASE + 0x14);
const CCMR1: Reg = Reg::new(TIM1_BASE + 0x18);
const CCMR2: Reg = Reg::new(TIM1_BASE + 0x1C);
const CCER: Reg = Reg::new(TIM1_BASE + 0x20);
const PSC: Reg = Reg::new(TIM1_BASE + 0x28);
const ARR: Reg = Reg::new(TIM1_BASE + 0x2C);
const CCR1: Reg = Reg::new(TIM1_BASE + 0x34);
const CCR2: Reg = Reg::new(TIM1_BASE + 0x38);
const CCR3: Reg = Reg::new(TIM1_BASE + 0x3C);
const BDTR: Reg = Reg::new(TIM1_BASE + 0x44);

const CR1_CEN: u32 = 1 << 0;
const CR1_DIR: u32 = 1 << 4;
const CR1_CMS_SHIFT: u32 = 5;
const CR1_CMS_MASK: u32 = 0b11 << CR1_CMS_SHIFT;
const CR1_ARPE: u32 = 1 << 7;
const EGR_UG: u32 = 1 << 0;
const BDTR_MOE: u32 = 1 << 15;

/// PWM mode 1 in an OCxM field
const OCM_PWM1: u32 = 0b110;

fn alignment_bits(alignment: Alignment) -> u32 {
    match alignment {
        Alignment::Edge => 0b00,
        Alignment::Center1 => 0b01,
        Alignment::Center2 => 0b10,
        Alignment::Center3 => 0b11,
    }
}

/// TIM1 of the STM32F446 driving up to three PWM outputs
pub struct Tim1Pwm {
    _private: (),
}

impl Tim1Pwm {
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl Default for Tim1Pwm {
    fn default() -> Self {
        Self::new()
    }
}

impl PwmTimer for Tim1Pwm {
    fn enable_clock(&self) {
        rcc::enable_tim1();
    }

    fn configure_timebase(&self, prescaler: u16, reload: u16, alignment: Alignment) {
        CR1.clear_bits(CR1_CEN);
        CR1.modify(|v| {
            v & !(CR1_CMS_MASK | CR1_DIR) | (alignment_bits(alignment) << CR1_CMS_SHIFT)
        });
        PSC.write(prescaler as u32);
        ARR.write(reload as u32);
        CR1.set_bits(CR1_ARPE);
    }

    fn configure_channels(&self, enabled: [bool; 3]) {
        let mut ccmr1 = CCMR1.read();
        let mut ccmr2 = CCMR2.read();
        let mut ccer = CCER.read();

        // Outputs off while the compare units are reprogrammed
        ccer &= !(1 << 0 | 1 << 4 | 1 << 8); // CC1E/CC2E/CC3E

        // CH1: OC1M bits 6:4, OC1PE bit 3
        ccmr1 &= !(0b111 << 4 | 1 << 3);
        if enabled[0] {
            ccmr1 |= OCM_PWM1 << 4 | 1 << 3;
        }
        // CH2: OC2M bits 14:12, OC2PE bit 11
        ccmr1 &= !(0b111 << 12 | 1 << 11);
        if enabled[1] {
            ccmr1 |= OCM_PWM1 << 12 | 1 << 11;
        }
        // CH3: OC3M bits 6:4, OC3PE bit 3 in CCMR2
        ccmr2 &= !(0b111 << 4 | 1 << 3);
        if enabled[2] {
            ccmr2 |= OCM_PWM1 << 4 | 1 << 3;
        }

        // Active-high polarity, outputs on for enabled channels
        ccer &= !(1 << 1 | 1 << 5 | 1 << 9); // CC1P/CC2P/CC3P
        if enabled[0] {
            ccer |= 1 << 0;
        }
        if enabled[1] {
            ccer |= 1 << 4;
        }
        if enabled[2] {
            ccer |= 1 << 8;
        }

        CCMR1.write(ccmr1);
        CCMR2.write(ccmr2);
        CCER.write(ccer);
    }

    fn set_compare(&self, channel: PwmChannel, value: u16) {
        let ccr = match channel {
            PwmChannel::Ch1 => CCR1,
            PwmChannel::Ch2 => CCR2,
            PwmChannel::Ch3 => CCR3,
        };
        ccr.write(value as u32);
    }

    fn enable_outputs(&self) {
        BDTR.set_bits(BDTR_MOE);
    }

    fn disable_outputs(&self) {
        BDTR.clear_bits(BDTR_MOE);
    }

    fn start(&self) {
        CR1.set_bits(CR1_CEN);
    }

    fn stop(&self) {
        CR1.clear_bits(CR1_CEN);
    }

    fn trigger_update(&self) {
        EGR.write(EGR_UG);
    }
}
