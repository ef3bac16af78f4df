//! ADC1 registers
//!
//! Single regular channel only: the sequence length field stays at one
//! conversion and SQR3 carries the channel. Sample time is three bits
//! per channel, split across SMPR2 (channels 0..=9) and SMPR1 (10..=18).

use strophe_hal::adc::{AdcConversion, ConversionMode, Resolution, SampleTime};

use crate::irq::{self, Interrupt};
use crate::mmio::Reg;
use crate::rcc;

const ADC1_BASE: u32 = 0x4001_2000;
const SR: Reg = Reg::new(ADC1_BASE + 0x00);
const CR1: Reg = Reg::new(ADC1_BASE + 0x04);
const CR2: Reg = Reg::new(ADC1_BASE + 0x08);
const SMPR1: Reg = Reg::new(ADC1_BASE + 0x0C);
const SMPR2: Reg = Reg::new(ADC1_BASE + 0x10);
const SQR1: Reg = Reg::new(ADC1_BASE + 0x2C);
const SQR3: Reg = Reg::new(ADC1_BASE + 0x34);
const DR: Reg = Reg::new(ADC1_BASE + 0x4C);

const SR_EOC: u32 = 1 << 1;
const CR1_EOCIE: u32 = 1 << 5;
const CR1_RES_SHIFT: u32 = 24;
const CR2_ADON: u32 = 1 << 0;
const CR2_CONT: u32 = 1 << 1;
const CR2_SWSTART: u32 = 1 << 30;
/// Regular sequence length field, bits 23:20
const SQR1_L_MASK: u32 = 0xF << 20;

fn resolution_bits(resolution: Resolution) -> u32 {
    match resolution {
        Resolution::Bits12 => 0b00,
        Resolution::Bits10 => 0b01,
        Resolution::Bits8 => 0b10,
        Resolution::Bits6 => 0b11,
    }
}

fn sample_time_bits(time: SampleTime) -> u32 {
    match time {
        SampleTime::Cycles3 => 0b000,
        SampleTime::Cycles15 => 0b001,
        SampleTime::Cycles28 => 0b010,
        SampleTime::Cycles56 => 0b011,
        SampleTime::Cycles84 => 0b100,
        SampleTime::Cycles112 => 0b101,
        SampleTime::Cycles144 => 0b110,
        SampleTime::Cycles480 => 0b111,
    }
}

/// ADC1 of the STM32F446
pub struct Adc1 {
    _private: (),
}

impl Adc1 {
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl Default for Adc1 {
    fn default() -> Self {
        Self::new()
    }
}

impl AdcConversion for Adc1 {
    fn enable_clock(&self) {
        rcc::enable_adc1();
    }

    fn disable(&self) {
        CR2.clear_bits(CR2_ADON);
    }

    fn set_resolution(&self, resolution: Resolution) {
        CR1.modify(|v| {
            v & !(0b11 << CR1_RES_SHIFT) | (resolution_bits(resolution) << CR1_RES_SHIFT)
        });
    }

    fn set_mode(&self, mode: ConversionMode) {
        match mode {
            ConversionMode::Continuous => CR2.set_bits(CR2_CONT),
            ConversionMode::Single => CR2.clear_bits(CR2_CONT),
        }
    }

    fn select_channel(&self, channel: u8) {
        // One conversion in the regular sequence
        SQR1.clear_bits(SQR1_L_MASK);
        SQR3.write(channel as u32);
    }

    fn set_sample_time(&self, channel: u8, time: SampleTime) {
        let bits = sample_time_bits(time);
        if channel < 10 {
            let shift = channel as u32 * 3;
            SMPR2.modify(|v| v & !(0b111 << shift) | (bits << shift));
        } else {
            let shift = (channel as u32 - 10) * 3;
            SMPR1.modify(|v| v & !(0b111 << shift) | (bits << shift));
        }
    }

    fn enable_eoc_interrupt(&self) {
        CR1.set_bits(CR1_EOCIE);
    }

    fn clear_stale(&self) {
        let _ = SR.read();
        let _ = DR.read();
    }

    fn arm_interrupt(&self, priority: u8) {
        irq::arm(Interrupt::Adc, priority);
    }

    fn enable(&self) {
        CR2.set_bits(CR2_ADON);
    }

    fn start(&self) {
        CR2.set_bits(CR2_SWSTART);
    }

    fn conversion_done(&self) -> bool {
        SR.read() & SR_EOC != 0
    }

    fn read_data(&self) -> u16 {
        DR.read() as u16
    }
}
