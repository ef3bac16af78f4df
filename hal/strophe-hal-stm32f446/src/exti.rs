//! External interrupt controller registers
//!
//! Port-to-line routing goes through the SYSCFG external interrupt
//! configuration registers; trigger selection, masking and pending flags
//! live in the EXTI block itself.

use strophe_hal::exti::{Edge, ExtiLines, LineGroup};
use strophe_hal::gpio::Port;

use crate::irq::{self, Interrupt};
use crate::mmio::Reg;
use crate::rcc;

const SYSCFG_BASE: u32 = 0x4001_3800;
/// EXTICR1..=EXTICR4, four line nibbles per register
const SYSCFG_EXTICR: u32 = SYSCFG_BASE + 0x08;

const EXTI_BASE: u32 = 0x4001_3C00;
const IMR: Reg = Reg::new(EXTI_BASE + 0x00);
const RTSR: Reg = Reg::new(EXTI_BASE + 0x08);
const FTSR: Reg = Reg::new(EXTI_BASE + 0x0C);
const PR: Reg = Reg::new(EXTI_BASE + 0x14);

/// External interrupt controller of the STM32F446
pub struct ExtiController {
    _private: (),
}

impl ExtiController {
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl Default for ExtiController {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtiLines for ExtiController {
    fn select_source(&self, line: u8, port: Port) {
        rcc::enable_syscfg();
        let exticr = Reg::new(SYSCFG_EXTICR + 4 * (line as u32 / 4));
        let shift = (line as u32 % 4) * 4;
        exticr.modify(|v| v & !(0xF << shift) | ((port.index() as u32) << shift));
    }

    fn set_trigger(&self, line: u8, edge: Edge) {
        let bit = 1 << line;
        match edge {
            Edge::Rising => {
                FTSR.clear_bits(bit);
                RTSR.set_bits(bit);
            }
            Edge::Falling => {
                RTSR.clear_bits(bit);
                FTSR.set_bits(bit);
            }
            Edge::Both => {
                RTSR.set_bits(bit);
                FTSR.set_bits(bit);
            }
        }
    }

    fn mask(&self, line: u8) {
        IMR.clear_bits(1 << line);
    }

    fn unmask(&self, line: u8) {
        IMR.set_bits(1 << line);
    }

    fn pending(&self) -> u16 {
        PR.read() as u16
    }

    fn clear_pending(&self, line: u8) {
        // Write-one-to-clear
        PR.write(1 << line);
    }

    fn enable_vector(&self, group: LineGroup, priority: u8) {
        let interrupt = match group {
            LineGroup::Line0 => Interrupt::Exti0,
            LineGroup::Line1 => Interrupt::Exti1,
            LineGroup::Line2 => Interrupt::Exti2,
            LineGroup::Line3 => Interrupt::Exti3,
            LineGroup::Line4 => Interrupt::Exti4,
            LineGroup::Lines5To9 => Interrupt::Exti9_5,
            LineGroup::Lines10To15 => Interrupt::Exti15_10,
        };
        irq::arm(interrupt, priority);
    }
}
