//! USART2 registers
//!
//! Status-register flag layout: PE, FE, NE, ORE in bits 0..=3, RXNE in
//! bit 5, TXE in bit 7. Error flags are cleared by a status read
//! followed by a data-register read.

use strophe_hal::serial::{SerialEvents, SerialPort};

use crate::irq::{self, Interrupt};
use crate::mmio::Reg;
use crate::rcc;

const USART2_BASE: u32 = 0x4000_4400;
const SR: Reg = Reg::new(USART2_BASE + 0x00);
const DR: Reg = Reg::new(USART2_BASE + 0x04);
const BRR: Reg = Reg::new(USART2_BASE + 0x08);
const CR1: Reg = Reg::new(USART2_BASE + 0x0C);

const SR_PE: u32 = 1 << 0;
const SR_FE: u32 = 1 << 1;
const SR_NE: u32 = 1 << 2;
const SR_ORE: u32 = 1 << 3;
const SR_RXNE: u32 = 1 << 5;
const SR_TXE: u32 = 1 << 7;

const CR1_RE: u32 = 1 << 2;
const CR1_TE: u32 = 1 << 3;
const CR1_RXNEIE: u32 = 1 << 5;
const CR1_TXEIE: u32 = 1 << 7;
const CR1_UE: u32 = 1 << 13;

/// USART2 of the STM32F446 (the ST-LINK virtual COM port on Nucleo
/// boards)
pub struct Usart2 {
    _private: (),
}

impl Usart2 {
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl Default for Usart2 {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialPort for Usart2 {
    fn enable_clock(&self) {
        rcc::enable_usart2();
    }

    fn disable(&self) {
        CR1.clear_bits(CR1_UE);
    }

    fn set_divisor(&self, bits: u32) {
        BRR.write(bits);
    }

    fn enable_tx_rx(&self) {
        // Control register 2 and 3 keep their reset values (1 stop bit,
        // no flow control); the transmit interrupt stays off here
        CR1.write(CR1_TE | CR1_RE | CR1_RXNEIE);
    }

    fn arm_interrupt(&self, priority: u8) {
        irq::arm(Interrupt::Usart2, priority);
    }

    fn enable(&self) {
        CR1.set_bits(CR1_UE);
    }

    fn events(&self) -> SerialEvents {
        let sr = SR.read();
        SerialEvents {
            overrun: sr & SR_ORE != 0,
            framing: sr & SR_FE != 0,
            noise: sr & SR_NE != 0,
            parity: sr & SR_PE != 0,
            rx_ready: sr & SR_RXNE != 0,
            tx_empty: sr & SR_TXE != 0,
        }
    }

    fn tx_irq_enabled(&self) -> bool {
        CR1.read() & CR1_TXEIE != 0
    }

    fn set_tx_irq(&self, enabled: bool) {
        if enabled {
            CR1.set_bits(CR1_TXEIE);
        } else {
            CR1.clear_bits(CR1_TXEIE);
        }
    }

    fn read_data(&self) -> u8 {
        DR.read() as u8
    }

    fn write_data(&self, byte: u8) {
        DR.write(byte as u32);
    }

    fn ack_errors(&self) {
        // Error flags clear on SR read followed by DR read
        let _ = SR.read();
        let _ = DR.read();
    }
}
