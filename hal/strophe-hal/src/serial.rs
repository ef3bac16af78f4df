//! USART register seam
//!
//! The byte-transport engine in `strophe-drivers` owns the ring buffers
//! and the producer/consumer protocol; this trait carries the register
//! side effects it needs: status snapshots, data register access and
//! transmit-interrupt gating.

/// One status-register snapshot, taken once per interrupt
///
/// A single hardware event can assert several of these at the same time
/// (multiple error flags, or a receive and a transmit condition).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SerialEvents {
    /// Receiver overrun
    pub overrun: bool,
    /// Frame error (bad stop bit)
    pub framing: bool,
    /// Noise detected on the line
    pub noise: bool,
    /// Parity mismatch
    pub parity: bool,
    /// Received byte waiting in the data register
    pub rx_ready: bool,
    /// Transmit data register empty
    pub tx_empty: bool,
}

impl SerialEvents {
    /// Whether any error condition is asserted
    pub fn has_error(self) -> bool {
        self.overrun || self.framing || self.noise || self.parity
    }
}

/// USART register operations
///
/// The call sequence during init follows the hardware's requirements:
/// disable, clock enable, divisor, mode bits, interrupt controller,
/// enable. Implementations keep each step independent.
pub trait SerialPort {
    /// Enable the peripheral bus clock
    fn enable_clock(&self);

    /// Disable the peripheral (clears the enable bit)
    fn disable(&self);

    /// Program the baud-rate divisor register
    fn set_divisor(&self, bits: u32);

    /// Enable transmitter, receiver and the receive interrupt; the
    /// transmit interrupt is left disabled
    fn enable_tx_rx(&self);

    /// Arm the interrupt controller for this peripheral's vector
    fn arm_interrupt(&self, priority: u8);

    /// Enable the peripheral
    fn enable(&self);

    /// Snapshot the status flags for one interrupt invocation
    fn events(&self) -> SerialEvents;

    /// Whether the transmit-empty interrupt is currently enabled
    fn tx_irq_enabled(&self) -> bool;

    /// Enable or disable the transmit-empty interrupt
    fn set_tx_irq(&self, enabled: bool);

    /// Read the received byte from the data register
    fn read_data(&self) -> u8;

    /// Write one byte to the transmit data register
    fn write_data(&self, byte: u8);

    /// Perform the read-to-clear acknowledgment for error flags
    fn ack_errors(&self);
}
