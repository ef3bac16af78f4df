//! Periodic tick timer seam
//!
//! A free-running down-counter that fires an interrupt each time it
//! reloads. The reload value is limited to 24 bits on the Cortex-M
//! system timer this maps to.

/// Periodic tick interrupt source
pub trait TickTimer {
    /// Largest programmable reload value (24-bit counter)
    const MAX_RELOAD: u32 = 0x00FF_FFFF;

    /// Stop the timer, program the reload value, clear the current
    /// count, set the interrupt priority and start counting
    fn configure(&self, reload: u32, irq_priority: u8);

    /// Current value of the hardware down-counter
    ///
    /// Counts from the reload value down to zero, then wraps and raises
    /// the tick interrupt.
    fn counter(&self) -> u32;
}
