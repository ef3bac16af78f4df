//! A/D converter seam
//!
//! Single-channel regular conversions only: one channel in the sequence,
//! end-of-conversion interrupt, no scan mode and no injected channels.

/// Highest regular channel index on this converter family
pub const MAX_CHANNEL: u8 = 18;

/// Conversion resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resolution {
    Bits12,
    Bits10,
    Bits8,
    Bits6,
}

/// Continuous or one-shot conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConversionMode {
    /// Convert once per software start
    Single,
    /// Convert back-to-back after one start
    Continuous,
}

/// Sampling window length in converter clock cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleTime {
    Cycles3,
    Cycles15,
    Cycles28,
    Cycles56,
    Cycles84,
    Cycles112,
    Cycles144,
    Cycles480,
}

/// A/D converter register operations
pub trait AdcConversion {
    /// Enable the converter bus clock
    fn enable_clock(&self);

    /// Disable the converter before reconfiguration
    fn disable(&self);

    /// Select conversion resolution
    fn set_resolution(&self, resolution: Resolution);

    /// Select single or continuous conversion
    fn set_mode(&self, mode: ConversionMode);

    /// Program a one-entry regular sequence for the given channel
    fn select_channel(&self, channel: u8);

    /// Program the sampling window for the given channel
    fn set_sample_time(&self, channel: u8, time: SampleTime);

    /// Enable the end-of-conversion interrupt
    fn enable_eoc_interrupt(&self);

    /// Clear stale status/data by reading both registers
    fn clear_stale(&self);

    /// Arm the interrupt controller for the converter vector
    fn arm_interrupt(&self, priority: u8);

    /// Enable the converter
    fn enable(&self);

    /// Trigger a software conversion start
    fn start(&self);

    /// Whether an end-of-conversion is flagged
    fn conversion_done(&self) -> bool;

    /// Read the conversion result (clears the flag on hardware)
    fn read_data(&self) -> u16;
}
