//! Single-channel A/D conversion with an end-of-conversion interrupt
//!
//! One regular channel, single or continuous mode. The interrupt latches
//! each completed conversion into a single slot guarded by a ready flag;
//! the application polls [`AdcReader::read`], which hands out each sample
//! exactly once. Overruns are not handled (a stale sample is simply
//! overwritten).

use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use strophe_hal::adc::{AdcConversion, ConversionMode, Resolution, SampleTime, MAX_CHANNEL};
use strophe_hal::gpio::{GpioError, GpioPins, PinConfig, PinMode};

/// Converter configuration
#[derive(Debug, Clone, Copy)]
pub struct AdcConfig<'a> {
    /// Regular channel index, 0..=18
    pub channel: u8,
    /// One conversion per start, or free-running
    pub mode: ConversionMode,
    /// Conversion resolution
    pub resolution: Resolution,
    /// Sampling window length
    pub sample_time: SampleTime,
    /// End-of-conversion interrupt priority
    pub irq_priority: u8,
    /// Input pin, must be in analog mode
    pub pin: &'a PinConfig,
}

/// Errors from converter initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcError {
    /// Channel index beyond the converter's range
    InvalidChannel,
    /// The input pin is not configured as analog
    PinNotAnalog,
    /// Pin configuration failed
    Gpio(GpioError),
}

/// Polled single-slot conversion reader
pub struct AdcReader<A: AdcConversion> {
    adc: A,
    /// Most recent conversion result, written by the interrupt
    last_reading: AtomicU16,
    /// Set by the interrupt, cleared by `read` and `start`
    data_ready: AtomicBool,
}

impl<A: AdcConversion> AdcReader<A> {
    /// Create a reader over the given converter
    pub const fn new(adc: A) -> Self {
        Self {
            adc,
            last_reading: AtomicU16::new(0),
            data_ready: AtomicBool::new(false),
        }
    }

    /// Access the underlying converter seam
    pub fn adc(&self) -> &A {
        &self.adc
    }

    /// Configure the converter for one regular channel
    pub fn init<G: GpioPins>(&self, gpio: &G, config: &AdcConfig<'_>) -> Result<(), AdcError> {
        if config.channel > MAX_CHANNEL {
            return Err(AdcError::InvalidChannel);
        }
        if config.pin.mode != PinMode::Analog {
            return Err(AdcError::PinNotAnalog);
        }
        gpio.configure(config.pin).map_err(AdcError::Gpio)?;

        self.adc.enable_clock();
        self.adc.disable();
        self.adc.set_resolution(config.resolution);
        self.adc.set_mode(config.mode);
        self.adc.enable_eoc_interrupt();
        self.adc.select_channel(config.channel);
        self.adc.set_sample_time(config.channel, config.sample_time);
        self.adc.clear_stale();
        self.adc.arm_interrupt(config.irq_priority);

        self.last_reading.store(0, Ordering::Relaxed);
        self.data_ready.store(false, Ordering::Relaxed);

        self.adc.enable();
        Ok(())
    }

    /// Trigger a conversion
    ///
    /// Call once in continuous mode, or before each conversion in single
    /// mode. Discards any unread sample.
    pub fn start(&self) {
        self.data_ready.store(false, Ordering::Relaxed);
        self.adc.start();
    }

    /// Take the latest sample, if a new one has completed
    ///
    /// Each completed conversion is returned exactly once.
    pub fn read(&self) -> Option<u16> {
        if self.data_ready.swap(false, Ordering::Acquire) {
            Some(self.last_reading.load(Ordering::Relaxed))
        } else {
            None
        }
    }

    /// End-of-conversion interrupt entry point
    pub fn on_interrupt(&self) {
        if self.adc.conversion_done() {
            self.last_reading
                .store(self.adc.read_data(), Ordering::Relaxed);
            self.data_ready.store(true, Ordering::Release);
        }
    }
}
