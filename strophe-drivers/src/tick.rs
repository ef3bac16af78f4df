//! Millisecond/microsecond time base on the periodic tick timer
//!
//! The tick interrupt does exactly one thing: increment a counter. All
//! timestamp math happens on the reader side, so the handler stays O(1)
//! and branch-free. Microsecond reads combine the tick counter with the
//! hardware down-counter using a bounded double-sample retry, which keeps
//! them coherent without ever masking interrupts.

use core::sync::atomic::{AtomicU32, Ordering};

use strophe_hal::tick::TickTimer;
use strophe_core::time;

pub use strophe_core::time::{elapsed_ms, elapsed_us};

/// Retry budget for one microsecond read
const SAMPLE_RETRIES: u32 = 3;

/// Time base configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickConfig {
    /// Clock feeding the tick timer, in Hz
    pub clock_hz: u32,
    /// Tick interrupt period in microseconds
    pub tick_period_us: u32,
    /// Tick interrupt priority
    pub irq_priority: u8,
}

/// Errors from time base configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickError {
    /// Clock rate or period was zero, or the period is shorter than one
    /// timer cycle
    InvalidConfig,
    /// The computed reload value exceeds the 24-bit counter
    ReloadTooLarge,
}

/// Free-running tick counter with millisecond and best-effort
/// microsecond timestamps
///
/// Single-instance by design: create once, call [`TickClock::start`]
/// once during init, route the tick interrupt to [`TickClock::on_tick`].
/// The configuration fields live in atomics so the whole clock can sit
/// in a `static` shared with the interrupt handler.
pub struct TickClock<T: TickTimer> {
    timer: T,
    /// Incremented by the tick interrupt only
    ticks: AtomicU32,
    /// Reload value programmed into the timer
    load: AtomicU32,
    /// Clock rate; zero means the clock has not been started
    clock_hz: AtomicU32,
    /// Tick period in microseconds
    period_us: AtomicU32,
}

impl<T: TickTimer> TickClock<T> {
    /// Create a stopped clock over the given timer
    pub const fn new(timer: T) -> Self {
        Self {
            timer,
            ticks: AtomicU32::new(0),
            load: AtomicU32::new(0),
            clock_hz: AtomicU32::new(0),
            period_us: AtomicU32::new(0),
        }
    }

    /// Access the underlying timer seam
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Compute the reload value and start the periodic interrupt
    pub fn start(&self, config: &TickConfig) -> Result<(), TickError> {
        if config.clock_hz == 0 || config.tick_period_us == 0 {
            return Err(TickError::InvalidConfig);
        }

        let cycles = time::cycles_per_tick(config.clock_hz, config.tick_period_us);
        if cycles == 0 {
            return Err(TickError::InvalidConfig);
        }

        let load = cycles - 1;
        if load > T::MAX_RELOAD as u64 {
            return Err(TickError::ReloadTooLarge);
        }

        self.ticks.store(0, Ordering::Relaxed);
        self.load.store(load as u32, Ordering::Relaxed);
        self.period_us.store(config.tick_period_us, Ordering::Relaxed);
        self.clock_hz.store(config.clock_hz, Ordering::Relaxed);

        self.timer.configure(load as u32, config.irq_priority);
        Ok(())
    }

    /// Tick interrupt entry point: one counter increment, nothing else
    pub fn on_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Release);
    }

    /// Raw tick count since start (zero if never started)
    pub fn ticks(&self) -> u32 {
        self.ticks.load(Ordering::Acquire)
    }

    /// Milliseconds since start, quantized to the tick period
    pub fn now_ms(&self) -> u32 {
        time::ticks_to_ms(self.ticks(), self.period_us.load(Ordering::Relaxed))
    }

    /// Best-effort microseconds since start
    ///
    /// Samples the tick counter on both sides of a hardware counter read;
    /// a matching pair means no tick boundary was crossed and the
    /// sub-tick cycle count is valid. After [`SAMPLE_RETRIES`] mismatches
    /// the result falls back to tick resolution, which bounds execution
    /// time in interrupt-adjacent contexts.
    pub fn now_us(&self) -> u64 {
        let clock_hz = self.clock_hz.load(Ordering::Relaxed);
        if clock_hz == 0 {
            return 0;
        }
        let load = self.load.load(Ordering::Relaxed);
        let period_us = self.period_us.load(Ordering::Relaxed);

        for _ in 0..SAMPLE_RETRIES {
            let t1 = self.ticks.load(Ordering::Acquire);
            let counter = self.timer.counter();
            let t2 = self.ticks.load(Ordering::Acquire);

            if t1 == t2 {
                let elapsed_cycles = load.wrapping_sub(counter);
                let us_in_tick = elapsed_cycles as u64 * 1_000_000 / clock_hz as u64;
                return time::ticks_to_us(t1, period_us) + us_in_tick;
            }
        }

        // Tick precision only
        time::ticks_to_us(self.ticks(), period_us)
    }
}
