//! Tick/time conversions and wrap-safe elapsed helpers
//!
//! Timestamps here are raw unsigned counters that eventually wrap at
//! their integer width. Durations between two timestamps stay correct
//! across a wrap as long as they are computed with wrapping subtraction,
//! which is all these helpers do.

/// Timer cycles in one tick period, in a wide intermediate so
/// `clock_hz * period_us` cannot overflow
pub fn cycles_per_tick(clock_hz: u32, period_us: u32) -> u64 {
    clock_hz as u64 * period_us as u64 / 1_000_000
}

/// Convert a tick count to milliseconds
pub fn ticks_to_ms(ticks: u32, period_us: u32) -> u32 {
    (ticks as u64 * period_us as u64 / 1000) as u32
}

/// Convert a tick count to microseconds
pub fn ticks_to_us(ticks: u32, period_us: u32) -> u64 {
    ticks as u64 * period_us as u64
}

/// Milliseconds between two millisecond timestamps, correct across a
/// counter wrap
pub fn elapsed_ms(now_ms: u32, start_ms: u32) -> u32 {
    now_ms.wrapping_sub(start_ms)
}

/// Microseconds between two microsecond timestamps, correct across a
/// counter wrap
pub fn elapsed_us(now_us: u64, start_us: u64) -> u64 {
    now_us.wrapping_sub(start_us)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycles_per_tick() {
        // 16 MHz, 1 ms tick
        assert_eq!(cycles_per_tick(16_000_000, 1000), 16_000);
        // 16 MHz, 10 us tick
        assert_eq!(cycles_per_tick(16_000_000, 10), 160);
        // Sub-cycle period truncates to zero
        assert_eq!(cycles_per_tick(100, 1), 0);
    }

    #[test]
    fn test_cycles_per_tick_wide_intermediate() {
        // 180 MHz with a 1 s period overflows u32 arithmetic but not u64
        assert_eq!(cycles_per_tick(180_000_000, 1_000_000), 180_000_000);
    }

    #[test]
    fn test_ticks_to_ms() {
        assert_eq!(ticks_to_ms(100, 1000), 100);
        assert_eq!(ticks_to_ms(7, 10_000), 70);
        // Sub-millisecond ticks quantize down
        assert_eq!(ticks_to_ms(15, 100), 1);
    }

    #[test]
    fn test_ticks_to_ms_wide_intermediate() {
        // ticks * period_us exceeds u32; the u64 intermediate keeps it exact
        assert_eq!(ticks_to_ms(u32::MAX, 1000), u32::MAX);
    }

    #[test]
    fn test_elapsed_simple() {
        assert_eq!(elapsed_ms(150, 100), 50);
        assert_eq!(elapsed_us(1_000_000, 250_000), 750_000);
    }

    #[test]
    fn test_elapsed_across_wrap() {
        // `now` has numerically wrapped below `start`
        assert_eq!(elapsed_ms(5, u32::MAX - 9), 15);
        assert_eq!(elapsed_us(2, u64::MAX - 2), 5);
    }

    #[test]
    fn test_elapsed_zero() {
        assert_eq!(elapsed_ms(42, 42), 0);
        assert_eq!(elapsed_us(42, 42), 0);
    }
}
