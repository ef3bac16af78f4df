//! Three-channel PWM generation on an advanced timer
//!
//! Computes the prescaler/reload pair for a requested switching
//! frequency, drives up to three independent outputs in PWM mode 1, and
//! offers duty control in raw timer ticks or permyriad (0.01 %) units.
//! Intended for the 3-PWM drive of a motor power stage; complementary
//! outputs and dead-time are out of scope here.

use core::sync::atomic::{AtomicU16, Ordering};

use strophe_hal::gpio::{GpioError, GpioPins, PinConfig};
use strophe_hal::pwm::{Alignment, PwmChannel, PwmTimer};

/// Full-scale duty in permyriad units (100.00 %)
pub const DUTY_FULL_PERMYRIAD: u16 = 10_000;

/// PWM configuration
///
/// A `None` channel entry leaves that output disabled; at least one
/// channel must be given. Pin configs must describe the correct
/// alternate-function mapping.
#[derive(Debug, Clone, Copy)]
pub struct PwmConfig<'a> {
    /// Timer counter clock in Hz
    pub timer_clk_hz: u32,
    /// Target switching frequency in Hz
    pub frequency_hz: u32,
    /// Counter alignment
    pub alignment: Alignment,
    /// Output pins for channels 1..=3
    pub channels: [Option<&'a PinConfig>; 3],
}

/// Errors from PWM initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmError {
    /// No channel pin was given
    NoChannels,
    /// Pin configuration failed
    Gpio(GpioError),
    /// No prescaler/reload pair realizes the requested frequency
    Unachievable,
}

/// Find the smallest prescaler whose reload value fits 16 bits
///
/// Center-aligned counting traverses the period twice (up then down), so
/// the reload covers half the period's ticks.
fn compute_timebase(
    timer_clk_hz: u32,
    frequency_hz: u32,
    alignment: Alignment,
) -> Option<(u16, u16)> {
    if timer_clk_hz == 0 || frequency_hz == 0 {
        return None;
    }

    let per_period = if alignment.is_center() { 2 } else { 1 };
    let ticks = timer_clk_hz / (per_period * frequency_hz);
    if ticks < 2 {
        return None;
    }

    let mut prescaler: u32 = 0;
    while ticks / (prescaler + 1) > 65_535 {
        if prescaler == 0xFFFF {
            return None;
        }
        prescaler += 1;
    }
    let reload = ticks / (prescaler + 1) - 1;

    Some((prescaler as u16, reload as u16))
}

/// PWM timebase and duty control
pub struct PwmGenerator<T: PwmTimer> {
    timer: T,
    /// Reload value from the last successful init, for duty scaling
    reload: AtomicU16,
}

impl<T: PwmTimer> PwmGenerator<T> {
    /// Create a generator over the given timer
    pub const fn new(timer: T) -> Self {
        Self {
            timer,
            reload: AtomicU16::new(0),
        }
    }

    /// Access the underlying timer seam
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Reload value programmed by the last init (duty full scale)
    pub fn reload(&self) -> u16 {
        self.reload.load(Ordering::Relaxed)
    }

    /// Configure pins and the timer for the requested frequency
    ///
    /// All compare registers start at zero; call [`PwmGenerator::start`]
    /// to begin switching.
    pub fn init<G: GpioPins>(&self, gpio: &G, config: &PwmConfig<'_>) -> Result<(), PwmError> {
        if config.channels.iter().all(Option::is_none) {
            return Err(PwmError::NoChannels);
        }
        for pin in config.channels.iter().flatten() {
            gpio.configure(pin).map_err(PwmError::Gpio)?;
        }

        let (prescaler, reload) =
            compute_timebase(config.timer_clk_hz, config.frequency_hz, config.alignment)
                .ok_or(PwmError::Unachievable)?;
        self.reload.store(reload, Ordering::Relaxed);

        self.timer.enable_clock();
        self.timer.stop();
        self.timer.configure_timebase(prescaler, reload, config.alignment);
        self.timer
            .configure_channels(config.channels.map(|pin| pin.is_some()));
        self.timer.enable_outputs();

        // Safe initial duty on every output
        self.timer.set_compare(PwmChannel::Ch1, 0);
        self.timer.set_compare(PwmChannel::Ch2, 0);
        self.timer.set_compare(PwmChannel::Ch3, 0);

        // Load the preloaded prescaler/reload/compare values
        self.timer.trigger_update();
        Ok(())
    }

    /// Set a channel's duty in timer ticks, saturating at the reload
    /// value (100 % duty)
    pub fn set_duty(&self, channel: PwmChannel, duty: u16) {
        let reload = self.reload.load(Ordering::Relaxed);
        self.timer.set_compare(channel, duty.min(reload));
    }

    /// Set a channel's duty in permyriad (0..=10000 for 0.00..100.00 %)
    pub fn set_duty_permyriad(&self, channel: PwmChannel, duty_permyriad: u16) {
        let duty_permyriad = duty_permyriad.min(DUTY_FULL_PERMYRIAD);
        let reload = self.reload.load(Ordering::Relaxed) as u32;
        let duty = duty_permyriad as u32 * reload / DUTY_FULL_PERMYRIAD as u32;
        self.timer.set_compare(channel, duty as u16);
    }

    /// Open the output gate and start the counter
    pub fn start(&self) {
        self.timer.enable_outputs();
        self.timer.start();
    }

    /// Stop the counter and close the output gate
    pub fn stop(&self) {
        self.timer.stop();
        self.timer.disable_outputs();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    use strophe_hal::gpio::{PinId, Port, Speed};

    #[derive(Default)]
    struct MockTimer {
        clock_enabled: Cell<bool>,
        running: Cell<bool>,
        outputs_enabled: Cell<bool>,
        timebase: Cell<Option<(u16, u16, Alignment)>>,
        channels: Cell<Option<[bool; 3]>>,
        compares: RefCell<Vec<(PwmChannel, u16)>>,
        updates: Cell<u32>,
    }

    impl PwmTimer for MockTimer {
        fn enable_clock(&self) {
            self.clock_enabled.set(true);
        }
        fn configure_timebase(&self, prescaler: u16, reload: u16, alignment: Alignment) {
            self.timebase.set(Some((prescaler, reload, alignment)));
        }
        fn configure_channels(&self, enabled: [bool; 3]) {
            self.channels.set(Some(enabled));
        }
        fn set_compare(&self, channel: PwmChannel, value: u16) {
            self.compares.borrow_mut().push((channel, value));
        }
        fn enable_outputs(&self) {
            self.outputs_enabled.set(true);
        }
        fn disable_outputs(&self) {
            self.outputs_enabled.set(false);
        }
        fn start(&self) {
            self.running.set(true);
        }
        fn stop(&self) {
            self.running.set(false);
        }
        fn trigger_update(&self) {
            self.updates.set(self.updates.get() + 1);
        }
    }

    #[derive(Default)]
    struct MockGpio {
        configured: RefCell<Vec<PinConfig>>,
        fail: Cell<bool>,
    }

    impl GpioPins for MockGpio {
        fn configure(&self, config: &PinConfig) -> Result<(), GpioError> {
            if self.fail.get() {
                return Err(GpioError::InvalidAlternate);
            }
            self.configured.borrow_mut().push(*config);
            Ok(())
        }
        fn read(&self, _pin: PinId) -> bool {
            false
        }
        fn write(&self, _pin: PinId, _high: bool) {}
        fn toggle(&self, _pin: PinId) {}
    }

    const CH1_PIN: PinConfig = PinConfig::alternate(PinId::new(Port::A, 8), 1, Speed::High);
    const CH2_PIN: PinConfig = PinConfig::alternate(PinId::new(Port::A, 9), 1, Speed::High);
    const CH3_PIN: PinConfig = PinConfig::alternate(PinId::new(Port::A, 10), 1, Speed::High);

    fn three_channel_config<'a>() -> PwmConfig<'a> {
        PwmConfig {
            timer_clk_hz: 16_000_000,
            frequency_hz: 1000,
            alignment: Alignment::Center1,
            channels: [Some(&CH1_PIN), Some(&CH2_PIN), Some(&CH3_PIN)],
        }
    }

    #[test]
    fn test_timebase_center_aligned() {
        // 16 MHz / (2 * 1 kHz) = 8000 half-period ticks
        assert_eq!(
            compute_timebase(16_000_000, 1000, Alignment::Center1),
            Some((0, 7999))
        );
    }

    #[test]
    fn test_timebase_edge_aligned() {
        // Edge mode traverses the full period once
        assert_eq!(
            compute_timebase(16_000_000, 1000, Alignment::Edge),
            Some((0, 15_999))
        );
    }

    #[test]
    fn test_timebase_needs_prescaler() {
        // 16 MHz / (2 * 100 Hz) = 80000 ticks, beyond 16 bits
        assert_eq!(
            compute_timebase(16_000_000, 100, Alignment::Center1),
            Some((1, 39_999))
        );
    }

    #[test]
    fn test_timebase_rejects_zero_and_too_fast() {
        assert_eq!(compute_timebase(0, 1000, Alignment::Edge), None);
        assert_eq!(compute_timebase(16_000_000, 0, Alignment::Edge), None);
        // Half a tick per period cannot be generated
        assert_eq!(
            compute_timebase(16_000_000, 16_000_000, Alignment::Center1),
            None
        );
    }

    #[test]
    fn test_init_programs_timer() {
        let pwm = PwmGenerator::new(MockTimer::default());
        let gpio = MockGpio::default();
        pwm.init(&gpio, &three_channel_config()).unwrap();

        let timer = pwm.timer();
        assert!(timer.clock_enabled.get());
        assert_eq!(
            timer.timebase.get(),
            Some((0, 7999, Alignment::Center1))
        );
        assert_eq!(timer.channels.get(), Some([true, true, true]));
        assert!(timer.outputs_enabled.get());
        assert_eq!(timer.updates.get(), 1);
        assert_eq!(pwm.reload(), 7999);
        assert_eq!(gpio.configured.borrow().len(), 3);
        // Every compare register starts at zero
        assert_eq!(
            *timer.compares.borrow(),
            vec![
                (PwmChannel::Ch1, 0),
                (PwmChannel::Ch2, 0),
                (PwmChannel::Ch3, 0)
            ]
        );
        // Counter not started by init
        assert!(!timer.running.get());
    }

    #[test]
    fn test_init_with_partial_channels() {
        let pwm = PwmGenerator::new(MockTimer::default());
        let cfg = PwmConfig {
            channels: [None, Some(&CH2_PIN), None],
            ..three_channel_config()
        };
        pwm.init(&MockGpio::default(), &cfg).unwrap();
        assert_eq!(pwm.timer().channels.get(), Some([false, true, false]));
    }

    #[test]
    fn test_init_rejects_no_channels() {
        let pwm = PwmGenerator::new(MockTimer::default());
        let cfg = PwmConfig {
            channels: [None, None, None],
            ..three_channel_config()
        };
        assert_eq!(
            pwm.init(&MockGpio::default(), &cfg),
            Err(PwmError::NoChannels)
        );
    }

    #[test]
    fn test_init_propagates_gpio_failure() {
        let pwm = PwmGenerator::new(MockTimer::default());
        let gpio = MockGpio::default();
        gpio.fail.set(true);
        assert_eq!(
            pwm.init(&gpio, &three_channel_config()),
            Err(PwmError::Gpio(GpioError::InvalidAlternate))
        );
        assert!(!pwm.timer().clock_enabled.get());
    }

    #[test]
    fn test_init_rejects_unachievable_frequency() {
        let pwm = PwmGenerator::new(MockTimer::default());
        let cfg = PwmConfig {
            frequency_hz: 16_000_000,
            ..three_channel_config()
        };
        assert_eq!(
            pwm.init(&MockGpio::default(), &cfg),
            Err(PwmError::Unachievable)
        );
    }

    #[test]
    fn test_set_duty_saturates_at_reload() {
        let pwm = PwmGenerator::new(MockTimer::default());
        pwm.init(&MockGpio::default(), &three_channel_config())
            .unwrap();
        pwm.timer().compares.borrow_mut().clear();

        pwm.set_duty(PwmChannel::Ch1, 4000);
        pwm.set_duty(PwmChannel::Ch2, 60_000);
        assert_eq!(
            *pwm.timer().compares.borrow(),
            vec![(PwmChannel::Ch1, 4000), (PwmChannel::Ch2, 7999)]
        );
    }

    #[test]
    fn test_set_duty_permyriad_scaling() {
        let pwm = PwmGenerator::new(MockTimer::default());
        pwm.init(&MockGpio::default(), &three_channel_config())
            .unwrap();
        pwm.timer().compares.borrow_mut().clear();

        pwm.set_duty_permyriad(PwmChannel::Ch3, 0);
        pwm.set_duty_permyriad(PwmChannel::Ch3, 5000);
        pwm.set_duty_permyriad(PwmChannel::Ch3, 10_000);
        // Over-range clamps to full scale
        pwm.set_duty_permyriad(PwmChannel::Ch3, 12_000);
        assert_eq!(
            *pwm.timer().compares.borrow(),
            vec![
                (PwmChannel::Ch3, 0),
                (PwmChannel::Ch3, 3999),
                (PwmChannel::Ch3, 7999),
                (PwmChannel::Ch3, 7999)
            ]
        );
    }

    #[test]
    fn test_start_and_stop_gate_outputs() {
        let pwm = PwmGenerator::new(MockTimer::default());
        pwm.init(&MockGpio::default(), &three_channel_config())
            .unwrap();

        pwm.start();
        assert!(pwm.timer().running.get());
        assert!(pwm.timer().outputs_enabled.get());

        pwm.stop();
        assert!(!pwm.timer().running.get());
        assert!(!pwm.timer().outputs_enabled.get());
    }
}
