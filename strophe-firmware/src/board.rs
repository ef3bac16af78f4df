//! Board configuration and driver singletons for the NUCLEO-F446RE
//!
//! Pin mapping:
//! - PA5  user LED
//! - PC13 user button (EXTI line 13, falling edge)
//! - PA0  analog input, ADC1 channel 0
//! - PA2/PA3 USART2 TX/RX (AF7), the ST-LINK virtual COM port
//! - PA8/PA9/PA10 TIM1 channels 1..=3 (AF1), the power-stage PWM
//!
//! The board runs from the 16 MHz internal oscillator with a 1 ms tick.

use core::sync::atomic::{AtomicBool, Ordering};

use strophe_drivers::adc::{AdcConfig, AdcReader};
use strophe_drivers::exti::ExtiRouter;
use strophe_drivers::pwm::{PwmConfig, PwmGenerator};
use strophe_drivers::serial::{SerialConfig, SerialTransport};
use strophe_drivers::tick::{TickClock, TickConfig};
use strophe_hal::adc::{ConversionMode, Resolution, SampleTime};
use strophe_hal::exti::Edge;
use strophe_hal::gpio::{GpioPins, PinConfig, PinId, Port, Pull, Speed};
use strophe_hal::pwm::Alignment;
use strophe_hal_stm32f446::{
    Adc1, DigitalInput, ExtiController, Stm32Gpio, SysTickTimer, Tim1Pwm, Usart2,
};

use embedded_hal::digital::OutputPin;

pub const SYSCLK_HZ: u32 = 16_000_000;
pub const APB1_CLK_HZ: u32 = 16_000_000;
pub const BAUDRATE: u32 = 115_200;
pub const TICK_PERIOD_US: u32 = 1000;

/// User LED (PA5)
pub const LED: PinConfig = PinConfig::output(PinId::new(Port::A, 5));
/// User push-button (PC13)
pub const USER_BUTTON: PinConfig = PinConfig::input(PinId::new(Port::C, 13), Pull::Up);
/// Analog input (PA0 / ADC1_IN0)
const ADC_IN0: PinConfig = PinConfig::analog(PinId::new(Port::A, 0));
/// USART2 TX (PA2, AF7)
const SERIAL_TX: PinConfig = PinConfig::alternate(PinId::new(Port::A, 2), 7, Speed::High);
/// USART2 RX (PA3, AF7)
const SERIAL_RX: PinConfig = PinConfig::alternate(PinId::new(Port::A, 3), 7, Speed::High);
/// TIM1 CH1..=CH3 (PA8..=PA10, AF1)
const PWM_CH1: PinConfig = PinConfig::alternate(PinId::new(Port::A, 8), 1, Speed::High);
const PWM_CH2: PinConfig = PinConfig::alternate(PinId::new(Port::A, 9), 1, Speed::High);
const PWM_CH3: PinConfig = PinConfig::alternate(PinId::new(Port::A, 10), 1, Speed::High);

const TICK_CONFIG: TickConfig = TickConfig {
    clock_hz: SYSCLK_HZ,
    tick_period_us: TICK_PERIOD_US,
    irq_priority: 4,
};

const ADC_CONFIG: AdcConfig<'static> = AdcConfig {
    channel: 0,
    mode: ConversionMode::Single,
    resolution: Resolution::Bits12,
    sample_time: SampleTime::Cycles84,
    irq_priority: 5,
    pin: &ADC_IN0,
};

const SERIAL_CONFIG: SerialConfig<'static> = SerialConfig {
    pclk_hz: APB1_CLK_HZ,
    baud: BAUDRATE,
    irq_priority: 6,
    rx_pin: &SERIAL_RX,
    tx_pin: &SERIAL_TX,
};

const PWM_CONFIG: PwmConfig<'static> = PwmConfig {
    timer_clk_hz: SYSCLK_HZ,
    frequency_hz: 1000,
    alignment: Alignment::Center1,
    channels: [Some(&PWM_CH1), Some(&PWM_CH2), Some(&PWM_CH3)],
};

// Driver singletons, shared with the interrupt handlers in `irq`
pub static GPIO: Stm32Gpio = Stm32Gpio::new();
pub static TICK: TickClock<SysTickTimer> = TickClock::new(SysTickTimer::new());
pub static ROUTER: ExtiRouter<ExtiController> = ExtiRouter::new(ExtiController::new());
pub static SERIAL: SerialTransport<Usart2, 256> = SerialTransport::new(Usart2::new());
pub static ADC: AdcReader<Adc1> = AdcReader::new(Adc1::new());
pub static PWM: PwmGenerator<Tim1Pwm> = PwmGenerator::new(Tim1Pwm::new());

/// Raised by the button callback, consumed by the main loop
pub static BUTTON_PRESSED: AtomicBool = AtomicBool::new(false);

/// Pins the application polls directly
pub struct Board {
    pub button: DigitalInput,
}

/// Button callback: immediate LED feedback plus a flag for the task loop
fn on_button_press() {
    GPIO.toggle(LED.pin);
    BUTTON_PRESSED.store(true, Ordering::Relaxed);
}

/// Bring up every peripheral in dependency order
pub fn init() -> Board {
    let mut led = defmt::unwrap!(GPIO.configure_output(&LED));
    let _ = led.set_low();
    let button = defmt::unwrap!(GPIO.configure_input(&USER_BUTTON));

    defmt::unwrap!(ROUTER.register(USER_BUTTON.pin.index, &on_button_press));
    defmt::unwrap!(ROUTER.configure_line(&GPIO, &USER_BUTTON, Edge::Falling, 6));

    defmt::unwrap!(ADC.init(&GPIO, &ADC_CONFIG));
    defmt::unwrap!(SERIAL.init(&GPIO, &SERIAL_CONFIG));
    defmt::unwrap!(PWM.init(&GPIO, &PWM_CONFIG));
    defmt::unwrap!(TICK.start(&TICK_CONFIG));

    Board { button }
}
