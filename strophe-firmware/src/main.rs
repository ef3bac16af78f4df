//! Strophe - motor drive bring-up firmware for the NUCLEO-F446RE
//!
//! Interrupt-driven peripheral exercise loop: the user button steps the
//! PWM duty on all three power-stage channels, the ADC samples the
//! analog input on a fixed cadence, and USART2 carries a status feed
//! plus a byte echo. The loop itself only ever consumes flags and ring
//! buffers; all I/O happens in interrupt context.

#![no_std]
#![no_main]

use core::fmt::Write as _;
use core::sync::atomic::Ordering;

use cortex_m::asm;
use cortex_m_rt::entry;
use defmt::info;
use embedded_hal::digital::InputPin;
use heapless::String;
use {defmt_rtt as _, panic_probe as _};

use strophe_core::time::elapsed_ms;
use strophe_drivers::pwm::DUTY_FULL_PERMYRIAD;
use strophe_hal::pwm::PwmChannel;

mod board;
mod irq;

/// ADC sampling cadence
const ADC_SAMPLE_INTERVAL_MS: u32 = 100;
/// Duty step per button press, in permyriad (20 %)
const DUTY_STEP_PERMYRIAD: u16 = 2000;

#[entry]
fn main() -> ! {
    info!("strophe firmware starting");

    let mut board = board::init();
    board::PWM.start();
    info!(
        "board up: sysclk {} Hz, tick {} us, serial {} baud",
        board::SYSCLK_HZ,
        board::TICK_PERIOD_US,
        board::BAUDRATE
    );

    let mut duty_permyriad: u16 = 0;
    let mut last_sample_ms = board::TICK.now_ms();
    let mut line: String<64> = String::new();
    let mut echo = [0u8; 32];

    board::ADC.start();

    loop {
        // Button presses step the drive duty; require the pin to still
        // read low so contact bounce on release is ignored
        if board::BUTTON_PRESSED.swap(false, Ordering::Relaxed)
            && matches!(board.button.is_low(), Ok(true))
        {
            duty_permyriad = if duty_permyriad >= DUTY_FULL_PERMYRIAD {
                0
            } else {
                duty_permyriad + DUTY_STEP_PERMYRIAD
            };
            board::PWM.set_duty_permyriad(PwmChannel::Ch1, duty_permyriad);
            board::PWM.set_duty_permyriad(PwmChannel::Ch2, duty_permyriad);
            board::PWM.set_duty_permyriad(PwmChannel::Ch3, duty_permyriad);
            info!("button: duty {} permyriad", duty_permyriad);

            line.clear();
            let _ = write!(line, "duty={}\r\n", duty_permyriad);
            board::SERIAL.write(line.as_bytes());
        }

        let now_ms = board::TICK.now_ms();
        if elapsed_ms(now_ms, last_sample_ms) >= ADC_SAMPLE_INTERVAL_MS {
            last_sample_ms = now_ms;
            if let Some(sample) = board::ADC.read() {
                line.clear();
                let _ = write!(line, "adc={}\r\n", sample);
                board::SERIAL.write(line.as_bytes());
            }
            board::ADC.start();
        }

        // Echo whatever arrived on the serial link
        let received = board::SERIAL.read(&mut echo);
        if received > 0 {
            board::SERIAL.write(&echo[..received]);
        }

        // Sleep until the next interrupt (tick, serial or button)
        asm::wfi();
    }
}
