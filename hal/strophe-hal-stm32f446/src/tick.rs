//! SysTick as the periodic tick source
//!
//! The counter and reload registers go through `cortex-m`'s SYST
//! wrapper; the exception priority is programmed via the system handler
//! priority registers in the SCB.

use cortex_m::peripheral::scb::SystemHandler;
use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::SYST;

use strophe_hal::tick::TickTimer;

/// This part implements 4 priority bits, in the high nibble
const PRIORITY_BITS: u8 = 4;

/// The Cortex-M system timer
pub struct SysTickTimer {
    _private: (),
}

impl SysTickTimer {
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl Default for SysTickTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl TickTimer for SysTickTimer {
    fn configure(&self, reload: u32, irq_priority: u8) {
        // SAFETY: this seam is the only SysTick user; the firmware layer
        // creates a single tick driver over it.
        let mut peripherals = unsafe { cortex_m::Peripherals::steal() };
        let syst = &mut peripherals.SYST;

        syst.disable_counter();
        syst.disable_interrupt();
        syst.set_clock_source(SystClkSource::Core);
        syst.set_reload(reload);
        syst.clear_current();

        // SAFETY: priority programming only; no mask/unmask side effects.
        unsafe {
            peripherals
                .SCB
                .set_priority(SystemHandler::SysTick, irq_priority << (8 - PRIORITY_BITS));
        }

        let syst = &mut peripherals.SYST;
        syst.enable_interrupt();
        syst.enable_counter();
    }

    fn counter(&self) -> u32 {
        SYST::get_current()
    }
}
