//! Interrupt numbering, NVIC arming and vector-table provision
//!
//! Plays the part of a device crate: the [`Interrupt`] enum carries the
//! NVIC positions this HAL uses, `__INTERRUPTS` fills the corresponding
//! vector-table slots and `device.x` (installed by `build.rs`) defaults
//! every handler to `DefaultHandler`. Firmware overrides a handler by
//! defining a `#[no_mangle] extern "C"` function of the same name.
//!
//! Only the vectors this peripheral set services are populated; any
//! other device interrupt must stay masked.

use cortex_m::interrupt::InterruptNumber;
use cortex_m::peripheral::NVIC;

/// NVIC interrupt positions used by this HAL (STM32F446 vector layout)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Interrupt {
    /// EXTI line 0
    Exti0 = 6,
    /// EXTI line 1
    Exti1 = 7,
    /// EXTI line 2
    Exti2 = 8,
    /// EXTI line 3
    Exti3 = 9,
    /// EXTI line 4
    Exti4 = 10,
    /// ADC1/2/3 global interrupt
    Adc = 18,
    /// EXTI lines 5..=9
    Exti9_5 = 23,
    /// USART2 global interrupt
    Usart2 = 38,
    /// EXTI lines 10..=15
    Exti15_10 = 40,
}

// SAFETY: the discriminants are the NVIC positions from the STM32F446
// reference manual vector table.
unsafe impl InterruptNumber for Interrupt {
    fn number(self) -> u16 {
        self as u16
    }
}

/// This part implements 4 priority bits, in the high nibble
const PRIORITY_BITS: u8 = 4;

/// Set an interrupt's priority (0 = highest urgency, 15 = lowest)
pub fn set_priority(interrupt: Interrupt, priority: u8) {
    // SAFETY: priority programming does not alias other NVIC state; the
    // seam handles are the only users of these vector positions.
    unsafe {
        let mut nvic = cortex_m::Peripherals::steal().NVIC;
        nvic.set_priority(interrupt, priority << (8 - PRIORITY_BITS));
    }
}

/// Discard any pending request for an interrupt
pub fn clear_pending(interrupt: Interrupt) {
    NVIC::unpend(interrupt);
}

/// Enable an interrupt at the controller
pub fn enable(interrupt: Interrupt) {
    // SAFETY: unmasking is sound here because every handler routed
    // through this HAL forwards to a driver entry point designed for
    // interrupt context.
    unsafe { NVIC::unmask(interrupt) };
}

/// Arm one interrupt: priority, stale-pending clear, enable
pub(crate) fn arm(interrupt: Interrupt, priority: u8) {
    set_priority(interrupt, priority);
    clear_pending(interrupt);
    enable(interrupt);
}

extern "C" {
    fn EXTI0();
    fn EXTI1();
    fn EXTI2();
    fn EXTI3();
    fn EXTI4();
    fn ADC();
    fn EXTI9_5();
    fn USART2();
    fn EXTI15_10();
}

/// One vector-table entry
pub union Vector {
    _handler: unsafe extern "C" fn(),
    _reserved: u32,
}

/// Device interrupt vectors, positions 0..=40
///
/// Unpopulated positions hold zero and must never be unmasked.
#[link_section = ".vector_table.interrupts"]
#[no_mangle]
pub static __INTERRUPTS: [Vector; 41] = [
    Vector { _reserved: 0 }, // 0: WWDG
    Vector { _reserved: 0 }, // 1: PVD
    Vector { _reserved: 0 }, // 2: TAMP_STAMP
    Vector { _reserved: 0 }, // 3: RTC_WKUP
    Vector { _reserved: 0 }, // 4: FLASH
    Vector { _reserved: 0 }, // 5: RCC
    Vector { _handler: EXTI0 },
    Vector { _handler: EXTI1 },
    Vector { _handler: EXTI2 },
    Vector { _handler: EXTI3 },
    Vector { _handler: EXTI4 },
    Vector { _reserved: 0 }, // 11: DMA1_Stream0
    Vector { _reserved: 0 }, // 12: DMA1_Stream1
    Vector { _reserved: 0 }, // 13: DMA1_Stream2
    Vector { _reserved: 0 }, // 14: DMA1_Stream3
    Vector { _reserved: 0 }, // 15: DMA1_Stream4
    Vector { _reserved: 0 }, // 16: DMA1_Stream5
    Vector { _reserved: 0 }, // 17: DMA1_Stream6
    Vector { _handler: ADC },
    Vector { _reserved: 0 }, // 19: CAN1_TX
    Vector { _reserved: 0 }, // 20: CAN1_RX0
    Vector { _reserved: 0 }, // 21: CAN1_RX1
    Vector { _reserved: 0 }, // 22: CAN1_SCE
    Vector { _handler: EXTI9_5 },
    Vector { _reserved: 0 }, // 24: TIM1_BRK_TIM9
    Vector { _reserved: 0 }, // 25: TIM1_UP_TIM10
    Vector { _reserved: 0 }, // 26: TIM1_TRG_COM_TIM11
    Vector { _reserved: 0 }, // 27: TIM1_CC
    Vector { _reserved: 0 }, // 28: TIM2
    Vector { _reserved: 0 }, // 29: TIM3
    Vector { _reserved: 0 }, // 30: TIM4
    Vector { _reserved: 0 }, // 31: I2C1_EV
    Vector { _reserved: 0 }, // 32: I2C1_ER
    Vector { _reserved: 0 }, // 33: I2C2_EV
    Vector { _reserved: 0 }, // 34: I2C2_ER
    Vector { _reserved: 0 }, // 35: SPI1
    Vector { _reserved: 0 }, // 36: SPI2
    Vector { _reserved: 0 }, // 37: USART1
    Vector { _handler: USART2 },
    Vector { _reserved: 0 }, // 39: USART3
    Vector { _handler: EXTI15_10 },
];
