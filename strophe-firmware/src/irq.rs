//! Interrupt handler bindings (vector table targets)
//!
//! Each handler forwards the event to its driver-level entry point. The
//! `extern "C"` names override the `DefaultHandler` fallbacks provided
//! by the chip crate's `device.x`.

use cortex_m_rt::exception;

use strophe_hal::exti::LineGroup;

use crate::board;

#[exception]
fn SysTick() {
    board::TICK.on_tick();
}

#[no_mangle]
extern "C" fn EXTI0() {
    board::ROUTER.dispatch(LineGroup::Line0);
}

#[no_mangle]
extern "C" fn EXTI1() {
    board::ROUTER.dispatch(LineGroup::Line1);
}

#[no_mangle]
extern "C" fn EXTI2() {
    board::ROUTER.dispatch(LineGroup::Line2);
}

#[no_mangle]
extern "C" fn EXTI3() {
    board::ROUTER.dispatch(LineGroup::Line3);
}

#[no_mangle]
extern "C" fn EXTI4() {
    board::ROUTER.dispatch(LineGroup::Line4);
}

#[no_mangle]
extern "C" fn EXTI9_5() {
    board::ROUTER.dispatch(LineGroup::Lines5To9);
}

#[no_mangle]
extern "C" fn EXTI15_10() {
    board::ROUTER.dispatch(LineGroup::Lines10To15);
}

#[no_mangle]
extern "C" fn ADC() {
    board::ADC.on_interrupt();
}

#[no_mangle]
extern "C" fn USART2() {
    board::SERIAL.on_interrupt();
}
