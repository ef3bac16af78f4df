//! External interrupt line router
//!
//! Maps the sixteen hardware lines to registered callbacks and resolves
//! pending lines to callback invocations from the shared-vector interrupt
//! handlers. One handler per line, last registration wins; lines with no
//! handler are acknowledged and skipped.

use core::cell::Cell;

use critical_section::Mutex;

use strophe_hal::exti::{Edge, ExtiLines, LineGroup, LINE_COUNT};
use strophe_hal::gpio::{GpioError, GpioPins, PinConfig, PinMode};

/// A registered line handler: any invokable bound to its captured state
pub type LineHandler = &'static (dyn Fn() + Sync);

/// Errors from line registration and configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExtiError {
    /// Line index outside 0..=15
    InvalidLine,
    /// The source pin is not configured as an input
    PinNotInput,
    /// Pin configuration failed
    Gpio(GpioError),
}

/// Line-to-callback dispatcher over the external interrupt controller
///
/// The handler table is written by [`ExtiRouter::register`] (expected at
/// init time, before lines are unmasked) and read by
/// [`ExtiRouter::dispatch`] in interrupt context. A slot is one word
/// swapped under a critical section; the byte-transport hot path is not
/// involved and stays lock-free.
pub struct ExtiRouter<E: ExtiLines> {
    lines: E,
    handlers: [Mutex<Cell<Option<LineHandler>>>; LINE_COUNT],
}

impl<E: ExtiLines> ExtiRouter<E> {
    /// Create a router with no registered handlers
    pub const fn new(lines: E) -> Self {
        const SLOT: Mutex<Cell<Option<LineHandler>>> = Mutex::new(Cell::new(None));
        Self {
            lines,
            handlers: [SLOT; LINE_COUNT],
        }
    }

    /// Access the underlying line controller seam
    pub fn lines(&self) -> &E {
        &self.lines
    }

    /// Register a handler for a line, replacing any previous one
    pub fn register(&self, line: u8, handler: LineHandler) -> Result<(), ExtiError> {
        let slot = self
            .handlers
            .get(line as usize)
            .ok_or(ExtiError::InvalidLine)?;
        critical_section::with(|cs| slot.borrow(cs).set(Some(handler)));
        Ok(())
    }

    /// Configure and arm the line driven by the given input pin
    ///
    /// The line index equals the pin index; the pin's port is routed to
    /// the line, the trigger edge set, any stale pending flag cleared,
    /// and the vector group's interrupt enabled at `priority`.
    pub fn configure_line<G: GpioPins>(
        &self,
        gpio: &G,
        pin: &PinConfig,
        edge: Edge,
        priority: u8,
    ) -> Result<(), ExtiError> {
        if pin.mode != PinMode::Input {
            return Err(ExtiError::PinNotInput);
        }
        gpio.configure(pin).map_err(ExtiError::Gpio)?;

        let line = pin.pin.index;
        let group = LineGroup::for_line(line).ok_or(ExtiError::InvalidLine)?;

        self.lines.select_source(line, pin.pin.port);
        self.lines.mask(line);
        self.lines.set_trigger(line, edge);
        self.lines.clear_pending(line);
        self.lines.unmask(line);
        self.lines.enable_vector(group, priority);
        Ok(())
    }

    /// Service all pending lines of one vector group
    ///
    /// Reads the pending flags once, then walks the group in ascending
    /// line order: acknowledge first, then invoke the registered handler,
    /// so a re-trigger during the handler is not lost. Called from the
    /// group's interrupt handler.
    pub fn dispatch(&self, group: LineGroup) {
        let pending = self.lines.pending();
        for line in group.first()..=group.last() {
            if pending & (1 << line) != 0 {
                self.lines.clear_pending(line);
                let handler =
                    critical_section::with(|cs| self.handlers[line as usize].borrow(cs).get());
                if let Some(handler) = handler {
                    handler();
                }
            }
        }
    }
}
