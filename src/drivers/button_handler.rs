//! Interrupt-driven button debouncing and inactivity tracking
//!
//! An edge interrupt masks every button source, restarts the hold-off
//! timer and posts the button into a one-entry slot. The hold-off expiry
//! interrupt unmasks the sources again. Bounces inside the window never
//! reach the slot.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use embedded_hal::digital::v2::InputPin;

use crate::config::IDLE_TIMEOUT_PERIODS;
use crate::os::Flag;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Button {
    Up = 1,
    Down = 2,
    Left = 3,
    Right = 4,
    Center = 5,
}

impl Button {
    fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(Button::Up),
            2 => Some(Button::Down),
            3 => Some(Button::Left),
            4 => Some(Button::Right),
            5 => Some(Button::Center),
            _ => None,
        }
    }
}

const SLOT_EMPTY: u8 = 0;

/// Single pending button. Producers are interrupt handlers, which cannot
/// preempt each other; the consumer is the main loop. The producer only
/// writes an empty slot and the consumer only empties a full one, so plain
/// loads and stores are enough.
pub struct ButtonSlot(AtomicU8);

impl ButtonSlot {
    pub const fn new() -> Self {
        Self(AtomicU8::new(SLOT_EMPTY))
    }

    /// Returns false and drops `button` if another one is still pending
    pub fn post(&self, button: Button) -> bool {
        if self.0.load(Ordering::Acquire) != SLOT_EMPTY {
            return false;
        }
        self.0.store(button as u8, Ordering::Release);
        true
    }

    pub fn take(&self) -> Option<Button> {
        let button = Button::from_u8(self.0.load(Ordering::Acquire))?;
        self.0.store(SLOT_EMPTY, Ordering::Release);
        Some(button)
    }
}

impl Default for ButtonSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Register-level operations the debouncer needs
pub trait DebounceHardware {
    /// Mask every button interrupt source
    fn disable_buttons(&mut self);
    /// Clear latched edge flags, then unmask the button sources
    fn enable_buttons(&mut self);
    /// Restart the hold-off countdown from zero
    fn restart_hold_off(&mut self);
}

pub struct Debouncer {
    slot: ButtonSlot,
    enabled: AtomicBool,
    holding: AtomicBool,
}

impl Debouncer {
    pub const fn new() -> Self {
        Self {
            slot: ButtonSlot::new(),
            enabled: AtomicBool::new(true),
            holding: AtomicBool::new(false),
        }
    }

    /// Edge interrupt entry. Returns true if `button` was queued.
    pub fn on_edge<H: DebounceHardware>(&self, button: Button, hw: &mut H) -> bool {
        if !self.enabled.load(Ordering::Acquire) || self.holding.load(Ordering::Acquire) {
            // Flag latched before the mask took effect
            return false;
        }

        hw.disable_buttons();
        hw.restart_hold_off();
        self.holding.store(true, Ordering::Release);

        self.slot.post(button)
    }

    /// Hold-off timer interrupt entry
    pub fn on_hold_off_expired<H: DebounceHardware>(&self, hw: &mut H) {
        self.holding.store(false, Ordering::Release);
        if self.enabled.load(Ordering::Acquire) {
            hw.enable_buttons();
        }
    }

    /// User-level switch behind the `button` command
    pub fn set_enabled<H: DebounceHardware>(&self, enabled: bool, hw: &mut H) {
        self.enabled.store(enabled, Ordering::Release);
        if !enabled {
            hw.disable_buttons();
        } else if !self.holding.load(Ordering::Acquire) {
            hw.enable_buttons();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Main loop side: consume the pending button
    pub fn take_event(&self) -> Option<Button> {
        self.slot.take()
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts hold-off timer overflow periods since the last button press
pub struct IdleTimeout {
    periods: AtomicU8,
    expired: Flag,
}

impl IdleTimeout {
    pub const fn new() -> Self {
        Self {
            periods: AtomicU8::new(0),
            expired: Flag::new(),
        }
    }

    /// Overflow interrupt entry. The expiry is raised once, when the count
    /// reaches the threshold.
    pub fn on_period(&self) {
        let periods = self.periods.load(Ordering::Acquire).saturating_add(1);
        self.periods.store(periods, Ordering::Release);
        if periods == IDLE_TIMEOUT_PERIODS {
            self.expired.raise();
        }
    }

    pub fn reset(&self) {
        self.periods.store(0, Ordering::Release);
    }

    pub fn periods(&self) -> u8 {
        self.periods.load(Ordering::Acquire)
    }

    pub fn take_expired(&self) -> bool {
        self.expired.take()
    }
}

impl Default for IdleTimeout {
    fn default() -> Self {
        Self::new()
    }
}

/// The five active-low button inputs
pub struct ButtonLines<U, D, L, R, C> {
    pub up: U,
    pub down: D,
    pub left: L,
    pub right: R,
    pub center: C,
}

impl<U, D, L, R, C> ButtonLines<U, D, L, R, C>
where
    U: InputPin,
    D: InputPin,
    L: InputPin,
    R: InputPin,
    C: InputPin,
{
    pub fn new(up: U, down: D, left: L, right: R, center: C) -> Self {
        Self { up, down, left, right, center }
    }

    /// Which button is held down. Pin-change interrupts also fire on
    /// release, in which case nothing is low and `None` is returned.
    /// Every line is sampled once per call; the center button wins ties.
    pub fn pressed(&self) -> Option<Button> {
        let up = self.up.is_low().unwrap_or(false);
        let down = self.down.is_low().unwrap_or(false);
        let left = self.left.is_low().unwrap_or(false);
        let right = self.right.is_low().unwrap_or(false);
        let center = self.center.is_low().unwrap_or(false);

        [
            (center, Button::Center),
            (up, Button::Up),
            (down, Button::Down),
            (left, Button::Left),
            (right, Button::Right),
        ]
        .into_iter()
        .find(|(low, _)| *low)
        .map(|(_, button)| button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::pin::{Mock as PinMock, State, Transaction};

    #[derive(Default)]
    struct FakeHardware {
        masked: bool,
        restarts: u8,
    }

    impl DebounceHardware for FakeHardware {
        fn disable_buttons(&mut self) {
            self.masked = true;
        }
        fn enable_buttons(&mut self) {
            self.masked = false;
        }
        fn restart_hold_off(&mut self) {
            self.restarts += 1;
        }
    }

    #[test]
    fn bounce_inside_hold_off_gives_one_event() {
        let debouncer = Debouncer::new();
        let mut hw = FakeHardware::default();

        assert!(debouncer.on_edge(Button::Up, &mut hw));
        assert!(hw.masked);
        assert!(!debouncer.on_edge(Button::Up, &mut hw));
        assert!(!debouncer.on_edge(Button::Down, &mut hw));
        assert_eq!(hw.restarts, 1);

        assert_eq!(debouncer.take_event(), Some(Button::Up));
        assert_eq!(debouncer.take_event(), None);
    }

    #[test]
    fn edge_after_expiry_is_a_new_event() {
        let debouncer = Debouncer::new();
        let mut hw = FakeHardware::default();

        debouncer.on_edge(Button::Left, &mut hw);
        assert_eq!(debouncer.take_event(), Some(Button::Left));

        debouncer.on_hold_off_expired(&mut hw);
        assert!(!hw.masked);

        assert!(debouncer.on_edge(Button::Left, &mut hw));
        assert_eq!(debouncer.take_event(), Some(Button::Left));
    }

    #[test]
    fn unconsumed_event_drops_the_next_one() {
        let debouncer = Debouncer::new();
        let mut hw = FakeHardware::default();

        debouncer.on_edge(Button::Right, &mut hw);
        debouncer.on_hold_off_expired(&mut hw);
        assert!(!debouncer.on_edge(Button::Center, &mut hw));
        assert_eq!(debouncer.take_event(), Some(Button::Right));
        assert_eq!(debouncer.take_event(), None);
    }

    #[test]
    fn disabled_buttons_stay_masked_after_expiry() {
        let debouncer = Debouncer::new();
        let mut hw = FakeHardware::default();

        debouncer.on_edge(Button::Down, &mut hw);
        debouncer.set_enabled(false, &mut hw);
        debouncer.on_hold_off_expired(&mut hw);
        assert!(hw.masked);
        assert!(!debouncer.on_edge(Button::Down, &mut hw));

        debouncer.set_enabled(true, &mut hw);
        assert!(!hw.masked);
        assert_eq!(debouncer.take_event(), Some(Button::Down));
        assert!(debouncer.on_edge(Button::Up, &mut hw));
    }

    #[test]
    fn enabling_during_hold_off_waits_for_expiry() {
        let debouncer = Debouncer::new();
        let mut hw = FakeHardware::default();

        debouncer.on_edge(Button::Down, &mut hw);
        debouncer.set_enabled(true, &mut hw);
        assert!(hw.masked);
    }

    #[test]
    fn idle_timeout_fires_once_at_threshold() {
        let idle = IdleTimeout::new();
        for _ in 1..IDLE_TIMEOUT_PERIODS {
            idle.on_period();
            assert!(!idle.take_expired());
        }
        idle.on_period();
        assert!(idle.take_expired());

        idle.on_period();
        assert!(!idle.take_expired());
    }

    #[test]
    fn idle_reset_restarts_the_count() {
        let idle = IdleTimeout::new();
        for _ in 1..IDLE_TIMEOUT_PERIODS {
            idle.on_period();
        }
        idle.reset();
        assert_eq!(idle.periods(), 0);
        assert!(!idle.take_expired());
        for _ in 0..IDLE_TIMEOUT_PERIODS {
            idle.on_period();
        }
        assert!(idle.take_expired());
    }

    fn line(state: State) -> PinMock {
        PinMock::new(&[Transaction::get(state)])
    }

    fn finish(lines: ButtonLines<PinMock, PinMock, PinMock, PinMock, PinMock>) {
        let ButtonLines { mut up, mut down, mut left, mut right, mut center } = lines;
        for pin in [&mut up, &mut down, &mut left, &mut right, &mut center] {
            pin.done();
        }
    }

    #[test]
    fn decodes_the_low_line() {
        let lines = ButtonLines::new(
            line(State::High),
            line(State::High),
            line(State::Low),
            line(State::High),
            line(State::High),
        );
        assert_eq!(lines.pressed(), Some(Button::Left));
        finish(lines);
    }

    #[test]
    fn release_edge_decodes_to_nothing() {
        let lines = ButtonLines::new(
            line(State::High),
            line(State::High),
            line(State::High),
            line(State::High),
            line(State::High),
        );
        assert_eq!(lines.pressed(), None);
        finish(lines);
    }

    #[test]
    fn center_wins_ties() {
        let lines = ButtonLines::new(
            line(State::Low),
            line(State::High),
            line(State::High),
            line(State::High),
            line(State::Low),
        );
        assert_eq!(lines.pressed(), Some(Button::Center));
        finish(lines);
    }
}
