use avr_device::atmega32u4::{TC0, TC1};
use embedded_hal::blocking::delay::{DelayMs, DelayUs};

use crate::clock::SubTickCounter;
use crate::config::{CPU_FREQ_HZ, HOLD_OFF_TOP, TICK_TOP};

#[derive(Clone, Copy)]
pub enum Prescaler {
    Stop = 0,
    Direct = 1,
    Div8 = 2,
    Div64 = 3,
    Div256 = 4,
    Div1024 = 5,
}

const WGM01: u8 = 1 << 1;
const OCIE0A: u8 = 1 << 1;
const OCF0A: u8 = 1 << 1;
const TOIE1: u8 = 1 << 0;
const OCIE1A: u8 = 1 << 1;
const OCF1A: u8 = 1 << 1;

/// Timer0 in CTC mode, compare match A once per millisecond
pub struct TickTimer {
    _private: (),
}

impl TickTimer {
    pub fn new() -> Self {
        unsafe {
            let p = TC0::ptr();
            (*p).tccr0a.write(|w| w.bits(WGM01));
            (*p).ocr0a.write(|w| w.bits(TICK_TOP));
            (*p).tcnt0.write(|w| w.bits(0));
            (*p).tccr0b.write(|w| w.bits(Prescaler::Div64 as u8));
            (*p).timsk0.write(|w| w.bits(OCIE0A));
        }
        Self { _private: () }
    }

    /// Counts within the current millisecond, 0..=TICK_TOP
    #[inline]
    pub fn counter() -> u8 {
        unsafe { (*TC0::ptr()).tcnt0.read().bits() }
    }
}

impl SubTickCounter for TickTimer {
    /// May exceed TICK_TOP: with the compare flag still latched the counter
    /// has wrapped but the clock has not counted that millisecond yet.
    /// Must be read with interrupts disabled.
    fn sub_tick(&self) -> u8 {
        let count = Self::counter();
        if unsafe { (*TC0::ptr()).tifr0.read().bits() } & OCF0A != 0 {
            // Re-read: `count` may predate the wrap
            Self::counter() + TICK_TOP + 1
        } else {
            count
        }
    }
}

/// Timer1, free running at Fcpu/1024. Compare A ends the button hold-off;
/// overflow counts inactivity periods.
pub struct HoldOffTimer {
    _private: (),
}

impl HoldOffTimer {
    pub fn new() -> Self {
        unsafe {
            let p = TC1::ptr();
            (*p).tccr1a.write(|w| w.bits(0));
            (*p).ocr1a.write(|w| w.bits(HOLD_OFF_TOP));
            (*p).tcnt1.write(|w| w.bits(0));
            (*p).tccr1b.write(|w| w.bits(Prescaler::Div1024 as u8));
            (*p).timsk1.write(|w| w.bits(TOIE1));
        }
        Self { _private: () }
    }

    pub(crate) const fn handle() -> Self {
        Self { _private: () }
    }

    /// Start a fresh hold-off window and arm its compare interrupt
    pub fn restart(&mut self) {
        unsafe {
            let p = TC1::ptr();
            (*p).tcnt1.write(|w| w.bits(0));
            (*p).tifr1.write(|w| w.bits(OCF1A));
            (*p).timsk1.modify(|r, w| w.bits(r.bits() | OCIE1A));
        }
    }

    /// Hold-off over; leave only the overflow interrupt running
    pub fn disarm(&mut self) {
        unsafe {
            (*TC1::ptr()).timsk1.modify(|r, w| w.bits(r.bits() & !OCIE1A));
        }
    }
}

/// Busy-wait delay calibrated for CPU_FREQ_HZ
pub struct Delay;

// One loop pass is about four cycles including the nop
const LOOPS_PER_US: u32 = CPU_FREQ_HZ / 1_000_000 / 4;

impl DelayUs<u16> for Delay {
    fn delay_us(&mut self, us: u16) {
        for _ in 0..us as u32 * LOOPS_PER_US {
            avr_device::asm::nop();
        }
    }
}

impl DelayMs<u16> for Delay {
    fn delay_ms(&mut self, ms: u16) {
        for _ in 0..ms {
            self.delay_us(1000);
        }
    }
}
