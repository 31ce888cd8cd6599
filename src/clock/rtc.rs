//! Software real-time clock advanced by the 1 kHz tick interrupt
//!
//! The tick handler is the only writer of the time fields. Every access
//! runs inside a critical section so mainline readers never observe a
//! half-updated date or a torn 16-bit millisecond counter.

use core::cell::Cell;
use critical_section::Mutex;

use super::calendar::{days_in_month, TimeAndDate};
use super::stopwatch::Snapshot;

/// Milliseconds per second; the counter resets when it reaches this value
pub const MS_PER_SECOND: u16 = 1000;

/// What one call to [`Clock::advance_one_millisecond`] did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickOutcome {
    /// Millisecond counter after the increment, before any reset (1..=1000)
    pub count: u16,
    /// The counter wrapped and the time advanced by one second
    pub second_elapsed: bool,
}

pub struct Clock {
    time: Mutex<Cell<TimeAndDate>>,
    millis: Mutex<Cell<u16>>,
}

impl Clock {
    pub const fn new() -> Self {
        Self::with_time(TimeAndDate::RESET)
    }

    pub const fn with_time(time: TimeAndDate) -> Self {
        Self {
            time: Mutex::new(Cell::new(time)),
            millis: Mutex::new(Cell::new(0)),
        }
    }

    /// Consistent copy of the current time and date
    pub fn get_time(&self) -> TimeAndDate {
        critical_section::with(|cs| self.time.borrow(cs).get())
    }

    /// Commits every field of `candidate` that is in range and silently
    /// keeps the stored value for the others. The day is checked against
    /// the month stored after this call's month and year were applied.
    /// Returns the time as committed, read in the same critical section.
    pub fn set_time(&self, candidate: TimeAndDate) -> TimeAndDate {
        critical_section::with(|cs| {
            let cell = self.time.borrow(cs);
            let mut time = cell.get();

            if candidate.hour < 24 {
                time.hour = candidate.hour;
            }
            if candidate.min < 60 {
                time.min = candidate.min;
            }
            if candidate.sec < 60 {
                time.sec = candidate.sec;
            }
            if (1..=12).contains(&candidate.month) {
                time.month = candidate.month;
            }
            if (1..=7).contains(&candidate.dow) {
                time.dow = candidate.dow;
            }
            if candidate.year != 0 {
                time.year = candidate.year;
            }

            let days = days_in_month(time.month, time.year);
            if candidate.day >= 1 && candidate.day <= days {
                time.day = candidate.day;
            }

            cell.set(time);
            time
        })
    }

    /// Called from the tick interrupt only
    pub fn advance_one_millisecond(&self) -> TickOutcome {
        critical_section::with(|cs| {
            let millis = self.millis.borrow(cs);
            let count = millis.get() + 1;

            if count < MS_PER_SECOND {
                millis.set(count);
                return TickOutcome { count, second_elapsed: false };
            }

            millis.set(0);
            let cell = self.time.borrow(cs);
            let mut time = cell.get();
            advance_one_second(&mut time);
            cell.set(time);

            TickOutcome { count, second_elapsed: true }
        })
    }

    /// Reads time, millisecond counter and the hardware sub-tick counter
    /// as one unit
    pub fn capture<F: FnOnce() -> u8>(&self, sub_tick: F) -> Snapshot {
        critical_section::with(|cs| Snapshot {
            time: self.time.borrow(cs).get(),
            millis: self.millis.borrow(cs).get(),
            sub_tick: sub_tick(),
        })
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

fn advance_one_second(time: &mut TimeAndDate) {
    time.sec += 1;
    if time.sec < 60 {
        return;
    }
    time.sec = 0;

    time.min += 1;
    if time.min < 60 {
        return;
    }
    time.min = 0;

    time.hour += 1;
    if time.hour < 24 {
        return;
    }
    time.hour = 0;

    time.dow = if time.dow >= 7 { 1 } else { time.dow + 1 };
    time.day += 1;
    if time.day <= days_in_month(time.month, time.year) {
        return;
    }
    time.day = 1;

    time.month += 1;
    if time.month <= 12 {
        return;
    }
    time.month = 1;
    time.year = time.year.wrapping_add(1);
}
