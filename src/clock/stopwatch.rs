//! Elapsed-time measurement on top of the RTC and the Timer0 count

use super::calendar::TimeAndDate;
use super::rtc::{Clock, MS_PER_SECOND};
use crate::config::{SUB_TICK_US, TICK_TOP};

const SUB_TICKS_PER_MS: i32 = TICK_TOP as i32 + 1;
const SECONDS_PER_DAY: i32 = 86_400;

/// Source of the free-running count inside the current millisecond
pub trait SubTickCounter {
    fn sub_tick(&self) -> u8;
}

impl<F: Fn() -> u8> SubTickCounter for F {
    fn sub_tick(&self) -> u8 {
        self()
    }
}

/// Clock state captured at one instant
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub time: TimeAndDate,
    pub millis: u16,
    pub sub_tick: u8,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ElapsedTime {
    pub days: u16,
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub millis: u16,
    pub micros: u16,
}

impl ElapsedTime {
    pub const ZERO: Self = Self {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
        millis: 0,
        micros: 0,
    };

    /// Difference `end - start`, borrowing from or carrying into the next
    /// larger unit. A sub-tick count past TICK_TOP (a millisecond the clock
    /// has not counted yet) carries. Zero if `end` precedes `start`.
    pub fn between(start: &Snapshot, end: &Snapshot) -> Self {
        let sub = end.sub_tick as i32 - start.sub_tick as i32;
        let millis = end.millis as i32 - start.millis as i32 + sub.div_euclid(SUB_TICKS_PER_MS);
        let seconds = end.time.seconds_of_day() as i32 - start.time.seconds_of_day() as i32
            + millis.div_euclid(MS_PER_SECOND as i32);
        let days = end.time.day_number() as i32 - start.time.day_number() as i32
            + seconds.div_euclid(SECONDS_PER_DAY);

        let sub = sub.rem_euclid(SUB_TICKS_PER_MS);
        let millis = millis.rem_euclid(MS_PER_SECOND as i32);
        let seconds = seconds.rem_euclid(SECONDS_PER_DAY);
        if days < 0 {
            return Self::ZERO;
        }

        Self {
            days: days.min(u16::MAX as i32) as u16,
            hours: (seconds / 3600) as u8,
            minutes: (seconds / 60 % 60) as u8,
            seconds: (seconds % 60) as u8,
            millis: millis as u16,
            micros: sub as u16 * SUB_TICK_US,
        }
    }
}

/// One timing session at a time
#[derive(Default)]
pub struct Stopwatch {
    start: Option<Snapshot>,
}

impl Stopwatch {
    pub const fn new() -> Self {
        Self { start: None }
    }

    pub fn is_running(&self) -> bool {
        self.start.is_some()
    }

    /// Starts (or restarts) the session
    pub fn start<S: SubTickCounter>(&mut self, clock: &Clock, counter: &S) {
        self.start = Some(clock.capture(|| counter.sub_tick()));
    }

    /// Ends the session and reports its length; `None` if nothing was running
    pub fn stop<S: SubTickCounter>(&mut self, clock: &Clock, counter: &S) -> Option<ElapsedTime> {
        let start = self.start.take()?;
        let end = clock.capture(|| counter.sub_tick());
        Some(ElapsedTime::between(&start, &end))
    }
}
