//! Calendar clock and stopwatch driven by the millisecond tick

pub mod calendar;
pub mod format;
pub mod rtc;
pub mod stopwatch;

pub use calendar::{days_in_month, days_per_month, is_leap_year, TimeAndDate};
pub use format::{Date, Lap, TimeOfDay};
pub use rtc::{Clock, TickOutcome, MS_PER_SECOND};
pub use stopwatch::{ElapsedTime, Snapshot, Stopwatch, SubTickCounter};
