//! Calendar arithmetic and the time-and-date record kept by the RTC

/// Wall-clock time as maintained by the tick interrupt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeAndDate {
    pub year: u16,
    /// 1-12
    pub month: u8,
    /// 1-31, bounded by the month
    pub day: u8,
    /// Day of the week, 1-7
    pub dow: u8,
    /// 0-23
    pub hour: u8,
    /// 0-59
    pub min: u8,
    /// 0-59
    pub sec: u8,
}

impl TimeAndDate {
    /// Power-on value of the clock
    pub const RESET: Self = Self {
        year: 2013,
        month: 1,
        day: 1,
        dow: 1,
        hour: 0,
        min: 0,
        sec: 0,
    };

    pub const fn new(year: u16, month: u8, day: u8, dow: u8, hour: u8, min: u8, sec: u8) -> Self {
        Self { year, month, day, dow, hour, min, sec }
    }

    /// Seconds since midnight
    pub fn seconds_of_day(&self) -> u32 {
        self.hour as u32 * 3600 + self.min as u32 * 60 + self.sec as u32
    }

    /// Days elapsed since 0001-01-01, counted with the same month table the
    /// clock rolls over with. Only meaningful for differences; out-of-range
    /// months count as January.
    pub fn day_number(&self) -> u32 {
        let year = self.year.max(1) as u32 - 1;
        // 365 = sum of days_per_month over a common year
        let mut days = year * 365 + year / 4 - year / 100 + year / 400;
        for month in 1..self.month.min(13) {
            days += days_in_month(month, self.year) as u32;
        }
        days + self.day.saturating_sub(1) as u32
    }
}

impl Default for TimeAndDate {
    fn default() -> Self {
        Self::RESET
    }
}

/// Returns true if `year` is a Gregorian leap year
pub fn is_leap_year(year: u16) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Number of days in `month` from the board's month table. February is
/// always 28 here; callers correct for leap years. Out-of-range months give 0.
pub fn days_per_month(month: u8) -> u8 {
    match month {
        2 => 28,
        4 | 6 | 9 | 12 => 30,
        1..=12 => 31,
        _ => 0,
    }
}

/// `days_per_month` with February resolved for `year`
pub fn days_in_month(month: u8, year: u16) -> u8 {
    if month == 2 && is_leap_year(year) {
        29
    } else {
        days_per_month(month)
    }
}
