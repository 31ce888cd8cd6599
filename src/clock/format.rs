//! Fixed-width text for times, dates and stopwatch readings

use ufmt::{uDisplay, uWrite, Formatter};

use super::calendar::TimeAndDate;
use super::stopwatch::ElapsedTime;

/// Writes `value` in decimal, zero-padded to at least `width` digits
pub fn write_padded<W: uWrite + ?Sized>(
    f: &mut Formatter<'_, W>,
    value: u32,
    width: usize,
) -> Result<(), W::Error> {
    let mut digits = [b'0'; 10];
    let mut len = 0;
    let mut rest = value;
    loop {
        digits[len] = b'0' + (rest % 10) as u8;
        len += 1;
        rest /= 10;
        if rest == 0 {
            break;
        }
    }
    for _ in len..width {
        f.write_char('0')?;
    }
    for &digit in digits[..len].iter().rev() {
        f.write_char(digit as char)?;
    }
    Ok(())
}

/// `HH:MM:SS`
pub struct TimeOfDay<'a>(pub &'a TimeAndDate);

impl uDisplay for TimeOfDay<'_> {
    fn fmt<W: uWrite + ?Sized>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error> {
        write_padded(f, self.0.hour as u32, 2)?;
        f.write_char(':')?;
        write_padded(f, self.0.min as u32, 2)?;
        f.write_char(':')?;
        write_padded(f, self.0.sec as u32, 2)
    }
}

/// `MM/DD/YYYY`
pub struct Date<'a>(pub &'a TimeAndDate);

impl uDisplay for Date<'_> {
    fn fmt<W: uWrite + ?Sized>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error> {
        write_padded(f, self.0.month as u32, 2)?;
        f.write_char('/')?;
        write_padded(f, self.0.day as u32, 2)?;
        f.write_char('/')?;
        write_padded(f, self.0.year as u32, 4)
    }
}

/// `MM/DD/YYYY HH:MM:SS`, the console's time format
impl uDisplay for TimeAndDate {
    fn fmt<W: uWrite + ?Sized>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error> {
        Date(self).fmt(f)?;
        f.write_char(' ')?;
        TimeOfDay(self).fmt(f)
    }
}

/// `HH:MM:SS.mmm` with days folded into the hours
pub struct Lap<'a>(pub &'a ElapsedTime);

impl uDisplay for Lap<'_> {
    fn fmt<W: uWrite + ?Sized>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error> {
        let e = self.0;
        write_padded(f, e.days as u32 * 24 + e.hours as u32, 2)?;
        f.write_char(':')?;
        write_padded(f, e.minutes as u32, 2)?;
        f.write_char(':')?;
        write_padded(f, e.seconds as u32, 2)?;
        f.write_char('.')?;
        write_padded(f, e.millis as u32, 3)
    }
}

/// `D days HH:MM:SS.mmm UUU us`
impl uDisplay for ElapsedTime {
    fn fmt<W: uWrite + ?Sized>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error> {
        ufmt::uwrite!(f, "{} days ", self.days)?;
        let within_day = ElapsedTime { days: 0, ..*self };
        Lap(&within_day).fmt(f)?;
        f.write_char(' ')?;
        write_padded(f, self.micros as u32, 3)?;
        f.write_str(" us")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::String;

    fn text<T: uDisplay>(value: T) -> String<40> {
        let mut s = String::new();
        ufmt::uwrite!(s, "{}", value).unwrap();
        s
    }

    #[test]
    fn time_and_date_are_zero_padded() {
        let t = TimeAndDate::new(2024, 2, 9, 5, 7, 3, 0);
        assert_eq!(text(TimeOfDay(&t)).as_str(), "07:03:00");
        assert_eq!(text(Date(&t)).as_str(), "02/09/2024");
        assert_eq!(text(t).as_str(), "02/09/2024 07:03:00");
    }

    #[test]
    fn elapsed_time_text() {
        let e = ElapsedTime { days: 1, hours: 2, minutes: 3, seconds: 4, millis: 56, micros: 8 };
        assert_eq!(text(Lap(&e)).as_str(), "26:03:04.056");
        assert_eq!(text(e).as_str(), "1 days 02:03:04.056 008 us");
    }

    #[test]
    fn wide_values_are_not_truncated() {
        let e = ElapsedTime { days: 5, ..ElapsedTime::ZERO };
        assert_eq!(text(Lap(&e)).as_str(), "120:00:00.000");
    }
}
