//! In-place editing of `HH:MM:SS` on the second LCD row
//!
//! The digits on screen are the editing state: every adjustment reads the
//! two-digit group back from display RAM, changes it and rewrites it.

use heapless::String;

use crate::clock::{Clock, TimeAndDate, TimeOfDay};
use crate::drivers::lcd::{address_of, write_line, Display};

/// Display columns of the six editable digits; 3 and 6 hold the separators
const DIGIT_COLUMNS: [u8; 6] = [1, 2, 4, 5, 7, 8];
const EDIT_ROW: u8 = 1;
/// Cursor starts on the hour units
const START_INDEX: usize = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Hour,
    Minute,
    Second,
}

impl Field {
    fn from_index(index: usize) -> Self {
        match index / 2 {
            0 => Field::Hour,
            1 => Field::Minute,
            _ => Field::Second,
        }
    }

    fn modulus(self) -> u8 {
        match self {
            Field::Hour => 24,
            Field::Minute | Field::Second => 60,
        }
    }

    /// Display address of the tens digit
    fn address(self) -> u8 {
        let tens_column = DIGIT_COLUMNS[self as usize * 2];
        address_of(tens_column, EDIT_ROW)
    }
}

pub struct TimeEditor {
    index: usize,
}

impl TimeEditor {
    pub const fn new() -> Self {
        Self { index: START_INDEX }
    }

    pub fn field(&self) -> Field {
        Field::from_index(self.index)
    }

    pub fn is_on_tens(&self) -> bool {
        self.index % 2 == 0
    }

    pub fn cursor_address(&self) -> u8 {
        address_of(DIGIT_COLUMNS[self.index], EDIT_ROW)
    }

    /// Draws the editor with the current time and shows the cursor
    pub fn begin<D: Display>(&mut self, display: &mut D, clock: &Clock) {
        let now = clock.get_time();
        let mut row: String<16> = String::new();
        // Capacity is enough for " HH:MM:SS"
        let _ = ufmt::uwrite!(row, " {}", TimeOfDay(&now));

        display.clear();
        write_line(display, 0, "Set Time");
        write_line(display, EDIT_ROW, row.as_str());

        self.index = START_INDEX;
        self.place_cursor(display);
        display.show_cursor(true);
    }

    pub fn move_left<D: Display>(&mut self, display: &mut D) {
        self.index = (self.index + DIGIT_COLUMNS.len() - 1) % DIGIT_COLUMNS.len();
        self.place_cursor(display);
    }

    pub fn move_right<D: Display>(&mut self, display: &mut D) {
        self.index = (self.index + 1) % DIGIT_COLUMNS.len();
        self.place_cursor(display);
    }

    /// Steps the group under the cursor by 10 (tens digit) or 1 (units
    /// digit), wrapping modulo 24 or 60. Hours step non-uniformly on the
    /// tens digit: 15 + 10 wraps to 01.
    pub fn adjust<D: Display>(&mut self, display: &mut D, up: bool) {
        let field = self.field();
        let modulus = field.modulus();
        let step = if self.is_on_tens() { 10 } else { 1 };
        let value = read_group(display, field.address()) % modulus;

        let value = if up {
            (value + step) % modulus
        } else {
            (value + modulus - step) % modulus
        };

        let digits = [b'0' + value / 10, b'0' + value % 10];
        if let Ok(text) = core::str::from_utf8(&digits) {
            display.write_at(field.address(), text);
        }
        self.place_cursor(display);
    }

    /// Current hour, minute and second as shown on the display
    pub fn shown<D: Display>(&self, display: &D) -> (u8, u8, u8) {
        (
            read_group(display, Field::Hour.address()),
            read_group(display, Field::Minute.address()),
            read_group(display, Field::Second.address()),
        )
    }

    /// Writes the displayed time into the clock. Date fields are sent as
    /// zero so the clock rejects them and keeps its own date.
    pub fn commit<D: Display>(&mut self, display: &mut D, clock: &Clock) {
        let (hour, min, sec) = self.shown(display);
        clock.set_time(TimeAndDate::new(0, 0, 0, 0, hour, min, sec));
        display.show_cursor(false);
    }

    pub fn cancel<D: Display>(&mut self, display: &mut D) {
        display.show_cursor(false);
    }

    fn place_cursor<D: Display>(&self, display: &mut D) {
        let col = DIGIT_COLUMNS[self.index];
        display.goto(col, EDIT_ROW);
    }
}

impl Default for TimeEditor {
    fn default() -> Self {
        Self::new()
    }
}

fn digit(byte: u8) -> u8 {
    if byte.is_ascii_digit() {
        byte - b'0'
    } else {
        0
    }
}

fn read_group<D: Display>(display: &D, address: u8) -> u8 {
    digit(display.read_char_at(address)) * 10 + digit(display.read_char_at(address + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::tests::FakeDisplay;

    fn editor_at(time: TimeAndDate) -> (TimeEditor, FakeDisplay, Clock) {
        let clock = Clock::with_time(time);
        let mut display = FakeDisplay::default();
        let mut editor = TimeEditor::new();
        editor.begin(&mut display, &clock);
        (editor, display, clock)
    }

    #[test]
    fn begin_draws_the_current_time() {
        let (editor, display, _) = editor_at(TimeAndDate::new(2023, 1, 1, 1, 9, 45, 30));
        assert_eq!(display.row(0).trim_end(), "Set Time");
        assert_eq!(display.row(1).trim_end(), " 09:45:30");
        assert!(display.cursor_visible);
        assert_eq!(display.cursor, editor.cursor_address());
        assert_eq!(editor.field(), Field::Hour);
        assert_eq!(display.cursor, 0x42);
    }

    #[test]
    fn cursor_skips_separators_and_wraps() {
        let (mut editor, mut display, _) = editor_at(TimeAndDate::RESET);
        let mut columns = [0u8; 7];
        for slot in columns.iter_mut() {
            editor.move_right(&mut display);
            *slot = display.cursor - 0x40;
        }
        assert_eq!(columns, [4, 5, 7, 8, 1, 2, 4]);

        editor.move_left(&mut display);
        editor.move_left(&mut display);
        assert_eq!(display.cursor, 0x41);
        editor.move_left(&mut display);
        assert_eq!(display.cursor, 0x48);
    }

    #[test]
    fn units_wrap_within_the_field() {
        let (mut editor, mut display, _) = editor_at(TimeAndDate::new(2023, 1, 1, 1, 23, 59, 0));
        editor.adjust(&mut display, true);
        assert_eq!(editor.shown(&display), (0, 59, 0));
        editor.adjust(&mut display, false);
        assert_eq!(editor.shown(&display), (23, 59, 0));

        editor.move_right(&mut display);
        editor.move_right(&mut display);
        editor.adjust(&mut display, true);
        assert_eq!(editor.shown(&display), (23, 0, 0));
        assert_eq!(display.cursor, 0x45);
    }

    #[test]
    fn hour_tens_wraps_modulo_24() {
        let (mut editor, mut display, _) = editor_at(TimeAndDate::new(2023, 1, 1, 1, 15, 0, 0));
        editor.move_left(&mut display);
        assert!(editor.is_on_tens());

        editor.adjust(&mut display, true);
        assert_eq!(editor.shown(&display).0, 1);
        editor.adjust(&mut display, false);
        assert_eq!(editor.shown(&display).0, 15);
        editor.adjust(&mut display, false);
        editor.adjust(&mut display, false);
        assert_eq!(editor.shown(&display).0, 19);
    }

    #[test]
    fn minute_tens_wraps_modulo_60() {
        let (mut editor, mut display, _) = editor_at(TimeAndDate::new(2023, 1, 1, 1, 0, 52, 0));
        editor.move_right(&mut display);
        editor.adjust(&mut display, true);
        assert_eq!(editor.shown(&display).1, 2);
        editor.adjust(&mut display, false);
        assert_eq!(editor.shown(&display).1, 52);
    }

    #[test]
    fn commit_sets_only_the_time_of_day() {
        let start = TimeAndDate::new(2024, 2, 29, 4, 10, 20, 30);
        let (mut editor, mut display, clock) = editor_at(start);
        editor.adjust(&mut display, true);
        editor.move_right(&mut display);
        editor.move_right(&mut display);
        editor.move_right(&mut display);
        editor.move_right(&mut display);
        editor.adjust(&mut display, false);

        editor.commit(&mut display, &clock);
        assert_eq!(clock.get_time(), TimeAndDate::new(2024, 2, 29, 4, 11, 20, 29));
        assert!(!display.cursor_visible);
    }
}
