//! Line editor and command execution for the serial console

use heapless::String;
use ufmt::{uWrite, uwrite};

use super::{lookup, parse, Command, CommandError, TimerAction, COMMANDS};
use crate::clock::{Clock, ElapsedTime, TimeAndDate};
use crate::config::COMMAND_LINE_LEN;

const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7F;

/// What the commands act on
pub trait ShellHost {
    fn clock(&self) -> &Clock;
    fn set_buttons_enabled(&mut self, enabled: bool);
    fn set_backlight(&mut self, on: bool);
    fn lcd_clear(&mut self);
    fn lcd_write(&mut self, text: &str);
    /// False if the stopwatch was already running
    fn start_stopwatch(&mut self) -> bool;
    fn stop_stopwatch(&mut self) -> Option<ElapsedTime>;
    fn enter_bootloader(&mut self);
}

/// Echoing line buffer. Typing past the end marks the line as overflowed;
/// it is discarded when the user presses enter.
pub struct LineBuffer {
    text: String<COMMAND_LINE_LEN>,
    overflowed: bool,
}

impl LineBuffer {
    pub const fn new() -> Self {
        Self {
            text: String::new(),
            overflowed: false,
        }
    }

    pub fn push(&mut self, c: char) -> bool {
        if self.overflowed || self.text.push(c).is_err() {
            self.overflowed = true;
            return false;
        }
        true
    }

    pub fn backspace(&mut self) -> bool {
        self.text.pop().is_some()
    }

    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    pub fn is_overflowed(&self) -> bool {
        self.overflowed
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.overflowed = false;
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Shell {
    line: LineBuffer,
    confirming_dfu: bool,
}

impl Shell {
    pub const fn new() -> Self {
        Self {
            line: LineBuffer::new(),
            confirming_dfu: false,
        }
    }

    pub fn line(&self) -> &str {
        self.line.as_str()
    }

    pub fn is_confirming_dfu(&self) -> bool {
        self.confirming_dfu
    }

    /// Feeds one received byte; executes the line on CR or LF. Returns the
    /// time as committed when the byte completed a `settime` line.
    pub fn feed<W, H>(&mut self, byte: u8, out: &mut W, host: &mut H) -> Result<Option<TimeAndDate>, W::Error>
    where
        W: uWrite + ?Sized,
        H: ShellHost,
    {
        if self.confirming_dfu {
            self.confirm_dfu(byte, out, host)?;
            return Ok(None);
        }

        let mut committed = None;
        match byte {
            b'\r' | b'\n' => {
                if self.line.as_str().is_empty() && !self.line.is_overflowed() {
                    return Ok(None);
                }
                out.write_str("\r\n")?;
                let result = if self.line.is_overflowed() {
                    Err(CommandError::LineTooLong)
                } else {
                    parse(self.line.as_str())
                };
                match result {
                    Ok(Some(command)) => committed = execute(command, out, host, &mut self.confirming_dfu)?,
                    Ok(None) => {}
                    Err(error) => report(error, self.line.as_str(), out)?,
                }
                self.line.clear();
            }
            BACKSPACE | DELETE => {
                if self.line.backspace() {
                    out.write_str("\x08 \x08")?;
                }
            }
            0x20..=0x7E => {
                if self.line.push(byte as char) {
                    out.write_char(byte as char)?;
                }
            }
            _ => {}
        }
        Ok(committed)
    }

    fn confirm_dfu<W, H>(&mut self, byte: u8, out: &mut W, host: &mut H) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
        H: ShellHost,
    {
        // Line ending left over from the `dfu` line itself
        if byte == b'\r' || byte == b'\n' {
            return Ok(());
        }
        self.confirming_dfu = false;
        if byte == b'y' {
            out.write_str("Jump\r\n")?;
            host.enter_bootloader();
        } else {
            out.write_str("Canceled\r\n")?;
        }
        Ok(())
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}

fn report<W: uWrite + ?Sized>(error: CommandError, line: &str, out: &mut W) -> Result<(), W::Error> {
    uwrite!(out, "ERROR: {}\r\n", error)?;
    if error == CommandError::WrongArgCount {
        let name = line.split(' ').find(|word| !word.is_empty()).unwrap_or("");
        if let Some(info) = lookup(name) {
            uwrite!(out, "usage: {}\r\n", info.usage)?;
        }
    }
    Ok(())
}

fn execute<W, H>(
    command: Command<'_>,
    out: &mut W,
    host: &mut H,
    confirming_dfu: &mut bool,
) -> Result<Option<TimeAndDate>, W::Error>
where
    W: uWrite + ?Sized,
    H: ShellHost,
{
    match command {
        Command::Help => {
            for info in COMMANDS.iter() {
                uwrite!(out, "{} - {}\r\n", info.name, info.description)?;
            }
        }
        Command::GetTime => {
            uwrite!(out, "{}\r\n", host.clock().get_time())?;
        }
        Command::SetTime(candidate) => {
            let stored = host.clock().set_time(candidate);
            uwrite!(out, "Setting {}......Done\r\n", candidate)?;
            report_rejected(&candidate, &stored, out)?;
            return Ok(Some(stored));
        }
        Command::Button(enabled) => host.set_buttons_enabled(enabled),
        Command::LcdClear => host.lcd_clear(),
        Command::LcdWrite(text) => host.lcd_write(text),
        Command::Backlight(on) => host.set_backlight(on),
        Command::Timer(TimerAction::Start) => {
            if host.start_stopwatch() {
                out.write_str("Timer started\r\n")?;
            } else {
                out.write_str("Timer already running\r\n")?;
            }
        }
        Command::Timer(TimerAction::Stop) => match host.stop_stopwatch() {
            Some(elapsed) => uwrite!(out, "Time: {}\r\n", elapsed)?,
            None => out.write_str("Timer not running\r\n")?,
        },
        Command::Dfu => {
            out.write_str("Jumping to bootloader. A manual reset will be required\r\n")?;
            out.write_str("Press 'y' to continue...")?;
            *confirming_dfu = true;
        }
    }
    Ok(None)
}

/// Names every field the clock kept instead of taking the requested value
fn report_rejected<W: uWrite + ?Sized>(
    requested: &TimeAndDate,
    stored: &TimeAndDate,
    out: &mut W,
) -> Result<(), W::Error> {
    let fields = [
        ("year", requested.year != stored.year),
        ("month", requested.month != stored.month),
        ("day", requested.day != stored.day),
        ("dow", requested.dow != stored.dow),
        ("hour", requested.hour != stored.hour),
        ("min", requested.min != stored.min),
        ("sec", requested.sec != stored.sec),
    ];
    for (name, rejected) in fields {
        if rejected {
            uwrite!(out, "Invalid {}, kept\r\n", name)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::String as StdString;
    use std::vec::Vec;

    struct Transcript(StdString);

    impl uWrite for Transcript {
        type Error = core::convert::Infallible;

        fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
            self.0.push_str(s);
            Ok(())
        }
    }

    struct Host {
        clock: Clock,
        buttons: Option<bool>,
        backlight: Option<bool>,
        lcd: Vec<StdString>,
        running: bool,
        bootloader: bool,
        /// Each clock access lets one second pass first, as the tick would
        ticking: bool,
    }

    impl Host {
        fn new() -> Self {
            Self {
                clock: Clock::with_time(TimeAndDate::new(2023, 6, 7, 3, 8, 9, 10)),
                buttons: None,
                backlight: None,
                lcd: Vec::new(),
                running: false,
                bootloader: false,
                ticking: false,
            }
        }
    }

    impl ShellHost for Host {
        fn clock(&self) -> &Clock {
            if self.ticking {
                for _ in 0..1000 {
                    self.clock.advance_one_millisecond();
                }
            }
            &self.clock
        }
        fn set_buttons_enabled(&mut self, enabled: bool) {
            self.buttons = Some(enabled);
        }
        fn set_backlight(&mut self, on: bool) {
            self.backlight = Some(on);
        }
        fn lcd_clear(&mut self) {
            self.lcd.push(StdString::from("<clear>"));
        }
        fn lcd_write(&mut self, text: &str) {
            self.lcd.push(StdString::from(text));
        }
        fn start_stopwatch(&mut self) -> bool {
            !core::mem::replace(&mut self.running, true)
        }
        fn stop_stopwatch(&mut self) -> Option<ElapsedTime> {
            if core::mem::replace(&mut self.running, false) {
                Some(ElapsedTime { seconds: 2, micros: 16, ..ElapsedTime::ZERO })
            } else {
                None
            }
        }
        fn enter_bootloader(&mut self) {
            self.bootloader = true;
        }
    }

    fn type_in(shell: &mut Shell, host: &mut Host, input: &str) -> StdString {
        let mut out = Transcript(StdString::new());
        for byte in input.bytes() {
            shell.feed(byte, &mut out, host).unwrap();
        }
        out.0
    }

    #[test]
    fn typed_characters_are_echoed() {
        let mut shell = Shell::new();
        let mut host = Host::new();
        assert_eq!(type_in(&mut shell, &mut host, "bk"), "bk");
        assert_eq!(shell.line(), "bk");
    }

    #[test]
    fn backspace_erases() {
        let mut shell = Shell::new();
        let mut host = Host::new();
        let echo = type_in(&mut shell, &mut host, "bkx\x08l 1\x7F0\r");
        assert!(echo.starts_with("bkx\x08 \x08l 1\x08 \x080\r\n"));
        assert_eq!(host.backlight, Some(false));
        assert_eq!(shell.line(), "");
    }

    #[test]
    fn backspace_on_empty_line_echoes_nothing() {
        let mut shell = Shell::new();
        let mut host = Host::new();
        assert_eq!(type_in(&mut shell, &mut host, "\x08\x7F"), "");
    }

    #[test]
    fn gettime_prints_the_clock() {
        let mut shell = Shell::new();
        let mut host = Host::new();
        let out = type_in(&mut shell, &mut host, "gettime\r\n");
        assert_eq!(out, "gettime\r\n06/07/2023 08:09:10\r\n");
    }

    #[test]
    fn settime_reports_rejected_fields() {
        let mut shell = Shell::new();
        let mut host = Host::new();
        let out = type_in(&mut shell, &mut host, "settime 2023 2 30 1 24 15 0\r");
        assert!(out.contains("Setting 02/30/2023 24:15:00......Done\r\n"));
        assert!(out.contains("Invalid day, kept\r\n"));
        assert!(out.contains("Invalid hour, kept\r\n"));
        assert!(!out.contains("Invalid min"));
        assert_eq!(host.clock.get_time(), TimeAndDate::new(2023, 2, 7, 1, 8, 15, 0));
    }

    #[test]
    fn settime_judges_the_time_it_committed() {
        let mut shell = Shell::new();
        let mut host = Host::new();
        host.ticking = true;
        let out = type_in(&mut shell, &mut host, "settime 2023 12 30 6 23 59 59");

        let mut rest = Transcript(StdString::new());
        let committed = shell.feed(b'\r', &mut rest, &mut host).unwrap();
        assert_eq!(committed, Some(TimeAndDate::new(2023, 12, 30, 6, 23, 59, 59)));
        assert!(out.ends_with("59 59"));
        assert_eq!(rest.0, "\r\nSetting 12/30/2023 23:59:59......Done\r\n");
    }

    #[test]
    fn errors_are_reported_and_the_shell_continues() {
        let mut shell = Shell::new();
        let mut host = Host::new();
        let out = type_in(&mut shell, &mut host, "frob\rbutton\rbutton 0\r");
        assert!(out.contains("ERROR: unknown command\r\n"));
        assert!(out.contains("ERROR: wrong number of arguments\r\nusage: button <0|1>\r\n"));
        assert_eq!(host.buttons, Some(false));
    }

    #[test]
    fn overlong_line_is_discarded() {
        let mut shell = Shell::new();
        let mut host = Host::new();
        let long = "lcdwrite 0123456789012345678901234567890";
        let out = type_in(&mut shell, &mut host, long);
        assert_eq!(out.len(), COMMAND_LINE_LEN);

        let out = type_in(&mut shell, &mut host, "\r");
        assert_eq!(out, "\r\nERROR: line too long\r\n");
        assert!(host.lcd.is_empty());

        type_in(&mut shell, &mut host, "lcdwrite hi\r");
        assert_eq!(host.lcd, ["hi"]);
    }

    #[test]
    fn timer_start_and_stop() {
        let mut shell = Shell::new();
        let mut host = Host::new();
        let out = type_in(&mut shell, &mut host, "timer stop\rtimer start\rtimer start\rtimer stop\r");
        assert!(out.contains("Timer not running\r\n"));
        assert!(out.contains("Timer started\r\n"));
        assert!(out.contains("Timer already running\r\n"));
        assert!(out.ends_with("Time: 0 days 00:00:02.000 016 us\r\n"));
    }

    #[test]
    fn dfu_needs_confirmation() {
        let mut shell = Shell::new();
        let mut host = Host::new();
        let out = type_in(&mut shell, &mut host, "dfu\r\nn");
        assert!(out.ends_with("Press 'y' to continue...Canceled\r\n"));
        assert!(!host.bootloader);
        assert!(!shell.is_confirming_dfu());

        let out = type_in(&mut shell, &mut host, "dfu\ry");
        assert!(out.ends_with("Jump\r\n"));
        assert!(host.bootloader);
    }

    #[test]
    fn help_lists_every_command() {
        let mut shell = Shell::new();
        let mut host = Host::new();
        let out = type_in(&mut shell, &mut host, "help\r");
        for info in COMMANDS.iter() {
            assert!(out.contains(info.name));
        }
    }
}
