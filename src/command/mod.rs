//! Console command table and argument parsing

pub mod shell;

use ufmt::{uDisplay, uWrite, Formatter};

use crate::clock::TimeAndDate;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandError {
    UnknownCommand,
    WrongArgCount,
    InvalidArgument,
    LineTooLong,
}

pub type Result<T> = core::result::Result<T, CommandError>;

impl uDisplay for CommandError {
    fn fmt<W: uWrite + ?Sized>(&self, f: &mut Formatter<'_, W>) -> core::result::Result<(), W::Error> {
        f.write_str(match self {
            CommandError::UnknownCommand => "unknown command",
            CommandError::WrongArgCount => "wrong number of arguments",
            CommandError::InvalidArgument => "invalid argument",
            CommandError::LineTooLong => "line too long",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerAction {
    Start,
    Stop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Help,
    GetTime,
    SetTime(TimeAndDate),
    Button(bool),
    LcdClear,
    LcdWrite(&'a str),
    Backlight(bool),
    Timer(TimerAction),
    Dfu,
}

pub struct CommandInfo {
    pub name: &'static str,
    pub args: usize,
    pub description: &'static str,
    pub usage: &'static str,
}

pub static COMMANDS: [CommandInfo; 9] = [
    CommandInfo { name: "help", args: 0, description: "List commands", usage: "help" },
    CommandInfo { name: "gettime", args: 0, description: "Get the time", usage: "gettime" },
    CommandInfo {
        name: "settime",
        args: 7,
        description: "Set the time",
        usage: "settime <year> <month> <day> <dow> <hr> <min> <sec>",
    },
    CommandInfo { name: "button", args: 1, description: "Enable/disable the buttons", usage: "button <0|1>" },
    CommandInfo { name: "lcdclr", args: 0, description: "Clear the LCD", usage: "lcdclr" },
    CommandInfo { name: "lcdwrite", args: 1, description: "Write to the LCD", usage: "lcdwrite <text>" },
    CommandInfo { name: "bkl", args: 1, description: "Turn the backlight on/off", usage: "bkl <0|1>" },
    CommandInfo { name: "timer", args: 1, description: "Start/stop the stopwatch", usage: "timer <start|stop>" },
    CommandInfo { name: "dfu", args: 0, description: "Jump to bootloader", usage: "dfu" },
];

pub fn lookup(name: &str) -> Option<&'static CommandInfo> {
    COMMANDS.iter().find(|info| info.name == name)
}

/// Maximum number of arguments any command takes
const MAX_ARGS: usize = 7;

/// Splits `line` on spaces and builds the command. An empty line is `None`.
pub fn parse(line: &str) -> Result<Option<Command<'_>>> {
    let mut words = line.split(' ').filter(|word| !word.is_empty());
    let name = match words.next() {
        Some(name) => name,
        None => return Ok(None),
    };
    let info = lookup(name).ok_or(CommandError::UnknownCommand)?;

    let mut args = [""; MAX_ARGS];
    let mut count = 0;
    for word in words {
        if count == MAX_ARGS {
            return Err(CommandError::WrongArgCount);
        }
        args[count] = word;
        count += 1;
    }
    if count != info.args {
        return Err(CommandError::WrongArgCount);
    }

    let command = match info.name {
        "help" => Command::Help,
        "gettime" => Command::GetTime,
        "settime" => Command::SetTime(TimeAndDate {
            year: number(args[0])?,
            month: number(args[1])?,
            day: number(args[2])?,
            dow: number(args[3])?,
            hour: number(args[4])?,
            min: number(args[5])?,
            sec: number(args[6])?,
        }),
        "button" => Command::Button(switch(args[0])?),
        "lcdclr" => Command::LcdClear,
        "lcdwrite" => Command::LcdWrite(args[0]),
        "bkl" => Command::Backlight(switch(args[0])?),
        "timer" => Command::Timer(match args[0] {
            "start" => TimerAction::Start,
            "stop" => TimerAction::Stop,
            _ => return Err(CommandError::InvalidArgument),
        }),
        "dfu" => Command::Dfu,
        _ => return Err(CommandError::UnknownCommand),
    };
    Ok(Some(command))
}

fn number<T: core::str::FromStr>(arg: &str) -> Result<T> {
    arg.parse().map_err(|_| CommandError::InvalidArgument)
}

fn switch(arg: &str) -> Result<bool> {
    match arg {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(CommandError::InvalidArgument),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_not_commands() {
        assert_eq!(parse(""), Ok(None));
        assert_eq!(parse("   "), Ok(None));
    }

    #[test]
    fn settime_takes_seven_numbers() {
        assert_eq!(
            parse("settime 2024 2 29 4 13 5 9"),
            Ok(Some(Command::SetTime(TimeAndDate::new(2024, 2, 29, 4, 13, 5, 9))))
        );
        assert_eq!(parse("settime 2024 2 29"), Err(CommandError::WrongArgCount));
        assert_eq!(parse("settime 2024 2 29 4 13 5 x"), Err(CommandError::InvalidArgument));
        assert_eq!(parse("settime 2024 2 300 4 13 5 9"), Err(CommandError::InvalidArgument));
    }

    #[test]
    fn out_of_range_fields_still_parse() {
        // the clock decides what to keep
        assert_eq!(
            parse("settime 2024 13 1 1 24 0 0"),
            Ok(Some(Command::SetTime(TimeAndDate::new(2024, 13, 1, 1, 24, 0, 0))))
        );
    }

    #[test]
    fn switches_and_words() {
        assert_eq!(parse("bkl 1"), Ok(Some(Command::Backlight(true))));
        assert_eq!(parse("button  0"), Ok(Some(Command::Button(false))));
        assert_eq!(parse("bkl 2"), Err(CommandError::InvalidArgument));
        assert_eq!(parse("timer stop"), Ok(Some(Command::Timer(TimerAction::Stop))));
        assert_eq!(parse("timer lap"), Err(CommandError::InvalidArgument));
        assert_eq!(parse("lcdwrite hello"), Ok(Some(Command::LcdWrite("hello"))));
    }

    #[test]
    fn unknown_and_extra_arguments() {
        assert_eq!(parse("twiscan"), Err(CommandError::UnknownCommand));
        assert_eq!(parse("gettime now"), Err(CommandError::WrongArgCount));
        assert_eq!(parse("settime 1 2 3 4 5 6 7 8"), Err(CommandError::WrongArgCount));
    }

    #[test]
    fn every_command_is_listed_once() {
        for info in COMMANDS.iter() {
            assert!(core::ptr::eq(lookup(info.name).unwrap(), info));
            assert!(info.usage.starts_with(info.name));
        }
    }
}
