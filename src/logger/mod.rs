//! Tagged log lines on the serial console
//!
//! Every entry is one `\r\n`-terminated line prefixed with its type tag.
//! Debug entries are compiled in only with the `debug` feature.

use ufmt::uWrite;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogType {
    System,
    Clock,
    Button,
    Menu,
    Error,
}

impl LogType {
    pub fn tag(self) -> &'static str {
        match self {
            LogType::System => "[SYS] ",
            LogType::Clock => "[CLK] ",
            LogType::Button => "[BTN] ",
            LogType::Menu => "[MNU] ",
            LogType::Error => "[ERR] ",
        }
    }
}

pub struct Logger<W> {
    out: W,
}

impl<W: uWrite> Logger<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Direct access for command-line output, which is not tagged
    pub fn out(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn log(&mut self, log_type: LogType, message: &str) -> Result<(), W::Error> {
        self.entry(log_type, |w| w.write_str(message))
    }

    /// Writes the tag, lets `body` format the message, ends the line
    pub fn entry<F>(&mut self, log_type: LogType, body: F) -> Result<(), W::Error>
    where
        F: FnOnce(&mut W) -> Result<(), W::Error>,
    {
        self.out.write_str(log_type.tag())?;
        body(&mut self.out)?;
        self.out.write_str("\r\n")
    }

    pub fn log_system(&mut self, message: &str) -> Result<(), W::Error> {
        self.log(LogType::System, message)
    }

    pub fn log_error(&mut self, message: &str) -> Result<(), W::Error> {
        self.log(LogType::Error, message)
    }

    #[cfg(feature = "debug")]
    pub fn log_debug<F>(&mut self, log_type: LogType, body: F) -> Result<(), W::Error>
    where
        F: FnOnce(&mut W) -> Result<(), W::Error>,
    {
        self.entry(log_type, body)
    }

    #[cfg(not(feature = "debug"))]
    pub fn log_debug<F>(&mut self, _log_type: LogType, _body: F) -> Result<(), W::Error>
    where
        F: FnOnce(&mut W) -> Result<(), W::Error>,
    {
        Ok(())
    }
}
