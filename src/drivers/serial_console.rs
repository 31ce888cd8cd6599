use embedded_hal::serial;

/// Non-blocking source of command-line characters
pub trait InputSource {
    fn input_byte_available(&mut self) -> Option<u8>;
}

impl<S: serial::Read<u8>> InputSource for S {
    fn input_byte_available(&mut self) -> Option<u8> {
        match self.read() {
            Ok(byte) => Some(byte),
            Err(nb::Error::WouldBlock) => None,
            // Framing/overrun: the byte is lost either way
            Err(nb::Error::Other(_)) => None,
        }
    }
}

/// Text console on top of any serial transmitter
pub struct SerialConsole<W> {
    tx: W,
}

impl<W: serial::Write<u8>> SerialConsole<W> {
    pub fn new(tx: W) -> Self {
        Self { tx }
    }

    pub fn write_byte(&mut self, byte: u8) -> Result<(), W::Error> {
        nb::block!(self.tx.write(byte))
    }

    pub fn write_str(&mut self, s: &str) -> Result<(), W::Error> {
        for byte in s.bytes() {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    pub fn write_line(&mut self, s: &str) -> Result<(), W::Error> {
        self.write_str(s)?;
        self.write_str("\r\n")
    }
}

impl<W: serial::Write<u8>> ufmt::uWrite for SerialConsole<W> {
    type Error = W::Error;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        SerialConsole::write_str(self, s)
    }
}
