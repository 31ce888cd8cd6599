//! HD44780 16x2 character LCD in 4-bit write-only mode
//!
//! The R/W line is tied low on this board, so the driver keeps a shadow
//! copy of display RAM and the address counter. Reads are served from the
//! shadow.

use core::convert::Infallible;
use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::OutputPin;

use crate::config::{LCD_COLUMNS, LCD_ROW1_ADDRESS};

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE_INC: u8 = 0x06;
const CMD_DISPLAY_ON: u8 = 0x0C;
const DISPLAY_CURSOR_BIT: u8 = 0x02;
const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
const CMD_SET_DDRAM: u8 = 0x80;

/// Display RAM per row in two-line mode
const ROW_SPAN: u8 = 0x28;

/// Text output primitives used by the menu and the console
pub trait Display {
    fn clear(&mut self);
    fn goto(&mut self, col: u8, row: u8);
    fn write(&mut self, text: &str);
    fn write_at(&mut self, address: u8, text: &str);
    fn read_char_at(&self, address: u8) -> u8;
    fn cursor_address(&self) -> u8;
    fn show_cursor(&mut self, visible: bool);
}

/// Display RAM address of a column/row position
pub fn address_of(col: u8, row: u8) -> u8 {
    if row == 0 {
        col
    } else {
        LCD_ROW1_ADDRESS + col
    }
}

/// Nibble-level access to the controller
pub trait LcdBus {
    /// Put `nibble` on D4-D7 with RS set to `rs` and strobe E
    fn write_nibble(&mut self, rs: bool, nibble: u8);
    fn delay_us(&mut self, us: u16);
}

/// `LcdBus` over six GPIO lines and a blocking delay
pub struct PinBus<RS, EN, D4, D5, D6, D7, DL> {
    rs: RS,
    en: EN,
    data: (D4, D5, D6, D7),
    delay: DL,
}

impl<RS, EN, D4, D5, D6, D7, DL> PinBus<RS, EN, D4, D5, D6, D7, DL>
where
    RS: OutputPin<Error = Infallible>,
    EN: OutputPin<Error = Infallible>,
    D4: OutputPin<Error = Infallible>,
    D5: OutputPin<Error = Infallible>,
    D6: OutputPin<Error = Infallible>,
    D7: OutputPin<Error = Infallible>,
    DL: DelayUs<u16>,
{
    pub fn new(rs: RS, en: EN, data: (D4, D5, D6, D7), delay: DL) -> Self {
        Self { rs, en, data, delay }
    }
}

fn set<P: OutputPin<Error = Infallible>>(pin: &mut P, high: bool) {
    let result = if high { pin.set_high() } else { pin.set_low() };
    if let Err(never) = result {
        match never {}
    }
}

impl<RS, EN, D4, D5, D6, D7, DL> LcdBus for PinBus<RS, EN, D4, D5, D6, D7, DL>
where
    RS: OutputPin<Error = Infallible>,
    EN: OutputPin<Error = Infallible>,
    D4: OutputPin<Error = Infallible>,
    D5: OutputPin<Error = Infallible>,
    D6: OutputPin<Error = Infallible>,
    D7: OutputPin<Error = Infallible>,
    DL: DelayUs<u16>,
{
    fn write_nibble(&mut self, rs: bool, nibble: u8) {
        set(&mut self.rs, rs);
        set(&mut self.data.0, nibble & 0x01 != 0);
        set(&mut self.data.1, nibble & 0x02 != 0);
        set(&mut self.data.2, nibble & 0x04 != 0);
        set(&mut self.data.3, nibble & 0x08 != 0);
        set(&mut self.en, true);
        self.delay.delay_us(1);
        set(&mut self.en, false);
    }

    fn delay_us(&mut self, us: u16) {
        self.delay.delay_us(us);
    }
}

pub struct Hd44780<B> {
    bus: B,
    shadow: [u8; 2 * ROW_SPAN as usize],
    address: u8,
    cursor_visible: bool,
}

impl<B: LcdBus> Hd44780<B> {
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            shadow: [b' '; 2 * ROW_SPAN as usize],
            address: 0,
            cursor_visible: false,
        }
    }

    /// Power-on initialisation by instruction (datasheet figure 24)
    pub fn init(&mut self) {
        self.bus.delay_us(40_000);
        self.bus.write_nibble(false, 0x3);
        self.bus.delay_us(4_100);
        self.bus.write_nibble(false, 0x3);
        self.bus.delay_us(100);
        self.bus.write_nibble(false, 0x3);
        self.bus.delay_us(100);
        self.bus.write_nibble(false, 0x2);
        self.bus.delay_us(100);

        self.command(CMD_FUNCTION_4BIT_2LINE);
        self.command(CMD_DISPLAY_ON);
        self.command(CMD_ENTRY_MODE_INC);
        self.clear();
    }

    fn command(&mut self, cmd: u8) {
        self.bus.write_nibble(false, cmd >> 4);
        self.bus.write_nibble(false, cmd & 0x0F);
        self.bus.delay_us(50);
    }

    fn data(&mut self, byte: u8) {
        self.bus.write_nibble(true, byte >> 4);
        self.bus.write_nibble(true, byte & 0x0F);
        self.bus.delay_us(50);

        if let Some(index) = shadow_index(self.address) {
            self.shadow[index] = byte;
        }
        self.address = next_address(self.address);
    }

    fn set_address(&mut self, address: u8) {
        self.address = address;
        self.command(CMD_SET_DDRAM | address);
    }
}

fn shadow_index(address: u8) -> Option<usize> {
    match address {
        a if a < ROW_SPAN => Some(a as usize),
        a if (LCD_ROW1_ADDRESS..LCD_ROW1_ADDRESS + ROW_SPAN).contains(&a) => {
            Some((a - LCD_ROW1_ADDRESS + ROW_SPAN) as usize)
        }
        _ => None,
    }
}

/// Address counter increment in two-line mode: row 0 continues on row 1
/// and row 1 wraps back to row 0
fn next_address(address: u8) -> u8 {
    match address {
        a if a == ROW_SPAN - 1 => LCD_ROW1_ADDRESS,
        a if a >= LCD_ROW1_ADDRESS + ROW_SPAN - 1 => 0,
        a => a + 1,
    }
}

impl<B: LcdBus> Display for Hd44780<B> {
    fn clear(&mut self) {
        self.command(CMD_CLEAR);
        self.bus.delay_us(2_000);
        self.shadow = [b' '; 2 * ROW_SPAN as usize];
        self.address = 0;
    }

    fn goto(&mut self, col: u8, row: u8) {
        self.set_address(address_of(col, row));
    }

    fn write(&mut self, text: &str) {
        for byte in text.bytes() {
            if byte == b'\n' {
                let row = if self.address >= LCD_ROW1_ADDRESS { 0 } else { 1 };
                self.goto(0, row);
            } else {
                self.data(byte);
            }
        }
    }

    fn write_at(&mut self, address: u8, text: &str) {
        self.set_address(address);
        self.write(text);
    }

    fn read_char_at(&self, address: u8) -> u8 {
        shadow_index(address).map_or(b' ', |index| self.shadow[index])
    }

    fn cursor_address(&self) -> u8 {
        self.address
    }

    fn show_cursor(&mut self, visible: bool) {
        self.cursor_visible = visible;
        let cmd = if visible { CMD_DISPLAY_ON | DISPLAY_CURSOR_BIT } else { CMD_DISPLAY_ON };
        self.command(cmd);
    }
}

/// Writes `text` padded with spaces to the full row width
pub fn write_line<D: Display>(display: &mut D, row: u8, text: &str) {
    display.goto(0, row);
    display.write(text);
    for _ in text.len()..LCD_COLUMNS as usize {
        display.write(" ");
    }
}
