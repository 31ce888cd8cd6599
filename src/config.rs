//! Configuration constants for the environmental sensor firmware

/// CPU frequency in Hz, supplied by the build script
pub const CPU_FREQ_HZ: u32 = parse_decimal(env!("MCU_FREQ_HZ"));

/// Timer0 runs at Fcpu/64 in CTC mode; compare match every TICK_TOP + 1 counts (1 ms)
pub const TICK_TOP: u8 = 124;

/// Length of one Timer0 count in microseconds
pub const SUB_TICK_US: u16 = (64 * 1_000_000 / CPU_FREQ_HZ) as u16;

/// Timer1 runs at Fcpu/1024; compare A at this count ends the hold-off window (~250 ms)
pub const HOLD_OFF_TOP: u16 = 0x07A1;

/// Number of Timer1 overflow periods (~8.4 s each) without a button press before the menu reverts to idle
pub const IDLE_TIMEOUT_PERIODS: u8 = 2;

/// Input is polled when `ms & INPUT_POLL_MASK == 0`, i.e. every 8 ticks
pub const INPUT_POLL_MASK: u16 = 0x0007;

/// UART baud rate
pub const UART_BAUD: u32 = 9600;

/// Console line length, including arguments
pub const COMMAND_LINE_LEN: usize = 32;

/// Character LCD geometry
pub const LCD_COLUMNS: u8 = 16;
pub const LCD_ROWS: u8 = 2;

/// Display RAM address of the first character of the second row
pub const LCD_ROW1_ADDRESS: u8 = 0x40;

/// Firmware identification printed at boot
pub const FIRMWARE_NAME: &str = "EnvSensor";
pub const FIRMWARE_VERSION: &str = env!("CARGO_PKG_VERSION");

const fn parse_decimal(s: &str) -> u32 {
    let bytes = s.as_bytes();
    let mut value = 0u32;
    let mut i = 0;
    while i < bytes.len() {
        value = value * 10 + (bytes[i] - b'0') as u32;
        i += 1;
    }
    value
}
