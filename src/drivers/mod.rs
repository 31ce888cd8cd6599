pub mod button_handler;
pub mod lcd;
pub mod serial_console;

pub use button_handler::{Button, ButtonLines, ButtonSlot, DebounceHardware, Debouncer, IdleTimeout};
pub use lcd::{Display, Hd44780, LcdBus, PinBus};
pub use serial_console::{InputSource, SerialConsole};
