pub mod exint;
pub mod gpio;
pub mod power;
pub mod timer;
pub mod uart;
pub mod watchdog;

// Re-export commonly used types
pub use exint::{ButtonHardware, ButtonInterrupts};
pub use gpio::{board, Input, Output, Pin};
pub use power::{Power, SleepMode};
pub use timer::{Delay, HoldOffTimer, Prescaler, TickTimer};
pub use uart::Uart;
pub use watchdog::Watchdog;

use embedded_hal::digital::v2::OutputPin;

use crate::application::Board;
use crate::clock::SubTickCounter;
use crate::drivers::button_handler::DebounceHardware;

/// The board outputs the application drives from the main loop
pub struct BoardIo {
    tick: TickTimer,
    buttons: ButtonHardware,
    backlight: board::Backlight,
}

impl BoardIo {
    pub fn new(tick: TickTimer, buttons: ButtonHardware, backlight: board::Backlight) -> Self {
        Self { tick, buttons, backlight }
    }
}

impl SubTickCounter for BoardIo {
    fn sub_tick(&self) -> u8 {
        self.tick.sub_tick()
    }
}

impl DebounceHardware for BoardIo {
    fn disable_buttons(&mut self) {
        self.buttons.disable_buttons();
    }

    fn enable_buttons(&mut self) {
        self.buttons.enable_buttons();
    }

    fn restart_hold_off(&mut self) {
        self.buttons.restart_hold_off();
    }
}

impl Board for BoardIo {
    fn set_backlight(&mut self, on: bool) {
        let result = if on { self.backlight.set_high() } else { self.backlight.set_low() };
        if let Err(never) = result {
            match never {}
        }
    }

    fn enter_bootloader(&mut self) {
        crate::bootloader::enter_bootloader()
    }
}
