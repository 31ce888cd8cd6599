#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

#[cfg(target_arch = "avr")]
mod firmware {
    use panic_halt as _;

    use envsensor_firmware::drivers::{Button, Hd44780, PinBus, SerialConsole};
    use envsensor_firmware::hal::{
        board, BoardIo, ButtonHardware, ButtonInterrupts, Delay, HoldOffTimer, Power, TickTimer, Uart, Watchdog,
    };
    use envsensor_firmware::{tick, Application, SharedState};

    // Everything the interrupt handlers touch
    static SHARED: SharedState = SharedState::new();

    #[avr_device::entry]
    fn main() -> ! {
        Watchdog::new().disable();
        let mut power = Power::new();
        power.disable_jtag();
        power.disable_clock_division();

        let pins = unsafe { board::configure() };
        let tick = TickTimer::new();
        let _hold_off = HoldOffTimer::new();
        let _buttons = ButtonInterrupts::new();
        let _uart = Uart::new();

        let mut lcd = Hd44780::new(PinBus::new(pins.lcd_rs, pins.lcd_en, pins.lcd_data, Delay));
        lcd.init();

        let io = BoardIo::new(tick, ButtonHardware::handle(), pins.backlight);
        let console = SerialConsole::new(Uart::handle());

        // Console output drains through the UDRE interrupt
        unsafe { avr_device::interrupt::enable() };

        let mut app = Application::new(&SHARED, lcd, console, io);
        if let Err(never) = app.start() {
            match never {}
        }

        loop {
            if let Err(never) = app.poll() {
                match never {}
            }
            // The 1 ms tick wakes us up again
            power.enter_idle_mode();
        }
    }

    #[avr_device::interrupt(atmega32u4)]
    fn TIMER0_COMPA() {
        let mut rx = Uart::handle();
        tick::on_tick(&SHARED, &mut rx);
    }

    #[avr_device::interrupt(atmega32u4)]
    fn INT6() {
        SHARED.on_button_edge(Button::Center, &mut ButtonHardware::handle());
    }

    #[avr_device::interrupt(atmega32u4)]
    fn PCINT0() {
        // Fires on release too; nothing is low then
        if let Some(button) = board::buttons().pressed() {
            SHARED.on_button_edge(button, &mut ButtonHardware::handle());
        }
    }

    #[avr_device::interrupt(atmega32u4)]
    fn TIMER1_COMPA() {
        let mut hw = ButtonHardware::handle();
        hw.end_hold_off();
        SHARED.on_hold_off_expired(&mut hw);
    }

    #[avr_device::interrupt(atmega32u4)]
    fn TIMER1_OVF() {
        SHARED.on_idle_period();
    }
}

// Host builds only carry the library and its tests
#[cfg(not(target_arch = "avr"))]
fn main() {}
