//! Main-loop side of the firmware
//!
//! Interrupt handlers only post into [`SharedState`]; everything that
//! touches the display, the console or the menu happens in
//! [`Application::poll`].

use crate::clock::{Clock, ElapsedTime, Stopwatch, SubTickCounter};
use crate::command::shell::{Shell, ShellHost};
use crate::config::{FIRMWARE_NAME, FIRMWARE_VERSION};
use crate::drivers::button_handler::DebounceHardware;
use crate::drivers::lcd::Display;
use crate::logger::{LogType, Logger};
use crate::menu::{render_idle, MenuContext, MenuHost, MenuState, Navigator};
use crate::os::SharedState;

/// Board outputs the core drives but cannot own
pub trait Board: SubTickCounter + DebounceHardware {
    fn set_backlight(&mut self, on: bool);
    fn enter_bootloader(&mut self);
}

pub struct Application<'s, D, W, B> {
    shared: &'s SharedState,
    display: D,
    log: Logger<W>,
    board: B,
    navigator: Navigator,
    shell: Shell,
    stopwatch: Stopwatch,
}

impl<'s, D, W, B> Application<'s, D, W, B>
where
    D: Display,
    W: ufmt::uWrite,
    B: Board,
{
    pub fn new(shared: &'s SharedState, display: D, console: W, board: B) -> Self {
        Self {
            shared,
            display,
            log: Logger::new(console),
            board,
            navigator: Navigator::default(),
            shell: Shell::new(),
            stopwatch: Stopwatch::new(),
        }
    }

    /// Banner and first idle screen
    pub fn start(&mut self) -> Result<(), W::Error> {
        self.log
            .entry(LogType::System, |w| ufmt::uwrite!(w, "{} v{}", FIRMWARE_NAME, FIRMWARE_VERSION))?;
        self.shared.refresh.set_idle_mode(true);
        self.display.clear();
        render_idle(&mut self.display, &self.shared.clock);
        self.log.log_system("Ready")
    }

    /// One pass of the main loop
    pub fn poll(&mut self) -> Result<(), W::Error> {
        if self.shared.idle.take_expired() && self.navigator.state() != MenuState::Idle {
            let mut hooks = Hooks {
                board: &mut self.board,
                stopwatch: &mut self.stopwatch,
                shared: self.shared,
            };
            let mut ctx = MenuContext {
                display: &mut self.display,
                clock: &self.shared.clock,
                refresh: &self.shared.refresh,
                host: &mut hooks,
            };
            self.navigator.revert_to_idle(&mut ctx);
            self.log.log(LogType::Menu, "Inactive, back to idle")?;
        }

        if let Some(button) = self.shared.buttons.take_event() {
            self.log
                .log_debug(LogType::Button, |w| ufmt::uwrite!(w, "{}", button as u8))?;
            let mut hooks = Hooks {
                board: &mut self.board,
                stopwatch: &mut self.stopwatch,
                shared: self.shared,
            };
            let mut ctx = MenuContext {
                display: &mut self.display,
                clock: &self.shared.clock,
                refresh: &self.shared.refresh,
                host: &mut hooks,
            };
            self.navigator.handle_button(button, &mut ctx);
            let label = self.navigator.label();
            self.log.log_debug(LogType::Menu, |w| w.write_str(label))?;
        }

        if self.shared.refresh.take() && self.navigator.state() == MenuState::Idle {
            render_idle(&mut self.display, &self.shared.clock);
        }

        if self.shared.input_overrun.take() {
            self.log.log_error("Console input overrun, bytes dropped")?;
        }

        while let Some(byte) = self.shared.input.pop() {
            let mut host = ShellHooks {
                hooks: Hooks {
                    board: &mut self.board,
                    stopwatch: &mut self.stopwatch,
                    shared: self.shared,
                },
                display: &mut self.display,
            };
            if let Some(time) = self.shell.feed(byte, self.log.out(), &mut host)? {
                self.log.entry(LogType::Clock, |w| ufmt::uwrite!(w, "Set to {}", time))?;
            }
        }
        Ok(())
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn stopwatch(&self) -> &Stopwatch {
        &self.stopwatch
    }

    pub fn console(&mut self) -> &mut W {
        self.log.out()
    }
}

struct Hooks<'b, B> {
    board: &'b mut B,
    stopwatch: &'b mut Stopwatch,
    shared: &'b SharedState,
}

impl<B: Board> Hooks<'_, B> {
    fn start_stopwatch(&mut self) -> bool {
        if self.stopwatch.is_running() {
            return false;
        }
        self.stopwatch.start(&self.shared.clock, &*self.board);
        true
    }

    fn stop_stopwatch(&mut self) -> Option<ElapsedTime> {
        self.stopwatch.stop(&self.shared.clock, &*self.board)
    }
}

impl<B: Board> MenuHost for Hooks<'_, B> {
    fn stopwatch_running(&self) -> bool {
        self.stopwatch.is_running()
    }

    fn toggle_stopwatch(&mut self) -> Option<ElapsedTime> {
        if self.stopwatch.is_running() {
            self.stop_stopwatch()
        } else {
            self.start_stopwatch();
            None
        }
    }

    fn set_backlight(&mut self, on: bool) {
        self.board.set_backlight(on);
    }

    fn enter_bootloader(&mut self) {
        self.board.enter_bootloader();
    }
}

struct ShellHooks<'b, B, D> {
    hooks: Hooks<'b, B>,
    display: &'b mut D,
}

impl<B: Board, D: Display> ShellHost for ShellHooks<'_, B, D> {
    fn clock(&self) -> &Clock {
        &self.hooks.shared.clock
    }

    fn set_buttons_enabled(&mut self, enabled: bool) {
        self.hooks.shared.buttons.set_enabled(enabled, &mut *self.hooks.board);
    }

    fn set_backlight(&mut self, on: bool) {
        self.hooks.board.set_backlight(on);
    }

    fn lcd_clear(&mut self) {
        self.display.clear();
    }

    fn lcd_write(&mut self, text: &str) {
        self.display.write(text);
        self.display.write("\n");
    }

    fn start_stopwatch(&mut self) -> bool {
        self.hooks.start_stopwatch()
    }

    fn stop_stopwatch(&mut self) -> Option<ElapsedTime> {
        self.hooks.stop_stopwatch()
    }

    fn enter_bootloader(&mut self) {
        self.hooks.board.enter_bootloader();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TimeAndDate;
    use crate::drivers::button_handler::Button;
    use crate::menu::tests::FakeDisplay;
    use core::cell::Cell;
    use std::string::String;

    #[derive(Default)]
    struct Capture(String);

    impl ufmt::uWrite for Capture {
        type Error = core::convert::Infallible;

        fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
            self.0.push_str(s);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeBoard {
        sub_tick: Cell<u8>,
        masked: bool,
        backlight: bool,
        bootloader: bool,
    }

    impl SubTickCounter for FakeBoard {
        fn sub_tick(&self) -> u8 {
            self.sub_tick.get()
        }
    }

    impl DebounceHardware for FakeBoard {
        fn disable_buttons(&mut self) {
            self.masked = true;
        }
        fn enable_buttons(&mut self) {
            self.masked = false;
        }
        fn restart_hold_off(&mut self) {}
    }

    impl Board for FakeBoard {
        fn set_backlight(&mut self, on: bool) {
            self.backlight = on;
        }
        fn enter_bootloader(&mut self) {
            self.bootloader = true;
        }
    }

    type App<'s> = Application<'s, FakeDisplay, Capture, FakeBoard>;

    fn app(shared: &SharedState) -> App<'_> {
        shared.clock.set_time(TimeAndDate::new(2024, 12, 30, 1, 23, 59, 58));
        let mut app = Application::new(shared, FakeDisplay::default(), Capture::default(), FakeBoard::default());
        app.start().unwrap();
        app
    }

    fn press(app: &mut App<'_>, shared: &SharedState, button: Button) {
        let mut board = FakeBoard::default();
        shared.on_button_edge(button, &mut board);
        shared.on_hold_off_expired(&mut board);
        app.poll().unwrap();
    }

    fn type_line(app: &mut App<'_>, shared: &SharedState, line: &str) {
        for byte in line.bytes() {
            shared.input.push(byte);
        }
        app.poll().unwrap();
    }

    #[test]
    fn starts_on_the_idle_screen() {
        let shared = SharedState::new();
        let mut app = app(&shared);
        assert_eq!(app.display().row(0).trim_end(), "23:59:58");
        assert_eq!(app.display().row(1).trim_end(), "12/30/2024");
        assert!(app.console().0.starts_with("[SYS] EnvSensor v"));
    }

    #[test]
    fn idle_screen_follows_the_clock() {
        let shared = SharedState::new();
        let mut app = app(&shared);
        for _ in 0..2000 {
            shared.clock.advance_one_millisecond();
        }
        shared.refresh.request();
        app.poll().unwrap();
        assert_eq!(app.display().row(0).trim_end(), "00:00:00");
        assert_eq!(app.display().row(1).trim_end(), "01/01/2025");
    }

    #[test]
    fn refresh_is_ignored_inside_the_menu() {
        let shared = SharedState::new();
        let mut app = app(&shared);
        press(&mut app, &shared, Button::Center);
        assert_eq!(app.navigator().state(), MenuState::MainMenu);
        assert!(!shared.refresh.idle_mode());

        shared.refresh.set_idle_mode(true);
        shared.refresh.request();
        shared.refresh.set_idle_mode(false);
        app.poll().unwrap();
        assert_eq!(app.display().row(0).trim_end(), "Clock          >");
    }

    #[test]
    fn inactivity_expiry_returns_to_idle() {
        let shared = SharedState::new();
        let mut app = app(&shared);
        press(&mut app, &shared, Button::Center);
        press(&mut app, &shared, Button::Down);
        press(&mut app, &shared, Button::Right);

        shared.on_idle_period();
        shared.on_idle_period();
        app.poll().unwrap();
        assert_eq!(app.navigator().state(), MenuState::Idle);
        assert!(shared.refresh.idle_mode());
        assert!(app.console().0.contains("[MNU] Inactive, back to idle\r\n"));
    }

    #[test]
    fn menu_stopwatch_uses_the_sub_tick_counter() {
        let shared = SharedState::new();
        let mut app = app(&shared);
        press(&mut app, &shared, Button::Center);
        press(&mut app, &shared, Button::Down);
        press(&mut app, &shared, Button::Right);
        press(&mut app, &shared, Button::Center);
        assert!(app.stopwatch().is_running());

        for _ in 0..1500 {
            shared.clock.advance_one_millisecond();
        }
        app.board.sub_tick.set(25);
        press(&mut app, &shared, Button::Center);
        assert!(!app.stopwatch().is_running());
        assert_eq!(app.display().row(1).trim_end(), "00:00:01.500");
    }

    #[test]
    fn console_commands_reach_the_hardware() {
        let shared = SharedState::new();
        let mut app = app(&shared);

        type_line(&mut app, &shared, "bkl 1\r");
        assert!(app.board().backlight);

        type_line(&mut app, &shared, "button 0\r");
        assert!(app.board().masked);
        assert!(!shared.buttons.is_enabled());

        type_line(&mut app, &shared, "lcdclr\rlcdwrite hello\r");
        assert_eq!(app.display().row(0).trim_end(), "hello");

        type_line(&mut app, &shared, "gettime\r");
        assert!(app.console().0.ends_with("gettime\r\n12/30/2024 23:59:58\r\n"));
    }

    #[test]
    fn clock_changes_and_overruns_are_logged() {
        let shared = SharedState::new();
        let mut app = app(&shared);

        type_line(&mut app, &shared, "settime 2025 1 2 4 3 4 61\r");
        assert!(app.console().0.contains("Invalid sec, kept\r\n[CLK] Set to 01/02/2025 03:04:58\r\n"));

        shared.input_overrun.raise();
        app.poll().unwrap();
        assert!(app.console().0.ends_with("[ERR] Console input overrun, bytes dropped\r\n"));
    }

    #[test]
    fn console_and_menu_share_one_stopwatch() {
        let shared = SharedState::new();
        let mut app = app(&shared);
        type_line(&mut app, &shared, "timer start\r");
        assert!(app.stopwatch().is_running());

        press(&mut app, &shared, Button::Center);
        press(&mut app, &shared, Button::Down);
        assert_eq!(app.display().row(1).trim_end(), "Running");

        type_line(&mut app, &shared, "timer stop\r");
        assert!(app.console().0.contains("Time: 0 days 00:00:00.000"));
    }
}
