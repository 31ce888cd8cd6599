//! Menu navigation state machine
//!
//! Polled from the main loop with the button taken from the debouncer
//! slot. Nothing here runs in interrupt context; the inactivity interrupt
//! only raises a flag and the main loop calls [`Navigator::revert_to_idle`].

pub mod time_edit;
pub mod tree;

use heapless::String;
use ufmt::uDisplay;

use crate::clock::{Clock, Date, ElapsedTime, Lap, TimeOfDay};
use crate::config::LCD_COLUMNS;
use crate::drivers::button_handler::Button;
use crate::drivers::lcd::{write_line, Display};
use crate::os::RefreshRequest;

use time_edit::TimeEditor;
use tree::{Action, MenuTree, NodeId, ROOT};

const ROW_LEN: usize = LCD_COLUMNS as usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuState {
    Idle,
    MainMenu,
    EditingTime,
}

/// Side effects the menu triggers outside the display
pub trait MenuHost {
    fn stopwatch_running(&self) -> bool;
    /// Starts a stopped stopwatch (`None`) or stops a running one
    fn toggle_stopwatch(&mut self) -> Option<ElapsedTime>;
    fn set_backlight(&mut self, on: bool);
    fn enter_bootloader(&mut self);
}

/// Everything one menu step may touch
pub struct MenuContext<'a, D, H> {
    pub display: &'a mut D,
    pub clock: &'a Clock,
    pub refresh: &'a RefreshRequest,
    pub host: &'a mut H,
}

pub struct Navigator {
    tree: MenuTree,
    state: MenuState,
    cursor: NodeId,
    editor: TimeEditor,
}

impl Navigator {
    pub const fn new(tree: MenuTree) -> Self {
        Self {
            tree,
            state: MenuState::Idle,
            cursor: ROOT,
            editor: TimeEditor::new(),
        }
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn cursor(&self) -> NodeId {
        self.cursor
    }

    pub fn label(&self) -> &'static str {
        self.tree.node(self.cursor).label
    }

    pub fn handle_button<D: Display, H: MenuHost>(&mut self, button: Button, ctx: &mut MenuContext<'_, D, H>) {
        match self.state {
            MenuState::Idle => self.open(ctx),
            MenuState::MainMenu => self.navigate(button, ctx),
            MenuState::EditingTime => self.edit(button, ctx),
        }
    }

    /// Inactivity timeout: drop whatever is on screen and show the clock
    pub fn revert_to_idle<D: Display, H: MenuHost>(&mut self, ctx: &mut MenuContext<'_, D, H>) {
        if self.state == MenuState::EditingTime {
            self.editor.cancel(ctx.display);
        }
        self.state = MenuState::Idle;
        self.cursor = ROOT;
        ctx.refresh.set_idle_mode(true);
        ctx.display.clear();
        render_idle(ctx.display, ctx.clock);
    }

    fn open<D: Display, H: MenuHost>(&mut self, ctx: &mut MenuContext<'_, D, H>) {
        ctx.refresh.set_idle_mode(false);
        self.state = MenuState::MainMenu;
        self.cursor = ROOT;
        self.enter(ctx);
    }

    fn navigate<D: Display, H: MenuHost>(&mut self, button: Button, ctx: &mut MenuContext<'_, D, H>) {
        let node = self.tree.node(self.cursor);
        let target = match button {
            Button::Left => node.parent,
            Button::Right => node.first_child,
            Button::Up => Some(node.prev),
            Button::Down => Some(node.next),
            Button::Center => {
                if let Some(action) = node.on_select {
                    self.run(action, ctx);
                }
                return;
            }
        };

        match target {
            Some(id) if id != self.cursor => {
                self.cursor = id;
                self.enter(ctx);
            }
            _ => {}
        }
    }

    fn edit<D: Display, H: MenuHost>(&mut self, button: Button, ctx: &mut MenuContext<'_, D, H>) {
        match button {
            Button::Left => self.editor.move_left(ctx.display),
            Button::Right => self.editor.move_right(ctx.display),
            Button::Up => self.editor.adjust(ctx.display, true),
            Button::Down => self.editor.adjust(ctx.display, false),
            Button::Center => {
                self.editor.commit(ctx.display, ctx.clock);
                self.state = MenuState::MainMenu;
                self.enter(ctx);
            }
        }
    }

    /// Redraws the node under the cursor and runs its on-enter action
    fn enter<D: Display, H: MenuHost>(&mut self, ctx: &mut MenuContext<'_, D, H>) {
        let node = self.tree.node(self.cursor);
        ctx.display.clear();
        write_line(ctx.display, 0, node.label);
        if node.first_child.is_some() {
            ctx.display.goto(LCD_COLUMNS - 1, 0);
            ctx.display.write(">");
        }
        if let Some(action) = node.on_enter {
            self.run(action, ctx);
        }
    }

    fn run<D: Display, H: MenuHost>(&mut self, action: Action, ctx: &mut MenuContext<'_, D, H>) {
        let line = match action {
            Action::ShowTime => row_text(TimeOfDay(&ctx.clock.get_time())),
            Action::ShowDate => row_text(Date(&ctx.clock.get_time())),
            Action::ShowStopwatch => row_text(if ctx.host.stopwatch_running() { "Running" } else { "Stopped" }),
            Action::ToggleStopwatch => match ctx.host.toggle_stopwatch() {
                Some(elapsed) => row_text(Lap(&elapsed)),
                None => row_text("Running"),
            },
            Action::EditTime => {
                self.state = MenuState::EditingTime;
                self.editor.begin(ctx.display, ctx.clock);
                return;
            }
            Action::BacklightOn => {
                ctx.host.set_backlight(true);
                row_text("Backlight on")
            }
            Action::BacklightOff => {
                ctx.host.set_backlight(false);
                row_text("Backlight off")
            }
            Action::EnterBootloader => {
                ctx.host.enter_bootloader();
                return;
            }
        };
        write_line(ctx.display, 1, line.as_str());
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(MenuTree::default())
    }
}

/// Idle screen: time on the first row, date on the second
pub fn render_idle<D: Display>(display: &mut D, clock: &Clock) {
    let now = clock.get_time();
    write_line(display, 0, row_text(TimeOfDay(&now)).as_str());
    write_line(display, 1, row_text(Date(&now)).as_str());
}

/// One display row of `value`; text wider than the row shows as all '#'
fn row_text<T: uDisplay>(value: T) -> String<ROW_LEN> {
    let mut line = String::new();
    if ufmt::uwrite!(line, "{}", value).is_err() {
        line.clear();
        for _ in 0..ROW_LEN {
            let _ = line.push('#');
        }
    }
    line
}
