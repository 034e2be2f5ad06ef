//! Top-level action carousel.

use super::input_logic::{wrap_next, wrap_prev};
use super::Display;
use crate::config::ROW_PITCH;

/// Actions reachable from the main menu, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuAction {
    /// Compose or pick a message and publish it to a user.
    Send,
    /// Read (and discard) the oldest unread message.
    Messages,
    /// Show display name, broker address and hardware id.
    Info,
}

impl MenuAction {
    pub const ALL: [MenuAction; 3] = [MenuAction::Send, MenuAction::Messages, MenuAction::Info];

    pub fn label(self) -> &'static str {
        match self {
            MenuAction::Send => "Send",
            MenuAction::Messages => "Messages",
            MenuAction::Info => "Info",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MenuNavigator {
    selected: usize,
}

impl MenuNavigator {
    pub const fn new() -> Self {
        Self { selected: 0 }
    }

    pub fn current(&self) -> MenuAction {
        MenuAction::ALL[self.selected % MenuAction::ALL.len()]
    }

    pub fn left<D: Display + ?Sized>(&mut self, display: &mut D) {
        self.selected = wrap_prev(self.selected, MenuAction::ALL.len());
        self.render(display);
    }

    pub fn right<D: Display + ?Sized>(&mut self, display: &mut D) {
        self.selected = wrap_next(self.selected, MenuAction::ALL.len());
        self.render(display);
    }

    pub fn render<D: Display + ?Sized>(&self, display: &mut D) {
        display.clear();
        display.draw_text("Mothership", 0);
        display.draw_text("----------------", ROW_PITCH);
        display.draw_text(self.current().label(), 2 * ROW_PITCH);
        display.present();
    }

    /// The highlighted action; the caller runs it.
    pub fn select(&self) -> MenuAction {
        let action = self.current();
        debug!("menu: selected {}", action.label());
        action
    }
}
