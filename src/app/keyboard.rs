//! Keyboard input handling

use super::App;
use crate::dom::CustomEvent;
use crate::toast::URL_ADDED;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

impl App {
    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyEvent) {
        // Handle Ctrl+C always
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            // Same event the server triggers after a successful submission
            KeyCode::Char('a') => {
                self.dispatch(&CustomEvent::new(URL_ADDED));
            }
            KeyCode::Char('d') => {
                self.debug_mode = !self.debug_mode;
                self.needs_render = true;
                tracing::debug!(debug_mode = self.debug_mode, "Toggled event log");
            }
            _ => {}
        }
    }
}
