//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] actions.  In normal mode keys are
//! commands; in the search and date modes printable keys edit the input
//! buffer.
//!
//! ## For contributors
//!
//! To add a new keybinding:
//!
//! 1. Add a method on [`App`] for the action (if one doesn't exist).
//! 2. Add a `KeyCode` match arm in [`handle_normal_key`] that calls it.
//! 3. Update the help text in [`crate::ui`]'s status bar.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::app::{App, InputMode};

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_key(app, key),
        InputMode::Search | InputMode::DateStart | InputMode::DateEnd => handle_edit_key(app, key),
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.quit = true,
        KeyCode::Esc => app.back(),
        KeyCode::Enter => app.open_detail(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Char('/') => app.start_search(),
        KeyCode::Char('s') => app.cycle_sort(),
        KeyCode::Char('d') => app.start_date_entry(),
        KeyCode::Char('D') => app.clear_date_range(),
        KeyCode::Char('r') => app.request_fetch(),
        _ => {}
    }
}

fn handle_edit_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_input(),
        KeyCode::Esc => app.cancel_input(),
        KeyCode::Backspace => app.pop_char(),
        KeyCode::Char(c) => app.push_char(c),
        _ => {}
    }
}
