//! Keyboard input handling for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::runtime::App;
use crate::view::Route;

/// Maps a key event to an application action.
///
/// Guards on [`KeyEventKind::Press`] to avoid double-fire on some terminals.
pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit = true;
        return;
    }

    // Path editor on the data page captures every key.
    if app.input.is_some() {
        match key.code {
            KeyCode::Esc => app.cancel_edit(),
            KeyCode::Enter => {
                if let Err(e) = app.submit_edit() {
                    tracing::debug!(error = %e, "upload ignored");
                }
            }
            KeyCode::Backspace => app.pop_char(),
            KeyCode::Char(c) => app.push_char(c),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Tab | KeyCode::Right => app.next_route(),
        KeyCode::BackTab | KeyCode::Left => app.prev_route(),
        KeyCode::Char(c @ '1'..='5') => {
            let idx = (c as usize) - ('1' as usize);
            app.navigate(Route::ALL[idx]);
        }
        KeyCode::Down | KeyCode::Char('j') if app.route == Route::Alerts => {
            app.select_next_alert();
        }
        KeyCode::Up | KeyCode::Char('k') if app.route == Route::Alerts => {
            app.select_prev_alert();
        }
        KeyCode::Enter | KeyCode::Char('a') if app.route == Route::Alerts => {
            app.acknowledge_selected();
        }
        KeyCode::Char('e') | KeyCode::Enter if app.route == Route::Data => app.start_edit(),
        KeyCode::Char('r') => {
            if let Err(e) = app.reload() {
                tracing::debug!(error = %e, "reload ignored");
            }
        }
        _ => {}
    }
}
