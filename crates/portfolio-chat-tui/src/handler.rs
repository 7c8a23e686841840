use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use portfolio_chat_core::{SubmitOutcome, WidgetState};

use crate::app::App;
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => app.scroll_to_bottom(),
        AppEvent::Tick => {
            app.tick_animation();
            if let Some(outcome) = app.widget.poll_reply().await {
                log::debug!("reply resolved: {:?}", outcome);
            }
        }
    }

    app.sync_scroll();
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any state
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.widget.state() {
        WidgetState::Closed => handle_closed(app, key),
        WidgetState::Minimized => handle_minimized(app, key),
        WidgetState::Open => handle_open(app, key),
    }
}

fn handle_closed(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char('a') => {
            app.widget.open();
        }
        KeyCode::Char('q') | KeyCode::Esc => {
            app.should_quit = true;
        }
        _ => {}
    }
}

fn handle_minimized(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Tab | KeyCode::Enter => {
            app.widget.toggle_minimize();
        }
        KeyCode::Esc => {
            app.widget.close();
        }
        _ => {}
    }
}

fn handle_open(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Tab => {
            app.widget.toggle_minimize();
        }
        KeyCode::Esc => {
            app.widget.close();
        }
        KeyCode::PageUp | KeyCode::Up => app.scroll_up(),
        KeyCode::PageDown | KeyCode::Down => app.scroll_down(),
        _ if !app.widget.accepts_input() => {}
        KeyCode::Enter => submit(app),
        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.input_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.input_cursor = app.input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.input_cursor = (app.input_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.input_cursor = 0;
        }
        KeyCode::End => {
            app.input_cursor = app.input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
            app.input.insert(byte_pos, c);
            app.input_cursor += 1;
        }
        _ => {}
    }
}

fn submit(app: &mut App) {
    let input = app.input.clone();
    match app.widget.submit(&input) {
        SubmitOutcome::Rejected => {}
        SubmitOutcome::Sent => app.clear_input(),
        SubmitOutcome::Failed(err) => {
            log::warn!("question not sent: {}", err);
            app.clear_input();
        }
    }
}
