//! # Key Handling
//!
//! Maps key events onto [`App`] operations.
//!
//! ## Global
//! - `Tab` / `Shift+Tab` - Next / previous field
//! - `Ctrl+r` - Reload playbooks and images
//! - `Ctrl+c` - Cancel the running playbook, or quit when idle
//! - `F1` - Show/hide help
//! - `Esc` - Quit (refused while a playbook is running)
//!
//! ## Form
//! - `Up` / `Down` (`k` / `j`) - Change dropdown selection
//! - `Space` - Toggle "Run in container", press a button
//! - `Enter` - In the folder field: load playbooks; on "Load Playbooks":
//!   load; anywhere else: run the selected playbook
//!
//! ## Output Pane
//! - `j` / `k` - Scroll down/up by line
//! - `Ctrl+d` / `Ctrl+u` - Scroll down/up by half page
//! - `G` - Jump to bottom
//! - `gg` - Jump to top
//! - `q` - Return to the form

use crate::spawn::ProcessSpawner;
use crate::ui::app::{App, FocusField, StatusLevel};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Size of the area playbook output is rendered into (columns, rows)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneSize {
    pub cols: u16,
    pub rows: u16,
}

/// Apply one key press to the panel.
pub fn handle_key(app: &mut App, key: KeyEvent, spawner: &dyn ProcessSpawner, pane: PaneSize) {
    if key.kind == KeyEventKind::Release {
        return;
    }

    let has_ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Help modal swallows everything but its own close keys
    if app.show_help {
        if matches!(key.code, KeyCode::F(1) | KeyCode::Esc | KeyCode::Char('q')) {
            app.toggle_help();
        }
        return;
    }

    match key.code {
        KeyCode::Char('c') if has_ctrl => {
            if app.is_running() {
                app.cancel_run();
            } else {
                app.should_quit = true;
            }
            return;
        }
        KeyCode::Char('r') if has_ctrl => {
            app.reload(spawner);
            return;
        }
        KeyCode::F(1) => {
            app.toggle_help();
            return;
        }
        KeyCode::Tab => {
            app.focus_next();
            return;
        }
        KeyCode::BackTab => {
            app.focus_previous();
            return;
        }
        KeyCode::Esc if app.focus != FocusField::Output => {
            if app.is_running() {
                app.set_status(
                    StatusLevel::Warning,
                    "A playbook is running: Ctrl+C to cancel it first",
                );
            } else {
                app.should_quit = true;
            }
            return;
        }
        _ => {}
    }

    match app.focus {
        FocusField::Folder => match key.code {
            KeyCode::Enter => app.load_playbooks(spawner),
            KeyCode::Backspace => app.input_backspace(),
            KeyCode::Char(c) if !has_ctrl => app.input_char(c),
            _ => {}
        },
        FocusField::ExtraArgs => match key.code {
            KeyCode::Enter => submit(app, spawner, pane),
            KeyCode::Backspace => app.input_backspace(),
            KeyCode::Char(c) if !has_ctrl => app.input_char(c),
            _ => {}
        },
        FocusField::Playbook => match key.code {
            KeyCode::Down | KeyCode::Char('j') => app.select_next_playbook(),
            KeyCode::Up | KeyCode::Char('k') => app.select_previous_playbook(),
            KeyCode::Enter => submit(app, spawner, pane),
            _ => {}
        },
        FocusField::Image => match key.code {
            KeyCode::Down | KeyCode::Char('j') => app.select_next_image(),
            KeyCode::Up | KeyCode::Char('k') => app.select_previous_image(),
            KeyCode::Enter => submit(app, spawner, pane),
            _ => {}
        },
        FocusField::RunInContainer => match key.code {
            KeyCode::Char(' ') => app.toggle_run_in_container(),
            KeyCode::Enter => submit(app, spawner, pane),
            _ => {}
        },
        FocusField::LoadButton => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                app.load_playbooks(spawner);
            }
        }
        FocusField::RunButton => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                submit(app, spawner, pane);
            }
        }
        FocusField::Output => handle_output_key(app, key, pane),
    }
}

fn submit(app: &mut App, spawner: &dyn ProcessSpawner, pane: PaneSize) {
    app.submit(spawner, pane.cols, pane.rows);
}

/// Neovim-style scrolling in the output pane
fn handle_output_key(app: &mut App, key: KeyEvent, pane: PaneSize) {
    let has_ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let visible = pane.rows as usize;

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.focus = FocusField::RunButton;
            app.pending_g = false;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.scroll_output_down();
            app.pending_g = false;
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.scroll_output_up();
            app.pending_g = false;
        }
        KeyCode::Char('d') if has_ctrl => {
            app.scroll_output_half_page_down(visible);
        }
        KeyCode::Char('u') if has_ctrl => {
            app.scroll_output_half_page_up(visible);
        }
        KeyCode::PageDown => app.scroll_output_half_page_down(visible * 2),
        KeyCode::PageUp => app.scroll_output_half_page_up(visible * 2),
        KeyCode::Char('G') | KeyCode::End => {
            app.scroll_output_to_bottom();
            app.pending_g = false;
        }
        KeyCode::Char('g') => {
            if app.pending_g {
                app.scroll_output_to_top();
                app.pending_g = false;
            } else {
                app.pending_g = true;
            }
        }
        KeyCode::Home => app.scroll_output_to_top(),
        _ => {
            app.pending_g = false;
        }
    }
}
