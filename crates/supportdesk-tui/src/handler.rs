use std::time::Instant;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use supportdesk_core::FeedbackKind;

use crate::app::{App, InputMode, Screen};
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => {
            app.tick(Instant::now());
        }
    }
    app.poll_tasks().await;
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    // Screen switching and quit are shared by every screen
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('1') => {
            app.screen = Screen::Chat;
            return;
        }
        KeyCode::Char('2') => {
            app.screen = Screen::Agent;
            return;
        }
        KeyCode::Char('3') => {
            app.screen = Screen::Admin;
            if app.report.report().is_none() && !app.report.is_loading() {
                app.load_report();
            }
            return;
        }
        KeyCode::Tab => {
            app.screen = match app.screen {
                Screen::Chat => Screen::Agent,
                Screen::Agent => Screen::Admin,
                Screen::Admin => Screen::Chat,
            };
            if app.screen == Screen::Admin && app.report.report().is_none() && !app.report.is_loading() {
                app.load_report();
            }
            return;
        }
        _ => {}
    }

    app.status = None;
    match app.screen {
        Screen::Chat => handle_chat_normal(app, key),
        Screen::Agent => handle_agent_normal(app, key),
        Screen::Admin => handle_admin_normal(app, key),
    }
}

fn handle_chat_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('i') | KeyCode::Enter => {
            app.input_mode = InputMode::Editing;
        }

        // Message selection
        KeyCode::Char('j') | KeyCode::Down => app.select_next_message(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev_message(),
        KeyCode::Esc => app.selected_message = None,

        // Transcript scrolling
        KeyCode::PageDown => {
            app.chat_scroll = app.chat_scroll.saturating_add(app.chat_height.max(1) / 2);
        }
        KeyCode::PageUp => {
            app.chat_scroll = app.chat_scroll.saturating_sub(app.chat_height.max(1) / 2);
        }
        KeyCode::Char('G') => app.scroll_chat_to_bottom(),

        // Message actions
        KeyCode::Char('+') => app.give_feedback(FeedbackKind::Positive),
        KeyCode::Char('-') => app.give_feedback(FeedbackKind::Negative),
        KeyCode::Char('c') => app.show_citation_detail = !app.show_citation_detail,
        KeyCode::Char('e') => app.toggle_handoff(),

        _ => {}
    }
}

fn handle_agent_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('g') => app.generate_suggestion(),
        KeyCode::Char('r') => app.insert_suggestion(),
        KeyCode::Char('d') => {
            app.assist.toggle_debug();
            app.debug_scroll = 0;
        }
        KeyCode::Char('j') | KeyCode::Down if app.assist.show_debug => {
            app.debug_scroll = app.debug_scroll.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up if app.assist.show_debug => {
            app.debug_scroll = app.debug_scroll.saturating_sub(1);
        }
        KeyCode::Char('i') => app.input_mode = InputMode::Editing,
        KeyCode::Char('s') => {
            app.assist.save_draft();
            app.status = Some("Draft saved.".to_string());
        }
        KeyCode::Char('S') => app.send_reply(),
        _ => {}
    }
}

fn handle_admin_normal(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('r') {
        app.load_report();
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match app.screen {
        Screen::Chat => handle_chat_editing(app, key),
        Screen::Agent => handle_draft_editing(app, key),
        Screen::Admin => app.input_mode = InputMode::Normal,
    }
}

fn handle_chat_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            // Input stays editable while a reply is pending; only submit is gated
            if !app.chat.is_loading() {
                app.submit_chat();
            }
        }
        KeyCode::Backspace => app.chat_input.backspace(),
        KeyCode::Delete => app.chat_input.delete(),
        KeyCode::Left => app.chat_input.left(),
        KeyCode::Right => app.chat_input.right(),
        KeyCode::Home => app.chat_input.home(),
        KeyCode::End => app.chat_input.end(),
        KeyCode::Char(c) => app.chat_input.insert(c),
        _ => {}
    }
}

fn handle_draft_editing(app: &mut App, key: KeyEvent) {
    let draft = &mut app.assist.reply_draft;
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => draft.push('\n'),
        KeyCode::Backspace => {
            draft.pop();
        }
        KeyCode::Char(c) => draft.push(c),
        _ => {}
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_transcript = app
        .transcript_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);

    match (app.screen, mouse.kind) {
        (Screen::Chat, MouseEventKind::ScrollDown) if in_transcript => {
            app.chat_scroll = app.chat_scroll.saturating_add(3);
        }
        (Screen::Chat, MouseEventKind::ScrollUp) if in_transcript => {
            app.chat_scroll = app.chat_scroll.saturating_sub(3);
        }
        (Screen::Agent, MouseEventKind::ScrollDown) if app.assist.show_debug => {
            app.debug_scroll = app.debug_scroll.saturating_add(3);
        }
        (Screen::Agent, MouseEventKind::ScrollUp) if app.assist.show_debug => {
            app.debug_scroll = app.debug_scroll.saturating_sub(3);
        }
        _ => {}
    }
}
