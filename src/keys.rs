use crate::app::{App, MenuItem};
use crate::state::messages::LoadRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Rows moved per `u`/`d` press.
const SCROLL_STEP: u16 = 5;
/// Rows moved per mouse wheel notch.
const WHEEL_STEP: u16 = 3;

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    load_requests: &mpsc::Sender<LoadRequest>,
) {
    let mut guard = app.lock().await;

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => guard.quit(),

        // Tab switching
        (_, Char('1'), _) => guard.update_tab(MenuItem::Bracket),
        (_, Char('2'), _) => guard.update_tab(MenuItem::MatchDetail),
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Bracket navigation
        (MenuItem::Bracket, Char('l') | KeyCode::Right, _) => guard.bracket_next_round(),
        (MenuItem::Bracket, Char('h') | KeyCode::Left, _) => guard.bracket_prev_round(),
        (MenuItem::Bracket, Char('j') | KeyCode::Down, _) => guard.bracket_game_down(),
        (MenuItem::Bracket, Char('k') | KeyCode::Up, _) => guard.bracket_game_up(),
        (MenuItem::Bracket, Char('d') | KeyCode::PageDown, _) => guard.bracket_scroll_down(SCROLL_STEP),
        (MenuItem::Bracket, Char('u') | KeyCode::PageUp, _) => guard.bracket_scroll_up(SCROLL_STEP),
        (MenuItem::Bracket, KeyCode::Enter, _) => guard.bracket_click_selected(),

        // Match detail
        (MenuItem::MatchDetail, Char('j') | KeyCode::Down, _) => guard.detail_scroll_down(),
        (MenuItem::MatchDetail, Char('k') | KeyCode::Up, _) => guard.detail_scroll_up(),
        (MenuItem::MatchDetail, KeyCode::Esc, _) => guard.update_tab(MenuItem::Bracket),

        // Global
        (_, Char('r'), _) => {
            drop(guard);
            let _ = load_requests.send(LoadRequest::Load).await;
        }
        (_, Char('f'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }
}

pub async fn handle_mouse(mouse_event: MouseEvent, app: &Arc<Mutex<App>>) -> bool {
    let mut guard = app.lock().await;
    match mouse_event.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            guard.bracket_click_at(mouse_event.column, mouse_event.row);
            true
        }
        MouseEventKind::ScrollDown => {
            guard.bracket_scroll_down(WHEEL_STEP);
            true
        }
        MouseEventKind::ScrollUp => {
            guard.bracket_scroll_up(WHEEL_STEP);
            true
        }
        _ => false,
    }
}
