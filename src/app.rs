use crate::state::app_settings::AppSettings;
use crate::state::app_state::AppState;
use bracket_layout::{LayoutCoordinator, Match};
use log::debug;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Bracket,
    MatchDetail,
    Help,
}

#[derive(Debug)]
pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new(settings: AppSettings, layout: LayoutCoordinator) -> Self {
        log::set_max_level(settings.log_level);
        tui_logger::set_default_level(settings.log_level);

        Self {
            state: AppState::new(layout),
            settings,
        }
    }

    // -----------------------------------------------------------------------
    // Loader and layout events, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_matches_loaded(&mut self, matches: Vec<Match>, rounds: usize) {
        self.state.last_error = None;
        self.state.bracket.load(matches, rounds);
    }

    pub fn on_error(&mut self, message: String) {
        self.state.last_error = Some(message);
    }

    /// The viewport subscription fired. Returns true when a redraw is due.
    pub fn on_resize(&mut self) -> bool {
        self.state.bracket.layout.poll_viewport()
    }

    /// Reaction to the coordinator's click handler: show the match.
    pub fn on_match_clicked(&mut self, m: Match) {
        debug!("match {} ({}) clicked", m.index, m.match_id);
        let changed = self.state.detail.current.as_ref().map(|c| c.index) != Some(m.index);
        if changed {
            self.state.detail.scroll_offset = 0;
        }
        self.state.detail.current = Some(m);
        self.update_tab(MenuItem::MatchDetail);
    }

    /// Release the viewport subscription before the terminal goes away.
    pub fn teardown(&mut self) {
        self.state.bracket.layout.teardown();
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    pub fn quit(&mut self) {
        self.state.should_quit = true;
    }

    // -----------------------------------------------------------------------
    // Bracket navigation, delegated to BracketState
    // -----------------------------------------------------------------------

    pub fn bracket_next_round(&mut self) {
        self.state.bracket.navigate_round_next();
    }

    pub fn bracket_prev_round(&mut self) {
        self.state.bracket.navigate_round_prev();
    }

    pub fn bracket_game_down(&mut self) {
        self.state.bracket.navigate_game_down();
    }

    pub fn bracket_game_up(&mut self) {
        self.state.bracket.navigate_game_up();
    }

    pub fn bracket_scroll_down(&mut self, rows: u16) {
        self.state.bracket.scroll_down(rows);
    }

    pub fn bracket_scroll_up(&mut self, rows: u16) {
        self.state.bracket.scroll_up(rows);
    }

    pub fn bracket_click_selected(&mut self) {
        self.state.bracket.click_selected();
    }

    pub fn bracket_click_at(&mut self, x: u16, y: u16) {
        if self.state.active_tab == MenuItem::Bracket {
            self.state.bracket.click_at(x, y);
        }
    }

    pub fn detail_scroll_down(&mut self) {
        self.state.detail.scroll_offset = self.state.detail.scroll_offset.saturating_add(1);
    }

    pub fn detail_scroll_up(&mut self) {
        self.state.detail.scroll_offset = self.state.detail.scroll_offset.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bracket_layout::{Viewport, ViewportSize};

    fn app(viewport: &Viewport) -> App {
        App::new(AppSettings::default(), LayoutCoordinator::new(viewport.subscribe()))
    }

    #[test]
    fn clicked_match_opens_detail_tab() {
        let viewport = Viewport::new(ViewportSize::new(80, 24));
        let mut app = app(&viewport);
        app.state.detail.scroll_offset = 3;
        app.on_match_clicked(Match::new(1, Some(0), "sf-1"));
        assert_eq!(app.state.active_tab, MenuItem::MatchDetail);
        assert_eq!(app.state.previous_tab, MenuItem::Bracket);
        assert_eq!(app.state.detail.scroll_offset, 0);
        assert_eq!(app.state.detail.current.as_ref().map(|m| m.index), Some(1));
    }

    #[test]
    fn help_returns_to_previous_tab() {
        let viewport = Viewport::new(ViewportSize::new(80, 24));
        let mut app = app(&viewport);
        app.update_tab(MenuItem::MatchDetail);
        app.update_tab(MenuItem::Help);
        app.exit_help();
        assert_eq!(app.state.active_tab, MenuItem::MatchDetail);
    }

    #[test]
    fn load_error_then_success_clears_error() {
        let viewport = Viewport::new(ViewportSize::new(80, 24));
        let mut app = app(&viewport);
        app.on_error("boom".into());
        assert_eq!(app.state.last_error.as_deref(), Some("boom"));
        app.on_matches_loaded(vec![Match::new(0, None, 1i64)], 1);
        assert!(app.state.last_error.is_none());
        assert_eq!(app.state.bracket.selected, Some(0));
    }

    #[test]
    fn resize_reaches_the_coordinator_and_teardown_unsubscribes() {
        let viewport = Viewport::new(ViewportSize::new(80, 24));
        let mut app = app(&viewport);
        assert!(!app.on_resize());
        viewport.resize(100, 30);
        assert!(app.on_resize());
        assert_eq!(app.state.bracket.layout.viewport(), ViewportSize::new(100, 30));

        app.teardown();
        assert_eq!(viewport.subscriber_count(), 0);
    }
}
