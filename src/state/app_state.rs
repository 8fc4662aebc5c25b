use crate::app::MenuItem;
use bracket_layout::{Column, LayoutCoordinator, Match, build_grid};
use chrono::Local;
use log::debug;

// ---------------------------------------------------------------------------
// Bracket state
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct BracketState {
    pub matches: Vec<Match>,
    pub rounds: usize,
    /// Wall-clock time of the last successful load, for the header.
    pub loaded_at: Option<String>,
    /// Index of the highlighted match.
    pub selected: Option<usize>,
    /// Vertical scroll offset in terminal rows (tall brackets on short terminals).
    pub scroll_offset: u16,
    pub layout: LayoutCoordinator,
}

impl BracketState {
    pub fn new(layout: LayoutCoordinator) -> Self {
        Self {
            matches: Vec::new(),
            rounds: 0,
            loaded_at: None,
            selected: None,
            scroll_offset: 0,
            layout,
        }
    }

    /// Replace the match list. Selection and scroll survive a reload of the
    /// same bracket shape.
    pub fn load(&mut self, matches: Vec<Match>, rounds: usize) {
        let same_shape = matches.len() == self.matches.len();
        if !same_shape {
            debug!("bracket shape changed: {} -> {} matches", self.matches.len(), matches.len());
            self.scroll_offset = 0;
        }
        self.selected = match self.selected {
            Some(index) if same_shape => Some(index),
            _ => first_slot(&matches),
        };
        self.matches = matches;
        self.rounds = rounds;
        self.loaded_at = Some(Local::now().format("%H:%M:%S").to_string());
    }

    pub fn selected_match(&self) -> Option<&Match> {
        let index = self.selected?;
        self.matches.iter().find(|m| m.index == index)
    }

    /// Move toward the final. Both feeders of a match land on it.
    pub fn navigate_round_next(&mut self) {
        self.move_selection(|col, row| Some((col + 1, row / 2)));
    }

    pub fn navigate_round_prev(&mut self) {
        self.move_selection(|col, row| Some((col.checked_sub(1)?, row * 2)));
    }

    pub fn navigate_game_down(&mut self) {
        self.move_selection(|col, row| Some((col, row + 1)));
    }

    pub fn navigate_game_up(&mut self) {
        self.move_selection(|col, row| Some((col, row.checked_sub(1)?)));
    }

    pub fn scroll_down(&mut self, rows: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(rows);
    }

    pub fn scroll_up(&mut self, rows: u16) {
        self.scroll_offset = self.scroll_offset.saturating_sub(rows);
    }

    /// Click the highlighted match, as Enter does.
    pub fn click_selected(&mut self) {
        let Some(m) = self.selected.and_then(|i| self.matches.iter().find(|m| m.index == i)) else {
            return;
        };
        self.layout.click(m);
    }

    /// Click whatever box is under the terminal cell `(x, y)` and highlight it.
    pub fn click_at(&mut self, x: u16, y: u16) -> Option<usize> {
        let index = self.layout.click_at(&self.matches, f64::from(x), f64::from(y))?;
        self.selected = Some(index);
        Some(index)
    }

    fn move_selection(&mut self, step: impl FnOnce(usize, usize) -> Option<(usize, usize)>) {
        let Some(selected) = self.selected else {
            self.selected = first_slot(&self.matches);
            return;
        };
        let grid = build_grid(&self.matches);
        let Some((col, row)) = grid_position(&grid, selected) else {
            return;
        };
        let Some((col, row)) = step(col, row) else {
            return;
        };
        let target = grid
            .get(col)
            .and_then(|column| column.get(row.min(column.len().saturating_sub(1))))
            .map(|m| m.index);
        if let Some(target) = target {
            self.selected = Some(target);
        }
    }
}

/// Top match of the first round.
fn first_slot(matches: &[Match]) -> Option<usize> {
    build_grid(matches).first()?.first().map(|m| m.index)
}

fn grid_position(grid: &[Column<'_>], index: usize) -> Option<(usize, usize)> {
    grid.iter().enumerate().find_map(|(col, column)| {
        column.iter().position(|m| m.index == index).map(|row| (col, row))
    })
}

// ---------------------------------------------------------------------------
// Match detail state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct DetailState {
    /// The match most recently clicked.
    pub current: Option<Match>,
    pub scroll_offset: u16,
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub should_quit: bool,
    pub last_error: Option<String>,
    pub bracket: BracketState,
    pub detail: DetailState,
}

impl AppState {
    pub fn new(layout: LayoutCoordinator) -> Self {
        Self {
            active_tab: MenuItem::default(),
            previous_tab: MenuItem::default(),
            show_logs: false,
            should_quit: false,
            last_error: None,
            bracket: BracketState::new(layout),
            detail: DetailState::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bracket_layout::{BoxGeometry, Viewport, ViewportSize};
    use std::sync::{Arc, Mutex};

    fn bracket(rounds: u32) -> Vec<Match> {
        let count = 2usize.pow(rounds) - 1;
        (0..count)
            .map(|i| Match::new(i, (i > 0).then(|| (i - 1) / 2), i as i64))
            .collect()
    }

    fn state_with(matches: Vec<Match>) -> (BracketState, Viewport) {
        let viewport = Viewport::new(ViewportSize::new(80, 24));
        let mut state = BracketState::new(LayoutCoordinator::new(viewport.subscribe()));
        let rounds = bracket_layout::validate(&matches).unwrap();
        state.load(matches, rounds);
        (state, viewport)
    }

    #[test]
    fn load_selects_top_of_first_round() {
        let (state, _viewport) = state_with(bracket(3));
        assert_eq!(state.selected, Some(6));
        assert_eq!(state.rounds, 3);
        assert!(state.loaded_at.is_some());
    }

    #[test]
    fn reload_of_same_shape_keeps_selection_and_scroll() {
        let (mut state, _viewport) = state_with(bracket(3));
        state.selected = Some(2);
        state.scroll_offset = 4;
        state.load(bracket(3), 3);
        assert_eq!(state.selected, Some(2));
        assert_eq!(state.scroll_offset, 4);
    }

    #[test]
    fn reload_of_new_shape_resets() {
        let (mut state, _viewport) = state_with(bracket(3));
        state.selected = Some(2);
        state.scroll_offset = 4;
        state.load(bracket(2), 2);
        assert_eq!(state.selected, Some(2));
        assert_eq!(state.scroll_offset, 0);
        state.load(bracket(4), 4);
        assert_eq!(state.selected, Some(14));
    }

    #[test]
    fn navigation_follows_the_bracket() {
        let (mut state, _viewport) = state_with(bracket(3));
        // First round column is [6, 5, 4, 3].
        state.navigate_game_down();
        state.navigate_game_down();
        assert_eq!(state.selected, Some(4));
        state.navigate_round_next();
        assert_eq!(state.selected, Some(1));
        state.navigate_round_next();
        assert_eq!(state.selected, Some(0));
        state.navigate_round_next();
        assert_eq!(state.selected, Some(0));
        state.navigate_round_prev();
        assert_eq!(state.selected, Some(2));
        state.navigate_round_prev();
        assert_eq!(state.selected, Some(6));
        state.navigate_round_prev();
        assert_eq!(state.selected, Some(6));
    }

    #[test]
    fn vertical_navigation_stops_at_the_edges() {
        let (mut state, _viewport) = state_with(bracket(2));
        state.navigate_game_up();
        assert_eq!(state.selected, Some(2));
        state.navigate_game_down();
        state.navigate_game_down();
        assert_eq!(state.selected, Some(1));
    }

    #[test]
    fn scrolling_saturates() {
        let (mut state, _viewport) = state_with(bracket(2));
        state.scroll_up(3);
        assert_eq!(state.scroll_offset, 0);
        state.scroll_down(5);
        state.scroll_up(2);
        assert_eq!(state.scroll_offset, 3);
    }

    #[test]
    fn enter_and_mouse_clicks_reach_the_handler() {
        let clicked: Arc<Mutex<Vec<usize>>> = Arc::default();
        let sink = clicked.clone();
        let viewport = Viewport::new(ViewportSize::new(80, 24));
        let layout = LayoutCoordinator::new(viewport.subscribe())
            .with_click_handler(move |m: &Match| sink.lock().unwrap().push(m.index));
        let mut state = BracketState::new(layout);
        state.load(bracket(2), 2);

        state.click_selected();

        state.layout.layout(&state.matches);
        state.layout.record_geometry(0, BoxGeometry::new(40.0, 10.0, 20.0, 5.0));
        assert_eq!(state.click_at(45, 12), Some(0));
        assert_eq!(state.selected, Some(0));
        assert_eq!(state.click_at(0, 0), None);

        assert_eq!(*clicked.lock().unwrap(), vec![2, 0]);
    }
}
