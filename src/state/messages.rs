use crate::state::loader::LoadingState;
use bracket_layout::Match;
use crossterm::event::{KeyEvent, MouseEvent};

#[derive(Debug, Clone)]
pub enum LoadRequest {
    /// User-visible load: shows the spinner.
    Load,
    /// Periodic reload in the background.
    Refresh,
}

#[derive(Debug)]
pub enum LoadResponse {
    LoadingStateChanged { loading_state: LoadingState },
    /// A validated match list and its round count.
    MatchesLoaded { matches: Vec<Match>, rounds: usize },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Mouse(MouseEvent),
    Resize { width: u16, height: u16 },
    AppStarted,
    /// Sent by the layout coordinator's click handler.
    MatchClicked(Match),
}
