mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::AppSettings;
use crate::state::loader::{LoaderWorker, LoadingState};
use crate::state::messages::{LoadRequest, LoadResponse, UiEvent};
use crate::state::refresher::PeriodicRefresher;
use bracket_layout::source::MatchSource;
use bracket_layout::{LayoutCoordinator, Match, Viewport, ViewportSize};
use crossterm::event::{self as crossterm_event, DisableMouseCapture, EnableMouseCapture, Event};
use crossterm::{cursor, execute, terminal};
use log::{error, info};
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut settings = AppSettings::load();
    match parse_cli_args(std::env::args().skip(1)) {
        CliAction::Run(Some(source)) => settings.source = source,
        CliAction::Run(None) => {}
        CliAction::Exit => return Ok(()),
    }

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(log::LevelFilter::Trace)?;
    tui_logger::set_default_level(settings.log_level);

    let size = terminal.size()?;
    let viewport = Viewport::new(ViewportSize::new(size.width, size.height));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (load_req_tx, load_req_rx) = mpsc::channel::<LoadRequest>(100);
    let (load_resp_tx, load_resp_rx) = mpsc::channel::<LoadResponse>(100);

    // Clicks leave the coordinator as UI events so the handler never needs the app lock.
    let click_tx = ui_event_tx.clone();
    let layout = LayoutCoordinator::new(viewport.subscribe()).with_click_handler(move |m: &Match| {
        if click_tx.try_send(UiEvent::MatchClicked(m.clone())).is_err() {
            error!("dropped click on match {}", m.index);
        }
    });

    let refresh_interval = settings.refresh_interval;
    let loader = LoaderWorker::new(settings.source.clone(), load_req_rx, load_resp_tx);
    let app = Arc::new(Mutex::new(App::new(settings, layout)));

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Loader thread
    let loader_task = tokio::spawn(loader.run());

    // Periodic reload thread
    let periodic_task = refresh_interval.map(|period| {
        info!("reloading every {}s", period.as_secs());
        tokio::spawn(PeriodicRefresher::new(load_req_tx.clone(), period).run())
    });

    // Trigger bracket load on startup
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app.clone(), &viewport, ui_event_rx, load_req_tx, load_resp_rx).await;

    app.lock().await.teardown();
    input_handler.abort();
    loader_task.abort();
    if let Some(task) = periodic_task {
        task.abort();
    }
    cleanup_terminal();

    Ok(())
}

#[derive(Debug, PartialEq)]
enum CliAction {
    Run(Option<MatchSource>),
    Exit,
}

fn parse_cli_args(mut args: impl Iterator<Item = String>) -> CliAction {
    let Some(arg) = args.next() else {
        return CliAction::Run(None);
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            CliAction::Exit
        }
        "-V" | "--version" => {
            println!("bracket-tui {}", env!("CARGO_PKG_VERSION"));
            CliAction::Exit
        }
        flag if flag.starts_with('-') => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
        source => CliAction::Run(Some(MatchSource::from_arg(source))),
    }
}

fn usage_text() -> &'static str {
    "bracket-tui - single-elimination bracket viewer

Usage:
  bracket-tui [PATH|URL]
  bracket-tui --help
  bracket-tui --version

Without a source the built-in sample bracket is shown.

Environment:
  BRACKET_SOURCE          Path or http(s) URL of a match list (overridden by the argument)
  BRACKET_LOG_LEVEL       error, warn, info, debug or trace (default error)
  BRACKET_STROKE_WEIGHT   Connector weight: 0 hidden, 1 thin, 2+ thick (default 8)
  BRACKET_BOX_WIDTH       Match box width in columns (default 24)
  BRACKET_BOX_HEIGHT      Match box height in rows (default 5)
  BRACKET_REFRESH_SECS    Reload period in seconds, 0 disables (default 30)"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    viewport: &Viewport,
    mut ui_events: mpsc::Receiver<UiEvent>,
    load_requests: mpsc::Sender<LoadRequest>,
    mut load_responses: mpsc::Receiver<LoadResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, viewport, &load_requests).await;
                let mut app_guard = app.lock().await;
                if app_guard.state.should_quit {
                    break;
                }
                if should_redraw && !loading.is_loading {
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = load_responses.recv() => {
                let should_redraw = handle_load_response(response, &app, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    viewport: &Viewport,
    load_requests: &mpsc::Sender<LoadRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            let _ = load_requests.send(LoadRequest::Load).await;
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, load_requests).await;
            true
        }
        UiEvent::Mouse(mouse_event) => keys::handle_mouse(mouse_event, app).await,
        UiEvent::Resize { width, height } => {
            viewport.resize(width, height);
            app.lock().await.on_resize()
        }
        UiEvent::MatchClicked(m) => {
            app.lock().await.on_match_clicked(m);
            true
        }
    }
}

async fn handle_load_response(
    response: LoadResponse,
    app: &Arc<Mutex<App>>,
    loading: &mut LoadingState,
) -> bool {
    match response {
        LoadResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
            return true;
        }
        LoadResponse::MatchesLoaded { matches, rounds } => {
            let mut guard = app.lock().await;
            guard.on_matches_loaded(matches, rounds);
        }
        LoadResponse::Error { message } => {
            let mut guard = app.lock().await;
            guard.on_error(message);
        }
    }
    !loading.is_loading
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Mouse(mouse_event) => Some(UiEvent::Mouse(mouse_event)),
                Event::Resize(width, height) => Some(UiEvent::Resize { width, height }),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, EnableMouseCapture)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

/// Best effort: also runs from the panic hook, where a second failure has
/// nowhere to go.
pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, DisableMouseCapture);
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn no_argument_keeps_configured_source() {
        assert_eq!(parse_cli_args(args(&[])), CliAction::Run(None));
    }

    #[test]
    fn positional_argument_selects_source() {
        assert_eq!(
            parse_cli_args(args(&["bracket.json"])),
            CliAction::Run(Some(MatchSource::File(PathBuf::from("bracket.json"))))
        );
        assert_eq!(
            parse_cli_args(args(&["https://example.com/b.json"])),
            CliAction::Run(Some(MatchSource::Url("https://example.com/b.json".into())))
        );
    }

    #[test]
    fn help_and_version_exit() {
        assert_eq!(parse_cli_args(args(&["--help"])), CliAction::Exit);
        assert_eq!(parse_cli_args(args(&["-V"])), CliAction::Exit);
    }
}
