use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Tabs, Wrap};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::bracket::{BracketView, COLUMN_GAP, Stroke, canvas_height};
use crate::state::app_settings::MIN_BOX_SIZE;
use crate::state::loader::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;
use bracket_layout::{Match, build_grid, round_of};
use log::error;

static TABS: &[&str; 3] = &["Bracket", "Match", "Help"];

static KEY_BINDINGS: &[(&str, &str)] = &[
    ("h / ←", "previous round"),
    ("l / →", "next round (toward the final)"),
    ("j / ↓", "next match in the round"),
    ("k / ↑", "previous match in the round"),
    ("Enter / click", "open the highlighted match"),
    ("u / d, wheel", "scroll the bracket"),
    ("r", "reload the bracket"),
    ("f", "toggle full screen"),
    ("\"", "toggle the log pane"),
    ("?", "help, Esc to go back"),
    ("q", "quit"),
];

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Bracket => draw_bracket(f, layout.main, app),
            MenuItem::MatchDetail => draw_match_detail(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main),
        }

        if app.state.show_logs {
            draw_logs(f, layout.logs);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });
    if let Err(err) = result {
        error!("draw failed: {err}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Bracket => 0,
        MenuItem::MatchDetail => 1,
        MenuItem::Help => 2,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

/// Narrowest viewport that still fits one minimal box per round.
fn min_bracket_width(rounds: usize) -> u16 {
    let rounds = rounds.max(1) as u16;
    rounds
        .saturating_mul(MIN_BOX_SIZE)
        .saturating_add(rounds.saturating_sub(1).saturating_mul(COLUMN_GAP))
}

fn draw_bracket(f: &mut Frame, area: Rect, app: &mut App) {
    let block = default_border(Color::White).title(" Bracket ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.state.bracket.matches.is_empty() {
        let msg = if let Some(err) = app.state.last_error.as_deref() {
            format!("Bracket load failed:\n{err}")
        } else if app.state.bracket.loaded_at.is_some() {
            format!("{} has no matches", app.settings.source)
        } else {
            format!("Loading {}...", app.settings.source)
        };
        app.state.bracket.layout.clear_geometry();
        draw_message(f, inner, msg);
        return;
    }

    let [header, key_legend, content] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(1), Constraint::Fill(1)]).areas(inner);

    let bracket = &mut app.state.bracket;
    let mut header_spans = vec![Span::raw(format!(
        "{} | {} matches, {} rounds | loaded {}",
        app.settings.source,
        bracket.matches.len(),
        bracket.rounds,
        bracket.loaded_at.as_deref().unwrap_or("-"),
    ))];
    if let Some(err) = app.state.last_error.as_deref() {
        header_spans.push(Span::styled(format!(" | refresh failed: {err}"), Style::default().fg(Color::Red)));
    }
    f.render_widget(Paragraph::new(Line::from(header_spans)), header);
    f.render_widget(
        Paragraph::new("Keys: h/l=round  j/k=match  Enter=open  u/d=scroll  r=reload  ?=help  q=quit")
            .style(Style::default().fg(Color::DarkGray)),
        key_legend,
    );

    let viewport = bracket.layout.viewport();
    let min_width = min_bracket_width(bracket.rounds);
    if viewport.width < min_width || content.width < min_width {
        bracket.layout.clear_geometry();
        draw_message(
            f,
            content,
            format!("Terminal too narrow for {} rounds (need {min_width} columns)", bracket.rounds),
        );
        return;
    }

    let box_height = app.settings.box_height.min(content.height.max(MIN_BOX_SIZE));
    let total_height = canvas_height(&build_grid(&bracket.matches), content.height, box_height);
    bracket.scroll_offset = bracket.scroll_offset.min(total_height.saturating_sub(content.height));

    f.render_widget(
        BracketView {
            matches: &bracket.matches,
            layout: &mut bracket.layout,
            selected: bracket.selected,
            scroll_offset: bracket.scroll_offset,
            box_width: app.settings.box_width,
            box_height,
            stroke: Stroke::from_weight(app.settings.stroke_weight),
        },
        content,
    );
}

fn draw_match_detail(f: &mut Frame, area: Rect, app: &mut App) {
    let block = default_border(Color::White).title(" Match ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(m) = app.state.detail.current.as_ref() else {
        draw_message(f, inner, "Select a match on the Bracket tab and press Enter, or click it".to_string());
        return;
    };

    let lines = match_detail_lines(m, &app.state.bracket.matches, app.state.bracket.rounds);
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    let total = paragraph.line_count(inner.width) as u16;
    let detail = &mut app.state.detail;
    detail.scroll_offset = detail.scroll_offset.min(total.saturating_sub(inner.height));
    f.render_widget(paragraph.scroll((detail.scroll_offset, 0)), inner);
}

fn match_detail_lines(m: &Match, matches: &[Match], rounds: usize) -> Vec<Line<'static>> {
    let label = Style::default().fg(Color::DarkGray);
    let id_of = |index: usize| {
        matches
            .iter()
            .find(|other| other.index == index)
            .map_or_else(|| format!("index {index}"), |other| format!("#{}", other.match_id))
    };

    let round = rounds.saturating_sub(round_of(m.index));
    let feeds_into = match m.parent_index {
        Some(parent) => id_of(parent),
        None => "nothing (final)".to_string(),
    };
    let fed_by: Vec<String> = matches
        .iter()
        .filter(|other| other.parent_index == Some(m.index))
        .map(|other| format!("#{}", other.match_id))
        .collect();
    let fed_by = if fed_by.is_empty() { "nothing (first round)".to_string() } else { fed_by.join(", ") };

    let mut lines = vec![
        Line::from(Span::styled(
            format!("Match #{}", m.match_id),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![Span::styled("round      ", label), Span::raw(format!("{round} of {rounds}"))]),
        Line::from(vec![Span::styled("index      ", label), Span::raw(m.index.to_string())]),
        Line::from(vec![Span::styled("feeds into ", label), Span::raw(feeds_into)]),
        Line::from(vec![Span::styled("fed by     ", label), Span::raw(fed_by)]),
        Line::from(""),
    ];
    if m.payload.is_empty() {
        lines.push(Line::from(Span::styled("no payload", label)));
    } else {
        let json = serde_json::to_string_pretty(&m.payload).unwrap_or_default();
        lines.extend(json.lines().map(|l| Line::from(l.to_string())));
    }
    lines
}

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::DarkGray).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines: Vec<Line> = KEY_BINDINGS
        .iter()
        .map(|(keys, action)| {
            Line::from(vec![
                Span::styled(format!("{keys:>16}  "), Style::default().fg(Color::Yellow)),
                Span::raw(*action),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Cyan))
        .style_debug(Style::default().fg(Color::DarkGray));
    f.render_widget(logs, area);
}

fn draw_message(f: &mut Frame, area: Rect, msg: String) {
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}
