use bracket_layout::{BoxGeometry, Column, ConnectorPath, LayoutCoordinator, Match};
use serde_json::Value;
use std::collections::BTreeMap;
use tui::buffer::Buffer;
use tui::layout::{Constraint, Flex, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::symbols::line;
use tui::text::Line;
use tui::widgets::{Block, BorderType, Borders, Paragraph, Widget};

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Columns between adjacent round columns; connectors run through this gap.
pub const COLUMN_GAP: u16 = 4;

/// Minimum rows between two boxes of the busiest (first-round) column.
const ROW_GAP: u16 = 1;

// ---------------------------------------------------------------------------
// Stroke
// ---------------------------------------------------------------------------

/// How connector lines are drawn, derived from the configured stroke weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stroke {
    Hidden,
    Thin,
    Thick,
}

impl Stroke {
    pub fn from_weight(weight: u16) -> Self {
        match weight {
            0 => Stroke::Hidden,
            1 => Stroke::Thin,
            _ => Stroke::Thick,
        }
    }

    /// Glyph for each combination of `UP`, `DOWN`, `LEFT` and `RIGHT` bits.
    fn glyphs(self) -> Option<GlyphTable> {
        let set = match self {
            Stroke::Hidden => return None,
            Stroke::Thin => line::NORMAL,
            Stroke::Thick => line::THICK,
        };
        Some([
            " ",
            set.vertical,
            set.vertical,
            set.vertical,
            set.horizontal,
            set.bottom_right,
            set.top_right,
            set.vertical_left,
            set.horizontal,
            set.bottom_left,
            set.top_left,
            set.vertical_right,
            set.horizontal,
            set.horizontal_up,
            set.horizontal_down,
            set.cross,
        ])
    }
}

type GlyphTable = [&'static str; 16];

// ---------------------------------------------------------------------------
// Box placement
// ---------------------------------------------------------------------------

/// Place every match box of `grid` inside a canvas `area.width` wide.
///
/// Columns share the width evenly. Boxes are centered in their column and
/// spread with equal space around them, so a match sits level with the
/// midpoint of its two feeders. The canvas grows past `area.height` when the
/// first round needs more rows; rects are relative to a canvas whose top is
/// row 0 and whose left is `area.x`.
pub fn place_boxes(grid: &[Column<'_>], area: Rect, box_width: u16, box_height: u16) -> Vec<(usize, Rect)> {
    if grid.is_empty() || area.width == 0 {
        return Vec::new();
    }

    let canvas = Rect::new(area.x, 0, area.width, canvas_height(grid, area.height, box_height));

    let columns = Layout::horizontal(vec![Constraint::Ratio(1, grid.len() as u32); grid.len()])
        .spacing(COLUMN_GAP)
        .split(canvas);

    let mut placed = Vec::with_capacity(grid.iter().map(Vec::len).sum());
    for (column, col_area) in grid.iter().zip(columns.iter()) {
        let rows = Layout::vertical(vec![Constraint::Length(box_height); column.len()])
            .flex(Flex::SpaceAround)
            .split(*col_area);
        let width = box_width.min(col_area.width);
        let x = col_area.x + (col_area.width - width) / 2;
        for (m, row) in column.iter().zip(rows.iter()) {
            placed.push((m.index, Rect::new(x, row.y, width, box_height.min(row.height))));
        }
    }
    placed
}

/// Rows the bracket needs: the visible height, or more when the busiest
/// column cannot fit its boxes.
pub fn canvas_height(grid: &[Column<'_>], visible: u16, box_height: u16) -> u16 {
    let busiest = grid.iter().map(Vec::len).max().unwrap_or(0) as u16;
    visible.max(busiest.saturating_mul(box_height.saturating_add(ROW_GAP)))
}

/// Screen geometry of a canvas rect once the canvas is scrolled into `area`.
fn screen_geometry(rect: Rect, area: Rect, scroll: u16) -> BoxGeometry {
    BoxGeometry::new(
        f64::from(rect.x),
        f64::from(area.y) + f64::from(rect.y) - f64::from(scroll),
        f64::from(rect.width),
        f64::from(rect.height),
    )
}

// ---------------------------------------------------------------------------
// BracketView widget
// ---------------------------------------------------------------------------

/// Renders every round as a column of boxes and joins each match to the one
/// it feeds with a connector.
///
/// Rendering is also the measurement pass: each box's on-screen geometry is
/// written to the coordinator before connectors are asked for.
pub struct BracketView<'a> {
    pub matches: &'a [Match],
    pub layout: &'a mut LayoutCoordinator,
    pub selected: Option<usize>,
    pub scroll_offset: u16,
    pub box_width: u16,
    pub box_height: u16,
    pub stroke: Stroke,
}

impl Widget for BracketView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let grid = self.layout.layout(self.matches);
        if grid.is_empty() || area.is_empty() {
            self.layout.clear_geometry();
            return;
        }
        self.layout.set_visible_area(BoxGeometry::new(
            f64::from(area.x),
            f64::from(area.y),
            f64::from(area.width),
            f64::from(area.height),
        ));

        // Pass 1: measure and draw boxes.
        for (index, rect) in place_boxes(&grid, area, self.box_width, self.box_height) {
            let geometry = screen_geometry(rect, area, self.scroll_offset);
            self.layout.record_geometry(index, geometry);
            if let Some(m) = self.matches.iter().find(|m| m.index == index) {
                draw_match_box(m, geometry, self.selected == Some(index), area, buf);
            }
        }

        // Pass 2: connectors from the geometry just recorded.
        let Some(glyphs) = self.stroke.glyphs() else {
            return;
        };
        let mut lines = LineCanvas::default();
        for connector in self.layout.connectors(self.matches) {
            lines.stroke_path(&connector.path);
        }
        lines.paint(area, buf, &glyphs, Style::default().fg(Color::Indexed(244)));
    }
}

// ---------------------------------------------------------------------------
// Match boxes
// ---------------------------------------------------------------------------

/// Draw one box at `geometry`, clipped to `area`. The box is rendered off to
/// the side first so a box cut by the scroll edge keeps its real borders.
fn draw_match_box(m: &Match, geometry: BoxGeometry, selected: bool, area: Rect, buf: &mut Buffer) {
    let (width, height) = (geometry.width as u16, geometry.height as u16);
    let scratch_area = Rect::new(0, 0, width, height);
    let mut scratch = Buffer::empty(scratch_area);

    let (border_type, border_style) = if selected {
        (BorderType::Thick, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    } else {
        (BorderType::Plain, Style::default().fg(Color::Gray))
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(border_style)
        .title(box_title(m));
    let inner = block.inner(scratch_area);
    block.render(scratch_area, &mut scratch);

    let lines: Vec<Line> = payload_lines(m).into_iter().map(Line::from).collect();
    Paragraph::new(lines)
        .style(Style::default().fg(Color::White))
        .render(inner, &mut scratch);

    let left = geometry.left as i32;
    let top = geometry.top as i32;
    for sy in 0..height {
        for sx in 0..width {
            let (x, y) = (left + i32::from(sx), top + i32::from(sy));
            let Some((x, y)) = clip(x, y, area) else {
                continue;
            };
            if let (Some(src), Some(dst)) = (scratch.cell((sx, sy)), buf.cell_mut((x, y))) {
                *dst = src.clone();
            }
        }
    }
}

/// Match id plus its position in the bracket.
pub fn box_title(m: &Match) -> String {
    format!(" #{} (i{}) ", m.match_id, m.index)
}

/// Payload fields as `key: value` rows, in source order. Strings are shown
/// without quotes.
pub fn payload_lines(m: &Match) -> Vec<String> {
    m.payload
        .iter()
        .map(|(key, value)| match value {
            Value::String(s) => format!("{key}: {s}"),
            other => format!("{key}: {other}"),
        })
        .collect()
}

fn clip(x: i32, y: i32, area: Rect) -> Option<(u16, u16)> {
    let inside = x >= i32::from(area.x)
        && x < i32::from(area.right())
        && y >= i32::from(area.y)
        && y < i32::from(area.bottom());
    inside.then_some((x as u16, y as u16))
}

// ---------------------------------------------------------------------------
// Connector rasterization
// ---------------------------------------------------------------------------

const UP: u8 = 1;
const DOWN: u8 = 2;
const LEFT: u8 = 4;
const RIGHT: u8 = 8;

/// Terminal cells touched by connector strokes, each with the directions a
/// line leaves it in. Overlapping strokes merge, so two feeders meeting on
/// their parent's row become `├`.
#[derive(Debug, Default)]
struct LineCanvas {
    cells: BTreeMap<(i32, i32), u8>,
}

impl LineCanvas {
    /// Rasterize a connector path. Points are in cell units: `start` is the
    /// first column right of the source box, `end` is the target's left
    /// border, so the last run stops one column short of it.
    fn stroke_path(&mut self, path: &ConnectorPath) {
        let [p0, p1, p2, p3] = path.points;
        let row_from = p0.y.floor() as i32;
        let row_to = p3.y.floor() as i32;
        let (c0, c1, c2) = (p0.x.floor() as i32, p1.x.floor() as i32, p2.x.floor() as i32);
        let c3 = p3.x.floor() as i32 - 1;

        self.horizontal(row_from, c0, c1);
        self.vertical(c1, row_from, row_to);
        self.horizontal(row_to, c1, c2);
        self.horizontal(row_to, c2, c3);
    }

    fn horizontal(&mut self, row: i32, a: i32, b: i32) {
        let (lo, hi) = (a.min(b), a.max(b));
        for col in lo..=hi {
            let mut mask = 0;
            if col > lo {
                mask |= LEFT;
            }
            if col < hi {
                mask |= RIGHT;
            }
            self.mark(col, row, mask);
        }
    }

    fn vertical(&mut self, col: i32, a: i32, b: i32) {
        let (lo, hi) = (a.min(b), a.max(b));
        for row in lo..=hi {
            let mut mask = 0;
            if row > lo {
                mask |= UP;
            }
            if row < hi {
                mask |= DOWN;
            }
            self.mark(col, row, mask);
        }
    }

    fn mark(&mut self, col: i32, row: i32, mask: u8) {
        if mask != 0 {
            *self.cells.entry((col, row)).or_default() |= mask;
        }
    }

    fn paint(&self, area: Rect, buf: &mut Buffer, glyphs: &GlyphTable, style: Style) {
        for (&(col, row), &mask) in &self.cells {
            let Some((x, y)) = clip(col, row, area) else {
                continue;
            };
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_symbol(glyphs[usize::from(mask & 0b1111)]);
                cell.set_style(style);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
