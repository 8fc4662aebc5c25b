pub mod connector;
pub mod coordinator;
pub mod grid;
pub mod source;
pub mod viewport;

pub use connector::{DEFAULT_STROKE_WEIGHT, compute_connector};
pub use coordinator::{LayoutCoordinator, MatchClick};
pub use grid::{Column, LayoutError, build_grid, round_of, try_build_grid, validate};
pub use viewport::{Viewport, ViewportSize, ViewportSubscription};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

// ---------------------------------------------------------------------------
// Bracket model
// ---------------------------------------------------------------------------

/// One node of the bracket tree.
///
/// `index` 0 is the champion match. Every other match names the match its
/// winner advances into through `parent_index`. Any extra keys in the source
/// JSON are kept in `payload` in their original order and are never
/// interpreted by the layout code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_index: Option<usize>,
    pub match_id: MatchId,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Match {
    pub fn new(index: usize, parent_index: Option<usize>, match_id: impl Into<MatchId>) -> Self {
        Self {
            index,
            parent_index,
            match_id: match_id.into(),
            payload: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    pub fn is_root(&self) -> bool {
        self.index == 0
    }
}

/// Render key of a match. Source data uses either database ids or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatchId {
    Number(i64),
    Text(String),
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchId::Number(n) => write!(f, "{n}"),
            MatchId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for MatchId {
    fn from(n: i64) -> Self {
        MatchId::Number(n)
    }
}

impl From<&str> for MatchId {
    fn from(s: &str) -> Self {
        MatchId::Text(s.to_string())
    }
}

impl From<String> for MatchId {
    fn from(s: String) -> Self {
        MatchId::Text(s)
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Measured position and size of a rendered match box.
///
/// All boxes of one layout pass share a coordinate space, so geometry of two
/// boxes can be compared directly.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoxGeometry {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl BoxGeometry {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn right_center(&self) -> Point {
        Point::new(self.left + self.width, self.top + self.height / 2.0)
    }

    pub fn left_center(&self) -> Point {
        Point::new(self.left, self.top + self.height / 2.0)
    }

    /// Half-open containment: the right and bottom edges belong to the
    /// neighbouring box.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x < self.left + self.width && y >= self.top && y < self.top + self.height
    }
}

/// Three-segment connector between two boxes, as four points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectorPath {
    pub points: [Point; 4],
}

impl ConnectorPath {
    pub fn start(&self) -> Point {
        self.points[0]
    }

    pub fn end(&self) -> Point {
        self.points[3]
    }

    pub fn segments(&self) -> [(Point, Point); 3] {
        let [p0, p1, p2, p3] = self.points;
        [(p0, p1), (p1, p2), (p2, p3)]
    }
}

/// A drawable edge: the path from match `from` into its parent `to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connector {
    pub from: usize,
    pub to: usize,
    pub path: ConnectorPath,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_parses_with_payload_in_source_order() {
        let raw = r#"{"index":3,"parentIndex":1,"matchId":"qf-1","home":"Duke","away":"UNC","score":"71-68"}"#;
        let m: Match = serde_json::from_str(raw).unwrap();
        assert_eq!(m.index, 3);
        assert_eq!(m.parent_index, Some(1));
        assert_eq!(m.match_id, MatchId::Text("qf-1".into()));
        let keys: Vec<&str> = m.payload.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["home", "away", "score"]);
    }

    #[test]
    fn root_match_parses_without_parent() {
        let m: Match = serde_json::from_str(r#"{"index":0,"matchId":9001}"#).unwrap();
        assert!(m.is_root());
        assert_eq!(m.parent_index, None);
        assert_eq!(m.match_id, MatchId::Number(9001));
        assert!(m.payload.is_empty());
    }

    #[test]
    fn null_parent_index_is_absent() {
        let m: Match =
            serde_json::from_str(r#"{"index":0,"parentIndex":null,"matchId":"final"}"#).unwrap();
        assert_eq!(m.parent_index, None);
    }

    #[test]
    fn match_serializes_back_to_camel_case() {
        let m = Match::new(2, Some(0), 17i64).with_field("home", "Kansas");
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, r#"{"index":2,"parentIndex":0,"matchId":17,"home":"Kansas"}"#);
    }

    #[test]
    fn match_id_display() {
        assert_eq!(MatchId::from(42i64).to_string(), "42");
        assert_eq!(MatchId::from("sf-2").to_string(), "sf-2");
    }

    #[test]
    fn box_geometry_centers() {
        let b = BoxGeometry::new(10.0, 20.0, 30.0, 5.0);
        assert_eq!(b.right_center(), Point::new(40.0, 22.5));
        assert_eq!(b.left_center(), Point::new(10.0, 22.5));
    }

    #[test]
    fn box_geometry_contains_is_half_open() {
        let b = BoxGeometry::new(0.0, 0.0, 4.0, 3.0);
        assert!(b.contains(0.0, 0.0));
        assert!(b.contains(3.0, 2.0));
        assert!(!b.contains(4.0, 1.0));
        assert!(!b.contains(1.0, 3.0));
        assert!(!b.contains(-1.0, 1.0));
    }
}
