use crate::{BoxGeometry, ConnectorPath, Point};

/// Reference stroke weight for connector lines. Renderers map it onto
/// whatever line styles they have.
pub const DEFAULT_STROKE_WEIGHT: u16 = 8;

/// Path from the right-center of `from` to the left-center of `to`.
///
/// ```text
///  from ──────┐
///             │
///             └────── to
/// ```
///
/// The first and last runs are each half the horizontal gap. Only the middle
/// segment changes height, so boxes that are not vertically aligned get a
/// dog-leg. Returns `None` while either box has not been measured.
pub fn compute_connector(from: Option<&BoxGeometry>, to: Option<&BoxGeometry>) -> Option<ConnectorPath> {
    let (from, to) = (from?, to?);

    let start = from.right_center();
    let end = to.left_center();
    let half_gap = (end.x - start.x).abs() / 2.0;

    Some(ConnectorPath {
        points: [
            start,
            Point::new(start.x + half_gap, start.y),
            Point::new(end.x - half_gap, end.y),
            end,
        ],
    })
}
