use crate::connector::compute_connector;
use crate::grid::{Column, build_grid};
use crate::viewport::{ViewportSize, ViewportSubscription};
use crate::{BoxGeometry, Connector, Match};
use log::debug;
use std::fmt;

/// Caller-supplied reaction to a match box being clicked.
pub type MatchClick = Box<dyn FnMut(&Match) + Send>;

/// Keeps one bracket's layout current.
///
/// Owns the index-keyed box geometry written while boxes are laid out, tracks
/// the viewport through a subscription, and turns both into connectors.
pub struct LayoutCoordinator {
    viewport: ViewportSize,
    subscription: Option<ViewportSubscription>,
    geometry: Vec<Option<BoxGeometry>>,
    /// Region the boxes were last drawn into; clicks outside it hit nothing.
    visible: Option<BoxGeometry>,
    match_count: usize,
    on_click: Option<MatchClick>,
}

impl fmt::Debug for LayoutCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutCoordinator")
            .field("viewport", &self.viewport)
            .field("subscribed", &self.subscription.is_some())
            .field("match_count", &self.match_count)
            .field("measured", &self.geometry.iter().flatten().count())
            .field("visible", &self.visible)
            .finish()
    }
}

impl LayoutCoordinator {
    pub fn new(subscription: ViewportSubscription) -> Self {
        Self {
            viewport: subscription.current(),
            subscription: Some(subscription),
            geometry: Vec::new(),
            visible: None,
            match_count: 0,
            on_click: None,
        }
    }

    pub fn with_click_handler(mut self, on_click: impl FnMut(&Match) + Send + 'static) -> Self {
        self.on_click = Some(Box::new(on_click));
        self
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    /// Pick up a pending viewport change. Returns true when the size moved,
    /// meaning every box has to be measured again.
    pub fn poll_viewport(&mut self) -> bool {
        let Some(size) = self.subscription.as_mut().and_then(|s| s.changed()) else {
            return false;
        };
        debug!("viewport resized to {}x{}", size.width, size.height);
        self.viewport = size;
        true
    }

    /// Size the geometry map for a list of `count` matches. A new length
    /// starts from an empty map; the same length keeps what was measured.
    pub fn sync_matches(&mut self, count: usize) {
        if count == self.match_count && self.geometry.len() == count {
            return;
        }
        debug!("match count changed {} -> {count}, dropping box geometry", self.match_count);
        self.geometry = vec![None; count];
        self.match_count = count;
    }

    /// Sync the geometry map with `matches` and arrange them into columns.
    pub fn layout<'m>(&mut self, matches: &'m [Match]) -> Vec<Column<'m>> {
        self.sync_matches(matches.len());
        build_grid(matches)
    }

    pub fn record_geometry(&mut self, index: usize, geometry: BoxGeometry) {
        match self.geometry.get_mut(index) {
            Some(slot) => *slot = Some(geometry),
            None => debug!("ignoring geometry for match {index}, only {} slots", self.geometry.len()),
        }
    }

    /// Limit hit testing to `area`. Geometry outside it stays recorded so
    /// connectors into partly visible boxes still resolve.
    pub fn set_visible_area(&mut self, area: BoxGeometry) {
        self.visible = Some(area);
    }

    /// Forget every measurement and the visible area, for passes that draw
    /// no boxes at all.
    pub fn clear_geometry(&mut self) {
        self.geometry.iter_mut().for_each(|slot| *slot = None);
        self.visible = None;
    }

    pub fn geometry(&self, index: usize) -> Option<&BoxGeometry> {
        self.geometry.get(index)?.as_ref()
    }

    /// One connector per non-root match whose box and parent box have both
    /// been measured. Edges with missing geometry are skipped.
    pub fn connectors(&self, matches: &[Match]) -> Vec<Connector> {
        matches
            .iter()
            .filter(|m| !m.is_root())
            .filter_map(|m| {
                let parent = m.parent_index?;
                let path = compute_connector(self.geometry(m.index), self.geometry(parent))?;
                Some(Connector { from: m.index, to: parent, path })
            })
            .collect()
    }

    /// Index of the measured box under `(x, y)`, if any. Points outside the
    /// visible area never hit.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<usize> {
        if self.visible.is_some_and(|area| !area.contains(x, y)) {
            return None;
        }
        self.geometry
            .iter()
            .position(|g| g.is_some_and(|g| g.contains(x, y)))
    }

    pub fn click(&mut self, m: &Match) {
        if let Some(on_click) = self.on_click.as_mut() {
            on_click(m);
        }
    }

    /// Hit test and click in one go. Returns the index that was clicked.
    pub fn click_at(&mut self, matches: &[Match], x: f64, y: f64) -> Option<usize> {
        let index = self.hit_test(x, y)?;
        let m = matches.iter().find(|m| m.index == index)?;
        self.click(m);
        Some(index)
    }

    /// Release the viewport subscription. Safe to call more than once.
    pub fn teardown(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            debug!("layout coordinator unsubscribed from viewport");
            subscription.unsubscribe();
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }
}
