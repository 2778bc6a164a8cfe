//! What the engine needs from the page it animates.
//!
//! Layout is measured by the host and exposed read-only through
//! [`LayoutSource`]. The engine never measures anything itself; it re-reads the
//! source on `refresh()` and after a debounced resize.

use std::collections::BTreeMap;

use crate::foundation::core::{Rect, Size};
use crate::foundation::ids::RegionId;

/// Read-only view of measured page layout, in document coordinates.
pub trait LayoutSource {
    /// Visible viewport size in px.
    fn viewport(&self) -> Size;

    /// Total scrollable document height in px.
    fn document_height(&self) -> f64;

    /// Document-space rectangle of a region, or `None` if the region is not on
    /// the page.
    fn region(&self, id: &RegionId) -> Option<Rect>;

    /// Largest reachable scroll position.
    fn max_scroll(&self) -> f64 {
        (self.document_height() - self.viewport().height).max(0.0)
    }
}

/// Host environment flags read once at engine construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostEnv {
    /// The visitor asked the platform to minimise motion.
    pub reduced_motion: bool,
}

/// A layout held in memory: used by tests, the CLI and hosts that push
/// measurements rather than answering queries.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StaticLayout {
    /// Viewport size.
    pub viewport: Size,
    /// Document height.
    pub document_height: f64,
    /// Region rectangles keyed by id.
    #[serde(default)]
    pub regions: BTreeMap<RegionId, Rect>,
}

impl StaticLayout {
    /// Layout with no regions.
    pub fn new(viewport: Size, document_height: f64) -> Self {
        Self {
            viewport,
            document_height,
            regions: BTreeMap::new(),
        }
    }

    /// Builder-style region insertion.
    pub fn with_region(mut self, id: impl Into<RegionId>, rect: Rect) -> Self {
        self.regions.insert(id.into(), rect);
        self
    }

    /// Insert or move a region.
    pub fn set_region(&mut self, id: impl Into<RegionId>, rect: Rect) {
        self.regions.insert(id.into(), rect);
    }

    /// Remove a region (it left the page).
    pub fn remove_region(&mut self, id: &RegionId) {
        self.regions.remove(id);
    }

    /// Change the viewport size (window resize).
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }
}

impl LayoutSource for StaticLayout {
    fn viewport(&self) -> Size {
        self.viewport
    }

    fn document_height(&self) -> f64 {
        self.document_height
    }

    fn region(&self, id: &RegionId) -> Option<Rect> {
        self.regions.get(id).copied()
    }
}

#[cfg(test)]
#[path = "../tests/unit/host.rs"]
mod tests;
