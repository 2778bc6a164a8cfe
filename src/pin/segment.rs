//! Measured geometry of a pinned horizontal segment.

use crate::foundation::core::{ScrollDirection, ScrollRange};
use crate::foundation::ids::RegionId;
use crate::host::LayoutSource;
use crate::trigger::range::ScrollAnchor;

/// Two snap candidates closer than this are considered equidistant, and a
/// progress this close to a snap point is considered on it.
const SNAP_EPSILON: f64 = 1e-9;

/// How wide a scene is.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneWidth {
    /// One viewport width (full-bleed).
    Viewport,
    /// A fixed width, px.
    Fixed(f64),
    /// The measured width of a region.
    Region(RegionId),
}

impl SceneWidth {
    fn measure(&self, layout: &dyn LayoutSource) -> f64 {
        let px = match self {
            Self::Viewport => layout.viewport().width,
            Self::Fixed(px) => *px,
            Self::Region(id) => layout.region(id).map_or(0.0, |r| r.width()),
        };
        if px.is_finite() { px.max(0.0) } else { 0.0 }
    }
}

/// Horizontal visibility window of a scene inside the pinned viewport.
///
/// Anchors run along the horizontal axis: `left 40%` starts when the scene's
/// left edge reaches 40% of the viewport width.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneWindow {
    /// Window start.
    pub start: ScrollAnchor,
    /// Window end.
    #[serde(default = "SceneWindow::default_end")]
    pub end: ScrollAnchor,
}

impl SceneWindow {
    /// Window from `start` until the scene has left the viewport.
    pub fn from_start(start: ScrollAnchor) -> Self {
        Self {
            start,
            end: Self::default_end(),
        }
    }

    fn default_end() -> ScrollAnchor {
        ScrollAnchor::new(1.0, 0.0)
    }

    /// Resolve against a scene's geometry, in horizontal px.
    pub fn resolve(&self, scene: &SceneGeometry, viewport_width: f64) -> ScrollRange {
        ScrollRange::resolved(
            self.start.resolve(scene.offset_px, scene.width_px, viewport_width),
            self.end.resolve(scene.offset_px, scene.width_px, viewport_width),
        )
    }
}

/// Measured position of one scene along the horizontal track.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct SceneGeometry {
    /// Position in the segment.
    pub index: usize,
    /// Distance from the track start to the scene's left edge, px.
    pub offset_px: f64,
    /// Scene width, px.
    pub width_px: f64,
}

/// Geometry of a pinned segment, recomputed whenever layout changes.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PinSegment {
    /// Container held in place while the segment scrolls.
    pub container: RegionId,
    /// Scenes left to right.
    pub scenes: Vec<SceneGeometry>,
    /// Viewport width at measurement, px.
    pub viewport_width_px: f64,
    /// Horizontal distance the track travels, px (never negative).
    pub total_horizontal_extent_px: f64,
    /// Dwell after the last scene, px.
    pub settle_buffer_px: f64,
    /// Preferred resting values of pin progress, ascending.
    pub snap_points: Vec<f64>,
}

impl PinSegment {
    /// Measure `widths` against current layout.
    pub fn measure(
        container: RegionId,
        widths: &[SceneWidth],
        layout: &dyn LayoutSource,
        settle_buffer_px: f64,
    ) -> Self {
        let viewport_width_px = layout.viewport().width.max(0.0);
        let mut offset = 0.0;
        let scenes: Vec<SceneGeometry> = widths
            .iter()
            .enumerate()
            .map(|(index, w)| {
                let width_px = w.measure(layout);
                let scene = SceneGeometry {
                    index,
                    offset_px: offset,
                    width_px,
                };
                offset += width_px;
                scene
            })
            .collect();
        let total = (offset - viewport_width_px).max(0.0);

        let mut snap_points = Vec::with_capacity(scenes.len() + 1);
        if total > 0.0 {
            for scene in &scenes {
                snap_points.push((scene.offset_px / total).min(1.0));
            }
            snap_points.push(1.0);
            snap_points.dedup_by(|a, b| (*a - *b).abs() < SNAP_EPSILON);
        }

        Self {
            container,
            scenes,
            viewport_width_px,
            total_horizontal_extent_px: total,
            settle_buffer_px: settle_buffer_px.max(0.0),
            snap_points,
        }
    }

    /// Vertical scroll distance the pin holds the container for, px.
    pub fn pinned_length_px(&self) -> f64 {
        self.total_horizontal_extent_px + self.settle_buffer_px
    }

    /// Progress through the whole pinned range (travel plus settle) for a
    /// vertical offset into it. Zero when there is no horizontal headroom.
    pub fn progress_at(&self, offset_px: f64) -> f64 {
        let len = self.pinned_length_px();
        if self.total_horizontal_extent_px <= 0.0 || len <= 0.0 {
            return 0.0;
        }
        (offset_px / len).clamp(0.0, 1.0)
    }

    /// Horizontal track position for pin progress `p`, px.
    pub fn horizontal_offset_px(&self, p: f64) -> f64 {
        p.clamp(0.0, 1.0) * self.total_horizontal_extent_px
    }

    /// Snap point to settle on from pin progress `p`.
    ///
    /// `None` when `p` already sits on a snap point or there is nothing to snap
    /// to. Equidistant candidates resolve toward `direction`; with no known
    /// direction the lower one wins.
    pub fn nearest_snap(&self, p: f64, direction: ScrollDirection) -> Option<f64> {
        let mut best: Option<(f64, f64)> = None;
        for &s in &self.snap_points {
            let d = (s - p).abs();
            if d < SNAP_EPSILON {
                return None;
            }
            best = match best {
                None => Some((s, d)),
                Some((_, bd)) if d < bd - SNAP_EPSILON => Some((s, d)),
                Some((bs, bd)) if (d - bd).abs() < SNAP_EPSILON => {
                    // Points are ascending, so `bs < s`.
                    let pick = match direction {
                        ScrollDirection::Forward => s,
                        ScrollDirection::Backward | ScrollDirection::Still => bs,
                    };
                    Some((pick, bd))
                }
                keep => keep,
            };
        }
        best.map(|(s, _)| s)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pin/segment.rs"]
mod tests;
