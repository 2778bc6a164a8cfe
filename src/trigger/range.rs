//! Scroll ranges described relative to measured layout.

use std::fmt;
use std::str::FromStr;

use crate::foundation::core::ScrollRange;
use crate::foundation::error::{CineError, CineResult};
use crate::foundation::ids::RegionId;
use crate::host::LayoutSource;

/// "This fraction of the region meets this fraction of the viewport".
///
/// Fractions run along the scroll axis: `0` is the region's (or viewport's)
/// leading edge, `1` its trailing edge. `top 80%` is
/// `ScrollAnchor::new(0.0, 0.8)`. Parses from and serializes to that
/// two-word form (`"bottom top"`, `"left 40%"`, `"top 80% +20"`).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScrollAnchor {
    /// Fraction along the region.
    pub region_edge: f64,
    /// Fraction along the viewport.
    pub viewport_edge: f64,
    /// Extra offset added to the resolved position, px.
    pub offset_px: f64,
}

impl ScrollAnchor {
    /// Anchor without offset.
    pub const fn new(region_edge: f64, viewport_edge: f64) -> Self {
        Self {
            region_edge,
            viewport_edge,
            offset_px: 0.0,
        }
    }

    /// Region leading edge meets viewport leading edge.
    pub const TOP_TOP: Self = Self::new(0.0, 0.0);
    /// Region trailing edge meets viewport trailing edge.
    pub const BOTTOM_BOTTOM: Self = Self::new(1.0, 1.0);
    /// Region trailing edge meets viewport leading edge.
    pub const BOTTOM_TOP: Self = Self::new(1.0, 0.0);
    /// Region centre meets viewport centre.
    pub const CENTER_CENTER: Self = Self::new(0.5, 0.5);

    /// Add a pixel offset.
    pub fn with_offset(mut self, offset_px: f64) -> Self {
        self.offset_px = offset_px;
        self
    }

    /// Scroll position at which the anchor is met, for a region starting at
    /// `edge_start` with length `extent` along the axis.
    pub fn resolve(self, edge_start: f64, extent: f64, viewport_extent: f64) -> f64 {
        edge_start + self.region_edge * extent - self.viewport_edge * viewport_extent
            + self.offset_px
    }
}

fn parse_edge(word: &str) -> Option<f64> {
    match word {
        "top" | "left" => Some(0.0),
        "center" => Some(0.5),
        "bottom" | "right" => Some(1.0),
        _ => {
            let pct = word.strip_suffix('%')?;
            let v: f64 = pct.parse().ok()?;
            v.is_finite().then_some(v / 100.0)
        }
    }
}

impl FromStr for ScrollAnchor {
    type Err = CineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || CineError::validation(format!("invalid scroll anchor '{s}'"));
        let mut words = s.split_whitespace();
        let region = words.next().and_then(parse_edge).ok_or_else(bad)?;
        let viewport = words.next().and_then(parse_edge).ok_or_else(bad)?;
        let offset = match words.next() {
            None => 0.0,
            Some(w) => {
                let v: f64 = w.parse().map_err(|_| bad())?;
                if !v.is_finite() {
                    return Err(bad());
                }
                v
            }
        };
        if words.next().is_some() {
            return Err(bad());
        }
        Ok(Self::new(region, viewport).with_offset(offset))
    }
}

impl TryFrom<String> for ScrollAnchor {
    type Error = CineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for ScrollAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}% {}%", percent(self.region_edge), percent(self.viewport_edge))?;
        if self.offset_px != 0.0 {
            write!(f, " {}", self.offset_px)?;
        }
        Ok(())
    }
}

/// Percent rounded to nine decimals, so authored values print the way they
/// were written and parse back to the same fraction.
fn percent(fraction: f64) -> f64 {
    (fraction * 100.0 * 1e9).round() / 1e9
}

impl From<ScrollAnchor> for String {
    fn from(value: ScrollAnchor) -> Self {
        value.to_string()
    }
}

/// End of an anchored range.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeEnd {
    /// Another anchor on the same region.
    Anchor(ScrollAnchor),
    /// A fixed length after the start, px.
    Length(f64),
    /// The largest reachable scroll position.
    Max,
}

/// How a binding's range is derived.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeSpec {
    /// Fixed document positions.
    Absolute(ScrollRange),
    /// From `start_px` to the largest reachable scroll position.
    ToMaxScroll {
        /// Start position, px.
        start_px: f64,
    },
    /// Anchored to a region; re-resolved whenever layout changes.
    Anchored {
        /// Region the anchors refer to.
        region: RegionId,
        /// Start anchor.
        start: ScrollAnchor,
        /// End of the range.
        end: RangeEnd,
    },
}

impl RangeSpec {
    /// Validated absolute range.
    pub fn absolute(start: f64, end: f64) -> CineResult<Self> {
        Ok(Self::Absolute(ScrollRange::new(start, end)?))
    }

    /// Range between two anchors on `region`.
    pub fn between(region: impl Into<RegionId>, start: ScrollAnchor, end: ScrollAnchor) -> Self {
        Self::Anchored {
            region: region.into(),
            start,
            end: RangeEnd::Anchor(end),
        }
    }

    /// Region this range depends on, if any.
    pub fn region(&self) -> Option<&RegionId> {
        match self {
            Self::Anchored { region, .. } => Some(region),
            Self::Absolute(_) | Self::ToMaxScroll { .. } => None,
        }
    }

    /// Resolve against current layout. `None` when the region is missing.
    pub fn resolve(&self, layout: &dyn LayoutSource) -> Option<ScrollRange> {
        match self {
            Self::Absolute(range) => Some(*range),
            Self::ToMaxScroll { start_px } => Some(ScrollRange::resolved(*start_px, layout.max_scroll())),
            Self::Anchored { region, start, end } => {
                let rect = layout.region(region)?;
                let viewport = layout.viewport().height;
                let from = start.resolve(rect.y0, rect.height(), viewport);
                let to = match end {
                    RangeEnd::Anchor(anchor) => anchor.resolve(rect.y0, rect.height(), viewport),
                    RangeEnd::Length(px) => from + px,
                    RangeEnd::Max => layout.max_scroll(),
                };
                Some(ScrollRange::resolved(from, to))
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/trigger/range.rs"]
mod tests;
