use crate::foundation::error::{CineError, CineResult};

pub use kurbo::{Affine, Rect, Size, Vec2};

/// Half-open document-space scroll range `[start, end)` in pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScrollRange {
    /// Inclusive start position.
    pub start: f64,
    /// Exclusive end position.
    pub end: f64,
}

/// Where a position lies relative to a [`ScrollRange`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeSide {
    /// Above the range start.
    Before,
    /// Within `[start, end)`.
    Inside,
    /// At or past the range end.
    After,
}

impl ScrollRange {
    /// Validated constructor: `start < end`, both finite.
    pub fn new(start: f64, end: f64) -> CineResult<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(CineError::validation("ScrollRange bounds must be finite"));
        }
        if start >= end {
            return Err(CineError::validation(format!(
                "ScrollRange start must be < end (got {start}..{end})"
            )));
        }
        Ok(Self { start, end })
    }

    /// Constructor for ranges derived from measured layout. A range that
    /// resolves backwards collapses to zero length instead of failing.
    pub fn resolved(start: f64, end: f64) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Length in pixels (zero for collapsed ranges).
    pub fn len(self) -> f64 {
        self.end - self.start
    }

    /// True when the range has no extent.
    pub fn is_degenerate(self) -> bool {
        self.len() <= 0.0
    }

    /// Half-open containment test.
    pub fn contains(self, pos: f64) -> bool {
        self.start <= pos && pos < self.end
    }

    /// Classify `pos` against the range.
    pub fn side(self, pos: f64) -> RangeSide {
        if pos < self.start {
            RangeSide::Before
        } else if pos < self.end {
            RangeSide::Inside
        } else {
            RangeSide::After
        }
    }

    /// Local progress of `pos`, clamped to `[0, 1]`. Degenerate ranges report 0.
    pub fn progress(self, pos: f64) -> f64 {
        let len = self.len();
        if len <= 0.0 {
            return 0.0;
        }
        ((pos - self.start) / len).clamp(0.0, 1.0)
    }
}

/// Scroll direction derived from a frame's velocity sign.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ScrollDirection {
    /// Moving down the page (position increasing).
    Forward,
    /// Moving up the page.
    Backward,
    /// No measurable motion (seeks, reduced motion, rest).
    Still,
}

impl ScrollDirection {
    /// Direction of a signed velocity.
    pub fn from_velocity(v: f64) -> Self {
        if v > 0.0 {
            Self::Forward
        } else if v < 0.0 {
            Self::Backward
        } else {
            Self::Still
        }
    }
}

/// Direct playback direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PlayDirection {
    /// Toward the end of the timeline.
    Forward,
    /// Back toward the start.
    Reverse,
}

impl PlayDirection {
    pub(crate) fn sign(self) -> f64 {
        match self {
            Self::Forward => 1.0,
            Self::Reverse => -1.0,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
