use crate::foundation::core::ScrollDirection;

/// Immutable per-tick snapshot produced by the
/// [`VirtualScroller`](crate::VirtualScroller) and read by every binding in the
/// same tick.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScrollFrame {
    /// Host clock at the tick, ms.
    pub timestamp_ms: f64,
    /// Raw input consumed this tick, px (after multipliers).
    pub raw_delta_px: f64,
    /// Smoothed, clamped virtual position, px.
    pub virtual_position_px: f64,
    /// Smoothed velocity, px per ms. Zero when following native scroll.
    pub velocity_px_per_ms: f64,
}

impl ScrollFrame {
    /// A frame at rest at `position_px`.
    pub fn at_rest(timestamp_ms: f64, position_px: f64) -> Self {
        Self {
            timestamp_ms,
            raw_delta_px: 0.0,
            virtual_position_px: position_px,
            velocity_px_per_ms: 0.0,
        }
    }

    /// Direction derived from the velocity sign.
    pub fn direction(&self) -> ScrollDirection {
        ScrollDirection::from_velocity(self.velocity_px_per_ms)
    }
}

/// Raw input delivered by the host between ticks.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputEvent {
    /// Mouse wheel / trackpad delta in px (positive scrolls down).
    Wheel {
        /// Delta in px.
        delta_px: f64,
    },
    /// Touch drag delta in px (positive scrolls down).
    Touch {
        /// Delta in px.
        delta_px: f64,
    },
    /// Continuous input ended (finger lifted, wheel gesture over).
    Release,
    /// Native scroll position reported by the platform (scrollbar drag,
    /// keyboard, reduced-motion scrolling).
    Native {
        /// Absolute position in px.
        position_px: f64,
    },
}

impl InputEvent {
    /// True for events that represent continued user intent to move.
    pub fn is_continuous(&self) -> bool {
        matches!(self, Self::Wheel { .. } | Self::Touch { .. } | Self::Native { .. })
    }
}
