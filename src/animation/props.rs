use std::collections::BTreeMap;

use smallvec::SmallVec;

use crate::foundation::core::{Affine, Vec2};

/// A single animatable scalar channel of a region's visual state.
///
/// Compound CSS-like properties are split into scalar channels so overlapping
/// tweens can write them independently (a layer's `Y` and its section's
/// `Opacity` in the same pass).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Prop {
    /// Opacity in `[0, 1]`.
    Opacity,
    /// Horizontal translation in px.
    X,
    /// Vertical translation in px.
    Y,
    /// Horizontal translation in percent of the region's own width.
    XPercent,
    /// Vertical translation in percent of the region's own height.
    YPercent,
    /// Uniform scale.
    Scale,
    /// Horizontal scale (progress bars, seams).
    ScaleX,
    /// Vertical scale.
    ScaleY,
    /// In-plane rotation in degrees.
    Rotation,
    /// Rotation about the horizontal axis in degrees.
    RotationX,
    /// Gaussian blur radius in px.
    Blur,
    /// Brightness filter multiplier.
    Brightness,
    /// Contrast filter multiplier.
    Contrast,
    /// Grayscale amount in `[0, 1]`.
    Grayscale,
    /// Clip inset from the top edge, percent.
    ClipTop,
    /// Clip inset from the right edge, percent.
    ClipRight,
    /// Clip inset from the bottom edge, percent.
    ClipBottom,
    /// Clip inset from the left edge, percent.
    ClipLeft,
    /// Free-form numeric value (counters).
    Counter,
    /// Vertical offset that keeps a pinned region fixed in the viewport, px.
    PinY,
}

impl Prop {
    /// Number of channels.
    pub const COUNT: usize = 20;

    /// Every channel in index order.
    pub const ALL: [Prop; Self::COUNT] = [
        Self::Opacity,
        Self::X,
        Self::Y,
        Self::XPercent,
        Self::YPercent,
        Self::Scale,
        Self::ScaleX,
        Self::ScaleY,
        Self::Rotation,
        Self::RotationX,
        Self::Blur,
        Self::Brightness,
        Self::Contrast,
        Self::Grayscale,
        Self::ClipTop,
        Self::ClipRight,
        Self::ClipBottom,
        Self::ClipLeft,
        Self::Counter,
        Self::PinY,
    ];

    /// Value the channel holds when nothing has animated it.
    pub fn rest_value(self) -> f64 {
        match self {
            Self::Opacity
            | Self::Scale
            | Self::ScaleX
            | Self::ScaleY
            | Self::Brightness
            | Self::Contrast => 1.0,
            _ => 0.0,
        }
    }

    /// Stable snake_case name used in reports.
    pub fn name(self) -> &'static str {
        match self {
            Self::Opacity => "opacity",
            Self::X => "x",
            Self::Y => "y",
            Self::XPercent => "x_percent",
            Self::YPercent => "y_percent",
            Self::Scale => "scale",
            Self::ScaleX => "scale_x",
            Self::ScaleY => "scale_y",
            Self::Rotation => "rotation",
            Self::RotationX => "rotation_x",
            Self::Blur => "blur",
            Self::Brightness => "brightness",
            Self::Contrast => "contrast",
            Self::Grayscale => "grayscale",
            Self::ClipTop => "clip_top",
            Self::ClipRight => "clip_right",
            Self::ClipBottom => "clip_bottom",
            Self::ClipLeft => "clip_left",
            Self::Counter => "counter",
            Self::PinY => "pin_y",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Sparse property set used by tween descriptors (`from`/`to`).
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "BTreeMap<Prop, f64>", into = "BTreeMap<Prop, f64>")]
pub struct Props(SmallVec<[(Prop, f64); 6]>);

impl Props {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `prop` to `value`, replacing any earlier entry for the same channel.
    pub fn with(mut self, prop: Prop, value: f64) -> Self {
        self.set(prop, value);
        self
    }

    /// In-place variant of [`Props::with`].
    pub fn set(&mut self, prop: Prop, value: f64) {
        if let Some(slot) = self.0.iter_mut().find(|(p, _)| *p == prop) {
            slot.1 = value;
        } else {
            self.0.push((prop, value));
        }
    }

    /// Value for `prop`, if present.
    pub fn get(&self, prop: Prop) -> Option<f64> {
        self.0.iter().find(|(p, _)| *p == prop).map(|(_, v)| *v)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Prop, f64)> + '_ {
        self.0.iter().copied()
    }

    /// True when no channel is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Shorthand for `with(Prop::Opacity, v)`.
    pub fn opacity(self, v: f64) -> Self {
        self.with(Prop::Opacity, v)
    }

    /// Shorthand for `with(Prop::X, v)`.
    pub fn x(self, v: f64) -> Self {
        self.with(Prop::X, v)
    }

    /// Shorthand for `with(Prop::Y, v)`.
    pub fn y(self, v: f64) -> Self {
        self.with(Prop::Y, v)
    }

    /// Shorthand for `with(Prop::Scale, v)`.
    pub fn scale(self, v: f64) -> Self {
        self.with(Prop::Scale, v)
    }

    /// Shorthand for `with(Prop::Blur, v)`.
    pub fn blur(self, v: f64) -> Self {
        self.with(Prop::Blur, v)
    }
}

impl From<BTreeMap<Prop, f64>> for Props {
    fn from(map: BTreeMap<Prop, f64>) -> Self {
        Self(map.into_iter().collect())
    }
}

impl From<Props> for BTreeMap<Prop, f64> {
    fn from(props: Props) -> Self {
        props.0.into_iter().collect()
    }
}

/// Dense visual state of one region: every channel, defaulting to its rest value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualState {
    values: [f64; Prop::COUNT],
}

impl Default for VisualState {
    fn default() -> Self {
        let mut values = [0.0; Prop::COUNT];
        for prop in Prop::ALL {
            values[prop.index()] = prop.rest_value();
        }
        Self { values }
    }
}

impl VisualState {
    /// Read a channel.
    pub fn get(&self, prop: Prop) -> f64 {
        self.values[prop.index()]
    }

    /// Write a channel.
    pub fn set(&mut self, prop: Prop, value: f64) {
        self.values[prop.index()] = value;
    }

    /// Channels whose value differs from the rest value, keyed by name.
    pub fn changed(&self) -> BTreeMap<&'static str, f64> {
        Prop::ALL
            .iter()
            .filter(|p| self.get(**p) != p.rest_value())
            .map(|p| (p.name(), self.get(*p)))
            .collect()
    }

    /// Affine transform for a region of `size_px`, rotating and scaling about
    /// its centre. Percent translations resolve against `size_px`.
    pub fn to_affine(&self, size_px: Vec2) -> Affine {
        let translate = Vec2::new(
            self.get(Prop::X) + self.get(Prop::XPercent) / 100.0 * size_px.x,
            self.get(Prop::Y) + self.get(Prop::YPercent) / 100.0 * size_px.y + self.get(Prop::PinY),
        );
        let center = size_px * 0.5;
        let scale = self.get(Prop::Scale);
        Affine::translate(translate)
            * Affine::translate(center)
            * Affine::rotate(self.get(Prop::Rotation).to_radians())
            * Affine::scale_non_uniform(
                scale * self.get(Prop::ScaleX),
                scale * self.get(Prop::ScaleY),
            )
            * Affine::translate(-center)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/props.rs"]
mod tests;
