/// Easing functions used to map normalized animation progress.
///
/// The same vocabulary serves scrubbed playback (progress driven by scroll) and
/// direct playback (progress driven by the clock). Serialized names accept the
/// `powerN.*`/`expo.*`/`sine.*` spellings used by motion designers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    /// Linear interpolation.
    #[default]
    #[serde(alias = "none")]
    Linear,
    /// Quadratic ease-in.
    #[serde(alias = "power1.in")]
    InQuad,
    /// Quadratic ease-out.
    #[serde(alias = "power1.out", alias = "power1")]
    OutQuad,
    /// Quadratic ease-in/out.
    #[serde(alias = "power1.inOut")]
    InOutQuad,
    /// Cubic ease-in.
    #[serde(alias = "power2.in")]
    InCubic,
    /// Cubic ease-out.
    #[serde(alias = "power2.out", alias = "power2")]
    OutCubic,
    /// Cubic ease-in/out.
    #[serde(alias = "power2.inOut")]
    InOutCubic,
    /// Quartic ease-in.
    #[serde(alias = "power3.in")]
    InQuart,
    /// Quartic ease-out.
    #[serde(alias = "power3.out", alias = "power3")]
    OutQuart,
    /// Quartic ease-in/out.
    #[serde(alias = "power3.inOut")]
    InOutQuart,
    /// Quintic ease-in.
    #[serde(alias = "power4.in")]
    InQuint,
    /// Quintic ease-out.
    #[serde(alias = "power4.out", alias = "power4")]
    OutQuint,
    /// Quintic ease-in/out.
    #[serde(alias = "power4.inOut")]
    InOutQuint,
    /// Exponential ease-in.
    #[serde(alias = "expo.in")]
    InExpo,
    /// Exponential ease-out.
    #[serde(alias = "expo.out", alias = "expo")]
    OutExpo,
    /// Exponential ease-in/out.
    #[serde(alias = "expo.inOut")]
    InOutExpo,
    /// Sinusoidal ease-in/out.
    #[serde(alias = "sine.inOut")]
    InOutSine,
}

impl Ease {
    /// Apply this easing function to normalized progress `t` in `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => in_out_pow(t, 2),
            Self::InCubic => t.powi(3),
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => in_out_pow(t, 3),
            Self::InQuart => t.powi(4),
            Self::OutQuart => 1.0 - (1.0 - t).powi(4),
            Self::InOutQuart => in_out_pow(t, 4),
            Self::InQuint => t.powi(5),
            Self::OutQuint => 1.0 - (1.0 - t).powi(5),
            Self::InOutQuint => in_out_pow(t, 5),
            Self::InExpo => {
                if t == 0.0 {
                    0.0
                } else {
                    2f64.powf(10.0 * t - 10.0)
                }
            }
            Self::OutExpo => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - 2f64.powf(-10.0 * t)
                }
            }
            Self::InOutExpo => {
                if t == 0.0 || t == 1.0 {
                    t
                } else if t < 0.5 {
                    2f64.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2f64.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
            Self::InOutSine => -((std::f64::consts::PI * t).cos() - 1.0) / 2.0,
        }
    }

    /// Every variant, in declaration order.
    pub const ALL: [Ease; 17] = [
        Self::Linear,
        Self::InQuad,
        Self::OutQuad,
        Self::InOutQuad,
        Self::InCubic,
        Self::OutCubic,
        Self::InOutCubic,
        Self::InQuart,
        Self::OutQuart,
        Self::InOutQuart,
        Self::InQuint,
        Self::OutQuint,
        Self::InOutQuint,
        Self::InExpo,
        Self::OutExpo,
        Self::InOutExpo,
        Self::InOutSine,
    ];
}

fn in_out_pow(t: f64, n: i32) -> f64 {
    if t < 0.5 {
        2f64.powi(n - 1) * t.powi(n)
    } else {
        1.0 - ((-2.0 * t + 2.0).powi(n) / 2.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
