//! Engine configuration.
//!
//! Every tuning value here is presentational: none of them carries an
//! invariant, so they are configuration rather than contract. Defaults
//! reproduce the site's shipped motion. Partial JSON documents are accepted;
//! omitted fields keep their defaults.

use crate::animation::ease::Ease;
use crate::foundation::error::{CineError, CineResult};

/// Root configuration of an [`Engine`](crate::Engine).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Virtual scroller tuning.
    pub scroller: ScrollerConfig,
    /// Pinned segment tuning.
    pub pin: PinConfig,
    /// Velocity-reactive drift tuning.
    pub drift: DriftConfig,
    /// Header reveal tuning.
    pub header: HeaderConfig,
    /// Reveal-group tuning.
    pub reveal: RevealConfig,
    /// Boot sequence timings.
    pub boot: BootConfig,
    /// Quiet period after the last resize before layout is recomputed, ms.
    pub resize_debounce_ms: f64,
    /// Delay between the ready signal and the first automatic refresh, ms.
    pub refresh_after_ready_ms: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scroller: ScrollerConfig::default(),
            pin: PinConfig::default(),
            drift: DriftConfig::default(),
            header: HeaderConfig::default(),
            reveal: RevealConfig::default(),
            boot: BootConfig::default(),
            resize_debounce_ms: 200.0,
            refresh_after_ready_ms: 100.0,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON document and validate it.
    pub fn from_json_str(json: &str) -> CineResult<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check every section.
    pub fn validate(&self) -> CineResult<()> {
        self.scroller.validate()?;
        self.pin.validate()?;
        self.drift.validate()?;
        self.header.validate()?;
        self.reveal.validate()?;
        self.boot.validate()?;
        non_negative("resize_debounce_ms", self.resize_debounce_ms)?;
        non_negative("refresh_after_ready_ms", self.refresh_after_ready_ms)?;
        Ok(())
    }
}

/// Virtual scroller tuning.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScrollerConfig {
    /// Fraction of the remaining distance covered per tick, `(0, 1]`.
    pub lerp: f64,
    /// Multiplier applied to wheel deltas.
    pub wheel_multiplier: f64,
    /// Multiplier applied to touch deltas.
    pub touch_multiplier: f64,
    /// Velocity smoothing factor, `(0, 1]`.
    pub velocity_smoothing: f64,
    /// Ceiling for a single tick interval, ms.
    pub max_frame_dt_ms: f64,
    /// Distance under which the position snaps onto its target, px.
    pub settle_epsilon_px: f64,
}

impl Default for ScrollerConfig {
    fn default() -> Self {
        Self {
            lerp: 0.1,
            wheel_multiplier: 1.0,
            touch_multiplier: 1.0,
            velocity_smoothing: 0.25,
            max_frame_dt_ms: 100.0,
            settle_epsilon_px: 0.5,
        }
    }
}

impl ScrollerConfig {
    fn validate(&self) -> CineResult<()> {
        unit_interval("scroller.lerp", self.lerp)?;
        unit_interval("scroller.velocity_smoothing", self.velocity_smoothing)?;
        positive("scroller.wheel_multiplier", self.wheel_multiplier)?;
        positive("scroller.touch_multiplier", self.touch_multiplier)?;
        positive("scroller.max_frame_dt_ms", self.max_frame_dt_ms)?;
        non_negative("scroller.settle_epsilon_px", self.settle_epsilon_px)
    }
}

/// Dwell appended after the last scene of a pinned segment.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettleBuffer {
    /// One viewport height.
    ViewportHeight,
    /// A fixed number of pixels.
    Px(f64),
}

impl SettleBuffer {
    /// Resolve against the current viewport height.
    pub fn resolve(self, viewport_height: f64) -> f64 {
        match self {
            Self::ViewportHeight => viewport_height.max(0.0),
            Self::Px(px) => px.max(0.0),
        }
    }
}

/// Pinned segment tuning.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PinConfig {
    /// Dwell after the last scene before the pin releases.
    pub settle_buffer: SettleBuffer,
    /// Snap to the nearest scene when input stops.
    pub snap_enabled: bool,
    /// Duration of the snap correction, ms.
    pub snap_duration_ms: f64,
    /// Ease of the snap correction.
    pub snap_ease: Ease,
    /// Input silence that counts as a release, ms.
    pub snap_idle_ms: f64,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            settle_buffer: SettleBuffer::ViewportHeight,
            snap_enabled: true,
            snap_duration_ms: 800.0,
            snap_ease: Ease::InOutCubic,
            snap_idle_ms: 150.0,
        }
    }
}

impl PinConfig {
    fn validate(&self) -> CineResult<()> {
        if let SettleBuffer::Px(px) = self.settle_buffer {
            non_negative("pin.settle_buffer", px)?;
        }
        positive("pin.snap_duration_ms", self.snap_duration_ms)?;
        non_negative("pin.snap_idle_ms", self.snap_idle_ms)
    }
}

/// Velocity-reactive drift tuning.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriftConfig {
    /// Resting drift speed, percent per normalized frame.
    pub base_speed: f64,
    /// Fraction of the speed gap closed per tick.
    pub speed_lerp: f64,
    /// Scroll velocity (px/s) that adds one unit of boost.
    pub velocity_divisor_px_per_s: f64,
    /// Upper bound on the boost.
    pub max_boost: f64,
    /// Converts a tick interval in ms into normalized frames.
    pub frame_scale: f64,
    /// Lower wrap bound, percent.
    pub wrap_min: f64,
    /// Upper wrap bound, percent.
    pub wrap_max: f64,
    /// Wrap step, percent (width of one duplicated run).
    pub wrap_step: f64,
    /// Starting offset of every row, percent.
    pub initial_x_percent: f64,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            base_speed: 0.04,
            speed_lerp: 0.08,
            velocity_divisor_px_per_s: 4000.0,
            max_boost: 1.2,
            frame_scale: 0.06,
            wrap_min: -50.0,
            wrap_max: 0.0,
            wrap_step: 25.0,
            initial_x_percent: -25.0,
        }
    }
}

impl DriftConfig {
    fn validate(&self) -> CineResult<()> {
        non_negative("drift.base_speed", self.base_speed)?;
        unit_interval("drift.speed_lerp", self.speed_lerp)?;
        positive("drift.velocity_divisor_px_per_s", self.velocity_divisor_px_per_s)?;
        non_negative("drift.max_boost", self.max_boost)?;
        positive("drift.frame_scale", self.frame_scale)?;
        positive("drift.wrap_step", self.wrap_step)?;
        if self.wrap_min >= self.wrap_max {
            return Err(CineError::config("drift.wrap_min must be < drift.wrap_max"));
        }
        Ok(())
    }
}

/// Header reveal tuning.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeaderConfig {
    /// Above this scroll position the header is always shown, px.
    pub show_above_px: f64,
    /// Show/hide duration, seconds.
    pub duration_secs: f64,
    /// Show/hide ease.
    pub ease: Ease,
    /// Vertical offset of the hidden header, percent of its height.
    pub hidden_y_percent: f64,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            show_above_px: 50.0,
            duration_secs: 0.6,
            ease: Ease::InOutQuart,
            hidden_y_percent: -100.0,
        }
    }
}

impl HeaderConfig {
    fn validate(&self) -> CineResult<()> {
        non_negative("header.show_above_px", self.show_above_px)?;
        positive("header.duration_secs", self.duration_secs)
    }
}

/// Reveal-group tuning.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RevealConfig {
    /// Viewport fraction the section top must reach to start the reveal.
    pub start_viewport_edge: f64,
    /// Duration of each element's reveal, seconds.
    pub duration_secs: f64,
    /// Delay between consecutive elements, seconds.
    pub stagger_secs: f64,
    /// Reveal ease.
    pub ease: Ease,
    /// Hidden-state vertical offset, px.
    pub from_y_px: f64,
    /// Hidden-state blur, px.
    pub from_blur_px: f64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            start_viewport_edge: 0.8,
            duration_secs: 1.5,
            stagger_secs: 0.1,
            ease: Ease::OutExpo,
            from_y_px: 30.0,
            from_blur_px: 10.0,
        }
    }
}

impl RevealConfig {
    fn validate(&self) -> CineResult<()> {
        finite("reveal.start_viewport_edge", self.start_viewport_edge)?;
        positive("reveal.duration_secs", self.duration_secs)?;
        non_negative("reveal.stagger_secs", self.stagger_secs)
    }
}

/// Boot sequence timings, seconds.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BootConfig {
    /// Progress counter 0 → 100.
    pub counter_secs: f64,
    /// Counter ease.
    pub counter_ease: Ease,
    /// Pause between the counter and the content exit.
    pub prepare_gap_secs: f64,
    /// Content panel exit.
    pub content_exit_secs: f64,
    /// Content exit ease.
    pub content_exit_ease: Ease,
    /// Seam grow.
    pub seam_secs: f64,
    /// How much the seam overlaps the end of the content exit.
    pub seam_overlap_secs: f64,
    /// Seam grow ease.
    pub seam_ease: Ease,
    /// Two-panel split wipe.
    pub split_secs: f64,
    /// Split ease.
    pub split_ease: Ease,
    /// Seam fade during the split.
    pub seam_fade_secs: f64,
    /// Seam fade ease.
    pub seam_fade_ease: Ease,
    /// Whole-overlay fade used instead of the split under reduced motion.
    pub reduced_fade_secs: f64,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            counter_secs: 1.8,
            counter_ease: Ease::InOutQuart,
            prepare_gap_secs: 0.2,
            content_exit_secs: 0.6,
            content_exit_ease: Ease::InExpo,
            seam_secs: 0.4,
            seam_overlap_secs: 0.2,
            seam_ease: Ease::InOutCubic,
            split_secs: 1.6,
            split_ease: Ease::InOutQuint,
            seam_fade_secs: 0.8,
            seam_fade_ease: Ease::OutQuint,
            reduced_fade_secs: 0.8,
        }
    }
}

impl BootConfig {
    fn validate(&self) -> CineResult<()> {
        positive("boot.counter_secs", self.counter_secs)?;
        non_negative("boot.prepare_gap_secs", self.prepare_gap_secs)?;
        positive("boot.content_exit_secs", self.content_exit_secs)?;
        positive("boot.seam_secs", self.seam_secs)?;
        non_negative("boot.seam_overlap_secs", self.seam_overlap_secs)?;
        positive("boot.split_secs", self.split_secs)?;
        positive("boot.seam_fade_secs", self.seam_fade_secs)?;
        positive("boot.reduced_fade_secs", self.reduced_fade_secs)
    }
}

fn finite(name: &str, v: f64) -> CineResult<()> {
    if !v.is_finite() {
        return Err(CineError::config(format!("{name} must be finite")));
    }
    Ok(())
}

fn non_negative(name: &str, v: f64) -> CineResult<()> {
    finite(name, v)?;
    if v < 0.0 {
        return Err(CineError::config(format!("{name} must be >= 0 (got {v})")));
    }
    Ok(())
}

fn positive(name: &str, v: f64) -> CineResult<()> {
    finite(name, v)?;
    if v <= 0.0 {
        return Err(CineError::config(format!("{name} must be > 0 (got {v})")));
    }
    Ok(())
}

fn unit_interval(name: &str, v: f64) -> CineResult<()> {
    finite(name, v)?;
    if v <= 0.0 || v > 1.0 {
        return Err(CineError::config(format!("{name} must be in (0, 1] (got {v})")));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
