//! Serializable page description: everything needed to build an [`Engine`]
//! for one page without host code.

use crate::animation::timeline::{TimelineDescriptor, build_timeline};
use crate::boot::sequencer::BootRegions;
use crate::config::EngineConfig;
use crate::engine::session::Engine;
use crate::foundation::error::{CineError, CineResult};
use crate::foundation::ids::{BindingKey, RegionId};
use crate::host::{HostEnv, StaticLayout};
use crate::motion::drift::DriftDef;
use crate::pin::controller::{DetailBinding, PinDef, SceneDef};
use crate::pin::segment::{SceneWidth, SceneWindow};
use crate::scene::transition::SceneSpec;
use crate::scroll::frame::InputEvent;
use crate::trigger::binding::{BindingMode, ScrubSmoothing, TimelineTarget, TriggerBinding};
use crate::trigger::range::RangeSpec;

/// A timeline bound to a window of a pinned scene.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DetailSpec {
    /// Key, unique within the pin.
    pub key: BindingKey,
    /// Horizontal window.
    pub window: SceneWindow,
    /// `scrub` or `toggle`.
    pub mode: BindingMode,
    /// Timeline driven by the window.
    pub timeline: TimelineDescriptor,
}

/// One scene of a pinned segment.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PinSceneSpec {
    /// Scene width.
    #[serde(default = "viewport_width")]
    pub width: SceneWidth,
    /// Detail timelines.
    #[serde(default)]
    pub details: Vec<DetailSpec>,
}

fn viewport_width() -> SceneWidth {
    SceneWidth::Viewport
}

/// A pinned horizontal segment.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PinSpec {
    /// Container region.
    pub container: RegionId,
    /// Scenes left to right.
    pub scenes: Vec<PinSceneSpec>,
    /// Progress indicator region.
    #[serde(default)]
    pub progress_region: Option<RegionId>,
    /// How the track follows the scroll position.
    #[serde(default)]
    pub scrub: ScrubSmoothing,
}

impl PinSpec {
    /// Build the runtime definition, compiling every detail timeline.
    pub fn to_def(&self) -> CineResult<PinDef> {
        let mut def = PinDef::new(self.container.clone());
        def.progress_region = self.progress_region.clone();
        def.scrub = self.scrub;
        for scene in &self.scenes {
            let mut s = SceneDef::new(scene.width.clone());
            for detail in &scene.details {
                let timeline = build_timeline(&detail.timeline)?;
                s = s.detail(DetailBinding::new(
                    detail.key.clone(),
                    detail.window,
                    detail.mode,
                    TimelineTarget::new(timeline),
                ));
            }
            def = def.scene(s);
        }
        Ok(def)
    }
}

/// A timeline bound to an outer scroll range.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BindingSpec {
    /// Unique key.
    pub key: BindingKey,
    /// Range driving the timeline.
    pub range: RangeSpec,
    /// `scrub`, `toggle` or `observe`.
    pub mode: BindingMode,
    /// Timeline driven by the range.
    pub timeline: TimelineDescriptor,
}

impl BindingSpec {
    /// Build the runtime binding. Pin mode belongs to pinned segments and is
    /// rejected here.
    pub fn to_binding(&self) -> CineResult<TriggerBinding> {
        if matches!(self.mode, BindingMode::Pin(_)) {
            return Err(CineError::validation(format!(
                "binding '{}': pin mode is reserved for pinned segments",
                self.key
            )));
        }
        let timeline = build_timeline(&self.timeline)?;
        Ok(TriggerBinding::new(
            self.key.clone(),
            self.range.clone(),
            self.mode,
            TimelineTarget::new(timeline),
        ))
    }
}

/// A one-shot timeline played after interaction unlocks.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EntranceSpec {
    /// Delay after unlock, ms.
    #[serde(default)]
    pub delay_ms: f64,
    /// Timeline to play.
    pub timeline: TimelineDescriptor,
}

/// A whole page.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageDef {
    /// Measured layout.
    pub layout: StaticLayout,
    /// Host flags.
    #[serde(default)]
    pub env: HostEnv,
    /// Engine tuning.
    #[serde(default)]
    pub config: EngineConfig,
    /// Boot overlay regions.
    #[serde(default)]
    pub boot_regions: BootRegions,
    /// Sections with exit transitions and reveals.
    #[serde(default)]
    pub scenes: Vec<SceneSpec>,
    /// Pinned horizontal segments.
    #[serde(default)]
    pub pins: Vec<PinSpec>,
    /// Free-standing scroll-driven timelines.
    #[serde(default)]
    pub bindings: Vec<BindingSpec>,
    /// Velocity-reactive ribbons.
    #[serde(default)]
    pub drift: Option<DriftDef>,
    /// Auto-hiding header region.
    #[serde(default)]
    pub header: Option<RegionId>,
    /// Post-unlock entrances.
    #[serde(default)]
    pub entrances: Vec<EntranceSpec>,
}

impl PageDef {
    /// Parse a JSON page description.
    pub fn from_json_str(json: &str) -> CineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build an engine with every registration of the page applied. The
    /// engine is not yet initialized.
    #[tracing::instrument(level = "debug", skip_all, fields(scenes = self.scenes.len(), pins = self.pins.len(), bindings = self.bindings.len()))]
    pub fn build_engine(&self) -> CineResult<Engine<StaticLayout>> {
        let mut engine = Engine::with_boot_regions(
            self.config.clone(),
            self.boot_regions.clone(),
            self.layout.clone(),
            self.env,
        )?;
        for scene in &self.scenes {
            engine.register_scene(scene)?;
        }
        for pin in &self.pins {
            engine.attach_pin(pin.to_def()?)?;
        }
        for binding in &self.bindings {
            engine.register_binding(binding.to_binding()?)?;
        }
        if let Some(drift) = &self.drift {
            engine.set_drift(drift)?;
        }
        if let Some(header) = &self.header {
            engine.enable_header(header.clone())?;
        }
        for entrance in &self.entrances {
            engine.register_entrance(&entrance.timeline, entrance.delay_ms)?;
        }
        Ok(engine)
    }
}

/// One timed input.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TraceEvent {
    /// Time since the engine was initialized, ms.
    pub at_ms: f64,
    /// The input.
    #[serde(flatten)]
    pub input: InputEvent,
}

/// Inputs in time order.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct InputTrace(pub Vec<TraceEvent>);

impl InputTrace {
    /// Parse a JSON array of events.
    pub fn from_json_str(json: &str) -> CineResult<Self> {
        let trace: Self = serde_json::from_str(json)?;
        trace.validate()?;
        Ok(trace)
    }

    /// Times must be finite, non-negative and non-decreasing.
    pub fn validate(&self) -> CineResult<()> {
        let mut prev = 0.0;
        for (i, ev) in self.0.iter().enumerate() {
            if !ev.at_ms.is_finite() || ev.at_ms < prev {
                return Err(CineError::validation(format!(
                    "trace event {i} at {} ms is out of order",
                    ev.at_ms
                )));
            }
            prev = ev.at_ms;
        }
        Ok(())
    }

    /// Time of the last event.
    pub fn end_ms(&self) -> f64 {
        self.0.last().map_or(0.0, |ev| ev.at_ms)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/page/model.rs"]
mod tests;
