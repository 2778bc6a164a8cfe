//! cinescroll is a scroll-synchronized cinematic timeline engine.
//!
//! Raw wheel and touch input is smoothed into one virtual scroll position, and
//! every visual on the page is a function of that position (or of wall-clock
//! playback started by it):
//!
//! - [`VirtualScroller`] owns the position and produces one [`ScrollFrame`] per
//!   display tick
//! - [`TriggerRegistry`] maps position ranges to progress for many independent
//!   bindings
//! - [`Timeline`] renders declarative tweens scrubbed by progress or played
//!   directly
//! - [`PinnedSegmentController`] holds a section in place while scroll drives a
//!   horizontal track of scenes, with snapping
//! - [`BootSequencer`] plays the intro and gates input
//!
//! [`Engine`] wires them together. The host supplies a [`LayoutSource`], input
//! and a clock, and renders the per-region [`VisualState`]s found in the
//! engine's [`Stage`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod boot;
pub(crate) mod config;
pub(crate) mod engine;
pub(crate) mod host;
pub(crate) mod motion;
pub(crate) mod page;
pub(crate) mod pin;
pub(crate) mod scene;
pub(crate) mod scroll;
pub(crate) mod stage;
pub(crate) mod trigger;

pub use crate::foundation::core::{
    Affine, PlayDirection, RangeSide, Rect, ScrollDirection, ScrollRange, Size, Vec2,
};
pub use crate::foundation::error::{CineError, CineResult};
pub use crate::foundation::ids::{
    BindingHandle, BindingKey, ClaimOwner, CueId, FrameCallbackId, ListenerId, PinId, RegionId,
};

pub use crate::animation::ease::Ease;
pub use crate::animation::props::{Prop, Props, VisualState};
pub use crate::animation::timeline::{
    StepPosition, Timeline, TimelineDescriptor, TimelineEntry, TimelineSnapshot, TweenStep,
    build_timeline,
};
pub use crate::boot::sequencer::{BootRegions, BootSequencer, BootSignal, BootState};
pub use crate::config::{
    BootConfig, DriftConfig, EngineConfig, HeaderConfig, PinConfig, RevealConfig, ScrollerConfig,
    SettleBuffer,
};
pub use crate::engine::session::{Engine, EngineEvent, EngineLifecycle, TickReport};
pub use crate::host::{HostEnv, LayoutSource, StaticLayout};
pub use crate::motion::drift::{Drift, DriftDef, DriftRow};
pub use crate::page::model::{
    BindingSpec, DetailSpec, EntranceSpec, InputTrace, PageDef, PinSceneSpec, PinSpec,
    TraceEvent,
};
pub use crate::page::simulate::{
    FrameSample, MAX_FRAMES, MIN_FRAME_MS, Simulation, SimulationOptions, StageDump, simulate,
    simulate_with, stage_dump,
};
pub use crate::pin::controller::{DetailBinding, PinDef, PinnedSegmentController, SceneDef};
pub use crate::pin::segment::{PinSegment, SceneGeometry, SceneWidth, SceneWindow};
pub use crate::scene::transition::{
    ParallaxLayer, SceneHandles, SceneSpec, SceneTransition, reveal_descriptor,
};
pub use crate::scroll::frame::{InputEvent, ScrollFrame};
pub use crate::scroll::scroller::{ScrollerState, VirtualScroller};
pub use crate::scroll::velocity::VelocityTracker;
pub use crate::stage::Stage;
pub use crate::trigger::binding::{
    BindingCtx, BindingMode, BindingTarget, CallbackTarget, ScrubSmoothing, TimelineTarget,
    TriggerBinding,
};
pub use crate::trigger::range::{RangeEnd, RangeSpec, ScrollAnchor};
pub use crate::trigger::registry::TriggerRegistry;
