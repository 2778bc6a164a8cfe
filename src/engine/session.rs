use std::collections::BTreeMap;

use smallvec::SmallVec;

use crate::animation::timeline::{Timeline, TimelineDescriptor, build_timeline};
use crate::boot::sequencer::{BootRegions, BootSequencer, BootSignal, BootState};
use crate::config::EngineConfig;
use crate::engine::resize::ResizeDebouncer;
use crate::foundation::core::PlayDirection;
use crate::foundation::error::{CineError, CineResult};
use crate::foundation::ids::{BindingHandle, FrameCallbackId, ListenerId, PinId, RegionId};
use crate::host::{HostEnv, LayoutSource};
use crate::motion::drift::{Drift, DriftDef, DriftTarget};
use crate::motion::header::HeaderTarget;
use crate::pin::controller::{PinDef, PinnedSegmentController};
use crate::scene::transition::{SceneHandles, SceneSpec, scene_bindings};
use crate::scroll::frame::{InputEvent, ScrollFrame};
use crate::scroll::scroller::VirtualScroller;
use crate::stage::Stage;
use crate::trigger::binding::{BindingMode, TriggerBinding};
use crate::trigger::range::{RangeEnd, RangeSpec, ScrollAnchor};
use crate::trigger::registry::TriggerRegistry;

/// Lifecycle notifications delivered to listeners and in [`TickReport`]s.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineEvent {
    /// Boot reached the split: the page now takes input.
    InteractionUnlocked,
    /// Boot finished.
    Ready,
    /// Layout-dependent ranges and extents were recomputed.
    Refreshed,
}

/// Where an engine is in its lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineLifecycle {
    /// Constructed; registrations allowed, no ticks yet.
    Created,
    /// Initialized and ticking.
    Running,
    /// Torn down. Terminal.
    Disposed,
}

/// What one [`Engine::tick`] did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Frame produced by the scroller, if it is active.
    pub frame: Option<ScrollFrame>,
    /// Events raised since the previous tick, in order.
    pub events: SmallVec<[EngineEvent; 2]>,
}

type Listener = Box<dyn FnMut(EngineEvent)>;

/// One-shot timeline played a fixed delay after interaction unlocks.
struct Entrance {
    timeline: Timeline,
    remaining_ms: f64,
    started: bool,
}

/// One scroll-driven page: scroller, bindings, pins and the boot sequence,
/// all writing into one [`Stage`].
///
/// Engines are explicit values; several can coexist. The host drives one with
/// [`init`](Self::init), then [`push_input`](Self::push_input) and
/// [`tick`](Self::tick) every display frame, and finally
/// [`dispose`](Self::dispose).
pub struct Engine<L: LayoutSource> {
    cfg: EngineConfig,
    layout: L,
    env: HostEnv,
    lifecycle: EngineLifecycle,

    scroller: VirtualScroller,
    registry: TriggerRegistry,
    stage: Stage,
    boot: BootSequencer,
    pins: BTreeMap<PinId, PinnedSegmentController>,
    next_pin: u64,
    entrances: Vec<Entrance>,

    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
    pending_events: SmallVec<[EngineEvent; 2]>,

    resize: ResizeDebouncer,
    refresh_due_ms: Option<f64>,
    last_tick_ms: Option<f64>,
    last_input_ms: Option<f64>,
    input_since_tick: bool,
    release_since_tick: bool,
    released: bool,
    snap_armed: bool,
}

impl<L: LayoutSource> Engine<L> {
    /// Engine with the default boot overlay regions.
    pub fn new(cfg: EngineConfig, layout: L, env: HostEnv) -> CineResult<Self> {
        Self::with_boot_regions(cfg, BootRegions::default(), layout, env)
    }

    /// Engine whose boot sequence animates `regions`.
    #[tracing::instrument(level = "debug", skip_all, fields(reduced_motion = env.reduced_motion))]
    pub fn with_boot_regions(
        cfg: EngineConfig,
        regions: BootRegions,
        layout: L,
        env: HostEnv,
    ) -> CineResult<Self> {
        cfg.validate()?;
        let scroller = VirtualScroller::new(cfg.scroller.clone(), env, layout.max_scroll())?;
        let boot = BootSequencer::new(&cfg.boot, &regions, env)?;
        let resize = ResizeDebouncer::new(cfg.resize_debounce_ms);
        Ok(Self {
            cfg,
            layout,
            env,
            lifecycle: EngineLifecycle::Created,
            scroller,
            registry: TriggerRegistry::new(),
            stage: Stage::new(),
            boot,
            pins: BTreeMap::new(),
            next_pin: 0,
            entrances: Vec::new(),
            listeners: Vec::new(),
            next_listener: 0,
            pending_events: SmallVec::new(),
            resize,
            refresh_due_ms: None,
            last_tick_ms: None,
            last_input_ms: None,
            input_since_tick: false,
            release_since_tick: false,
            released: false,
            snap_armed: false,
        })
    }

    /// Start the boot sequence. Calling it again, or after
    /// [`dispose`](Self::dispose), does nothing.
    pub fn init(&mut self, now_ms: f64) {
        if self.lifecycle != EngineLifecycle::Created {
            tracing::debug!(lifecycle = ?self.lifecycle, "init ignored");
            return;
        }
        self.lifecycle = EngineLifecycle::Running;
        self.last_tick_ms = Some(now_ms);
        self.boot.prime(&mut self.stage);
        self.boot.start();
        tracing::debug!(now_ms, "engine initialized");
    }

    /// Tear everything down: stop the scroller, detach pins, drop bindings and
    /// listeners. Idempotent.
    pub fn dispose(&mut self) {
        if self.lifecycle == EngineLifecycle::Disposed {
            return;
        }
        self.scroller.stop();
        let pins = std::mem::take(&mut self.pins);
        for (_, pin) in pins {
            pin.detach(&mut self.registry, &mut self.stage);
        }
        self.registry.clear();
        self.entrances.clear();
        self.listeners.clear();
        self.pending_events.clear();
        self.resize.cancel();
        self.refresh_due_ms = None;
        self.lifecycle = EngineLifecycle::Disposed;
        tracing::debug!("engine disposed");
    }

    /// Current lifecycle phase.
    pub fn lifecycle(&self) -> EngineLifecycle {
        self.lifecycle
    }

    /// Configuration in effect.
    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    /// Host flags in effect.
    pub fn env(&self) -> HostEnv {
        self.env
    }

    /// Visual output.
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Layout source.
    pub fn layout(&self) -> &L {
        &self.layout
    }

    /// Mutable layout source. Follow changes with
    /// [`notify_resize`](Self::notify_resize) or [`refresh`](Self::refresh).
    pub fn layout_mut(&mut self) -> &mut L {
        &mut self.layout
    }

    /// The scroller.
    pub fn scroller(&self) -> &VirtualScroller {
        &self.scroller
    }

    /// The top-level binding registry.
    pub fn registry(&self) -> &TriggerRegistry {
        &self.registry
    }

    /// Current virtual scroll position.
    pub fn position(&self) -> f64 {
        self.scroller.position()
    }

    /// Current boot phase.
    pub fn boot_state(&self) -> BootState {
        self.boot.state()
    }

    /// Length of the boot sequence, seconds.
    pub fn boot_duration_secs(&self) -> f64 {
        self.boot.duration_secs()
    }

    /// Zero-padded boot counter text.
    pub fn boot_counter_text(&self) -> String {
        self.boot.counter_text()
    }

    /// An attached pinned segment.
    pub fn pin(&self, id: PinId) -> Option<&PinnedSegmentController> {
        self.pins.get(&id)
    }

    /// Subscribe to lifecycle events.
    pub fn on_event(&mut self, listener: impl FnMut(EngineEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Unsubscribe. Returns false if `id` was not subscribed.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        self.listeners.len() != before
    }

    /// Per-frame callback on the scroller.
    pub fn on_frame(&mut self, cb: impl FnMut(&ScrollFrame) + 'static) -> FrameCallbackId {
        self.scroller.on_frame(cb)
    }

    /// Remove a per-frame callback.
    pub fn remove_frame_callback(&mut self, id: FrameCallbackId) -> bool {
        self.scroller.remove_frame_callback(id)
    }

    /// Queue raw input. Input before interaction unlocks is dropped.
    pub fn push_input(&mut self, input: InputEvent) {
        if self.lifecycle != EngineLifecycle::Running {
            return;
        }
        if input.is_continuous() {
            self.input_since_tick = true;
        }
        if matches!(input, InputEvent::Release) {
            self.release_since_tick = true;
        }
        self.scroller.push_input(input);
    }

    /// Register a custom binding.
    pub fn register_binding(&mut self, binding: TriggerBinding) -> CineResult<Option<BindingHandle>> {
        self.ensure_open()?;
        self.registry.register(binding, &self.layout)
    }

    /// Remove a binding.
    pub fn unregister_binding(&mut self, handle: BindingHandle) -> bool {
        self.registry.unregister(handle)
    }

    /// Register a section's exit transition and reveal group.
    #[tracing::instrument(level = "debug", skip_all, fields(section = %spec.section))]
    pub fn register_scene(&mut self, spec: &SceneSpec) -> CineResult<SceneHandles> {
        self.ensure_open()?;
        let (exit, reveal) = scene_bindings(spec, &self.cfg.reveal, self.env.reduced_motion)?;
        let mut handles = SceneHandles::default();
        if let Some(binding) = exit {
            handles.transition = self.registry.register(binding, &self.layout)?;
        }
        if let Some(binding) = reveal {
            match self.registry.register(binding, &self.layout) {
                Ok(handle) => handles.reveal = handle,
                Err(err) => {
                    if let Some(h) = handles.transition {
                        self.registry.unregister(h);
                    }
                    return Err(err);
                }
            }
        }
        Ok(handles)
    }

    /// Attach a pinned horizontal segment.
    pub fn attach_pin(&mut self, def: PinDef) -> CineResult<PinId> {
        self.ensure_open()?;
        let pin = PinnedSegmentController::attach(
            def,
            &self.cfg.pin,
            &mut self.registry,
            &mut self.stage,
            &self.layout,
        )?;
        let id = PinId(self.next_pin);
        self.next_pin += 1;
        self.pins.insert(id, pin);
        Ok(id)
    }

    /// Detach a pinned segment, releasing its channels.
    pub fn detach_pin(&mut self, id: PinId) -> bool {
        match self.pins.remove(&id) {
            Some(pin) => {
                pin.detach(&mut self.registry, &mut self.stage);
                true
            }
            None => false,
        }
    }

    /// Drifting ribbons whose speed follows scroll velocity inside the watch
    /// region. Skipped under reduced motion.
    pub fn set_drift(&mut self, def: &DriftDef) -> CineResult<Option<BindingHandle>> {
        self.ensure_open()?;
        if self.env.reduced_motion {
            tracing::debug!(watch = %def.watch, "drift skipped under reduced motion");
            return Ok(None);
        }
        let binding = TriggerBinding::new(
            format!("drift:{}", def.watch),
            RangeSpec::Anchored {
                region: def.watch.clone(),
                start: ScrollAnchor::TOP_TOP,
                end: RangeEnd::Anchor(ScrollAnchor::BOTTOM_TOP),
            },
            BindingMode::Observe,
            DriftTarget {
                drift: Drift::new(def, self.cfg.drift.clone()),
            },
        );
        self.registry.register(binding, &self.layout)
    }

    /// Header that hides while scrolling down and returns when scrolling up.
    pub fn enable_header(&mut self, region: impl Into<RegionId>) -> CineResult<Option<BindingHandle>> {
        self.ensure_open()?;
        let region = region.into();
        let binding = TriggerBinding::new(
            format!("header:{region}"),
            RangeSpec::ToMaxScroll { start_px: 0.0 },
            BindingMode::Observe,
            HeaderTarget::new(region, &self.cfg.header)?,
        );
        self.registry.register(binding, &self.layout)
    }

    /// One-shot timeline played `delay_ms` after interaction unlocks (or after
    /// registration, once already unlocked). Its targets sit at the start
    /// state until then.
    pub fn register_entrance(&mut self, descriptor: &TimelineDescriptor, delay_ms: f64) -> CineResult<()> {
        self.ensure_open()?;
        if !delay_ms.is_finite() || delay_ms < 0.0 {
            return Err(CineError::validation("entrance delay must be finite and >= 0"));
        }
        let timeline = build_timeline(descriptor)?;
        timeline.render(&mut self.stage);
        self.entrances.push(Entrance {
            timeline,
            remaining_ms: delay_ms,
            started: false,
        });
        Ok(())
    }

    /// Record a viewport change; layout is recomputed once resizes have been
    /// quiet for `resize_debounce_ms`.
    pub fn notify_resize(&mut self, now_ms: f64) {
        if self.lifecycle == EngineLifecycle::Disposed {
            return;
        }
        self.resize.notify(now_ms);
    }

    /// Recompute extent, binding ranges and pinned segments from the layout.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn refresh(&mut self) {
        if self.lifecycle == EngineLifecycle::Disposed {
            return;
        }
        self.scroller.set_content_extent(self.layout.max_scroll());
        self.registry.refresh(&self.layout);
        // Pins after the registry so their ranges come from fresh geometry.
        for pin in self.pins.values() {
            pin.remeasure(&self.cfg.pin, &mut self.registry, &self.layout);
        }
        tracing::debug!(extent_px = self.scroller.content_extent(), "layout refreshed");
        self.emit(EngineEvent::Refreshed);
    }

    /// Advance one display frame.
    pub fn tick(&mut self, now_ms: f64) -> TickReport {
        if self.lifecycle != EngineLifecycle::Running {
            return TickReport::default();
        }
        let dt_ms = match self.last_tick_ms {
            Some(prev) => (now_ms - prev).clamp(0.0, self.cfg.scroller.max_frame_dt_ms),
            None => 0.0,
        };
        self.last_tick_ms = Some(now_ms);

        if let Some(coalesced) = self.resize.poll(now_ms) {
            tracing::debug!(coalesced, "resize settled");
            self.refresh();
        }

        for signal in self.boot.advance(dt_ms, &mut self.stage) {
            match signal {
                BootSignal::InteractionUnlocked => self.unlock(),
                BootSignal::Ready => {
                    self.refresh_due_ms = Some(now_ms + self.cfg.refresh_after_ready_ms);
                    self.emit(EngineEvent::Ready);
                }
            }
        }
        if self.refresh_due_ms.is_some_and(|due| now_ms >= due) {
            self.refresh_due_ms = None;
            self.refresh();
        }

        self.advance_entrances(dt_ms);
        self.maybe_snap(now_ms);

        let frame = self.scroller.tick(now_ms);
        if let Some(frame) = &frame {
            self.registry.update(frame, &mut self.stage);
        }
        self.registry.advance(dt_ms, &mut self.stage);

        TickReport {
            frame,
            events: std::mem::take(&mut self.pending_events),
        }
    }

    fn ensure_open(&self) -> CineResult<()> {
        if self.lifecycle == EngineLifecycle::Disposed {
            return Err(CineError::validation("engine is disposed"));
        }
        Ok(())
    }

    fn unlock(&mut self) {
        if self.env.reduced_motion {
            self.scroller.follow_native();
        } else {
            self.scroller.start();
        }
        self.emit(EngineEvent::InteractionUnlocked);
    }

    fn advance_entrances(&mut self, dt_ms: f64) {
        if !self.boot.is_unlocked() {
            return;
        }
        for entrance in &mut self.entrances {
            if !entrance.started {
                entrance.remaining_ms -= dt_ms;
                if entrance.remaining_ms > 0.0 {
                    continue;
                }
                entrance.started = true;
                entrance.timeline.play(PlayDirection::Forward);
            }
            entrance.timeline.advance(dt_ms, &mut self.stage);
        }
    }

    /// Settle on the nearest scene once scrolling has come to rest inside a
    /// pin: after a release, or after `snap_idle_ms` without input.
    fn maybe_snap(&mut self, now_ms: f64) {
        if std::mem::take(&mut self.input_since_tick) {
            self.last_input_ms = Some(now_ms);
            self.snap_armed = true;
            self.released = false;
        }
        if std::mem::take(&mut self.release_since_tick) {
            self.released = true;
        }
        if !self.snap_armed || self.env.reduced_motion || !self.cfg.pin.snap_enabled {
            return;
        }
        let idle = self
            .last_input_ms
            .is_some_and(|t| now_ms - t >= self.cfg.pin.snap_idle_ms);
        if !(self.released || idle) || !self.scroller.is_settled() {
            return;
        }
        self.snap_armed = false;
        self.released = false;
        let target = self.pins.values().find_map(|pin| pin.release());
        if let Some(target_px) = target {
            self.scroller
                .animate_to(target_px, self.cfg.pin.snap_duration_ms, self.cfg.pin.snap_ease, now_ms);
        }
    }

    fn emit(&mut self, event: EngineEvent) {
        tracing::debug!(?event, "engine event");
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
        self.pending_events.push(event);
    }
}

impl<L: LayoutSource> std::fmt::Debug for Engine<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("lifecycle", &self.lifecycle)
            .field("env", &self.env)
            .field("boot", &self.boot.state())
            .field("scroller", &self.scroller)
            .field("bindings", &self.registry.len())
            .field("pins", &self.pins.len())
            .field("resize_pending", &self.resize.is_pending())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/session.rs"]
mod tests;
