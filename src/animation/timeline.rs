//! Ordered property tweens played by progress (scrubbed) or by wall clock
//! (direct).
//!
//! A [`TimelineDescriptor`] is flattened at build time into one track per
//! `(target, channel)` pair, so rendering a progress value is a single pass
//! over precomputed tracks with no dependence on what was rendered before.

use std::collections::{BTreeMap, HashMap, HashSet};

use smallvec::SmallVec;

use crate::animation::ease::Ease;
use crate::animation::props::{Prop, Props};
use crate::foundation::core::PlayDirection;
use crate::foundation::error::{CineError, CineResult};
use crate::foundation::ids::{CueId, RegionId};
use crate::foundation::math::{clamp01, lerp};
use crate::stage::Stage;

/// Where a step (or cue) starts on the timeline, in seconds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPosition {
    /// Absolute time.
    At(f64),
    /// Relative to the current end of the timeline (negative overlaps it).
    AfterPrevious(f64),
    /// Relative to the start of the previous step.
    WithPrevious(f64),
}

impl Default for StepPosition {
    fn default() -> Self {
        Self::AfterPrevious(0.0)
    }
}

fn default_duration() -> f64 {
    0.5
}

/// One tween applied to one or more targets.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TweenStep {
    /// Regions animated by this step.
    pub targets: Vec<RegionId>,
    /// Start values. Channels missing here continue from the previous value.
    #[serde(default)]
    pub from: Props,
    /// End values. Channels missing here return to the previous value.
    #[serde(default)]
    pub to: Props,
    /// Ease applied to local progress.
    #[serde(default)]
    pub ease: Ease,
    /// Duration, seconds (the step's weight in scrubbed mode).
    #[serde(default = "default_duration")]
    pub duration_secs: f64,
    /// Start position.
    #[serde(default)]
    pub position: StepPosition,
    /// Delay between consecutive targets, seconds.
    #[serde(default)]
    pub stagger_secs: f64,
}

impl TweenStep {
    /// A step from nothing to `to` on `targets` with default timing.
    pub fn to(targets: impl IntoIterator<Item = RegionId>, to: Props) -> Self {
        Self {
            targets: targets.into_iter().collect(),
            from: Props::new(),
            to,
            ease: Ease::Linear,
            duration_secs: default_duration(),
            position: StepPosition::default(),
            stagger_secs: 0.0,
        }
    }

    /// Set explicit start values.
    pub fn from(mut self, from: Props) -> Self {
        self.from = from;
        self
    }

    /// Set the ease.
    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Set the duration in seconds.
    pub fn duration(mut self, secs: f64) -> Self {
        self.duration_secs = secs;
        self
    }

    /// Set the start position.
    pub fn at(mut self, position: StepPosition) -> Self {
        self.position = position;
        self
    }

    /// Set the per-target stagger in seconds.
    pub fn stagger(mut self, secs: f64) -> Self {
        self.stagger_secs = secs;
        self
    }
}

/// One entry of a timeline descriptor.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineEntry {
    /// A tween.
    Tween(TweenStep),
    /// A named marker reported when direct playback crosses it.
    Cue {
        /// Marker name, unique within the timeline.
        name: String,
        /// Marker position.
        #[serde(default)]
        position: StepPosition,
    },
}

/// Declarative, ordered timeline description.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimelineDescriptor {
    /// Steps and cues in authoring order.
    pub entries: Vec<TimelineEntry>,
}

impl TimelineDescriptor {
    /// Empty descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tween.
    pub fn step(mut self, step: TweenStep) -> Self {
        self.entries.push(TimelineEntry::Tween(step));
        self
    }

    /// Append a named cue.
    pub fn cue(mut self, name: impl Into<String>, position: StepPosition) -> Self {
        self.entries.push(TimelineEntry::Cue {
            name: name.into(),
            position,
        });
        self
    }
}

#[derive(Clone, Debug)]
struct Track {
    target: RegionId,
    prop: Prop,
    from: f64,
    to: f64,
    ease: Ease,
    /// Normalized start.
    offset: f64,
    /// Normalized duration.
    weight: f64,
    first_for_channel: bool,
}

impl Track {
    fn value_at(&self, p: f64) -> f64 {
        let local = clamp01((p - self.offset) / self.weight);
        lerp(self.from, self.to, self.ease.apply(local))
    }
}

#[derive(Clone, Debug)]
struct Cue {
    name: String,
    at: f64,
}

/// Property values of every track at one progress value.
pub type TimelineSnapshot = BTreeMap<(RegionId, Prop), f64>;

/// A built timeline with its own playhead.
#[derive(Clone, Debug)]
pub struct Timeline {
    tracks: Vec<Track>,
    cues: Vec<Cue>,
    duration_secs: f64,
    progress: f64,
    playing: Option<PlayDirection>,
}

/// Flatten and validate a descriptor.
#[tracing::instrument(level = "trace", skip_all, fields(entries = descriptor.entries.len()))]
pub fn build_timeline(descriptor: &TimelineDescriptor) -> CineResult<Timeline> {
    struct Pending {
        target: RegionId,
        prop: Prop,
        from: f64,
        to: f64,
        ease: Ease,
        start: f64,
        duration: f64,
    }

    let mut pending: Vec<Pending> = Vec::new();
    let mut cues: Vec<(String, f64)> = Vec::new();
    let mut chained: HashMap<(RegionId, Prop), f64> = HashMap::new();
    let mut end = 0.0_f64;
    let mut prev_start = 0.0_f64;

    for (idx, entry) in descriptor.entries.iter().enumerate() {
        match entry {
            TimelineEntry::Tween(step) => {
                validate_step(idx, step)?;
                let start = resolve_position(step.position, end, prev_start)
                    .map_err(|msg| CineError::animation(format!("step {idx}: {msg}")))?;

                let mut channels: SmallVec<[Prop; 8]> = SmallVec::new();
                for (prop, _) in step.from.iter().chain(step.to.iter()) {
                    if !channels.contains(&prop) {
                        channels.push(prop);
                    }
                }

                for (i, target) in step.targets.iter().enumerate() {
                    let t_start = start + i as f64 * step.stagger_secs;
                    for &prop in &channels {
                        let key = (target.clone(), prop);
                        let prior = chained.get(&key).copied().unwrap_or_else(|| prop.rest_value());
                        let from = step.from.get(prop).unwrap_or(prior);
                        let to = step.to.get(prop).unwrap_or(prior);
                        chained.insert(key, to);
                        pending.push(Pending {
                            target: target.clone(),
                            prop,
                            from,
                            to,
                            ease: step.ease,
                            start: t_start,
                            duration: step.duration_secs,
                        });
                    }
                }

                let span = (step.targets.len() - 1) as f64 * step.stagger_secs + step.duration_secs;
                end = end.max(start + span);
                prev_start = start;
            }
            TimelineEntry::Cue { name, position } => {
                if cues.iter().any(|(n, _)| n == name) {
                    return Err(CineError::animation(format!("duplicate cue '{name}'")));
                }
                let at = resolve_position(*position, end, prev_start)
                    .map_err(|msg| CineError::animation(format!("cue '{name}': {msg}")))?;
                end = end.max(at);
                cues.push((name.clone(), at));
            }
        }
    }

    if pending.is_empty() {
        return Err(CineError::animation("timeline has no tweens"));
    }
    if cues.len() > usize::from(u16::MAX) {
        return Err(CineError::animation("too many cues"));
    }

    // Stable: equal starts keep authoring order, so the later step wins.
    pending.sort_by(|a, b| a.start.total_cmp(&b.start));

    let total = end;
    let mut seen: HashSet<(RegionId, Prop)> = HashSet::new();
    let tracks = pending
        .into_iter()
        .map(|p| {
            let first = seen.insert((p.target.clone(), p.prop));
            Track {
                target: p.target,
                prop: p.prop,
                from: p.from,
                to: p.to,
                ease: p.ease,
                offset: p.start / total,
                weight: p.duration / total,
                first_for_channel: first,
            }
        })
        .collect();

    Ok(Timeline {
        tracks,
        cues: cues
            .into_iter()
            .map(|(name, at)| Cue { name, at: at / total })
            .collect(),
        duration_secs: total,
        progress: 0.0,
        playing: None,
    })
}

fn validate_step(idx: usize, step: &TweenStep) -> CineResult<()> {
    if step.targets.is_empty() {
        return Err(CineError::animation(format!("step {idx}: no targets")));
    }
    if step.from.is_empty() && step.to.is_empty() {
        return Err(CineError::animation(format!("step {idx}: no channels")));
    }
    if !(step.duration_secs.is_finite() && step.duration_secs > 0.0) {
        return Err(CineError::animation(format!(
            "step {idx}: duration must be finite and > 0 (got {})",
            step.duration_secs
        )));
    }
    if !(step.stagger_secs.is_finite() && step.stagger_secs >= 0.0) {
        return Err(CineError::animation(format!(
            "step {idx}: stagger must be finite and >= 0 (got {})",
            step.stagger_secs
        )));
    }
    let values_finite = step
        .from
        .iter()
        .chain(step.to.iter())
        .all(|(_, v)| v.is_finite());
    if !values_finite {
        return Err(CineError::animation(format!("step {idx}: non-finite property value")));
    }
    Ok(())
}

fn resolve_position(position: StepPosition, end: f64, prev_start: f64) -> Result<f64, String> {
    let at = match position {
        StepPosition::At(secs) => secs,
        StepPosition::AfterPrevious(delta) => end + delta,
        StepPosition::WithPrevious(delta) => prev_start + delta,
    };
    if !at.is_finite() {
        return Err("position must be finite".to_owned());
    }
    if at < 0.0 {
        return Err(format!("position resolves before the timeline start ({at})"));
    }
    Ok(at)
}

impl Timeline {
    /// Total duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    /// Current playhead, `[0, 1]`.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Direction of in-flight direct playback, if any.
    pub fn playing(&self) -> Option<PlayDirection> {
        self.playing
    }

    /// Look up a cue by name.
    pub fn cue_id(&self, name: &str) -> Option<CueId> {
        self.cues
            .iter()
            .position(|c| c.name == name)
            .and_then(|i| u16::try_from(i).ok())
            .map(CueId)
    }

    /// Name of a cue.
    pub fn cue_name(&self, id: CueId) -> Option<&str> {
        self.cues.get(usize::from(id.0)).map(|c| c.name.as_str())
    }

    /// Normalized position of a cue.
    pub fn cue_progress(&self, id: CueId) -> Option<f64> {
        self.cues.get(usize::from(id.0)).map(|c| c.at)
    }

    /// Regions this timeline writes.
    pub fn targets(&self) -> impl Iterator<Item = &RegionId> {
        let mut out: Vec<&RegionId> = self.tracks.iter().map(|t| &t.target).collect();
        out.sort();
        out.dedup();
        out.into_iter()
    }

    /// Jump to `p` and render it. Cancels direct playback. Cues are not
    /// reported for jumps.
    pub fn seek(&mut self, p: f64, stage: &mut Stage) {
        self.playing = None;
        self.progress = if p.is_finite() { clamp01(p) } else { 0.0 };
        self.render(stage);
    }

    /// Start direct playback from the current playhead. Replaces any
    /// in-flight playback.
    pub fn play(&mut self, direction: PlayDirection) {
        self.playing = Some(direction);
    }

    /// Halt direct playback where it is.
    pub fn pause(&mut self) {
        self.playing = None;
    }

    /// Advance direct playback by `dt_ms` of wall clock, render, and return
    /// the cues crossed on the way.
    pub fn advance(&mut self, dt_ms: f64, stage: &mut Stage) -> SmallVec<[CueId; 2]> {
        let mut fired = SmallVec::new();
        let Some(direction) = self.playing else {
            return fired;
        };
        if !(dt_ms > 0.0) {
            return fired;
        }
        let prev = self.progress;
        let step = dt_ms / 1000.0 / self.duration_secs;
        let next = clamp01(prev + direction.sign() * step);
        self.progress = next;
        self.render(stage);

        for (i, cue) in self.cues.iter().enumerate() {
            let crossed = match direction {
                PlayDirection::Forward => {
                    (prev < cue.at && cue.at <= next) || (cue.at == 0.0 && prev == 0.0 && next > 0.0)
                }
                PlayDirection::Reverse => {
                    (next <= cue.at && cue.at < prev) || (cue.at == 1.0 && prev == 1.0 && next < 1.0)
                }
            };
            if crossed {
                if let Ok(i) = u16::try_from(i) {
                    fired.push(CueId(i));
                }
            }
        }

        let finished = match direction {
            PlayDirection::Forward => next >= 1.0,
            PlayDirection::Reverse => next <= 0.0,
        };
        if finished {
            self.playing = None;
        }
        fired
    }

    /// Write the state at the current playhead.
    pub fn render(&self, stage: &mut Stage) {
        self.render_at(self.progress, |region, prop, value| {
            stage.set(region, prop, value);
        });
    }

    /// Values every track would write at `p`, without touching the playhead.
    pub fn snapshot(&self, p: f64) -> TimelineSnapshot {
        let mut out = TimelineSnapshot::new();
        self.render_at(clamp01(p), |region, prop, value| {
            out.insert((region.clone(), prop), value);
        });
        out
    }

    fn render_at(&self, p: f64, mut write: impl FnMut(&RegionId, Prop, f64)) {
        // Tracks are sorted by start: a later started track overwrites an
        // earlier one on the same channel; the first track of a channel also
        // renders before it starts.
        for track in &self.tracks {
            if track.first_for_channel || track.offset <= p {
                write(&track.target, track.prop, track.value_at(p));
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/timeline.rs"]
mod tests;
