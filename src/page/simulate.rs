use std::collections::BTreeMap;

use crate::boot::sequencer::BootState;
use crate::engine::session::EngineEvent;
use crate::foundation::error::{CineError, CineResult};
use crate::foundation::ids::RegionId;
use crate::page::model::{InputTrace, PageDef};
use crate::stage::Stage;

/// Shortest frame interval a run accepts, ms.
pub const MIN_FRAME_MS: f64 = 1.0;

/// Upper bound on the frames of one run.
pub const MAX_FRAMES: u64 = 10_000_000;

/// Changed channels per region, by channel name.
pub type StageDump = BTreeMap<RegionId, BTreeMap<&'static str, f64>>;

/// How an offline run is clocked and sampled.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationOptions {
    /// Display frame interval, ms.
    pub frame_ms: f64,
    /// How long to keep ticking after the later of the last input and the
    /// post-boot refresh, ms.
    pub tail_ms: f64,
    /// Emit every n-th frame. Frames carrying events are always emitted.
    pub sample_every: u32,
    /// Attach the changed stage channels to each sample.
    pub include_stage: bool,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            frame_ms: 1000.0 / 60.0,
            tail_ms: 1000.0,
            sample_every: 1,
            include_stage: false,
        }
    }
}

/// State after one simulated frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FrameSample {
    /// Frame time, ms since init.
    pub at_ms: f64,
    /// Boot phase.
    pub boot: BootState,
    /// Virtual scroll position, once the scroller produces frames.
    pub position_px: Option<f64>,
    /// Smoothed velocity.
    pub velocity_px_per_ms: Option<f64>,
    /// Events raised this frame.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<EngineEvent>,
    /// Changed channels, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<StageDump>,
}

/// Outcome of [`simulate`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Simulation {
    /// Emitted samples in time order.
    pub samples: Vec<FrameSample>,
    /// Changed channels after the last frame.
    pub final_stage: StageDump,
    /// Final virtual scroll position.
    pub final_position_px: f64,
}

/// Changed channels of every region that differs from rest.
pub fn stage_dump(stage: &Stage) -> StageDump {
    stage
        .iter()
        .map(|(region, state)| (region.clone(), state.changed()))
        .filter(|(_, changed)| !changed.is_empty())
        .collect()
}

/// Run `page` against `trace` on a fixed frame clock, collecting samples.
pub fn simulate(page: &PageDef, trace: &InputTrace, opts: &SimulationOptions) -> CineResult<Simulation> {
    let mut samples = Vec::new();
    let (final_stage, final_position_px) = simulate_with(page, trace, opts, |s| samples.push(s))?;
    Ok(Simulation {
        samples,
        final_stage,
        final_position_px,
    })
}

/// Like [`simulate`], handing each sample to `on_sample` as it is produced.
/// Returns the final stage and position.
#[tracing::instrument(level = "debug", skip_all, fields(inputs = trace.0.len(), frame_ms = opts.frame_ms))]
pub fn simulate_with(
    page: &PageDef,
    trace: &InputTrace,
    opts: &SimulationOptions,
    mut on_sample: impl FnMut(FrameSample),
) -> CineResult<(StageDump, f64)> {
    if !opts.frame_ms.is_finite() || opts.frame_ms < MIN_FRAME_MS {
        return Err(CineError::validation(format!(
            "frame_ms must be finite and >= {MIN_FRAME_MS}"
        )));
    }
    if !opts.tail_ms.is_finite() || opts.tail_ms < 0.0 {
        return Err(CineError::validation("tail_ms must be finite and >= 0"));
    }
    trace.validate()?;

    let mut engine = page.build_engine()?;
    let settle_ms = engine.boot_duration_secs() * 1000.0 + page.config.refresh_after_ready_ms;
    let end_ms = trace.end_ms().max(settle_ms) + opts.tail_ms;
    let frames = (end_ms / opts.frame_ms).ceil();
    if frames > MAX_FRAMES as f64 {
        return Err(CineError::validation(format!(
            "run of {end_ms} ms at {} ms per frame exceeds {MAX_FRAMES} frames",
            opts.frame_ms
        )));
    }
    let every = opts.sample_every.max(1);

    engine.init(0.0);
    let mut inputs = trace.0.iter().peekable();
    let mut n: u64 = 1;
    loop {
        let now = n as f64 * opts.frame_ms;
        if now > end_ms {
            break;
        }
        while let Some(ev) = inputs.next_if(|ev| ev.at_ms <= now) {
            engine.push_input(ev.input);
        }
        let report = engine.tick(now);
        if n % u64::from(every) == 0 || !report.events.is_empty() {
            on_sample(FrameSample {
                at_ms: now,
                boot: engine.boot_state(),
                position_px: report.frame.map(|f| f.virtual_position_px),
                velocity_px_per_ms: report.frame.map(|f| f.velocity_px_per_ms),
                events: report.events.to_vec(),
                stage: opts.include_stage.then(|| stage_dump(engine.stage())),
            });
        }
        n += 1;
    }

    let result = (stage_dump(engine.stage()), engine.position());
    engine.dispose();
    tracing::debug!(frames = n - 1, final_px = result.1, "simulation finished");
    Ok(result)
}

#[cfg(test)]
#[path = "../../tests/unit/page/simulate.rs"]
mod tests;
