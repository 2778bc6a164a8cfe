//! Typed scene transitions and reveal groups, resolved into bindings once at
//! registration.

use crate::animation::ease::Ease;
use crate::animation::props::{Prop, Props};
use crate::animation::timeline::{StepPosition, TimelineDescriptor, TweenStep, build_timeline};
use crate::config::RevealConfig;
use crate::foundation::error::CineResult;
use crate::foundation::ids::{BindingHandle, RegionId};
use crate::trigger::binding::{BindingMode, ScrubSmoothing, TimelineTarget, TriggerBinding};
use crate::trigger::range::{RangeEnd, RangeSpec, ScrollAnchor};

fn default_parallax_speed() -> f64 {
    0.2
}

/// A layer that drifts up while its section leaves.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParallaxLayer {
    /// Layer region.
    pub region: RegionId,
    /// Depth factor: the layer travels `200 · speed` px.
    #[serde(default = "default_parallax_speed")]
    pub speed: f64,
}

/// How a section leaves the viewport.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SceneTransition {
    /// Fade, dolly forward, lift and blur.
    SoftCut,
    /// Clip away from the bottom while shrinking.
    EditorialWipe,
    /// Layers rise at different speeds while the section fades.
    ParallaxDepth {
        /// Layers inside the section.
        #[serde(default)]
        layers: Vec<ParallaxLayer>,
    },
}

impl SceneTransition {
    /// Timeline played over the section's exit range.
    pub fn descriptor(&self, section: &RegionId) -> TimelineDescriptor {
        let section = || [section.clone()];
        match self {
            Self::SoftCut => TimelineDescriptor::new().step(
                TweenStep::to(
                    section(),
                    Props::new().opacity(0.0).scale(1.1).y(-100.0).blur(15.0),
                )
                .ease(Ease::InOutCubic),
            ),
            Self::EditorialWipe => TimelineDescriptor::new().step(
                TweenStep::to(
                    section(),
                    Props::new()
                        .with(Prop::ClipBottom, 100.0)
                        .opacity(0.0)
                        .scale(0.9),
                )
                .ease(Ease::InOutQuad),
            ),
            Self::ParallaxDepth { layers } => {
                let mut d = TimelineDescriptor::new();
                for layer in layers {
                    d = d.step(
                        TweenStep::to([layer.region.clone()], Props::new().y(-200.0 * layer.speed))
                            .at(StepPosition::At(0.0)),
                    );
                }
                d.step(
                    TweenStep::to(section(), Props::new().opacity(0.0).blur(10.0))
                        .at(StepPosition::At(0.0)),
                )
            }
        }
    }
}

/// A section registered with the engine.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneSpec {
    /// Section region.
    pub section: RegionId,
    /// Exit transition, if any.
    #[serde(default)]
    pub transition: Option<SceneTransition>,
    /// Elements revealed with a stagger when the section comes into view.
    #[serde(default)]
    pub reveals: Vec<RegionId>,
    /// Exit scrub smoothing.
    #[serde(default)]
    pub scrub: ScrubSmoothing,
}

impl SceneSpec {
    /// Section with neither transition nor reveals.
    pub fn new(section: impl Into<RegionId>) -> Self {
        Self {
            section: section.into(),
            transition: None,
            reveals: Vec::new(),
            scrub: ScrubSmoothing::Immediate,
        }
    }

    /// Set the exit transition.
    pub fn transition(mut self, transition: SceneTransition) -> Self {
        self.transition = Some(transition);
        self
    }

    /// Add a revealed element.
    pub fn reveal(mut self, region: impl Into<RegionId>) -> Self {
        self.reveals.push(region.into());
        self
    }
}

/// Handles of the bindings a scene resolved into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SceneHandles {
    /// Exit transition binding.
    pub transition: Option<BindingHandle>,
    /// Reveal binding.
    pub reveal: Option<BindingHandle>,
}

/// Reveal timeline: every element rises out of a blur, staggered.
pub fn reveal_descriptor(targets: &[RegionId], cfg: &RevealConfig) -> TimelineDescriptor {
    TimelineDescriptor::new().step(
        TweenStep::to(
            targets.iter().cloned(),
            Props::new().opacity(1.0).y(0.0).blur(0.0),
        )
        .from(Props::new().opacity(0.0).y(cfg.from_y_px).blur(cfg.from_blur_px))
        .duration(cfg.duration_secs)
        .stagger(cfg.stagger_secs)
        .ease(cfg.ease),
    )
}

/// Resolve a scene into its bindings. Under reduced motion the exit transition
/// is skipped; reveals are kept.
pub(crate) fn scene_bindings(
    spec: &SceneSpec,
    reveal: &RevealConfig,
    reduced_motion: bool,
) -> CineResult<(Option<TriggerBinding>, Option<TriggerBinding>)> {
    let section = &spec.section;
    let exit = match &spec.transition {
        Some(transition) if !reduced_motion => {
            let timeline = build_timeline(&transition.descriptor(section))?;
            Some(TriggerBinding::new(
                format!("scene:{section}"),
                RangeSpec::between(section.clone(), ScrollAnchor::BOTTOM_BOTTOM, ScrollAnchor::BOTTOM_TOP),
                BindingMode::Scrub(spec.scrub),
                TimelineTarget::new(timeline),
            ))
        }
        _ => None,
    };
    let reveals = if spec.reveals.is_empty() {
        None
    } else {
        let timeline = build_timeline(&reveal_descriptor(&spec.reveals, reveal))?;
        Some(TriggerBinding::new(
            format!("reveal:{section}"),
            RangeSpec::Anchored {
                region: section.clone(),
                start: ScrollAnchor::new(0.0, reveal.start_viewport_edge),
                end: RangeEnd::Anchor(ScrollAnchor::BOTTOM_TOP),
            },
            BindingMode::Toggle,
            TimelineTarget::new(timeline),
        ))
    };
    Ok((exit, reveals))
}

#[cfg(test)]
#[path = "../../tests/unit/scene/transition.rs"]
mod tests;
