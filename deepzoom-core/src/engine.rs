use std::time::Duration;

use tracing::{debug, info, warn};

use crate::animator::{TickEvent, ZoomAnimator};
use crate::catalog::TargetCatalog;
use crate::config::{AnimatorSettings, EngineConfig};
use crate::frame::{Frame, FrameEvaluator, FrameUniforms, NoEvaluator, UniformSources};
use crate::precision::{PrecisionTier, TierSelection, TierSelector};
use crate::reference_orbit::{OrbitRefresh, OrbitSeed, ReferenceOrbit};

/// Summary of one [`Engine::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub event: TickEvent,
    pub selection: TierSelection,
    /// `None` unless the perturbation tier was selected.
    pub orbit_refresh: Option<OrbitRefresh>,
    pub uniforms: FrameUniforms,
    /// Whether the evaluator accepted the frame.
    pub dispatched: bool,
}

/// Owns the animation, tier selection and reference orbit, and feeds an
/// optional evaluator.
///
/// Each tick runs strictly in order: animate, select tier, refresh orbit,
/// pack uniforms, dispatch.
pub struct Engine<E: FrameEvaluator = NoEvaluator> {
    animator: ZoomAnimator,
    selector: TierSelector,
    orbit: ReferenceOrbit,
    evaluator: Option<E>,
    last_output: Option<E::Output>,
    last_tier: Option<PrecisionTier>,
    evaluator_failures: u64,
}

impl Engine<NoEvaluator> {
    /// An engine that advances state but never dispatches.
    pub fn headless(catalog: TargetCatalog, config: &EngineConfig, seed: u64) -> Self {
        Self::new(
            ZoomAnimator::new(catalog, config, AnimatorSettings::default(), seed),
            TierSelector::default(),
            None,
        )
    }
}

impl<E: FrameEvaluator> Engine<E> {
    pub fn new(animator: ZoomAnimator, selector: TierSelector, evaluator: Option<E>) -> Self {
        Self {
            animator,
            selector,
            orbit: ReferenceOrbit::new(),
            evaluator,
            last_output: None,
            last_tier: None,
            evaluator_failures: 0,
        }
    }

    pub fn with_evaluator(
        catalog: TargetCatalog,
        config: &EngineConfig,
        seed: u64,
        evaluator: E,
    ) -> Self {
        Self::new(
            ZoomAnimator::new(catalog, config, AnimatorSettings::default(), seed),
            TierSelector::default(),
            Some(evaluator),
        )
    }

    pub fn animator(&self) -> &ZoomAnimator {
        &self.animator
    }

    pub fn animator_mut(&mut self) -> &mut ZoomAnimator {
        &mut self.animator
    }

    pub fn selector(&self) -> &TierSelector {
        &self.selector
    }

    pub fn orbit(&self) -> &ReferenceOrbit {
        &self.orbit
    }

    pub fn evaluator(&self) -> Option<&E> {
        self.evaluator.as_ref()
    }

    /// Output of the most recent successful dispatch.
    pub fn last_output(&self) -> Option<&E::Output> {
        self.last_output.as_ref()
    }

    pub fn evaluator_failures(&self) -> u64 {
        self.evaluator_failures
    }

    /// Advance one frame. `frame_time` is the wall time of the previous frame.
    pub fn tick(&mut self, frame_time: Duration) -> TickReport {
        let event = self.animator.tick(frame_time);
        let camera = *self.animator.camera();
        let mode = self.animator.mode();

        let selection = self.selector.select(camera.scale);
        if self.last_tier != Some(selection.tier) {
            info!(
                tier = %selection.tier,
                depth = selection.depth,
                max_iterations = selection.max_iterations,
                "Precision tier changed"
            );
            self.last_tier = Some(selection.tier);
        }

        let orbit_refresh = (selection.tier == PrecisionTier::Perturbation).then(|| {
            self.orbit.refresh(OrbitSeed {
                center: camera.center,
                mode,
                budget: selection.max_iterations,
            })
        });
        let orbit = orbit_refresh.map(|_| &self.orbit);

        let uniforms = FrameUniforms::pack(UniformSources {
            camera: &camera,
            state: self.animator.state(),
            colors: self.animator.colors(),
            selection: &selection,
            shading_mode: self.animator.shading_mode(),
            antialiasing: self.animator.loaded_config().antialiasing,
            orbit,
        });

        let dispatched = match self.evaluator.as_mut() {
            Some(evaluator) => {
                let frame = Frame {
                    uniforms,
                    selection,
                    camera: &camera,
                    mode,
                    orbit,
                };
                match evaluator.prepare_frame(&frame) {
                    Ok(output) => {
                        self.last_output = Some(output);
                        true
                    }
                    Err(e) => {
                        self.evaluator_failures += 1;
                        if self.evaluator_failures == 1 {
                            warn!("Evaluator rejected frame, skipping dispatch: {e}");
                        } else {
                            debug!(failures = self.evaluator_failures, "Evaluator rejected frame: {e}");
                        }
                        false
                    }
                }
            }
            None => false,
        };

        TickReport {
            event,
            selection,
            orbit_refresh,
            uniforms,
            dispatched,
        }
    }

    /// Apply configuration loaded from storage.
    pub fn reload_config(&mut self, config: &EngineConfig) {
        if config.sanitized() != *self.animator.loaded_config() {
            debug!(?config, "Configuration changed");
        }
        self.animator.apply_config(config);
    }
}
