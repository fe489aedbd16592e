use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::camera::CameraState;
use crate::catalog::{Target, TargetCatalog};
use crate::color_cycle::ColorCycle;
use crate::complex::Complex;
use crate::complex_dd::ComplexDD;
use crate::config::{AnimatorSettings, EngineConfig, WatchdogSettings};
use crate::double_double::DoubleDouble;
use crate::mode::{FractalMode, JuliaModeController, ReselectOutcome};

/// Phase of the zoom/fade cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    Zooming,
    FadingOut,
    FadingIn,
}

/// Why a zoom ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeTrigger {
    /// Scale fell below twice the target's minimum.
    DepthReached,
    /// The zoom ran for the maximum number of ticks.
    ZoomDeadline,
    /// Too many consecutive slow frames.
    SlowFrames,
    /// Requested through [`ZoomAnimator::begin_fade_out`].
    Manual,
}

/// Snapshot of the animation, mutated once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationState {
    pub phase: TransitionPhase,
    /// Always within `[0, 1]`.
    pub opacity: f32,
    pub julia_active: bool,
    pub julia_constant: Complex,
    pub current_target_index: usize,
    pub tick_count: u64,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickEvent {
    Zoomed,
    FadeOutStarted(FadeTrigger),
    Fading,
    Reselected {
        target_index: usize,
        outcome: ReselectOutcome,
    },
    ZoomResumed,
}

/// Bounds the time spent on one zoom.
#[derive(Debug, Clone)]
pub struct Watchdog {
    settings: WatchdogSettings,
    zoom_ticks: u64,
    slow_frames: u32,
}

impl Watchdog {
    pub fn new(settings: WatchdogSettings) -> Self {
        Self {
            settings,
            zoom_ticks: 0,
            slow_frames: 0,
        }
    }

    pub fn reset(&mut self) {
        self.zoom_ticks = 0;
        self.slow_frames = 0;
    }

    /// Record one zooming frame and report whether the zoom must end.
    pub fn observe(&mut self, frame_time: Duration) -> Option<FadeTrigger> {
        self.zoom_ticks += 1;
        if frame_time > self.settings.slow_frame {
            self.slow_frames += 1;
        } else {
            self.slow_frames = 0;
        }

        if self.zoom_ticks > self.settings.max_zoom_ticks {
            Some(FadeTrigger::ZoomDeadline)
        } else if self.slow_frames >= self.settings.slow_frame_limit {
            Some(FadeTrigger::SlowFrames)
        } else {
            None
        }
    }
}

/// Drives the camera toward catalog targets and cycles through them with
/// fades in between.
pub struct ZoomAnimator {
    catalog: TargetCatalog,
    settings: AnimatorSettings,
    zoom_speed: f64,
    camera: CameraState,
    target: Target,
    state: AnimationState,
    modes: JuliaModeController,
    colors: ColorCycle,
    watchdog: Watchdog,
    loaded_config: EngineConfig,
    rng: StdRng,
}

impl ZoomAnimator {
    /// Build an animator and pick the first target.
    ///
    /// The first pick counts as zoom 1 of the mode cadence.
    pub fn new(
        catalog: TargetCatalog,
        config: &EngineConfig,
        settings: AnimatorSettings,
        seed: u64,
    ) -> Self {
        let config = config.sanitized();
        let mode = FractalMode::Mandelbrot;
        let camera = CameraState::wide(&mode, settings.wide_scale);
        let target = Target {
            center: camera.center,
            min_scale: DoubleDouble::from(settings.julia_min_scale),
            label: String::new(),
        };

        let mut animator = Self {
            catalog,
            settings,
            zoom_speed: config.zoom_speed,
            camera,
            target,
            state: AnimationState {
                phase: TransitionPhase::Zooming,
                opacity: 1.0,
                julia_active: false,
                julia_constant: Complex::ZERO,
                current_target_index: 0,
                tick_count: 0,
            },
            modes: JuliaModeController::new(config.julia_enabled, config.shading_mode),
            colors: ColorCycle::new(config.palette_index, config.auto_cycle_palettes),
            watchdog: Watchdog::new(settings.watchdog),
            loaded_config: config,
            rng: StdRng::seed_from_u64(seed),
        };
        animator.reselect(None);
        animator
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn mode(&self) -> FractalMode {
        self.modes.mode()
    }

    pub fn shading_mode(&self) -> u32 {
        self.modes.shading_mode()
    }

    pub fn zoom_count(&self) -> u64 {
        self.modes.zoom_count()
    }

    pub fn colors(&self) -> &ColorCycle {
        &self.colors
    }

    pub fn catalog(&self) -> &TargetCatalog {
        &self.catalog
    }

    pub fn zoom_speed(&self) -> f64 {
        self.zoom_speed
    }

    pub fn loaded_config(&self) -> &EngineConfig {
        &self.loaded_config
    }

    /// Advance one tick. `frame_time` is how long the previous frame took.
    pub fn tick(&mut self, frame_time: Duration) -> TickEvent {
        self.state.tick_count += 1;

        let event = match self.state.phase {
            TransitionPhase::Zooming => match self.fade_trigger(frame_time) {
                Some(trigger) => {
                    self.start_fade_out(trigger);
                    TickEvent::FadeOutStarted(trigger)
                }
                None => {
                    self.camera.zoom(self.zoom_speed);
                    self.camera
                        .ease_toward(self.target.center, self.settings.pan_speed);
                    TickEvent::Zoomed
                }
            },
            TransitionPhase::FadingOut => {
                self.state.opacity -= self.settings.fade_step;
                if self.state.opacity <= 0.0 {
                    self.state.opacity = 0.0;
                    let outcome = self.reselect(Some(self.state.current_target_index));
                    self.state.phase = TransitionPhase::FadingIn;
                    TickEvent::Reselected {
                        target_index: self.state.current_target_index,
                        outcome,
                    }
                } else {
                    TickEvent::Fading
                }
            }
            TransitionPhase::FadingIn => {
                self.state.opacity += self.settings.fade_step;
                if self.state.opacity >= 1.0 {
                    self.state.opacity = 1.0;
                    self.state.phase = TransitionPhase::Zooming;
                    self.watchdog.reset();
                    TickEvent::ZoomResumed
                } else {
                    TickEvent::Fading
                }
            }
        };

        self.colors.tick();
        event
    }

    /// End the current zoom early. Ignored unless zooming.
    pub fn begin_fade_out(&mut self) -> bool {
        if self.state.phase == TransitionPhase::Zooming {
            self.start_fade_out(FadeTrigger::Manual);
            true
        } else {
            false
        }
    }

    /// Apply a freshly loaded configuration.
    ///
    /// Palette and shading only change when the stored value differs from the
    /// last load, so automatic rotation is not undone by a periodic reload.
    pub fn apply_config(&mut self, config: &EngineConfig) {
        let config = config.sanitized();
        self.zoom_speed = config.zoom_speed;
        self.modes.set_julia_enabled(config.julia_enabled);
        self.colors.auto_cycle = config.auto_cycle_palettes;

        if config.palette_index != self.loaded_config.palette_index {
            self.colors.set_palette(config.palette_index);
        }
        if config.shading_mode != self.loaded_config.shading_mode {
            self.modes.set_shading_mode(config.shading_mode);
        }
        self.loaded_config = config;
    }

    fn fade_trigger(&mut self, frame_time: Duration) -> Option<FadeTrigger> {
        if self.camera.scale.hi_lt(2.0 * self.target.min_scale.hi) {
            return Some(FadeTrigger::DepthReached);
        }
        self.watchdog.observe(frame_time)
    }

    fn start_fade_out(&mut self, trigger: FadeTrigger) {
        match trigger {
            FadeTrigger::DepthReached => debug!(
                target = %self.target.label,
                scale = self.camera.scale.hi,
                "Target depth reached"
            ),
            FadeTrigger::ZoomDeadline | FadeTrigger::SlowFrames => info!(
                ?trigger,
                target = %self.target.label,
                scale = self.camera.scale.hi,
                "Watchdog ended the zoom early"
            ),
            FadeTrigger::Manual => info!(target = %self.target.label, "Zoom skipped"),
        }
        self.state.phase = TransitionPhase::FadingOut;
    }

    fn reselect(&mut self, current: Option<usize>) -> ReselectOutcome {
        let index = self.catalog.pick_next(current, &mut self.rng);
        let outcome = self.modes.on_reselect(&mut self.rng);
        let mode = self.modes.mode();

        self.camera = CameraState::wide(&mode, self.settings.wide_scale);
        self.target = match mode {
            FractalMode::Julia { c } => Target {
                center: ComplexDD::ZERO,
                min_scale: DoubleDouble::from(self.settings.julia_min_scale),
                label: format!("Julia {c}"),
            },
            FractalMode::Mandelbrot => match self.catalog.get(index) {
                Some(target) => target.clone(),
                None => self.target.clone(),
            },
        };

        self.state.current_target_index = index;
        self.state.julia_active = mode.is_julia();
        self.state.julia_constant = mode.julia_constant();

        info!(
            zoom = outcome.zoom_count,
            target = %self.target.label,
            min_scale = self.target.min_scale.hi,
            julia = self.state.julia_active,
            shading = self.modes.shading_mode(),
            "Selected new target"
        );
        outcome
    }
}
