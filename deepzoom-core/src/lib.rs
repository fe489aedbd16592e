pub mod animator;
pub mod camera;
pub mod catalog;
pub mod color_cycle;
pub mod complex;
pub mod complex_dd;
pub mod config;
pub mod double_double;
pub mod engine;
pub mod error;
pub mod frame;
pub mod mode;
pub mod precision;
pub mod reference_orbit;

// Re-export primary types for convenience.
pub use animator::{AnimationState, FadeTrigger, TickEvent, TransitionPhase, ZoomAnimator};
pub use camera::CameraState;
pub use catalog::{JuliaPreset, Target, TargetCatalog, TargetEntry, JULIA_PRESETS, MANDELBROT_TARGETS};
pub use color_cycle::ColorCycle;
pub use complex::Complex;
pub use complex_dd::ComplexDD;
pub use config::{AnimatorSettings, EngineConfig, WatchdogSettings};
pub use double_double::DoubleDouble;
pub use engine::{Engine, TickReport};
pub use error::{CoreError, EvaluatorError};
pub use frame::{Frame, FrameEvaluator, FrameUniforms, NoEvaluator};
pub use mode::{FractalMode, JuliaModeController};
pub use precision::{PrecisionTier, TierSelection, TierSelector};
pub use reference_orbit::{OrbitPoint, OrbitRefresh, OrbitSeed, ReferenceOrbit};

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
