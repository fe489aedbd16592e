use thiserror::Error;

/// Errors originating from the core engine.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid decimal literal {literal:?}: {reason}")]
    InvalidDecimal { literal: String, reason: String },

    #[error("invalid target {label:?}: {reason}")]
    InvalidTarget { label: String, reason: String },

    #[error("target catalog is empty")]
    EmptyCatalog,
}

/// Reasons a pixel evaluator can refuse a frame.
///
/// None of these stop the engine: the tick still advances the animation and
/// only the dispatch is skipped.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("compute backend unavailable: {0}")]
    Unavailable(String),

    #[error("perturbation tier requested without a reference orbit")]
    MissingOrbit,

    #[error("invalid frame dimensions: {width}×{height}")]
    InvalidDimensions { width: u32, height: u32 },
}
