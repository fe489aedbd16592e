pub mod evaluator;
pub mod iteration_buffer;
pub mod kernels;
pub mod viewport;

pub use evaluator::ReferenceEvaluator;
pub use iteration_buffer::IterationBuffer;
pub use kernels::{IterationResult, PixelDelta, ReferenceView};
pub use viewport::PixelGrid;

/// Convenience result type for the render crate.
pub type Result<T> = std::result::Result<T, deepzoom_core::EvaluatorError>;
