use deepzoom_core::PrecisionTier;

use crate::kernels::IterationResult;

/// Per-pixel iteration data for one evaluated frame, row-major.
///
/// Kept separate from any coloring so the same data can be compared across
/// tiers or colored later.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationBuffer {
    pub width: u32,
    pub height: u32,
    pub max_iterations: u32,
    pub tier: PrecisionTier,
    pub data: Vec<IterationResult>,
}

impl IterationBuffer {
    pub fn new(width: u32, height: u32, max_iterations: u32, tier: PrecisionTier) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            max_iterations,
            tier,
            data: vec![IterationResult::Interior; size],
        }
    }

    pub fn get(&self, px: u32, py: u32) -> Option<&IterationResult> {
        if px >= self.width || py >= self.height {
            return None;
        }
        self.data.get((py * self.width + px) as usize)
    }

    pub fn escaped_count(&self) -> usize {
        self.data
            .iter()
            .filter(|r| matches!(r, IterationResult::Escaped { .. }))
            .count()
    }

    pub fn interior_count(&self) -> usize {
        self.data.len() - self.escaped_count()
    }
}
