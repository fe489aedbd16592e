use std::time::Instant;

use rayon::prelude::*;
use tracing::debug;

use deepzoom_core::{
    Complex, EvaluatorError, FractalMode, Frame, FrameEvaluator, PrecisionTier,
};

use crate::iteration_buffer::IterationBuffer;
use crate::kernels::{
    iterate_dd, iterate_f64, iterate_perturbation, mandelbrot_dd, mandelbrot_f64,
    IterationResult, PixelDelta, ReferenceView,
};
use crate::viewport::PixelGrid;

/// Evaluates every pixel of a frame on the CPU with the kernel for the
/// frame's tier.
///
/// Slow next to a GPU pass, but exact enough to check one against and to
/// preview headless runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceEvaluator {
    width: u32,
    height: u32,
}

impl ReferenceEvaluator {
    pub fn new(width: u32, height: u32) -> crate::Result<Self> {
        if width == 0 || height == 0 {
            return Err(EvaluatorError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Evaluate `frame` with an explicit tier instead of the one it selected.
    pub fn evaluate_with(
        &self,
        frame: &Frame<'_>,
        tier: PrecisionTier,
    ) -> crate::Result<IterationBuffer> {
        let start = Instant::now();
        let max_iter = frame.selection.max_iterations;
        let grid = PixelGrid::new(frame.camera, self.width, self.height);
        let center = frame.camera.center;
        let julia_c = frame.mode.julia_constant();

        let pixel: Box<dyn Fn(u32, u32) -> IterationResult + Sync + '_> = match tier {
            PrecisionTier::Float => {
                let c64 = center.to_complex();
                Box::new(move |px, py| {
                    let (dx, dy) = grid.offset(px, py);
                    let p = Complex::new(c64.re + dx, c64.im + dy);
                    match frame.mode {
                        FractalMode::Mandelbrot => mandelbrot_f64(p, max_iter),
                        FractalMode::Julia { .. } => iterate_f64(p, julia_c, max_iter),
                    }
                })
            }
            PrecisionTier::Extended => Box::new(move |px, py| {
                let p = grid.point_dd(center, px, py);
                match frame.mode {
                    FractalMode::Mandelbrot => mandelbrot_dd(p, max_iter),
                    FractalMode::Julia { .. } => iterate_dd(p, julia_c.into(), max_iter),
                }
            }),
            PrecisionTier::Perturbation => {
                let orbit = frame.orbit.ok_or(EvaluatorError::MissingOrbit)?;
                let reference = ReferenceView::new(orbit).ok_or(EvaluatorError::MissingOrbit)?;
                let seed_center = orbit
                    .seed()
                    .map_or(center, |seed| seed.center);
                // Nonzero only if the camera moved after the orbit was computed.
                let shift = (center - seed_center).to_complex();
                let is_julia = frame.mode.is_julia();
                Box::new(move |px, py| {
                    let (dx, dy) = grid.offset(px, py);
                    let offset = ((shift.re + dx) as f32, (shift.im + dy) as f32);
                    let delta = if is_julia {
                        PixelDelta {
                            dc: (0.0, 0.0),
                            eps0: offset,
                        }
                    } else {
                        PixelDelta {
                            dc: offset,
                            eps0: (0.0, 0.0),
                        }
                    };
                    iterate_perturbation(&reference, delta, max_iter)
                })
            }
        };

        let mut buffer = IterationBuffer::new(self.width, self.height, max_iter, tier);
        buffer
            .data
            .par_chunks_mut(self.width as usize)
            .enumerate()
            .for_each(|(py, row)| {
                for (px, slot) in row.iter_mut().enumerate() {
                    *slot = pixel(px as u32, py as u32);
                }
            });

        debug!(
            %tier,
            width = self.width,
            height = self.height,
            max_iter,
            escaped = buffer.escaped_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Reference frame evaluated"
        );
        Ok(buffer)
    }
}

impl FrameEvaluator for ReferenceEvaluator {
    type Output = IterationBuffer;

    fn prepare_frame(&mut self, frame: &Frame<'_>) -> crate::Result<IterationBuffer> {
        self.evaluate_with(frame, frame.selection.tier)
    }
}
