use std::time::Instant;

use bytemuck::{Pod, Zeroable};
use tracing::debug;

use crate::complex_dd::ComplexDD;
use crate::mode::FractalMode;

/// Squared escape radius.
pub const ESCAPE_RADIUS_SQ: f64 = 4.0;

/// One reference-orbit record, laid out for direct upload.
///
/// `approx` is the orbit value rounded to `f32`; `delta` is the correction
/// that turns a single-precision step from `approx` into the next `approx`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct OrbitPoint {
    pub approx_re: f32,
    pub approx_im: f32,
    pub delta_re: f32,
    pub delta_im: f32,
}

impl OrbitPoint {
    #[inline]
    pub fn approx(&self) -> (f32, f32) {
        (self.approx_re, self.approx_im)
    }

    #[inline]
    pub fn delta(&self) -> (f32, f32) {
        (self.delta_re, self.delta_im)
    }
}

/// `z² + c` in single precision, as the per-pixel kernel computes it.
#[inline]
pub fn single_step(z: (f32, f32), c: (f32, f32)) -> (f32, f32) {
    let (x, y) = z;
    (x * x - y * y + c.0, 2.0 * x * y + c.1)
}

/// Reference value `Z_{n+1}` reconstructed from record `n`.
///
/// Exact while the single-precision step stays within a factor of two of
/// the true value. When the orbit passes close to zero the step can be far
/// larger than the result and `delta` cannot carry the missing bits, so the
/// result is off by up to about half an ulp of the step.
#[inline]
pub fn next_reference(point: &OrbitPoint, c: (f32, f32)) -> (f32, f32) {
    let (x, y) = single_step(point.approx(), c);
    (x + point.delta_re, y + point.delta_im)
}

/// Everything an orbit depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitSeed {
    pub center: ComplexDD,
    pub mode: FractalMode,
    pub budget: u32,
}

impl OrbitSeed {
    /// `(z₀, c)` of the reference point.
    fn start(&self) -> (ComplexDD, ComplexDD) {
        match self.mode {
            FractalMode::Mandelbrot => (ComplexDD::ZERO, self.center),
            FractalMode::Julia { c } => (self.center, ComplexDD::from(c)),
        }
    }

    /// The starting value `z₀` as the kernel sees it.
    pub fn z0_f32(&self) -> (f32, f32) {
        self.start().0.to_f32()
    }

    /// The constant `c` as the kernel sees it.
    pub fn c_f32(&self) -> (f32, f32) {
        self.start().1.to_f32()
    }
}

/// What [`ReferenceOrbit::refresh`] did with the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrbitRefresh {
    Reused,
    Truncated,
    Recomputed,
}

/// The full-precision orbit of the view center, reused across ticks.
#[derive(Debug, Clone, Default)]
pub struct ReferenceOrbit {
    points: Vec<OrbitPoint>,
    escaped_at: Option<u32>,
    seed: Option<OrbitSeed>,
}

impl ReferenceOrbit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute an orbit from scratch.
    pub fn compute(seed: OrbitSeed) -> Self {
        let mut orbit = Self::new();
        orbit.recompute(seed);
        orbit
    }

    pub fn points(&self) -> &[OrbitPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Index of the first record whose value already escaped. Records from
    /// there on are zero.
    pub fn escaped_at(&self) -> Option<u32> {
        self.escaped_at
    }

    pub fn seed(&self) -> Option<&OrbitSeed> {
        self.seed.as_ref()
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.points)
    }

    /// Bring the buffer in line with `seed`, doing as little work as possible.
    ///
    /// A smaller budget with the same center and mode keeps the prefix, since
    /// every record depends only on the ones before it.
    pub fn refresh(&mut self, seed: OrbitSeed) -> OrbitRefresh {
        match self.seed {
            Some(current) if current == seed => OrbitRefresh::Reused,
            Some(current)
                if current.center == seed.center
                    && current.mode == seed.mode
                    && seed.budget < current.budget =>
            {
                self.points.truncate(seed.budget as usize);
                self.escaped_at = self.escaped_at.filter(|&i| i < seed.budget);
                self.seed = Some(seed);
                OrbitRefresh::Truncated
            }
            _ => {
                self.recompute(seed);
                OrbitRefresh::Recomputed
            }
        }
    }

    fn recompute(&mut self, seed: OrbitSeed) {
        let start = Instant::now();
        let budget = seed.budget as usize;
        let (mut z, c) = seed.start();
        let c32 = c.to_f32();

        self.points.clear();
        self.points.reserve(budget);
        self.escaped_at = None;

        for i in 0..budget {
            if z.norm_sq().hi > ESCAPE_RADIUS_SQ {
                self.escaped_at = Some(i as u32);
                break;
            }
            let next = z.square() + c;
            let approx = z.to_f32();
            let (next_re, next_im) = next.to_f32();
            let (step_re, step_im) = single_step(approx, c32);
            self.points.push(OrbitPoint {
                approx_re: approx.0,
                approx_im: approx.1,
                delta_re: next_re - step_re,
                delta_im: next_im - step_im,
            });
            z = next;
        }
        self.points.resize(budget, OrbitPoint::zeroed());
        self.seed = Some(seed);

        debug!(
            budget,
            escaped_at = ?self.escaped_at,
            elapsed_us = start.elapsed().as_micros() as u64,
            "Reference orbit recomputed"
        );
    }
}
