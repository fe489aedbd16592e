//! Per-point escape-time kernels, one per precision tier.
//!
//! All kernels count iterations the same way: the result is the first `n`
//! with `|z_n|² > 4`, where `z_0` is the starting value. A point that stays
//! bounded for `max_iter` values is interior.

use deepzoom_core::reference_orbit::{next_reference, single_step, ESCAPE_RADIUS_SQ};
use deepzoom_core::{Complex, ComplexDD, DoubleDouble, OrbitPoint, ReferenceOrbit};

/// The result of iterating a single point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IterationResult {
    /// `|z_n|²` first exceeded the escape radius at `iterations = n`.
    Escaped { iterations: u32, norm_sq: f64 },

    /// Did not escape within the budget, or was detected as periodic.
    Interior,
}

impl IterationResult {
    /// Integer classification; equal classes mean equal iteration counts.
    #[inline]
    pub fn class(&self) -> u64 {
        match self {
            Self::Escaped { iterations, .. } => *iterations as u64,
            Self::Interior => u64::MAX,
        }
    }
}

/// Returns `true` if `c` lies inside the main cardioid.
#[inline]
pub fn in_cardioid(re: f64, im: f64) -> bool {
    let im2 = im * im;
    let q = (re - 0.25) * (re - 0.25) + im2;
    q * (q + (re - 0.25)) <= 0.25 * im2
}

/// Returns `true` if `c` lies inside the period-2 bulb.
#[inline]
pub fn in_period2_bulb(re: f64, im: f64) -> bool {
    (re + 1.0) * (re + 1.0) + im * im <= 0.0625
}

const F64_PERIOD_TOLERANCE: f64 = 1e-13;
const DD_PERIOD_TOLERANCE: f64 = 1e-28;

/// Brent's cycle detection, checked every 4th iteration after the first 32.
struct PeriodCheck<T> {
    old: T,
    period: u32,
    check: u32,
}

impl<T: Copy> PeriodCheck<T> {
    fn new(start: T) -> Self {
        Self {
            old: start,
            period: 0,
            check: 3,
        }
    }

    #[inline]
    fn is_periodic(&mut self, n: u32, z: T, close: impl Fn(T, T) -> bool) -> bool {
        if n < 32 || n & 3 != 0 {
            return false;
        }
        if close(z, self.old) {
            return true;
        }
        self.period += 1;
        if self.period > self.check {
            self.old = z;
            self.period = 0;
            self.check = self.check.saturating_mul(2);
        }
        false
    }
}

// ---------------------------------------------------------------------------
// Float tier
// ---------------------------------------------------------------------------

/// Plain `f64` iteration of `z ← z² + c` from `z0`.
pub fn iterate_f64(z0: Complex, c: Complex, max_iter: u32) -> IterationResult {
    let mut z = z0;
    let mut cycle = PeriodCheck::new(z);

    for n in 0..max_iter {
        let norm_sq = z.norm_sq();
        if norm_sq > ESCAPE_RADIUS_SQ {
            return IterationResult::Escaped {
                iterations: n,
                norm_sq,
            };
        }
        z = z.square() + c;
        if cycle.is_periodic(n, z, |a, b| {
            (a.re - b.re).abs() < F64_PERIOD_TOLERANCE && (a.im - b.im).abs() < F64_PERIOD_TOLERANCE
        }) {
            return IterationResult::Interior;
        }
    }

    IterationResult::Interior
}

/// Mandelbrot in `f64`, skipping the cardioid and period-2 bulb.
pub fn mandelbrot_f64(c: Complex, max_iter: u32) -> IterationResult {
    if in_cardioid(c.re, c.im) || in_period2_bulb(c.re, c.im) {
        return IterationResult::Interior;
    }
    iterate_f64(Complex::ZERO, c, max_iter)
}

// ---------------------------------------------------------------------------
// Extended tier
// ---------------------------------------------------------------------------

/// Double-double iteration of `z ← z² + c` from `z0`.
pub fn iterate_dd(z0: ComplexDD, c: ComplexDD, max_iter: u32) -> IterationResult {
    let escape_radius_sq = DoubleDouble::from(ESCAPE_RADIUS_SQ);
    let mut z = z0;
    let mut cycle = PeriodCheck::new(z);

    for n in 0..max_iter {
        let norm_sq = z.norm_sq();
        if norm_sq > escape_radius_sq {
            return IterationResult::Escaped {
                iterations: n,
                norm_sq: norm_sq.to_f64(),
            };
        }
        z = z.square() + c;
        if cycle.is_periodic(n, z, |a, b| {
            (a.re - b.re).abs().hi < DD_PERIOD_TOLERANCE
                && (a.im - b.im).abs().hi < DD_PERIOD_TOLERANCE
        }) {
            return IterationResult::Interior;
        }
    }

    IterationResult::Interior
}

/// Mandelbrot in double-double, with the same interior shortcuts as `f64`.
pub fn mandelbrot_dd(c: ComplexDD, max_iter: u32) -> IterationResult {
    let c64 = c.to_complex();
    if in_cardioid(c64.re, c64.im) || in_period2_bulb(c64.re, c64.im) {
        return IterationResult::Interior;
    }
    iterate_dd(ComplexDD::ZERO, c, max_iter)
}

// ---------------------------------------------------------------------------
// Perturbation tier
// ---------------------------------------------------------------------------

/// The parts of a [`ReferenceOrbit`] the per-pixel kernel reads.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceView<'a> {
    pub points: &'a [OrbitPoint],
    pub escaped_at: Option<u32>,
    /// Reference start `Z_0`. Kept separately because an orbit that escapes
    /// at once has no record for it.
    pub z0: (f32, f32),
    pub c: (f32, f32),
}

impl<'a> ReferenceView<'a> {
    /// `None` for an orbit that was never computed.
    pub fn new(orbit: &'a ReferenceOrbit) -> Option<Self> {
        let seed = orbit.seed()?;
        Some(Self {
            points: orbit.points(),
            escaped_at: orbit.escaped_at(),
            z0: seed.z0_f32(),
            c: seed.c_f32(),
        })
    }

    /// Number of records that can be followed.
    #[inline]
    fn usable_len(&self) -> usize {
        self.escaped_at
            .map_or(self.points.len(), |e| e as usize)
            .min(self.points.len())
    }
}

/// One pixel's starting offsets from the reference orbit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelDelta {
    /// Offset added to `c` every step (zero for Julia).
    pub dc: (f32, f32),
    /// Offset of `z_0` from the reference start (zero for Mandelbrot).
    pub eps0: (f32, f32),
}

/// Perturbation iteration against a recorded reference orbit.
///
/// The pixel value is `Z_m + ε` where `Z_m` is reconstructed from the orbit
/// records and `ε ← (2·Z_m + ε)·ε + δc`. The pixel rebases onto the start of
/// the orbit when `|Z_m + ε| < |ε|` or when the reference runs out (its own
/// escape index), so no record at or past `escaped_at` is ever read.
pub fn iterate_perturbation(
    reference: &ReferenceView<'_>,
    delta: PixelDelta,
    max_iter: u32,
) -> IterationResult {
    let limit = reference.usable_len();
    let z_start = reference.z0;
    let c_ref = reference.c;
    let (dcr, dci) = delta.dc;

    let mut m = 0usize;
    let mut z_ref = z_start;
    let mut eps = delta.eps0;

    for n in 0..max_iter {
        let w = (z_ref.0 + eps.0, z_ref.1 + eps.1);
        let norm_sq = w.0 * w.0 + w.1 * w.1;
        if norm_sq > ESCAPE_RADIUS_SQ as f32 {
            return IterationResult::Escaped {
                iterations: n,
                norm_sq: norm_sq as f64,
            };
        }

        let eps_sq = eps.0 * eps.0 + eps.1 * eps.1;
        if norm_sq < eps_sq || m >= limit {
            if limit == 0 {
                // The reference escaped immediately; nothing to follow.
                return iterate_f32(w, (c_ref.0 + dcr, c_ref.1 + dci), n, max_iter);
            }
            eps = (w.0 - z_start.0, w.1 - z_start.1);
            m = 0;
            z_ref = z_start;
        }

        let (zr, zi) = z_ref;
        let (er, ei) = eps;
        let ar = 2.0 * zr + er;
        let ai = 2.0 * zi + ei;
        eps = (ar * er - ai * ei + dcr, ar * ei + ai * er + dci);
        z_ref = next_reference(&reference.points[m], c_ref);
        m += 1;
    }

    IterationResult::Interior
}

/// Single-precision iteration continuing from step `start`.
fn iterate_f32(z0: (f32, f32), c: (f32, f32), start: u32, max_iter: u32) -> IterationResult {
    let mut z = z0;
    for n in start..max_iter {
        let norm_sq = z.0 * z.0 + z.1 * z.1;
        if norm_sq > ESCAPE_RADIUS_SQ as f32 {
            return IterationResult::Escaped {
                iterations: n,
                norm_sq: norm_sq as f64,
            };
        }
        z = single_step(z, c);
    }
    IterationResult::Interior
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepzoom_core::{FractalMode, OrbitSeed};

    const JULIA_C: Complex = Complex { re: -0.4, im: 0.35 };

    fn escaped_at(result: IterationResult) -> u32 {
        match result {
            IterationResult::Escaped { iterations, .. } => iterations,
            IterationResult::Interior => panic!("expected escape, got interior"),
        }
    }

    fn orbit(center: Complex, mode: FractalMode, budget: u32) -> ReferenceOrbit {
        ReferenceOrbit::compute(OrbitSeed {
            center: ComplexDD::from(center),
            mode,
            budget,
        })
    }

    fn perturb(orbit: &ReferenceOrbit, dc: (f32, f32), eps0: (f32, f32), max_iter: u32) -> IterationResult {
        let view = ReferenceView::new(orbit).unwrap();
        iterate_perturbation(&view, PixelDelta { dc, eps0 }, max_iter)
    }

    #[test]
    fn origin_and_bulbs_are_interior() {
        assert_eq!(mandelbrot_f64(Complex::ZERO, 256), IterationResult::Interior);
        assert_eq!(
            mandelbrot_f64(Complex::new(-1.0, 0.0), 256),
            IterationResult::Interior
        );
        assert_eq!(
            mandelbrot_dd(ComplexDD::ZERO, 256),
            IterationResult::Interior
        );
    }

    #[test]
    fn far_point_escapes_at_zero() {
        assert_eq!(escaped_at(iterate_f64(Complex::new(3.0, 0.0), Complex::ZERO, 10)), 0);
        // z_0 = 0, z_1 = c = 10
        assert_eq!(escaped_at(mandelbrot_f64(Complex::new(10.0, 0.0), 10)), 1);
    }

    #[test]
    fn f64_and_dd_agree_on_counts() {
        for &(re, im) in &[(0.5, 0.5), (-0.75, 0.1), (0.3, 0.5), (-2.1, 0.0), (0.26, 0.0)] {
            let c = Complex::new(re, im);
            let a = mandelbrot_f64(c, 500);
            let b = mandelbrot_dd(ComplexDD::from(c), 500);
            assert_eq!(a.class(), b.class(), "c = {c}");
        }
    }

    #[test]
    fn periodic_orbit_stops_early_as_interior() {
        // Inside the cardioid, but the generic kernel has no shortcut.
        assert_eq!(
            iterate_f64(Complex::ZERO, Complex::new(-0.1, 0.1), 1_000_000),
            IterationResult::Interior
        );
    }

    #[test]
    fn julia_dd_matches_f64() {
        for &(re, im) in &[(0.0, 0.0), (0.5, 0.5), (2.0, 1.0), (-1.5, -1.5)] {
            let z = Complex::new(re, im);
            let a = iterate_f64(z, JULIA_C, 300);
            let b = iterate_dd(ComplexDD::from(z), ComplexDD::from(JULIA_C), 300);
            assert_eq!(a.class(), b.class(), "z0 = {z}");
        }
        assert_eq!(escaped_at(iterate_f64(Complex::new(0.5, 0.5), JULIA_C, 300)), 5);
    }

    #[test]
    fn perturbation_at_the_reference_follows_the_reference() {
        let orbit = orbit(Complex::new(0.5, 0.5), FractalMode::Mandelbrot, 64);
        assert_eq!(orbit.escaped_at(), Some(5));
        assert_eq!(escaped_at(perturb(&orbit, (0.0, 0.0), (0.0, 0.0), 64)), 5);
    }

    #[test]
    fn perturbation_matches_direct_near_a_bounded_reference() {
        let center = Complex::new(-0.4, 0.35);
        let orbit = orbit(center, FractalMode::Mandelbrot, 400);
        assert_eq!(orbit.escaped_at(), None);

        // Offsets large enough to leave the set: the pixel has to rebase
        // and escape on its own.
        for &(dx, dy) in &[(0.9, 0.4), (-1.5, -0.4), (1.0, 0.0)] {
            let direct = mandelbrot_f64(Complex::new(center.re + dx, center.im + dy), 400);
            let perturbed = perturb(&orbit, (dx as f32, dy as f32), (0.0, 0.0), 400);
            assert_eq!(escaped_at(direct), escaped_at(perturbed), "offset ({dx}, {dy})");
        }
    }

    #[test]
    fn perturbation_rebases_past_an_escaped_reference() {
        // The reference escapes at 5; a pixel at c = -0.1 + 0.1i is inside the
        // set and must keep iterating past that index.
        let orbit = orbit(Complex::new(0.5, 0.5), FractalMode::Mandelbrot, 200);
        assert_eq!(
            perturb(&orbit, (-0.6, -0.4), (0.0, 0.0), 200),
            IterationResult::Interior
        );
    }

    #[test]
    fn julia_perturbation_uses_the_starting_offset() {
        let orbit = orbit(Complex::ZERO, FractalMode::Julia { c: JULIA_C }, 300);
        let direct = iterate_f64(Complex::new(0.5, 0.5), JULIA_C, 300);
        let perturbed = perturb(&orbit, (0.0, 0.0), (0.5, 0.5), 300);
        assert_eq!(escaped_at(direct), 5);
        assert_eq!(escaped_at(perturbed), 5);
    }

    #[test]
    fn immediately_escaped_reference_falls_back_to_plain_iteration() {
        let orbit = orbit(Complex::new(3.0, 0.0), FractalMode::Julia { c: JULIA_C }, 50);
        assert_eq!(orbit.escaped_at(), Some(0));
        let view = ReferenceView::new(&orbit).unwrap();
        assert_eq!(view.z0, (3.0, 0.0));

        // Pixel at the origin.
        let result = perturb(&orbit, (0.0, 0.0), (-3.0, 0.0), 50);
        let direct = iterate_f64(Complex::ZERO, JULIA_C, 50);
        assert_eq!(result.class(), direct.class());

        // A pixel near the escaped start escapes at once.
        assert_eq!(escaped_at(perturb(&orbit, (0.0, 0.0), (0.1, 0.0), 50)), 0);
    }

    #[test]
    fn uncomputed_orbit_has_no_view() {
        assert!(ReferenceView::new(&ReferenceOrbit::new()).is_none());
    }
}
