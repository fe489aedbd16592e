use crate::complex::Complex;
use crate::complex_dd::ComplexDD;
use crate::double_double::DoubleDouble;
use crate::mode::FractalMode;

/// Where the view is and how much of the plane it spans.
///
/// `scale` is the width of the visible region in fractal units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub center: ComplexDD,
    pub scale: DoubleDouble,
}

impl CameraState {
    /// The initial view: the whole set for Mandelbrot, the origin for Julia.
    pub fn wide(mode: &FractalMode, scale: f64) -> Self {
        let center = match mode {
            FractalMode::Mandelbrot => ComplexDD::from(Complex::new(-0.5, 0.0)),
            FractalMode::Julia { .. } => ComplexDD::ZERO,
        };
        Self {
            center,
            scale: DoubleDouble::from(scale),
        }
    }

    /// Multiply the scale by `factor` (< 1 zooms in).
    #[inline]
    pub fn zoom(&mut self, factor: f64) {
        self.scale = self.scale * factor;
    }

    /// Move a fixed fraction of the remaining distance toward `target`.
    #[inline]
    pub fn ease_toward(&mut self, target: ComplexDD, fraction: f64) {
        self.center = self.center + (target - self.center) * fraction;
    }

    /// Center as `(head, tail)` f32 pairs per axis.
    pub fn center_f32_pairs(&self) -> ((f32, f32), (f32, f32)) {
        (self.center.re.to_f32_pair(), self.center.im.to_f32_pair())
    }

    pub fn scale_f32_pair(&self) -> (f32, f32) {
        self.scale.to_f32_pair()
    }
}
