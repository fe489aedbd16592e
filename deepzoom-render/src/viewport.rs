use deepzoom_core::{CameraState, ComplexDD, DoubleDouble};

/// Maps pixels of a `width × height` grid onto offsets from the camera center.
///
/// The camera scale spans the grid width; pixels are square, so the visible
/// height is `scale · height / width`. Offsets are sampled at pixel centers
/// and the y-axis points down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelGrid {
    pub width: u32,
    pub height: u32,
    /// Fractal units per pixel.
    pub step: f64,
}

impl PixelGrid {
    pub fn new(camera: &CameraState, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            step: camera.scale.to_f64() / width.max(1) as f64,
        }
    }

    /// Offset of pixel `(px, py)` from the center.
    ///
    /// Fits in `f64` at any depth because it is bounded by the scale.
    #[inline]
    pub fn offset(&self, px: u32, py: u32) -> (f64, f64) {
        let half_w = self.width as f64 / 2.0;
        let half_h = self.height as f64 / 2.0;
        (
            (px as f64 + 0.5 - half_w) * self.step,
            -(py as f64 + 0.5 - half_h) * self.step,
        )
    }

    /// Absolute position of pixel `(px, py)` in double-double.
    #[inline]
    pub fn point_dd(&self, center: ComplexDD, px: u32, py: u32) -> ComplexDD {
        let (dx, dy) = self.offset(px, py);
        center + ComplexDD::new(DoubleDouble::from(dx), DoubleDouble::from(dy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepzoom_core::{Complex, FractalMode};

    const EPSILON: f64 = 1e-12;

    #[test]
    fn offsets_are_symmetric_about_the_center() {
        let camera = CameraState::wide(&FractalMode::Mandelbrot, 4.0);
        let grid = PixelGrid::new(&camera, 4, 2);
        assert!((grid.step - 1.0).abs() < EPSILON);

        let (x0, y0) = grid.offset(0, 0);
        let (x3, y1) = grid.offset(3, 1);
        assert!((x0 + 1.5).abs() < EPSILON && (x3 - 1.5).abs() < EPSILON);
        assert!((y0 - 0.5).abs() < EPSILON && (y1 + 0.5).abs() < EPSILON);
    }

    #[test]
    fn deep_points_keep_the_center_tail() {
        let center = ComplexDD::from_decimal_strs(
            "-0.743643887037158704752191506114774",
            "0.131825904205311970493132056385139",
        )
        .unwrap();
        let camera = CameraState {
            center,
            scale: DoubleDouble::from(1e-20),
        };
        let grid = PixelGrid::new(&camera, 2, 2);
        let p = grid.point_dd(center, 1, 0);
        let d = (p - center).to_complex();
        assert!((d.re - 0.25e-20).abs() < 1e-31);
        assert!((d.im - 0.25e-20).abs() < 1e-31);
        assert_ne!(p.to_complex(), Complex::ZERO);
    }
}
