use bytemuck::{Pod, Zeroable};

use crate::animator::AnimationState;
use crate::camera::CameraState;
use crate::color_cycle::ColorCycle;
use crate::error::EvaluatorError;
use crate::mode::FractalMode;
use crate::precision::TierSelection;
use crate::reference_orbit::ReferenceOrbit;

/// Sentinel for "the reference orbit did not escape".
pub const NO_ESCAPE: u32 = u32::MAX;

/// Per-frame parameter block, laid out for a uniform buffer.
///
/// Coordinates are split into f32 head/tail pairs so a single-precision
/// kernel can still address double-double positions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct FrameUniforms {
    pub center_re_hi: f32,
    pub center_re_lo: f32,
    pub center_im_hi: f32,
    pub center_im_lo: f32,
    pub scale_hi: f32,
    pub scale_lo: f32,
    pub opacity: f32,
    pub julia_re: f32,
    pub julia_im: f32,
    pub color_offset: f32,
    pub palette_mix: f32,
    pub time: f32,
    pub tier: u32,
    pub max_iterations: u32,
    pub julia_active: u32,
    pub palette_index: u32,
    pub shading_mode: u32,
    pub antialiasing: u32,
    pub orbit_len: u32,
    /// [`NO_ESCAPE`] when the orbit stayed bounded.
    pub orbit_escaped_at: u32,
}

/// Inputs for [`FrameUniforms::pack`].
#[derive(Debug, Clone, Copy)]
pub struct UniformSources<'a> {
    pub camera: &'a CameraState,
    pub state: &'a AnimationState,
    pub colors: &'a ColorCycle,
    pub selection: &'a TierSelection,
    pub shading_mode: u32,
    pub antialiasing: bool,
    pub orbit: Option<&'a ReferenceOrbit>,
}

impl FrameUniforms {
    pub fn pack(src: UniformSources<'_>) -> Self {
        let ((center_re_hi, center_re_lo), (center_im_hi, center_im_lo)) =
            src.camera.center_f32_pairs();
        let (scale_hi, scale_lo) = src.camera.scale_f32_pair();
        let (orbit_len, orbit_escaped_at) = match src.orbit {
            Some(orbit) => (
                orbit.len() as u32,
                orbit.escaped_at().unwrap_or(NO_ESCAPE),
            ),
            None => (0, NO_ESCAPE),
        };

        Self {
            center_re_hi,
            center_re_lo,
            center_im_hi,
            center_im_lo,
            scale_hi,
            scale_lo,
            opacity: src.state.opacity,
            julia_re: src.state.julia_constant.re as f32,
            julia_im: src.state.julia_constant.im as f32,
            color_offset: src.colors.color_offset,
            palette_mix: src.colors.palette_mix,
            time: src.colors.time,
            tier: src.selection.tier.as_u32(),
            max_iterations: src.selection.max_iterations,
            julia_active: src.state.julia_active as u32,
            palette_index: src.colors.palette_index,
            shading_mode: src.shading_mode,
            antialiasing: src.antialiasing as u32,
            orbit_len,
            orbit_escaped_at,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Everything an evaluator needs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub uniforms: FrameUniforms,
    pub selection: TierSelection,
    pub camera: &'a CameraState,
    pub mode: FractalMode,
    /// Present exactly when the perturbation tier is selected.
    pub orbit: Option<&'a ReferenceOrbit>,
}

/// A data-parallel backend that turns a prepared frame into pixels.
///
/// Errors skip the dispatch for that tick only.
pub trait FrameEvaluator {
    type Output;

    fn prepare_frame(&mut self, frame: &Frame<'_>) -> Result<Self::Output, EvaluatorError>;
}

/// Evaluator type for engines that never dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoEvaluator {}

impl FrameEvaluator for NoEvaluator {
    type Output = ();

    fn prepare_frame(&mut self, _frame: &Frame<'_>) -> Result<(), EvaluatorError> {
        match *self {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::TransitionPhase;
    use crate::complex::Complex;
    use crate::complex_dd::ComplexDD;
    use crate::double_double::DoubleDouble;
    use crate::precision::{PrecisionTier, TierSelector};
    use crate::reference_orbit::OrbitSeed;

    #[test]
    fn uniform_block_is_eighty_bytes() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 80);
        assert_eq!(FrameUniforms::default().as_bytes().len(), 80);
    }

    #[test]
    fn pack_carries_every_field() {
        let camera = CameraState {
            center: ComplexDD::from_decimal_strs(
                "-0.743643887037158704752191506114774",
                "0.131825904205311970493132056385139",
            )
            .unwrap(),
            scale: DoubleDouble::from(1e-12),
        };
        let state = AnimationState {
            phase: TransitionPhase::Zooming,
            opacity: 0.5,
            julia_active: true,
            julia_constant: Complex::new(-0.8, 0.156),
            current_target_index: 2,
            tick_count: 10,
        };
        let colors = ColorCycle::new(4, true);
        let selection = TierSelector::default().select(camera.scale);
        assert_eq!(selection.tier, PrecisionTier::Perturbation);
        let orbit = ReferenceOrbit::compute(OrbitSeed {
            center: camera.center,
            mode: FractalMode::Mandelbrot,
            budget: 100,
        });

        let u = FrameUniforms::pack(UniformSources {
            camera: &camera,
            state: &state,
            colors: &colors,
            selection: &selection,
            shading_mode: 2,
            antialiasing: true,
            orbit: Some(&orbit),
        });

        assert_eq!(u.tier, 2);
        assert_eq!(u.max_iterations, selection.max_iterations);
        assert_eq!(u.opacity, 0.5);
        assert_eq!(u.julia_active, 1);
        assert_eq!(u.julia_re, -0.8f32);
        assert_eq!(u.palette_index, 4);
        assert_eq!(u.shading_mode, 2);
        assert_eq!(u.antialiasing, 1);
        assert_eq!(u.orbit_len, 100);
        assert_eq!(
            u.orbit_escaped_at,
            orbit.escaped_at().unwrap_or(NO_ESCAPE)
        );
        assert_eq!(u.center_re_hi, camera.center.re.hi as f32);
        assert_ne!(u.center_re_lo, 0.0);
        assert_eq!(u.scale_hi, 1e-12f32);
    }
}
