use rand::Rng;
use tracing::info;

use crate::catalog::{JuliaPreset, JULIA_PRESETS};
use crate::complex::Complex;
use crate::config::SHADING_MODE_NAMES;

/// Which quadratic family is on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FractalMode {
    /// `z₀ = 0`, `c` = pixel.
    Mandelbrot,
    /// `z₀` = pixel, `c` fixed.
    Julia { c: Complex },
}

impl FractalMode {
    pub fn is_julia(&self) -> bool {
        matches!(self, Self::Julia { .. })
    }

    /// The Julia constant, or zero in Mandelbrot mode.
    pub fn julia_constant(&self) -> Complex {
        match self {
            Self::Mandelbrot => Complex::ZERO,
            Self::Julia { c } => *c,
        }
    }
}

/// Zoom counts between Mandelbrot/Julia toggles.
pub const JULIA_TOGGLE_PERIOD: u64 = 4;
/// Zoom counts between shading rotations.
pub const SHADING_ROTATE_PERIOD: u64 = 3;

/// What happened at one reselection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReselectOutcome {
    pub zoom_count: u64,
    /// Mandelbrot/Julia flipped on the four-zoom cadence.
    pub toggled: bool,
    /// Set when this reselection switched into Julia mode.
    pub entered_julia: Option<JuliaPreset>,
    pub shading_rotated: bool,
}

/// Decides the fractal family and shading mode at each reselection.
///
/// The two cadences share the zoom counter but are otherwise independent.
#[derive(Debug, Clone)]
pub struct JuliaModeController {
    zoom_count: u64,
    julia_enabled: bool,
    mode: FractalMode,
    shading_mode: u32,
}

impl JuliaModeController {
    pub fn new(julia_enabled: bool, shading_mode: u32) -> Self {
        Self {
            zoom_count: 0,
            julia_enabled,
            mode: FractalMode::Mandelbrot,
            shading_mode: shading_mode % SHADING_MODE_NAMES.len() as u32,
        }
    }

    pub fn zoom_count(&self) -> u64 {
        self.zoom_count
    }

    pub fn mode(&self) -> FractalMode {
        self.mode
    }

    pub fn shading_mode(&self) -> u32 {
        self.shading_mode
    }

    pub fn julia_enabled(&self) -> bool {
        self.julia_enabled
    }

    /// Takes effect at the next reselection.
    pub fn set_julia_enabled(&mut self, enabled: bool) {
        self.julia_enabled = enabled;
    }

    pub fn set_shading_mode(&mut self, shading_mode: u32) {
        self.shading_mode = shading_mode % SHADING_MODE_NAMES.len() as u32;
    }

    /// Advance the zoom counter and apply both cadences.
    pub fn on_reselect<R: Rng + ?Sized>(&mut self, rng: &mut R) -> ReselectOutcome {
        self.zoom_count += 1;
        let mut outcome = ReselectOutcome {
            zoom_count: self.zoom_count,
            toggled: false,
            entered_julia: None,
            shading_rotated: false,
        };

        if self.julia_enabled && self.zoom_count % JULIA_TOGGLE_PERIOD == 0 {
            outcome.toggled = true;
            self.mode = match self.mode {
                FractalMode::Julia { .. } => {
                    info!(zoom = self.zoom_count, "Switching to Mandelbrot mode");
                    FractalMode::Mandelbrot
                }
                FractalMode::Mandelbrot => {
                    let preset = JULIA_PRESETS[rng.random_range(0..JULIA_PRESETS.len())];
                    info!(
                        zoom = self.zoom_count,
                        preset = preset.name,
                        c = %preset.c,
                        "Switching to Julia mode"
                    );
                    outcome.entered_julia = Some(preset);
                    FractalMode::Julia { c: preset.c }
                }
            };
        } else if !self.julia_enabled {
            self.mode = FractalMode::Mandelbrot;
        }

        if self.zoom_count % SHADING_ROTATE_PERIOD == 0 {
            self.shading_mode = (self.shading_mode + 1) % SHADING_MODE_NAMES.len() as u32;
            outcome.shading_rotated = true;
        }

        outcome
    }
}
