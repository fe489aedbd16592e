use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Palettes the evaluator knows, by index.
pub const PALETTE_NAMES: &[&str] = &[
    "Ultra Fractal",
    "Fire",
    "Ocean",
    "Electric",
    "Sunset",
    "Glacial",
    "P3 Electric (Wide Gamut)",
    "P3 Fire (Wide Gamut)",
    "P3 Ocean (Wide Gamut)",
];

/// Shading modes the evaluator knows, by index.
pub const SHADING_MODE_NAMES: &[&str] = &["Flat", "3D Blinn-Phong", "Angle-based", "Stripe"];

pub const MIN_ZOOM_SPEED: f64 = 0.98;
pub const MAX_ZOOM_SPEED: f64 = 0.995;

// ---------------------------------------------------------------------------
// User-facing configuration
// ---------------------------------------------------------------------------

/// Settings a user can change while the engine runs.
///
/// Every field has a serde default so a partial or older JSON file still
/// loads. Call [`sanitized`](Self::sanitized) before handing it to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Per-tick scale factor; 0.98 is fast, 0.995 slow.
    #[serde(default = "default_zoom_speed")]
    pub zoom_speed: f64,
    #[serde(default)]
    pub palette_index: u32,
    #[serde(default = "default_true")]
    pub auto_cycle_palettes: bool,
    /// 0 = flat, 1 = Blinn-Phong, 2 = angle-based, 3 = stripe.
    #[serde(default)]
    pub shading_mode: u32,
    #[serde(default)]
    pub julia_enabled: bool,
    #[serde(default = "default_true")]
    pub antialiasing: bool,
}

fn default_zoom_speed() -> f64 {
    0.990
}
fn default_true() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            zoom_speed: default_zoom_speed(),
            palette_index: 0,
            auto_cycle_palettes: true,
            shading_mode: 0,
            julia_enabled: false,
            antialiasing: true,
        }
    }
}

impl EngineConfig {
    /// Clamp every field into its valid range.
    pub fn sanitized(&self) -> Self {
        let zoom_speed = if self.zoom_speed.is_nan() {
            default_zoom_speed()
        } else {
            self.zoom_speed.clamp(MIN_ZOOM_SPEED, MAX_ZOOM_SPEED)
        };
        Self {
            zoom_speed,
            palette_index: self.palette_index.min(PALETTE_NAMES.len() as u32 - 1),
            shading_mode: self.shading_mode.min(SHADING_MODE_NAMES.len() as u32 - 1),
            ..self.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// Animator tuning
// ---------------------------------------------------------------------------

/// Bounds on how long a single zoom may take.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchdogSettings {
    /// Zooming ticks before a fade is forced.
    pub max_zoom_ticks: u64,
    /// A frame slower than this counts toward `slow_frame_limit`.
    pub slow_frame: Duration,
    /// Consecutive slow frames before a fade is forced.
    pub slow_frame_limit: u32,
}

impl Default for WatchdogSettings {
    fn default() -> Self {
        Self {
            max_zoom_ticks: 36_000,
            slow_frame: Duration::from_millis(100),
            slow_frame_limit: 120,
        }
    }
}

/// Constants of the zoom animation that are not user-facing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimatorSettings {
    /// Fraction of the remaining distance to the target covered per tick.
    pub pan_speed: f64,
    /// Opacity change per fading tick.
    pub fade_step: f32,
    pub wide_scale: f64,
    pub julia_min_scale: f64,
    pub watchdog: WatchdogSettings,
}

impl Default for AnimatorSettings {
    fn default() -> Self {
        Self {
            pan_speed: 0.015,
            fade_step: 0.02,
            wide_scale: 3.0,
            julia_min_scale: 3e-5,
            watchdog: WatchdogSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let cfg: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.zoom_speed, 0.990);
        assert!(cfg.auto_cycle_palettes);
        assert!(cfg.antialiasing);
        assert!(!cfg.julia_enabled);
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let cfg: EngineConfig =
            serde_json::from_str(r#"{ "julia_enabled": true, "palette_index": 4 }"#).unwrap();
        assert!(cfg.julia_enabled);
        assert_eq!(cfg.palette_index, 4);
        assert_eq!(cfg.zoom_speed, 0.990);
    }

    #[test]
    fn sanitize_clamps_ranges() {
        let cfg = EngineConfig {
            zoom_speed: 0.5,
            palette_index: 42,
            shading_mode: 9,
            ..EngineConfig::default()
        }
        .sanitized();
        assert_eq!(cfg.zoom_speed, MIN_ZOOM_SPEED);
        assert_eq!(cfg.palette_index, 8);
        assert_eq!(cfg.shading_mode, 3);

        let slow = EngineConfig {
            zoom_speed: 1.2,
            ..EngineConfig::default()
        };
        assert_eq!(slow.sanitized().zoom_speed, MAX_ZOOM_SPEED);
    }

    #[test]
    fn nan_zoom_speed_falls_back_to_default() {
        let cfg = EngineConfig {
            zoom_speed: f64::NAN,
            ..EngineConfig::default()
        };
        assert_eq!(cfg.sanitized().zoom_speed, 0.990);
    }

    #[test]
    fn json_roundtrip() {
        let cfg = EngineConfig {
            zoom_speed: 0.985,
            palette_index: 2,
            auto_cycle_palettes: false,
            shading_mode: 1,
            julia_enabled: true,
            antialiasing: false,
        };
        let json = serde_json::to_string_pretty(&cfg).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }
}
