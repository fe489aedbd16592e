use crate::double_double::DoubleDouble;

/// Wide-view scale that depth is measured against.
pub const WIDE_SCALE: f64 = 3.0;

/// Evaluation strategy for the per-pixel escape-time loop, ordered by
/// strength: a later variant handles deeper zooms than an earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrecisionTier {
    /// Plain single/double floats per pixel.
    Float,
    /// Double-double per pixel.
    Extended,
    /// Double-double reference orbit with low-precision per-pixel offsets.
    Perturbation,
}

impl PrecisionTier {
    /// Value written into the frame uniforms.
    pub fn as_u32(self) -> u32 {
        match self {
            Self::Float => 0,
            Self::Extended => 1,
            Self::Perturbation => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Extended => "extended",
            Self::Perturbation => "perturbation",
        }
    }
}

impl std::fmt::Display for PrecisionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Iteration budget as a function of zoom depth:
/// `min(cap, base + depth · per_decade)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetCurve {
    pub base: u32,
    pub per_decade: f64,
    pub cap: u32,
}

impl BudgetCurve {
    pub const DIRECT: Self = Self {
        base: 200,
        per_decade: 80.0,
        cap: 5000,
    };

    pub const PERTURBATION: Self = Self {
        base: 500,
        per_decade: 150.0,
        cap: 20000,
    };

    pub fn budget(&self, depth: f64) -> u32 {
        let raw = self.base as f64 + depth.max(0.0) * self.per_decade;
        if raw.is_nan() || raw >= self.cap as f64 {
            self.cap
        } else {
            raw as u32
        }
    }
}

/// What the selector decided for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierSelection {
    pub tier: PrecisionTier,
    pub max_iterations: u32,
    /// Zoom depth in decades below the wide view.
    pub depth: f64,
}

/// Maps the current scale to a tier and iteration budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierSelector {
    /// At or above this scale plain floats are enough.
    pub float_limit: f64,
    /// Below this scale only perturbation keeps pixels apart.
    pub perturbation_limit: f64,
    /// When false the middle band goes straight to perturbation.
    pub extended_enabled: bool,
    pub direct_budget: BudgetCurve,
    pub perturbation_budget: BudgetCurve,
}

impl Default for TierSelector {
    fn default() -> Self {
        Self {
            float_limit: 1e-4,
            perturbation_limit: 1e-10,
            extended_enabled: true,
            direct_budget: BudgetCurve::DIRECT,
            perturbation_budget: BudgetCurve::PERTURBATION,
        }
    }
}

impl TierSelector {
    /// Zoom depth `log10(3 / scale)`, clamped at zero.
    ///
    /// NaN reads as depth 0; a non-positive scale reads as infinitely deep.
    pub fn depth(scale: DoubleDouble) -> f64 {
        let s = scale.hi;
        if s.is_nan() {
            0.0
        } else if s <= 0.0 {
            f64::INFINITY
        } else {
            (WIDE_SCALE / s).log10().max(0.0)
        }
    }

    pub fn select(&self, scale: DoubleDouble) -> TierSelection {
        let s = scale.hi;
        let depth = Self::depth(scale);

        let tier = if s.is_nan() || s >= self.float_limit {
            PrecisionTier::Float
        } else if s < self.perturbation_limit || !self.extended_enabled {
            PrecisionTier::Perturbation
        } else {
            PrecisionTier::Extended
        };

        let curve = match tier {
            PrecisionTier::Perturbation => &self.perturbation_budget,
            _ => &self.direct_budget,
        };

        TierSelection {
            tier,
            max_iterations: curve.budget(depth),
            depth,
        }
    }
}
