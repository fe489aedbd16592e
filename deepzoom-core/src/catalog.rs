use rand::Rng;

use crate::complex::Complex;
use crate::complex_dd::ComplexDD;
use crate::double_double::DoubleDouble;
use crate::error::CoreError;

/// A compiled-in zoom destination, kept as decimal text so the digits past
/// the 17th survive until [`DoubleDouble::from_decimal_str`] splits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetEntry {
    pub center_x: &'static str,
    pub center_y: &'static str,
    pub min_scale: &'static str,
    pub label: &'static str,
}

impl TargetEntry {
    pub const fn new(
        center_x: &'static str,
        center_y: &'static str,
        min_scale: &'static str,
        label: &'static str,
    ) -> Self {
        Self {
            center_x,
            center_y,
            min_scale,
            label,
        }
    }
}

/// Curated Mandelbrot locations.
///
/// The shallow entries stop at `1e-5` and are reached with plain floats or
/// double-double; the deep entries carry enough digits to stay sharp down to
/// their `min_scale` on the perturbation tier.
pub const MANDELBROT_TARGETS: &[TargetEntry] = &[
    // Classic spirals
    TargetEntry::new("-0.74529", "0.113075", "1e-5", "Seahorse Valley"),
    TargetEntry::new("-1.25066", "0.02012", "1e-5", "Elephant Valley"),
    TargetEntry::new("0.360240443437614", "-0.641313061064803", "1e-5", "Triple Spiral"),
    // Mini-Mandelbrots
    TargetEntry::new("-1.401155", "0", "1e-5", "Western Mini"),
    TargetEntry::new("-0.761574", "-0.0847596", "1e-5", "Mini at Period-3"),
    // Seahorse details
    TargetEntry::new("-0.745289", "0.113075", "1e-5", "Seahorse Detail"),
    TargetEntry::new("-0.75", "0.1", "1e-5", "Classic Seahorse"),
    TargetEntry::new("-0.235125", "0.827215", "1e-5", "Julia Spiral"),
    // Deep zooms
    TargetEntry::new(
        "-0.743643887037158704752191506114774",
        "0.131825904205311970493132056385139",
        "1e-22",
        "Seahorse Abyss",
    ),
    TargetEntry::new(
        "0.360240443437614363236125244449545",
        "-0.641313061064803174860375015179302",
        "1e-20",
        "Triple Spiral Deep",
    ),
    TargetEntry::new(
        "-1.985540371654130485531439267191269",
        "0",
        "1e-18",
        "Needle Mini",
    ),
    TargetEntry::new("0", "1", "1e-13", "Misiurewicz i"),
    TargetEntry::new("-1.40115518909205060052382", "0", "1e-16", "Feigenbaum Point"),
];

/// A Julia constant with a display name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JuliaPreset {
    pub c: Complex,
    pub name: &'static str,
}

impl JuliaPreset {
    const fn new(re: f64, im: f64, name: &'static str) -> Self {
        Self {
            c: Complex { re, im },
            name,
        }
    }
}

/// Julia constants that produce visually striking sets.
pub const JULIA_PRESETS: &[JuliaPreset] = &[
    JuliaPreset::new(-0.7, 0.27015, "Classic Spiral"),
    JuliaPreset::new(-0.4, 0.6, "Dendrite"),
    JuliaPreset::new(0.285, 0.01, "Snail Shell"),
    JuliaPreset::new(-0.8, 0.156, "Rabbit"),
    JuliaPreset::new(-0.70176, -0.3842, "Dragon"),
    JuliaPreset::new(0.285, 0.535, "Galaxy"),
    JuliaPreset::new(-0.835, -0.2321, "Lightning"),
    JuliaPreset::new(-0.1, 0.651, "Seahorse Tail"),
    JuliaPreset::new(-0.74543, 0.11301, "Seahorse Julia"),
    JuliaPreset::new(0.0, -0.8, "San Marco"),
    JuliaPreset::new(-1.476, 0.0, "Cauliflower"),
    JuliaPreset::new(-0.12, -0.77, "Starfish"),
    JuliaPreset::new(0.28, 0.008, "Siegel Disk"),
    JuliaPreset::new(-0.194, 0.6557, "Pinwheel"),
    JuliaPreset::new(-0.12, 0.74, "Spiral Galaxy"),
    JuliaPreset::new(0.3, 0.5, "Feathers"),
];

/// A resolved target: center and threshold in double-double.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub center: ComplexDD,
    /// Fading out begins once the scale drops below twice this value.
    pub min_scale: DoubleDouble,
    pub label: String,
}

impl Target {
    pub fn resolve(entry: &TargetEntry) -> crate::Result<Self> {
        let invalid = |e: CoreError| CoreError::InvalidTarget {
            label: entry.label.to_owned(),
            reason: e.to_string(),
        };

        let center = ComplexDD::from_decimal_strs(entry.center_x, entry.center_y).map_err(invalid)?;
        let min_scale = DoubleDouble::from_decimal_str(entry.min_scale).map_err(invalid)?;
        if !min_scale.is_positive() {
            return Err(CoreError::InvalidTarget {
                label: entry.label.to_owned(),
                reason: format!("min_scale must be positive, got {}", entry.min_scale),
            });
        }

        Ok(Self {
            center,
            min_scale,
            label: entry.label.to_owned(),
        })
    }
}

/// The fixed list of targets the animator cycles through.
#[derive(Debug, Clone)]
pub struct TargetCatalog {
    targets: Vec<Target>,
}

impl TargetCatalog {
    /// Resolve the compiled-in Mandelbrot targets.
    ///
    /// Fails on the first malformed entry rather than degrading to `f64`.
    pub fn builtin() -> crate::Result<Self> {
        Self::from_entries(MANDELBROT_TARGETS)
    }

    pub fn from_entries(entries: &[TargetEntry]) -> crate::Result<Self> {
        if entries.is_empty() {
            return Err(CoreError::EmptyCatalog);
        }
        let targets = entries
            .iter()
            .map(Target::resolve)
            .collect::<crate::Result<Vec<_>>>()?;
        Ok(Self { targets })
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Target> {
        self.targets.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter()
    }

    /// Pick the next target index uniformly at random, never returning
    /// `current` when there is anything else to choose.
    ///
    /// Draws from `len - 1` slots and skips over `current`, so a single draw
    /// is always enough.
    pub fn pick_next<R: Rng + ?Sized>(&self, current: Option<usize>, rng: &mut R) -> usize {
        let len = self.targets.len();
        match current {
            Some(current) if len > 1 && current < len => {
                let index = rng.random_range(0..len - 1);
                if index >= current {
                    index + 1
                } else {
                    index
                }
            }
            _ => rng.random_range(0..len),
        }
    }
}
