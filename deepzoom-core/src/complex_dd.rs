use std::fmt;

use crate::complex::{componentwise_ops, Complex};
use crate::double_double::DoubleDouble;

/// Complex number with double-double axes.
///
/// Carries the view center and the reference orbit. There is no general
/// complex product: the orbit only ever needs `z² + c`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComplexDD {
    pub re: DoubleDouble,
    pub im: DoubleDouble,
}

componentwise_ops!(ComplexDD);

impl ComplexDD {
    pub const ZERO: Self = Self {
        re: DoubleDouble::ZERO,
        im: DoubleDouble::ZERO,
    };

    #[inline]
    pub fn new(re: DoubleDouble, im: DoubleDouble) -> Self {
        Self { re, im }
    }

    pub fn from_decimal_strs(re: &str, im: &str) -> crate::Result<Self> {
        Ok(Self::new(
            DoubleDouble::from_decimal_str(re)?,
            DoubleDouble::from_decimal_str(im)?,
        ))
    }

    #[inline]
    pub fn square(self) -> Self {
        let Self { re: x, im: y } = self;
        Self::new(x * x - y * y, (x * y) * 2.0)
    }

    #[inline]
    pub fn norm_sq(self) -> DoubleDouble {
        self.re * self.re + self.im * self.im
    }

    #[inline]
    pub fn to_complex(self) -> Complex {
        Complex::new(self.re.to_f64(), self.im.to_f64())
    }

    /// The `hi` parts rounded to `f32`, the way a pixel kernel sees the value.
    #[inline]
    pub fn to_f32(self) -> (f32, f32) {
        (self.re.hi as f32, self.im.hi as f32)
    }
}

impl From<Complex> for ComplexDD {
    #[inline]
    fn from(c: Complex) -> Self {
        Self::new(c.re.into(), c.im.into())
    }
}

impl fmt::Display for ComplexDD {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.re, self.im)
    }
}
