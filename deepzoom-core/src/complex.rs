use std::fmt;

/// Componentwise `+`, `-`, unary `-` and `* f64` for a `{ re, im }` pair
/// with a `new(re, im)` constructor.
macro_rules! componentwise_ops {
    ($ty:ty) => {
        impl std::ops::Add for $ty {
            type Output = Self;

            #[inline]
            fn add(self, rhs: Self) -> Self {
                Self::new(self.re + rhs.re, self.im + rhs.im)
            }
        }

        impl std::ops::Sub for $ty {
            type Output = Self;

            #[inline]
            fn sub(self, rhs: Self) -> Self {
                Self::new(self.re - rhs.re, self.im - rhs.im)
            }
        }

        impl std::ops::Neg for $ty {
            type Output = Self;

            #[inline]
            fn neg(self) -> Self {
                Self::new(-self.re, -self.im)
            }
        }

        impl std::ops::Mul<f64> for $ty {
            type Output = Self;

            #[inline]
            fn mul(self, k: f64) -> Self {
                Self::new(self.re * k, self.im * k)
            }
        }
    };
}
pub(crate) use componentwise_ops;

/// Complex number in plain `f64`.
///
/// Julia constants are stored this way, and the float tier iterates in it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

componentwise_ops!(Complex);

impl Complex {
    pub const ZERO: Self = Self { re: 0.0, im: 0.0 };

    #[inline]
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    #[inline]
    pub fn norm_sq(self) -> f64 {
        self.re.mul_add(self.re, self.im * self.im)
    }

    #[inline]
    pub fn square(self) -> Self {
        let Self { re: x, im: y } = self;
        Self::new((x + y) * (x - y), 2.0 * x * y)
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.im.is_sign_negative() { '-' } else { '+' };
        write!(f, "{} {sign} {}i", self.re, self.im.abs())
    }
}
