use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::error::CoreError;

/// Squared bailout radius. The radius is fixed at 2.
pub const ESCAPE_RADIUS_SQ: f64 = 4.0;

/// Count the completed steps of `z := z² + c` starting from `z0`.
///
/// The bailout test `|z|² < 4` runs before every step, so a starting point
/// already outside the radius reports `0`. The result is always in
/// `0..=max_iterations`; reaching `max_iterations` means "inside the set".
#[inline]
pub fn escape_time(z0: Complex, c: Complex, max_iterations: u32) -> u32 {
    let (mut zx, mut zy) = (z0.re, z0.im);
    let mut iter = 0;
    while zx * zx + zy * zy < ESCAPE_RADIUS_SQ && iter < max_iterations {
        let next_re = zx * zx - zy * zy + c.re;
        zy = 2.0 * zx * zy + c.im;
        zx = next_re;
        iter += 1;
    }
    iter
}

/// Trait implemented by all fractal types.
///
/// Designed for **static dispatch**: renderers are generic over
/// `F: Fractal` so the compiler can inline the hot loop.
pub trait Fractal {
    /// Iteration count for the complex-plane point a pixel maps to.
    fn iterate(&self, point: Complex) -> u32;

    fn max_iterations(&self) -> u32;
}

/// Which escape-time family a view renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FractalVariant {
    #[default]
    Mandelbrot,
    Julia,
}

impl FractalVariant {
    pub fn label(self) -> &'static str {
        match self {
            Self::Mandelbrot => "Mandelbrot",
            Self::Julia => "Julia",
        }
    }
}

impl FromStr for FractalVariant {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mandelbrot" => Ok(Self::Mandelbrot),
            "julia" => Ok(Self::Julia),
            _ => Err(CoreError::UnknownName {
                kind: "fractal variant",
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_bound_never_iterates() {
        assert_eq!(escape_time(Complex::ZERO, Complex::new(0.3, 0.2), 0), 0);
        assert_eq!(escape_time(Complex::new(5.0, 5.0), Complex::ZERO, 0), 0);
    }

    #[test]
    fn known_escape_count() {
        // c = 1: z₁ = 1 (|z|² = 1), z₂ = 2 (|z|² = 4, not < 4) → two steps.
        assert_eq!(escape_time(Complex::ZERO, Complex::new(1.0, 0.0), 250), 2);
    }

    #[test]
    fn start_outside_radius_reports_zero() {
        assert_eq!(escape_time(Complex::new(2.0, 0.0), Complex::ZERO, 100), 0);
        assert_eq!(escape_time(Complex::new(-3.0, 1.0), Complex::ZERO, 100), 0);
    }

    #[test]
    fn single_step_bound() {
        // From z0 = 0 the first test always passes, so one step always completes.
        assert_eq!(escape_time(Complex::ZERO, Complex::new(10.0, 0.0), 1), 1);
        // Julia start outside the radius escapes before any step.
        assert_eq!(escape_time(Complex::new(3.0, 0.0), Complex::new(-0.4, 0.6), 1), 0);
    }

    #[test]
    fn count_never_exceeds_bound() {
        for i in 0..50 {
            let c = Complex::new(-2.0 + i as f64 * 0.06, 0.3);
            let n = escape_time(Complex::ZERO, c, 40);
            assert!(n <= 40);
        }
    }

    #[test]
    fn variant_names() {
        assert_eq!("Julia".parse::<FractalVariant>().unwrap(), FractalVariant::Julia);
        assert_eq!("mandelbrot".parse::<FractalVariant>().unwrap(), FractalVariant::Mandelbrot);
        assert!("burning-ship".parse::<FractalVariant>().is_err());
        assert_eq!(serde_json::to_string(&FractalVariant::Julia).unwrap(), "\"julia\"");
    }
}
