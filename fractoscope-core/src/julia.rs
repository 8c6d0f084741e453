use crate::complex::Complex;
use crate::fractal::{escape_time, Fractal};

/// A Julia set: `z_{n+1} = z_n² + c`, where `c` is a fixed constant
/// and `z₀` is the point on the complex plane.
#[derive(Debug, Clone, Copy)]
pub struct Julia {
    c: Complex,
    max_iterations: u32,
}

impl Julia {
    pub fn new(c: Complex, max_iterations: u32) -> Self {
        Self { c, max_iterations }
    }
}

impl Fractal for Julia {
    #[inline]
    fn iterate(&self, z0: Complex) -> u32 {
        escape_time(z0, self.c, self.max_iterations)
    }

    fn max_iterations(&self) -> u32 {
        self.max_iterations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Straightforward `z = z * z + c` loop used as an independent oracle.
    fn reference_count(mut z: Complex, c: Complex, max: u32) -> u32 {
        let mut n = 0;
        while n < max && z.norm_sq() < 4.0 {
            z = z * z + c;
            n += 1;
        }
        n
    }

    #[test]
    fn origin_matches_recurrence() {
        let c = Complex::new(-0.4, 0.6);
        let julia = Julia::new(c, 250);
        let n = julia.iterate(Complex::ZERO);
        assert_eq!(n, reference_count(Complex::ZERO, c, 250));
        assert_eq!(n, 26);
    }

    #[test]
    fn c_zero_origin_is_fixed_point() {
        let j = Julia::new(Complex::ZERO, 500);
        assert_eq!(j.iterate(Complex::ZERO), 500);
    }

    #[test]
    fn far_point_escapes_immediately() {
        let j = Julia::new(Complex::new(-0.4, 0.6), 500);
        assert_eq!(j.iterate(Complex::new(10.0, 0.0)), 0);
    }

    #[test]
    fn agrees_with_oracle_on_a_line() {
        let c = Complex::new(-0.7, 0.27015);
        let j = Julia::new(c, 300);
        for i in 0..40 {
            let z0 = Complex::new(-1.5 + i as f64 * 0.075, 0.1);
            assert_eq!(j.iterate(z0), reference_count(z0, c, 300));
        }
    }
}
