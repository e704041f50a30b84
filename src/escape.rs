//! Escape-time evaluation of the Mandelbrot iteration.
//!
//! CPU mirror of the fragment stage's inner loop in `shader.wgsl`. Both run
//! in `f64`; dropping to single precision produces visible banding once the
//! viewport height shrinks below roughly 1e-5.

use std::ops::Add;

use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Pod, Zeroable, Clone, Copy, Debug, PartialEq)]
pub struct Complex {
    pub real: f64,
    pub imaginary: f64,
}

impl Complex {
    pub const ZERO: Self = Complex {
        real: 0.0,
        imaginary: 0.0,
    };

    pub fn new(real: f64, imaginary: f64) -> Self {
        Self { real, imaginary }
    }

    pub fn norm_squared(self) -> f64 {
        self.real * self.real + self.imaginary * self.imaginary
    }

    /// `z^2 = (x^2 - y^2, 2xy)`
    pub fn squared(self) -> Self {
        Self {
            real: self.real * self.real - self.imaginary * self.imaginary,
            imaginary: 2.0 * self.real * self.imaginary,
        }
    }
}

impl Add for Complex {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            real: self.real + other.real,
            imaginary: self.imaginary + other.imaginary,
        }
    }
}

/// Smallest `i` such that the orbit `z_0 = 0, z_{n+1} = z_n^2 + c` satisfies
/// `|z_i|^2 >= 4`, or `max_iterations` if the orbit stays bounded that long.
///
/// The escape test runs before each update, so the returned count is the
/// iteration at which escape was detected rather than one past it. A point
/// whose orbit escapes exactly on the last permitted iteration returns that
/// index, not `max_iterations`.
pub fn escape_time(c: Complex, max_iterations: u32) -> u32 {
    let mut z = Complex::ZERO;
    for i in 0..max_iterations {
        if z.norm_squared() >= 4.0 {
            return i;
        }
        z = z.squared() + c;
    }
    max_iterations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_never_escapes() {
        for max_iterations in [1, 64, 4096] {
            assert_eq!(escape_time(Complex::ZERO, max_iterations), max_iterations);
        }
    }

    #[test]
    fn far_point_escapes_on_iteration_one() {
        // z_0 = 0 passes the test, z_1 = (3, 0) fails it.
        assert_eq!(escape_time(Complex::new(3.0, 0.0), 10), 1);
    }

    #[test]
    fn boundary_magnitude_counts_as_escaped() {
        // z_1 = (2, 0) has |z|^2 = 4, and the test is >=.
        assert_eq!(escape_time(Complex::new(2.0, 0.0), 10), 1);
    }

    #[test]
    fn zero_iteration_bound_degenerates_to_zero() {
        assert_eq!(escape_time(Complex::new(3.0, 0.0), 0), 0);
        assert_eq!(escape_time(Complex::ZERO, 0), 0);
    }

    #[test]
    fn interior_point_stays_bounded() {
        // c = -1 cycles between 0 and -1.
        assert_eq!(escape_time(Complex::new(-1.0, 0.0), 1000), 1000);
    }

    #[test]
    fn exterior_point_escape_is_deterministic() {
        let c = Complex::new(0.3, 0.6);
        let first = escape_time(c, 512);
        assert!(first < 512);
        assert_eq!(escape_time(c, 512), first);
    }

    #[test]
    fn squared_identity() {
        let z = Complex::new(1.5, -0.5);
        assert_eq!(z.squared(), Complex::new(2.0, -1.5));
    }
}
