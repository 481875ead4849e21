//! Random number sources used during palette seeding.

use nanorand::{Rng, WyRand};

/// A source of the two kinds of random values seeding needs.
pub trait RandomSource {
    /// Returns a uniformly distributed value in `0..bound`. `bound` is never zero.
    fn below(&mut self, bound: u32) -> u32;

    /// Returns a uniformly distributed value in `[0, 1)`.
    fn unit(&mut self) -> f64;
}

impl RandomSource for WyRand {
    fn below(&mut self, bound: u32) -> u32 {
        self.generate_range(0..bound)
    }

    fn unit(&mut self) -> f64 {
        // 53 random mantissa bits.
        (self.generate::<u64>() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

impl<R> RandomSource for &mut R
where
    R: RandomSource + ?Sized,
{
    fn below(&mut self, bound: u32) -> u32 {
        (**self).below(bound)
    }

    fn unit(&mut self) -> f64 {
        (**self).unit()
    }
}
