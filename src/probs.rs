//! Utilities for working with probabilities.

/// Clips `value` into `[lo, hi]`.
pub fn clip(value: f64, lo: f64, hi: f64) -> f64 {
    f64::min(f64::max(value, lo), hi)
}

/// Clips `value` into the unit interval.
pub fn clip_unit(value: f64) -> f64 {
    clip(value, 0.0, 1.0)
}

pub trait SliceExt {
    fn sum(&self) -> f64;
    fn normalise(&mut self, target: f64) -> f64;
    fn scale(&mut self, factor: f64);
}
impl SliceExt for [f64] {
    fn sum(&self) -> f64 {
        self.iter().sum()
    }

    fn normalise(&mut self, target: f64) -> f64 {
        let sum = self.sum();
        self.scale(target / sum);
        sum
    }

    fn scale(&mut self, factor: f64) {
        for element in self {
            *element *= factor;
        }
    }
}
