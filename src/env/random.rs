use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};

/// Source of uniform draws in `[0, 1)`; the helpers derive everything else.
pub trait RandomSource: Send + Sync {
    fn unit(&self) -> f64;

    /// Uniform draw in `[-amplitude, amplitude)`.
    fn symmetric(&self, amplitude: f64) -> f64 {
        (self.unit() * 2.0 - 1.0) * amplitude
    }

    /// Uniform index into a non-empty slice of length `len`.
    fn index(&self, len: usize) -> usize {
        ((self.unit() * len as f64) as usize).min(len.saturating_sub(1))
    }

    /// Uniform integer in `[low, high]`.
    fn between(&self, low: u32, high: u32) -> u32 {
        let span = high.saturating_sub(low) as usize + 1;
        low + self.index(span) as u32
    }
}

pub type SharedRandom = Arc<dyn RandomSource>;

/// Thread-local OS-seeded generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn unit(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Reproducible sequence from a fixed seed.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn unit(&self) -> f64 {
        self.rng.lock().unwrap_or_else(|e| e.into_inner()).gen::<f64>()
    }
}

/// Always returns the same draw. `FixedRandom::midpoint()` makes every jitter zero.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(f64);

impl FixedRandom {
    pub fn new(value: f64) -> Self {
        Self(value.clamp(0.0, 1.0 - f64::EPSILON))
    }

    pub fn midpoint() -> Self {
        Self(0.5)
    }
}

impl RandomSource for FixedRandom {
    fn unit(&self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midpoint_has_no_jitter() {
        assert_eq!(FixedRandom::midpoint().symmetric(0.1), 0.0);
    }

    #[test]
    fn test_index_and_between_stay_in_bounds() {
        let high = FixedRandom::new(1.0);
        assert_eq!(high.index(4), 3);
        assert_eq!(high.between(15, 120), 120);
        assert_eq!(FixedRandom::new(0.0).between(15, 120), 15);
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let a = SeededRandom::new(7);
        let b = SeededRandom::new(7);
        let xs: Vec<f64> = (0..5).map(|_| a.unit()).collect();
        let ys: Vec<f64> = (0..5).map(|_| b.unit()).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|x| (0.0..1.0).contains(x)));
    }
}
