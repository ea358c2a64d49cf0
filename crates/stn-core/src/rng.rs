//! The single stream of pseudo-random decisions driving a run.
//!
//! Every stochastic choice in the model draws from one `RandomStream`, and the
//! order of those draws determines the trajectory. A `SeededStream` with the
//! same seed therefore reproduces the same run exactly.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;
use tracing::debug;

/// Source of uniform draws consumed by the engine
pub trait RandomStream {
    /// Uniform real in `[0, 1)`
    fn next_real(&mut self) -> f64;

    /// Uniform real in `[min, max)`
    fn real_in_range(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.next_real()
    }

    /// Uniform integer in `[min, max]` (inclusive)
    fn int_in_range(&mut self, min: usize, max: usize) -> usize;
}

impl<R: RandomStream + ?Sized> RandomStream for &mut R {
    fn next_real(&mut self) -> f64 {
        (**self).next_real()
    }

    fn real_in_range(&mut self, min: f64, max: f64) -> f64 {
        (**self).real_in_range(min, max)
    }

    fn int_in_range(&mut self, min: usize, max: usize) -> usize {
        (**self).int_in_range(min, max)
    }
}

/// ChaCha-backed stream used for real runs
#[derive(Debug, Clone)]
pub struct SeededStream {
    rng: ChaCha8Rng,
    seed: u64,
}

impl SeededStream {
    pub fn from_seed_u64(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed from OS entropy; the chosen seed is kept so the run can be replayed
    pub fn from_entropy() -> Self {
        let seed = rand::thread_rng().gen::<u64>();
        debug!(seed, "Seeded random stream from entropy");
        Self::from_seed_u64(seed)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomStream for SeededStream {
    #[inline]
    fn next_real(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    #[inline]
    fn real_in_range(&mut self, min: f64, max: f64) -> f64 {
        self.rng.gen_range(min..max)
    }

    #[inline]
    fn int_in_range(&mut self, min: usize, max: usize) -> usize {
        self.rng.gen_range(min..=max)
    }
}

/// Replays a fixed sequence of draws in `[0, 1)`.
///
/// Integer draws map a real `r` onto `min + floor(r * (max - min + 1))`.
/// Once the sequence is used up the fallback value repeats; without a
/// fallback an exhausted stream panics.
#[derive(Debug, Clone, Default)]
pub struct ScriptedStream {
    draws: VecDeque<f64>,
    fallback: Option<f64>,
    consumed: usize,
}

impl ScriptedStream {
    pub fn new(draws: impl IntoIterator<Item = f64>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
            fallback: None,
            consumed: 0,
        }
    }

    /// A stream that returns `value` forever
    pub fn constant(value: f64) -> Self {
        Self::new(std::iter::empty()).with_fallback(value)
    }

    pub fn with_fallback(mut self, value: f64) -> Self {
        self.fallback = Some(value);
        self
    }

    /// Number of draws taken so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Scripted draws not yet taken
    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl RandomStream for ScriptedStream {
    fn next_real(&mut self) -> f64 {
        self.consumed += 1;
        match self.draws.pop_front().or(self.fallback) {
            Some(value) => value,
            None => panic!("scripted stream exhausted after {} draws", self.consumed - 1),
        }
    }

    fn int_in_range(&mut self, min: usize, max: usize) -> usize {
        let span = (max - min + 1) as f64;
        let offset = (self.next_real() * span).floor() as usize;
        min + offset.min(max - min)
    }
}
