//! Seeded randomness primitives for reproducible stimulus generation.

use fxhash::FxHashSet;
use rand::distributions::uniform::SampleUniform;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// A seedable pseudo-random source. The same seed reproduces the same full
/// sequence of draws, which is what makes regression failures replayable.
#[derive(Debug)]
pub struct RandomStream {
    rng: StdRng,
}

impl RandomStream {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Discards all generator state and restarts the stream from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Uniform draw over the inclusive range `[lo, hi]`.
    pub fn uniform<T>(&mut self, lo: T, hi: T) -> T
    where
        T: SampleUniform + PartialOrd,
    {
        self.rng.gen_range(lo..=hi)
    }

    /// Bernoulli draw: `true` with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.gen_bool(p)
    }

    /// Uniform index into a collection of `len` elements.
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// Uniform selection of one element from a non-empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        items.choose(&mut self.rng).expect("pick() from empty slice")
    }
}

/// Retries before the unique-value generator gives up.
///
/// The `u64` domain is vast compared to any realistic draw count, so hitting
/// this bound means the underlying stream is broken, not unlucky.
const MAX_DRAW_ATTEMPTS: usize = 64;

/// Yields values unique within this generator's lifetime by rejection
/// sampling over the full `u64` domain.
#[derive(Debug, Default)]
pub struct UniqueRandom {
    seen: FxHashSet<u64>,
}

impl UniqueRandom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of values handed out so far.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Draws the next value never returned before by this generator.
    pub fn draw(&mut self, rs: &mut RandomStream) -> u64 {
        for _ in 0..MAX_DRAW_ATTEMPTS {
            let v = rs.uniform(u64::MIN, u64::MAX);
            if self.seen.insert(v) {
                return v;
            }
        }
        panic!(
            "no unique u64 after {MAX_DRAW_ATTEMPTS} attempts ({} already drawn)",
            self.seen.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_reproduces_every_draw() {
        let mut a = RandomStream::new(7);
        let mut b = RandomStream::new(7);
        for _ in 0..1000 {
            assert_eq!(a.uniform(0u64, u64::MAX), b.uniform(0u64, u64::MAX));
            assert_eq!(a.chance(0.3), b.chance(0.3));
            assert_eq!(a.index(17), b.index(17));
        }
    }

    #[test]
    fn reseed_restarts_the_stream() {
        let mut rs = RandomStream::new(42);
        let first: Vec<u32> = (0..16).map(|_| rs.uniform(0u32, u32::MAX)).collect();
        rs.reseed(42);
        let second: Vec<u32> = (0..16).map(|_| rs.uniform(0u32, u32::MAX)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn pick_returns_a_member() {
        let mut rs = RandomStream::new(3);
        let items = [10, 20, 30, 40];
        for _ in 0..100 {
            assert!(items.contains(rs.pick(&items)));
        }
    }

    #[test]
    fn unique_draws_never_repeat() {
        let mut rs = RandomStream::new(99);
        let mut uniq = UniqueRandom::new();
        let draws: Vec<u64> = (0..10_000).map(|_| uniq.draw(&mut rs)).collect();
        assert_eq!(uniq.len(), draws.len());
        let set: std::collections::HashSet<u64> = draws.iter().copied().collect();
        assert_eq!(set.len(), draws.len());
    }
}
