//! Node height selection.
//!
//! Every node in a skip list occupies level 0, and each level above that
//! holds a random subset of the level below it. Heights follow a geometric
//! distribution: a node reaches level `n + 1` with probability [`P`] given
//! that it reaches level `n`. With `P = 1/4` the expected number of levels a
//! search touches is `log4(n)`, and a node carries `4/3` edges on average.
//!
//! The random source is pluggable through [`LevelGenerator`]. Only the
//! distribution matters for the list's complexity guarantees; the exact
//! height drawn for any given insert is not part of the contract.

use rand::RngCore;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// Probability that a node at level `n` is also present at level `n + 1`.
pub const P: f64 = 0.25;

/// Chooses the height of a freshly inserted node.
pub trait LevelGenerator {
    /// Height for a new node, in `1..=max_level`.
    fn random_level(&mut self, max_level: usize) -> usize;
}

/// Geometric heights with `p = 1/4` drawn from any [`RngCore`].
#[derive(Clone, Debug)]
pub struct Geometric<R = SmallRng> {
    rng: R,
}

impl Geometric<SmallRng> {
    /// Seed a fast generator from the operating system.
    pub fn from_entropy() -> Geometric {
        Geometric {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Reproducible heights, for tests and benchmarks.
    pub fn seeded(seed: u64) -> Geometric {
        Geometric {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl<R: RngCore> Geometric<R> {
    pub fn new(rng: R) -> Geometric<R> {
        Geometric { rng }
    }
}

impl Default for Geometric<SmallRng> {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl<R: RngCore> LevelGenerator for Geometric<R> {
    fn random_level(&mut self, max_level: usize) -> usize {
        // Each pair of trailing zero bits is one coin with p = 1/4.
        let zeros = self.rng.next_u64().trailing_zeros() as usize;
        (zeros / 2 + 1).min(max_level).max(1)
    }
}

impl<G: LevelGenerator + ?Sized> LevelGenerator for &mut G {
    fn random_level(&mut self, max_level: usize) -> usize {
        (**self).random_level(max_level)
    }
}

impl<G: LevelGenerator + ?Sized> LevelGenerator for Box<G> {
    fn random_level(&mut self, max_level: usize) -> usize {
        (**self).random_level(max_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_stay_in_bounds() {
        let mut generator = Geometric::seeded(7);
        for max_level in 1..=12 {
            for _ in 0..1000 {
                let level = generator.random_level(max_level);
                assert!(level >= 1 && level <= max_level, "level {} max {}", level, max_level);
            }
        }
    }

    #[test]
    fn max_level_one_is_always_one() {
        let mut generator = Geometric::seeded(1);
        for _ in 0..100 {
            assert_eq!(generator.random_level(1), 1);
        }
    }

    #[test]
    fn zero_max_level_still_yields_one() {
        let mut generator = Geometric::seeded(3);
        assert_eq!(generator.random_level(0), 1);
    }

    #[test]
    fn distribution_is_roughly_quarter() {
        let mut generator = Geometric::seeded(42);
        let samples = 100_000;
        let mut above_one = 0usize;
        let mut above_two = 0usize;
        for _ in 0..samples {
            let level = generator.random_level(32);
            if level >= 2 {
                above_one += 1;
            }
            if level >= 3 {
                above_two += 1;
            }
        }

        let p1 = above_one as f64 / samples as f64;
        let p2 = above_two as f64 / samples as f64;
        assert!((p1 - P).abs() < 0.01, "P(level >= 2) = {}", p1);
        assert!((p2 - P * P).abs() < 0.01, "P(level >= 3) = {}", p2);
    }

    #[test]
    fn same_seed_same_heights() {
        let mut a = Geometric::seeded(99);
        let mut b = Geometric::seeded(99);
        for _ in 0..256 {
            assert_eq!(a.random_level(16), b.random_level(16));
        }
    }

    #[test]
    fn borrowed_generator_advances_owner() {
        fn draw<G: LevelGenerator>(mut generator: G) -> usize {
            generator.random_level(8)
        }

        let mut owner = Geometric::seeded(5);
        let mut twin = Geometric::seeded(5);
        draw(&mut owner);
        twin.random_level(8);
        assert_eq!(owner.random_level(8), twin.random_level(8));
    }
}
