//! Discrete level generator.

use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::level_generator::LevelGenerator;

/// A re-entrant level generator following a capped geometric law.
///
/// Each draw flips a fair coin repeatedly, counting successes, and stops at
/// the first failure or once the count reaches `max_value`. The resulting law
/// is
///
/// ```math
/// P(i) = \frac{1}{2^{i+1}} \quad (0 \le i < m), \qquad P(m) = \frac{1}{2^{m}}
/// ```
///
/// where `$m$` is `max_value`: the tail mass above the cap is folded into the
/// cap itself.
///
/// All state lives in the value. Two generators created with the same seed
/// produce the same sequence, and generators never share state.
#[derive(Debug, Clone)]
pub struct Discrete {
    /// Largest value that can be produced.
    max_value: usize,
    /// The random number generator.
    rng: SmallRng,
}

impl Discrete {
    /// Create a generator producing values in `[0, max_value]`, seeded with
    /// `seed`.
    ///
    /// A `max_value` of zero is valid: every draw then yields `0`.
    #[inline]
    #[must_use]
    pub fn new(seed: u64, max_value: usize) -> Self {
        Discrete {
            max_value,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Returns the largest value this generator can produce.
    #[inline]
    #[must_use]
    pub fn upper_bound(&self) -> usize {
        self.max_value
    }
}

impl LevelGenerator for Discrete {
    #[inline]
    fn total(&self) -> usize {
        self.max_value + 1
    }

    #[inline]
    fn level(&mut self) -> usize {
        let mut value = 0;
        while value < self.max_value && self.rng.random::<bool>() {
            value += 1;
        }
        value
    }
}
