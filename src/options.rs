//! Construction options for a [`SkipList`][crate::SkipList].

/// Seed used when none is given explicitly.
pub const DEFAULT_SEED: u64 = 123_456_789;

/// Number of levels used when none is given explicitly.
pub const DEFAULT_LEVELS: usize = 16;

/// Parameters fixed for the lifetime of a [`SkipList`][crate::SkipList].
///
/// # Examples
///
/// ```
/// use circular_skiplist::{Options, SkipList};
///
/// let options = Options::default().with_levels(4).with_seed(42);
/// let skiplist = SkipList::with_options(options).unwrap();
/// assert_eq!(skiplist.levels(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub struct Options {
    /// Number of levels in the list. Must be at least 1.
    pub levels: usize,
    /// Seed of the level generator.
    pub seed: u64,
}

impl Default for Options {
    #[inline]
    fn default() -> Self {
        Options {
            levels: DEFAULT_LEVELS,
            seed: DEFAULT_SEED,
        }
    }
}

impl Options {
    /// Replace the number of levels.
    #[inline]
    #[must_use]
    pub const fn with_levels(mut self, levels: usize) -> Self {
        self.levels = levels;
        self
    }

    /// Replace the level generator's seed.
    #[inline]
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
