//! Skiplists use a probabilistic distribution of nodes over the internal
//! levels, whereby the lowest level (level 0) contains all the nodes, and each
//! level $n > 0$ will contain a random subset of the nodes on level `n - 1`.
//!
//! The list in this crate uses a fair coin: a tower reaching level $n$ reaches
//! level $n + 1$ with probability $1/2$, truncated at the top level. See
//! [`Discrete`] for the exact law.

pub mod discrete;

pub use discrete::Discrete;

// ////////////////////////////////////////////////////////////////////////////
// Level Generator
// ////////////////////////////////////////////////////////////////////////////

/// Upon the insertion of a new tower in the list, the tower is replicated to
/// higher levels with a certain probability as determined by a
/// [`LevelGenerator`].
pub trait LevelGenerator {
    /// The total number of distinct levels the generator can produce.
    #[must_use]
    fn total(&self) -> usize;

    /// Generate a random level for a new tower in the range `[0, total)`.
    ///
    /// This function should _never_ return a level greater or equal to
    /// [`total`][LevelGenerator::total].
    #[must_use]
    fn level(&mut self) -> usize;
}
