//! A skiplist is a way of storing elements in such a way that elements can be efficiently
//! accessed, inserted and removed, all in `O(log(n))` on average.
//!
//! Conceptually, the skiplist in this crate resembles something like:
//!
//! ```text
//! <s> ---------> [2] -------------------------------------------> [9] ----------> <s>
//! <s> ---------> [2] -----------------------------> [7] --------> [9] ----------> <s>
//! <s> ---------> [2] --------> [4] ---------------> [7] --------> [9] -> [10] --> <s>
//! <s> -> [1] --> [2] -> [3] -> [4] -> [5] -> [6] -> [7] -> [8] -> [9] -> [10] --> <s>
//! ```
//!
//! where each tower `[x]` has links to towers further down the list, allowing
//! the search to effectively skip ahead. Every level also links backwards, and
//! both ends of each level meet at that level's sentinel `<s>`, so every level
//! is a circle and no traversal ever needs to check for a missing link.
//!
//! Keys are `i64`; the whole range is usable since the sentinel is a tag, not a
//! reserved key. Inserting a key that is already present replaces its tower.
//!
//! ```
//! use circular_skiplist::SkipList;
//!
//! let mut skiplist = SkipList::new(4, 42).unwrap();
//! skiplist.insert(10).unwrap().insert(5).unwrap().insert(20).unwrap().insert(5).unwrap();
//!
//! assert_eq!(skiplist.len(), 3);
//! assert_eq!(skiplist.iter().collect::<Vec<_>>(), [5, 10, 20]);
//! assert!(skiplist.search(5).found);
//! assert!(!skiplist.search(99).found);
//! assert_eq!(skiplist.at(1), Ok(10));
//! ```
//!
//! Tower heights come from a seeded [`Discrete`][level_generator::Discrete]
//! generator, so two lists built with the same seed and the same insertions
//! have the same shape.

pub mod level_generator;
mod options;
mod skiplist;
mod tower;

pub use options::{DEFAULT_LEVELS, DEFAULT_SEED, Options};
pub use skiplist::{IntoIter, Iter, Search, SkipList, SkipListError};
