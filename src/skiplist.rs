//! An ordered skiplist of integer keys whose levels are circular lists.

use std::{cmp::Ordering, collections::TryReserveError, fmt, hash, iter, mem, ops};

use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    level_generator::{Discrete, LevelGenerator},
    options::Options,
    tower::{Arena, Cell, Link, Tower, TowerId},
};

// ////////////////////////////////////////////////////////////////////////////
// Errors
// ////////////////////////////////////////////////////////////////////////////

/// Errors that can occur when creating or querying a [`SkipList`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SkipListError {
    /// The list must have at least one level.
    #[error("levels must be non-zero, got {levels}.")]
    InvalidConfiguration {
        /// The rejected level count.
        levels: usize,
    },
    /// The requested rank is not smaller than the length of the list.
    #[error("rank {rank} is out of range for a skiplist of length {len}.")]
    OutOfRange {
        /// The requested rank.
        rank: usize,
        /// The length of the list at the time of the request.
        len: usize,
    },
    /// Memory for the list or one of its towers could not be reserved.
    #[error("failed to allocate skiplist storage.")]
    AllocationFailure(#[from] TryReserveError),
}

// ////////////////////////////////////////////////////////////////////////////
// Search
// ////////////////////////////////////////////////////////////////////////////

/// Outcome of [`SkipList::search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Search {
    /// Whether the key is stored in the list.
    pub found: bool,
    /// Number of key comparisons performed by the search.
    pub comparisons: usize,
}

// ////////////////////////////////////////////////////////////////////////////
// SkipList
// ////////////////////////////////////////////////////////////////////////////

/// An ordered set of `i64` keys stored in a skiplist.
///
/// Every level is a circular doubly-linked list closed by its own sentinel, so
/// the successor of the largest key and the predecessor of the smallest key
/// at any level are that level's sentinel. Each key is held by a single
/// tower whose height is drawn once, at insertion, from a seeded
/// [`Discrete`] generator; inserting a key that is already present replaces
/// its tower.
///
/// Dropping the list releases every tower exactly once.
pub struct SkipList {
    /// One cell per level; `sentinel[i]` closes the circular list of level `i`.
    sentinel: Box<[Cell]>,
    /// Owner of every tower in the list.
    towers: Arena,
    level_generator: Discrete,
    /// Scratch space for the per-level predecessors found during insertion.
    update: Vec<Link>,
}

// ///////////////////////////////////////////////
// Inherent methods
// ///////////////////////////////////////////////

impl SkipList {
    /// Create a new, empty skiplist with `levels` levels whose tower heights
    /// are drawn from a generator seeded with `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`SkipListError::InvalidConfiguration`] if `levels` is zero, and
    /// [`SkipListError::AllocationFailure`] if the sentinels cannot be
    /// allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// use circular_skiplist::SkipList;
    ///
    /// let skiplist = SkipList::new(4, 42).unwrap();
    /// assert!(skiplist.is_empty());
    /// assert!(SkipList::new(0, 42).is_err());
    /// ```
    #[inline]
    pub fn new(levels: usize, seed: u64) -> Result<Self, SkipListError> {
        Self::with_options(Options::default().with_levels(levels).with_seed(seed))
    }

    /// Create a new, empty skiplist from a set of [`Options`].
    ///
    /// # Errors
    ///
    /// See [`SkipList::new`].
    pub fn with_options(options: Options) -> Result<Self, SkipListError> {
        let Options { levels, seed } = options;
        if levels == 0 {
            return Err(SkipListError::InvalidConfiguration { levels });
        }

        let mut sentinel = Vec::new();
        sentinel.try_reserve_exact(levels)?;
        sentinel.extend(iter::repeat_n(Cell::EMPTY, levels));

        let mut update = Vec::new();
        update.try_reserve_exact(levels)?;
        update.extend(iter::repeat_n(Link::Sentinel, levels));

        debug!(levels, seed, "created skiplist");
        Ok(SkipList {
            sentinel: sentinel.into_boxed_slice(),
            towers: Arena::new(),
            level_generator: Discrete::new(seed, levels - 1),
            update,
        })
    }

    /// Constructs a new, empty skiplist with the optimal number of levels for
    /// the intended capacity.  Specifically, it uses `floor(log2(capacity))`
    /// number of levels, ensuring that only *a few* towers occupy the highest
    /// level.
    ///
    /// # Errors
    ///
    /// Returns [`SkipListError::AllocationFailure`] if the sentinels cannot be
    /// allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// use circular_skiplist::SkipList;
    ///
    /// let skiplist = SkipList::with_capacity(1024, 7).unwrap();
    /// assert_eq!(skiplist.levels(), 10);
    /// ```
    #[inline]
    pub fn with_capacity(capacity: usize, seed: u64) -> Result<Self, SkipListError> {
        let levels = usize::try_from(capacity.max(2).ilog2()).unwrap_or(1);
        Self::new(levels, seed)
    }

    /// Returns the number of levels, fixed at creation.
    #[inline]
    #[must_use]
    pub fn levels(&self) -> usize {
        self.sentinel.len()
    }

    /// Returns the number of keys in the skiplist.
    ///
    /// # Examples
    ///
    /// ```
    /// use circular_skiplist::SkipList;
    ///
    /// let mut skiplist = SkipList::new(4, 42).unwrap();
    /// skiplist.try_extend([3, 1, 2]).unwrap();
    /// assert_eq!(skiplist.len(), 3);
    /// ```
    #[doc(alias = "size")]
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.towers.len()
    }

    /// Returns `true` if the skiplist contains no keys.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every key, keeping the levels and the state of the level
    /// generator.
    ///
    /// # Examples
    ///
    /// ```
    /// use circular_skiplist::SkipList;
    ///
    /// let mut skiplist = SkipList::new(4, 42).unwrap();
    /// skiplist.try_extend(0..10).unwrap();
    /// skiplist.clear();
    /// assert!(skiplist.is_empty());
    /// ```
    pub fn clear(&mut self) {
        debug!(len = self.len(), "clearing skiplist");
        self.towers.clear();
        self.sentinel.fill(Cell::EMPTY);
    }

    /// Insert a key into the skiplist, replacing its tower if the key is
    /// already present.
    ///
    /// The new tower's height is drawn from the level generator before
    /// anything else happens, so a duplicate key still consumes a draw. The
    /// list is returned to allow chaining.
    ///
    /// # Errors
    ///
    /// Returns [`SkipListError::AllocationFailure`] if the new tower cannot be
    /// allocated, in which case the list is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use circular_skiplist::SkipList;
    ///
    /// let mut skiplist = SkipList::new(4, 42).unwrap();
    /// skiplist.insert(10).unwrap().insert(5).unwrap().insert(5).unwrap();
    /// assert_eq!(skiplist.len(), 2);
    /// ```
    pub fn insert(&mut self, key: i64) -> Result<&mut Self, SkipListError> {
        let height = self.level_generator.level() + 1;
        let mut tower = Tower::try_new(key, height)?;
        self.towers.try_reserve()?;

        let mut update = mem::take(&mut self.update);
        if let Some(duplicate) = self.find_predecessors(key, &mut update) {
            let old = self.unlink(duplicate);
            trace!(key, height = old.height(), "replacing existing tower");
        }

        for (level, cell) in tower.cells.iter_mut().enumerate() {
            let prev = update[level];
            *cell = Cell {
                next: self.cell(prev, level).next,
                prev,
            };
        }
        self.update = update;

        let id = self.towers.insert(tower);
        for level in 0..height {
            let Cell { next, prev } = self.towers[id].cells[level];
            self.cell_mut(prev, level).next = Link::Tower(id);
            self.cell_mut(next, level).prev = Link::Tower(id);
        }

        trace!(key, height, "inserted tower");
        Ok(self)
    }

    /// Insert every key of the iterator, in order.
    ///
    /// # Errors
    ///
    /// Stops at, and returns, the first allocation failure. Keys inserted
    /// before the failure remain in the list.
    pub fn try_extend<I>(&mut self, keys: I) -> Result<(), SkipListError>
    where
        I: IntoIterator<Item = i64>,
    {
        for key in keys {
            self.insert(key)?;
        }
        Ok(())
    }

    /// Look up a key, counting the key comparisons performed along the way.
    ///
    /// # Examples
    ///
    /// ```
    /// use circular_skiplist::SkipList;
    ///
    /// let mut skiplist = SkipList::new(4, 42).unwrap();
    /// skiplist.try_extend(0..100).unwrap();
    /// let search = skiplist.search(42);
    /// assert!(search.found);
    /// assert!(search.comparisons > 0);
    /// assert!(!skiplist.search(100).found);
    /// ```
    #[must_use]
    pub fn search(&self, key: i64) -> Search {
        let mut comparisons = 0;
        let found = self.find_with(key, |_| comparisons += 1).is_some();
        Search { found, comparisons }
    }

    /// Returns true if the key is contained in the skiplist.
    #[inline]
    #[must_use]
    pub fn contains(&self, key: i64) -> bool {
        self.find_with(key, |_| {}).is_some()
    }

    /// Removes a key from the skiplist, returning whether it was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use circular_skiplist::SkipList;
    ///
    /// let mut skiplist = SkipList::new(4, 42).unwrap();
    /// skiplist.try_extend(0..10).unwrap();
    /// assert!(skiplist.remove(4));
    /// assert!(!skiplist.remove(4));
    /// assert_eq!(skiplist.len(), 9);
    /// ```
    pub fn remove(&mut self, key: i64) -> bool {
        match self.find_with(key, |_| {}) {
            Some(id) => {
                let tower = self.unlink(id);
                trace!(key, height = tower.height(), "removed tower");
                true
            }
            None => false,
        }
    }

    /// Returns the key at the given rank (0 being the smallest key).
    ///
    /// # Errors
    ///
    /// Returns [`SkipListError::OutOfRange`] if `rank` is not smaller than
    /// [`len`][SkipList::len].
    ///
    /// # Examples
    ///
    /// ```
    /// use circular_skiplist::SkipList;
    ///
    /// let mut skiplist = SkipList::new(4, 42).unwrap();
    /// skiplist.try_extend([20, 10, 30]).unwrap();
    /// assert_eq!(skiplist.at(1), Ok(20));
    /// assert!(skiplist.at(3).is_err());
    /// ```
    #[inline]
    pub fn at(&self, rank: usize) -> Result<i64, SkipListError> {
        self.get(rank).ok_or(SkipListError::OutOfRange {
            rank,
            len: self.len(),
        })
    }

    /// Returns the key at the given rank, or `None` if the rank is out of
    /// bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, rank: usize) -> Option<i64> {
        self.tower_at(rank).map(|id| self.towers[id].key)
    }

    /// Returns the smallest key, or `None` if the skiplist is empty.
    #[inline]
    #[must_use]
    pub fn front(&self) -> Option<i64> {
        self.sentinel[0].next.tower().map(|id| self.towers[id].key)
    }

    /// Returns the largest key, or `None` if the skiplist is empty.
    #[inline]
    #[must_use]
    pub fn back(&self) -> Option<i64> {
        self.sentinel[0].prev.tower().map(|id| self.towers[id].key)
    }

    /// Removes and returns the smallest key, or `None` if the skiplist is
    /// empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use circular_skiplist::SkipList;
    ///
    /// let mut skiplist = SkipList::new(4, 42).unwrap();
    /// skiplist.try_extend([2, 1]).unwrap();
    /// assert_eq!(skiplist.pop_front(), Some(1));
    /// assert_eq!(skiplist.pop_front(), Some(2));
    /// assert!(skiplist.pop_front().is_none());
    /// ```
    #[inline]
    pub fn pop_front(&mut self) -> Option<i64> {
        let id = self.sentinel[0].next.tower()?;
        Some(self.unlink(id).key)
    }

    /// Removes and returns the largest key, or `None` if the skiplist is
    /// empty.
    #[inline]
    pub fn pop_back(&mut self) -> Option<i64> {
        let id = self.sentinel[0].prev.tower()?;
        Some(self.unlink(id).key)
    }

    /// Calls `visitor` on every key, in ascending order.
    ///
    /// Any state the visitor needs can be captured by the closure.
    ///
    /// # Examples
    ///
    /// ```
    /// use circular_skiplist::SkipList;
    ///
    /// let mut skiplist = SkipList::new(4, 42).unwrap();
    /// skiplist.try_extend([3, 1, 2]).unwrap();
    /// let mut total = 0;
    /// skiplist.map(|key| total += key);
    /// assert_eq!(total, 6);
    /// ```
    #[inline]
    pub fn map<F>(&self, visitor: F)
    where
        F: FnMut(i64),
    {
        self.iter().for_each(visitor);
    }

    /// Creates an iterator over the keys of the skiplist, in ascending order.
    ///
    /// The iterator is double-ended: iterating from the back follows the
    /// `prev` links of level 0 and yields the keys in descending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use circular_skiplist::SkipList;
    ///
    /// let mut skiplist = SkipList::new(4, 42).unwrap();
    /// skiplist.try_extend([3, 1, 2]).unwrap();
    /// assert_eq!(skiplist.iter().collect::<Vec<_>>(), [1, 2, 3]);
    /// assert_eq!(skiplist.iter().rev().collect::<Vec<_>>(), [3, 2, 1]);
    /// ```
    #[inline]
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            front: self.sentinel[0].next,
            back: self.sentinel[0].prev,
            remaining: self.len(),
        }
    }

    /// Renders the structure of the skiplist, one row per level with the top
    /// level first (for debugging purposes).
    ///
    /// # Examples
    ///
    /// ```
    /// use circular_skiplist::SkipList;
    ///
    /// let mut skiplist = SkipList::new(1, 42).unwrap();
    /// skiplist.try_extend([2, 1]).unwrap();
    /// assert_eq!(skiplist.debug_structure(), "<s> -> [1] -> [2] -> <s>");
    /// ```
    #[must_use]
    pub fn debug_structure(&self) -> String {
        let mut rows: Vec<String> = iter::repeat_with(|| String::from("<s> "))
            .take(self.levels())
            .collect();

        let mut link = self.sentinel[0].next;
        while let Link::Tower(id) = link {
            let tower = &self.towers[id];
            let segment = format!("-> [{}] ", tower.key);
            for (level, row) in rows.iter_mut().enumerate() {
                if level < tower.height() {
                    row.push_str(&segment);
                } else {
                    row.extend(iter::repeat_n('-', segment.len()));
                }
            }
            link = tower.cells[0].next;
        }

        rows.iter()
            .rev()
            .map(|row| format!("{row}-> <s>"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ///////////////////////////////////////////////
// Internal methods
// ///////////////////////////////////////////////

impl SkipList {
    /// The cell that `link` owns at the given level.
    #[inline]
    fn cell(&self, link: Link, level: usize) -> &Cell {
        match link {
            Link::Sentinel => &self.sentinel[level],
            Link::Tower(id) => &self.towers[id].cells[level],
        }
    }

    #[inline]
    fn cell_mut(&mut self, link: Link, level: usize) -> &mut Cell {
        match link {
            Link::Sentinel => &mut self.sentinel[level],
            Link::Tower(id) => &mut self.towers[id].cells[level],
        }
    }

    /// Walks down from the top level, moving forward while the next key is
    /// smaller than `key` and stopping as soon as a tower holding `key` is
    /// met. `compared` is called on every key comparison.
    fn find_with(&self, key: i64, mut compared: impl FnMut(i64)) -> Option<TowerId> {
        let mut current = Link::Sentinel;
        for level in (0..self.levels()).rev() {
            while let Link::Tower(next) = self.cell(current, level).next {
                let next_key = self.towers[next].key;
                compared(next_key);
                match next_key.cmp(&key) {
                    Ordering::Less => current = Link::Tower(next),
                    Ordering::Equal => return Some(next),
                    Ordering::Greater => break,
                }
            }
        }
        None
    }

    /// Walks down from the top level, recording in `update[i]` the last link
    /// at level `i` whose key is smaller than `key`.
    ///
    /// A level's predecessor is only ever recorded from a link that reaches
    /// that level, so short towers are never used as a splice point above
    /// their height. Returns the tower already holding `key`, if any.
    fn find_predecessors(&self, key: i64, update: &mut [Link]) -> Option<TowerId> {
        let mut current = Link::Sentinel;
        for level in (0..self.levels()).rev() {
            while let Link::Tower(next) = self.cell(current, level).next {
                if self.towers[next].key < key {
                    current = Link::Tower(next);
                } else {
                    break;
                }
            }
            update[level] = current;
        }

        match self.cell(current, 0).next {
            Link::Tower(id) if self.towers[id].key == key => Some(id),
            _ => None,
        }
    }

    /// Unlinks a tower from every level it occupies and hands it back.
    ///
    /// The neighbours at each level end up pointing directly at each other.
    fn unlink(&mut self, id: TowerId) -> Tower {
        let tower = self.towers.remove(id);
        for (level, &Cell { next, prev }) in tower.cells.iter().enumerate() {
            self.cell_mut(prev, level).next = next;
            self.cell_mut(next, level).prev = prev;
        }
        tower
    }

    /// Finds the tower at the given rank, walking level 0 from whichever end
    /// of the circle is closer.
    fn tower_at(&self, rank: usize) -> Option<TowerId> {
        let len = self.len();
        if rank >= len {
            return None;
        }

        let (steps, forward) = if rank <= len / 2 {
            (rank, true)
        } else {
            (len - 1 - rank, false)
        };
        let start = if forward {
            self.sentinel[0].next
        } else {
            self.sentinel[0].prev
        };

        let mut link = start;
        for _ in 0..steps {
            let cell = self.cell(link, 0);
            link = if forward { cell.next } else { cell.prev };
        }
        link.tower()
    }
}

#[cfg(test)]
impl SkipList {
    /// Checks the integrity of the skiplist.
    ///
    /// At every level, the links must be reciprocal, the keys strictly
    /// increasing, and exactly the towers taller than the level must be
    /// present.
    fn check(&self) {
        assert_eq!(self.sentinel.len(), self.update.len());
        for level in 0..self.levels() {
            let expected = self
                .iter_ids()
                .filter(|&id| self.towers[id].height() > level)
                .count();

            let mut seen = 0;
            let mut current = Link::Sentinel;
            let mut last_key = None;
            loop {
                let next = self.cell(current, level).next;
                assert_eq!(
                    self.cell(next, level).prev,
                    current,
                    "broken prev link at level {level}"
                );
                let Link::Tower(id) = next else { break };
                let tower = &self.towers[id];
                assert!(tower.height() > level, "tower too short for level {level}");
                if let Some(last) = last_key {
                    assert!(last < tower.key, "unsorted level {level}");
                }
                last_key = Some(tower.key);
                seen += 1;
                assert!(seen <= self.len(), "level {level} does not close");
                current = next;
            }
            assert_eq!(seen, expected, "missing towers at level {level}");
        }
    }

    /// Ids of every tower, in level-0 order.
    fn iter_ids(&self) -> impl Iterator<Item = TowerId> + '_ {
        iter::successors(self.sentinel[0].next.tower(), |&id| {
            self.towers[id].cells[0].next.tower()
        })
    }

    /// Keys present at each level, bottom level first.
    fn level_keys(&self) -> Vec<Vec<i64>> {
        (0..self.levels())
            .map(|level| {
                iter::successors(self.sentinel[level].next.tower(), |&id| {
                    self.towers[id].cells[level].next.tower()
                })
                .map(|id| self.towers[id].key)
                .collect()
            })
            .collect()
    }
}

// ///////////////////////////////////////////////
// Iterators
// ///////////////////////////////////////////////

/// Borrowing iterator over the keys of a [`SkipList`], created by
/// [`SkipList::iter`].
#[derive(Clone)]
pub struct Iter<'a> {
    list: &'a SkipList,
    front: Link,
    back: Link,
    remaining: usize,
}

impl Iterator for Iter<'_> {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.front.tower()?;
        let tower = &self.list.towers[id];
        self.front = tower.cells[0].next;
        self.remaining -= 1;
        Some(tower.key)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<i64> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.back.tower()?;
        let tower = &self.list.towers[id];
        self.back = tower.cells[0].prev;
        self.remaining -= 1;
        Some(tower.key)
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl iter::FusedIterator for Iter<'_> {}

/// Owning iterator over the keys of a [`SkipList`].
pub struct IntoIter {
    list: SkipList,
}

impl Iterator for IntoIter {
    type Item = i64;

    #[inline]
    fn next(&mut self) -> Option<i64> {
        self.list.pop_front()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len(), Some(self.list.len()))
    }
}

impl DoubleEndedIterator for IntoIter {
    #[inline]
    fn next_back(&mut self) -> Option<i64> {
        self.list.pop_back()
    }
}

impl ExactSizeIterator for IntoIter {}

impl iter::FusedIterator for IntoIter {}

// ///////////////////////////////////////////////
// Trait implementation
// ///////////////////////////////////////////////

/// This implementation of `PartialEq` only checks that the *keys* are equal;
/// the levels, tower heights and generator state are not compared.
impl PartialEq for SkipList {
    #[inline]
    fn eq(&self, other: &SkipList) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for SkipList {}

impl hash::Hash for SkipList {
    #[inline]
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        for key in self {
            key.hash(state);
        }
    }
}

impl ops::Index<usize> for SkipList {
    type Output = i64;

    fn index(&self, index: usize) -> &i64 {
        match self.tower_at(index) {
            Some(id) => &self.towers[id].key,
            None => panic!("Index out of range"),
        }
    }
}

impl fmt::Debug for SkipList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl fmt::Display for SkipList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;

        for (i, key) in self.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}")?;
        }
        write!(f, "]")
    }
}

impl iter::IntoIterator for SkipList {
    type Item = i64;
    type IntoIter = IntoIter;

    fn into_iter(self) -> IntoIter {
        IntoIter { list: self }
    }
}

impl<'a> iter::IntoIterator for &'a SkipList {
    type Item = i64;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Tests
// ////////////////////////////////////////////////////////////////////////////
