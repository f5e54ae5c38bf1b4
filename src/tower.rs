//! Towers and the arena that owns them.
//!
//! A tower is the set of per-level link cells belonging to one key. Rather
//! than pointing at each other by address, towers refer to one another by
//! [`TowerId`], the index of their slot in the [`Arena`]. The per-level
//! sentinels are not stored in the arena at all; a link to one is the tagged
//! [`Link::Sentinel`] variant, so no key value is ever reserved to mark it.

use std::{collections::TryReserveError, iter, ops};

// ////////////////////////////////////////////////////////////////////////////
// Links
// ////////////////////////////////////////////////////////////////////////////

/// Index of a tower's slot within the [`Arena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TowerId(usize);

/// Target of a link at some level: either that level's sentinel, or a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Link {
    /// The sentinel of the level the link lives on.
    Sentinel,
    /// A tower tall enough to occupy the level the link lives on.
    Tower(TowerId),
}

impl Link {
    /// Returns the tower id, or `None` for the sentinel.
    #[inline]
    pub fn tower(self) -> Option<TowerId> {
        match self {
            Link::Sentinel => None,
            Link::Tower(id) => Some(id),
        }
    }
}

/// The `(next, prev)` pair a tower or sentinel holds at a single level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub next: Link,
    pub prev: Link,
}

impl Cell {
    /// A cell that closes its level onto the sentinel in both directions.
    pub const EMPTY: Cell = Cell {
        next: Link::Sentinel,
        prev: Link::Sentinel,
    };
}

// ////////////////////////////////////////////////////////////////////////////
// Tower
// ////////////////////////////////////////////////////////////////////////////

/// A key together with one link cell for each level it occupies.
///
/// `cells[i]` holds the links at level `i`; the height of the tower is
/// `cells.len()` and never changes once allocated.
#[derive(Debug)]
pub struct Tower {
    pub key: i64,
    pub cells: Box<[Cell]>,
}

impl Tower {
    /// Allocate a tower of the given height, with every cell pointing at the
    /// sentinel.
    pub fn try_new(key: i64, height: usize) -> Result<Self, TryReserveError> {
        let mut cells = Vec::new();
        cells.try_reserve_exact(height)?;
        cells.extend(iter::repeat_n(Cell::EMPTY, height));
        Ok(Tower {
            key,
            cells: cells.into_boxed_slice(),
        })
    }

    /// Number of levels the tower occupies.
    #[inline]
    pub fn height(&self) -> usize {
        self.cells.len()
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Arena
// ////////////////////////////////////////////////////////////////////////////

#[derive(Debug)]
enum Slot {
    Occupied(Tower),
    Vacant { next_free: Option<usize> },
}

/// Slot storage for towers with stable indices and slot reuse.
///
/// Every live tower is owned by exactly one slot, so dropping the arena
/// releases each tower exactly once regardless of its height.
#[derive(Debug, Default)]
pub struct Arena {
    slots: Vec<Slot>,
    free: Option<usize>,
    len: usize,
}

impl Arena {
    pub const fn new() -> Self {
        Arena {
            slots: Vec::new(),
            free: None,
            len: 0,
        }
    }

    /// Number of live towers.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Make sure the next [`insert`][Arena::insert] will not need to allocate.
    pub fn try_reserve(&mut self) -> Result<(), TryReserveError> {
        if self.free.is_none() {
            self.slots.try_reserve(1)?;
        }
        Ok(())
    }

    /// Store a tower, returning the id it can be reached by.
    ///
    /// Call [`try_reserve`][Arena::try_reserve] first for this not to
    /// allocate.
    pub fn insert(&mut self, tower: Tower) -> TowerId {
        self.len += 1;
        match self.free {
            Some(index) => {
                let Slot::Vacant { next_free } = self.slots[index] else {
                    unreachable!("free list points at an occupied slot");
                };
                self.free = next_free;
                self.slots[index] = Slot::Occupied(tower);
                TowerId(index)
            }
            None => {
                self.slots.push(Slot::Occupied(tower));
                TowerId(self.slots.len() - 1)
            }
        }
    }

    /// Take a tower out of the arena, releasing its slot for reuse.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not refer to a live tower.
    pub fn remove(&mut self, id: TowerId) -> Tower {
        let vacant = Slot::Vacant {
            next_free: self.free,
        };
        match std::mem::replace(&mut self.slots[id.0], vacant) {
            Slot::Occupied(tower) => {
                self.free = Some(id.0);
                self.len -= 1;
                tower
            }
            Slot::Vacant { .. } => panic!("tower {} is not live", id.0),
        }
    }

    /// Drop every tower at once.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free = None;
        self.len = 0;
    }
}

impl ops::Index<TowerId> for Arena {
    type Output = Tower;

    fn index(&self, id: TowerId) -> &Tower {
        match &self.slots[id.0] {
            Slot::Occupied(tower) => tower,
            Slot::Vacant { .. } => panic!("tower {} is not live", id.0),
        }
    }
}

impl ops::IndexMut<TowerId> for Arena {
    fn index_mut(&mut self, id: TowerId) -> &mut Tower {
        match &mut self.slots[id.0] {
            Slot::Occupied(tower) => tower,
            Slot::Vacant { .. } => panic!("tower {} is not live", id.0),
        }
    }
}
