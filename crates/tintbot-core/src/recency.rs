//! Recency filtering for produced names and published colors.
//!
//! [`RecentNameMemory`] is a bounded FIFO of the last names a caller actually
//! used, plus the set of lowercase words ("atoms") those names contain. A new
//! candidate is approved only if it repeats neither a remembered name nor any
//! remembered word:
//!
//! ```
//! use tintbot_core::recency::RecentNameMemory;
//!
//! let mut memory = RecentNameMemory::default();
//! memory.remember("amber bunny");
//! assert!(!memory.approve("amber leather"));
//! assert!(memory.approve("teal frog"));
//! ```
//!
//! [`RecentColorWindow`] does the same for colors: a target that sits too close
//! in Lab space to something just published is rejected.
//!
//! Memories are plain values. [`SharedRecentMemory`] wraps one for concurrent
//! use: readers load an immutable snapshot, writers clone, mutate and swap
//! under a mutex.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use ahash::AHashSet;
use arc_swap::ArcSwap;
use tintbot_color::Color;

use crate::error::{CoreError, Result};

pub const DEFAULT_RECENT_CAPACITY: usize = 15;
pub const DEFAULT_RECENT_COLORS: usize = 5;
pub const DEFAULT_MIN_COLOR_DISTANCE: f64 = 15.0;

// ---------------------------------------------------------------------------
// Names
// ---------------------------------------------------------------------------

/// The last `capacity` names used, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentNameMemory {
    names: VecDeque<String>,
    atoms: AHashSet<String>,
    capacity: usize,
}

impl RecentNameMemory {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] for a zero capacity.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(CoreError::invalid("recent name capacity must be at least 1"));
        }
        Ok(Self {
            names: VecDeque::with_capacity(capacity),
            atoms: AHashSet::new(),
            capacity,
        })
    }

    /// A memory that has already seen `names`, in order.
    ///
    /// # Errors
    ///
    /// Same as [`RecentNameMemory::new`].
    pub fn from_names<I, S>(capacity: usize, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut memory = Self::new(capacity)?;
        for name in names {
            memory.remember(name);
        }
        Ok(memory)
    }

    /// `false` if the candidate repeats a remembered name or any remembered
    /// word (case-insensitive).
    #[must_use]
    pub fn approve(&self, candidate: &str) -> bool {
        if self.names.iter().any(|name| name == candidate) {
            return false;
        }
        !atoms_of(candidate).any(|atom| self.atoms.contains(&atom))
    }

    /// Record a name that was actually used, evicting the oldest past
    /// capacity.
    pub fn remember(&mut self, name: impl Into<String>) {
        self.names.push_back(name.into());
        while self.names.len() > self.capacity {
            self.names.pop_front();
        }
        self.atoms = self.names.iter().flat_map(|name| atoms_of(name)).collect();
    }

    /// Remembered names, oldest first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    #[must_use]
    pub fn contains_atom(&self, atom: &str) -> bool {
        self.atoms.contains(&atom.to_lowercase())
    }

    #[must_use]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for RecentNameMemory {
    fn default() -> Self {
        Self {
            names: VecDeque::with_capacity(DEFAULT_RECENT_CAPACITY),
            atoms: AHashSet::new(),
            capacity: DEFAULT_RECENT_CAPACITY,
        }
    }
}

fn atoms_of(name: &str) -> impl Iterator<Item = String> + '_ {
    name.split_whitespace().map(str::to_lowercase)
}

/// See [`RecentNameMemory::approve`].
#[must_use]
pub fn approve(candidate: &str, memory: &RecentNameMemory) -> bool {
    memory.approve(candidate)
}

/// See [`RecentNameMemory::remember`].
pub fn remember(name: impl Into<String>, memory: &mut RecentNameMemory) {
    memory.remember(name);
}

// ---------------------------------------------------------------------------
// SharedRecentMemory
// ---------------------------------------------------------------------------

/// A [`RecentNameMemory`] shared between threads.
///
/// Reads never block. Writes are serialized and publish a whole new memory,
/// so a reader sees either all or none of a `remember`.
#[derive(Debug)]
pub struct SharedRecentMemory {
    current: ArcSwap<RecentNameMemory>,
    writer: Mutex<()>,
}

impl SharedRecentMemory {
    #[must_use]
    pub fn new(memory: RecentNameMemory) -> Self {
        Self {
            current: ArcSwap::from_pointee(memory),
            writer: Mutex::new(()),
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn load(&self) -> Arc<RecentNameMemory> {
        self.current.load_full()
    }

    #[must_use]
    pub fn approve(&self, candidate: &str) -> bool {
        self.current.load().approve(candidate)
    }

    pub fn remember(&self, name: impl Into<String>) {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = RecentNameMemory::clone(&self.current.load());
        next.remember(name);
        self.current.store(Arc::new(next));
    }
}

impl Default for SharedRecentMemory {
    fn default() -> Self {
        Self::new(RecentNameMemory::default())
    }
}

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

/// The last `capacity` published colors.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentColorWindow {
    colors: VecDeque<Color>,
    capacity: usize,
    min_distance: f64,
}

impl RecentColorWindow {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] for a zero capacity or a
    /// negative (or NaN) distance.
    pub fn new(capacity: usize, min_distance: f64) -> Result<Self> {
        if capacity == 0 {
            return Err(CoreError::invalid("recent color capacity must be at least 1"));
        }
        if min_distance.is_nan() || min_distance < 0.0 {
            return Err(CoreError::invalid(format!(
                "minimum color distance must be non-negative, got {min_distance}"
            )));
        }
        Ok(Self {
            colors: VecDeque::with_capacity(capacity),
            capacity,
            min_distance,
        })
    }

    /// `false` if `color` is closer than the minimum distance to any
    /// remembered color.
    #[must_use]
    pub fn approve_color(&self, color: &Color) -> bool {
        self.colors
            .iter()
            .all(|recent| recent.distance(color) >= self.min_distance)
    }

    pub fn remember_color(&mut self, color: Color) {
        self.colors.push_back(color);
        while self.colors.len() > self.capacity {
            self.colors.pop_front();
        }
    }

    /// Remembered colors, oldest first.
    pub fn colors(&self) -> impl Iterator<Item = &Color> {
        self.colors.iter()
    }

    #[must_use]
    pub fn min_distance(&self) -> f64 {
        self.min_distance
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for RecentColorWindow {
    fn default() -> Self {
        Self {
            colors: VecDeque::with_capacity(DEFAULT_RECENT_COLORS),
            capacity: DEFAULT_RECENT_COLORS,
            min_distance: DEFAULT_MIN_COLOR_DISTANCE,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
