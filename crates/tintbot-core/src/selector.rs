//! Choosing one color when a name maps to several.
//!
//! Base color names such as `green` resolve to many catalog colors. The blend
//! engine asks a [`ColorSelector`] to pick one so that callers control the
//! randomness: production code uses [`UniformSelector`], tests use a seeded
//! one or [`FirstSelector`].

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tintbot_color::Color;

/// Picks one color out of a non-empty candidate list.
pub trait ColorSelector {
    /// Return the index of the chosen candidate.
    ///
    /// `candidates` is never empty; implementations must return an index
    /// strictly below `candidates.len()`.
    fn select(&mut self, candidates: &[Color]) -> usize;
}

/// Uniformly random choice.
#[derive(Debug, Clone)]
pub struct UniformSelector {
    rng: SmallRng,
}

impl UniformSelector {
    /// Seeded from the operating system.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_os_rng(),
        }
    }

    /// Reproducible sequence for a given seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for UniformSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorSelector for UniformSelector {
    fn select(&mut self, candidates: &[Color]) -> usize {
        match candidates.len() {
            0 | 1 => 0,
            len => self.rng.random_range(0..len),
        }
    }
}

/// Always the first candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstSelector;

impl ColorSelector for FirstSelector {
    fn select(&mut self, _candidates: &[Color]) -> usize {
        0
    }
}

/// Resolve a candidate list to one color, clamping a misbehaving selector.
///
/// `None` only for an empty list.
pub fn choose(selector: &mut dyn ColorSelector, candidates: &[Color]) -> Option<Color> {
    let last = candidates.len().checked_sub(1)?;
    let index = selector.select(candidates).min(last);
    candidates.get(index).copied()
}
