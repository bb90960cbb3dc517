//! Lab blending of two colors and the table of named blends.
//!
//! A blend mixes a *head* and a *modifier* color channel by channel in
//! CIELAB and quantizes the result back to 8-bit sRGB. [`blend_all_splits`]
//! runs every catalog [`UnigramSplit`] through a list of ratios to produce a
//! [`BlendTable`]: the candidate names the namer searches.

use ahash::AHashMap;
use tintbot_color::{Color, Rgb};

use crate::catalog::Catalog;
use crate::error::{CoreError, Result};
use crate::resources::UnigramSplit;
use crate::selector::{self, ColorSelector};

/// Head-leaning, even, and modifier-leaning.
pub const DEFAULT_BLEND_RATIOS: [f64; 3] = [0.75, 0.5, 0.25];

/// Per-channel share of the head color, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlendWeights {
    l: f64,
    a: f64,
    b: f64,
}

impl BlendWeights {
    /// Half head, half modifier on every channel.
    pub const EVEN: Self = Self {
        l: 0.5,
        a: 0.5,
        b: 0.5,
    };

    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] if any weight is NaN or outside
    /// `[0, 1]`.
    pub fn new(l: f64, a: f64, b: f64) -> Result<Self> {
        for (channel, weight) in [("L", l), ("a", a), ("b", b)] {
            if !(0.0..=1.0).contains(&weight) {
                return Err(CoreError::invalid(format!(
                    "blend weight for {channel} must be within [0, 1], got {weight}"
                )));
            }
        }
        Ok(Self { l, a, b })
    }

    /// The same head share on all three channels.
    ///
    /// # Errors
    ///
    /// Same as [`BlendWeights::new`].
    pub fn uniform(head_amount: f64) -> Result<Self> {
        Self::new(head_amount, head_amount, head_amount)
    }

    /// One uniform weight per ratio.
    ///
    /// # Errors
    ///
    /// Fails on the first ratio outside `[0, 1]`.
    pub fn from_ratios(ratios: &[f64]) -> Result<Vec<Self>> {
        ratios.iter().map(|&ratio| Self::uniform(ratio)).collect()
    }

    /// Weights with head and modifier swapped.
    #[must_use]
    pub fn complement(self) -> Self {
        Self {
            l: 1.0 - self.l,
            a: 1.0 - self.a,
            b: 1.0 - self.b,
        }
    }

    #[must_use]
    pub const fn as_array(self) -> [f64; 3] {
        [self.l, self.a, self.b]
    }
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self::EVEN
    }
}

/// Mix `head` and `modifier` in Lab and quantize the result.
#[must_use]
pub fn blend(head: &Color, modifier: &Color, weights: BlendWeights) -> Color {
    Color::from_lab(head.lab().mix(modifier.lab(), weights.as_array()))
}

/// Resolve two catalog names and blend them.
///
/// Returns `(head, modifier, blended)`. Names that map to several colors are
/// resolved through `selector`.
///
/// # Errors
///
/// Returns [`CoreError::NameNotFound`] if either name is absent from the
/// catalog.
pub fn blend_by_name(
    catalog: &Catalog,
    head_name: &str,
    modifier_name: &str,
    weights: BlendWeights,
    selector: &mut dyn ColorSelector,
) -> Result<(Color, Color, Color)> {
    let head = resolve(catalog, head_name, selector)?;
    let modifier = resolve(catalog, modifier_name, selector)?;
    Ok((head, modifier, blend(&head, &modifier, weights)))
}

fn resolve(catalog: &Catalog, name: &str, selector: &mut dyn ColorSelector) -> Result<Color> {
    catalog
        .lookup_by_name(name)
        .and_then(|colors| selector::choose(selector, colors))
        .ok_or_else(|| CoreError::not_found(name))
}

/// One named blend: a split, the ratio it was mixed at, and the result.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlendedName {
    /// `w1 w2`.
    pub name: String,
    pub split: UnigramSplit,
    pub head: Color,
    pub modifier: Color,
    pub weights: BlendWeights,
    pub color: Color,
}

/// Blended names keyed by their quantized color.
///
/// Inserting a color that is already present replaces the stored name but
/// keeps its position, so iteration follows first-insertion order.
#[derive(Debug, Clone, Default)]
pub struct BlendTable {
    entries: Vec<BlendedName>,
    index: AHashMap<Rgb, usize>,
    skipped: usize,
}

impl BlendTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Blend every split of `catalog` at every ratio.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] for a ratio outside `[0, 1]`.
    pub fn build(
        catalog: &Catalog,
        ratios: &[f64],
        selector: &mut dyn ColorSelector,
    ) -> Result<Self> {
        let weights = BlendWeights::from_ratios(ratios)?;
        Ok(blend_all_splits(catalog, catalog.splits(), &weights, selector))
    }

    /// Insert or replace; returns the replaced entry.
    pub fn insert(&mut self, blended: BlendedName) -> Option<BlendedName> {
        let key = blended.color.rgb();
        match self.index.get(&key) {
            Some(&slot) => Some(std::mem::replace(&mut self.entries[slot], blended)),
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(blended);
                None
            }
        }
    }

    #[must_use]
    pub fn get(&self, color: &Color) -> Option<&BlendedName> {
        self.index.get(&color.rgb()).map(|&slot| &self.entries[slot])
    }

    #[must_use]
    pub fn entries(&self) -> &[BlendedName] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BlendedName> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Splits that could not be resolved while the table was built.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<'a> IntoIterator for &'a BlendTable {
    type Item = &'a BlendedName;
    type IntoIter = std::slice::Iter<'a, BlendedName>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Blend every split at every weight, `w1` as head and `w2` as modifier.
///
/// Splits with a word the catalog cannot resolve are skipped and counted in
/// [`BlendTable::skipped`].
pub fn blend_all_splits(
    catalog: &Catalog,
    splits: &[UnigramSplit],
    weights_list: &[BlendWeights],
    selector: &mut dyn ColorSelector,
) -> BlendTable {
    let mut table = BlendTable::new();

    for split in splits {
        for &weights in weights_list {
            match blend_by_name(catalog, &split.w1, &split.w2, weights, selector) {
                Ok((head, modifier, color)) => {
                    table.insert(BlendedName {
                        name: split.display_name(),
                        split: split.clone(),
                        head,
                        modifier,
                        weights,
                        color,
                    });
                }
                Err(error) => {
                    tracing::debug!(w1 = %split.w1, w2 = %split.w2, %error, "skipping split");
                    table.skipped += 1;
                    break;
                }
            }
        }
    }

    if table.skipped > 0 {
        tracing::warn!(
            skipped = table.skipped,
            splits = splits.len(),
            "some splits name colors missing from the catalog"
        );
    }
    tracing::info!(
        entries = table.len(),
        splits = splits.len(),
        ratios = weights_list.len(),
        "blend table built"
    );

    table
}
