//! Nearest-neighbor naming.
//!
//! [`k_nearest`] ranks any slice of colored items by Lab distance to a target.
//! [`name_color`] walks a [`BlendTable`] in that order and keeps the first
//! `k` distinct names the recency memory approves.
//!
//! The namer never applies a distance threshold itself. Callers that want one
//! use [`AcceptancePolicy`], or [`closest`] when they only need the single
//! best match.

use ahash::AHashSet;
use tintbot_color::Color;

use crate::blend::{BlendTable, BlendedName};
use crate::catalog::CatalogEntry;
use crate::error::{CoreError, Result};
use crate::recency::RecentNameMemory;

/// Default caller-side distance cutoff.
pub const DEFAULT_MAX_DISTANCE: f64 = 100.0;

/// Anything with a color the namer can measure.
pub trait HasColor {
    fn color(&self) -> Color;
}

impl HasColor for Color {
    fn color(&self) -> Color {
        *self
    }
}

impl HasColor for CatalogEntry {
    fn color(&self) -> Color {
        self.color
    }
}

impl HasColor for BlendedName {
    fn color(&self) -> Color {
        self.color
    }
}

/// A candidate and its distance to the target.
#[derive(Debug)]
pub struct Neighbor<'a, T> {
    pub item: &'a T,
    /// Position in the candidate slice.
    pub index: usize,
    pub distance: f64,
}

impl<T> Clone for Neighbor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Neighbor<'_, T> {}

/// The `k` candidates closest to `target`, nearest first.
///
/// Ties keep candidate order, so the result for `k` is always a prefix of the
/// result for any larger `k`. Returns fewer than `k` neighbors when there are
/// fewer candidates.
///
/// # Errors
///
/// Returns [`CoreError::InvalidArgument`] if `k` is zero.
pub fn k_nearest<'a, T: HasColor>(
    target: &Color,
    candidates: &'a [T],
    k: usize,
) -> Result<Vec<Neighbor<'a, T>>> {
    if k == 0 {
        return Err(CoreError::invalid("k must be at least 1"));
    }
    let mut ranked = rank(target, candidates);
    ranked.truncate(k);
    Ok(ranked)
}

fn rank<'a, T: HasColor>(target: &Color, candidates: &'a [T]) -> Vec<Neighbor<'a, T>> {
    let mut ranked: Vec<Neighbor<'a, T>> = candidates
        .iter()
        .enumerate()
        .map(|(index, item)| Neighbor {
            item,
            index,
            distance: target.distance(&item.color()),
        })
        .collect();
    ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    ranked
}

/// A name chosen for a target color.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NamedColor {
    pub name: String,
    /// The blended color the name was produced for.
    pub color: Color,
    /// Lab distance from the target.
    pub distance: f64,
}

/// Up to `k` approved names for `target`, nearest first.
///
/// Names the memory rejects are skipped and the scan continues. A name already
/// accepted in this call is skipped too, so one split blended at several
/// ratios fills at most one slot. Returning fewer than `k` names, or none, is
/// a normal outcome. `memory` is only read.
///
/// # Errors
///
/// Returns [`CoreError::InvalidArgument`] if `k` is zero.
pub fn name_color(
    target: &Color,
    table: &BlendTable,
    k: usize,
    memory: &RecentNameMemory,
) -> Result<Vec<NamedColor>> {
    if k == 0 {
        return Err(CoreError::invalid("k must be at least 1"));
    }

    let mut rejected = 0usize;
    let mut accepted = AHashSet::with_capacity(k);
    let named: Vec<NamedColor> = rank(target, table.entries())
        .into_iter()
        .filter(|neighbor| {
            let item = neighbor.item;
            let name = item.name.as_str();
            if accepted.contains(name) {
                return false;
            }
            let approved = memory.approve(name);
            rejected += usize::from(!approved);
            approved && accepted.insert(name)
        })
        .take(k)
        .map(|neighbor| NamedColor {
            name: neighbor.item.name.clone(),
            color: neighbor.item.color,
            distance: neighbor.distance,
        })
        .collect();

    tracing::debug!(
        color = %target,
        k,
        found = named.len(),
        rejected,
        "named color"
    );
    Ok(named)
}

/// Nearest candidate to `target`.
///
/// # Errors
///
/// Returns [`CoreError::InvalidArgument`] for an empty candidate list.
pub fn closest<'a, T: HasColor>(target: &Color, candidates: &'a [T]) -> Result<Neighbor<'a, T>> {
    k_nearest(target, candidates, 1)?
        .into_iter()
        .next()
        .ok_or_else(|| CoreError::invalid("cannot pick the closest of zero candidates"))
}

/// Caller-side cutoff on how far a name may be from its target.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AcceptancePolicy {
    /// `None` accepts every distance.
    pub max_distance: Option<f64>,
}

impl AcceptancePolicy {
    #[must_use]
    pub const fn new(max_distance: Option<f64>) -> Self {
        Self { max_distance }
    }

    #[must_use]
    pub const fn unbounded() -> Self {
        Self { max_distance: None }
    }

    /// Distances equal to the cutoff are accepted.
    #[must_use]
    pub fn accepts(&self, distance: f64) -> bool {
        self.max_distance.is_none_or(|max| distance <= max)
    }

    /// Drop names beyond the cutoff, keeping order.
    #[must_use]
    pub fn apply(&self, mut names: Vec<NamedColor>) -> Vec<NamedColor> {
        names.retain(|named| self.accepts(named.distance));
        names
    }
}

impl Default for AcceptancePolicy {
    fn default() -> Self {
        Self::new(Some(DEFAULT_MAX_DISTANCE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blend::{BlendWeights, DEFAULT_BLEND_RATIOS, blend_all_splits};
    use crate::catalog::Catalog;
    use crate::resources::{StereotypeRow, UnigramSplit};
    use crate::selector::FirstSelector;

    fn color(html: &str) -> Color {
        Color::parse(html).unwrap()
    }

    fn palette() -> Vec<Color> {
        ["#000000", "#ffffff", "#808080", "#ff0000", "#7f7f7f"]
            .iter()
            .map(|html| color(html))
            .collect()
    }

    fn table() -> BlendTable {
        let catalog = Catalog::build(
            &[
                StereotypeRow::new("amber", "orange", "#ffbf00"),
                StereotypeRow::new("bunny", "white", "#f4efe8"),
                StereotypeRow::new("tan", "brown", "#d2b48c"),
                StereotypeRow::new("leather", "brown", "#906a54"),
                StereotypeRow::new("moss", "green", "#8a9a5b"),
                StereotypeRow::new("frog", "green", "#4f7942"),
            ],
            &[],
        )
        .unwrap();
        blend_all_splits(
            &catalog,
            &[
                UnigramSplit::new("amber", "bunny"),
                UnigramSplit::new("tan", "leather"),
                UnigramSplit::new("moss", "frog"),
                UnigramSplit::new("amber", "leather"),
            ],
            &[BlendWeights::EVEN],
            &mut FirstSelector,
        )
    }

    #[test]
    fn k_nearest_orders_by_distance() {
        let palette = palette();
        let neighbors = k_nearest(&color("#444444"), &palette, 3).unwrap();
        let indices: Vec<usize> = neighbors.iter().map(|n| n.index).collect();
        assert_eq!(indices, [4, 2, 0]);
        assert!(neighbors.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn k_nearest_ties_keep_candidate_order() {
        let twins = [color("#123456"), color("#abcdef"), color("#123456")];
        let neighbors = k_nearest(&color("#123456"), &twins, 3).unwrap();
        let indices: Vec<usize> = neighbors.iter().map(|n| n.index).collect();
        assert_eq!(indices, [0, 2, 1]);
    }

    #[test]
    fn k_nearest_smaller_k_is_prefix() {
        let palette = palette();
        let target = color("#a01010");
        let all = k_nearest(&target, &palette, 10).unwrap();
        let two = k_nearest(&target, &palette, 2).unwrap();
        assert_eq!(all.len(), palette.len());
        let prefix: Vec<usize> = all.iter().take(2).map(|n| n.index).collect();
        let head: Vec<usize> = two.iter().map(|n| n.index).collect();
        assert_eq!(prefix, head);
    }

    #[test]
    fn k_zero_is_invalid() {
        assert!(matches!(
            k_nearest(&Color::BLACK, &palette(), 0),
            Err(CoreError::InvalidArgument { .. })
        ));
        let memory = RecentNameMemory::default();
        assert!(name_color(&Color::BLACK, &table(), 0, &memory).is_err());
    }

    #[test]
    fn exact_match_is_nearest_at_distance_zero() {
        let table = table();
        let target = table.entries()[1].color;
        let named = name_color(&target, &table, 1, &RecentNameMemory::default()).unwrap();
        assert_eq!(named[0].name, "tan leather");
        assert_eq!(named[0].distance, 0.0);
    }

    #[test]
    fn rejected_names_are_skipped_not_counted() {
        let table = table();
        let target = table.entries()[0].color;
        let mut memory = RecentNameMemory::default();
        memory.remember("amber dawn");

        let named = name_color(&target, &table, 4, &memory).unwrap();
        let names: Vec<&str> = named.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names.len(), 2);
        assert!(names.iter().all(|name| !name.contains("amber")));
        assert!(named.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn one_split_at_several_ratios_fills_one_slot() {
        let table = blend_all_splits(
            &Catalog::build(
                &[
                    StereotypeRow::new("amber", "orange", "#ffbf00"),
                    StereotypeRow::new("bunny", "white", "#f4efe8"),
                ],
                &[],
            )
            .unwrap(),
            &[UnigramSplit::new("amber", "bunny")],
            &BlendWeights::from_ratios(&DEFAULT_BLEND_RATIOS).unwrap(),
            &mut FirstSelector,
        );
        assert_eq!(table.len(), 3);

        let target = Color::parse("#ffbf00").unwrap();
        let named = name_color(&target, &table, 3, &RecentNameMemory::default()).unwrap();
        assert_eq!(named.len(), 1);
        assert_eq!(named[0].name, "amber bunny");
        let nearest = k_nearest(&target, table.entries(), 1).unwrap();
        assert_eq!(named[0].distance, nearest[0].distance);
    }

    #[test]
    fn everything_rejected_yields_empty_result() {
        let table = table();
        let memory = RecentNameMemory::from_names(
            15,
            ["amber bunny", "tan leather", "moss frog"],
        )
        .unwrap();
        let named = name_color(&Color::BLACK, &table, 3, &memory).unwrap();
        assert!(named.is_empty());
    }

    #[test]
    fn closest_picks_single_nearest() {
        let palette = palette();
        let best = closest(&color("#fe0101"), &palette).unwrap();
        assert_eq!(*best.item, color("#ff0000"));
        assert_eq!(best.index, 3);
    }

    #[test]
    fn closest_of_nothing_is_invalid() {
        let empty: [Color; 0] = [];
        assert!(matches!(
            closest(&Color::BLACK, &empty),
            Err(CoreError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn catalog_entries_are_candidates_too() {
        let catalog = Catalog::build(
            &[
                StereotypeRow::new("aubergine", "purple", "#370028"),
                StereotypeRow::new("acid", "green", "#b0bf1a"),
            ],
            &[],
        )
        .unwrap();
        let best = closest(&color("#3a0030"), catalog.entries()).unwrap();
        assert_eq!(best.item.stereotype, "aubergine");
    }

    #[test]
    fn acceptance_policy_cutoff_is_inclusive() {
        let policy = AcceptancePolicy::new(Some(10.0));
        assert!(policy.accepts(10.0));
        assert!(!policy.accepts(10.5));
        assert!(AcceptancePolicy::unbounded().accepts(f64::MAX));
        assert_eq!(AcceptancePolicy::default().max_distance, Some(DEFAULT_MAX_DISTANCE));

        let named = vec![
            NamedColor {
                name: "near".into(),
                color: Color::BLACK,
                distance: 3.0,
            },
            NamedColor {
                name: "far".into(),
                color: Color::BLACK,
                distance: 30.0,
            },
        ];
        let kept = policy.apply(named);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "near");
    }
}
