//! The in-memory color catalog.
//!
//! A [`Catalog`] indexes reference rows three ways:
//!
//! | index | key | value | cardinality |
//! |-------|-----|-------|-------------|
//! | stereotype | `"acid"` | one color | 1:1 |
//! | base color | `"green"` | many colors | 1:N |
//! | color | `#b0bf1a` | `(stereotype, base_color)` | last row wins |
//!
//! It also holds the frequency-ranked unigrams and the [`UnigramSplit`]s the
//! blend engine turns into names. A catalog is immutable once built; use
//! [`crate::store::CatalogStore`] for reloads.

use std::collections::hash_map::Entry;

use ahash::{AHashMap, AHashSet};
use tintbot_color::{Color, Rgb};

use crate::error::{CoreError, DataError, DataErrorKind, Result};
use crate::resources::{
    BigramRow, COLOR_MAP_FILE, ReferenceData, StereotypeRow, UnigramRow, UnigramSplit,
};

/// One named reference color.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CatalogEntry {
    pub stereotype: String,
    pub base_color: String,
    pub color: Color,
}

/// What happened while a catalog was built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Color rows that made it into the indices.
    pub entries: usize,
    /// Rows rejected, either while reading the datasets or while indexing.
    pub skipped: usize,
    pub unigrams: usize,
    pub splits: usize,
    pub errors: Vec<DataError>,
}

impl BuildSummary {
    /// `true` when no row was rejected.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.skipped == 0
    }
}

/// Immutable index of reference colors and compound-name material.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    by_stereotype: AHashMap<String, Vec<Color>>,
    by_base: AHashMap<String, Vec<Color>>,
    by_color: AHashMap<Rgb, usize>,
    unigrams: Vec<UnigramRow>,
    splits: Vec<UnigramSplit>,
    summary: BuildSummary,
}

impl Catalog {
    /// Build a catalog from color rows and frequency-ranked unigrams.
    ///
    /// Rows with unparseable colors are skipped and counted in
    /// [`Catalog::summary`].
    ///
    /// # Errors
    ///
    /// Never fails in the default tolerant mode; see [`CatalogBuilder::strict`].
    pub fn build(stereotype_rows: &[StereotypeRow], unigram_rows: &[UnigramRow]) -> Result<Self> {
        CatalogBuilder::new().build(stereotype_rows, unigram_rows)
    }

    /// Build from a full [`ReferenceData`] bundle.
    ///
    /// # Errors
    ///
    /// In strict mode, returns the first rejected row as [`CoreError::Data`].
    pub fn from_reference(data: &ReferenceData, strict: bool) -> Result<Self> {
        CatalogBuilder::new()
            .strict(strict)
            .splits(data.splits.clone())
            .bigrams(data.bigrams.clone())
            .prior_errors(data.errors.clone())
            .build(&data.color_map, &data.unigrams)
    }

    /// Colors for a stereotype or, failing that, a base color name.
    ///
    /// Returns `None` when the name is in neither index.
    #[must_use]
    pub fn lookup_by_name(&self, name: &str) -> Option<&[Color]> {
        self.by_stereotype
            .get(name)
            .or_else(|| self.by_base.get(name))
            .map(Vec::as_slice)
    }

    /// `(stereotype, base_color)` for an exact color match.
    #[must_use]
    pub fn lookup_by_color(&self, color: &Color) -> Option<(&str, &str)> {
        let entry = &self.entries[*self.by_color.get(&color.rgb())?];
        Some((entry.stereotype.as_str(), entry.base_color.as_str()))
    }

    /// Whether `name` resolves through [`Catalog::lookup_by_name`].
    #[must_use]
    pub fn contains_name(&self, name: &str) -> bool {
        self.by_stereotype.contains_key(name) || self.by_base.contains_key(name)
    }

    /// Entries in row order.
    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Distinct colors in row order.
    #[must_use]
    pub fn colors(&self) -> Vec<Color> {
        let mut seen = AHashSet::with_capacity(self.entries.len());
        self.entries
            .iter()
            .map(|entry| entry.color)
            .filter(|color| seen.insert(color.rgb()))
            .collect()
    }

    /// Unigrams by descending frequency.
    #[must_use]
    pub fn unigrams(&self) -> &[UnigramRow] {
        &self.unigrams
    }

    /// Splits in blend order.
    #[must_use]
    pub fn splits(&self) -> &[UnigramSplit] {
        &self.splits
    }

    #[must_use]
    pub fn summary(&self) -> &BuildSummary {
        &self.summary
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Split a solid compound into two catalog names.
    ///
    /// Split points are tried left to right; the first one where both halves
    /// resolve wins.
    #[must_use]
    pub fn split_compound(&self, compound: &str) -> Option<UnigramSplit> {
        compound
            .char_indices()
            .skip(1)
            .map(|(at, _)| compound.split_at(at))
            .find(|(w1, w2)| self.contains_name(w1) && self.contains_name(w2))
            .map(|(w1, w2)| UnigramSplit::new(w1, w2))
    }

    /// A repeated stereotype keeps its first color; the row still lands in
    /// the base-color and reverse indices before the error is reported.
    fn insert_row(&mut self, row: &StereotypeRow) -> std::result::Result<(), DataErrorKind> {
        let color = Color::parse(row.color.as_str()).map_err(DataErrorKind::BadColor)?;

        let index = self.entries.len();
        self.by_base
            .entry(row.base_color.clone())
            .or_default()
            .push(color);
        self.by_color.insert(color.rgb(), index);
        self.entries.push(CatalogEntry {
            stereotype: row.stereotype.clone(),
            base_color: row.base_color.clone(),
            color,
        });

        match self.by_stereotype.entry(row.stereotype.clone()) {
            Entry::Occupied(_) => Err(DataErrorKind::DuplicateStereotype {
                stereotype: row.stereotype.clone(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(vec![color]);
                Ok(())
            }
        }
    }
}

/// Options for building a [`Catalog`].
#[derive(Debug, Clone, Default)]
pub struct CatalogBuilder {
    strict: bool,
    splits: Vec<UnigramSplit>,
    bigrams: Vec<BigramRow>,
    prior_errors: Vec<DataError>,
}

impl CatalogBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail on the first bad row instead of skipping it.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Explicit splits, placed ahead of any derived ones.
    #[must_use]
    pub fn splits(mut self, splits: Vec<UnigramSplit>) -> Self {
        self.splits = splits;
        self
    }

    /// Bigrams whose words both resolve become extra splits.
    #[must_use]
    pub fn bigrams(mut self, bigrams: Vec<BigramRow>) -> Self {
        self.bigrams = bigrams;
        self
    }

    /// Errors already found while reading the datasets.
    #[must_use]
    pub fn prior_errors(mut self, errors: Vec<DataError>) -> Self {
        self.prior_errors = errors;
        self
    }

    /// Index the rows.
    ///
    /// # Errors
    ///
    /// In strict mode, returns the first rejected row as [`CoreError::Data`].
    pub fn build(
        self,
        stereotype_rows: &[StereotypeRow],
        unigram_rows: &[UnigramRow],
    ) -> Result<Catalog> {
        let Self {
            strict,
            splits,
            mut bigrams,
            prior_errors,
        } = self;

        if strict {
            if let Some(error) = prior_errors.first() {
                return Err(CoreError::Data(error.clone()));
            }
        }

        let mut catalog = Catalog::default();
        let mut errors = prior_errors;

        for row in stereotype_rows {
            if let Err(kind) = catalog.insert_row(row) {
                let error = DataError::new(COLOR_MAP_FILE, row.line, kind);
                if strict {
                    return Err(CoreError::Data(error));
                }
                if matches!(error.kind, DataErrorKind::DuplicateStereotype { .. }) {
                    tracing::warn!(
                        stereotype = %row.stereotype,
                        line = row.line,
                        "keeping first color for stereotype: {}",
                        error.kind
                    );
                } else {
                    tracing::warn!(
                        stereotype = %row.stereotype,
                        line = row.line,
                        "skipping color row: {}",
                        error.kind
                    );
                }
                errors.push(error);
            }
        }

        let mut unigrams = unigram_rows.to_vec();
        unigrams.sort_by(|a, b| b.frequency.cmp(&a.frequency));
        bigrams.sort_by(|a, b| b.frequency.cmp(&a.frequency));

        let derived = unigrams
            .iter()
            .filter_map(|unigram| catalog.split_compound(&unigram.solid_compound));
        let from_bigrams = bigrams
            .iter()
            .filter(|bigram| catalog.contains_name(&bigram.w1) && catalog.contains_name(&bigram.w2))
            .map(|bigram| UnigramSplit::new(bigram.w1.as_str(), bigram.w2.as_str()));

        let mut seen = AHashSet::new();
        let ordered: Vec<UnigramSplit> = splits
            .into_iter()
            .chain(derived)
            .chain(from_bigrams)
            .filter(|split| seen.insert(split.clone()))
            .collect();

        catalog.summary = BuildSummary {
            entries: catalog.entries.len(),
            skipped: errors.len(),
            unigrams: unigrams.len(),
            splits: ordered.len(),
            errors,
        };
        catalog.unigrams = unigrams;
        catalog.splits = ordered;

        tracing::info!(
            entries = catalog.summary.entries,
            skipped = catalog.summary.skipped,
            unigrams = catalog.summary.unigrams,
            splits = catalog.summary.splits,
            "color catalog built"
        );

        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn rows() -> Vec<StereotypeRow> {
        vec![
            StereotypeRow::new("aubergine", "purple", "#370028"),
            StereotypeRow::new("acid", "green", "#b0bf1a"),
            StereotypeRow::new("absinthe", "green", "#7fdd4c"),
            StereotypeRow::new("amber", "orange", "#ffbf00"),
            StereotypeRow::new("bunny", "white", "#f4efe8"),
        ]
    }

    fn catalog() -> Catalog {
        Catalog::build(&rows(), &[]).unwrap()
    }

    fn html(color: &Color) -> String {
        color.to_html()
    }

    #[test]
    fn stereotype_lookup_returns_single_color() {
        let catalog = catalog();
        let colors = catalog.lookup_by_name("aubergine").unwrap();
        assert_eq!(colors, [Color::parse("#370028").unwrap()]);
    }

    #[test]
    fn base_color_lookup_returns_all_colors() {
        let catalog = catalog();
        let greens: Vec<String> = catalog
            .lookup_by_name("green")
            .unwrap()
            .iter()
            .map(html)
            .collect();
        assert_eq!(greens, ["#b0bf1a", "#7fdd4c"]);
    }

    #[test]
    fn unknown_name_is_none_not_empty() {
        assert!(catalog().lookup_by_name("octarine").is_none());
    }

    #[test]
    fn stereotype_wins_over_base_color() {
        let catalog = Catalog::build(
            &[
                StereotypeRow::new("lime", "green", "#32cd32"),
                StereotypeRow::new("leaf", "lime", "#8db600"),
            ],
            &[],
        )
        .unwrap();
        let colors = catalog.lookup_by_name("lime").unwrap();
        assert_eq!(colors, [Color::parse("#32cd32").unwrap()]);
    }

    #[test]
    fn color_lookup_is_exact() {
        let catalog = catalog();
        let aubergine = Color::parse("#370028").unwrap();
        assert_eq!(
            catalog.lookup_by_color(&aubergine),
            Some(("aubergine", "purple"))
        );
        let nearby = Color::parse("#370029").unwrap();
        assert_eq!(catalog.lookup_by_color(&nearby), None);
    }

    #[test]
    fn shared_color_label_is_last_row() {
        let catalog = Catalog::build(
            &[
                StereotypeRow::new("snow", "white", "#fffafa"),
                StereotypeRow::new("frost", "white", "#FFFAFA"),
            ],
            &[],
        )
        .unwrap();
        let color = Color::parse("#fffafa").unwrap();
        assert_eq!(catalog.lookup_by_color(&color), Some(("frost", "white")));
        assert_eq!(catalog.colors().len(), 1);
    }

    #[test]
    #[traced_test]
    fn bad_color_row_is_skipped_and_counted() {
        let mut rows = rows();
        rows.push(StereotypeRow {
            line: 9,
            ..StereotypeRow::new("smudge", "grey", "#12345")
        });
        let catalog = Catalog::build(&rows, &[]).unwrap();

        assert_eq!(catalog.len(), 5);
        assert!(catalog.lookup_by_name("smudge").is_none());
        let summary = catalog.summary();
        assert_eq!(summary.skipped, 1);
        assert!(!summary.is_clean());
        assert_eq!(summary.errors[0].line, 9);
        assert!(matches!(summary.errors[0].kind, DataErrorKind::BadColor(_)));
        assert!(logs_contain("skipping color row"));
    }

    #[test]
    fn strict_build_fails_on_bad_row() {
        let mut rows = rows();
        rows.push(StereotypeRow::new("smudge", "grey", "not-a-color"));
        let error = CatalogBuilder::new()
            .strict(true)
            .build(&rows, &[])
            .unwrap_err();
        assert!(matches!(
            error,
            CoreError::Data(DataError {
                kind: DataErrorKind::BadColor(_),
                ..
            })
        ));
    }

    #[test]
    fn duplicate_stereotype_keeps_first_color() {
        let mut rows = rows();
        rows.push(StereotypeRow::new("acid", "yellow", "#e8ff2a"));
        let catalog = Catalog::build(&rows, &[]).unwrap();
        let colors = catalog.lookup_by_name("acid").unwrap();
        assert_eq!(colors, [Color::parse("#b0bf1a").unwrap()]);

        let acid_yellow = Color::parse("#e8ff2a").unwrap();
        assert_eq!(catalog.lookup_by_name("yellow").unwrap(), [acid_yellow]);
        assert_eq!(catalog.lookup_by_color(&acid_yellow), Some(("acid", "yellow")));
        assert_eq!(catalog.summary().skipped, 1);
    }

    #[test]
    fn unigrams_sorted_by_descending_frequency() {
        let catalog = Catalog::build(
            &rows(),
            &[
                UnigramRow::new("amberdawn", 300),
                UnigramRow::new("amberbunny", 240),
                UnigramRow::new("acidbunny", 594),
            ],
        )
        .unwrap();
        let order: Vec<&str> = catalog
            .unigrams()
            .iter()
            .map(|u| u.solid_compound.as_str())
            .collect();
        assert_eq!(order, ["acidbunny", "amberdawn", "amberbunny"]);
    }

    #[test]
    fn compounds_split_where_both_halves_resolve() {
        let catalog = catalog();
        assert_eq!(
            catalog.split_compound("amberbunny"),
            Some(UnigramSplit::new("amber", "bunny"))
        );
        assert_eq!(
            catalog.split_compound("greenbunny"),
            Some(UnigramSplit::new("green", "bunny"))
        );
        assert_eq!(catalog.split_compound("amberdawn"), None);
        assert_eq!(catalog.split_compound("a"), None);
    }

    #[test]
    fn split_order_is_explicit_then_unigrams_then_bigrams() {
        let catalog = CatalogBuilder::new()
            .splits(vec![UnigramSplit::new("moss", "frog")])
            .bigrams(vec![
                BigramRow::new("acid", "amber", 10),
                BigramRow::new("tan", "leather", 2282),
                BigramRow::new("amber", "bunny", 5),
            ])
            .build(
                &rows(),
                &[
                    UnigramRow::new("amberbunny", 240),
                    UnigramRow::new("acidbunny", 594),
                ],
            )
            .unwrap();
        let names: Vec<String> = catalog
            .splits()
            .iter()
            .map(UnigramSplit::display_name)
            .collect();
        assert_eq!(
            names,
            ["moss frog", "acid bunny", "amber bunny", "acid amber"]
        );
        assert_eq!(catalog.summary().splits, 4);
    }

    #[test]
    fn from_reference_carries_prior_errors() {
        let data = ReferenceData::from_tsv(
            "stereotype\tcolor\thtml\naubergine\tpurple\t#370028\nbroken\n",
            "solid_compound\tf\n",
            None,
            None,
        );
        let catalog = Catalog::from_reference(&data, false).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.summary().skipped, 1);

        let error = Catalog::from_reference(&data, true).unwrap_err();
        assert!(matches!(error, CoreError::Data(_)));
    }
}
