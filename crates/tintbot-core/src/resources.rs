//! Reference datasets: tab-separated row formats and where they come from.
//!
//! Every dataset is a text file with one header line (ignored), one record
//! per line, and fields separated by a single tab. Blank lines are skipped;
//! fields are trimmed. Rows that do not fit the format become [`DataError`]s
//! and are reported alongside the rows that did parse.
//!
//! | file | columns |
//! |------|---------|
//! | `color_map.tsv` | stereotype, base_color, html |
//! | `color_unigrams.tsv` | solid_compound, frequency |
//! | `color_unigram_splits.tsv` | w1, w2 (optional) |
//! | `unbracketed_color_bigrams.tsv` | w1, w2, frequency (optional) |

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, DataError, DataErrorKind, Result};

pub const COLOR_MAP_FILE: &str = "color_map.tsv";
pub const UNIGRAMS_FILE: &str = "color_unigrams.tsv";
pub const SPLITS_FILE: &str = "color_unigram_splits.tsv";
pub const BIGRAMS_FILE: &str = "unbracketed_color_bigrams.tsv";

/// One `(stereotype, base_color, color)` row. The color is kept raw and only
/// validated while the catalog is built.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StereotypeRow {
    pub stereotype: String,
    pub base_color: String,
    pub color: String,
    /// 1-based source line, or 0 for rows built in code.
    pub line: usize,
}

impl StereotypeRow {
    pub fn new(
        stereotype: impl Into<String>,
        base_color: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            stereotype: stereotype.into(),
            base_color: base_color.into(),
            color: color.into(),
            line: 0,
        }
    }
}

/// A frequency-ranked solid compound such as `amberbunny`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnigramRow {
    pub solid_compound: String,
    pub frequency: u64,
}

impl UnigramRow {
    pub fn new(solid_compound: impl Into<String>, frequency: u64) -> Self {
        Self {
            solid_compound: solid_compound.into(),
            frequency,
        }
    }
}

/// Two word fragments that together name a color: `("amber", "bunny")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnigramSplit {
    pub w1: String,
    pub w2: String,
}

impl UnigramSplit {
    pub fn new(w1: impl Into<String>, w2: impl Into<String>) -> Self {
        Self {
            w1: w1.into(),
            w2: w2.into(),
        }
    }

    /// `w1 w2`.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.w1, self.w2)
    }
}

/// An unbracketed two-word phrase such as `tan leather`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BigramRow {
    pub w1: String,
    pub w2: String,
    pub frequency: u64,
}

impl BigramRow {
    pub fn new(w1: impl Into<String>, w2: impl Into<String>, frequency: u64) -> Self {
        Self {
            w1: w1.into(),
            w2: w2.into(),
            frequency,
        }
    }
}

/// Rows parsed from one dataset plus the rows that were rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed<T> {
    pub rows: Vec<T>,
    pub errors: Vec<DataError>,
}

impl<T> Default for Parsed<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            errors: Vec::new(),
        }
    }
}

/// Everything a catalog is built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceData {
    pub color_map: Vec<StereotypeRow>,
    pub unigrams: Vec<UnigramRow>,
    pub splits: Vec<UnigramSplit>,
    pub bigrams: Vec<BigramRow>,
    /// Rows rejected before the catalog ever saw them.
    pub errors: Vec<DataError>,
}

impl ReferenceData {
    #[must_use]
    pub fn new(color_map: Vec<StereotypeRow>, unigrams: Vec<UnigramRow>) -> Self {
        Self {
            color_map,
            unigrams,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_splits(mut self, splits: Vec<UnigramSplit>) -> Self {
        self.splits = splits;
        self
    }

    #[must_use]
    pub fn with_bigrams(mut self, bigrams: Vec<BigramRow>) -> Self {
        self.bigrams = bigrams;
        self
    }

    /// Parse all four datasets from in-memory TSV text.
    #[must_use]
    pub fn from_tsv(
        color_map: &str,
        unigrams: &str,
        splits: Option<&str>,
        bigrams: Option<&str>,
    ) -> Self {
        let mut data = Self::default();
        let mut collect = |errors: Vec<DataError>| data_errors_extend(&mut data.errors, errors);

        let parsed = parse_color_map(COLOR_MAP_FILE, color_map);
        collect(parsed.errors);
        let color_map_rows = parsed.rows;

        let parsed = parse_unigrams(UNIGRAMS_FILE, unigrams);
        collect(parsed.errors);
        let unigram_rows = parsed.rows;

        let split_rows = splits.map_or_else(Vec::new, |content| {
            let parsed = parse_splits(SPLITS_FILE, content);
            collect(parsed.errors);
            parsed.rows
        });

        let bigram_rows = bigrams.map_or_else(Vec::new, |content| {
            let parsed = parse_bigrams(BIGRAMS_FILE, content);
            collect(parsed.errors);
            parsed.rows
        });

        data.color_map = color_map_rows;
        data.unigrams = unigram_rows;
        data.splits = split_rows;
        data.bigrams = bigram_rows;
        data
    }
}

fn data_errors_extend(into: &mut Vec<DataError>, errors: Vec<DataError>) {
    for error in &errors {
        tracing::warn!(origin = %error.origin, line = error.line, "skipping reference row: {}", error.kind);
    }
    into.extend(errors);
}

/// Where reference data is loaded from, on startup and on every reload.
pub trait ReferenceSource: Send + Sync {
    /// Load a fresh copy of the reference data.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Io`] when a required dataset cannot be read.
    fn load(&self) -> Result<ReferenceData>;

    /// Human-readable label for logs.
    fn describe(&self) -> String;
}

/// Reference data that already lives in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    data: ReferenceData,
}

impl InMemorySource {
    #[must_use]
    pub fn new(data: ReferenceData) -> Self {
        Self { data }
    }
}

impl ReferenceSource for InMemorySource {
    fn load(&self) -> Result<ReferenceData> {
        Ok(self.data.clone())
    }

    fn describe(&self) -> String {
        format!("in-memory ({} color rows)", self.data.color_map.len())
    }
}

/// Reference data read from a directory of TSV files.
///
/// `color_map.tsv` and `color_unigrams.tsv` are required; the split and
/// bigram files are read when present.
#[derive(Debug, Clone)]
pub struct TsvDirSource {
    dir: PathBuf,
}

impl TsvDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_required(&self, name: &str) -> Result<String> {
        let path = self.dir.join(name);
        fs::read_to_string(&path).map_err(|source| CoreError::io(path, source))
    }

    fn read_optional(&self, name: &str) -> Result<Option<String>> {
        let path = self.dir.join(name);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CoreError::io(path, source)),
        }
    }
}

impl ReferenceSource for TsvDirSource {
    fn load(&self) -> Result<ReferenceData> {
        let color_map = self.read_required(COLOR_MAP_FILE)?;
        let unigrams = self.read_required(UNIGRAMS_FILE)?;
        let splits = self.read_optional(SPLITS_FILE)?;
        let bigrams = self.read_optional(BIGRAMS_FILE)?;
        Ok(ReferenceData::from_tsv(
            &color_map,
            &unigrams,
            splits.as_deref(),
            bigrams.as_deref(),
        ))
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}

/// Parse `stereotype, base_color, html` rows.
#[must_use]
pub fn parse_color_map(origin: &str, content: &str) -> Parsed<StereotypeRow> {
    parse_records(origin, content, 3, |line, fields| {
        let stereotype = required(fields[0], "stereotype")?;
        let base_color = required(fields[1], "base_color")?;
        let color = required(fields[2], "html")?;
        Ok(StereotypeRow {
            stereotype,
            base_color,
            color,
            line,
        })
    })
}

/// Parse `solid_compound, frequency` rows.
#[must_use]
pub fn parse_unigrams(origin: &str, content: &str) -> Parsed<UnigramRow> {
    parse_records(origin, content, 2, |_, fields| {
        Ok(UnigramRow {
            solid_compound: required(fields[0], "solid_compound")?,
            frequency: frequency(fields[1])?,
        })
    })
}

/// Parse `w1, w2` rows.
#[must_use]
pub fn parse_splits(origin: &str, content: &str) -> Parsed<UnigramSplit> {
    parse_records(origin, content, 2, |_, fields| {
        Ok(UnigramSplit {
            w1: required(fields[0], "w1")?,
            w2: required(fields[1], "w2")?,
        })
    })
}

/// Parse `w1, w2, frequency` rows.
#[must_use]
pub fn parse_bigrams(origin: &str, content: &str) -> Parsed<BigramRow> {
    parse_records(origin, content, 3, |_, fields| {
        Ok(BigramRow {
            w1: required(fields[0], "w1")?,
            w2: required(fields[1], "w2")?,
            frequency: frequency(fields[2])?,
        })
    })
}

fn parse_records<T>(
    origin: &str,
    content: &str,
    columns: usize,
    mut row: impl FnMut(usize, &[&str]) -> std::result::Result<T, DataErrorKind>,
) -> Parsed<T> {
    let mut parsed = Parsed::default();

    // Header is line 1.
    for (index, raw_line) in content.lines().enumerate().skip(1) {
        let line_no = index + 1;
        let line = raw_line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
        let result = if fields.len() == columns {
            row(line_no, &fields)
        } else {
            Err(DataErrorKind::ColumnCount {
                expected: columns,
                found: fields.len(),
            })
        };

        match result {
            Ok(value) => parsed.rows.push(value),
            Err(kind) => parsed.errors.push(DataError::new(origin, line_no, kind)),
        }
    }

    parsed
}

fn required(field: &str, column: &'static str) -> std::result::Result<String, DataErrorKind> {
    if field.is_empty() {
        Err(DataErrorKind::EmptyField { column })
    } else {
        Ok(field.to_string())
    }
}

fn frequency(field: &str) -> std::result::Result<u64, DataErrorKind> {
    field.parse().map_err(|_| DataErrorKind::BadFrequency {
        value: field.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLOR_MAP: &str = "stereotype\tcolor\thtml\n\
        acid\tgreen\t#B0BF1A\n\
        absinthe\tgreen\t#7FDD4C\r\n\
        \n\
        acorn\tbrown\n";

    #[test]
    fn color_map_skips_header_and_blank_lines() {
        let parsed = parse_color_map("color_map.tsv", COLOR_MAP);
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0].stereotype, "acid");
        assert_eq!(parsed.rows[0].line, 2);
        assert_eq!(parsed.rows[1].color, "#7FDD4C");
    }

    #[test]
    fn short_row_becomes_column_count_error() {
        let parsed = parse_color_map("color_map.tsv", COLOR_MAP);
        assert_eq!(parsed.errors.len(), 1);
        let error = &parsed.errors[0];
        assert_eq!(error.line, 5);
        assert_eq!(
            error.kind,
            DataErrorKind::ColumnCount {
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn unigram_frequency_must_be_integral() {
        let parsed = parse_unigrams(
            "color_unigrams.tsv",
            "solid_compound\tf\namberbunny\t240\namberdawn\tlots\n",
        );
        assert_eq!(parsed.rows, vec![UnigramRow::new("amberbunny", 240)]);
        assert!(matches!(
            &parsed.errors[0].kind,
            DataErrorKind::BadFrequency { value } if value == "lots"
        ));
    }

    #[test]
    fn empty_field_is_rejected() {
        let parsed = parse_splits("splits", "w1\tw2\namber\t\n");
        assert!(parsed.rows.is_empty());
        assert_eq!(
            parsed.errors[0].kind,
            DataErrorKind::EmptyField { column: "w2" }
        );
    }

    #[test]
    fn header_only_file_is_empty() {
        let parsed = parse_bigrams("bigrams", "w1\tw2\tf");
        assert!(parsed.rows.is_empty());
        assert!(parsed.errors.is_empty());
    }

    #[test]
    fn reference_data_collects_errors_from_every_file() {
        let data = ReferenceData::from_tsv(
            COLOR_MAP,
            "solid_compound\tf\nx\ty\n",
            Some("w1\tw2\namber\tbunny\n"),
            Some("w1\tw2\tf\ntan\tleather\t2282\n"),
        );
        assert_eq!(data.color_map.len(), 2);
        assert_eq!(data.splits, vec![UnigramSplit::new("amber", "bunny")]);
        assert_eq!(data.bigrams, vec![BigramRow::new("tan", "leather", 2282)]);
        assert_eq!(data.errors.len(), 2);
    }

    #[test]
    fn tsv_dir_reads_required_and_optional_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(COLOR_MAP_FILE), COLOR_MAP).unwrap();
        fs::write(dir.path().join(UNIGRAMS_FILE), "solid_compound\tf\n").unwrap();

        let source = TsvDirSource::new(dir.path());
        let data = source.load().unwrap();
        assert_eq!(data.color_map.len(), 2);
        assert!(data.splits.is_empty());
        assert!(data.bigrams.is_empty());
    }

    #[test]
    fn tsv_dir_missing_color_map_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let error = TsvDirSource::new(dir.path()).load().unwrap_err();
        assert!(matches!(
            error,
            CoreError::Io { path, .. } if path.ends_with(COLOR_MAP_FILE)
        ));
    }

    #[test]
    fn split_display_name_joins_with_space() {
        assert_eq!(UnigramSplit::new("amber", "bunny").display_name(), "amber bunny");
    }
}
