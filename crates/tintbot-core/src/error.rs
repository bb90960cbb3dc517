use std::path::PathBuf;

use thiserror::Error;
use tintbot_color::FormatError;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("color name not found: {name}")]
    NameNotFound { name: String },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CoreError {
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NameNotFound { name: name.into() }
    }

    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// A reference-data row that could not be turned into catalog entities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{origin}:{line}: {kind}")]
pub struct DataError {
    /// File name or other label of the dataset.
    pub origin: String,
    /// 1-based line number within the dataset.
    pub line: usize,
    pub kind: DataErrorKind,
}

impl DataError {
    #[must_use]
    pub fn new(origin: impl Into<String>, line: usize, kind: DataErrorKind) -> Self {
        Self {
            origin: origin.into(),
            line,
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataErrorKind {
    #[error("unparseable color: {0}")]
    BadColor(#[source] FormatError),

    #[error("unparseable frequency {value:?}")]
    BadFrequency { value: String },

    #[error("expected {expected} tab-separated columns, found {found}")]
    ColumnCount { expected: usize, found: usize },

    #[error("empty {column} field")]
    EmptyField { column: &'static str },

    #[error("stereotype {stereotype:?} already mapped to a color")]
    DuplicateStereotype { stereotype: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_error_reports_origin_and_line() {
        let error = DataError::new(
            "color_map.tsv",
            7,
            DataErrorKind::ColumnCount {
                expected: 3,
                found: 2,
            },
        );
        assert_eq!(
            error.to_string(),
            "color_map.tsv:7: expected 3 tab-separated columns, found 2"
        );
    }

    #[test]
    fn format_error_converts_transparently() {
        let format = FormatError::unrecognized("mauve");
        let message = format.to_string();
        let error: CoreError = format.into();
        assert_eq!(error.to_string(), message);
    }

    #[test]
    fn constructors_build_expected_variants() {
        assert!(matches!(
            CoreError::invalid("k must be at least 1"),
            CoreError::InvalidArgument { message } if message == "k must be at least 1"
        ));
        assert_eq!(
            CoreError::not_found("octarine").to_string(),
            "color name not found: octarine"
        );
    }
}
