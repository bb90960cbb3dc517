use std::path::PathBuf;

use thiserror::Error;
use tintbot_core::{CoreError, FormatError};

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("{}", .0.to_string().trim_end())]
    Usage(#[from] clap::Error),
}

impl CliError {
    /// Process exit code: 2 for bad input, 3 for unknown names, 4 for bad
    /// reference data, 1 for everything else.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Format(_)
            | Self::InvalidArgument { .. }
            | Self::Usage(_)
            | Self::Core(CoreError::Format(_) | CoreError::InvalidArgument { .. }) => 2,
            Self::Core(CoreError::NameNotFound { .. }) => 3,
            Self::Core(CoreError::Data(_)) => 4,
            _ => 1,
        }
    }

    /// The `--json` error envelope printed to stderr.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "status": "error",
            "error": self.to_string(),
            "exit_code": self.exit_code(),
        })
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CliError;
    use tintbot_core::{Color, CoreError};

    #[test]
    fn bad_color_is_a_usage_error() {
        let error: CliError = Color::parse("teal").unwrap_err().into();
        assert_eq!(error.exit_code(), 2);
        assert_eq!(CliError::invalid("k").exit_code(), 2);
    }

    #[test]
    fn core_errors_map_to_distinct_codes() {
        assert_eq!(CliError::from(CoreError::not_found("octarine")).exit_code(), 3);
        assert_eq!(CliError::from(CoreError::invalid("k must be at least 1")).exit_code(), 2);
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(CliError::from(CoreError::io("data/color_map.tsv", io)).exit_code(), 1);
    }

    #[test]
    fn usage_errors_exit_two_with_envelope() {
        let error = CliError::from(clap::Error::raw(
            clap::error::ErrorKind::InvalidValue,
            "bad weights\n",
        ));
        assert_eq!(error.exit_code(), 2);
        let envelope = error.to_json();
        assert_eq!(envelope["status"], "error");
        assert_eq!(envelope["exit_code"], 2);
        assert!(!envelope["error"].as_str().unwrap().ends_with('\n'));
    }

    #[test]
    fn not_found_message_passes_through() {
        let error = CliError::from(CoreError::not_found("octarine"));
        assert_eq!(error.to_string(), "color name not found: octarine");
    }
}
