//! Subscriber setup for the binary. The libraries only emit events.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparseable.
pub const DEFAULT_FILTER: &str = "warn";

/// Set to `1`, `true` or `yes` for JSON log lines.
pub const LOG_JSON_ENV: &str = "TINTBOT_LOG_JSON";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_flag(std::env::var(LOG_JSON_ENV).ok().as_deref())
    }

    #[must_use]
    pub fn from_flag(value: Option<&str>) -> Self {
        let json = value
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        if json { Self::Json } else { Self::Text }
    }
}

/// Install the global subscriber, writing to stderr.
///
/// Does nothing if a subscriber is already installed.
pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
}
