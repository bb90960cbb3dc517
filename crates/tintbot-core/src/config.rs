//! Namer configuration.
//!
//! [`NamerConfig`] has sensible defaults and can be overridden from the
//! environment or from a `key=value` profile:
//!
//! | key | env var | default |
//! |-----|---------|---------|
//! | `recent_capacity` | `TINTBOT_RECENT_CAPACITY` | 15 |
//! | `k` | `TINTBOT_K` | 5 |
//! | `max_distance` | `TINTBOT_MAX_DISTANCE` | 100.0 (`none` disables) |
//! | `blend_ratios` | `TINTBOT_BLEND_RATIOS` | `0.75,0.5,0.25` |
//! | `recent_colors` | `TINTBOT_RECENT_COLORS` | 5 |
//! | `min_color_distance` | `TINTBOT_MIN_COLOR_DISTANCE` | 15.0 |
//! | `strict` | `TINTBOT_STRICT` | false |

use crate::blend::{BlendWeights, DEFAULT_BLEND_RATIOS};
use crate::error::{CoreError, Result};
use crate::namer::{AcceptancePolicy, DEFAULT_MAX_DISTANCE};
use crate::recency::{
    DEFAULT_MIN_COLOR_DISTANCE, DEFAULT_RECENT_CAPACITY, DEFAULT_RECENT_COLORS, RecentColorWindow,
    RecentNameMemory,
};
use crate::store::StoreOptions;

const ENV_PREFIX: &str = "TINTBOT_";

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NamerConfig {
    /// Names remembered by the recency filter.
    pub recent_capacity: usize,
    /// Names requested per target.
    pub k: usize,
    /// Caller-side distance cutoff; `None` accepts everything.
    pub max_distance: Option<f64>,
    /// Head shares used to build the blend table.
    pub blend_ratios: Vec<f64>,
    /// Colors remembered by the color window.
    pub recent_color_capacity: usize,
    pub min_color_distance: f64,
    /// Fail catalog builds on the first bad reference row.
    pub strict: bool,
}

impl Default for NamerConfig {
    fn default() -> Self {
        Self {
            recent_capacity: DEFAULT_RECENT_CAPACITY,
            k: 5,
            max_distance: Some(DEFAULT_MAX_DISTANCE),
            blend_ratios: DEFAULT_BLEND_RATIOS.to_vec(),
            recent_color_capacity: DEFAULT_RECENT_COLORS,
            min_color_distance: DEFAULT_MIN_COLOR_DISTANCE,
            strict: false,
        }
    }
}

impl NamerConfig {
    /// Defaults overridden by `TINTBOT_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] for a value that does not parse
    /// or fails validation.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Like [`NamerConfig::from_env`] over an explicit variable list.
    ///
    /// Variables without the `TINTBOT_` prefix, or with an unknown suffix,
    /// are ignored.
    ///
    /// # Errors
    ///
    /// Same as [`NamerConfig::from_env`].
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (name, value) in vars {
            let Some(key) = name.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let key = key.to_ascii_lowercase();
            if KEYS.contains(&key.as_str()) {
                config.set(&key, value.as_ref())?;
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `key=value` profile text.
    ///
    /// Lines apply in order, so a repeated key keeps its last value. Blank
    /// lines and `#` comments are skipped and values may be wrapped in double
    /// quotes.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] for a line that is not
    /// `key=value`, an unknown key, a value that does not parse, or a result
    /// that fails validation.
    pub fn from_profile_content(content: &str) -> Result<Self> {
        let mut config = Self::default();
        for (number, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line.split_once('=').ok_or_else(|| {
                CoreError::invalid(format!(
                    "profile line {}: expected key=value, got {line:?}",
                    number + 1
                ))
            })?;
            config.set(key.trim(), unquote(value.trim()))?;
        }
        config.validate()?;
        Ok(config)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "recent_capacity" => self.recent_capacity = parse_number(key, value)?,
            "k" => self.k = parse_number(key, value)?,
            "max_distance" => {
                self.max_distance = if value.eq_ignore_ascii_case("none") {
                    None
                } else {
                    Some(parse_number(key, value)?)
                };
            }
            "blend_ratios" => {
                self.blend_ratios = value
                    .split(',')
                    .map(|ratio| parse_number::<f64>(key, ratio))
                    .collect::<Result<_>>()?;
            }
            "recent_colors" => self.recent_color_capacity = parse_number(key, value)?,
            "min_color_distance" => self.min_color_distance = parse_number(key, value)?,
            "strict" => self.strict = parse_bool(value),
            unknown => {
                return Err(CoreError::invalid(format!(
                    "unknown configuration key {unknown:?}"
                )));
            }
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] describing the first invalid
    /// field.
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(CoreError::invalid("k must be at least 1"));
        }
        if self.recent_capacity == 0 {
            return Err(CoreError::invalid("recent_capacity must be at least 1"));
        }
        if self.recent_color_capacity == 0 {
            return Err(CoreError::invalid("recent_colors must be at least 1"));
        }
        if let Some(max) = self.max_distance {
            if max.is_nan() || max < 0.0 {
                return Err(CoreError::invalid(format!(
                    "max_distance must be non-negative, got {max}"
                )));
            }
        }
        if self.min_color_distance.is_nan() || self.min_color_distance < 0.0 {
            return Err(CoreError::invalid(format!(
                "min_color_distance must be non-negative, got {}",
                self.min_color_distance
            )));
        }
        if self.blend_ratios.is_empty() {
            return Err(CoreError::invalid("blend_ratios must not be empty"));
        }
        BlendWeights::from_ratios(&self.blend_ratios)?;
        Ok(())
    }

    #[must_use]
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    #[must_use]
    pub fn with_recent_capacity(mut self, capacity: usize) -> Self {
        self.recent_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_max_distance(mut self, max_distance: Option<f64>) -> Self {
        self.max_distance = max_distance;
        self
    }

    #[must_use]
    pub fn with_blend_ratios(mut self, ratios: impl Into<Vec<f64>>) -> Self {
        self.blend_ratios = ratios.into();
        self
    }

    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// An empty recent-name memory of the configured size.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] for a zero capacity.
    pub fn recent_memory(&self) -> Result<RecentNameMemory> {
        RecentNameMemory::new(self.recent_capacity)
    }

    /// An empty color window of the configured size.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] for a zero capacity or a
    /// negative distance.
    pub fn color_window(&self) -> Result<RecentColorWindow> {
        RecentColorWindow::new(self.recent_color_capacity, self.min_color_distance)
    }

    #[must_use]
    pub fn acceptance_policy(&self) -> AcceptancePolicy {
        AcceptancePolicy::new(self.max_distance)
    }

    #[must_use]
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            blend_ratios: self.blend_ratios.clone(),
            strict: self.strict,
        }
    }
}

const KEYS: [&str; 7] = [
    "recent_capacity",
    "k",
    "max_distance",
    "blend_ratios",
    "recent_colors",
    "min_color_distance",
    "strict",
];

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(value)
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CoreError::invalid(format!("{key}: cannot parse {value:?}")))
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = NamerConfig::default();
        assert_eq!(config.recent_capacity, 15);
        assert_eq!(config.k, 5);
        assert_eq!(config.max_distance, Some(100.0));
        assert_eq!(config.blend_ratios, [0.75, 0.5, 0.25]);
        assert_eq!(config.recent_color_capacity, 5);
        assert_eq!(config.min_color_distance, 15.0);
        assert!(!config.strict);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn env_vars_override_defaults() {
        let config = NamerConfig::from_vars([
            ("TINTBOT_K", "3"),
            ("TINTBOT_MAX_DISTANCE", "none"),
            ("TINTBOT_BLEND_RATIOS", "0.9, 0.1"),
            ("TINTBOT_STRICT", "yes"),
            ("TINTBOT_UNRELATED", "whatever"),
            ("HOME", "/root"),
        ])
        .unwrap();
        assert_eq!(config.k, 3);
        assert_eq!(config.max_distance, None);
        assert_eq!(config.blend_ratios, [0.9, 0.1]);
        assert!(config.strict);
        assert_eq!(config.recent_capacity, 15);
    }

    #[test]
    fn env_var_with_bad_value_is_rejected() {
        let error = NamerConfig::from_vars([("TINTBOT_K", "many")]).unwrap_err();
        assert!(matches!(error, CoreError::InvalidArgument { message } if message.contains("k")));
        assert!(NamerConfig::from_vars([("TINTBOT_K", "0")]).is_err());
        assert!(NamerConfig::from_vars([("TINTBOT_BLEND_RATIOS", "0.5,1.5")]).is_err());
    }

    #[test]
    fn profile_content_overrides_defaults() {
        let config = NamerConfig::from_profile_content(
            r#"
                # muse settings
                recent_capacity=30
                max_distance="42.5"
                recent_colors = 8
                min_color_distance=20
            "#,
        )
        .unwrap();
        assert_eq!(config.recent_capacity, 30);
        assert_eq!(config.max_distance, Some(42.5));
        assert_eq!(config.recent_color_capacity, 8);
        assert_eq!(config.min_color_distance, 20.0);
        assert_eq!(config.k, 5);
    }

    #[test]
    fn profile_unknown_key_is_rejected() {
        let error = NamerConfig::from_profile_content("colour=teal").unwrap_err();
        assert!(matches!(error, CoreError::InvalidArgument { .. }));
    }

    #[test]
    fn profile_line_without_equals_is_rejected() {
        let error = NamerConfig::from_profile_content("# c\nk=3\nnot a pair\n").unwrap_err();
        assert!(matches!(error, CoreError::InvalidArgument { .. }));
        assert!(error.to_string().contains("line 3"), "{error}");
    }

    #[test]
    fn profile_later_lines_win_and_quotes_strip() {
        let config =
            NamerConfig::from_profile_content("k=3\n  # k=9\nblend_ratios=\"0.5, 0.25\"\nk = 7\n")
                .unwrap();
        assert_eq!(config.k, 7);
        assert_eq!(config.blend_ratios, [0.5, 0.25]);
    }

    #[test]
    fn derived_components_follow_config() {
        let config = NamerConfig::default()
            .with_recent_capacity(2)
            .with_max_distance(Some(10.0))
            .with_blend_ratios([0.5])
            .with_strict(true);
        assert_eq!(config.recent_memory().unwrap().capacity(), 2);
        assert!(config.color_window().unwrap().is_empty());
        assert_eq!(config.acceptance_policy().max_distance, Some(10.0));
        let options = config.store_options();
        assert_eq!(options.blend_ratios, [0.5]);
        assert!(options.strict);
    }
}
