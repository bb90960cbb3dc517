use thiserror::Error;

/// A color input that matches none of the accepted encodings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("invalid html color {input:?}: expected #rrggbb")]
    InvalidHtml { input: String },

    #[error("invalid hex color {input:?}: expected 0xrrggbb")]
    InvalidHex { input: String },

    #[error("rgb channel {channel} out of range: {value} (expected 0..=255)")]
    ChannelOutOfRange { channel: char, value: i64 },

    #[error("unrecognized color {input:?}: expected (r, g, b), #rrggbb, or 0xrrggbb")]
    Unrecognized { input: String },
}

impl FormatError {
    #[must_use]
    pub fn unrecognized(input: impl Into<String>) -> Self {
        Self::Unrecognized {
            input: input.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FormatError;

    #[test]
    fn channel_error_names_the_channel() {
        let error = FormatError::ChannelOutOfRange {
            channel: 'g',
            value: 300,
        };
        assert_eq!(
            error.to_string(),
            "rgb channel g out of range: 300 (expected 0..=255)"
        );
    }

    #[test]
    fn unrecognized_constructor_keeps_input() {
        let error = FormatError::unrecognized("teal");
        assert!(matches!(error, FormatError::Unrecognized { input } if input == "teal"));
    }
}
