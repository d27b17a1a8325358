//! Error type for the few fallible edges of the crate.
//!
//! The widgets themselves are fail-soft: missing elements and missing
//! renderer capabilities degrade silently. Errors only surface where a
//! caller hands us data we cannot interpret (pixel buffers, JSON
//! configuration, selectors) or where a browser API call fails.

use thiserror::Error;

/// Errors produced by `iglow`.
#[derive(Debug, Error)]
pub enum Error {
    /// A flat pixel buffer does not match the declared dimensions.
    #[error("invalid dimensions: expected {expected} values for {width}x{height} RGBA, got {actual}")]
    InvalidDimensions {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    /// A selector could not be parsed.
    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    /// Malformed JSON configuration.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// A host (browser) API call failed.
    #[error("host error: {0}")]
    Host(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn selector(selector: &str, reason: impl Into<String>) -> Self {
        Error::Selector {
            selector: selector.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_dimensions_message() {
        let err = Error::InvalidDimensions {
            width: 2,
            height: 3,
            expected: 24,
            actual: 20,
        };
        assert_eq!(
            err.to_string(),
            "invalid dimensions: expected 24 values for 2x3 RGBA, got 20"
        );
    }

    #[test]
    fn test_config_error_from_json() {
        let json_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        assert!(err.to_string().starts_with("invalid configuration"));
    }
}
