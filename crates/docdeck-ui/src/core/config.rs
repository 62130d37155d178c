//! Screen configuration: page size and fetch retry envelope.

use crate::core::fetch::RetryPolicy;
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::time::Duration;
use thiserror::Error;

/// Message shown when the collection cannot be fetched after all retries.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Failed to fetch documents. Please try again later.";

/// Default rows per page.
pub const DEFAULT_PAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(size) => size,
    None => NonZeroUsize::MIN,
};

const MAX_DELAY_MS: u64 = 60_000;
const MAX_RETRIES: u32 = 20;

/// Validated configuration for a documents screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewConfig {
    /// Rows per page.
    pub page_size: NonZeroUsize,
    /// Retry envelope for collection fetches.
    pub retry: RetryPolicy,
    /// Message surfaced when retries are exhausted.
    pub failure_message: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            retry: RetryPolicy::default(),
            failure_message: DEFAULT_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Raw, partially specified configuration as read from JSON or flags.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ViewConfigDocument {
    /// Rows per page.
    pub page_size: Option<usize>,
    /// Retries after the first attempt.
    pub max_retries: Option<u32>,
    /// Delay between attempts in milliseconds.
    pub retry_delay_ms: Option<u64>,
    /// Fade-in delay in milliseconds.
    pub transition_delay_ms: Option<u64>,
    /// Override for the exhausted-retries message.
    pub failure_message: Option<String>,
}

impl ViewConfigDocument {
    /// Parse a JSON document without validating values.
    ///
    /// # Errors
    ///
    /// Returns [`ViewConfigError::Parse`] for malformed JSON or unknown fields.
    pub fn from_json_str(raw: &str) -> Result<Self, ViewConfigError> {
        serde_json::from_str(raw).map_err(|source| ViewConfigError::Parse { source })
    }

    /// Fields set in `overrides` win over fields set in `self`.
    #[must_use]
    pub fn overlay(self, overrides: Self) -> Self {
        Self {
            page_size: overrides.page_size.or(self.page_size),
            max_retries: overrides.max_retries.or(self.max_retries),
            retry_delay_ms: overrides.retry_delay_ms.or(self.retry_delay_ms),
            transition_delay_ms: overrides.transition_delay_ms.or(self.transition_delay_ms),
            failure_message: overrides.failure_message.or(self.failure_message),
        }
    }
}

/// Rejected configuration values.
#[derive(Debug, Error)]
pub enum ViewConfigError {
    /// A field held an unusable value.
    #[error("invalid value for '{field}': {message}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// Why the value was rejected.
        message: String,
    },
    /// The document was not valid JSON for this shape.
    #[error("failed to parse view configuration")]
    Parse {
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

impl ViewConfig {
    /// Parse and validate a JSON document; missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ViewConfigError::Parse`] for malformed JSON or unknown fields and
    /// [`ViewConfigError::InvalidField`] for out-of-range values.
    pub fn from_json_str(raw: &str) -> Result<Self, ViewConfigError> {
        Self::from_document(ViewConfigDocument::from_json_str(raw)?)
    }

    /// Overlay `document` on the defaults and validate the result.
    ///
    /// # Errors
    ///
    /// Returns [`ViewConfigError::InvalidField`] for out-of-range values.
    pub fn from_document(document: ViewConfigDocument) -> Result<Self, ViewConfigError> {
        let defaults = Self::default();

        let page_size = match document.page_size {
            None => defaults.page_size,
            Some(size) => NonZeroUsize::new(size)
                .ok_or_else(|| invalid("page_size", "must be greater than 0"))?,
        };

        let max_retries = document.max_retries.unwrap_or(defaults.retry.max_retries);
        if max_retries > MAX_RETRIES {
            return Err(invalid(
                "max_retries",
                format!("must be at most {MAX_RETRIES}"),
            ));
        }

        let retry_delay = parse_delay(
            "retry_delay_ms",
            document.retry_delay_ms,
            defaults.retry.retry_delay,
        )?;
        let transition_delay = parse_delay(
            "transition_delay_ms",
            document.transition_delay_ms,
            defaults.retry.transition_delay,
        )?;

        let failure_message = match document.failure_message {
            Some(message) if message.trim().is_empty() => {
                return Err(invalid("failure_message", "must not be empty"));
            }
            Some(message) => message,
            None => defaults.failure_message,
        };

        Ok(Self {
            page_size,
            retry: RetryPolicy {
                max_retries,
                retry_delay,
                transition_delay,
            },
            failure_message,
        })
    }
}

fn parse_delay(
    field: &'static str,
    value: Option<u64>,
    default: Duration,
) -> Result<Duration, ViewConfigError> {
    match value {
        None => Ok(default),
        Some(ms) if ms > MAX_DELAY_MS => Err(invalid(
            field,
            format!("must be at most {MAX_DELAY_MS} ms"),
        )),
        Some(ms) => Ok(Duration::from_millis(ms)),
    }
}

fn invalid(field: &'static str, message: impl Into<String>) -> ViewConfigError {
    ViewConfigError::InvalidField {
        field,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() -> Result<(), ViewConfigError> {
        let config = ViewConfig::from_json_str("{}")?;
        assert_eq!(config, ViewConfig::default());
        assert_eq!(config.page_size.get(), 10);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.retry_delay, Duration::from_secs(2));
        assert_eq!(config.retry.transition_delay, Duration::from_millis(500));
        Ok(())
    }

    #[test]
    fn overrides_are_applied() -> Result<(), ViewConfigError> {
        let config = ViewConfig::from_json_str(
            r#"{"page_size": 25, "max_retries": 0, "retry_delay_ms": 100, "failure_message": "down"}"#,
        )?;
        assert_eq!(config.page_size.get(), 25);
        assert_eq!(config.retry.max_retries, 0);
        assert_eq!(config.retry.retry_delay, Duration::from_millis(100));
        assert_eq!(config.failure_message, "down");
        Ok(())
    }

    #[test]
    fn invalid_values_name_the_field() {
        let cases = [
            (r#"{"page_size": 0}"#, "page_size"),
            (r#"{"max_retries": 99}"#, "max_retries"),
            (r#"{"retry_delay_ms": 600000}"#, "retry_delay_ms"),
            (r#"{"failure_message": "  "}"#, "failure_message"),
        ];
        for (raw, expected) in cases {
            match ViewConfig::from_json_str(raw) {
                Err(ViewConfigError::InvalidField { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected invalid field for {raw}, got {other:?}"),
            }
        }
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(matches!(
            ViewConfig::from_json_str(r#"{"pageSize": 5}"#),
            Err(ViewConfigError::Parse { .. })
        ));
    }

    #[test]
    fn overlay_prefers_overrides() -> Result<(), ViewConfigError> {
        let file = ViewConfigDocument::from_json_str(r#"{"page_size": 5, "max_retries": 1}"#)?;
        let flags = ViewConfigDocument {
            max_retries: Some(0),
            ..ViewConfigDocument::default()
        };
        let merged = file.overlay(flags);
        assert_eq!(merged.page_size, Some(5));
        assert_eq!(merged.max_retries, Some(0));
        assert_eq!(merged.retry_delay_ms, None);
        Ok(())
    }
}
