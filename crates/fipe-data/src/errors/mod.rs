//! Error types and retry classification for the FIPE data crate.
//!
//! This module provides:
//! - [`FetchError`]: The main error enum for all fetch operations
//! - [`RetryClass`]: Classification for determining retry behavior

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

use crate::models::ResourceKind;

/// HTTP statuses worth another attempt against the same URL.
const RETRYABLE_STATUSES: [u16; 5] = [429, 408, 502, 503, 504];

/// Returns true when a non-2xx status is transient.
pub fn is_retryable_status(status: u16) -> bool {
    RETRYABLE_STATUSES.contains(&status)
}

/// Errors that can occur while fetching FIPE data.
///
/// Every variant maps to a stable diagnostic [`code`](Self::code) that is
/// carried into user-visible error messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The attempt exceeded its timeout and was cancelled.
    #[error("Request timed out")]
    Timeout,

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}")]
    Http {
        /// The status code of the last response
        status: u16,
    },

    /// No response arrived (DNS, connect, TLS, reset).
    #[error("No response from the network")]
    NoResponse,

    /// The body was not valid JSON, or did not match the provider schema.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The response was valid but carried no entries.
    #[error("No {} available", .0.data_label())]
    NoData(ResourceKind),

    /// The selection path does not form a priceable combination.
    #[error("Unavailable combination")]
    UnavailableCombination,

    /// The request was superseded by a newer one for the same level.
    #[error("Request superseded")]
    StaleDiscarded,

    /// Catch-all for failures without structure.
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl FetchError {
    /// Short diagnostic code, e.g. `timeout`, `http_503`, `no_years`.
    pub fn code(&self) -> String {
        match self {
            Self::Timeout => "timeout".to_string(),
            Self::Http { status } => format!("http_{}", status),
            Self::NoResponse => "no_response".to_string(),
            Self::ParseError(_) => "parse_error".to_string(),
            Self::NoData(kind) => format!("no_{}", kind.data_label()),
            Self::UnavailableCombination => "unavailable_combination".to_string(),
            Self::StaleDiscarded => "stale_discarded".to_string(),
            Self::Unknown(_) => "unknown".to_string(),
        }
    }

    /// Returns the retry classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use fipe_data::errors::{FetchError, RetryClass};
    ///
    /// let error = FetchError::Http { status: 503 };
    /// assert_eq!(error.retry_class(), RetryClass::Status);
    ///
    /// let error = FetchError::Http { status: 404 };
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::Timeout | Self::NoResponse => RetryClass::Network,

            Self::Http { status } if is_retryable_status(*status) => RetryClass::Status,

            Self::Http { .. }
            | Self::ParseError(_)
            | Self::NoData(_)
            | Self::UnavailableCombination
            | Self::StaleDiscarded
            | Self::Unknown(_) => RetryClass::Never,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses_retry_with_status_backoff() {
        for status in [429, 408, 502, 503, 504] {
            let error = FetchError::Http { status };
            assert_eq!(error.retry_class(), RetryClass::Status, "status {}", status);
        }
    }

    #[test]
    fn test_other_statuses_are_terminal() {
        for status in [400, 401, 403, 404, 500, 501] {
            let error = FetchError::Http { status };
            assert_eq!(error.retry_class(), RetryClass::Never, "status {}", status);
        }
    }

    #[test]
    fn test_network_failures_retry() {
        assert_eq!(FetchError::Timeout.retry_class(), RetryClass::Network);
        assert_eq!(FetchError::NoResponse.retry_class(), RetryClass::Network);
    }

    #[test]
    fn test_parse_error_never_retries() {
        let error = FetchError::ParseError("expected value".to_string());
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_codes() {
        assert_eq!(FetchError::Timeout.code(), "timeout");
        assert_eq!(FetchError::Http { status: 429 }.code(), "http_429");
        assert_eq!(FetchError::NoResponse.code(), "no_response");
        assert_eq!(FetchError::ParseError("x".into()).code(), "parse_error");
        assert_eq!(FetchError::NoData(ResourceKind::ModelYears).code(), "no_years");
        assert_eq!(FetchError::StaleDiscarded.code(), "stale_discarded");
        assert_eq!(FetchError::Unknown("boom".into()).code(), "unknown");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(format!("{}", FetchError::Http { status: 404 }), "HTTP 404");
        assert_eq!(
            format!("{}", FetchError::NoData(ResourceKind::Brands)),
            "No brands available"
        );
    }
}
