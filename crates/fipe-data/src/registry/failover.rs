//! Ordered provider failover.

use log::{debug, info, warn};
use serde_json::Value;

use crate::errors::FetchError;
use crate::http::{fetch_json_with_retry, HttpTransport, RetryPolicy};

/// Pure mapping from a provider's raw schema to a canonical value.
pub type ResponseParser<T> = Box<dyn Fn(Value) -> Result<T, FetchError> + Send + Sync>;

/// One provider's way of answering a query.
pub struct ProviderAttempt<T> {
    pub provider: &'static str,
    pub url: String,
    pub parser: ResponseParser<T>,
}

impl<T> ProviderAttempt<T> {
    pub fn new<F>(provider: &'static str, url: impl Into<String>, parser: F) -> Self
    where
        F: Fn(Value) -> Result<T, FetchError> + Send + Sync + 'static,
    {
        Self {
            provider,
            url: url.into(),
            parser: Box::new(parser),
        }
    }
}

/// A normalized value together with the provider that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub data: T,
    pub provider_used: &'static str,
}

/// Tries each attempt strictly in order.
///
/// Every attempt exhausts its own retry budget before the next provider is
/// tried. The first attempt whose request succeeds and whose parser accepts
/// the payload wins; later providers are not contacted. When all attempts
/// fail, the last error is returned, or `unknown` if there were no attempts.
pub async fn fetch_from_providers<T>(
    transport: &dyn HttpTransport,
    attempts: Vec<ProviderAttempt<T>>,
    policy: &RetryPolicy,
) -> Result<Resolved<T>, FetchError> {
    let mut last_error: Option<FetchError> = None;

    for attempt in attempts {
        debug!("Fetching {} from provider '{}'", attempt.url, attempt.provider);

        let outcome = fetch_json_with_retry::<Value>(transport, &attempt.url, policy)
            .await
            .and_then(|raw| (attempt.parser)(raw));

        match outcome {
            Ok(data) => {
                info!("Provider '{}' answered {}", attempt.provider, attempt.url);
                return Ok(Resolved {
                    data,
                    provider_used: attempt.provider,
                });
            }
            Err(e) => {
                warn!(
                    "Provider '{}' failed with {}, trying next provider",
                    attempt.provider,
                    e.code()
                );
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| FetchError::Unknown("no provider attempts".to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{MockReply, MockTransport};
    use serde_json::json;

    const PRIMARY: &str = "https://fipe.test/v1/x";
    const SECONDARY: &str = "https://fipe.test/v2/x";

    fn count_parser(raw: Value) -> Result<usize, FetchError> {
        raw.as_array()
            .map(|a| a.len())
            .ok_or_else(|| FetchError::ParseError("not an array".to_string()))
    }

    fn attempts() -> Vec<ProviderAttempt<usize>> {
        vec![
            ProviderAttempt::new("PRIMARY", PRIMARY, count_parser),
            ProviderAttempt::new("SECONDARY", SECONDARY, count_parser),
        ]
    }

    fn policy() -> RetryPolicy {
        RetryPolicy::from_millis(3, 10, 1_000)
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_success_wins_and_later_providers_are_skipped() {
        let transport = MockTransport::new();
        transport.on(PRIMARY, MockReply::ok(json!([1, 2])));
        transport.on(SECONDARY, MockReply::ok(json!([1])));

        let resolved = fetch_from_providers(&transport, attempts(), &policy())
            .await
            .unwrap();

        assert_eq!(resolved.data, 2);
        assert_eq!(resolved.provider_used, "PRIMARY");
        assert_eq!(transport.calls_to(SECONDARY), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_primary_exhausts_retries_before_failover() {
        let transport = MockTransport::new();
        transport.on(PRIMARY, MockReply::status(503));
        transport.on(SECONDARY, MockReply::ok(json!([1, 2, 3])));

        let resolved = fetch_from_providers(&transport, attempts(), &policy())
            .await
            .unwrap();

        assert_eq!(resolved.provider_used, "SECONDARY");
        assert_eq!(transport.calls_to(PRIMARY), 3);
        let calls = transport.calls();
        assert!(calls[..3].iter().all(|c| c.url == PRIMARY));
    }

    #[tokio::test(start_paused = true)]
    async fn test_parser_rejection_moves_to_next_provider() {
        let transport = MockTransport::new();
        transport.on(PRIMARY, MockReply::ok(json!({"unexpected": true})));
        transport.on(SECONDARY, MockReply::ok(json!([1])));

        let resolved = fetch_from_providers(&transport, attempts(), &policy())
            .await
            .unwrap();

        assert_eq!(resolved.provider_used, "SECONDARY");
        assert_eq!(transport.calls_to(PRIMARY), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_total_failure_returns_last_error() {
        let transport = MockTransport::new();
        transport.on(PRIMARY, MockReply::status(500));
        transport.on(SECONDARY, MockReply::status(404));

        let error = fetch_from_providers(&transport, attempts(), &policy())
            .await
            .unwrap_err();

        assert_eq!(error, FetchError::Http { status: 404 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_attempts_is_unknown() {
        let transport = MockTransport::new();
        let error = fetch_from_providers::<usize>(&transport, Vec::new(), &policy())
            .await
            .unwrap_err();
        assert_eq!(error.code(), "unknown");
    }

    #[tokio::test(start_paused = true)]
    async fn test_identical_inputs_resolve_identically() {
        let transport = MockTransport::new();
        transport.on(PRIMARY, MockReply::status(502));
        transport.on(SECONDARY, MockReply::ok(json!([7, 8])));

        let first = fetch_from_providers(&transport, attempts(), &policy())
            .await
            .unwrap();
        let second = fetch_from_providers(&transport, attempts(), &policy())
            .await
            .unwrap();

        assert_eq!(first, second);
    }
}
