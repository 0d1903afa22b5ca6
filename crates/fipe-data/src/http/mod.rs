//! HTTP retry client.
//!
//! [`fetch_json_with_retry`] performs a GET with a per-attempt timeout and a
//! linear backoff between attempts:
//!
//! - A timeout or a missing response is retried after `base_delay × (i + 1)`.
//! - HTTP 429, 408, 502, 503 and 504 are retried after `base_delay × (i + 2)`.
//! - Any other non-2xx status fails immediately as `http_<status>`.
//! - A 2xx body that is not valid JSON fails immediately as `parse_error`.

mod mock;
mod transport;

pub use mock::{MockCall, MockReply, MockTransport};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport, TransportError};

use std::time::Duration;

use log::{debug, warn};
use serde::de::DeserializeOwned;

use crate::errors::FetchError;

/// Default number of attempts.
const DEFAULT_RETRIES: u32 = 3;

/// Default base backoff delay.
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(350);

/// Default per-attempt timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Retry configuration for one call site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts. Zero behaves like one.
    pub retries: u32,
    /// Unit of the linear backoff.
    pub base_delay: Duration,
    /// Upper bound for a single attempt.
    pub timeout: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, base_delay: Duration, timeout: Duration) -> Self {
        Self {
            retries,
            base_delay,
            timeout,
        }
    }

    pub fn from_millis(retries: u32, base_delay_ms: u64, timeout_ms: u64) -> Self {
        Self::new(
            retries,
            Duration::from_millis(base_delay_ms),
            Duration::from_millis(timeout_ms),
        )
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Fetches `url` and decodes the body as JSON, retrying transient failures.
///
/// After the attempts are exhausted the error carries the most specific
/// information observed: `timeout` if the last attempt timed out, otherwise
/// the last HTTP status seen, otherwise `no_response`.
pub async fn fetch_json_with_retry<T: DeserializeOwned>(
    transport: &dyn HttpTransport,
    url: &str,
    policy: &RetryPolicy,
) -> Result<T, FetchError> {
    let attempts = policy.retries.max(1);
    let mut last_status: Option<u16> = None;

    for attempt in 0..attempts {
        let error = match tokio::time::timeout(policy.timeout, transport.get(url)).await {
            Ok(Ok(response)) => {
                last_status = Some(response.status);

                if response.is_success() {
                    return serde_json::from_slice(&response.body)
                        .map_err(|e| FetchError::ParseError(e.to_string()));
                }

                FetchError::Http {
                    status: response.status,
                }
            }
            Ok(Err(TransportError::Timeout)) | Err(_) => FetchError::Timeout,
            Ok(Err(TransportError::Network(message))) => {
                debug!("No response from {}: {}", url, message);
                FetchError::NoResponse
            }
        };

        let is_last = attempt + 1 == attempts;
        match error.retry_class().backoff_factor(attempt) {
            Some(factor) if !is_last => {
                let delay = policy.base_delay * factor;
                warn!(
                    "Attempt {}/{} for {} failed with {}, retrying in {:?}",
                    attempt + 1,
                    attempts,
                    url,
                    error.code(),
                    delay
                );
                tokio::time::sleep(delay).await;
            }
            _ => return Err(exhausted(error, last_status)),
        }
    }

    Err(exhausted(FetchError::NoResponse, last_status))
}

fn exhausted(error: FetchError, last_status: Option<u16>) -> FetchError {
    match (error, last_status) {
        (FetchError::NoResponse, Some(status)) => FetchError::Http { status },
        (error, _) => error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tokio::time::Instant;

    const URL: &str = "https://fipe.test/v1/carros/marcas";

    fn policy(retries: u32) -> RetryPolicy {
        RetryPolicy::from_millis(retries, 100, 1_000)
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt() {
        let transport = MockTransport::new();
        transport.on(URL, MockReply::ok(json!([{"codigo": "59", "nome": "VW"}])));

        let value: Value = fetch_json_with_retry(&transport, URL, &policy(3))
            .await
            .unwrap();

        assert_eq!(value[0]["codigo"], "59");
        assert_eq!(transport.calls_to(URL), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_status_is_not_retried() {
        for status in [400, 404, 500] {
            let transport = MockTransport::new();
            transport.on(URL, MockReply::status(status));

            let result: Result<Value, _> = fetch_json_with_retry(&transport, URL, &policy(3)).await;

            assert_eq!(result.unwrap_err(), FetchError::Http { status });
            assert_eq!(transport.calls_to(URL), 1, "status {}", status);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retryable_status_exhausts_attempts_with_status_backoff() {
        let transport = MockTransport::new();
        transport.on(URL, MockReply::status(503));

        let result: Result<Value, _> = fetch_json_with_retry(&transport, URL, &policy(3)).await;

        assert_eq!(result.unwrap_err(), FetchError::Http { status: 503 });
        let instants = transport.call_instants(URL);
        assert_eq!(instants.len(), 3);
        // base × (i + 2): 200ms after the first, 300ms after the second
        assert!(instants[1] - instants[0] >= Duration::from_millis(200));
        assert!(instants[2] - instants[1] >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_failure_uses_shorter_backoff() {
        let transport = MockTransport::new();
        transport.on(URL, MockReply::NetworkError);

        let result: Result<Value, _> = fetch_json_with_retry(&transport, URL, &policy(3)).await;

        assert_eq!(result.unwrap_err(), FetchError::NoResponse);
        let instants = transport.call_instants(URL);
        assert_eq!(instants.len(), 3);
        assert!(instants[1] - instants[0] >= Duration::from_millis(100));
        assert!(instants[2] - instants[1] >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_status() {
        let transport = MockTransport::new();
        transport.push(URL, MockReply::status(429));
        transport.on(URL, MockReply::ok(json!({"ok": true})));

        let value: Value = fetch_json_with_retry(&transport, URL, &policy(3))
            .await
            .unwrap();

        assert_eq!(value["ok"], true);
        assert_eq!(transport.calls_to(URL), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_cancels_attempt_and_is_reported() {
        let transport = MockTransport::new();
        transport.on(
            URL,
            MockReply::ok(json!([])).delayed(Duration::from_secs(30)),
        );

        let started = Instant::now();
        let result: Result<Value, _> = fetch_json_with_retry(&transport, URL, &policy(2)).await;

        assert_eq!(result.unwrap_err(), FetchError::Timeout);
        assert_eq!(transport.calls_to(URL), 2);
        // two 1s timeouts plus one 100ms backoff, nowhere near the 30s reply
        assert!(Instant::now() - started < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_parse_error_is_not_retried() {
        let transport = MockTransport::new();
        transport.on(URL, MockReply::garbage());

        let result: Result<Value, _> = fetch_json_with_retry(&transport, URL, &policy(3)).await;

        assert_eq!(result.unwrap_err().code(), "parse_error");
        assert_eq!(transport.calls_to(URL), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_failure_after_status_reports_last_status() {
        let transport = MockTransport::new();
        transport.push(URL, MockReply::status(502));
        transport.on(URL, MockReply::NetworkError);

        let result: Result<Value, _> = fetch_json_with_retry(&transport, URL, &policy(2)).await;

        assert_eq!(result.unwrap_err(), FetchError::Http { status: 502 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_still_makes_one_attempt() {
        let transport = MockTransport::new();
        transport.on(URL, MockReply::status(503));

        let result: Result<Value, _> = fetch_json_with_retry(&transport, URL, &policy(0)).await;

        assert!(result.is_err());
        assert_eq!(transport.calls_to(URL), 1);
    }
}
