//! Cascade events and the sink that receives them.

use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use fipe_data::PriceResult;

/// One level of the selection cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Brands,
    Models,
    Years,
    Result,
}

impl Level {
    pub(crate) fn index(self) -> usize {
        match self {
            Self::Brands => 0,
            Self::Models => 1,
            Self::Years => 2,
            Self::Result => 3,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Brands => "brands",
            Self::Models => "models",
            Self::Years => "years",
            Self::Result => "price",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Non-fatal notice: the user can keep going.
///
/// Tagged with `kind` so it nests inside a `type`-tagged [`CascadeEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// Providers failed; showing the last cached value.
    CachedData { level: Level, code: String },

    /// Providers and cache failed; showing bundled data.
    FallbackData { level: Level },

    /// A year picked before the model is not offered for that model.
    YearUnavailable { year: String },
}

impl Advisory {
    pub fn message(&self) -> String {
        match self {
            Self::CachedData { level, code } => {
                format!("API unavailable, showing cached {} ({})", level, code)
            }
            Self::FallbackData { level } => {
                format!("API unavailable, showing offline {} (limited data)", level)
            }
            Self::YearUnavailable { year } => {
                format!("Selected year {} is not available for this model", year)
            }
        }
    }
}

/// User-visible failure of one level after the whole degrade chain missed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeError {
    pub level: Level,
    /// Diagnostic code of the underlying failure, e.g. `http_500`.
    pub code: String,
    pub message: String,
}

impl CascadeError {
    pub fn new(level: Level, code: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            level,
            message: format!("Failed to load {} ({}). Please try again.", level, code),
            code,
        }
    }
}

/// Events emitted by the cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CascadeEvent {
    /// The loading flag flipped.
    LoadingChanged { loading: bool },

    Advisory(Advisory),

    Failed(CascadeError),

    ResultReady(PriceResult),
}

/// Trait for receiving cascade events.
///
/// # Design Rules
///
/// - `emit()` must be fast and non-blocking
/// - Failure to emit must not affect the cascade (best-effort)
pub trait CascadeEventSink: Send + Sync {
    fn emit(&self, event: CascadeEvent);
}

/// No-op implementation for contexts that only poll snapshots.
#[derive(Clone, Default)]
pub struct NoOpCascadeEventSink;

impl CascadeEventSink for NoOpCascadeEventSink {
    fn emit(&self, _event: CascadeEvent) {}
}

/// Mock sink for testing - collects emitted events.
#[derive(Clone, Default)]
pub struct MockCascadeEventSink {
    events: Arc<Mutex<Vec<CascadeEvent>>>,
}

impl MockCascadeEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    pub fn events(&self) -> Vec<CascadeEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Collected advisories, in order.
    pub fn advisories(&self) -> Vec<Advisory> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                CascadeEvent::Advisory(a) => Some(a),
                _ => None,
            })
            .collect()
    }

    /// Collected failures, in order.
    pub fn failures(&self) -> Vec<CascadeError> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                CascadeEvent::Failed(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    /// Sequence of loading flag values.
    pub fn loading_transitions(&self) -> Vec<bool> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                CascadeEvent::LoadingChanged { loading } => Some(loading),
                _ => None,
            })
            .collect()
    }

    /// Clears collected events.
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl CascadeEventSink for MockCascadeEventSink {
    fn emit(&self, event: CascadeEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_carries_code() {
        let error = CascadeError::new(Level::Brands, "http_500");
        assert_eq!(error.message, "Failed to load brands (http_500). Please try again.");
    }

    #[test]
    fn test_advisory_messages() {
        let advisory = Advisory::YearUnavailable {
            year: "1975".to_string(),
        };
        assert!(advisory.message().contains("1975"));

        let advisory = Advisory::CachedData {
            level: Level::Years,
            code: "timeout".to_string(),
        };
        assert_eq!(advisory.message(), "API unavailable, showing cached years (timeout)");
    }

    #[test]
    fn test_event_serializes_tagged() {
        let event = CascadeEvent::LoadingChanged { loading: true };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "loading_changed");
        assert_eq!(json["loading"], true);
    }

    #[test]
    fn test_advisory_event_round_trips() {
        let event = CascadeEvent::Advisory(Advisory::FallbackData {
            level: Level::Brands,
        });
        let text = serde_json::to_string(&event).unwrap();
        assert_eq!(
            text,
            r#"{"type":"advisory","kind":"fallback_data","level":"brands"}"#
        );
        assert_eq!(serde_json::from_str::<CascadeEvent>(&text).unwrap(), event);
    }

    #[test]
    fn test_failed_event_round_trips() {
        let event = CascadeEvent::Failed(CascadeError::new(Level::Years, "http_503"));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "failed");
        assert_eq!(json["level"], "years");
        assert_eq!(json["code"], "http_503");

        let back: CascadeEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
