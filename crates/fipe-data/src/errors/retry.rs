/// Classification for retry policy.
///
/// Used by the retry client to decide whether another attempt is made
/// and how long to wait before it.
///
/// # Behavior Summary
///
/// | Class | Retry? | Delay before attempt *i + 1* |
/// |-------|--------|------------------------------|
/// | `Never` | No | - |
/// | `Network` | Yes | `base_delay × (i + 1)` |
/// | `Status` | Yes | `base_delay × (i + 2)` |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry - terminal HTTP status, malformed payload, or empty data.
    /// Retrying the same URL won't produce a different answer.
    Never,

    /// No response arrived (connection failure or per-attempt timeout).
    Network,

    /// The server answered with a transient status (429, 408, 502, 503, 504).
    /// Waits one step longer than a network failure.
    Status,
}

impl RetryClass {
    /// Backoff multiplier applied to the base delay after failed attempt `attempt`
    /// (0-indexed), or `None` when the class is terminal.
    pub fn backoff_factor(self, attempt: u32) -> Option<u32> {
        match self {
            Self::Never => None,
            Self::Network => Some(attempt + 1),
            Self::Status => Some(attempt + 2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_backoff_is_linear_from_one() {
        assert_eq!(RetryClass::Network.backoff_factor(0), Some(1));
        assert_eq!(RetryClass::Network.backoff_factor(2), Some(3));
    }

    #[test]
    fn test_status_backoff_waits_one_step_longer() {
        assert_eq!(RetryClass::Status.backoff_factor(0), Some(2));
        assert_eq!(RetryClass::Status.backoff_factor(1), Some(3));
    }

    #[test]
    fn test_never_has_no_backoff() {
        assert_eq!(RetryClass::Never.backoff_factor(0), None);
    }
}
