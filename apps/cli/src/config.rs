use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use fipe_data::{FetchPolicies, RetryPolicy};

const DEFAULT_CACHE_PATH: &str = ".fipe/cache.json";

/// Runtime configuration, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub cache_path: PathBuf,
    pub v1_base_url: String,
    pub v2_base_url: String,
    pub policies: FetchPolicies,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let cache_path = lookup("FIPE_CACHE_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_PATH));

        let v1_base_url = lookup("FIPE_V1_BASE_URL")
            .unwrap_or_else(|| fipe_data::provider::parallelum_v1::BASE_URL.to_string());
        let v2_base_url = lookup("FIPE_V2_BASE_URL")
            .unwrap_or_else(|| fipe_data::provider::parallelum_v2::BASE_URL.to_string());

        let retries = parse_var::<u32>(&lookup, "FIPE_RETRIES");
        let base_delay = parse_var::<u64>(&lookup, "FIPE_BASE_DELAY_MS").map(Duration::from_millis);
        let timeout = parse_var::<u64>(&lookup, "FIPE_TIMEOUT_MS").map(Duration::from_millis);

        let mut policies = FetchPolicies::default();
        for policy in [
            &mut policies.brands,
            &mut policies.models,
            &mut policies.years,
            &mut policies.price,
        ] {
            apply_overrides(policy, retries, base_delay, timeout);
        }

        Self {
            cache_path,
            v1_base_url,
            v2_base_url,
            policies,
        }
    }
}

fn apply_overrides(
    policy: &mut RetryPolicy,
    retries: Option<u32>,
    base_delay: Option<Duration>,
    timeout: Option<Duration>,
) {
    if let Some(retries) = retries {
        policy.retries = retries;
    }
    if let Some(base_delay) = base_delay {
        policy.base_delay = base_delay;
    }
    if let Some(timeout) = timeout {
        policy.timeout = timeout;
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid {}={:?}, using default", name, raw);
            None
        }
    }
}
