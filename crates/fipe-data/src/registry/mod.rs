//! Provider registry module.
//!
//! This module provides orchestration for FIPE providers, including:
//! - Ordered failover across providers ([`fetch_from_providers`])
//! - Per-resource retry policies ([`FetchPolicies`])
//! - Query-to-attempt construction ([`ProviderRegistry`])

mod failover;
mod registry;

pub use failover::{fetch_from_providers, ProviderAttempt, ResponseParser, Resolved};
pub use registry::{FetchPolicies, ProviderRegistry};
