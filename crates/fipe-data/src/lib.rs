//! FIPE Data Crate
//!
//! This crate provides provider-agnostic access to the FIPE vehicle reference
//! price table.
//!
//! # Overview
//!
//! The data crate supports:
//! - Three vehicle types: cars, motorcycles, trucks
//! - Two upstream API versions with different schemas (Parallelum v1 and v2)
//! - Per-attempt timeouts with linear backoff between retries
//! - Ordered provider failover with schema normalization
//! - Bundled fallback brand and model lists for offline use
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |   Cascade Layer  | --> |      Query       |  (canonical request)
//! +------------------+     +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          | ProviderRegistry |  (ordered failover)
//!                          +------------------+
//!                                  |
//!                                  v
//!                         +-------------------+
//!                         |  ProviderAttempt  |  (url + schema parser)
//!                         +-------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |   Retry Client   |  (timeout, backoff)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |  HttpTransport   |  (reqwest, mock)
//!                          +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`VehicleType`] - Car, motorcycle or truck
//! - [`Brand`], [`Model`], [`YearOption`] - Cascade entities
//! - [`PriceResult`] - Canonical price record
//! - [`Query`] - One resource request along the selection path
//! - [`FetchError`] - Typed failure with a stable diagnostic code

pub mod errors;
pub mod fallback;
pub mod http;
pub mod models;
pub mod provider;
pub mod registry;

pub use errors::{FetchError, RetryClass};

pub use models::{Brand, Model, ModelCode, PriceResult, Query, ResourceKind, VehicleType, YearOption};

pub use http::{
    fetch_json_with_retry, HttpResponse, HttpTransport, MockReply, MockTransport, ReqwestTransport,
    RetryPolicy, TransportError,
};

pub use provider::{FipeProvider, ParallelumV1, ParallelumV2};

pub use registry::{fetch_from_providers, FetchPolicies, ProviderAttempt, ProviderRegistry, Resolved};

pub use fallback::{fallback_brands, fallback_models};
