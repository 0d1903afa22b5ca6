//! FIPE provider trait definitions.
//!
//! This module defines the core `FipeProvider` trait that every upstream API
//! version implements.

use serde_json::Value;

use crate::errors::FetchError;
use crate::models::{Brand, Model, PriceResult, Query, YearOption};

/// Trait for FIPE table providers.
///
/// A provider knows two things: how to spell a [`Query`] as a URL in its own
/// path dialect, and how to map its own response schema onto the canonical
/// models. It never performs I/O itself; the registry fetches the URL through
/// the retry client and hands the decoded JSON to the matching parser.
///
/// Parsers must be pure. An empty list is reported as
/// [`FetchError::NoData`] so that failover moves on to the next provider.
///
/// # Example
///
/// ```ignore
/// struct MirrorProvider;
///
/// impl FipeProvider for MirrorProvider {
///     fn id(&self) -> &'static str {
///         "MIRROR"
///     }
///
///     fn url(&self, query: &Query) -> String {
///         // ...
///     }
///
///     // ... implement the four parsers
/// }
/// ```
pub trait FipeProvider: Send + Sync {
    /// Unique identifier for this provider, used for logging.
    fn id(&self) -> &'static str;

    /// Provider priority for ordering.
    ///
    /// Lower values = higher priority. Default is 10.
    fn priority(&self) -> u8 {
        10
    }

    /// Absolute URL for the query.
    fn url(&self, query: &Query) -> String;

    /// Maps a brand list response.
    fn parse_brands(&self, raw: Value) -> Result<Vec<Brand>, FetchError>;

    /// Maps a model list response.
    fn parse_models(&self, raw: Value) -> Result<Vec<Model>, FetchError>;

    /// Maps a model-year list response.
    fn parse_years(&self, raw: Value) -> Result<Vec<YearOption>, FetchError>;

    /// Maps a price record response.
    fn parse_price(&self, raw: Value) -> Result<PriceResult, FetchError>;
}
