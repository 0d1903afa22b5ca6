//! Best-effort persistent cache.
//!
//! The cascade writes every successful fetch under a key derived from the
//! resource kind and the full selection path, and reads it back when both
//! providers fail. Stores never surface errors: a storage failure reads as a
//! miss and writes as a no-op. There is no eviction; the last write wins.

mod file;
mod memory;

pub use file::FileCacheStore;
pub use memory::MemoryCacheStore;

use std::fmt;

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use fipe_data::{ModelCode, Query, VehicleType};

/// Namespace shared by every cascade entry.
pub const CACHE_PREFIX: &str = "fipe_cache";

/// Key → JSON mapping that swallows its own failures.
pub trait CacheStore: Send + Sync {
    /// Returns the stored value, or `None` on a miss or any storage failure.
    fn read(&self, key: &str) -> Option<Value>;

    /// Stores the value; failures are logged and ignored.
    fn write(&self, key: &str, value: &Value);
}

/// Reads and decodes a typed value. A value that no longer decodes as `T`
/// counts as a miss.
pub fn read_cache<T: DeserializeOwned>(store: &dyn CacheStore, key: &str) -> Option<T> {
    let value = store.read(key)?;
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            debug!("Ignoring undecodable cache entry '{}': {}", key, e);
            None
        }
    }
}

/// Encodes and stores a typed value.
pub fn write_cache<T: Serialize>(store: &dyn CacheStore, key: &str, value: &T) {
    match serde_json::to_value(value) {
        Ok(encoded) => store.write(key, &encoded),
        Err(e) => debug!("Skipping cache write for '{}': {}", key, e),
    }
}

/// `fipe_cache:<kind>:<vehicleType>[:<brand>[:<model>[:<year>]]]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_query(query: &Query) -> Self {
        let mut parts = vec![
            CACHE_PREFIX.to_string(),
            query.resource_kind().as_str().to_string(),
            query.vehicle_type().as_str().to_string(),
        ];
        parts.extend(query.path());
        Self(parts.join(":"))
    }

    pub fn brands(vehicle_type: VehicleType) -> Self {
        Self::for_query(&Query::Brands { vehicle_type })
    }

    pub fn models(vehicle_type: VehicleType, brand: &str) -> Self {
        Self::for_query(&Query::Models {
            vehicle_type,
            brand: brand.to_string(),
        })
    }

    pub fn model_years(vehicle_type: VehicleType, brand: &str, model: ModelCode) -> Self {
        Self::for_query(&Query::Years {
            vehicle_type,
            brand: brand.to_string(),
            model,
        })
    }

    pub fn result(vehicle_type: VehicleType, brand: &str, model: ModelCode, year: &str) -> Self {
        Self::for_query(&Query::Price {
            vehicle_type,
            brand: brand.to_string(),
            model,
            year: year.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fipe_data::Brand;

    #[test]
    fn test_key_layout() {
        assert_eq!(
            CacheKey::brands(VehicleType::Car).as_str(),
            "fipe_cache:brands:car"
        );
        assert_eq!(
            CacheKey::models(VehicleType::Motorcycle, "80").as_str(),
            "fipe_cache:models:motorcycle:80"
        );
        assert_eq!(
            CacheKey::model_years(VehicleType::Car, "59", 5940).as_str(),
            "fipe_cache:modelYears:car:59:5940"
        );
        assert_eq!(
            CacheKey::result(VehicleType::Truck, "109", 42, "2020-3").as_str(),
            "fipe_cache:result:truck:109:42:2020-3"
        );
    }

    #[test]
    fn test_keys_for_different_paths_never_collide() {
        let a = CacheKey::result(VehicleType::Car, "59", 5940, "2023-1");
        let b = CacheKey::result(VehicleType::Car, "59", 5940, "2023-3");
        let c = CacheKey::result(VehicleType::Motorcycle, "59", 5940, "2023-1");
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert!(a.as_str().starts_with("fipe_cache:result:"));
    }

    #[test]
    fn test_typed_helpers_round_trip_through_store() {
        let store = MemoryCacheStore::new();
        let key = CacheKey::brands(VehicleType::Car);
        write_cache(&store, key.as_str(), &vec![Brand::new("59", "VW")]);

        let read: Option<Vec<Brand>> = read_cache(&store, key.as_str());
        assert_eq!(read, Some(vec![Brand::new("59", "VW")]));
    }

    #[test]
    fn test_undecodable_entry_reads_as_miss() {
        let store = MemoryCacheStore::new();
        store.write("k", &serde_json::json!({"not": "a list"}));

        let read: Option<Vec<Brand>> = read_cache(&store, "k");
        assert!(read.is_none());
    }
}
