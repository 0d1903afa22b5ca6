use std::collections::HashMap;
use std::sync::Mutex;

use fipe_data::{ModelCode, VehicleType, YearOption};

type YearKey = (VehicleType, String, ModelCode);

/// Per-session memo of filtered model-year lists.
///
/// Owned by the caller and handed to the cascade, so several cascades (or a
/// test) can share or isolate it explicitly. Unlike the persistent cache it
/// is consulted before the network.
#[derive(Default)]
pub struct SessionYearCache {
    entries: Mutex<HashMap<YearKey, Vec<YearOption>>>,
}

impl SessionYearCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(
        &self,
        vehicle_type: VehicleType,
        brand: &str,
        model: ModelCode,
    ) -> Option<Vec<YearOption>> {
        self.entries
            .lock()
            .ok()?
            .get(&(vehicle_type, brand.to_string(), model))
            .cloned()
    }

    pub fn insert(
        &self,
        vehicle_type: VehicleType,
        brand: &str,
        model: ModelCode,
        years: Vec<YearOption>,
    ) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert((vehicle_type, brand.to_string(), model), years);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}
