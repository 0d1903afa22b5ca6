use serde::{Deserialize, Serialize};

/// Canonical price record, the same shape whichever provider answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceResult {
    /// Currency-formatted reference price, e.g. `R$ 45.800,00`.
    pub price: String,
    pub brand_name: String,
    pub model_name: String,
    pub model_year: i32,
    pub fuel: String,
    pub fipe_code: String,
    pub reference_month: String,
    /// Upstream numeric vehicle type (1 car, 2 motorcycle, 3 truck).
    pub vehicle_type_code: u8,
    pub fuel_acronym: String,
}
