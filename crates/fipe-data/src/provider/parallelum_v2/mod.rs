//! Parallelum FIPE API v2 provider.
//!
//! The secondary provider, tried when v1 is exhausted.
//!
//! # API Endpoints
//!
//! - Brands: `{base}/{type}/brands`
//! - Models: `{base}/{type}/brands/{brand}/models`
//! - Years: `{base}/{type}/brands/{brand}/models/{model}/years`
//! - Price: `{base}/{type}/brands/{brand}/models/{model}/years/{year}`
//!
//! where `type` is one of `cars`, `motorcycles`, `trucks`.
//!
//! # Response Format
//!
//! Lists are bare `[{"code", "name"}]` arrays with string codes, models
//! included. The price record uses camelCase keys (`price`, `codeFipe`,
//! `modelYear`, ...).

use serde::Deserialize;
use serde_json::Value;

use crate::errors::FetchError;
use crate::models::{Brand, Model, PriceResult, Query, ResourceKind, VehicleType, YearOption};
use crate::provider::{
    decode, i32_from_any, non_empty, string_from_any, u64_from_any, u8_from_any, FipeProvider,
};

pub const BASE_URL: &str = "https://parallelum.com.br/fipe/api/v2";
const PROVIDER_ID: &str = "PARALLELUM_V2";

#[derive(Debug, Deserialize)]
struct CodeName {
    #[serde(deserialize_with = "string_from_any")]
    code: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    #[serde(deserialize_with = "u64_from_any")]
    code: u64,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceResponse {
    price: String,
    brand: String,
    model: String,
    #[serde(deserialize_with = "i32_from_any")]
    model_year: i32,
    fuel: String,
    code_fipe: String,
    reference_month: String,
    #[serde(deserialize_with = "u8_from_any")]
    vehicle_type: u8,
    fuel_acronym: String,
}

/// Provider for `parallelum.com.br/fipe/api/v2`.
#[derive(Debug, Clone)]
pub struct ParallelumV2 {
    base_url: String,
}

impl ParallelumV2 {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn segment(vehicle_type: VehicleType) -> &'static str {
        match vehicle_type {
            VehicleType::Car => "cars",
            VehicleType::Motorcycle => "motorcycles",
            VehicleType::Truck => "trucks",
        }
    }
}

impl Default for ParallelumV2 {
    fn default() -> Self {
        Self::new()
    }
}

impl FipeProvider for ParallelumV2 {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        2
    }

    fn url(&self, query: &Query) -> String {
        let base = format!(
            "{}/{}/brands",
            self.base_url,
            Self::segment(query.vehicle_type())
        );
        match query {
            Query::Brands { .. } => base,
            Query::Models { brand, .. } => format!("{}/{}/models", base, brand),
            Query::Years { brand, model, .. } => {
                format!("{}/{}/models/{}/years", base, brand, model)
            }
            Query::Price {
                brand, model, year, ..
            } => format!("{}/{}/models/{}/years/{}", base, brand, model, year),
        }
    }

    fn parse_brands(&self, raw: Value) -> Result<Vec<Brand>, FetchError> {
        let entries: Vec<CodeName> = decode(PROVIDER_ID, raw)?;
        non_empty(
            entries
                .into_iter()
                .map(|e| Brand::new(e.code, e.name))
                .collect(),
            ResourceKind::Brands,
        )
    }

    fn parse_models(&self, raw: Value) -> Result<Vec<Model>, FetchError> {
        let entries: Vec<ModelEntry> = decode(PROVIDER_ID, raw)?;
        non_empty(
            entries
                .into_iter()
                .map(|e| Model::new(e.code, e.name))
                .collect(),
            ResourceKind::Models,
        )
    }

    fn parse_years(&self, raw: Value) -> Result<Vec<YearOption>, FetchError> {
        let entries: Vec<CodeName> = decode(PROVIDER_ID, raw)?;
        non_empty(
            entries
                .into_iter()
                .map(|e| YearOption::new(e.code, e.name))
                .collect(),
            ResourceKind::ModelYears,
        )
    }

    fn parse_price(&self, raw: Value) -> Result<PriceResult, FetchError> {
        let response: PriceResponse = decode(PROVIDER_ID, raw)?;
        Ok(PriceResult {
            price: response.price,
            brand_name: response.brand,
            model_name: response.model,
            model_year: response.model_year,
            fuel: response.fuel,
            fipe_code: response.code_fipe,
            reference_month: response.reference_month.trim().to_string(),
            vehicle_type_code: response.vehicle_type,
            fuel_acronym: response.fuel_acronym,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ParallelumV1;
    use serde_json::json;

    #[test]
    fn test_urls_use_english_segments() {
        let provider = ParallelumV2::with_base_url("https://fipe.test/v2");
        let query = Query::Years {
            vehicle_type: VehicleType::Motorcycle,
            brand: "80".to_string(),
            model: 1234,
        };
        assert_eq!(
            provider.url(&query),
            "https://fipe.test/v2/motorcycles/brands/80/models/1234/years"
        );
    }

    #[test]
    fn test_string_model_codes_become_numeric() {
        let raw = json!([{"code": "5940", "name": "Gol 1.0"}]);
        let models = ParallelumV2::new().parse_models(raw).unwrap();
        assert_eq!(models[0].code, 5940);
    }

    #[test]
    fn test_both_versions_normalize_to_same_price() {
        let v1 = ParallelumV1::new()
            .parse_price(json!({
                "TipoVeiculo": 1,
                "Valor": "R$ 45.800,00",
                "Marca": "VW - VolksWagen",
                "Modelo": "Gol 1.0",
                "AnoModelo": 2023,
                "Combustivel": "Gasolina",
                "CodigoFipe": "005340-6",
                "MesReferencia": "outubro de 2026",
                "SiglaCombustivel": "G"
            }))
            .unwrap();
        let v2 = ParallelumV2::new()
            .parse_price(json!({
                "vehicleType": 1,
                "price": "R$ 45.800,00",
                "brand": "VW - VolksWagen",
                "model": "Gol 1.0",
                "modelYear": "2023",
                "fuel": "Gasolina",
                "codeFipe": "005340-6",
                "referenceMonth": "outubro de 2026",
                "fuelAcronym": "G"
            }))
            .unwrap();
        assert_eq!(v1, v2);
    }

    #[test]
    fn test_parse_years_rejects_empty() {
        let result = ParallelumV2::new().parse_years(json!([]));
        assert_eq!(result.unwrap_err(), FetchError::NoData(ResourceKind::ModelYears));
    }
}
