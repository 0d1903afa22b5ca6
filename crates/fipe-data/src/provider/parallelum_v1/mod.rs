//! Parallelum FIPE API v1 provider.
//!
//! The primary provider. Paths and fields are in Portuguese.
//!
//! # API Endpoints
//!
//! - Brands: `{base}/{tipo}/marcas`
//! - Models: `{base}/{tipo}/marcas/{marca}/modelos`
//! - Years: `{base}/{tipo}/marcas/{marca}/modelos/{modelo}/anos`
//! - Price: `{base}/{tipo}/marcas/{marca}/modelos/{modelo}/anos/{ano}`
//!
//! where `tipo` is one of `carros`, `motos`, `caminhoes`.
//!
//! # Response Format
//!
//! Lists are `[{"codigo", "nome"}]`, except models which come wrapped as
//! `{"modelos": [...], "anos": [...]}` with numeric model codes. The price
//! record uses capitalized keys (`Valor`, `Marca`, `AnoModelo`, ...).

use serde::Deserialize;
use serde_json::Value;

use crate::errors::FetchError;
use crate::models::{Brand, Model, PriceResult, Query, ResourceKind, VehicleType, YearOption};
use crate::provider::{
    decode, i32_from_any, non_empty, string_from_any, u64_from_any, u8_from_any, FipeProvider,
};

pub const BASE_URL: &str = "https://parallelum.com.br/fipe/api/v1";
const PROVIDER_ID: &str = "PARALLELUM_V1";

#[derive(Debug, Deserialize)]
struct CodeName {
    #[serde(deserialize_with = "string_from_any")]
    codigo: String,
    nome: String,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    #[serde(deserialize_with = "u64_from_any")]
    codigo: u64,
    nome: String,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    modelos: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PriceResponse {
    valor: String,
    marca: String,
    modelo: String,
    #[serde(deserialize_with = "i32_from_any")]
    ano_modelo: i32,
    combustivel: String,
    codigo_fipe: String,
    mes_referencia: String,
    #[serde(deserialize_with = "u8_from_any")]
    tipo_veiculo: u8,
    sigla_combustivel: String,
}

/// Provider for `parallelum.com.br/fipe/api/v1`.
#[derive(Debug, Clone)]
pub struct ParallelumV1 {
    base_url: String,
}

impl ParallelumV1 {
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
            VehicleType::Car => "carros",
            VehicleType::Motorcycle => "motos",
            VehicleType::Truck => "caminhoes",
        }
    }
}

impl Default for ParallelumV1 {
    fn default() -> Self {
        Self::new()
    }
}

impl FipeProvider for ParallelumV1 {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        1
    }

    fn url(&self, query: &Query) -> String {
        let base = format!(
            "{}/{}/marcas",
            self.base_url,
            Self::segment(query.vehicle_type())
        );
        match query {
            Query::Brands { .. } => base,
            Query::Models { brand, .. } => format!("{}/{}/modelos", base, brand),
            Query::Years { brand, model, .. } => {
                format!("{}/{}/modelos/{}/anos", base, brand, model)
            }
            Query::Price {
                brand, model, year, ..
            } => format!("{}/{}/modelos/{}/anos/{}", base, brand, model, year),
        }
    }

    fn parse_brands(&self, raw: Value) -> Result<Vec<Brand>, FetchError> {
        let entries: Vec<CodeName> = decode(PROVIDER_ID, raw)?;
        non_empty(
            entries
                .into_iter()
                .map(|e| Brand::new(e.codigo, e.nome))
                .collect(),
            ResourceKind::Brands,
        )
    }

    fn parse_models(&self, raw: Value) -> Result<Vec<Model>, FetchError> {
        let response: ModelsResponse = decode(PROVIDER_ID, raw)?;
        non_empty(
            response
                .modelos
                .into_iter()
                .map(|e| Model::new(e.codigo, e.nome))
                .collect(),
            ResourceKind::Models,
        )
    }

    fn parse_years(&self, raw: Value) -> Result<Vec<YearOption>, FetchError> {
        let entries: Vec<CodeName> = decode(PROVIDER_ID, raw)?;
        non_empty(
            entries
                .into_iter()
                .map(|e| YearOption::new(e.codigo, e.nome))
                .collect(),
            ResourceKind::ModelYears,
        )
    }

    fn parse_price(&self, raw: Value) -> Result<PriceResult, FetchError> {
        let response: PriceResponse = decode(PROVIDER_ID, raw)?;
        Ok(PriceResult {
            price: response.valor,
            brand_name: response.marca,
            model_name: response.modelo,
            model_year: response.ano_modelo,
            fuel: response.combustivel,
            fipe_code: response.codigo_fipe,
            reference_month: response.mes_referencia.trim().to_string(),
            vehicle_type_code: response.tipo_veiculo,
            fuel_acronym: response.sigla_combustivel,
        })
    }
}
