//! FIPE data models
//!
//! This module contains the canonical data types shared by every provider:
//! - `vehicle` - Vehicle type and the cascade entities (Brand, Model, YearOption)
//! - `price` - The normalized price record (PriceResult)
//! - `query` - Resource requests along the selection path (Query, ResourceKind)

mod price;
mod query;
mod vehicle;

pub use price::PriceResult;
pub use query::{Query, ResourceKind};
pub use vehicle::{has_fuel_code, leading_year, Brand, Model, ModelCode, VehicleType, YearOption};
