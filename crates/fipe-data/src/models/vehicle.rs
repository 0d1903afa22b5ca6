use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Model codes are numeric in the FIPE table.
pub type ModelCode = u64;

/// Vehicle category, the root of the selection cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    #[default]
    Car,
    Motorcycle,
    Truck,
}

impl VehicleType {
    pub const ALL: [VehicleType; 3] = [Self::Car, Self::Motorcycle, Self::Truck];

    /// Canonical lowercase name, used in cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Car => "car",
            Self::Motorcycle => "motorcycle",
            Self::Truck => "truck",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "car" | "cars" | "carros" => Ok(Self::Car),
            "motorcycle" | "motorcycles" | "motos" => Ok(Self::Motorcycle),
            "truck" | "trucks" | "caminhoes" => Ok(Self::Truck),
            other => Err(format!("unknown vehicle type: {}", other)),
        }
    }
}

/// A vehicle brand, listed per vehicle type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub code: String,
    pub name: String,
}

impl Brand {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// A model of a brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub code: ModelCode,
    pub name: String,
}

impl Model {
    pub fn new(code: ModelCode, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
        }
    }
}

/// A model year, coded as `YYYY-<fuel>` (e.g. `2023-1`).
///
/// Candidate years synthesized before a model is known carry a bare `YYYY`
/// code instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearOption {
    pub code: String,
    pub name: String,
}

impl YearOption {
    /// Separator between the year and the fuel code.
    pub const FUEL_SEPARATOR: char = '-';

    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }

    /// Leading year digits of the code, if any.
    pub fn year(&self) -> Option<i32> {
        leading_year(&self.code)
    }

    /// Fuel suffix after the separator, if present.
    pub fn fuel_code(&self) -> Option<&str> {
        self.code
            .split_once(Self::FUEL_SEPARATOR)
            .map(|(_, fuel)| fuel)
    }

    /// True when the code carries a fuel suffix, i.e. it came from a model's
    /// year list rather than the candidate list.
    pub fn has_fuel_code(&self) -> bool {
        has_fuel_code(&self.code)
    }

    /// Whether a raw year chosen before the model matches this option.
    pub fn matches_raw_year(&self, raw: &str) -> bool {
        self.code == raw || self.code.starts_with(&format!("{}{}", raw, Self::FUEL_SEPARATOR))
    }
}

/// Parses the leading run of ASCII digits of a year code.
pub fn leading_year(code: &str) -> Option<i32> {
    let digits: String = code.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// True when a year code has the `YYYY-<fuel>` shape.
pub fn has_fuel_code(code: &str) -> bool {
    code.contains(YearOption::FUEL_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_type_from_str_accepts_aliases() {
        assert_eq!("car".parse::<VehicleType>(), Ok(VehicleType::Car));
        assert_eq!("motos".parse::<VehicleType>(), Ok(VehicleType::Motorcycle));
        assert_eq!("Trucks".parse::<VehicleType>(), Ok(VehicleType::Truck));
        assert!("boat".parse::<VehicleType>().is_err());
    }

    #[test]
    fn test_vehicle_type_serializes_lowercase() {
        let json = serde_json::to_string(&VehicleType::Motorcycle).unwrap();
        assert_eq!(json, "\"motorcycle\"");
    }

    #[test]
    fn test_year_option_parts() {
        let year = YearOption::new("2023-1", "2023 Gasolina");
        assert_eq!(year.year(), Some(2023));
        assert_eq!(year.fuel_code(), Some("1"));
        assert!(year.has_fuel_code());

        let bare = YearOption::new("2023", "2023");
        assert_eq!(bare.fuel_code(), None);
        assert!(!bare.has_fuel_code());
    }

    #[test]
    fn test_zero_km_code_parses() {
        let year = YearOption::new("32000-1", "Zero KM");
        assert_eq!(year.year(), Some(32000));
    }

    #[test]
    fn test_matches_raw_year() {
        let year = YearOption::new("2020-1", "2020 Gasolina");
        assert!(year.matches_raw_year("2020"));
        assert!(year.matches_raw_year("2020-1"));
        assert!(!year.matches_raw_year("202"));
        assert!(!year.matches_raw_year("2021"));
    }

    #[test]
    fn test_leading_year_rejects_non_numeric() {
        assert_eq!(leading_year("abc"), None);
        assert_eq!(leading_year(""), None);
    }
}
