use serde::{Deserialize, Serialize};

use super::vehicle::{ModelCode, VehicleType};

/// Kind of resource fetched at each cascade level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    Brands,
    Models,
    ModelYears,
    Result,
}

impl ResourceKind {
    /// Segment used in cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Brands => "brands",
            Self::Models => "models",
            Self::ModelYears => "modelYears",
            Self::Result => "result",
        }
    }

    /// Human label for the data carried by this resource.
    pub fn data_label(&self) -> &'static str {
        match self {
            Self::Brands => "brands",
            Self::Models => "models",
            Self::ModelYears => "years",
            Self::Result => "price",
        }
    }
}

/// One resource request along the selection path.
///
/// Every provider maps a `Query` onto its own URL shape; the cache layer maps
/// it onto a namespaced key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Query {
    Brands {
        vehicle_type: VehicleType,
    },
    Models {
        vehicle_type: VehicleType,
        brand: String,
    },
    Years {
        vehicle_type: VehicleType,
        brand: String,
        model: ModelCode,
    },
    Price {
        vehicle_type: VehicleType,
        brand: String,
        model: ModelCode,
        year: String,
    },
}

impl Query {
    pub fn vehicle_type(&self) -> VehicleType {
        match self {
            Self::Brands { vehicle_type }
            | Self::Models { vehicle_type, .. }
            | Self::Years { vehicle_type, .. }
            | Self::Price { vehicle_type, .. } => *vehicle_type,
        }
    }

    pub fn resource_kind(&self) -> ResourceKind {
        match self {
            Self::Brands { .. } => ResourceKind::Brands,
            Self::Models { .. } => ResourceKind::Models,
            Self::Years { .. } => ResourceKind::ModelYears,
            Self::Price { .. } => ResourceKind::Result,
        }
    }

    /// Selection path below the vehicle type, outermost first.
    pub fn path(&self) -> Vec<String> {
        match self {
            Self::Brands { .. } => Vec::new(),
            Self::Models { brand, .. } => vec![brand.clone()],
            Self::Years { brand, model, .. } => vec![brand.clone(), model.to_string()],
            Self::Price {
                brand, model, year, ..
            } => vec![brand.clone(), model.to_string(), year.clone()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_grows_with_depth() {
        let query = Query::Price {
            vehicle_type: VehicleType::Car,
            brand: "59".to_string(),
            model: 5940,
            year: "2023-1".to_string(),
        };
        assert_eq!(query.path(), vec!["59", "5940", "2023-1"]);
        assert_eq!(query.resource_kind(), ResourceKind::Result);
        assert_eq!(query.vehicle_type(), VehicleType::Car);

        let query = Query::Brands {
            vehicle_type: VehicleType::Truck,
        };
        assert!(query.path().is_empty());
    }
}
