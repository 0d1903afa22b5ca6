//! Bundled brand and model lists.
//!
//! Last-resort data for when both providers and the local cache miss. Codes
//! match the upstream FIPE table so a later online lookup still works with a
//! brand picked from this list. Only the most common brands carry models.

use crate::models::{Brand, Model, ModelCode, VehicleType};

const CAR_BRANDS: &[(&str, &str)] = &[
    ("1", "Acura"),
    ("6", "Audi"),
    ("7", "BMW"),
    ("245", "Caoa Chery"),
    ("13", "Citroën"),
    ("21", "Fiat"),
    ("22", "Ford"),
    ("23", "GM - Chevrolet"),
    ("25", "Honda"),
    ("26", "Hyundai"),
    ("29", "Jeep"),
    ("31", "Kia Motors"),
    ("33", "Land Rover"),
    ("39", "Mercedes-Benz"),
    ("41", "Mitsubishi"),
    ("43", "Nissan"),
    ("44", "Peugeot"),
    ("48", "Renault"),
    ("56", "Toyota"),
    ("58", "Volvo"),
    ("59", "VW - VolksWagen"),
];

const MOTORCYCLE_BRANDS: &[(&str, &str)] = &[
    ("60", "Adly"),
    ("68", "BMW"),
    ("72", "Dafra"),
    ("74", "Ducati"),
    ("77", "Harley-Davidson"),
    ("80", "Honda"),
    ("85", "Kawasaki"),
    ("88", "KTM"),
    ("101", "Suzuki"),
    ("102", "Triumph"),
    ("109", "Yamaha"),
];

const TRUCK_BRANDS: &[(&str, &str)] = &[
    ("102", "Agrale"),
    ("103", "DAF"),
    ("104", "Ford"),
    ("105", "GM - Chevrolet"),
    ("106", "Iveco"),
    ("109", "Mercedes-Benz"),
    ("112", "Scania"),
    ("113", "Volvo"),
    ("114", "VW - VolksWagen"),
];

const VW_MODELS: &[(ModelCode, &str)] = &[
    (5940, "Gol 1.0"),
    (8525, "Polo 1.0 TSI"),
    (8523, "Virtus 1.0 TSI"),
    (8535, "T-Cross 1.0 TSI"),
    (9209, "Nivus 1.0 TSI"),
    (7330, "Saveiro 1.6"),
    (6927, "Amarok 2.0 TDI"),
];

const FIAT_MODELS: &[(ModelCode, &str)] = &[
    (4396, "Uno Mille 1.0"),
    (7541, "Mobi Like 1.0"),
    (8137, "Argo 1.0"),
    (8138, "Cronos 1.3"),
    (7285, "Toro Freedom 1.8"),
    (9318, "Strada Endurance 1.4"),
    (9622, "Pulse Drive 1.3"),
];

const CHEVROLET_MODELS: &[(ModelCode, &str)] = &[
    (7580, "Onix 1.0"),
    (8427, "Onix Plus 1.0 Turbo"),
    (8467, "Tracker 1.0 Turbo"),
    (6380, "S10 2.8 TD"),
    (4735, "Celta 1.0"),
    (5587, "Prisma 1.4"),
];

const FORD_MODELS: &[(ModelCode, &str)] = &[
    (6020, "Ka 1.0"),
    (4916, "Fiesta 1.6"),
    (6564, "EcoSport 1.5"),
    (7062, "Ranger 3.2 TD"),
    (5195, "Focus 2.0"),
];

const HONDA_MODELS: &[(ModelCode, &str)] = &[
    (5393, "Civic 2.0"),
    (5082, "Fit 1.5"),
    (7478, "HR-V 1.8"),
    (7000, "City 1.5"),
];

const TOYOTA_MODELS: &[(ModelCode, &str)] = &[
    (5623, "Corolla 2.0"),
    (6590, "Etios 1.5"),
    (8601, "Yaris 1.5"),
    (5971, "Hilux 2.8 TD"),
    (6232, "SW4 2.8 TD"),
];

const HYUNDAI_MODELS: &[(ModelCode, &str)] = &[
    (6393, "HB20 1.0"),
    (7003, "HB20S 1.6"),
    (7649, "Creta 1.6"),
    (5279, "Tucson 2.0"),
];

const RENAULT_MODELS: &[(ModelCode, &str)] = &[
    (6862, "Kwid 1.0"),
    (5694, "Sandero 1.6"),
    (5687, "Logan 1.6"),
    (6118, "Duster 1.6"),
];

fn to_brands(table: &[(&str, &str)]) -> Vec<Brand> {
    table
        .iter()
        .map(|(code, name)| Brand::new(*code, *name))
        .collect()
}

fn to_models(table: &[(ModelCode, &str)]) -> Vec<Model> {
    table
        .iter()
        .map(|(code, name)| Model::new(*code, *name))
        .collect()
}

/// Bundled brands for a vehicle type.
pub fn fallback_brands(vehicle_type: VehicleType) -> Vec<Brand> {
    match vehicle_type {
        VehicleType::Car => to_brands(CAR_BRANDS),
        VehicleType::Motorcycle => to_brands(MOTORCYCLE_BRANDS),
        VehicleType::Truck => to_brands(TRUCK_BRANDS),
    }
}

/// Bundled models for a car brand, when one is bundled.
pub fn fallback_models(vehicle_type: VehicleType, brand_code: &str) -> Option<Vec<Model>> {
    if vehicle_type != VehicleType::Car {
        return None;
    }
    let table = match brand_code {
        "59" => VW_MODELS,
        "21" => FIAT_MODELS,
        "23" => CHEVROLET_MODELS,
        "22" => FORD_MODELS,
        "25" => HONDA_MODELS,
        "56" => TOYOTA_MODELS,
        "26" => HYUNDAI_MODELS,
        "48" => RENAULT_MODELS,
        _ => return None,
    };
    Some(to_models(table))
}
