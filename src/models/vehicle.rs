use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Catalog entry as the application consumes it. `available = false` hides
/// the vehicle from the public listing but never deletes the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price: Decimal,
    pub image: String,
    pub mileage: u32,
    pub fuel_type: FuelType,
    pub transmission: Transmission,
    pub color: String,
    pub description: String,
    pub features: Vec<String>,
    pub available: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FuelType {
    Gasoline,
    Diesel,
    Electric,
    Hybrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transmission {
    Manual,
    Automatic,
}

impl std::str::FromStr for FuelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gasoline" => Ok(FuelType::Gasoline),
            "diesel" => Ok(FuelType::Diesel),
            "electric" => Ok(FuelType::Electric),
            "hybrid" => Ok(FuelType::Hybrid),
            other => Err(format!("unknown fuel type: {}", other)),
        }
    }
}

impl std::str::FromStr for Transmission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "manual" => Ok(Transmission::Manual),
            "automatic" => Ok(Transmission::Automatic),
            other => Err(format!("unknown transmission: {}", other)),
        }
    }
}

impl std::fmt::Display for FuelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FuelType::Gasoline => "Gasoline",
            FuelType::Diesel => "Diesel",
            FuelType::Electric => "Electric",
            FuelType::Hybrid => "Hybrid",
        };
        write!(f, "{}", name)
    }
}

impl std::fmt::Display for Transmission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Transmission::Manual => "Manual",
            Transmission::Automatic => "Automatic",
        };
        write!(f, "{}", name)
    }
}

/// Admin-submitted vehicle data, everything except the server-minted id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDraft {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price: Decimal,
    pub image: String,
    pub mileage: u32,
    pub fuel_type: FuelType,
    pub transmission: Transmission,
    pub color: String,
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    pub available: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VehicleDraftError {
    #[error("price must not be negative")]
    NegativePrice,
    #[error("year {0} is out of range")]
    YearOutOfRange(i32),
    #[error("make and model must not be empty")]
    MissingName,
}

impl VehicleDraft {
    pub fn validate(&self) -> Result<(), VehicleDraftError> {
        if self.price < Decimal::ZERO {
            return Err(VehicleDraftError::NegativePrice);
        }
        if !(1900..=2100).contains(&self.year) {
            return Err(VehicleDraftError::YearOutOfRange(self.year));
        }
        if self.make.trim().is_empty() || self.model.trim().is_empty() {
            return Err(VehicleDraftError::MissingName);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> VehicleDraft {
        VehicleDraft {
            make: "Ferrari".into(),
            model: "488 GTB".into(),
            year: 2023,
            price: Decimal::from(299_000),
            image: "https://example.com/488.jpg".into(),
            mileage: 1200,
            fuel_type: FuelType::Gasoline,
            transmission: Transmission::Automatic,
            color: "Red".into(),
            description: "Twin-turbo V8".into(),
            features: vec!["Carbon brakes".into()],
            available: true,
        }
    }

    #[test]
    fn valid_draft_passes() {
        assert_eq!(draft().validate(), Ok(()));
    }

    #[test]
    fn negative_price_rejected() {
        let mut d = draft();
        d.price = Decimal::from(-1);
        assert_eq!(d.validate(), Err(VehicleDraftError::NegativePrice));
    }

    #[test]
    fn absurd_year_rejected() {
        let mut d = draft();
        d.year = 1066;
        assert_eq!(d.validate(), Err(VehicleDraftError::YearOutOfRange(1066)));
    }

    #[test]
    fn enums_use_display_names_on_the_wire() {
        let v = serde_json::to_value(draft()).unwrap();
        assert_eq!(v["fuelType"], "Gasoline");
        assert_eq!(v["transmission"], "Automatic");
    }
}
