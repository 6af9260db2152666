//! Vehicles requesting a spot.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Vehicle category. Determines which spot sizes a vehicle may occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    Motorcycle,
    Car,
    Bus,
    Truck,
}

impl VehicleType {
    pub fn all() -> [VehicleType; 4] {
        [Self::Motorcycle, Self::Car, Self::Bus, Self::Truck]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Motorcycle => "motorcycle",
            Self::Car => "car",
            Self::Bus => "bus",
            Self::Truck => "truck",
        }
    }
}

impl std::fmt::Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable vehicle, identified by its license number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vehicle {
    license_number: String,
    vehicle_type: VehicleType,
}

impl Vehicle {
    pub fn new(
        license_number: impl Into<String>,
        vehicle_type: VehicleType,
    ) -> Result<Self, ValidationError> {
        let license_number = license_number.into();
        if license_number.trim().is_empty() {
            return Err(ValidationError::EmptyLicense);
        }
        Ok(Self {
            license_number,
            vehicle_type,
        })
    }

    pub fn license_number(&self) -> &str {
        &self.license_number
    }

    pub fn vehicle_type(&self) -> VehicleType {
        self.vehicle_type
    }
}
