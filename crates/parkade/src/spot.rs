//! A single parking spot and its claim/release transitions.
//!
//! The spot's mutex is the only place occupancy is decided. The atomic
//! `occupied` flag mirrors it for lock-free advisory reads (search, status);
//! a stale "looks free" read is always re-checked by `try_claim`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::vehicle::{Vehicle, VehicleType};

/// Size class of a spot. Ordered smallest first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SpotType {
    Small,
    Medium,
    Large,
}

impl SpotType {
    pub fn all() -> [SpotType; 3] {
        [Self::Small, Self::Medium, Self::Large]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    /// Fixed fit table, ignoring occupancy.
    pub fn accepts(&self, vehicle_type: VehicleType) -> bool {
        match vehicle_type {
            VehicleType::Motorcycle => *self == SpotType::Small,
            VehicleType::Car => matches!(self, SpotType::Small | SpotType::Medium),
            VehicleType::Bus | VehicleType::Truck => *self == SpotType::Large,
        }
    }
}

impl std::fmt::Display for SpotType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct ParkingSpot {
    id: String,
    spot_type: SpotType,
    occupied: AtomicBool,
    parked: Mutex<Option<Vehicle>>,
}

impl ParkingSpot {
    pub fn new(id: impl Into<String>, spot_type: SpotType) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::EmptySpotId);
        }
        Ok(Self {
            id,
            spot_type,
            occupied: AtomicBool::new(false),
            parked: Mutex::new(None),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn spot_type(&self) -> SpotType {
        self.spot_type
    }

    /// Advisory check used by search. False whenever the spot looks taken.
    pub fn can_fit(&self, vehicle_type: VehicleType) -> bool {
        !self.is_occupied() && self.spot_type.accepts(vehicle_type)
    }

    /// Atomically claim the spot for `vehicle`.
    ///
    /// Returns `false` without side effects if someone else holds it.
    pub fn try_claim(&self, vehicle: &Vehicle) -> bool {
        let mut parked = self.lock_state();
        if parked.is_some() {
            return false;
        }
        *parked = Some(vehicle.clone());
        self.occupied.store(true, Ordering::Release);
        true
    }

    /// Free the spot. Releasing a free spot leaves it free.
    pub fn release(&self) {
        let mut parked = self.lock_state();
        *parked = None;
        self.occupied.store(false, Ordering::Release);
    }

    /// Free the spot only if `vehicle` is the one parked in it.
    ///
    /// Returns `false` and leaves the spot untouched otherwise.
    pub fn release_if(&self, vehicle: &Vehicle) -> bool {
        let mut parked = self.lock_state();
        if parked.as_ref() != Some(vehicle) {
            return false;
        }
        *parked = None;
        self.occupied.store(false, Ordering::Release);
        true
    }

    pub fn is_occupied(&self) -> bool {
        self.occupied.load(Ordering::Acquire)
    }

    pub fn parked_vehicle(&self) -> Option<Vehicle> {
        self.lock_state().clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, Option<Vehicle>> {
        match self.parked.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                // The guarded value is a single Option; it is never half-written.
                tracing::error!(spot = %self.id, "Spot mutex poisoned - recovering state");
                poisoned.into_inner()
            }
        }
    }
}
