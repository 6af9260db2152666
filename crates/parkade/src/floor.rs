//! Floors: spots partitioned by size, gated by a maintenance flag.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

use crate::error::ValidationError;
use crate::lot::LotError;
use crate::spot::{ParkingSpot, SpotType};
use crate::vehicle::VehicleType;

/// Free/total counts for one size class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SpotCounts {
    pub free: usize,
    pub total: usize,
}

/// Point-in-time view of a floor, for display and the status endpoint.
///
/// Counts are read without locking the spots and may be stale under traffic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FloorStatus {
    pub floor_id: String,
    pub under_maintenance: bool,
    pub spots: BTreeMap<SpotType, SpotCounts>,
}

impl FloorStatus {
    pub fn free(&self) -> usize {
        self.spots.values().map(|c| c.free).sum()
    }
}

#[derive(Debug)]
pub struct ParkingFloor {
    id: String,
    spots: BTreeMap<SpotType, Vec<ParkingSpot>>,
    under_maintenance: RwLock<bool>,
}

impl ParkingFloor {
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::EmptyFloorId);
        }
        Ok(Self {
            id,
            spots: BTreeMap::new(),
            under_maintenance: RwLock::new(false),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Add a spot. Configuration time only.
    pub fn add_spot(&mut self, spot: ParkingSpot) -> Result<(), LotError> {
        if self.spot(spot.id()).is_some() {
            return Err(LotError::DuplicateSpot(spot.id().to_string()));
        }
        self.spots.entry(spot.spot_type()).or_default().push(spot);
        Ok(())
    }

    /// First spot that looks free and fits, smallest size class first.
    ///
    /// This is a candidate, not a claim: another caller may take it before
    /// `try_claim` runs.
    pub fn find_available(&self, vehicle_type: VehicleType) -> Option<&ParkingSpot> {
        let maintenance = self.read_flag();
        if *maintenance {
            return None;
        }
        self.spots().find(|spot| spot.can_fit(vehicle_type))
    }

    pub fn set_under_maintenance(&self, status: bool) {
        let mut maintenance = self.write_flag();
        if *maintenance != status {
            tracing::info!(floor = %self.id, under_maintenance = status, "Floor maintenance toggled");
        }
        *maintenance = status;
    }

    pub fn is_under_maintenance(&self) -> bool {
        *self.read_flag()
    }

    /// True iff every spot is occupied. Diagnostics only.
    pub fn is_full(&self) -> bool {
        let _maintenance = self.read_flag();
        self.spots().all(|spot| spot.is_occupied())
    }

    pub fn spot(&self, spot_id: &str) -> Option<&ParkingSpot> {
        self.spots().find(|spot| spot.id() == spot_id)
    }

    pub fn spots(&self) -> impl Iterator<Item = &ParkingSpot> {
        self.spots.values().flatten()
    }

    pub fn status(&self) -> FloorStatus {
        let maintenance = self.read_flag();
        let spots = self
            .spots
            .iter()
            .map(|(spot_type, spots)| {
                let free = spots.iter().filter(|s| !s.is_occupied()).count();
                (
                    *spot_type,
                    SpotCounts {
                        free,
                        total: spots.len(),
                    },
                )
            })
            .collect();

        FloorStatus {
            floor_id: self.id.clone(),
            under_maintenance: *maintenance,
            spots,
        }
    }

    fn read_flag(&self) -> RwLockReadGuard<'_, bool> {
        self.under_maintenance.read().unwrap_or_else(|poisoned| {
            tracing::error!(floor = %self.id, "Maintenance lock poisoned - recovering");
            poisoned.into_inner()
        })
    }

    fn write_flag(&self) -> RwLockWriteGuard<'_, bool> {
        self.under_maintenance.write().unwrap_or_else(|poisoned| {
            tracing::error!(floor = %self.id, "Maintenance lock poisoned - recovering");
            poisoned.into_inner()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::Vehicle;

    fn floor_with(spots: &[(&str, SpotType)]) -> ParkingFloor {
        let mut floor = ParkingFloor::new("F1").unwrap();
        for (id, spot_type) in spots {
            floor
                .add_spot(ParkingSpot::new(*id, *spot_type).unwrap())
                .unwrap();
        }
        floor
    }

    #[test]
    fn empty_floor_id_is_rejected() {
        assert_eq!(
            ParkingFloor::new(" ").unwrap_err(),
            ValidationError::EmptyFloorId
        );
    }

    #[test]
    fn duplicate_spot_is_rejected() {
        let mut floor = floor_with(&[("F1-S1", SpotType::Small)]);
        let err = floor
            .add_spot(ParkingSpot::new("F1-S1", SpotType::Large).unwrap())
            .unwrap_err();
        assert_eq!(err, LotError::DuplicateSpot("F1-S1".to_string()));
    }

    #[test]
    fn find_available_prefers_smallest_fitting_class() {
        let floor = floor_with(&[("F1-M", SpotType::Medium), ("F1-S", SpotType::Small)]);
        let spot = floor.find_available(VehicleType::Car).unwrap();
        assert_eq!(spot.id(), "F1-S");
    }

    #[test]
    fn find_available_skips_occupied_spots() {
        let floor = floor_with(&[("F1-S1", SpotType::Small), ("F1-S2", SpotType::Small)]);
        let bike = Vehicle::new("BIKE", VehicleType::Motorcycle).unwrap();
        assert!(floor.spot("F1-S1").unwrap().try_claim(&bike));

        let spot = floor.find_available(VehicleType::Motorcycle).unwrap();
        assert_eq!(spot.id(), "F1-S2");
    }

    #[test]
    fn find_available_none_when_nothing_fits() {
        let floor = floor_with(&[("F1-S1", SpotType::Small)]);
        assert!(floor.find_available(VehicleType::Bus).is_none());
    }

    #[test]
    fn maintenance_hides_free_spots_until_cleared() {
        let floor = floor_with(&[("F1-L1", SpotType::Large)]);

        floor.set_under_maintenance(true);
        assert!(floor.is_under_maintenance());
        assert!(floor.find_available(VehicleType::Truck).is_none());
        assert!(!floor.spot("F1-L1").unwrap().is_occupied());

        floor.set_under_maintenance(false);
        assert_eq!(
            floor.find_available(VehicleType::Truck).map(|s| s.id()),
            Some("F1-L1")
        );
    }

    #[test]
    fn is_full_tracks_occupancy() {
        let floor = floor_with(&[("F1-S1", SpotType::Small), ("F1-L1", SpotType::Large)]);
        assert!(!floor.is_full());

        let bike = Vehicle::new("BIKE", VehicleType::Motorcycle).unwrap();
        let bus = Vehicle::new("BUS", VehicleType::Bus).unwrap();
        assert!(floor.spot("F1-S1").unwrap().try_claim(&bike));
        assert!(!floor.is_full());
        assert!(floor.spot("F1-L1").unwrap().try_claim(&bus));
        assert!(floor.is_full());
    }

    #[test]
    fn status_counts_free_spots_per_class() {
        let floor = floor_with(&[
            ("F1-S1", SpotType::Small),
            ("F1-S2", SpotType::Small),
            ("F1-L1", SpotType::Large),
        ]);
        let bike = Vehicle::new("BIKE", VehicleType::Motorcycle).unwrap();
        assert!(floor.spot("F1-S2").unwrap().try_claim(&bike));

        let status = floor.status();
        assert_eq!(status.free(), 2);
        insta::assert_json_snapshot!(status, @r#"
        {
          "floor_id": "F1",
          "under_maintenance": false,
          "spots": {
            "small": {
              "free": 1,
              "total": 2
            },
            "large": {
              "free": 1,
              "total": 1
            }
          }
        }
        "#);
    }
}
