//! Pluggable candidate search.
//!
//! A strategy only proposes a spot; the entry panel still has to win the
//! claim. Strategies hold no state and never touch occupancy.

use std::sync::Arc;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::floor::ParkingFloor;
use crate::lot::ParkingLot;
use crate::spot::ParkingSpot;
use crate::vehicle::Vehicle;

pub trait ParkingStrategy: Send + Sync {
    fn find_spot<'a>(&self, vehicle: &Vehicle, lot: &'a ParkingLot) -> Option<&'a ParkingSpot>;

    fn name(&self) -> &'static str;
}

/// Floors in configured order; first free fitting spot wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestAvailableSpot;

impl ParkingStrategy for NearestAvailableSpot {
    fn find_spot<'a>(&self, vehicle: &Vehicle, lot: &'a ParkingLot) -> Option<&'a ParkingSpot> {
        search(lot.floors().iter(), vehicle)
    }

    fn name(&self) -> &'static str {
        StrategyKind::Nearest.as_str()
    }
}

/// Floors visited in a fresh random order on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSpot;

impl ParkingStrategy for RandomSpot {
    fn find_spot<'a>(&self, vehicle: &Vehicle, lot: &'a ParkingLot) -> Option<&'a ParkingSpot> {
        let mut floors: Vec<&ParkingFloor> = lot.floors().iter().collect();
        floors.shuffle(&mut rand::thread_rng());
        search(floors.into_iter(), vehicle)
    }

    fn name(&self) -> &'static str {
        StrategyKind::Random.as_str()
    }
}

fn search<'a>(
    floors: impl Iterator<Item = &'a ParkingFloor>,
    vehicle: &Vehicle,
) -> Option<&'a ParkingSpot> {
    floors
        .filter(|floor| !floor.is_under_maintenance())
        .find_map(|floor| floor.find_available(vehicle.vehicle_type()))
}

/// Built-in strategies, addressable by name from configuration and HTTP.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Nearest,
    Random,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Random => "random",
        }
    }

    pub fn build(&self) -> Arc<dyn ParkingStrategy> {
        match self {
            Self::Nearest => Arc::new(NearestAvailableSpot),
            Self::Random => Arc::new(RandomSpot),
        }
    }
}
