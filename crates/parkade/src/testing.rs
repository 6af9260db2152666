//! Shared fixtures for unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::floor::ParkingFloor;
use crate::lot::ParkingLot;
use crate::payment::PaymentProcessor;
use crate::spot::{ParkingSpot, SpotType};
use crate::strategy::NearestAvailableSpot;
use crate::vehicle::{Vehicle, VehicleType};

pub fn lot(floors: &[(&str, &[(&str, SpotType)])]) -> ParkingLot {
    let mut lot = ParkingLot::new(Arc::new(NearestAvailableSpot));
    for (floor_id, spots) in floors {
        let mut floor = ParkingFloor::new(*floor_id).unwrap();
        for (spot_id, spot_type) in spots.iter() {
            floor
                .add_spot(ParkingSpot::new(*spot_id, *spot_type).unwrap())
                .unwrap();
        }
        lot.add_floor(floor).unwrap();
    }
    lot
}

/// One small, one medium, one large spot on a single floor.
pub fn small_medium_large() -> ParkingLot {
    lot(&[(
        "F1",
        &[
            ("F1-S1", SpotType::Small),
            ("F1-M1", SpotType::Medium),
            ("F1-L1", SpotType::Large),
        ],
    )])
}

pub fn vehicle(license: &str, vehicle_type: VehicleType) -> Vehicle {
    Vehicle::new(license, vehicle_type).unwrap()
}

/// Approves or declines depending on a switch; counts every call.
#[derive(Debug, Default)]
pub struct SwitchablePayment {
    decline: AtomicBool,
    calls: AtomicUsize,
}

impl SwitchablePayment {
    pub fn declining() -> Self {
        Self {
            decline: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_decline(&self, decline: bool) {
        self.decline.store(decline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PaymentProcessor for SwitchablePayment {
    fn process_payment(&self, _amount: f64) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        !self.decline.load(Ordering::SeqCst)
    }

    fn name(&self) -> &'static str {
        "switchable"
    }
}
