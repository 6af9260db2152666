//! Parking tickets and their id generator.

use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::spot::{ParkingSpot, SpotType};
use crate::vehicle::Vehicle;

pub const TICKET_PREFIX: &str = "PT";

/// Immutable proof of a committed claim. Removed from the lot on exit,
/// never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParkingTicket {
    ticket_id: String,
    vehicle: Vehicle,
    spot_id: String,
    spot_type: SpotType,
    entry_time: DateTime<Utc>,
}

impl ParkingTicket {
    pub fn ticket_id(&self) -> &str {
        &self.ticket_id
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    pub fn spot_id(&self) -> &str {
        &self.spot_id
    }

    pub fn spot_type(&self) -> SpotType {
        self.spot_type
    }

    pub fn entry_time(&self) -> DateTime<Utc> {
        self.entry_time
    }
}

impl std::fmt::Display for ParkingTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Ticket ID: {}, Vehicle: {}, Spot ID: {}, Spot Type: {}, Entry Time: {}",
            self.ticket_id,
            self.vehicle.license_number(),
            self.spot_id,
            self.spot_type,
            self.entry_time.to_rfc3339()
        )
    }
}

/// Mints tickets with ids of the form `PT-YYYYMMDD-NNNN`.
///
/// Each lot owns one generator; the counter is shared by every thread
/// issuing tickets against that lot and by nothing else.
#[derive(Debug, Default)]
pub struct TicketGenerator {
    counter: AtomicU32,
}

impl TicketGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting after `last`. Used when ids must not restart at 1.
    pub fn starting_after(last: u32) -> Self {
        Self {
            counter: AtomicU32::new(last),
        }
    }

    pub fn generate(&self, vehicle: &Vehicle, spot: &ParkingSpot) -> ParkingTicket {
        self.generate_at(vehicle, spot, Utc::now())
    }

    pub fn generate_at(
        &self,
        vehicle: &Vehicle,
        spot: &ParkingSpot,
        entry_time: DateTime<Utc>,
    ) -> ParkingTicket {
        let sequence = self.counter.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
        ParkingTicket {
            ticket_id: format_ticket_id(entry_time, sequence),
            vehicle: vehicle.clone(),
            spot_id: spot.id().to_string(),
            spot_type: spot.spot_type(),
            entry_time,
        }
    }

    pub fn current_counter(&self) -> u32 {
        self.counter.load(Ordering::Acquire)
    }
}

fn format_ticket_id(at: DateTime<Utc>, sequence: u32) -> String {
    format!("{}-{}-{:04}", TICKET_PREFIX, at.format("%Y%m%d"), sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::VehicleType;
    use chrono::TimeZone;
    use std::collections::HashSet;

    fn fixture() -> (Vehicle, ParkingSpot) {
        (
            Vehicle::new("KA-01-1234", VehicleType::Car).unwrap(),
            ParkingSpot::new("F1-S2", SpotType::Medium).unwrap(),
        )
    }

    #[test]
    fn ids_carry_prefix_date_and_padded_counter() {
        let generator = TicketGenerator::new();
        let (car, spot) = fixture();
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap();

        let first = generator.generate_at(&car, &spot, at);
        let second = generator.generate_at(&car, &spot, at);

        assert_eq!(first.ticket_id(), "PT-20240115-0001");
        assert_eq!(second.ticket_id(), "PT-20240115-0002");
        assert_eq!(generator.current_counter(), 2);
    }

    #[test]
    fn counter_widens_past_four_digits() {
        let generator = TicketGenerator::starting_after(9999);
        let (car, spot) = fixture();
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();

        let ticket = generator.generate_at(&car, &spot, at);
        assert_eq!(ticket.ticket_id(), "PT-20240115-10000");
    }

    #[test]
    fn ticket_captures_spot_and_vehicle() {
        let generator = TicketGenerator::new();
        let (car, spot) = fixture();

        let ticket = generator.generate(&car, &spot);
        assert_eq!(ticket.vehicle(), &car);
        assert_eq!(ticket.spot_id(), "F1-S2");
        assert_eq!(ticket.spot_type(), SpotType::Medium);
    }

    #[test]
    fn generators_do_not_share_counters() {
        let (car, spot) = fixture();
        let a = TicketGenerator::new();
        let b = TicketGenerator::new();

        a.generate(&car, &spot);
        a.generate(&car, &spot);
        b.generate(&car, &spot);

        assert_eq!(a.current_counter(), 2);
        assert_eq!(b.current_counter(), 1);
    }

    #[test]
    fn concurrent_generation_yields_unique_ids() {
        let generator = TicketGenerator::new();
        let (car, spot) = fixture();

        let ids: Vec<String> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        (0..100)
                            .map(|_| generator.generate(&car, &spot).ticket_id().to_string())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });

        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), 800);
        assert_eq!(generator.current_counter(), 800);
    }

    #[test]
    fn ticket_serializes_to_json() {
        let generator = TicketGenerator::new();
        let (car, spot) = fixture();
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap();

        let ticket = generator.generate_at(&car, &spot, at);
        insta::assert_json_snapshot!(ticket, @r#"
        {
          "ticket_id": "PT-20240115-0001",
          "vehicle": {
            "license_number": "KA-01-1234",
            "vehicle_type": "car"
          },
          "spot_id": "F1-S2",
          "spot_type": "medium",
          "entry_time": "2024-01-15T09:30:00Z"
        }
        "#);
    }
}
