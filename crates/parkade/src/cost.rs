//! Parking charge computation.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::spot::SpotType;
use crate::ticket::ParkingTicket;
use crate::vehicle::VehicleType;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CostError {
    #[error("invalid ticket for cost computation: {0}")]
    InvalidArgument(String),
}

pub trait CostStrategy: Send + Sync {
    fn compute_cost(&self, ticket: &ParkingTicket) -> Result<f64, CostError>;
}

/// Hourly rate by vehicle type, scaled by spot size.
///
/// Anything under half an hour is billed as half an hour. Amounts are
/// rounded to two decimals.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCostStrategy;

impl StandardCostStrategy {
    const MINIMUM_HOURS: f64 = 0.5;

    pub fn base_rate(vehicle_type: VehicleType) -> f64 {
        match vehicle_type {
            VehicleType::Motorcycle => 5.0,
            VehicleType::Car => 10.0,
            VehicleType::Bus => 25.0,
            VehicleType::Truck => 20.0,
        }
    }

    pub fn spot_multiplier(spot_type: SpotType) -> f64 {
        match spot_type {
            SpotType::Small => 1.0,
            SpotType::Medium => 1.3,
            SpotType::Large => 1.5,
        }
    }

    pub fn compute_cost_at(
        &self,
        ticket: &ParkingTicket,
        now: DateTime<Utc>,
    ) -> Result<f64, CostError> {
        let elapsed = now.signed_duration_since(ticket.entry_time());
        if elapsed < chrono::TimeDelta::zero() {
            return Err(CostError::InvalidArgument(format!(
                "ticket {} entry time {} is in the future",
                ticket.ticket_id(),
                ticket.entry_time().to_rfc3339()
            )));
        }

        let hours = (elapsed.num_milliseconds() as f64 / 3_600_000.0).max(Self::MINIMUM_HOURS);
        let total = hours
            * Self::base_rate(ticket.vehicle().vehicle_type())
            * Self::spot_multiplier(ticket.spot_type());

        Ok((total * 100.0).round() / 100.0)
    }
}

impl CostStrategy for StandardCostStrategy {
    fn compute_cost(&self, ticket: &ParkingTicket) -> Result<f64, CostError> {
        self.compute_cost_at(ticket, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spot::ParkingSpot;
    use crate::ticket::TicketGenerator;
    use crate::vehicle::Vehicle;
    use chrono::{TimeDelta, TimeZone};

    fn ticket(vehicle_type: VehicleType, spot_type: SpotType) -> ParkingTicket {
        let vehicle = Vehicle::new("KA-01-1234", vehicle_type).unwrap();
        let spot = ParkingSpot::new("F1-S1", spot_type).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap();
        TicketGenerator::new().generate_at(&vehicle, &spot, at)
    }

    #[test]
    fn short_stays_bill_the_minimum() {
        let ticket = ticket(VehicleType::Car, SpotType::Small);
        let now = ticket.entry_time() + TimeDelta::minutes(5);
        assert_eq!(StandardCostStrategy.compute_cost_at(&ticket, now), Ok(5.0));
    }

    #[test]
    fn rate_scales_with_hours_and_spot_size() {
        let car = ticket(VehicleType::Car, SpotType::Medium);
        let now = car.entry_time() + TimeDelta::hours(2);
        assert_eq!(StandardCostStrategy.compute_cost_at(&car, now), Ok(26.0));

        let bus = ticket(VehicleType::Bus, SpotType::Large);
        let now = bus.entry_time() + TimeDelta::minutes(90);
        assert_eq!(StandardCostStrategy.compute_cost_at(&bus, now), Ok(56.25));
    }

    #[test]
    fn amounts_round_to_cents() {
        let ticket = ticket(VehicleType::Motorcycle, SpotType::Small);
        // 40 minutes at 5.0/h = 3.3333...
        let now = ticket.entry_time() + TimeDelta::minutes(40);
        assert_eq!(StandardCostStrategy.compute_cost_at(&ticket, now), Ok(3.33));
    }

    #[test]
    fn future_entry_time_is_rejected() {
        let ticket = ticket(VehicleType::Truck, SpotType::Large);
        let now = ticket.entry_time() - TimeDelta::seconds(1);
        assert!(matches!(
            StandardCostStrategy.compute_cost_at(&ticket, now),
            Err(CostError::InvalidArgument(_))
        ));
    }
}
