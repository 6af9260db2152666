//! Entry/exit display sinks.
//!
//! Purely observational: panels behave the same whichever sink is plugged in.

use crate::ticket::ParkingTicket;
use crate::vehicle::Vehicle;

pub trait DisplayPanel: Send + Sync {
    fn spot_assigned(&self, vehicle: &Vehicle, spot_id: Option<&str>);

    fn ticket_issued(&self, vehicle: &Vehicle, ticket: Option<&ParkingTicket>);

    fn cost(&self, vehicle: &Vehicle, amount: f64);

    fn exit_success(&self, vehicle: &Vehicle);

    fn error(&self, message: &str);
}

/// Writes every notice as a structured `tracing` event under the
/// `parkade::display` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDisplay;

impl DisplayPanel for TracingDisplay {
    fn spot_assigned(&self, vehicle: &Vehicle, spot_id: Option<&str>) {
        match spot_id {
            Some(spot) => tracing::info!(
                target: "parkade::display",
                license = vehicle.license_number(),
                spot,
                "Assigned spot"
            ),
            None => tracing::info!(
                target: "parkade::display",
                license = vehicle.license_number(),
                "No spot available"
            ),
        }
    }

    fn ticket_issued(&self, vehicle: &Vehicle, ticket: Option<&ParkingTicket>) {
        match ticket {
            Some(ticket) => tracing::info!(
                target: "parkade::display",
                license = vehicle.license_number(),
                ticket_id = ticket.ticket_id(),
                "Ticket issued"
            ),
            None => tracing::info!(
                target: "parkade::display",
                license = vehicle.license_number(),
                "Ticket could not be issued"
            ),
        }
    }

    fn cost(&self, vehicle: &Vehicle, amount: f64) {
        tracing::info!(
            target: "parkade::display",
            license = vehicle.license_number(),
            amount,
            "Total cost"
        );
    }

    fn exit_success(&self, vehicle: &Vehicle) {
        tracing::info!(
            target: "parkade::display",
            license = vehicle.license_number(),
            "Exited successfully"
        );
    }

    fn error(&self, message: &str) {
        tracing::warn!(target: "parkade::display", "{message}");
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDisplay;

impl DisplayPanel for NoopDisplay {
    fn spot_assigned(&self, _vehicle: &Vehicle, _spot_id: Option<&str>) {}

    fn ticket_issued(&self, _vehicle: &Vehicle, _ticket: Option<&ParkingTicket>) {}

    fn cost(&self, _vehicle: &Vehicle, _amount: f64) {}

    fn exit_success(&self, _vehicle: &Vehicle) {}

    fn error(&self, _message: &str) {}
}
