//! Exit: charge, settle, free the spot, retire the ticket.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use thiserror::Error;

use crate::cost::{CostError, CostStrategy};
use crate::display::DisplayPanel;
use crate::lot::ParkingLot;
use crate::payment::PaymentProcessor;
use crate::vehicle::Vehicle;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExitError {
    #[error("Invalid parking ticket")]
    InvalidTicket,

    #[error("Ticket already processed or invalid: {0}")]
    AlreadyReleasedOrUnknown(String),

    #[error("Parking spot not found: {0}")]
    SpotNotFound(String),

    #[error("Parking spot is already empty: {0}")]
    SpotAlreadyFree(String),

    #[error("Parking spot is occupied by another vehicle: {spot_id}")]
    SpotOccupantMismatch { spot_id: String, ticket_id: String },

    #[error("Payment failed")]
    PaymentFailed { ticket_id: String, amount: f64 },

    #[error(transparent)]
    Cost(#[from] CostError),
}

impl ExitError {
    /// A declined payment leaves the ticket active; the same id can be
    /// presented again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ExitError::PaymentFailed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receipt {
    pub ticket_id: String,
    pub license_number: String,
    pub spot_id: String,
    pub amount: f64,
    pub exited_at: DateTime<Utc>,
}

pub struct ExitPanel {
    payment: Arc<dyn PaymentProcessor>,
    cost: Arc<dyn CostStrategy>,
    display: Arc<dyn DisplayPanel>,
    /// One lock per ticket currently being released.
    in_flight: DashMap<String, Arc<Mutex<()>>>,
}

impl ExitPanel {
    pub fn new(
        payment: Arc<dyn PaymentProcessor>,
        cost: Arc<dyn CostStrategy>,
        display: Arc<dyn DisplayPanel>,
    ) -> Self {
        Self {
            payment,
            cost,
            display,
            in_flight: DashMap::new(),
        }
    }

    /// Release the vehicle holding `ticket_id`.
    ///
    /// Concurrent calls for the same ticket are serialized: exactly one can
    /// succeed, and payment is attempted at most once per success. On any
    /// error, occupancy and the ticket registry are left as they were.
    pub fn unpark_vehicle(&self, ticket_id: &str, lot: &ParkingLot) -> Result<Receipt, ExitError> {
        if ticket_id.trim().is_empty() {
            self.display.error("Invalid parking ticket");
            return Err(ExitError::InvalidTicket);
        }

        let lock = self
            .in_flight
            .entry(ticket_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let result = {
            let _guard = lock_ticket(&lock, ticket_id);
            self.release(ticket_id, lot)
        };

        drop(lock);
        self.in_flight
            .remove_if(ticket_id, |_, l| Arc::strong_count(l) == 1);

        if let Err(e) = &result {
            self.display.error(&e.to_string());
        }
        result
    }

    fn release(&self, ticket_id: &str, lot: &ParkingLot) -> Result<Receipt, ExitError> {
        let Some(ticket) = lot.ticket(ticket_id) else {
            return Err(ExitError::AlreadyReleasedOrUnknown(ticket_id.to_string()));
        };

        let amount = self.cost.compute_cost(&ticket)?;

        let Some(spot) = lot.spot_by_id(ticket.spot_id()) else {
            tracing::error!(
                ticket_id,
                spot = ticket.spot_id(),
                "Active ticket references an unknown spot"
            );
            return Err(ExitError::SpotNotFound(ticket.spot_id().to_string()));
        };

        let vehicle = ticket.vehicle();
        match spot.parked_vehicle() {
            None => {
                tracing::error!(
                    ticket_id,
                    spot = spot.id(),
                    "Active ticket references a free spot"
                );
                return Err(ExitError::SpotAlreadyFree(spot.id().to_string()));
            }
            Some(parked) if parked != *vehicle => {
                return Err(occupant_mismatch(ticket_id, spot.id(), vehicle, &parked));
            }
            Some(_) => {}
        }

        self.display.cost(vehicle, amount);

        if !self.payment.process_payment(amount) {
            tracing::warn!(
                ticket_id,
                amount,
                processor = self.payment.name(),
                "Payment declined"
            );
            return Err(ExitError::PaymentFailed {
                ticket_id: ticket_id.to_string(),
                amount,
            });
        }

        // Re-checked under the spot lock; the occupant may have changed
        // while payment ran.
        if !spot.release_if(vehicle) {
            let parked = spot.parked_vehicle();
            return Err(match parked {
                Some(parked) => occupant_mismatch(ticket_id, spot.id(), vehicle, &parked),
                None => {
                    tracing::error!(
                        ticket_id,
                        spot = spot.id(),
                        "Spot was freed while its ticket was being settled"
                    );
                    ExitError::SpotAlreadyFree(spot.id().to_string())
                }
            });
        }
        lot.remove_ticket(ticket_id);
        self.display.exit_success(vehicle);

        tracing::info!(
            ticket_id,
            license = vehicle.license_number(),
            spot = spot.id(),
            amount,
            "Vehicle exited"
        );

        Ok(Receipt {
            ticket_id: ticket_id.to_string(),
            license_number: vehicle.license_number().to_string(),
            spot_id: spot.id().to_string(),
            amount,
            exited_at: Utc::now(),
        })
    }

    #[cfg(test)]
    fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }
}

fn occupant_mismatch(
    ticket_id: &str,
    spot_id: &str,
    expected: &Vehicle,
    parked: &Vehicle,
) -> ExitError {
    tracing::error!(
        ticket_id,
        spot = spot_id,
        expected = expected.license_number(),
        parked = parked.license_number(),
        "Active ticket references a spot held by another vehicle"
    );
    ExitError::SpotOccupantMismatch {
        spot_id: spot_id.to_string(),
        ticket_id: ticket_id.to_string(),
    }
}

fn lock_ticket<'a>(lock: &'a Mutex<()>, ticket_id: &str) -> MutexGuard<'a, ()> {
    lock.lock().unwrap_or_else(|poisoned| {
        tracing::error!(ticket_id, "Ticket lock poisoned - recovering");
        poisoned.into_inner()
    })
}
