//! Admission: find a candidate, claim it, register the ticket.
//!
//! Each attempt is SEARCH → CLAIM. A missing candidate ends admission at once
//! (the lot has nothing that fits). A lost claim means another admission took
//! the spot between search and claim; that is retried up to
//! `AdmissionPolicy::max_attempts` times with a short backoff.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::display::DisplayPanel;
use crate::lot::{LotError, ParkingLot};
use crate::ticket::ParkingTicket;
use crate::vehicle::Vehicle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
    /// Stop retrying once this much time has passed since the first attempt.
    pub deadline: Option<Duration>,
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(10),
            deadline: None,
        }
    }
}

/// Why admission produced no ticket. Callers of `park_vehicle` only see
/// `None`; the distinction is kept for logs and tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionFailure {
    #[error("no fitting spot available")]
    Unavailable,

    #[error("lost the claim race on {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    #[error("admission deadline passed after {attempts} attempts")]
    DeadlineExceeded { attempts: u32 },

    #[error("ticket registration failed: {0}")]
    Registration(#[from] LotError),
}

enum ClaimOutcome {
    Claimed(Arc<ParkingTicket>),
    NoCandidate,
    RaceLost { spot_id: String },
}

pub struct EntryPanel {
    policy: AdmissionPolicy,
    display: Arc<dyn DisplayPanel>,
}

impl EntryPanel {
    pub fn new(display: Arc<dyn DisplayPanel>) -> Self {
        Self {
            policy: AdmissionPolicy::default(),
            display,
        }
    }

    /// Replace the admission policy. Every admission searches at least once,
    /// so a `max_attempts` of zero is raised to one.
    pub fn with_policy(mut self, mut policy: AdmissionPolicy) -> Self {
        if policy.max_attempts == 0 {
            tracing::warn!("Admission policy allows no attempts, using 1");
            policy.max_attempts = 1;
        }
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> AdmissionPolicy {
        self.policy
    }

    /// Park `vehicle`, returning its ticket, or `None` when no spot could be
    /// secured (full lot and exhausted retries look the same).
    pub fn park_vehicle(&self, vehicle: &Vehicle, lot: &ParkingLot) -> Option<Arc<ParkingTicket>> {
        match self.admit(vehicle, lot) {
            Ok(ticket) => Some(ticket),
            Err(failure) => {
                tracing::debug!(
                    license = vehicle.license_number(),
                    reason = %failure,
                    "Vehicle not admitted"
                );
                None
            }
        }
    }

    /// Run the admission state machine and report the precise outcome.
    pub fn admit(
        &self,
        vehicle: &Vehicle,
        lot: &ParkingLot,
    ) -> Result<Arc<ParkingTicket>, AdmissionFailure> {
        let result = self.run(vehicle, lot);
        match &result {
            Ok(ticket) => self.display.ticket_issued(vehicle, Some(ticket)),
            Err(_) => self.display.ticket_issued(vehicle, None),
        }
        result
    }

    fn run(&self, vehicle: &Vehicle, lot: &ParkingLot) -> Result<Arc<ParkingTicket>, AdmissionFailure> {
        let started = Instant::now();
        let mut attempts = 0;

        while attempts < self.policy.max_attempts {
            attempts += 1;

            let spot_id = match self.attempt(vehicle, lot)? {
                ClaimOutcome::Claimed(ticket) => return Ok(ticket),
                ClaimOutcome::NoCandidate => {
                    self.display.spot_assigned(vehicle, None);
                    return Err(AdmissionFailure::Unavailable);
                }
                ClaimOutcome::RaceLost { spot_id } => spot_id,
            };

            tracing::warn!(
                license = vehicle.license_number(),
                spot = %spot_id,
                attempt = attempts,
                max_attempts = self.policy.max_attempts,
                "Spot taken by concurrent admission, retrying"
            );

            if let Some(deadline) = self.policy.deadline
                && started.elapsed() >= deadline
            {
                return Err(AdmissionFailure::DeadlineExceeded { attempts });
            }

            if attempts < self.policy.max_attempts && !self.policy.backoff.is_zero() {
                std::thread::sleep(self.policy.backoff);
            }
        }

        tracing::warn!(
            license = vehicle.license_number(),
            attempts,
            "Failed to park vehicle after max attempts"
        );
        Err(AdmissionFailure::RetriesExhausted { attempts })
    }

    fn attempt(&self, vehicle: &Vehicle, lot: &ParkingLot) -> Result<ClaimOutcome, AdmissionFailure> {
        let strategy = lot.strategy();
        let Some(spot) = strategy.find_spot(vehicle, lot) else {
            return Ok(ClaimOutcome::NoCandidate);
        };

        tracing::debug!(
            license = vehicle.license_number(),
            spot = spot.id(),
            strategy = strategy.name(),
            "Candidate spot found"
        );

        if !spot.try_claim(vehicle) {
            return Ok(ClaimOutcome::RaceLost {
                spot_id: spot.id().to_string(),
            });
        }

        let ticket = Arc::new(lot.ticket_generator().generate(vehicle, spot));
        if let Err(e) = lot.issue_ticket(Arc::clone(&ticket)) {
            // Never leave a claimed spot without a ticket pointing at it.
            spot.release();
            return Err(e.into());
        }

        self.display.spot_assigned(vehicle, Some(spot.id()));
        tracing::info!(
            ticket_id = ticket.ticket_id(),
            license = vehicle.license_number(),
            spot = spot.id(),
            "Ticket issued"
        );
        Ok(ClaimOutcome::Claimed(ticket))
    }
}
