//! The parking lot: floors plus the authoritative registry of active tickets.
//!
//! Floors and spots are fixed once the lot is shared; every runtime mutation
//! goes through a spot's own lock, a floor's maintenance lock, the ticket
//! registry (`DashMap`), or the strategy slot.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::Serialize;
use thiserror::Error;

use crate::floor::{FloorStatus, ParkingFloor};
use crate::spot::ParkingSpot;
use crate::strategy::ParkingStrategy;
use crate::ticket::{ParkingTicket, TicketGenerator};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LotError {
    #[error("floor not found: {0}")]
    FloorNotFound(String),

    #[error("duplicate floor id: {0}")]
    DuplicateFloor(String),

    #[error("duplicate spot id: {0}")]
    DuplicateSpot(String),

    #[error("ticket id already registered: {0}")]
    DuplicateTicket(String),
}

/// Snapshot of the whole lot. Advisory under concurrent traffic.
#[derive(Debug, Clone, Serialize)]
pub struct LotStatus {
    pub floors: Vec<FloorStatus>,
    pub active_tickets: usize,
    pub full: bool,
}

pub struct ParkingLot {
    floors: Vec<ParkingFloor>,
    tickets: DashMap<String, Arc<ParkingTicket>>,
    generator: TicketGenerator,
    strategy: RwLock<Arc<dyn ParkingStrategy>>,
}

impl ParkingLot {
    pub fn new(strategy: Arc<dyn ParkingStrategy>) -> Self {
        Self {
            floors: Vec::new(),
            tickets: DashMap::new(),
            generator: TicketGenerator::new(),
            strategy: RwLock::new(strategy),
        }
    }

    pub fn with_ticket_generator(mut self, generator: TicketGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Add a floor. Configuration time only.
    ///
    /// Spot ids must be unique across the whole lot, since exit resolves
    /// spots by id alone.
    pub fn add_floor(&mut self, floor: ParkingFloor) -> Result<(), LotError> {
        if self.floor(floor.id()).is_some() {
            return Err(LotError::DuplicateFloor(floor.id().to_string()));
        }

        let existing: HashSet<&str> = self
            .floors
            .iter()
            .flat_map(|f| f.spots())
            .map(|s| s.id())
            .collect();
        if let Some(spot) = floor.spots().find(|s| existing.contains(s.id())) {
            return Err(LotError::DuplicateSpot(spot.id().to_string()));
        }

        self.floors.push(floor);
        Ok(())
    }

    pub fn floors(&self) -> &[ParkingFloor] {
        &self.floors
    }

    pub fn floor(&self, floor_id: &str) -> Option<&ParkingFloor> {
        self.floors.iter().find(|f| f.id() == floor_id)
    }

    pub fn set_floor_maintenance(&self, floor_id: &str, status: bool) -> Result<(), LotError> {
        let floor = self
            .floor(floor_id)
            .ok_or_else(|| LotError::FloorNotFound(floor_id.to_string()))?;
        floor.set_under_maintenance(status);
        Ok(())
    }

    pub fn spot_by_id(&self, spot_id: &str) -> Option<&ParkingSpot> {
        self.floors.iter().find_map(|f| f.spot(spot_id))
    }

    /// Register a freshly minted ticket.
    ///
    /// Ids are unique by construction; a collision means the generator is
    /// broken and the existing entry is left untouched.
    pub fn issue_ticket(&self, ticket: Arc<ParkingTicket>) -> Result<(), LotError> {
        match self.tickets.entry(ticket.ticket_id().to_string()) {
            Entry::Occupied(existing) => {
                debug_assert!(false, "ticket id collision: {}", existing.key());
                tracing::error!(
                    ticket_id = %existing.key(),
                    "Bug: ticket id already registered - refusing to overwrite"
                );
                Err(LotError::DuplicateTicket(existing.key().clone()))
            }
            Entry::Vacant(slot) => {
                slot.insert(ticket);
                Ok(())
            }
        }
    }

    pub fn ticket(&self, ticket_id: &str) -> Option<Arc<ParkingTicket>> {
        self.tickets.get(ticket_id).map(|t| Arc::clone(t.value()))
    }

    /// Remove a ticket. `None` if it was already removed.
    pub fn remove_ticket(&self, ticket_id: &str) -> Option<Arc<ParkingTicket>> {
        self.tickets.remove(ticket_id).map(|(_, ticket)| ticket)
    }

    pub fn active_ticket_count(&self) -> usize {
        self.tickets.len()
    }

    pub fn active_tickets(&self) -> Vec<Arc<ParkingTicket>> {
        let mut tickets: Vec<_> = self.tickets.iter().map(|t| Arc::clone(t.value())).collect();
        tickets.sort_by(|a, b| a.ticket_id().cmp(b.ticket_id()));
        tickets
    }

    pub fn ticket_generator(&self) -> &TicketGenerator {
        &self.generator
    }

    /// Swap the search strategy. Attempts already running keep whichever
    /// strategy they loaded.
    pub fn change_strategy(&self, strategy: Arc<dyn ParkingStrategy>) {
        tracing::debug!(strategy = strategy.name(), "Parking strategy changed");
        let mut slot = self.strategy.write().unwrap_or_else(|poisoned| {
            tracing::error!("Strategy lock poisoned - recovering");
            poisoned.into_inner()
        });
        *slot = strategy;
    }

    pub fn strategy(&self) -> Arc<dyn ParkingStrategy> {
        let slot = self.strategy.read().unwrap_or_else(|poisoned| {
            tracing::error!("Strategy lock poisoned - recovering");
            poisoned.into_inner()
        });
        Arc::clone(&slot)
    }

    pub fn is_full(&self) -> bool {
        self.floors.iter().all(|f| f.is_full())
    }

    pub fn status(&self) -> LotStatus {
        LotStatus {
            floors: self.floors.iter().map(|f| f.status()).collect(),
            active_tickets: self.active_ticket_count(),
            full: self.is_full(),
        }
    }
}

impl std::fmt::Debug for ParkingLot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParkingLot")
            .field("floors", &self.floors.len())
            .field("active_tickets", &self.tickets.len())
            .field("strategy", &self.strategy().name())
            .finish()
    }
}
