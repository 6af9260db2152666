//! ParkingService: transport-agnostic front door to a parking lot.
//!
//! Owns the shared lot plus one entry panel and one exit panel. Transports
//! (HTTP today) call into this service; every method is synchronous and may
//! block briefly on spot locks or admission backoff, so async callers should
//! run it on a blocking thread.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;

use crate::config::{ConfigError, LotConfig};
use crate::cost::CostStrategy;
use crate::display::DisplayPanel;
use crate::error::ValidationError;
use crate::floor::FloorStatus;
use crate::lot::{LotError, LotStatus, ParkingLot};
use crate::panel::{AdmissionFailure, AdmissionPolicy, EntryPanel, ExitError, ExitPanel, Receipt};
use crate::payment::PaymentProcessor;
use crate::strategy::StrategyKind;
use crate::ticket::ParkingTicket;
use crate::vehicle::{Vehicle, VehicleType};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParkError {
    #[error(transparent)]
    InvalidVehicle(#[from] ValidationError),

    #[error("vehicle not admitted: {0}")]
    NotAdmitted(#[from] AdmissionFailure),
}

pub struct ParkingService {
    lot: Arc<ParkingLot>,
    entry: EntryPanel,
    exit: ExitPanel,

    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl ParkingService {
    pub fn new(
        lot: Arc<ParkingLot>,
        payment: Arc<dyn PaymentProcessor>,
        cost: Arc<dyn CostStrategy>,
        display: Arc<dyn DisplayPanel>,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            lot,
            entry: EntryPanel::new(Arc::clone(&display)),
            exit: ExitPanel::new(payment, cost, display),
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Build the lot and admission policy described by `config`.
    pub fn from_config(
        config: &LotConfig,
        payment: Arc<dyn PaymentProcessor>,
        cost: Arc<dyn CostStrategy>,
        display: Arc<dyn DisplayPanel>,
    ) -> Result<Self, ConfigError> {
        let policy = config.admission_policy()?;
        let lot = config.build_shared()?;
        Ok(Self::new(lot, payment, cost, display).with_admission_policy(policy))
    }

    pub fn with_admission_policy(mut self, policy: AdmissionPolicy) -> Self {
        self.entry = self.entry.with_policy(policy);
        self
    }

    pub fn lot(&self) -> &Arc<ParkingLot> {
        &self.lot
    }

    pub fn park(
        &self,
        license_number: &str,
        vehicle_type: VehicleType,
    ) -> Result<Arc<ParkingTicket>, ParkError> {
        let vehicle = Vehicle::new(license_number, vehicle_type)?;
        Ok(self.entry.admit(&vehicle, &self.lot)?)
    }

    pub fn unpark(&self, ticket_id: &str) -> Result<Receipt, ExitError> {
        self.exit.unpark_vehicle(ticket_id, &self.lot)
    }

    pub fn ticket(&self, ticket_id: &str) -> Option<Arc<ParkingTicket>> {
        self.lot.ticket(ticket_id)
    }

    pub fn active_tickets(&self) -> Vec<Arc<ParkingTicket>> {
        self.lot.active_tickets()
    }

    pub fn set_floor_maintenance(
        &self,
        floor_id: &str,
        under_maintenance: bool,
    ) -> Result<FloorStatus, LotError> {
        self.lot.set_floor_maintenance(floor_id, under_maintenance)?;
        self.lot
            .floor(floor_id)
            .map(|floor| floor.status())
            .ok_or_else(|| LotError::FloorNotFound(floor_id.to_string()))
    }

    pub fn change_strategy(&self, kind: StrategyKind) {
        tracing::info!(strategy = kind.as_str(), "Changing parking strategy");
        self.lot.change_strategy(kind.build());
    }

    pub fn strategy_name(&self) -> &'static str {
        self.lot.strategy().name()
    }

    pub fn status(&self) -> LotStatus {
        self.lot.status()
    }

    pub fn trigger_shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    pub fn shutdown_rx(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }
}
