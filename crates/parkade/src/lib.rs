//! parkade: concurrent parking spot allocation with ticketing and metered exit.

mod error;

pub mod config;
pub mod cost;
pub mod display;
pub mod floor;
pub mod lot;
pub mod panel;
pub mod payment;
pub mod service;
pub mod spot;
pub mod strategy;
pub mod ticket;
pub mod transport;
pub mod vehicle;

#[cfg(test)]
mod testing;

pub use config::{AdmissionConfig, ConfigError, FloorConfig, LotConfig, SpotConfig};
pub use cost::{CostError, CostStrategy, StandardCostStrategy};
pub use display::{DisplayPanel, NoopDisplay, TracingDisplay};
pub use error::ValidationError;
pub use floor::{FloorStatus, ParkingFloor, SpotCounts};
pub use lot::{LotError, LotStatus, ParkingLot};
pub use panel::{AdmissionFailure, AdmissionPolicy, EntryPanel, ExitError, ExitPanel, Receipt};
pub use payment::{CardPaymentProcessor, CashPaymentProcessor, PaymentProcessor};
pub use service::{ParkError, ParkingService};
pub use spot::{ParkingSpot, SpotType};
pub use strategy::{NearestAvailableSpot, ParkingStrategy, RandomSpot, StrategyKind};
pub use ticket::{ParkingTicket, TicketGenerator};
pub use transport::{ServerConfig, serve};
pub use vehicle::{Vehicle, VehicleType};
