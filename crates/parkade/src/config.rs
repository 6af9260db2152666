//! Lot layout and admission settings loaded from JSON.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::error::ValidationError;
use crate::floor::ParkingFloor;
use crate::lot::{LotError, ParkingLot};
use crate::panel::AdmissionPolicy;
use crate::spot::{ParkingSpot, SpotType};
use crate::strategy::StrategyKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid lot config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Lot(#[from] LotError),

    #[error("invalid admission settings: {0}")]
    InvalidAdmission(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LotConfig {
    #[serde(default)]
    pub strategy: StrategyKind,
    #[serde(default)]
    pub admission: AdmissionConfig,
    pub floors: Vec<FloorConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FloorConfig {
    pub id: String,
    #[serde(default)]
    pub under_maintenance: bool,
    #[serde(default)]
    pub spots: Vec<SpotConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpotConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub spot_type: SpotType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdmissionConfig {
    pub max_attempts: u32,
    pub backoff_ms: u64,
    pub deadline_ms: Option<u64>,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        let policy = AdmissionPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            backoff_ms: policy.backoff.as_millis() as u64,
            deadline_ms: policy.deadline.map(|d| d.as_millis() as u64),
        }
    }
}

impl TryFrom<AdmissionConfig> for AdmissionPolicy {
    type Error = ConfigError;

    fn try_from(config: AdmissionConfig) -> Result<Self, Self::Error> {
        if config.max_attempts == 0 {
            return Err(ConfigError::InvalidAdmission(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(AdmissionPolicy {
            max_attempts: config.max_attempts,
            backoff: Duration::from_millis(config.backoff_ms),
            deadline: config.deadline_ms.map(Duration::from_millis),
        })
    }
}

impl LotConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn admission_policy(&self) -> Result<AdmissionPolicy, ConfigError> {
        self.admission.try_into()
    }

    /// Assemble the lot. Ids must be non-empty; floor ids and spot ids must
    /// each be unique across the lot.
    pub fn build(&self) -> Result<ParkingLot, ConfigError> {
        let mut lot = ParkingLot::new(self.strategy.build());

        for floor_config in &self.floors {
            let mut floor = ParkingFloor::new(floor_config.id.clone())?;
            for spot in &floor_config.spots {
                floor.add_spot(ParkingSpot::new(spot.id.clone(), spot.spot_type)?)?;
            }
            floor.set_under_maintenance(floor_config.under_maintenance);
            lot.add_floor(floor)?;
        }

        tracing::debug!(
            floors = self.floors.len(),
            spots = self.floors.iter().map(|f| f.spots.len()).sum::<usize>(),
            strategy = self.strategy.as_str(),
            "Parking lot built from config"
        );
        Ok(lot)
    }

    /// Convenience for callers that share the lot across threads.
    pub fn build_shared(&self) -> Result<Arc<ParkingLot>, ConfigError> {
        self.build().map(Arc::new)
    }
}
