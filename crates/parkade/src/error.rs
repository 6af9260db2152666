//! Construction-time validation errors.

use thiserror::Error;

/// Rejected constructor input. Kept distinct from capacity outcomes so an
/// invalid request is never confused with a full lot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("license number must not be empty")]
    EmptyLicense,

    #[error("spot id must not be empty")]
    EmptySpotId,

    #[error("floor id must not be empty")]
    EmptyFloorId,
}
