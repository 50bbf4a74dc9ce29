//! Error taxonomy shared by the estimation core and its callers.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImpactError {
    /// Referenced airport or zone does not exist.
    #[error("{0} not found")]
    NotFound(String),
    /// Required request parameter missing or malformed.
    #[error("{0}")]
    InvalidInput(String),
    /// Airport record exists but carries no coordinates.
    #[error("{0} airport location data missing")]
    InvalidLocation(String),
    /// Backing store or reference lookup could not be reached.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    /// Malformed geometry or other per-item computation failure.
    #[error("computation error: {0}")]
    Computation(String),
}

pub type ImpactResult<T> = Result<T, ImpactError>;
