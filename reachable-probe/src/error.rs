//! Error types for normalization and probing.

use serde::Serialize;
use thiserror::Error;

/// Error returned by [`ReachabilityService`](crate::ReachabilityService).
///
/// Rejection is deliberately uniform: callers learn that the input was
/// refused, never which rule refused it.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code")]
pub enum ReachabilityError {
    /// Input could not be turned into a safe target host.
    #[error("Bad Request")]
    Rejected,
}

/// Failure of a single connection attempt.
///
/// Never surfaces past the prober; it is folded into an `unreachable` verdict.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// TCP connect failed (refused, unroutable, DNS failure).
    #[error("Connection failed: {0}")]
    Connect(String),

    /// The attempt exceeded its own network timeout.
    #[error("Connection timed out")]
    Timeout,

    /// HTTP request failed (including TLS errors).
    #[error("HTTP request failed: {0}")]
    Http(String),
}

/// Result type alias for reachability operations.
pub type ReachabilityResult<T> = std::result::Result<T, ReachabilityError>;
