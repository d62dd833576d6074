//! Health check error types.

use ethprobe_core::describe_chain;
use thiserror::Error;

/// Result type alias for health check operations.
pub type HealthResult<T> = Result<T, HealthError>;

/// Errors that can occur while probing a node.
#[derive(Debug, Error)]
pub enum HealthError {
    /// Connect, TLS, or IO failure, timeout, or a non-2xx HTTP status.
    #[error("transport error: {0}")]
    Transport(String),

    /// The node answered, but not with a usable JSON-RPC result.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The node is live but serving a different chain.
    #[error(
        "network mismatch: expected chain id {}, node reports {}",
        describe_chain(*expected),
        describe_chain(*actual)
    )]
    NetworkMismatch { expected: u64, actual: u64 },

    /// Every attempt failed; `last` is the error from the final attempt.
    #[error("health check failed after {attempts} attempt(s): {last}")]
    Exhausted { attempts: u32, last: Box<HealthError> },
}

impl HealthError {
    /// The error behind an `Exhausted`, or `self` for any other variant.
    pub fn last_cause(&self) -> &HealthError {
        match self {
            HealthError::Exhausted { last, .. } => last.last_cause(),
            other => other,
        }
    }

    pub fn is_network_mismatch(&self) -> bool {
        matches!(self.last_cause(), HealthError::NetworkMismatch { .. })
    }
}
