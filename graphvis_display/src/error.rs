//! Error types for the graphvis display
//!
//! Every resource-manager operation returns one of these instead of panicking.
//! The renderer uses [`Error::is_retryable`] to decide whether a failed frame can
//! simply be dropped and retried on the next frame.

use std::fmt;

/// Result type for graphvis display operations
pub type Result<T> = std::result::Result<T, Error>;

/// Graphvis display errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// GPU or host memory exhausted
    AllocationFailure(String),

    /// Partial update outside `[0, count)` or with `first > last`
    InvalidRange {
        first: usize,
        last: usize,
        count: usize,
    },

    /// An external resource no longer matches what descriptor sets reference
    StaleHandle(String),

    /// Any other graphics call failure (Vulkan result code, lost device, ...)
    DriverCallFailure(String),

    /// A resource required by the operation does not exist
    InvalidResource(String),

    /// Operation called before initialisation or swapchain binding
    InitializationFailed(String),
}

impl Error {
    /// True when the next frame can retry the failed work without tearing
    /// down persistent state
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::DriverCallFailure(_) | Error::StaleHandle(_) | Error::InvalidResource(_)
        )
    }

    /// True when the error must be propagated to the application shell
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::AllocationFailure(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::AllocationFailure(msg) => write!(f, "Allocation failure: {}", msg),
            Error::InvalidRange { first, last, count } => write!(
                f,
                "Invalid range: [{}, {}] for {} elements",
                first, last, count
            ),
            Error::StaleHandle(msg) => write!(f, "Stale handle: {}", msg),
            Error::DriverCallFailure(msg) => write!(f, "Driver call failure: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
