//! Platform error types

use thiserror::Error;

/// Platform-related errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The input source can no longer deliver events
    #[error("Input source disconnected: {0}")]
    Disconnected(String),
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;
