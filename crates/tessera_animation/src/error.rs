//! Animation error types

use thiserror::Error;

use crate::scheduler::AnimationId;

/// Errors from the animation scheduler
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// The handle does not name a live scheduler entry
    #[error("Unknown animation {0:?}")]
    UnknownAnimation(AnimationId),

    /// Checkpoint index past the end of a path
    #[error("Checkpoint index {index} out of range (path has {len})")]
    CheckpointOutOfRange { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, AnimationError>;
