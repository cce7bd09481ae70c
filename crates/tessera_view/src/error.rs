//! View error types

use tessera_animation::AnimationError;
use tessera_platform::PlatformError;
use thiserror::Error;

use crate::tree::WidgetId;

/// Errors from the widget tree and the frame loop
#[derive(Error, Debug)]
pub enum ViewError {
    /// The id does not name a live widget
    #[error("Unknown widget {0:?}")]
    UnknownWidget(WidgetId),

    /// Another widget already uses this name
    #[error("Duplicate widget name: {0}")]
    DuplicateName(String),

    /// Sprite index past the end of an element's sprite list
    #[error("Sprite index {index} out of range (element has {len})")]
    SpriteOutOfRange { index: usize, len: usize },

    /// A widget's own update logic failed
    #[error("Widget update failed: {0}")]
    Update(String),

    #[error(transparent)]
    Animation(#[from] AnimationError),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Result type for view operations
pub type Result<T> = std::result::Result<T, ViewError>;
