//! Tessera Core
//!
//! Foundational types shared by every layer of the toolkit:
//!
//! - **Geometry**: points, vectors, sizes and rectangles in logical pixels
//! - **Color & Visuals**: 8-bit colors and the per-widget visual layers
//! - **Transform**: the mutable placement state all motion effects write to
//! - **FrameClock**: frame timing and frame-rate normalization
//! - **InputSnapshot**: per-frame input plus mouse/focus capture arbitration
//! - **ViewConfig**: TOML-loadable view configuration
//!
//! # Example
//!
//! ```rust
//! use tessera_core::InputSnapshot;
//!
//! let mut input = InputSnapshot::default();
//! input.reset();
//!
//! // The first widget to ask wins the mouse for this frame
//! assert!(input.capture_mouse());
//! assert!(!input.capture_mouse());
//! ```

pub mod clock;
pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod input;
pub mod transform;
pub mod visuals;

pub use clock::FrameClock;
pub use color::{Color, HasAlpha};
pub use config::ViewConfig;
pub use error::{CoreError, Result};
pub use geometry::{Point, Rect, Size, Vec2};
pub use input::{ButtonState, InputSnapshot, TraceSample};
pub use transform::Transform;
pub use visuals::{Layer, LayerMask, Visuals};

// Input types widgets match against without depending on the platform crate
pub use tessera_platform::{Key, Modifiers, MouseButton};
