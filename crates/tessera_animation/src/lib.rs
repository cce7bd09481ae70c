//! Tessera Animation System
//!
//! Time-stepped motion and visual transitions for widgets.
//!
//! # Features
//!
//! - **Kinematic Mover**: velocity, acceleration and friction integration with
//!   elastic bouncing and exact-arrival move-to
//! - **Fades**: frame-rate-normalized alpha fades over selected visual layers
//! - **Checkpoint Paths**: multi-step slide/accelerate/decelerate paths with
//!   mid-flight path changes that never jump
//! - **Passive Animations**: fade in/out and continuous rotation layered on a path
//! - **AnimationScheduler**: view-global registry keyed by target identity

pub mod checkpoint;
pub mod error;
pub mod fade;
pub mod mover;
pub mod scheduler;

pub use checkpoint::{Animatable, AnimationEntry, Checkpoint, CheckpointKind, PassiveAnimation};
pub use error::{AnimationError, Result};
pub use fade::FadeController;
pub use mover::{MoveStatus, Mover, DEFAULT_MIN_ARRIVAL_SPEED};
pub use scheduler::{AnimationId, AnimationScheduler, AnimationTargets};
