//! Tessera Platform Abstraction
//!
//! Platform-agnostic input types and the [`InputSource`] trait through which
//! a windowing backend hands raw events to a view once per frame.
//!
//! # Example
//!
//! ```rust
//! use tessera_platform::*;
//!
//! let mut source = ScriptedInput::new()
//!     .frame([WindowEvent::Focused(true).into()])
//!     .frame([InputEvent::Mouse(MouseEvent::Moved { x: 10.0, y: 20.0 }).into()]);
//!
//! let events = source.poll_events().unwrap();
//! assert_eq!(events.len(), 1);
//! ```

mod error;
mod event;
mod input;

pub use error::{PlatformError, Result};
pub use event::{Event, InputSource, ScriptedInput, WindowEvent};
pub use input::{InputEvent, Key, KeyState, KeyboardEvent, Modifiers, MouseButton, MouseEvent};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{PlatformError, Result};
    pub use crate::event::{Event, InputSource, ScriptedInput, WindowEvent};
    pub use crate::input::{
        InputEvent, Key, KeyState, KeyboardEvent, Modifiers, MouseButton, MouseEvent,
    };
}
