//! Tessera View
//!
//! The retained-mode layer: a tree of widgets updated and drawn once per
//! frame by a [`View`].
//!
//! # Features
//!
//! - **Widget / Element**: shared base state with mouse and focus arbitration
//! - **WidgetTree**: slotmap arena, depth-first traversal, named lookup
//! - **Triggers**: string signals between widgets, optionally gated on state
//! - **Drawing**: [`DrawSurface`] collaborator and a recording implementation
//! - **Capture**: off-screen widget snapshots and drag shadows
//!
//! # Example
//!
//! ```rust
//! use tessera_core::{Rect, ViewConfig};
//! use tessera_platform::{InputEvent, MouseButton, MouseEvent};
//! use tessera_view::{Element, View};
//!
//! let mut view = View::new(ViewConfig::default());
//! let button = view
//!     .add_widget(Element::new(Rect::new(0.0, 0.0, 80.0, 24.0)).clickable())
//!     .unwrap();
//!
//! view.push_event(InputEvent::Mouse(MouseEvent::ButtonPressed {
//!     button: MouseButton::Left,
//!     x: 10.0,
//!     y: 10.0,
//! }));
//! view.frame_with_dt(1.0 / 60.0);
//!
//! assert!(view.tree().get(button).unwrap().element().has_focus);
//! ```

pub mod capture;
pub mod draw;
pub mod error;
pub mod tree;
pub mod trigger;
pub mod view;
pub mod widget;

pub use capture::{capture_widget, DragShadow, WidgetCapture};
pub use draw::{
    DrawCommand, DrawSurface, EstimatedTextMeasure, RecordingSurface, TextLayout, TextMeasure,
    TextureId,
};
pub use error::{Result, ViewError};
pub use tree::{WidgetId, WidgetTree};
pub use trigger::{TargetRef, TriggerInbox, TriggerTarget, TRIGGER_TRUE};
pub use view::{FrameStats, View};
pub use widget::{Element, Interaction, Sprite, UpdateContext, Widget};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::draw::{DrawSurface, RecordingSurface};
    pub use crate::tree::WidgetId;
    pub use crate::view::View;
    pub use crate::widget::{Element, UpdateContext, Widget};
    pub use tessera_animation::{Checkpoint, CheckpointKind, PassiveAnimation};
    pub use tessera_core::{Color, LayerMask, Point, Rect, Size, Vec2, ViewConfig, Visuals};
}
