//! Off-screen widget capture and drag shadows
//!
//! A capture draws one widget into a process-wide [`RecordingSurface`] and
//! keeps the resulting commands. The shared surface is the only state in the
//! toolkit touched under a lock, held for the duration of a single capture.

use std::sync::{Mutex, OnceLock, PoisonError};

use tessera_core::{Rect, Size};

use crate::draw::{DrawCommand, DrawSurface, RecordingSurface};
use crate::error::Result;
use crate::widget::{Element, UpdateContext, Widget};

/// Default opacity of a drag shadow (0..=255)
pub const DRAG_SHADOW_OPACITY: u8 = 128;

static CAPTURE_SURFACE: OnceLock<Mutex<RecordingSurface>> = OnceLock::new();

/// Recorded drawing of a widget, anchored at its bounds
#[derive(Clone, Debug, PartialEq)]
pub struct WidgetCapture {
    pub commands: Vec<DrawCommand>,
    /// Widget bounds at capture time
    pub bounds: Rect,
}

/// Draw `widget` off-screen and keep the commands
pub fn capture_widget(widget: &dyn Widget) -> WidgetCapture {
    let surface = CAPTURE_SURFACE.get_or_init(|| Mutex::new(RecordingSurface::new(Size::ZERO)));
    // A panic mid-capture leaves nothing worth protecting; reuse the surface
    let mut surface = surface.lock().unwrap_or_else(PoisonError::into_inner);

    let bounds = widget.element().bounds();
    surface.clear();
    surface.set_viewport(bounds.size);
    widget.draw(&mut *surface);

    WidgetCapture {
        commands: surface.take_commands(),
        bounds,
    }
}

/// Translucent copy of a widget that follows the mouse until release
///
/// The view registers the shadow as a trailing item when it spawns it. On
/// the first frame the left button is up, the shadow stops trailing and
/// removes itself.
#[derive(Clone, Debug)]
pub struct DragShadow {
    element: Element,
    capture: WidgetCapture,
    opacity: u8,
}

impl DragShadow {
    pub fn new(capture: WidgetCapture) -> Self {
        Self {
            element: Element::new(capture.bounds),
            capture,
            opacity: DRAG_SHADOW_OPACITY,
        }
    }

    pub fn with_opacity(mut self, opacity: u8) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn capture(&self) -> &WidgetCapture {
        &self.capture
    }
}

impl Widget for DragShadow {
    fn element(&self) -> &Element {
        &self.element
    }

    fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) -> Result<()> {
        if !ctx.input().left_down() {
            let id = ctx.id();
            ctx.input_mut().release_mouse_capture(id.to_raw());
            ctx.remove_self();
        }
        Ok(())
    }

    fn draw(&self, surface: &mut dyn DrawSurface) {
        if !self.element.visible {
            return;
        }
        let offset = self.element.transform.top_left() - self.capture.bounds.origin;
        for command in &self.capture.commands {
            command.replay(surface, offset, self.opacity);
        }
    }
}
