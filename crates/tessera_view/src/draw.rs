//! Drawing collaborators
//!
//! The view never rasterizes anything itself. Widgets draw through the
//! [`DrawSurface`] trait; a backend implements it against its renderer.
//! [`RecordingSurface`] records [`DrawCommand`]s instead, for tests and for
//! off-screen widget captures that are replayed later.

use tessera_core::{Color, Point, Rect, Size, Vec2};

/// Handle of a texture owned by the drawing backend
pub type TextureId = u32;

/// Backend-facing drawing interface
pub trait DrawSurface {
    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f32);

    /// Draw `texture` stretched over `rect`, rotated by `rotation` degrees
    /// around the rect's center and modulated by `tint`
    fn sprite(&mut self, texture: TextureId, rect: Rect, rotation: f32, tint: Color);

    fn text(&mut self, text: &str, origin: Point, color: Color);

    /// Darken `rect` to mark a disabled widget
    fn dim(&mut self, rect: Rect);

    /// Size of the drawable area
    fn viewport(&self) -> Size;
}

/// A draw call that can be recorded and replayed
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    FillRect {
        rect: Rect,
        color: Color,
    },
    StrokeRect {
        rect: Rect,
        color: Color,
        width: f32,
    },
    Sprite {
        texture: TextureId,
        rect: Rect,
        rotation: f32,
        tint: Color,
    },
    Text {
        text: String,
        origin: Point,
        color: Color,
    },
    Dim {
        rect: Rect,
    },
}

impl DrawCommand {
    /// Re-issue this command on `surface`, shifted by `offset`, with every
    /// color's alpha scaled by `opacity` (0..=255)
    pub fn replay(&self, surface: &mut dyn DrawSurface, offset: Vec2, opacity: u8) {
        let fade = |color: Color| {
            color.with_alpha(((color.a as u16 * opacity as u16) / 255) as u8)
        };
        match self {
            DrawCommand::FillRect { rect, color } => {
                surface.fill_rect(rect.offset(offset), fade(*color));
            }
            DrawCommand::StrokeRect { rect, color, width } => {
                surface.stroke_rect(rect.offset(offset), fade(*color), *width);
            }
            DrawCommand::Sprite {
                texture,
                rect,
                rotation,
                tint,
            } => surface.sprite(*texture, rect.offset(offset), *rotation, fade(*tint)),
            DrawCommand::Text {
                text,
                origin,
                color,
            } => surface.text(text, *origin + offset, fade(*color)),
            DrawCommand::Dim { rect } => surface.dim(rect.offset(offset)),
        }
    }
}

/// A draw surface that records commands for later inspection or replay
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    viewport: Size,
}

impl RecordingSurface {
    pub fn new(viewport: Size) -> Self {
        Self {
            commands: Vec::new(),
            viewport,
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }
}

impl DrawSurface for RecordingSurface {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f32) {
        self.commands
            .push(DrawCommand::StrokeRect { rect, color, width });
    }

    fn sprite(&mut self, texture: TextureId, rect: Rect, rotation: f32, tint: Color) {
        self.commands.push(DrawCommand::Sprite {
            texture,
            rect,
            rotation,
            tint,
        });
    }

    fn text(&mut self, text: &str, origin: Point, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            origin,
            color,
        });
    }

    fn dim(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::Dim { rect });
    }

    fn viewport(&self) -> Size {
        self.viewport
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Text measurement
// ─────────────────────────────────────────────────────────────────────────────

/// Measured placement of a run of text
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextLayout {
    /// Top-left of each character, relative to the text origin
    pub glyph_positions: Vec<Point>,
    /// Bounding box relative to the text origin
    pub bounds: Rect,
}

/// Text measurement supplied by the drawing backend
///
/// Type-entry widgets use it to place a caret or map a click to a
/// character index.
pub trait TextMeasure {
    fn measure(&self, text: &str, font_size: f32) -> TextLayout;
}

/// Fixed-advance estimate for when no real measurer is available
#[derive(Clone, Copy, Debug, Default)]
pub struct EstimatedTextMeasure;

impl TextMeasure for EstimatedTextMeasure {
    fn measure(&self, text: &str, font_size: f32) -> TextLayout {
        // ~0.55em per character is a conservative advance for proportional fonts
        let advance = font_size * 0.55;
        let glyph_positions: Vec<Point> = (0..text.chars().count())
            .map(|i| Point::new(i as f32 * advance, 0.0))
            .collect();
        let width = glyph_positions.len() as f32 * advance;
        TextLayout {
            glyph_positions,
            bounds: Rect::new(0.0, 0.0, width, font_size * 1.2),
        }
    }
}
