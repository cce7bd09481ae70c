//! Widget placement state

use crate::geometry::{Point, Rect, Size, Vec2};

/// Placement of a widget: position, origin offset, size and rotation
///
/// `position` is the widget's origin point in view coordinates; the
/// top-left corner sits at `position - origin`. Rotation is in degrees,
/// kept in `[0, 360)`, and pivots around the origin point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Point,
    pub origin: Vec2,
    pub size: Size,
    pub rotation: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Point::ZERO,
            origin: Vec2::ZERO,
            size: Size::ZERO,
            rotation: 0.0,
        }
    }
}

impl Transform {
    pub fn new(position: Point, size: Size) -> Self {
        Self {
            position,
            size,
            ..Default::default()
        }
    }

    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect.origin, rect.size)
    }

    pub fn top_left(&self) -> Point {
        self.position - self.origin
    }

    pub fn set_top_left(&mut self, top_left: Point) {
        self.position = top_left + self.origin;
    }

    /// Unrotated rectangle covered by the widget
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.top_left(), self.size)
    }

    pub fn center(&self) -> Point {
        self.rect().center()
    }

    /// Move the origin without moving the widget on screen
    pub fn set_origin(&mut self, origin: Vec2) {
        let top_left = self.top_left();
        self.origin = origin;
        self.set_top_left(top_left);
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    pub fn rotate(&mut self, degrees: f32) {
        self.set_rotation(self.rotation + degrees);
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = degrees.rem_euclid(360.0);
    }
}
