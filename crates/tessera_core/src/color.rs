//! 8-bit RGBA color and the alpha capability

/// RGBA color with 8-bit channels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const GRAY: Color = Color::rgb(128, 128, 128);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `0xRRGGBB` (fully opaque)
    pub fn from_hex(hex: u32) -> Self {
        Self::rgb(
            ((hex >> 16) & 0xFF) as u8,
            ((hex >> 8) & 0xFF) as u8,
            (hex & 0xFF) as u8,
        )
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

/// Anything whose visibility is driven by a single 8-bit alpha
///
/// Fades and passive animations only ever talk to this trait, so they work
/// the same on shapes, sprites and text runs.
pub trait HasAlpha {
    fn alpha(&self) -> u8;
    fn set_alpha(&mut self, alpha: u8);

    /// Move alpha toward `goal` by at most `step`, never past it
    ///
    /// Returns whether another step would still change something: false
    /// once the goal is reached, and false when the target ignored the write.
    fn fade_toward(&mut self, goal: u8, step: u8) -> bool {
        let current = self.alpha();
        let next = if current < goal {
            current.saturating_add(step).min(goal)
        } else {
            current.saturating_sub(step).max(goal)
        };
        self.set_alpha(next);
        let after = self.alpha();
        after != current && after != goal
    }
}

impl HasAlpha for Color {
    fn alpha(&self) -> u8 {
        self.a
    }

    fn set_alpha(&mut self, alpha: u8) {
        self.a = alpha;
    }
}
