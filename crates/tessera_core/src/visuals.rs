//! Per-widget visual layers
//!
//! A widget is drawn from up to five colored layers. Any layer may be absent;
//! fades skip absent layers instead of inventing colors for them.

use crate::color::{Color, HasAlpha};

/// One visual layer of a widget
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    Fill,
    Outline,
    Text,
    Sprite,
    Highlight,
}

impl Layer {
    pub const ALL: [Layer; 5] = [
        Layer::Fill,
        Layer::Outline,
        Layer::Text,
        Layer::Sprite,
        Layer::Highlight,
    ];

    const fn bit(self) -> u8 {
        match self {
            Layer::Fill => 1 << 0,
            Layer::Outline => 1 << 1,
            Layer::Text => 1 << 2,
            Layer::Sprite => 1 << 3,
            Layer::Highlight => 1 << 4,
        }
    }
}

/// Set of layers, e.g. the layers that participate in a fade
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayerMask(u8);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(0b1_1111);

    pub const fn only(layer: Layer) -> Self {
        LayerMask(layer.bit())
    }

    pub const fn with(self, layer: Layer) -> Self {
        LayerMask(self.0 | layer.bit())
    }

    pub const fn without(self, layer: Layer) -> Self {
        LayerMask(self.0 & !layer.bit())
    }

    pub const fn contains(self, layer: Layer) -> bool {
        self.0 & layer.bit() != 0
    }

    pub fn iter(self) -> impl Iterator<Item = Layer> {
        Layer::ALL.into_iter().filter(move |l| self.contains(*l))
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        LayerMask::ALL
    }
}

impl From<Layer> for LayerMask {
    fn from(layer: Layer) -> Self {
        LayerMask::only(layer)
    }
}

/// Colors of a widget's visual layers
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Visuals {
    pub fill: Option<Color>,
    pub outline: Option<Color>,
    pub text: Option<Color>,
    pub sprite: Option<Color>,
    pub highlight: Option<Color>,
}

impl Visuals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill(mut self, color: Color) -> Self {
        self.fill = Some(color);
        self
    }

    pub fn outline(mut self, color: Color) -> Self {
        self.outline = Some(color);
        self
    }

    pub fn text(mut self, color: Color) -> Self {
        self.text = Some(color);
        self
    }

    pub fn sprite(mut self, color: Color) -> Self {
        self.sprite = Some(color);
        self
    }

    pub fn highlight(mut self, color: Color) -> Self {
        self.highlight = Some(color);
        self
    }

    pub fn layer(&self, layer: Layer) -> Option<Color> {
        match layer {
            Layer::Fill => self.fill,
            Layer::Outline => self.outline,
            Layer::Text => self.text,
            Layer::Sprite => self.sprite,
            Layer::Highlight => self.highlight,
        }
    }

    pub fn layer_mut(&mut self, layer: Layer) -> Option<&mut Color> {
        match layer {
            Layer::Fill => self.fill.as_mut(),
            Layer::Outline => self.outline.as_mut(),
            Layer::Text => self.text.as_mut(),
            Layer::Sprite => self.sprite.as_mut(),
            Layer::Highlight => self.highlight.as_mut(),
        }
    }

    /// Layers that are present, restricted to `mask`
    pub fn present(&self, mask: LayerMask) -> impl Iterator<Item = Layer> + '_ {
        mask.iter().filter(move |l| self.layer(*l).is_some())
    }
}

/// The alpha of the most visible layer
///
/// `set_alpha` flattens every present layer to one value, while
/// `fade_toward` steps each layer on its own so their differences survive
/// until they meet at the goal.
impl HasAlpha for Visuals {
    fn alpha(&self) -> u8 {
        Layer::ALL
            .iter()
            .filter_map(|l| self.layer(*l))
            .map(|c| c.a)
            .max()
            .unwrap_or(0)
    }

    fn set_alpha(&mut self, alpha: u8) {
        for layer in Layer::ALL {
            if let Some(color) = self.layer_mut(layer) {
                color.set_alpha(alpha);
            }
        }
    }

    fn fade_toward(&mut self, goal: u8, step: u8) -> bool {
        let mut pending = false;
        for layer in Layer::ALL {
            if let Some(color) = self.layer_mut(layer) {
                pending |= color.fade_toward(goal, step);
            }
        }
        pending
    }
}
