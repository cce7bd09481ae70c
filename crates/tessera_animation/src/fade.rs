//! Alpha fades over a widget's visual layers
//!
//! Every frame each enabled layer moves `ceil(rate · frame_scale)` alpha
//! steps toward the target, where `frame_scale` is the clock's
//! `reference_fps / actual_fps`. At half the reference frame rate each
//! frame takes twice the step, so the fade takes the same wall-clock time.

use smallvec::SmallVec;
use tessera_core::{HasAlpha, Layer, LayerMask, Visuals};

const STEP_EPSILON: f32 = 1e-3;

/// Target-alpha fade state for one widget
#[derive(Clone, Debug, PartialEq)]
pub struct FadeController {
    active: bool,
    target_alpha: u8,
    rate: f32,
    layers: LayerMask,
}

impl Default for FadeController {
    fn default() -> Self {
        Self {
            active: false,
            target_alpha: 255,
            rate: 0.0,
            layers: LayerMask::ALL,
        }
    }
}

impl FadeController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start fading `layers` toward `target_alpha` at `rate` alpha steps per reference frame
    pub fn set_fade(&mut self, target_alpha: u8, rate: f32, layers: LayerMask) {
        self.active = true;
        self.target_alpha = target_alpha;
        self.rate = rate.abs();
        self.layers = layers;
    }

    pub fn fade_in(&mut self, rate: f32) {
        self.set_fade(255, rate, LayerMask::ALL);
    }

    pub fn fade_out(&mut self, rate: f32) {
        self.set_fade(0, rate, LayerMask::ALL);
    }

    pub fn cancel(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn target_alpha(&self) -> u8 {
        self.target_alpha
    }

    pub fn layers(&self) -> LayerMask {
        self.layers
    }

    /// Alpha step applied per frame at the given frame scale
    pub fn step(&self, frame_scale: f32) -> u8 {
        // Averaged frame times carry float noise: 8.0000005 must still be 8
        ((self.rate * frame_scale) - STEP_EPSILON)
            .ceil()
            .clamp(1.0, 255.0) as u8
    }

    /// Advance the fade by one frame; returns whether it is still running
    pub fn apply(&mut self, visuals: &mut Visuals, frame_scale: f32) -> bool {
        if !self.active {
            return false;
        }

        let step = self.step(frame_scale);
        let layers: SmallVec<[Layer; 5]> = visuals.present(self.layers).collect();
        for layer in layers {
            if let Some(color) = visuals.layer_mut(layer) {
                color.fade_toward(self.target_alpha, step);
            }
        }

        if self.fade_complete(visuals) {
            self.active = false;
        }
        self.active
    }

    /// Whether every enabled layer already sits at the target alpha
    pub fn fade_complete(&self, visuals: &Visuals) -> bool {
        visuals
            .present(self.layers)
            .filter_map(|layer| visuals.layer(layer))
            .all(|color| color.alpha() == self.target_alpha)
    }
}
