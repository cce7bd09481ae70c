//! Widgets and their shared base state
//!
//! Every widget embeds an [`Element`]: placement, interaction flags,
//! kinematic and fade state, visual layers, sprites and trigger plumbing.
//! The [`Widget`] trait only asks for access to that element plus optional
//! `update`/`draw` overrides, so a concrete widget adds its own behavior on
//! top of the default arbitration instead of reimplementing it.
//!
//! # Interaction rules
//!
//! Within one frame, in traversal order:
//!
//! - an inactive or invisible element claims nothing and loses highlight
//! - **highlight**: hovered, `can_highlight`, focus token still free and won
//! - **click**: hovered, `can_click`, left pressed this frame, mouse token won;
//!   clicking sets `has_focus`, a left press elsewhere clears it
//! - **drag**: hovered, `can_drag`, left pressed this frame, mouse token won;
//!   the element trails the mouse until the left button comes up

use tessera_animation::{
    Animatable, AnimationId, AnimationScheduler, Checkpoint, FadeController, Mover,
    PassiveAnimation,
};
use tessera_core::{
    Color, FrameClock, HasAlpha, InputSnapshot, Point, Rect, Size, Transform, Vec2, Visuals,
};

use crate::draw::{DrawSurface, TextureId};
use crate::error::{Result, ViewError};
use crate::tree::WidgetId;
use crate::trigger::{TargetRef, TriggerInbox, TriggerTarget};

/// Per-widget view of the frame being updated
pub struct UpdateContext<'a> {
    input: &'a mut InputSnapshot,
    animations: &'a mut AnimationScheduler<WidgetId>,
    clock: &'a FrameClock,
    dt: f32,
    bounds: Rect,
    id: WidgetId,
    send_triggers: bool,
    remove_self: bool,
}

impl<'a> UpdateContext<'a> {
    pub(crate) fn new(
        input: &'a mut InputSnapshot,
        animations: &'a mut AnimationScheduler<WidgetId>,
        clock: &'a FrameClock,
        dt: f32,
        bounds: Rect,
        id: WidgetId,
    ) -> Self {
        Self {
            input,
            animations,
            clock,
            dt,
            bounds,
            id,
            send_triggers: false,
            remove_self: false,
        }
    }

    pub fn input(&self) -> &InputSnapshot {
        self.input
    }

    pub fn input_mut(&mut self) -> &mut InputSnapshot {
        self.input
    }

    pub fn animations(&mut self) -> &mut AnimationScheduler<WidgetId> {
        self.animations
    }

    pub fn clock(&self) -> &FrameClock {
        self.clock
    }

    /// Seconds elapsed this frame
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// `reference_fps / actual_fps`, for rate-based effects
    pub fn frame_scale(&self) -> f32 {
        self.clock.frame_scale()
    }

    /// Viewport rectangle; elastic widgets bounce inside it
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Id of the widget being updated
    pub fn id(&self) -> WidgetId {
        self.id
    }

    /// Deliver this widget's trigger targets right after its update returns
    pub fn send_triggers(&mut self) {
        self.send_triggers = true;
    }

    /// Remove this widget (and its children) once the traversal finishes
    pub fn remove_self(&mut self) {
        self.remove_self = true;
    }

    pub(crate) fn triggers_requested(&self) -> bool {
        self.send_triggers
    }

    pub(crate) fn removal_requested(&self) -> bool {
        self.remove_self
    }
}

/// What happened to an element during [`Element::interact`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Interaction {
    pub hovered: bool,
    pub highlighted: bool,
    pub clicked: bool,
    pub drag_started: bool,
    pub drag_ended: bool,
}

/// A textured quad drawn relative to the element's top-left corner
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sprite {
    pub texture: TextureId,
    pub offset: Vec2,
    pub size: Size,
}

impl Sprite {
    pub fn new(texture: TextureId, size: Size) -> Self {
        Self {
            texture,
            offset: Vec2::ZERO,
            size,
        }
    }

    pub fn at(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }
}

/// Base state shared by every widget
#[derive(Clone, Debug)]
pub struct Element {
    /// Lookup name for [`crate::WidgetTree::get_element_by_id`]
    pub name: Option<String>,
    pub label: Option<String>,
    pub transform: Transform,

    pub active: bool,
    pub visible: bool,
    pub highlighted: bool,
    pub has_focus: bool,

    pub can_highlight: bool,
    pub can_click: bool,
    pub can_drag: bool,

    pub mover: Mover,
    pub fade: FadeController,
    pub visuals: Visuals,
    sprites: Vec<Sprite>,

    /// Discrete widget state, e.g. a toggle index; selects the sprite drawn
    pub state_num: u32,

    trigger_targets: Vec<TriggerTarget>,
    inbox: TriggerInbox,

    animation: Option<AnimationId>,
    dragging: bool,
    id: Option<WidgetId>,
}

impl Default for Element {
    fn default() -> Self {
        Self::new(Rect::ZERO)
    }
}

impl Element {
    pub fn new(rect: Rect) -> Self {
        Self {
            name: None,
            label: None,
            transform: Transform::from_rect(rect),
            active: true,
            visible: true,
            highlighted: false,
            has_focus: false,
            can_highlight: false,
            can_click: false,
            can_drag: false,
            mover: Mover::new(),
            fade: FadeController::new(),
            visuals: Visuals::new(),
            sprites: Vec::new(),
            state_num: 0,
            trigger_targets: Vec::new(),
            inbox: TriggerInbox::new(),
            animation: None,
            dragging: false,
            id: None,
        }
    }

    // =========================================================================
    // Builder
    // =========================================================================

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_visuals(mut self, visuals: Visuals) -> Self {
        self.visuals = visuals;
        self.materialize_sprite_tint();
        self
    }

    /// Add a sprite; an element without a sprite tint gets opaque white
    pub fn with_sprite(mut self, sprite: Sprite) -> Self {
        self.sprites.push(sprite);
        self.materialize_sprite_tint();
        self
    }

    pub fn highlightable(mut self) -> Self {
        self.can_highlight = true;
        self
    }

    pub fn clickable(mut self) -> Self {
        self.can_click = true;
        self
    }

    pub fn draggable(mut self) -> Self {
        self.can_drag = true;
        self
    }

    // =========================================================================
    // Identity and geometry
    // =========================================================================

    /// Id assigned when the element's widget was inserted into a tree
    pub fn id(&self) -> Option<WidgetId> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: WidgetId) {
        self.id = Some(id);
    }

    /// Sprite-only elements have sprites and neither fill nor outline
    pub fn is_sprite_only(&self) -> bool {
        !self.sprites.is_empty() && self.visuals.fill.is_none() && self.visuals.outline.is_none()
    }

    /// Hit-test rectangle
    pub fn bounds(&self) -> Rect {
        if self.is_sprite_only() {
            let mut rects = self.sprites.iter().map(|s| self.sprite_rect(s));
            let first = rects.next().unwrap_or_default();
            rects.fold(first, |acc, r| acc.union(&r))
        } else {
            self.transform.rect()
        }
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn sprite(&self, index: usize) -> Result<&Sprite> {
        self.sprites.get(index).ok_or(ViewError::SpriteOutOfRange {
            index,
            len: self.sprites.len(),
        })
    }

    /// Sprites draw white when no tint is set; make that tint a real layer
    /// so fades can reach it
    fn materialize_sprite_tint(&mut self) {
        if !self.sprites.is_empty() && self.visuals.sprite.is_none() {
            self.visuals.sprite = Some(Color::WHITE);
        }
    }

    pub fn sprite_rect(&self, sprite: &Sprite) -> Rect {
        Rect::from_origin_size(self.transform.top_left() + sprite.offset, sprite.size)
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    // =========================================================================
    // Per-frame behavior
    // =========================================================================

    /// Arbitration, motion and fading for one frame
    pub fn update(&mut self, ctx: &mut UpdateContext<'_>) -> Interaction {
        let interaction = self.interact(ctx.input_mut());
        let bounds = ctx.bounds();
        self.mover.update(&mut self.transform, ctx.dt(), Some(bounds));
        self.materialize_sprite_tint();
        self.fade.apply(&mut self.visuals, ctx.frame_scale());
        interaction
    }

    /// Claim highlight, click and drag against the frame's capture tokens
    pub fn interact(&mut self, input: &mut InputSnapshot) -> Interaction {
        let mut result = Interaction::default();

        if self.dragging && !input.left_down() {
            self.end_drag(input);
            result.drag_ended = true;
        }

        if !self.active || !self.visible {
            self.highlighted = false;
            if self.dragging {
                self.end_drag(input);
                result.drag_ended = true;
            }
            return result;
        }

        let hovered = input.mouse_inside() && self.bounds().contains(input.mouse_position());
        result.hovered = hovered;

        self.highlighted =
            hovered && self.can_highlight && input.focus_free() && input.capture_focus();
        result.highlighted = self.highlighted;

        if input.left_pressed() {
            let grabbed =
                hovered && (self.can_click || self.can_drag) && input.capture_mouse();
            if grabbed && self.can_click {
                self.has_focus = true;
                result.clicked = true;
            } else if !hovered {
                self.has_focus = false;
            }
            if grabbed && self.can_drag {
                self.begin_drag(input);
                result.drag_started = true;
            }
        }

        result
    }

    fn begin_drag(&mut self, input: &mut InputSnapshot) {
        self.dragging = true;
        if let Some(id) = self.id {
            input.mouse_capture(id.to_raw());
        }
    }

    fn end_drag(&mut self, input: &mut InputSnapshot) {
        self.dragging = false;
        if let Some(id) = self.id {
            input.release_mouse_capture(id.to_raw());
        }
    }

    /// Start a kinematic move-to from the current position
    pub fn move_to(&mut self, target: Point, speed: f32, drag: f32) {
        self.mover.move_to(self.transform.position, target, speed, drag);
    }

    /// Halt any move-to, velocity and acceleration immediately
    pub fn stop(&mut self) {
        self.mover.stop();
    }

    // =========================================================================
    // Checkpoint animations
    // =========================================================================

    /// Append a checkpoint path in the view's scheduler
    pub fn animate(
        &mut self,
        ctx: &mut UpdateContext<'_>,
        path: impl IntoIterator<Item = Checkpoint>,
        cumulative: bool,
    ) -> AnimationId {
        let id = ctx.id();
        let animation = ctx
            .animations()
            .animate(id, self.transform.position, path, cumulative);
        self.animation = Some(animation);
        animation
    }

    /// Replace the pending path, continuing from the current position
    pub fn change_path(
        &mut self,
        ctx: &mut UpdateContext<'_>,
        path: impl IntoIterator<Item = Checkpoint>,
    ) -> AnimationId {
        let position = self.transform.position;
        if let Some(animation) = self.animation {
            if let Some(entry) = ctx.animations().entry_mut(animation) {
                entry.change_path(position, path);
                return animation;
            }
        }
        let id = ctx.id();
        let animation = ctx.animations().animate(id, position, path, false);
        self.animation = Some(animation);
        animation
    }

    pub fn set_passive(&mut self, ctx: &mut UpdateContext<'_>, passive: PassiveAnimation) -> AnimationId {
        let id = ctx.id();
        let animation = ctx
            .animations()
            .set_passive(id, self.transform.position, passive);
        self.animation = Some(animation);
        animation
    }

    pub fn animation(&self) -> Option<AnimationId> {
        self.animation
    }

    /// Forget `animation` if it is the one this element holds
    pub fn clear_animation(&mut self, animation: AnimationId) {
        if self.animation == Some(animation) {
            self.animation = None;
        }
    }

    // =========================================================================
    // Triggers
    // =========================================================================

    pub fn add_trigger_target(&mut self, target: WidgetId, signal: impl Into<String>) {
        self.trigger_targets
            .push(TriggerTarget::new(TargetRef::Resolved(target), signal));
    }

    /// Send `signal` to `target` only while this element is in `state`
    pub fn add_trigger_target_when(
        &mut self,
        target: WidgetId,
        signal: impl Into<String>,
        state: u32,
    ) {
        self.trigger_targets
            .push(TriggerTarget::new(TargetRef::Resolved(target), signal).when(state));
    }

    /// Address a target by name; resolved on first send
    pub fn add_trigger_tag(&mut self, tag: impl Into<String>, signal: impl Into<String>) {
        self.trigger_targets
            .push(TriggerTarget::new(TargetRef::Unresolved(tag.into()), signal));
    }

    pub fn add_trigger_tag_when(
        &mut self,
        tag: impl Into<String>,
        signal: impl Into<String>,
        state: u32,
    ) {
        self.trigger_targets
            .push(TriggerTarget::new(TargetRef::Unresolved(tag.into()), signal).when(state));
    }

    pub fn trigger_targets(&self) -> &[TriggerTarget] {
        &self.trigger_targets
    }

    pub(crate) fn take_trigger_targets(&mut self) -> Vec<TriggerTarget> {
        std::mem::take(&mut self.trigger_targets)
    }

    pub(crate) fn restore_trigger_targets(&mut self, targets: Vec<TriggerTarget>) {
        let added = std::mem::replace(&mut self.trigger_targets, targets);
        self.trigger_targets.extend(added);
    }

    pub fn receive_trigger(&mut self, signal: impl Into<String>) {
        self.inbox.push(signal);
    }

    /// Consume the oldest signal starting with `prefix`
    ///
    /// Returns its parameter, `"TRUE"` for a bare signal, or `None`.
    pub fn take_trigger(&mut self, prefix: &str) -> Option<String> {
        self.inbox.take(prefix)
    }

    pub fn has_trigger(&self, prefix: &str) -> bool {
        self.inbox.has(prefix)
    }

    pub fn inbox(&self) -> &TriggerInbox {
        &self.inbox
    }

    // =========================================================================
    // Drawing
    // =========================================================================

    pub fn draw(&self, surface: &mut dyn DrawSurface) {
        if !self.visible {
            return;
        }

        let rect = self.transform.rect();
        if let Some(fill) = self.visuals.fill {
            surface.fill_rect(rect, fill);
        }

        if !self.sprites.is_empty() {
            match self.sprite(self.state_num as usize) {
                Ok(sprite) => surface.sprite(
                    sprite.texture,
                    self.sprite_rect(sprite),
                    self.transform.rotation,
                    self.visuals.sprite.unwrap_or(Color::WHITE),
                ),
                Err(err) => tracing::warn!("{:?}: no sprite for state: {}", self.name, err),
            }
        }

        if self.highlighted {
            if let Some(highlight) = self.visuals.highlight {
                surface.fill_rect(rect, highlight);
            }
        }

        if let Some(outline) = self.visuals.outline {
            surface.stroke_rect(rect, outline, 1.0);
        }

        if let (Some(label), Some(color)) = (&self.label, self.visuals.text) {
            surface.text(label, self.transform.top_left(), color);
        }

        if !self.active {
            surface.dim(self.bounds());
        }
    }
}

impl HasAlpha for Element {
    fn alpha(&self) -> u8 {
        if !self.sprites.is_empty() && self.visuals.sprite.is_none() {
            return u8::MAX;
        }
        self.visuals.alpha()
    }

    fn set_alpha(&mut self, alpha: u8) {
        self.materialize_sprite_tint();
        self.visuals.set_alpha(alpha);
    }

    fn fade_toward(&mut self, goal: u8, step: u8) -> bool {
        self.materialize_sprite_tint();
        self.visuals.fade_toward(goal, step)
    }
}

impl Animatable for Element {
    fn position(&self) -> Point {
        self.transform.position
    }

    fn set_position(&mut self, position: Point) {
        self.transform.position = position;
    }

    fn rotation(&self) -> f32 {
        self.transform.rotation
    }

    fn set_rotation(&mut self, degrees: f32) {
        self.transform.set_rotation(degrees);
    }
}

/// A node of the widget tree
pub trait Widget {
    fn element(&self) -> &Element;

    fn element_mut(&mut self) -> &mut Element;

    /// Per-frame update; the default runs the element's arbitration,
    /// motion and fade
    fn update(&mut self, ctx: &mut UpdateContext<'_>) -> Result<()> {
        self.element_mut().update(ctx);
        Ok(())
    }

    fn draw(&self, surface: &mut dyn DrawSurface) {
        self.element().draw(surface);
    }
}

/// A bare element is a passive widget
impl Widget for Element {
    fn element(&self) -> &Element {
        self
    }

    fn element_mut(&mut self) -> &mut Element {
        self
    }
}
