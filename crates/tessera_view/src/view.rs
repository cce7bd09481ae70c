//! The view and its frame loop
//!
//! ```text
//! clock.advance / tick
//!     ↓
//! input.reset(), apply queued events, input.advance(dt)
//!     ↓
//! widget updates in traversal order (+ trigger sends after each)
//!     ↓
//! trailing items follow the mouse
//!     ↓
//! scheduler tick, sweep finished entries
//!     ↓
//! deferred removals
//! ```
//!
//! Drawing is a separate call made by the host after the frame.

use tessera_animation::AnimationScheduler;
use tessera_core::{FrameClock, InputSnapshot, Rect, Size, ViewConfig};
use tessera_platform::{Event, InputSource};

use crate::capture::{capture_widget, DragShadow};
use crate::draw::{DrawSurface, TextMeasure};
use crate::error::{Result, ViewError};
use crate::tree::{WidgetId, WidgetTree};
use crate::widget::{UpdateContext, Widget};

/// What one call to [`View::frame`] did
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    /// Seconds simulated
    pub dt: f32,
    pub widgets_updated: usize,
    pub update_errors: usize,
    pub triggers_delivered: usize,
    pub animations_finished: usize,
}

/// Owns the widget tree, the input snapshot, the clock and the animation
/// scheduler of one window
pub struct View {
    config: ViewConfig,
    tree: WidgetTree,
    input: InputSnapshot,
    clock: FrameClock,
    animations: AnimationScheduler<WidgetId>,
    pending: Vec<Event>,
    viewport: Size,
    text_measure: Option<Box<dyn TextMeasure>>,
}

impl Default for View {
    fn default() -> Self {
        Self::new(ViewConfig::default())
    }
}

impl std::fmt::Debug for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View")
            .field("viewport", &self.viewport)
            .field("tree", &self.tree)
            .field("animations", &self.animations.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl View {
    pub fn new(config: ViewConfig) -> Self {
        Self {
            input: InputSnapshot::new(&config),
            clock: FrameClock::from_config(&config),
            viewport: Size::new(config.width, config.height),
            config,
            tree: WidgetTree::new(),
            animations: AnimationScheduler::new(),
            pending: Vec::new(),
            text_measure: None,
        }
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut WidgetTree {
        &mut self.tree
    }

    pub fn input(&self) -> &InputSnapshot {
        &self.input
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn animations(&self) -> &AnimationScheduler<WidgetId> {
        &self.animations
    }

    pub fn animations_mut(&mut self) -> &mut AnimationScheduler<WidgetId> {
        &mut self.animations
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Viewport as a rectangle at the origin; bounce bounds for widgets
    pub fn bounds(&self) -> Rect {
        self.viewport.to_rect()
    }

    pub fn close_requested(&self) -> bool {
        self.input.close_requested()
    }

    pub fn set_text_measure(&mut self, measure: impl TextMeasure + 'static) {
        self.text_measure = Some(Box::new(measure));
    }

    pub fn text_measure(&self) -> Option<&dyn TextMeasure> {
        self.text_measure.as_deref()
    }

    // =========================================================================
    // Widgets
    // =========================================================================

    /// Add a top-level widget; its mover gets the configured arrival speed
    pub fn add_widget(&mut self, widget: impl Widget + 'static) -> Result<WidgetId> {
        self.add(None, Box::new(widget))
    }

    pub fn add_child(&mut self, parent: WidgetId, widget: impl Widget + 'static) -> Result<WidgetId> {
        self.add(Some(parent), Box::new(widget))
    }

    fn add(&mut self, parent: Option<WidgetId>, mut widget: Box<dyn Widget>) -> Result<WidgetId> {
        widget
            .element_mut()
            .mover
            .set_min_arrival_speed(self.config.min_arrival_speed);
        self.tree.insert_boxed(parent, widget)
    }

    /// Remove a widget and its subtree, with their animations and trailing
    /// registrations; returns how many widgets were removed
    pub fn remove_widget(&mut self, id: WidgetId) -> Result<usize> {
        let removed = self.tree.remove(id)?;
        for rid in &removed {
            self.animations.remove_target(*rid);
            self.input.release_mouse_capture(rid.to_raw());
        }
        Ok(removed.len())
    }

    /// Capture `source` off-screen and add a translucent copy that trails
    /// the mouse until the left button is released
    pub fn spawn_drag_shadow(&mut self, source: WidgetId) -> Result<WidgetId> {
        let widget = self.tree.get(source).ok_or(ViewError::UnknownWidget(source))?;
        let capture = capture_widget(widget);
        let id = self.tree.insert(DragShadow::new(capture))?;
        self.input.mouse_capture(id.to_raw());
        tracing::debug!("View: drag shadow {:?} spawned from {:?}", id, source);
        Ok(id)
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Queue a platform event for the next frame
    pub fn push_event(&mut self, event: impl Into<Event>) {
        self.pending.push(event.into());
    }

    /// Poll `source` once and queue everything it returned
    pub fn pump(&mut self, source: &mut impl InputSource) -> Result<usize> {
        let events = source.poll_events()?;
        let count = events.len();
        self.pending.extend(events);
        Ok(count)
    }

    // =========================================================================
    // Frame loop
    // =========================================================================

    /// Run one frame timed by the wall clock
    pub fn frame(&mut self) -> FrameStats {
        let dt = self.clock.tick();
        self.run_frame(dt)
    }

    /// Run one frame of `dt` seconds (clamped by the clock)
    pub fn frame_with_dt(&mut self, dt: f32) -> FrameStats {
        let dt = self.clock.advance(dt);
        self.run_frame(dt)
    }

    fn run_frame(&mut self, dt: f32) -> FrameStats {
        let mut stats = FrameStats {
            dt,
            ..Default::default()
        };

        self.input.reset();
        for event in self.pending.drain(..) {
            self.input.apply(&event);
        }
        if let Some(size) = self.input.resized() {
            tracing::debug!("View: viewport resized to {:?}", size);
            self.viewport = size;
        }
        self.input.advance(dt);

        // Items grabbed during this frame start following on the next one
        let trailing: Vec<u64> = self.input.trailing_items().to_vec();

        let bounds = self.bounds();
        let mut removals = Vec::new();
        for id in self.tree.traversal_order() {
            let Some(widget) = self.tree.get_mut(id) else {
                continue;
            };
            let mut ctx = UpdateContext::new(
                &mut self.input,
                &mut self.animations,
                &self.clock,
                dt,
                bounds,
                id,
            );
            if let Err(err) = widget.update(&mut ctx) {
                tracing::error!("View: update of {:?} failed: {}", id, err);
                stats.update_errors += 1;
            }
            stats.widgets_updated += 1;

            let send = ctx.triggers_requested();
            if ctx.removal_requested() {
                removals.push(id);
            }
            if send {
                match self.tree.send_triggers(id) {
                    Ok(count) => stats.triggers_delivered += count,
                    Err(err) => tracing::warn!("View: trigger send from {:?} failed: {}", id, err),
                }
            }
        }

        self.move_trailing_items(&trailing);

        self.animations.tick(dt, &mut self.tree);
        for (animation, target) in self.animations.sweep_finished() {
            if let Some(widget) = self.tree.get_mut(target) {
                widget.element_mut().clear_animation(animation);
            }
            stats.animations_finished += 1;
        }
        if stats.animations_finished > 0 {
            tracing::trace!("View: swept {} finished animation(s)", stats.animations_finished);
        }

        for id in removals {
            if self.tree.contains(id) {
                if let Err(err) = self.remove_widget(id) {
                    tracing::warn!("View: deferred removal of {:?} failed: {}", id, err);
                }
            }
        }

        stats
    }

    /// Move widgets that trailed the mouse for the whole frame by its delta
    fn move_trailing_items(&mut self, trailing: &[u64]) {
        let delta = self.input.mouse_delta();
        for &raw in trailing {
            if !self.input.is_trailing(raw) {
                continue;
            }
            match self.tree.get_mut(WidgetId::from_raw(raw)) {
                Some(widget) => {
                    if !delta.is_zero() {
                        widget.element_mut().transform.translate(delta);
                    }
                }
                None => {
                    self.input.release_mouse_capture(raw);
                }
            }
        }
    }

    /// Draw every widget in traversal order
    pub fn draw(&self, surface: &mut dyn DrawSurface) {
        for id in self.tree.traversal_order() {
            if let Some(widget) = self.tree.get(id) {
                widget.draw(surface);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{DrawCommand, EstimatedTextMeasure, RecordingSurface};
    use crate::widget::{Element, Sprite};
    use tessera_animation::{AnimationId, Checkpoint, PassiveAnimation};
    use tessera_core::{Color, Point, Vec2};
    use tessera_platform::{
        InputEvent, MouseButton, MouseEvent, PlatformError, ScriptedInput, WindowEvent,
    };

    const DT: f32 = 1.0 / 60.0;

    fn moved(x: f32, y: f32) -> Event {
        InputEvent::Mouse(MouseEvent::Moved { x, y }).into()
    }

    fn pressed(x: f32, y: f32) -> Event {
        InputEvent::Mouse(MouseEvent::ButtonPressed {
            button: MouseButton::Left,
            x,
            y,
        })
        .into()
    }

    fn released(x: f32, y: f32) -> Event {
        InputEvent::Mouse(MouseEvent::ButtonReleased {
            button: MouseButton::Left,
            x,
            y,
        })
        .into()
    }

    #[test]
    fn test_resize_updates_viewport() {
        let mut view = View::default();
        view.push_event(WindowEvent::Resized {
            width: 320.0,
            height: 200.0,
        });
        view.frame_with_dt(DT);
        assert_eq!(view.viewport(), Size::new(320.0, 200.0));
        assert_eq!(view.bounds(), Rect::new(0.0, 0.0, 320.0, 200.0));
    }

    #[test]
    fn test_pump_queues_source_events() {
        let mut view = View::default();
        let mut source = ScriptedInput::new().frame([moved(5.0, 6.0), WindowEvent::CloseRequested.into()]);
        assert_eq!(view.pump(&mut source).unwrap(), 2);
        view.frame_with_dt(DT);
        assert_eq!(view.input().mouse_position(), Point::new(5.0, 6.0));
        assert!(view.close_requested());
    }

    #[test]
    fn test_pump_reports_disconnected_source() {
        let mut view = View::default();
        let mut source = ScriptedInput::new().frame([moved(1.0, 1.0)]).disconnect();
        assert_eq!(view.pump(&mut source).unwrap(), 1);
        assert!(matches!(
            view.pump(&mut source),
            Err(ViewError::Platform(PlatformError::Disconnected(_)))
        ));
    }

    fn sprite_tint(view: &View) -> Option<Color> {
        let mut surface = RecordingSurface::new(view.viewport());
        view.draw(&mut surface);
        surface.commands().iter().find_map(|command| match command {
            DrawCommand::Sprite { tint, .. } => Some(*tint),
            _ => None,
        })
    }

    fn sprite_only() -> Element {
        Element::new(Rect::new(10.0, 10.0, 16.0, 16.0))
            .with_sprite(Sprite::new(3, Size::new(16.0, 16.0)))
    }

    #[test]
    fn test_fade_out_reaches_sprite_only_element() {
        let mut view = View::default();
        let mut element = sprite_only();
        element.fade.fade_out(50.0);
        let id = view.add_widget(element).unwrap();

        view.frame_with_dt(DT);
        assert!(view.tree().get(id).unwrap().element().fade.is_active());
        for _ in 0..10 {
            view.frame_with_dt(DT);
        }

        assert!(!view.tree().get(id).unwrap().element().fade.is_active());
        assert_eq!(sprite_tint(&view).map(|c| c.a), Some(0));
    }

    #[test]
    fn test_passive_fade_out_on_sprite_is_swept_when_transparent() {
        let mut view = View::default();
        let id = view.add_widget(sprite_only()).unwrap();
        view.animations_mut()
            .set_passive(id, Point::new(10.0, 10.0), PassiveAnimation::FadeOut { rate: 6000.0 });

        let mut finished = 0;
        for _ in 0..10 {
            finished += view.frame_with_dt(DT).animations_finished;
        }
        assert_eq!(finished, 1);
        assert!(view.animations().is_empty());
        assert_eq!(sprite_tint(&view).map(|c| c.a), Some(0));
    }

    #[test]
    fn test_passive_fade_in_without_layers_is_swept() {
        let mut view = View::default();
        let id = view.add_widget(Element::default()).unwrap();
        view.animations_mut()
            .set_passive(id, Point::ZERO, PassiveAnimation::FadeIn { rate: 6000.0 });

        let mut finished = 0;
        for _ in 0..3 {
            finished += view.frame_with_dt(DT).animations_finished;
        }
        assert_eq!(finished, 1);
        assert!(view.animations().is_empty());
    }

    #[test]
    fn test_drag_moves_element_with_mouse() {
        let mut view = View::default();
        let id = view
            .add_widget(Element::new(Rect::new(0.0, 0.0, 20.0, 20.0)).draggable())
            .unwrap();

        view.push_event(moved(10.0, 10.0));
        view.push_event(pressed(10.0, 10.0));
        view.frame_with_dt(DT);
        assert!(view.input().is_trailing(id.to_raw()));

        view.push_event(moved(25.0, 40.0));
        view.frame_with_dt(DT);
        let position = view.tree().get(id).unwrap().element().transform.position;
        assert_eq!(position, Point::new(15.0, 30.0));

        view.push_event(released(25.0, 40.0));
        view.frame_with_dt(DT);
        assert!(!view.input().is_trailing(id.to_raw()));
        assert!(!view.tree().get(id).unwrap().element().is_dragging());
    }

    #[test]
    fn test_drag_shadow_follows_and_removes_itself() {
        let mut view = View::default();
        let source = view
            .add_widget(Element::new(Rect::new(0.0, 0.0, 20.0, 20.0)))
            .unwrap();

        view.push_event(moved(10.0, 10.0));
        view.push_event(pressed(10.0, 10.0));
        view.frame_with_dt(DT);

        let shadow = view.spawn_drag_shadow(source).unwrap();
        view.push_event(moved(20.0, 10.0));
        view.frame_with_dt(DT);
        let shadow_pos = view.tree().get(shadow).unwrap().element().transform.position;
        assert_eq!(shadow_pos, Point::new(10.0, 0.0));

        view.push_event(released(20.0, 10.0));
        view.frame_with_dt(DT);
        assert!(!view.tree().contains(shadow));
        assert!(view.input().trailing_items().is_empty());
        assert!(view.tree().contains(source));
    }

    #[test]
    fn test_remove_widget_drops_animation() {
        let mut view = View::default();
        let id = view.add_widget(Element::default()).unwrap();
        view.animations_mut().animate(
            id,
            Point::ZERO,
            [Checkpoint::slide(Point::new(500.0, 0.0), 10.0)],
            false,
        );

        assert_eq!(view.remove_widget(id).unwrap(), 1);
        assert!(view.animations().is_empty());
        assert!(matches!(view.remove_widget(id), Err(ViewError::UnknownWidget(_))));
    }

    #[test]
    fn test_scheduler_moves_widget_and_clears_handle() {
        struct Slider {
            element: Element,
            started: bool,
        }

        impl Widget for Slider {
            fn element(&self) -> &Element {
                &self.element
            }

            fn element_mut(&mut self) -> &mut Element {
                &mut self.element
            }

            fn update(&mut self, ctx: &mut UpdateContext<'_>) -> Result<()> {
                if !self.started {
                    self.started = true;
                    self.element
                        .animate(ctx, [Checkpoint::slide(Point::new(3.0, 0.0), 60.0)], false);
                }
                self.element.update(ctx);
                Ok(())
            }
        }

        let mut view = View::default();
        let id = view
            .add_widget(Slider {
                element: Element::new(Rect::new(0.0, 0.0, 5.0, 5.0)),
                started: false,
            })
            .unwrap();

        view.frame_with_dt(DT);
        assert!(view.tree().get(id).unwrap().element().animation().is_some());

        let mut finished = 0;
        for _ in 0..10 {
            finished += view.frame_with_dt(DT).animations_finished;
        }
        let element = view.tree().get(id).unwrap().element();
        assert_eq!(finished, 1);
        assert_eq!(element.transform.position, Point::new(3.0, 0.0));
        assert!(element.animation().is_none());
    }

    #[test]
    fn test_change_path_reuses_live_entry() {
        struct Rerouter {
            element: Element,
            frame: u32,
        }

        impl Widget for Rerouter {
            fn element(&self) -> &Element {
                &self.element
            }

            fn element_mut(&mut self) -> &mut Element {
                &mut self.element
            }

            fn update(&mut self, ctx: &mut UpdateContext<'_>) -> Result<()> {
                match self.frame {
                    0 => {
                        self.element.animate(
                            ctx,
                            [Checkpoint::slide(Point::new(100.0, 0.0), 60.0)],
                            false,
                        );
                    }
                    5 => {
                        self.element
                            .change_path(ctx, [Checkpoint::slide(Point::new(0.0, 50.0), 600.0)]);
                    }
                    _ => {}
                }
                self.frame += 1;
                self.element.update(ctx);
                Ok(())
            }
        }

        let mut view = View::default();
        let id = view
            .add_widget(Rerouter {
                element: Element::new(Rect::new(0.0, 0.0, 5.0, 5.0)),
                frame: 0,
            })
            .unwrap();

        view.frame_with_dt(DT);
        let first: Option<AnimationId> = view.tree().get(id).unwrap().element().animation();
        assert!(first.is_some());
        for _ in 0..5 {
            view.frame_with_dt(DT);
        }
        assert_eq!(view.tree().get(id).unwrap().element().animation(), first);
        assert_eq!(view.animations().len(), 1);

        for _ in 0..24 {
            view.frame_with_dt(DT);
        }
        let element = view.tree().get(id).unwrap().element();
        assert_eq!(element.transform.position, Point::new(0.0, 50.0));
        assert!(element.animation().is_none());
        assert!(view.animations().is_empty());
    }

    #[test]
    fn test_failing_widget_does_not_stop_frame() {
        struct Broken(Element);

        impl Widget for Broken {
            fn element(&self) -> &Element {
                &self.0
            }

            fn element_mut(&mut self) -> &mut Element {
                &mut self.0
            }

            fn update(&mut self, _ctx: &mut UpdateContext<'_>) -> Result<()> {
                Err(ViewError::Update("broken on purpose".into()))
            }
        }

        let mut view = View::default();
        view.add_widget(Broken(Element::default())).unwrap();
        let mover = view.add_widget(Element::default()).unwrap();
        view.tree_mut()
            .get_mut(mover)
            .unwrap()
            .element_mut()
            .mover
            .velocity = Vec2::new(60.0, 0.0);

        let stats = view.frame_with_dt(DT);
        assert_eq!(stats.update_errors, 1);
        assert_eq!(stats.widgets_updated, 2);
        let x = view.tree().get(mover).unwrap().element().transform.position.x;
        assert!((x - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_passive_rotation_keeps_entry_alive() {
        let mut view = View::default();
        let id = view.add_widget(Element::default()).unwrap();
        view.animations_mut().set_passive(
            id,
            Point::ZERO,
            PassiveAnimation::Rotate {
                degrees_per_frame: 90.0,
            },
        );

        view.frame_with_dt(DT);
        view.frame_with_dt(DT);
        assert_eq!(view.tree().get(id).unwrap().element().transform.rotation, 180.0);
        assert_eq!(view.animations().len(), 1);
    }

    #[test]
    fn test_draw_walks_traversal_order() {
        let mut view = View::default();
        view.set_text_measure(EstimatedTextMeasure);
        assert!(view.text_measure().is_some());

        let a = Element::new(Rect::new(0.0, 0.0, 5.0, 5.0))
            .with_visuals(tessera_core::Visuals::new().fill(tessera_core::Color::RED));
        let b = Element::new(Rect::new(5.0, 0.0, 5.0, 5.0))
            .with_visuals(tessera_core::Visuals::new().fill(tessera_core::Color::BLUE));
        view.add_widget(a).unwrap();
        view.add_widget(b).unwrap();

        let mut surface = RecordingSurface::new(view.viewport());
        view.draw(&mut surface);
        assert_eq!(surface.commands().len(), 2);
    }
}
