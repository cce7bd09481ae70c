//! Headless View Demo
//!
//! Drives a small widget tree with scripted input and a fixed timestep, and
//! logs what happened. Nothing is rendered; drawing goes to a recording
//! surface whose command count is reported every second of simulated time.
//!
//! Features demonstrated:
//! - Click arbitration and triggers between widgets
//! - Frame-rate-normalized fades driven by a trigger
//! - Elastic bouncing inside the viewport
//! - Checkpoint paths with a passive rotation
//!
//! Run with: cargo run -p tessera_view --example headless [config.toml]

use anyhow::Result;
use tessera_animation::{Checkpoint, PassiveAnimation};
use tessera_core::{Color, LayerMask, Point, Rect, Vec2, ViewConfig, Visuals};
use tessera_platform::{Event, InputEvent, MouseButton, MouseEvent, ScriptedInput};
use tessera_view::{Element, RecordingSurface, UpdateContext, View, Widget};

const DEFAULT_CONFIG: &str = r#"
width = 640.0
height = 480.0
reference_frame_rate = 60.0
"#;

/// Toggles the panel's visibility through a trigger
struct FadeButton {
    element: Element,
}

impl Widget for FadeButton {
    fn element(&self) -> &Element {
        &self.element
    }

    fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) -> tessera_view::Result<()> {
        if self.element.update(ctx).clicked {
            self.element.state_num ^= 1;
            tracing::info!("button clicked, state {}", self.element.state_num);
            ctx.send_triggers();
        }
        Ok(())
    }
}

/// Fades out on "hide", back in on "show"
struct Panel {
    element: Element,
}

impl Widget for Panel {
    fn element(&self) -> &Element {
        &self.element
    }

    fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) -> tessera_view::Result<()> {
        if self.element.take_trigger("hide").is_some() {
            self.element.fade.set_fade(0, 8.0, LayerMask::ALL);
        }
        if self.element.take_trigger("show").is_some() {
            self.element.fade.set_fade(255, 8.0, LayerMask::ALL);
        }
        self.element.update(ctx);
        Ok(())
    }
}

/// Walks a square path once, spinning the whole way
struct Badge {
    element: Element,
    started: bool,
}

impl Widget for Badge {
    fn element(&self) -> &Element {
        &self.element
    }

    fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) -> tessera_view::Result<()> {
        if !self.started {
            self.started = true;
            self.element.animate(
                ctx,
                [
                    Checkpoint::slide(Point::new(100.0, 0.0), 200.0),
                    Checkpoint::decelerate(Point::new(0.0, 100.0), 200.0),
                    Checkpoint::accelerate(Point::new(-100.0, 0.0), 200.0),
                    Checkpoint::slide(Point::new(0.0, -100.0), 200.0),
                ],
                true,
            );
            self.element.set_passive(ctx, PassiveAnimation::Rotate { degrees_per_frame: 4.0 });
        }
        self.element.update(ctx);
        Ok(())
    }
}

fn click(x: f32, y: f32) -> Vec<Event> {
    vec![
        InputEvent::Mouse(MouseEvent::Moved { x, y }).into(),
        InputEvent::Mouse(MouseEvent::ButtonPressed {
            button: MouseButton::Left,
            x,
            y,
        })
        .into(),
    ]
}

fn release(x: f32, y: f32) -> Vec<Event> {
    vec![InputEvent::Mouse(MouseEvent::ButtonReleased {
        button: MouseButton::Left,
        x,
        y,
    })
    .into()]
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => ViewConfig::load(path)?,
        None => ViewConfig::from_toml_str(DEFAULT_CONFIG)?,
    };
    let mut view = View::new(config);

    let panel = view.add_widget(Panel {
        element: Element::new(Rect::new(200.0, 40.0, 240.0, 160.0))
            .named("panel")
            .with_visuals(Visuals::new().fill(Color::from_hex(0x3366cc)).outline(Color::WHITE)),
    })?;

    let mut button = FadeButton {
        element: Element::new(Rect::new(20.0, 20.0, 120.0, 32.0))
            .named("toggle")
            .with_label("Toggle panel")
            .clickable()
            .highlightable()
            .with_visuals(
                Visuals::new()
                    .fill(Color::GRAY)
                    .text(Color::BLACK)
                    .highlight(Color::rgba(255, 255, 255, 64)),
            ),
    };
    button.element.add_trigger_target_when(panel, "hide", 1);
    button.element.add_trigger_tag_when("panel", "show", 0);
    view.add_widget(button)?;

    let ball = view.add_widget(
        Element::new(Rect::new(300.0, 300.0, 24.0, 24.0))
            .named("ball")
            .with_visuals(Visuals::new().fill(Color::RED)),
    )?;
    if let Some(widget) = view.tree_mut().get_mut(ball) {
        let element = widget.element_mut();
        element.mover.set_elasticity(Some(0.8));
        element.mover.friction = 20.0;
        element.mover.push(0.6, 600.0);
        element.mover.accelerate(std::f32::consts::FRAC_PI_2, 300.0);
    }

    view.add_widget(Badge {
        element: Element::new(Rect::new(40.0, 300.0, 32.0, 32.0))
            .named("badge")
            .with_visuals(Visuals::new().fill(Color::GREEN)),
        started: false,
    })?;

    let mut source = ScriptedInput::new()
        .frame(click(60.0, 30.0))
        .frame(release(60.0, 30.0));
    for _ in 0..60 {
        source = source.frame(Vec::new());
    }
    source = source.frame(click(60.0, 30.0)).frame(release(60.0, 30.0));

    let mut surface = RecordingSurface::new(view.viewport());
    for frame in 0..240 {
        view.pump(&mut source)?;
        let stats = view.frame_with_dt(1.0 / 60.0);

        surface.clear();
        view.draw(&mut surface);

        if frame % 60 == 0 {
            let ball_pos = view
                .tree()
                .get(ball)
                .map(|w| w.element().transform.position);
            let panel_alpha = view
                .tree()
                .get(panel)
                .and_then(|w| w.element().visuals.fill)
                .map(|c| c.a);
            tracing::info!(
                "frame {}: {} draw commands, ball at {:?}, panel alpha {:?}, {} animation(s)",
                frame,
                surface.commands().len(),
                ball_pos,
                panel_alpha,
                view.animations().len()
            );
        }
        if stats.update_errors > 0 {
            tracing::warn!("frame {}: {} widget update(s) failed", frame, stats.update_errors);
        }
    }

    let velocity: Vec2 = view
        .tree()
        .get(ball)
        .map(|w| w.element().mover.velocity)
        .unwrap_or_default();
    tracing::info!("done; ball velocity {:?}", velocity);
    Ok(())
}
