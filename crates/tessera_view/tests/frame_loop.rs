//! End-to-end frame loop behavior: overlapping buttons, triggers and
//! state-gated triggers, driven through scripted platform input.

use tessera_core::{Color, Rect, ViewConfig, Visuals};
use tessera_platform::{Event, InputEvent, MouseButton, MouseEvent, ScriptedInput, WindowEvent};
use tessera_view::{DrawCommand, Element, RecordingSurface, Result, UpdateContext, View, Widget};

const DT: f32 = 1.0 / 60.0;

/// Two-state button: every click flips `state_num` and fires its triggers
struct ToggleButton {
    element: Element,
}

impl ToggleButton {
    fn new(name: &str, rect: Rect) -> Self {
        Self {
            element: Element::new(rect)
                .named(name)
                .clickable()
                .highlightable()
                .with_visuals(Visuals::new().fill(Color::GRAY).highlight(Color::WHITE)),
        }
    }
}

impl Widget for ToggleButton {
    fn element(&self) -> &Element {
        &self.element
    }

    fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) -> Result<()> {
        let interaction = self.element.update(ctx);
        if interaction.clicked {
            self.element.state_num = (self.element.state_num + 1) % 2;
            ctx.send_triggers();
        }
        Ok(())
    }
}

fn click_at(x: f32, y: f32) -> Vec<Event> {
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

fn release_at(x: f32, y: f32) -> Vec<Event> {
    vec![InputEvent::Mouse(MouseEvent::ButtonReleased {
        button: MouseButton::Left,
        x,
        y,
    })
    .into()]
}

fn run(view: &mut View, source: &mut ScriptedInput) {
    while source.remaining() > 0 {
        view.pump(source).unwrap();
        view.frame_with_dt(DT);
    }
}

fn button<'a>(view: &'a View, name: &str) -> &'a Element {
    let id = view.tree().get_element_by_id(name).unwrap();
    view.tree().get(id).unwrap().element()
}

fn state(view: &View, name: &str) -> u32 {
    button(view, name).state_num
}

#[test]
fn overlapping_buttons_only_first_updated_gets_the_click() {
    let mut view = View::new(ViewConfig::default());
    view.add_widget(ToggleButton::new("front", Rect::new(0.0, 0.0, 100.0, 40.0)))
        .unwrap();
    view.add_widget(ToggleButton::new("back", Rect::new(50.0, 0.0, 100.0, 40.0)))
        .unwrap();

    let mut source = ScriptedInput::new().frame(click_at(75.0, 20.0));
    run(&mut view, &mut source);

    assert_eq!(state(&view, "front"), 1);
    assert_eq!(state(&view, "back"), 0);
    assert!(button(&view, "front").highlighted);
    assert!(!button(&view, "back").highlighted);
    assert!(button(&view, "front").has_focus);
}

#[test]
fn capture_tokens_reset_every_frame() {
    let mut view = View::new(ViewConfig::default());
    view.add_widget(ToggleButton::new("a", Rect::new(0.0, 0.0, 40.0, 40.0)))
        .unwrap();

    let mut source = ScriptedInput::new()
        .frame(click_at(10.0, 10.0))
        .frame(release_at(10.0, 10.0))
        .frame(click_at(10.0, 10.0));
    view.pump(&mut source).unwrap();
    view.frame_with_dt(DT);
    assert!(view.input().is_mouse_captured());

    view.pump(&mut source).unwrap();
    view.frame_with_dt(DT);
    assert!(!view.input().is_mouse_captured());

    view.pump(&mut source).unwrap();
    view.frame_with_dt(DT);
    // Clicked twice: back to state 0
    assert_eq!(state(&view, "a"), 0);
}

#[test]
fn trigger_parameters_arrive_in_order() {
    struct Recorder {
        element: Element,
        seen: Vec<String>,
    }

    impl Widget for Recorder {
        fn element(&self) -> &Element {
            &self.element
        }

        fn element_mut(&mut self) -> &mut Element {
            &mut self.element
        }

        fn update(&mut self, ctx: &mut UpdateContext<'_>) -> Result<()> {
            while let Some(param) = self.element.take_trigger("toggle") {
                self.seen.push(param);
            }
            self.element.label = Some(self.seen.join(","));
            self.element.update(ctx);
            Ok(())
        }
    }

    let mut view = View::new(ViewConfig::default());
    let mut sender = ToggleButton::new("sender", Rect::new(0.0, 0.0, 40.0, 40.0));
    sender.element.add_trigger_tag("recorder", "toggle");
    sender.element.add_trigger_tag("recorder", "toggle:fast");
    view.add_widget(sender).unwrap();
    let recorder = view
        .add_widget(Recorder {
            element: Element::new(Rect::new(200.0, 200.0, 10.0, 10.0)).named("recorder"),
            seen: Vec::new(),
        })
        .unwrap();

    let mut source = ScriptedInput::new().frame(click_at(10.0, 10.0));
    run(&mut view, &mut source);

    let label = view.tree().get(recorder).unwrap().element().label.clone();
    assert_eq!(label.as_deref(), Some("TRUE,fast"));
}

#[test]
fn conditional_trigger_follows_sender_state() {
    struct Lamp {
        element: Element,
        lit: u32,
    }

    impl Widget for Lamp {
        fn element(&self) -> &Element {
            &self.element
        }

        fn element_mut(&mut self) -> &mut Element {
            &mut self.element
        }

        fn update(&mut self, ctx: &mut UpdateContext<'_>) -> Result<()> {
            if self.element.take_trigger("on").is_some() {
                self.lit += 1;
                self.element.state_num = self.lit;
            }
            self.element.update(ctx);
            Ok(())
        }
    }

    let mut view = View::new(ViewConfig::default());
    let lamp = view
        .add_widget(Lamp {
            element: Element::new(Rect::new(300.0, 300.0, 10.0, 10.0)).named("lamp"),
            lit: 0,
        })
        .unwrap();
    let mut switch = ToggleButton::new("switch", Rect::new(0.0, 0.0, 40.0, 40.0));
    // Fires only when the click leaves the switch in state 1
    switch.element.add_trigger_target_when(lamp, "on", 1);
    view.add_widget(switch).unwrap();

    let mut source = ScriptedInput::new()
        .frame(click_at(10.0, 10.0)) // state 0 -> 1, fires
        .frame(release_at(10.0, 10.0))
        .frame(click_at(10.0, 10.0)) // state 1 -> 0, silent
        .frame(release_at(10.0, 10.0))
        .frame(click_at(10.0, 10.0)) // state 0 -> 1, fires
        .frame([]);
    run(&mut view, &mut source);

    let lamp_state = view.tree().get(lamp).unwrap().element().state_num;
    assert_eq!(lamp_state, 2);
}

#[test]
fn unfocused_window_claims_nothing() {
    let mut view = View::new(ViewConfig::default());
    view.add_widget(ToggleButton::new("a", Rect::new(0.0, 0.0, 40.0, 40.0)))
        .unwrap();

    let mut batch: Vec<Event> = vec![WindowEvent::Focused(false).into()];
    batch.extend(click_at(10.0, 10.0));
    let mut source = ScriptedInput::new().frame(batch);
    run(&mut view, &mut source);

    assert_eq!(state(&view, "a"), 0);
    assert!(view.input().mouse_free());
}

#[test]
fn highlight_is_drawn_for_hovered_button() {
    let mut view = View::new(ViewConfig::default());
    view.add_widget(ToggleButton::new("a", Rect::new(0.0, 0.0, 40.0, 40.0)))
        .unwrap();

    let mut source = ScriptedInput::new().frame([InputEvent::Mouse(MouseEvent::Moved {
        x: 5.0,
        y: 5.0,
    })
    .into()]);
    run(&mut view, &mut source);

    let mut surface = RecordingSurface::new(view.viewport());
    view.draw(&mut surface);
    assert_eq!(
        surface.commands(),
        &[
            DrawCommand::FillRect {
                rect: Rect::new(0.0, 0.0, 40.0, 40.0),
                color: Color::GRAY,
            },
            DrawCommand::FillRect {
                rect: Rect::new(0.0, 0.0, 40.0, 40.0),
                color: Color::WHITE,
            },
        ]
    );
}
