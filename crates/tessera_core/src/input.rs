//! Per-frame input snapshot and capture arbitration
//!
//! One [`InputSnapshot`] lives as long as its view and is mutated in place
//! every frame:
//!
//! ```text
//! reset()            clear edges, wheel, text, both capture tokens
//!     ↓
//! apply(event)*      fold the platform events of this frame in
//!     ↓
//! advance(dt)        hold timers, mouse trace
//!     ↓
//! widget updates     capture_mouse() / capture_focus(), first caller wins
//! ```
//!
//! The two capture tokens are plain booleans. Traversal order is the only
//! ordering primitive: whichever widget asks first in a frame gets the
//! token, everyone after it gets `false`. A container that wants topmost-wins
//! behaviour must update its children front to back.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use tessera_platform::{
    Event, InputEvent, Key, KeyState, KeyboardEvent, Modifiers, MouseButton, MouseEvent,
    WindowEvent,
};

use crate::config::ViewConfig;
use crate::geometry::{Point, Size, Vec2};

/// State of one mouse button
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ButtonState {
    /// Currently held
    pub down: bool,
    /// Went down during this frame
    pub pressed: bool,
    /// Went up during this frame
    pub released: bool,
    /// Seconds the button has been held (frozen at release)
    pub hold_time: f32,
}

impl ButtonState {
    fn press(&mut self) {
        self.down = true;
        self.pressed = true;
        self.hold_time = 0.0;
    }

    fn release(&mut self) {
        if self.down {
            self.released = true;
        }
        self.down = false;
    }

    fn clear_edges(&mut self) {
        self.pressed = false;
        self.released = false;
    }
}

/// One entry of the mouse trace
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TraceSample {
    pub position: Point,
    /// Length of the frame that ended at this position
    pub dt: f32,
}

/// Aggregated input for one frame plus the mouse and focus capture tokens
#[derive(Clone, Debug)]
pub struct InputSnapshot {
    // Pointer
    mouse: Point,
    frame_start_mouse: Point,
    mouse_inside: bool,
    trace: VecDeque<TraceSample>,
    trace_capacity: usize,

    // Buttons and wheel
    left: ButtonState,
    right: ButtonState,
    middle: ButtonState,
    wheel: Vec2,

    // Keyboard
    keys_down: FxHashSet<Key>,
    keys_pressed: SmallVec<[Key; 8]>,
    keys_released: SmallVec<[Key; 8]>,
    modifiers: Modifiers,
    text: String,

    // Window
    has_focus: bool,
    resized: Option<Size>,
    close_requested: bool,

    // Arbitration
    mouse_captured: bool,
    focus_captured: bool,
    trailing: SmallVec<[u64; 4]>,
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self::new(&ViewConfig::default())
    }
}

impl InputSnapshot {
    pub fn new(config: &ViewConfig) -> Self {
        Self {
            mouse: Point::ZERO,
            frame_start_mouse: Point::ZERO,
            mouse_inside: false,
            trace: VecDeque::with_capacity(config.mouse_trace_capacity),
            trace_capacity: config.mouse_trace_capacity,
            left: ButtonState::default(),
            right: ButtonState::default(),
            middle: ButtonState::default(),
            wheel: Vec2::ZERO,
            keys_down: FxHashSet::default(),
            keys_pressed: SmallVec::new(),
            keys_released: SmallVec::new(),
            modifiers: Modifiers::default(),
            text: String::new(),
            has_focus: config.start_focused,
            resized: None,
            close_requested: false,
            mouse_captured: false,
            focus_captured: false,
            trailing: SmallVec::new(),
        }
    }

    // =========================================================================
    // Frame lifecycle
    // =========================================================================

    /// Clear everything that only describes the previous frame
    ///
    /// Called exactly once per frame before any widget updates. Held
    /// buttons, hold timers, held keys, the mouse trace and the list of
    /// trailing items survive.
    pub fn reset(&mut self) {
        self.frame_start_mouse = self.mouse;
        self.left.clear_edges();
        self.right.clear_edges();
        self.middle.clear_edges();
        self.wheel = Vec2::ZERO;
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.text.clear();
        self.resized = None;
        self.close_requested = false;
        self.mouse_captured = false;
        self.focus_captured = false;
    }

    /// Fold one platform event into the snapshot
    pub fn apply(&mut self, event: &Event) {
        match event {
            Event::Window(window) => self.apply_window(window),
            Event::Input(input) => self.apply_input(input),
        }
    }

    fn apply_window(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::Resized { width, height } => {
                self.resized = Some(Size::new(*width, *height));
            }
            WindowEvent::CloseRequested => self.close_requested = true,
            WindowEvent::Focused(focused) => {
                self.has_focus = *focused;
                if !focused {
                    // Releases are never delivered to an unfocused window
                    self.left.release();
                    self.right.release();
                    self.middle.release();
                    self.keys_down.clear();
                    self.modifiers = Modifiers::default();
                }
            }
        }
    }

    fn apply_input(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Mouse(mouse) => {
                if let Some((x, y)) = mouse.position() {
                    self.mouse = Point::new(x, y);
                    self.mouse_inside = true;
                }
                match mouse {
                    MouseEvent::ButtonPressed { button, .. } => {
                        if let Some(state) = self.button_mut(*button) {
                            state.press();
                        }
                    }
                    MouseEvent::ButtonReleased { button, .. } => {
                        if let Some(state) = self.button_mut(*button) {
                            state.release();
                        }
                    }
                    MouseEvent::Entered => self.mouse_inside = true,
                    MouseEvent::Left => self.mouse_inside = false,
                    MouseEvent::Moved { .. } => {}
                }
            }
            InputEvent::Keyboard(keyboard) => self.apply_key(keyboard),
            InputEvent::Wheel { delta_x, delta_y } => {
                self.wheel += Vec2::new(*delta_x, *delta_y);
            }
            InputEvent::Text(text) => self.text.push_str(text),
        }
    }

    fn apply_key(&mut self, event: &KeyboardEvent) {
        self.modifiers = event.modifiers;
        match event.state {
            KeyState::Pressed => {
                // Auto-repeat reports a press for a key that is already down
                if self.keys_down.insert(event.key) || !self.keys_pressed.contains(&event.key) {
                    self.keys_pressed.push(event.key);
                }
            }
            KeyState::Released => {
                self.keys_down.remove(&event.key);
                self.keys_released.push(event.key);
            }
        }
    }

    fn button_mut(&mut self, button: MouseButton) -> Option<&mut ButtonState> {
        match button {
            MouseButton::Left => Some(&mut self.left),
            MouseButton::Right => Some(&mut self.right),
            MouseButton::Middle => Some(&mut self.middle),
            MouseButton::Other(_) => None,
        }
    }

    /// Advance time-based accumulators by `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        for state in [&mut self.left, &mut self.right, &mut self.middle] {
            if state.down && !state.pressed {
                state.hold_time += dt;
            }
        }

        if self.trace_capacity > 0 {
            if self.trace.len() == self.trace_capacity {
                self.trace.pop_front();
            }
            self.trace.push_back(TraceSample {
                position: self.mouse,
                dt,
            });
        }
    }

    // =========================================================================
    // Capture arbitration
    // =========================================================================

    /// Claim the mouse for this frame
    ///
    /// Returns `true` only for the first caller of the frame, and only while
    /// the view has window focus. Losing is the normal outcome for every
    /// other widget and has no side effect.
    pub fn capture_mouse(&mut self) -> bool {
        if !self.has_focus || self.mouse_captured {
            return false;
        }
        self.mouse_captured = true;
        tracing::trace!("mouse captured");
        true
    }

    /// Claim input focus for this frame; same rules as [`Self::capture_mouse`]
    pub fn capture_focus(&mut self) -> bool {
        if !self.has_focus || self.focus_captured {
            return false;
        }
        self.focus_captured = true;
        tracing::trace!("focus captured");
        true
    }

    /// Give the mouse token back within the frame
    pub fn release_mouse(&mut self) {
        self.mouse_captured = false;
    }

    /// Give the focus token back within the frame
    pub fn release_focus(&mut self) {
        self.focus_captured = false;
    }

    /// Whether nobody has claimed focus yet this frame
    pub fn focus_free(&self) -> bool {
        !self.focus_captured
    }

    /// Whether nobody has claimed the mouse yet this frame
    pub fn mouse_free(&self) -> bool {
        !self.mouse_captured
    }

    pub fn is_mouse_captured(&self) -> bool {
        self.mouse_captured
    }

    pub fn is_focus_captured(&self) -> bool {
        self.focus_captured
    }

    /// Register an item that follows the pointer (drag shadow, dragged shape)
    ///
    /// Independent of the capture tokens: any number of items may trail the
    /// mouse at once. Registering the same item twice is a no-op.
    pub fn mouse_capture(&mut self, item: u64) {
        if !self.trailing.contains(&item) {
            self.trailing.push(item);
        }
    }

    /// Stop an item from following the pointer; returns whether it was trailing
    pub fn release_mouse_capture(&mut self, item: u64) -> bool {
        let before = self.trailing.len();
        self.trailing.retain(|i| *i != item);
        self.trailing.len() != before
    }

    pub fn is_trailing(&self, item: u64) -> bool {
        self.trailing.contains(&item)
    }

    pub fn trailing_items(&self) -> &[u64] {
        &self.trailing
    }

    // =========================================================================
    // Mouse queries
    // =========================================================================

    /// Left button held for at least `duration` seconds
    pub fn left_click(&self, duration: f32) -> bool {
        self.left.down && self.left.hold_time >= duration
    }

    /// Right button held for at least `duration` seconds
    pub fn right_click(&self, duration: f32) -> bool {
        self.right.down && self.right.hold_time >= duration
    }

    pub fn left_pressed(&self) -> bool {
        self.left.pressed
    }

    pub fn left_released(&self) -> bool {
        self.left.released
    }

    pub fn right_pressed(&self) -> bool {
        self.right.pressed
    }

    pub fn right_released(&self) -> bool {
        self.right.released
    }

    pub fn middle_pressed(&self) -> bool {
        self.middle.pressed
    }

    pub fn left_down(&self) -> bool {
        self.left.down
    }

    pub fn button(&self, button: MouseButton) -> ButtonState {
        match button {
            MouseButton::Left => self.left,
            MouseButton::Right => self.right,
            MouseButton::Middle => self.middle,
            MouseButton::Other(_) => ButtonState::default(),
        }
    }

    pub fn mouse_position(&self) -> Point {
        self.mouse
    }

    /// Pointer movement during this frame
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse - self.frame_start_mouse
    }

    pub fn mouse_inside(&self) -> bool {
        self.mouse_inside
    }

    /// Recent pointer positions, oldest first
    pub fn mouse_trace(&self) -> impl Iterator<Item = &TraceSample> {
        self.trace.iter()
    }

    /// Average pointer velocity over the trace, in px/s
    pub fn mouse_velocity(&self) -> Vec2 {
        let (Some(first), Some(last)) = (self.trace.front(), self.trace.back()) else {
            return Vec2::ZERO;
        };
        // The first sample's dt covers movement before the trace started
        let elapsed: f32 = self.trace.iter().skip(1).map(|s| s.dt).sum();
        if elapsed <= 0.0 {
            return Vec2::ZERO;
        }
        (last.position - first.position) * (1.0 / elapsed)
    }

    pub fn wheel(&self) -> Vec2 {
        self.wheel
    }

    // =========================================================================
    // Keyboard and window queries
    // =========================================================================

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn key_pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn key_released(&self, key: Key) -> bool {
        self.keys_released.contains(&key)
    }

    pub fn keys_pressed(&self) -> &[Key] {
        &self.keys_pressed
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Text committed during this frame
    pub fn text_input(&self) -> &str {
        &self.text
    }

    /// Whether the view's window has input focus
    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    /// New viewport size if the window was resized this frame
    pub fn resized(&self) -> Option<Size> {
        self.resized
    }

    pub fn close_requested(&self) -> bool {
        self.close_requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(button: MouseButton, x: f32, y: f32) -> Event {
        Event::Input(InputEvent::Mouse(MouseEvent::ButtonPressed { button, x, y }))
    }

    fn release(button: MouseButton, x: f32, y: f32) -> Event {
        Event::Input(InputEvent::Mouse(MouseEvent::ButtonReleased { button, x, y }))
    }

    fn moved(x: f32, y: f32) -> Event {
        Event::Input(InputEvent::Mouse(MouseEvent::Moved { x, y }))
    }

    #[test]
    fn test_first_caller_wins_mouse() {
        let mut input = InputSnapshot::default();
        input.reset();

        let results: Vec<bool> = (0..5).map(|_| input.capture_mouse()).collect();
        assert_eq!(results, vec![true, false, false, false, false]);
        assert!(!input.mouse_free());
    }

    #[test]
    fn test_focus_token_is_independent_of_mouse_token() {
        let mut input = InputSnapshot::default();
        input.reset();

        assert!(input.capture_mouse());
        assert!(input.focus_free());
        assert!(input.capture_focus());
        assert!(!input.capture_focus());
        assert!(!input.focus_free());
    }

    #[test]
    fn test_no_capture_without_window_focus() {
        let mut input = InputSnapshot::new(&ViewConfig::default().start_focused(false));
        input.reset();
        assert!(!input.capture_mouse());
        assert!(!input.capture_focus());
        // A failed claim leaves the token free
        assert!(input.mouse_free());

        input.apply(&Event::Window(WindowEvent::Focused(true)));
        assert!(input.capture_mouse());
    }

    #[test]
    fn test_reset_clears_both_tokens() {
        let mut input = InputSnapshot::default();
        input.capture_mouse();
        input.capture_focus();

        input.reset();
        assert!(!input.is_mouse_captured());
        assert!(!input.is_focus_captured());

        // Resetting an already clear snapshot keeps it clear
        input.reset();
        assert!(input.mouse_free() && input.focus_free());
    }

    #[test]
    fn test_release_within_frame_lets_next_widget_claim() {
        let mut input = InputSnapshot::default();
        input.reset();
        assert!(input.capture_focus());
        input.release_focus();
        assert!(input.capture_focus());
    }

    #[test]
    fn test_press_edges_last_one_frame() {
        let mut input = InputSnapshot::default();
        input.reset();
        input.apply(&press(MouseButton::Left, 5.0, 5.0));
        input.advance(1.0 / 60.0);
        assert!(input.left_pressed());
        assert!(input.left_down());

        input.reset();
        input.advance(1.0 / 60.0);
        assert!(!input.left_pressed());
        assert!(input.left_down());

        input.reset();
        input.apply(&release(MouseButton::Left, 5.0, 5.0));
        assert!(input.left_released());
        assert!(!input.left_down());
    }

    #[test]
    fn test_hold_time_threshold() {
        let mut input = InputSnapshot::default();
        input.reset();
        input.apply(&press(MouseButton::Right, 0.0, 0.0));
        input.advance(0.1);
        assert!(input.right_click(0.0));
        assert!(!input.right_click(0.2));

        for _ in 0..3 {
            input.reset();
            input.advance(0.1);
        }
        assert!(input.right_click(0.25));
        assert!(!input.left_click(0.0));

        input.reset();
        input.apply(&release(MouseButton::Right, 0.0, 0.0));
        assert!(!input.right_click(0.0));
    }

    #[test]
    fn test_trailing_items_are_a_set() {
        let mut input = InputSnapshot::default();
        input.mouse_capture(7);
        input.mouse_capture(9);
        input.mouse_capture(7);
        assert_eq!(input.trailing_items(), &[7, 9]);

        // Trailing survives frame resets
        input.reset();
        assert!(input.is_trailing(9));

        assert!(input.release_mouse_capture(7));
        assert!(!input.release_mouse_capture(7));
        assert_eq!(input.trailing_items(), &[9]);
    }

    #[test]
    fn test_mouse_delta_and_trace() {
        let mut input = InputSnapshot::new(&ViewConfig::default().mouse_trace_capacity(3));
        for i in 0..5 {
            input.reset();
            input.apply(&moved(i as f32 * 10.0, 0.0));
            input.advance(0.1);
        }
        assert_eq!(input.mouse_delta(), Vec2::new(10.0, 0.0));
        assert_eq!(input.mouse_trace().count(), 3);

        // 20px over the two frames after the first kept sample
        let v = input.mouse_velocity();
        assert!((v.x - 100.0).abs() < 1e-3);
        assert_eq!(v.y, 0.0);
    }

    #[test]
    fn test_keyboard_and_text() {
        let mut input = InputSnapshot::default();
        input.reset();
        input.apply(&Event::Input(InputEvent::Keyboard(KeyboardEvent::pressed(
            Key::Enter,
        ))));
        input.apply(&Event::Input(InputEvent::Text("hi".to_string())));
        assert!(input.key_pressed(Key::Enter));
        assert!(input.key_down(Key::Enter));
        assert_eq!(input.text_input(), "hi");

        input.reset();
        assert!(!input.key_pressed(Key::Enter));
        assert!(input.key_down(Key::Enter));
        assert_eq!(input.text_input(), "");

        input.apply(&Event::Input(InputEvent::Keyboard(KeyboardEvent::released(
            Key::Enter,
        ))));
        assert!(input.key_released(Key::Enter));
        assert!(!input.key_down(Key::Enter));
    }

    #[test]
    fn test_losing_window_focus_releases_buttons() {
        let mut input = InputSnapshot::default();
        input.reset();
        input.apply(&press(MouseButton::Left, 0.0, 0.0));
        input.apply(&Event::Window(WindowEvent::Focused(false)));
        assert!(!input.left_down());
        assert!(!input.has_focus());
    }

    #[test]
    fn test_resize_is_per_frame() {
        let mut input = InputSnapshot::default();
        input.apply(&Event::Window(WindowEvent::Resized {
            width: 100.0,
            height: 50.0,
        }));
        assert_eq!(input.resized(), Some(Size::new(100.0, 50.0)));
        input.reset();
        assert_eq!(input.resized(), None);
    }
}
