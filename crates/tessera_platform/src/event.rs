//! Platform events and the input source abstraction

use crate::error::PlatformError;
use crate::input::InputEvent;

/// Source of raw platform events
///
/// A windowing backend implements this to hand the view everything that
/// happened since the previous frame. The view polls exactly once per frame.
pub trait InputSource {
    /// Drain all events received since the last poll
    fn poll_events(&mut self) -> Result<Vec<Event>, PlatformError>;
}

/// Platform events
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Window-related event
    Window(WindowEvent),
    /// Input event (mouse, keyboard, wheel)
    Input(InputEvent),
}

impl From<WindowEvent> for Event {
    fn from(event: WindowEvent) -> Self {
        Event::Window(event)
    }
}

impl From<InputEvent> for Event {
    fn from(event: InputEvent) -> Self {
        Event::Input(event)
    }
}

/// Window events
#[derive(Clone, Debug, PartialEq)]
pub enum WindowEvent {
    /// Window was resized
    Resized {
        /// New width in logical pixels
        width: f32,
        /// New height in logical pixels
        height: f32,
    },
    /// Window close was requested (e.g., close button clicked)
    CloseRequested,
    /// Window gained or lost focus
    Focused(bool),
}

/// An input source replaying a fixed list of per-frame event batches
///
/// Each call to [`InputSource::poll_events`] yields the next batch; once
/// the script runs out every poll returns an empty batch, or
/// [`PlatformError::Disconnected`] if the script was ended with
/// [`ScriptedInput::disconnect`]. Used by headless runs and tests.
#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    frames: std::collections::VecDeque<Vec<Event>>,
    disconnected: bool,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch of events delivered together in one frame
    pub fn frame(mut self, events: impl IntoIterator<Item = Event>) -> Self {
        self.frames.push_back(events.into_iter().collect());
        self
    }

    /// Fail every poll after the last batch instead of yielding empty ones
    pub fn disconnect(mut self) -> Self {
        self.disconnected = true;
        self
    }

    /// Number of batches not yet delivered
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll_events(&mut self) -> Result<Vec<Event>, PlatformError> {
        match self.frames.pop_front() {
            Some(events) => Ok(events),
            None if self.disconnected => {
                Err(PlatformError::Disconnected("script exhausted".to_string()))
            }
            None => Ok(Vec::new()),
        }
    }
}
