//! Input Handler
//!
//! Converts window-system events into the few semantic events the table
//! understands.

use glam::Vec2;

/// Keyboard keys we care about
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    Unknown,
}

/// Mouse buttons
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Input events
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Key { key: Key, pressed: bool },
    Text(char),
    Pointer {
        position: Vec2,
        button: Option<MouseButton>,
        pressed: bool,
    },
    Scroll { delta: Vec2 },
}

/// Queues injected events and tracks the pointer between them.
#[derive(Default)]
pub struct InputHandler {
    pointer_position: Vec2,
    pending_events: Vec<Event>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer_position(&self) -> Vec2 {
        self.pointer_position
    }

    /// Drain queued events.
    pub fn poll(&mut self) -> Vec<Event> {
        let events = std::mem::take(&mut self.pending_events);
        for event in &events {
            if let Event::Pointer { position, .. } = event {
                self.pointer_position = *position;
            }
        }
        events
    }

    pub fn inject(&mut self, event: Event) {
        self.pending_events.push(event);
    }
}
