use std::collections::VecDeque;

use crate::key::Key;

/// One input notification from the platform layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    /// Raw pointer delta, in device units.
    MouseMotion { dx: f32, dy: f32 },
    /// Pointer lock engaged (`true`) or released (`false`).
    PointerLock(bool),
    /// New viewport size in physical pixels.
    Resize { width: u32, height: u32 },
    /// The window lost keyboard focus; every held key is released. Key-ups
    /// for keys held at that moment will never arrive.
    FocusLost,
}

/// FIFO of input events, filled by platform callbacks and drained once per
/// frame by the frame loop.
#[derive(Debug, Default)]
pub struct InputQueue {
    events: VecDeque<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    /// Remove and yield every queued event in arrival order.
    pub fn drain(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        self.events.drain(..)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Extend<InputEvent> for InputQueue {
    fn extend<T: IntoIterator<Item = InputEvent>>(&mut self, iter: T) {
        self.events.extend(iter);
    }
}
