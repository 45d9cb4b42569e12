use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::action::{Action, Bindings};
use crate::key::Key;

/// Which keys are currently held. Written by key events, read once per frame
/// through [`InputState::snapshot`].
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key) {
        self.held.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.held.remove(&key);
    }

    /// Release every key (e.g. when the window loses focus).
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    /// Resolve held keys into the per-frame action snapshot.
    pub fn snapshot(&self, bindings: &Bindings) -> InputSnapshot {
        let mut snap = InputSnapshot::default();
        for action in Action::ALL {
            if bindings.keys_for(action).iter().any(|k| self.is_held(*k)) {
                snap.set(action, true);
            }
        }
        snap
    }
}

/// Immutable view of the held actions for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub forward: bool,
    pub back: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    pub jump: bool,
    pub sprint: bool,
}

impl InputSnapshot {
    /// Snapshot with the given actions held.
    pub fn holding(actions: &[Action]) -> Self {
        let mut snap = Self::default();
        for action in actions {
            snap.set(*action, true);
        }
        snap
    }

    pub fn held(&self, action: Action) -> bool {
        match action {
            Action::Forward => self.forward,
            Action::Back => self.back,
            Action::StrafeLeft => self.strafe_left,
            Action::StrafeRight => self.strafe_right,
            Action::TurnLeft => self.turn_left,
            Action::TurnRight => self.turn_right,
            Action::Jump => self.jump,
            Action::Sprint => self.sprint,
        }
    }

    pub fn set(&mut self, action: Action, held: bool) {
        let slot = match action {
            Action::Forward => &mut self.forward,
            Action::Back => &mut self.back,
            Action::StrafeLeft => &mut self.strafe_left,
            Action::StrafeRight => &mut self.strafe_right,
            Action::TurnLeft => &mut self.turn_left,
            Action::TurnRight => &mut self.turn_right,
            Action::Jump => &mut self.jump,
            Action::Sprint => &mut self.sprint,
        };
        *slot = held;
    }

    /// True if any walking key is held.
    pub fn has_movement(&self) -> bool {
        self.forward || self.back || self.strafe_left || self.strafe_right
    }
}
