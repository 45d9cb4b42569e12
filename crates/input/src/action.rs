use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::key::Key;

/// A movement control the frame loop reads.
///
/// The kernel consumes actions, never raw keys, so rebinding keys never
/// touches movement logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Walk along the facing direction.
    Forward,
    /// Walk against the facing direction.
    Back,
    StrafeLeft,
    StrafeRight,
    /// Rotate yaw counter-clockwise at a fixed per-frame rate.
    TurnLeft,
    /// Rotate yaw clockwise at a fixed per-frame rate.
    TurnRight,
    Jump,
    /// Multiply walking speed while held.
    Sprint,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::Forward,
        Action::Back,
        Action::StrafeLeft,
        Action::StrafeRight,
        Action::TurnLeft,
        Action::TurnRight,
        Action::Jump,
        Action::Sprint,
    ];

    /// Snake-case name, as used in config files.
    pub fn name(self) -> &'static str {
        match self {
            Action::Forward => "forward",
            Action::Back => "back",
            Action::StrafeLeft => "strafe_left",
            Action::StrafeRight => "strafe_right",
            Action::TurnLeft => "turn_left",
            Action::TurnRight => "turn_right",
            Action::Jump => "jump",
            Action::Sprint => "sprint",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action: {0}")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    /// Accepts `strafe_left`, `strafe-left` and any letter case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.replace('-', "_");
        Action::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

/// Key bindings: each action lists the keys that trigger it.
///
/// Serialised as a map from action name to key list:
/// ```yaml
/// forward: [W, ArrowUp]
/// jump: [Space]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bindings {
    map: BTreeMap<Action, Vec<Key>>,
}

impl Default for Bindings {
    fn default() -> Self {
        let mut map = BTreeMap::new();
        map.insert(Action::Forward, vec![Key::W, Key::ArrowUp]);
        map.insert(Action::Back, vec![Key::S, Key::ArrowDown]);
        map.insert(Action::StrafeLeft, vec![Key::A]);
        map.insert(Action::StrafeRight, vec![Key::D]);
        map.insert(Action::TurnLeft, vec![Key::ArrowLeft]);
        map.insert(Action::TurnRight, vec![Key::ArrowRight]);
        map.insert(Action::Jump, vec![Key::Space]);
        map.insert(Action::Sprint, vec![Key::ShiftLeft, Key::ShiftRight]);
        Self { map }
    }
}

impl Bindings {
    /// Bindings with no keys bound.
    pub fn empty() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }

    /// Bind `key` to `action` in addition to any existing keys.
    pub fn bind(&mut self, action: Action, key: Key) {
        let keys = self.map.entry(action).or_default();
        if !keys.contains(&key) {
            keys.push(key);
        }
    }

    /// Remove every key bound to `action`.
    pub fn clear(&mut self, action: Action) {
        self.map.remove(&action);
    }

    pub fn keys_for(&self, action: Action) -> &[Key] {
        self.map.get(&action).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The first action `key` is bound to, if any.
    pub fn action_for(&self, key: Key) -> Option<Action> {
        self.map
            .iter()
            .find(|(_, keys)| keys.contains(&key))
            .map(|(action, _)| *action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings_cover_every_action() {
        let b = Bindings::default();
        for action in Action::ALL {
            assert!(!b.keys_for(action).is_empty(), "{action:?} unbound");
        }
    }

    #[test]
    fn forward_has_two_keys() {
        let b = Bindings::default();
        assert_eq!(b.keys_for(Action::Forward), &[Key::W, Key::ArrowUp]);
        assert_eq!(b.action_for(Key::ArrowUp), Some(Action::Forward));
    }

    #[test]
    fn unbound_key_has_no_action() {
        let b = Bindings::default();
        assert_eq!(b.action_for(Key::Q), None);
    }

    #[test]
    fn bind_and_clear() {
        let mut b = Bindings::empty();
        b.bind(Action::Jump, Key::J);
        b.bind(Action::Jump, Key::J);
        assert_eq!(b.keys_for(Action::Jump), &[Key::J]);
        b.clear(Action::Jump);
        assert!(b.keys_for(Action::Jump).is_empty());
    }

    #[test]
    fn action_names_parse() {
        for action in Action::ALL {
            assert_eq!(action.name().parse::<Action>(), Ok(action));
        }
        assert_eq!("Strafe-Left".parse::<Action>(), Ok(Action::StrafeLeft));
        assert!("crouch".parse::<Action>().is_err());
    }

    #[test]
    fn action_names_match_serde() {
        for action in Action::ALL {
            let yaml = serde_yaml::to_string(&action).unwrap();
            assert_eq!(yaml.trim(), action.name());
        }
    }

    #[test]
    fn bindings_yaml_shape() {
        let yaml = "forward: [I]\njump: [Space, J]\n";
        let b: Bindings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(b.keys_for(Action::Forward), &[Key::I]);
        assert_eq!(b.keys_for(Action::Jump), &[Key::Space, Key::J]);
        assert!(b.keys_for(Action::Back).is_empty());
    }
}
