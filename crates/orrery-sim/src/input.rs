//! Input events arriving from the presentation layer and the key map that
//! turns raw key names into actions.

use std::str::FromStr;

use orrery_scene::{PrimitiveHandle, RenderError};
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::control::ControlValue;

/// An event queued for the frame driver.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    /// Lock the camera onto a body by name.
    SelectBody(String),
    /// A pointer hit on a renderer primitive.
    Pick(PrimitiveHandle),
    ResetCamera,
    Resize { width: u32, height: u32 },
    /// A control-surface write keyed by field name.
    Control { field: String, value: ControlValue },
    /// A key press by physical key name, e.g. `"Space"` or `"KeyR"`.
    Key(String),
}

/// A non-fatal rejection. The event is logged and dropped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputIgnored {
    #[error("no body named '{0}'")]
    UnknownBody(String),

    #[error("primitive {0:?} is not selectable")]
    NotSelectable(PrimitiveHandle),

    #[error("unknown control field '{0}'")]
    UnknownField(String),

    #[error("control field '{field}' expects a {expected}")]
    WrongKind {
        field: &'static str,
        expected: &'static str,
    },

    #[error("control field '{field}' rejects non-finite value {value}")]
    NonFinite { field: &'static str, value: f32 },

    #[error("key '{0}' is not bound")]
    UnboundKey(String),

    #[error("unknown key action '{0}'")]
    UnknownAction(String),

    #[error("zero-area resize {width}x{height}")]
    ZeroSize { width: u32, height: u32 },
}

/// Failure while handling one event.
#[derive(Debug, Error)]
pub enum EventError {
    #[error(transparent)]
    Ignored(#[from] InputIgnored),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Discrete actions reachable from the keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyAction {
    TogglePlaying,
    ResetCamera,
    ToggleCinematic,
    ToggleOrbits,
    ToggleRealistic,
    SpeedUp,
    SlowDown,
    ScaleUp,
    ScaleDown,
}

impl FromStr for KeyAction {
    type Err = InputIgnored;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "toggle_playing" => Self::TogglePlaying,
            "reset_camera" => Self::ResetCamera,
            "toggle_cinematic" => Self::ToggleCinematic,
            "toggle_orbits" => Self::ToggleOrbits,
            "toggle_realistic" => Self::ToggleRealistic,
            "speed_up" => Self::SpeedUp,
            "slow_down" => Self::SlowDown,
            "scale_up" => Self::ScaleUp,
            "scale_down" => Self::ScaleDown,
            _ => return Err(InputIgnored::UnknownAction(s.to_string())),
        })
    }
}

/// Key name to action map.
#[derive(Clone, Debug)]
pub struct KeyBindings {
    bindings: FxHashMap<String, KeyAction>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let bindings = [
            ("Space", KeyAction::TogglePlaying),
            ("KeyR", KeyAction::ResetCamera),
            ("KeyC", KeyAction::ToggleCinematic),
            ("KeyO", KeyAction::ToggleOrbits),
            ("KeyL", KeyAction::ToggleRealistic),
            ("Equal", KeyAction::SpeedUp),
            ("Minus", KeyAction::SlowDown),
            ("BracketRight", KeyAction::ScaleUp),
            ("BracketLeft", KeyAction::ScaleDown),
        ]
        .into_iter()
        .map(|(key, action)| (key.to_string(), action))
        .collect();
        Self { bindings }
    }
}

impl KeyBindings {
    pub fn action(&self, key: &str) -> Option<KeyAction> {
        self.bindings.get(key).copied()
    }

    /// Bind `key` to `action`, dropping any key previously bound to it.
    pub fn rebind(&mut self, action: KeyAction, key: &str) {
        self.bindings.retain(|_, bound| *bound != action);
        self.bindings.insert(key.to_string(), action);
    }

    /// Apply `(action, key)` overrides. Unknown action names are skipped
    /// with a warning. Returns how many were applied.
    pub fn apply_overrides<'a>(
        &mut self,
        overrides: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> usize {
        let mut applied = 0;
        for (name, key) in overrides {
            match name.parse::<KeyAction>() {
                Ok(action) => {
                    self.rebind(action, key);
                    applied += 1;
                }
                Err(err) => tracing::warn!("Skipping key binding for {key}: {err}"),
            }
        }
        applied
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let keys = KeyBindings::default();
        assert_eq!(keys.action("Space"), Some(KeyAction::TogglePlaying));
        assert_eq!(keys.action("KeyR"), Some(KeyAction::ResetCamera));
        assert_eq!(keys.action("KeyQ"), None);
    }

    #[test]
    fn test_rebind_moves_action() {
        let mut keys = KeyBindings::default();
        let before = keys.len();
        keys.rebind(KeyAction::ResetCamera, "KeyH");
        assert_eq!(keys.action("KeyH"), Some(KeyAction::ResetCamera));
        assert_eq!(keys.action("KeyR"), None);
        assert_eq!(keys.len(), before);
    }

    #[test]
    fn test_overrides_skip_unknown_actions() {
        let mut keys = KeyBindings::default();
        let applied = keys.apply_overrides([("reset_camera", "KeyH"), ("teleport", "KeyT")]);
        assert_eq!(applied, 1);
        assert_eq!(keys.action("KeyT"), None);
    }

    #[test]
    fn test_action_names_parse() {
        assert_eq!("speed_up".parse::<KeyAction>(), Ok(KeyAction::SpeedUp));
        assert_eq!(
            "warp".parse::<KeyAction>(),
            Err(InputIgnored::UnknownAction("warp".to_string()))
        );
    }
}
