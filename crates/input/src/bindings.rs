use crate::action::Action;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Platform key identifier, named after the physical key
/// (`"KeyW"`, `"Space"`, `"ArrowUp"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(pub String);

impl Key {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Errors from building or validating key bindings.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("action {0:?} has no key bound to it")]
    UnboundAction(Action),
}

/// Key to action mapping. Several keys may share one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyBindings {
    map: BTreeMap<Key, Action>,
}

impl KeyBindings {
    /// An empty mapping. Fails validation until every action is bound.
    pub fn empty() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }

    /// Bind `key` to `action`, replacing any previous binding of that key.
    pub fn bind(&mut self, key: impl Into<Key>, action: Action) -> &mut Self {
        self.map.insert(key.into(), action);
        self
    }

    pub fn action_for(&self, key: &Key) -> Option<Action> {
        self.map.get(key).copied()
    }

    pub fn keys_for(&self, action: Action) -> impl Iterator<Item = &Key> {
        self.map
            .iter()
            .filter(move |(_, a)| **a == action)
            .map(|(k, _)| k)
    }

    /// Every action needs at least one key.
    pub fn validate(&self) -> Result<(), InputError> {
        for action in Action::ALL {
            if self.keys_for(action).next().is_none() {
                return Err(InputError::UnboundAction(action));
            }
        }
        Ok(())
    }
}

impl Default for KeyBindings {
    /// W/A/S/D to move, Space to jump.
    fn default() -> Self {
        let mut b = Self::empty();
        b.bind("KeyW", Action::Forward)
            .bind("KeyS", Action::Back)
            .bind("KeyA", Action::Left)
            .bind("KeyD", Action::Right)
            .bind("Space", Action::Jump);
        b
    }
}
