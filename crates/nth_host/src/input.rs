//! Maps platform key events onto the engine's buttons.
use crate::engine::Engine;
use crate::InputKeys;
use std::collections::HashMap;
use std::hash::Hash;

/// The conventional bindings, named by the key value a browser-style keyboard event reports.
pub const DEFAULT_BINDINGS: [(&str, InputKeys); 8] = [
    ("w", InputKeys::Up),
    ("s", InputKeys::Down),
    ("a", InputKeys::Left),
    ("d", InputKeys::Right),
    ("j", InputKeys::A),
    ("k", InputKeys::B),
    ("Enter", InputKeys::Start),
    ("Backspace", InputKeys::Select),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Maps platform keys to buttons.
#[derive(Debug, Clone)]
pub struct KeyMap<K> {
    map: HashMap<K, InputKeys>,
}

impl<K: Hash + Eq> KeyMap<K> {
    pub fn new() -> Self {
        Self { map: HashMap::new() }
    }

    pub fn get(&self, key: &K) -> Option<InputKeys> {
        self.map.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<K: Hash + Eq> Default for KeyMap<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq> FromIterator<(K, InputKeys)> for KeyMap<K> {
    fn from_iter<T: IntoIterator<Item = (K, InputKeys)>>(iter: T) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}

impl KeyMap<&'static str> {
    /// The [DEFAULT_BINDINGS], keyed by key name.
    pub fn default_bindings() -> Self {
        DEFAULT_BINDINGS.into_iter().collect()
    }
}

/// Forwards key events to the current engine, if there is one.
///
/// Holds no button state of its own, the engine is the only source of truth. Key repeats simply
/// result in repeated presses, which engines treat as a no-op.
pub struct InputBridge<K> {
    key_map: KeyMap<K>,
}

impl<K: Hash + Eq + std::fmt::Debug> InputBridge<K> {
    pub fn new(key_map: KeyMap<K>) -> Self {
        Self { key_map }
    }

    /// Handle a key event.
    ///
    /// # Returns
    /// * `true` - If the key was bound and an engine received the button change.
    /// * `false` - If the key is unbound, or there was no engine (e.g. mid cartridge swap).
    pub fn handle_key<E: Engine>(&self, engine: Option<&mut E>, key: &K, state: KeyState) -> bool {
        let Some(button) = self.key_map.get(key) else {
            return false;
        };
        let Some(engine) = engine else {
            log::trace!("Dropping {:?} for {:?}, no engine running", state, key);
            return false;
        };

        log::trace!("Key {:?} -> {:?} {:?}", key, button, state);
        engine.set_button(button, state == KeyState::Pressed);

        true
    }

    pub fn key_down<E: Engine>(&self, engine: Option<&mut E>, key: &K) -> bool {
        self.handle_key(engine, key, KeyState::Pressed)
    }

    pub fn key_up<E: Engine>(&self, engine: Option<&mut E>, key: &K) -> bool {
        self.handle_key(engine, key, KeyState::Released)
    }
}
