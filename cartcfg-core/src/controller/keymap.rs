// cartcfg-core/src/controller/keymap.rs
// Terminal keys -> abstract navigation keys

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::trace;

/// Abstract keys understood by the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavKey {
    Up,
    Down,
    Left,
    Right,
    Confirm,
    Cancel,
    Other,
}

/// Keyboard preset selected in the config file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Keymap {
    #[default]
    Standard,

    Vim,
}

pub struct KeyBindings {
    bindings: HashMap<(KeyCode, KeyModifiers), NavKey>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new(Keymap::Standard)
    }
}

impl KeyBindings {
    pub fn new(keymap: Keymap) -> Self {
        let mut bindings = HashMap::with_capacity(16);

        // Arrow keys
        bindings.insert(plain(KeyCode::Up), NavKey::Up);
        bindings.insert(plain(KeyCode::Down), NavKey::Down);
        bindings.insert(plain(KeyCode::Left), NavKey::Left);
        bindings.insert(plain(KeyCode::Right), NavKey::Right);

        bindings.insert(plain(KeyCode::Enter), NavKey::Confirm);
        bindings.insert(plain(KeyCode::Esc), NavKey::Cancel);
        bindings.insert((KeyCode::Char('c'), KeyModifiers::CONTROL), NavKey::Cancel);

        if keymap == Keymap::Vim {
            bindings.insert(plain(KeyCode::Char('k')), NavKey::Up);
            bindings.insert(plain(KeyCode::Char('j')), NavKey::Down);
            bindings.insert(plain(KeyCode::Char('h')), NavKey::Left);
            bindings.insert(plain(KeyCode::Char('l')), NavKey::Right);
            bindings.insert(plain(KeyCode::Char('q')), NavKey::Cancel);
        }

        Self { bindings }
    }

    pub fn resolve(&self, key_event: KeyEvent) -> NavKey {
        // Shift only changes the character for letters; ignore it for lookup.
        let modifiers = key_event.modifiers - KeyModifiers::SHIFT;
        let key = self
            .bindings
            .get(&(key_event.code, modifiers))
            .copied()
            .unwrap_or(NavKey::Other);

        trace!(
            marker = "KEYMAP_RESOLVE",
            operation_type = "input_handling",
            "key {:?} -> {:?}",
            key_event.code,
            key
        );

        key
    }
}

const fn plain(code: KeyCode) -> (KeyCode, KeyModifiers) {
    (code, KeyModifiers::NONE)
}
