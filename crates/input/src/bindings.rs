use std::collections::HashMap;
use std::hash::Hash;

use crate::control::{Control, InputState};

/// Maps raw key identifiers to controls.
///
/// Generic over the key type so the desktop app can bind windowing-system key
/// codes without this crate depending on the windowing library.
#[derive(Debug, Clone)]
pub struct KeyBindings<K> {
    map: HashMap<K, Control>,
}

impl<K: Eq + Hash> Default for KeyBindings<K> {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> KeyBindings<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key` to `control`, replacing any earlier binding of that key.
    pub fn bind(&mut self, key: K, control: Control) -> &mut Self {
        if self.map.insert(key, control).is_some() {
            tracing::debug!(%control, "key rebound");
        }
        self
    }

    pub fn control_for(&self, key: &K) -> Option<Control> {
        self.map.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Resolve the currently held keys into control flags. Unbound keys are
    /// ignored.
    pub fn resolve<'a, I>(&self, held: I) -> InputState
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        held.into_iter()
            .filter_map(|key| self.control_for(key))
            .collect()
    }
}

impl<K: Eq + Hash> FromIterator<(K, Control)> for KeyBindings<K> {
    fn from_iter<I: IntoIterator<Item = (K, Control)>>(iter: I) -> Self {
        let mut bindings = Self::new();
        for (key, control) in iter {
            bindings.bind(key, control);
        }
        bindings
    }
}
