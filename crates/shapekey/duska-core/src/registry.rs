//! Ordered key list of one object (or one of its parallel lists).
//!
//! Only structure lives here. Host side effects and curve remapping are sequenced by
//! the animator around these calls.

use serde::{Deserialize, Serialize};

use crate::data::AnimatedKey;

/// Ordered list of animated keys plus the active position.
///
/// `active` is always `None` or a valid index into `keys`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRegistry")]
pub struct KeyRegistry {
    keys: Vec<AnimatedKey>,
    active: Option<usize>,
}

/// Wire form; converted through [`KeyRegistry::from_parts`] so loaded data is clamped.
#[derive(Deserialize)]
struct RawRegistry {
    #[serde(default)]
    keys: Vec<AnimatedKey>,
    #[serde(default)]
    active: Option<usize>,
}

impl From<RawRegistry> for KeyRegistry {
    fn from(raw: RawRegistry) -> Self {
        Self::from_parts(raw.keys, raw.active)
    }
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from parts, clamping an invalid active index to `None`.
    pub fn from_parts(keys: Vec<AnimatedKey>, active: Option<usize>) -> Self {
        let active = active.filter(|i| *i < keys.len());
        Self { keys, active }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[inline]
    pub fn keys(&self) -> &[AnimatedKey] {
        &self.keys
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&AnimatedKey> {
        self.keys.get(index)
    }

    #[inline]
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Active index with `-1` standing for "none".
    pub fn active_index_raw(&self) -> i64 {
        self.active.map_or(-1, |i| i as i64)
    }

    pub fn active_key(&self) -> Option<&AnimatedKey> {
        self.active.and_then(|i| self.keys.get(i))
    }

    /// Set the active position. Out-of-range requests leave it unchanged and return false.
    pub fn set_active(&mut self, index: Option<usize>) -> bool {
        match index {
            Some(i) if i >= self.keys.len() => false,
            other => {
                self.active = other;
                true
            }
        }
    }

    pub fn position_of_target(&self, target_name: &str) -> Option<usize> {
        self.keys.iter().position(|k| k.target_name == target_name)
    }

    pub fn tracks(&self, target_name: &str) -> bool {
        self.position_of_target(target_name).is_some()
    }

    /// Append a key and make it active. Returns its index.
    pub fn push(&mut self, key: AnimatedKey) -> usize {
        self.keys.push(key);
        let index = self.keys.len() - 1;
        self.active = Some(index);
        index
    }

    /// Remove the entry at `index`.
    ///
    /// The active position keeps pointing at the same entry when it sits above the removed
    /// one; if the active entry itself goes, the previous entry becomes active.
    pub fn remove(&mut self, index: usize) -> Option<AnimatedKey> {
        if index >= self.keys.len() {
            return None;
        }
        let removed = self.keys.remove(index);
        self.active = match self.active {
            _ if self.keys.is_empty() => None,
            Some(a) if a > index => Some(a - 1),
            Some(a) if a == index => Some(index.saturating_sub(1)),
            other => other,
        };
        Some(removed)
    }

    /// Exchange two entries. The active position follows the entry it pointed at.
    pub fn swap(&mut self, a: usize, b: usize) -> bool {
        if a >= self.keys.len() || b >= self.keys.len() {
            return false;
        }
        self.keys.swap(a, b);
        self.active = match self.active {
            Some(x) if x == a => Some(b),
            Some(x) if x == b => Some(a),
            other => other,
        };
        true
    }

    /// Update every entry referencing `old` after the target was renamed elsewhere.
    pub fn retarget(&mut self, old: &str, new: &str) {
        for key in self.keys.iter_mut().filter(|k| k.target_name == old) {
            key.target_name = new.to_string();
            key.display_name = new.to_string();
        }
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.active = None;
    }
}
