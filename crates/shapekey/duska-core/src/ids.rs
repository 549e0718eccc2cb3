//! Identifiers for host objects, parallel key lists and frame hooks.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable host object identifier. Keys the per-object side table.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Slot of one parallel key list on an object.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ListId(pub u8);

impl ListId {
    pub const PRIMARY: ListId = ListId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Default for ListId {
    fn default() -> Self {
        Self::PRIMARY
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "list {}", self.0)
    }
}

/// Token handed out when a frame-change handler is installed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct HookId(pub u32);

/// Monotonic allocator for HookId.
#[derive(Default, Debug, Clone)]
pub struct IdAllocator {
    next_hook: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_hook(&mut self) -> HookId {
        let id = HookId(self.next_hook);
        self.next_hook = self.next_hook.wrapping_add(1);
        id
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Property path of the animatable active index driving `list`.
///
/// The primary list keeps the historical `ska_active_index` name so curves recorded
/// against single-list objects stay bound when more lists are enabled.
pub fn index_property(list: ListId) -> String {
    if list == ListId::PRIMARY {
        "ska_active_index".to_string()
    } else {
        format!("ska_active_index_{}", list.0)
    }
}
