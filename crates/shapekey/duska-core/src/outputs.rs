//! Output contracts of frame evaluation.
//!
//! Outputs carry the influence values written this frame, keyed by object and target
//! name, and a separate list of semantic events. Adapters may mirror the changes into
//! their own scene or surface the events in UI.

use serde::{Deserialize, Serialize};

use crate::ids::{ListId, ObjectId};

/// One influence value committed this frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub object: ObjectId,
    pub target: String,
    pub weight: f32,
}

/// Discrete signals emitted during evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum CoreEvent {
    PoseCommitted {
        object: ObjectId,
        targets: usize,
    },
    /// An animated list's active index followed its curve.
    ActiveIndexSynced {
        object: ObjectId,
        list: ListId,
        index: usize,
    },
    /// A key references a target the host no longer has.
    MissingTarget {
        object: ObjectId,
        target: String,
    },
    HostWriteFailed {
        object: ObjectId,
        target: String,
        message: String,
    },
}

/// Outputs returned by Animator::frame_changed().
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub changes: Vec<Change>,
    #[serde(default)]
    pub events: Vec<CoreEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.changes.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_change(&mut self, change: Change) {
        self.changes.push(change);
    }

    #[inline]
    pub fn push_event(&mut self, event: CoreEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.events.is_empty()
    }

    /// Weight written to `target` on `object` this frame.
    pub fn weight_of(&self, object: ObjectId, target: &str) -> Option<f32> {
        self.changes
            .iter()
            .find(|c| c.object == object && c.target == target)
            .map(|c| c.weight)
    }
}
