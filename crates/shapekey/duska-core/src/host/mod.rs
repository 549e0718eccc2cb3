//! Collaborator traits implemented by the host environment.
//!
//! The core never owns deformation targets, curves or the clock; adapters (Bevy, an
//! editor bridge, the in-memory host) implement these traits and pass themselves into
//! the Animator.

pub mod memory;

use crate::data::{DrivingCurve, Interpolation};
use crate::error::HostResult;
use crate::ids::{HookId, ObjectId};

pub use memory::MemoryHost;

/// Deformation targets (shape keys) of host objects, identified by name.
pub trait TargetStore {
    /// Whether the object can carry deformation targets at all.
    fn is_keyable(&self, object: ObjectId) -> bool;

    /// Target names in host order.
    fn targets(&self, object: ObjectId) -> Vec<String>;

    fn has_target(&self, object: ObjectId, name: &str) -> bool {
        self.targets(object).iter().any(|t| t == name)
    }

    /// Create a target, neutral or captured from the current blended mix.
    /// Returns the name the host actually assigned.
    fn add_target(&mut self, object: ObjectId, name: &str, from_mix: bool) -> HostResult<String>;

    fn remove_target(&mut self, object: ObjectId, name: &str) -> HostResult<()>;

    /// Rename a target. Returns the name the host actually assigned.
    fn rename_target(&mut self, object: ObjectId, name: &str, new_name: &str)
        -> HostResult<String>;

    fn set_influence(&mut self, object: ObjectId, name: &str, weight: f32) -> HostResult<()>;

    fn influence(&self, object: ObjectId, name: &str) -> Option<f32>;
}

/// Animation curves bound to object properties.
pub trait CurveStore {
    fn is_animated(&self, object: ObjectId, property: &str) -> bool;

    fn curves(&self, object: ObjectId, property: &str) -> Vec<&DrivingCurve>;

    fn curves_mut(&mut self, object: ObjectId, property: &str) -> Vec<&mut DrivingCurve>;

    /// Record a sample on the property's curve, creating the curve if needed.
    fn insert_keyframe(
        &mut self,
        object: ObjectId,
        property: &str,
        time: f64,
        value: f64,
        interpolation: Interpolation,
    );
}

/// Scene time cursor.
pub trait SceneClock {
    fn current_frame(&self) -> f64;

    /// Whether the host records keyframes automatically when animated values change.
    fn autokey_enabled(&self) -> bool {
        false
    }
}

/// Registration point of the frame-change notification.
pub trait FrameHooks {
    fn append(&mut self, name: &'static str) -> HookId;

    fn remove(&mut self, hook: HookId) -> bool;

    fn is_installed(&self, hook: HookId) -> bool;
}

/// Everything the Animator needs from the host.
pub trait Host: TargetStore + CurveStore + SceneClock {}

impl<T: TargetStore + CurveStore + SceneClock + ?Sized> Host for T {}
