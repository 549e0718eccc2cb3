//! In-memory host: objects with ordered targets, property curves, a frame cursor and
//! frame hooks. Deserializable from JSON so scenes can be described as fixtures.

use serde::{Deserialize, Serialize};

use super::{CurveStore, FrameHooks, SceneClock, TargetStore};
use crate::animator::Animator;
use crate::data::{DrivingCurve, Interpolation};
use crate::error::{HostError, HostResult};
use crate::ids::{HookId, IdAllocator, ObjectId};

fn default_true() -> bool {
    true
}

/// One deformation target and its current influence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemoryTarget {
    pub name: String,
    #[serde(default)]
    pub influence: f32,
    /// Whether the target was captured from the blended mix.
    #[serde(default)]
    pub from_mix: bool,
}

/// Curves bound to one property path.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyCurves {
    pub property: String,
    #[serde(default)]
    pub curves: Vec<DrivingCurve>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemoryObject {
    pub id: ObjectId,
    #[serde(default = "default_true")]
    pub keyable: bool,
    #[serde(default)]
    pub targets: Vec<MemoryTarget>,
    #[serde(default)]
    pub animation: Vec<PropertyCurves>,
}

impl MemoryObject {
    pub fn new(id: ObjectId) -> Self {
        Self {
            id,
            keyable: true,
            targets: Vec::new(),
            animation: Vec::new(),
        }
    }

    fn target(&self, name: &str) -> Option<&MemoryTarget> {
        self.targets.iter().find(|t| t.name == name)
    }

    fn target_mut(&mut self, name: &str) -> Option<&mut MemoryTarget> {
        self.targets.iter_mut().find(|t| t.name == name)
    }

    /// Pick a free name: `base`, then `base.001`, `base.002`, ...
    fn unique_name(&self, base: &str, ignoring: Option<&str>) -> String {
        let taken = |n: &str| self.targets.iter().any(|t| t.name == n && Some(n) != ignoring);
        if !taken(base) {
            return base.to_string();
        }
        (1..)
            .map(|i| format!("{base}.{i:03}"))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    fn property(&self, property: &str) -> Option<&PropertyCurves> {
        self.animation.iter().find(|p| p.property == property)
    }

    fn property_mut(&mut self, property: &str) -> Option<&mut PropertyCurves> {
        self.animation.iter_mut().find(|p| p.property == property)
    }
}

/// Scene held entirely in memory.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MemoryHost {
    #[serde(default)]
    pub objects: Vec<MemoryObject>,
    #[serde(default)]
    pub frame: f64,
    #[serde(default)]
    pub autokey: bool,
    #[serde(skip)]
    hooks: Vec<(HookId, &'static str)>,
    #[serde(skip)]
    ids: IdAllocator,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(s: &str) -> Result<Self, String> {
        let host: MemoryHost = serde_json::from_str(s).map_err(|e| format!("parse error: {e}"))?;
        for obj in &host.objects {
            for prop in &obj.animation {
                for curve in &prop.curves {
                    curve
                        .validate_basic()
                        .map_err(|e| format!("object {} '{}': {e}", obj.id, prop.property))?;
                }
            }
        }
        Ok(host)
    }

    /// Add (or fetch) an object.
    pub fn add_object(&mut self, id: ObjectId) -> &mut MemoryObject {
        let at = match self.objects.iter().position(|o| o.id == id) {
            Some(at) => at,
            None => {
                self.objects.push(MemoryObject::new(id));
                self.objects.len() - 1
            }
        };
        &mut self.objects[at]
    }

    pub fn object(&self, id: ObjectId) -> Option<&MemoryObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut MemoryObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// Bind a curve to an object property, replacing existing ones.
    pub fn set_curve(&mut self, id: ObjectId, property: &str, curve: DrivingCurve) {
        let obj = self.add_object(id);
        match obj.property_mut(property) {
            Some(p) => p.curves = vec![curve],
            None => obj.animation.push(PropertyCurves {
                property: property.to_string(),
                curves: vec![curve],
            }),
        }
    }

    /// Move the time cursor and fire the frame-change notification if a handler is
    /// installed. Returns whether the handler ran.
    pub fn scrub_to(&mut self, frame: f64, animator: &mut Animator) -> bool {
        self.frame = frame;
        if self.hooks.is_empty() {
            return false;
        }
        animator.frame_changed(self);
        true
    }

    pub fn installed_hooks(&self) -> usize {
        self.hooks.len()
    }
}

impl TargetStore for MemoryHost {
    fn is_keyable(&self, object: ObjectId) -> bool {
        self.object(object).is_some_and(|o| o.keyable)
    }

    fn targets(&self, object: ObjectId) -> Vec<String> {
        self.object(object)
            .map(|o| o.targets.iter().map(|t| t.name.clone()).collect())
            .unwrap_or_default()
    }

    fn has_target(&self, object: ObjectId, name: &str) -> bool {
        self.object(object).is_some_and(|o| o.target(name).is_some())
    }

    fn add_target(&mut self, object: ObjectId, name: &str, from_mix: bool) -> HostResult<String> {
        let obj = self
            .object_mut(object)
            .ok_or(HostError::UnknownObject(object))?;
        let name = obj.unique_name(name, None);
        obj.targets.push(MemoryTarget {
            name: name.clone(),
            influence: 0.0,
            from_mix,
        });
        Ok(name)
    }

    fn remove_target(&mut self, object: ObjectId, name: &str) -> HostResult<()> {
        let obj = self
            .object_mut(object)
            .ok_or(HostError::UnknownObject(object))?;
        let at = obj
            .targets
            .iter()
            .position(|t| t.name == name)
            .ok_or_else(|| HostError::MissingTarget(name.to_string()))?;
        obj.targets.remove(at);
        Ok(())
    }

    fn rename_target(
        &mut self,
        object: ObjectId,
        name: &str,
        new_name: &str,
    ) -> HostResult<String> {
        let obj = self
            .object_mut(object)
            .ok_or(HostError::UnknownObject(object))?;
        if obj.target(name).is_none() {
            return Err(HostError::MissingTarget(name.to_string()));
        }
        let assigned = obj.unique_name(new_name, Some(name));
        if let Some(t) = obj.target_mut(name) {
            t.name = assigned.clone();
        }
        Ok(assigned)
    }

    fn set_influence(&mut self, object: ObjectId, name: &str, weight: f32) -> HostResult<()> {
        let obj = self
            .object_mut(object)
            .ok_or(HostError::UnknownObject(object))?;
        let target = obj
            .target_mut(name)
            .ok_or_else(|| HostError::MissingTarget(name.to_string()))?;
        target.influence = weight.clamp(0.0, 1.0);
        Ok(())
    }

    fn influence(&self, object: ObjectId, name: &str) -> Option<f32> {
        self.object(object)
            .and_then(|o| o.target(name))
            .map(|t| t.influence)
    }
}

impl CurveStore for MemoryHost {
    fn is_animated(&self, object: ObjectId, property: &str) -> bool {
        self.object(object)
            .is_some_and(|o| o.property(property).is_some())
    }

    fn curves(&self, object: ObjectId, property: &str) -> Vec<&DrivingCurve> {
        self.object(object)
            .and_then(|o| o.property(property))
            .map(|p| p.curves.iter().collect())
            .unwrap_or_default()
    }

    fn curves_mut(&mut self, object: ObjectId, property: &str) -> Vec<&mut DrivingCurve> {
        self.object_mut(object)
            .and_then(|o| o.property_mut(property))
            .map(|p| p.curves.iter_mut().collect())
            .unwrap_or_default()
    }

    fn insert_keyframe(
        &mut self,
        object: ObjectId,
        property: &str,
        time: f64,
        value: f64,
        interpolation: Interpolation,
    ) {
        let obj = self.add_object(object);
        if obj.property(property).is_none() {
            obj.animation.push(PropertyCurves {
                property: property.to_string(),
                curves: Vec::new(),
            });
        }
        if let Some(p) = obj.property_mut(property) {
            if p.curves.is_empty() {
                p.curves.push(DrivingCurve::default());
            }
            p.curves[0].insert(time, value, interpolation);
        }
    }
}

impl SceneClock for MemoryHost {
    fn current_frame(&self) -> f64 {
        self.frame
    }

    fn autokey_enabled(&self) -> bool {
        self.autokey
    }
}

impl FrameHooks for MemoryHost {
    fn append(&mut self, name: &'static str) -> HookId {
        let id = self.ids.alloc_hook();
        self.hooks.push((id, name));
        id
    }

    fn remove(&mut self, hook: HookId) -> bool {
        let before = self.hooks.len();
        self.hooks.retain(|(id, _)| *id != hook);
        self.hooks.len() != before
    }

    fn is_installed(&self, hook: HookId) -> bool {
        self.hooks.iter().any(|(id, _)| *id == hook)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_uniquified() {
        let mut host = MemoryHost::new();
        let id = ObjectId(1);
        host.add_object(id);
        assert_eq!(host.add_target(id, "SKA.Key", false).unwrap(), "SKA.Key");
        assert_eq!(host.add_target(id, "SKA.Key", false).unwrap(), "SKA.Key.001");
        assert_eq!(host.add_target(id, "SKA.Key", true).unwrap(), "SKA.Key.002");
        assert_eq!(
            host.rename_target(id, "SKA.Key.001", "SKA.Key").unwrap(),
            "SKA.Key.001"
        );
        assert_eq!(host.rename_target(id, "SKA.Key.001", "Smile").unwrap(), "Smile");
        assert_eq!(host.rename_target(id, "SKA.Key", "SKA.Key").unwrap(), "SKA.Key");
    }

    #[test]
    fn influence_is_clamped_and_missing_targets_reported() {
        let mut host = MemoryHost::new();
        let id = ObjectId(1);
        host.add_object(id);
        host.add_target(id, "A", false).unwrap();
        host.set_influence(id, "A", 1.5).unwrap();
        assert_eq!(host.influence(id, "A"), Some(1.0));
        assert_eq!(
            host.set_influence(id, "B", 0.5),
            Err(HostError::MissingTarget("B".into()))
        );
        assert_eq!(
            host.set_influence(ObjectId(9), "A", 0.5),
            Err(HostError::UnknownObject(ObjectId(9)))
        );
    }

    #[test]
    fn insert_keyframe_creates_property_curve() {
        let mut host = MemoryHost::new();
        let id = ObjectId(2);
        assert!(!host.is_animated(id, "p"));
        host.insert_keyframe(id, "p", 4.0, 1.0, Interpolation::Constant);
        assert!(host.is_animated(id, "p"));
        assert_eq!(host.curves(id, "p")[0].len(), 1);
    }

    #[test]
    fn hooks_install_and_remove() {
        let mut host = MemoryHost::new();
        let a = host.append("a");
        let b = host.append("b");
        assert_ne!(a, b);
        assert!(host.is_installed(a));
        assert!(host.remove(a));
        assert!(!host.remove(a));
        assert!(!host.is_installed(a));
        assert_eq!(host.installed_hooks(), 1);
    }

    #[test]
    fn from_json_rejects_unordered_curves() {
        let json = r#"{
            "objects": [{
                "id": 1,
                "animation": [{
                    "property": "ska_active_index",
                    "curves": [{ "keyframes": [
                        { "time": 5.0, "value": 0.0 },
                        { "time": 1.0, "value": 1.0 }
                    ]}]
                }]
            }]
        }"#;
        assert!(MemoryHost::from_json(json).is_err());
    }
}
