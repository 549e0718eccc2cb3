//! Bridge between ECS state and the core's host traits for the duration of one system.

use bevy::prelude::*;
use bevy::render::mesh::morph::MorphWeights;
use duska_core::{
    CurveStore, DrivingCurve, HostError, HostResult, Interpolation, ObjectId, SceneClock,
    TargetStore,
};
use hashbrown::HashMap;

use crate::components::{DuskaObject, MorphTargetNames};
use crate::resources::{DuskaCurves, DuskaTimeline};

/// Owned copy of one entity's morph targets.
struct MorphSlot {
    entity: Entity,
    names: Vec<String>,
    weights: Vec<f32>,
    renamed: bool,
}

/// Query shape shared by the systems that build a MorphHost.
pub type MorphQuery<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static DuskaObject,
        &'static mut MorphTargetNames,
        &'static mut MorphWeights,
    ),
>;

pub(crate) struct MorphHost<'a> {
    slots: HashMap<ObjectId, MorphSlot>,
    curves: &'a mut DuskaCurves,
    frame: f64,
    autokey: bool,
}

impl<'a> MorphHost<'a> {
    pub(crate) fn collect(
        query: &MorphQuery,
        curves: &'a mut DuskaCurves,
        timeline: &DuskaTimeline,
    ) -> Self {
        let slots = query
            .iter()
            .map(|(entity, object, names, weights)| {
                (
                    object.0,
                    MorphSlot {
                        entity,
                        names: names.0.clone(),
                        weights: weights.weights().to_vec(),
                        renamed: false,
                    },
                )
            })
            .collect();
        Self {
            slots,
            curves,
            frame: timeline.frame,
            autokey: timeline.autokey,
        }
    }

    /// Copy weights (and renamed target lists) back onto the entities.
    pub(crate) fn write_back(self, query: &mut MorphQuery) {
        for slot in self.slots.into_values() {
            let Ok((_, _, mut names, mut weights)) = query.get_mut(slot.entity) else {
                continue;
            };
            if slot.renamed {
                names.0 = slot.names;
            }
            if weights.weights() != slot.weights.as_slice() {
                let dst = weights.weights_mut();
                let n = dst.len().min(slot.weights.len());
                dst[..n].copy_from_slice(&slot.weights[..n]);
            }
        }
    }

    fn slot(&self, object: ObjectId) -> HostResult<&MorphSlot> {
        self.slots
            .get(&object)
            .ok_or(HostError::UnknownObject(object))
    }

    fn slot_mut(&mut self, object: ObjectId) -> HostResult<&mut MorphSlot> {
        self.slots
            .get_mut(&object)
            .ok_or(HostError::UnknownObject(object))
    }
}

fn position(slot: &MorphSlot, name: &str) -> HostResult<usize> {
    slot.names
        .iter()
        .position(|n| n == name)
        .ok_or_else(|| HostError::MissingTarget(name.to_string()))
}

impl TargetStore for MorphHost<'_> {
    fn is_keyable(&self, object: ObjectId) -> bool {
        self.slots.contains_key(&object)
    }

    fn targets(&self, object: ObjectId) -> Vec<String> {
        self.slot(object).map(|s| s.names.clone()).unwrap_or_default()
    }

    fn add_target(&mut self, _object: ObjectId, name: &str, _from_mix: bool) -> HostResult<String> {
        Err(HostError::Unsupported(format!(
            "cannot add morph target '{name}' to a baked mesh"
        )))
    }

    fn remove_target(&mut self, _object: ObjectId, name: &str) -> HostResult<()> {
        Err(HostError::Unsupported(format!(
            "cannot remove morph target '{name}' from a baked mesh"
        )))
    }

    fn rename_target(
        &mut self,
        object: ObjectId,
        name: &str,
        new_name: &str,
    ) -> HostResult<String> {
        let slot = self.slot_mut(object)?;
        let at = position(slot, name)?;
        let taken = |candidate: &str| {
            slot.names
                .iter()
                .enumerate()
                .any(|(i, n)| i != at && n == candidate)
        };
        let assigned = if taken(new_name) {
            (1..)
                .map(|i| format!("{new_name}.{i:03}"))
                .find(|candidate| !taken(candidate))
                .unwrap_or_else(|| new_name.to_string())
        } else {
            new_name.to_string()
        };
        slot.names[at] = assigned.clone();
        slot.renamed = true;
        Ok(assigned)
    }

    fn set_influence(&mut self, object: ObjectId, name: &str, weight: f32) -> HostResult<()> {
        let slot = self.slot_mut(object)?;
        let at = position(slot, name)?;
        match slot.weights.get_mut(at) {
            Some(w) => {
                *w = weight.clamp(0.0, 1.0);
                Ok(())
            }
            None => Err(HostError::MissingTarget(name.to_string())),
        }
    }

    fn influence(&self, object: ObjectId, name: &str) -> Option<f32> {
        let slot = self.slot(object).ok()?;
        let at = position(slot, name).ok()?;
        slot.weights.get(at).copied()
    }
}

impl CurveStore for MorphHost<'_> {
    fn is_animated(&self, object: ObjectId, property: &str) -> bool {
        self.curves.is_animated(object, property)
    }

    fn curves(&self, object: ObjectId, property: &str) -> Vec<&DrivingCurve> {
        self.curves.curves(object, property)
    }

    fn curves_mut(&mut self, object: ObjectId, property: &str) -> Vec<&mut DrivingCurve> {
        self.curves.curves_mut(object, property)
    }

    fn insert_keyframe(
        &mut self,
        object: ObjectId,
        property: &str,
        time: f64,
        value: f64,
        interpolation: Interpolation,
    ) {
        self.curves
            .insert_keyframe(object, property, time, value, interpolation);
    }
}

impl SceneClock for MorphHost<'_> {
    fn current_frame(&self) -> f64 {
        self.frame
    }

    fn autokey_enabled(&self) -> bool {
        self.autokey
    }
}
