//! Bevy adapter for the Duska shape-key core.
//!
//! Entities opt in with [`DuskaObject`] and [`MorphTargetNames`] next to Bevy's
//! `MorphWeights`. Edits arrive as [`DuskaEditRequest`] events; results come back as
//! [`DuskaEditApplied`]. Whenever [`DuskaTimeline`] moves to a new frame every object is
//! re-evaluated and its morph weights rewritten.

use bevy::prelude::*;
use duska_core::{
    Animator, Config, Direction, Edit, EditResult, Host, ListId, ObjectId,
};

pub mod components;
mod host;
pub mod resources;
pub mod systems;

pub use components::{DuskaObject, MorphTargetNames};
pub use resources::{DuskaCurves, DuskaTimeline};

/// The core animator, owning every object's key lists.
#[derive(Resource, Debug, Default)]
pub struct DuskaAnimator(pub Animator);

/// An editing operation on one object's key list.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum DuskaEditRequest {
    IncludeExisting {
        object: ObjectId,
        list: ListId,
        target: String,
    },
    AddKey {
        object: ObjectId,
        list: ListId,
        from_mix: bool,
    },
    RemoveKey {
        object: ObjectId,
        list: ListId,
        index: usize,
        delete_target: bool,
    },
    MoveKey {
        object: ObjectId,
        list: ListId,
        index: usize,
        direction: Direction,
    },
    DeleteAll {
        object: ObjectId,
        list: ListId,
        delete_targets: bool,
    },
    Rename {
        object: ObjectId,
        list: ListId,
        index: usize,
        name: String,
    },
    SetActiveIndex {
        object: ObjectId,
        list: ListId,
        index: Option<usize>,
    },
}

impl DuskaEditRequest {
    pub fn object(&self) -> ObjectId {
        match self {
            Self::IncludeExisting { object, .. }
            | Self::AddKey { object, .. }
            | Self::RemoveKey { object, .. }
            | Self::MoveKey { object, .. }
            | Self::DeleteAll { object, .. }
            | Self::Rename { object, .. }
            | Self::SetActiveIndex { object, .. } => *object,
        }
    }

    fn apply(&self, animator: &mut Animator, host: &mut dyn Host) -> EditResult<Edit> {
        match self {
            Self::IncludeExisting {
                object,
                list,
                target,
            } => animator.include_existing(*object, *list, target, host),
            Self::AddKey {
                object,
                list,
                from_mix,
            } => animator.add_key(*object, *list, *from_mix, host),
            Self::RemoveKey {
                object,
                list,
                index,
                delete_target,
            } => animator.remove_key(*object, *list, *index, *delete_target, host),
            Self::MoveKey {
                object,
                list,
                index,
                direction,
            } => animator.move_key(*object, *list, *index, *direction, host),
            Self::DeleteAll {
                object,
                list,
                delete_targets,
            } => animator.delete_all(*object, *list, *delete_targets, host),
            Self::Rename {
                object,
                list,
                index,
                name,
            } => animator.rename(*object, *list, *index, name, host),
            Self::SetActiveIndex {
                object,
                list,
                index,
            } => animator.set_active_index(*object, *list, *index, host),
        }
    }
}

/// Outcome of one [`DuskaEditRequest`].
#[derive(Event, Debug, Clone, PartialEq)]
pub struct DuskaEditApplied {
    pub object: ObjectId,
    pub result: EditResult<Edit>,
}

#[derive(Default)]
pub struct DuskaPlugin {
    pub config: Config,
}

impl Plugin for DuskaPlugin {
    fn build(&self, app: &mut App) {
        let mut timeline = DuskaTimeline::default();
        let mut animator = Animator::new(self.config.clone());
        animator.register(&mut timeline);

        app.insert_resource(DuskaAnimator(animator))
            .insert_resource(timeline)
            .init_resource::<DuskaCurves>()
            .add_event::<DuskaEditRequest>()
            .add_event::<DuskaEditApplied>()
            .add_systems(
                Update,
                (
                    systems::advance_timeline,
                    systems::apply_edit_requests,
                    systems::evaluate_shape_keys,
                )
                    .chain(),
            );
    }
}
