use bevy::prelude::*;
use duska_core::ObjectId;

/// Opts an entity carrying `MorphWeights` into shape-key animation under `ObjectId`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuskaObject(pub ObjectId);

/// Names of the entity's morph targets, in the order of its `MorphWeights`.
///
/// Keys reference targets by these names. Renaming a key renames the entry here.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct MorphTargetNames(pub Vec<String>);

impl MorphTargetNames {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }
}
