//! Core configuration for duska-core.

use serde::{Deserialize, Serialize};

use crate::data::Interpolation;

/// Hard cap on parallel key lists per object.
pub const MAX_LISTS: usize = 5;

/// What `remove_key` does when asked to remove the basis entry (position 0).
///
/// Bulk deletion always keeps the basis target alive; single removal is configurable.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasisRemovePolicy {
    /// Remove the entry but never delete the basis target.
    #[default]
    KeepTarget,
    /// Treat position 0 like any other entry.
    DeleteTarget,
    /// Refuse to remove the basis entry while other keys remain.
    Locked,
}

/// Configuration for naming, basis handling and feature flags.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name given to the basis target created with an object's first key.
    pub basis_name: String,
    /// Name requested for new key targets; the host may uniquify it.
    pub key_name: String,
    pub remove_policy: BasisRemovePolicy,
    /// Parallel lists per object when `features.multi_list` is on (capped at MAX_LISTS).
    pub max_lists: usize,
    /// Interpolation of keyframes recorded by autokey.
    pub autokey_interpolation: Interpolation,
    pub features: Features,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    /// Several independent lists per object, averaged at evaluation.
    pub multi_list: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            basis_name: "Basis".to_string(),
            key_name: "SKA.Key".to_string(),
            remove_policy: BasisRemovePolicy::default(),
            max_lists: MAX_LISTS,
            autokey_interpolation: Interpolation::Interpolated,
            features: Features::default(),
        }
    }
}

impl Config {
    /// Number of lists an object may own under this configuration.
    pub fn list_count(&self) -> usize {
        if self.features.multi_list {
            self.max_lists.clamp(1, MAX_LISTS)
        } else {
            1
        }
    }

    /// Parse a configuration from JSON; missing fields take their defaults.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
