use serde::{Deserialize, Serialize};

use crate::ids::ObjectId;
use crate::registry::KeyRegistry;

/// Registries of one object, list 0 first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    pub id: ObjectId,
    #[serde(default)]
    pub lists: Vec<KeyRegistry>,
}

/// Serializable copy of the animator's side table. Hosts store it alongside their own
/// scene data and hand it back through `Animator::from_snapshot`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimatorSnapshot {
    #[serde(default)]
    pub objects: Vec<ObjectSnapshot>,
}

impl AnimatorSnapshot {
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string(self).map_err(|e| format!("serialize error: {e}"))
    }
}

/// Parse a snapshot from JSON, rejecting duplicate object ids.
pub fn parse_snapshot_json(s: &str) -> Result<AnimatorSnapshot, String> {
    let snap: AnimatorSnapshot = serde_json::from_str(s).map_err(|e| format!("parse error: {e}"))?;
    let mut seen = hashbrown::HashSet::new();
    for obj in &snap.objects {
        if !seen.insert(obj.id) {
            return Err(format!("object {} appears twice", obj.id));
        }
    }
    Ok(snap)
}
