//! Index-to-weight resolution for one key list.
//!
//! A list's active index is either static (weight 1 on the active key) or driven by a
//! curve whose values are key indices. Between two Interpolated samples the pose is an
//! in-between of the two referenced keys; a Constant sample is a hard step.

use crate::data::DrivingCurve;
use crate::registry::KeyRegistry;
use crate::sampling::{locate, Segment};
use crate::weights::WeightVector;

/// Animation state of a list's active-index property.
#[derive(Clone, Copy, Debug)]
pub enum CurveState<'a> {
    /// The property carries no animation.
    Static,
    /// The property is animated; the bound curve if the host has one.
    Animated(Option<&'a DrivingCurve>),
}

/// Pose of a single key at full weight.
fn pose_at(registry: &KeyRegistry, index: usize) -> Option<WeightVector> {
    registry
        .get(index)
        .map(|key| WeightVector::single(key.target_name.clone()))
}

/// Resolve the pose of `registry` at `time`.
///
/// Returns None when nothing should change: no active key, or the curve only references
/// keys that do not exist.
pub fn resolve_registry(
    registry: &KeyRegistry,
    state: CurveState<'_>,
    time: f64,
) -> Option<WeightVector> {
    let active = registry.active()?;
    let steady = || pose_at(registry, active);

    let curve = match state {
        CurveState::Static | CurveState::Animated(None) => return steady(),
        CurveState::Animated(Some(curve)) => curve,
    };
    if curve.len() < 2 {
        return steady();
    }

    match locate(curve, time)? {
        Segment::BeforeFirst => steady(),
        Segment::Hold(k) | Segment::AfterLast(k) => pose_at(registry, k.index()?),
        Segment::Blend { prev, next, ratio } => {
            let mut pose = WeightVector::new();
            let ratio = ratio as f32;
            if let Some(key) = prev.index().and_then(|i| registry.get(i)) {
                pose.add(key.target_name.clone(), 1.0 - ratio);
            }
            if let Some(key) = next.index().and_then(|i| registry.get(i)) {
                pose.add(key.target_name.clone(), ratio);
            }
            log::trace!(
                "blend {:?} -> {:?} at {time} (ratio {ratio})",
                prev.index(),
                next.index()
            );
            if pose.is_empty() {
                None
            } else {
                Some(pose)
            }
        }
    }
}
