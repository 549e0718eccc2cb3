//! Writing a resolved pose into the host's deformation targets.

use crate::error::HostError;
use crate::host::TargetStore;
use crate::ids::ObjectId;
use crate::weights::WeightVector;

/// What a commit wrote.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommitReport {
    /// (target, weight) pairs written, in write order.
    pub written: Vec<(String, f32)>,
    /// Tracked targets the host no longer knows.
    pub missing: Vec<String>,
    /// Other host failures, per target.
    pub failed: Vec<(String, HostError)>,
}

impl CommitReport {
    pub fn weight_of(&self, target: &str) -> Option<f32> {
        self.written
            .iter()
            .find(|(t, _)| t == target)
            .map(|(_, w)| *w)
    }
}

/// Write `pose` over every tracked target: targets in the pose get their weight, all
/// others get 0. Each target is written at most once.
pub fn commit<'a, S>(
    object: ObjectId,
    tracked: impl IntoIterator<Item = &'a str>,
    pose: &WeightVector,
    store: &mut S,
) -> CommitReport
where
    S: TargetStore + ?Sized,
{
    let mut report = CommitReport::default();
    let mut seen: hashbrown::HashSet<&str> = hashbrown::HashSet::new();

    let tracked: Vec<&str> = tracked.into_iter().collect();
    let order = tracked.iter().copied().chain(pose.iter().map(|(t, _)| t));

    for target in order {
        if !seen.insert(target) {
            continue;
        }
        let weight = pose.get(target).unwrap_or(0.0);
        match store.set_influence(object, target, weight) {
            Ok(()) => report.written.push((target.to_string(), weight)),
            Err(HostError::MissingTarget(name)) => {
                log::warn!("object {object}: shape key '{name}' is gone, skipping");
                report.missing.push(name);
            }
            Err(err) => {
                log::warn!("object {object}: writing '{target}' failed: {err}");
                report.failed.push((target.to_string(), err));
            }
        }
    }
    report
}
