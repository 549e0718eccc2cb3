use bevy::prelude::*;
use duska_core::{CoreEvent, Host};

use crate::host::{MorphHost, MorphQuery};
use crate::resources::{DuskaCurves, DuskaTimeline};
use crate::{DuskaAnimator, DuskaEditApplied, DuskaEditRequest};

/// Advance the timeline by this frame's wall time.
pub fn advance_timeline(time: Res<Time>, mut timeline: ResMut<DuskaTimeline>) {
    timeline.advance(time.delta_seconds_f64());
}

/// Apply queued edit requests in arrival order and report each result.
pub fn apply_edit_requests(
    mut requests: EventReader<DuskaEditRequest>,
    mut applied: EventWriter<DuskaEditApplied>,
    mut animator: ResMut<DuskaAnimator>,
    mut curves: ResMut<DuskaCurves>,
    timeline: Res<DuskaTimeline>,
    mut query: MorphQuery,
) {
    if requests.is_empty() {
        return;
    }
    let mut host = MorphHost::collect(&query, &mut curves, &timeline);
    for request in requests.read() {
        let result = request.apply(&mut animator.0, &mut host as &mut dyn Host);
        applied.send(DuskaEditApplied {
            object: request.object(),
            result,
        });
    }
    host.write_back(&mut query);
}

/// Frame-change handler: when the timeline moved and a hook is installed, evaluate every
/// object and push the weights into `MorphWeights`.
pub fn evaluate_shape_keys(
    mut animator: ResMut<DuskaAnimator>,
    mut curves: ResMut<DuskaCurves>,
    mut timeline: ResMut<DuskaTimeline>,
    mut query: MorphQuery,
) {
    if !timeline.frame_changed() || timeline.installed_hooks() == 0 {
        return;
    }
    timeline.last_evaluated = Some(timeline.frame);

    let mut host = MorphHost::collect(&query, &mut curves, &timeline);
    let outputs = animator.0.frame_changed(&mut host);
    for event in &outputs.events {
        if let CoreEvent::MissingTarget { object, target } = event {
            debug!("duska: object {object} has no morph target '{target}'");
        }
    }
    host.write_back(&mut query);
}
