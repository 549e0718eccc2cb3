//! Keyframe lookup around an evaluation time.
//!
//! Model:
//! - "previous" is the last keyframe at or before the time.
//! - "next" is the first keyframe strictly after the time.
//! - The segment between them is held (Constant) or blended linearly (Interpolated),
//!   as chosen by the previous keyframe.

use crate::data::{DrivingCurve, Interpolation, Keyframe};

/// Where an evaluation time falls on a curve with at least one sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Segment<'a> {
    /// Time precedes the first sample.
    BeforeFirst,
    /// Step hold on a Constant keyframe.
    Hold(&'a Keyframe),
    /// Time is at or past the last sample.
    AfterLast(&'a Keyframe),
    /// Linear blend: `prev` weighs `1 - ratio`, `next` weighs `ratio`.
    Blend {
        prev: &'a Keyframe,
        next: &'a Keyframe,
        ratio: f64,
    },
}

/// Last keyframe whose time is at or before `time`.
pub fn previous_keyframe(curve: &DrivingCurve, time: f64) -> Option<&Keyframe> {
    let after = curve.keyframes.partition_point(|k| k.time <= time);
    after.checked_sub(1).and_then(|i| curve.keyframes.get(i))
}

/// First keyframe whose time is strictly after `time`.
pub fn next_keyframe(curve: &DrivingCurve, time: f64) -> Option<&Keyframe> {
    let after = curve.keyframes.partition_point(|k| k.time <= time);
    curve.keyframes.get(after)
}

/// Blend ratio of `time` between two sample times. Coincident samples give 1.
pub fn blend_ratio(prev_time: f64, next_time: f64, time: f64) -> f64 {
    let span = next_time - prev_time;
    if span == 0.0 {
        1.0
    } else {
        (time - prev_time) / span
    }
}

/// Classify `time` against the curve. Returns None for an empty curve.
pub fn locate(curve: &DrivingCurve, time: f64) -> Option<Segment<'_>> {
    if curve.is_empty() {
        return None;
    }
    let prev = match curve.previous(time) {
        Some(k) => k,
        None => return Some(Segment::BeforeFirst),
    };
    if prev.interpolation == Interpolation::Constant {
        return Some(Segment::Hold(prev));
    }
    match curve.next(time) {
        None => Some(Segment::AfterLast(prev)),
        Some(next) => Some(Segment::Blend {
            prev,
            next,
            ratio: blend_ratio(prev.time, next.time, time),
        }),
    }
}

/// Value of the curve at `time`, holding the first/last sample outside its range.
pub fn sample_curve(curve: &DrivingCurve, time: f64) -> Option<f64> {
    let first = curve.keyframes.first()?;
    match locate(curve, time)? {
        Segment::BeforeFirst => Some(first.value),
        Segment::Hold(k) | Segment::AfterLast(k) => Some(k.value),
        Segment::Blend { prev, next, ratio } => Some(prev.value + (next.value - prev.value) * ratio),
    }
}

impl DrivingCurve {
    #[inline]
    pub fn previous(&self, time: f64) -> Option<&Keyframe> {
        previous_keyframe(self, time)
    }

    #[inline]
    pub fn next(&self, time: f64) -> Option<&Keyframe> {
        next_keyframe(self, time)
    }

    #[inline]
    pub fn sample(&self, time: f64) -> Option<f64> {
        sample_curve(self, time)
    }
}
