//! Keep index-valued keyframes pointing at the same logical key across list edits.
//!
//! Every handler runs before the registry changes, while keyframe values still carry
//! the old index meaning. Only `value` fields are rewritten; samples never move in time.

use crate::data::{index_of, DrivingCurve};

/// A key at `removed` is going away: drop samples referencing it and shift the ones above
/// it down by one. Returns the number of samples dropped.
pub fn on_remove_index(curve: &mut DrivingCurve, removed: usize) -> usize {
    let before = curve.keyframes.len();
    curve
        .keyframes
        .retain(|k| index_of(k.value) != Some(removed));
    for k in curve.keyframes.iter_mut() {
        if matches!(index_of(k.value), Some(i) if i > removed) {
            k.value -= 1.0;
        }
    }
    before - curve.keyframes.len()
}

/// Keys `a` and `b` trade places: samples referencing one now reference the other.
pub fn on_swap_indices(curve: &mut DrivingCurve, a: usize, b: usize) {
    if a == b {
        return;
    }
    for k in curve.keyframes.iter_mut() {
        match index_of(k.value) {
            Some(i) if i == a => k.value = b as f64,
            Some(i) if i == b => k.value = a as f64,
            _ => {}
        }
    }
}

/// Drop every sample.
pub fn on_clear_all(curve: &mut DrivingCurve) {
    curve.clear();
}

/// Apply `on_remove_index` to every curve bound to the list's property.
pub fn remove_index_all<'a>(
    curves: impl IntoIterator<Item = &'a mut DrivingCurve>,
    removed: usize,
) -> usize {
    curves
        .into_iter()
        .map(|c| on_remove_index(c, removed))
        .sum()
}

pub fn swap_indices_all<'a>(curves: impl IntoIterator<Item = &'a mut DrivingCurve>, a: usize, b: usize) {
    for c in curves {
        on_swap_indices(c, a, b);
    }
}

pub fn clear_all<'a>(curves: impl IntoIterator<Item = &'a mut DrivingCurve>) {
    for c in curves {
        on_clear_all(c);
    }
}
