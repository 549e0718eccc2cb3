//! Registry entries and the driving-curve data model.

use serde::{Deserialize, Serialize};

/// One entry of an object's ordered key list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimatedKey {
    /// User-facing name, kept equal to the target name by `rename`.
    pub display_name: String,
    /// Name of the deformation target this entry drives; the join key into the host store.
    pub target_name: String,
}

impl AnimatedKey {
    pub fn new(target_name: impl Into<String>) -> Self {
        let target_name = target_name.into();
        Self {
            display_name: target_name.clone(),
            target_name,
        }
    }
}

/// Per-keyframe interpolation towards the following sample.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Hold this keyframe's value until the next sample.
    Constant,
    /// Blend linearly towards the next sample.
    #[default]
    Interpolated,
}

/// A single time/value/interpolation sample.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Frame on the scene time axis.
    pub time: f64,
    /// Index into the key list, possibly fractional.
    pub value: f64,
    #[serde(default)]
    pub interpolation: Interpolation,
}

impl Keyframe {
    pub fn new(time: f64, value: f64, interpolation: Interpolation) -> Self {
        Self {
            time,
            value,
            interpolation,
        }
    }

    /// Key index this sample references.
    #[inline]
    pub fn index(&self) -> Option<usize> {
        index_of(self.value)
    }
}

/// Interpret a curve value as a key index (round half away from zero).
/// Negative and non-finite values reference nothing.
pub fn index_of(value: f64) -> Option<usize> {
    if !value.is_finite() {
        return None;
    }
    let rounded = value.round();
    if rounded < 0.0 {
        None
    } else {
        Some(rounded as usize)
    }
}

/// Time-sampled curve driving a list's active index. Keyframes are ordered by time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DrivingCurve {
    #[serde(default)]
    pub keyframes: Vec<Keyframe>,
}

impl DrivingCurve {
    /// Build a curve, ordering samples by time (stable for equal times).
    pub fn new(mut keyframes: Vec<Keyframe>) -> Self {
        keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keyframes }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Keyframe> {
        self.keyframes.iter()
    }

    pub fn clear(&mut self) {
        self.keyframes.clear();
    }

    /// Record a sample. An existing sample at exactly `time` is overwritten in place.
    pub fn insert(&mut self, time: f64, value: f64, interpolation: Interpolation) {
        if let Some(existing) = self.keyframes.iter_mut().find(|k| k.time == time) {
            existing.value = value;
            existing.interpolation = interpolation;
            return;
        }
        let at = self.keyframes.partition_point(|k| k.time <= time);
        self.keyframes
            .insert(at, Keyframe::new(time, value, interpolation));
    }

    /// Validate basic invariants (finite times, non-decreasing order).
    pub fn validate_basic(&self) -> Result<(), String> {
        let mut last = f64::NEG_INFINITY;
        for (i, k) in self.keyframes.iter().enumerate() {
            if !k.time.is_finite() {
                return Err(format!("keyframe {i} has a non-finite time"));
            }
            if k.time < last {
                return Err(format!("keyframe {i} is out of time order"));
            }
            last = k.time;
        }
        Ok(())
    }
}
