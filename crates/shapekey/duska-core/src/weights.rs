//! Sparse per-target weights for one evaluated pose.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Target name → weight. Absent targets weigh 0.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightVector {
    weights: IndexMap<String, f32>,
}

impl WeightVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pose made of exactly one key at full weight.
    pub fn single(target: impl Into<String>) -> Self {
        let mut w = Self::new();
        w.add(target, 1.0);
        w
    }

    /// Add `weight` to `target`. Non-positive contributions are dropped.
    pub fn add(&mut self, target: impl Into<String>, weight: f32) {
        if weight <= 0.0 || !weight.is_finite() {
            return;
        }
        *self.weights.entry(target.into()).or_insert(0.0) += weight;
    }

    pub fn get(&self, target: &str) -> Option<f32> {
        self.weights.get(target).copied()
    }

    pub fn contains(&self, target: &str) -> bool {
        self.weights.contains_key(target)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.weights.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Sum of all weights.
    pub fn total(&self) -> f32 {
        self.weights.values().sum()
    }
}

impl FromIterator<(String, f32)> for WeightVector {
    fn from_iter<I: IntoIterator<Item = (String, f32)>>(iter: I) -> Self {
        let mut w = Self::new();
        for (target, weight) in iter {
            w.add(target, weight);
        }
        w
    }
}
