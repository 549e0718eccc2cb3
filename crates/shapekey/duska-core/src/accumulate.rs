//! Merging of per-list poses into one object pose.

use indexmap::IndexMap;

use crate::weights::WeightVector;

#[derive(Clone, Copy, Debug, Default)]
struct AccumEntry {
    sum: f32,
    count: u32,
}

/// Collects one WeightVector per list. A target fed by several lists receives the mean
/// of their weights; a target fed by one list passes through unchanged.
#[derive(Default, Debug)]
pub struct Accumulator {
    map: IndexMap<String, AccumEntry>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self {
            map: IndexMap::new(),
        }
    }

    pub fn add(&mut self, pose: &WeightVector) {
        for (target, weight) in pose.iter() {
            let entry = self.map.entry(target.to_string()).or_default();
            entry.sum += weight;
            entry.count += 1;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn finalize(self) -> WeightVector {
        self.map
            .into_iter()
            .map(|(target, e)| (target, e.sum / e.count.max(1) as f32))
            .collect()
    }
}
