use bevy::prelude::*;
use duska_core::{
    CurveStore, DrivingCurve, FrameHooks, HookId, IdAllocator, Interpolation, ObjectId,
};
use hashbrown::HashMap;

/// Index curves of every opted-in entity, keyed by object and property path.
#[derive(Resource, Default, Debug, Clone)]
pub struct DuskaCurves {
    pub map: HashMap<(ObjectId, String), Vec<DrivingCurve>>,
}

impl DuskaCurves {
    /// Bind `curve` to `property`, replacing whatever was bound before.
    pub fn set_curve(&mut self, object: ObjectId, property: &str, curve: DrivingCurve) {
        self.map.insert((object, property.to_string()), vec![curve]);
    }

    pub fn remove_object(&mut self, object: ObjectId) {
        self.map.retain(|(o, _), _| *o != object);
    }
}

impl CurveStore for DuskaCurves {
    fn is_animated(&self, object: ObjectId, property: &str) -> bool {
        self.map.contains_key(&(object, property.to_string()))
    }

    fn curves(&self, object: ObjectId, property: &str) -> Vec<&DrivingCurve> {
        self.map
            .get(&(object, property.to_string()))
            .map(|c| c.iter().collect())
            .unwrap_or_default()
    }

    fn curves_mut(&mut self, object: ObjectId, property: &str) -> Vec<&mut DrivingCurve> {
        self.map
            .get_mut(&(object, property.to_string()))
            .map(|c| c.iter_mut().collect())
            .unwrap_or_default()
    }

    fn insert_keyframe(
        &mut self,
        object: ObjectId,
        property: &str,
        time: f64,
        value: f64,
        interpolation: Interpolation,
    ) {
        let curves = self.map.entry((object, property.to_string())).or_default();
        if curves.is_empty() {
            curves.push(DrivingCurve::default());
        }
        curves[0].insert(time, value, interpolation);
    }
}

/// Scene clock in frames, plus the installed frame-change handlers.
#[derive(Resource, Debug, Clone)]
pub struct DuskaTimeline {
    pub frame: f64,
    pub frames_per_second: f64,
    pub playing: bool,
    pub autokey: bool,
    pub(crate) last_evaluated: Option<f64>,
    hooks: Vec<HookId>,
    ids: IdAllocator,
}

impl Default for DuskaTimeline {
    fn default() -> Self {
        Self {
            frame: 0.0,
            frames_per_second: 24.0,
            playing: false,
            autokey: false,
            last_evaluated: None,
            hooks: Vec::new(),
            ids: IdAllocator::new(),
        }
    }
}

impl DuskaTimeline {
    /// Move the cursor forward by `seconds` of wall time while playing.
    pub fn advance(&mut self, seconds: f64) {
        if self.playing {
            self.frame += seconds * self.frames_per_second;
        }
    }

    /// Whether the cursor moved since the last evaluation.
    pub fn frame_changed(&self) -> bool {
        self.last_evaluated != Some(self.frame)
    }

    pub fn installed_hooks(&self) -> usize {
        self.hooks.len()
    }
}

impl FrameHooks for DuskaTimeline {
    fn append(&mut self, _name: &'static str) -> HookId {
        let id = self.ids.alloc_hook();
        self.hooks.push(id);
        id
    }

    fn remove(&mut self, hook: HookId) -> bool {
        let before = self.hooks.len();
        self.hooks.retain(|h| *h != hook);
        self.hooks.len() != before
    }

    fn is_installed(&self, hook: HookId) -> bool {
        self.hooks.contains(&hook)
    }
}
