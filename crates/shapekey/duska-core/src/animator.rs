//! Animator: per-object side table of key lists and the public editing / evaluation API.
//!
//! Editing methods:
//! - add_key, include_existing, remove_key, move_key, delete_all, rename, set_active_index
//!
//! Edits that select a key (add, move, set_active_index) show that key alone, even on an
//! animated list. Other structural edits re-resolve the object's pose. Curve remapping
//! always runs before the list itself changes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::accumulate::Accumulator;
use crate::commit::{commit, CommitReport};
use crate::config::{BasisRemovePolicy, Config};
use crate::data::{index_of, AnimatedKey};
use crate::error::{EditError, EditResult, HostError};
use crate::host::{FrameHooks, Host, TargetStore};
use crate::ids::{index_property, HookId, ListId, ObjectId};
use crate::outputs::{Change, CoreEvent, Outputs};
use crate::registry::KeyRegistry;
use crate::remap;
use crate::resolve::{resolve_registry, CurveState};
use crate::snapshot::{AnimatorSnapshot, ObjectSnapshot};
use crate::weights::WeightVector;

const FRAME_HOOK_NAME: &str = "duska.frame_change";

/// Direction of a single move step. `Up` goes towards index 0.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "upper",
            Direction::Down => "lower",
        }
    }
}

/// Result of a successful edit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Edit {
    pub active_index: Option<usize>,
    pub key_count: usize,
}

/// Whether an entry's target still exists on the host.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyStatus {
    Live,
    Missing,
}

/// One row of a list as shown to UI collaborators.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyEntry {
    pub index: usize,
    pub display_name: String,
    pub target_name: String,
    pub active: bool,
    pub status: KeyStatus,
}

/// Outcome of evaluating one object.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Evaluation {
    pub commit: CommitReport,
    /// Lists whose active index followed its curve during this evaluation.
    pub synced: Vec<(ListId, usize)>,
}

/// Key lists owned for one host object.
#[derive(Clone, Debug, Default)]
struct ObjectState {
    lists: Vec<KeyRegistry>,
}

impl ObjectState {
    fn tracked_targets(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for reg in &self.lists {
            for key in reg.keys() {
                if !out.contains(&key.target_name) {
                    out.push(key.target_name.clone());
                }
            }
        }
        out
    }

    fn tracked_outside(&self, list: ListId, target: &str) -> bool {
        self.lists
            .iter()
            .enumerate()
            .any(|(i, reg)| i != list.index() && reg.tracks(target))
    }
}

fn logged<T>(op: &'static str, object: ObjectId, result: EditResult<T>) -> EditResult<T> {
    if let Err(err) = &result {
        log::debug!("{op} on object {object} not applied: {err}");
    }
    result
}

/// Owner of the side table; drives edits and per-frame evaluation.
#[derive(Debug)]
pub struct Animator {
    cfg: Config,
    objects: IndexMap<ObjectId, ObjectState>,
    outputs: Outputs,
    hook: Option<HookId>,
}

impl Default for Animator {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Animator {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            objects: IndexMap::new(),
            outputs: Outputs::default(),
            hook: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Objects with side-table state, in first-edit order.
    pub fn objects(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects.keys().copied()
    }

    pub fn registry(&self, object: ObjectId, list: ListId) -> Option<&KeyRegistry> {
        self.objects
            .get(&object)
            .and_then(|s| s.lists.get(list.index()))
    }

    pub fn lists(&self, object: ObjectId) -> &[KeyRegistry] {
        self.objects
            .get(&object)
            .map(|s| s.lists.as_slice())
            .unwrap_or(&[])
    }

    /// Drop an object's state, e.g. when the host deletes the object.
    pub fn forget(&mut self, object: ObjectId) -> bool {
        self.objects.shift_remove(&object).is_some()
    }

    /// Outputs of the most recent frame.
    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    fn registry_mut(&mut self, object: ObjectId, list: ListId) -> &mut KeyRegistry {
        let state = self.objects.entry(object).or_default();
        if state.lists.len() <= list.index() {
            state.lists.resize_with(list.index() + 1, KeyRegistry::default);
        }
        &mut state.lists[list.index()]
    }

    fn check(&self, object: ObjectId, list: ListId, host: &dyn Host) -> EditResult<()> {
        if !host.is_keyable(object) {
            return Err(EditError::NotKeyable(object));
        }
        let available = self.cfg.list_count();
        if list.index() >= available {
            return Err(EditError::NoSuchList { list, available });
        }
        Ok(())
    }

    fn key_count(&self, object: ObjectId, list: ListId) -> usize {
        self.registry(object, list).map_or(0, KeyRegistry::len)
    }

    fn edit(&self, object: ObjectId, list: ListId) -> Edit {
        let reg = self.registry(object, list);
        Edit {
            active_index: reg.and_then(KeyRegistry::active),
            key_count: reg.map_or(0, KeyRegistry::len),
        }
    }

    /// Add a new key at the end of the list and make it active.
    ///
    /// An empty list first receives a basis entry: the object's existing reference target
    /// if it has one, otherwise a freshly created basis, in which case the requested key is
    /// created blank.
    pub fn add_key(
        &mut self,
        object: ObjectId,
        list: ListId,
        from_mix: bool,
        host: &mut dyn Host,
    ) -> EditResult<Edit> {
        let result = self.add_key_inner(object, list, from_mix, host);
        logged("add_key", object, result)
    }

    fn add_key_inner(
        &mut self,
        object: ObjectId,
        list: ListId,
        from_mix: bool,
        host: &mut dyn Host,
    ) -> EditResult<Edit> {
        self.check(object, list, host)?;

        let mut new_keys: Vec<AnimatedKey> = Vec::with_capacity(2);
        let mut created_basis: Option<String> = None;
        if self.key_count(object, list) == 0 {
            let basis = match host.targets(object).into_iter().next() {
                Some(reference) => reference,
                None => {
                    let name = host.add_target(object, &self.cfg.basis_name, from_mix)?;
                    created_basis = Some(name.clone());
                    name
                }
            };
            new_keys.push(AnimatedKey::new(basis));
        }

        let key_from_mix = from_mix && created_basis.is_none();
        match host.add_target(object, &self.cfg.key_name, key_from_mix) {
            Ok(name) => new_keys.push(AnimatedKey::new(name)),
            Err(err) => {
                if let Some(basis) = created_basis {
                    if let Err(undo) = host.remove_target(object, &basis) {
                        log::warn!(
                            "object {object}: rolling back basis '{basis}' failed: {undo}"
                        );
                    }
                }
                return Err(err.into());
            }
        }

        let registry = self.registry_mut(object, list);
        let mut index = 0;
        for key in new_keys {
            index = registry.push(key);
        }

        let property = index_property(list);
        if host.autokey_enabled() && host.curves(object, &property).iter().any(|c| !c.is_empty())
        {
            let frame = host.current_frame();
            host.insert_keyframe(
                object,
                &property,
                frame,
                index as f64,
                self.cfg.autokey_interpolation,
            );
        }

        self.show_selection(object, list, host);
        Ok(self.edit(object, list))
    }

    /// Track an existing target that this list does not track yet.
    pub fn include_existing(
        &mut self,
        object: ObjectId,
        list: ListId,
        target_name: &str,
        host: &mut dyn Host,
    ) -> EditResult<Edit> {
        let result = self.include_existing_inner(object, list, target_name, host);
        logged("include_existing", object, result)
    }

    fn include_existing_inner(
        &mut self,
        object: ObjectId,
        list: ListId,
        target_name: &str,
        host: &mut dyn Host,
    ) -> EditResult<Edit> {
        self.check(object, list, host)?;
        if !host.has_target(object, target_name) {
            return Err(HostError::MissingTarget(target_name.to_string()).into());
        }
        if self
            .registry(object, list)
            .is_some_and(|r| r.tracks(target_name))
        {
            return Err(EditError::AlreadyTracked(target_name.to_string()));
        }
        self.registry_mut(object, list)
            .push(AnimatedKey::new(target_name));
        self.apply_pose(object, host);
        Ok(self.edit(object, list))
    }

    /// Remove the entry at `index`, optionally deleting its target as well.
    ///
    /// A target still tracked by another list of the object is never deleted.
    pub fn remove_key(
        &mut self,
        object: ObjectId,
        list: ListId,
        index: usize,
        delete_target: bool,
        host: &mut dyn Host,
    ) -> EditResult<Edit> {
        let result = self.remove_key_inner(object, list, index, delete_target, host);
        logged("remove_key", object, result)
    }

    fn remove_key_inner(
        &mut self,
        object: ObjectId,
        list: ListId,
        index: usize,
        delete_target: bool,
        host: &mut dyn Host,
    ) -> EditResult<Edit> {
        self.check(object, list, host)?;
        let len = self.key_count(object, list);
        if index >= len {
            return Err(EditError::IndexOutOfRange { index, len });
        }
        let policy = self.cfg.remove_policy;
        if index == 0 && len > 1 && policy == BasisRemovePolicy::Locked {
            return Err(EditError::BasisLocked);
        }

        let property = index_property(list);
        let dropped = remap::remove_index_all(host.curves_mut(object, &property), index);
        log::trace!("remove_key: dropped {dropped} keyframes referencing {index}");

        let removed = match self.registry_mut(object, list).remove(index) {
            Some(key) => key,
            None => return Err(EditError::IndexOutOfRange { index, len }),
        };

        let keep_basis = index == 0 && policy == BasisRemovePolicy::KeepTarget;
        let shared = self
            .objects
            .get(&object)
            .is_some_and(|s| s.tracked_outside(list, &removed.target_name));
        if delete_target && !keep_basis && !shared {
            if let Err(err) = host.remove_target(object, &removed.target_name) {
                log::warn!(
                    "object {object}: deleting target '{}' failed: {err}",
                    removed.target_name
                );
            }
        }

        self.apply_pose(object, host);
        Ok(self.edit(object, list))
    }

    /// Move the entry at `index` one step and keep it active.
    pub fn move_key(
        &mut self,
        object: ObjectId,
        list: ListId,
        index: usize,
        direction: Direction,
        host: &mut dyn Host,
    ) -> EditResult<Edit> {
        let result = self.move_key_inner(object, list, index, direction, host);
        logged("move_key", object, result)
    }

    fn move_key_inner(
        &mut self,
        object: ObjectId,
        list: ListId,
        index: usize,
        direction: Direction,
        host: &mut dyn Host,
    ) -> EditResult<Edit> {
        self.check(object, list, host)?;
        let len = self.key_count(object, list);
        if index >= len {
            return Err(EditError::IndexOutOfRange { index, len });
        }
        let other = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => Some(index + 1).filter(|i| *i < len),
        }
        .ok_or(EditError::AtBoundary {
            index,
            direction: direction.as_str(),
        })?;

        let property = index_property(list);
        remap::swap_indices_all(host.curves_mut(object, &property), index, other);

        let registry = self.registry_mut(object, list);
        registry.swap(index, other);
        registry.set_active(Some(other));

        self.show_selection(object, list, host);
        Ok(self.edit(object, list))
    }

    /// Clear the list's keyframes and entries. With `delete_targets`, every target but
    /// the basis (position 0) is deleted too.
    pub fn delete_all(
        &mut self,
        object: ObjectId,
        list: ListId,
        delete_targets: bool,
        host: &mut dyn Host,
    ) -> EditResult<Edit> {
        let result = self.delete_all_inner(object, list, delete_targets, host);
        logged("delete_all", object, result)
    }

    fn delete_all_inner(
        &mut self,
        object: ObjectId,
        list: ListId,
        delete_targets: bool,
        host: &mut dyn Host,
    ) -> EditResult<Edit> {
        self.check(object, list, host)?;
        let property = index_property(list);
        remap::clear_all(host.curves_mut(object, &property));
        if self.registry(object, list).is_none() {
            return Ok(self.edit(object, list));
        }

        let registry = self.registry_mut(object, list);
        let removed = registry.keys().to_vec();
        registry.clear();

        if delete_targets {
            // position 0 is the basis and survives
            for key in removed.iter().skip(1) {
                let shared = self
                    .objects
                    .get(&object)
                    .is_some_and(|s| s.tracked_outside(list, &key.target_name));
                if shared {
                    continue;
                }
                if let Err(err) = host.remove_target(object, &key.target_name) {
                    log::warn!(
                        "object {object}: deleting target '{}' failed: {err}",
                        key.target_name
                    );
                }
            }
        }

        self.apply_pose(object, host);
        Ok(self.edit(object, list))
    }

    /// Rename the entry at `index` and its target in one step. The host may adjust the
    /// name; the adjusted name is what every list records.
    pub fn rename(
        &mut self,
        object: ObjectId,
        list: ListId,
        index: usize,
        new_name: &str,
        host: &mut dyn Host,
    ) -> EditResult<Edit> {
        let result = self.rename_inner(object, list, index, new_name, host);
        logged("rename", object, result)
    }

    fn rename_inner(
        &mut self,
        object: ObjectId,
        list: ListId,
        index: usize,
        new_name: &str,
        host: &mut dyn Host,
    ) -> EditResult<Edit> {
        if new_name.is_empty() {
            return Err(EditError::EmptyName);
        }
        self.check(object, list, host)?;
        let len = self.key_count(object, list);
        let old = match self.registry(object, list).and_then(|r| r.get(index)) {
            Some(key) => key.target_name.clone(),
            None => return Err(EditError::IndexOutOfRange { index, len }),
        };
        let assigned = host.rename_target(object, &old, new_name)?;
        if let Some(state) = self.objects.get_mut(&object) {
            for reg in state.lists.iter_mut() {
                reg.retarget(&old, &assigned);
            }
        }
        Ok(self.edit(object, list))
    }

    /// Select a key (or none) and show its pose immediately.
    pub fn set_active_index(
        &mut self,
        object: ObjectId,
        list: ListId,
        index: Option<usize>,
        host: &mut dyn Host,
    ) -> EditResult<Edit> {
        let result = self.set_active_index_inner(object, list, index, host);
        logged("set_active_index", object, result)
    }

    fn set_active_index_inner(
        &mut self,
        object: ObjectId,
        list: ListId,
        index: Option<usize>,
        host: &mut dyn Host,
    ) -> EditResult<Edit> {
        self.check(object, list, host)?;
        let len = self.key_count(object, list);
        if let Some(i) = index {
            if i >= len {
                return Err(EditError::IndexOutOfRange { index: i, len });
            }
        }
        if index.is_none() && self.registry(object, list).is_none() {
            return Ok(self.edit(object, list));
        }
        self.registry_mut(object, list).set_active(index);
        self.show_selection(object, list, host);
        Ok(self.edit(object, list))
    }

    /// List rows for UI, flagging entries whose target is gone.
    pub fn entries(&self, object: ObjectId, list: ListId, store: &dyn TargetStore) -> Vec<KeyEntry> {
        let reg = match self.registry(object, list) {
            Some(reg) => reg,
            None => return Vec::new(),
        };
        reg.keys()
            .iter()
            .enumerate()
            .map(|(index, key)| KeyEntry {
                index,
                display_name: key.display_name.clone(),
                target_name: key.target_name.clone(),
                active: reg.active() == Some(index),
                status: if store.has_target(object, &key.target_name) {
                    KeyStatus::Live
                } else {
                    KeyStatus::Missing
                },
            })
            .collect()
    }

    /// Commit the steady pose of `list`: its active key at full weight and every other
    /// tracked target at 0. Nothing is written while no key is active.
    fn show_selection(&self, object: ObjectId, list: ListId, host: &mut dyn Host) {
        if !host.is_keyable(object) {
            return;
        }
        let state = match self.objects.get(&object) {
            Some(state) => state,
            None => return,
        };
        let key = match state.lists.get(list.index()).and_then(KeyRegistry::active_key) {
            Some(key) => key,
            None => return,
        };
        let pose = WeightVector::single(key.target_name.clone());
        let tracked = state.tracked_targets();
        let report = commit(object, tracked.iter().map(String::as_str), &pose, host);
        log::trace!(
            "object {object}: showing '{}', {} weights written",
            key.target_name,
            report.written.len()
        );
    }

    fn apply_pose(&mut self, object: ObjectId, host: &mut dyn Host) {
        if let Some(eval) = self.resolve_and_commit(object, host, false) {
            log::trace!(
                "object {object}: committed {} weights",
                eval.commit.written.len()
            );
        }
    }

    /// Resolve and commit the pose of one object at the host's current frame. Animated
    /// lists first take the index their curve holds at that frame.
    ///
    /// Returns None when the object is unknown, not keyable, or no list yields a pose.
    pub fn evaluate(&mut self, object: ObjectId, host: &mut dyn Host) -> Option<Evaluation> {
        self.resolve_and_commit(object, host, true)
    }

    fn resolve_and_commit(
        &mut self,
        object: ObjectId,
        host: &mut dyn Host,
        follow_curves: bool,
    ) -> Option<Evaluation> {
        if !host.is_keyable(object) {
            return None;
        }
        let state = self.objects.get_mut(&object)?;
        let time = host.current_frame();
        let mut synced = Vec::new();
        let mut acc = Accumulator::new();

        for (i, reg) in state.lists.iter_mut().enumerate() {
            let list = ListId(i as u8);
            let property = index_property(list);
            let animated = host.is_animated(object, &property);
            let curves = if animated {
                host.curves(object, &property)
            } else {
                Vec::new()
            };
            let curve = curves.first().copied();

            let followed = curve
                .filter(|_| follow_curves)
                .and_then(|c| c.sample(time))
                .and_then(index_of);
            if let Some(index) = followed {
                if index < reg.len() && reg.active() != Some(index) {
                    reg.set_active(Some(index));
                    synced.push((list, index));
                }
            }

            let curve_state = if animated {
                CurveState::Animated(curve)
            } else {
                CurveState::Static
            };
            if let Some(pose) = resolve_registry(reg, curve_state, time) {
                acc.add(&pose);
            }
        }

        if acc.is_empty() {
            return None;
        }
        let pose = acc.finalize();
        let tracked = state.tracked_targets();
        let report = commit(object, tracked.iter().map(String::as_str), &pose, host);
        Some(Evaluation {
            commit: report,
            synced,
        })
    }

    /// Frame-change handler: evaluate every object in the side table in turn.
    pub fn frame_changed(&mut self, host: &mut dyn Host) -> &Outputs {
        let mut outputs = std::mem::take(&mut self.outputs);
        outputs.clear();

        let ids: Vec<ObjectId> = self.objects.keys().copied().collect();
        for object in ids {
            let eval = match self.evaluate(object, host) {
                Some(eval) => eval,
                None => continue,
            };
            for (list, index) in eval.synced {
                outputs.push_event(CoreEvent::ActiveIndexSynced {
                    object,
                    list,
                    index,
                });
            }
            for target in eval.commit.missing {
                outputs.push_event(CoreEvent::MissingTarget { object, target });
            }
            for (target, err) in eval.commit.failed {
                outputs.push_event(CoreEvent::HostWriteFailed {
                    object,
                    target,
                    message: err.to_string(),
                });
            }
            outputs.push_event(CoreEvent::PoseCommitted {
                object,
                targets: eval.commit.written.len(),
            });
            for (target, weight) in eval.commit.written {
                outputs.push_change(Change {
                    object,
                    target,
                    weight,
                });
            }
        }

        self.outputs = outputs;
        &self.outputs
    }

    /// Install the frame-change handler once. Repeated calls return the same hook.
    pub fn register(&mut self, hooks: &mut dyn FrameHooks) -> HookId {
        if let Some(hook) = self.hook {
            if hooks.is_installed(hook) {
                return hook;
            }
        }
        let hook = hooks.append(FRAME_HOOK_NAME);
        self.hook = Some(hook);
        hook
    }

    /// Remove the frame-change handler. Returns whether one was installed.
    pub fn unregister(&mut self, hooks: &mut dyn FrameHooks) -> bool {
        match self.hook.take() {
            Some(hook) => hooks.remove(hook),
            None => false,
        }
    }

    pub fn snapshot(&self) -> AnimatorSnapshot {
        AnimatorSnapshot {
            objects: self
                .objects
                .iter()
                .map(|(id, state)| ObjectSnapshot {
                    id: *id,
                    lists: state.lists.clone(),
                })
                .collect(),
        }
    }

    /// Rebuild an animator from a snapshot. Lists beyond the configured count are
    /// dropped.
    pub fn from_snapshot(cfg: Config, snapshot: AnimatorSnapshot) -> Self {
        let mut animator = Self::new(cfg);
        let list_count = animator.cfg.list_count();
        for obj in snapshot.objects {
            let lists = obj.lists.into_iter().take(list_count).collect();
            animator.objects.insert(obj.id, ObjectState { lists });
        }
        animator
    }
}
