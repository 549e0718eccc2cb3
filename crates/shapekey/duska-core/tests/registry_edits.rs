use duska_core::{
    config::{BasisRemovePolicy, Config, Features},
    data::{DrivingCurve, Interpolation, Keyframe},
    host::{CurveStore, MemoryHost, SceneClock, TargetStore},
    ids::{index_property, ListId, ObjectId},
    Animator, Edit, EditError, HostError, HostResult,
};

const OBJ: ObjectId = ObjectId(1);
const LIST: ListId = ListId::PRIMARY;

fn empty_scene() -> MemoryHost {
    let mut host = MemoryHost::new();
    host.add_object(OBJ);
    host
}

fn names(animator: &Animator, list: ListId) -> Vec<String> {
    animator
        .registry(OBJ, list)
        .map(|r| r.keys().iter().map(|k| k.display_name.clone()).collect())
        .unwrap_or_default()
}

/// Memory host that creates at most `adds_left` targets and optionally refuses deletions.
struct LimitedHost {
    inner: MemoryHost,
    adds_left: usize,
    refuse_removals: bool,
}

impl TargetStore for LimitedHost {
    fn is_keyable(&self, object: ObjectId) -> bool {
        self.inner.is_keyable(object)
    }

    fn targets(&self, object: ObjectId) -> Vec<String> {
        self.inner.targets(object)
    }

    fn add_target(&mut self, object: ObjectId, name: &str, from_mix: bool) -> HostResult<String> {
        if self.adds_left == 0 {
            return Err(HostError::Unsupported("target limit reached".into()));
        }
        self.adds_left -= 1;
        self.inner.add_target(object, name, from_mix)
    }

    fn remove_target(&mut self, object: ObjectId, name: &str) -> HostResult<()> {
        if self.refuse_removals {
            return Err(HostError::Unsupported("targets are locked".into()));
        }
        self.inner.remove_target(object, name)
    }

    fn rename_target(
        &mut self,
        object: ObjectId,
        name: &str,
        new_name: &str,
    ) -> HostResult<String> {
        self.inner.rename_target(object, name, new_name)
    }

    fn set_influence(&mut self, object: ObjectId, name: &str, weight: f32) -> HostResult<()> {
        self.inner.set_influence(object, name, weight)
    }

    fn influence(&self, object: ObjectId, name: &str) -> Option<f32> {
        self.inner.influence(object, name)
    }
}

impl CurveStore for LimitedHost {
    fn is_animated(&self, object: ObjectId, property: &str) -> bool {
        self.inner.is_animated(object, property)
    }

    fn curves(&self, object: ObjectId, property: &str) -> Vec<&DrivingCurve> {
        self.inner.curves(object, property)
    }

    fn curves_mut(&mut self, object: ObjectId, property: &str) -> Vec<&mut DrivingCurve> {
        self.inner.curves_mut(object, property)
    }

    fn insert_keyframe(
        &mut self,
        object: ObjectId,
        property: &str,
        time: f64,
        value: f64,
        interpolation: Interpolation,
    ) {
        self.inner
            .insert_keyframe(object, property, time, value, interpolation)
    }
}

impl SceneClock for LimitedHost {
    fn current_frame(&self) -> f64 {
        self.inner.current_frame()
    }
}

fn multi_list() -> Config {
    Config {
        features: Features { multi_list: true },
        ..Config::default()
    }
}

#[test]
fn first_add_creates_basis_and_blank_key() {
    let mut host = empty_scene();
    let mut animator = Animator::default();

    let edit = animator.add_key(OBJ, LIST, true, &mut host).unwrap();
    assert_eq!(
        edit,
        Edit {
            active_index: Some(1),
            key_count: 2
        }
    );
    assert_eq!(host.targets(OBJ), ["Basis", "SKA.Key"]);
    assert_eq!(names(&animator, LIST), ["Basis", "SKA.Key"]);
    let obj = host.object(OBJ).unwrap();
    assert!(obj.targets[0].from_mix);
    assert!(!obj.targets[1].from_mix);

    let edit = animator.add_key(OBJ, LIST, false, &mut host).unwrap();
    assert_eq!(edit.active_index, Some(2));
    assert_eq!(names(&animator, LIST), ["Basis", "SKA.Key", "SKA.Key.001"]);
    assert_eq!(host.influence(OBJ, "SKA.Key.001"), Some(1.0));
    assert_eq!(host.influence(OBJ, "SKA.Key"), Some(0.0));
    assert_eq!(host.influence(OBJ, "Basis"), Some(0.0));
}

#[test]
fn failed_first_add_rolls_back_created_basis() {
    let mut host = LimitedHost {
        inner: empty_scene(),
        adds_left: 1,
        refuse_removals: false,
    };
    let mut animator = Animator::default();
    let err = animator.add_key(OBJ, LIST, false, &mut host).unwrap_err();
    assert!(matches!(err, EditError::Host(HostError::Unsupported(_))));
    assert!(host.targets(OBJ).is_empty());
    assert_eq!(animator.objects().count(), 0);
}

#[test]
fn refused_rollback_still_reports_the_add_failure() {
    let mut host = LimitedHost {
        inner: empty_scene(),
        adds_left: 1,
        refuse_removals: true,
    };
    let mut animator = Animator::default();
    let err = animator.add_key(OBJ, LIST, false, &mut host).unwrap_err();
    assert!(matches!(err, EditError::Host(HostError::Unsupported(_))));
    // the basis could not be deleted and stays, but no list was built around it
    assert_eq!(host.targets(OBJ), ["Basis"]);
    assert!(animator.registry(OBJ, LIST).is_none());
}

#[test]
fn first_add_wraps_existing_reference_target() {
    let mut host = empty_scene();
    host.add_target(OBJ, "Rest", false).unwrap();
    host.add_target(OBJ, "Smile", false).unwrap();
    let mut animator = Animator::default();

    animator.add_key(OBJ, LIST, true, &mut host).unwrap();
    assert_eq!(names(&animator, LIST), ["Rest", "SKA.Key"]);
    assert_eq!(host.targets(OBJ), ["Rest", "Smile", "SKA.Key"]);
    assert!(host.object(OBJ).unwrap().targets[2].from_mix);
}

#[test]
fn add_then_remove_round_trips() {
    let mut host = empty_scene();
    let mut animator = Animator::default();
    animator.add_key(OBJ, LIST, false, &mut host).unwrap();
    let keys_before = names(&animator, LIST);
    let targets_before = host.targets(OBJ);

    let added = animator.add_key(OBJ, LIST, false, &mut host).unwrap();
    let index = added.active_index.unwrap();
    let edit = animator.remove_key(OBJ, LIST, index, true, &mut host).unwrap();

    assert_eq!(names(&animator, LIST), keys_before);
    assert_eq!(host.targets(OBJ), targets_before);
    // removing the active entry selects the one before it
    assert_eq!(edit.active_index, Some(index - 1));
}

#[test]
fn include_existing_tracks_once() {
    let mut host = empty_scene();
    host.add_target(OBJ, "Smile", false).unwrap();
    let mut animator = Animator::default();

    let edit = animator
        .include_existing(OBJ, LIST, "Smile", &mut host)
        .unwrap();
    assert_eq!(edit.key_count, 1);
    assert_eq!(
        animator.include_existing(OBJ, LIST, "Smile", &mut host),
        Err(EditError::AlreadyTracked("Smile".into()))
    );
    assert_eq!(
        animator.include_existing(OBJ, LIST, "Frown", &mut host),
        Err(EditError::Host(HostError::MissingTarget("Frown".into())))
    );
    assert_eq!(names(&animator, LIST), ["Smile"]);
}

#[test]
fn out_of_range_requests_are_refused() {
    let mut host = empty_scene();
    let mut animator = Animator::default();
    assert_eq!(
        animator.remove_key(OBJ, LIST, 0, false, &mut host),
        Err(EditError::IndexOutOfRange { index: 0, len: 0 })
    );
    animator.add_key(OBJ, LIST, false, &mut host).unwrap();
    assert_eq!(
        animator.remove_key(OBJ, LIST, 5, false, &mut host),
        Err(EditError::IndexOutOfRange { index: 5, len: 2 })
    );
    assert_eq!(
        animator.set_active_index(OBJ, LIST, Some(9), &mut host),
        Err(EditError::IndexOutOfRange { index: 9, len: 2 })
    );
    assert_eq!(animator.registry(OBJ, LIST).unwrap().active(), Some(1));
}

#[test]
fn non_keyable_objects_refuse_every_edit() {
    let mut host = MemoryHost::new();
    host.add_object(OBJ).keyable = false;
    let mut animator = Animator::default();

    assert_eq!(
        animator.add_key(OBJ, LIST, false, &mut host),
        Err(EditError::NotKeyable(OBJ))
    );
    assert_eq!(
        animator.add_key(ObjectId(42), LIST, false, &mut host),
        Err(EditError::NotKeyable(ObjectId(42)))
    );
    assert!(host.targets(OBJ).is_empty());
    assert_eq!(animator.objects().count(), 0);
}

#[test]
fn edits_on_unknown_lists_leave_side_table_alone() {
    let mut host = empty_scene();
    let mut animator = Animator::default();

    let edit = animator.delete_all(OBJ, LIST, true, &mut host).unwrap();
    assert_eq!(edit.key_count, 0);
    let edit = animator.set_active_index(OBJ, LIST, None, &mut host).unwrap();
    assert_eq!(edit.active_index, None);
    assert_eq!(animator.objects().count(), 0);
}

#[test]
fn adding_on_animated_list_shows_new_key() {
    let mut host = empty_scene();
    let mut animator = Animator::default();
    animator.add_key(OBJ, LIST, false, &mut host).unwrap();
    host.set_curve(
        OBJ,
        &index_property(LIST),
        DrivingCurve::new(vec![
            Keyframe::new(0.0, 0.0, Interpolation::Interpolated),
            Keyframe::new(10.0, 1.0, Interpolation::Interpolated),
        ]),
    );
    host.frame = 5.0;

    animator.add_key(OBJ, LIST, false, &mut host).unwrap();
    assert_eq!(host.influence(OBJ, "SKA.Key.001"), Some(1.0));
    assert_eq!(host.influence(OBJ, "SKA.Key"), Some(0.0));
    assert_eq!(host.influence(OBJ, "Basis"), Some(0.0));
}

#[test]
fn extra_lists_need_the_multi_list_feature() {
    let mut host = empty_scene();
    let mut animator = Animator::default();
    assert_eq!(
        animator.add_key(OBJ, ListId(1), false, &mut host),
        Err(EditError::NoSuchList {
            list: ListId(1),
            available: 1
        })
    );

    let mut animator = Animator::new(multi_list());
    animator.add_key(OBJ, ListId(4), false, &mut host).unwrap();
    assert_eq!(names(&animator, ListId(4)), ["Basis", "SKA.Key"]);
    assert!(animator.add_key(OBJ, ListId(5), false, &mut host).is_err());
}

#[test]
fn rename_updates_target_and_entry_together() {
    let mut host = empty_scene();
    let mut animator = Animator::default();
    animator.add_key(OBJ, LIST, false, &mut host).unwrap();

    animator.rename(OBJ, LIST, 1, "Smile", &mut host).unwrap();
    let key = animator.registry(OBJ, LIST).unwrap().get(1).unwrap().clone();
    assert_eq!(key.display_name, "Smile");
    assert_eq!(key.target_name, "Smile");
    assert!(host.has_target(OBJ, "Smile"));
    assert!(!host.has_target(OBJ, "SKA.Key"));

    // the host's adjusted name is what gets recorded
    animator.rename(OBJ, LIST, 1, "Basis", &mut host).unwrap();
    assert_eq!(names(&animator, LIST), ["Basis", "Basis.001"]);

    assert_eq!(
        animator.rename(OBJ, LIST, 1, "", &mut host),
        Err(EditError::EmptyName)
    );
    assert_eq!(names(&animator, LIST), ["Basis", "Basis.001"]);
}

#[test]
fn rename_reaches_every_list_of_the_object() {
    let mut host = empty_scene();
    let mut animator = Animator::new(multi_list());
    animator.add_key(OBJ, ListId(0), false, &mut host).unwrap();
    animator
        .include_existing(OBJ, ListId(1), "SKA.Key", &mut host)
        .unwrap();

    animator.rename(OBJ, ListId(0), 1, "Blink", &mut host).unwrap();
    assert_eq!(names(&animator, ListId(1)), ["Blink"]);
}

#[test]
fn basis_removal_follows_policy() {
    let setup = |policy| {
        let mut host = empty_scene();
        let mut animator = Animator::new(Config {
            remove_policy: policy,
            ..Config::default()
        });
        animator.add_key(OBJ, LIST, false, &mut host).unwrap();
        (host, animator)
    };

    let (mut host, mut animator) = setup(BasisRemovePolicy::KeepTarget);
    animator.remove_key(OBJ, LIST, 0, true, &mut host).unwrap();
    assert_eq!(names(&animator, LIST), ["SKA.Key"]);
    assert!(host.has_target(OBJ, "Basis"));

    let (mut host, mut animator) = setup(BasisRemovePolicy::DeleteTarget);
    animator.remove_key(OBJ, LIST, 0, true, &mut host).unwrap();
    assert!(!host.has_target(OBJ, "Basis"));

    let (mut host, mut animator) = setup(BasisRemovePolicy::Locked);
    assert_eq!(
        animator.remove_key(OBJ, LIST, 0, true, &mut host),
        Err(EditError::BasisLocked)
    );
    animator.remove_key(OBJ, LIST, 1, true, &mut host).unwrap();
    // a lone basis can go
    animator.remove_key(OBJ, LIST, 0, false, &mut host).unwrap();
    assert!(names(&animator, LIST).is_empty());
}

#[test]
fn shared_targets_survive_removal_from_one_list() {
    let mut host = empty_scene();
    let mut animator = Animator::new(multi_list());
    animator.add_key(OBJ, ListId(0), false, &mut host).unwrap();
    for target in ["Basis", "SKA.Key"] {
        animator
            .include_existing(OBJ, ListId(1), target, &mut host)
            .unwrap();
    }

    animator.remove_key(OBJ, ListId(0), 1, true, &mut host).unwrap();
    assert!(host.has_target(OBJ, "SKA.Key"));
    animator.remove_key(OBJ, ListId(1), 1, true, &mut host).unwrap();
    assert!(!host.has_target(OBJ, "SKA.Key"));
}

#[test]
fn autokey_records_new_index_only_on_existing_curve() {
    let mut host = empty_scene();
    host.autokey = true;
    let mut animator = Animator::default();
    let property = index_property(LIST);

    animator.add_key(OBJ, LIST, false, &mut host).unwrap();
    assert!(!host.is_animated(OBJ, &property));

    host.set_curve(
        OBJ,
        &property,
        DrivingCurve::new(vec![Keyframe::new(0.0, 1.0, Interpolation::Constant)]),
    );
    host.frame = 12.0;
    animator.add_key(OBJ, LIST, false, &mut host).unwrap();

    let curve = host.curves(OBJ, &property)[0];
    let recorded: Vec<(f64, f64, Interpolation)> = curve
        .iter()
        .map(|k| (k.time, k.value, k.interpolation))
        .collect();
    assert_eq!(
        recorded,
        vec![
            (0.0, 1.0, Interpolation::Constant),
            (12.0, 2.0, Interpolation::Interpolated)
        ]
    );
}

#[test]
fn autokey_off_leaves_curves_alone() {
    let mut host = empty_scene();
    let mut animator = Animator::default();
    let property = index_property(LIST);
    host.set_curve(
        OBJ,
        &property,
        DrivingCurve::new(vec![Keyframe::new(0.0, 0.0, Interpolation::Interpolated)]),
    );
    animator.add_key(OBJ, LIST, false, &mut host).unwrap();
    animator.add_key(OBJ, LIST, false, &mut host).unwrap();
    assert_eq!(host.curves(OBJ, &property)[0].len(), 1);
}

#[test]
fn entries_flag_missing_targets() {
    let mut host = empty_scene();
    let mut animator = Animator::default();
    animator.add_key(OBJ, LIST, false, &mut host).unwrap();
    host.remove_target(OBJ, "SKA.Key").unwrap();

    let entries = animator.entries(OBJ, LIST, &host);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].status, duska_core::KeyStatus::Live);
    assert_eq!(entries[1].status, duska_core::KeyStatus::Missing);
    assert!(entries[1].active);
    assert!(!entries[0].active);
}

#[test]
fn snapshot_restores_side_table() {
    let mut host = empty_scene();
    let mut animator = Animator::default();
    animator.add_key(OBJ, LIST, false, &mut host).unwrap();
    animator.add_key(OBJ, LIST, false, &mut host).unwrap();
    animator
        .set_active_index(OBJ, LIST, Some(1), &mut host)
        .unwrap();

    let json = animator.snapshot().to_json().unwrap();
    let snap = duska_core::parse_snapshot_json(&json).unwrap();
    let mut restored = Animator::from_snapshot(Config::default(), snap);
    assert_eq!(restored.lists(OBJ), animator.lists(OBJ));
    assert_eq!(restored.registry(OBJ, LIST).unwrap().active(), Some(1));

    assert!(restored.forget(OBJ));
    assert!(restored.lists(OBJ).is_empty());
    assert!(!restored.forget(OBJ));
}
