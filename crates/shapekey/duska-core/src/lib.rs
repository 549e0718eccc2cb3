//! Duska shape-key animation core (engine-agnostic)
//!
//! Objects carry ordered lists of keys, each pointing at a deformation target by name.
//! A list's active index may be animated; at every frame the index curve is resolved
//! into blend weights (hard steps or linear in-betweens between neighbouring keys),
//! averaged across parallel lists and committed to the host's targets. Structural edits
//! of a list remap the index curve so recorded keyframes keep pointing at the same keys.
//!
//! The host (an editor, a game engine, the in-memory scene) is reached only through the
//! traits in [`host`].

pub mod accumulate;
pub mod animator;
pub mod commit;
pub mod config;
pub mod data;
pub mod error;
pub mod host;
pub mod ids;
pub mod outputs;
pub mod registry;
pub mod remap;
pub mod resolve;
pub mod sampling;
pub mod snapshot;
pub mod weights;

// Re-exports for consumers (adapters)
pub use accumulate::Accumulator;
pub use animator::{Animator, Direction, Edit, Evaluation, KeyEntry, KeyStatus};
pub use commit::{commit, CommitReport};
pub use config::{BasisRemovePolicy, Config, Features, MAX_LISTS};
pub use data::{index_of, AnimatedKey, DrivingCurve, Interpolation, Keyframe};
pub use error::{EditError, EditResult, HostError, HostResult};
pub use host::{CurveStore, FrameHooks, Host, MemoryHost, SceneClock, TargetStore};
pub use ids::{index_property, HookId, IdAllocator, ListId, ObjectId};
pub use outputs::{Change, CoreEvent, Outputs};
pub use registry::KeyRegistry;
pub use resolve::{resolve_registry, CurveState};
pub use sampling::{locate, sample_curve, Segment};
pub use snapshot::{parse_snapshot_json, AnimatorSnapshot, ObjectSnapshot};
pub use weights::WeightVector;
