//! Error types for editing operations and host collaborators.

use thiserror::Error;

use crate::ids::{ListId, ObjectId};

/// Failure reported by a host collaborator (target store, curve store).
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum HostError {
    #[error("unknown object {0}")]
    UnknownObject(ObjectId),

    #[error("no deformation target named '{0}'")]
    MissingTarget(String),

    #[error("unsupported by host: {0}")]
    Unsupported(String),
}

/// Why an editing operation did not apply. The registry and its curves are left
/// untouched whenever one of these is returned.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum EditError {
    #[error("object {0} cannot carry shape keys")]
    NotKeyable(ObjectId),

    #[error("{list} is not available (object has {available} lists)")]
    NoSuchList { list: ListId, available: usize },

    #[error("key index {index} out of range for {len} keys")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("key {index} is already at the {direction} boundary")]
    AtBoundary { index: usize, direction: &'static str },

    #[error("target '{0}' is already tracked by this list")]
    AlreadyTracked(String),

    #[error("name must not be empty")]
    EmptyName,

    #[error("the basis key cannot be removed while other keys remain")]
    BasisLocked,

    #[error(transparent)]
    Host(#[from] HostError),
}

pub type EditResult<T> = std::result::Result<T, EditError>;
pub type HostResult<T> = std::result::Result<T, HostError>;
