//! Error hierarchy for postmortem.

use crate::id::{GroupKey, SessionId};
use thiserror::Error;

/// Errors surfaced by session operations.
///
/// Evaluation failures are deliberately absent: user-code errors are rendered
/// as formatted text on the same channel as results and never become a Rust
/// error at the session surface.
#[derive(Debug, Error)]
pub enum SessionError {
    /// `switch_to` named a group or context position that does not exist.
    #[error("invalid switch: {0}")]
    InvalidSwitch(#[from] InvalidSwitch),

    /// The session was rebuilt from stored metadata and has no live
    /// execution context to act on.
    #[error("session {id} has no live execution context")]
    StaleSession { id: SessionId },

    /// A session needs at least one context group with at least one context.
    #[error("cannot create a session without any execution context")]
    NoContexts,
}

/// Why a context switch was rejected.
#[derive(Debug, Error)]
pub enum InvalidSwitch {
    #[error("no context group with identity {key}")]
    UnknownGroup { key: GroupKey },

    #[error("context index {index} out of range for group {key} (has {len})")]
    IndexOutOfRange {
        key: GroupKey,
        index: usize,
        len: usize,
    },
}

/// Errors from the distributed cache tier.
///
/// These never propagate past the session store: the local tier stays
/// authoritative, so cache failures are logged and treated as absence.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
