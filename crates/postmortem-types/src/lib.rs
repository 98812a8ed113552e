//! Shared types and error hierarchy for postmortem.

pub mod context;
pub mod error;
pub mod id;

pub use context::{
    ContextInspector, ErrorSnapshot, EvalFailure, ExecutionContext, RaisedError, SourceLocation,
};
pub use error::{InvalidSwitch, SessionError, StorageError};
pub use id::{GroupKey, SessionId};
