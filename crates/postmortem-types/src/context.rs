//! Execution contexts and the host-side traits the console consumes.

use crate::id::GroupKey;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Source position an execution context was captured at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub path: String,
    pub line: u32,
}

/// A failure raised by user-supplied code during evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalFailure {
    /// Name of the raised error's type, e.g. `ZeroDivisionError`.
    pub type_name: String,
    pub message: String,
    /// Backtrace frames, innermost first, as the host renders them.
    pub backtrace: Vec<String>,
}

impl EvalFailure {
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
            backtrace: Vec::new(),
        }
    }

    pub fn with_backtrace(mut self, backtrace: Vec<String>) -> Self {
        self.backtrace = backtrace;
        self
    }
}

/// A live frame of program state that expressions can be evaluated against.
///
/// Contexts are process-bound: they hold references into the runtime that
/// captured them and cannot be serialized or handed to another process.
/// Dyn-compatible so sessions work with `Arc<dyn ExecutionContext>`.
pub trait ExecutionContext: Send + Sync {
    /// Where this context was captured, if known. Synthetic contexts may
    /// have no location.
    fn source_location(&self) -> Option<SourceLocation> {
        None
    }

    /// Evaluate `expr` within this context and return the inspected
    /// rendering of the resulting value.
    ///
    /// All user-code failures come back through the error channel; only
    /// process-fatal faults (OOM, abort) may escape.
    fn eval(&self, expr: &str) -> Result<String, EvalFailure>;

    /// Frames of the host call stack at the point this context was captured.
    ///
    /// Evaluation backtraces have these subtracted so the console shows only
    /// frames from the evaluated code itself. Hosts that cannot provide them
    /// may return an empty list.
    fn caller_frames(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Serializable capture of a raised error's identity and metadata.
///
/// This is the part of an error that survives a process boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSnapshot {
    pub type_name: String,
    pub message: String,
    /// Backtrace frames, innermost first.
    #[serde(default)]
    pub backtrace: Vec<String>,
    /// Auxiliary payload the error carries, if any.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
}

impl ErrorSnapshot {
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
            backtrace: Vec::new(),
            details: serde_json::Value::Null,
        }
    }

    pub fn with_backtrace(mut self, backtrace: Vec<String>) -> Self {
        self.backtrace = backtrace;
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}

/// An error raised by the host application, with its cause chain intact.
///
/// Consumed by the exception chain mapper to turn one raised error into an
/// ordered list of context groups.
pub trait RaisedError: Send + Sync {
    /// Serializable metadata for this error.
    fn snapshot(&self) -> ErrorSnapshot;

    /// Stable identity of this error within its cause chain.
    fn identity(&self) -> GroupKey;

    /// The error this one was caused by, if any.
    fn cause(&self) -> Option<&dyn RaisedError> {
        None
    }

    /// Execution contexts captured when this error was raised, ordered
    /// innermost first.
    fn contexts(&self) -> Vec<Arc<dyn ExecutionContext>> {
        Vec::new()
    }
}

/// Inspects a context's local state along an object-navigation path.
///
/// External collaborator; sessions merely forward their current context.
pub trait ContextInspector: Send + Sync {
    fn extract(&self, context: &dyn ExecutionContext, path: &str) -> serde_json::Value;
}
