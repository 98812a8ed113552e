//! Host fakes shared by the crate's unit tests.

use crate::mapper::{ContextGroup, ExceptionChainMapper};
use postmortem_types::{
    ErrorSnapshot, EvalFailure, ExecutionContext, GroupKey, RaisedError, SourceLocation,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Execution context speaking a tiny expression language: integer literals,
/// `a + b`, `a / b`, variable references, and `name = expr` assignment.
pub struct FakeContext {
    vars: Mutex<HashMap<String, String>>,
    trace: Vec<String>,
    caller: Vec<String>,
    location: Option<SourceLocation>,
}

impl FakeContext {
    pub fn new() -> Self {
        Self {
            vars: Mutex::new(HashMap::new()),
            trace: Vec::new(),
            caller: Vec::new(),
            location: None,
        }
    }

    pub fn with_var(self, name: &str, value: &str) -> Self {
        self.vars
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
        self
    }

    /// Frames attached to any failure this context raises.
    pub fn with_trace(mut self, trace: Vec<String>) -> Self {
        self.trace = trace;
        self
    }

    /// Frames reported as the surrounding host stack.
    pub fn with_caller(mut self, caller: Vec<String>) -> Self {
        self.caller = caller;
        self
    }

    pub fn with_location(mut self, path: &str, line: u32) -> Self {
        self.location = Some(SourceLocation {
            path: path.to_string(),
            line,
        });
        self
    }

    fn failure(&self, type_name: &str, message: String) -> EvalFailure {
        EvalFailure::new(type_name, message).with_backtrace(self.trace.clone())
    }

    fn eval_expr(&self, expr: &str) -> Result<String, EvalFailure> {
        let expr = expr.trim();
        if let Ok(n) = expr.parse::<i64>() {
            return Ok(n.to_string());
        }
        if let Some((lhs, rhs)) = expr.split_once('+') {
            return Ok((self.int(lhs)? + self.int(rhs)?).to_string());
        }
        if let Some((lhs, rhs)) = expr.split_once('/') {
            let divisor = self.int(rhs)?;
            if divisor == 0 {
                return Err(self.failure("ZeroDivisionError", "divided by 0".to_string()));
            }
            return Ok((self.int(lhs)? / divisor).to_string());
        }
        if let Some(value) = self.vars.lock().unwrap().get(expr) {
            return Ok(value.clone());
        }
        Err(self.failure("NameError", format!("undefined variable {expr}")))
    }

    fn int(&self, expr: &str) -> Result<i64, EvalFailure> {
        let value = self.eval_expr(expr)?;
        value
            .parse::<i64>()
            .map_err(|_| self.failure("TypeError", format!("{value} is not an integer")))
    }
}

impl ExecutionContext for FakeContext {
    fn source_location(&self) -> Option<SourceLocation> {
        self.location.clone()
    }

    fn eval(&self, expr: &str) -> Result<String, EvalFailure> {
        let expr = expr.trim();
        if let Some((name, rhs)) = expr.split_once('=') {
            let name = name.trim();
            if !name.is_empty()
                && name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_')
            {
                let value = self.eval_expr(rhs)?;
                self.vars
                    .lock()
                    .unwrap()
                    .insert(name.to_string(), value.clone());
                return Ok(value);
            }
        }
        self.eval_expr(expr)
    }

    fn caller_frames(&self) -> Vec<String> {
        self.caller.clone()
    }
}

/// Raised error with an optional cause, for exercising chain mapping.
pub struct FakeError {
    key: GroupKey,
    snapshot: ErrorSnapshot,
    contexts: Vec<Arc<dyn ExecutionContext>>,
    cause: Option<Box<FakeError>>,
}

impl FakeError {
    pub fn new(key: &str, message: &str, contexts: Vec<Arc<dyn ExecutionContext>>) -> Self {
        Self {
            key: GroupKey::from(key),
            snapshot: ErrorSnapshot::new("RuntimeError", message),
            contexts,
            cause: None,
        }
    }

    pub fn caused_by(mut self, cause: FakeError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}

impl RaisedError for FakeError {
    fn snapshot(&self) -> ErrorSnapshot {
        self.snapshot.clone()
    }

    fn identity(&self) -> GroupKey {
        self.key.clone()
    }

    fn cause(&self) -> Option<&dyn RaisedError> {
        self.cause.as_deref().map(|cause| cause as &dyn RaisedError)
    }

    fn contexts(&self) -> Vec<Arc<dyn ExecutionContext>> {
        self.contexts.clone()
    }
}

/// Mapper that walks the cause chain one group per error, outermost first.
pub struct ChainMapper;

impl ExceptionChainMapper for ChainMapper {
    fn follow(&self, error: &dyn RaisedError) -> Vec<ContextGroup> {
        let mut groups = Vec::new();
        let mut current = Some(error);
        while let Some(err) = current {
            groups.push(ContextGroup::new(
                err.identity(),
                Some(err.snapshot()),
                err.contexts(),
            ));
            current = err.cause();
        }
        groups
    }
}
