//! Expression evaluation against a live execution context.

use postmortem_types::{EvalFailure, ExecutionContext};
use std::sync::Arc;

/// Filters noise out of evaluation backtraces.
///
/// Two filters apply: frames that belong to the caller's own stack at the
/// moment of failure, and frames matching a silenced path prefix.
#[derive(Debug, Clone, Default)]
pub struct BacktraceCleaner {
    silencers: Vec<String>,
}

impl BacktraceCleaner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Silence frames whose rendering starts with `prefix`.
    pub fn add_silencer(&mut self, prefix: impl Into<String>) {
        self.silencers.push(prefix.into());
    }

    /// Return `frames` with caller frames subtracted and silenced frames
    /// dropped, preserving order.
    pub fn clean(&self, frames: &[String], caller: &[String]) -> Vec<String> {
        frames
            .iter()
            .filter(|frame| !caller.contains(frame))
            .filter(|frame| !self.silencers.iter().any(|s| frame.starts_with(s.as_str())))
            .cloned()
            .collect()
    }
}

/// Evaluates code in one execution context and formats the outcome.
///
/// Unlike calling [`ExecutionContext::eval`] directly, the evaluator always
/// produces a string: successes render as `=> value`, failures as the error
/// type, message, and a cleaned backtrace. Arbitrary user code can fail in
/// arbitrary ways, so nothing an evaluation raises escapes this boundary.
pub struct Evaluator {
    context: Arc<dyn ExecutionContext>,
    last_value_variable: String,
    cleaner: BacktraceCleaner,
}

impl Evaluator {
    pub fn new(context: Arc<dyn ExecutionContext>, last_value_variable: impl Into<String>) -> Self {
        let mut cleaner = BacktraceCleaner::new();
        // Frames from our own implementation are never interesting to the
        // person debugging their application.
        cleaner.add_silencer(env!("CARGO_MANIFEST_DIR"));
        Self {
            context,
            last_value_variable: last_value_variable.into(),
            cleaner,
        }
    }

    /// The context this evaluator is bound to.
    pub fn context(&self) -> &Arc<dyn ExecutionContext> {
        &self.context
    }

    /// Evaluate `input` and format the outcome.
    ///
    /// On success the configured last-value variable is re-bound to the
    /// result so subsequent expressions can reference it; that re-bind is
    /// best-effort and never masks the success.
    pub fn evaluate(&self, input: &str) -> String {
        match self.context.eval(input) {
            Ok(value) => {
                let output = format!("=> {value}\n");
                self.remember_last_value(input);
                output
            }
            Err(failure) => self.format_failure(&failure),
        }
    }

    fn remember_last_value(&self, input: &str) {
        if input.trim().is_empty() {
            return;
        }
        let _ = self
            .context
            .eval(&format!("{} = {}", self.last_value_variable, input));
    }

    fn format_failure(&self, failure: &EvalFailure) -> String {
        let caller = self.context.caller_frames();
        let mut output = format!("{}: {}\n", failure.type_name, failure.message);
        for frame in self.cleaner.clean(&failure.backtrace, &caller) {
            output.push_str("\tfrom ");
            output.push_str(&frame);
            output.push('\n');
        }
        output
    }
}
