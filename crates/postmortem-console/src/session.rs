//! A console session over one or more context groups.

use crate::evaluator::Evaluator;
use crate::mapper::{ContextGroup, find_group};
use crate::record::StoredSessionRecord;
use chrono::{DateTime, Utc};
use postmortem_types::{
    ContextInspector, ExecutionContext, GroupKey, InvalidSwitch, RaisedError, SessionError,
    SessionId,
};
use std::sync::{Arc, Mutex};

/// Source material a session can be opened from.
///
/// Mirrors what the surrounding request layer captures: a raised error, a
/// bare execution context, both, or neither. When both are present the error
/// takes priority.
#[derive(Clone, Default)]
pub struct SessionSource {
    pub error: Option<Arc<dyn RaisedError>>,
    pub context: Option<Arc<dyn ExecutionContext>>,
}

impl SessionSource {
    pub fn from_error(error: Arc<dyn RaisedError>) -> Self {
        Self {
            error: Some(error),
            context: None,
        }
    }

    pub fn from_context(context: Arc<dyn ExecutionContext>) -> Self {
        Self {
            error: None,
            context: Some(context),
        }
    }
}

/// A read-eval-print session bound to a point of program execution.
///
/// Bundles the context groups captured when the console was opened, tracks
/// which context is currently selected, and serializes evaluation against
/// switching: a switch either completes before the next evaluation or is
/// rejected, never observed mid-update.
///
/// A session resolved from the distributed tier carries group identities and
/// error metadata but no live contexts; evaluating or switching on it fails
/// with [`SessionError::StaleSession`].
pub struct Session {
    id: SessionId,
    created_at: DateTime<Utc>,
    groups: Vec<ContextGroup>,
    last_value_variable: String,
    active: Mutex<Option<Evaluator>>,
}

impl Session {
    /// Open a session over `groups`, selecting the first context of the
    /// first group. Sessions are only built through a
    /// [`SessionStore`](crate::store::SessionStore), which also registers
    /// them.
    pub(crate) fn new(
        groups: Vec<ContextGroup>,
        last_value_variable: &str,
    ) -> Result<Self, SessionError> {
        let first = groups
            .first()
            .and_then(|group| group.context_at(0))
            .cloned()
            .ok_or(SessionError::NoContexts)?;
        Ok(Self {
            id: SessionId::new(),
            created_at: Utc::now(),
            groups,
            last_value_variable: last_value_variable.to_string(),
            active: Mutex::new(Some(Evaluator::new(first, last_value_variable))),
        })
    }

    /// Rebuild a metadata-only session from a stored record, keeping the
    /// store's configured last-value variable name.
    pub(crate) fn from_record(record: StoredSessionRecord, last_value_variable: &str) -> Self {
        let groups = record
            .groups
            .into_iter()
            .map(|group| ContextGroup::metadata_only(group.key, group.error))
            .collect();
        Self {
            id: record.id,
            created_at: record.created_at,
            groups,
            last_value_variable: last_value_variable.to_string(),
            active: Mutex::new(None),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn groups(&self) -> &[ContextGroup] {
        &self.groups
    }

    /// Whether this session still holds a live execution context.
    pub fn is_live(&self) -> bool {
        self.active.lock().unwrap().is_some()
    }

    /// The currently selected context, if the session is live.
    pub fn current_context(&self) -> Option<Arc<dyn ExecutionContext>> {
        self.active
            .lock()
            .unwrap()
            .as_ref()
            .map(|evaluator| evaluator.context().clone())
    }

    /// Evaluate `input` on the currently selected context.
    ///
    /// User-code failures are rendered into the returned string; the only
    /// error case is a session with no live context.
    pub fn evaluate(&self, input: &str) -> Result<String, SessionError> {
        let active = self.active.lock().unwrap();
        match active.as_ref() {
            Some(evaluator) => Ok(evaluator.evaluate(input)),
            None => Err(SessionError::StaleSession {
                id: self.id.clone(),
            }),
        }
    }

    /// Switch the selected context to position `index` within the group
    /// identified by `key`, rebuilding the evaluator over it.
    ///
    /// Fails with [`InvalidSwitch`] when no group matches or the index is out
    /// of range, leaving the current context untouched.
    pub fn switch_to(&self, index: usize, key: &GroupKey) -> Result<(), SessionError> {
        let mut active = self.active.lock().unwrap();
        if active.is_none() {
            return Err(SessionError::StaleSession {
                id: self.id.clone(),
            });
        }
        let group = find_group(&self.groups, key).ok_or_else(|| InvalidSwitch::UnknownGroup {
            key: key.clone(),
        })?;
        let context = group
            .context_at(index)
            .ok_or_else(|| InvalidSwitch::IndexOutOfRange {
                key: key.clone(),
                index,
                len: group.len(),
            })?
            .clone();
        *active = Some(Evaluator::new(context, &self.last_value_variable));
        Ok(())
    }

    /// Inspect the current context's local state along `path` via the given
    /// inspector.
    pub fn context_info(
        &self,
        inspector: &dyn ContextInspector,
        path: &str,
    ) -> Result<serde_json::Value, SessionError> {
        let active = self.active.lock().unwrap();
        match active.as_ref() {
            Some(evaluator) => Ok(inspector.extract(evaluator.context().as_ref(), path)),
            None => Err(SessionError::StaleSession {
                id: self.id.clone(),
            }),
        }
    }
}
