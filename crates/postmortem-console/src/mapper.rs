//! Context groups and the exception chain mapper seam.

use postmortem_types::{ErrorSnapshot, ExecutionContext, GroupKey, RaisedError};
use std::fmt;
use std::sync::Arc;

/// An ordered run of execution contexts tied to one error in a cause chain.
///
/// Groups are produced once, when a session is opened, and are immutable
/// afterwards. A group rebuilt from stored metadata carries its key and error
/// snapshot but no contexts.
#[derive(Clone)]
pub struct ContextGroup {
    key: GroupKey,
    error: Option<ErrorSnapshot>,
    contexts: Vec<Arc<dyn ExecutionContext>>,
}

impl ContextGroup {
    pub fn new(
        key: GroupKey,
        error: Option<ErrorSnapshot>,
        contexts: Vec<Arc<dyn ExecutionContext>>,
    ) -> Self {
        Self {
            key,
            error,
            contexts,
        }
    }

    /// Wrap a bare context as a single-element group with a synthetic key.
    pub fn for_context(context: Arc<dyn ExecutionContext>) -> Self {
        Self {
            key: GroupKey::random(),
            error: None,
            contexts: vec![context],
        }
    }

    /// Group carrying only identity and error metadata, as rebuilt from the
    /// distributed tier.
    pub(crate) fn metadata_only(key: GroupKey, error: Option<ErrorSnapshot>) -> Self {
        Self {
            key,
            error,
            contexts: Vec::new(),
        }
    }

    pub fn key(&self) -> &GroupKey {
        &self.key
    }

    pub fn error(&self) -> Option<&ErrorSnapshot> {
        self.error.as_ref()
    }

    pub fn contexts(&self) -> &[Arc<dyn ExecutionContext>] {
        &self.contexts
    }

    pub fn context_at(&self, index: usize) -> Option<&Arc<dyn ExecutionContext>> {
        self.contexts.get(index)
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

impl fmt::Debug for ContextGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextGroup")
            .field("key", &self.key)
            .field("error", &self.error)
            .field("contexts", &self.contexts.len())
            .finish()
    }
}

/// Walks a raised error's cause chain and produces one context group per
/// error, ordered outermost first.
///
/// External collaborator: the walking algorithm (and what counts as a cause)
/// belongs to the host runtime, not to this crate.
pub trait ExceptionChainMapper: Send + Sync {
    fn follow(&self, error: &dyn RaisedError) -> Vec<ContextGroup>;
}

/// Resolve the group carrying `key` within `groups`.
pub fn find_group<'a>(groups: &'a [ContextGroup], key: &GroupKey) -> Option<&'a ContextGroup> {
    groups.iter().find(|group| group.key() == key)
}
