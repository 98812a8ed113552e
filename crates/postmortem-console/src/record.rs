//! Serializable projection of a session for the distributed tier.

use crate::session::Session;
use chrono::{DateTime, Utc};
use postmortem_types::{ErrorSnapshot, GroupKey, SessionId, StorageError};
use serde::{Deserialize, Serialize};

/// The subset of a session that survives a process boundary.
///
/// Live execution contexts are process-bound and deliberately absent: only
/// each group's identity key and captured error metadata cross over. A
/// session rebuilt from one of these records is stale by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSessionRecord {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
    pub groups: Vec<StoredGroup>,
}

/// One context group's storable half.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredGroup {
    pub key: GroupKey,
    pub error: Option<ErrorSnapshot>,
}

impl StoredSessionRecord {
    /// Project `session` down to its storable metadata.
    pub fn of(session: &Session) -> Self {
        Self {
            id: session.id().clone(),
            created_at: session.created_at(),
            groups: session
                .groups()
                .iter()
                .map(|group| StoredGroup {
                    key: group.key().clone(),
                    error: group.error().cloned(),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(payload: &str) -> Result<Self, StorageError> {
        Ok(serde_json::from_str(payload)?)
    }
}
