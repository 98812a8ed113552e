//! Dual-tier session storage: a process-local map plus a distributed mirror.

use crate::cache::CacheBackend;
use crate::config::{ConsoleConfig, LookupPolicy};
use crate::mapper::{ContextGroup, ExceptionChainMapper};
use crate::record::StoredSessionRecord;
use crate::session::{Session, SessionSource};
use dashmap::DashMap;
use postmortem_types::{SessionError, SessionId, StorageError};
use std::sync::Arc;

/// Registers and resolves console sessions.
///
/// Every session lands in the process-local map, which lives as long as the
/// process. When distributed storage is enabled, a metadata record is
/// additionally mirrored into the cache backend under a TTL so other
/// processes can resolve the session.
///
/// Lookup is an exclusive switch, not a fallback chain: with the distributed
/// tier enabled, `find` consults only the cache — even for sessions created
/// in this very process — and returns a rehydrated, metadata-only session.
/// [`LookupPolicy::LocalFirst`] opts into consulting the local map first,
/// which keeps the live contexts whenever the lookup lands on the creating
/// process.
///
/// Constructed explicitly and passed to collaborators; there is no ambient
/// global registry.
pub struct SessionStore {
    config: ConsoleConfig,
    local: DashMap<String, Arc<Session>>,
    cache: Arc<dyn CacheBackend>,
    mapper: Arc<dyn ExceptionChainMapper>,
}

impl SessionStore {
    pub fn new(
        config: ConsoleConfig,
        cache: Arc<dyn CacheBackend>,
        mapper: Arc<dyn ExceptionChainMapper>,
    ) -> Self {
        Self {
            config,
            local: DashMap::new(),
            cache,
            mapper,
        }
    }

    /// Open a session over `groups` and register it in both tiers.
    ///
    /// Requires at least one group with at least one context. The distributed
    /// mirror write is best-effort: a cache failure is logged and the session
    /// stays fully usable through the local tier.
    pub async fn create(&self, groups: Vec<ContextGroup>) -> Result<Arc<Session>, SessionError> {
        let session = Arc::new(Session::new(groups, &self.config.last_value_variable)?);
        self.register(&session).await;
        Ok(session)
    }

    /// Open a session from whatever the request layer captured.
    ///
    /// A raised error takes priority over a bare context; with neither
    /// present, no session is created and `Ok(None)` is returned.
    pub async fn open(
        &self,
        source: SessionSource,
    ) -> Result<Option<Arc<Session>>, SessionError> {
        if let Some(error) = source.error {
            let groups = self.mapper.follow(error.as_ref());
            return self.create(groups).await.map(Some);
        }
        if let Some(context) = source.context {
            let group = ContextGroup::for_context(context);
            return self.create(vec![group]).await.map(Some);
        }
        Ok(None)
    }

    async fn register(&self, session: &Arc<Session>) {
        self.local
            .insert(session.id().as_str().to_string(), Arc::clone(session));
        if !self.config.use_distributed_storage {
            return;
        }
        if let Err(err) = self.mirror(session).await {
            tracing::error!(
                session = %session.id(),
                "failed to mirror session into distributed storage: {err}"
            );
        }
    }

    async fn mirror(&self, session: &Session) -> Result<(), StorageError> {
        let payload = StoredSessionRecord::of(session).to_json()?;
        self.cache
            .set_with_ttl(&cache_key(session.id()), &payload, self.config.ttl)
            .await
    }

    /// Resolve a session by id, or `None` if it is unknown, expired, or its
    /// stored record is unreadable.
    pub async fn find(&self, id: &SessionId) -> Option<Arc<Session>> {
        if !self.config.use_distributed_storage {
            return self.find_local(id);
        }
        match self.config.lookup {
            LookupPolicy::Exclusive => self.find_distributed(id).await,
            LookupPolicy::LocalFirst => match self.find_local(id) {
                Some(session) => Some(session),
                None => self.find_distributed(id).await,
            },
        }
    }

    fn find_local(&self, id: &SessionId) -> Option<Arc<Session>> {
        self.local.get(id.as_str()).map(|entry| entry.value().clone())
    }

    async fn find_distributed(&self, id: &SessionId) -> Option<Arc<Session>> {
        let payload = match self.cache.get(&cache_key(id)).await {
            Ok(Some(payload)) => payload,
            Ok(None) => return None,
            Err(err) => {
                tracing::error!(session = %id, "distributed session lookup failed: {err}");
                return None;
            }
        };
        match StoredSessionRecord::from_json(&payload) {
            Ok(record) => Some(Arc::new(Session::from_record(
                record,
                &self.config.last_value_variable,
            ))),
            Err(err) => {
                // Treated the same as a miss; a malformed record is useless.
                tracing::warn!(session = %id, "discarding malformed session record: {err}");
                None
            }
        }
    }

    /// Drop a session from the local map and, best-effort, from the
    /// distributed tier. The cache expires its entries at TTL regardless.
    pub async fn delete(&self, id: &SessionId) {
        self.local.remove(id.as_str());
        if !self.config.use_distributed_storage {
            return;
        }
        if let Err(err) = self.cache.delete(&cache_key(id)).await {
            tracing::warn!(session = %id, "failed to delete session from distributed storage: {err}");
        }
    }

    /// Number of sessions held in the process-local map.
    pub fn local_len(&self) -> usize {
        self.local.len()
    }
}

fn cache_key(id: &SessionId) -> String {
    format!("session:{id}")
}
