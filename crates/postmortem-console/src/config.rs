//! Runtime configuration for the console session layer.

use std::time::Duration;

/// Variable name the last evaluated value is re-bound to by default.
pub const DEFAULT_LAST_VALUE_VARIABLE: &str = "_";

/// Default TTL for records mirrored into the distributed cache.
pub const DEFAULT_TTL_SECS: u64 = 3600;

/// How `find` resolves a session when distributed storage is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupPolicy {
    /// Consult only the distributed tier, even for sessions created in this
    /// process. Exercises the cross-process path on every lookup.
    #[default]
    Exclusive,
    /// Prefer the local map, falling back to the distributed tier. Keeps the
    /// live session (and its evaluation contexts) whenever the lookup lands
    /// on the process that created it.
    LocalFirst,
}

/// Resolved configuration for a session store.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Variable re-bound to the last successful evaluation result so later
    /// expressions can reference it.
    pub last_value_variable: String,
    /// Mirror sessions into the distributed cache and resolve lookups there.
    pub use_distributed_storage: bool,
    /// TTL applied to distributed cache entries.
    pub ttl: Duration,
    /// Lookup behavior when distributed storage is enabled.
    pub lookup: LookupPolicy,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            last_value_variable: DEFAULT_LAST_VALUE_VARIABLE.to_string(),
            use_distributed_storage: true,
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            lookup: LookupPolicy::Exclusive,
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from the environment, with defaults for anything
    /// unset. Unparseable values fall back to the default with a warning.
    ///
    /// Recognized variables: `POSTMORTEM_LAST_VALUE_VARIABLE`,
    /// `POSTMORTEM_USE_DISTRIBUTED_STORAGE` (`true`/`false`),
    /// `POSTMORTEM_TTL_SECS`, `POSTMORTEM_LOOKUP_POLICY`
    /// (`exclusive`/`local-first`).
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(name) = var("POSTMORTEM_LAST_VALUE_VARIABLE") {
            if !name.trim().is_empty() {
                config.last_value_variable = name;
            }
        }

        if let Some(raw) = var("POSTMORTEM_USE_DISTRIBUTED_STORAGE") {
            match raw.parse::<bool>() {
                Ok(flag) => config.use_distributed_storage = flag,
                Err(_) => {
                    tracing::warn!("ignoring invalid POSTMORTEM_USE_DISTRIBUTED_STORAGE: {raw}")
                }
            }
        }

        if let Some(raw) = var("POSTMORTEM_TTL_SECS") {
            match raw.parse::<u64>() {
                Ok(secs) => config.ttl = Duration::from_secs(secs),
                Err(_) => tracing::warn!("ignoring invalid POSTMORTEM_TTL_SECS: {raw}"),
            }
        }

        if let Some(raw) = var("POSTMORTEM_LOOKUP_POLICY") {
            match raw.as_str() {
                "exclusive" => config.lookup = LookupPolicy::Exclusive,
                "local-first" => config.lookup = LookupPolicy::LocalFirst,
                _ => tracing::warn!("ignoring invalid POSTMORTEM_LOOKUP_POLICY: {raw}"),
            }
        }

        config
    }

    /// Configuration with the distributed tier disabled (local map only).
    pub fn local_only() -> Self {
        Self {
            use_distributed_storage: false,
            ..Self::default()
        }
    }
}
