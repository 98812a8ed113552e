//! Console sessions bound to captured execution contexts.
//!
//! A session attaches a read-eval-print loop to a point of program execution:
//! either a live context the host captured directly, or the contexts captured
//! along a raised error's cause chain. Sessions are registered in a
//! process-local map and, when enabled, mirrored as metadata records into a
//! TTL-bounded distributed cache so they can be resolved from other
//! processes.

pub mod cache;
pub mod config;
pub mod evaluator;
pub mod mapper;
pub mod record;
pub mod session;
pub mod store;

#[cfg(test)]
mod test_support;

pub use cache::{CacheBackend, InMemoryCache};
pub use config::{ConsoleConfig, LookupPolicy};
pub use evaluator::{BacktraceCleaner, Evaluator};
pub use mapper::{ContextGroup, ExceptionChainMapper, find_group};
pub use record::{StoredGroup, StoredSessionRecord};
pub use session::{Session, SessionSource};
pub use store::SessionStore;
