//! Application state shared across request handlers.

use whetstone_core::OriginPolicy;
use whetstone_store::MemoryStore;

/// Shared server state: the object store and the origin authorization
/// policy. Constructed once at startup and passed to every handler; there is
/// no process-wide singleton.
pub(crate) struct AppState {
    pub(crate) store: MemoryStore,
    pub(crate) origin: OriginPolicy,
}
