//! Record types, the `ObjectStore` trait, and the in-memory backend used by
//! the Whetstone active-model service.
//!
//! Active models, nodes, and policies are created elsewhere (the provisioning
//! engine); this crate only defines how they are stored and looked up.

mod error;
mod memory;
mod record;
mod traits;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use record::{ActiveModel, Node, Policy, StateLogEntry, StoreSeed};
pub use traits::ObjectStore;
