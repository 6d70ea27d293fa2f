use async_trait::async_trait;

use crate::error::StoreError;
use crate::record::{ActiveModel, Node, Policy};

/// The gateway to the object store holding node, policy, and active-model
/// records.
///
/// ## Prefix lookups
///
/// The `*_by_uuid` methods accept either a full uuid or a prefix. An exact
/// match always wins; otherwise the prefix must match exactly one record.
/// A prefix matching more than one record returns
/// `Err(StoreError::AmbiguousUuid)`; no match is `Ok(None)`.
///
/// ## Atomicity
///
/// Individual get/remove operations are atomic, but nothing here coordinates
/// concurrent removals of the same record; the loser of that race simply
/// sees `Ok(false)` or `Ok(None)`.
///
/// Implementations must be `Send + Sync + 'static` to be used in axum
/// application state and across async task boundaries.
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// All known nodes.
    async fn nodes(&self) -> Result<Vec<Node>, StoreError>;

    /// Look up a node by assigned uuid (or unique prefix).
    async fn node_by_uuid(&self, uuid: &str) -> Result<Option<Node>, StoreError>;

    /// Look up a node by hardware id. The id is compared exactly; callers
    /// normalize case before calling.
    async fn node_by_hw_id(&self, hw_id: &str) -> Result<Option<Node>, StoreError>;

    /// Look up a policy by uuid (or unique prefix).
    async fn policy_by_uuid(&self, uuid: &str) -> Result<Option<Policy>, StoreError>;

    /// All active-model records.
    async fn active_models(&self) -> Result<Vec<ActiveModel>, StoreError>;

    /// Look up an active model by uuid (or unique prefix).
    async fn active_model_by_uuid(&self, uuid: &str) -> Result<Option<ActiveModel>, StoreError>;

    /// The live binding for a node, if any. `Ok(None)` means the node exists
    /// but is not bound; callers distinguish that from an unknown node.
    async fn active_model_for_node(
        &self,
        node_uuid: &str,
    ) -> Result<Option<ActiveModel>, StoreError>;

    /// Remove an active model and its log as one operation.
    ///
    /// `Ok(false)` means the store refused the delete or the record was
    /// already gone.
    async fn remove_active_model(&self, uuid: &str) -> Result<bool, StoreError>;
}
