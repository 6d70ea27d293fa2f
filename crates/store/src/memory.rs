use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::record::{ActiveModel, Node, Policy, StoreSeed};
use crate::traits::ObjectStore;

/// In-memory `ObjectStore` backend.
///
/// Backs the served API and the test suites. Records live behind a single
/// `RwLock`; each trait call takes the lock once, so individual operations
/// are atomic with respect to each other.
pub struct MemoryStore {
    inner: RwLock<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    nodes: Vec<Node>,
    policies: Vec<Policy>,
    active_models: Vec<ActiveModel>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            inner: RwLock::new(StoreInner::default()),
        }
    }

    /// Build a store from a seed document.
    pub fn from_seed(seed: StoreSeed) -> Self {
        MemoryStore {
            inner: RwLock::new(StoreInner {
                nodes: seed.nodes,
                policies: seed.policies,
                active_models: seed.active_models,
            }),
        }
    }

    pub async fn insert_node(&self, node: Node) {
        self.inner.write().await.nodes.push(node);
    }

    pub async fn insert_policy(&self, policy: Policy) {
        self.inner.write().await.policies.push(policy);
    }

    pub async fn insert_active_model(&self, model: ActiveModel) {
        self.inner.write().await.active_models.push(model);
    }

    /// Record counts as (nodes, policies, active models), for startup logging.
    pub async fn counts(&self) -> (usize, usize, usize) {
        let inner = self.inner.read().await;
        (
            inner.nodes.len(),
            inner.policies.len(),
            inner.active_models.len(),
        )
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new()
    }
}

trait HasUuid {
    fn uuid(&self) -> &str;
}

impl HasUuid for Node {
    fn uuid(&self) -> &str {
        &self.uuid
    }
}

impl HasUuid for Policy {
    fn uuid(&self) -> &str {
        &self.uuid
    }
}

impl HasUuid for ActiveModel {
    fn uuid(&self) -> &str {
        &self.uuid
    }
}

/// Exact-or-unique-prefix uuid match over a slice of records.
fn match_by_uuid<'a, T: HasUuid>(
    records: &'a [T],
    wanted: &str,
    kind: &'static str,
) -> Result<Option<&'a T>, StoreError> {
    if let Some(exact) = records.iter().find(|r| r.uuid() == wanted) {
        return Ok(Some(exact));
    }
    let mut matches = records.iter().filter(|r| r.uuid().starts_with(wanted));
    match (matches.next(), matches.next()) {
        (Some(only), None) => Ok(Some(only)),
        (Some(_), Some(_)) => Err(StoreError::AmbiguousUuid {
            kind,
            prefix: wanted.to_string(),
        }),
        _ => Ok(None),
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn nodes(&self) -> Result<Vec<Node>, StoreError> {
        Ok(self.inner.read().await.nodes.clone())
    }

    async fn node_by_uuid(&self, uuid: &str) -> Result<Option<Node>, StoreError> {
        let inner = self.inner.read().await;
        Ok(match_by_uuid(&inner.nodes, uuid, "node")?.cloned())
    }

    async fn node_by_hw_id(&self, hw_id: &str) -> Result<Option<Node>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.nodes.iter().find(|n| n.hw_id == hw_id).cloned())
    }

    async fn policy_by_uuid(&self, uuid: &str) -> Result<Option<Policy>, StoreError> {
        let inner = self.inner.read().await;
        Ok(match_by_uuid(&inner.policies, uuid, "policy")?.cloned())
    }

    async fn active_models(&self) -> Result<Vec<ActiveModel>, StoreError> {
        Ok(self.inner.read().await.active_models.clone())
    }

    async fn active_model_by_uuid(&self, uuid: &str) -> Result<Option<ActiveModel>, StoreError> {
        let inner = self.inner.read().await;
        Ok(match_by_uuid(&inner.active_models, uuid, "active model")?.cloned())
    }

    async fn active_model_for_node(
        &self,
        node_uuid: &str,
    ) -> Result<Option<ActiveModel>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .active_models
            .iter()
            .find(|m| m.node_uuid == node_uuid)
            .cloned())
    }

    async fn remove_active_model(&self, uuid: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.active_models.len();
        inner.active_models.retain(|m| m.uuid != uuid);
        Ok(inner.active_models.len() < before)
    }
}
