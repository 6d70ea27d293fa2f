//! Selector resolution.
//!
//! A request identifies its target active model(s) through at most one of
//! three mutually-exclusive selectors: the bound node's assigned uuid, the
//! bound node's hardware id, or the owning policy's uuid. The first two
//! resolve to exactly one record, the third (or no selector at all) to a
//! collection, optionally narrowed by a filter expression.

use serde::Deserialize;
use serde_json::Value;
use whetstone_store::{ActiveModel, Node, ObjectStore};

use crate::error::ApiError;
use crate::filter::{entry_matches, parse_filter};

/// Query-side identification parameters, all optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Selector {
    pub node_uuid: Option<String>,
    pub hw_id: Option<String>,
    pub policy: Option<String>,
    pub filter_str: Option<String>,
}

/// What a selector resolved to.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// A single-node selector found the node's one live binding.
    One(ActiveModel),
    /// A collection result; may legitimately be empty.
    Many(Vec<ActiveModel>),
}

/// Treat empty strings the same as absent parameters.
fn given(param: &Option<String>) -> Option<&str> {
    param.as_deref().filter(|v| !v.is_empty())
}

/// Resolve a query selector to one or many active models.
///
/// Validation is order-sensitive: selector conflicts are reported before
/// filter conflicts, and a single-node selector short-circuits the
/// collection paths entirely.
pub async fn resolve(store: &dyn ObjectStore, sel: &Selector) -> Result<Resolution, ApiError> {
    let node_uuid = given(&sel.node_uuid);
    let hw_id = given(&sel.hw_id);
    let policy = given(&sel.policy);
    let filter_str = given(&sel.filter_str);

    let selector_count = [node_uuid, hw_id, policy].iter().flatten().count();
    if selector_count > 1 {
        return Err(ApiError::InvalidSelector(
            "only one node selection parameter ('policy', 'hw_id' or 'node_uuid') may be used"
                .to_string(),
        ));
    }
    // A filter narrows a collection; a single-node selector never yields one.
    if filter_str.is_some() && (node_uuid.is_some() || hw_id.is_some()) {
        return Err(ApiError::InvalidInput(
            "a filter string cannot be combined with a 'hw_id' or 'node_uuid' selector"
                .to_string(),
        ));
    }

    if let Some(hw_id) = hw_id {
        let node = find_node_by_hw_id(store, hw_id).await?;
        return Ok(Resolution::One(bound_model(store, &node, hw_id).await?));
    }
    if let Some(node_uuid) = node_uuid {
        let node = find_node_by_uuid(store, node_uuid).await?;
        return Ok(Resolution::One(bound_model(store, &node, node_uuid).await?));
    }

    let mut models = store.active_models().await?;
    if let Some(policy_uuid) = policy {
        let policy = store.policy_by_uuid(policy_uuid).await?.ok_or_else(|| {
            ApiError::NotFound(format!("no policy with uuid [{policy_uuid}]"))
        })?;
        models.retain(|m| m.root_policy == policy.uuid);
    }
    if let Some(expr) = filter_str {
        models = filter_models(models, expr)?;
    }
    Ok(Resolution::Many(models))
}

/// Resolve the deletion selector: exactly one of `node_uuid` / `hw_id`.
///
/// Policy-based deletion is not supported, so this never yields a
/// collection.
pub async fn resolve_for_delete(
    store: &dyn ObjectStore,
    node_uuid: Option<&str>,
    hw_id: Option<&str>,
) -> Result<ActiveModel, ApiError> {
    let node_uuid = node_uuid.filter(|v| !v.is_empty());
    let hw_id = hw_id.filter(|v| !v.is_empty());
    match (node_uuid, hw_id) {
        (None, None) => Err(ApiError::InvalidSelector(
            "must select a node using one of the 'hw_id' or 'node_uuid' query parameters"
                .to_string(),
        )),
        (Some(_), Some(_)) => Err(ApiError::InvalidSelector(
            "only one node selection parameter ('hw_id' or 'node_uuid') may be used".to_string(),
        )),
        (None, Some(hw_id)) => {
            let node = find_node_by_hw_id(store, hw_id).await?;
            bound_model(store, &node, hw_id).await
        }
        (Some(node_uuid), None) => {
            let node = find_node_by_uuid(store, node_uuid).await?;
            bound_model(store, &node, node_uuid).await
        }
    }
}

/// Look up an active model by exact or unique-prefix uuid.
pub async fn find_by_uuid(store: &dyn ObjectStore, uuid: &str) -> Result<ActiveModel, ApiError> {
    store
        .active_model_by_uuid(uuid)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no active model with uuid [{uuid}]")))
}

async fn find_node_by_hw_id(store: &dyn ObjectStore, hw_id: &str) -> Result<Node, ApiError> {
    // Hardware ids are matched case-insensitively; the store holds uppercase.
    let hw_id = hw_id.to_uppercase();
    store
        .node_by_hw_id(&hw_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no node with hardware id [{hw_id}]")))
}

async fn find_node_by_uuid(store: &dyn ObjectStore, uuid: &str) -> Result<Node, ApiError> {
    store
        .node_by_uuid(uuid)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no node with uuid [{uuid}]")))
}

/// The node's live binding; absence is `NotFound`, distinct from the node
/// itself not existing (reported one level up with its own message).
async fn bound_model(
    store: &dyn ObjectStore,
    node: &Node,
    shown_id: &str,
) -> Result<ActiveModel, ApiError> {
    store
        .active_model_for_node(&node.uuid)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("node [{shown_id}] is not bound to an active model"))
        })
}

/// Apply a filter expression against each model's flat attribute view.
fn filter_models(models: Vec<ActiveModel>, expr: &str) -> Result<Vec<ActiveModel>, ApiError> {
    let pairs = parse_filter(expr)?;
    let mut kept = Vec::new();
    for model in models {
        let summary: Value = model.summary();
        if entry_matches(&summary, &pairs)? {
            kept.push(model);
        }
    }
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use whetstone_store::{MemoryStore, Policy, StateLogEntry};

    fn sel(
        node_uuid: Option<&str>,
        hw_id: Option<&str>,
        policy: Option<&str>,
        filter_str: Option<&str>,
    ) -> Selector {
        Selector {
            node_uuid: node_uuid.map(String::from),
            hw_id: hw_id.map(String::from),
            policy: policy.map(String::from),
            filter_str: filter_str.map(String::from),
        }
    }

    fn entry(timestamp: i64, old_state: &str, state: &str) -> StateLogEntry {
        StateLogEntry {
            timestamp,
            old_state: old_state.to_string(),
            state: state.to_string(),
            action: "transition".to_string(),
            result: "ok".to_string(),
        }
    }

    async fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .insert_node(Node {
                uuid: "node1".to_string(),
                hw_id: "AB:CD".to_string(),
            })
            .await;
        store
            .insert_node(Node {
                uuid: "node2".to_string(),
                hw_id: "EF:01".to_string(),
            })
            .await;
        store
            .insert_policy(Policy {
                uuid: "policy1".to_string(),
                label: "ubuntu".to_string(),
            })
            .await;
        store
            .insert_policy(Policy {
                uuid: "policy2".to_string(),
                label: "esxi".to_string(),
            })
            .await;
        store
            .insert_active_model(ActiveModel {
                uuid: "am1".to_string(),
                node_uuid: "node1".to_string(),
                root_policy: "policy1".to_string(),
                label: "ubuntu_install".to_string(),
                state_log: vec![entry(100, "queued", "running")],
            })
            .await;
        store
            .insert_active_model(ActiveModel {
                uuid: "am2".to_string(),
                node_uuid: "node9".to_string(),
                root_policy: "policy2".to_string(),
                label: "esxi_install".to_string(),
                state_log: vec![entry(200, "queued", "done")],
            })
            .await;
        store
    }

    #[tokio::test]
    async fn multiple_selectors_are_rejected() {
        let store = seeded_store().await;
        for selector in [
            sel(Some("node1"), Some("AB:CD"), None, None),
            sel(Some("node1"), None, Some("policy1"), None),
            sel(None, Some("AB:CD"), Some("policy1"), None),
            sel(Some("node1"), Some("AB:CD"), Some("policy1"), None),
        ] {
            let err = resolve(&store, &selector).await.unwrap_err();
            assert_eq!(err.kind(), "invalid_selector");
        }
    }

    #[tokio::test]
    async fn filter_with_single_node_selector_is_rejected() {
        let store = seeded_store().await;
        for selector in [
            sel(Some("node1"), None, None, Some("state=running")),
            sel(None, Some("AB:CD"), None, Some("state=running")),
        ] {
            let err = resolve(&store, &selector).await.unwrap_err();
            assert_eq!(err.kind(), "invalid_input");
        }
    }

    #[tokio::test]
    async fn selector_conflict_is_reported_before_filter_conflict() {
        let store = seeded_store().await;
        let selector = sel(Some("node1"), Some("AB:CD"), None, Some("state=up"));
        let err = resolve(&store, &selector).await.unwrap_err();
        assert_eq!(err.kind(), "invalid_selector");
    }

    #[tokio::test]
    async fn empty_parameters_count_as_absent() {
        let store = seeded_store().await;
        let selector = Selector {
            node_uuid: Some(String::new()),
            hw_id: Some("ab:cd".to_string()),
            policy: Some(String::new()),
            filter_str: None,
        };
        match resolve(&store, &selector).await.unwrap() {
            Resolution::One(model) => assert_eq!(model.uuid, "am1"),
            other => panic!("expected single model, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn hw_id_lookup_is_case_insensitive() {
        let store = seeded_store().await;
        for hw in ["ab:cd", "AB:CD", "Ab:Cd"] {
            match resolve(&store, &sel(None, Some(hw), None, None)).await.unwrap() {
                Resolution::One(model) => assert_eq!(model.uuid, "am1"),
                other => panic!("expected single model, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn node_uuid_prefix_resolves_binding() {
        let store = seeded_store().await;
        match resolve(&store, &sel(Some("node1"), None, None, None))
            .await
            .unwrap()
        {
            Resolution::One(model) => assert_eq!(model.uuid, "am1"),
            other => panic!("expected single model, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_node_and_unbound_node_both_not_found() {
        let store = seeded_store().await;

        let err = resolve(&store, &sel(Some("node99"), None, None, None))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");
        assert!(err.to_string().contains("no node with uuid"));

        // node2 exists but has no binding; same kind, different message.
        let err = resolve(&store, &sel(Some("node2"), None, None, None))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");
        assert!(err.to_string().contains("is not bound"));
    }

    #[tokio::test]
    async fn policy_selector_returns_owned_subset() {
        let store = seeded_store().await;
        match resolve(&store, &sel(None, None, Some("policy1"), None))
            .await
            .unwrap()
        {
            Resolution::Many(models) => {
                assert_eq!(models.len(), 1);
                assert_eq!(models[0].uuid, "am1");
            }
            other => panic!("expected collection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn policy_with_no_models_is_empty_success() {
        let store = seeded_store().await;
        store
            .insert_policy(Policy {
                uuid: "policy3".to_string(),
                label: "idle".to_string(),
            })
            .await;
        match resolve(&store, &sel(None, None, Some("policy3"), None))
            .await
            .unwrap()
        {
            Resolution::Many(models) => assert!(models.is_empty()),
            other => panic!("expected collection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_policy_is_not_found() {
        let store = seeded_store().await;
        let err = resolve(&store, &sel(None, None, Some("policy9"), None))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[tokio::test]
    async fn no_selector_returns_full_collection() {
        let store = seeded_store().await;
        match resolve(&store, &Selector::default()).await.unwrap() {
            Resolution::Many(models) => assert_eq!(models.len(), 2),
            other => panic!("expected collection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn filter_narrows_the_collection() {
        let store = seeded_store().await;
        let selector = sel(None, None, None, Some("state=done"));
        match resolve(&store, &selector).await.unwrap() {
            Resolution::Many(models) => {
                assert_eq!(models.len(), 1);
                assert_eq!(models[0].uuid, "am2");
            }
            other => panic!("expected collection, got {other:?}"),
        }

        let selector = sel(None, None, None, Some("nonsense=1"));
        let err = resolve(&store, &selector).await.unwrap_err();
        assert_eq!(err.kind(), "unknown_filter_field");
    }

    #[tokio::test]
    async fn filter_composes_with_policy_selector() {
        let store = seeded_store().await;
        let selector = sel(None, None, Some("policy2"), Some("state=running"));
        match resolve(&store, &selector).await.unwrap() {
            Resolution::Many(models) => assert!(models.is_empty()),
            other => panic!("expected collection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_selector_requires_exactly_one_parameter() {
        let store = seeded_store().await;

        let err = resolve_for_delete(&store, None, None).await.unwrap_err();
        assert_eq!(err.kind(), "invalid_selector");

        let err = resolve_for_delete(&store, Some("node1"), Some("AB:CD"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_selector");
    }

    #[tokio::test]
    async fn delete_selector_resolves_one_binding() {
        let store = seeded_store().await;
        let model = resolve_for_delete(&store, None, Some("ab:cd")).await.unwrap();
        assert_eq!(model.uuid, "am1");

        let model = resolve_for_delete(&store, Some("node1"), None).await.unwrap();
        assert_eq!(model.uuid, "am1");

        let err = resolve_for_delete(&store, Some("node2"), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[tokio::test]
    async fn active_model_uuid_prefix_lookup() {
        let store = seeded_store().await;
        assert_eq!(find_by_uuid(&store, "am1").await.unwrap().uuid, "am1");
        let err = find_by_uuid(&store, "zz").await.unwrap_err();
        assert_eq!(err.kind(), "not_found");
        // "am" matches both records; surfaced as a selector problem.
        let err = find_by_uuid(&store, "am").await.unwrap_err();
        assert_eq!(err.kind(), "invalid_selector");
    }
}
