//! Route handlers for the active-model surface.
//!
//! Handlers do parameter extraction and envelope construction only; all
//! decisions live in `whetstone-core`. Single lookups answer with the full
//! record, collection results with flat summaries (the attribute set the
//! filter expression also sees).

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::{json, Value};
use whetstone_core::selector::{self, Resolution, Selector};
use whetstone_core::{logview, ApiError};
use whetstone_store::{ActiveModel, ObjectStore};

use super::envelope::ApiEnvelope;
use super::state::AppState;

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found() -> impl IntoResponse {
    ApiEnvelope {
        code: 404,
        kind: Some("not_found"),
        response: Value::String("not found".to_string()),
    }
}

/// GET /health
pub(crate) async fn handle_health() -> impl IntoResponse {
    ApiEnvelope::success(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /active_model
///
/// With no parameters, the full collection; with `policy`, the subset owned
/// by that policy; with `node_uuid` or `hw_id`, the single binding of that
/// node; `filter_str` narrows collection results.
pub(crate) async fn handle_query(
    State(state): State<Arc<AppState>>,
    Query(sel): Query<Selector>,
) -> impl IntoResponse {
    let result = match selector::resolve(&state.store, &sel).await {
        Ok(Resolution::One(model)) => Ok(model.detail()),
        Ok(Resolution::Many(models)) => Ok(Value::Array(
            models.iter().map(ActiveModel::summary).collect(),
        )),
        Err(err) => Err(err),
    };
    ApiEnvelope::from_result(result)
}

/// Query parameters for DELETE /active_model.
#[derive(Debug, Deserialize)]
pub(crate) struct DeleteSelector {
    node_uuid: Option<String>,
    hw_id: Option<String>,
}

/// DELETE /active_model
pub(crate) async fn handle_delete_by_selector(
    State(state): State<Arc<AppState>>,
    Query(sel): Query<DeleteSelector>,
) -> impl IntoResponse {
    let result = async {
        let model = selector::resolve_for_delete(
            &state.store,
            sel.node_uuid.as_deref(),
            sel.hw_id.as_deref(),
        )
        .await?;
        remove_model(&state.store, &model).await
    }
    .await;
    ApiEnvelope::from_result(result)
}

/// GET /active_model/logs (server-only)
pub(crate) async fn handle_all_logs(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let result = async {
        let models = state.store.active_models().await.map_err(ApiError::from)?;
        Ok(json!(logview::merged_log_rows(&models)))
    }
    .await;
    ApiEnvelope::from_result(result)
}

/// GET /active_model/{uuid}
pub(crate) async fn handle_get_by_uuid(
    State(state): State<Arc<AppState>>,
    Path(uuid): Path<String>,
) -> impl IntoResponse {
    let result = selector::find_by_uuid(&state.store, &uuid)
        .await
        .map(|model| model.detail());
    ApiEnvelope::from_result(result)
}

/// DELETE /active_model/{uuid} (subnet-only)
pub(crate) async fn handle_delete_by_uuid(
    State(state): State<Arc<AppState>>,
    Path(uuid): Path<String>,
) -> impl IntoResponse {
    let result = async {
        let model = selector::find_by_uuid(&state.store, &uuid).await?;
        remove_model(&state.store, &model).await
    }
    .await;
    ApiEnvelope::from_result(result)
}

/// GET /active_model/{uuid}/logs (server-only)
pub(crate) async fn handle_logs_by_uuid(
    State(state): State<Arc<AppState>>,
    Path(uuid): Path<String>,
) -> impl IntoResponse {
    let result = selector::find_by_uuid(&state.store, &uuid)
        .await
        .map(|model| json!(logview::log_rows(&model, false)));
    ApiEnvelope::from_result(result)
}

/// The shared removal workflow: one gateway delete, with a gateway refusal
/// or failure translated into `RemovalFailed`.
async fn remove_model(store: &dyn ObjectStore, model: &ActiveModel) -> Result<Value, ApiError> {
    match store.remove_active_model(&model.uuid).await {
        Ok(true) => Ok(Value::String(format!(
            "active model [{}] removed",
            model.uuid
        ))),
        Ok(false) => Err(ApiError::RemovalFailed(format!(
            "could not remove active model [{}]",
            model.uuid
        ))),
        Err(err) => Err(ApiError::RemovalFailed(format!(
            "could not remove active model [{}]: {err}",
            model.uuid
        ))),
    }
}
