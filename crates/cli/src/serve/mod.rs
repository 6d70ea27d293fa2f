//! `whetstone serve` -- HTTP JSON API for active-model records.
//!
//! Exposes the selector resolver, log aggregator, and deletion workflow as
//! an async HTTP service using `axum` + `tokio`.
//!
//! Endpoints:
//! - GET    /health                    - Server status (open)
//! - GET    /active_model              - List / filter / single lookup (open)
//! - DELETE /active_model              - Delete by node_uuid or hw_id (open)
//! - GET    /active_model/logs         - Merged logs, uuid-tagged (server-only)
//! - GET    /active_model/{uuid}       - Single lookup by uuid/prefix (open)
//! - DELETE /active_model/{uuid}       - Delete by uuid/prefix (subnet-only)
//! - GET    /active_model/{uuid}/logs  - One model's log (server-only)
//!
//! All responses use Content-Type: application/json and a uniform envelope
//! `{code, kind?, response}`; the restricted tiers check the caller's peer
//! address before any resolution happens.

mod envelope;
mod handlers;
mod middleware;
mod state;

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::http::Method;
use axum::routing::{delete, get};
use axum::{middleware as axum_middleware, Router};
use tower_http::cors::{Any, CorsLayer};
use whetstone_core::{OriginPolicy, Subnet};
use whetstone_store::{MemoryStore, StoreSeed};

use self::handlers::{
    handle_all_logs, handle_delete_by_selector, handle_delete_by_uuid, handle_get_by_uuid,
    handle_health, handle_logs_by_uuid, handle_not_found, handle_query,
};
use self::middleware::{server_only_gate, subnet_only_gate};
use self::state::AppState;

/// Subnet admitted by the subnet-only tier when none is configured.
const DEFAULT_SUBNET: &str = "127.0.0.0/8";

/// Deployed address assumed when none is configured.
const DEFAULT_SERVER_ADDR: &str = "127.0.0.1";

/// Start the HTTP server, optionally pre-loading store records from a seed
/// document.
pub async fn start_server(
    port: u16,
    bind: &str,
    seed: Option<PathBuf>,
    subnet: Option<String>,
    server_addr: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = match seed {
        Some(path) => {
            let text = std::fs::read_to_string(&path)?;
            let seed: StoreSeed = serde_json::from_str(&text)?;
            let store = MemoryStore::from_seed(seed);
            let (nodes, policies, models) = store.counts().await;
            eprintln!(
                "Loaded seed {}: {} nodes, {} policies, {} active models",
                path.display(),
                nodes,
                policies,
                models
            );
            store
        }
        None => MemoryStore::new(),
    };

    // Subnet: flag, then WHETSTONE_SUBNET env var, then loopback default.
    let subnet_text = subnet
        .or_else(|| std::env::var("WHETSTONE_SUBNET").ok())
        .unwrap_or_else(|| DEFAULT_SUBNET.to_string());
    let subnet: Subnet = subnet_text.parse()?;

    // Server address: flag, then WHETSTONE_SERVER_ADDR, then loopback.
    let server_addr_text = server_addr
        .or_else(|| std::env::var("WHETSTONE_SERVER_ADDR").ok())
        .unwrap_or_else(|| DEFAULT_SERVER_ADDR.to_string());
    let server_addr: IpAddr = server_addr_text.parse()?;

    eprintln!("Server-only tier: {}", server_addr_text);
    eprintln!("Subnet-only tier: {}", subnet_text);

    let state = Arc::new(AppState {
        store,
        origin: OriginPolicy {
            server_addr,
            subnet,
        },
    });

    // CORS: permissive for local dev, same posture as the rest of the stack.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::DELETE])
        .allow_headers(Any);

    let open_routes = Router::new()
        .route(
            "/active_model",
            get(handle_query).delete(handle_delete_by_selector),
        )
        .route("/active_model/{uuid}", get(handle_get_by_uuid))
        .route("/health", get(handle_health));

    let server_only_routes = Router::new()
        .route("/active_model/logs", get(handle_all_logs))
        .route("/active_model/{uuid}/logs", get(handle_logs_by_uuid))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            server_only_gate,
        ));

    let subnet_only_routes = Router::new()
        .route("/active_model/{uuid}", delete(handle_delete_by_uuid))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            subnet_only_gate,
        ));

    let app = Router::new()
        .merge(open_routes)
        .merge(server_only_routes)
        .merge(subnet_only_routes)
        .fallback(handle_not_found)
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", bind, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    eprintln!("Whetstone active-model API listening on http://{}", addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    eprintln!("\nServer shut down.");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    eprintln!("\nReceived shutdown signal...");
}
