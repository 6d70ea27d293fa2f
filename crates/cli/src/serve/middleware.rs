//! Origin-gate middleware.
//!
//! Each restricted route group carries one of these layers; the gate runs
//! before routing reaches a handler, so a forbidden caller triggers no
//! selector resolution or store access at all.

use std::sync::Arc;

use axum::extract::{ConnectInfo, State};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use whetstone_core::AuthTier;

use super::envelope::ApiEnvelope;
use super::state::AppState;

/// Restrict a route group to the server's own address (or loopback).
pub(crate) async fn server_only_gate(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<std::net::SocketAddr>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    enforce(&state, AuthTier::ServerOnly, addr.ip(), request, next).await
}

/// Restrict a route group to the configured subnet.
pub(crate) async fn subnet_only_gate(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<std::net::SocketAddr>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    enforce(&state, AuthTier::SubnetOnly, addr.ip(), request, next).await
}

async fn enforce(
    state: &AppState,
    tier: AuthTier,
    peer: std::net::IpAddr,
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    match state.origin.check(tier, peer) {
        Ok(()) => next.run(request).await,
        Err(err) => ApiEnvelope::failure(&err).into_response(),
    }
}
