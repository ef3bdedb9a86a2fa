// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Health and metrics HTTP server.
//!
//! Serves `/healthz` (liveness), `/readyz` (readiness) and `/metrics`
//! (Prometheus text format) on the configured bind address. Runs as one
//! task beside the controllers; readiness reports ready only after the
//! listener is bound and startup is marked complete.

use crate::constants::METRICS_SERVER_PATH;
use crate::metrics::Metrics;
use anyhow::{Context as AnyhowContext, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

/// Shared state behind the health and metrics endpoints.
pub struct ServerState {
    started: AtomicBool,
    metrics: Arc<Metrics>,
}

impl ServerState {
    /// Creates state that reports not-ready until [`ServerState::mark_started`].
    #[must_use]
    pub fn new(metrics: Arc<Metrics>) -> Arc<Self> {
        Arc::new(Self {
            started: AtomicBool::new(false),
            metrics,
        })
    }

    /// Marks startup complete; the readiness probe passes afterwards.
    pub fn mark_started(&self) {
        self.started.store(true, Ordering::SeqCst);
        info!("Operator marked as started");
    }

    /// Whether startup has completed.
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }
}

/// Builds the operator's HTTP router.
#[must_use]
pub fn build_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route(METRICS_SERVER_PATH, get(metrics))
        .with_state(state)
}

/// Runs the HTTP server until it fails or the process exits.
///
/// Startup is marked complete only after the listener binds, so readiness
/// probes cannot pass before the server answers.
///
/// # Errors
///
/// Returns an error when the bind address cannot be parsed or bound, or the
/// server stops serving.
pub async fn run_server(state: Arc<ServerState>, addr: &str) -> Result<()> {
    let addr: SocketAddr = addr
        .parse()
        .with_context(|| format!("parsing bind address '{addr}'"))?;
    let app = build_router(state.clone());
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    info!(%addr, "Health and metrics server listening");
    state.mark_started();

    axum::serve(listener, app)
        .await
        .context("serving health and metrics")
}

/// Liveness probe: 200 while the process is alive.
async fn healthz() -> StatusCode {
    debug!("Liveness probe: OK");
    StatusCode::OK
}

/// Readiness probe: 200 once startup completed, 503 before.
async fn readyz(State(state): State<Arc<ServerState>>) -> StatusCode {
    if state.is_started() {
        debug!("Readiness probe: OK");
        StatusCode::OK
    } else {
        debug!("Readiness probe: NOT READY (startup incomplete)");
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Prometheus exposition of the operator's registry.
async fn metrics(State(state): State<Arc<ServerState>>) -> (StatusCode, String) {
    match state.metrics.gather() {
        Ok(body) => (StatusCode::OK, body),
        Err(err) => {
            error!("Failed to gather metrics: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, String::new())
        }
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod server_tests;
