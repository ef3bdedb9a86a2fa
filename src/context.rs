// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context for all controllers.
//!
//! This module provides the state handed to every reconciler as an
//! `Arc<Context>`:
//! - Kubernetes client
//! - Parsed operator configuration
//! - Metrics registry
//! - Kubernetes event recorder
//! - Keyed locks serializing collision resolution per controller name prefix

use crate::config::OperatorConfig;
use crate::labels::MANAGED_BY_OPERATOR;
use crate::metrics::Metrics;
use crate::reconcilers::locks::KeyedMutexSet;
use k8s_openapi::api::core::v1::ObjectReference;
use kube::runtime::events::{Event, EventType, Recorder};
use kube::Client;
use std::sync::Arc;
use tracing::warn;

/// Shared context passed to all controllers.
///
/// This context provides access to:
/// - Kubernetes client for API operations
/// - Operator configuration resolved at startup
/// - Metrics for observability
/// - Event recorder for surfacing reconcile outcomes on resources
#[derive(Clone)]
pub struct Context {
    /// Kubernetes client for API operations
    pub client: Client,

    /// Operator configuration resolved from CLI flags and environment
    pub config: OperatorConfig,

    /// Metrics registry for observability
    pub metrics: Arc<Metrics>,

    /// Kubernetes event recorder
    pub recorder: Recorder,

    /// Per-prefix locks serializing collision-count resolution.
    ///
    /// Two `NginxIngressController`s sharing a `controller_name_prefix`
    /// must not resolve collision counts concurrently, otherwise both can
    /// claim the same suffixed resource name.
    pub prefix_locks: Arc<KeyedMutexSet>,
}

impl Context {
    /// Create a new shared context.
    ///
    /// # Arguments
    ///
    /// * `client` - Kubernetes API client
    /// * `config` - Parsed operator configuration
    /// * `metrics` - Metrics registry shared with the HTTP server
    ///
    /// # Returns
    ///
    /// An `Arc<Context>` ready to hand to the controllers
    #[must_use]
    pub fn new(client: Client, config: OperatorConfig, metrics: Arc<Metrics>) -> Arc<Context> {
        Arc::new(Context {
            recorder: Recorder::new(client.clone(), MANAGED_BY_OPERATOR.into()),
            client,
            config,
            metrics,
            prefix_locks: Arc::new(KeyedMutexSet::new()),
        })
    }

    /// Publish a Kubernetes event for the referenced object.
    ///
    /// Event delivery is best-effort: failures are logged and swallowed so
    /// that a flaky events API never fails a reconciliation that otherwise
    /// succeeded.
    ///
    /// # Arguments
    ///
    /// * `reference` - Object the event is attached to
    /// * `event` - Event payload built with [`warning_event`] or [`normal_event`]
    pub async fn publish_event(&self, reference: &ObjectReference, event: Event) {
        if let Err(err) = self.recorder.publish(&event, reference).await {
            warn!(
                error = %err,
                reason = %event.reason,
                "Failed to publish Kubernetes event"
            );
        }
    }
}

/// Build a Warning event payload.
///
/// # Arguments
///
/// * `reason` - Machine-readable reason (for example `IngressClassCollision`)
/// * `action` - Action the controller was taking when the event occurred
/// * `note` - Human-readable message shown by `kubectl describe`
#[must_use]
pub fn warning_event(reason: &str, action: &str, note: String) -> Event {
    Event {
        type_: EventType::Warning,
        reason: reason.to_string(),
        note: Some(note),
        action: action.to_string(),
        secondary: None,
    }
}

/// Build a Normal event payload.
///
/// # Arguments
///
/// * `reason` - Machine-readable reason (for example `ResourcesApplied`)
/// * `action` - Action the controller was taking when the event occurred
/// * `note` - Human-readable message shown by `kubectl describe`
#[must_use]
pub fn normal_event(reason: &str, action: &str, note: String) -> Event {
    Event {
        type_: EventType::Normal,
        reason: reason.to_string(),
        note: Some(note),
        action: action.to_string(),
        secondary: None,
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod context_tests;
