// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `NginxIngressController` reconciliation logic.
//!
//! One pass runs: fetch → resolve collisions (under the per-prefix lock) →
//! derive the object set → apply → update status. A changed collision count
//! is persisted to status before any object is created, then the pass
//! requeues immediately and re-enters with the durable count. Every exit
//! path after a successful fetch writes status from what the pass actually
//! observed.

pub mod collision;
pub mod resources;
pub mod status_helpers;
pub mod types;

use crate::constants::{
    KIND_NGINX_INGRESS_CONTROLLER, READY_REQUEUE_DURATION_SECS,
    UNRECONCILABLE_REQUEUE_DURATION_SECS, UNREADY_REQUEUE_DURATION_SECS,
};
use crate::context::{warning_event, Context};
use crate::crd::NginxIngressController;
use crate::nginx_resources::{build_managed_resources, collision_count, to_nginx_ingress_config};
use crate::reconcile_errors::{as_collision_error, CollisionError};
use crate::reconcilers::status::{condition_is_true, NginxIngressStatusUpdater};
use crate::status_reasons::CONDITION_TYPE_AVAILABLE;
use anyhow::{anyhow, Result};
use collision::resolve_collision_count;
use kube::runtime::controller::Action;
use kube::{Api, Resource, ResourceExt};
use resources::apply_managed_resources;
use status_helpers::{conditions_for_state, replica_counts};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use types::ReconcileState;

/// Reconciles an `NginxIngressController` resource.
///
/// Materializes the full nginx ingress controller installation for the
/// resource: Namespace (created if absent), IngressClass, RBAC,
/// `ConfigMap`, `LoadBalancer` Service, Deployment, HPA and PDB, then
/// reports readiness through status conditions.
///
/// # Arguments
///
/// * `ctx` - Shared reconciler context
/// * `nic` - The `NginxIngressController` from the watch stream
///
/// # Returns
///
/// The requeue action: 5 minutes when `Available=True`, 30 seconds while
/// not yet available, ~1 minute after an unreconcilable collision, and
/// immediate after persisting a changed collision count.
///
/// # Example
///
/// ```rust,no_run
/// use approuting::reconcilers::reconcile_nginx_ingress_controller;
/// use approuting::crd::NginxIngressController;
/// use approuting::context::Context;
/// use std::sync::Arc;
///
/// async fn handle(ctx: Arc<Context>, nic: Arc<NginxIngressController>) -> anyhow::Result<()> {
///     let action = reconcile_nginx_ingress_controller(ctx, nic).await?;
///     println!("requeue: {action:?}");
///     Ok(())
/// }
/// ```
///
/// # Errors
///
/// Returns an error if Kubernetes API operations fail. Unreconcilable
/// collisions are NOT errors: they surface as a warning event plus
/// `Progressing=False` and retry on a fixed delay.
pub async fn reconcile_nginx_ingress_controller(
    ctx: Arc<Context>,
    nic: Arc<NginxIngressController>,
) -> Result<Action> {
    let name = nic.name_any();

    info!("Reconciling NginxIngressController: {}", name);
    debug!(
        name = %name,
        generation = ?nic.metadata.generation,
        "Starting NginxIngressController reconciliation"
    );

    // Always act on a fresh object; the watch event may be stale.
    let api: Api<NginxIngressController> = Api::all(ctx.client.clone());
    let Some(nic) = api.get_opt(&name).await? else {
        debug!(name = %name, "NginxIngressController is gone, nothing to reconcile");
        return Ok(Action::await_change());
    };

    let mut state = ReconcileState::default();

    // The lock covers the naming decision only: resolution plus persistence
    // of a changed count. Object application runs outside it and relies on
    // server-side apply idempotence.
    {
        let _guard = ctx
            .prefix_locks
            .lock(&nic.spec.controller_name_prefix)
            .await;

        match resolve_collision_count(&ctx, &nic).await {
            Ok(count) if count != collision_count(&nic) => {
                info!(
                    "Collision count for {} moved to {}, persisting it before creating any object",
                    name, count
                );
                let mut updater = NginxIngressStatusUpdater::new(&nic);
                updater.set_collision_count(count);
                updater.apply(&ctx.client).await?;
                ctx.metrics.record_collision_resolution("resolved");

                // Re-enter with the persisted count; the claim is durable now.
                return Ok(Action::requeue(Duration::ZERO));
            }
            Ok(_) => {
                ctx.metrics.record_collision_resolution("none");
            }
            Err(err) => {
                let Some(collision) = as_collision_error(&err) else {
                    if let Err(status_err) = update_status(&ctx, &nic, &state).await {
                        warn!(
                            error = %status_err,
                            "Status update failed while surfacing a reconcile error"
                        );
                    }
                    return Err(err.context(format!("resolving collisions for '{name}'")));
                };

                warn!(
                    name = %name,
                    error = %err,
                    "Unreconcilable collision, waiting for cluster state to change"
                );
                ctx.metrics
                    .record_collision_resolution(collision_metric_outcome(collision));
                ctx.metrics
                    .record_error(KIND_NGINX_INGRESS_CONTROLLER, "collision");
                ctx.publish_event(
                    &nic.object_ref(&()),
                    warning_event(
                        collision.status_reason(),
                        "ResolveCollisions",
                        err.to_string(),
                    ),
                )
                .await;

                state.unreconcilable = Some(collision.clone());
                update_status(&ctx, &nic, &state).await?;
                return Ok(Action::requeue(Duration::from_secs(
                    UNRECONCILABLE_REQUEUE_DURATION_SECS,
                )));
            }
        }
    }

    // Compute the desired object set from the settled count.
    let count = collision_count(&nic);
    let resource_set = match to_nginx_ingress_config(&nic, &ctx.config, count)
        .and_then(|config| build_managed_resources(&config))
    {
        Some(set) => set,
        None => {
            // The builder yields None for malformed identity, never a
            // partial set. Existing objects are left untouched.
            error!(
                name = %name,
                "Managed object set could not be derived, leaving existing objects alone"
            );
            ctx.metrics
                .record_error(KIND_NGINX_INGRESS_CONTROLLER, "internal");
            let err = anyhow!(
                "failed to derive the managed object set for NginxIngressController '{name}'"
            );
            if let Err(status_err) = update_status(&ctx, &nic, &state).await {
                warn!(
                    error = %status_err,
                    "Status update failed while surfacing a reconcile error"
                );
            }
            return Err(err);
        }
    };

    if let Err(err) = apply_managed_resources(&ctx, &nic, &resource_set, &mut state).await {
        ctx.metrics
            .record_error(KIND_NGINX_INGRESS_CONTROLLER, "api_error");
        if let Err(status_err) = update_status(&ctx, &nic, &state).await {
            warn!(
                error = %status_err,
                "Status update failed while surfacing a reconcile error"
            );
        }
        return Err(err);
    }

    let available = update_status(&ctx, &nic, &state).await?;

    let requeue_secs = if available {
        READY_REQUEUE_DURATION_SECS
    } else {
        UNREADY_REQUEUE_DURATION_SECS
    };
    info!(
        "Successfully reconciled NginxIngressController {} (available: {}, requeue in {}s)",
        name, available, requeue_secs
    );
    Ok(Action::requeue(Duration::from_secs(requeue_secs)))
}

/// Write the status computed from one pass's observations.
///
/// Conditions, replica counts, managed references and the observed
/// generation all come from `state`; the write is skipped when nothing
/// changed semantically. Returns whether the pass reported
/// `Available=True`.
async fn update_status(
    ctx: &Context,
    nic: &NginxIngressController,
    state: &ReconcileState,
) -> Result<bool> {
    let conditions = conditions_for_state(nic, state);
    let available = condition_is_true(&conditions, CONDITION_TYPE_AVAILABLE);

    let mut updater = NginxIngressStatusUpdater::new(nic);
    for condition in conditions {
        updater.set_condition(condition);
    }
    if let Some(refs) = &state.managed_refs {
        updater.set_managed_resource_refs(refs.clone());
    }
    let (replicas, ready, available_replicas, unavailable) = replica_counts(state);
    updater.set_controller_replicas(replicas, ready, available_replicas, unavailable);
    updater.set_observed_generation(nic.metadata.generation);
    updater.apply(&ctx.client).await?;

    Ok(available)
}

/// Metric label for one unreconcilable collision outcome.
fn collision_metric_outcome(collision: &CollisionError) -> &'static str {
    match collision {
        CollisionError::IngressClassCollision { .. } => "ingress_class",
        CollisionError::MaxCollisionsReached { .. } => "max_collisions",
    }
}
