// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Application of the managed object set.
//!
//! Objects are applied in dependency order: Namespace first, then the
//! IngressClass, RBAC, config, networking, the controller Deployment, and
//! finally autoscaling. Everything except the Namespace goes through
//! server-side apply under the operator's field manager.

use super::types::ReconcileState;
use crate::constants::FIELD_MANAGER;
use crate::context::{warning_event, Context};
use crate::crd::NginxIngressController;
use crate::nginx_resources::ManagedResourceSet;
use crate::reconcilers::resources::{
    create_if_absent_cluster, create_or_apply, create_or_apply_cluster,
};
use crate::status_reasons::REASON_APPLY_FAILED;
use anyhow::Result;
use kube::core::{ClusterResourceScope, NamespaceResourceScope};
use kube::{Resource, ResourceExt};
use tracing::{debug, info, warn};

/// Apply every object in the managed set.
///
/// The Namespace is only created when absent, never adopted or relabeled.
/// The applied IngressClass and Deployment (as returned by the API server,
/// live status included) land in `state` for status computation, and the
/// reference list is rebuilt wholesale once the full set applied. The first
/// failure publishes a warning event naming the object, skips the remaining
/// objects, and propagates.
///
/// # Arguments
///
/// * `ctx` - Shared reconciler context
/// * `nic` - The resource owning the set, target of warning events
/// * `resources` - The generated object set
/// * `state` - Observation state updated as objects apply
///
/// # Errors
///
/// Returns the first apply error, with the object kind and name attached.
pub async fn apply_managed_resources(
    ctx: &Context,
    nic: &NginxIngressController,
    resources: &ManagedResourceSet,
    state: &mut ReconcileState,
) -> Result<()> {
    debug!("Step 1: Ensuring target Namespace exists");
    if let Err(err) = create_if_absent_cluster(&ctx.client, &resources.namespace).await {
        return Err(apply_failure(ctx, nic, "Namespace", &resources.namespace.name_any(), err).await);
    }

    debug!("Step 2: Applying IngressClass");
    let ingress_class = apply_cluster_object(ctx, nic, &resources.ingress_class).await?;
    state.ingress_class = Some(ingress_class);

    debug!("Step 3: Applying RBAC objects");
    apply_namespaced_object(ctx, nic, &resources.service_account).await?;
    apply_cluster_object(ctx, nic, &resources.cluster_role).await?;
    apply_cluster_object(ctx, nic, &resources.cluster_role_binding).await?;
    apply_namespaced_object(ctx, nic, &resources.role).await?;
    apply_namespaced_object(ctx, nic, &resources.role_binding).await?;

    debug!("Step 4: Applying ConfigMap and Service");
    apply_namespaced_object(ctx, nic, &resources.config_map).await?;
    apply_namespaced_object(ctx, nic, &resources.service).await?;

    debug!("Step 5: Applying controller Deployment");
    let deployment = apply_namespaced_object(ctx, nic, &resources.deployment).await?;
    state.deployment = Some(deployment);

    debug!("Step 6: Applying autoscaler and disruption budget");
    apply_namespaced_object(ctx, nic, &resources.horizontal_pod_autoscaler).await?;
    apply_namespaced_object(ctx, nic, &resources.pod_disruption_budget).await?;

    state.managed_refs = Some(resources.object_refs());

    info!(
        "Applied all managed objects for NginxIngressController {}",
        nic.name_any()
    );
    Ok(())
}

/// Server-side apply one cluster-scoped object, returning the live result.
async fn apply_cluster_object<T>(
    ctx: &Context,
    nic: &NginxIngressController,
    object: &T,
) -> Result<T>
where
    T: Resource<DynamicType = (), Scope = ClusterResourceScope>
        + ResourceExt
        + Clone
        + std::fmt::Debug
        + serde::Serialize
        + for<'de> serde::Deserialize<'de>,
{
    let kind = T::kind(&());
    match create_or_apply_cluster(&ctx.client, object, FIELD_MANAGER).await {
        Ok(applied) => {
            ctx.metrics.record_resource_applied(&kind);
            Ok(applied)
        }
        Err(err) => Err(apply_failure(ctx, nic, &kind, &object.name_any(), err).await),
    }
}

/// Server-side apply one namespaced object, returning the live result.
async fn apply_namespaced_object<T>(
    ctx: &Context,
    nic: &NginxIngressController,
    object: &T,
) -> Result<T>
where
    T: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + ResourceExt
        + Clone
        + std::fmt::Debug
        + serde::Serialize
        + for<'de> serde::Deserialize<'de>,
{
    let kind = T::kind(&());
    let namespace = object.namespace().unwrap_or_default();
    match create_or_apply(&ctx.client, &namespace, object, FIELD_MANAGER).await {
        Ok(applied) => {
            ctx.metrics.record_resource_applied(&kind);
            Ok(applied)
        }
        Err(err) => Err(apply_failure(ctx, nic, &kind, &object.name_any(), err).await),
    }
}

/// Report one failed apply: structured log, warning event, error context.
async fn apply_failure(
    ctx: &Context,
    nic: &NginxIngressController,
    kind: &str,
    name: &str,
    err: anyhow::Error,
) -> anyhow::Error {
    warn!(
        kind = %kind,
        name = %name,
        error = %err,
        "Failed to apply managed object, skipping the rest of the set"
    );
    ctx.publish_event(
        &nic.object_ref(&()),
        warning_event(
            REASON_APPLY_FAILED,
            "Reconcile",
            format!("Failed to apply {kind} {name}: {err}"),
        ),
    )
    .await;
    err.context(format!("applying {kind} {name}"))
}

#[cfg(test)]
#[path = "resources_tests.rs"]
mod resources_tests;
