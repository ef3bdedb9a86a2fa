// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `SecretProviderClass` placeholder pod reconciliation.
//!
//! One pass runs: fetch → match an owner reference against the registered
//! owner kinds → resolve the owner → act. An active owner gets a placeholder
//! Deployment upserted; an inactive owner gets the operator-owned placeholder
//! deleted; a missing owner or an unregistered kind is skipped. Unusable user
//! manifests surface as warning events on the owner, never as reconcile
//! failures.

pub mod deployment;
pub mod owners;

use crate::constants::{FIELD_MANAGER, KIND_SECRET_PROVIDER_CLASS, READY_REQUEUE_DURATION_SECS};
use crate::context::{warning_event, Context};
use crate::crd::SecretProviderClass;
use crate::labels::has_top_level_labels;
use crate::reconcile_errors::as_user_input_error;
use crate::reconcilers::resources::{create_or_apply, delete_if_exists};
use crate::status_reasons::REASON_INVALID_SERVICE_ACCOUNT;
use anyhow::{anyhow, Result};
use deployment::build_placeholder_deployment;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::ObjectReference;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::runtime::controller::Action;
use kube::{Api, ResourceExt};
use owners::{owner_registry, OwnerResolution, SpcOwner};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Reconciles a `SecretProviderClass` resource.
///
/// Keeps a placeholder Deployment alive for every object whose owner still
/// wants its Keyvault certificate synced, and removes the placeholder once
/// the owner stops wanting it.
///
/// # Arguments
///
/// * `ctx` - Shared reconciler context
/// * `spc` - The `SecretProviderClass` from the watch stream
///
/// # Returns
///
/// The requeue action: 5 minutes on every handled outcome, immediate
/// await-change when the object is gone.
///
/// # Example
///
/// ```rust,no_run
/// use approuting::reconcilers::reconcile_secret_provider_class;
/// use approuting::crd::SecretProviderClass;
/// use approuting::context::Context;
/// use std::sync::Arc;
///
/// async fn handle(ctx: Arc<Context>, spc: Arc<SecretProviderClass>) -> anyhow::Result<()> {
///     let action = reconcile_secret_provider_class(ctx, spc).await?;
///     println!("requeue: {action:?}");
///     Ok(())
/// }
/// ```
///
/// # Errors
///
/// Returns an error if Kubernetes API operations fail. User misconfiguration
/// (a Gateway listener naming a missing or unannotated ServiceAccount) is
/// NOT an error: it surfaces as a warning event on the owner, the placeholder
/// is cleaned up, and the pass succeeds.
pub async fn reconcile_secret_provider_class(
    ctx: Arc<Context>,
    spc: Arc<SecretProviderClass>,
) -> Result<Action> {
    let name = spc.name_any();
    let namespace = spc.namespace().unwrap_or_default();

    info!("Reconciling SecretProviderClass: {}/{}", namespace, name);

    // Always act on a fresh object; the watch event may be stale.
    let api: Api<SecretProviderClass> = Api::namespaced(ctx.client.clone(), &namespace);
    let Some(spc) = api.get_opt(&name).await? else {
        debug!(
            namespace = %namespace,
            name = %name,
            "SecretProviderClass is gone, nothing to reconcile"
        );
        return Ok(Action::await_change());
    };

    let registry = owner_registry(ctx.config.enable_gateway);
    let Some((owner, owner_ref)) = resolvable_owner(&registry, &spc) else {
        debug!(
            namespace = %namespace,
            name = %name,
            "SecretProviderClass has no resolvable owner, skipping"
        );
        return Ok(requeue());
    };

    debug!(
        namespace = %namespace,
        name = %name,
        owner_kind = owner.kind(),
        owner = %owner_ref.name,
        "Step 1: Resolving the owner"
    );

    let resolution = match owner.resolve(&ctx, &spc, &owner_ref.name).await {
        Ok(resolution) => resolution,
        Err(err) => {
            let Some(user_error) = as_user_input_error(&err) else {
                ctx.metrics
                    .record_error(KIND_SECRET_PROVIDER_CLASS, "api_error");
                return Err(err.context(format!(
                    "resolving the owner of SecretProviderClass '{namespace}/{name}'"
                )));
            };

            warn!(
                namespace = %namespace,
                name = %name,
                owner = %owner_ref.name,
                error = %user_error,
                "Owner manifest is unusable, removing the placeholder"
            );
            ctx.metrics
                .record_error(KIND_SECRET_PROVIDER_CLASS, "user_input");
            ctx.publish_event(
                &owner_object_reference(owner_ref, &namespace),
                warning_event(
                    REASON_INVALID_SERVICE_ACCOUNT,
                    "ResolveOwner",
                    user_error.to_string(),
                ),
            )
            .await;

            delete_placeholder(&ctx, &namespace, &name).await?;
            return Ok(requeue());
        }
    };

    match resolution {
        OwnerResolution::Missing => {
            debug!(
                owner = %owner_ref.name,
                owner_kind = owner.kind(),
                "Step 2: Owner is gone, skipping"
            );
            Ok(requeue())
        }
        OwnerResolution::Inactive => {
            debug!(
                namespace = %namespace,
                name = %name,
                "Step 2: Owner is inactive, removing the placeholder"
            );
            delete_placeholder(&ctx, &namespace, &name).await?;
            Ok(requeue())
        }
        OwnerResolution::Active { service_account } => {
            debug!(
                namespace = %namespace,
                name = %name,
                service_account = ?service_account,
                "Step 2: Owner is active, applying the placeholder"
            );

            let Some(desired) =
                build_placeholder_deployment(&spc, &ctx.config, service_account.as_deref())
            else {
                error!(
                    namespace = %namespace,
                    name = %name,
                    "Placeholder Deployment could not be derived from the SecretProviderClass"
                );
                ctx.metrics
                    .record_error(KIND_SECRET_PROVIDER_CLASS, "internal");
                return Err(anyhow!(
                    "failed to derive the placeholder Deployment for SecretProviderClass '{namespace}/{name}'"
                ));
            };

            create_or_apply(&ctx.client, &namespace, &desired, FIELD_MANAGER)
                .await
                .map_err(|err| {
                    ctx.metrics
                        .record_error(KIND_SECRET_PROVIDER_CLASS, "api_error");
                    err.context(format!(
                        "applying the placeholder Deployment '{namespace}/{name}'"
                    ))
                })?;
            ctx.metrics.record_resource_applied("Deployment");

            info!(
                "Reconciled placeholder Deployment {}/{} for {}",
                namespace,
                name,
                owner.kind()
            );
            Ok(requeue())
        }
    }
}

/// Finds the first owner reference handled by a registered owner kind.
pub(super) fn resolvable_owner<'a>(
    registry: &'a [Box<dyn SpcOwner + Send + Sync>],
    spc: &'a SecretProviderClass,
) -> Option<(&'a (dyn SpcOwner + Send + Sync), &'a OwnerReference)> {
    spc.metadata
        .owner_references
        .iter()
        .flatten()
        .find_map(|reference| {
            registry
                .iter()
                .find(|owner| owner.kind() == reference.kind)
                .map(|owner| (owner.as_ref(), reference))
        })
}

/// True when an existing Deployment sharing a placeholder's name was created
/// by this operator and is safe to delete.
pub(super) fn placeholder_owned_by_operator(existing: &Deployment) -> bool {
    has_top_level_labels(&existing.metadata)
}

/// Deletes the placeholder Deployment when it exists and is operator-owned.
///
/// A deployment sharing the name without the operator's labels is left
/// untouched.
async fn delete_placeholder(ctx: &Context, namespace: &str, name: &str) -> Result<()> {
    let api: Api<Deployment> = Api::namespaced(ctx.client.clone(), namespace);
    let Some(existing) = api.get_opt(name).await? else {
        return Ok(());
    };
    if !placeholder_owned_by_operator(&existing) {
        debug!(
            namespace = %namespace,
            name = %name,
            "Deployment exists but is not operator-owned, leaving it alone"
        );
        return Ok(());
    }
    delete_if_exists::<Deployment>(&ctx.client, namespace, name).await
}

/// Event target for the owner named by an owner reference.
fn owner_object_reference(reference: &OwnerReference, namespace: &str) -> ObjectReference {
    ObjectReference {
        api_version: Some(reference.api_version.clone()),
        kind: Some(reference.kind.clone()),
        name: Some(reference.name.clone()),
        namespace: Some(namespace.to_string()),
        uid: Some(reference.uid.clone()),
        ..Default::default()
    }
}

/// The uniform success requeue for this reconciler.
fn requeue() -> Action {
    Action::requeue(Duration::from_secs(READY_REQUEUE_DURATION_SECS))
}
