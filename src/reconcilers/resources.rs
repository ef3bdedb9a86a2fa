// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Generic resource creation and update helpers for Kubernetes resources.
//!
//! This module provides reusable functions for creating and updating Kubernetes
//! resources with server-side apply. It eliminates duplicate create/update code
//! across reconcilers.
//!
//! All apply helpers return the object as the API server now sees it, so
//! callers can read live status (Deployment replica counts, IngressClass
//! controller) from the same call that wrote the spec.
//!
//! # Strategies
//!
//! - **Apply**: Server-side apply (SSA) for idempotent updates
//! - **Create if absent**: Create only, never modify an existing object
//! - **Delete if exists**: Delete tolerating `NotFound`
//!
//! # Example
//!
//! ```rust,no_run
//! use approuting::reconcilers::resources::create_or_apply;
//! use k8s_openapi::api::core::v1::ServiceAccount;
//! use kube::Client;
//! use anyhow::Result;
//!
//! async fn example(client: &Client, namespace: &str, sa: ServiceAccount) -> Result<()> {
//!     let applied = create_or_apply(client, namespace, &sa, "approuting").await?;
//!     println!("applied {:?}", applied.metadata.name);
//!     Ok(())
//! }
//! ```

use anyhow::Result;
use kube::api::{DeleteParams, Patch, PatchParams, PostParams};
use kube::core::{ClusterResourceScope, NamespaceResourceScope};
use kube::{Api, Client, Resource, ResourceExt};
use tracing::{debug, info};

use crate::reconcile_errors::{is_already_exists, is_not_found};

/// Create or update a namespaced resource using server-side apply strategy.
///
/// This function checks if the resource exists. If it does, it patches using
/// server-side apply (SSA). Otherwise, it creates the resource.
///
/// Server-side apply is the recommended approach for managing resources in modern
/// Kubernetes as it provides better conflict resolution and field ownership tracking.
/// The patch is forced: fields this operator applies belong to this operator, and
/// manual edits to them are overwritten on the next cycle.
///
/// # Arguments
///
/// * `client` - Kubernetes API client
/// * `namespace` - Namespace where the resource should be created/updated
/// * `resource` - The resource to create or update
/// * `field_manager` - Field manager name for server-side apply (e.g., "approuting")
///
/// # Returns
///
/// The object as persisted by the API server, including live status.
///
/// # Errors
///
/// Returns an error if:
/// - The resource has no name in its metadata
/// - API operations fail
pub async fn create_or_apply<T>(
    client: &Client,
    namespace: &str,
    resource: &T,
    field_manager: &str,
) -> Result<T>
where
    T: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + ResourceExt
        + Clone
        + std::fmt::Debug
        + serde::Serialize
        + for<'de> serde::Deserialize<'de>,
{
    let name = resource
        .meta()
        .name
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("Resource must have a name"))?;

    let api: Api<T> = Api::namespaced(client.clone(), namespace);

    debug!(
        namespace = %namespace,
        name = %name,
        kind = %T::kind(&()),
        "Creating or updating resource with Apply strategy"
    );

    if api.get(name).await.is_ok() {
        debug!(
            "{} {}/{} already exists, applying update",
            T::kind(&()),
            namespace,
            name
        );
        let applied = api
            .patch(
                name,
                &PatchParams::apply(field_manager).force(),
                &Patch::Apply(resource),
            )
            .await?;
        info!("Updated {} {}/{}", T::kind(&()), namespace, name);
        Ok(applied)
    } else {
        debug!(
            "{} {}/{} does not exist, creating",
            T::kind(&()),
            namespace,
            name
        );
        let created = api.create(&PostParams::default(), resource).await?;
        info!("Created {} {}/{}", T::kind(&()), namespace, name);
        Ok(created)
    }
}

/// Create or update a cluster-scoped resource using server-side apply strategy.
///
/// Cluster-scoped twin of [`create_or_apply`] for resources such as
/// `IngressClass`, `ClusterRole`, and `ClusterRoleBinding`.
///
/// # Errors
///
/// Returns an error if:
/// - The resource has no name in its metadata
/// - API operations fail
pub async fn create_or_apply_cluster<T>(
    client: &Client,
    resource: &T,
    field_manager: &str,
) -> Result<T>
where
    T: Resource<DynamicType = (), Scope = ClusterResourceScope>
        + ResourceExt
        + Clone
        + std::fmt::Debug
        + serde::Serialize
        + for<'de> serde::Deserialize<'de>,
{
    let name = resource
        .meta()
        .name
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("Resource must have a name"))?;

    let api: Api<T> = Api::all(client.clone());

    debug!(
        name = %name,
        kind = %T::kind(&()),
        "Creating or updating cluster-scoped resource with Apply strategy"
    );

    if api.get(name).await.is_ok() {
        debug!("{} {} already exists, applying update", T::kind(&()), name);
        let applied = api
            .patch(
                name,
                &PatchParams::apply(field_manager).force(),
                &Patch::Apply(resource),
            )
            .await?;
        info!("Updated {} {}", T::kind(&()), name);
        Ok(applied)
    } else {
        debug!("{} {} does not exist, creating", T::kind(&()), name);
        let created = api.create(&PostParams::default(), resource).await?;
        info!("Created {} {}", T::kind(&()), name);
        Ok(created)
    }
}

/// Create a cluster-scoped resource only if it does not already exist.
///
/// An existing object is returned untouched, whatever its content. Used for
/// objects the operator must never adopt or overwrite: the target Namespace
/// and the bootstrapped default `NginxIngressController`.
///
/// # Errors
///
/// Returns an error if:
/// - The resource has no name in its metadata
/// - API operations fail for a reason other than a create/create race
pub async fn create_if_absent_cluster<T>(client: &Client, resource: &T) -> Result<T>
where
    T: Resource<DynamicType = (), Scope = ClusterResourceScope>
        + ResourceExt
        + Clone
        + std::fmt::Debug
        + serde::Serialize
        + for<'de> serde::Deserialize<'de>,
{
    let name = resource
        .meta()
        .name
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("Resource must have a name"))?;

    let api: Api<T> = Api::all(client.clone());

    if let Some(existing) = api.get_opt(name).await? {
        debug!("{} {} already exists, leaving it as is", T::kind(&()), name);
        return Ok(existing);
    }

    match api.create(&PostParams::default(), resource).await {
        Ok(created) => {
            info!("Created {} {}", T::kind(&()), name);
            Ok(created)
        }
        // Lost a create race; the winner's object is the one to keep.
        Err(e) if is_already_exists(&e) => Ok(api.get(name).await?),
        Err(e) => Err(e.into()),
    }
}

/// Delete a namespaced resource, tolerating `NotFound`.
///
/// # Errors
///
/// Returns an error if the delete fails for any reason other than the object
/// already being gone.
pub async fn delete_if_exists<T>(client: &Client, namespace: &str, name: &str) -> Result<()>
where
    T: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + ResourceExt
        + Clone
        + std::fmt::Debug
        + serde::Serialize
        + for<'de> serde::Deserialize<'de>,
{
    let api: Api<T> = Api::namespaced(client.clone(), namespace);

    match api.delete(name, &DeleteParams::default()).await {
        Ok(_) => {
            info!("Deleted {} {}/{}", T::kind(&()), namespace, name);
            Ok(())
        }
        Err(e) if is_not_found(&e) => {
            debug!("{} {}/{} already gone", T::kind(&()), namespace, name);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[path = "resources_tests.rs"]
mod resources_tests;
