// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Collision detection and resolution for derived resource names.
//!
//! Every generated object except the IngressClass is named
//! `<prefix>-<count>`. When a foreign object already holds a candidate name,
//! the resolver increments the count and derives a fresh candidate set, so
//! two resources sharing a prefix settle on disjoint names. The IngressClass
//! is the exception: it is named after `ingressClassName` directly, and a
//! foreign holder is terminal.

use crate::constants::{KIND_NGINX_INGRESS_CONTROLLER, MAX_COLLISIONS};
use crate::context::Context;
use crate::crd::NginxIngressController;
use crate::labels::has_top_level_labels;
use crate::nginx_resources::{
    collision_count, is_default_nic, to_nginx_ingress_config, NginxIngressConfig,
};
use crate::reconcile_errors::CollisionError;
use anyhow::{anyhow, Result};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::{ConfigMap, Service, ServiceAccount};
use k8s_openapi::api::networking::v1::IngressClass;
use k8s_openapi::api::policy::v1::PodDisruptionBudget;
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding, Role, RoleBinding};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::{Api, Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use tracing::{debug, info};

/// What a pass over one candidate name set found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    /// Every candidate name is free or already ours.
    None,
    /// The IngressClass name is held by an object this resource does not own.
    ///
    /// Terminal: the class name never carries the count suffix, so no
    /// increment escapes it.
    IngressClass,
    /// Another candidate name is held by a foreign object.
    ///
    /// Recoverable by incrementing the collision count.
    Other,
}

/// Check whether an existing object blocks a candidate name.
///
/// An object is ours when it carries the operator's top-level labels and an
/// owner reference naming the reconciled resource's kind and name. Matching
/// by kind and name rather than uid lets a deleted and recreated resource of
/// the same name reclaim the objects it left behind.
#[must_use]
pub fn object_collides(meta: &ObjectMeta, nic_name: &str) -> bool {
    let owned = meta.owner_references.iter().flatten().any(|reference| {
        reference.kind == KIND_NGINX_INGRESS_CONTROLLER && reference.name == nic_name
    });
    !(has_top_level_labels(meta) && owned)
}

/// Check whether an existing IngressClass belongs to the named resource.
fn ingress_class_owned(existing: &IngressClass, nic_name: &str) -> bool {
    existing
        .metadata
        .owner_references
        .iter()
        .flatten()
        .any(|reference| {
            reference.kind == KIND_NGINX_INGRESS_CONTROLLER && reference.name == nic_name
        })
}

/// Fetch one candidate name and report whether a foreign object holds it.
async fn name_collides<K>(api: Api<K>, name: &str, nic_name: &str) -> Result<bool>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug,
{
    match api.get_opt(name).await? {
        None => Ok(false),
        Some(existing) => {
            let collides = object_collides(existing.meta(), nic_name);
            if collides {
                debug!(
                    kind = %K::kind(&()),
                    name = %name,
                    "Candidate name is held by a foreign object"
                );
            }
            Ok(collides)
        }
    }
}

/// Check the live cluster for objects blocking one candidate name set.
///
/// The IngressClass is checked first because a foreign holder there ends
/// resolution outright. The remaining kinds all share the count-suffixed
/// resource name and are checked in apply order; the first foreign holder
/// decides. The target Namespace is shared infrastructure and never counts
/// as a collision.
///
/// # Arguments
///
/// * `client` - Kubernetes API client
/// * `config` - Derived config for the count being probed
/// * `nic_name` - Name of the `NginxIngressController` being reconciled
///
/// # Errors
///
/// Returns an error if a Kubernetes API lookup fails.
pub async fn detect_collisions(
    client: &Client,
    config: &NginxIngressConfig,
    nic_name: &str,
) -> Result<Collision> {
    let ingress_class_api: Api<IngressClass> = Api::all(client.clone());
    if let Some(existing) = ingress_class_api
        .get_opt(&config.ingress_class_name)
        .await?
    {
        if !ingress_class_owned(&existing, nic_name) {
            debug!(
                ingress_class = %config.ingress_class_name,
                "IngressClass exists and is not owned by this resource"
            );
            return Ok(Collision::IngressClass);
        }
    }

    let name = &config.resource_name;
    let namespace = config.namespace.as_str();

    if name_collides::<ServiceAccount>(Api::namespaced(client.clone(), namespace), name, nic_name)
        .await?
        || name_collides::<ClusterRole>(Api::all(client.clone()), name, nic_name).await?
        || name_collides::<ClusterRoleBinding>(Api::all(client.clone()), name, nic_name).await?
        || name_collides::<Role>(Api::namespaced(client.clone(), namespace), name, nic_name)
            .await?
        || name_collides::<RoleBinding>(Api::namespaced(client.clone(), namespace), name, nic_name)
            .await?
        || name_collides::<ConfigMap>(Api::namespaced(client.clone(), namespace), name, nic_name)
            .await?
        || name_collides::<Service>(Api::namespaced(client.clone(), namespace), name, nic_name)
            .await?
        || name_collides::<Deployment>(Api::namespaced(client.clone(), namespace), name, nic_name)
            .await?
        || name_collides::<HorizontalPodAutoscaler>(
            Api::namespaced(client.clone(), namespace),
            name,
            nic_name,
        )
        .await?
        || name_collides::<PodDisruptionBudget>(
            Api::namespaced(client.clone(), namespace),
            name,
            nic_name,
        )
        .await?
    {
        return Ok(Collision::Other);
    }

    Ok(Collision::None)
}

/// Resolve the collision count for an `NginxIngressController`.
///
/// Starts from the count already persisted in status and walks upward until
/// a candidate name set is entirely free or ours. The returned count is
/// always greater than or equal to the starting count: names are never
/// reclaimed, even when earlier ones have since freed up, so generated
/// object names stay stable across restarts.
///
/// The default instance short-circuits to its current count: its fixed
/// resource names predate collision handling and never shift.
///
/// Callers hold the per-prefix lock across this call and the persistence of
/// a changed count.
///
/// # Arguments
///
/// * `ctx` - Shared reconciler context
/// * `nic` - The resource being reconciled
///
/// # Returns
///
/// The first collision-free count.
///
/// # Errors
///
/// Returns [`CollisionError::IngressClassCollision`] when the IngressClass
/// name is foreign-held, [`CollisionError::MaxCollisionsReached`] when the
/// count passes its ceiling, or a Kubernetes API error from a lookup.
pub async fn resolve_collision_count(
    ctx: &Context,
    nic: &NginxIngressController,
) -> Result<i32> {
    let name = nic.name_any();

    if is_default_nic(nic) {
        debug!(name = %name, "Default instance is exempt from collision checks");
        return Ok(collision_count(nic));
    }

    let start = collision_count(nic);
    let mut count = start;

    loop {
        let config = to_nginx_ingress_config(nic, &ctx.config, count).ok_or_else(|| {
            anyhow!(
                "NginxIngressController '{name}' is missing identity fields required to derive resource names"
            )
        })?;

        match detect_collisions(&ctx.client, &config, &name).await? {
            Collision::None => {
                if count != start {
                    info!(
                        "Resolved collisions for {} at count {} (started at {})",
                        name, count, start
                    );
                }
                return Ok(count);
            }
            Collision::IngressClass => {
                return Err(CollisionError::IngressClassCollision {
                    ingress_class: config.ingress_class_name.clone(),
                    name,
                }
                .into());
            }
            Collision::Other => {
                count += 1;
                if count > MAX_COLLISIONS {
                    return Err(CollisionError::MaxCollisionsReached {
                        prefix: nic.spec.controller_name_prefix.clone(),
                        count,
                    }
                    .into());
                }
                debug!(
                    name = %name,
                    count,
                    "Candidate names are taken, retrying with the next count"
                );
            }
        }
    }
}

#[cfg(test)]
#[path = "collision_tests.rs"]
mod collision_tests;
