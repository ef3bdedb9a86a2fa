// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation error types for the app routing operator.
//!
//! This module provides the typed error taxonomy reconcilers rely on:
//! - Collision errors: naming collisions that no amount of retrying resolves
//! - User input errors: misconfiguration the user must fix, reported through
//!   events and treated as reconcile success
//!
//! Reconcilers orchestrate with `anyhow`, so classification inspects the
//! error chain by downcast rather than by matching on rendered strings.
//! Wrapping a typed error with `.context(...)` never changes how it
//! classifies.

use thiserror::Error;

use crate::status_reasons::{REASON_INGRESS_CLASS_COLLISION, REASON_TOO_MANY_COLLISIONS};

/// Naming collisions that cannot be resolved by incrementing the collision
/// count.
///
/// These end the current reconcile cycle with a warning event and a
/// `Progressing=False` condition, then retry on a fixed delay: the cluster
/// state may change (the squatting object may be deleted), but no controller
/// action can force progress.
#[derive(Error, Debug, Clone)]
pub enum CollisionError {
    /// The IngressClass name is held by an object this resource does not own.
    ///
    /// The IngressClass is named after `ingressClassName` directly, with no
    /// collision-count suffix, so a foreign holder blocks the resource until
    /// the user picks a different class name or removes the holder.
    #[error(
        "IngressClass '{ingress_class}' already exists and is not owned by \
         NginxIngressController '{name}'"
    )]
    IngressClassCollision {
        /// The contested IngressClass name
        ingress_class: String,
        /// The NginxIngressController requesting the class
        name: String,
    },

    /// The collision count passed its ceiling without finding a free name set.
    ///
    /// Indicates something is squatting on the entire derived name range;
    /// further increments will not converge.
    #[error(
        "collision count for controller name prefix '{prefix}' reached {count} \
         without finding an unclaimed resource name"
    )]
    MaxCollisionsReached {
        /// The controller name prefix being suffixed
        prefix: String,
        /// The count at which resolution gave up
        count: i32,
    },
}

impl CollisionError {
    /// Returns the Kubernetes status reason code for this error.
    ///
    /// Used for the forced `Progressing=False` condition and the warning
    /// event emitted when the collision is detected.
    #[must_use]
    pub fn status_reason(&self) -> &'static str {
        match self {
            Self::IngressClassCollision { .. } => REASON_INGRESS_CLASS_COLLISION,
            Self::MaxCollisionsReached { .. } => REASON_TOO_MANY_COLLISIONS,
        }
    }
}

/// Misconfiguration supplied by the user.
///
/// These are reported as warning events on the object the user controls and
/// then treated as reconcile success: retrying cannot fix someone else's
/// manifest, and backing off would only delay the next useful observation.
#[derive(Error, Debug, Clone)]
pub enum UserInputError {
    /// A Gateway listener names a ServiceAccount that is missing or lacks the
    /// workload identity client-id annotation.
    #[error("ServiceAccount '{namespace}/{name}' is not usable for Keyvault access: {reason}")]
    InvalidServiceAccount {
        /// The ServiceAccount name from the listener's TLS options
        name: String,
        /// Namespace of the ServiceAccount
        namespace: String,
        /// What is wrong with it
        reason: String,
    },

    /// A Gateway listener enables a Keyvault certificate but its TLS options
    /// name no ServiceAccount to fetch it with.
    #[error(
        "Gateway '{gateway}' listener '{listener}' enables a Keyvault certificate but names no ServiceAccount option"
    )]
    MissingServiceAccountOption {
        /// The Gateway with the misconfigured listener
        gateway: String,
        /// The listener carrying the Keyvault certificate option
        listener: String,
    },
}

/// Finds a [`CollisionError`] anywhere in an `anyhow` error chain.
///
/// Context wrapping between the reconciler and the call site does not hide
/// the typed error from classification.
#[must_use]
pub fn as_collision_error(err: &anyhow::Error) -> Option<&CollisionError> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<CollisionError>())
}

/// Finds a [`UserInputError`] anywhere in an `anyhow` error chain.
#[must_use]
pub fn as_user_input_error(err: &anyhow::Error) -> Option<&UserInputError> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<UserInputError>())
}

/// Returns true when a Kubernetes API error is a plain 404.
///
/// Used on delete paths where a missing object means the work is already
/// done.
#[must_use]
pub fn is_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(api_err) if api_err.code == 404)
}

/// Returns true when a create was rejected because the object already exists.
///
/// Used on create-if-absent paths where losing a create race is not an error.
#[must_use]
pub fn is_already_exists(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(api_err) if api_err.code == 409 && api_err.reason == "AlreadyExists")
}
