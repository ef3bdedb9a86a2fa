// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Standard Kubernetes status condition types and reasons for operator resources.
//!
//! This module defines constants for condition types and reasons following
//! Kubernetes conventions. Reasons are programmatic identifiers in CamelCase
//! that explain why a condition has a particular status.
//!
//! # Condition Types
//!
//! `NginxIngressController` tracks four conditions:
//!
//! - **`Available`** — overall readiness roll-up. True iff `ControllerAvailable`
//!   and `IngressClassReady` are both True.
//! - **`ControllerAvailable`** — mapped from the managed Deployment's
//!   `Available` condition; Unknown when the Deployment was not observed.
//! - **`IngressClassReady`** — True when the IngressClass exists; Unknown when
//!   it was not observed.
//! - **`Progressing`** — mapped from the Deployment's `Progressing` condition;
//!   forced to False with a collision reason on unreconcilable errors.
//!
//! # Example Status
//!
//! ```yaml
//! status:
//!   collisionCount: 1
//!   conditions:
//!     - type: Available
//!       status: "True"
//!       reason: Ready
//!       message: "NGINX ingress controller is available"
//!     - type: ControllerAvailable
//!       status: "True"
//!       reason: MinimumReplicasAvailable
//!       message: "Deployment has minimum availability."
//!     - type: IngressClassReady
//!       status: "True"
//!       reason: IngressClassExists
//!       message: "IngressClass nginx-internal exists"
//!     - type: Progressing
//!       status: "True"
//!       reason: NewReplicaSetAvailable
//!       message: "ReplicaSet \"nic1-1-5d9c8\" has successfully progressed."
//! ```

// ============================================================================
// Condition Types
// ============================================================================

/// Overall readiness roll-up condition.
pub const CONDITION_TYPE_AVAILABLE: &str = "Available";

/// Condition mirroring the managed Deployment's `Available` condition.
pub const CONDITION_TYPE_CONTROLLER_AVAILABLE: &str = "ControllerAvailable";

/// Condition reporting whether the controller's IngressClass exists.
pub const CONDITION_TYPE_INGRESS_CLASS_READY: &str = "IngressClassReady";

/// Condition mirroring the managed Deployment's `Progressing` condition.
pub const CONDITION_TYPE_PROGRESSING: &str = "Progressing";

// ============================================================================
// Roll-Up Reasons
// ============================================================================

/// Controller Deployment and IngressClass are both ready.
pub const REASON_READY: &str = "Ready";

/// At least one of the controller Deployment and IngressClass is not ready.
pub const REASON_NOT_READY: &str = "NotReady";

// ============================================================================
// Observation Reasons
// ============================================================================

/// The managed Deployment was not observed this reconcile cycle.
///
/// Set on `ControllerAvailable` and `Progressing` with status Unknown when
/// reconciliation ended before the Deployment was applied, or the API server
/// returned it without conditions.
pub const REASON_DEPLOYMENT_NOT_OBSERVED: &str = "DeploymentNotObserved";

/// The IngressClass exists in the cluster.
pub const REASON_INGRESS_CLASS_EXISTS: &str = "IngressClassExists";

/// The IngressClass was not observed this reconcile cycle.
pub const REASON_INGRESS_CLASS_NOT_OBSERVED: &str = "IngressClassNotObserved";

// ============================================================================
// Collision Reasons
// ============================================================================

/// The IngressClass name is taken by an object this resource does not own.
///
/// Terminal: the IngressClass name never includes the collision count, so
/// incrementing the count cannot resolve it. The user must pick a different
/// `ingressClassName` or delete the squatting object.
pub const REASON_INGRESS_CLASS_COLLISION: &str = "IngressClassCollision";

/// The collision count passed its ceiling without finding free names.
pub const REASON_TOO_MANY_COLLISIONS: &str = "TooManyCollisions";

// ============================================================================
// Event Reasons
// ============================================================================

/// Applying one of the managed objects failed; remaining objects were skipped.
pub const REASON_APPLY_FAILED: &str = "ApplyFailed";

/// A Gateway listener referenced a ServiceAccount that is missing or lacks
/// the workload identity client-id annotation.
pub const REASON_INVALID_SERVICE_ACCOUNT: &str = "InvalidServiceAccount";
