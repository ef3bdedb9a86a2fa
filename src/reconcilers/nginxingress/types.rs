// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Types used in `NginxIngressController` reconciliation.

use crate::crd::ManagedObjectReference;
use crate::reconcile_errors::CollisionError;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::networking::v1::IngressClass;

/// What one reconcile pass actually observed.
///
/// The status update at the end of every pass is computed from this value
/// alone. Fields stay `None` when the pass ended before the corresponding
/// object was applied, and the matching conditions report Unknown.
#[derive(Debug, Default)]
pub struct ReconcileState {
    /// The controller Deployment as returned by the API server, live status
    /// included.
    pub deployment: Option<Deployment>,

    /// The IngressClass as returned by the API server.
    pub ingress_class: Option<IngressClass>,

    /// References to every applied labeled object, in apply order.
    ///
    /// `None` until the full set applied successfully; the status keeps its
    /// previous references after a partial apply.
    pub managed_refs: Option<Vec<ManagedObjectReference>>,

    /// A collision no controller action can resolve.
    ///
    /// Forces `Progressing=False` with the collision's reason in the status
    /// update.
    pub unreconcilable: Option<CollisionError>,
}
