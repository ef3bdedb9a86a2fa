// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Status condition computation for `NginxIngressController` reconciliation.
//!
//! Conditions are recomputed from scratch out of the pass's
//! [`ReconcileState`], never edited incrementally: what a pass did not
//! observe reports Unknown rather than repeating a stale value.

use super::types::ReconcileState;
use crate::crd::{Condition, NginxIngressController};
use crate::reconcilers::status::create_condition;
use crate::status_reasons::{
    CONDITION_TYPE_AVAILABLE, CONDITION_TYPE_CONTROLLER_AVAILABLE,
    CONDITION_TYPE_INGRESS_CLASS_READY, CONDITION_TYPE_PROGRESSING,
    REASON_DEPLOYMENT_NOT_OBSERVED, REASON_INGRESS_CLASS_EXISTS,
    REASON_INGRESS_CLASS_NOT_OBSERVED, REASON_NOT_READY, REASON_READY,
};
use k8s_openapi::api::apps::v1::Deployment;
use kube::ResourceExt;

/// Compute the full condition set for one reconcile pass.
///
/// Order: `Available` (the roll-up), `ControllerAvailable`,
/// `IngressClassReady`, `Progressing`. Every condition carries the
/// resource's current generation.
#[must_use]
pub fn conditions_for_state(
    nic: &NginxIngressController,
    state: &ReconcileState,
) -> Vec<Condition> {
    let generation = nic.metadata.generation;

    let controller_available = deployment_condition(
        state.deployment.as_ref(),
        "Available",
        CONDITION_TYPE_CONTROLLER_AVAILABLE,
        generation,
    );
    let ingress_class_ready = ingress_class_condition(state, generation);
    let progressing = progressing_condition(state, generation);
    let available = available_condition(&controller_available, &ingress_class_ready, generation);

    vec![
        available,
        controller_available,
        ingress_class_ready,
        progressing,
    ]
}

/// Replica counts for the status block: copied from the captured Deployment,
/// zeroed when the pass never observed one.
#[must_use]
pub fn replica_counts(
    state: &ReconcileState,
) -> (Option<i32>, Option<i32>, Option<i32>, Option<i32>) {
    match state.deployment.as_ref().and_then(|d| d.status.as_ref()) {
        Some(status) => (
            Some(status.replicas.unwrap_or(0)),
            Some(status.ready_replicas.unwrap_or(0)),
            Some(status.available_replicas.unwrap_or(0)),
            Some(status.unavailable_replicas.unwrap_or(0)),
        ),
        None => (Some(0), Some(0), Some(0), Some(0)),
    }
}

/// Mirror one of the Deployment's conditions onto a resource condition.
///
/// Status, reason, and message are copied through so `kubectl describe`
/// shows what the Deployment controller itself reported. Unknown with
/// [`REASON_DEPLOYMENT_NOT_OBSERVED`] when the Deployment or the condition
/// is absent.
fn deployment_condition(
    deployment: Option<&Deployment>,
    deployment_condition_type: &str,
    condition_type: &str,
    generation: Option<i64>,
) -> Condition {
    let found = deployment
        .and_then(|d| d.status.as_ref())
        .and_then(|status| status.conditions.as_ref())
        .and_then(|conditions| {
            conditions
                .iter()
                .find(|c| c.type_ == deployment_condition_type)
        });

    match found {
        Some(condition) => create_condition(
            condition_type,
            &condition.status,
            condition.reason.as_deref().unwrap_or(deployment_condition_type),
            condition.message.as_deref().unwrap_or(""),
            generation,
        ),
        None => create_condition(
            condition_type,
            "Unknown",
            REASON_DEPLOYMENT_NOT_OBSERVED,
            "The controller Deployment was not observed this cycle",
            generation,
        ),
    }
}

/// `IngressClassReady` from IngressClass presence.
fn ingress_class_condition(state: &ReconcileState, generation: Option<i64>) -> Condition {
    match &state.ingress_class {
        Some(ingress_class) => create_condition(
            CONDITION_TYPE_INGRESS_CLASS_READY,
            "True",
            REASON_INGRESS_CLASS_EXISTS,
            &format!("IngressClass {} exists", ingress_class.name_any()),
            generation,
        ),
        None => create_condition(
            CONDITION_TYPE_INGRESS_CLASS_READY,
            "Unknown",
            REASON_INGRESS_CLASS_NOT_OBSERVED,
            "The IngressClass was not observed this cycle",
            generation,
        ),
    }
}

/// `Progressing` from the Deployment, unless an unreconcilable collision
/// forces it False with the collision's reason and message.
fn progressing_condition(state: &ReconcileState, generation: Option<i64>) -> Condition {
    if let Some(collision) = &state.unreconcilable {
        return create_condition(
            CONDITION_TYPE_PROGRESSING,
            "False",
            collision.status_reason(),
            &collision.to_string(),
            generation,
        );
    }

    deployment_condition(
        state.deployment.as_ref(),
        "Progressing",
        CONDITION_TYPE_PROGRESSING,
        generation,
    )
}

/// `Available` roll-up: True iff `ControllerAvailable` and
/// `IngressClassReady` are both True.
fn available_condition(
    controller_available: &Condition,
    ingress_class_ready: &Condition,
    generation: Option<i64>,
) -> Condition {
    if controller_available.status == "True" && ingress_class_ready.status == "True" {
        create_condition(
            CONDITION_TYPE_AVAILABLE,
            "True",
            REASON_READY,
            "NGINX ingress controller is available",
            generation,
        )
    } else {
        create_condition(
            CONDITION_TYPE_AVAILABLE,
            "False",
            REASON_NOT_READY,
            &format!(
                "ControllerAvailable is {}, IngressClassReady is {}",
                controller_available.status, ingress_class_ready.status
            ),
            generation,
        )
    }
}

#[cfg(test)]
#[path = "status_helpers_tests.rs"]
mod status_helpers_tests;
