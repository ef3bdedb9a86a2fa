// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `status_helpers.rs`

#[cfg(test)]
mod tests {
    use super::super::{conditions_for_state, replica_counts};
    use crate::crd::{NginxIngressController, NginxIngressControllerSpec};
    use crate::reconcile_errors::CollisionError;
    use crate::reconcilers::nginxingress::types::ReconcileState;
    use crate::reconcilers::status::find_condition;
    use crate::status_reasons::{
        CONDITION_TYPE_AVAILABLE, CONDITION_TYPE_CONTROLLER_AVAILABLE,
        CONDITION_TYPE_INGRESS_CLASS_READY, CONDITION_TYPE_PROGRESSING,
        REASON_DEPLOYMENT_NOT_OBSERVED, REASON_INGRESS_CLASS_COLLISION, REASON_NOT_READY,
        REASON_READY,
    };
    use k8s_openapi::api::apps::v1::{Deployment, DeploymentCondition, DeploymentStatus};
    use k8s_openapi::api::networking::v1::IngressClass;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn nic() -> NginxIngressController {
        let mut nic = NginxIngressController::new(
            "nic1",
            NginxIngressControllerSpec {
                ingress_class_name: "nginx-internal".to_string(),
                controller_name_prefix: "nic1".to_string(),
                default_ssl_certificate: None,
                load_balancer_annotations: None,
            },
        );
        nic.metadata.generation = Some(3);
        nic
    }

    fn deployment(available: &str, progressing: &str) -> Deployment {
        Deployment {
            status: Some(DeploymentStatus {
                replicas: Some(3),
                ready_replicas: Some(2),
                available_replicas: Some(2),
                unavailable_replicas: Some(1),
                conditions: Some(vec![
                    DeploymentCondition {
                        type_: "Available".to_string(),
                        status: available.to_string(),
                        reason: Some("MinimumReplicasAvailable".to_string()),
                        message: Some("Deployment has minimum availability.".to_string()),
                        ..Default::default()
                    },
                    DeploymentCondition {
                        type_: "Progressing".to_string(),
                        status: progressing.to_string(),
                        reason: Some("NewReplicaSetAvailable".to_string()),
                        message: Some("ReplicaSet has successfully progressed.".to_string()),
                        ..Default::default()
                    },
                ]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn ingress_class() -> IngressClass {
        IngressClass {
            metadata: ObjectMeta {
                name: Some("nginx-internal".to_string()),
                ..Default::default()
            },
            spec: None,
        }
    }

    #[test]
    fn test_nothing_observed_reports_unknown_and_not_available() {
        let conditions = conditions_for_state(&nic(), &ReconcileState::default());

        let controller = find_condition(&conditions, CONDITION_TYPE_CONTROLLER_AVAILABLE).unwrap();
        assert_eq!(controller.status, "Unknown");
        assert_eq!(
            controller.reason.as_deref(),
            Some(REASON_DEPLOYMENT_NOT_OBSERVED)
        );

        let ingress = find_condition(&conditions, CONDITION_TYPE_INGRESS_CLASS_READY).unwrap();
        assert_eq!(ingress.status, "Unknown");

        let progressing = find_condition(&conditions, CONDITION_TYPE_PROGRESSING).unwrap();
        assert_eq!(progressing.status, "Unknown");

        let available = find_condition(&conditions, CONDITION_TYPE_AVAILABLE).unwrap();
        assert_eq!(available.status, "False");
        assert_eq!(available.reason.as_deref(), Some(REASON_NOT_READY));
    }

    #[test]
    fn test_available_requires_both_sub_conditions_true() {
        let mut state = ReconcileState {
            deployment: Some(deployment("True", "True")),
            ingress_class: Some(ingress_class()),
            ..Default::default()
        };

        let conditions = conditions_for_state(&nic(), &state);
        let available = find_condition(&conditions, CONDITION_TYPE_AVAILABLE).unwrap();
        assert_eq!(available.status, "True");
        assert_eq!(available.reason.as_deref(), Some(REASON_READY));

        // Same pass shape with a controller that is not yet available
        state.deployment = Some(deployment("False", "True"));
        let conditions = conditions_for_state(&nic(), &state);
        let available = find_condition(&conditions, CONDITION_TYPE_AVAILABLE).unwrap();
        assert_eq!(available.status, "False");
        assert!(available
            .message
            .as_deref()
            .unwrap()
            .contains("ControllerAvailable is False"));
    }

    #[test]
    fn test_deployment_reason_and_message_copied_through() {
        let state = ReconcileState {
            deployment: Some(deployment("True", "True")),
            ..Default::default()
        };

        let conditions = conditions_for_state(&nic(), &state);
        let controller = find_condition(&conditions, CONDITION_TYPE_CONTROLLER_AVAILABLE).unwrap();
        assert_eq!(
            controller.reason.as_deref(),
            Some("MinimumReplicasAvailable")
        );
        assert_eq!(
            controller.message.as_deref(),
            Some("Deployment has minimum availability.")
        );
    }

    #[test]
    fn test_collision_forces_progressing_false() {
        let state = ReconcileState {
            unreconcilable: Some(CollisionError::IngressClassCollision {
                ingress_class: "nginx-internal".to_string(),
                name: "nic1".to_string(),
            }),
            ..Default::default()
        };

        let conditions = conditions_for_state(&nic(), &state);
        let progressing = find_condition(&conditions, CONDITION_TYPE_PROGRESSING).unwrap();
        assert_eq!(progressing.status, "False");
        assert_eq!(
            progressing.reason.as_deref(),
            Some(REASON_INGRESS_CLASS_COLLISION)
        );
        assert!(progressing
            .message
            .as_deref()
            .unwrap()
            .contains("nginx-internal"));

        let available = find_condition(&conditions, CONDITION_TYPE_AVAILABLE).unwrap();
        assert_eq!(available.status, "False");
    }

    #[test]
    fn test_conditions_carry_the_resource_generation() {
        let conditions = conditions_for_state(&nic(), &ReconcileState::default());
        assert_eq!(conditions.len(), 4);
        for condition in &conditions {
            assert_eq!(condition.observed_generation, Some(3));
        }
    }

    #[test]
    fn test_replica_counts_copied_from_deployment() {
        let state = ReconcileState {
            deployment: Some(deployment("True", "True")),
            ..Default::default()
        };

        assert_eq!(
            replica_counts(&state),
            (Some(3), Some(2), Some(2), Some(1))
        );
    }

    #[test]
    fn test_replica_counts_zeroed_without_deployment() {
        assert_eq!(
            replica_counts(&ReconcileState::default()),
            (Some(0), Some(0), Some(0), Some(0))
        );
    }
}
