// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `collision.rs`

#[cfg(test)]
mod tests {
    use super::super::{ingress_class_owned, object_collides, Collision};
    use crate::constants::{API_GROUP_VERSION, KIND_NGINX_INGRESS_CONTROLLER};
    use crate::labels::top_level_labels;
    use k8s_openapi::api::networking::v1::IngressClass;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};

    const OWNER_UID: &str = "0b1f3a52-9c3a-4de1-9f4e-9a6f6f1c2d3e";
    const FOREIGN_UID: &str = "ffffffff-0000-0000-0000-000000000000";

    fn owner_reference(uid: &str) -> OwnerReference {
        OwnerReference {
            api_version: API_GROUP_VERSION.to_string(),
            kind: KIND_NGINX_INGRESS_CONTROLLER.to_string(),
            name: "nic1".to_string(),
            uid: uid.to_string(),
            controller: Some(true),
            block_owner_deletion: Some(true),
        }
    }

    fn meta(labeled: bool, owner_uid: Option<&str>) -> ObjectMeta {
        ObjectMeta {
            name: Some("nic1-0".to_string()),
            labels: labeled.then(top_level_labels),
            owner_references: owner_uid.map(|uid| vec![owner_reference(uid)]),
            ..Default::default()
        }
    }

    #[test]
    fn test_labeled_and_owned_object_does_not_collide() {
        assert!(!object_collides(&meta(true, Some(OWNER_UID)), "nic1"));
    }

    #[test]
    fn test_recreated_owner_reclaims_its_objects() {
        // A deleted-and-recreated resource keeps its name but gets a new uid.
        // Ownership is decided by the reference's kind and name, so the
        // leftovers are still ours and the count never shifts.
        assert!(!object_collides(&meta(true, Some(FOREIGN_UID)), "nic1"));
    }

    #[test]
    fn test_owner_name_mismatch_collides() {
        assert!(object_collides(&meta(true, Some(OWNER_UID)), "nic2"));
    }

    #[test]
    fn test_owner_kind_mismatch_collides() {
        let meta = ObjectMeta {
            name: Some("nic1-0".to_string()),
            labels: Some(top_level_labels()),
            owner_references: Some(vec![OwnerReference {
                api_version: "apps/v1".to_string(),
                kind: "Deployment".to_string(),
                name: "nic1".to_string(),
                uid: OWNER_UID.to_string(),
                controller: Some(true),
                block_owner_deletion: None,
            }]),
            ..Default::default()
        };
        assert!(object_collides(&meta, "nic1"));
    }

    #[test]
    fn test_unlabeled_object_collides_even_when_owner_matches() {
        assert!(object_collides(&meta(false, Some(OWNER_UID)), "nic1"));
    }

    #[test]
    fn test_plain_user_object_collides() {
        assert!(object_collides(&meta(false, None), "nic1"));
    }

    #[test]
    fn test_ingress_class_owned_by_name_and_kind() {
        let ingress_class = IngressClass {
            metadata: ObjectMeta {
                name: Some("nginx-internal".to_string()),
                owner_references: Some(vec![owner_reference(OWNER_UID)]),
                ..Default::default()
            },
            spec: None,
        };

        assert!(ingress_class_owned(&ingress_class, "nic1"));
        assert!(!ingress_class_owned(&ingress_class, "nic2"));
    }

    #[test]
    fn test_ingress_class_owner_kind_must_match() {
        let ingress_class = IngressClass {
            metadata: ObjectMeta {
                name: Some("nginx-internal".to_string()),
                owner_references: Some(vec![OwnerReference {
                    api_version: "apps/v1".to_string(),
                    kind: "Deployment".to_string(),
                    name: "nic1".to_string(),
                    uid: OWNER_UID.to_string(),
                    controller: Some(true),
                    block_owner_deletion: None,
                }]),
                ..Default::default()
            },
            spec: None,
        };

        assert!(!ingress_class_owned(&ingress_class, "nic1"));
    }

    #[test]
    fn test_collision_variants_compare() {
        assert_eq!(Collision::None, Collision::None);
        assert_ne!(Collision::IngressClass, Collision::Other);
    }

    #[tokio::test]
    #[ignore] // Requires Kubernetes cluster
    async fn test_resolve_starts_at_zero_on_empty_cluster() {
        // This test requires a real cluster, so we skip the actual API call
        // In integration tests, we would:
        // 1. Create NginxIngressController `nic1` with prefix `nic1`
        // 2. Call resolve_collision_count
        // 3. Verify it returns 0 and derives resource name `nic1-0`
    }

    #[tokio::test]
    #[ignore] // Requires Kubernetes cluster
    async fn test_resolve_steps_over_foreign_deployment() {
        // This test requires a real cluster, so we skip the actual API call
        // In integration tests, we would:
        // 1. Create an unowned Deployment named `nic1-0` in the target namespace
        // 2. Call resolve_collision_count for `nic1` with status count 0
        // 3. Verify it returns 1 (resource name `nic1-1`)
        // 4. Delete the foreign Deployment, resolve again, and verify the
        //    count stays 1 (never decremented)
    }

    #[tokio::test]
    #[ignore] // Requires Kubernetes cluster
    async fn test_foreign_ingress_class_is_terminal() {
        // This test requires a real cluster, so we skip the actual API call
        // In integration tests, we would:
        // 1. Create an unowned IngressClass with the resource's ingressClassName
        // 2. Call resolve_collision_count
        // 3. Verify it returns CollisionError::IngressClassCollision regardless
        //    of the collision count
    }
}
