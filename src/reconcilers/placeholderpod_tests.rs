// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the `SecretProviderClass` placeholder reconciler

#[cfg(test)]
mod tests {
    use crate::constants::{KIND_GATEWAY, KIND_INGRESS, KIND_NGINX_INGRESS_CONTROLLER};
    use crate::crd::{SecretProviderClass, SecretProviderClassSpec};
    use crate::labels::{top_level_labels, K8S_MANAGED_BY};
    use crate::reconcilers::placeholderpod::owners::owner_registry;
    use crate::reconcilers::placeholderpod::{placeholder_owned_by_operator, resolvable_owner};
    use k8s_openapi::api::apps::v1::Deployment;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
    use std::collections::BTreeMap;

    fn owner_reference(kind: &str, name: &str) -> OwnerReference {
        OwnerReference {
            api_version: "approuting.kubernetes.azure.com/v1alpha1".to_string(),
            kind: kind.to_string(),
            name: name.to_string(),
            uid: "aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee".to_string(),
            controller: Some(true),
            block_owner_deletion: None,
        }
    }

    fn spc_owned_by(references: Vec<OwnerReference>) -> SecretProviderClass {
        let mut spc = SecretProviderClass::new("keyvault-web", SecretProviderClassSpec::default());
        spc.metadata.namespace = Some("apps".to_string());
        spc.metadata.owner_references = Some(references);
        spc
    }

    fn deployment_with_labels(labels: Option<BTreeMap<String, String>>) -> Deployment {
        Deployment {
            metadata: ObjectMeta {
                name: Some("keyvault-web".to_string()),
                namespace: Some("apps".to_string()),
                labels,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    // ------------------------------------------------------------------
    // Placeholder deletion gate
    // ------------------------------------------------------------------

    #[test]
    fn test_labeled_placeholder_is_deletable() {
        let deployment = deployment_with_labels(Some(top_level_labels()));
        assert!(placeholder_owned_by_operator(&deployment));
    }

    #[test]
    fn test_unlabeled_deployment_is_never_deleted() {
        // A user deployment that merely shares the placeholder's name must
        // survive owner-inactive cleanup.
        assert!(!placeholder_owned_by_operator(&deployment_with_labels(None)));
        assert!(!placeholder_owned_by_operator(&deployment_with_labels(
            Some(BTreeMap::from([(
                "app".to_string(),
                "keyvault-web".to_string()
            )]))
        )));
    }

    #[test]
    fn test_foreign_managed_by_value_is_never_deleted() {
        let deployment = deployment_with_labels(Some(BTreeMap::from([(
            K8S_MANAGED_BY.to_string(),
            "helm".to_string(),
        )])));
        assert!(!placeholder_owned_by_operator(&deployment));
    }

    // ------------------------------------------------------------------
    // Owner registry resolution
    // ------------------------------------------------------------------

    #[test]
    fn test_nic_owner_reference_resolves() {
        let spc = spc_owned_by(vec![owner_reference(KIND_NGINX_INGRESS_CONTROLLER, "web")]);
        let registry = owner_registry(false);

        let (owner, reference) =
            resolvable_owner(&registry, &spc).expect("owner should resolve");
        assert_eq!(owner.kind(), KIND_NGINX_INGRESS_CONTROLLER);
        assert_eq!(reference.name, "web");
    }

    #[test]
    fn test_unregistered_owner_kind_skips() {
        let spc = spc_owned_by(vec![owner_reference("Deployment", "web")]);
        assert!(resolvable_owner(&owner_registry(true), &spc).is_none());

        let orphan = spc_owned_by(vec![]);
        assert!(resolvable_owner(&owner_registry(true), &orphan).is_none());
    }

    #[test]
    fn test_gateway_owner_requires_the_toggle() {
        let spc = spc_owned_by(vec![owner_reference(KIND_GATEWAY, "gw1")]);

        assert!(resolvable_owner(&owner_registry(false), &spc).is_none());

        let registry = owner_registry(true);
        let (owner, reference) = resolvable_owner(&registry, &spc)
            .expect("gateway owner should resolve when enabled");
        assert_eq!(owner.kind(), KIND_GATEWAY);
        assert_eq!(reference.name, "gw1");
    }

    #[test]
    fn test_first_registered_owner_reference_wins() {
        let spc = spc_owned_by(vec![
            owner_reference("Deployment", "not-an-owner"),
            owner_reference(KIND_INGRESS, "store-front"),
        ]);

        let registry = owner_registry(false);
        let (owner, reference) =
            resolvable_owner(&registry, &spc).expect("owner should resolve");
        assert_eq!(owner.kind(), KIND_INGRESS);
        assert_eq!(reference.name, "store-front");
    }

    // ------------------------------------------------------------------
    // Full reconcile flows (cluster required)
    // ------------------------------------------------------------------

    #[tokio::test]
    #[ignore] // Requires Kubernetes cluster
    async fn test_active_nic_owner_gets_a_placeholder() {
        // Test plan:
        // 1. Create a NginxIngressController with defaultSSLCertificate.keyVaultURI set
        // 2. Create a SecretProviderClass owned by it
        // 3. Run reconcile_secret_provider_class
        // 4. Verify a placeholder Deployment exists with the same name and
        //    namespace, the operator labels and a CSI volume for the object
    }

    #[tokio::test]
    #[ignore] // Requires Kubernetes cluster
    async fn test_inactive_owner_deletes_the_labeled_placeholder() {
        // Test plan:
        // 1. Create a NginxIngressController without a Keyvault certificate
        // 2. Create a SecretProviderClass owned by it plus a labeled
        //    placeholder Deployment from an earlier pass
        // 3. Run reconcile_secret_provider_class
        // 4. Verify the placeholder is deleted
    }

    #[tokio::test]
    #[ignore] // Requires Kubernetes cluster
    async fn test_invalid_service_account_is_a_user_error() {
        // Test plan:
        // 1. Create an ALB Gateway whose listener enables the Keyvault option
        //    and names a ServiceAccount that does not exist
        // 2. Create the matching SecretProviderClass owned by the Gateway
        // 3. Run reconcile_secret_provider_class with gateway support enabled
        // 4. Verify the pass succeeds, a Warning event lands on the Gateway,
        //    and no placeholder Deployment is created
    }
}
