// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the managed resource builders.

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::config::OperatorConfig;
    use crate::constants::{
        CONTROLLER_CLASS_MAX_LEN, DEFAULT_INGRESS_CLASS_NAME, DEFAULT_NIC_NAME,
        DEFAULT_NIC_RESOURCE_NAME,
    };
    use crate::crd::{
        DefaultSSLCertificate, NginxIngressController, NginxIngressControllerSpec,
        NginxIngressControllerStatus, SecretReference,
    };
    use crate::labels::{has_top_level_labels, APP_LABEL};
    use crate::nginx_resources::*;

    fn operator_config() -> OperatorConfig {
        OperatorConfig::try_parse_from(["approuting"]).expect("default arguments should parse")
    }

    fn nic(name: &str, prefix: &str, ingress_class: &str) -> NginxIngressController {
        let mut nic = NginxIngressController::new(
            name,
            NginxIngressControllerSpec {
                ingress_class_name: ingress_class.to_string(),
                controller_name_prefix: prefix.to_string(),
                default_ssl_certificate: None,
                load_balancer_annotations: None,
            },
        );
        nic.metadata.uid = Some("0b1f3a52-1f3e-4c88-8a9f-2f9f8e7c6d5e".to_string());
        nic
    }

    fn config_for(nic: &NginxIngressController, count: i32) -> NginxIngressConfig {
        to_nginx_ingress_config(nic, &operator_config(), count)
            .expect("well-formed resource should produce a config")
    }

    #[test]
    fn test_default_instance_uses_fixed_names() {
        let default_nic = nic(DEFAULT_NIC_NAME, "nginx", DEFAULT_INGRESS_CLASS_NAME);

        // A non-zero count must not shift the default instance's names.
        let config = config_for(&default_nic, 7);

        assert_eq!(config.resource_name, DEFAULT_NIC_RESOURCE_NAME);
        assert_eq!(config.ingress_class_name, DEFAULT_INGRESS_CLASS_NAME);
        assert_eq!(
            config.controller_class,
            "webapprouting.kubernetes.azure.com/nginx"
        );
    }

    #[test]
    fn test_custom_instance_derives_names_from_prefix_and_count() {
        let custom = nic("internal", "nginx-internal", "nginx-internal");

        let config = config_for(&custom, 0);
        assert_eq!(config.resource_name, "nginx-internal-0");
        assert_eq!(
            config.controller_class,
            "approuting.kubernetes.azure.com/internal"
        );

        let shifted = config_for(&custom, 2);
        assert_eq!(shifted.resource_name, "nginx-internal-2");
        assert_eq!(shifted.controller_class, config.controller_class);
        assert_eq!(shifted.ingress_class_name, "nginx-internal");
    }

    #[test]
    fn test_controller_class_is_truncated() {
        let long_name = "a".repeat(300);

        let controller_class = controller_class_for(&long_name);

        assert_eq!(controller_class.len(), CONTROLLER_CLASS_MAX_LEN);
        assert!(controller_class.starts_with("approuting.kubernetes.azure.com/aaa"));
    }

    #[test]
    fn test_collision_count_defaults_to_zero() {
        let mut custom = nic("internal", "nginx-internal", "nginx-internal");
        assert_eq!(collision_count(&custom), 0);

        custom.status = Some(NginxIngressControllerStatus {
            collision_count: Some(3),
            ..Default::default()
        });
        assert_eq!(collision_count(&custom), 3);
    }

    #[test]
    fn test_config_requires_uid_and_naming_fields() {
        let operator_config = operator_config();

        let mut no_uid = nic("internal", "nginx-internal", "nginx-internal");
        no_uid.metadata.uid = None;
        assert!(to_nginx_ingress_config(&no_uid, &operator_config, 0).is_none());

        let no_prefix = nic("internal", "", "nginx-internal");
        assert!(to_nginx_ingress_config(&no_prefix, &operator_config, 0).is_none());

        let no_class = nic("internal", "nginx-internal", "");
        assert!(to_nginx_ingress_config(&no_class, &operator_config, 0).is_none());
    }

    #[test]
    fn test_default_certificate_requires_name_and_namespace() {
        let mut custom = nic("internal", "nginx-internal", "nginx-internal");
        assert_eq!(default_certificate_secret(&custom), None);

        custom.spec.default_ssl_certificate = Some(DefaultSSLCertificate {
            secret: Some(SecretReference {
                name: String::new(),
                namespace: "apps".to_string(),
            }),
            key_vault_uri: None,
            force_ssl_redirect: false,
        });
        assert_eq!(default_certificate_secret(&custom), None);

        custom.spec.default_ssl_certificate = Some(DefaultSSLCertificate {
            secret: Some(SecretReference {
                name: "tls-cert".to_string(),
                namespace: "apps".to_string(),
            }),
            key_vault_uri: None,
            force_ssl_redirect: false,
        });
        assert_eq!(
            default_certificate_secret(&custom),
            Some("apps/tls-cert".to_string())
        );
    }

    #[test]
    fn test_builders_are_deterministic() {
        let config = config_for(&nic("internal", "nginx-internal", "nginx-internal"), 1);

        assert_eq!(build_deployment(&config), build_deployment(&config));
        assert_eq!(build_ingress_class(&config), build_ingress_class(&config));
        assert_eq!(build_service(&config), build_service(&config));
        assert_eq!(
            build_managed_resources(&config).map(|set| set.object_refs()),
            build_managed_resources(&config).map(|set| set.object_refs())
        );
    }

    #[test]
    fn test_managed_objects_carry_labels_and_owner_reference() {
        let config = config_for(&nic("internal", "nginx-internal", "nginx-internal"), 0);
        let set = build_managed_resources(&config).expect("set should build");

        let metas = [
            &set.ingress_class.metadata,
            &set.service_account.metadata,
            &set.cluster_role.metadata,
            &set.cluster_role_binding.metadata,
            &set.role.metadata,
            &set.role_binding.metadata,
            &set.config_map.metadata,
            &set.service.metadata,
            &set.deployment.metadata,
            &set.horizontal_pod_autoscaler.metadata,
            &set.pod_disruption_budget.metadata,
        ];
        for meta in metas {
            assert!(has_top_level_labels(meta), "{:?} missing labels", meta.name);
            let owner_refs = meta.owner_references.as_deref().unwrap_or_default();
            assert_eq!(owner_refs.len(), 1, "{:?} owner refs", meta.name);
            assert_eq!(owner_refs[0].kind, "NginxIngressController");
            assert_eq!(owner_refs[0].name, "internal");
            assert_eq!(owner_refs[0].controller, Some(true));
            assert_eq!(owner_refs[0].block_owner_deletion, Some(true));
        }
    }

    #[test]
    fn test_namespace_is_never_adopted() {
        let config = config_for(&nic("internal", "nginx-internal", "nginx-internal"), 0);

        let namespace = build_namespace(&config);

        assert_eq!(namespace.metadata.name.as_deref(), Some("app-routing-system"));
        assert!(namespace.metadata.labels.is_none());
        assert!(namespace.metadata.owner_references.is_none());
    }

    #[test]
    fn test_ingress_class_name_is_never_count_suffixed() {
        let config = config_for(&nic("internal", "nginx-internal", "my-ingress-class"), 4);

        let ingress_class = build_ingress_class(&config);

        assert_eq!(
            ingress_class.metadata.name.as_deref(),
            Some("my-ingress-class")
        );
        assert_eq!(
            ingress_class
                .spec
                .as_ref()
                .and_then(|spec| spec.controller.as_deref()),
            Some("approuting.kubernetes.azure.com/internal")
        );
    }

    #[test]
    fn test_deployment_args_reflect_certificate_settings() {
        let mut custom = nic("internal", "nginx-internal", "nginx-internal");
        custom.spec.default_ssl_certificate = Some(DefaultSSLCertificate {
            secret: Some(SecretReference {
                name: "tls-cert".to_string(),
                namespace: "apps".to_string(),
            }),
            key_vault_uri: None,
            force_ssl_redirect: true,
        });

        let config = config_for(&custom, 0);
        let deployment = build_deployment(&config);
        let args = deployment
            .spec
            .as_ref()
            .and_then(|spec| spec.template.spec.as_ref())
            .map(|pod| pod.containers[0].args.clone().unwrap_or_default())
            .unwrap_or_default();

        assert!(args.contains(&"--default-ssl-certificate=apps/tls-cert".to_string()));
        assert!(args.contains(&"--force-ssl-redirect".to_string()));
        assert!(args.contains(&"--ingress-class=nginx-internal".to_string()));
        assert!(args.contains(&"--election-id=nginx-internal-0".to_string()));

        let plain = config_for(&nic("plain", "nginx-plain", "nginx-plain"), 0);
        let plain_args = build_deployment(&plain)
            .spec
            .as_ref()
            .and_then(|spec| spec.template.spec.as_ref())
            .map(|pod| pod.containers[0].args.clone().unwrap_or_default())
            .unwrap_or_default();
        assert!(!plain_args
            .iter()
            .any(|arg| arg.starts_with("--default-ssl-certificate")));
        assert!(!plain_args.contains(&"--force-ssl-redirect".to_string()));
    }

    #[test]
    fn test_deployment_selector_matches_pod_labels() {
        let config = config_for(&nic("internal", "nginx-internal", "nginx-internal"), 0);

        let deployment = build_deployment(&config);
        let spec = deployment.spec.expect("deployment spec");
        let selector = spec.selector.match_labels.expect("selector labels");
        let pod_labels = spec
            .template
            .metadata
            .and_then(|meta| meta.labels)
            .expect("pod labels");

        assert_eq!(selector.get(APP_LABEL), Some(&"nginx-internal-0".to_string()));
        for (key, value) in &selector {
            assert_eq!(pod_labels.get(key), Some(value));
        }
        // Replicas belong to the HPA.
        assert!(spec.replicas.is_none());
    }

    #[test]
    fn test_service_carries_load_balancer_annotations() {
        let mut custom = nic("internal", "nginx-internal", "nginx-internal");
        custom.spec.load_balancer_annotations = Some(
            [(
                "service.beta.kubernetes.io/azure-load-balancer-internal".to_string(),
                "true".to_string(),
            )]
            .into(),
        );

        let config = config_for(&custom, 0);
        let service = build_service(&config);

        let annotations = service.metadata.annotations.expect("annotations");
        assert_eq!(
            annotations.get("service.beta.kubernetes.io/azure-load-balancer-internal"),
            Some(&"true".to_string())
        );
        let spec = service.spec.expect("service spec");
        assert_eq!(spec.type_.as_deref(), Some("LoadBalancer"));
        assert_eq!(
            spec.selector.and_then(|s| s.get(APP_LABEL).cloned()),
            Some("nginx-internal-0".to_string())
        );
    }

    #[test]
    fn test_object_refs_exclude_namespace() {
        let config = config_for(&nic("internal", "nginx-internal", "nginx-internal"), 0);
        let set = build_managed_resources(&config).expect("set should build");

        let refs = set.object_refs();

        assert_eq!(refs.len(), 11);
        assert!(!refs.iter().any(|r| r.kind == "Namespace"));

        let ingress_class_ref = refs
            .iter()
            .find(|r| r.kind == "IngressClass")
            .expect("ingress class ref");
        assert_eq!(ingress_class_ref.name, "nginx-internal");
        assert!(ingress_class_ref.namespace.is_empty());
        assert_eq!(ingress_class_ref.api_group, "networking.k8s.io");

        let deployment_ref = refs
            .iter()
            .find(|r| r.kind == "Deployment")
            .expect("deployment ref");
        assert_eq!(deployment_ref.name, "nginx-internal-0");
        assert_eq!(deployment_ref.namespace, "app-routing-system");
        assert_eq!(deployment_ref.api_group, "apps");
    }

    #[test]
    fn test_build_managed_resources_rejects_malformed_config() {
        let mut config = config_for(&nic("internal", "nginx-internal", "nginx-internal"), 0);
        config.uid = String::new();
        assert!(build_managed_resources(&config).is_none());

        let mut config = config_for(&nic("internal", "nginx-internal", "nginx-internal"), 0);
        config.resource_name = String::new();
        assert!(build_managed_resources(&config).is_none());
    }
}
