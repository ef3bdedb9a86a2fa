// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Pure builders for the Kubernetes objects realizing one NGINX ingress
//! controller instance.
//!
//! Everything in this module is deterministic: the same
//! [`NginxIngressConfig`] always produces byte-identical objects, and no
//! function touches the API server. The reconciler derives the config from an
//! `NginxIngressController` with [`to_nginx_ingress_config`], then builds the
//! full set with [`build_managed_resources`].
//!
//! Malformed input (an empty resource name, a missing owner UID) yields
//! `None` rather than an error or a partial set; the caller reports an
//! internal error for the cycle and leaves existing objects untouched.

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::autoscaling::v2::{
    CrossVersionObjectReference, HorizontalPodAutoscaler, HorizontalPodAutoscalerSpec, MetricSpec,
    MetricTarget, ResourceMetricSource,
};
use k8s_openapi::api::core::v1::{
    Capabilities, ConfigMap, Container, ContainerPort, EnvVar, EnvVarSource, HTTPGetAction,
    Namespace, ObjectFieldSelector, PodSpec, PodTemplateSpec, Probe, ResourceRequirements,
    SeccompProfile, SecurityContext, Service, ServiceAccount, ServicePort, ServiceSpec,
};
use k8s_openapi::api::networking::v1::{IngressClass, IngressClassSpec};
use k8s_openapi::api::policy::v1::{PodDisruptionBudget, PodDisruptionBudgetSpec};
use k8s_openapi::api::rbac::v1::{
    ClusterRole, ClusterRoleBinding, PolicyRule, Role, RoleBinding, RoleRef, Subject,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, OwnerReference};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::api::ObjectMeta;
use kube::ResourceExt;
use tracing::debug;

use crate::config::OperatorConfig;
use crate::constants::{
    API_GROUP_VERSION, CONTROLLER_CLASS_MAX_LEN, CONTROLLER_CLASS_PREFIX,
    DEFAULT_MAX_REPLICAS, DEFAULT_MIN_REPLICAS, DEFAULT_NIC_NAME,
    DEFAULT_NIC_RESOURCE_NAME, DEFAULT_TARGET_CPU_UTILIZATION, KIND_NGINX_INGRESS_CONTROLLER,
    LIVENESS_FAILURE_THRESHOLD, LIVENESS_INITIAL_DELAY_SECS, LIVENESS_PERIOD_SECS,
    LIVENESS_TIMEOUT_SECS, NGINX_HEALTHZ_PORT, NGINX_HTTPS_PORT, NGINX_HTTP_PORT,
    READINESS_FAILURE_THRESHOLD, READINESS_INITIAL_DELAY_SECS, READINESS_PERIOD_SECS,
    READINESS_TIMEOUT_SECS,
};
use crate::crd::{ManagedObjectReference, NginxIngressController};
use crate::labels::{
    top_level_labels, APP_LABEL, COMPONENT_INGRESS_CONTROLLER, K8S_COMPONENT, K8S_NAME,
    K8S_PART_OF, PART_OF_APPROUTING,
};

/// Derived configuration for one controller instance.
///
/// Built from the custom resource and the operator config; passed to the
/// object builders instead of the resource itself so the builders stay pure
/// and trivially testable.
#[derive(Clone, Debug, PartialEq)]
pub struct NginxIngressConfig {
    /// Name of the owning `NginxIngressController`
    pub name: String,
    /// UID of the owning `NginxIngressController`
    pub uid: String,
    /// Name shared by every generated object except the IngressClass
    pub resource_name: String,
    /// Name of the generated IngressClass (never count-suffixed)
    pub ingress_class_name: String,
    /// Controller class the NGINX process claims ingresses with
    pub controller_class: String,
    /// Target namespace for namespaced objects
    pub namespace: String,
    /// Full image reference for the controller container
    pub image: String,
    /// `namespace/name` of the default TLS secret, when usable
    pub default_ssl_certificate: Option<String>,
    /// Redirect plain HTTP traffic to HTTPS
    pub force_ssl_redirect: bool,
    /// Annotations copied onto the LoadBalancer Service
    pub load_balancer_annotations: BTreeMap<String, String>,
}

/// The complete object set for one controller instance.
///
/// Every object except `namespace` carries the operator's top-level labels
/// and an owner reference to the custom resource. The Namespace is created if
/// absent but never adopted: no labels, no owner reference, never deleted.
#[derive(Clone, Debug)]
pub struct ManagedResourceSet {
    pub namespace: Namespace,
    pub ingress_class: IngressClass,
    pub service_account: ServiceAccount,
    pub cluster_role: ClusterRole,
    pub cluster_role_binding: ClusterRoleBinding,
    pub role: Role,
    pub role_binding: RoleBinding,
    pub config_map: ConfigMap,
    pub service: Service,
    pub deployment: Deployment,
    pub horizontal_pod_autoscaler: HorizontalPodAutoscaler,
    pub pod_disruption_budget: PodDisruptionBudget,
}

impl ManagedResourceSet {
    /// References to every labeled object in the set, in apply order.
    ///
    /// The status's `managedResourceRefs` is replaced with exactly this list
    /// on each successful reconcile. The Namespace is deliberately absent.
    #[must_use]
    pub fn object_refs(&self) -> Vec<ManagedObjectReference> {
        let namespaced = |name: &str, kind: &str, api_group: &str| ManagedObjectReference {
            name: name.to_string(),
            namespace: self
                .service_account
                .metadata
                .namespace
                .clone()
                .unwrap_or_default(),
            kind: kind.to_string(),
            api_group: api_group.to_string(),
        };
        let cluster = |name: &str, kind: &str, api_group: &str| ManagedObjectReference {
            name: name.to_string(),
            namespace: String::new(),
            kind: kind.to_string(),
            api_group: api_group.to_string(),
        };

        vec![
            cluster(
                &self.ingress_class.name_any(),
                "IngressClass",
                "networking.k8s.io",
            ),
            namespaced(&self.service_account.name_any(), "ServiceAccount", ""),
            cluster(
                &self.cluster_role.name_any(),
                "ClusterRole",
                "rbac.authorization.k8s.io",
            ),
            cluster(
                &self.cluster_role_binding.name_any(),
                "ClusterRoleBinding",
                "rbac.authorization.k8s.io",
            ),
            namespaced(
                &self.role.name_any(),
                "Role",
                "rbac.authorization.k8s.io",
            ),
            namespaced(
                &self.role_binding.name_any(),
                "RoleBinding",
                "rbac.authorization.k8s.io",
            ),
            namespaced(&self.config_map.name_any(), "ConfigMap", ""),
            namespaced(&self.service.name_any(), "Service", ""),
            namespaced(&self.deployment.name_any(), "Deployment", "apps"),
            namespaced(
                &self.horizontal_pod_autoscaler.name_any(),
                "HorizontalPodAutoscaler",
                "autoscaling",
            ),
            namespaced(
                &self.pod_disruption_budget.name_any(),
                "PodDisruptionBudget",
                "policy",
            ),
        ]
    }
}

/// Returns true for the well-known default instance.
///
/// The default instance uses fixed names and is exempt from collision
/// resolution.
#[must_use]
pub fn is_default_nic(nic: &NginxIngressController) -> bool {
    nic.name_any() == DEFAULT_NIC_NAME
}

/// Current collision count recorded on the resource's status.
#[must_use]
pub fn collision_count(nic: &NginxIngressController) -> i32 {
    nic.status
        .as_ref()
        .and_then(|status| status.collision_count)
        .unwrap_or(0)
}

/// Escapes a resource name for use as a URL path segment.
///
/// Valid Kubernetes object names pass through unchanged; anything else is
/// percent-encoded so the controller class stays a single path segment.
fn path_escape(segment: &str) -> String {
    let Ok(mut url) = url::Url::parse("https://escape.invalid") else {
        return segment.to_string();
    };
    match url.path_segments_mut() {
        Ok(mut segments) => {
            segments.push(segment);
        }
        Err(()) => return segment.to_string(),
    }
    url.path().trim_start_matches('/').to_string()
}

/// Derives the controller class for a named instance.
///
/// `approuting.kubernetes.azure.com/<escaped name>`, truncated to 250
/// characters. The escaped form is pure ASCII, so byte truncation is safe.
#[must_use]
pub fn controller_class_for(name: &str) -> String {
    let mut controller_class = format!("{CONTROLLER_CLASS_PREFIX}{}", path_escape(name));
    if controller_class.len() > CONTROLLER_CLASS_MAX_LEN {
        controller_class.truncate(CONTROLLER_CLASS_MAX_LEN);
    }
    controller_class
}

/// Derives the resource name for a prefix and collision count.
#[must_use]
pub fn resource_name_for(prefix: &str, count: i32) -> String {
    format!("{prefix}-{count}")
}

/// Returns the usable default TLS secret as `namespace/name`.
///
/// A certificate reference counts only when both the secret name and
/// namespace are non-empty; a bare struct with empty strings is ignored.
#[must_use]
pub fn default_certificate_secret(nic: &NginxIngressController) -> Option<String> {
    let cert = nic.spec.default_ssl_certificate.as_ref()?;
    let secret = cert.secret.as_ref()?;
    if secret.name.is_empty() || secret.namespace.is_empty() {
        return None;
    }
    Some(format!("{}/{}", secret.namespace, secret.name))
}

/// Derives the builder config from a custom resource.
///
/// The default instance gets its fixed resource name and the configured
/// default controller class; every other instance derives both from its own
/// name, prefix, and the given collision count.
///
/// Returns `None` when the resource cannot be owned (missing UID) or the
/// spec's naming fields are empty; callers treat that as an internal error
/// for this cycle, never as a reason to delete anything.
#[must_use]
pub fn to_nginx_ingress_config(
    nic: &NginxIngressController,
    operator_config: &OperatorConfig,
    count: i32,
) -> Option<NginxIngressConfig> {
    let name = nic.name_any();
    let uid = nic.metadata.uid.clone().unwrap_or_default();
    if name.is_empty() || uid.is_empty() {
        return None;
    }
    if nic.spec.ingress_class_name.is_empty() || nic.spec.controller_name_prefix.is_empty() {
        return None;
    }

    let (resource_name, controller_class) = if is_default_nic(nic) {
        (
            DEFAULT_NIC_RESOURCE_NAME.to_string(),
            operator_config.default_nic_controller_class.clone(),
        )
    } else {
        (
            resource_name_for(&nic.spec.controller_name_prefix, count),
            controller_class_for(&name),
        )
    };

    Some(NginxIngressConfig {
        name,
        uid,
        resource_name,
        ingress_class_name: nic.spec.ingress_class_name.clone(),
        controller_class,
        namespace: operator_config.namespace.clone(),
        image: operator_config.nginx_image(),
        default_ssl_certificate: default_certificate_secret(nic),
        force_ssl_redirect: nic
            .spec
            .default_ssl_certificate
            .as_ref()
            .is_some_and(|cert| cert.force_ssl_redirect),
        load_balancer_annotations: nic
            .spec
            .load_balancer_annotations
            .clone()
            .unwrap_or_default(),
    })
}

/// Builds owner references for a resource owned by an `NginxIngressController`.
///
/// Sets up cascade deletion so that deleting the custom resource deletes
/// every generated object, cluster-scoped ones included.
#[must_use]
pub fn build_owner_references(config: &NginxIngressConfig) -> Vec<OwnerReference> {
    vec![OwnerReference {
        api_version: API_GROUP_VERSION.to_string(),
        kind: KIND_NGINX_INGRESS_CONTROLLER.to_string(),
        name: config.name.clone(),
        uid: config.uid.clone(),
        controller: Some(true),
        block_owner_deletion: Some(true),
        ..Default::default()
    }]
}

/// Labels stamped on every generated object except the Namespace.
#[must_use]
pub fn managed_labels(config: &NginxIngressConfig) -> BTreeMap<String, String> {
    let mut labels = top_level_labels();
    labels.insert(APP_LABEL.into(), config.resource_name.clone());
    labels.insert(K8S_NAME.into(), "nginx".into());
    labels.insert(K8S_COMPONENT.into(), COMPONENT_INGRESS_CONTROLLER.into());
    labels.insert(K8S_PART_OF.into(), PART_OF_APPROUTING.into());
    labels
}

fn managed_meta(config: &NginxIngressConfig, name: &str, namespaced: bool) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.into()),
        namespace: namespaced.then(|| config.namespace.clone()),
        labels: Some(managed_labels(config)),
        owner_references: Some(build_owner_references(config)),
        ..Default::default()
    }
}

/// Builds the target Namespace.
///
/// No top-level labels and no owner reference: the namespace may pre-exist
/// and hold user workloads, so the operator creates it when missing but must
/// never adopt or delete it.
#[must_use]
pub fn build_namespace(config: &NginxIngressConfig) -> Namespace {
    Namespace {
        metadata: ObjectMeta {
            name: Some(config.namespace.clone()),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Builds the IngressClass claimed by this controller.
///
/// Named after the spec's `ingressClassName` directly; the collision count
/// never appears here, which is why a foreign holder is a terminal collision.
#[must_use]
pub fn build_ingress_class(config: &NginxIngressConfig) -> IngressClass {
    IngressClass {
        metadata: ObjectMeta {
            name: Some(config.ingress_class_name.clone()),
            labels: Some(managed_labels(config)),
            owner_references: Some(build_owner_references(config)),
            ..Default::default()
        },
        spec: Some(IngressClassSpec {
            controller: Some(config.controller_class.clone()),
            ..Default::default()
        }),
    }
}

/// Builds the controller's ServiceAccount.
#[must_use]
pub fn build_service_account(config: &NginxIngressConfig) -> ServiceAccount {
    ServiceAccount {
        metadata: managed_meta(config, &config.resource_name, true),
        ..Default::default()
    }
}

/// Builds the ClusterRole granting the cluster-wide reads NGINX needs.
#[must_use]
pub fn build_cluster_role(config: &NginxIngressConfig) -> ClusterRole {
    let rule = |api_groups: &[&str], resources: &[&str], verbs: &[&str]| PolicyRule {
        api_groups: Some(api_groups.iter().map(ToString::to_string).collect()),
        resources: Some(resources.iter().map(ToString::to_string).collect()),
        verbs: verbs.iter().map(ToString::to_string).collect(),
        ..Default::default()
    };

    ClusterRole {
        metadata: ObjectMeta {
            name: Some(config.resource_name.clone()),
            labels: Some(managed_labels(config)),
            owner_references: Some(build_owner_references(config)),
            ..Default::default()
        },
        rules: Some(vec![
            rule(
                &[""],
                &["configmaps", "endpoints", "pods", "secrets", "namespaces"],
                &["list", "watch"],
            ),
            rule(&[""], &["nodes"], &["get", "list", "watch"]),
            rule(&[""], &["services"], &["get", "list", "watch"]),
            rule(&[""], &["events"], &["create", "patch"]),
            rule(
                &["networking.k8s.io"],
                &["ingresses"],
                &["get", "list", "watch"],
            ),
            rule(&["networking.k8s.io"], &["ingresses/status"], &["update"]),
            rule(
                &["networking.k8s.io"],
                &["ingressclasses"],
                &["get", "list", "watch"],
            ),
            rule(
                &["discovery.k8s.io"],
                &["endpointslices"],
                &["get", "list", "watch"],
            ),
        ]),
        ..Default::default()
    }
}

/// Builds the binding of the ClusterRole to the controller's ServiceAccount.
#[must_use]
pub fn build_cluster_role_binding(config: &NginxIngressConfig) -> ClusterRoleBinding {
    ClusterRoleBinding {
        metadata: ObjectMeta {
            name: Some(config.resource_name.clone()),
            labels: Some(managed_labels(config)),
            owner_references: Some(build_owner_references(config)),
            ..Default::default()
        },
        role_ref: RoleRef {
            api_group: "rbac.authorization.k8s.io".into(),
            kind: "ClusterRole".into(),
            name: config.resource_name.clone(),
        },
        subjects: Some(vec![Subject {
            kind: "ServiceAccount".into(),
            name: config.resource_name.clone(),
            namespace: Some(config.namespace.clone()),
            ..Default::default()
        }]),
    }
}

/// Builds the namespaced Role for leader election and local reads.
#[must_use]
pub fn build_role(config: &NginxIngressConfig) -> Role {
    let rule = |api_groups: &[&str], resources: &[&str], verbs: &[&str]| PolicyRule {
        api_groups: Some(api_groups.iter().map(ToString::to_string).collect()),
        resources: Some(resources.iter().map(ToString::to_string).collect()),
        verbs: verbs.iter().map(ToString::to_string).collect(),
        ..Default::default()
    };

    Role {
        metadata: managed_meta(config, &config.resource_name, true),
        rules: Some(vec![
            rule(&[""], &["namespaces"], &["get"]),
            rule(
                &[""],
                &["configmaps", "pods", "secrets", "endpoints"],
                &["get", "list", "watch"],
            ),
            rule(&[""], &["services"], &["get", "list", "watch"]),
            rule(&[""], &["configmaps"], &["create"]),
            rule(
                &["coordination.k8s.io"],
                &["leases"],
                &["get", "create", "update"],
            ),
            rule(&[""], &["events"], &["create", "patch"]),
            rule(
                &["discovery.k8s.io"],
                &["endpointslices"],
                &["get", "list", "watch"],
            ),
        ]),
    }
}

/// Builds the binding of the Role to the controller's ServiceAccount.
#[must_use]
pub fn build_role_binding(config: &NginxIngressConfig) -> RoleBinding {
    RoleBinding {
        metadata: managed_meta(config, &config.resource_name, true),
        role_ref: RoleRef {
            api_group: "rbac.authorization.k8s.io".into(),
            kind: "Role".into(),
            name: config.resource_name.clone(),
        },
        subjects: Some(vec![Subject {
            kind: "ServiceAccount".into(),
            name: config.resource_name.clone(),
            namespace: Some(config.namespace.clone()),
            ..Default::default()
        }]),
    }
}

/// Builds the controller ConfigMap read via `--configmap`.
#[must_use]
pub fn build_configmap(config: &NginxIngressConfig) -> ConfigMap {
    ConfigMap {
        metadata: managed_meta(config, &config.resource_name, true),
        data: Some(BTreeMap::from([(
            "allow-snippet-annotations".to_string(),
            "false".to_string(),
        )])),
        ..Default::default()
    }
}

/// Builds the LoadBalancer Service fronting the controller pods.
///
/// `loadBalancerAnnotations` from the spec land on the Service metadata so
/// the cloud provider sees them (internal LB, IP tags, and so on).
#[must_use]
pub fn build_service(config: &NginxIngressConfig) -> Service {
    let mut metadata = managed_meta(config, &config.resource_name, true);
    if !config.load_balancer_annotations.is_empty() {
        metadata.annotations = Some(config.load_balancer_annotations.clone());
    }

    Service {
        metadata,
        spec: Some(ServiceSpec {
            type_: Some("LoadBalancer".into()),
            selector: Some(BTreeMap::from([(
                APP_LABEL.to_string(),
                config.resource_name.clone(),
            )])),
            ports: Some(vec![
                ServicePort {
                    name: Some("http".into()),
                    port: 80,
                    target_port: Some(IntOrString::String("http".into())),
                    protocol: Some("TCP".into()),
                    ..Default::default()
                },
                ServicePort {
                    name: Some("https".into()),
                    port: 443,
                    target_port: Some(IntOrString::String("https".into())),
                    protocol: Some("TCP".into()),
                    ..Default::default()
                },
            ]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Builds the NGINX ingress controller Deployment.
///
/// Replicas are left unset: the HPA owns the replica count and a fixed value
/// here would fight it on every apply.
#[must_use]
pub fn build_deployment(config: &NginxIngressConfig) -> Deployment {
    debug!(
        name = %config.resource_name,
        namespace = %config.namespace,
        controller_class = %config.controller_class,
        "Building Deployment for NginxIngressController"
    );

    let selector_labels = BTreeMap::from([(APP_LABEL.to_string(), config.resource_name.clone())]);

    let mut pod_labels = top_level_labels();
    pod_labels.insert(APP_LABEL.into(), config.resource_name.clone());

    Deployment {
        metadata: managed_meta(config, &config.resource_name, true),
        spec: Some(DeploymentSpec {
            revision_history_limit: Some(2),
            selector: LabelSelector {
                match_labels: Some(selector_labels),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(pod_labels),
                    ..Default::default()
                }),
                spec: Some(build_controller_pod_spec(config)),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn build_controller_pod_spec(config: &NginxIngressConfig) -> PodSpec {
    let mut args = vec![
        "/nginx-ingress-controller".to_string(),
        format!("--ingress-class={}", config.ingress_class_name),
        format!("--controller-class={}", config.controller_class),
        format!("--election-id={}", config.resource_name),
        format!("--publish-service=$(POD_NAMESPACE)/{}", config.resource_name),
        format!("--configmap=$(POD_NAMESPACE)/{}", config.resource_name),
        format!("--http-port={NGINX_HTTP_PORT}"),
        format!("--https-port={NGINX_HTTPS_PORT}"),
    ];
    if let Some(secret) = &config.default_ssl_certificate {
        args.push(format!("--default-ssl-certificate={secret}"));
    }
    if config.force_ssl_redirect {
        args.push("--force-ssl-redirect".to_string());
    }

    let field_env = |name: &str, field_path: &str| EnvVar {
        name: name.into(),
        value_from: Some(EnvVarSource {
            field_ref: Some(ObjectFieldSelector {
                field_path: field_path.into(),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    };

    let healthz_probe = |initial_delay, period, timeout, failure_threshold| Probe {
        http_get: Some(HTTPGetAction {
            path: Some("/healthz".into()),
            port: IntOrString::Int(NGINX_HEALTHZ_PORT),
            scheme: Some("HTTP".into()),
            ..Default::default()
        }),
        initial_delay_seconds: Some(initial_delay),
        period_seconds: Some(period),
        timeout_seconds: Some(timeout),
        failure_threshold: Some(failure_threshold),
        ..Default::default()
    };

    let controller_container = Container {
        name: "controller".into(),
        image: Some(config.image.clone()),
        image_pull_policy: Some("IfNotPresent".into()),
        args: Some(args),
        env: Some(vec![
            field_env("POD_NAME", "metadata.name"),
            field_env("POD_NAMESPACE", "metadata.namespace"),
        ]),
        ports: Some(vec![
            ContainerPort {
                name: Some("http".into()),
                container_port: NGINX_HTTP_PORT,
                protocol: Some("TCP".into()),
                ..Default::default()
            },
            ContainerPort {
                name: Some("https".into()),
                container_port: NGINX_HTTPS_PORT,
                protocol: Some("TCP".into()),
                ..Default::default()
            },
        ]),
        resources: Some(ResourceRequirements {
            requests: Some(BTreeMap::from([
                ("cpu".to_string(), Quantity("500m".to_string())),
                ("memory".to_string(), Quantity("127Mi".to_string())),
            ])),
            ..Default::default()
        }),
        liveness_probe: Some(healthz_probe(
            LIVENESS_INITIAL_DELAY_SECS,
            LIVENESS_PERIOD_SECS,
            LIVENESS_TIMEOUT_SECS,
            LIVENESS_FAILURE_THRESHOLD,
        )),
        readiness_probe: Some(healthz_probe(
            READINESS_INITIAL_DELAY_SECS,
            READINESS_PERIOD_SECS,
            READINESS_TIMEOUT_SECS,
            READINESS_FAILURE_THRESHOLD,
        )),
        security_context: Some(SecurityContext {
            run_as_non_root: Some(true),
            run_as_user: Some(101),
            allow_privilege_escalation: Some(false),
            capabilities: Some(Capabilities {
                drop: Some(vec!["ALL".to_string()]),
                ..Default::default()
            }),
            seccomp_profile: Some(SeccompProfile {
                type_: "RuntimeDefault".into(),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    };

    PodSpec {
        containers: vec![controller_container],
        service_account_name: Some(config.resource_name.clone()),
        termination_grace_period_seconds: Some(60),
        ..Default::default()
    }
}

/// Builds the controller's HorizontalPodAutoscaler.
#[must_use]
pub fn build_horizontal_pod_autoscaler(config: &NginxIngressConfig) -> HorizontalPodAutoscaler {
    HorizontalPodAutoscaler {
        metadata: managed_meta(config, &config.resource_name, true),
        spec: Some(HorizontalPodAutoscalerSpec {
            scale_target_ref: CrossVersionObjectReference {
                api_version: Some("apps/v1".into()),
                kind: "Deployment".into(),
                name: config.resource_name.clone(),
            },
            min_replicas: Some(DEFAULT_MIN_REPLICAS),
            max_replicas: DEFAULT_MAX_REPLICAS,
            metrics: Some(vec![MetricSpec {
                type_: "Resource".into(),
                resource: Some(ResourceMetricSource {
                    name: "cpu".into(),
                    target: MetricTarget {
                        type_: "Utilization".into(),
                        average_utilization: Some(DEFAULT_TARGET_CPU_UTILIZATION),
                        ..Default::default()
                    },
                }),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Builds the controller's PodDisruptionBudget.
#[must_use]
pub fn build_pod_disruption_budget(config: &NginxIngressConfig) -> PodDisruptionBudget {
    PodDisruptionBudget {
        metadata: managed_meta(config, &config.resource_name, true),
        spec: Some(PodDisruptionBudgetSpec {
            max_unavailable: Some(IntOrString::Int(1)),
            selector: Some(LabelSelector {
                match_labels: Some(BTreeMap::from([(
                    APP_LABEL.to_string(),
                    config.resource_name.clone(),
                )])),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Builds the complete managed object set for one controller instance.
///
/// Deterministic and non-panicking. Returns `None` when the config carries
/// empty naming fields or no owner UID; a partial set is never produced.
#[must_use]
pub fn build_managed_resources(config: &NginxIngressConfig) -> Option<ManagedResourceSet> {
    if config.resource_name.is_empty()
        || config.ingress_class_name.is_empty()
        || config.namespace.is_empty()
        || config.uid.is_empty()
    {
        return None;
    }

    debug!(
        resource_name = %config.resource_name,
        ingress_class = %config.ingress_class_name,
        namespace = %config.namespace,
        "Building managed resource set"
    );

    Some(ManagedResourceSet {
        namespace: build_namespace(config),
        ingress_class: build_ingress_class(config),
        service_account: build_service_account(config),
        cluster_role: build_cluster_role(config),
        cluster_role_binding: build_cluster_role_binding(config),
        role: build_role(config),
        role_binding: build_role_binding(config),
        config_map: build_configmap(config),
        service: build_service(config),
        deployment: build_deployment(config),
        horizontal_pod_autoscaler: build_horizontal_pod_autoscaler(config),
        pod_disruption_budget: build_pod_disruption_budget(config),
    })
}
