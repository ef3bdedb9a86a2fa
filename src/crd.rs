// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definitions (CRDs) for app routing.
//!
//! This module defines the operator's own custom resource plus minimal typed
//! views of foreign resources the operator reads but does not own.
//!
//! # Resource Types
//!
//! ## Owned
//!
//! - [`NginxIngressController`] - A managed NGINX ingress controller instance
//!   (cluster-scoped). This is the only CRD emitted by the `crdgen` binary.
//!
//! ## Foreign (read-only)
//!
//! - [`SecretProviderClass`] - secrets-store CSI driver resource; the
//!   operator reconciles placeholder pods for these but never creates them
//! - [`Gateway`] - Gateway API resource; consulted when resolving
//!   placeholder pod ownership
//!
//! # Example: Creating an NginxIngressController
//!
//! ```yaml
//! apiVersion: approuting.kubernetes.azure.com/v1alpha1
//! kind: NginxIngressController
//! metadata:
//!   name: internal
//! spec:
//!   ingressClassName: nginx-internal
//!   controllerNamePrefix: nginx-internal
//!   loadBalancerAnnotations:
//!     service.beta.kubernetes.io/azure-load-balancer-internal: "true"
//! ```
//!
//! # Example: Building a spec in code
//!
//! ```rust,no_run
//! use approuting::crd::{NginxIngressControllerSpec, DefaultSSLCertificate, SecretReference};
//!
//! let spec = NginxIngressControllerSpec {
//!     ingress_class_name: "nginx-internal".to_string(),
//!     controller_name_prefix: "nginx-internal".to_string(),
//!     default_ssl_certificate: Some(DefaultSSLCertificate {
//!         secret: Some(SecretReference {
//!             name: "wildcard-cert".to_string(),
//!             namespace: "default".to_string(),
//!         }),
//!         key_vault_uri: None,
//!         force_ssl_redirect: false,
//!     }),
//!     load_balancer_annotations: None,
//! };
//! ```

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Condition represents an observation of a resource's current state.
///
/// Conditions are used in status subresources to communicate the state of
/// a resource to users and controllers.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition. Common types include: Available, ControllerAvailable,
    /// IngressClassReady, Progressing.
    pub r#type: String,

    /// Status of the condition: True, False, or Unknown.
    pub status: String,

    /// Brief CamelCase reason for the condition's last transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message indicating details about the transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Generation of the resource the condition was computed against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    /// Last time the condition transitioned from one status to another (RFC3339 format).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

/// Reference to a single Kubernetes object the operator manages.
///
/// The status's `managedResourceRefs` list is replaced wholesale on each
/// successful reconcile; it is informational and never merged.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManagedObjectReference {
    /// Name of the managed object
    pub name: String,

    /// Namespace of the managed object; empty for cluster-scoped objects
    #[serde(default)]
    pub namespace: String,

    /// Kind of the managed object (e.g., "Deployment")
    pub kind: String,

    /// API group of the managed object; empty for the core group
    #[serde(default)]
    pub api_group: String,
}

/// Reference to a TLS secret used as the controller's default certificate.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretReference {
    /// Name of the secret
    pub name: String,

    /// Namespace of the secret
    pub namespace: String,
}

/// Default SSL certificate configuration for the controller.
///
/// The certificate is considered configured only when the secret reference
/// carries a non-empty name or a Keyvault URI is present.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DefaultSSLCertificate {
    /// Kubernetes secret holding the certificate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<SecretReference>,

    /// Azure Keyvault certificate URI; when set, a placeholder pod keeps the
    /// synced secret warm via the secrets-store CSI driver
    #[serde(rename = "keyVaultURI", skip_serializing_if = "Option::is_none")]
    pub key_vault_uri: Option<String>,

    /// Redirect all plain HTTP traffic to HTTPS
    #[serde(rename = "forceSSLRedirect", default)]
    pub force_ssl_redirect: bool,
}

/// `NginxIngressController` status
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NginxIngressControllerStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Suffix appended to `controllerNamePrefix` when deriving resource names.
    /// Monotonically non-decreasing; never reset, even if earlier names free up.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collision_count: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub managed_resource_refs: Vec<ManagedObjectReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_replicas: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_ready_replicas: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_available_replicas: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_unavailable_replicas: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

/// `NginxIngressController` describes one managed NGINX ingress controller.
///
/// The operator realizes each instance as a full set of Kubernetes objects
/// (Deployment, Service, ConfigMap, RBAC, HPA, PDB, IngressClass) in its
/// target namespace, with names derived from `controllerNamePrefix` plus a
/// collision-count suffix. Deleting the resource cascades to every managed
/// object through owner references.
///
/// # Example
///
/// ```yaml
/// apiVersion: approuting.kubernetes.azure.com/v1alpha1
/// kind: NginxIngressController
/// metadata:
///   name: internal
/// spec:
///   ingressClassName: nginx-internal
///   controllerNamePrefix: nginx-internal
///   defaultSSLCertificate:
///     secret:
///       name: wildcard-cert
///       namespace: default
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "approuting.kubernetes.azure.com",
    version = "v1alpha1",
    kind = "NginxIngressController",
    doc = "NginxIngressController describes a managed NGINX ingress controller instance. The operator generates and maintains the controller's Deployment, Service, ConfigMap, RBAC, autoscaling and IngressClass objects, resolving name collisions automatically."
)]
#[kube(status = "NginxIngressControllerStatus")]
#[serde(rename_all = "camelCase")]
pub struct NginxIngressControllerSpec {
    /// Name of the IngressClass served by this controller.
    ///
    /// The IngressClass object is created with exactly this name; it never
    /// carries the collision-count suffix. Must be unique among ingress
    /// classes cluster-wide.
    #[schemars(
        length(min = 1, max = 253),
        regex(pattern = r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
    )]
    pub ingress_class_name: String,

    /// Prefix for the names of all generated objects except the IngressClass.
    ///
    /// The effective resource name is `<prefix>-<collisionCount>`.
    #[schemars(
        length(min = 1, max = 60),
        regex(pattern = r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$")
    )]
    pub controller_name_prefix: String,

    /// Default SSL certificate served for requests without SNI or without a
    /// matching TLS section.
    #[serde(
        rename = "defaultSSLCertificate",
        skip_serializing_if = "Option::is_none"
    )]
    pub default_ssl_certificate: Option<DefaultSSLCertificate>,

    /// Annotations copied onto the controller's LoadBalancer Service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_balancer_annotations: Option<BTreeMap<String, String>>,
}

/// `SecretProviderClass` from the secrets-store CSI driver, as read by the
/// placeholder pod reconciler.
///
/// This is a foreign resource: the operator consumes only its metadata (owner
/// references, generation, labels) and never emits its CRD from `crdgen`.
/// Unknown spec fields are ignored on deserialization.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[kube(
    group = "secrets-store.csi.x-k8s.io",
    version = "v1",
    kind = "SecretProviderClass",
    namespaced,
    doc = "Minimal read-only view of the secrets-store CSI driver's SecretProviderClass."
)]
#[serde(rename_all = "camelCase")]
pub struct SecretProviderClassSpec {
    /// CSI provider name (e.g., "azure")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// Provider-specific parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<BTreeMap<String, String>>,
}

/// TLS settings of a Gateway listener; only the options map is consumed.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GatewayListenerTls {
    /// Implementation-specific TLS options. The operator reads the Keyvault
    /// certificate URI and ServiceAccount options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<BTreeMap<String, String>>,
}

/// One listener of a Gateway.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GatewayListener {
    /// Listener name, unique within the Gateway
    pub name: String,

    /// TLS configuration; absent for plain listeners
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<GatewayListenerTls>,
}

/// Gateway API `Gateway`, as read when resolving placeholder pod ownership.
///
/// Foreign resource: only `gatewayClassName` and the listener TLS options are
/// consumed; everything else the API server stores is ignored.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[kube(
    group = "gateway.networking.k8s.io",
    version = "v1",
    kind = "Gateway",
    namespaced,
    doc = "Minimal read-only view of the Gateway API Gateway resource."
)]
#[serde(rename_all = "camelCase")]
pub struct GatewaySpec {
    /// Name of the GatewayClass this Gateway belongs to
    pub gateway_class_name: String,

    /// Listeners exposed by this Gateway
    #[serde(default)]
    pub listeners: Vec<GatewayListener>,
}
