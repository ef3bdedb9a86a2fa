// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common label and annotation constants used across all reconcilers.
//!
//! This module defines standard Kubernetes labels, the operator's top-level
//! label set, and the Azure-facing annotations consumed by the secrets-store
//! CSI driver and workload identity webhook.

use std::collections::BTreeMap;

use kube::api::ObjectMeta;

// ============================================================================
// Kubernetes Standard Labels
// https://kubernetes.io/docs/concepts/overview/working-with-objects/common-labels/
// ============================================================================

/// Standard label for the component name within the architecture (e.g., "ingress-controller")
pub const K8S_COMPONENT: &str = "app.kubernetes.io/component";

/// Standard label for the tool being used to manage the operation of an application
pub const K8S_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

/// Standard label for the name of the application (e.g., "nginx")
pub const K8S_NAME: &str = "app.kubernetes.io/name";

/// Standard label for a unique name identifying the instance of an application
pub const K8S_INSTANCE: &str = "app.kubernetes.io/instance";

/// Standard label for the name of a higher-level application this one is part of
pub const K8S_PART_OF: &str = "app.kubernetes.io/part-of";

// ============================================================================
// Kubernetes Standard Label Values
// ============================================================================

/// Value for `app.kubernetes.io/managed-by` on every object the operator owns.
///
/// This is the operator's "top-level" label. Objects carrying it (with this
/// exact value) are fair game for collision accounting and cleanup; objects
/// without it are never deleted by the operator.
pub const MANAGED_BY_OPERATOR: &str = "approuting-operator";

/// Value for `app.kubernetes.io/part-of` indicating this resource is part of app routing
pub const PART_OF_APPROUTING: &str = "approuting";

/// Component value for NGINX ingress controller resources
pub const COMPONENT_INGRESS_CONTROLLER: &str = "ingress-controller";

/// Component value for Keyvault placeholder pod deployments
pub const COMPONENT_PLACEHOLDER_POD: &str = "placeholder-pod";

// ============================================================================
// Selector Labels
// ============================================================================

/// Plain selector label keying pods to their Deployment (`app: <resource name>`)
pub const APP_LABEL: &str = "app";

// ============================================================================
// Azure-Facing Annotations and Labels
// ============================================================================

/// Annotation recording the owner's generation observed when a placeholder pod
/// template was last built; bumping it forces a pod rollout on owner change
pub const OBSERVED_GENERATION_ANNOTATION: &str = "kubernetes.azure.com/observed-generation";

/// Annotation disabling Open Service Mesh sidecar injection on placeholder pods
pub const OSM_SIDECAR_INJECTION_ANNOTATION: &str = "openservicemesh.io/sidecar-injection";

/// Pod label switching on the Azure workload identity webhook
pub const WORKLOAD_IDENTITY_USE_LABEL: &str = "azure.workload.identity/use";

/// ServiceAccount annotation carrying the workload identity client ID
pub const WORKLOAD_IDENTITY_CLIENT_ID_ANNOTATION: &str = "azure.workload.identity/client-id";

/// Gateway listener TLS option naming the Keyvault certificate URI
pub const TLS_CERT_KEYVAULT_URI_OPTION: &str = "kubernetes.azure.com/tls-cert-keyvault-uri";

/// Gateway listener TLS option naming the ServiceAccount used to fetch the certificate
pub const TLS_CERT_SERVICE_ACCOUNT_OPTION: &str = "kubernetes.azure.com/tls-cert-service-account";

// ============================================================================
// Top-Level Label Set
// ============================================================================

/// Returns the operator's top-level label set.
///
/// Every generated object except the target Namespace carries these labels.
/// Ownership checks during collision resolution and placeholder cleanup key
/// off this exact set.
#[must_use]
pub fn top_level_labels() -> BTreeMap<String, String> {
    BTreeMap::from([(K8S_MANAGED_BY.to_string(), MANAGED_BY_OPERATOR.to_string())])
}

/// Returns true when `metadata` carries every top-level label with the
/// operator's values.
///
/// Extra labels on the object are ignored; a missing key or a foreign value
/// means the object is not operator-managed.
#[must_use]
pub fn has_top_level_labels(metadata: &ObjectMeta) -> bool {
    let Some(labels) = metadata.labels.as_ref() else {
        return false;
    };

    top_level_labels()
        .iter()
        .all(|(key, value)| labels.get(key) == Some(value))
}
