// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Placeholder Deployment builder.
//!
//! The placeholder is a single pause container mounting the
//! `SecretProviderClass` as a CSI volume, which keeps the secrets-store CSI
//! driver syncing the Keyvault certificate while no real workload mounts it.

use crate::config::OperatorConfig;
use crate::constants::{
    KIND_SECRET_PROVIDER_CLASS, PLACEHOLDER_POD_CPU, PLACEHOLDER_POD_MEMORY,
    PLACEHOLDER_POD_MOUNT_PATH, PLACEHOLDER_POD_RUN_AS_USER, SECRETS_STORE_API_GROUP,
    SECRETS_STORE_CSI_DRIVER,
};
use crate::crd::SecretProviderClass;
use crate::labels::{
    top_level_labels, APP_LABEL, COMPONENT_PLACEHOLDER_POD, K8S_COMPONENT, K8S_PART_OF,
    OBSERVED_GENERATION_ANNOTATION, OSM_SIDECAR_INJECTION_ANNOTATION, PART_OF_APPROUTING,
    WORKLOAD_IDENTITY_USE_LABEL,
};
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    CSIVolumeSource, Capabilities, Container, PodSpec, PodTemplateSpec, ResourceRequirements,
    SeccompProfile, SecurityContext, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta, OwnerReference};
use std::collections::BTreeMap;
use tracing::debug;

/// Builds the placeholder Deployment for a `SecretProviderClass`.
///
/// Pure and deterministic: same name and namespace as the object, replicas 1,
/// the pause image, minimal fixed resources, a restrictive security context
/// and the CSI volume mount. Pass the resolved workload identity
/// `service_account` only for Gateway-owned objects.
///
/// Returns `None` when the object lacks a name, namespace, or UID; callers
/// surface that as an internal error rather than applying anything.
#[must_use]
pub fn build_placeholder_deployment(
    spc: &SecretProviderClass,
    operator_config: &OperatorConfig,
    service_account: Option<&str>,
) -> Option<Deployment> {
    let name = spc.metadata.name.clone()?;
    let namespace = spc.metadata.namespace.clone()?;
    let uid = spc.metadata.uid.clone()?;
    if name.is_empty() || namespace.is_empty() || uid.is_empty() {
        return None;
    }

    debug!(
        name = %name,
        namespace = %namespace,
        service_account = ?service_account,
        "Building placeholder Deployment for SecretProviderClass"
    );

    let selector_labels = BTreeMap::from([(APP_LABEL.to_string(), name.clone())]);

    let mut pod_labels = selector_labels.clone();
    if service_account.is_some() {
        pod_labels.insert(WORKLOAD_IDENTITY_USE_LABEL.into(), "true".into());
    }

    let generation = spc.metadata.generation.unwrap_or_default();
    let pod_annotations = BTreeMap::from([
        (
            OBSERVED_GENERATION_ANNOTATION.to_string(),
            generation.to_string(),
        ),
        (
            OSM_SIDECAR_INJECTION_ANNOTATION.to_string(),
            "disabled".to_string(),
        ),
    ]);

    Some(Deployment {
        metadata: ObjectMeta {
            name: Some(name.clone()),
            namespace: Some(namespace),
            labels: Some(placeholder_labels(&name)),
            owner_references: Some(vec![OwnerReference {
                api_version: format!("{SECRETS_STORE_API_GROUP}/v1"),
                kind: KIND_SECRET_PROVIDER_CLASS.to_string(),
                name: name.clone(),
                uid,
                controller: Some(true),
                ..Default::default()
            }]),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(1),
            revision_history_limit: Some(2),
            selector: LabelSelector {
                match_labels: Some(selector_labels),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(pod_labels),
                    annotations: Some(pod_annotations),
                    ..Default::default()
                }),
                spec: Some(build_placeholder_pod_spec(
                    &name,
                    operator_config,
                    service_account,
                )),
            },
            ..Default::default()
        }),
        ..Default::default()
    })
}

/// Labels stamped on the placeholder Deployment.
fn placeholder_labels(name: &str) -> BTreeMap<String, String> {
    let mut labels = top_level_labels();
    labels.insert(APP_LABEL.into(), name.to_string());
    labels.insert(K8S_COMPONENT.into(), COMPONENT_PLACEHOLDER_POD.into());
    labels.insert(K8S_PART_OF.into(), PART_OF_APPROUTING.into());
    labels
}

fn build_placeholder_pod_spec(
    spc_name: &str,
    operator_config: &OperatorConfig,
    service_account: Option<&str>,
) -> PodSpec {
    let fixed_resources = BTreeMap::from([
        ("cpu".to_string(), Quantity(PLACEHOLDER_POD_CPU.to_string())),
        (
            "memory".to_string(),
            Quantity(PLACEHOLDER_POD_MEMORY.to_string()),
        ),
    ]);

    let placeholder_container = Container {
        name: "placeholder".into(),
        image: Some(operator_config.pause_image()),
        resources: Some(ResourceRequirements {
            requests: Some(fixed_resources.clone()),
            limits: Some(fixed_resources),
            ..Default::default()
        }),
        security_context: Some(SecurityContext {
            run_as_non_root: Some(true),
            run_as_user: Some(PLACEHOLDER_POD_RUN_AS_USER),
            allow_privilege_escalation: Some(false),
            read_only_root_filesystem: Some(true),
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
        volume_mounts: Some(vec![VolumeMount {
            name: "secrets".into(),
            mount_path: PLACEHOLDER_POD_MOUNT_PATH.into(),
            read_only: Some(true),
            ..Default::default()
        }]),
        ..Default::default()
    };

    PodSpec {
        containers: vec![placeholder_container],
        service_account_name: service_account.map(str::to_string),
        volumes: Some(vec![Volume {
            name: "secrets".into(),
            csi: Some(CSIVolumeSource {
                driver: SECRETS_STORE_CSI_DRIVER.to_string(),
                read_only: Some(true),
                volume_attributes: Some(BTreeMap::from([(
                    "secretProviderClass".to_string(),
                    spc_name.to_string(),
                )])),
                ..Default::default()
            }),
            ..Default::default()
        }]),
        ..Default::default()
    }
}

#[cfg(test)]
#[path = "deployment_tests.rs"]
mod deployment_tests;
