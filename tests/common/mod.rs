// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common test utilities for integration tests

use approuting::crd::{
    DefaultSSLCertificate, NginxIngressController, NginxIngressControllerSpec, SecretReference,
};
use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, DeleteParams, PostParams};
use kube::client::Client;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::sleep;

/// Get a Kubernetes client or skip the test if not in a cluster
pub async fn get_kube_client_or_skip() -> Option<Client> {
    match Client::try_default().await {
        Ok(client) => {
            println!("✓ Successfully connected to Kubernetes cluster");
            Some(client)
        }
        Err(e) => {
            eprintln!("⊘ Skipping integration test: not running in Kubernetes cluster: {e}");
            None
        }
    }
}

/// Create a test namespace
pub async fn create_test_namespace(
    client: &Client,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    let mut labels = BTreeMap::new();
    labels.insert("test".to_string(), "integration".to_string());
    labels.insert("managed-by".to_string(), "approuting-test".to_string());

    let test_ns = Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: Some(labels),
            ..Default::default()
        },
        ..Default::default()
    };

    match namespaces.create(&PostParams::default(), &test_ns).await {
        Ok(_) => {
            println!("✓ Created test namespace: {name}");
            Ok(())
        }
        Err(kube::Error::Api(ae)) if ae.code == 409 => {
            println!("  Test namespace already exists: {name}");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

/// Delete a test namespace
pub async fn cleanup_test_namespace(client: &Client, name: &str) {
    let namespaces: Api<Namespace> = Api::all(client.clone());
    match namespaces.delete(name, &DeleteParams::default()).await {
        Ok(_) => println!("✓ Deleted test namespace: {name}"),
        Err(kube::Error::Api(ae)) if ae.code == 404 => {
            println!("  Test namespace already deleted: {name}");
        }
        Err(e) => eprintln!("⚠ Failed to delete test namespace {name}: {e}"),
    }
}

/// Create an `NginxIngressController` for testing
pub async fn create_test_nic(
    client: &Client,
    name: &str,
    ingress_class_name: &str,
    controller_name_prefix: &str,
    certificate_secret: Option<(&str, &str)>,
) -> Result<NginxIngressController, Box<dyn std::error::Error>> {
    let api: Api<NginxIngressController> = Api::all(client.clone());

    let nic = NginxIngressController::new(
        name,
        NginxIngressControllerSpec {
            ingress_class_name: ingress_class_name.to_string(),
            controller_name_prefix: controller_name_prefix.to_string(),
            default_ssl_certificate: certificate_secret.map(|(secret_name, namespace)| {
                DefaultSSLCertificate {
                    secret: Some(SecretReference {
                        name: secret_name.to_string(),
                        namespace: namespace.to_string(),
                    }),
                    key_vault_uri: None,
                    force_ssl_redirect: false,
                }
            }),
            load_balancer_annotations: None,
        },
    );

    let created = api.create(&PostParams::default(), &nic).await?;
    println!("✓ Created NginxIngressController: {name}");
    Ok(created)
}

/// Delete an `NginxIngressController`, tolerating not-found
pub async fn cleanup_test_nic(client: &Client, name: &str) {
    let api: Api<NginxIngressController> = Api::all(client.clone());
    match api.delete(name, &DeleteParams::default()).await {
        Ok(_) => println!("✓ Deleted NginxIngressController: {name}"),
        Err(kube::Error::Api(ae)) if ae.code == 404 => {
            println!("  NginxIngressController already deleted: {name}");
        }
        Err(e) => eprintln!("⚠ Failed to delete NginxIngressController {name}: {e}"),
    }
}

/// Poll until a predicate over the live `NginxIngressController` holds, or
/// the timeout passes. Returns the last observed object either way.
pub async fn wait_for_nic<F>(
    client: &Client,
    name: &str,
    timeout: Duration,
    mut predicate: F,
) -> Option<NginxIngressController>
where
    F: FnMut(&NginxIngressController) -> bool,
{
    let api: Api<NginxIngressController> = Api::all(client.clone());
    let deadline = tokio::time::Instant::now() + timeout;
    let mut last = None;

    loop {
        if let Ok(Some(nic)) = api.get_opt(name).await {
            if predicate(&nic) {
                return Some(nic);
            }
            last = Some(nic);
        }
        if tokio::time::Instant::now() >= deadline {
            return last;
        }
        sleep(Duration::from_secs(2)).await;
    }
}

/// Find a condition by type on an `NginxIngressController` status
pub fn nic_condition<'a>(
    nic: &'a NginxIngressController,
    condition_type: &str,
) -> Option<&'a approuting::crd::Condition> {
    nic.status
        .as_ref()?
        .conditions
        .iter()
        .find(|c| c.r#type == condition_type)
}
