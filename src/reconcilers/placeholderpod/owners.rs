// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Owner resolution for `SecretProviderClass` placeholder pods.
//!
//! The owner set is closed: `NginxIngressController`, `Ingress`, and (behind
//! the gateway toggle) Gateway API `Gateway`. Each kind contributes one
//! [`SpcOwner`] implementation and one [`owner_registry`] entry; nothing else
//! in the reconciler switches on the owner kind.

use crate::constants::{
    ALB_GATEWAY_CLASS_NAME, GATEWAY_SPC_NAME_PREFIX, KIND_GATEWAY, KIND_INGRESS,
    KIND_NGINX_INGRESS_CONTROLLER,
};
use crate::context::Context;
use crate::crd::{Gateway, NginxIngressController, SecretProviderClass};
use crate::labels::{
    TLS_CERT_KEYVAULT_URI_OPTION, TLS_CERT_SERVICE_ACCOUNT_OPTION,
    WORKLOAD_IDENTITY_CLIENT_ID_ANNOTATION,
};
use crate::reconcile_errors::UserInputError;
use crate::reconcilers::pagination::list_all_paginated;
use anyhow::Result;
use k8s_openapi::api::core::v1::ServiceAccount;
use k8s_openapi::api::networking::v1::Ingress;
use kube::api::ListParams;
use kube::{Api, ResourceExt};
use tracing::debug;

/// Outcome of resolving a placeholder pod's owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerResolution {
    /// The owner object no longer exists. The `SecretProviderClass` itself
    /// will be garbage-collected through its owner reference.
    Missing,
    /// The owner exists but no longer wants a synced Keyvault certificate.
    Inactive,
    /// The owner wants the certificate kept warm.
    Active {
        /// ServiceAccount for workload identity, when the owner names one
        service_account: Option<String>,
    },
}

/// One resolvable owner kind of a `SecretProviderClass`.
#[async_trait::async_trait]
pub trait SpcOwner {
    /// Owner-reference kind this implementation handles.
    fn kind(&self) -> &'static str;

    /// Fetches the owner and decides whether the placeholder should run.
    ///
    /// # Errors
    ///
    /// Returns an error if the owner fetch fails, or a
    /// [`UserInputError`] when the owner's manifest is unusable (Gateway
    /// listeners naming a missing or unannotated ServiceAccount).
    async fn resolve(
        &self,
        ctx: &Context,
        spc: &SecretProviderClass,
        owner_name: &str,
    ) -> Result<OwnerResolution>;
}

/// All owner kinds the operator resolves, in match order.
///
/// The Gateway entry is registered only when gateway support is enabled;
/// with it absent, gateway-owned objects fall through to the no-owner skip.
#[must_use]
pub fn owner_registry(enable_gateway: bool) -> Vec<Box<dyn SpcOwner + Send + Sync>> {
    let mut registry: Vec<Box<dyn SpcOwner + Send + Sync>> = vec![
        Box::new(NginxIngressControllerOwner),
        Box::new(IngressOwner),
    ];
    if enable_gateway {
        registry.push(Box::new(GatewayOwner));
    }
    registry
}

/// `NginxIngressController` owner: active while the resource requests a
/// Keyvault-backed default SSL certificate.
pub struct NginxIngressControllerOwner;

#[async_trait::async_trait]
impl SpcOwner for NginxIngressControllerOwner {
    fn kind(&self) -> &'static str {
        KIND_NGINX_INGRESS_CONTROLLER
    }

    async fn resolve(
        &self,
        ctx: &Context,
        _spc: &SecretProviderClass,
        owner_name: &str,
    ) -> Result<OwnerResolution> {
        let api: Api<NginxIngressController> = Api::all(ctx.client.clone());
        let Some(nic) = api.get_opt(owner_name).await? else {
            return Ok(OwnerResolution::Missing);
        };

        if wants_keyvault_certificate(&nic) {
            Ok(OwnerResolution::Active {
                service_account: None,
            })
        } else {
            debug!(
                owner = %owner_name,
                "NginxIngressController has no Keyvault certificate, placeholder inactive"
            );
            Ok(OwnerResolution::Inactive)
        }
    }
}

fn wants_keyvault_certificate(nic: &NginxIngressController) -> bool {
    nic.spec
        .default_ssl_certificate
        .as_ref()
        .and_then(|certificate| certificate.key_vault_uri.as_deref())
        .is_some_and(|uri| !uri.is_empty())
}

/// `Ingress` owner: active while the Ingress is served by this operator,
/// i.e. its `ingressClassName` belongs to some `NginxIngressController`.
pub struct IngressOwner;

#[async_trait::async_trait]
impl SpcOwner for IngressOwner {
    fn kind(&self) -> &'static str {
        KIND_INGRESS
    }

    async fn resolve(
        &self,
        ctx: &Context,
        spc: &SecretProviderClass,
        owner_name: &str,
    ) -> Result<OwnerResolution> {
        let namespace = spc.namespace().unwrap_or_default();
        let api: Api<Ingress> = Api::namespaced(ctx.client.clone(), &namespace);
        let Some(ingress) = api.get_opt(owner_name).await? else {
            return Ok(OwnerResolution::Missing);
        };

        let Some(class) = ingress
            .spec
            .as_ref()
            .and_then(|spec| spec.ingress_class_name.clone())
        else {
            return Ok(OwnerResolution::Inactive);
        };

        let nics: Api<NginxIngressController> = Api::all(ctx.client.clone());
        let all = list_all_paginated(&nics, ListParams::default()).await?;
        let managed = all.iter().any(|nic| nic.spec.ingress_class_name == class);
        if managed {
            Ok(OwnerResolution::Active {
                service_account: None,
            })
        } else {
            debug!(
                owner = %owner_name,
                ingress_class = %class,
                "Ingress is not served by any NginxIngressController, placeholder inactive"
            );
            Ok(OwnerResolution::Inactive)
        }
    }
}

/// Gateway API `Gateway` owner: active while the listener this object serves
/// carries the Keyvault certificate TLS option on an ALB gateway.
pub struct GatewayOwner;

#[async_trait::async_trait]
impl SpcOwner for GatewayOwner {
    fn kind(&self) -> &'static str {
        KIND_GATEWAY
    }

    async fn resolve(
        &self,
        ctx: &Context,
        spc: &SecretProviderClass,
        owner_name: &str,
    ) -> Result<OwnerResolution> {
        let namespace = spc.namespace().unwrap_or_default();
        let api: Api<Gateway> = Api::namespaced(ctx.client.clone(), &namespace);
        let Some(gateway) = api.get_opt(owner_name).await? else {
            return Ok(OwnerResolution::Missing);
        };

        if gateway.spec.gateway_class_name != ALB_GATEWAY_CLASS_NAME {
            return Ok(OwnerResolution::Inactive);
        }

        let spc_name = spc.name_any();
        let Some(listener_name) = listener_name_from_spc(&spc_name, owner_name) else {
            debug!(
                name = %spc_name,
                gateway = %owner_name,
                "SecretProviderClass name does not encode a listener, placeholder inactive"
            );
            return Ok(OwnerResolution::Inactive);
        };

        let Some(options) = gateway
            .spec
            .listeners
            .iter()
            .find(|listener| listener.name == listener_name)
            .and_then(|listener| listener.tls.as_ref())
            .and_then(|tls| tls.options.as_ref())
        else {
            return Ok(OwnerResolution::Inactive);
        };

        if !listener_wants_keyvault_certificate(options) {
            return Ok(OwnerResolution::Inactive);
        }

        let Some(service_account) = options
            .get(TLS_CERT_SERVICE_ACCOUNT_OPTION)
            .filter(|name| !name.is_empty())
        else {
            return Err(UserInputError::MissingServiceAccountOption {
                gateway: owner_name.to_string(),
                listener: listener_name.to_string(),
            }
            .into());
        };

        verify_workload_identity(ctx, &namespace, service_account).await?;
        Ok(OwnerResolution::Active {
            service_account: Some(service_account.clone()),
        })
    }
}

/// True when the listener's TLS options request a Keyvault certificate.
fn listener_wants_keyvault_certificate(
    options: &std::collections::BTreeMap<String, String>,
) -> bool {
    options
        .get(TLS_CERT_KEYVAULT_URI_OPTION)
        .is_some_and(|uri| !uri.is_empty())
}

/// Recovers the listener name from a Gateway listener's
/// `SecretProviderClass` name (`kv-gw-cert-<gateway>-<listener>`).
fn listener_name_from_spc<'a>(spc_name: &'a str, gateway_name: &str) -> Option<&'a str> {
    spc_name
        .strip_prefix(GATEWAY_SPC_NAME_PREFIX)?
        .strip_prefix('-')?
        .strip_prefix(gateway_name)?
        .strip_prefix('-')
}

/// Checks that the listener's ServiceAccount exists and is usable for
/// workload identity.
async fn verify_workload_identity(ctx: &Context, namespace: &str, name: &str) -> Result<()> {
    let api: Api<ServiceAccount> = Api::namespaced(ctx.client.clone(), namespace);
    let Some(service_account) = api.get_opt(name).await? else {
        return Err(UserInputError::InvalidServiceAccount {
            name: name.to_string(),
            namespace: namespace.to_string(),
            reason: "not found".to_string(),
        }
        .into());
    };

    let annotated = service_account
        .metadata
        .annotations
        .as_ref()
        .and_then(|annotations| annotations.get(WORKLOAD_IDENTITY_CLIENT_ID_ANNOTATION))
        .is_some_and(|client_id| !client_id.is_empty());
    if !annotated {
        return Err(UserInputError::InvalidServiceAccount {
            name: name.to_string(),
            namespace: namespace.to_string(),
            reason: format!("missing the '{WORKLOAD_IDENTITY_CLIENT_ID_ANNOTATION}' annotation"),
        }
        .into());
    }

    Ok(())
}

#[cfg(test)]
#[path = "owners_tests.rs"]
mod owners_tests;
