// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes reconciliation controllers for managed ingress resources.
//!
//! This module contains the reconciliation logic for the app routing Custom
//! Resources. Each reconciler watches for changes to its respective resource
//! type and drives the cluster toward the declared state.
//!
//! # Reconciliation Architecture
//!
//! The operator follows the standard Kubernetes controller pattern:
//!
//! 1. **Watch** - Monitor resource changes via Kubernetes API
//! 2. **Reconcile** - Compare desired state (CRD spec) with actual state
//! 3. **Update** - Create or server-side-apply the managed resources
//! 4. **Status** - Report reconciliation results back to Kubernetes
//!
//! # Available Reconcilers
//!
//! ## Ingress Controllers
//!
//! - [`reconcile_nginx_ingress_controller`] - Materializes a full nginx
//!   deployment (namespace, RBAC, config, service, deployment, HPA, PDB and
//!   `IngressClass`) for each `NginxIngressController`
//!
//! ## Keyvault Placeholder Pods
//!
//! - [`reconcile_secret_provider_class`] - Keeps a placeholder deployment
//!   mounting each operator-labeled `SecretProviderClass` so the CSI driver
//!   syncs certificates while the owning resource is active
//!
//! # Example: Using a Reconciler
//!
//! ```rust,no_run
//! use approuting::reconcilers::reconcile_nginx_ingress_controller;
//! use approuting::crd::NginxIngressController;
//! use approuting::context::Context;
//! use std::sync::Arc;
//!
//! async fn reconcile(ctx: Arc<Context>, nic: Arc<NginxIngressController>) -> anyhow::Result<()> {
//!     reconcile_nginx_ingress_controller(ctx, nic).await?;
//!     Ok(())
//! }
//! ```

pub mod locks;
pub mod nginxingress;
pub mod pagination;
pub mod placeholderpod;
pub mod resources;
pub mod retry;
pub mod status;

#[cfg(test)]
mod placeholderpod_tests;

pub use nginxingress::reconcile_nginx_ingress_controller;
pub use placeholderpod::reconcile_secret_provider_class;
