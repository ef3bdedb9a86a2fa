// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#![allow(unexpected_cfgs)]

//! # Approuting - App Routing Operator for Kubernetes
//!
//! Approuting is a Kubernetes operator written in Rust that manages NGINX
//! ingress controller installations through Custom Resource Definitions
//! (CRDs).
//!
//! ## Overview
//!
//! This library provides the core functionality for the app routing
//! operator, including:
//!
//! - The `NginxIngressController` Custom Resource Definition
//! - Reconciliation logic materializing a full controller installation
//!   (IngressClass, RBAC, Deployment, Service, HPA, PDB) per resource
//! - Collision-count resolution for shared naming namespaces
//! - Placeholder pods keeping Keyvault certificates synced for
//!   `SecretProviderClass` objects
//!
//! ## Modules
//!
//! - [`crd`] - Custom Resource Definition types
//! - [`reconcilers`] - Reconciliation logic for each resource type
//! - [`context`] - Shared context for reconcilers
//! - [`nginx_resources`] - Managed object set builders
//! - [`config`] - Operator configuration flags
//! - [`server`] - Health and metrics HTTP endpoints
//!
//! ## Example
//!
//! ```rust,no_run
//! use approuting::crd::{NginxIngressController, NginxIngressControllerSpec};
//!
//! // Create an ingress controller specification
//! let spec = NginxIngressControllerSpec {
//!     ingress_class_name: "nginx-internal".to_string(),
//!     controller_name_prefix: "nginx-internal".to_string(),
//!     default_ssl_certificate: None,
//!     load_balancer_annotations: None,
//! };
//!
//! let nic = NginxIngressController::new("internal", spec);
//! ```
//!
//! ## Features
//!
//! - **Server-Side Apply** - Idempotent upserts with a fixed field manager
//! - **Collision Resolution** - Durable naming decisions under a per-prefix lock
//! - **Status Tracking** - Full status subresources with typed conditions
//! - **Observability** - Prometheus metrics and structured tracing
//!
//! For more information, see the [repository](https://github.com/firestoned/approuting).

pub mod config;
pub mod constants;
pub mod context;
pub mod crd;
pub mod labels;
pub mod metrics;
pub mod nginx_resources;
pub mod reconcile_errors;
pub mod reconcilers;
pub mod server;
pub mod status_reasons;

#[cfg(test)]
mod nginx_resources_tests;
