// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Operator configuration parsed from command-line flags and environment.
//!
//! Every flag has an `APPROUTING_*` environment fallback so the Deployment
//! manifest can configure the operator either way. [`OperatorConfig::validate`]
//! runs once at startup, before any controller starts; reconcilers can assume
//! a validated config.

use anyhow::{bail, Context, Result};
use clap::Parser;

use crate::constants::{
    DEFAULT_LEASE_DURATION_SECS, DEFAULT_LEASE_GRACE_SECS, DEFAULT_METRICS_ADDR,
    DEFAULT_NGINX_INGRESS_VERSION, DEFAULT_NIC_CONTROLLER_CLASS, NGINX_INGRESS_IMAGE_PATH,
    PAUSE_IMAGE_PATH, PAUSE_IMAGE_VERSION,
};

/// App routing operator configuration.
#[derive(Parser, Debug, Clone)]
#[command(name = "approuting")]
#[command(version)]
#[command(about = "App Routing Operator for Kubernetes", long_about = None)]
pub struct OperatorConfig {
    /// Container registry hosting the ingress controller and pause images
    #[arg(long, env = "APPROUTING_REGISTRY", default_value = "mcr.microsoft.com")]
    pub registry: String,

    /// Namespace where managed controller resources are created
    #[arg(
        long,
        env = "APPROUTING_NAMESPACE",
        default_value = "app-routing-system"
    )]
    pub namespace: String,

    /// Controller class claimed by the default NginxIngressController
    #[arg(
        long,
        env = "APPROUTING_DEFAULT_NIC_CONTROLLER_CLASS",
        default_value = DEFAULT_NIC_CONTROLLER_CLASS
    )]
    pub default_nic_controller_class: String,

    /// Ensure the default NginxIngressController exists at startup
    #[arg(
        long,
        env = "APPROUTING_ENABLE_DEFAULT_NIC",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub enable_default_nic: bool,

    /// Register the Gateway API owner for placeholder pod resolution
    #[arg(long, env = "APPROUTING_ENABLE_GATEWAY")]
    pub enable_gateway: bool,

    /// Bind address for the health and metrics HTTP server
    #[arg(long, env = "APPROUTING_METRICS_ADDR", default_value = DEFAULT_METRICS_ADDR)]
    pub metrics_addr: String,

    /// Name of the leader election lease
    #[arg(
        long,
        env = "APPROUTING_LEASE_NAME",
        default_value = "approuting-operator-lease"
    )]
    pub lease_name: String,

    /// Leader election lease duration in seconds
    #[arg(
        long,
        env = "APPROUTING_LEASE_DURATION_SECS",
        default_value_t = DEFAULT_LEASE_DURATION_SECS
    )]
    pub lease_duration_secs: u64,

    /// Leader election lease grace period in seconds
    #[arg(
        long,
        env = "APPROUTING_LEASE_GRACE_SECS",
        default_value_t = DEFAULT_LEASE_GRACE_SECS
    )]
    pub lease_grace_secs: u64,

    /// Run without leader election (single-replica deployments only)
    #[arg(long, env = "APPROUTING_DISABLE_LEADER_ELECTION")]
    pub disable_leader_election: bool,
}

impl OperatorConfig {
    /// Validates the configuration before any controller starts.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid flag.
    pub fn validate(&self) -> Result<()> {
        if self.registry.trim().is_empty() {
            bail!("--registry must not be empty");
        }
        if self.namespace.trim().is_empty() {
            bail!("--namespace must not be empty");
        }
        if self.default_nic_controller_class.trim().is_empty() {
            bail!("--default-nic-controller-class must not be empty");
        }
        self.metrics_addr
            .parse::<std::net::SocketAddr>()
            .context("--metrics-addr must be a host:port bind address")?;
        if self.lease_duration_secs <= self.lease_grace_secs {
            bail!(
                "--lease-duration-secs ({}) must exceed --lease-grace-secs ({})",
                self.lease_duration_secs,
                self.lease_grace_secs
            );
        }
        Ok(())
    }

    /// Full image reference for the NGINX ingress controller container.
    #[must_use]
    pub fn nginx_image(&self) -> String {
        format!(
            "{}/{}:{}",
            self.registry.trim_end_matches('/'),
            NGINX_INGRESS_IMAGE_PATH,
            DEFAULT_NGINX_INGRESS_VERSION
        )
    }

    /// Full image reference for the placeholder pause container.
    #[must_use]
    pub fn pause_image(&self) -> String {
        format!(
            "{}/{}:{}",
            self.registry.trim_end_matches('/'),
            PAUSE_IMAGE_PATH,
            PAUSE_IMAGE_VERSION
        )
    }
}
