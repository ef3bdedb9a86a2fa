// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the app routing operator.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group for the operator's CRDs
pub const API_GROUP: &str = "approuting.kubernetes.azure.com";

/// API version for the operator's CRDs
pub const API_VERSION: &str = "v1alpha1";

/// Fully qualified API version (group/version)
pub const API_GROUP_VERSION: &str = "approuting.kubernetes.azure.com/v1alpha1";

/// Kind name for `NginxIngressController` resource
pub const KIND_NGINX_INGRESS_CONTROLLER: &str = "NginxIngressController";

/// Kind name for `Ingress` resources
pub const KIND_INGRESS: &str = "Ingress";

/// Kind name for Gateway API `Gateway` resources
pub const KIND_GATEWAY: &str = "Gateway";

/// Kind name for the secrets-store CSI driver's `SecretProviderClass`
pub const KIND_SECRET_PROVIDER_CLASS: &str = "SecretProviderClass";

/// API group of the secrets-store CSI driver's `SecretProviderClass`
pub const SECRETS_STORE_API_GROUP: &str = "secrets-store.csi.x-k8s.io";

/// API group of the Gateway API
pub const GATEWAY_API_GROUP: &str = "gateway.networking.k8s.io";

// ============================================================================
// Default Instance Constants
// ============================================================================

/// Name of the well-known default `NginxIngressController`
pub const DEFAULT_NIC_NAME: &str = "default";

/// IngressClass served by the default instance
pub const DEFAULT_INGRESS_CLASS_NAME: &str = "webapprouting.kubernetes.azure.com";

/// Fixed resource name used by the default instance.
///
/// The default instance never participates in collision resolution: shifting
/// this name would orphan the cluster's default ingress path.
pub const DEFAULT_NIC_RESOURCE_NAME: &str = "nginx";

/// Controller name prefix recorded on the default instance's spec
pub const DEFAULT_NIC_CONTROLLER_NAME_PREFIX: &str = "nginx";

/// Default controller class for the default instance (operator flag default)
pub const DEFAULT_NIC_CONTROLLER_CLASS: &str = "webapprouting.kubernetes.azure.com/nginx";

// ============================================================================
// Naming and Collision Constants
// ============================================================================

/// Prefix of every derived controller class (`<prefix><escaped name>`)
pub const CONTROLLER_CLASS_PREFIX: &str = "approuting.kubernetes.azure.com/";

/// Maximum length of a derived controller class; longer values are truncated
pub const CONTROLLER_CLASS_MAX_LEN: usize = 250;

/// Ceiling for the per-resource collision count.
///
/// A count past this ceiling is a terminal error: something is squatting on
/// the whole name range and incrementing further will not converge.
pub const MAX_COLLISIONS: i32 = 100;

// ============================================================================
// NGINX Ingress Controller Constants
// ============================================================================

/// Image repository path (under the configured registry) for the controller
pub const NGINX_INGRESS_IMAGE_PATH: &str = "oss/kubernetes/ingress/nginx-ingress-controller";

/// Default NGINX ingress controller image tag
pub const DEFAULT_NGINX_INGRESS_VERSION: &str = "v1.11.5";

/// Container port serving plain HTTP traffic
pub const NGINX_HTTP_PORT: i32 = 8080;

/// Container port serving TLS traffic
pub const NGINX_HTTPS_PORT: i32 = 8443;

/// Controller health endpoint port used by liveness and readiness probes
pub const NGINX_HEALTHZ_PORT: i32 = 10254;

/// Liveness probe initial delay (wait for the controller to start)
pub const LIVENESS_INITIAL_DELAY_SECS: i32 = 10;

/// Liveness probe period (how often to check)
pub const LIVENESS_PERIOD_SECS: i32 = 10;

/// Liveness probe timeout
pub const LIVENESS_TIMEOUT_SECS: i32 = 5;

/// Liveness probe failure threshold
pub const LIVENESS_FAILURE_THRESHOLD: i32 = 3;

/// Readiness probe initial delay
pub const READINESS_INITIAL_DELAY_SECS: i32 = 10;

/// Readiness probe period
pub const READINESS_PERIOD_SECS: i32 = 5;

/// Readiness probe timeout
pub const READINESS_TIMEOUT_SECS: i32 = 3;

/// Readiness probe failure threshold
pub const READINESS_FAILURE_THRESHOLD: i32 = 3;

/// Default minimum replica count for the controller HPA
pub const DEFAULT_MIN_REPLICAS: i32 = 2;

/// Default maximum replica count for the controller HPA
pub const DEFAULT_MAX_REPLICAS: i32 = 100;

/// Default CPU utilization target for the controller HPA
pub const DEFAULT_TARGET_CPU_UTILIZATION: i32 = 80;

// ============================================================================
// Placeholder Pod Constants
// ============================================================================

/// Image repository path (under the configured registry) for the pause image
pub const PAUSE_IMAGE_PATH: &str = "oss/kubernetes/pause";

/// Pause image tag used by placeholder pods
pub const PAUSE_IMAGE_VERSION: &str = "3.10";

/// CPU request and limit for placeholder pods
pub const PLACEHOLDER_POD_CPU: &str = "20m";

/// Memory request and limit for placeholder pods
pub const PLACEHOLDER_POD_MEMORY: &str = "24Mi";

/// Mount path of the secrets-store CSI volume inside placeholder pods
pub const PLACEHOLDER_POD_MOUNT_PATH: &str = "/mnt/secrets";

/// Non-root UID placeholder pods run as
pub const PLACEHOLDER_POD_RUN_AS_USER: i64 = 65535;

/// CSI driver name serving `SecretProviderClass` volumes
pub const SECRETS_STORE_CSI_DRIVER: &str = "secrets-store.csi.k8s.io";

// ============================================================================
// Gateway API Constants
// ============================================================================

/// GatewayClass name for Application Load Balancer gateways the operator serves
pub const ALB_GATEWAY_CLASS_NAME: &str = "azure-alb-external";

/// Name prefix of `SecretProviderClass` objects generated for Gateway
/// listeners. The full name is `kv-gw-cert-<gateway>-<listener>`, which lets
/// the owner resolver recover the listener name from the object name.
pub const GATEWAY_SPC_NAME_PREFIX: &str = "kv-gw-cert";

// ============================================================================
// Controller Requeue Constants
// ============================================================================

/// Requeue duration for controller errors (30 seconds)
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

/// Requeue duration after an unreconcilable collision (1 minute)
pub const UNRECONCILABLE_REQUEUE_DURATION_SECS: u64 = 60;

/// Requeue duration when the controller instance is fully available (5 minutes)
pub const READY_REQUEUE_DURATION_SECS: u64 = 300;

/// Requeue duration while the controller instance is not yet available (30 seconds)
pub const UNREADY_REQUEUE_DURATION_SECS: u64 = 30;

// ============================================================================
// Leader Election Constants
// ============================================================================

/// Default leader election lease duration (15 seconds)
pub const DEFAULT_LEASE_DURATION_SECS: u64 = 15;

/// Default leader election lease grace period (5 seconds)
pub const DEFAULT_LEASE_GRACE_SECS: u64 = 5;

// ============================================================================
// Kubernetes API Constants
// ============================================================================

/// Field manager recorded on server-side apply patches
pub const FIELD_MANAGER: &str = "approuting";

/// Page size for paginated list operations
pub const KUBE_LIST_PAGE_SIZE: u32 = 500;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

// ============================================================================
// Metrics Server Constants
// ============================================================================

/// Default bind address for the health and metrics HTTP server
pub const DEFAULT_METRICS_ADDR: &str = "0.0.0.0:8080";

/// Path for Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";
