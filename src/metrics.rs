// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the app routing operator.
//!
//! This module provides metrics collection with the namespace prefix
//! `approuting_`. The [`Metrics`] sink owns its own `Registry` and is
//! constructed once in `main`, then shared through the reconciler context;
//! nothing registers into a process-global registry.
//!
//! # Metrics Categories
//!
//! - **Reconciliation Metrics** - Track reconciliation operations and their outcomes
//! - **Collision Metrics** - Track collision resolution outcomes
//! - **Resource Lifecycle Metrics** - Track managed object application
//! - **Error Metrics** - Track error conditions by category
//! - **Leader Election Metrics** - Track leadership state
//!
//! # Example
//!
//! ```rust,no_run
//! use approuting::metrics::Metrics;
//!
//! let metrics = Metrics::new().unwrap();
//! metrics.record_reconciliation_success("NginxIngressController", std::time::Duration::from_secs(1));
//! let exposition = metrics.gather().unwrap();
//! ```

use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

/// Namespace prefix for all operator metrics (prometheus-safe)
const METRICS_NAMESPACE: &str = "approuting";

/// Metrics sink shared by every reconciler in the process.
///
/// The registry is private to the sink; `/metrics` renders it through
/// [`Metrics::gather`].
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    reconciliations_total: CounterVec,
    reconciliation_duration_seconds: HistogramVec,
    collision_resolutions_total: CounterVec,
    managed_resources_applied_total: CounterVec,
    errors_total: CounterVec,
    leader_status: GaugeVec,
}

impl Metrics {
    /// Creates a sink with all metric families registered in a fresh registry.
    ///
    /// # Errors
    ///
    /// Returns an error if prometheus rejects a metric definition; with the
    /// definitions below that only happens if two families share a name.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // Labels:
        // - `controller`: reconciler name (e.g., `NginxIngressController`)
        // - `status`: outcome (`success`, `error`)
        let reconciliations_total = CounterVec::new(
            Opts::new(
                format!("{METRICS_NAMESPACE}_reconciliations_total"),
                "Total number of reconciliations by controller and status",
            ),
            &["controller", "status"],
        )?;
        registry.register(Box::new(reconciliations_total.clone()))?;

        // Labels:
        // - `controller`: reconciler name
        let reconciliation_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                format!("{METRICS_NAMESPACE}_reconciliation_duration_seconds"),
                "Duration of reconciliations in seconds by controller",
            )
            .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]),
            &["controller"],
        )?;
        registry.register(Box::new(reconciliation_duration_seconds.clone()))?;

        // Labels:
        // - `outcome`: `none`, `resolved`, `ingress_class`, `max_collisions`
        let collision_resolutions_total = CounterVec::new(
            Opts::new(
                format!("{METRICS_NAMESPACE}_collision_resolutions_total"),
                "Total number of collision resolution passes by outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(collision_resolutions_total.clone()))?;

        // Labels:
        // - `kind`: Kubernetes kind of the applied object
        let managed_resources_applied_total = CounterVec::new(
            Opts::new(
                format!("{METRICS_NAMESPACE}_managed_resources_applied_total"),
                "Total number of managed objects applied by kind",
            ),
            &["kind"],
        )?;
        registry.register(Box::new(managed_resources_applied_total.clone()))?;

        // Labels:
        // - `controller`: reconciler name
        // - `error_type`: category (`api_error`, `collision`, `user_input`, `internal`)
        let errors_total = CounterVec::new(
            Opts::new(
                format!("{METRICS_NAMESPACE}_errors_total"),
                "Total number of errors by controller and error category",
            ),
            &["controller", "error_type"],
        )?;
        registry.register(Box::new(errors_total.clone()))?;

        // Labels:
        // - `pod_name`: name of this operator pod
        //
        // Value: 1 if leader, 0 if follower
        let leader_status = GaugeVec::new(
            Opts::new(
                format!("{METRICS_NAMESPACE}_leader_status"),
                "Current leader election status (1 = leader, 0 = follower)",
            ),
            &["pod_name"],
        )?;
        registry.register(Box::new(leader_status.clone()))?;

        Ok(Self {
            registry,
            reconciliations_total,
            reconciliation_duration_seconds,
            collision_resolutions_total,
            managed_resources_applied_total,
            errors_total,
            leader_status,
        })
    }

    /// Record a successful reconciliation
    ///
    /// # Arguments
    /// * `controller` - The reconciler name (e.g., `NginxIngressController`)
    /// * `duration` - Duration of the reconciliation
    pub fn record_reconciliation_success(&self, controller: &str, duration: Duration) {
        self.reconciliations_total
            .with_label_values(&[controller, "success"])
            .inc();
        self.reconciliation_duration_seconds
            .with_label_values(&[controller])
            .observe(duration.as_secs_f64());
    }

    /// Record a failed reconciliation
    ///
    /// # Arguments
    /// * `controller` - The reconciler name
    /// * `duration` - Duration of the reconciliation before failure
    pub fn record_reconciliation_error(&self, controller: &str, duration: Duration) {
        self.reconciliations_total
            .with_label_values(&[controller, "error"])
            .inc();
        self.reconciliation_duration_seconds
            .with_label_values(&[controller])
            .observe(duration.as_secs_f64());
    }

    /// Record the outcome of one collision resolution pass
    ///
    /// # Arguments
    /// * `outcome` - `none`, `resolved`, `ingress_class`, or `max_collisions`
    pub fn record_collision_resolution(&self, outcome: &str) {
        self.collision_resolutions_total
            .with_label_values(&[outcome])
            .inc();
    }

    /// Record one applied managed object
    ///
    /// # Arguments
    /// * `kind` - Kubernetes kind of the applied object
    pub fn record_resource_applied(&self, kind: &str) {
        self.managed_resources_applied_total
            .with_label_values(&[kind])
            .inc();
    }

    /// Record an error occurrence
    ///
    /// # Arguments
    /// * `controller` - The reconciler name
    /// * `error_type` - Category of error (`api_error`, `collision`, `user_input`, `internal`)
    pub fn record_error(&self, controller: &str, error_type: &str) {
        self.errors_total
            .with_label_values(&[controller, error_type])
            .inc();
    }

    /// Record the current leadership state of this pod
    ///
    /// # Arguments
    /// * `pod_name` - Name of this operator pod
    /// * `is_leader` - Whether this pod currently holds the lease
    pub fn record_leader_status(&self, pod_name: &str, is_leader: bool) {
        self.leader_status
            .with_label_values(&[pod_name])
            .set(if is_leader { 1.0 } else { 0.0 });
    }

    /// Renders all metrics in the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the output is not valid UTF-8.
    pub fn gather(&self) -> Result<String, prometheus::Error> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| prometheus::Error::Msg(format!("metrics are not valid UTF-8: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_reconciliation_success() {
        let metrics = Metrics::new().unwrap();
        metrics
            .record_reconciliation_success("NginxIngressController", Duration::from_millis(250));

        let output = metrics.gather().unwrap();
        assert!(output.contains("approuting_reconciliations_total"));
        assert!(output.contains("controller=\"NginxIngressController\""));
        assert!(output.contains("status=\"success\""));
    }

    #[test]
    fn test_record_reconciliation_error() {
        let metrics = Metrics::new().unwrap();
        metrics.record_reconciliation_error("SecretProviderClass", Duration::from_secs(2));

        let output = metrics.gather().unwrap();
        assert!(output.contains("status=\"error\""));
        assert!(output.contains("approuting_reconciliation_duration_seconds"));
    }

    #[test]
    fn test_collision_outcomes_are_independent_series() {
        let metrics = Metrics::new().unwrap();
        metrics.record_collision_resolution("none");
        metrics.record_collision_resolution("resolved");
        metrics.record_collision_resolution("resolved");

        let output = metrics.gather().unwrap();
        assert!(output.contains("outcome=\"none\""));
        assert!(output.contains("outcome=\"resolved\""));
    }

    #[test]
    fn test_independent_sinks_do_not_conflict() {
        // Two sinks own two registries; constructing both must not collide.
        let first = Metrics::new().unwrap();
        let second = Metrics::new().unwrap();

        first.record_resource_applied("Deployment");
        let output = second.gather().unwrap();
        assert!(!output.contains("kind=\"Deployment\""));
    }

    #[test]
    fn test_leader_status_gauge() {
        let metrics = Metrics::new().unwrap();
        metrics.record_leader_status("approuting-operator-0", true);

        let output = metrics.gather().unwrap();
        assert!(output.contains("approuting_leader_status"));
        assert!(output.contains("pod_name=\"approuting-operator-0\""));
    }
}
