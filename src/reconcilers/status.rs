// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Status condition helpers for Kubernetes resources.
//!
//! This module provides utility functions for creating and managing Kubernetes
//! status conditions following the standard conventions.
//!
//! # Condition Format
//!
//! Kubernetes conditions follow a standard format:
//! - `type`: The aspect of the resource being reported (e.g., "Available", "Progressing")
//! - `status`: "True", "False", or "Unknown"
//! - `reason`: A programmatic identifier (CamelCase)
//! - `message`: A human-readable explanation
//! - `observedGeneration`: The spec generation the condition was computed against
//! - `lastTransitionTime`: RFC3339 timestamp when the condition changed
//!
//! # Example
//!
//! ```rust,no_run
//! use approuting::reconcilers::status::create_condition;
//! use approuting::crd::Condition;
//!
//! let condition = create_condition(
//!     "Available",
//!     "True",
//!     "Ready",
//!     "NGINX ingress controller is available",
//!     Some(3),
//! );
//! ```

use crate::crd::{Condition, NginxIngressController, NginxIngressControllerStatus};
use crate::reconcilers::retry::retry_api_call;
use anyhow::Result;
use chrono::Utc;
use kube::api::Patch;
use kube::{api::PatchParams, Api, Client};
use serde_json::json;
use tracing::debug;

/// Create a new Kubernetes condition with the current timestamp.
///
/// This is a convenience function for creating conditions that follow Kubernetes
/// conventions. The `lastTransitionTime` is automatically set to the current time.
///
/// # Arguments
///
/// * `condition_type` - The type of condition (e.g., "Available", "Progressing")
/// * `status` - The status: "True", "False", or "Unknown"
/// * `reason` - A programmatic identifier in `CamelCase` (e.g., "`IngressClassReady`")
/// * `message` - A human-readable explanation
/// * `observed_generation` - The spec generation this condition was computed against
///
/// # Returns
///
/// A new `Condition` with the current timestamp.
///
/// # Example
///
/// ```rust,no_run
/// # use approuting::reconcilers::status::create_condition;
/// let condition = create_condition(
///     "Available",
///     "True",
///     "Ready",
///     "All controller replicas are ready",
///     Some(2),
/// );
/// assert_eq!(condition.r#type, "Available");
/// assert_eq!(condition.status, "True");
/// ```
#[must_use]
pub fn create_condition(
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
    observed_generation: Option<i64>,
) -> Condition {
    Condition {
        r#type: condition_type.to_string(),
        status: status.to_string(),
        reason: Some(reason.to_string()),
        message: Some(message.to_string()),
        observed_generation,
        last_transition_time: Some(Utc::now().to_rfc3339()),
    }
}

/// Find a condition by type in a list of conditions.
///
/// # Arguments
///
/// * `conditions` - The list of conditions to search
/// * `condition_type` - The type of condition to find (e.g., "Available")
///
/// # Returns
///
/// The matching condition if found, otherwise `None`.
#[must_use]
pub fn find_condition<'a>(
    conditions: &'a [Condition],
    condition_type: &str,
) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.r#type == condition_type)
}

/// Check whether a condition type currently reports status "True".
#[must_use]
pub fn condition_is_true(conditions: &[Condition], condition_type: &str) -> bool {
    find_condition(conditions, condition_type).is_some_and(|c| c.status == "True")
}

/// Update or add a condition in a mutable conditions list (in-memory, no API call).
///
/// This function modifies the conditions list in-place by either updating an existing
/// condition or adding a new one. It preserves the `lastTransitionTime` if the status
/// hasn't changed, or sets a new timestamp if it has.
///
/// **Important:** This function does NOT make any Kubernetes API calls. It only modifies
/// the in-memory conditions list. The caller persists the result separately.
///
/// # Arguments
///
/// * `conditions` - Mutable reference to the conditions list
/// * `condition` - The condition to merge in
pub fn update_condition_in_memory(conditions: &mut Vec<Condition>, condition: Condition) {
    if let Some(existing) = conditions
        .iter_mut()
        .find(|c| c.r#type == condition.r#type)
    {
        // Preserve lastTransitionTime if status hasn't changed
        let last_transition_time = if existing.status == condition.status {
            existing
                .last_transition_time
                .clone()
                .or(condition.last_transition_time)
        } else {
            condition.last_transition_time
        };

        existing.status = condition.status;
        existing.reason = condition.reason;
        existing.message = condition.message;
        existing.observed_generation = condition.observed_generation;
        existing.last_transition_time = last_transition_time;
    } else {
        conditions.push(condition);
    }
}

/// Compare two condition lists to check if they are semantically equal.
///
/// This function compares two lists of conditions to determine if they represent
/// the same state. It ignores `lastTransitionTime` differences and only compares
/// the semantic content (type, status, reason, message, observed generation).
///
/// # Returns
///
/// * `true` - The conditions are semantically equal (no update needed)
/// * `false` - The conditions differ (update needed)
#[must_use]
pub fn conditions_equal(current: &[Condition], new: &[Condition]) -> bool {
    if current.len() != new.len() {
        return false;
    }

    for new_cond in new {
        match current.iter().find(|c| c.r#type == new_cond.r#type) {
            None => return false,
            Some(curr_cond) => {
                if curr_cond.status != new_cond.status
                    || curr_cond.reason != new_cond.reason
                    || curr_cond.message != new_cond.message
                    || curr_cond.observed_generation != new_cond.observed_generation
                {
                    return false;
                }
            }
        }
    }

    true
}

/// Centralized status updater for `NginxIngressController` resources.
///
/// This struct collects all status changes during reconciliation and applies them
/// atomically in a single Kubernetes API call. This prevents the tight reconciliation
/// loop caused by multiple status updates triggering multiple "object updated" events.
///
/// # Example
///
/// ```rust,ignore
/// use approuting::reconcilers::status::NginxIngressStatusUpdater;
///
/// async fn reconcile(client: Client, nic: NginxIngressController) -> Result<()> {
///     let mut status_updater = NginxIngressStatusUpdater::new(&nic);
///
///     // Collect status changes in memory
///     status_updater.set_collision_count(1);
///     status_updater.set_condition(create_condition(
///         "Progressing",
///         "True",
///         "Reconciling",
///         "Applying managed resources",
///         nic.metadata.generation,
///     ));
///
///     // Single atomic update at the end
///     status_updater.apply(&client).await?;
///     Ok(())
/// }
/// ```
pub struct NginxIngressStatusUpdater {
    name: String,
    current_status: Option<NginxIngressControllerStatus>,
    new_status: NginxIngressControllerStatus,
    has_changes: bool,
}

impl NginxIngressStatusUpdater {
    /// Create a new status updater for an `NginxIngressController`.
    ///
    /// Initializes with the current status from the resource, or creates a new
    /// empty status.
    #[must_use]
    pub fn new(nic: &NginxIngressController) -> Self {
        let current_status = nic.status.clone();
        let new_status = current_status.clone().unwrap_or_default();

        Self {
            name: nic.metadata.name.clone().unwrap_or_default(),
            current_status,
            new_status,
            has_changes: false,
        }
    }

    /// Merge a condition into the status (in-memory only, no API call).
    pub fn set_condition(&mut self, condition: Condition) {
        update_condition_in_memory(&mut self.new_status.conditions, condition);
        self.has_changes = true;
    }

    /// Set the persisted collision count (in-memory only, no API call).
    pub fn set_collision_count(&mut self, count: i32) {
        self.new_status.collision_count = Some(count);
        self.has_changes = true;
    }

    /// Replace the managed object references wholesale (in-memory only, no API call).
    pub fn set_managed_resource_refs(&mut self, refs: Vec<crate::crd::ManagedObjectReference>) {
        self.new_status.managed_resource_refs = refs;
        self.has_changes = true;
    }

    /// Copy replica counts from the live controller Deployment (in-memory only).
    pub fn set_controller_replicas(
        &mut self,
        replicas: Option<i32>,
        ready: Option<i32>,
        available: Option<i32>,
        unavailable: Option<i32>,
    ) {
        self.new_status.controller_replicas = replicas;
        self.new_status.controller_ready_replicas = ready;
        self.new_status.controller_available_replicas = available;
        self.new_status.controller_unavailable_replicas = unavailable;
        self.has_changes = true;
    }

    /// Set the observed generation to match the current generation.
    pub fn set_observed_generation(&mut self, generation: Option<i64>) {
        self.new_status.observed_generation = generation;
        self.has_changes = true;
    }

    /// Check if the status has actually changed compared to the current status.
    ///
    /// Returns `true` if there are semantic changes that warrant an API update.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        if !self.has_changes {
            return false;
        }

        match &self.current_status {
            None => true, // First status update
            Some(current) => {
                current.collision_count != self.new_status.collision_count
                    || current.managed_resource_refs != self.new_status.managed_resource_refs
                    || current.observed_generation != self.new_status.observed_generation
                    || current.controller_replicas != self.new_status.controller_replicas
                    || current.controller_ready_replicas
                        != self.new_status.controller_ready_replicas
                    || current.controller_available_replicas
                        != self.new_status.controller_available_replicas
                    || current.controller_unavailable_replicas
                        != self.new_status.controller_unavailable_replicas
                    || !conditions_equal(&current.conditions, &self.new_status.conditions)
            }
        }
    }

    /// Get a reference to the conditions list (for testing).
    #[cfg(test)]
    #[must_use]
    pub fn conditions(&self) -> &Vec<Condition> {
        &self.new_status.conditions
    }

    /// Get a reference to the pending status (for testing).
    #[cfg(test)]
    #[must_use]
    pub fn pending_status(&self) -> &NginxIngressControllerStatus {
        &self.new_status
    }

    /// Apply the collected status changes to Kubernetes (single atomic API call).
    ///
    /// Only makes the API call if there are actual changes. Skips the update if
    /// the status is semantically unchanged, preventing unnecessary reconciliation loops.
    ///
    /// # Errors
    ///
    /// Returns an error if the Kubernetes API call fails.
    pub async fn apply(&self, client: &Client) -> Result<()> {
        if !self.has_changes() {
            debug!(
                "NginxIngressController {} status unchanged, skipping update",
                self.name
            );
            return Ok(());
        }

        // NginxIngressController is cluster-scoped.
        let api: Api<NginxIngressController> = Api::all(client.clone());

        // Hoisted so the retried future only borrows, never owns, the params.
        let params = PatchParams::default();
        let patch = Patch::Merge(json!({
            "status": self.new_status
        }));

        retry_api_call(
            || api.patch_status(&self.name, &params, &patch),
            "update NginxIngressController status",
        )
        .await?;

        debug!(
            "Updated NginxIngressController {} status: {} condition(s), collision count {:?}",
            self.name,
            self.new_status.conditions.len(),
            self.new_status.collision_count
        );

        Ok(())
    }
}
