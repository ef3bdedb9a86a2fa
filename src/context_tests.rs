// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for context.rs

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::status_reasons::REASON_INGRESS_CLASS_COLLISION;

    #[test]
    fn test_warning_event_payload() {
        let event = warning_event(
            "ApplyFailed",
            "Reconcile",
            "failed to apply Deployment nginx-internal-0".to_string(),
        );

        assert!(matches!(event.type_, EventType::Warning));
        assert_eq!(event.reason, "ApplyFailed");
        assert_eq!(event.action, "Reconcile");
        assert_eq!(
            event.note.as_deref(),
            Some("failed to apply Deployment nginx-internal-0")
        );
        assert!(event.secondary.is_none());
    }

    #[test]
    fn test_normal_event_payload() {
        let event = normal_event(
            "ResourcesApplied",
            "Reconcile",
            "applied 11 managed resources".to_string(),
        );

        assert!(matches!(event.type_, EventType::Normal));
        assert_eq!(event.reason, "ResourcesApplied");
        assert_eq!(event.action, "Reconcile");
    }

    /// Events reuse the status condition reasons so `kubectl describe` and
    /// the status block tell one story.
    #[test]
    fn test_event_reason_reuses_status_reason() {
        let event = warning_event(
            REASON_INGRESS_CLASS_COLLISION,
            "ResolveCollisions",
            "ingress class nginx-internal is owned by another object".to_string(),
        );

        assert_eq!(event.reason, REASON_INGRESS_CLASS_COLLISION);
    }
}
