// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `pagination.rs`

#[cfg(test)]
mod tests {
    use crate::constants::KUBE_LIST_PAGE_SIZE;

    /// Test that pagination constant has expected value
    #[test]
    fn test_pagination_constant() {
        assert_eq!(
            KUBE_LIST_PAGE_SIZE, 500,
            "Page size should be 500 items per page"
        );

        // Verify it's a reasonable value (not too small, not too large)
        #[allow(clippy::assertions_on_constants)]
        {
            assert!(
                KUBE_LIST_PAGE_SIZE >= 50,
                "Page size should be at least 50 to avoid excessive API calls"
            );
            assert!(
                KUBE_LIST_PAGE_SIZE <= 1000,
                "Page size should not exceed 1000 to avoid memory pressure"
            );
        }
    }

    /// Test that `list_all_paginated` starts from caller-supplied params
    ///
    /// This test documents the expected API without requiring a running Kubernetes cluster.
    /// Full integration tests will verify actual pagination behavior.
    #[test]
    fn test_list_params_carry_page_limit() {
        use kube::api::ListParams;

        let params = ListParams::default();
        assert!(
            params.limit.is_none(),
            "Default params should have no limit"
        );
        assert!(
            params.continue_token.is_none(),
            "Default params should have no continue token"
        );

        let params_with_limit = ListParams {
            limit: Some(KUBE_LIST_PAGE_SIZE),
            ..Default::default()
        };
        assert_eq!(
            params_with_limit.limit,
            Some(500),
            "Should be able to set page limit"
        );
    }

    /// Test that page size calculation is reasonable for the cluster-wide
    /// controller scan performed during Ingress ownership resolution
    #[test]
    fn test_page_count_calculations() {
        let page_size = KUBE_LIST_PAGE_SIZE;

        // Small dataset (1-500 items) = 1 page
        assert_eq!(500 / page_size, 1, "500 items should require 1 page");

        // Medium dataset (5000 items) = 10 pages
        assert_eq!(5000 / page_size, 10, "5000 items should require 10 pages");

        // Verify API call count is reasonable
        let items_10k = 10_000_u32;
        let api_calls = items_10k.div_ceil(page_size);
        assert!(
            api_calls <= 50,
            "Should not require excessive API calls for large datasets"
        );
    }
}
