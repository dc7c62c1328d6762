// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Per-pod injection state kept in a pod annotation.
//!
//! `Unprocessed` moves to `Verified` or `VerifiedFailed` once the pipeline
//! completes. Both are terminal; nothing moves a pod back.

use crate::constants::annotations;
use crate::kubernetes::PodDelta;
use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionState {
    Unprocessed,
    Verified,
    VerifiedFailed,
}

impl InjectionState {
    /// State recorded on `pod`; unknown marker values count as unprocessed
    pub fn of(pod: &Pod) -> Self {
        match pod.annotations().get(annotations::INJECTION).map(String::as_str) {
            Some(annotations::VERIFIED) => InjectionState::Verified,
            Some(annotations::VERIFIED_FAILED) => InjectionState::VerifiedFailed,
            _ => InjectionState::Unprocessed,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, InjectionState::Unprocessed)
    }

    /// Delta recording this state on a pod; `None` for `Unprocessed`
    pub fn marker(self) -> Option<PodDelta> {
        let value = match self {
            InjectionState::Unprocessed => return None,
            InjectionState::Verified => annotations::VERIFIED,
            InjectionState::VerifiedFailed => annotations::VERIFIED_FAILED,
        };
        Some(PodDelta::annotate([(annotations::INJECTION, value)]))
    }
}

/// True when the pod has already been through the pipeline
pub fn is_processed(pod: &Pod) -> bool {
    InjectionState::of(pod).is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::make_pod;

    #[test]
    fn test_state_of_unmarked_pod() {
        let pod = make_pod("a", &[], &[], "Running");
        assert_eq!(InjectionState::of(&pod), InjectionState::Unprocessed);
        assert!(!is_processed(&pod));
    }

    #[test]
    fn test_state_of_marked_pods() {
        let verified = make_pod("a", &[], &[(annotations::INJECTION, "verified")], "Running");
        let failed = make_pod("b", &[], &[(annotations::INJECTION, "verified-failed")], "Running");

        assert_eq!(InjectionState::of(&verified), InjectionState::Verified);
        assert_eq!(InjectionState::of(&failed), InjectionState::VerifiedFailed);
        assert!(is_processed(&verified));
        assert!(is_processed(&failed));
    }

    #[test]
    fn test_unknown_marker_value_is_unprocessed() {
        let pod = make_pod("a", &[], &[(annotations::INJECTION, "pending")], "Running");
        assert_eq!(InjectionState::of(&pod), InjectionState::Unprocessed);
    }

    #[test]
    fn test_marker_delta_round_trips_through_pod() {
        let pod = make_pod("a", &[], &[], "Running");

        for state in [InjectionState::Verified, InjectionState::VerifiedFailed] {
            let marked = state.marker().unwrap().apply(&pod).unwrap();
            assert_eq!(InjectionState::of(&marked), state);
        }
        assert!(InjectionState::Unprocessed.marker().is_none());
    }
}
