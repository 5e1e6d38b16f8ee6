//! Property-based tests for the lifecycle service and guard.

use proptest::prelude::*;

use crate::lifecycle::service::{LifecycleGuard, LifecycleService};
use crate::lifecycle::types::{Mutation, RecordKind, RecordStatus};
use medfin_shared::types::UserId;

fn arb_status() -> impl Strategy<Value = RecordStatus> {
    prop_oneof![
        Just(RecordStatus::Draft),
        Just(RecordStatus::Approved),
        Just(RecordStatus::Locked),
    ]
}

fn arb_kind() -> impl Strategy<Value = RecordKind> {
    prop_oneof![Just(RecordKind::Transaction), Just(RecordKind::Budget)]
}

fn arb_mutation() -> impl Strategy<Value = Mutation> {
    prop_oneof![Just(Mutation::Edit), Just(Mutation::Update), Just(Mutation::Delete)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Transition results agree with the transition table.
    #[test]
    fn prop_transitions_match_table(status in arb_status(), user in any::<i64>()) {
        let approved = LifecycleService::approve(status, UserId::new(user));
        prop_assert_eq!(
            approved.is_ok(),
            LifecycleService::is_valid_transition(status, RecordStatus::Approved)
        );
        let locked = LifecycleService::lock(status);
        prop_assert_eq!(
            locked.is_ok(),
            LifecycleService::is_valid_transition(status, RecordStatus::Locked)
        );
    }

    /// Nothing leaves the locked state.
    #[test]
    fn prop_locked_is_terminal(to in arb_status()) {
        prop_assert!(!LifecycleService::is_valid_transition(RecordStatus::Locked, to));
    }

    /// The guard refuses exactly the locked status, for every kind and mutation.
    #[test]
    fn prop_guard_refuses_only_locked(
        status in arb_status(),
        kind in arb_kind(),
        mutation in arb_mutation()
    ) {
        let result = LifecycleGuard::ensure_modifiable(status, kind, mutation);
        prop_assert_eq!(result.is_err(), status == RecordStatus::Locked);
        prop_assert_eq!(result.is_ok(), LifecycleGuard::can_modify(status));
    }
}
