//! Algebraic laws every registered reducer must satisfy, checked over the
//! builtin types.

use std::sync::Arc;

use mera_merge::{reducers, MergeEngine};
use mera_model::ProgressSnapshot;
use mera_registry::builtin;
use mera_types::HybridTimestamp;
use proptest::prelude::*;
use serde_json::json;

fn engine() -> MergeEngine {
    MergeEngine::new(Arc::new(builtin::registry().unwrap()))
}

fn task_progress() -> impl Strategy<Value = ProgressSnapshot> {
    (
        proptest::option::of(any::<bool>()),
        proptest::option::of(proptest::collection::vec(any::<bool>(), 0..6)),
    )
        .prop_map(|(complete, checked)| {
            let mut p = ProgressSnapshot::new();
            if let Some(c) = complete {
                p.set_bool("complete", c);
            }
            if let Some(list) = checked {
                p.set_bool_list("checkbox_checked", &list);
            }
            p
        })
}

fn choice_progress() -> impl Strategy<Value = ProgressSnapshot> {
    (
        any::<bool>(),
        proptest::option::of((0u64..4, 0u64..50, 0u32..3)),
        0u64..20,
    )
        .prop_map(|(complete, selected, attempts)| {
            let mut p = ProgressSnapshot::new().with_bool("complete", complete);
            if let Some((choice, wall, logical)) = selected {
                p.set_stamped("selected", json!(choice), HybridTimestamp::new(wall, logical));
            }
            p.insert("attempts", json!(attempts));
            p
        })
}

proptest! {
    #[test]
    fn task_merge_is_idempotent(a in task_progress()) {
        prop_assert_eq!(engine().merge("basic_task", &a, &a).unwrap(), a);
    }

    #[test]
    fn remerging_a_side_changes_nothing(a in task_progress(), b in task_progress()) {
        let e = engine();
        let ab = e.merge("basic_task", &a, &b).unwrap();
        prop_assert_eq!(e.merge("basic_task", &ab, &b).unwrap(), ab);
    }

    #[test]
    fn task_merge_is_commutative(a in task_progress(), b in task_progress()) {
        let e = engine();
        prop_assert_eq!(
            e.merge("basic_task", &a, &b).unwrap(),
            e.merge("basic_task", &b, &a).unwrap()
        );
    }

    #[test]
    fn task_merge_is_associative(a in task_progress(), b in task_progress(), c in task_progress()) {
        let e = engine();
        let left = e.merge("basic_task", &e.merge("basic_task", &a, &b).unwrap(), &c).unwrap();
        let right = e.merge("basic_task", &a, &e.merge("basic_task", &b, &c).unwrap()).unwrap();
        prop_assert_eq!(left, right);
    }

    #[test]
    fn completion_never_regresses(a in task_progress(), b in task_progress()) {
        let merged = engine().merge("basic_task", &a, &b).unwrap();
        if a.get_bool("complete") == Some(true) || b.get_bool("complete") == Some(true) {
            prop_assert_eq!(merged.get_bool("complete"), Some(true));
        }
    }

    #[test]
    fn checked_boxes_stay_checked(a in task_progress(), b in task_progress()) {
        let merged = engine().merge("basic_task", &a, &b).unwrap();
        let la = a.get_bool_list("checkbox_checked").unwrap_or_default();
        let lb = b.get_bool_list("checkbox_checked").unwrap_or_default();
        let lm = merged.get_bool_list("checkbox_checked").unwrap_or_default();
        prop_assert_eq!(lm.len(), la.len().max(lb.len()));
        for (i, checked) in lm.iter().enumerate() {
            let expected = la.get(i).copied().unwrap_or(false) || lb.get(i).copied().unwrap_or(false);
            prop_assert_eq!(*checked, expected);
        }
    }

    #[test]
    fn choice_merge_is_idempotent(a in choice_progress()) {
        prop_assert_eq!(engine().merge("multiple_choice", &a, &a).unwrap(), a);
    }

    #[test]
    fn choice_merge_is_commutative(a in choice_progress(), b in choice_progress()) {
        let e = engine();
        prop_assert_eq!(
            e.merge("multiple_choice", &a, &b).unwrap(),
            e.merge("multiple_choice", &b, &a).unwrap()
        );
    }

    #[test]
    fn choice_merge_is_associative(a in choice_progress(), b in choice_progress(), c in choice_progress()) {
        let e = engine();
        let left = e.merge("multiple_choice", &e.merge("multiple_choice", &a, &b).unwrap(), &c).unwrap();
        let right = e.merge("multiple_choice", &a, &e.merge("multiple_choice", &b, &c).unwrap()).unwrap();
        prop_assert_eq!(left, right);
    }

    #[test]
    fn elementwise_or_matches_pointwise_or(
        a in proptest::collection::vec(any::<bool>(), 0..8),
        b in proptest::collection::vec(any::<bool>(), 0..8),
    ) {
        let merged = reducers::elementwise_or(&a, &b);
        prop_assert_eq!(merged.len(), a.len().max(b.len()));
        prop_assert_eq!(&merged, &reducers::elementwise_or(&b, &a));
        prop_assert_eq!(reducers::elementwise_or(&merged, &a), merged.clone());
    }
}

#[test]
fn shorter_list_is_padded_with_false() {
    assert_eq!(
        reducers::elementwise_or(&[true, false], &[false, false, true]),
        vec![true, false, true]
    );
}

#[test]
fn boolean_or_treats_junk_as_false() {
    assert!(!reducers::boolean_or(Some(&json!("true")), None));
    assert!(reducers::boolean_or(Some(&json!(1)), Some(&json!(true))));
}
