//! Property tests for the value comparator.
//!
//! The comparator must be reflexive and symmetric over the whole value
//! domain, and the type-specific rules (identity-only reference equality,
//! order-insensitive term sets) must hold for arbitrary inputs.

use chrono::{FixedOffset, TimeZone};
use listkit::{has_changes, values_equal, FieldValue, FieldValues};
use listkit::{LookupRef, TermRef, UrlValue, UserRef};
use proptest::collection::vec;
use proptest::prelude::*;
use uuid::Uuid;

fn field_value() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        Just(FieldValue::Null),
        any::<bool>().prop_map(FieldValue::Bool),
        any::<i64>().prop_map(FieldValue::Int),
        (-1.0e9f64..1.0e9).prop_map(FieldValue::Float),
        "[a-z]{0,8}".prop_map(FieldValue::Text),
        (0i64..4_000_000_000, -12i32..=12).prop_map(|(secs, hours)| {
            let offset = FixedOffset::east_opt(hours * 3600).unwrap();
            FieldValue::DateTime(offset.timestamp_opt(secs, 0).unwrap())
        }),
        ("[a-z]{0,8}", "[a-z]{0,8}").prop_map(|(url, desc)| {
            FieldValue::Url(UrlValue::new(url, desc))
        }),
        (0u64..50).prop_map(|id| FieldValue::User(UserRef::new(id))),
        vec(0u64..50, 0..4).prop_map(|ids| {
            FieldValue::Users(ids.into_iter().map(UserRef::new).collect())
        }),
        (0u64..50).prop_map(|id| FieldValue::Lookup(LookupRef::new(id))),
        vec(0u64..50, 0..4).prop_map(|ids| {
            FieldValue::Lookups(ids.into_iter().map(LookupRef::new).collect())
        }),
        vec("[a-z]{0,4}", 0..4).prop_map(FieldValue::Texts),
        (0u128..50).prop_map(|n| FieldValue::Term(TermRef::new(Uuid::from_u128(n)))),
        vec(0u128..50, 0..4).prop_map(|ns| {
            FieldValue::Terms(ns.into_iter().map(|n| TermRef::new(Uuid::from_u128(n))).collect())
        }),
    ]
}

proptest! {
    #[test]
    fn comparator_is_reflexive(value in field_value()) {
        prop_assert!(values_equal(&value, &value));
    }

    #[test]
    fn comparator_is_symmetric(a in field_value(), b in field_value()) {
        prop_assert_eq!(values_equal(&a, &b), values_equal(&b, &a));
    }

    #[test]
    fn null_never_equals_non_null(value in field_value()) {
        prop_assume!(!value.is_null());
        prop_assert!(!values_equal(&FieldValue::Null, &value));
        prop_assert!(!values_equal(&value, &FieldValue::Null));
    }

    #[test]
    fn user_equality_ignores_display_names(
        id in 0u64..100,
        name_a in "[a-z]{1,8}",
        name_b in "[a-z]{1,8}",
    ) {
        let a = FieldValue::User(UserRef::named(id, name_a));
        let b = FieldValue::User(UserRef::named(id, name_b));
        prop_assert!(values_equal(&a, &b));
    }

    #[test]
    fn term_sets_ignore_order(ids in vec(0u128..50, 0..6)) {
        let mut shuffled = ids.clone();
        shuffled.reverse();

        let a = FieldValue::Terms(ids.into_iter().map(|n| TermRef::new(Uuid::from_u128(n))).collect());
        let b = FieldValue::Terms(shuffled.into_iter().map(|n| TermRef::new(Uuid::from_u128(n))).collect());
        prop_assert!(values_equal(&a, &b));
    }

    #[test]
    fn snapshot_never_differs_from_itself(
        entries in vec(("[A-Za-z]{1,8}", field_value()), 0..6)
    ) {
        let snapshot: FieldValues = entries.into_iter().collect();
        prop_assert!(!has_changes(&snapshot, &snapshot.clone()));
    }
}
