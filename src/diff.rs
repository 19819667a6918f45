//! Change detection between a remote snapshot and candidate values.
//!
//! This is what keeps repeated-update workloads from hammering the remote
//! store: before a write round trip is issued, the candidate values are
//! compared against the item's current snapshot and the write is skipped
//! when nothing differs.
//!
//! Equality here is semantic, not structural. A user reference equals
//! another user reference with the same principal id even if their display
//! names differ, and two date-times at different offsets are equal when they
//! name the same instant. The ordered-vs-unordered treatment is deliberate:
//! user/lookup/text lists keep a stable order in the remote store and are
//! compared pairwise, while term sets do not and are compared sorted.

use crate::value::{FieldValue, FieldValues};
use chrono::Utc;

/// Semantic equality over remote field values.
///
/// Rules are checked in precedence order; the first applicable rule wins,
/// with structural equality as the fallback.
pub fn values_equal(old: &FieldValue, new: &FieldValue) -> bool {
    use FieldValue::*;

    match (old, new) {
        (Null, Null) => true,
        (Null, _) | (_, Null) => false,
        (User(a), User(b)) => a.id == b.id,
        (Users(a), Users(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.id == y.id)
        }
        (Lookup(a), Lookup(b)) => a.id == b.id,
        (Lookups(a), Lookups(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.id == y.id)
        }
        (Url(a), Url(b)) => a.url == b.url && a.description == b.description,
        (DateTime(a), DateTime(b)) => a.with_timezone(&Utc) == b.with_timezone(&Utc),
        (Texts(a), Texts(b)) => a == b,
        (Term(a), Term(b)) => a.term_id == b.term_id,
        (Terms(a), Terms(b)) => {
            let mut old_ids: Vec<_> = a.iter().map(|t| t.term_id).collect();
            let mut new_ids: Vec<_> = b.iter().map(|t| t.term_id).collect();
            old_ids.sort_unstable();
            new_ids.sort_unstable();
            old_ids == new_ids
        }
        _ => old == new,
    }
}

/// Whether any candidate value differs from the snapshot.
///
/// Candidate fields that the snapshot does not contain are skipped: a field
/// that was never fetched cannot be compared, and treating it as changed
/// would trigger writes on every call for unfetched fields. Returns `true`
/// on the first mismatch.
pub fn has_changes(snapshot: &FieldValues, candidate: &FieldValues) -> bool {
    for (name, new_value) in candidate.iter() {
        let Some(current) = snapshot.get(name) else {
            continue;
        };
        if !values_equal(current, new_value) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{LookupRef, TermRef, UrlValue, UserRef};
    use chrono::{FixedOffset, TimeZone};
    use uuid::Uuid;

    fn term(n: u128) -> TermRef {
        TermRef::new(Uuid::from_u128(n))
    }

    #[test]
    fn null_rules() {
        assert!(values_equal(&FieldValue::Null, &FieldValue::Null));
        assert!(!values_equal(&FieldValue::Null, &FieldValue::Int(0)));
        assert!(!values_equal(&FieldValue::Int(0), &FieldValue::Null));
    }

    #[test]
    fn users_compare_by_id_only() {
        let a = FieldValue::User(UserRef::named(5, "Old Name"));
        let b = FieldValue::User(UserRef::named(5, "New Name"));
        let c = FieldValue::User(UserRef::new(6));

        assert!(values_equal(&a, &b));
        assert!(!values_equal(&a, &c));
    }

    #[test]
    fn user_lists_are_order_sensitive() {
        let ab = FieldValue::Users(vec![UserRef::new(1), UserRef::new(2)]);
        let ba = FieldValue::Users(vec![UserRef::new(2), UserRef::new(1)]);
        let abc = FieldValue::Users(vec![UserRef::new(1), UserRef::new(2), UserRef::new(3)]);

        assert!(values_equal(&ab, &ab.clone()));
        assert!(!values_equal(&ab, &ba));
        assert!(!values_equal(&ab, &abc));
    }

    #[test]
    fn lookups_compare_by_id() {
        let a = FieldValue::Lookup(LookupRef::valued(9, "Row nine"));
        let b = FieldValue::Lookup(LookupRef::new(9));
        assert!(values_equal(&a, &b));

        let xs = FieldValue::Lookups(vec![LookupRef::new(1), LookupRef::new(2)]);
        let ys = FieldValue::Lookups(vec![LookupRef::new(2), LookupRef::new(1)]);
        assert!(!values_equal(&xs, &ys));
    }

    #[test]
    fn urls_need_both_components() {
        let a = FieldValue::Url(UrlValue::new("https://a", "docs"));
        let b = FieldValue::Url(UrlValue::new("https://a", "docs"));
        let c = FieldValue::Url(UrlValue::new("https://a", "other"));

        assert!(values_equal(&a, &b));
        assert!(!values_equal(&a, &c));
    }

    #[test]
    fn date_times_compare_as_instants() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();

        // 12:00 UTC and 14:00 at UTC+2 are the same instant.
        let a = FieldValue::DateTime(utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap());
        let b = FieldValue::DateTime(plus_two.with_ymd_and_hms(2026, 3, 1, 14, 0, 0).unwrap());
        let c = FieldValue::DateTime(plus_two.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap());

        assert!(values_equal(&a, &b));
        assert!(!values_equal(&a, &c));
    }

    #[test]
    fn text_lists_are_order_sensitive() {
        let ab = FieldValue::Texts(vec!["a".into(), "b".into()]);
        let ba = FieldValue::Texts(vec!["b".into(), "a".into()]);
        assert!(values_equal(&ab, &ab.clone()));
        assert!(!values_equal(&ab, &ba));
    }

    #[test]
    fn term_sets_are_order_insensitive() {
        let ab = FieldValue::Terms(vec![term(1), term(2)]);
        let ba = FieldValue::Terms(vec![term(2), term(1)]);
        let ac = FieldValue::Terms(vec![term(1), term(3)]);

        assert!(values_equal(&ab, &ba));
        assert!(!values_equal(&ab, &ac));
    }

    #[test]
    fn single_terms_compare_by_id() {
        let a = FieldValue::Term(TermRef::labeled(Uuid::from_u128(7), "Archive"));
        let b = FieldValue::Term(TermRef::new(Uuid::from_u128(7)));
        assert!(values_equal(&a, &b));
    }

    #[test]
    fn structural_fallback() {
        assert!(values_equal(&FieldValue::Int(3), &FieldValue::Int(3)));
        assert!(!values_equal(&FieldValue::Int(3), &FieldValue::Int(4)));
        assert!(!values_equal(&FieldValue::Int(3), &FieldValue::Text("3".into())));
        assert!(values_equal(
            &FieldValue::Json(serde_json::json!({"a": 1})),
            &FieldValue::Json(serde_json::json!({"a": 1})),
        ));
    }

    #[test]
    fn no_changes_when_everything_matches() {
        let mut snapshot = FieldValues::new();
        snapshot.insert("Title", "Same");
        snapshot.insert("Owner", UserRef::named(4, "Stored Name"));

        let mut candidate = FieldValues::new();
        candidate.insert("Title", "Same");
        candidate.insert("Owner", UserRef::new(4));

        assert!(!has_changes(&snapshot, &candidate));
    }

    #[test]
    fn change_detected_on_first_difference() {
        let mut snapshot = FieldValues::new();
        snapshot.insert("Title", "Old");

        let mut candidate = FieldValues::new();
        candidate.insert("Title", "New");

        assert!(has_changes(&snapshot, &candidate));
    }

    #[test]
    fn unfetched_fields_are_skipped() {
        let mut snapshot = FieldValues::new();
        snapshot.insert("Title", "Same");

        // Status was never fetched into the snapshot, so it cannot count as
        // a change even though the candidate sets it.
        let mut candidate = FieldValues::new();
        candidate.insert("Title", "Same");
        candidate.insert("Status", "Open");

        assert!(!has_changes(&snapshot, &candidate));
    }

    #[test]
    fn field_names_match_ignoring_case() {
        let mut snapshot = FieldValues::new();
        snapshot.insert("title", "Same");

        let mut candidate = FieldValues::new();
        candidate.insert("Title", "Different");

        assert!(has_changes(&snapshot, &candidate));
    }
}
