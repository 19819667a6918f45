//! Field value domain for remote list items.
//!
//! Remote stores expose a small closed set of field value kinds (scalars,
//! principal and lookup references, hyperlinks, date-times, string sets,
//! taxonomy terms). [`FieldValue`] models that set as a tagged union so the
//! comparator in [`crate::diff`] can dispatch exhaustively, with a structural
//! fallback for anything without a special rule.

use crate::{ItemId, PrincipalId, TermId};
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A reference to a user or group principal.
///
/// Only the numeric id identifies the principal; display name and email are
/// decoration that the remote store may or may not send back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    /// Principal id in the remote store
    pub id: PrincipalId,
    /// Display name, if resolved
    pub display_name: Option<String>,
    /// Email address, if resolved
    pub email: Option<String>,
}

impl UserRef {
    /// Reference a principal by id alone.
    pub fn new(id: PrincipalId) -> Self {
        Self {
            id,
            display_name: None,
            email: None,
        }
    }

    /// Reference a principal by id with a display name.
    pub fn named(id: PrincipalId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: Some(display_name.into()),
            email: None,
        }
    }
}

/// A reference to an item in another list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupRef {
    /// Id of the referenced item
    pub id: ItemId,
    /// Display value of the referenced item, if resolved
    pub value: Option<String>,
}

impl LookupRef {
    /// Reference an item by id alone.
    pub fn new(id: ItemId) -> Self {
        Self { id, value: None }
    }

    /// Reference an item by id with its display value.
    pub fn valued(id: ItemId, value: impl Into<String>) -> Self {
        Self {
            id,
            value: Some(value.into()),
        }
    }
}

/// A hyperlink field value: target url plus description text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlValue {
    pub url: String,
    pub description: String,
}

impl UrlValue {
    pub fn new(url: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            description: description.into(),
        }
    }
}

/// A reference to a taxonomy term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermRef {
    /// Term id in the term store
    pub term_id: TermId,
    /// Term label, if resolved
    pub label: Option<String>,
}

impl TermRef {
    /// Reference a term by id alone.
    pub fn new(term_id: TermId) -> Self {
        Self {
            term_id,
            label: None,
        }
    }

    /// Reference a term by id with its label.
    pub fn labeled(term_id: TermId, label: impl Into<String>) -> Self {
        Self {
            term_id,
            label: Some(label.into()),
        }
    }
}

/// A field value as stored in a remote list item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Date-time with its original offset preserved
    DateTime(DateTime<FixedOffset>),
    Url(UrlValue),
    User(UserRef),
    /// Multi-user field; order is stable in the remote store
    Users(Vec<UserRef>),
    Lookup(LookupRef),
    /// Multi-lookup field; order is stable in the remote store
    Lookups(Vec<LookupRef>),
    /// Multi-choice text field; order is stable in the remote store
    Texts(Vec<String>),
    Term(TermRef),
    /// Term set field; the remote store does not guarantee order
    Terms(Vec<TermRef>),
    /// Arbitrary nested JSON, compared structurally
    Json(serde_json::Value),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_user(&self) -> Option<&UserRef> {
        match self {
            FieldValue::User(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_lookup(&self) -> Option<&LookupRef> {
        match self {
            FieldValue::Lookup(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_date_time(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            FieldValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(v.into())
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<DateTime<FixedOffset>> for FieldValue {
    fn from(v: DateTime<FixedOffset>) -> Self {
        FieldValue::DateTime(v)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        FieldValue::DateTime(v.fixed_offset())
    }
}

impl From<UrlValue> for FieldValue {
    fn from(v: UrlValue) -> Self {
        FieldValue::Url(v)
    }
}

impl From<UserRef> for FieldValue {
    fn from(v: UserRef) -> Self {
        FieldValue::User(v)
    }
}

impl From<Vec<UserRef>> for FieldValue {
    fn from(v: Vec<UserRef>) -> Self {
        FieldValue::Users(v)
    }
}

impl From<LookupRef> for FieldValue {
    fn from(v: LookupRef) -> Self {
        FieldValue::Lookup(v)
    }
}

impl From<Vec<LookupRef>> for FieldValue {
    fn from(v: Vec<LookupRef>) -> Self {
        FieldValue::Lookups(v)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(v: Vec<String>) -> Self {
        FieldValue::Texts(v)
    }
}

impl From<TermRef> for FieldValue {
    fn from(v: TermRef) -> Self {
        FieldValue::Term(v)
    }
}

impl From<Vec<TermRef>> for FieldValue {
    fn from(v: Vec<TermRef>) -> Self {
        FieldValue::Terms(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(FieldValue::Null, Into::into)
    }
}

/// A field-name to value mapping with case-insensitive names.
///
/// Field names in remote lists are not case-sensitive, so lookups here are
/// not either. Insertion replaces any entry whose name matches ignoring
/// ASCII case, keeping the newer spelling. Iteration order is deterministic
/// (sorted by stored name).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldValues {
    entries: BTreeMap<String, FieldValue>,
}

impl FieldValues {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any entry with the same name ignoring case.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        if self.entries.get(&name).is_none() {
            if let Some(existing) = self.matching_key(&name) {
                self.entries.remove(&existing);
            }
        }
        self.entries.insert(name, value.into());
    }

    /// Get a field by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        if let Some(value) = self.entries.get(name) {
            return Some(value);
        }
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// Whether a field of this name exists, ignoring case.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove a field by name, ignoring case.
    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        if let Some(value) = self.entries.remove(name) {
            return Some(value);
        }
        let key = self.matching_key(name)?;
        self.entries.remove(&key)
    }

    /// Drop any identifier field. Identity is never written back to the store.
    pub fn without_id(mut self) -> Self {
        self.remove("id");
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate over (name, value) pairs in sorted name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    fn matching_key(&self, name: &str) -> Option<String> {
        self.entries
            .keys()
            .find(|key| key.eq_ignore_ascii_case(name))
            .cloned()
    }
}

impl FromIterator<(String, FieldValue)> for FieldValues {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        let mut values = FieldValues::new();
        for (name, value) in iter {
            values.insert(name, value);
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_insensitive_lookup() {
        let mut values = FieldValues::new();
        values.insert("Title", "hello");

        assert_eq!(values.get("title").and_then(|v| v.as_text()), Some("hello"));
        assert_eq!(values.get("TITLE").and_then(|v| v.as_text()), Some("hello"));
        assert!(values.contains("tItLe"));
        assert!(!values.contains("description"));
    }

    #[test]
    fn insert_replaces_other_casing() {
        let mut values = FieldValues::new();
        values.insert("Title", "old");
        values.insert("TITLE", "new");

        assert_eq!(values.len(), 1);
        assert_eq!(values.get("title").and_then(|v| v.as_text()), Some("new"));
    }

    #[test]
    fn without_id_strips_any_casing() {
        let mut values = FieldValues::new();
        values.insert("ID", 7);
        values.insert("Title", "kept");

        let values = values.without_id();
        assert!(!values.contains("id"));
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn option_conversion() {
        let some: FieldValue = Some("text").into();
        assert_eq!(some, FieldValue::Text("text".into()));

        let none: FieldValue = Option::<String>::None.into();
        assert!(none.is_null());
    }

    #[test]
    fn remove_ignores_case() {
        let mut values = FieldValues::new();
        values.insert("Owner", UserRef::new(3));

        let removed = values.remove("OWNER");
        assert_eq!(removed, Some(FieldValue::User(UserRef::new(3))));
        assert!(values.is_empty());
    }

    #[test]
    fn serialization_roundtrip() {
        let mut values = FieldValues::new();
        values.insert("Title", "report");
        values.insert("Owner", UserRef::named(12, "Sam Doe"));
        values.insert("Tags", vec!["a".to_string(), "b".to_string()]);

        let json = serde_json::to_string(&values).unwrap();
        let parsed: FieldValues = serde_json::from_str(&json).unwrap();
        assert_eq!(values, parsed);
    }
}
