//! Record model contract.
//!
//! Every record type maps itself onto a remote list item by implementing
//! [`ListModel`]: deserialize from an item handle, serialize to a field
//! value mapping (identifier excluded), and declare which remote fields it
//! needs fetched. The contract is a trait over plain data types; the core
//! has no per-entity knowledge.

use crate::item::{ItemHandle, ItemState};
use crate::value::FieldValues;
use crate::ItemId;
use parking_lot::Mutex;
use std::sync::Weak;

/// Weak back-reference from a record to the item it was loaded from.
///
/// Correlation only, never lifecycle: the record does not keep its source
/// item alive, and once every strong handle is dropped [`item`](Self::item)
/// resolves to `None`. Embed one in each model type and mark it
/// `#[serde(skip)]` if the model is serialized.
#[derive(Debug, Clone, Default)]
pub struct SourceRef {
    state: Weak<Mutex<ItemState>>,
}

impl SourceRef {
    /// An unbound reference.
    pub fn new() -> Self {
        Self::default()
    }

    /// Point this reference at `item`.
    pub fn bind(&mut self, item: &ItemHandle) {
        self.state = item.downgrade();
    }

    /// The source item, if it is still alive.
    pub fn item(&self) -> Option<ItemHandle> {
        self.state.upgrade().map(ItemHandle::from_state)
    }

    /// Whether the reference currently resolves to a live item.
    pub fn is_bound(&self) -> bool {
        self.state.strong_count() > 0
    }
}

/// The capability set every record type provides.
pub trait ListModel: Sized + Send + Sync {
    /// Populate all declared fields from an item's loaded snapshot.
    ///
    /// Must tolerate missing fields (treat as `None`/default) and is
    /// responsible for narrowing remote field values into native types.
    fn from_item(item: &ItemHandle) -> Self;

    /// Serialize current field state for writing. The identifier must not
    /// be part of the mapping; identity is never written back.
    fn field_values(&self) -> FieldValues;

    /// The minimal remote field set this record needs fetched. Query-based
    /// reads restrict the remote load to these fields.
    fn view_fields() -> Vec<&'static str>;

    /// The persisted identifier, absent until the record is created.
    fn id(&self) -> Option<ItemId>;

    /// The item this record was loaded from, if still alive.
    fn source_item(&self) -> Option<ItemHandle>;

    /// Record `item` as this record's source, for reuse as an update target.
    fn bind_source(&mut self, item: &ItemHandle);

    /// Materialize a record from an item and remember the item as its source.
    fn load(item: &ItemHandle) -> Self {
        let mut model = Self::from_item(item);
        model.bind_source(item);
        model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FieldValue;

    #[derive(Debug, Default)]
    struct Note {
        id: Option<ItemId>,
        title: Option<String>,
        source: SourceRef,
    }

    impl ListModel for Note {
        fn from_item(item: &ItemHandle) -> Self {
            Note {
                id: item.id(),
                title: item.get("Title").and_then(|v| v.as_text().map(str::to_owned)),
                source: SourceRef::new(),
            }
        }

        fn field_values(&self) -> FieldValues {
            let mut values = FieldValues::new();
            values.insert("Title", self.title.clone());
            values
        }

        fn view_fields() -> Vec<&'static str> {
            vec!["Title"]
        }

        fn id(&self) -> Option<ItemId> {
            self.id
        }

        fn source_item(&self) -> Option<ItemHandle> {
            self.source.item()
        }

        fn bind_source(&mut self, item: &ItemHandle) {
            self.source.bind(item);
        }
    }

    fn loaded_item() -> ItemHandle {
        let mut fields = FieldValues::new();
        fields.insert("Title", "meeting notes");
        ItemHandle::loaded_with(7, fields)
    }

    #[test]
    fn load_populates_and_binds() {
        let item = loaded_item();
        let note = Note::load(&item);

        assert_eq!(note.id, Some(7));
        assert_eq!(note.title.as_deref(), Some("meeting notes"));
        let source = note.source_item().unwrap();
        assert_eq!(source.id(), Some(7));
    }

    #[test]
    fn missing_fields_default_to_none() {
        let item = ItemHandle::loaded_with(3, FieldValues::new());
        let note = Note::load(&item);
        assert_eq!(note.title, None);
    }

    #[test]
    fn source_ref_does_not_keep_item_alive() {
        let note = {
            let item = loaded_item();
            Note::load(&item)
        };
        assert!(!note.source.is_bound());
        assert!(note.source_item().is_none());
    }

    #[test]
    fn serialization_excludes_id() {
        let note = Note {
            id: Some(7),
            title: Some("kept".into()),
            source: SourceRef::new(),
        };
        let values = note.field_values();
        assert!(!values.contains("id"));
        assert_eq!(values.get("Title"), Some(&FieldValue::Text("kept".into())));
    }
}
