//! Client-side item proxies.
//!
//! An [`ItemHandle`] stands in for one remote list item the way a client
//! object model proxy does: it is created immediately (for a new item, or
//! lazily for an existing id), accumulates staged field writes and a staged
//! mutation locally, and only reflects remote state after a commit through
//! [`crate::store::ListStore::execute`]. Nothing on a handle performs IO.
//!
//! [`ItemCollection`] is the same idea for a staged paged query: empty until
//! committed, then holding the page's item handles and the continuation
//! position.
//!
//! Store implementations drive handles through the backend surface:
//! inspect [`ItemHandle::staged`], [`ItemHandle::staged_writes`] and
//! [`ItemHandle::load_requested`], then write results back with the
//! `complete_*` methods.

use crate::store::{ListQuery, PagePosition};
use crate::value::{FieldValue, FieldValues};
use crate::ItemId;
use parking_lot::{Mutex, MutexGuard};
use std::sync::{Arc, Weak};

/// The mutation staged on an item, applied at the next commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagedMutation {
    Create,
    Update,
    Delete,
    Recycle,
}

#[derive(Debug)]
pub(crate) struct ItemState {
    pub id: Option<ItemId>,
    /// Created via `add_item` and not yet committed
    pub is_new: bool,
    /// A load round trip has completed for this handle
    pub loaded: bool,
    /// Meaningful only once `loaded`
    pub exists: bool,
    /// Snapshot of remote field state as of the last committed load
    pub field_values: FieldValues,
    pub staged_writes: FieldValues,
    pub staged: Option<StagedMutation>,
    pub load_requested: bool,
}

impl ItemState {
    fn new(id: Option<ItemId>, is_new: bool) -> Self {
        Self {
            id,
            is_new,
            loaded: false,
            exists: false,
            field_values: FieldValues::new(),
            staged_writes: FieldValues::new(),
            staged: None,
            load_requested: false,
        }
    }
}

/// Handle to one remote list item.
///
/// Cheap to clone; clones share state. All mutating methods stage work
/// locally and are no-ops on the remote store until the next commit.
#[derive(Debug, Clone)]
pub struct ItemHandle {
    state: Arc<Mutex<ItemState>>,
}

impl ItemHandle {
    /// Handle for an item that does not exist remotely yet.
    pub fn new_item() -> Self {
        Self {
            state: Arc::new(Mutex::new(ItemState::new(None, true))),
        }
    }

    /// Handle for an existing item, not yet fetched.
    pub fn for_id(id: ItemId) -> Self {
        Self {
            state: Arc::new(Mutex::new(ItemState::new(Some(id), false))),
        }
    }

    /// Handle that already carries a fetched snapshot (query results).
    pub fn loaded_with(id: ItemId, field_values: FieldValues) -> Self {
        let mut state = ItemState::new(Some(id), false);
        state.loaded = true;
        state.exists = true;
        state.field_values = field_values;
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub(crate) fn from_state(state: Arc<Mutex<ItemState>>) -> Self {
        Self { state }
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, ItemState> {
        self.state.lock()
    }

    pub(crate) fn downgrade(&self) -> Weak<Mutex<ItemState>> {
        Arc::downgrade(&self.state)
    }

    pub(crate) fn mark_load(&self) {
        self.state().load_requested = true;
    }

    /// The item's id, if known (assigned at creation commit or at construction).
    pub fn id(&self) -> Option<ItemId> {
        self.state().id
    }

    /// A field from the loaded snapshot, by name ignoring case.
    pub fn get(&self, name: &str) -> Option<FieldValue> {
        self.state().field_values.get(name).cloned()
    }

    /// Clone of the loaded snapshot.
    pub fn field_values(&self) -> FieldValues {
        self.state().field_values.clone()
    }

    /// Drop the loaded snapshot without touching staged state.
    pub fn clear_snapshot(&self) {
        let mut state = self.state();
        state.field_values.clear();
        state.loaded = false;
        state.exists = false;
    }

    /// Stage a single field write.
    pub fn set(&self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.state().staged_writes.insert(name, value);
    }

    /// Replace all staged writes with `values`, stripping any identifier
    /// field. Field names compare ignoring case.
    pub fn populate(&self, values: FieldValues) {
        self.state().staged_writes = values.without_id();
    }

    /// Stage persisting the staged writes: a creation for a new item, an
    /// update otherwise.
    pub fn update(&self) {
        let mut state = self.state();
        state.staged = Some(if state.is_new {
            StagedMutation::Create
        } else {
            StagedMutation::Update
        });
    }

    /// Stage permanent deletion.
    pub fn delete(&self) {
        self.state().staged = Some(StagedMutation::Delete);
    }

    /// Stage recoverable deletion (move to the recycle bin).
    pub fn recycle(&self) {
        self.state().staged = Some(StagedMutation::Recycle);
    }

    /// Whether a committed load found the item. False before any load.
    pub fn exists(&self) -> bool {
        let state = self.state();
        state.loaded && state.exists
    }

    /// Whether a load round trip has completed for this handle.
    pub fn loaded(&self) -> bool {
        self.state().loaded
    }

    /// Whether the loaded snapshot has a field of this name.
    pub fn field_exists(&self, name: &str) -> bool {
        if name.trim().is_empty() {
            return false;
        }
        self.state().field_values.contains(name)
    }

    /// Like [`field_exists`](Self::field_exists), but also false for null
    /// values, unresolved references (id 0) and nil taxonomy terms.
    pub fn field_exists_and_not_null(&self, name: &str) -> bool {
        if name.trim().is_empty() {
            return false;
        }
        match self.state().field_values.get(name) {
            None | Some(FieldValue::Null) => false,
            Some(FieldValue::Lookup(lookup)) => lookup.id > 0,
            Some(FieldValue::User(user)) => user.id > 0,
            Some(FieldValue::Term(term)) => !term.term_id.is_nil(),
            Some(_) => true,
        }
    }

    // ------------------------------------------------------------------
    // Backend surface: store implementations read staged state and write
    // commit results back through these.
    // ------------------------------------------------------------------

    /// The mutation currently staged on this handle, if any.
    pub fn staged(&self) -> Option<StagedMutation> {
        self.state().staged
    }

    /// Clone of the staged field writes.
    pub fn staged_writes(&self) -> FieldValues {
        self.state().staged_writes.clone()
    }

    /// Whether a fetch was requested for the next commit.
    pub fn load_requested(&self) -> bool {
        self.state().load_requested
    }

    /// Commit result: the item was created under `id` with `row` as its
    /// persisted field state.
    pub fn complete_create(&self, id: ItemId, row: FieldValues) {
        let mut state = self.state();
        state.staged = None;
        state.staged_writes.clear();
        state.id = Some(id);
        state.is_new = false;
        state.loaded = true;
        state.exists = true;
        state.field_values = row;
    }

    /// Commit result: the staged update was applied; `row` is the item's
    /// new field state. Refreshes the snapshot only if one was loaded.
    pub fn complete_update(&self, row: FieldValues) {
        let mut state = self.state();
        state.staged = None;
        state.staged_writes.clear();
        if state.loaded {
            state.field_values = row;
        }
    }

    /// Commit result: the item was deleted or recycled.
    pub fn complete_delete(&self) {
        let mut state = self.state();
        state.staged = None;
        state.staged_writes.clear();
        state.loaded = true;
        state.exists = false;
    }

    /// Commit result: the requested load resolved to `row`, or to nothing
    /// if the item does not exist (which is not an error).
    pub fn complete_load(&self, row: Option<FieldValues>) {
        let mut state = self.state();
        state.load_requested = false;
        state.loaded = true;
        match row {
            Some(fields) => {
                state.field_values = fields;
                state.exists = true;
            }
            None => {
                state.field_values = FieldValues::new();
                state.exists = false;
            }
        }
    }
}

#[derive(Debug)]
pub(crate) struct CollectionState {
    pub query: ListQuery,
    pub items: Vec<ItemHandle>,
    pub next_position: Option<PagePosition>,
    pub loaded: bool,
    pub load_requested: bool,
}

/// Handle to one staged page of query results.
#[derive(Debug, Clone)]
pub struct ItemCollection {
    state: Arc<Mutex<CollectionState>>,
}

impl ItemCollection {
    /// A collection staged for `query`, not yet resolved.
    pub fn new(query: ListQuery) -> Self {
        Self {
            state: Arc::new(Mutex::new(CollectionState {
                query,
                items: Vec::new(),
                next_position: None,
                loaded: false,
                load_requested: false,
            })),
        }
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, CollectionState> {
        self.state.lock()
    }

    pub(crate) fn mark_load(&self) {
        self.state().load_requested = true;
    }

    /// The query this collection was staged with.
    pub fn query(&self) -> ListQuery {
        self.state().query.clone()
    }

    /// Item handles of this page. Empty until a commit resolves the query.
    pub fn items(&self) -> Vec<ItemHandle> {
        self.state().items.clone()
    }

    /// Continuation position for the next page; `None` once exhausted (or
    /// before the query has been committed).
    pub fn next_position(&self) -> Option<PagePosition> {
        self.state().next_position.clone()
    }

    /// Whether a commit has resolved this query.
    pub fn loaded(&self) -> bool {
        self.state().loaded
    }

    /// Whether a fetch was requested for the next commit.
    pub fn load_requested(&self) -> bool {
        self.state().load_requested
    }

    /// Commit result: this page resolved to `items`, with `next_position`
    /// pointing at the next page or `None` when exhausted.
    pub fn complete(&self, items: Vec<ItemHandle>, next_position: Option<PagePosition>) {
        let mut state = self.state();
        state.load_requested = false;
        state.items = items;
        state.next_position = next_position;
        state.loaded = true;
    }
}
