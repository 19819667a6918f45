//! In-memory list store.
//!
//! A complete [`ListStore`] over a `BTreeMap`, with the same commit
//! semantics a remote backend must provide: one `execute` resolves every
//! staged fetch and mutation, loads of missing items are non-fatal,
//! mutations of missing items fail the whole commit without applying
//! anything. Doubles as the reference implementation and the test backend.

use crate::error::{Error, Result};
use crate::item::{ItemCollection, ItemHandle, StagedMutation};
use crate::store::{ListQuery, ListStore, PagePosition};
use crate::value::FieldValues;
use crate::ItemId;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, VecDeque};
use std::ops::Bound;

#[derive(Debug, Default)]
struct MemoryInner {
    rows: BTreeMap<ItemId, FieldValues>,
    recycle_bin: BTreeMap<ItemId, FieldValues>,
    next_id: ItemId,
    handles: Vec<ItemHandle>,
    collections: Vec<ItemCollection>,
    round_trips: u64,
    fail_queue: VecDeque<Error>,
}

/// An in-memory [`ListStore`]. Ids are assigned from 1 in creation order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MemoryInner {
                next_id: 1,
                ..MemoryInner::default()
            }),
        }
    }

    /// Number of commits executed so far.
    pub fn round_trips(&self) -> u64 {
        self.inner.lock().round_trips
    }

    /// Number of live rows.
    pub fn len(&self) -> usize {
        self.inner.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().rows.is_empty()
    }

    /// Current field state of a live row.
    pub fn row(&self, id: ItemId) -> Option<FieldValues> {
        self.inner.lock().rows.get(&id).cloned()
    }

    /// Field state of a recycled row, if the row was deleted recoverably.
    pub fn recycled(&self, id: ItemId) -> Option<FieldValues> {
        self.inner.lock().recycle_bin.get(&id).cloned()
    }

    /// Queue an error for an upcoming commit. Each queued error fails one
    /// `execute` call (counted as a round trip) before any staged work is
    /// applied. Intended for exercising execution policies.
    pub fn inject_failure(&self, error: Error) {
        self.inner.lock().fail_queue.push_back(error);
    }

    fn commit(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.round_trips += 1;

        if let Some(error) = inner.fail_queue.pop_front() {
            return Err(error);
        }

        // Validate before applying: a commit is one request, so a mutation
        // against a missing item must leave the whole request unapplied.
        for handle in &inner.handles {
            match handle.staged() {
                Some(
                    StagedMutation::Update | StagedMutation::Delete | StagedMutation::Recycle,
                ) => {
                    let id = handle.id().ok_or(Error::MissingItemId)?;
                    if !inner.rows.contains_key(&id) {
                        return Err(Error::ItemNotFound(id));
                    }
                }
                Some(StagedMutation::Create) | None => {}
            }
        }

        let MemoryInner {
            rows,
            recycle_bin,
            next_id,
            handles,
            collections,
            ..
        } = &mut *inner;

        for handle in handles.iter() {
            match handle.staged() {
                Some(StagedMutation::Create) => {
                    let id = *next_id;
                    *next_id += 1;
                    let row = handle.staged_writes().without_id();
                    rows.insert(id, row.clone());
                    handle.complete_create(id, row);
                }
                Some(StagedMutation::Update) => {
                    if let Some(row) = handle.id().and_then(|id| rows.get_mut(&id)) {
                        let staged = handle.staged_writes();
                        for (name, value) in staged.iter() {
                            row.insert(name.to_owned(), value.clone());
                        }
                        handle.complete_update(row.clone());
                    }
                }
                Some(StagedMutation::Delete) => {
                    if let Some(id) = handle.id() {
                        rows.remove(&id);
                    }
                    handle.complete_delete();
                }
                Some(StagedMutation::Recycle) => {
                    if let Some(id) = handle.id() {
                        if let Some(row) = rows.remove(&id) {
                            recycle_bin.insert(id, row);
                        }
                    }
                    handle.complete_delete();
                }
                None => {}
            }

            if handle.load_requested() {
                handle.complete_load(handle.id().and_then(|id| rows.get(&id).cloned()));
            }
        }

        let mut page_handles = Vec::new();
        for collection in collections.iter() {
            if !collection.load_requested() {
                continue;
            }
            let (items, next_position) = run_query(rows, &collection.query());
            page_handles.extend(items.iter().cloned());
            collection.complete(items, next_position);
        }
        // Query results may become update targets later; track them like
        // any other vended handle.
        handles.extend(page_handles);

        Ok(())
    }
}

fn run_query(
    rows: &BTreeMap<ItemId, FieldValues>,
    query: &ListQuery,
) -> (Vec<ItemHandle>, Option<PagePosition>) {
    let after: Option<ItemId> = query
        .position
        .as_ref()
        .and_then(|position| position.0.parse().ok());

    let mut range = match after {
        Some(id) => rows.range((Bound::Excluded(id), Bound::Unbounded)),
        None => rows.range(..),
    };

    let limit = query.row_limit.map(|n| n as usize).unwrap_or(usize::MAX);
    let page: Vec<(ItemId, FieldValues)> = range
        .by_ref()
        .take(limit)
        .map(|(id, row)| (*id, restrict(row, &query.view_fields)))
        .collect();

    let next_position = if range.next().is_some() {
        page.last()
            .map(|(id, _)| PagePosition::new(id.to_string()))
    } else {
        None
    };

    let handles = page
        .into_iter()
        .map(|(id, fields)| ItemHandle::loaded_with(id, fields))
        .collect();
    (handles, next_position)
}

fn restrict(row: &FieldValues, view_fields: &[String]) -> FieldValues {
    if view_fields.is_empty() {
        return row.clone();
    }
    let mut restricted = FieldValues::new();
    for name in view_fields {
        if let Some(value) = row.get(name) {
            restricted.insert(name.clone(), value.clone());
        }
    }
    restricted
}

#[async_trait]
impl ListStore for MemoryStore {
    fn add_item(&self) -> ItemHandle {
        let handle = ItemHandle::new_item();
        self.inner.lock().handles.push(handle.clone());
        handle
    }

    fn item_by_id(&self, id: ItemId) -> ItemHandle {
        let handle = ItemHandle::for_id(id);
        self.inner.lock().handles.push(handle.clone());
        handle
    }

    fn get_items(&self, query: ListQuery) -> ItemCollection {
        let collection = ItemCollection::new(query);
        self.inner.lock().collections.push(collection.clone());
        collection
    }

    async fn execute(&self) -> Result<()> {
        self.commit()
    }
}
