//! CRUD operations over a remote list.
//!
//! [`ListOps`] composes the lower layers: models serialize through
//! [`ListModel`], no-op updates are pruned by [`crate::diff`], bulk work is
//! grouped by [`crate::chunk`], and every round trip is committed through
//! the configured [`ExecutionPolicy`] (or an immediate commit when none is
//! configured).
//!
//! Every operation is a short-lived stage → commit → rehydrate sequence.
//! There is no state across calls; atomicity is chunk-granular.

use crate::chunk::process_in_chunks;
use crate::diff::has_changes;
use crate::error::{Error, Result};
use crate::item::ItemHandle;
use crate::model::ListModel;
use crate::policy::ExecutionPolicy;
use crate::store::{ListQuery, ListStore};
use crate::value::FieldValues;
use crate::ItemId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Items per commit for bulk operations. Balances round-trip count against
/// batch payload size.
pub const CHUNK_SIZE: usize = 100;

/// Whether a delete is recoverable or final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeleteMode {
    /// Move to the recycle bin; recoverable
    #[default]
    Recycle,
    /// Destroy permanently
    Permanent,
}

/// Typed CRUD surface over one remote list.
pub struct ListOps<S> {
    store: S,
    policy: Option<Arc<dyn ExecutionPolicy>>,
}

impl<S: ListStore> ListOps<S> {
    /// Wrap a list handle with no policy configured (immediate commits).
    pub fn new(store: S) -> Self {
        Self {
            store,
            policy: None,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Install an execution policy, replacing any previous one. Settle
    /// configuration before starting operations; changing it mid-flight is
    /// not synchronized.
    pub fn configure_policy(&mut self, policy: Arc<dyn ExecutionPolicy>) {
        self.policy = Some(policy);
    }

    /// Revert to the default immediate-commit behavior.
    pub fn clear_policy(&mut self) {
        self.policy = None;
    }

    /// One round trip: run `stage`, then commit, through the policy hook.
    async fn commit<F>(&self, stage: F) -> Result<()>
    where
        F: FnOnce() + Send,
    {
        match &self.policy {
            Some(policy) => policy.execute(&self.store, Box::new(stage)).await,
            None => {
                stage();
                self.store.execute().await
            }
        }
    }

    /// Create one item from a record and rehydrate it (id assigned).
    pub async fn add_item<T: ListModel>(&self, item: T) -> Result<T> {
        let handle = self.store.add_item();
        let values = item.field_values();
        self.commit(|| {
            handle.populate(values);
            handle.update();
        })
        .await?;
        Ok(T::load(&handle))
    }

    /// Create many items, one commit per chunk, and rehydrate all of them
    /// in input order.
    pub async fn add_items<T: ListModel>(&self, items: Vec<T>) -> Result<Vec<T>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let values: Vec<FieldValues> = items.iter().map(|item| item.field_values()).collect();
        let handles = process_in_chunks(values, CHUNK_SIZE, |chunk| async move {
            let created: Vec<ItemHandle> = chunk
                .into_iter()
                .map(|values| {
                    let handle = self.store.add_item();
                    handle.populate(values);
                    handle.update();
                    handle
                })
                .collect();

            // Staging already happened above; the commit flushes it.
            self.commit(|| {}).await?;
            Ok(created)
        })
        .await?;

        Ok(handles.iter().map(|handle| T::load(handle)).collect())
    }

    /// Fetch one item by id. `None` if it does not exist.
    pub async fn item_by_id<T: ListModel>(&self, id: ItemId) -> Result<Option<T>> {
        let handle = self.store.item_by_id(id);
        self.commit(|| self.store.load(&handle)).await?;

        if handle.exists() {
            Ok(Some(T::load(&handle)))
        } else {
            Ok(None)
        }
    }

    /// Fetch many items by id, one commit per chunk. Ids that resolve to no
    /// item are skipped, not errors.
    pub async fn items_by_ids<T: ListModel>(&self, ids: &[ItemId]) -> Result<Vec<T>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let handles = process_in_chunks(ids.to_vec(), CHUNK_SIZE, |chunk| async move {
            let requested: Vec<ItemHandle> = chunk
                .into_iter()
                .map(|id| {
                    let handle = self.store.item_by_id(id);
                    self.store.load(&handle);
                    handle
                })
                .collect();

            self.commit(|| {}).await?;
            Ok(requested)
        })
        .await?;

        Ok(handles
            .iter()
            .filter(|handle| handle.exists())
            .map(|handle| T::load(handle))
            .collect())
    }

    /// Run a query, following continuation positions until the store
    /// reports no further page, and materialize every returned item.
    ///
    /// When the query names no view fields, the load is restricted to the
    /// record type's declared fields.
    pub async fn items<T: ListModel>(&self, query: ListQuery) -> Result<Vec<T>> {
        let mut query = query;
        if query.view_fields.is_empty() {
            query.view_fields = T::view_fields().into_iter().map(str::to_owned).collect();
        }

        let mut fetched: Vec<ItemHandle> = Vec::new();
        loop {
            let collection = self.store.get_items(query.clone());
            self.commit(|| self.store.load_items(&collection)).await?;
            fetched.extend(collection.items());

            match collection.next_position() {
                Some(position) => query.position = Some(position),
                None => break,
            }
        }

        Ok(fetched.iter().map(|handle| T::load(handle)).collect())
    }

    /// Update one item. Fetches the current snapshot and only commits a
    /// write when some field actually changed.
    pub async fn update_item<T: ListModel>(&self, item: T) -> Result<T> {
        let id = item.id().ok_or(Error::MissingItemId)?;

        let handle = self.store.item_by_id(id);
        self.commit(|| self.store.load(&handle)).await?;
        if !handle.exists() {
            return Err(Error::ItemNotFound(id));
        }

        let candidate = item.field_values();
        if has_changes(&handle.field_values(), &candidate) {
            self.commit(|| {
                handle.populate(candidate);
                handle.update();
            })
            .await?;
        } else {
            tracing::debug!(id, "update skipped, no field changes");
        }

        Ok(T::load(&handle))
    }

    /// Update many records against their source items, one commit per chunk
    /// that stages at least one changed record. Chunks where nothing
    /// changed issue no round trip at all.
    ///
    /// Every record must have an id and a live source item (from a prior
    /// read); this path does not re-fetch snapshots.
    pub async fn update_items<T: ListModel>(&self, items: Vec<T>) -> Result<Vec<T>> {
        let records: Vec<&T> = items.iter().collect();
        process_in_chunks(records, CHUNK_SIZE, |chunk| async move {
            let mut staged: Vec<ItemHandle> = Vec::new();
            for item in chunk {
                let id = item.id().ok_or(Error::MissingItemId)?;
                let handle = item.source_item().ok_or(Error::NotBound(id))?;

                let candidate = item.field_values();
                if has_changes(&handle.field_values(), &candidate) {
                    handle.populate(candidate);
                    handle.update();
                    staged.push(handle);
                }
            }

            if !staged.is_empty() {
                self.commit(|| {}).await?;
            }
            Ok(staged)
        })
        .await?;

        Ok(items)
    }

    /// Delete the item a record refers to. Fails with
    /// [`Error::ItemNotFound`] if the id no longer resolves.
    pub async fn delete_item<T: ListModel>(&self, item: &T, mode: DeleteMode) -> Result<()> {
        let id = item.id().ok_or(Error::MissingItemId)?;
        self.delete_item_by_id(id, mode).await
    }

    /// Delete one item by id.
    pub async fn delete_item_by_id(&self, id: ItemId, mode: DeleteMode) -> Result<()> {
        let handle = self.store.item_by_id(id);
        self.commit(|| stage_delete(&handle, mode)).await
    }

    /// Delete many items by id, one commit per chunk. A missing id fails
    /// the call; chunks committed before the failure stay committed and
    /// later chunks are never attempted.
    pub async fn delete_items_by_ids(&self, ids: &[ItemId], mode: DeleteMode) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        process_in_chunks(ids.to_vec(), CHUNK_SIZE, |chunk| async move {
            let staged: Vec<ItemHandle> = chunk
                .into_iter()
                .map(|id| {
                    let handle = self.store.item_by_id(id);
                    stage_delete(&handle, mode);
                    handle
                })
                .collect();

            self.commit(|| {}).await?;
            Ok(staged)
        })
        .await?;
        Ok(())
    }

    /// Delete the items a set of records refer to. Every record must have
    /// an id; that precondition is checked before any round trip.
    pub async fn delete_items<T: ListModel>(&self, items: &[T], mode: DeleteMode) -> Result<()> {
        let mut ids = Vec::with_capacity(items.len());
        for item in items {
            ids.push(item.id().ok_or(Error::MissingItemId)?);
        }
        self.delete_items_by_ids(&ids, mode).await
    }
}

fn stage_delete(handle: &ItemHandle, mode: DeleteMode) {
    match mode {
        DeleteMode::Permanent => handle.delete(),
        DeleteMode::Recycle => handle.recycle(),
    }
}
