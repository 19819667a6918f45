//! The remote store capability consumed by the CRUD surface.
//!
//! Everything the core needs from a remote list lives behind [`ListStore`]:
//! vend item handles, stage a paged query, mark targets for fetch, and
//! commit all staged work as one round trip. Transport, auth and session
//! concerns belong to implementations, never to the core.

use crate::error::Result;
use crate::item::{ItemCollection, ItemHandle};
use crate::ItemId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Opaque continuation token for paged queries.
///
/// The store decides what the token means (an offset, a key, a server-side
/// cursor); callers only pass it back verbatim to fetch the next page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PagePosition(pub String);

impl PagePosition {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

/// A query against a remote list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Store-specific query text; opaque to the core
    pub text: Option<String>,
    /// Fields to fetch per item; empty means all fields
    pub view_fields: Vec<String>,
    /// Maximum items per page; `None` lets the store pick
    pub row_limit: Option<u32>,
    /// Continuation position from the previous page
    pub position: Option<PagePosition>,
}

impl ListQuery {
    /// A query matching every item in the list.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_view_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.view_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_row_limit(mut self, limit: u32) -> Self {
        self.row_limit = Some(limit);
        self
    }
}

/// A remote list handle.
///
/// The staging contract mirrors client object models: `add_item`,
/// `item_by_id` and `get_items` return proxies immediately without IO;
/// `load` marks a fetch; [`execute`](Self::execute) is the only method that
/// talks to the remote store, resolving every staged fetch and mutation as
/// one request.
///
/// Implementations must treat a staged load of a missing item as non-fatal
/// (the handle reports `exists() == false` afterwards) and a staged
/// mutation of a missing item as fatal ([`crate::Error::ItemNotFound`]).
#[async_trait]
pub trait ListStore: Send + Sync {
    /// Stage creation of a new item. Uncommitted until [`execute`](Self::execute).
    fn add_item(&self) -> ItemHandle;

    /// Handle for an existing item. No fetch happens until the handle is
    /// loaded and a commit runs.
    fn item_by_id(&self, id: ItemId) -> ItemHandle;

    /// Stage one page of a query. Resolved at the next commit.
    fn get_items(&self, query: ListQuery) -> ItemCollection;

    /// Mark an item for fetch at the next commit.
    fn load(&self, item: &ItemHandle) {
        item.mark_load();
    }

    /// Mark a staged query page for fetch at the next commit.
    fn load_items(&self, items: &ItemCollection) {
        items.mark_load();
    }

    /// Commit all staged fetches and mutations as one remote request.
    async fn execute(&self) -> Result<()>;
}
