//! # listkit
//!
//! A typed data-access layer for remote list-structured stores.
//!
//! Application-defined record models map onto list items through a small
//! trait, bulk operations are batched into fixed-size chunks to minimize
//! round trips, and field-level change detection prunes writes that would
//! not change anything remotely.
//!
//! ## Design Principles
//!
//! - **Staged, then committed**: nothing talks to the remote store except
//!   the commit step; item handles accumulate work locally
//! - **No hidden retries**: failures propagate; cross-cutting behavior is
//!   injected through an execution policy, never baked into the core
//! - **Chunk-granular atomicity**: bulk calls commit chunk by chunk, in
//!   order, and surface partial success honestly
//! - **Typed at the edges**: the core composes over any [`ListModel`]
//!   without knowing its fields
//!
//! ## Core Concepts
//!
//! ### Records
//!
//! A record type implements [`ListModel`]: deserialize from an item,
//! serialize to a [`FieldValues`] mapping (identifier excluded), declare
//! the remote fields it needs, and keep a weak [`SourceRef`] back to the
//! item it was loaded from.
//!
//! ### Staging and committing
//!
//! [`ListStore`] vends [`ItemHandle`] proxies immediately, without IO.
//! Field writes, creations, deletions and fetches are staged on handles;
//! `execute` commits everything staged as one remote request. The bundled
//! [`MemoryStore`] implements the full contract in memory.
//!
//! ### Change detection
//!
//! Before an update commits, candidate values are compared against the
//! item's snapshot with semantic equality rules per value kind (user
//! references by principal id, date-times as UTC instants, term sets
//! order-insensitively). No difference, no round trip.
//!
//! ### Execution policy
//!
//! Every round trip runs through an optional [`ExecutionPolicy`] that can
//! wrap the commit with retry, backoff or telemetry. Unconfigured, commits
//! happen immediately. [`RetryPolicy`] covers the common transient-failure
//! case.
//!
//! ## Quick Start
//!
//! ```rust
//! use listkit::{
//!     FieldValue, FieldValues, ItemHandle, ItemId, ListModel, ListOps, MemoryStore, SourceRef,
//! };
//!
//! #[derive(Debug, Default)]
//! struct Task {
//!     id: Option<ItemId>,
//!     title: Option<String>,
//!     source: SourceRef,
//! }
//!
//! impl ListModel for Task {
//!     fn from_item(item: &ItemHandle) -> Self {
//!         Task {
//!             id: item.id(),
//!             title: item.get("Title").and_then(|v| v.as_text().map(str::to_owned)),
//!             source: SourceRef::new(),
//!         }
//!     }
//!
//!     fn field_values(&self) -> FieldValues {
//!         let mut values = FieldValues::new();
//!         values.insert("Title", self.title.clone());
//!         values
//!     }
//!
//!     fn view_fields() -> Vec<&'static str> {
//!         vec!["Title"]
//!     }
//!
//!     fn id(&self) -> Option<ItemId> {
//!         self.id
//!     }
//!
//!     fn source_item(&self) -> Option<ItemHandle> {
//!         self.source.item()
//!     }
//!
//!     fn bind_source(&mut self, item: &ItemHandle) {
//!         self.source.bind(item);
//!     }
//! }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let ops = ListOps::new(MemoryStore::new());
//!
//! let task = ops
//!     .add_item(Task {
//!         title: Some("Ship the report".into()),
//!         ..Task::default()
//!     })
//!     .await
//!     .unwrap();
//! assert_eq!(task.id, Some(1));
//!
//! let fetched: Option<Task> = ops.item_by_id(1).await.unwrap();
//! assert_eq!(fetched.unwrap().title.as_deref(), Some("Ship the report"));
//! # });
//! ```

pub mod chunk;
pub mod diff;
pub mod error;
pub mod item;
pub mod memory;
pub mod model;
pub mod ops;
pub mod policy;
pub mod store;
pub mod value;

// Re-export main types at crate root
pub use chunk::process_in_chunks;
pub use diff::{has_changes, values_equal};
pub use error::{Error, Result};
pub use item::{ItemCollection, ItemHandle, StagedMutation};
pub use memory::MemoryStore;
pub use model::{ListModel, SourceRef};
pub use ops::{DeleteMode, ListOps, CHUNK_SIZE};
pub use policy::{ExecutionPolicy, RetryPolicy, StageFn};
pub use store::{ListQuery, ListStore, PagePosition};
pub use value::{FieldValue, FieldValues, LookupRef, TermRef, UrlValue, UserRef};

/// Type aliases for clarity
pub type ItemId = u64;
pub type PrincipalId = u64;
pub type TermId = uuid::Uuid;
