//! # Store adapters
//!
//! [`SnippetStore`] is the seam between the snippet view-model and wherever
//! snippets actually live. Two persistence strategies exist:
//!
//! - **Snapshot** ([`LocalStore`]): the whole collection sits in one key-value
//!   slot on disk and is rewritten after every change. Ids are minted locally
//!   and memory is the source of truth while the app runs.
//! - **Per-record** ([`RemoteStore`], [`MemoryRemoteStore`]): every create and
//!   delete is a single call against a document store; the collection is
//!   queried by owner, newest first. A signed-in identity is required.
//!
//! The view-model branches on [`SnippetStore::persistence`] to decide whether
//! to resave the collection or splice remote results into memory.

use async_trait::async_trait;
use std::sync::Arc;

use crate::auth::Identity;
use crate::error::StoreError;
use crate::models::{NewSnippet, Snippet, SnippetId};

pub mod local;
pub mod memory;
pub mod remote;

pub use local::{LocalStore, STORAGE_KEY};
pub use memory::MemoryRemoteStore;
pub use remote::RemoteStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    /// Whole collection rewritten after each change.
    Snapshot,
    /// One remote write per created or deleted record.
    PerRecord,
}

#[async_trait]
pub trait SnippetStore: Send + Sync {
    fn persistence(&self) -> Persistence;

    /// Reads the collection visible to `identity`.
    async fn load(&self, identity: Option<&Identity>) -> Result<Vec<Snippet>, StoreError>;

    /// Assigns an id to `record`, storing it when the store is per-record.
    async fn create(
        &self,
        identity: Option<&Identity>,
        record: &NewSnippet,
    ) -> Result<SnippetId, StoreError>;

    async fn delete(&self, identity: Option<&Identity>, id: &SnippetId) -> Result<(), StoreError>;

    /// Replaces the persisted collection. Per-record stores ignore this.
    async fn save_all(&self, snippets: &[Snippet]) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: SnippetStore + ?Sized> SnippetStore for Arc<T> {
    fn persistence(&self) -> Persistence {
        (**self).persistence()
    }

    async fn load(&self, identity: Option<&Identity>) -> Result<Vec<Snippet>, StoreError> {
        (**self).load(identity).await
    }

    async fn create(
        &self,
        identity: Option<&Identity>,
        record: &NewSnippet,
    ) -> Result<SnippetId, StoreError> {
        (**self).create(identity, record).await
    }

    async fn delete(&self, identity: Option<&Identity>, id: &SnippetId) -> Result<(), StoreError> {
        (**self).delete(identity, id).await
    }

    async fn save_all(&self, snippets: &[Snippet]) -> Result<(), StoreError> {
        (**self).save_all(snippets).await
    }
}

/// Newest first, as remote queries return them.
pub(crate) fn sort_newest_first(snippets: &mut [Snippet]) {
    snippets.sort_by(|a, b| b.created.cmp(&a.created));
}
