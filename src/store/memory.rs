use async_trait::async_trait;
use log::info;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

use super::{Persistence, SnippetStore, sort_newest_first};
use crate::auth::Identity;
use crate::error::StoreError;
use crate::models::{NewSnippet, Snippet, SnippetId};

/// In-process document store with the same per-record semantics as
/// [`RemoteStore`](super::RemoteStore).
///
/// Can be told to fail, either outright or after a number of creates, to
/// exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryRemoteStore {
    documents: Mutex<Vec<Snippet>>,
    unavailable: AtomicBool,
    create_budget: Mutex<Option<usize>>,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call fail until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }

    /// Lets `count` more creates succeed, then fails the rest.
    pub fn fail_after_creates(&self, count: usize) {
        *self
            .create_budget
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(count);
    }

    /// All stored documents, regardless of owner.
    pub fn documents(&self) -> Vec<Snippet> {
        self.documents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable(
                "simulated service outage".to_string(),
            ));
        }
        Ok(())
    }

    fn take_create_slot(&self) -> Result<(), StoreError> {
        let mut budget = self
            .create_budget
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        match budget.as_mut() {
            Some(0) => Err(StoreError::Unavailable(
                "simulated write failure".to_string(),
            )),
            Some(left) => {
                *left -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SnippetStore for MemoryRemoteStore {
    fn persistence(&self) -> Persistence {
        Persistence::PerRecord
    }

    async fn load(&self, identity: Option<&Identity>) -> Result<Vec<Snippet>, StoreError> {
        let identity = identity.ok_or(StoreError::Unauthenticated)?;
        self.check_available()?;

        let mut owned: Vec<Snippet> = self
            .documents()
            .into_iter()
            .filter(|doc| doc.user_id.as_deref() == Some(identity.uid.as_str()))
            .collect();
        sort_newest_first(&mut owned);
        Ok(owned)
    }

    async fn create(
        &self,
        identity: Option<&Identity>,
        record: &NewSnippet,
    ) -> Result<SnippetId, StoreError> {
        identity.ok_or(StoreError::Unauthenticated)?;
        self.check_available()?;
        self.take_create_slot()?;

        let id = SnippetId::Key(Uuid::new_v4().simple().to_string());
        self.documents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record.clone().with_id(id.clone()));
        info!("Created document {}", id);
        Ok(id)
    }

    async fn delete(&self, identity: Option<&Identity>, id: &SnippetId) -> Result<(), StoreError> {
        identity.ok_or(StoreError::Unauthenticated)?;
        self.check_available()?;

        let mut documents = self.documents.lock().unwrap_or_else(|e| e.into_inner());
        let before = documents.len();
        documents.retain(|doc| &doc.id != id);
        if documents.len() == before {
            return Err(StoreError::NotFound(id.clone()));
        }
        info!("Deleted document {}", id);
        Ok(())
    }

    async fn save_all(&self, _snippets: &[Snippet]) -> Result<(), StoreError> {
        Ok(())
    }
}
