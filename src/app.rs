//! Snippet view-model.
//!
//! [`App`] owns the in-memory collection, the active search term, the add-form
//! draft and the signed-in identity. It talks to exactly one injected
//! [`SnippetStore`] and keeps memory in step with it:
//!
//! - snapshot stores: resave the changed collection, then adopt it in memory
//! - per-record stores: issue one remote write, then splice the result in
//!
//! The presentation layer reads [`App::visible`] and calls the operations
//! below; nothing here prints or prompts.

use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};

use crate::auth::Identity;
use crate::error::{AppError, Result, StoreError, ValidationError};
use crate::models::{Snippet, SnippetDraft, SnippetId, export_snippets, parse_import};
use crate::search;
use crate::store::{Persistence, SnippetStore};

/// Result of a delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The confirmation gate said no.
    Cancelled,
    /// Nothing with that id was in the collection.
    NotFound,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

pub struct App {
    store: Box<dyn SnippetStore>,
    identity: Option<Identity>,
    snippets: Vec<Snippet>,
    pub search_term: String,
    pub draft: SnippetDraft,
    form_open: bool,
}

impl App {
    pub fn new(store: Box<dyn SnippetStore>, identity: Option<Identity>) -> Self {
        Self {
            store,
            identity,
            snippets: Vec::new(),
            search_term: String::new(),
            draft: SnippetDraft::default(),
            form_open: false,
        }
    }

    pub fn persistence(&self) -> Persistence {
        self.store.persistence()
    }

    fn requires_identity(&self) -> bool {
        self.persistence() == Persistence::PerRecord
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn snippets(&self) -> &[Snippet] {
        &self.snippets
    }

    /// Initial load. Per-record stores stay empty until someone signs in.
    pub async fn start(&mut self) -> Result<()> {
        if self.requires_identity() && self.identity.is_none() {
            debug!("Not signed in, starting with an empty collection");
            self.snippets.clear();
            return Ok(());
        }
        self.reload().await
    }

    pub async fn reload(&mut self) -> Result<()> {
        self.snippets = self.store.load(self.identity.as_ref()).await?;
        debug!("Collection holds {} snippet(s)", self.snippets.len());
        Ok(())
    }

    pub async fn sign_in(&mut self, identity: Identity) -> Result<()> {
        info!("Switching to user {}", identity.uid);
        self.identity = Some(identity);
        self.reload().await
    }

    pub fn sign_out(&mut self) {
        self.identity = None;
        if self.requires_identity() {
            self.snippets.clear();
        }
    }

    pub fn is_form_open(&self) -> bool {
        self.form_open
    }

    pub fn open_form(&mut self) {
        self.form_open = true;
    }

    pub fn close_form(&mut self) {
        self.form_open = false;
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// The collection filtered by the current search term.
    pub fn visible(&self) -> Vec<&Snippet> {
        search::filter(&self.snippets, &self.search_term)
    }

    /// Looks a snippet up by the id as it is displayed.
    pub fn find(&self, id: &str) -> Option<&Snippet> {
        let id = id.trim();
        self.snippets.iter().find(|s| s.id.to_string() == id)
    }

    /// Submits the draft. On success the draft is cleared and the form closed.
    pub async fn add(&mut self) -> Result<&Snippet> {
        self.draft.validate()?;
        let owner = self.owner_for_write()?;

        let record = self.draft.to_new_snippet(owner);
        let id = self.store.create(self.identity.as_ref(), &record).await?;
        let snippet = record.with_id(id);
        info!("Added snippet {} ({})", snippet.id, snippet.title);

        let index = match self.persistence() {
            Persistence::Snapshot => {
                let mut next = self.snippets.clone();
                next.push(snippet);
                self.commit_snapshot(next).await?;
                self.snippets.len() - 1
            }
            Persistence::PerRecord => {
                self.snippets.insert(0, snippet);
                0
            }
        };

        self.draft.clear();
        self.form_open = false;
        Ok(&self.snippets[index])
    }

    /// Deletes after `confirm` agrees.
    ///
    /// Memory only changes once the store accepted the change: snapshot stores
    /// resave the shrunk collection first, per-record stores issue the remote
    /// delete first. A failed call leaves memory untouched and returns the
    /// error. Per-record stores refuse before asking when nobody is signed in.
    pub async fn delete<F>(&mut self, id: &SnippetId, confirm: F) -> Result<DeleteOutcome>
    where
        F: FnOnce(Option<&Snippet>) -> bool,
    {
        self.owner_for_write()?;
        let position = self.snippets.iter().position(|s| &s.id == id);
        if !confirm(position.map(|i| &self.snippets[i])) {
            debug!("Delete of {} cancelled", id);
            return Ok(DeleteOutcome::Cancelled);
        }

        match self.persistence() {
            Persistence::Snapshot => {
                let Some(index) = position else {
                    return Ok(DeleteOutcome::NotFound);
                };
                self.store.delete(self.identity.as_ref(), id).await?;
                let mut next = self.snippets.clone();
                next.remove(index);
                self.commit_snapshot(next).await?;
            }
            Persistence::PerRecord => {
                self.store.delete(self.identity.as_ref(), id).await?;
                if let Some(index) = position {
                    self.snippets.remove(index);
                }
            }
        }

        info!("Deleted snippet {}", id);
        Ok(DeleteOutcome::Deleted)
    }

    /// Pretty-printed JSON of the whole collection.
    ///
    /// Per-record stores return `None` for an empty collection instead of an
    /// empty array, so callers can tell the user there is nothing to export.
    pub fn export(&self) -> Result<Option<String>> {
        if self.snippets.is_empty() && self.requires_identity() {
            return Ok(None);
        }
        let text = export_snippets(&self.snippets).map_err(StoreError::from)?;
        Ok(Some(text))
    }

    /// Validates the payload, then re-creates every well-formed entry as a new
    /// snippet owned by the current user.
    pub async fn import(&mut self, bytes: &[u8]) -> Result<ImportReport> {
        let batch = parse_import(bytes)?;
        let owner = self.owner_for_write()?;
        let skipped = batch.skipped;
        if skipped > 0 {
            warn!("Skipped {} malformed import entr(ies)", skipped);
        }

        let mut last_stamp = None;
        let imported = batch.entries.len();

        match self.persistence() {
            Persistence::Snapshot => {
                let mut next = self.snippets.clone();
                next.reserve(imported);
                for entry in batch.entries {
                    let created = next_stamp(&mut last_stamp);
                    let record = entry.into_new_snippet(owner.clone(), created);
                    let id = self.store.create(self.identity.as_ref(), &record).await?;
                    next.push(record.with_id(id));
                }
                self.commit_snapshot(next).await?;
            }
            Persistence::PerRecord => {
                for (done, entry) in batch.entries.into_iter().enumerate() {
                    let created = next_stamp(&mut last_stamp);
                    let record = entry.into_new_snippet(owner.clone(), created);
                    if let Err(source) = self.store.create(self.identity.as_ref(), &record).await
                    {
                        return Err(AppError::PartialImport {
                            imported: done,
                            source,
                        });
                    }
                }
                self.reload().await?;
            }
        }

        info!("Imported {} snippet(s)", imported);
        Ok(ImportReport { imported, skipped })
    }

    /// Owner to stamp on new records, or an error when a per-record store has
    /// nobody signed in.
    fn owner_for_write(&self) -> Result<Option<String>> {
        match self.persistence() {
            Persistence::Snapshot => Ok(None),
            Persistence::PerRecord => match &self.identity {
                Some(identity) => Ok(Some(identity.uid.clone())),
                None => Err(ValidationError::NotSignedIn.into()),
            },
        }
    }

    /// Saves `next` and only then makes it the in-memory collection.
    async fn commit_snapshot(&mut self, next: Vec<Snippet>) -> Result<()> {
        self.store.save_all(&next).await?;
        self.snippets = next;
        Ok(())
    }
}

/// Creation time for the next imported record, strictly after `last` so the
/// batch keeps its order under newest-first sorting.
fn next_stamp(last: &mut Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    let stamp = match *last {
        Some(prev) if now <= prev => prev + Duration::microseconds(1),
        _ => now,
    };
    *last = Some(stamp);
    stamp
}
