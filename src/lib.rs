//! snipvault - store, search and share short code snippets.
//!
//! The crate is split into:
//! - [`models`]: snippets, drafts, tags, and the JSON import/export format
//! - [`store`]: the [`store::SnippetStore`] adapters (local slot, remote HTTP,
//!   in-memory remote)
//! - [`app`]: the view-model driving a single injected store
//! - [`auth`], [`config`]: identity/session and `config.toml`
//! - [`cli`]: the command-line front end

pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod search;
pub mod store;

pub use app::{App, DeleteOutcome, ImportReport};
pub use error::{AppError, StoreError, ValidationError};
