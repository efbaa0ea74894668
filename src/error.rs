use thiserror::Error;

use crate::models::SnippetId;

/// Failures raised by a store adapter.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote store answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Snippet not found: {0}")]
    NotFound(SnippetId),

    #[error("Not signed in")]
    Unauthenticated,

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Draft or session problems that reject an operation before it reaches the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("A snippet needs a title")]
    MissingTitle,

    #[error("A snippet needs some code")]
    MissingCode,

    #[error("Sign in before changing snippets")]
    NotSignedIn,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Error importing snippets: {0}")]
    MalformedImport(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Import stopped after {imported} snippet(s): {source}")]
    PartialImport {
        imported: usize,
        #[source]
        source: StoreError,
    },
}

pub type Result<T> = std::result::Result<T, AppError>;
