pub mod export;
pub mod snippet;
pub mod tags;

pub use export::{EXPORT_FILE_NAME, ImportBatch, ImportedSnippet, export_snippets, parse_import};
pub use snippet::{NewSnippet, Snippet, SnippetDraft, SnippetId, SnippetLanguage};
pub use tags::{display_tags, parse_tags};
