use chrono::{DateTime, Utc};
use log::warn;
use serde::Deserialize;
use serde_json::Value;

use crate::error::AppError;
use crate::models::tags::{normalize_tags, parse_tags};
use crate::models::{NewSnippet, Snippet, SnippetLanguage};

/// File name offered for exports
pub const EXPORT_FILE_NAME: &str = "code-snippets.json";

/// Serializes the whole collection as pretty-printed JSON, unmodified.
pub fn export_snippets(snippets: &[Snippet]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(snippets)
}

/// An import entry that passed validation. Ids, owners and timestamps from the
/// file are never carried over.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedSnippet {
    pub title: String,
    pub description: String,
    pub code: String,
    pub language: SnippetLanguage,
    pub tags: Vec<String>,
}

impl ImportedSnippet {
    pub fn into_new_snippet(self, user_id: Option<String>, created: DateTime<Utc>) -> NewSnippet {
        NewSnippet {
            title: self.title,
            description: self.description,
            code: self.code,
            language: self.language,
            tags: self.tags,
            created,
            user_id,
        }
    }
}

/// Result of validating an import payload.
#[derive(Debug, Default)]
pub struct ImportBatch {
    pub entries: Vec<ImportedSnippet>,
    /// Entries that were not snippet-shaped.
    pub skipped: usize,
}

#[derive(Deserialize)]
struct RawEntry {
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    code: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    tags: Option<RawTags>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTags {
    List(Vec<String>),
    Text(String),
}

impl RawEntry {
    fn validate(self) -> Option<ImportedSnippet> {
        let title = self.title?.trim().to_string();
        let code = self.code?;
        if title.is_empty() || code.trim().is_empty() {
            return None;
        }

        let tags = match self.tags {
            Some(RawTags::List(list)) => normalize_tags(list),
            Some(RawTags::Text(text)) => parse_tags(&text),
            None => Vec::new(),
        };

        Some(ImportedSnippet {
            title,
            description: self.description.unwrap_or_default(),
            code,
            language: self
                .language
                .as_deref()
                .map(SnippetLanguage::lenient)
                .unwrap_or_default(),
            tags,
        })
    }
}

/// Validates an import payload before anything is stored.
///
/// The top level must be a JSON array; anything else is rejected as a whole.
/// Array entries that are not snippet-shaped are skipped and counted.
pub fn parse_import(bytes: &[u8]) -> Result<ImportBatch, AppError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| AppError::MalformedImport(format!("not valid JSON ({})", e)))?;

    let Value::Array(items) = value else {
        return Err(AppError::MalformedImport(
            "expected a JSON array of snippets".to_string(),
        ));
    };

    let mut batch = ImportBatch::default();
    for (index, item) in items.into_iter().enumerate() {
        let entry = serde_json::from_value::<RawEntry>(item)
            .ok()
            .and_then(RawEntry::validate);
        match entry {
            Some(entry) => batch.entries.push(entry),
            None => {
                warn!("Skipping import entry {}: not a snippet", index);
                batch.skipped += 1;
            }
        }
    }

    Ok(batch)
}
