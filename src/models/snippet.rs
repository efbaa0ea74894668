use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::models::tags::parse_tags;

/// Identifier of a stored snippet.
///
/// Local stores mint millisecond timestamps, remote stores hand back their own
/// document keys. Both shapes round-trip through JSON untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SnippetId {
    Timestamp(i64),
    Key(String),
}

impl SnippetId {
    /// Reads an id typed by a user: all digits means a local timestamp.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        match input.parse::<i64>() {
            Ok(ts) => SnippetId::Timestamp(ts),
            Err(_) => SnippetId::Key(input.to_string()),
        }
    }
}

impl fmt::Display for SnippetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnippetId::Timestamp(ts) => write!(f, "{}", ts),
            SnippetId::Key(key) => f.write_str(key),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SnippetLanguage {
    #[default]
    JavaScript,
    Python,
    Java,
    Cpp,
    Ruby,
    Other,
}

impl SnippetLanguage {
    pub fn display_name(&self) -> &'static str {
        match self {
            SnippetLanguage::JavaScript => "JavaScript",
            SnippetLanguage::Python => "Python",
            SnippetLanguage::Java => "Java",
            SnippetLanguage::Cpp => "C++",
            SnippetLanguage::Ruby => "Ruby",
            SnippetLanguage::Other => "Other",
        }
    }

    /// Like `from_str`, but anything outside the known set becomes `Other`.
    pub fn lenient(name: &str) -> Self {
        name.parse().unwrap_or(SnippetLanguage::Other)
    }
}

impl FromStr for SnippetLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "javascript" | "js" => Ok(SnippetLanguage::JavaScript),
            "python" | "py" => Ok(SnippetLanguage::Python),
            "java" => Ok(SnippetLanguage::Java),
            "cpp" | "c++" => Ok(SnippetLanguage::Cpp),
            "ruby" | "rb" => Ok(SnippetLanguage::Ruby),
            "other" => Ok(SnippetLanguage::Other),
            other => Err(format!(
                "unknown language '{}' (expected one of: javascript, python, java, cpp, ruby, other)",
                other
            )),
        }
    }
}

impl fmt::Display for SnippetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A stored snippet. Field names follow the persisted JSON layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub id: SnippetId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub code: String,
    #[serde(default)]
    pub language: SnippetLanguage,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Snippet {
    pub fn line_count(&self) -> usize {
        self.code.lines().count()
    }

    pub fn created_date(&self) -> String {
        self.created.format("%Y-%m-%d").to_string()
    }
}

/// A snippet that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSnippet {
    pub title: String,
    pub description: String,
    pub code: String,
    pub language: SnippetLanguage,
    pub tags: Vec<String>,
    pub created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl NewSnippet {
    pub fn with_id(self, id: SnippetId) -> Snippet {
        Snippet {
            id,
            title: self.title,
            description: self.description,
            code: self.code,
            language: self.language,
            tags: self.tags,
            created: self.created,
            user_id: self.user_id,
        }
    }
}

/// Contents of the add form before it is submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnippetDraft {
    pub title: String,
    pub description: String,
    pub code: String,
    /// Comma-separated, as typed.
    pub tags: String,
    pub language: SnippetLanguage,
}

impl SnippetDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        if self.code.trim().is_empty() {
            return Err(ValidationError::MissingCode);
        }
        Ok(())
    }

    /// Stamps the draft with the current time and owner.
    pub fn to_new_snippet(&self, user_id: Option<String>) -> NewSnippet {
        NewSnippet {
            title: self.title.trim().to_string(),
            description: self.description.clone(),
            code: self.code.clone(),
            language: self.language,
            tags: parse_tags(&self.tags),
            created: Utc::now(),
            user_id,
        }
    }

    pub fn clear(&mut self) {
        *self = SnippetDraft::default();
    }
}
