//! Report sections - the structured output of an analysis run
//!
//! A script's only output artifact is an ordered sequence of sections;
//! append order is significant. Renderers pattern-match the variants and
//! translate each to their own format.

use serde::{Deserialize, Serialize};

/// Severity of a [`Section::Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

impl MessageLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageLevel::Info => "info",
            MessageLevel::Warning => "warning",
            MessageLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for MessageLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One unit of structured analysis output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Section {
    Heading { text: String, level: u8 },
    Text { content: String },
    Message { level: MessageLevel, text: String },
    Table { headers: Vec<String>, rows: Vec<Vec<String>> },
    List { items: Vec<String> },
    Code { content: String, language: Option<String> },
}
