//! UI-agnostic data model
//!
//! Wire shapes received from the question-answering backend and the
//! transcript types built from them. Nothing here depends on a UI framework,
//! so the TUI and the CLI share the same structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One retrieved evidence chunk backing an answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub source: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub score: f64,
    #[serde(
        default,
        rename = "lastUpdated",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_updated: Option<String>,
}

impl Citation {
    pub fn new(source: &str, content: &str, score: f64) -> Self {
        Self {
            source: source.to_string(),
            content: content.to_string(),
            score,
            last_updated: None,
        }
    }

    /// File name portion of the source path (handles both `/` and `\`)
    pub fn filename(&self) -> &str {
        self.source
            .rsplit(|c: char| c == '/' || c == '\\')
            .find(|part| !part.is_empty())
            .unwrap_or(&self.source)
    }

    /// Relevance as a whole percentage, e.g. `95`
    pub fn match_percent(&self) -> i64 {
        (self.score * 100.0).round() as i64
    }

    /// Badge text shown next to the file name, e.g. `"95% match"`
    pub fn match_label(&self) -> String {
        format!("{}% match", self.match_percent())
    }
}

/// The role of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Assistant => "AI Assistant",
            Role::System => "System",
        }
    }
}

/// A single entry in the chat transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub is_streaming: bool,
    #[serde(default)]
    pub is_cached: bool,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn with_role(role: Role, prefix: &str, content: impl Into<String>) -> Self {
        Self {
            id: format!("{}-{}", prefix, Uuid::new_v4()),
            role,
            content: content.into(),
            citations: Vec::new(),
            confidence: None,
            is_streaming: false,
            is_cached: false,
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, "user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, "assistant", content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, "system", content)
    }

    /// Assistant entry for a failed request: fixed copy, no evidence
    pub fn error(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, "error", content)
    }

    pub fn with_citations(mut self, citations: Vec<Citation>) -> Self {
        self.citations = citations;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(crate::confidence::clamp(confidence));
        self
    }

    pub fn cached(mut self, is_cached: bool) -> Self {
        self.is_cached = is_cached;
        self
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

/// Response body of `POST /query`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub query: String,
    pub answer: String,
    #[serde(default)]
    pub context: Vec<Citation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub cached: bool,
}

impl QueryResponse {
    /// Backend-supplied confidence when present, otherwise the mean citation score
    pub fn confidence(&self) -> f64 {
        match self.confidence {
            Some(value) => crate::confidence::clamp(value),
            None => crate::confidence::derive_confidence(&self.context),
        }
    }
}

/// Response body of `POST /ingest`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestResponse {
    pub message: String,
    pub chunks_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    Positive,
    Negative,
}

impl FeedbackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackKind::Positive => "positive",
            FeedbackKind::Negative => "negative",
        }
    }
}

/// Helpful / not-helpful vote on an assistant message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub message_id: String,
    #[serde(rename = "type")]
    pub kind: FeedbackKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
