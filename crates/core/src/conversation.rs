//! Conversation model and normalization of raw chat exports.

use serde::Deserialize;
use serde_json::Value;

use crate::error::FormatError;
use crate::helpers::{clip_date, normalize_timestamp};
use crate::noise::{filter_noise, is_noise_message};

/// Which party authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The human side of the exchange.
    Initiator,
    /// The assistant side of the exchange.
    Responder,
}

impl Role {
    fn from_sender(sender: Option<&str>) -> Self {
        match sender {
            Some("human") | Some("user") => Role::Initiator,
            _ => Role::Responder,
        }
    }

    /// Display label used in rendered documents and transcripts.
    pub fn label(self) -> &'static str {
        match self {
            Role::Initiator => "Human",
            Role::Responder => "Assistant",
        }
    }
}

/// A single message in the conversation, already noise-filtered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    role: Role,
    text: String,
    timestamp: Option<String>,
}

impl Turn {
    /// Build a turn from raw message text.
    ///
    /// Returns `None` when the text is blank, becomes blank after line-level
    /// noise filtering, or is a whole-message status update.
    pub fn new(role: Role, raw_text: &str, timestamp: Option<String>) -> Option<Self> {
        if raw_text.trim().is_empty() {
            return None;
        }
        let text = filter_noise(raw_text);
        if text.trim().is_empty() || is_noise_message(&text) {
            return None;
        }
        Some(Self {
            role,
            text,
            timestamp,
        })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }

    /// Length of the text in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A complete, normalized conversation.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    pub title: String,
    /// Pre-existing synopsis carried over from the export.
    pub builtin_summary: Option<String>,
    pub period_start: String,
    pub period_end: String,
    /// Byte length of the raw export this conversation was parsed from.
    pub source_bytes: usize,
    /// Number of records in the export before filtering.
    pub raw_turn_count: usize,
    turns: Vec<Turn>,
}

impl Conversation {
    /// Create a conversation from already-built turns.
    pub fn new(title: impl Into<String>, turns: Vec<Turn>) -> Self {
        Self {
            title: title.into(),
            raw_turn_count: turns.len(),
            turns,
            ..Default::default()
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Total characters across all turns.
    pub fn total_chars(&self) -> usize {
        self.turns.iter().map(Turn::char_len).sum()
    }

    /// All turn texts joined by newlines.
    pub fn full_text(&self) -> String {
        self.turns
            .iter()
            .map(Turn::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Split into the older prefix and the most recent `verbatim_count` turns.
    pub fn split_recent(&self, verbatim_count: usize) -> (&[Turn], &[Turn]) {
        let boundary = self.turns.len().saturating_sub(verbatim_count);
        self.turns.split_at(boundary)
    }
}

/// Top-level export object.
#[derive(Debug, Deserialize)]
struct RawExport {
    name: Option<String>,
    summary: Option<String>,
    created_at: Option<String>,
    updated_at: Option<String>,
    chat_messages: Option<Vec<RawMessage>>,
    messages: Option<Vec<RawMessage>>,
}

/// A message record from the export.
///
/// Scalar fields are kept as raw values so a record with an unexpected shape
/// degrades to a default instead of failing the whole export.
#[derive(Debug, Deserialize)]
struct RawMessage {
    sender: Option<Value>,
    role: Option<Value>,
    created_at: Option<Value>,
    content: Option<RawContent>,
    text: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawContent {
    Text(String),
    Fragments(Vec<RawFragment>),
    Other(Value),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawFragment {
    Text(String),
    Object { text: Option<String> },
    Other(Value),
}

impl RawContent {
    fn is_empty(&self) -> bool {
        match self {
            RawContent::Text(s) => s.is_empty(),
            RawContent::Fragments(fragments) => fragments.is_empty(),
            RawContent::Other(value) => value.is_null(),
        }
    }
}

impl RawMessage {
    /// `sender`, else `role`; only string values name a sender.
    fn sender(&self) -> Option<&str> {
        self.sender
            .as_ref()
            .or(self.role.as_ref())
            .and_then(Value::as_str)
    }

    fn created_at(&self) -> Option<&str> {
        self.created_at.as_ref().and_then(Value::as_str)
    }

    /// Concatenate all text fragments in order.
    ///
    /// `text` is consulted only when `content` is absent or empty; a content
    /// list holding no text fragments yields an empty payload.
    fn extract_text(&self) -> String {
        match &self.content {
            Some(content) if !content.is_empty() => match content {
                RawContent::Text(s) => s.clone(),
                RawContent::Fragments(fragments) => fragments
                    .iter()
                    .filter_map(|f| match f {
                        RawFragment::Text(s) => Some(s.as_str()),
                        RawFragment::Object { text } => text.as_deref(),
                        RawFragment::Other(_) => None,
                    })
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n"),
                RawContent::Other(_) => String::new(),
            },
            _ => self
                .text
                .as_ref()
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }
    }
}

/// Parse a JSON chat export into a normalized [`Conversation`].
///
/// The export must be an object carrying `chat_messages` or `messages`.
/// Blank and noise-only messages are dropped; order is preserved.
pub fn parse_export(raw: &str) -> Result<Conversation, FormatError> {
    let value: Value = serde_json::from_str(raw)?;
    let object = value.as_object().ok_or(FormatError::NotAnObject)?;
    if !object.contains_key("chat_messages") && !object.contains_key("messages") {
        return Err(FormatError::MissingTurnContainer);
    }

    let export: RawExport = serde_json::from_value(value)?;
    let records = export
        .chat_messages
        .or(export.messages)
        .unwrap_or_default();
    let raw_turn_count = records.len();

    let turns: Vec<Turn> = records
        .iter()
        .filter_map(|msg| {
            Turn::new(
                Role::from_sender(msg.sender()),
                &msg.extract_text(),
                normalize_timestamp(msg.created_at()),
            )
        })
        .collect();

    log::debug!(
        "normalized {} of {} export records into turns",
        turns.len(),
        raw_turn_count
    );

    Ok(Conversation {
        title: export.name.unwrap_or_else(|| "Unknown Chat".to_string()),
        builtin_summary: export.summary.filter(|s| !s.trim().is_empty()),
        period_start: clip_date(export.created_at.as_deref()),
        period_end: clip_date(export.updated_at.as_deref()),
        source_bytes: raw.len(),
        raw_turn_count,
        turns,
    })
}
