//! Core compaction logic for chat handoff documents.
//!
//! This crate turns a chat export (JSON) into a compact Markdown document that
//! can seed a fresh session with the context of an earlier one. Two strategies
//! are provided: a local heuristic one and one that delegates the older part of
//! the conversation to an injected [`Summarizer`].

use std::time::Duration;

/// Options handed to a [`Summarizer`] for a single call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizeOptions {
    /// Model identifier understood by the summarization backend.
    pub model_id: String,
    /// Ceiling on the length of the generated summary, in tokens.
    pub max_output_tokens: u32,
    /// Wall-clock bound for the call.
    pub timeout: Duration,
}

/// Trait for the external summarization capability.
///
/// Implementors receive the serialized older part of a conversation and return
/// a structured summary (see [`summary_prompt`] for the expected outline).
/// Transport and authentication are entirely the implementor's concern.
pub trait Summarizer {
    fn summarize(
        &self,
        transcript: &str,
        options: &SummarizeOptions,
    ) -> Result<String, SummarizationError>;
}

// Blanket implementation for references to Summarizers
impl<T: Summarizer + ?Sized> Summarizer for &T {
    fn summarize(
        &self,
        transcript: &str,
        options: &SummarizeOptions,
    ) -> Result<String, SummarizationError> {
        (*self).summarize(transcript, options)
    }
}

mod conversation;
mod document;
mod error;
mod helpers;
mod indicator;
mod noise;
pub mod pipeline;
mod signals;
mod strategy;

pub use conversation::{parse_export, Conversation, Role, Turn};
pub use document::{CompactionMetrics, CompactionResult, Document, Section};
pub use error::{FormatError, HandoffError, SummarizationError};
pub use helpers::{estimate_tokens, group_thousands, truncate_chars};
pub use indicator::ProgressIndicator;
pub use noise::{filter_noise, is_noise_line, is_noise_message};
pub use pipeline::{compact_export, discover_exports, latest_export, load_export};
pub use signals::{
    extract_decision_signals, extract_decisions, extract_path_signals, extract_paths, Signal,
    SignalRule,
};
pub use strategy::{
    AssistedStrategy, CompactionConfig, CompactionStrategy, HeuristicStrategy, Mode,
};

/// Default number of most recent turns kept verbatim
pub const VERBATIM_COUNT: usize = 30;

/// Default model used by the assisted strategy
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Default ceiling on summary length (tokens)
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4096;

/// Maximum characters of a single turn rendered in the verbatim window
pub const MAX_VERBATIM_TURN_CHARS: usize = 8000;

/// Maximum characters of a single turn sent for summarization
pub const MAX_SUMMARY_TURN_CHARS: usize = 5000;

/// Maximum characters of the whole transcript sent for summarization
pub const MAX_SUMMARY_TRANSCRIPT_CHARS: usize = 350_000;

/// Timeout for one summarization call
pub const SUMMARY_TIMEOUT_SECS: u64 = 120;

/// Maximum number of file references listed by the heuristic strategy
pub const MAX_LISTED_PATHS: usize = 30;

/// Maximum number of decision statements extracted
pub const MAX_DECISIONS: usize = 20;

/// Build the summarization prompt for the given serialized transcript.
///
/// The reply is expected to follow the seven-section outline requested here;
/// it is inserted into the handoff document as-is.
pub fn summary_prompt(transcript: &str) -> String {
    format!(
        r#"You are analyzing a development conversation to create a handoff document for resuming work in a new chat session.

CONVERSATION TO ANALYZE:
{transcript}

Create a structured summary with these sections:

## Session Overview
Brief 2-3 sentence summary of what was accomplished.

## Key Accomplishments
Bullet list of concrete things completed (files created, features implemented, bugs fixed).

## Architecture Decisions
Important technical decisions made, patterns established, conventions adopted.

## Files Modified
List the key files that were created or modified (just paths, no descriptions).

## Current State
Where things stand at the end of this portion of the conversation - what works, what's in progress.

## Known Issues / TODOs
Any bugs, incomplete items, or next steps mentioned.

## Critical Context for Continuation
Any specific details (variable names, patterns, gotchas) that would be essential for continuing this work.

Be concise but complete. Focus on actionable information for resuming work."#
    )
}
