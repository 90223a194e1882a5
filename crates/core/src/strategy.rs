//! Compaction strategies.
//!
//! Both strategies emit the same section layout: header, optional built-in
//! summary, a mode-specific body, the verbatim window and a fixed footer.

use std::fmt;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::conversation::{Conversation, Turn};
use crate::document::{CompactionResult, Document, Section};
use crate::error::{HandoffError, SummarizationError};
use crate::helpers::{estimate_tokens, group_thousands, truncate_chars};
use crate::indicator::ProgressIndicator;
use crate::signals::{extract_decisions, extract_paths};
use crate::{
    SummarizeOptions, Summarizer, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_MODEL, MAX_LISTED_PATHS,
    MAX_SUMMARY_TRANSCRIPT_CHARS, MAX_SUMMARY_TURN_CHARS, MAX_VERBATIM_TURN_CHARS,
    SUMMARY_TIMEOUT_SECS, VERBATIM_COUNT,
};

/// Which strategy produced a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Heuristic,
    Assisted,
}

impl Mode {
    /// Short lowercase name, used in file names and reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Heuristic => "heuristic",
            Mode::Assisted => "assisted",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Mode::Heuristic => "Heuristic (algorithmic - offline)",
            Mode::Assisted => "Assisted (AI-summarized)",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration shared by the strategies.
///
/// Deserializes from the `smart_mode` section of the config file; missing
/// keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompactionConfig {
    /// Number of most recent turns kept verbatim.
    #[serde(alias = "verbatim_recent_messages")]
    pub verbatim_count: usize,
    /// Model identifier passed to the summarizer.
    #[serde(alias = "model")]
    pub model_id: String,
    /// Ceiling on summary length, in tokens.
    pub max_output_tokens: u32,
}

impl Default for CompactionConfig {
    fn default() -> Self {
        Self {
            verbatim_count: VERBATIM_COUNT,
            model_id: DEFAULT_MODEL.to_string(),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

impl CompactionConfig {
    pub fn summarize_options(&self) -> SummarizeOptions {
        SummarizeOptions {
            model_id: self.model_id.clone(),
            max_output_tokens: self.max_output_tokens,
            timeout: Duration::from_secs(SUMMARY_TIMEOUT_SECS),
        }
    }
}

/// A way of turning a conversation into a handoff document.
pub trait CompactionStrategy {
    fn mode(&self) -> Mode;

    fn compact(&self, conversation: &Conversation) -> Result<CompactionResult, HandoffError>;
}

/// Local, deterministic compaction based on pattern extraction.
#[derive(Debug, Clone)]
pub struct HeuristicStrategy {
    config: CompactionConfig,
    generated_at: Option<NaiveDateTime>,
}

impl HeuristicStrategy {
    pub fn new(config: CompactionConfig) -> Self {
        Self {
            config,
            generated_at: None,
        }
    }

    /// Pin the generation time shown in the header instead of reading the clock.
    pub fn with_generated_at(mut self, at: NaiveDateTime) -> Self {
        self.generated_at = Some(at);
        self
    }
}

impl CompactionStrategy for HeuristicStrategy {
    fn mode(&self) -> Mode {
        Mode::Heuristic
    }

    fn compact(&self, conversation: &Conversation) -> Result<CompactionResult, HandoffError> {
        let all_text = conversation.full_text();
        let paths = extract_paths(&all_text);
        let decisions = extract_decisions(&all_text);
        let (older, recent) = conversation.split_recent(self.config.verbatim_count);

        let header = header_section(
            conversation,
            Mode::Heuristic,
            self.generated_at,
            &[
                format!("**Message Count:** {}", conversation.turns().len()),
                format!(
                    "**Estimated Tokens:** ~{}",
                    group_thousands(estimate_tokens(all_text.chars().count()))
                ),
            ],
        );

        let mut doc = Document::new();
        doc.push(header)
            .push_opt(builtin_summary_section(conversation))
            .push_opt(files_section(&paths))
            .push_opt(decisions_section(&decisions))
            .push(verbatim_section(
                recent,
                &format!("*Last {} messages preserved:*", recent.len()),
            ))
            .push(footer_section());

        Ok(CompactionResult::assemble(
            &conversation.title,
            doc,
            Mode::Heuristic,
            conversation.source_bytes,
            older.len(),
            recent.len(),
        ))
    }
}

/// Compaction that hands the older part of the conversation to a
/// [`Summarizer`] and keeps the recent part verbatim.
///
/// Summarizer failures are returned to the caller as-is.
pub struct AssistedStrategy<S>
where
    S: Summarizer,
{
    config: CompactionConfig,
    summarizer: S,
    show_progress: bool,
    generated_at: Option<NaiveDateTime>,
}

impl<S> AssistedStrategy<S>
where
    S: Summarizer,
{
    pub fn new(config: CompactionConfig, summarizer: S) -> Self {
        Self {
            config,
            summarizer,
            show_progress: false,
            generated_at: None,
        }
    }

    /// Draw a progress indicator on stderr while the summarizer runs.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Pin the generation time shown in the header instead of reading the clock.
    pub fn with_generated_at(mut self, at: NaiveDateTime) -> Self {
        self.generated_at = Some(at);
        self
    }

    fn summarize_older(&self, older: &[Turn]) -> Result<String, SummarizationError> {
        let transcript = serialize_transcript(older);
        let options = self.config.summarize_options();
        log::info!(
            "summarizing {} older turns ({} chars) with {}",
            older.len(),
            transcript.chars().count(),
            options.model_id
        );

        let result = {
            let _indicator = self
                .show_progress
                .then(|| ProgressIndicator::start("Summarizing earlier conversation"));
            self.summarizer.summarize(&transcript, &options)
        };

        let summary = result?;
        log::info!("received summary of {} chars", summary.chars().count());
        Ok(summary)
    }
}

impl<S> CompactionStrategy for AssistedStrategy<S>
where
    S: Summarizer,
{
    fn mode(&self) -> Mode {
        Mode::Assisted
    }

    fn compact(&self, conversation: &Conversation) -> Result<CompactionResult, HandoffError> {
        let (older, recent) = conversation.split_recent(self.config.verbatim_count);

        let summary = if older.is_empty() {
            None
        } else {
            Some(self.summarize_older(older)?)
        };

        let header = header_section(
            conversation,
            Mode::Assisted,
            self.generated_at,
            &[
                format!(
                    "**Message Count:** {} ({} summarized, {} verbatim)",
                    conversation.turns().len(),
                    older.len(),
                    recent.len()
                ),
                format!(
                    "**Original Size:** ~{} tokens",
                    group_thousands(estimate_tokens(conversation.total_chars()))
                ),
            ],
        );

        let mut doc = Document::new();
        doc.push(header)
            .push_opt(builtin_summary_section(conversation))
            .push_opt(
                summary
                    .filter(|s| !s.trim().is_empty())
                    .map(|s| Section::titled("## AI-Summarized Earlier Content", s)),
            )
            .push(verbatim_section(
                recent,
                &format!(
                    "*Last {} messages preserved for immediate context:*",
                    recent.len()
                ),
            ))
            .push(footer_section());

        Ok(CompactionResult::assemble(
            &conversation.title,
            doc,
            Mode::Assisted,
            conversation.source_bytes,
            older.len(),
            recent.len(),
        ))
    }
}

/// Serialize turns as `[Role]: text` blocks for the summarizer.
///
/// Each turn is cut to [`MAX_SUMMARY_TURN_CHARS`]; the whole transcript is cut
/// to [`MAX_SUMMARY_TRANSCRIPT_CHARS`] with a marker appended.
pub(crate) fn serialize_transcript(turns: &[Turn]) -> String {
    let transcript = turns
        .iter()
        .map(|t| {
            format!(
                "[{}]: {}",
                t.role().label(),
                truncate_chars(t.text(), MAX_SUMMARY_TURN_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let total = transcript.chars().count();
    if total > MAX_SUMMARY_TRANSCRIPT_CHARS {
        log::warn!(
            "large conversation ({} chars) - truncating transcript to {} chars for summarization",
            total,
            MAX_SUMMARY_TRANSCRIPT_CHARS
        );
        format!(
            "{}\n\n[...truncated due to size...]",
            truncate_chars(&transcript, MAX_SUMMARY_TRANSCRIPT_CHARS)
        )
    } else {
        transcript
    }
}

fn header_section(
    conversation: &Conversation,
    mode: Mode,
    generated_at: Option<NaiveDateTime>,
    counts: &[String],
) -> Section {
    let generated = generated_at.unwrap_or_else(|| Local::now().naive_local());
    let mut lines = vec![
        format!("**Generated:** {}", generated.format("%Y-%m-%d %H:%M")),
        format!("**Mode:** {}", mode.description()),
        format!(
            "**Original Chat Period:** {} to {}",
            conversation.period_start, conversation.period_end
        ),
    ];
    lines.extend(counts.iter().cloned());
    Section::titled(format!("# Handoff: {}", conversation.title), lines.join("\n"))
}

fn builtin_summary_section(conversation: &Conversation) -> Option<Section> {
    conversation
        .builtin_summary
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(|s| Section::titled("## Quick Context (Auto-generated)", s))
}

fn files_section(paths: &[String]) -> Option<Section> {
    if paths.is_empty() {
        return None;
    }
    let body = paths
        .iter()
        .take(MAX_LISTED_PATHS)
        .map(|p| format!("- `{}`", p))
        .collect::<Vec<_>>()
        .join("\n");
    Some(Section::titled("## Files Referenced", body))
}

fn decisions_section(decisions: &[String]) -> Option<Section> {
    if decisions.is_empty() {
        return None;
    }
    let body = decisions
        .iter()
        .map(|d| format!("- {}", d))
        .collect::<Vec<_>>()
        .join("\n");
    Some(Section::titled("## Key Decisions & Patterns", body))
}

fn render_turn(turn: &Turn) -> String {
    let heading = match turn.timestamp() {
        Some(ts) => format!("### **{}:** ({})", turn.role().label(), ts),
        None => format!("### **{}:**", turn.role().label()),
    };
    let original_len = turn.char_len();
    let body = if original_len > MAX_VERBATIM_TURN_CHARS {
        format!(
            "{}\n\n*[Truncated - original was {} chars]*",
            truncate_chars(turn.text(), MAX_VERBATIM_TURN_CHARS),
            group_thousands(original_len)
        )
    } else {
        turn.text().to_string()
    };
    format!("{}\n\n{}", heading, body)
}

fn verbatim_section(recent: &[Turn], intro: &str) -> Section {
    let mut blocks = vec![intro.to_string()];
    blocks.extend(recent.iter().map(render_turn));
    Section::titled("## Recent Conversation (Verbatim)", blocks.join("\n\n"))
}

fn footer_section() -> Section {
    Section::plain(
        "---\n\n\
         ## Resumption Instructions\n\n\
         1. Share this handoff document at the start of a new chat session\n\
         2. Reference any relevant project documentation\n\
         3. Specify which aspect of the work to continue",
    )
}
