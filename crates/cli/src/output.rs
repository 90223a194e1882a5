//! Output naming and writing.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::Context;
use chat_handoff_core::{truncate_chars, Mode};
use chrono::NaiveDate;
use regex::Regex;

static UNSAFE_CHARS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s\-]").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

const MAX_SLUG_CHARS: usize = 50;

/// File-name-safe version of a chat title.
pub fn slugify(title: &str) -> String {
    let cleaned = UNSAFE_CHARS_RE.replace_all(title, "");
    let dashed = WHITESPACE_RE.replace_all(&cleaned, "-").to_lowercase();
    let slug = truncate_chars(&dashed, MAX_SLUG_CHARS);
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug.to_string()
    }
}

/// `<date>-handoff-<slug>-<mode>.md`
pub fn output_filename(title: &str, mode: Mode, date: NaiveDate) -> String {
    format!(
        "{}-handoff-{}-{}.md",
        date.format("%Y-%m-%d"),
        slugify(title),
        mode
    )
}

/// Write the finished document, creating the directory if needed.
pub fn write_handoff(dir: &Path, filename: &str, content: &str) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    let path = dir.join(filename);
    std::fs::write(&path, content)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
