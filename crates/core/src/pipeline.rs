//! Pipeline for loading chat exports from disk and compacting them.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::WalkDir;

use crate::conversation::{parse_export, Conversation};
use crate::document::CompactionResult;
use crate::error::HandoffError;
use crate::strategy::CompactionStrategy;

fn is_json(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"))
}

/// JSON exports directly inside a directory, newest first.
///
/// Subdirectories are not searched. Files whose modification time cannot be
/// read sort last.
pub fn discover_exports(root: &Path) -> Vec<PathBuf> {
    let mut exports: Vec<(Option<SystemTime>, PathBuf)> = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_json(e.path()))
        .map(|e| {
            let modified = e.metadata().ok().and_then(|m| m.modified().ok());
            (modified, e.into_path())
        })
        .collect();
    exports.sort_by(|(a_time, a_path), (b_time, b_path)| {
        b_time.cmp(a_time).then_with(|| a_path.cmp(b_path))
    });
    exports.into_iter().map(|(_, path)| path).collect()
}

/// The most recently modified export in a directory.
pub fn latest_export(root: &Path) -> Option<PathBuf> {
    discover_exports(root).into_iter().next()
}

/// Read and normalize a single export file.
pub fn load_export(path: &Path) -> Result<Conversation, HandoffError> {
    let raw = fs::read_to_string(path)?;
    let conversation = parse_export(&raw)?;
    log::info!(
        "loaded {:?}: {} turns after noise filtering ({} records)",
        path,
        conversation.turns().len(),
        conversation.raw_turn_count
    );
    Ok(conversation)
}

/// Load an export and compact it with the given strategy.
///
/// Either a complete result is returned or nothing is; no partial document
/// is produced.
pub fn compact_export<S>(path: &Path, strategy: &S) -> Result<CompactionResult, HandoffError>
where
    S: CompactionStrategy + ?Sized,
{
    let conversation = load_export(path)?;
    log::debug!("compacting {:?} in {} mode", path, strategy.mode());
    strategy.compact(&conversation)
}
