//! Optional on-disk configuration (`config.json`).

use std::path::Path;

use chat_handoff_core::CompactionConfig;
use serde::Deserialize;

/// Placeholder shipped in the example config; treated as "no key".
const PLACEHOLDER_KEY: &str = "YOUR_API_KEY_HERE";

/// Contents of the configuration file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub anthropic_api_key: Option<String>,
    pub smart_mode: CompactionConfig,
}

impl FileConfig {
    /// Load the config file, falling back to defaults.
    ///
    /// A missing file is normal. An unreadable or invalid one is logged and
    /// ignored.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("no config file at {:?}, using defaults", path);
            return Self::default();
        }
        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|raw| serde_json::from_str(&raw).map_err(|e| e.to_string()));
        match parsed {
            Ok(config) => config,
            Err(e) => {
                log::warn!("ignoring config file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// The API key from the file, else from `env_key`, with surrounding
    /// whitespace removed. Blank and placeholder values count as absent.
    pub fn resolve_api_key(&self, env_key: Option<String>) -> Option<String> {
        let usable = |key: &str| {
            let key = key.trim();
            (!key.is_empty() && key != PLACEHOLDER_KEY).then(|| key.to_string())
        };
        self.anthropic_api_key
            .as_deref()
            .and_then(usable)
            .or_else(|| env_key.as_deref().and_then(usable))
    }

    /// Compaction settings with file values merged over the defaults.
    pub fn compaction_config(&self) -> CompactionConfig {
        self.smart_mode.clone()
    }
}
