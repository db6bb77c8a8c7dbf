//! Solution bookkeeping persisted under `.regen/state.json`.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Directory (relative to the solution root) holding regen's own state.
pub const STATE_DIR: &str = ".regen";
pub const STATE_FILE: &str = "state.json";

/// Per-template save record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRecord {
    pub project: String,
    pub last_saved: DateTime<Utc>,
    pub saves: u64,
}

/// Everything regen remembers about a solution between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionState {
    /// Keyed by definition path relative to the solution root, `/`-separated.
    #[serde(default)]
    pub templates: BTreeMap<String, TemplateRecord>,
}

impl SolutionState {
    pub fn path_for(solution_root: &Path) -> PathBuf {
        solution_root.join(STATE_DIR).join(STATE_FILE)
    }

    /// Load state, starting fresh when the file is missing or unreadable.
    pub fn load(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(_) => return Self::default(),
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "discarding unreadable solution state");
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, json)
    }

    pub fn record_save(&mut self, key: String, project: &str, at: DateTime<Utc>) {
        self.templates
            .entry(key)
            .and_modify(|record| {
                record.project = project.to_string();
                record.last_saved = at;
                record.saves += 1;
            })
            .or_insert_with(|| TemplateRecord {
                project: project.to_string(),
                last_saved: at,
                saves: 1,
            });
    }
}
