//! Generation history
//!
//! Keeps a JSON log of past generations next to the outputs so a run can
//! be looked up (and repeated) later.

use crate::models::Mode;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const DEFAULT_MAX_ENTRIES: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub mode: Mode,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_name: Option<String>,
    pub outputs: Vec<PathBuf>,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input_images: Vec<PathBuf>,
    pub generation_secs: f64,
}

impl HistoryEntry {
    pub fn new(mode: Mode, prompt: String, mime_type: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            mode,
            prompt,
            aspect_ratio: None,
            image_size: None,
            workflow_id: None,
            workflow_name: None,
            outputs: Vec::new(),
            mime_type,
            width: None,
            height: None,
            input_images: Vec::new(),
            generation_secs: 0.0,
        }
    }

    fn matches(&self, keyword: &str) -> bool {
        self.prompt.to_lowercase().contains(keyword)
            || self
                .workflow_name
                .as_ref()
                .is_some_and(|name| name.to_lowercase().contains(keyword))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct History {
    pub entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    /// Entries newest first, skipping `offset` and returning at most `limit`.
    /// A limit of zero is unlimited.
    pub fn list(&self, limit: Option<usize>, offset: usize) -> Vec<&HistoryEntry> {
        let limit = limit.filter(|&n| n > 0).unwrap_or(usize::MAX);
        let mut entries: Vec<&HistoryEntry> = self.entries.iter().collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect()
    }

    /// Case-insensitive search over prompts and workflow names, newest first.
    pub fn search(&self, keyword: &str) -> Vec<&HistoryEntry> {
        let keyword = keyword.to_lowercase();
        self.list(None, 0)
            .into_iter()
            .filter(|entry| entry.matches(&keyword))
            .collect()
    }

    pub fn find(&self, id: Uuid) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Remove the entry with `id`, returning whether one was removed.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Keep only the newest `max_entries`, returning how many were dropped.
    pub fn prune(&mut self, max_entries: usize) -> usize {
        if self.entries.len() <= max_entries {
            return 0;
        }
        self.entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        let dropped = self.entries.len() - max_entries;
        self.entries.truncate(max_entries);
        self.entries.reverse();
        dropped
    }
}

/// File-backed history log.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
    max_entries: usize,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the log; a missing file is an empty history.
    pub fn load(&self) -> Result<History> {
        if !self.path.exists() {
            return Ok(History::new());
        }
        let json = fs::read_to_string(&self.path)?;
        if json.trim().is_empty() {
            return Ok(History::new());
        }
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save(&self, history: &History) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(history)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Append an entry and prune to the configured size.
    pub fn record(&self, entry: HistoryEntry) -> Result<()> {
        let mut history = self.load()?;
        history.add(entry);
        let dropped = history.prune(self.max_entries);
        if dropped > 0 {
            tracing::debug!("Pruned {} old history entries", dropped);
        }
        self.save(&history)
    }

    pub fn remove(&self, id: Uuid) -> Result<bool> {
        let mut history = self.load()?;
        let removed = history.remove(id);
        if removed {
            self.save(&history)?;
        }
        Ok(removed)
    }

    pub fn clear(&self) -> Result<()> {
        self.save(&History::new())
    }
}
