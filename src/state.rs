//! Identifier State
//!
//! Persists the identifiers the backends assigned, keyed by `<kind>/<name>`,
//! so later runs update instead of creating duplicates.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One managed resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEntry {
    pub id: String,
    pub updated_at: DateTime<Utc>,
}

/// On-disk map of managed resources
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    path: PathBuf,
    entries: BTreeMap<String, StateEntry>,
}

impl StateStore {
    /// Get the default state file path
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .map(|p| p.join("esrec").join("state.json"))
            .unwrap_or_else(|| PathBuf::from("esrec-state.json"))
    }

    /// Load the store; a missing file is an empty store
    pub fn load(path: &Path) -> Result<Self> {
        let entries = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read state file {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse state file {}", path.display()))?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Save the store to disk
    pub fn save(&self) -> Result<()> {
        // Create parent directory
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write state file {}", self.path.display()))?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&StateEntry> {
        self.entries.get(key)
    }

    /// Identifier recorded for `key`, if any
    pub fn id(&self, key: &str) -> Option<&str> {
        self.get(key).map(|e| e.id.as_str())
    }

    /// Record an identifier and save
    pub fn record(&mut self, key: &str, id: &str) -> Result<()> {
        self.entries.insert(
            key.to_string(),
            StateEntry {
                id: id.to_string(),
                updated_at: Utc::now(),
            },
        );
        self.save()
    }

    /// Drop an identifier and save
    pub fn forget(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.save()?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
