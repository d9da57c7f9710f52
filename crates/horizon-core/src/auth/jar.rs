//! File-backed cookie jar.
//!
//! Entries carry browser cookie attributes and expire on their own: an
//! expired entry is never returned and is dropped from the file the next
//! time the jar is read.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cookie {
    pub value: String,
    pub expires: DateTime<Utc>,
    pub path: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub same_site: SameSite,
}

impl Cookie {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires
    }
}

pub struct CookieJar {
    path: PathBuf,
}

impl CookieJar {
    /// Bind a jar to `path`. Nothing is read or created until first use.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Live entry for `name`, if any
    pub fn get(&self, name: &str) -> Option<Cookie> {
        let mut entries = self.load();
        let before = entries.len();
        entries.retain(|_, cookie| !cookie.is_expired());

        if entries.len() != before {
            debug!(pruned = before - entries.len(), "Dropping expired cookies");
            if let Err(e) = self.save(&entries) {
                warn!(error = %e, "Failed to prune expired cookies");
            }
        }

        entries.remove(name)
    }

    pub fn set(&self, name: &str, cookie: Cookie) -> Result<()> {
        let mut entries = self.load();
        entries.insert(name.to_string(), cookie);
        self.save(&entries)
    }

    /// Remove every named entry. Missing entries are not an error.
    pub fn remove(&self, names: &[&str]) -> Result<()> {
        let mut entries = self.load();
        let before = entries.len();
        for name in names {
            entries.remove(*name);
        }
        if entries.len() == before && !self.path.exists() {
            return Ok(());
        }
        self.save(&entries)
    }

    fn load(&self) -> BTreeMap<String, Cookie> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(_) => return BTreeMap::new(),
        };

        match serde_json::from_str(&contents) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Cookie jar is corrupt, treating as empty");
                BTreeMap::new()
            }
        }
    }

    fn save(&self, entries: &BTreeMap<String, Cookie>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create cookie jar directory")?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, contents).context("Failed to write cookie jar")?;
        Ok(())
    }
}
