//! Project persistence.
//!
//! A project is saved as one JSON record under the fixed key
//! [`PROJECT_KEY`] in a [`KeyValueStore`]:
//!
//! ```json
//! {
//!   "files": [{ "name": "deck.pdf", "size": 48213, "type": "application/pdf" }],
//!   "pages": [{ "id": "3f9a0c1b2d4e", "title": "deck.pdf — Page 1", "body": "<article>…" }],
//!   "settings": { "split_pdf_pages": true, "…": "…" },
//!   "site": { "title": "Generated Site", "…": "…" }
//! }
//! ```
//!
//! The file list is descriptive only; loading never re-reads inputs. Loading
//! replaces pages, settings and site metadata wholesale. Any top-level key
//! missing from a saved record falls back to its default.

use crate::config::{Settings, SiteMetadata};
use crate::session::ConversionSession;
use crate::types::{InputFile, Page};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// Key the project record is stored under.
pub const PROJECT_KEY: &str = "docsite-project";

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no saved project found")]
    NoSavedProject,
}

/// Name, size and declared type of an input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub media_type: String,
}

impl From<&InputFile> for FileSummary {
    fn from(file: &InputFile) -> Self {
        Self {
            name: file.name.clone(),
            size: file.size,
            media_type: file.media_type.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectRecord {
    pub files: Vec<FileSummary>,
    pub pages: Vec<Page>,
    pub settings: Settings,
    pub site: SiteMetadata,
}

impl ProjectRecord {
    /// Snapshot the current project state.
    pub fn new(files: &[InputFile], session: &ConversionSession, site: &SiteMetadata) -> Self {
        Self {
            files: files.iter().map(FileSummary::from).collect(),
            pages: session.pages().to_vec(),
            settings: session.settings().clone(),
            site: site.clone(),
        }
    }

    /// Rebuild a session from the saved pages, recomputing statistics.
    pub fn session(&self) -> ConversionSession {
        ConversionSession::from_pages(self.settings.clone(), self.pages.clone())
    }
}

/// String storage keyed by name.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, ProjectError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), ProjectError>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, ProjectError> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ProjectError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key), value)?;
        Ok(())
    }
}

/// In-memory store, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, ProjectError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ProjectError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub fn save_project(
    store: &mut impl KeyValueStore,
    record: &ProjectRecord,
) -> Result<(), ProjectError> {
    let json = serde_json::to_string_pretty(record)?;
    store.set(PROJECT_KEY, &json)?;
    debug!(
        "Saved project: {} files, {} pages",
        record.files.len(),
        record.pages.len()
    );
    Ok(())
}

pub fn load_project(store: &impl KeyValueStore) -> Result<ProjectRecord, ProjectError> {
    let json = store
        .get(PROJECT_KEY)?
        .ok_or(ProjectError::NoSavedProject)?;
    let record: ProjectRecord = serde_json::from_str(&json)?;
    debug!(
        "Loaded project: {} files, {} pages",
        record.files.len(),
        record.pages.len()
    );
    Ok(record)
}
