use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::registry::Registry;
use crate::settings::Settings;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid state document: {0}")]
    Json(#[from] serde_json::Error),
}

/// The persisted shape, used for both import and export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub colors: Registry,
    #[serde(default)]
    pub settings: Settings,
}

impl Document {
    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a document and repair registry invariants.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let doc: Document = serde_json::from_str(json)?;
        Ok(Self {
            colors: doc.colors.sanitized(),
            settings: doc.settings,
        })
    }
}

/// Read a document. Missing or corrupt state yields an empty document.
pub fn load_or_default(path: &Path) -> Document {
    match load(path) {
        Ok(doc) => doc,
        Err(StoreError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no saved state, starting empty");
            Document::default()
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "discarding unreadable state");
            Document::default()
        }
    }
}

pub fn load(path: &Path) -> Result<Document, StoreError> {
    let raw = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Document::from_json(&raw)
}

pub fn save(doc: &Document, path: &Path) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, doc.to_json()?).map_err(io_err)
}

/// Resolve the default data directory: `$XDG_DATA_HOME`, then the
/// platform data directory, then the current directory.
pub fn data_dir() -> PathBuf {
    std::env::var_os("XDG_DATA_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::data_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dialogue-hues")
}

/// State file for one conversation scope. Characters outside
/// `[A-Za-z0-9_-]` are replaced so any scope id maps to a plain file name.
pub fn scope_path(dir: &Path, scope: &str) -> PathBuf {
    let mut name: String = scope
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if name.is_empty() {
        name.push_str("default");
    }
    dir.join(format!("{name}.json"))
}
