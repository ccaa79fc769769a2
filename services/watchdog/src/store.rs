//! Status document persistence

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::document::StatusDocument;
use crate::WatchdogError;

/// Loads and saves the status document at a fixed path
#[derive(Debug, Clone)]
pub struct StatusStore {
    path: PathBuf,
}

impl StatusStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> crate::Result<StatusDocument> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(WatchdogError::NotFound(self.path.clone()))
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&content).map_err(|e| {
            WatchdogError::Malformed(format!("{}: {}", self.path.display(), e))
        })
    }

    /// Write the document pretty-printed. The new content goes to a temporary
    /// file next to the target and is renamed over it, so readers see either
    /// the old or the new document.
    pub fn save(&self, doc: &StatusDocument) -> crate::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, doc)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;

        if let Ok(metadata) = std::fs::metadata(&self.path) {
            std::fs::set_permissions(tmp.path(), metadata.permissions())?;
        }

        tmp.persist(&self.path).map_err(|e| WatchdogError::Io(e.error))?;
        tracing::debug!("Saved status document to {}", self.path.display());
        Ok(())
    }
}
