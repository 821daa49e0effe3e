//! Local draft persistence.
//!
//! A single recovery draft mirrors the working document so an interrupted
//! session can restore unsaved work. Blank content is never written; a
//! stale draft from a previous document would otherwise be clobbered by
//! an empty editor.

use anyhow::Result;
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use std::path::PathBuf;

const DRAFT_FILENAME: &str = "draft.md";

pub struct DraftStore {
    draft_path: Option<PathBuf>,
    last_saved: Option<DateTime<Utc>>,
}

impl DraftStore {
    pub fn new() -> Self {
        Self {
            draft_path: Self::draft_path(),
            last_saved: None,
        }
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            draft_path: Some(path),
            last_saved: None,
        }
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    /// Persist the draft. Returns `false` when the content is blank and
    /// the write was skipped.
    pub async fn save(&mut self, content: &str) -> Result<bool> {
        if content.trim().is_empty() {
            log::debug!("Skipping draft save for blank content");
            return Ok(false);
        }

        let Some(path) = &self.draft_path else {
            return Ok(false);
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, content).await?;
        self.last_saved = Some(Utc::now());
        log::debug!("Saved draft to: {}", path.display());
        Ok(true)
    }

    /// Read back the last persisted draft, if one exists.
    pub async fn load(&self) -> Result<Option<String>> {
        let Some(path) = &self.draft_path else {
            return Ok(None);
        };

        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(Some(content)),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    pub async fn clear(&mut self) -> Result<()> {
        if let Some(path) = &self.draft_path {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
                Err(error) => return Err(error.into()),
            }
        }
        self.last_saved = None;
        Ok(())
    }

    fn draft_path() -> Option<PathBuf> {
        if let Ok(dir) = std::env::var("NEXUS_DATA_DIR") {
            return Some(PathBuf::from(dir).join(DRAFT_FILENAME));
        }

        ProjectDirs::from("com", "nexus-md", "nexus")
            .map(|dirs| dirs.data_dir().join(DRAFT_FILENAME))
    }
}

impl Default for DraftStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = DraftStore::with_path(temp_dir.path().join("draft.md"));

        assert!(store.load().await.unwrap().is_none());

        let saved = store.save("# Draft\n\nwork in progress").await.unwrap();
        assert!(saved);
        assert!(store.last_saved().is_some());

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.as_deref(), Some("# Draft\n\nwork in progress"));
    }

    #[tokio::test]
    async fn test_blank_content_is_not_saved() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = DraftStore::with_path(temp_dir.path().join("draft.md"));

        store.save("# Keep me").await.unwrap();
        let saved = store.save("   \n\t\n").await.unwrap();
        assert!(!saved);

        // The earlier draft survives the skipped write.
        assert_eq!(store.load().await.unwrap().as_deref(), Some("# Keep me"));
    }

    #[tokio::test]
    async fn test_save_creates_missing_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("deep").join("draft.md");
        let mut store = DraftStore::with_path(nested);

        assert!(store.save("content").await.unwrap());
        assert_eq!(store.load().await.unwrap().as_deref(), Some("content"));
    }

    #[tokio::test]
    async fn test_clear_removes_draft() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = DraftStore::with_path(temp_dir.path().join("draft.md"));

        store.save("content").await.unwrap();
        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        assert!(store.last_saved().is_none());

        // Clearing an absent draft is not an error.
        store.clear().await.unwrap();
    }
}
