//! File-backed access token storage.

use directories::ProjectDirs;
use gist_client::{GistError, GistResult, TokenStore};
use std::path::PathBuf;

const TOKEN_FILENAME: &str = "token";

/// Persists the gist access token in the config directory so a token
/// supplied once survives restarts.
#[derive(Clone)]
pub struct FileTokenStore {
    path: Option<PathBuf>,
}

impl FileTokenStore {
    pub fn new() -> Self {
        Self {
            path: Self::token_path(),
        }
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    fn token_path() -> Option<PathBuf> {
        if let Ok(dir) = std::env::var("NEXUS_CONFIG_DIR") {
            return Some(PathBuf::from(dir).join(TOKEN_FILENAME));
        }

        ProjectDirs::from("com", "nexus-md", "nexus")
            .map(|dirs| dirs.config_dir().join(TOKEN_FILENAME))
    }
}

impl Default for FileTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> GistResult<Option<String>> {
        let Some(path) = &self.path else {
            return Ok(None);
        };

        match std::fs::read_to_string(path) {
            Ok(content) => {
                let token = content.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(token.to_string()))
                }
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(GistError::Storage(error.to_string())),
        }
    }

    fn save(&self, token: &str) -> GistResult<()> {
        let Some(path) = &self.path else {
            return Err(GistError::Storage(
                "no config directory available for token storage".to_string(),
            ));
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|error| GistError::Storage(error.to_string()))?;
        }
        std::fs::write(path, token).map_err(|error| GistError::Storage(error.to_string()))
    }

    fn clear(&self) -> GistResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(GistError::Storage(error.to_string())),
        }
    }
}
