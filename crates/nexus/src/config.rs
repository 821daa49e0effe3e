use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs::try_exists;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PreviewMode {
    Side,
    PreviewOnly,
    EditorOnly,
}

impl PreviewMode {
    pub fn cycled(self) -> Self {
        match self {
            PreviewMode::Side => PreviewMode::PreviewOnly,
            PreviewMode::PreviewOnly => PreviewMode::EditorOnly,
            PreviewMode::EditorOnly => PreviewMode::Side,
        }
    }
}

/// Process-wide UI preferences, loaded once at startup and persisted on
/// every update. Per-field defaults let a partially valid settings file
/// keep its good keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_theme")]
    pub theme: Theme,
    #[serde(default = "default_auto_save")]
    pub auto_save_enabled: bool,
    #[serde(default = "default_preview_mode")]
    pub preview_mode: PreviewMode,
}

fn default_theme() -> Theme {
    Theme::Light
}

fn default_auto_save() -> bool {
    true
}

fn default_preview_mode() -> PreviewMode {
    PreviewMode::Side
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            auto_save_enabled: default_auto_save(),
            preview_mode: default_preview_mode(),
        }
    }
}

/// A partial settings change; unset fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub theme: Option<Theme>,
    pub auto_save_enabled: Option<bool>,
    pub preview_mode: Option<PreviewMode>,
}

impl Settings {
    pub async fn load() -> Result<Self> {
        if let Some(settings_path) = Self::settings_path() {
            if try_exists(&settings_path).await? {
                match tokio::fs::read_to_string(&settings_path).await {
                    Ok(content) => {
                        if content.trim().is_empty() {
                            log::warn!("Settings file is empty, creating new one");
                            let defaults = Self::default();
                            let _ = defaults.save().await;
                            return Ok(defaults);
                        }

                        match serde_json::from_str::<Self>(&content) {
                            Ok(settings) => {
                                log::info!(
                                    "Successfully loaded settings from: {}",
                                    settings_path.display()
                                );
                                return Ok(settings);
                            }
                            Err(json_err) => {
                                log::error!("Failed to parse settings file: {}", json_err);

                                // Back up the broken file before replacing it
                                let backup_path = settings_path.with_extension("bak");
                                if let Err(e) =
                                    tokio::fs::copy(&settings_path, &backup_path).await
                                {
                                    log::warn!("Failed to back up broken settings: {}", e);
                                } else {
                                    log::info!(
                                        "Backed up broken settings to: {}",
                                        backup_path.display()
                                    );
                                }

                                let defaults = Self::default();
                                let _ = defaults.save().await;
                                return Ok(defaults);
                            }
                        }
                    }
                    Err(io_err) => {
                        log::error!("Failed to read settings file: {}", io_err);
                    }
                }
            } else {
                log::info!("Settings file does not exist, creating defaults");
            }
        }

        let defaults = Self::default();
        let _ = defaults.save().await;
        Ok(defaults)
    }

    pub async fn save(&self) -> Result<()> {
        if let Some(settings_path) = Self::settings_path() {
            if let Some(parent) = settings_path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let content = serde_json::to_string_pretty(self)?;
            tokio::fs::write(&settings_path, content).await?;
            log::debug!("Saved settings to: {}", settings_path.display());
        }
        Ok(())
    }

    /// Shallow-merge without persisting.
    pub fn merged(&self, update: SettingsUpdate) -> Settings {
        Settings {
            theme: update.theme.unwrap_or(self.theme),
            auto_save_enabled: update.auto_save_enabled.unwrap_or(self.auto_save_enabled),
            preview_mode: update.preview_mode.unwrap_or(self.preview_mode),
        }
    }

    /// Merge a partial update and persist the full merged object.
    pub async fn apply(&mut self, update: SettingsUpdate) -> Result<()> {
        *self = self.merged(update);
        self.save().await
    }

    pub async fn toggle_theme(&mut self) -> Result<()> {
        self.apply(SettingsUpdate {
            theme: Some(self.theme.toggled()),
            ..Default::default()
        })
        .await
    }

    pub async fn toggle_auto_save(&mut self) -> Result<()> {
        self.apply(SettingsUpdate {
            auto_save_enabled: Some(!self.auto_save_enabled),
            ..Default::default()
        })
        .await
    }

    pub async fn cycle_preview_mode(&mut self) -> Result<()> {
        self.apply(SettingsUpdate {
            preview_mode: Some(self.preview_mode.cycled()),
            ..Default::default()
        })
        .await
    }

    fn settings_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("NEXUS_CONFIG_PATH") {
            return Some(PathBuf::from(path));
        }

        if let Ok(dir) = std::env::var("NEXUS_CONFIG_DIR") {
            return Some(PathBuf::from(dir).join("settings.json"));
        }

        ProjectDirs::from("com", "nexus-md", "nexus")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }
}

/// Serializes tests that touch NEXUS_* environment variables.
#[cfg(test)]
pub(crate) fn env_test_lock() -> &'static std::sync::Mutex<()> {
    use std::sync::{Mutex, OnceLock};
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}
