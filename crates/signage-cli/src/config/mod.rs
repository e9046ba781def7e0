//! Configuration management

use anyhow::{Context, Result};
use signage_core::Settings;
use std::path::{Path, PathBuf};

/// Overrides the settings directory (default `~/.signage`)
pub const HOME_ENV: &str = "SIGNAGE_HOME";

/// Overrides the stored API server URL
pub const API_URL_ENV: &str = "SIGNAGE_API_URL";

pub struct SettingsManager;

impl SettingsManager {
    /// Get the signage home directory (~/.signage)
    pub fn signage_home() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(HOME_ENV) {
            return Ok(PathBuf::from(path));
        }
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".signage"))
    }

    /// Get the settings file path
    pub fn settings_path() -> Result<PathBuf> {
        Ok(Self::signage_home()?.join("settings.json"))
    }

    /// Load settings from disk, applying environment overrides
    pub fn load() -> Result<Settings> {
        let mut settings = Self::load_from(&Self::settings_path()?)?;
        if let Ok(url) = std::env::var(API_URL_ENV) {
            settings.server_url = url.trim_end_matches('/').to_string();
        }
        Ok(settings)
    }

    /// Load settings from an explicit path; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Settings> {
        if !path.exists() {
            return Ok(Settings::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {:?}", path))
    }

    /// Save settings to disk
    pub fn save(settings: &Settings) -> Result<()> {
        Self::save_to(settings, &Self::settings_path()?)
    }

    pub fn save_to(settings: &Settings, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        let content =
            serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings to {:?}", path))?;

        // Settings hold the access token; restrict to owner only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_settings_yield_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let settings = SettingsManager::load_from(&dir.path().join("settings.json"))?;
        assert_eq!(settings.server_url, signage_core::DEFAULT_SERVER_URL);
        assert!(settings.access_token.is_none());
        Ok(())
    }

    #[test]
    fn test_save_then_load() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = Settings::default();
        settings.access_token = Some("secret".to_string());
        settings.default_organization_uid = Some("org-1".to_string());
        SettingsManager::save_to(&settings, &path)?;

        let loaded = SettingsManager::load_from(&path)?;
        assert_eq!(loaded.access_token.as_deref(), Some("secret"));
        assert_eq!(loaded.default_organization_uid.as_deref(), Some("org-1"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path)?.permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
        Ok(())
    }
}
