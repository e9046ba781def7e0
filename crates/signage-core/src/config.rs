//! Applet project configuration

use crate::error::{Result, SignageError};
use crate::types::{ProjectConfig, ValidationError, ValidationResult, ValidationWarning};
use crate::utils::normalize_relative_path;
use std::path::{Path, PathBuf};

/// Configuration file names to search for
pub const CONFIG_FILE_NAMES: &[&str] = &[
    "signage.config.yaml",
    "signage.config.yml",
    "signage.config.json",
];

/// Configuration manager for loading and saving project configurations
pub struct ConfigManager {
    cache: std::collections::HashMap<PathBuf, CachedConfig>,
}

struct CachedConfig {
    config: ProjectConfig,
    modified_time: std::time::SystemTime,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    /// Create a new configuration manager
    pub fn new() -> Self {
        Self {
            cache: std::collections::HashMap::new(),
        }
    }

    /// Find configuration file in a directory
    pub fn find_config_file(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Load configuration from a file
    pub fn load(&mut self, config_path: &Path) -> Result<ProjectConfig> {
        let metadata = std::fs::metadata(config_path)?;
        let modified_time = metadata
            .modified()
            .unwrap_or(std::time::SystemTime::UNIX_EPOCH);

        if let Some(cached) = self.cache.get(config_path) {
            if cached.modified_time == modified_time {
                return Ok(cached.config.clone());
            }
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: ProjectConfig = if is_json(config_path) {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };
        config.entry_file = normalize_relative_path(&config.entry_file);

        self.cache.insert(
            config_path.to_path_buf(),
            CachedConfig {
                config: config.clone(),
                modified_time,
            },
        );

        Ok(config)
    }

    /// Load configuration from a directory (searches for config files)
    pub fn load_from_directory(&mut self, dir: &Path) -> Result<(ProjectConfig, PathBuf)> {
        let config_path = Self::find_config_file(dir)
            .ok_or_else(|| SignageError::ConfigNotFound(dir.display().to_string()))?;

        let config = self.load(&config_path)?;
        Ok((config, config_path))
    }

    /// Validate a configuration
    pub fn validate(&self, config: &ProjectConfig) -> ValidationResult {
        let mut result = ValidationResult::ok();

        if config.name.trim().is_empty() {
            result = result.with_error(ValidationError {
                field: "name".to_string(),
                message: "Applet name must not be empty".to_string(),
                code: "EMPTY_NAME".to_string(),
            });
        }

        let version_regex = regex::Regex::new(r"^\d+\.\d+\.\d+(-[0-9A-Za-z.-]+)?$")
            .expect("static version pattern");
        if !version_regex.is_match(&config.version) {
            result = result.with_error(ValidationError {
                field: "version".to_string(),
                message: "Version must follow semver format (e.g., 1.0.0)".to_string(),
                code: "INVALID_VERSION".to_string(),
            });
        }

        let entry = &config.entry_file;
        if entry.is_empty()
            || entry.starts_with('/')
            || entry.contains('\\')
            || entry.split('/').any(|segment| segment == "..")
        {
            result = result.with_error(ValidationError {
                field: "entry_file".to_string(),
                message: "Entry file must be a forward-slash path inside the applet".to_string(),
                code: "INVALID_ENTRY_FILE".to_string(),
            });
        }

        if config.applet_uid.is_none() {
            result = result.with_warning(ValidationWarning {
                field: "applet_uid".to_string(),
                message: "Applet has not been uploaded yet".to_string(),
                suggestion: Some("The first upload creates the applet and stores its uid".to_string()),
            });
        }

        result
    }

    /// Save configuration to a file
    pub fn save(&mut self, config: &ProjectConfig, config_path: &Path) -> Result<()> {
        let content = if is_json(config_path) {
            serde_json::to_string_pretty(config)?
        } else {
            serde_yaml::to_string(config)?
        };

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(config_path, content)?;
        self.cache.remove(config_path);

        Ok(())
    }

    /// Create a default configuration
    pub fn create_default(name: &str) -> ProjectConfig {
        ProjectConfig::new(name)
    }

    /// Directory holding the applet bundle for a loaded configuration
    pub fn root_dir(config: &ProjectConfig, config_path: &Path) -> PathBuf {
        let base_dir = config_path.parent().unwrap_or(Path::new("."));
        match config.root_dir.trim() {
            "" | "." => base_dir.to_path_buf(),
            root => base_dir.join(root),
        }
    }

    /// Clear the cache
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().map(|e| e == "json").unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_and_save_round_trip_keeps_uid() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config_path = dir.path().join("signage.config.yaml");
        std::fs::write(
            &config_path,
            "name: clock\nversion: 1.2.0\nentry_file: .\\app\\index.html\nroot_dir: dist\n",
        )?;

        let mut manager = ConfigManager::new();
        let (mut config, found) = manager.load_from_directory(dir.path())?;
        assert_eq!(found, config_path);
        assert_eq!(config.entry_file, "app/index.html");
        assert_eq!(ConfigManager::root_dir(&config, &found), dir.path().join("dist"));

        config.applet_uid = Some("applet-42".to_string());
        manager.save(&config, &config_path)?;

        let reloaded = manager.load(&config_path)?;
        assert_eq!(reloaded.applet_uid.as_deref(), Some("applet-42"));
        Ok(())
    }

    #[test]
    fn test_missing_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigManager::new()
            .load_from_directory(dir.path())
            .unwrap_err();
        assert!(matches!(err, SignageError::ConfigNotFound(_)));
    }

    #[test]
    fn test_validate_flags_bad_fields() {
        let mut config = ProjectConfig::new("clock");
        config.version = "one".to_string();
        config.entry_file = "../outside.html".to_string();

        let result = ConfigManager::new().validate(&config);
        assert!(!result.valid);
        let codes: Vec<&str> = result.errors.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["INVALID_VERSION", "INVALID_ENTRY_FILE"]);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_json_config_is_supported() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config_path = dir.path().join("signage.config.json");
        std::fs::write(&config_path, r#"{"name":"menu","version":"2.0.0","applet_uid":"u1"}"#)?;

        let config = ConfigManager::new().load(&config_path)?;
        assert_eq!(config.name, "menu");
        assert_eq!(config.applet_uid.as_deref(), Some("u1"));
        assert_eq!(config.entry_file, "index.html");
        Ok(())
    }
}
