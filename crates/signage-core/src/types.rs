//! Core type definitions for the signage toolkit

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default entry point of an applet bundle
pub const DEFAULT_ENTRY_FILE: &str = "index.html";

/// Type used when content classification fails
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

// =============== Applet Files ===============

/// A file of the local applet bundle, fingerprinted for change detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub absolute_path: PathBuf,
    /// Forward-slash path relative to the applet root; the identity key
    pub relative_path: String,
    pub size: u64,
    pub content_hash: String,
    pub mime_type: String,
}

/// A file as last recorded by the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    #[serde(alias = "path", alias = "name")]
    pub relative_path: String,
    #[serde(alias = "hash")]
    pub content_hash: String,
    #[serde(alias = "type")]
    pub mime_type: String,
}

/// Everything the remote store needs to accept a file's content
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub absolute_path: PathBuf,
    pub relative_path: String,
    pub content_hash: String,
    pub size: u64,
    pub mime_type: String,
}

impl From<&LocalFile> for UploadFile {
    fn from(file: &LocalFile) -> Self {
        Self {
            absolute_path: file.absolute_path.clone(),
            relative_path: file.relative_path.clone(),
            content_hash: file.content_hash.clone(),
            size: file.size,
            mime_type: file.mime_type.clone(),
        }
    }
}

// =============== Applets ===============

/// Identity of one applet version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AppletVersionRef {
    pub applet_uid: String,
    pub version: String,
}

impl AppletVersionRef {
    pub fn new(applet_uid: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            applet_uid: applet_uid.into(),
            version: version.into(),
        }
    }
}

impl std::fmt::Display for AppletVersionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.applet_uid, self.version)
    }
}

/// Applet as listed by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Applet {
    pub uid: String,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Applet version metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppletVersion {
    pub applet_uid: String,
    pub version: String,
    #[serde(default)]
    pub entry_file: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

// =============== Account & Organizations ===============

/// Authentication tokens returned by login
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub id: String,
    pub access_token: String,
}

/// Account of the logged-in user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl Account {
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            _ => self.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub uid: String,
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Organization {
    pub fn label(&self) -> String {
        match &self.title {
            Some(title) => format!("{} ({})", title, self.name),
            None => self.name.clone(),
        }
    }
}

// =============== Devices ===============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub uid: String,
    pub name: String,
    #[serde(default)]
    pub organization_uid: Option<String>,
    #[serde(default)]
    pub application_type: Option<String>,
    #[serde(default)]
    pub firmware_version: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Power actions a device accepts
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DevicePowerAction {
    AppletReload,
    AppletRefresh,
    AppletDisable,
    AppletEnable,
    AppRestart,
    SystemReboot,
}

impl DevicePowerAction {
    pub fn all() -> &'static [DevicePowerAction] {
        &[
            DevicePowerAction::AppletReload,
            DevicePowerAction::AppletRefresh,
            DevicePowerAction::AppletDisable,
            DevicePowerAction::AppletEnable,
            DevicePowerAction::AppRestart,
            DevicePowerAction::SystemReboot,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DevicePowerAction::AppletReload => "reload",
            DevicePowerAction::AppletRefresh => "refresh",
            DevicePowerAction::AppletDisable => "disable",
            DevicePowerAction::AppletEnable => "enable",
            DevicePowerAction::AppRestart => "restart",
            DevicePowerAction::SystemReboot => "reboot",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|action| action.as_str() == value.to_lowercase())
    }
}

impl std::fmt::Display for DevicePowerAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============== Firmware, Plugins, Custom Scripts ===============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirmwareVersion {
    pub application_type: String,
    pub version: String,
    #[serde(default)]
    pub uploaded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plugin {
    pub uid: String,
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomScript {
    pub uid: String,
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub dangerous_level: Option<String>,
}

// =============== Project Configuration ===============

/// Applet project configuration (`signage.config.yaml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Assigned by the server on first upload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applet_uid: Option<String>,
    #[serde(default = "default_entry_file")]
    pub entry_file: String,
    /// Directory holding the bundle, relative to the config file
    #[serde(default = "default_root_dir")]
    pub root_dir: String,
    #[serde(default)]
    pub ignore: Vec<String>,
}

fn default_entry_file() -> String {
    DEFAULT_ENTRY_FILE.to_string()
}

fn default_root_dir() -> String {
    ".".to_string()
}

impl ProjectConfig {
    /// Create a new default project configuration
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: "1.0.0".to_string(),
            description: None,
            applet_uid: None,
            entry_file: default_entry_file(),
            root_dir: default_root_dir(),
            ignore: Vec::new(),
        }
    }
}

/// Validation result
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn with_error(mut self, error: ValidationError) -> Self {
        self.valid = false;
        self.errors.push(error);
        self
    }

    pub fn with_warning(mut self, warning: ValidationWarning) -> Self {
        self.warnings.push(warning);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

// =============== User Settings ===============

/// User settings persisted between invocations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub version: String,
    pub server_url: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub token_id: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub default_organization_uid: Option<String>,
}

/// API server used when nothing else is configured
pub const DEFAULT_SERVER_URL: &str = "https://api.signage.dev/v1";

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            server_url: DEFAULT_SERVER_URL.to_string(),
            email: None,
            token_id: None,
            access_token: None,
            default_organization_uid: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_file_accepts_api_field_names() {
        let json = r#"{"path":"js/app.js","hash":"abc","type":"application/javascript"}"#;
        let file: RemoteFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.relative_path, "js/app.js");
        assert_eq!(file.content_hash, "abc");
        assert_eq!(file.mime_type, "application/javascript");
    }

    #[test]
    fn test_power_action_parse() {
        assert_eq!(
            DevicePowerAction::parse("Reboot"),
            Some(DevicePowerAction::SystemReboot)
        );
        assert_eq!(DevicePowerAction::parse("explode"), None);
    }

    #[test]
    fn test_project_config_defaults() {
        let config: ProjectConfig =
            serde_yaml::from_str("name: clock\nversion: 1.0.0\n").unwrap();
        assert_eq!(config.entry_file, "index.html");
        assert_eq!(config.root_dir, ".");
        assert!(config.applet_uid.is_none());
        assert!(config.ignore.is_empty());
    }
}
