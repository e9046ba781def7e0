//! Config command - Manage CLI settings

use crate::config::{SettingsManager, API_URL_ENV};
use anyhow::{Context, Result};
use colored::Colorize;
use signage_core::Settings;

/// Set the API server URL
pub async fn set_server(url: &str) -> Result<()> {
    let mut settings = SettingsManager::load().context("Failed to load settings")?;

    settings.server_url = normalize_server_url(url)?;
    SettingsManager::save(&settings).context("Failed to save settings")?;

    println!("{} Server URL set to: {}", "✓".green(), settings.server_url.cyan());
    if std::env::var(API_URL_ENV).is_ok() {
        println!(
            "{}",
            format!("  Note: {} is set and takes precedence.", API_URL_ENV)
                .yellow()
                .dimmed()
        );
    }

    Ok(())
}

fn normalize_server_url(url: &str) -> Result<String> {
    let url = url.trim().trim_end_matches('/');
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!(
            "Invalid URL: {}. URL must start with http:// or https://",
            url
        );
    }
    Ok(url.to_string())
}

/// Show current settings
pub async fn show() -> Result<()> {
    let settings = SettingsManager::load().context("Failed to load settings")?;

    println!("{}", "Signage Configuration".bold().underline());
    println!();

    println!("{}", "Server Settings:".cyan().bold());
    println!("  API URL: {}", settings.server_url);
    if std::env::var(API_URL_ENV).is_ok() {
        println!("  {}", format!("(from {})", API_URL_ENV).dimmed());
    }
    println!();

    println!("{}", "User:".cyan().bold());
    match &settings.email {
        Some(email) if settings.access_token.is_some() => println!("  Email: {}", email),
        _ => println!("  {}", "Not logged in".yellow()),
    }
    if let Some(org) = &settings.default_organization_uid {
        println!("  Default organization: {}", org);
    }
    println!();

    println!("{}", "Config Files:".cyan().bold());
    println!(
        "  Settings: {}",
        SettingsManager::settings_path()?.display().to_string().dimmed()
    );

    Ok(())
}

/// Reset settings to defaults
pub async fn reset(yes: bool) -> Result<()> {
    let confirm = super::prompt::confirm(
        "Are you sure you want to reset all configuration? This will log you out.",
        yes,
    )?;

    if !confirm {
        println!("{}", "Reset cancelled.".yellow());
        return Ok(());
    }

    SettingsManager::save(&Settings::default()).context("Failed to save default settings")?;

    println!("{} Configuration reset to defaults.", "✓".green());
    println!("{}", "  You will need to login again.".dimmed());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_server_url() {
        assert_eq!(
            normalize_server_url("  https://signage.example.com/v1/ ").unwrap(),
            "https://signage.example.com/v1"
        );
        assert_eq!(
            normalize_server_url("http://localhost:8080").unwrap(),
            "http://localhost:8080"
        );
    }

    #[test]
    fn test_normalize_server_url_rejects_other_schemes() {
        assert!(normalize_server_url("ftp://example.com").is_err());
        assert!(normalize_server_url("example.com").is_err());
    }
}
