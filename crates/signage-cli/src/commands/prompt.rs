//! Interactive fallbacks for arguments missing on the command line

use crate::api::Client;
use crate::config::SettingsManager;
use anyhow::Result;
use colored::Colorize;

/// Use `value` if given, otherwise ask. With `yes` a missing value is an error.
pub fn text(value: Option<String>, prompt: &str, yes: bool) -> Result<String> {
    if let Some(value) = value {
        return Ok(value);
    }
    if yes {
        anyhow::bail!("Missing value for '{}' (required with --yes)", prompt);
    }
    let value: String = dialoguer::Input::new()
        .with_prompt(prompt)
        .interact_text()?;
    Ok(value)
}

/// Like [`text`] but offers `default` when prompting
pub fn text_with_default(value: Option<String>, prompt: &str, default: &str, yes: bool) -> Result<String> {
    match value {
        Some(value) => Ok(value),
        None if yes => Ok(default.to_string()),
        None => Ok(dialoguer::Input::new()
            .with_prompt(prompt)
            .default(default.to_string())
            .interact_text()?),
    }
}

/// Ask for confirmation; `yes` answers it
pub fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    Ok(dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

/// Pick one of `labels`, returning its index
pub fn select(prompt: &str, labels: &[String], yes: bool) -> Result<usize> {
    if labels.is_empty() {
        anyhow::bail!("Nothing to choose from for '{}'", prompt);
    }
    if yes {
        anyhow::bail!("Missing value for '{}' (required with --yes)", prompt);
    }
    Ok(dialoguer::Select::new()
        .with_prompt(prompt)
        .items(labels)
        .default(0)
        .interact()?)
}

/// Organization from the flag, the stored default, or a prompt
pub async fn organization_uid(client: &Client, explicit: Option<String>, yes: bool) -> Result<String> {
    if let Some(uid) = explicit {
        return Ok(uid);
    }
    if let Some(uid) = SettingsManager::load()?.default_organization_uid {
        return Ok(uid);
    }

    let organizations = client.list_organizations().await?;
    let labels: Vec<String> = organizations.iter().map(|o| o.label()).collect();
    let index = select("Organization", &labels, yes)?;
    println!(
        "   {} Run {} to skip this question",
        "💡".dimmed(),
        "signage organization set-default".cyan()
    );
    Ok(organizations[index].uid.clone())
}
