//! Authentication commands

use crate::api::Client;
use crate::config::SettingsManager;
use anyhow::{Context, Result};
use colored::Colorize;

pub async fn login(email: Option<String>, password: Option<String>, yes: bool) -> Result<()> {
    println!("{}", "🔹 Login to Signage".blue().bold());
    println!();

    let email = super::prompt::text(email, "Email", yes)?;
    let password = match password {
        Some(password) => {
            println!("   Email: {}", email.dimmed());
            println!("   Password: {}", "********".dimmed());
            password
        }
        None if yes => anyhow::bail!("Missing --password (required with --yes)"),
        None => dialoguer::Password::new()
            .with_prompt("Password")
            .interact()?,
    };

    println!();
    println!("{}", "🔐 Authenticating...".dimmed());

    do_login(&email, &password).await
}

async fn do_login(email: &str, password: &str) -> Result<()> {
    let client = Client::new()?.with_token(None);
    let tokens = client.login(email, password).await.context("Login failed")?;

    let mut settings = SettingsManager::load()?;
    settings.email = Some(email.to_string());
    settings.token_id = Some(tokens.id);
    settings.access_token = Some(tokens.access_token.clone());
    SettingsManager::save(&settings)?;

    println!();
    println!("{}", "✅ Login successful!".green().bold());

    match client
        .with_token(Some(tokens.access_token))
        .get_account()
        .await
    {
        Ok(account) => {
            println!();
            println!("   Welcome, {}!", account.display_name().cyan());
        }
        Err(e) => tracing::debug!("Could not load account after login: {}", e),
    }

    Ok(())
}

pub async fn logout() -> Result<()> {
    let mut settings = SettingsManager::load()?;

    if settings.access_token.is_none() {
        println!("{}", "⚠️  Not logged in".yellow());
        return Ok(());
    }

    settings.access_token = None;
    settings.token_id = None;
    settings.email = None;
    SettingsManager::save(&settings)?;

    println!("{}", "✅ Logged out successfully".green());
    Ok(())
}

pub async fn whoami() -> Result<()> {
    let client = match Client::authenticated() {
        Ok(client) => client,
        Err(_) => {
            println!("{}", "⚠️  Not logged in".yellow());
            return Ok(());
        }
    };

    let account = client.get_account().await.context("Failed to get account info")?;
    let settings = SettingsManager::load()?;

    println!("{}", "👤 Account".blue().bold());
    println!();
    println!("   ID:    {}", account.id.dimmed());
    println!("   Email: {}", account.email.cyan());
    println!("   Name:  {}", account.display_name());
    if let Some(org) = settings.default_organization_uid {
        println!("   Default organization: {}", org.dimmed());
    }

    Ok(())
}
