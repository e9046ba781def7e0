//! Organization commands

use crate::api::Client;
use crate::config::SettingsManager;
use anyhow::{Context, Result};
use colored::Colorize;
use signage_core::Organization;

pub async fn list() -> Result<()> {
    let client = Client::authenticated()?;
    let organizations = client
        .list_organizations()
        .await
        .context("Failed to list organizations")?;
    let default_uid = SettingsManager::load()?.default_organization_uid;

    println!("{}", "🏢 Organizations".blue().bold());
    println!();

    if organizations.is_empty() {
        println!("   (No organizations)");
        return Ok(());
    }

    for org in &organizations {
        let marker = if default_uid.as_deref() == Some(org.uid.as_str()) {
            "*"
        } else {
            " "
        };
        println!("   [{}] {} {}", marker, org.label().cyan(), org.uid.dimmed());
    }

    Ok(())
}

pub async fn get(uid: Option<String>, yes: bool) -> Result<()> {
    let client = Client::authenticated()?;
    let uid = choose(&client, uid, yes).await?;
    let org = client
        .get_organization(&uid)
        .await
        .with_context(|| format!("Failed to get organization {}", uid))?;

    print_organization(&org);
    Ok(())
}

pub async fn set_default(uid: Option<String>, yes: bool) -> Result<()> {
    let client = Client::authenticated()?;
    let uid = choose(&client, uid, yes).await?;
    let org = client
        .get_organization(&uid)
        .await
        .with_context(|| format!("Organization {} not found", uid))?;

    let mut settings = SettingsManager::load()?;
    settings.default_organization_uid = Some(org.uid.clone());
    SettingsManager::save(&settings)?;

    println!(
        "{}",
        format!("✅ Default organization set to '{}'", org.label()).green()
    );
    Ok(())
}

/// Unlike other commands this always prompts instead of using the default
async fn choose(client: &Client, uid: Option<String>, yes: bool) -> Result<String> {
    if let Some(uid) = uid {
        return Ok(uid);
    }
    let organizations = client.list_organizations().await?;
    let labels: Vec<String> = organizations.iter().map(|o| o.label()).collect();
    let index = super::prompt::select("Organization", &labels, yes)?;
    Ok(organizations[index].uid.clone())
}

fn print_organization(org: &Organization) {
    println!("{}", "🏢 Organization".blue().bold());
    println!();
    println!("   UID:   {}", org.uid.dimmed());
    println!("   Name:  {}", org.name.cyan());
    if let Some(ref title) = org.title {
        println!("   Title: {}", title);
    }
    if let Some(created) = org.created_at {
        println!("   Created: {}", created.format("%Y-%m-%d"));
    }
}
