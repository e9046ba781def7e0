//! Plugin commands

use crate::api::Client;
use anyhow::{Context, Result};
use colored::Colorize;

pub async fn list() -> Result<()> {
    let client = Client::authenticated()?;
    let plugins = client.list_plugins().await.context("Failed to list plugins")?;

    println!("{}", "🔌 Plugins".blue().bold());
    println!();

    if plugins.is_empty() {
        println!("   (No plugins)");
        return Ok(());
    }

    for plugin in &plugins {
        println!(
            "   {} {} {}",
            plugin.title.as_deref().unwrap_or(&plugin.name).cyan(),
            plugin.uid.dimmed(),
            plugin.description.as_deref().unwrap_or("").dimmed()
        );
    }

    Ok(())
}
