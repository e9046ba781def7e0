//! Custom script commands

use crate::api::Client;
use anyhow::{Context, Result};
use colored::Colorize;

pub async fn list() -> Result<()> {
    let client = Client::authenticated()?;
    let scripts = client
        .list_custom_scripts()
        .await
        .context("Failed to list custom scripts")?;

    println!("{}", "📜 Custom Scripts".blue().bold());
    println!();

    if scripts.is_empty() {
        println!("   (No custom scripts)");
        return Ok(());
    }

    for script in &scripts {
        let level = match script.dangerous_level.as_deref() {
            Some(level) => format!("[{}]", level).yellow(),
            None => "".normal(),
        };
        println!(
            "   {} {} {}",
            script.title.as_deref().unwrap_or(&script.name).cyan(),
            script.uid.dimmed(),
            level
        );
    }

    Ok(())
}
