//! Device commands

use crate::api::Client;
use anyhow::{Context, Result};
use colored::Colorize;
use signage_core::DevicePowerAction;

pub async fn list(organization: Option<String>, yes: bool) -> Result<()> {
    let client = Client::authenticated()?;
    let org_uid = super::prompt::organization_uid(&client, organization, yes).await?;
    let devices = client
        .list_devices(Some(&org_uid))
        .await
        .context("Failed to list devices")?;

    println!("{}", "📺 Devices".blue().bold());
    println!();

    if devices.is_empty() {
        println!("   (No devices)");
        return Ok(());
    }

    for device in &devices {
        println!(
            "   {} {} {}",
            device.name.cyan(),
            device.uid.dimmed(),
            device
                .application_type
                .as_deref()
                .unwrap_or("unknown")
                .dimmed()
        );
    }

    Ok(())
}

pub async fn get(uid: &str) -> Result<()> {
    let client = Client::authenticated()?;
    let device = client
        .get_device(uid)
        .await
        .with_context(|| format!("Failed to get device {}", uid))?;

    println!("{}", "📺 Device".blue().bold());
    println!();
    println!("   UID:      {}", device.uid.dimmed());
    println!("   Name:     {}", device.name.cyan());
    if let Some(ref org) = device.organization_uid {
        println!("   Organization: {}", org);
    }
    if let Some(ref app) = device.application_type {
        println!("   Platform: {}", app);
    }
    if let Some(ref firmware) = device.firmware_version {
        println!("   Firmware: {}", firmware);
    }
    if let Some(created) = device.created_at {
        println!("   Created:  {}", created.format("%Y-%m-%d"));
    }

    Ok(())
}

pub async fn power_action(uid: &str, action: Option<String>, yes: bool) -> Result<()> {
    let action = match action {
        Some(name) => DevicePowerAction::parse(&name).ok_or_else(|| {
            let known: Vec<&str> = DevicePowerAction::all().iter().map(|a| a.as_str()).collect();
            anyhow::anyhow!("Unknown power action '{}' (expected one of: {})", name, known.join(", "))
        })?,
        None => {
            let labels: Vec<String> = DevicePowerAction::all()
                .iter()
                .map(|a| a.to_string())
                .collect();
            let index = super::prompt::select("Power action", &labels, yes)?;
            DevicePowerAction::all()[index]
        }
    };

    if !super::prompt::confirm(&format!("Send '{}' to device {}?", action, uid), yes)? {
        println!("{}", "Cancelled".dimmed());
        return Ok(());
    }

    let client = Client::authenticated()?;
    client
        .device_power_action(uid, action)
        .await
        .with_context(|| format!("Failed to send '{}' to device {}", action, uid))?;

    println!(
        "{}",
        format!("✅ Power action '{}' sent to {}", action, uid).green()
    );
    Ok(())
}
