//! Applet commands - scaffolding, upload and listing

use crate::api::Client;
use crate::progress::UploadProgress;
use anyhow::{Context, Result};
use colored::Colorize;
use signage_core::boilerplate::{self, BoilerplateOptions};
use signage_core::files::{collect_local_files, IgnoreRules};
use signage_core::utils::{format_size, normalize_relative_path};
use signage_core::{
    AppletVersionRef, AppletVersionStore, ConfigManager, SignageError, SyncExecutor, SyncPlan,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

pub struct GenerateOptions {
    pub name: Option<String>,
    pub description: Option<String>,
    pub dir: Option<PathBuf>,
    pub force: bool,
    pub yes: bool,
}

pub async fn generate(options: GenerateOptions) -> Result<()> {
    println!("{}", "🚀 Generating applet project...".cyan().bold());

    let title = super::prompt::text(options.name, "Applet name", options.yes)?;
    let name = boilerplate::slugify(&title);
    if name.is_empty() {
        anyhow::bail!("Applet name '{}' contains no usable characters", title);
    }
    let description = match options.description {
        Some(description) => Some(description),
        None if options.yes => None,
        None => {
            let description =
                super::prompt::text_with_default(None, "Description", "", options.yes)?;
            Some(description).filter(|d| !d.trim().is_empty())
        }
    };

    let target_dir = match options.dir {
        Some(dir) => dir,
        None => std::env::current_dir()?.join(&name),
    };

    let created = boilerplate::generate(&BoilerplateOptions {
        name: name.clone(),
        description,
        target_dir: target_dir.clone(),
        force: options.force,
    })
    .await?;

    println!("{}", "✅ Applet project generated!".green().bold());
    println!();
    println!("Created files in {}:", target_dir.display().to_string().cyan());
    for file in &created {
        println!("  {}", file.cyan());
    }
    println!();
    println!("Next steps:");
    println!("  1. cd {}", target_dir.display());
    println!("  2. Edit {} and friends", "index.html".cyan());
    println!("  3. Run {} to deploy", "signage applet upload".cyan());

    Ok(())
}

pub struct UploadOptions {
    pub dir: Option<PathBuf>,
    pub entry_file: Option<String>,
    pub organization: Option<String>,
    pub dry_run: bool,
    pub yes: bool,
}

pub async fn upload(options: UploadOptions) -> Result<()> {
    let project_dir = match options.dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let mut config_manager = ConfigManager::new();
    let (mut config, config_path) = config_manager
        .load_from_directory(&project_dir)
        .context("Failed to load applet configuration")?;

    if let Some(entry) = options.entry_file {
        config.entry_file = normalize_relative_path(&entry);
    }
    let validation = config_manager.validate(&config);
    if !validation.valid {
        for error in &validation.errors {
            println!("  {} {}: {}", "•".red(), error.field.red(), error.message);
        }
        anyhow::bail!("Invalid applet configuration in {}", config_path.display());
    }

    println!(
        "{} {} {}",
        "📦 Uploading applet".cyan().bold(),
        config.name.cyan(),
        config.version.dimmed()
    );

    let root = ConfigManager::root_dir(&config, &config_path);
    let rules = IgnoreRules::for_project(&root, &config.ignore)?;
    let files = collect_local_files(&root, &rules)
        .await
        .with_context(|| format!("Failed to read applet files in {}", root.display()))?;
    if !files.iter().any(|f| f.relative_path == config.entry_file) {
        anyhow::bail!(
            "Entry file '{}' not found in {}",
            config.entry_file,
            root.display()
        );
    }
    let total: u64 = files.iter().map(|f| f.size).sum();
    println!("  {} files, {}", files.len(), format_size(total).dimmed());

    let client = Arc::new(Client::authenticated()?);

    let applet_uid = match config.applet_uid.clone() {
        Some(uid) => uid,
        None if options.dry_run => {
            println!("{}", "  Applet does not exist yet; every file would be created".yellow());
            return Ok(());
        }
        None => {
            if !super::prompt::confirm(&format!("Create new applet '{}'?", config.name), options.yes)? {
                println!("{}", "Cancelled".dimmed());
                return Ok(());
            }
            let org_uid =
                super::prompt::organization_uid(&client, options.organization, options.yes).await?;
            let applet = client
                .create_applet(&config.name, Some(&org_uid))
                .await
                .context("Failed to create applet")?;
            info!("Created applet {}", applet.uid);

            config.applet_uid = Some(applet.uid.clone());
            config_manager.save(&config, &config_path)?;
            println!("  Created applet {}", applet.uid.dimmed());
            applet.uid
        }
    };

    let version = AppletVersionRef::new(applet_uid, config.version.clone());
    match client.get(&version).await {
        Ok(_) => {}
        Err(SignageError::NotFound(_)) if !options.dry_run => {
            client
                .create_applet_version(&version, &config.entry_file)
                .await
                .with_context(|| format!("Failed to create applet version {}", version))?;
            println!("  Created version {}", version.version.dimmed());
        }
        Err(SignageError::NotFound(_)) => {
            println!("{}", "  Version does not exist yet; every file would be created".yellow());
            return Ok(());
        }
        Err(e) => return Err(e).context("Failed to get applet version"),
    }

    let executor = SyncExecutor::new(client.clone(), client.clone(), Arc::new(UploadProgress::new()));

    if options.dry_run {
        let plan = executor.plan(&files, &version).await?;
        print_plan(&plan);
        return Ok(());
    }

    let report = executor
        .sync(&files, &version, &config.entry_file)
        .await
        .with_context(|| format!("Failed to upload applet {}", version))?;

    for path in &report.created {
        println!("  {} {}", "+".green(), path);
    }
    for path in &report.updated {
        println!("  {} {}", "~".yellow(), path);
    }
    for path in &report.deleted {
        println!("  {} {}", "-".red(), path);
    }

    if report.changed_count() == 0 {
        println!("{}", "✅ No files changed".green().bold());
    } else {
        println!(
            "{}",
            format!(
                "✅ {} files uploaded ({} in {}ms)",
                report.changed_count(),
                format_size(report.uploaded_bytes),
                report.duration_ms
            )
            .green()
            .bold()
        );
    }
    if report.build_triggered {
        println!("  {}", "Applet build started on the server".dimmed());
    }

    Ok(())
}

fn print_plan(plan: &SyncPlan) {
    println!("{}", "📋 Upload plan (dry run)".yellow());
    for file in &plan.creates {
        println!("  {} {}", "+".green(), file.relative_path);
    }
    for file in &plan.updates {
        println!("  {} {}", "~".yellow(), file.relative_path);
    }
    for file in &plan.deletes {
        println!("  {} {}", "-".red(), file.relative_path);
    }
    println!(
        "  {} to upload, {} to delete, {} unchanged",
        plan.creates.len() + plan.updates.len(),
        plan.deletes.len(),
        plan.unchanged.len()
    );
}

pub async fn list(organization: Option<String>, yes: bool) -> Result<()> {
    let client = Client::authenticated()?;
    let org_uid = super::prompt::organization_uid(&client, organization, yes).await?;
    let applets = client
        .list_applets(Some(&org_uid))
        .await
        .context("Failed to list applets")?;

    println!("{}", "🧩 Applets".blue().bold());
    println!();

    if applets.is_empty() {
        println!("   (No applets)");
    }
    for applet in &applets {
        println!("   {} {}", applet.name.cyan(), applet.uid.dimmed());
    }

    Ok(())
}

pub async fn versions(uid: Option<String>, dir: Option<PathBuf>) -> Result<()> {
    let uid = match uid {
        Some(uid) => uid,
        None => {
            let project_dir = match dir {
                Some(dir) => dir,
                None => std::env::current_dir()?,
            };
            let (config, _) = ConfigManager::new()
                .load_from_directory(&project_dir)
                .context("No applet uid given and no applet configuration found")?;
            config
                .applet_uid
                .context("Applet has not been uploaded yet")?
        }
    };

    let client = Client::authenticated()?;
    let versions = client
        .list_applet_versions(&uid)
        .await
        .with_context(|| format!("Failed to list versions of applet {}", uid))?;

    println!("{}", format!("🧩 Versions of {}", uid).blue().bold());
    println!();

    if versions.is_empty() {
        println!("   (No versions)");
    }
    for version in &versions {
        println!(
            "   {} entry: {}",
            version.version.cyan(),
            version.entry_file.as_deref().unwrap_or("-").dimmed()
        );
    }

    Ok(())
}
