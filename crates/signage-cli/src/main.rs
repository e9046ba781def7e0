//! Signage CLI
//!
//! Command line client for the digital signage platform: applets,
//! devices, firmware and account management.

mod api;
mod commands;
mod config;
mod progress;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "signage")]
#[command(author, version, about = "Signage - manage applets and devices of the signage platform", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Login to the signage platform
    Login {
        /// Email address (optional - will prompt if not provided)
        #[arg(short, long)]
        email: Option<String>,
        /// Password (optional - will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
        /// Skip interactive prompts
        #[arg(short, long)]
        yes: bool,
    },

    /// Logout and forget the stored token
    Logout,

    /// Show current account
    Whoami,

    /// Manage organizations
    #[command(alias = "org")]
    Organization {
        #[command(subcommand)]
        action: OrganizationAction,
    },

    /// Manage devices
    Device {
        #[command(subcommand)]
        action: DeviceAction,
    },

    /// Develop and deploy applets
    Applet {
        #[command(subcommand)]
        action: AppletAction,
    },

    /// Manage device firmware
    Firmware {
        #[command(subcommand)]
        action: FirmwareAction,
    },

    /// Manage plugins
    Plugin {
        #[command(subcommand)]
        action: ListAction,
    },

    /// Manage custom scripts
    #[command(name = "custom-script")]
    CustomScript {
        #[command(subcommand)]
        action: ListAction,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum OrganizationAction {
    /// List organizations
    List,
    /// Show an organization
    Get {
        uid: Option<String>,
        #[arg(short, long)]
        yes: bool,
    },
    /// Set the organization used when none is given
    SetDefault {
        uid: Option<String>,
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum DeviceAction {
    /// List devices of an organization
    List {
        #[arg(short, long)]
        organization: Option<String>,
        #[arg(short, long)]
        yes: bool,
    },
    /// Show a device
    Get { uid: String },
    /// Reload, restart or otherwise power-cycle a device
    PowerAction {
        uid: String,
        /// reload, refresh, disable, enable, restart or reboot
        action: Option<String>,
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum AppletAction {
    /// Generate a new applet project
    Generate {
        /// Applet name
        name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// Target directory (default: ./<name>)
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Write into a non-empty directory
        #[arg(short, long)]
        force: bool,
        #[arg(short, long)]
        yes: bool,
    },
    /// Upload the applet in the current directory
    Upload {
        /// Applet project directory
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Override the entry file from the applet config
        #[arg(short, long)]
        entry_file: Option<String>,
        /// Organization used when creating a new applet
        #[arg(short, long)]
        organization: Option<String>,
        /// Show what would change without uploading
        #[arg(long)]
        dry_run: bool,
        #[arg(short, long)]
        yes: bool,
    },
    /// List applets of an organization
    List {
        #[arg(short, long)]
        organization: Option<String>,
        #[arg(short, long)]
        yes: bool,
    },
    /// List versions of an applet
    Versions {
        /// Applet uid (default: from the applet config)
        uid: Option<String>,
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum FirmwareAction {
    /// Upload firmware files for a platform
    Upload {
        /// Device application type, e.g. tizen or android
        #[arg(short, long)]
        application_type: String,
        /// Firmware version
        #[arg(long)]
        version: String,
        /// Firmware files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ListAction {
    /// List all
    List,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Set the API server URL
    SetServer {
        /// Server URL (e.g., https://api.signage.example.com/v1)
        url: String,
    },
    /// Show current configuration
    Show,
    /// Reset to default configuration
    Reset {
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(if cli.verbose {
            "signage_cli=debug,signage_core=debug"
        } else {
            "signage_cli=info"
        })
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    info!("Starting Signage CLI");

    let result = match cli.command {
        Commands::Login {
            email,
            password,
            yes,
        } => commands::auth::login(email, password, yes).await,
        Commands::Logout => commands::auth::logout().await,
        Commands::Whoami => commands::auth::whoami().await,
        Commands::Organization { action } => match action {
            OrganizationAction::List => commands::organization::list().await,
            OrganizationAction::Get { uid, yes } => commands::organization::get(uid, yes).await,
            OrganizationAction::SetDefault { uid, yes } => {
                commands::organization::set_default(uid, yes).await
            }
        },
        Commands::Device { action } => match action {
            DeviceAction::List { organization, yes } => {
                commands::device::list(organization, yes).await
            }
            DeviceAction::Get { uid } => commands::device::get(&uid).await,
            DeviceAction::PowerAction { uid, action, yes } => {
                commands::device::power_action(&uid, action, yes).await
            }
        },
        Commands::Applet { action } => match action {
            AppletAction::Generate {
                name,
                description,
                dir,
                force,
                yes,
            } => {
                commands::applet::generate(commands::applet::GenerateOptions {
                    name,
                    description,
                    dir,
                    force,
                    yes,
                })
                .await
            }
            AppletAction::Upload {
                dir,
                entry_file,
                organization,
                dry_run,
                yes,
            } => {
                commands::applet::upload(commands::applet::UploadOptions {
                    dir,
                    entry_file,
                    organization,
                    dry_run,
                    yes,
                })
                .await
            }
            AppletAction::List { organization, yes } => {
                commands::applet::list(organization, yes).await
            }
            AppletAction::Versions { uid, dir } => commands::applet::versions(uid, dir).await,
        },
        Commands::Firmware { action } => match action {
            FirmwareAction::Upload {
                application_type,
                version,
                files,
            } => commands::firmware::upload(&application_type, &version, files).await,
        },
        Commands::Plugin {
            action: ListAction::List,
        } => commands::plugin::list().await,
        Commands::CustomScript {
            action: ListAction::List,
        } => commands::custom_script::list().await,
        Commands::Config { action } => match action {
            ConfigAction::SetServer { url } => commands::config::set_server(&url).await,
            ConfigAction::Show => commands::config::show().await,
            ConfigAction::Reset { yes } => commands::config::reset(yes).await,
        },
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            let name = command.get_name().to_string();
            clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(ref e) = result {
        error!("Command failed: {:#}", e);
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_applet_upload() {
        let cli = Cli::parse_from([
            "signage", "applet", "upload", "--dir", "site", "-e", "main.html", "--yes",
        ]);
        match cli.command {
            Commands::Applet {
                action:
                    AppletAction::Upload {
                        dir,
                        entry_file,
                        yes,
                        dry_run,
                        ..
                    },
            } => {
                assert_eq!(dir, Some(PathBuf::from("site")));
                assert_eq!(entry_file.as_deref(), Some("main.html"));
                assert!(yes);
                assert!(!dry_run);
            }
            _ => panic!("expected applet upload"),
        }
    }

    #[test]
    fn test_parse_firmware_upload_requires_files() {
        assert!(Cli::try_parse_from([
            "signage",
            "firmware",
            "upload",
            "-a",
            "tizen",
            "--version",
            "1.0.0"
        ])
        .is_err());
    }
}
