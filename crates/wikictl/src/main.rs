// SPDX-FileCopyrightText: 2026 wikictl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! wikictl - encrypted credentials for multiple Wiki.js instances.
//!
//! This is the binary entry point.

mod app;
mod doctor;
mod instances;
mod transfer;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use wikictl_core::WikictlError;
use wikictl_vault::MigrationDirection;

use crate::app::App;

/// Manage encrypted credentials for multiple Wiki.js instances.
#[derive(Parser, Debug)]
#[command(name = "wikictl", version, about, long_about = None)]
struct Cli {
    /// Configuration file to load instead of the standard search paths.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Credential store file, overriding `store.path`.
    #[arg(long, global = true, value_name = "FILE")]
    store: Option<PathBuf>,

    /// Prompt for the store password instead of reading WIKICTL_STORE_PASSWORD.
    #[arg(long, global = true)]
    ask_password: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Add, change, remove, and list stored instances.
    Instance {
        #[command(subcommand)]
        action: InstanceCommand,
    },
    /// Print the credential that would be used for an instance.
    Resolve {
        /// Instance id. Defaults to the configured default instance.
        id: Option<String>,
        /// Output JSON, including the API key.
        #[arg(long)]
        json: bool,
    },
    /// Copy legacy `<PREFIX>_API_URL` / `<PREFIX>_API_KEY` credentials into the store.
    Migrate {
        /// Replace instances that already exist in the store.
        #[arg(long)]
        overwrite: bool,
        /// Read the variables from a dotenv file instead of the environment.
        #[arg(long, value_name = "FILE")]
        from_file: Option<PathBuf>,
        /// Show what would happen without writing.
        #[arg(long)]
        dry_run: bool,
    },
    /// Write stored instances as environment variables (plaintext keys).
    Export {
        /// Write to FILE instead of stdout.
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Show what a migration would do.
    Preview {
        #[arg(value_enum)]
        direction: Direction,
        /// Preview with overwrite enabled.
        #[arg(long)]
        overwrite: bool,
    },
    /// Delete the credential store.
    Reset {
        /// Do not ask for confirmation.
        #[arg(long)]
        yes: bool,
    },
    /// Read or change the default UI theme.
    Theme {
        #[command(subcommand)]
        action: Option<ThemeCommand>,
    },
    /// Diagnose configuration and store problems.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[derive(Subcommand, Debug)]
pub(crate) enum InstanceCommand {
    /// Add an instance. Prompts for the API key when not given.
    Add {
        /// Instance id (letters, digits, `-`, `_`).
        #[arg(required_unless_present = "json")]
        id: Option<String>,
        /// Display name. Defaults to the id.
        #[arg(long)]
        name: Option<String>,
        /// Base URL of the wiki.
        #[arg(long, required_unless_present = "json")]
        url: Option<String>,
        /// API key. Prefer the prompt to keep it out of shell history.
        #[arg(long)]
        key: Option<String>,
        /// The whole instance as `{"id":..,"name":..,"url":..,"key":..}`.
        #[arg(long, conflicts_with_all = ["id", "name", "url", "key"])]
        json: Option<String>,
    },
    /// Change the name, URL, or key of an instance.
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long, conflicts_with = "prompt_key")]
        key: Option<String>,
        /// Prompt for a new API key.
        #[arg(long)]
        prompt_key: bool,
    },
    /// Remove an instance.
    Remove { id: String },
    /// List available instances. Never decrypts.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show one stored instance.
    Show {
        id: String,
        /// Print the API key in full.
        #[arg(long)]
        reveal: bool,
    },
}

#[derive(Subcommand, Debug)]
pub(crate) enum ThemeCommand {
    /// Print the default theme.
    Get,
    /// Set the default theme.
    Set { name: String },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Direction {
    /// Legacy environment into the store.
    ToEncrypted,
    /// Store out to environment variables.
    ToEnv,
}

impl From<Direction> for MigrationDirection {
    fn from(d: Direction) -> Self {
        match d {
            Direction::ToEncrypted => Self::ToEncrypted,
            Direction::ToEnv => Self::ToEnv,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => wikictl_config::load_and_validate_path(path),
        None => wikictl_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            wikictl_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.log.level);

    let config_files = match &cli.config {
        Some(path) => vec![path.clone()],
        None => wikictl_config::loader::config_search_paths()
            .into_iter()
            .filter(|p| p.is_file())
            .collect(),
    };
    let mut app = App::new(config, cli.store, cli.ask_password).with_config_files(config_files);
    if let Err(e) = dispatch(&mut app, cli.command) {
        let available = app.available_ids();
        exit_with_error(&e, &available);
    }
}

fn dispatch(app: &mut App, command: Commands) -> Result<(), WikictlError> {
    match command {
        Commands::Instance { action } => instances::run_instance(app, action),
        Commands::Resolve { id, json } => instances::run_resolve(app, id.as_deref(), json),
        Commands::Migrate {
            overwrite,
            from_file,
            dry_run,
        } => transfer::run_migrate(app, overwrite, from_file.as_deref(), dry_run),
        Commands::Export { output } => transfer::run_export(app, output.as_deref()),
        Commands::Preview {
            direction,
            overwrite,
        } => transfer::run_preview(app, direction.into(), overwrite),
        Commands::Reset { yes } => transfer::run_reset(app, yes),
        Commands::Theme { action } => instances::run_theme(app, action),
        Commands::Doctor { plain } => doctor::run_doctor(app, plain),
    }
}

/// Print a fatal error, plus the instances the user can pick from, and exit 1.
fn exit_with_error(err: &WikictlError, available: &[String]) -> ! {
    let use_color = std::io::stderr().is_terminal();
    if use_color {
        use colored::Colorize;
        eprintln!("{} {err}", "error:".red().bold());
    } else {
        eprintln!("error: {err}");
    }

    // UnknownInstance already lists them.
    if !matches!(err, WikictlError::UnknownInstance { .. }) && !available.is_empty() {
        eprintln!("available instances: {}", available.join(", "));
    }
    std::process::exit(1);
}

/// Initializes the tracing subscriber with the given log level.
///
/// Logs go to stderr so `export` output on stdout stays clean.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("wikictl={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
