// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Concierge - request desk for player services.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod admin;
mod serve;
mod shutdown;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use concierge_config::ConciergeConfig;
use concierge_core::Role;

/// Concierge - request desk for player services.
#[derive(Parser, Debug)]
#[command(name = "concierge", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP/WebSocket gateway.
    Serve,
    /// Manage user roles.
    Roles {
        #[command(subcommand)]
        action: RolesAction,
    },
    /// Inspect configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum RolesAction {
    /// Grant a role to a user.
    Grant { user_id: String, role: Role },
    /// Revoke a role from a user.
    Revoke { user_id: String, role: Role },
    /// List role assignments.
    List {
        #[arg(long)]
        role: Option<Role>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Validate configuration and exit.
    Check,
    /// Print the effective configuration as TOML.
    Show,
}

fn load_config(path: Option<&PathBuf>) -> Option<ConciergeConfig> {
    let loaded = match path {
        Some(path) => concierge_config::load_and_validate_path(path),
        None => concierge_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => Some(config),
        Err(errors) => {
            concierge_config::render_errors(&errors);
            None
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(config) = load_config(cli.config.as_ref()) else {
        return ExitCode::FAILURE;
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Roles { action }) => match action {
            RolesAction::Grant { user_id, role } => admin::grant(&config, &user_id, role).await,
            RolesAction::Revoke { user_id, role } => admin::revoke(&config, &user_id, role).await,
            RolesAction::List { role } => admin::list(&config, role).await,
        },
        Some(Commands::Config { action }) => match action {
            ConfigAction::Check => {
                println!(
                    "concierge: config OK (app.name={}, storage.database_path={})",
                    config.app.name, config.storage.database_path
                );
                Ok(())
            }
            ConfigAction::Show => admin::show_config(&config),
        },
        None => {
            println!("concierge: use --help for available commands");
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
