// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! gatectl - access gate client for the command line
//!
//! Commands: status, login, logout
//! Exits non-zero unless the gate ends up open (or logout succeeded).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use url::Url;

use site_gate::{
    client::{FileTokenStore, GateClient, GateView, HttpTokenValidator},
    config::{
        Environment, LogFormat, API_BASE_URL_ENV, APP_ENV_ENV, DEFAULT_API_BASE_URL,
    },
    telemetry::init_tracing,
};

#[derive(Parser)]
#[command(name = "gatectl")]
#[command(about = "Check, unlock, or lock access to a gated site deployment")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the site API
    #[arg(long, env = API_BASE_URL_ENV, default_value = DEFAULT_API_BASE_URL)]
    api_base_url: Url,

    /// Deployment tier of the target site
    #[arg(long, env = APP_ENV_ENV, default_value = "production")]
    environment: Environment,

    /// Directory holding the persisted token
    #[arg(long, default_value = ".site-gate")]
    store_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Revalidate the persisted token, if any
    Status,

    /// Validate a token and persist it on success
    Login {
        /// Access token
        token: String,
    },

    /// Forget the persisted token
    Logout,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(LogFormat::Pretty);

    let validator = match HttpTokenValidator::new(&cli.api_base_url) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let store = FileTokenStore::new(&cli.store_dir);
    let mut gate = GateClient::new(cli.environment, store, validator);

    match cli.command {
        Commands::Status => {
            gate.initialize().await;
        }
        Commands::Login { token } => {
            gate.submit(&token).await;
        }
        Commands::Logout => {
            gate.logout();
            println!("Logged out.");
            return ExitCode::SUCCESS;
        }
    }

    print_view(&gate.view());
    if gate.is_authenticated() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_view(view: &GateView) {
    if view.show_content {
        println!("Access granted.");
        return;
    }
    if let Some(status) = view.status {
        println!("{status}");
    }
    match (&view.error, view.hint) {
        (Some(error), Some(hint)) => println!("Access denied: {error}\n{hint}"),
        (Some(error), None) => println!("Access denied: {error}"),
        _ => println!("Access token required. Run `gatectl login <TOKEN>`."),
    }
}
