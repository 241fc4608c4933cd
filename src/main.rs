// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! wmclient - WURFL Microservice client
//!
//! Entry point for the wmclient demo CLI.

use clap::Parser;

use wmclient::cli::{Cli, Commands};
use wmclient::config::ClientConfig;
use wmclient::WmClient;

#[path = "main/commands.rs"]
mod commands;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    // `-v` turns on client diagnostics; `RUST_LOG` still takes precedence.
    if cli.verbose > 0 {
        let directive = if cli.verbose > 1 {
            "wmclient=trace"
        } else {
            "wmclient=debug"
        };
        if let Ok(parsed) = directive.parse() {
            env_filter = env_filter.add_directive(parsed);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => {
            let mut config = ClientConfig::load_from(path)?;
            config.apply_env_overrides()?;
            config
        }
        None => ClientConfig::load()?,
    };
    cli.apply_to(&mut config);

    let client = WmClient::from_config(&config).await?;
    let format = cli.format;

    match cli.command {
        Commands::Info => commands::run_info(&client, format).await?,
        Commands::LookupUa { user_agent } => {
            commands::run_lookup_ua(&client, &user_agent, format).await?
        }
        Commands::LookupId { wurfl_id } => {
            commands::run_lookup_id(&client, &wurfl_id, format).await?
        }
        Commands::LookupHeaders { headers } => {
            commands::run_lookup_headers(&client, &headers, format).await?
        }
        Commands::Makes => commands::run_makes(&client, format).await?,
        Commands::Devices { make } => commands::run_devices(&client, &make, format).await?,
        Commands::Oses => commands::run_oses(&client, format).await?,
        Commands::Versions { os } => commands::run_versions(&client, &os, format).await?,
        Commands::Bulk(args) => commands::run_bulk(&client, &args, format).await?,
    }

    Ok(())
}
