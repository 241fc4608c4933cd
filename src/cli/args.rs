// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CLI argument definitions using Clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::ClientConfig;

/// wmclient - query a WURFL Microservice server from your terminal
#[derive(Parser, Debug)]
#[command(name = "wmclient")]
#[command(version, about = "Query a WURFL Microservice server")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path (defaults to ~/.wmclient/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// URL scheme
    #[arg(long, global = true)]
    pub scheme: Option<String>,

    /// Server host
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Server port
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Path prefix in front of the /v2 API
    #[arg(long, global = true)]
    pub base_path: Option<String>,

    /// Header cache size, 0 disables caching
    #[arg(long, global = true)]
    pub cache_size: Option<usize>,

    /// Capabilities to request, comma separated
    #[arg(long, global = true, value_delimiter = ',')]
    pub caps: Vec<String>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show server information and its capability registry
    Info,

    /// Detect a device from a user-agent string
    #[command(alias = "ua")]
    LookupUa {
        user_agent: String,
    },

    /// Fetch a device by its WURFL identifier
    #[command(alias = "id")]
    LookupId {
        wurfl_id: String,
    },

    /// Detect a device from request headers given as NAME=VALUE pairs
    LookupHeaders {
        #[arg(required = true)]
        headers: Vec<String>,
    },

    /// List every device make
    Makes,

    /// List the devices of one make
    Devices {
        make: String,
    },

    /// List every device OS
    Oses,

    /// List the versions of one OS
    Versions {
        os: String,
    },

    /// Look up every user agent in a file, one per line, and print a summary
    Bulk(BulkArgs),
}

/// Arguments for the bulk subcommand
#[derive(clap::Args, Debug)]
pub struct BulkArgs {
    /// File with one user agent per line
    pub file: PathBuf,

    /// Number of lookups in flight at once
    #[arg(short, long, default_value = "8")]
    pub concurrency: usize,
}

/// Output format for results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Text,

    /// JSON output
    Json,
}

impl Cli {
    /// Apply command-line overrides on top of a loaded configuration.
    pub fn apply_to(&self, config: &mut ClientConfig) {
        if let Some(scheme) = &self.scheme {
            config.scheme = scheme.clone();
        }
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(base_path) = &self.base_path {
            config.base_path = base_path.clone();
        }
        if let Some(size) = self.cache_size {
            config.cache_size = Some(size);
        }
        if !self.caps.is_empty() {
            config.capabilities = Some(self.caps.clone());
        }
    }
}

/// Split a `NAME=VALUE` argument into a header pair.
pub fn parse_header_arg(arg: &str) -> Option<(String, String)> {
    let (name, value) = arg.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}
