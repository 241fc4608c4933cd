// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! wmclient - client library for the WURFL Microservice device detection server.
//!
//! This crate exposes the session used by:
//! - host applications detecting devices from HTTP requests
//! - the `wmclient` demo CLI (`src/main.rs`)
//!
//! Architecture highlights:
//! - `client`: session handshake, lookups, capability selection, catalogs
//! - `transport`: JSON over HTTP with a per-request timeout
//! - `request`: header filtering, lookup bodies and cache fingerprints
//! - `cache`: bounded LRU result caches and catalog memoization
//! - `coherency`: server data generation (ltime) tracking
//! - `config`: TOML/JSON client configuration with `WM_*` overrides

pub mod cache;
pub mod catalog;
pub mod cli;
pub mod client;
pub mod coherency;
pub mod config;
pub mod error;
pub mod model;
pub mod registry;
pub mod request;
pub mod selection;
pub mod transport;

pub use cache::CacheStats;
pub use client::{WmClient, CLIENT_API_VERSION};
pub use config::ClientConfig;
pub use error::{ErrorKind, Result, WmError};
pub use model::{DeviceResult, ModelMarketingName, ServerInfo};
pub use request::HeaderSource;
pub use selection::CapabilitySelection;
