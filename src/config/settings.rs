// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Client configuration
//!
//! Handles loading the client configuration from ~/.wmclient/config.toml
//! (or a JSON file), with `WM_*` environment variables taking priority.

use serde::{Deserialize, Serialize};
use std::time::Duration;

mod io;
mod validation;

/// Connection and behaviour settings for a [`crate::WmClient`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// URL scheme; empty means http
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Server host; empty means localhost
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path prefix in front of the /v2 API, if the server sits behind a proxy
    #[serde(default)]
    pub base_path: String,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Header cache size; unset leaves caching disabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_size: Option<usize>,

    /// Capabilities to request, static and virtual mixed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Vec<String>>,

    /// Static capabilities to request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_capabilities: Option<Vec<String>>,

    /// Virtual capabilities to request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_capabilities: Option<Vec<String>>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            host: default_host(),
            port: default_port(),
            base_path: String::new(),
            timeout_ms: default_timeout_ms(),
            cache_size: None,
            capabilities: None,
            static_capabilities: None,
            virtual_capabilities: None,
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_scheme() -> String {
    "http".to_string()
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_ms() -> u64 {
    10_000
}
