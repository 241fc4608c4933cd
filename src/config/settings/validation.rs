// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use crate::error::{Result, WmError};

use super::ClientConfig;

impl ClientConfig {
    /// Override file values with `WM_*` environment variables.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        // Priority: env var > config file.
        if let Ok(scheme) = std::env::var("WM_SCHEME") {
            self.scheme = scheme;
        }
        if let Ok(host) = std::env::var("WM_HOST") {
            self.host = host;
        }
        if let Ok(port) = std::env::var("WM_PORT") {
            self.port = parse_env("WM_PORT", &port)?;
        }
        if let Ok(base_path) = std::env::var("WM_BASE_PATH") {
            self.base_path = base_path;
        }
        if let Ok(timeout) = std::env::var("WM_TIMEOUT_MS") {
            self.timeout_ms = parse_env("WM_TIMEOUT_MS", &timeout)?;
        }
        if let Ok(size) = std::env::var("WM_CACHE_SIZE") {
            self.cache_size = Some(parse_env("WM_CACHE_SIZE", &size)?);
        }
        Ok(())
    }

    /// Reject values no client could work with.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(WmError::Config("timeout_ms must be greater than zero".to_string()));
        }
        if self.port == 0 {
            return Err(WmError::Config("port must be greater than zero".to_string()));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| WmError::Config(format!("{} has an invalid value: '{}'", name, value)))
}
