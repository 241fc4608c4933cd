// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Data model for the detection server's JSON API
//!
//! Raw wire types mirror the server's field names and are private; the public
//! types are only produced through validating constructors so the rest of the
//! crate never sees a half-populated response.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, WmError};

/// Server and API information returned by `/v2/getinfo/json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerInfo {
    pub wurfl_api_version: String,
    pub wurfl_info: String,
    pub wm_version: String,
    /// Header names the server wants forwarded, in server order
    pub important_headers: Vec<String>,
    pub static_caps: Vec<String>,
    pub virtual_caps: Vec<String>,
    /// Data generation token of the server's device database
    pub ltime: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawInfo {
    #[serde(default)]
    wurfl_api_version: Option<String>,
    #[serde(default)]
    wurfl_info: Option<String>,
    #[serde(default)]
    wm_version: Option<String>,
    #[serde(default)]
    important_headers: Option<Vec<String>>,
    #[serde(default)]
    static_caps: Option<Vec<String>>,
    #[serde(default)]
    virtual_caps: Option<Vec<String>>,
    #[serde(default)]
    ltime: Option<String>,
}

impl ServerInfo {
    /// Parse and validate an info response.
    ///
    /// Version strings, the data file descriptor and the static capability
    /// list are required. A missing virtual capability list is tolerated.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let raw: RawInfo = serde_json::from_value(value)
            .map_err(|e| WmError::Protocol(format!("invalid server info: {}", e)))?;

        let wm_version = required("wm_version", raw.wm_version)?;
        let wurfl_api_version = required("wurfl_api_version", raw.wurfl_api_version)?;
        let wurfl_info = required("wurfl_info", raw.wurfl_info)?;

        let static_caps = raw.static_caps.unwrap_or_default();
        if static_caps.is_empty() {
            return Err(WmError::Protocol(
                "server returned an empty static capability list".to_string(),
            ));
        }

        let virtual_caps = raw.virtual_caps.unwrap_or_default();
        if virtual_caps.is_empty() {
            tracing::warn!("server info carries no virtual capabilities");
        }

        Ok(Self {
            wurfl_api_version,
            wurfl_info,
            wm_version,
            important_headers: raw.important_headers.unwrap_or_default(),
            static_caps,
            virtual_caps,
            ltime: raw.ltime.filter(|l| !l.is_empty()),
        })
    }
}

fn required(field: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(WmError::Protocol(format!(
            "server info is missing required field '{}'",
            field
        ))),
    }
}

/// Outcome of a detection call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceResult {
    /// Server API version tag
    pub api_version: String,
    /// Capability name to value; every value is a string on the wire
    pub capabilities: BTreeMap<String, String>,
    /// Server-side error message, if any
    pub error: Option<String>,
    /// Creation time of the result, epoch seconds
    pub mtime: i64,
    /// Server data generation active when the result was produced
    pub ltime: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDevice {
    #[serde(default, rename = "apiVersion")]
    api_version: Option<String>,
    #[serde(default)]
    capabilities: Option<BTreeMap<String, String>>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    mtime: i64,
    #[serde(default)]
    ltime: Option<String>,
}

impl DeviceResult {
    /// Parse a lookup response body.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let raw: RawDevice = serde_json::from_value(value)
            .map_err(|e| WmError::Protocol(format!("invalid device response: {}", e)))?;

        Ok(Self {
            api_version: raw.api_version.unwrap_or_default(),
            capabilities: raw.capabilities.unwrap_or_default(),
            error: raw.error.filter(|e| !e.is_empty()),
            mtime: raw.mtime,
            ltime: raw.ltime.filter(|l| !l.is_empty()),
        })
    }

    /// Value of a single capability
    pub fn capability(&self, name: &str) -> Option<&str> {
        self.capabilities.get(name).map(String::as_str)
    }

    /// The device identifier the server resolved this result to
    pub fn wurfl_id(&self) -> Option<&str> {
        self.capability("wurfl_id")
    }

    /// True when a boolean capability carries the literal string `"true"`
    pub fn is_true(&self, name: &str) -> bool {
        self.capability(name) == Some("true")
    }

    /// `mtime` as a UTC timestamp
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.mtime, 0).single()
    }
}

/// mtime is a number on current servers but older builds send a string.
fn lenient_i64<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrString {
        Num(i64),
        Float(f64),
        Str(String),
        Null(()),
    }

    Ok(match NumOrString::deserialize(deserializer)? {
        NumOrString::Num(n) => n,
        NumOrString::Float(f) => f as i64,
        NumOrString::Str(s) => s.trim().parse().unwrap_or(0),
        NumOrString::Null(()) => 0,
    })
}

/// Model and marketing name of a device belonging to one make
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelMarketingName {
    pub model_name: String,
    pub marketing_name: Option<String>,
}

/// Row of `/v2/alldevices/json`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DeviceIdentity {
    #[serde(default)]
    pub brand_name: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub marketing_name: Option<String>,
}

/// Row of `/v2/alldeviceosversions/json`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DeviceOsVersion {
    #[serde(default)]
    pub device_os: Option<String>,
    #[serde(default)]
    pub device_os_version: Option<String>,
}
