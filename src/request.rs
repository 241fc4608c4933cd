// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Lookup request construction and cache fingerprints

use reqwest::header::HeaderMap;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::error::{Result, WmError};
use crate::registry::CapabilityRegistry;
use crate::selection::{CapabilitySelection, RequestedCapabilities};

pub const USER_AGENT: &str = "User-Agent";

/// Anything that can answer "what is the value of header X"
///
/// Lookups are case-insensitive; callers pass the registry's spelling.
pub trait HeaderSource {
    fn header_value(&self, name: &str) -> Option<&str>;
}

impl HeaderSource for HeaderMap {
    /// Any UTF-8 value is accepted, not only visible ASCII.
    fn header_value(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(|v| std::str::from_utf8(v.as_bytes()).ok())
    }
}

impl HeaderSource for HashMap<String, String> {
    fn header_value(&self, name: &str) -> Option<&str> {
        find_ignore_case(name, |key| self.get(key), self.iter())
    }
}

impl HeaderSource for BTreeMap<String, String> {
    fn header_value(&self, name: &str) -> Option<&str> {
        find_ignore_case(name, |key| self.get(key), self.iter())
    }
}

/// Exact and lowercase keys are tried first, then a case-insensitive scan.
fn find_ignore_case<'a, G, I>(name: &str, get: G, entries: I) -> Option<&'a str>
where
    G: Fn(&str) -> Option<&'a String>,
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    get(name)
        .or_else(|| get(name.to_ascii_lowercase().as_str()))
        .or_else(|| {
            entries
                .into_iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v)
        })
        .map(String::as_str)
}

/// Header name/value pairs in important-header order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupHeaders(Vec<(String, String)>);

impl LookupHeaders {
    /// Copy the important headers out of `source`, skipping absent or empty ones.
    pub fn filtered<H: HeaderSource + ?Sized>(registry: &CapabilityRegistry, source: &H) -> Self {
        let pairs = registry
            .important_headers()
            .iter()
            .filter_map(|name| {
                source
                    .header_value(name)
                    .filter(|v| !v.is_empty())
                    .map(|v| (name.clone(), v.to_string()))
            })
            .collect();
        Self(pairs)
    }

    pub fn user_agent(user_agent: &str) -> Self {
        if user_agent.is_empty() {
            return Self::default();
        }
        Self(vec![(USER_AGENT.to_string(), user_agent.to_string())])
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Serialize for LookupHeaders {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// JSON body of the three lookup endpoints
#[derive(Debug, Clone, Serialize)]
pub struct LookupRequest {
    pub lookup_headers: LookupHeaders,
    pub requested_caps: CapabilitySelection,
    #[serde(rename = "requested_vCaps")]
    pub requested_vcaps: CapabilitySelection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wurfl_id: Option<String>,
}

impl LookupRequest {
    /// Full-request lookup restricted to the important headers.
    pub fn from_headers<H: HeaderSource + ?Sized>(
        registry: &CapabilityRegistry,
        requested: &RequestedCapabilities,
        headers: &H,
    ) -> Result<Self> {
        let lookup_headers = LookupHeaders::filtered(registry, headers);
        Self::with_headers(lookup_headers, requested)
    }

    /// Lookup of a bare user-agent string.
    pub fn from_user_agent(requested: &RequestedCapabilities, user_agent: &str) -> Result<Self> {
        Self::with_headers(LookupHeaders::user_agent(user_agent), requested)
    }

    /// Lookup by device identifier; carries no headers.
    pub fn from_device_id(requested: &RequestedCapabilities, wurfl_id: &str) -> Result<Self> {
        if wurfl_id.is_empty() {
            return Err(WmError::Validation("no device identifier provided".to_string()));
        }
        Ok(Self {
            lookup_headers: LookupHeaders::default(),
            requested_caps: requested.static_caps.clone(),
            requested_vcaps: requested.virtual_caps.clone(),
            wurfl_id: Some(wurfl_id.to_string()),
        })
    }

    fn with_headers(lookup_headers: LookupHeaders, requested: &RequestedCapabilities) -> Result<Self> {
        if lookup_headers.get(USER_AGENT).is_none() {
            return Err(WmError::Validation("No User-Agent header provided".to_string()));
        }
        Ok(Self {
            lookup_headers,
            requested_caps: requested.static_caps.clone(),
            requested_vcaps: requested.virtual_caps.clone(),
            wurfl_id: None,
        })
    }

    /// Cache key for header-based lookups.
    ///
    /// Values of the important headers concatenated in registry order, with
    /// no delimiter. Reordering the important headers changes every key.
    pub fn fingerprint(&self, registry: &CapabilityRegistry) -> String {
        let mut key = String::new();
        for name in registry.important_headers() {
            if let Some(value) = self.lookup_headers.get(name) {
                key.push_str(value);
            }
        }
        key
    }
}
