// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Capability registry
//!
//! The set of capability names and important headers a server exposes.
//! Built once from the server info at session creation and never mutated.

use crate::model::ServerInfo;

/// Static and virtual capability names plus the important header list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityRegistry {
    /// Sorted ascending
    static_caps: Vec<String>,
    /// Sorted ascending
    virtual_caps: Vec<String>,
    /// Server order; determines fingerprint construction
    important_headers: Vec<String>,
}

/// Which registry set a capability name belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityKind {
    Static,
    Virtual,
}

impl CapabilityRegistry {
    pub fn new(
        static_caps: Vec<String>,
        virtual_caps: Vec<String>,
        important_headers: Vec<String>,
    ) -> Self {
        Self {
            static_caps: sorted_unique(static_caps),
            virtual_caps: sorted_unique(virtual_caps),
            important_headers,
        }
    }

    pub fn from_info(info: &ServerInfo) -> Self {
        Self::new(
            info.static_caps.clone(),
            info.virtual_caps.clone(),
            info.important_headers.clone(),
        )
    }

    pub fn has_static(&self, name: &str) -> bool {
        self.static_caps
            .binary_search_by(|c| c.as_str().cmp(name))
            .is_ok()
    }

    pub fn has_virtual(&self, name: &str) -> bool {
        self.virtual_caps
            .binary_search_by(|c| c.as_str().cmp(name))
            .is_ok()
    }

    /// Classify a name; static wins if a server ever lists a name in both sets.
    pub fn classify(&self, name: &str) -> Option<CapabilityKind> {
        if self.has_static(name) {
            Some(CapabilityKind::Static)
        } else if self.has_virtual(name) {
            Some(CapabilityKind::Virtual)
        } else {
            None
        }
    }

    pub fn static_caps(&self) -> &[String] {
        &self.static_caps
    }

    pub fn virtual_caps(&self) -> &[String] {
        &self.virtual_caps
    }

    pub fn important_headers(&self) -> &[String] {
        &self.important_headers
    }
}

fn sorted_unique(mut names: Vec<String>) -> Vec<String> {
    names.sort();
    names.dedup();
    names
}
