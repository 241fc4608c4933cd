// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Cache coherency with server data reloads
//!
//! Every server response carries `ltime`, an opaque token naming the
//! generation of the server's device database. The client has no push
//! channel, so it compares the token on each response against the last one
//! seen and reports drift; the caller then sweeps every cache in the same
//! critical section.

/// Tracks the last observed server data generation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadTimeMonitor {
    ltime: Option<String>,
}

impl LoadTimeMonitor {
    /// Last observed token, `None` until the first response carrying one
    pub fn current(&self) -> Option<&str> {
        self.ltime.as_deref()
    }

    /// Record `observed` and return true when it differs from the stored token.
    ///
    /// Tokens compare by exact string equality; `None` is ignored.
    pub fn observe(&mut self, observed: Option<&str>) -> bool {
        let Some(observed) = observed else {
            return false;
        };
        if self.ltime.as_deref() == Some(observed) {
            return false;
        }
        self.ltime = Some(observed.to_string());
        true
    }
}
