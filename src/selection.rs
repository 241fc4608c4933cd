// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Capability selection
//!
//! Callers may restrict lookups to a subset of capabilities. Names are
//! validated against the [`CapabilityRegistry`]; unknown names are dropped
//! rather than reported.

use serde::ser::{Serialize, Serializer};

use crate::registry::{CapabilityKind, CapabilityRegistry};

/// Requested capability subset for one registry set
///
/// `Unset` and `Empty` both ask the server for every capability; they stay
/// distinct so the wire payload can tell "never configured" from "cleared".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CapabilitySelection {
    #[default]
    Unset,
    Empty,
    /// Non-empty, registry-validated names in caller order
    Named(Vec<String>),
}

impl CapabilitySelection {
    fn from_names(names: Vec<String>) -> Self {
        if names.is_empty() {
            CapabilitySelection::Empty
        } else {
            CapabilitySelection::Named(names)
        }
    }

    /// True when the server will return the full capability set
    pub fn is_all(&self) -> bool {
        !matches!(self, CapabilitySelection::Named(_))
    }

    /// Requested names, empty when all capabilities are requested
    pub fn names(&self) -> &[String] {
        match self {
            CapabilitySelection::Named(names) => names,
            _ => &[],
        }
    }
}

/// `Unset` goes out as `null`, `Empty` as `[]`.
impl Serialize for CapabilitySelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CapabilitySelection::Unset => serializer.serialize_none(),
            CapabilitySelection::Empty => Vec::<String>::new().serialize(serializer),
            CapabilitySelection::Named(names) => names.serialize(serializer),
        }
    }
}

/// Static and virtual selections applied to every lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestedCapabilities {
    pub static_caps: CapabilitySelection,
    pub virtual_caps: CapabilitySelection,
}

impl RequestedCapabilities {
    /// Partition mixed names into the static and virtual selections.
    /// `None` resets both to [`CapabilitySelection::Unset`].
    pub fn select<S: AsRef<str>>(&mut self, registry: &CapabilityRegistry, names: Option<&[S]>) {
        let Some(names) = names else {
            self.static_caps = CapabilitySelection::Unset;
            self.virtual_caps = CapabilitySelection::Unset;
            return;
        };

        let mut static_names = Vec::new();
        let mut virtual_names = Vec::new();
        for name in names {
            let name = name.as_ref();
            match registry.classify(name) {
                Some(CapabilityKind::Static) => push_unique(&mut static_names, name),
                Some(CapabilityKind::Virtual) => push_unique(&mut virtual_names, name),
                None => tracing::debug!(capability = name, "dropping unknown capability"),
            }
        }

        self.static_caps = CapabilitySelection::from_names(static_names);
        self.virtual_caps = CapabilitySelection::from_names(virtual_names);
    }

    /// Replace only the static selection.
    pub fn select_static<S: AsRef<str>>(&mut self, registry: &CapabilityRegistry, names: Option<&[S]>) {
        self.static_caps = filter_names(names, |n| registry.has_static(n));
    }

    /// Replace only the virtual selection.
    pub fn select_virtual<S: AsRef<str>>(&mut self, registry: &CapabilityRegistry, names: Option<&[S]>) {
        self.virtual_caps = filter_names(names, |n| registry.has_virtual(n));
    }
}

fn filter_names<S, F>(names: Option<&[S]>, known: F) -> CapabilitySelection
where
    S: AsRef<str>,
    F: Fn(&str) -> bool,
{
    let Some(names) = names else {
        return CapabilitySelection::Unset;
    };

    let mut kept = Vec::new();
    for name in names {
        let name = name.as_ref();
        if known(name) {
            push_unique(&mut kept, name);
        } else {
            tracing::debug!(capability = name, "dropping unknown capability");
        }
    }
    CapabilitySelection::from_names(kept)
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
}
