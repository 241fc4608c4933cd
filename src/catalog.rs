// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Aggregate device catalogs
//!
//! Grouping indexes built from the server's bulk enumeration endpoints.

use std::collections::BTreeMap;

use crate::model::{DeviceIdentity, DeviceOsVersion, ModelMarketingName};

/// Make (brand name) to the models the server knows for it
pub type DeviceMakesIndex = BTreeMap<String, Vec<ModelMarketingName>>;

/// OS name to the OS versions seen across all devices
pub type OsVersionsIndex = BTreeMap<String, Vec<String>>;

/// Rows without a brand name are skipped.
pub(crate) fn group_by_make(devices: Vec<DeviceIdentity>) -> DeviceMakesIndex {
    let mut index = DeviceMakesIndex::new();
    for device in devices {
        let Some(brand) = device.brand_name.filter(|b| !b.is_empty()) else {
            continue;
        };
        index.entry(brand).or_default().push(ModelMarketingName {
            model_name: device.model_name.unwrap_or_default(),
            marketing_name: device.marketing_name.filter(|m| !m.is_empty()),
        });
    }
    index
}

/// Rows without an OS are skipped; empty version placeholders are dropped.
pub(crate) fn group_by_os(rows: Vec<DeviceOsVersion>) -> OsVersionsIndex {
    let mut index = OsVersionsIndex::new();
    for row in rows {
        let Some(os) = row.device_os.filter(|o| !o.is_empty()) else {
            continue;
        };
        let versions = index.entry(os).or_default();
        if let Some(version) = row.device_os_version.filter(|v| !v.is_empty()) {
            versions.push(version);
        }
    }
    index
}
