// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Session-scoped result caches
//!
//! Two independent LRU stores, one keyed by header fingerprint and one by
//! device identifier, plus the lazily built catalogs. All of it sits behind
//! the session lock so lookups, stores and coherency sweeps never interleave.

pub mod lru;

use std::sync::Arc;

use serde::Serialize;

use crate::catalog::{DeviceMakesIndex, OsVersionsIndex};
use crate::coherency::LoadTimeMonitor;
use crate::model::DeviceResult;

pub use lru::LruCache;

/// Fixed size of the device identifier cache, whatever the configured size
pub const DEVICE_ID_CACHE_CAPACITY: usize = 20_000;

/// Which of the two lookup caches an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    /// User-agent and full-request lookups
    Headers,
    /// Device identifier lookups
    DeviceId,
}

/// Point-in-time cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub header_entries: usize,
    pub header_capacity: usize,
    pub device_id_entries: usize,
    pub device_id_capacity: usize,
    pub hits: u64,
    pub misses: u64,
    /// Sweeps triggered by a server data reload
    pub coherency_sweeps: u64,
}

type ResultLru = LruCache<String, Arc<DeviceResult>>;

#[derive(Debug, Default)]
pub(crate) struct SessionCache {
    headers: Option<ResultLru>,
    device_ids: Option<ResultLru>,
    device_makes: Option<Arc<DeviceMakesIndex>>,
    os_versions: Option<Arc<OsVersionsIndex>>,
    monitor: LoadTimeMonitor,
    /// Bumped on every sweep; lets in-flight requests detect that the cache
    /// they started against no longer exists.
    generation: u64,
    hits: u64,
    misses: u64,
    sweeps: u64,
}

impl SessionCache {
    /// Size the header cache to `size` entries. Zero disables both caches.
    pub fn resize(&mut self, size: usize) {
        if size == 0 {
            self.headers = None;
            self.device_ids = None;
        } else {
            self.headers = Some(LruCache::new(size));
            self.device_ids = Some(LruCache::new(DEVICE_ID_CACHE_CAPACITY));
        }
        self.generation += 1;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn store(&mut self, kind: CacheKind) -> Option<&mut ResultLru> {
        match kind {
            CacheKind::Headers => self.headers.as_mut(),
            CacheKind::DeviceId => self.device_ids.as_mut(),
        }
    }

    pub fn get(&mut self, kind: CacheKind, key: &str) -> Option<Arc<DeviceResult>> {
        let hit = self.store(kind)?.get(&key.to_string()).cloned();
        if hit.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        hit
    }

    pub fn put(&mut self, kind: CacheKind, key: String, device: Arc<DeviceResult>) {
        if let Some(store) = self.store(kind) {
            store.put(key, device);
        }
    }

    pub fn len(&self, kind: CacheKind) -> usize {
        let store = match kind {
            CacheKind::Headers => self.headers.as_ref(),
            CacheKind::DeviceId => self.device_ids.as_ref(),
        };
        store.map_or(0, LruCache::len)
    }

    /// Drop every cached result and both catalogs.
    pub fn clear(&mut self) {
        if let Some(store) = self.headers.as_mut() {
            store.clear();
        }
        if let Some(store) = self.device_ids.as_mut() {
            store.clear();
        }
        self.device_makes = None;
        self.os_versions = None;
        self.generation += 1;
    }

    /// Sweep everything if `observed` names a new server data generation.
    pub fn reconcile(&mut self, observed: Option<&str>) -> bool {
        let previous = self.monitor.current().map(str::to_string);
        if !self.monitor.observe(observed) {
            return false;
        }
        self.clear();
        if let Some(previous) = previous {
            self.sweeps += 1;
            tracing::info!(
                previous = %previous,
                current = ?self.monitor.current(),
                "server data reloaded, caches cleared"
            );
        }
        true
    }

    pub fn ltime(&self) -> Option<&str> {
        self.monitor.current()
    }

    pub fn device_makes(&self) -> Option<Arc<DeviceMakesIndex>> {
        self.device_makes.clone()
    }

    pub fn set_device_makes(&mut self, index: Arc<DeviceMakesIndex>) {
        self.device_makes = Some(index);
    }

    pub fn os_versions(&self) -> Option<Arc<OsVersionsIndex>> {
        self.os_versions.clone()
    }

    pub fn set_os_versions(&mut self, index: Arc<OsVersionsIndex>) {
        self.os_versions = Some(index);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            header_entries: self.len(CacheKind::Headers),
            header_capacity: self.headers.as_ref().map_or(0, LruCache::capacity),
            device_id_entries: self.len(CacheKind::DeviceId),
            device_id_capacity: self.device_ids.as_ref().map_or(0, LruCache::capacity),
            hits: self.hits,
            misses: self.misses,
            coherency_sweeps: self.sweeps,
        }
    }
}
