// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Detection client session
//!
//! A [`WmClient`] is created with a server handshake, then answers lookups
//! from its caches or the server. Every method takes `&self`; the client can
//! be shared across tasks behind an `Arc`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Mutex as AsyncMutex;

use crate::cache::{CacheKind, CacheStats, SessionCache};
use crate::catalog::{self, DeviceMakesIndex, OsVersionsIndex};
use crate::config::ClientConfig;
use crate::error::{Result, WmError};
use crate::model::{DeviceIdentity, DeviceOsVersion, DeviceResult, ModelMarketingName, ServerInfo};
use crate::registry::CapabilityRegistry;
use crate::request::{HeaderSource, LookupRequest};
use crate::selection::{CapabilitySelection, RequestedCapabilities};
use crate::transport::{
    Endpoint, HttpTransport, ALL_DEVICES_PATH, ALL_OS_VERSIONS_PATH, DEFAULT_TIMEOUT, INFO_PATH,
    LOOKUP_DEVICE_ID_PATH, LOOKUP_REQUEST_PATH, LOOKUP_USER_AGENT_PATH,
};

/// Version of the client API implemented by this crate
pub const CLIENT_API_VERSION: &str = "2.2.0";

/// Mutable session state guarded by one lock
#[derive(Debug, Default)]
struct SessionState {
    requested: RequestedCapabilities,
    cache: SessionCache,
}

/// Client session bound to one detection server
pub struct WmClient {
    transport: HttpTransport,
    registry: CapabilityRegistry,
    info: ServerInfo,
    state: Mutex<SessionState>,
    /// Serialize first-time catalog construction
    makes_fetch: AsyncMutex<()>,
    os_fetch: AsyncMutex<()>,
}

impl WmClient {
    /// Connect to a server and load its capability registry.
    ///
    /// Fails with a connection error when the server cannot be reached and a
    /// protocol error when its info response is incomplete.
    pub async fn create(scheme: &str, host: &str, port: u16, base_path: &str) -> Result<Self> {
        let endpoint = Endpoint::new(scheme, host, port, base_path);
        let transport = HttpTransport::new(endpoint, DEFAULT_TIMEOUT)?;
        Self::handshake(transport).await
    }

    /// Create a session from configuration and apply its timeout, cache size
    /// and capability selection.
    pub async fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let endpoint = Endpoint::new(&config.scheme, &config.host, config.port, &config.base_path);
        let transport = HttpTransport::new(endpoint, config.timeout())?;
        let client = Self::handshake(transport).await?;

        if let Some(size) = config.cache_size {
            client.set_cache_size(size);
        }
        if let Some(caps) = &config.capabilities {
            client.set_requested_capabilities(Some(caps.as_slice()));
        }
        if let Some(caps) = &config.static_capabilities {
            client.set_requested_static_capabilities(Some(caps.as_slice()));
        }
        if let Some(caps) = &config.virtual_capabilities {
            client.set_requested_virtual_capabilities(Some(caps.as_slice()));
        }
        Ok(client)
    }

    async fn handshake(transport: HttpTransport) -> Result<Self> {
        let info = ServerInfo::from_json(transport.get_json(INFO_PATH).await?)?;
        let registry = CapabilityRegistry::from_info(&info);

        let mut state = SessionState::default();
        state.cache.reconcile(info.ltime.as_deref());

        tracing::info!(
            url = %transport.endpoint().url(""),
            wm_version = %info.wm_version,
            static_caps = registry.static_caps().len(),
            virtual_caps = registry.virtual_caps().len(),
            "connected to detection server"
        );

        Ok(Self {
            transport,
            registry,
            info,
            state: Mutex::new(state),
            makes_fetch: AsyncMutex::new(()),
            os_fetch: AsyncMutex::new(()),
        })
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ==================== Server info and registry ====================

    /// Fetch fresh server information; a changed data generation sweeps the caches.
    pub async fn get_info(&self) -> Result<ServerInfo> {
        let info = ServerInfo::from_json(self.transport.get_json(INFO_PATH).await?)?;
        self.lock_state().cache.reconcile(info.ltime.as_deref());
        Ok(info)
    }

    /// Server information captured at session creation
    pub fn server_info(&self) -> &ServerInfo {
        &self.info
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn static_capabilities(&self) -> &[String] {
        self.registry.static_caps()
    }

    pub fn virtual_capabilities(&self) -> &[String] {
        self.registry.virtual_caps()
    }

    pub fn important_headers(&self) -> &[String] {
        self.registry.important_headers()
    }

    pub fn has_static_capability(&self, name: &str) -> bool {
        self.registry.has_static(name)
    }

    pub fn has_virtual_capability(&self, name: &str) -> bool {
        self.registry.has_virtual(name)
    }

    pub fn api_version(&self) -> &'static str {
        CLIENT_API_VERSION
    }

    // ==================== Capability selection ====================

    /// Request a mix of static and virtual capabilities; `None` requests all.
    ///
    /// Unknown names are dropped. Any selection change clears the caches,
    /// since cached results were filtered under the previous selection.
    pub fn set_requested_capabilities<S: AsRef<str>>(&self, names: Option<&[S]>) {
        let mut state = self.lock_state();
        state.requested.select(&self.registry, names);
        state.cache.clear();
    }

    pub fn set_requested_static_capabilities<S: AsRef<str>>(&self, names: Option<&[S]>) {
        let mut state = self.lock_state();
        state.requested.select_static(&self.registry, names);
        state.cache.clear();
    }

    pub fn set_requested_virtual_capabilities<S: AsRef<str>>(&self, names: Option<&[S]>) {
        let mut state = self.lock_state();
        state.requested.select_virtual(&self.registry, names);
        state.cache.clear();
    }

    pub fn requested_static_capabilities(&self) -> CapabilitySelection {
        self.lock_state().requested.static_caps.clone()
    }

    pub fn requested_virtual_capabilities(&self) -> CapabilitySelection {
        self.lock_state().requested.virtual_caps.clone()
    }

    // ==================== Cache and transport settings ====================

    /// Enable caching with room for `size` header lookups. The device
    /// identifier cache gets a fixed size. Zero disables caching.
    pub fn set_cache_size(&self, size: usize) {
        self.lock_state().cache.resize(size);
    }

    pub fn clear_caches(&self) {
        self.lock_state().cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.lock_state().cache.stats()
    }

    /// Last server data generation seen by this session
    pub fn load_time(&self) -> Option<String> {
        self.lock_state().cache.ltime().map(str::to_string)
    }

    /// Compare `observed` with the last seen data generation and sweep every
    /// cache if it changed. Returns true when a sweep happened.
    pub fn reconcile_load_time(&self, observed: Option<&str>) -> bool {
        self.lock_state().cache.reconcile(observed)
    }

    pub fn set_http_timeout(&self, timeout: Duration) -> Result<()> {
        if timeout.is_zero() {
            return Err(WmError::Validation("HTTP timeout must be greater than zero".to_string()));
        }
        self.transport.set_timeout(timeout);
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        self.transport.timeout()
    }

    /// Number of capabilities in a result, zero for `None`
    pub fn capability_count(device: Option<&DeviceResult>) -> usize {
        device.map_or(0, |d| d.capabilities.len())
    }

    // ==================== Lookups ====================

    /// Detect a device from a bare user-agent string.
    pub async fn lookup_user_agent(&self, user_agent: &str) -> Result<Arc<DeviceResult>> {
        self.lookup(LOOKUP_USER_AGENT_PATH, CacheKind::Headers, |requested| {
            LookupRequest::from_user_agent(requested, user_agent)
        })
        .await
    }

    /// Detect a device from a full set of request headers.
    pub async fn lookup_request<H: HeaderSource + ?Sized>(
        &self,
        headers: &H,
    ) -> Result<Arc<DeviceResult>> {
        let registry = &self.registry;
        self.lookup(LOOKUP_REQUEST_PATH, CacheKind::Headers, |requested| {
            LookupRequest::from_headers(registry, requested, headers)
        })
        .await
    }

    /// Fetch a device by its identifier.
    ///
    /// Unknown identifiers (an `error` in the response body, or HTTP 404) fail
    /// with [`WmError::NotFound`]. Other HTTP failures stay server errors.
    pub async fn lookup_device_id(&self, wurfl_id: &str) -> Result<Arc<DeviceResult>> {
        self.lookup(LOOKUP_DEVICE_ID_PATH, CacheKind::DeviceId, |requested| {
            LookupRequest::from_device_id(requested, wurfl_id)
        })
        .await
        .map_err(|e| match e {
            WmError::Server(message) | WmError::Http { status: 404, message, .. } => {
                WmError::NotFound(format!("device '{}': {}", wurfl_id, message))
            }
            other => other,
        })
    }

    async fn lookup<F>(&self, path: &str, kind: CacheKind, build: F) -> Result<Arc<DeviceResult>>
    where
        F: FnOnce(&RequestedCapabilities) -> Result<LookupRequest>,
    {
        // Build against the current selection and probe the cache atomically.
        let (request, key, generation) = {
            let mut state = self.lock_state();
            let request = build(&state.requested)?;
            let key = match kind {
                CacheKind::Headers => request.fingerprint(&self.registry),
                CacheKind::DeviceId => request.wurfl_id.clone().unwrap_or_default(),
            };
            if let Some(hit) = state.cache.get(kind, &key) {
                tracing::debug!(?kind, "cache hit");
                return Ok(hit);
            }
            (request, key, state.cache.generation())
        };

        let body = self.transport.post_json(path, &request).await?;
        let device = DeviceResult::from_json(body)?;

        let mut state = self.lock_state();
        let stale = state.cache.generation() != generation;
        state.cache.reconcile(device.ltime.as_deref());

        if let Some(error) = &device.error {
            tracing::warn!(%path, %error, "server reported a lookup error");
            return Err(WmError::Server(error.clone()));
        }

        let device = Arc::new(device);
        if stale {
            tracing::debug!(?kind, "cache changed during lookup, result not stored");
            return Ok(device);
        }

        let store_key = match kind {
            CacheKind::Headers => key,
            // Generic fallbacks are stored under the identifier the server resolved.
            CacheKind::DeviceId => device.wurfl_id().map(str::to_string).unwrap_or(key),
        };
        if !store_key.is_empty() {
            state.cache.put(kind, store_key, Arc::clone(&device));
        }
        Ok(device)
    }

    // ==================== Catalogs ====================

    /// Every device make (brand name) known to the server
    pub async fn get_all_device_makes(&self) -> Result<Vec<String>> {
        Ok(self.device_makes().await?.keys().cloned().collect())
    }

    /// Model and marketing names of every device of `make`
    pub async fn get_all_devices_for_make(&self, make: &str) -> Result<Vec<ModelMarketingName>> {
        self.device_makes()
            .await?
            .get(make)
            .cloned()
            .ok_or_else(|| WmError::NotFound(format!("make '{}' does not exist", make)))
    }

    /// Copy of the whole make index
    pub async fn get_device_makes_map(&self) -> Result<DeviceMakesIndex> {
        Ok(self.device_makes().await?.as_ref().clone())
    }

    /// Every device OS known to the server
    pub async fn get_all_oses(&self) -> Result<Vec<String>> {
        Ok(self.os_versions().await?.keys().cloned().collect())
    }

    /// Every version seen for `os`, without empty placeholders
    pub async fn get_all_versions_for_os(&self, os: &str) -> Result<Vec<String>> {
        self.os_versions()
            .await?
            .get(os)
            .cloned()
            .ok_or_else(|| WmError::NotFound(format!("OS '{}' does not exist", os)))
    }

    async fn device_makes(&self) -> Result<Arc<DeviceMakesIndex>> {
        let cached = self.lock_state().cache.device_makes();
        if let Some(index) = cached {
            return Ok(index);
        }

        let _guard = self.makes_fetch.lock().await;
        let generation = {
            let state = self.lock_state();
            if let Some(index) = state.cache.device_makes() {
                return Ok(index);
            }
            state.cache.generation()
        };

        let rows: Vec<DeviceIdentity> =
            serde_json::from_value(self.transport.get_json(ALL_DEVICES_PATH).await?)
                .map_err(|e| WmError::Protocol(format!("invalid device catalog: {}", e)))?;
        let index = Arc::new(catalog::group_by_make(rows));
        tracing::debug!(makes = index.len(), "device make index built");

        let mut state = self.lock_state();
        if state.cache.generation() == generation {
            state.cache.set_device_makes(Arc::clone(&index));
        }
        Ok(index)
    }

    async fn os_versions(&self) -> Result<Arc<OsVersionsIndex>> {
        let cached = self.lock_state().cache.os_versions();
        if let Some(index) = cached {
            return Ok(index);
        }

        let _guard = self.os_fetch.lock().await;
        let generation = {
            let state = self.lock_state();
            if let Some(index) = state.cache.os_versions() {
                return Ok(index);
            }
            state.cache.generation()
        };

        let rows: Vec<DeviceOsVersion> =
            serde_json::from_value(self.transport.get_json(ALL_OS_VERSIONS_PATH).await?)
                .map_err(|e| WmError::Protocol(format!("invalid OS catalog: {}", e)))?;
        let index = Arc::new(catalog::group_by_os(rows));
        tracing::debug!(oses = index.len(), "OS version index built");

        let mut state = self.lock_state();
        if state.cache.generation() == generation {
            state.cache.set_os_versions(Arc::clone(&index));
        }
        Ok(index)
    }
}

impl std::fmt::Debug for WmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WmClient")
            .field("endpoint", self.transport.endpoint())
            .field("wm_version", &self.info.wm_version)
            .field("static_caps", &self.registry.static_caps().len())
            .field("virtual_caps", &self.registry.virtual_caps().len())
            .finish()
    }
}
