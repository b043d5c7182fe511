// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The client facade: real backend first, simulation as fallback.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info, warn};

use crate::client::backend::{BackendKind, UaBackend};
use crate::client::protocol::ProtocolBackend;
use crate::client::resolver::NodeResolver;
use crate::client::simulation::SimulationBackend;
use crate::client::stack::{DefaultStackConnector, StackConnector};
use crate::config::UaClientConfig;
use crate::error::{TimeoutError, UaError};
use crate::types::{BrowseEntry, ReadResult};

// =============================================================================
// ClientState
// =============================================================================

/// Connection state of a [`UaClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClientState {
    Disconnected,
    Connecting,
    Connected(BackendKind),
}

// =============================================================================
// ActiveBackend
// =============================================================================

/// The one backend a connected client owns.
enum ActiveBackend {
    Protocol(ProtocolBackend),
    Simulation(SimulationBackend),
}

impl ActiveBackend {
    fn get(&self) -> &dyn UaBackend {
        match self {
            Self::Protocol(b) => b,
            Self::Simulation(b) => b,
        }
    }

    fn get_mut(&mut self) -> &mut dyn UaBackend {
        match self {
            Self::Protocol(b) => b,
            Self::Simulation(b) => b,
        }
    }
}

// =============================================================================
// ClientStats
// =============================================================================

/// Operation counters for a [`UaClient`].
#[derive(Debug, Default)]
pub struct ClientStats {
    connects: AtomicU64,
    fallbacks: AtomicU64,
    browses: AtomicU64,
    reads: AtomicU64,
    failed_reads: AtomicU64,
    writes: AtomicU64,
    rejected_writes: AtomicU64,
}

impl ClientStats {
    /// Creates zeroed statistics.
    pub fn new() -> Self {
        Self::default()
    }

    fn record_connect(&self) {
        self.connects.fetch_add(1, Ordering::Relaxed);
    }

    fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    fn record_browse(&self) {
        self.browses.fetch_add(1, Ordering::Relaxed);
    }

    fn record_read(&self, failed: bool) {
        self.reads.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.failed_reads.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn record_write(&self, accepted: bool) {
        self.writes.fetch_add(1, Ordering::Relaxed);
        if !accepted {
            self.rejected_writes.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Returns the number of connect calls.
    pub fn connects(&self) -> u64 {
        self.connects.load(Ordering::Relaxed)
    }

    /// Returns how many connects fell back to simulation.
    pub fn fallbacks(&self) -> u64 {
        self.fallbacks.load(Ordering::Relaxed)
    }

    /// Returns the number of browse calls.
    pub fn browses(&self) -> u64 {
        self.browses.load(Ordering::Relaxed)
    }

    /// Returns the number of read calls.
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Returns the number of reads that produced the error sentinel.
    pub fn failed_reads(&self) -> u64 {
        self.failed_reads.load(Ordering::Relaxed)
    }

    /// Returns the number of write calls.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Returns the number of writes that returned `false`.
    pub fn rejected_writes(&self) -> u64 {
        self.rejected_writes.load(Ordering::Relaxed)
    }

    /// Resets all counters.
    pub fn reset(&self) {
        self.connects.store(0, Ordering::Relaxed);
        self.fallbacks.store(0, Ordering::Relaxed);
        self.browses.store(0, Ordering::Relaxed);
        self.reads.store(0, Ordering::Relaxed);
        self.failed_reads.store(0, Ordering::Relaxed);
        self.writes.store(0, Ordering::Relaxed);
        self.rejected_writes.store(0, Ordering::Relaxed);
    }
}

// =============================================================================
// UaClient
// =============================================================================

/// OPC UA client that always ends up connected.
///
/// `connect` tries the protocol stack first. When that fails or times out the
/// client switches to a [`SimulationBackend`], so callers can keep browsing,
/// reading and writing against a synthetic catalog.
///
/// # Examples
///
/// ```
/// use ualink::client::UaClient;
/// use ualink::config::UaClientConfig;
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let config = UaClientConfig::builder().simulation_seed(1).build().unwrap();
/// let mut client = UaClient::new(config);
///
/// assert!(client.connect("opc.tcp://localhost:4840").await);
/// let entries = client.browse_objects().await;
/// let node_id = client.resolve_by_label(&entries[0].label);
///
/// assert!(client.write_value(&node_id, "42.5").await);
/// assert_eq!(client.read_value(&node_id).await.value, "42.5");
/// client.disconnect().await;
/// # });
/// ```
pub struct UaClient {
    config: UaClientConfig,
    connector: Box<dyn StackConnector>,
    backend: Option<ActiveBackend>,
    state: ClientState,
    resolver: NodeResolver,
    stats: ClientStats,
}

impl UaClient {
    /// Creates a client using the stack compiled into this build.
    pub fn new(config: UaClientConfig) -> Self {
        Self::with_connector(config, DefaultStackConnector)
    }

    /// Creates a client with a custom stack connector.
    pub fn with_connector(config: UaClientConfig, connector: impl StackConnector + 'static) -> Self {
        Self {
            config,
            connector: Box::new(connector),
            backend: None,
            state: ClientState::Disconnected,
            resolver: NodeResolver::new(),
            stats: ClientStats::new(),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &UaClientConfig {
        &self.config
    }

    /// Returns the operation counters.
    pub fn stats(&self) -> &ClientStats {
        &self.stats
    }

    pub(crate) fn state(&self) -> ClientState {
        self.state
    }

    /// Connects to `url`, falling back to simulation on failure.
    ///
    /// Any active session is closed first.
    pub async fn connect(&mut self, url: &str) -> bool {
        if self.backend.is_some() {
            self.disconnect().await;
        }

        self.state = ClientState::Connecting;
        self.stats.record_connect();

        if let Some(backend) = self.try_protocol(url).await {
            self.backend = Some(ActiveBackend::Protocol(backend));
            self.state = ClientState::Connected(BackendKind::Protocol);
            info!(endpoint = %url, "Connected");
            return true;
        }

        warn!(endpoint = %url, "Real connection unavailable, falling back to simulation");
        self.stats.record_fallback();

        let mut simulation = SimulationBackend::new(self.config.simulation.clone());
        let connected = simulation.connect(url).await;
        self.backend = Some(ActiveBackend::Simulation(simulation));
        self.state = if connected {
            ClientState::Connected(BackendKind::Simulation)
        } else {
            ClientState::Disconnected
        };
        connected
    }

    /// Connects to the configured endpoint.
    pub async fn connect_configured(&mut self) -> bool {
        let endpoint = self.config.endpoint.clone();
        self.connect(&endpoint).await
    }

    async fn try_protocol(&mut self, url: &str) -> Option<ProtocolBackend> {
        let stack = match self.connector.create(&self.config) {
            Ok(stack) => stack,
            Err(e) => {
                e.log("stack creation");
                return None;
            }
        };

        let mut backend = ProtocolBackend::new(stack, self.config.browse_mode);
        let timeout = self.config.connect_timeout;

        match tokio::time::timeout(timeout, backend.connect(url)).await {
            Ok(true) => Some(backend),
            Ok(false) => None,
            Err(_) => {
                UaError::timeout(TimeoutError::connection(url, timeout)).log("protocol connect");
                None
            }
        }
    }

    /// Closes the session and clears the label cache. No-op when disconnected.
    pub async fn disconnect(&mut self) {
        if let Some(mut backend) = self.backend.take() {
            let kind = backend.get().kind();
            backend.get_mut().disconnect().await;
            info!(backend = %kind, "Disconnected");
        }
        self.resolver.clear();
        self.state = ClientState::Disconnected;
    }

    /// Returns `true` while the active backend has a session.
    pub fn is_connected(&self) -> bool {
        self.backend
            .as_ref()
            .map(|b| b.get().is_connected())
            .unwrap_or(false)
    }

    /// Lists variables under the Objects folder and refreshes the label cache.
    pub async fn browse_objects(&mut self) -> Vec<BrowseEntry> {
        let Some(backend) = self.backend.as_mut() else {
            return Vec::new();
        };

        self.stats.record_browse();
        let entries = backend.get_mut().browse_objects().await;
        self.resolver.replace(entries.clone());
        debug!(entries = entries.len(), "Label cache refreshed");
        entries
    }

    /// Resolves a display label to a node id. Empty when unresolvable.
    ///
    /// Exact labels from the latest browse are tried first, then the
    /// composite form `<label> | <node_id> = <value>`.
    pub fn resolve_by_label(&self, label: &str) -> String {
        self.resolver.resolve(label).unwrap_or_default()
    }

    /// Reads a node value. The error sentinel when not connected.
    pub async fn read_value(&mut self, node_id: &str) -> ReadResult {
        let result = match self.backend.as_mut() {
            Some(backend) => backend.get_mut().read_value(node_id).await,
            None => ReadResult::error(),
        };
        self.stats.record_read(result.is_error());
        result
    }

    /// Writes caller text to a node. `false` when not connected.
    pub async fn write_value(&mut self, node_id: &str, value: &str) -> bool {
        let accepted = match self.backend.as_mut() {
            Some(backend) => backend.get_mut().write_value(node_id, value).await,
            None => false,
        };
        self.stats.record_write(accepted);
        accepted
    }
}

impl Default for UaClient {
    fn default() -> Self {
        Self::new(UaClientConfig::default())
    }
}

impl fmt::Debug for UaClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UaClient")
            .field("endpoint", &self.config.endpoint)
            .field("state", &self.state)
            .field("cached_labels", &self.resolver.len())
            .field("stats", &self.stats)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
