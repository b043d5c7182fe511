// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory backend with a fabricated variable catalog.
//!
//! Used when no real server is reachable. Every operation succeeds. Values
//! come from a seedable RNG so tests can pin them.

use std::collections::HashMap;

use async_trait::async_trait;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};

use crate::client::backend::{BackendKind, UaBackend};
use crate::config::SimulationSettings;
use crate::types::{BrowseEntry, NodeId, ReadResult, TypeTag};

/// Number of simulated devices the catalog cycles through.
const DEVICE_COUNT: usize = 3;

// =============================================================================
// SimulationBackend
// =============================================================================

/// Backend that serves a fixed catalog from an in-memory store.
///
/// Entry `k` of the catalog is `ns=<ns>;s=Device<k % 3 + 1>.Var<k + 1>` with
/// label `Device<k % 3 + 1> / Var<k + 1>`.
///
/// # Examples
///
/// ```
/// use ualink::client::{SimulationBackend, UaBackend};
/// use ualink::config::SimulationSettings;
///
/// # tokio_test_block_on(async {
/// let mut sim = SimulationBackend::new(SimulationSettings::seeded(1));
/// assert!(sim.connect("opc.tcp://anywhere:4840").await);
/// let entries = sim.browse_objects().await;
/// assert_eq!(entries[0].node_id, "ns=2;s=Device1.Var1");
/// assert_eq!(entries[1].label, "Device2 / Var2");
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
pub struct SimulationBackend {
    settings: SimulationSettings,
    rng: ChaCha8Rng,
    catalog: Vec<BrowseEntry>,
    store: HashMap<String, String>,
    connected: bool,
}

impl SimulationBackend {
    /// Creates a disconnected simulation. The catalog is built on connect.
    ///
    /// Out-of-range settings are corrected with
    /// [`SimulationSettings::normalized`], so `connect` always yields a
    /// non-empty catalog.
    pub fn new(settings: SimulationSettings) -> Self {
        let settings = settings.normalized();
        let rng = match settings.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(u64::from_ne_bytes(seed.to_ne_bytes())),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            settings,
            rng,
            catalog: Vec::new(),
            store: HashMap::new(),
            connected: false,
        }
    }

    /// Returns the catalog entry at `index`.
    pub fn catalog_entry(namespace_index: u16, index: usize) -> BrowseEntry {
        let device = index % DEVICE_COUNT + 1;
        let var = index + 1;
        let node_id = NodeId::string(namespace_index, format!("Device{}.Var{}", device, var));
        BrowseEntry::new(node_id.to_string(), format!("Device{} / Var{}", device, var))
    }

    fn random_value(&mut self) -> String {
        let (min, max) = (self.settings.value_min, self.settings.value_max);
        self.rng.gen_range(min..=max).to_string()
    }

    fn build_catalog(&mut self) {
        let ns = self.settings.namespace_index;
        self.catalog = (0..self.settings.catalog_size)
            .map(|k| Self::catalog_entry(ns, k))
            .collect();

        for index in 0..self.catalog.len() {
            if !self.store.contains_key(&self.catalog[index].node_id) {
                let value = self.random_value();
                self.store.insert(self.catalog[index].node_id.clone(), value);
            }
        }
    }
}

impl std::fmt::Debug for SimulationBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationBackend")
            .field("settings", &self.settings)
            .field("catalog", &self.catalog.len())
            .field("stored", &self.store.len())
            .field("connected", &self.connected)
            .finish()
    }
}

#[async_trait]
impl UaBackend for SimulationBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Simulation
    }

    async fn connect(&mut self, url: &str) -> bool {
        self.build_catalog();
        self.connected = true;
        info!(
            endpoint = %url,
            variables = self.catalog.len(),
            "Simulation backend connected"
        );
        true
    }

    async fn disconnect(&mut self) {
        if self.connected {
            self.connected = false;
            debug!("Simulation backend disconnected");
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn browse_objects(&mut self) -> Vec<BrowseEntry> {
        if !self.connected {
            return Vec::new();
        }
        self.catalog.clone()
    }

    async fn read_value(&mut self, node_id: &str) -> ReadResult {
        let value = match self.store.get(node_id) {
            Some(value) => value.clone(),
            None => {
                let value = self.random_value();
                trace!(node_id, value = %value, "Generated value for unknown node");
                self.store.insert(node_id.to_string(), value.clone());
                value
            }
        };
        ReadResult::new(value, TypeTag::String)
    }

    async fn write_value(&mut self, node_id: &str, value: &str) -> bool {
        trace!(node_id, value, "Simulated write");
        self.store.insert(node_id.to_string(), value.to_string());
        true
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_entry_shape() {
        let first = SimulationBackend::catalog_entry(2, 0);
        assert_eq!(first.node_id, "ns=2;s=Device1.Var1");
        assert_eq!(first.label, "Device1 / Var1");

        let fifth = SimulationBackend::catalog_entry(4, 4);
        assert_eq!(fifth.node_id, "ns=4;s=Device2.Var5");
        assert_eq!(fifth.label, "Device2 / Var5");
    }

    #[tokio::test]
    async fn test_browse_requires_connection() {
        let mut sim = SimulationBackend::new(SimulationSettings::seeded(3));
        assert!(sim.browse_objects().await.is_empty());

        assert!(sim.connect("opc.tcp://sim").await);
        let entries = sim.browse_objects().await;
        assert_eq!(entries.len(), 10);
        assert_eq!(entries, sim.browse_objects().await);

        sim.disconnect().await;
        assert!(sim.browse_objects().await.is_empty());
    }

    #[tokio::test]
    async fn test_initial_values_in_range() {
        let settings = SimulationSettings {
            value_min: 5,
            value_max: 7,
            seed: Some(11),
            ..Default::default()
        };
        let mut sim = SimulationBackend::new(settings);
        sim.connect("opc.tcp://sim").await;

        for entry in sim.browse_objects().await {
            let result = sim.read_value(&entry.node_id).await;
            assert_eq!(result.type_tag, TypeTag::String);
            let n: i64 = result.value.parse().unwrap();
            assert!((5..=7).contains(&n));
        }
    }

    #[tokio::test]
    async fn test_empty_catalog_size_still_browses() {
        let settings = SimulationSettings {
            catalog_size: 0,
            seed: Some(4),
            ..Default::default()
        };
        let mut sim = SimulationBackend::new(settings);
        assert!(sim.connect("opc.tcp://sim").await);

        let entries = sim.browse_objects().await;
        assert_eq!(entries, vec![SimulationBackend::catalog_entry(2, 0)]);
    }

    #[tokio::test]
    async fn test_inverted_value_range_is_swapped() {
        let settings = SimulationSettings {
            value_min: 10,
            value_max: 1,
            seed: Some(4),
            ..Default::default()
        };
        let mut sim = SimulationBackend::new(settings);
        assert!(sim.connect("opc.tcp://sim").await);

        for entry in sim.browse_objects().await {
            let n: i64 = sim.read_value(&entry.node_id).await.value.parse().unwrap();
            assert!((1..=10).contains(&n));
        }
        let unknown: i64 = sim.read_value("ns=9;s=Nowhere").await.value.parse().unwrap();
        assert!((1..=10).contains(&unknown));
    }

    #[tokio::test]
    async fn test_negative_seed_is_deterministic() {
        let mut a = SimulationBackend::new(SimulationSettings::seeded(-17));
        let mut b = SimulationBackend::new(SimulationSettings::seeded(-17));
        assert_eq!(
            a.read_value("ns=2;s=Device1.Var1").await,
            b.read_value("ns=2;s=Device1.Var1").await
        );
    }

    #[tokio::test]
    async fn test_unknown_node_value_is_remembered() {
        let mut sim = SimulationBackend::new(SimulationSettings::seeded(8));
        let first = sim.read_value("ns=9;s=Nowhere").await;
        let second = sim.read_value("ns=9;s=Nowhere").await;
        assert_eq!(first, second);
        assert!(!first.is_error());
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let mut sim = SimulationBackend::new(SimulationSettings::seeded(8));
        sim.connect("opc.tcp://sim").await;
        assert!(sim.write_value("ns=2;s=Device1.Var1", "1").await);
        assert!(sim.write_value("ns=2;s=Device1.Var1", "hello").await);
        assert_eq!(sim.read_value("ns=2;s=Device1.Var1").await.value, "hello");
    }

    #[tokio::test]
    async fn test_same_seed_same_values() {
        let mut a = SimulationBackend::new(SimulationSettings::seeded(42));
        let mut b = SimulationBackend::new(SimulationSettings::seeded(42));
        a.connect("opc.tcp://a").await;
        b.connect("opc.tcp://b").await;

        for entry in a.browse_objects().await {
            assert_eq!(
                a.read_value(&entry.node_id).await,
                b.read_value(&entry.node_id).await
            );
        }
    }
}
