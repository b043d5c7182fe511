// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Client behaviour tests.
//!
//! Run without a server. The simulation path uses a connector that never
//! yields a stack; the protocol path uses an in-process mock server behind
//! the `UaStack` seam.
//!
//! ```bash
//! cargo test -p ualink --test client_behaviour
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use ualink::client::{ReferenceEntry, UaStack, UaValue};
use ualink::{
    BrowseEntry, BrowseMode, ConnectionError, NodeClass, NodeId, ReadResult, TypeTag, UaClient,
    UaClientConfig, UaError, UaResult,
};

// =============================================================================
// Mock Server
// =============================================================================

/// In-process server state shared between a test and the stacks it hands out.
#[derive(Default)]
struct MockServer {
    refuse_connect: AtomicBool,
    fail_browse: AtomicBool,
    connected: AtomicBool,
    disconnects: AtomicU32,
    children: RwLock<Vec<ReferenceEntry>>,
    values: RwLock<HashMap<NodeId, UaValue>>,
}

impl MockServer {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn add_variable(&self, node_id: NodeId, label: &str, value: UaValue) {
        self.children
            .write()
            .unwrap()
            .push(ReferenceEntry::new(node_id.clone(), label, NodeClass::Variable));
        self.values.write().unwrap().insert(node_id, value);
    }

    fn add_child(&self, reference: ReferenceEntry) {
        self.children.write().unwrap().push(reference);
    }

    fn value(&self, node_id: &NodeId) -> Option<UaValue> {
        self.values.read().unwrap().get(node_id).cloned()
    }
}

struct MockStack {
    server: Arc<MockServer>,
}

#[async_trait]
impl UaStack for MockStack {
    async fn connect(&mut self, url: &str) -> UaResult<()> {
        if self.server.refuse_connect.load(Ordering::SeqCst) {
            return Err(UaError::connection(ConnectionError::refused(url)));
        }
        self.server.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&mut self) -> UaResult<()> {
        self.server.connected.store(false, Ordering::SeqCst);
        self.server.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn browse_children(&mut self, node: &NodeId) -> UaResult<Vec<ReferenceEntry>> {
        assert_eq!(node, &NodeId::objects_folder());
        if self.server.fail_browse.load(Ordering::SeqCst) {
            return Err(UaError::browse(ualink::BrowseError::browse_failed(
                node.to_string(),
                "BadNodeIdUnknown",
            )));
        }
        Ok(self.server.children.read().unwrap().clone())
    }

    async fn read_value(&mut self, node: &NodeId) -> UaResult<UaValue> {
        self.server
            .value(node)
            .ok_or_else(|| UaError::read_failed(node.to_string(), "BadNodeIdUnknown"))
    }

    async fn write_value(&mut self, node: &NodeId, value: UaValue) -> UaResult<()> {
        self.server.values.write().unwrap().insert(node.clone(), value);
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

const ENDPOINT: &str = "opc.tcp://localhost:4840";

fn config(mode: BrowseMode) -> UaClientConfig {
    UaClientConfig::builder()
        .browse_mode(mode)
        .simulation_seed(2024)
        .build()
        .unwrap()
}

/// Client whose connector never yields a stack, so every connect falls back.
fn simulated_client() -> UaClient {
    simulated_client_with(config(BrowseMode::Strict))
}

fn simulated_client_with(config: UaClientConfig) -> UaClient {
    UaClient::with_connector(config, |_: &UaClientConfig| -> UaResult<Box<dyn UaStack>> {
        Err(UaError::connection(ConnectionError::stack_unavailable(
            "no stack in tests",
        )))
    })
}

fn mock_client(server: &Arc<MockServer>, mode: BrowseMode) -> UaClient {
    let server = Arc::clone(server);
    UaClient::with_connector(
        config(mode),
        move |_: &UaClientConfig| -> UaResult<Box<dyn UaStack>> {
            Ok(Box::new(MockStack {
                server: Arc::clone(&server),
            }))
        },
    )
}

// =============================================================================
// Simulation Path
// =============================================================================

#[tokio::test]
async fn test_fresh_client_is_not_connected() {
    let client = simulated_client();
    assert!(!client.is_connected());
    assert_eq!(client.resolve_by_label("Device1 / Var1"), "");
}

#[tokio::test]
async fn test_connect_succeeds_for_any_url() {
    for url in [ENDPOINT, "opc.tcp://203.0.113.9:4840", "not a url", ""] {
        let mut client = simulated_client();
        assert!(client.connect(url).await, "connect({url:?}) should succeed");
        assert!(client.is_connected());
    }
}

#[tokio::test]
async fn test_browse_is_stable() {
    let mut client = simulated_client();
    client.connect(ENDPOINT).await;

    let first = client.browse_objects().await;
    let second = client.browse_objects().await;

    assert_eq!(first.len(), 10);
    assert_eq!(first.len(), second.len());
    assert_eq!(first[0].node_id, second[0].node_id);
    for entry in &first {
        assert!(!entry.node_id.is_empty());
        assert!(!entry.label.is_empty());
    }
    assert_eq!(first[0], BrowseEntry::new("ns=2;s=Device1.Var1", "Device1 / Var1"));
    assert_eq!(first[9], BrowseEntry::new("ns=2;s=Device1.Var10", "Device1 / Var10"));
}

#[tokio::test]
async fn test_resolve_labels_from_latest_browse() {
    let mut client = simulated_client();
    client.connect(ENDPOINT).await;
    let entries = client.browse_objects().await;

    for entry in &entries {
        assert_eq!(client.resolve_by_label(&entry.label), entry.node_id);
    }
    assert_eq!(client.resolve_by_label("Conveyor speed"), "");
}

#[tokio::test]
async fn test_resolve_composite_label() {
    let client = simulated_client();
    assert_eq!(
        client.resolve_by_label("Device1 / Var1 | ns=2;s=Device1.Var1 = 42"),
        "ns=2;s=Device1.Var1"
    );
}

#[tokio::test]
async fn test_write_then_read_under_simulation() {
    let mut client = simulated_client();
    client.connect(ENDPOINT).await;
    let entries = client.browse_objects().await;
    let node_id = client.resolve_by_label(&entries[3].label);

    assert!(client.write_value(&node_id, "42.5").await);
    let result = client.read_value(&node_id).await;
    assert_eq!(result, ReadResult::new("42.5", TypeTag::String));
}

#[tokio::test]
async fn test_disconnect_clears_session() {
    let mut client = simulated_client();
    client.connect(ENDPOINT).await;
    let entries = client.browse_objects().await;

    client.disconnect().await;

    assert!(!client.is_connected());
    assert!(client.browse_objects().await.is_empty());
    assert_eq!(client.resolve_by_label(&entries[0].label), "");
    assert!(client.read_value(&entries[0].node_id).await.is_error());
    assert!(!client.write_value(&entries[0].node_id, "1").await);
}

#[tokio::test]
async fn test_disconnect_when_disconnected_is_noop() {
    let mut client = simulated_client();
    client.disconnect().await;
    client.disconnect().await;
    assert!(!client.is_connected());

    client.connect(ENDPOINT).await;
    client.disconnect().await;
    client.disconnect().await;
    assert!(!client.is_connected());
}

#[tokio::test]
async fn test_fixed_seed_gives_identical_values() {
    let mut a = simulated_client();
    let mut b = simulated_client();
    a.connect(ENDPOINT).await;
    b.connect("opc.tcp://other:4840").await;

    for entry in a.browse_objects().await {
        let left = a.read_value(&entry.node_id).await;
        let right = b.read_value(&entry.node_id).await;
        assert_eq!(left, right);
        let n: i64 = left.value.parse().unwrap();
        assert!((0..=100).contains(&n));
    }
}

#[tokio::test]
async fn test_catalog_size_from_config() {
    let config = UaClientConfig::from_toml_str(
        r#"
        [simulation]
        catalog_size = 4
        namespace_index = 5
        seed = 1
        "#,
    )
    .unwrap();
    let mut client = simulated_client_with(config);
    client.connect(ENDPOINT).await;

    let entries = client.browse_objects().await;
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[3].node_id, "ns=5;s=Device1.Var4");
}

// =============================================================================
// Protocol Path
// =============================================================================

#[tokio::test]
async fn test_real_connection_is_preferred() {
    let server = MockServer::new();
    server.add_variable(NodeId::numeric(2, 1), "Device1 / Temperature", UaValue::Double(21.5));

    let mut client = mock_client(&server, BrowseMode::Strict);
    assert!(client.connect(ENDPOINT).await);
    assert!(server.connected.load(Ordering::SeqCst));
    assert_eq!(client.stats().fallbacks(), 0);

    let entries = client.browse_objects().await;
    assert_eq!(entries, vec![BrowseEntry::new("ns=2;i=1", "Device1 / Temperature")]);
    assert_eq!(
        client.read_value("ns=2;i=1").await,
        ReadResult::new("21.5", TypeTag::Double)
    );
}

#[tokio::test]
async fn test_refused_connection_falls_back() {
    let server = MockServer::new();
    server.refuse_connect.store(true, Ordering::SeqCst);
    server.add_variable(NodeId::numeric(2, 1), "Device1 / Temperature", UaValue::Double(21.5));

    let mut client = mock_client(&server, BrowseMode::Strict);
    assert!(client.connect(ENDPOINT).await);
    assert_eq!(client.stats().fallbacks(), 1);

    let entries = client.browse_objects().await;
    assert_eq!(entries.len(), 10);
    assert_eq!(entries[0].node_id, "ns=2;s=Device1.Var1");
}

#[tokio::test]
async fn test_reconnect_closes_previous_session() {
    let server = MockServer::new();
    let mut client = mock_client(&server, BrowseMode::Strict);

    client.connect(ENDPOINT).await;
    server.refuse_connect.store(true, Ordering::SeqCst);
    assert!(client.connect(ENDPOINT).await);

    assert_eq!(server.disconnects.load(Ordering::SeqCst), 1);
    assert!(!server.connected.load(Ordering::SeqCst));
    assert_eq!(client.stats().connects(), 2);
    assert_eq!(client.stats().fallbacks(), 1);
}

#[tokio::test]
async fn test_strict_browse_keeps_variables_only() {
    let server = MockServer::new();
    server.add_child(ReferenceEntry::new(NodeId::numeric(0, 2253), "Server", NodeClass::Object));
    server.add_child(ReferenceEntry::new(NodeId::string(2, "Boiler"), "Boiler", NodeClass::Object));
    server.add_variable(NodeId::string(2, "Boiler.Temp"), "Boiler / Temp", UaValue::Float(80.0));
    server.add_child(ReferenceEntry {
        node_id: None,
        browse_name: "GuidVar".into(),
        display_name: "GuidVar".into(),
        node_class: NodeClass::Variable,
    });
    server.add_child(ReferenceEntry::new(NodeId::numeric(2, 9), "Reset", NodeClass::Method));

    let mut client = mock_client(&server, BrowseMode::Strict);
    client.connect(ENDPOINT).await;

    let entries = client.browse_objects().await;
    assert_eq!(entries, vec![BrowseEntry::new("ns=2;s=Boiler.Temp", "Boiler / Temp")]);
}

#[tokio::test]
async fn test_lenient_browse_keeps_non_standard_children() {
    let server = MockServer::new();
    server.add_child(ReferenceEntry::new(NodeId::numeric(0, 2253), "Server", NodeClass::Object));
    server.add_child(ReferenceEntry::new(NodeId::numeric(0, 23470), "Aliases", NodeClass::Object));
    server.add_child(ReferenceEntry::new(NodeId::string(2, "Boiler"), "Boiler", NodeClass::Object));
    server.add_variable(NodeId::string(2, "Boiler.Temp"), "Boiler / Temp", UaValue::Float(80.0));
    server.add_child(ReferenceEntry::new(NodeId::string(1, "Srv"), "Server", NodeClass::Object));

    let mut client = mock_client(&server, BrowseMode::Lenient);
    client.connect(ENDPOINT).await;

    let labels: Vec<String> = client
        .browse_objects()
        .await
        .into_iter()
        .map(|e| e.label)
        .collect();
    assert_eq!(labels, vec!["Boiler".to_string(), "Boiler / Temp".to_string()]);
}

#[tokio::test]
async fn test_display_name_falls_back_to_browse_name() {
    let server = MockServer::new();
    server.add_child(
        ReferenceEntry::new(NodeId::numeric(3, 7), "", NodeClass::Variable)
            .with_browse_name("3:FlowRate"),
    );

    let mut client = mock_client(&server, BrowseMode::Strict);
    client.connect(ENDPOINT).await;
    client.browse_objects().await;
    assert_eq!(client.resolve_by_label("3:FlowRate"), "ns=3;i=7");
}

#[tokio::test]
async fn test_failed_browse_is_empty() {
    let server = MockServer::new();
    server.add_variable(NodeId::numeric(2, 1), "Device1 / Temperature", UaValue::Int32(1));
    server.fail_browse.store(true, Ordering::SeqCst);

    let mut client = mock_client(&server, BrowseMode::Strict);
    client.connect(ENDPOINT).await;
    assert!(client.browse_objects().await.is_empty());
    assert_eq!(client.resolve_by_label("Device1 / Temperature"), "");
}

#[tokio::test]
async fn test_read_maps_runtime_types() {
    let server = MockServer::new();
    let cases = [
        (UaValue::Boolean(true), ReadResult::new("true", TypeTag::Boolean)),
        (UaValue::Int16(-12), ReadResult::new("-12", TypeTag::Int16)),
        (UaValue::Int32(70000), ReadResult::new("70000", TypeTag::Int32)),
        (UaValue::Int64(-5_000_000_000), ReadResult::new("-5000000000", TypeTag::Int64)),
        (UaValue::UInt16(65535), ReadResult::new("65535", TypeTag::UInt16)),
        (UaValue::UInt32(4_000_000_000), ReadResult::new("4000000000", TypeTag::UInt32)),
        (UaValue::Float(0.5), ReadResult::new("0.5", TypeTag::Float)),
        (UaValue::Double(42.25), ReadResult::new("42.25", TypeTag::Double)),
        (UaValue::String("idle".into()), ReadResult::new("idle", TypeTag::String)),
        (UaValue::Other("DateTime".into()), ReadResult::unsupported()),
        (UaValue::Empty, ReadResult::error()),
    ];
    for (i, (value, _)) in cases.iter().enumerate() {
        server.add_variable(NodeId::numeric(2, i as u32), "v", value.clone());
    }

    let mut client = mock_client(&server, BrowseMode::Strict);
    client.connect(ENDPOINT).await;

    for (i, (_, expected)) in cases.iter().enumerate() {
        let node_id = NodeId::numeric(2, i as u32).to_string();
        assert_eq!(&client.read_value(&node_id).await, expected, "node {node_id}");
    }
}

#[tokio::test]
async fn test_failed_read_is_sentinel() {
    let server = MockServer::new();
    let mut client = mock_client(&server, BrowseMode::Strict);
    client.connect(ENDPOINT).await;

    let result = client.read_value("ns=2;i=404").await;
    assert_eq!(result.value, "<error>");
    assert_eq!(result.type_tag.as_str(), "-");
    assert_eq!(client.stats().failed_reads(), 1);
}

#[tokio::test]
async fn test_write_preserves_existing_type() {
    let server = MockServer::new();
    let counter = NodeId::numeric(2, 1);
    server.add_variable(counter.clone(), "Line / Count", UaValue::Int32(3));

    let mut client = mock_client(&server, BrowseMode::Strict);
    client.connect(ENDPOINT).await;

    assert!(!client.write_value("ns=2;i=1", "abc").await);
    assert_eq!(server.value(&counter), Some(UaValue::Int32(3)));

    assert!(client.write_value("ns=2;i=1", "17").await);
    assert_eq!(server.value(&counter), Some(UaValue::Int32(17)));
    assert_eq!(
        client.read_value("ns=2;i=1").await,
        ReadResult::new("17", TypeTag::Int32)
    );
    assert_eq!(client.stats().rejected_writes(), 1);
}

#[tokio::test]
async fn test_write_boolean_and_overflow() {
    let server = MockServer::new();
    let flag = NodeId::string(2, "Pump.Enabled");
    let small = NodeId::string(2, "Pump.Mode");
    server.add_variable(flag.clone(), "Pump / Enabled", UaValue::Boolean(false));
    server.add_variable(small.clone(), "Pump / Mode", UaValue::Int16(1));

    let mut client = mock_client(&server, BrowseMode::Strict);
    client.connect(ENDPOINT).await;

    assert!(client.write_value("ns=2;s=Pump.Enabled", "true").await);
    assert_eq!(server.value(&flag), Some(UaValue::Boolean(true)));

    assert!(!client.write_value("ns=2;s=Pump.Mode", "40000").await);
    assert_eq!(server.value(&small), Some(UaValue::Int16(1)));
}

#[tokio::test]
async fn test_write_unknown_type_as_string() {
    let server = MockServer::new();
    let stamp = NodeId::numeric(2, 2);
    server.add_variable(stamp.clone(), "Line / Stamp", UaValue::Other("DateTime".into()));

    let mut client = mock_client(&server, BrowseMode::Strict);
    client.connect(ENDPOINT).await;

    assert!(client.write_value("ns=2;i=2", "abc").await);
    assert_eq!(server.value(&stamp), Some(UaValue::String("abc".into())));

    assert!(client.write_value("ns=2;i=3", "fresh").await);
    assert_eq!(
        server.value(&NodeId::numeric(2, 3)),
        Some(UaValue::String("fresh".into()))
    );
}

#[tokio::test]
async fn test_disconnect_closes_real_session() {
    let server = MockServer::new();
    let mut client = mock_client(&server, BrowseMode::Strict);
    client.connect(ENDPOINT).await;

    client.disconnect().await;
    client.disconnect().await;

    assert!(!client.is_connected());
    assert!(!server.connected.load(Ordering::SeqCst));
    assert_eq!(server.disconnects.load(Ordering::SeqCst), 1);
}
