// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA client adapter with a simulation fallback.
//!
//! [`UaClient`] connects to a server through a protocol stack, lists the
//! variables under the Objects folder, and reads and writes their values as
//! text. When the server cannot be reached the client switches to an
//! in-memory simulation, so callers always get a working session.
//!
//! # Features
//!
//! - `real-transport`: builds [`client::OpcUaStack`] on the `opcua` crate.
//!   Without it every connection runs on the simulation.
//!
//! # Error Handling
//!
//! The capability surface never returns errors. Internally every step
//! produces a [`UaResult`], and failures are logged through
//! [`UaError::log`] where they are turned into `false`, an empty browse
//! result or the `<error>` read sentinel.
//!
//! ```text
//! UaError
//! ├── Connection    - Session establishment and endpoint issues
//! ├── Browse        - Node browsing failures
//! ├── Operation     - Read/write operation failures
//! ├── Conversion    - Text coercion and node id parsing errors
//! ├── Configuration - Invalid settings
//! └── Timeout       - Deadlines imposed by the client
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use ualink::{UaClient, UaClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = UaClientConfig::from_file("ualink.toml")?;
//!     let mut client = UaClient::new(config);
//!
//!     client.connect_configured().await;
//!     for entry in client.browse_objects().await {
//!         let result = client.read_value(&entry.node_id).await;
//!         println!("{} = {} ({})", entry.label, result.value, result.type_tag);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use error::{
    BrowseError, ConfigurationError, ConnectionError, ConversionError, ErrorSeverity,
    OperationError, TimeoutError, UaError, UaResult,
};

pub use types::{BrowseEntry, NodeClass, NodeId, NodeIdentifier, ReadResult, TypeTag};

pub use config::{BrowseMode, SimulationSettings, UaClientConfig, UaClientConfigBuilder};

pub use client::{
    BackendKind, ClientStats, DefaultStackConnector, NodeResolver, ProtocolBackend,
    ReferenceEntry, SimulationBackend, StackConnector, UaBackend, UaClient, UaStack, UaValue,
};

#[cfg(feature = "real-transport")]
pub use client::OpcUaStack;
