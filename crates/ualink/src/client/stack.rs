// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The protocol stack seam.
//!
//! [`UaStack`] is the narrow slice of an OPC UA client stack that the
//! protocol backend needs. A [`StackConnector`] produces a fresh stack for
//! every connection attempt, so a failed attempt never leaks session state
//! into the next one.

use async_trait::async_trait;

use crate::client::value::UaValue;
use crate::config::UaClientConfig;
use crate::error::UaResult;
use crate::types::{NodeClass, NodeId};

// =============================================================================
// ReferenceEntry
// =============================================================================

/// One forward hierarchical reference returned by a browse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEntry {
    /// Target node. `None` when the identifier kind has no text form
    /// (GUID or opaque).
    pub node_id: Option<NodeId>,

    /// Browse name of the target.
    pub browse_name: String,

    /// Display name of the target.
    pub display_name: String,

    /// Node class of the target.
    pub node_class: NodeClass,
}

impl ReferenceEntry {
    /// Creates a reference to a node with a text identifier.
    pub fn new(node_id: NodeId, display_name: impl Into<String>, node_class: NodeClass) -> Self {
        let display_name = display_name.into();
        Self {
            node_id: Some(node_id),
            browse_name: display_name.clone(),
            display_name,
            node_class,
        }
    }

    /// Sets a browse name that differs from the display name.
    pub fn with_browse_name(mut self, browse_name: impl Into<String>) -> Self {
        self.browse_name = browse_name.into();
        self
    }

    /// Returns the label used for browse results.
    ///
    /// Falls back to the browse name when the display name is empty.
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.browse_name
        } else {
            &self.display_name
        }
    }
}

// =============================================================================
// UaStack
// =============================================================================

/// Client-side operations of an OPC UA stack.
#[async_trait]
pub trait UaStack: Send {
    /// Opens a session to the endpoint.
    async fn connect(&mut self, url: &str) -> UaResult<()>;

    /// Closes the session.
    async fn disconnect(&mut self) -> UaResult<()>;

    /// Browses forward hierarchical references of a node.
    async fn browse_children(&mut self, node: &NodeId) -> UaResult<Vec<ReferenceEntry>>;

    /// Reads the value attribute of a node.
    async fn read_value(&mut self, node: &NodeId) -> UaResult<UaValue>;

    /// Writes the value attribute of a node.
    async fn write_value(&mut self, node: &NodeId, value: UaValue) -> UaResult<()>;
}

// =============================================================================
// StackConnector
// =============================================================================

/// Factory for [`UaStack`] instances.
pub trait StackConnector: Send + Sync {
    /// Creates a stack for one connection attempt.
    ///
    /// # Errors
    ///
    /// Returns a connection error when no stack is available.
    fn create(&self, config: &UaClientConfig) -> UaResult<Box<dyn UaStack>>;
}

impl<F> StackConnector for F
where
    F: Fn(&UaClientConfig) -> UaResult<Box<dyn UaStack>> + Send + Sync,
{
    fn create(&self, config: &UaClientConfig) -> UaResult<Box<dyn UaStack>> {
        self(config)
    }
}

/// Connector for the stack compiled into this build.
///
/// With the `real-transport` feature it creates an
/// [`OpcUaStack`](crate::client::OpcUaStack). Without it every attempt fails
/// with `StackUnavailable`, and the client runs on simulation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStackConnector;

impl StackConnector for DefaultStackConnector {
    #[cfg(feature = "real-transport")]
    fn create(&self, config: &UaClientConfig) -> UaResult<Box<dyn UaStack>> {
        Ok(Box::new(crate::client::opcua_stack::OpcUaStack::new(config.clone())))
    }

    #[cfg(not(feature = "real-transport"))]
    fn create(&self, _config: &UaClientConfig) -> UaResult<Box<dyn UaStack>> {
        use crate::error::{ConnectionError, UaError};

        Err(UaError::connection(ConnectionError::stack_unavailable(
            "built without the real-transport feature",
        )))
    }
}
