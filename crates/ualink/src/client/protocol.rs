// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The real backend: a [`UaBackend`] over a [`UaStack`].

use async_trait::async_trait;
use tracing::{debug, info, trace};

use crate::client::backend::{BackendKind, UaBackend};
use crate::client::stack::{ReferenceEntry, UaStack};
use crate::client::value::UaValue;
use crate::config::BrowseMode;
use crate::types::{BrowseEntry, NodeId, ReadResult, TypeTag};

/// Label of the standard server object, hidden in lenient browse mode.
const SERVER_OBJECT_LABEL: &str = "Server";

// =============================================================================
// ProtocolBackend
// =============================================================================

/// Backend that talks to a server through a protocol stack.
///
/// Stack errors are logged and turned into the uniform failure signals of
/// [`UaBackend`]. No operation retries.
pub struct ProtocolBackend {
    stack: Box<dyn UaStack>,
    browse_mode: BrowseMode,
    endpoint: Option<String>,
}

impl ProtocolBackend {
    /// Wraps a freshly created stack.
    pub fn new(stack: Box<dyn UaStack>, browse_mode: BrowseMode) -> Self {
        Self {
            stack,
            browse_mode,
            endpoint: None,
        }
    }

    /// Returns the endpoint of the current session.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    fn keep_reference(&self, reference: &ReferenceEntry) -> Option<BrowseEntry> {
        let Some(node_id) = &reference.node_id else {
            trace!(label = reference.label(), "Skipping node without a text identifier");
            return None;
        };

        let keep = match self.browse_mode {
            BrowseMode::Strict => reference.node_class.has_value(),
            BrowseMode::Lenient => {
                !node_id.is_standard() && reference.label() != SERVER_OBJECT_LABEL
            }
        };

        keep.then(|| BrowseEntry::new(node_id.to_string(), reference.label()))
    }

    fn parse_node_id(node_id: &str, context: &str) -> Option<NodeId> {
        match node_id.parse::<NodeId>() {
            Ok(id) => Some(id),
            Err(e) => {
                e.log(context);
                None
            }
        }
    }
}

impl std::fmt::Debug for ProtocolBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolBackend")
            .field("browse_mode", &self.browse_mode)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

/// Renders a stack value as a read result.
fn to_read_result(value: &UaValue) -> ReadResult {
    match (value, value.to_text()) {
        (_, Some(text)) => ReadResult::new(text, value.type_tag()),
        (UaValue::Other(_), None) => ReadResult::unsupported(),
        (_, None) => ReadResult::error(),
    }
}

#[async_trait]
impl UaBackend for ProtocolBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Protocol
    }

    async fn connect(&mut self, url: &str) -> bool {
        match self.stack.connect(url).await {
            Ok(()) => {
                self.endpoint = Some(url.to_string());
                info!(endpoint = %url, "Protocol backend connected");
                true
            }
            Err(e) => {
                e.log("protocol connect");
                false
            }
        }
    }

    async fn disconnect(&mut self) {
        if let Some(endpoint) = self.endpoint.take() {
            if let Err(e) = self.stack.disconnect().await {
                e.log("protocol disconnect");
            }
            info!(endpoint = %endpoint, "Protocol backend disconnected");
        }
    }

    fn is_connected(&self) -> bool {
        self.endpoint.is_some()
    }

    async fn browse_objects(&mut self) -> Vec<BrowseEntry> {
        if !self.is_connected() {
            return Vec::new();
        }

        let references = match self.stack.browse_children(&NodeId::objects_folder()).await {
            Ok(references) => references,
            Err(e) => {
                e.log("protocol browse");
                return Vec::new();
            }
        };

        let total = references.len();
        let entries: Vec<BrowseEntry> = references
            .iter()
            .filter_map(|reference| self.keep_reference(reference))
            .collect();

        debug!(
            references = total,
            kept = entries.len(),
            mode = ?self.browse_mode,
            "Browsed Objects folder"
        );
        entries
    }

    async fn read_value(&mut self, node_id: &str) -> ReadResult {
        if !self.is_connected() {
            return ReadResult::error();
        }
        let Some(id) = Self::parse_node_id(node_id, "protocol read") else {
            return ReadResult::error();
        };

        match self.stack.read_value(&id).await {
            Ok(value) => {
                let result = to_read_result(&value);
                trace!(node_id = %id, value = %result.value, type_tag = %result.type_tag, "Read value");
                result
            }
            Err(e) => {
                e.log("protocol read");
                ReadResult::error()
            }
        }
    }

    async fn write_value(&mut self, node_id: &str, value: &str) -> bool {
        if !self.is_connected() {
            return false;
        }
        let Some(id) = Self::parse_node_id(node_id, "protocol write") else {
            return false;
        };

        // Preserve the variable's current type; unknown types are written as text.
        let target = match self.stack.read_value(&id).await {
            Ok(current) if current.is_supported() => current.type_tag(),
            Ok(_) => TypeTag::String,
            Err(e) => {
                e.log("protocol write type lookup");
                TypeTag::String
            }
        };

        let typed = match UaValue::parse_as(target, value) {
            Ok(typed) => typed,
            Err(e) => {
                e.log("protocol write");
                return false;
            }
        };

        match self.stack.write_value(&id, typed).await {
            Ok(()) => {
                trace!(node_id = %id, type_tag = %target, "Wrote value");
                true
            }
            Err(e) => {
                e.log("protocol write");
                false
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
