// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! [`UaStack`] over the `opcua` crate.
//!
//! The `opcua` 0.12 client API is blocking. Every session call runs on the
//! blocking pool so the caller's timeout can fire while a handshake hangs.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, trace};

use opcua::client::prelude::*;
use opcua::sync::RwLock as OpcUaRwLock;

use crate::client::stack::{ReferenceEntry, UaStack};
use crate::client::value::UaValue;
use crate::config::UaClientConfig;
use crate::error::{BrowseError, ConnectionError, OperationError, UaError, UaResult};
use crate::types::{NodeClass as UaNodeClass, NodeId, NodeIdentifier};

type SharedSession = Arc<OpcUaRwLock<Session>>;

// =============================================================================
// OpcUaStack
// =============================================================================

/// Stack backed by an `opcua` client session.
///
/// Uses `SecurityPolicy::None` with an anonymous identity.
pub struct OpcUaStack {
    config: UaClientConfig,
    client: Option<Client>,
    session: Option<SharedSession>,
}

impl OpcUaStack {
    /// Creates a disconnected stack.
    pub fn new(config: UaClientConfig) -> Self {
        Self {
            config,
            client: None,
            session: None,
        }
    }

    fn build_client(&self, url: &str) -> UaResult<Client> {
        ClientBuilder::new()
            .application_name(&self.config.application_name)
            .application_uri(self.config.effective_application_uri())
            .trust_server_certs(self.config.trust_server_certs)
            .session_retry_limit(0)
            .session_timeout(u32::try_from(self.config.session_timeout.as_millis()).unwrap_or(u32::MAX))
            .client()
            .ok_or_else(|| {
                UaError::connection(ConnectionError::invalid_endpoint(
                    url,
                    "Failed to build OPC UA client",
                ))
            })
    }

    fn session(&self) -> UaResult<SharedSession> {
        self.session
            .clone()
            .ok_or_else(|| UaError::connection(ConnectionError::NotConnected))
    }

    fn to_opcua_node_id(node_id: &NodeId) -> opcua::types::NodeId {
        match &node_id.identifier {
            NodeIdentifier::Numeric(v) => opcua::types::NodeId::new(node_id.namespace_index, *v),
            NodeIdentifier::String(v) => {
                opcua::types::NodeId::new(node_id.namespace_index, v.clone())
            }
        }
    }

    fn from_opcua_node_id(node_id: &opcua::types::NodeId) -> Option<NodeId> {
        match &node_id.identifier {
            opcua::types::Identifier::Numeric(v) => Some(NodeId::numeric(node_id.namespace, *v)),
            opcua::types::Identifier::String(v) => {
                Some(NodeId::string(node_id.namespace, v.as_ref()))
            }
            opcua::types::Identifier::Guid(_) | opcua::types::Identifier::ByteString(_) => None,
        }
    }

    fn from_opcua_variant(variant: &Variant) -> UaValue {
        match variant {
            Variant::Empty => UaValue::Empty,
            Variant::Boolean(v) => UaValue::Boolean(*v),
            Variant::Int16(v) => UaValue::Int16(*v),
            Variant::UInt16(v) => UaValue::UInt16(*v),
            Variant::Int32(v) => UaValue::Int32(*v),
            Variant::UInt32(v) => UaValue::UInt32(*v),
            Variant::Int64(v) => UaValue::Int64(*v),
            Variant::Float(v) => UaValue::Float(*v),
            Variant::Double(v) => UaValue::Double(*v),
            Variant::String(v) => UaValue::String(v.as_ref().to_string()),
            other => UaValue::Other(format!("{:?}", other.type_id())),
        }
    }

    fn to_opcua_variant(value: &UaValue) -> Variant {
        match value {
            UaValue::Empty => Variant::Empty,
            UaValue::Boolean(v) => Variant::Boolean(*v),
            UaValue::Int16(v) => Variant::Int16(*v),
            UaValue::UInt16(v) => Variant::UInt16(*v),
            UaValue::Int32(v) => Variant::Int32(*v),
            UaValue::UInt32(v) => Variant::UInt32(*v),
            UaValue::Int64(v) => Variant::Int64(*v),
            UaValue::Float(v) => Variant::Float(*v),
            UaValue::Double(v) => Variant::Double(*v),
            UaValue::String(v) | UaValue::Other(v) => Variant::String(UAString::from(v.as_str())),
        }
    }

    fn to_node_class(node_class: opcua::types::NodeClass) -> UaNodeClass {
        UaNodeClass::from_value(node_class as u32).unwrap_or(UaNodeClass::Object)
    }
}

async fn run_blocking<T, F>(node: String, f: F) -> UaResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> UaResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        UaError::operation(OperationError::read_failed(
            node,
            format!("Stack task failed: {}", e),
        ))
    })?
}

#[async_trait]
impl UaStack for OpcUaStack {
    async fn connect(&mut self, url: &str) -> UaResult<()> {
        info!(endpoint = %url, "Connecting to OPC UA server");

        let mut client = self.build_client(url)?;
        let endpoint_url = url.to_string();

        let (client, session) = tokio::task::spawn_blocking(move || {
            let endpoint: EndpointDescription = (
                endpoint_url.as_str(),
                SecurityPolicy::None.to_str(),
                MessageSecurityMode::None,
                UserTokenPolicy::anonymous(),
            )
                .into();
            let session = client
                .connect_to_endpoint(endpoint, IdentityToken::Anonymous)
                .map_err(|status| {
                    debug!(endpoint = %endpoint_url, status = %status, "Session establishment failed");
                    UaError::connection(ConnectionError::refused(&endpoint_url))
                })?;
            Ok::<_, UaError>((client, session))
        })
        .await
        .map_err(|_| UaError::connection(ConnectionError::refused(url)))??;

        self.client = Some(client);
        self.session = Some(session);

        info!(endpoint = %url, "Connected to OPC UA server");
        Ok(())
    }

    async fn disconnect(&mut self) -> UaResult<()> {
        self.client = None;
        if let Some(session) = self.session.take() {
            run_blocking(String::new(), move || {
                session.read().disconnect();
                Ok(())
            })
            .await?;
            info!("Disconnected from OPC UA server");
        }
        Ok(())
    }

    async fn browse_children(&mut self, node: &NodeId) -> UaResult<Vec<ReferenceEntry>> {
        let session = self.session()?;
        let node_text = node.to_string();
        trace!(node_id = %node_text, "Browsing node");

        let description = BrowseDescription {
            node_id: Self::to_opcua_node_id(node),
            browse_direction: BrowseDirection::Forward,
            reference_type_id: ReferenceTypeId::HierarchicalReferences.into(),
            include_subtypes: true,
            node_class_mask: 0,
            result_mask: BrowseDescriptionResultMask::all().bits(),
        };

        let target = node_text.clone();
        let results = run_blocking(node_text.clone(), move || {
            session.read().browse(&[description]).map_err(|status| {
                UaError::browse(BrowseError::browse_failed(
                    &target,
                    format!("Browse failed: {}", status),
                ))
            })
        })
        .await?
        .ok_or_else(|| UaError::browse(BrowseError::no_result(&node_text)))?;

        let Some(result) = results.into_iter().next() else {
            return Ok(Vec::new());
        };

        if !result.status_code.is_good() {
            return Err(UaError::browse(BrowseError::browse_failed(
                node_text,
                format!("Bad browse status: {}", result.status_code),
            )));
        }

        Ok(result
            .references
            .unwrap_or_default()
            .into_iter()
            .map(|r| ReferenceEntry {
                node_id: Self::from_opcua_node_id(&r.node_id.node_id),
                browse_name: r.browse_name.name.as_ref().to_string(),
                display_name: r.display_name.text.as_ref().to_string(),
                node_class: Self::to_node_class(r.node_class),
            })
            .collect())
    }

    async fn read_value(&mut self, node: &NodeId) -> UaResult<UaValue> {
        let session = self.session()?;
        let node_text = node.to_string();
        trace!(node_id = %node_text, "Reading node value");

        let read_value_id = ReadValueId {
            node_id: Self::to_opcua_node_id(node),
            attribute_id: AttributeId::Value as u32,
            index_range: UAString::null(),
            data_encoding: QualifiedName::null(),
        };

        let target = node_text.clone();
        let values = run_blocking(node_text.clone(), move || {
            session
                .read()
                .read(&[read_value_id], TimestampsToReturn::Neither, 0.0)
                .map_err(|status| {
                    UaError::operation(OperationError::read_failed(
                        &target,
                        format!("Read failed: {}", status),
                    ))
                })
        })
        .await?;

        let data_value = values
            .into_iter()
            .next()
            .ok_or_else(|| UaError::operation(OperationError::no_value(&node_text)))?;

        if let Some(status) = data_value.status {
            if status.is_bad() {
                return Err(UaError::operation(OperationError::bad_status(
                    node_text,
                    status.bits(),
                )));
            }
        }

        Ok(data_value
            .value
            .as_ref()
            .map(Self::from_opcua_variant)
            .unwrap_or(UaValue::Empty))
    }

    async fn write_value(&mut self, node: &NodeId, value: UaValue) -> UaResult<()> {
        let session = self.session()?;
        let node_text = node.to_string();
        trace!(node_id = %node_text, value = %value, "Writing node value");

        let write_value = WriteValue {
            node_id: Self::to_opcua_node_id(node),
            attribute_id: AttributeId::Value as u32,
            index_range: UAString::null(),
            value: DataValue::value_only(Self::to_opcua_variant(&value)),
        };

        let target = node_text.clone();
        let results = run_blocking(node_text.clone(), move || {
            session.read().write(&[write_value]).map_err(|status| {
                UaError::operation(OperationError::write_failed(
                    &target,
                    format!("Write failed: {}", status),
                ))
            })
        })
        .await?;

        match results.first() {
            Some(status) if status.is_good() => Ok(()),
            Some(status) => Err(UaError::operation(OperationError::bad_status(
                node_text,
                status.bits(),
            ))),
            None => Err(UaError::write_failed(node_text, "No write result returned")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_conversion() {
        let numeric = NodeId::numeric(2, 7);
        let converted = OpcUaStack::to_opcua_node_id(&numeric);
        assert_eq!(OpcUaStack::from_opcua_node_id(&converted), Some(numeric));

        let string = NodeId::string(3, "Device1.Var1");
        let converted = OpcUaStack::to_opcua_node_id(&string);
        assert_eq!(OpcUaStack::from_opcua_node_id(&converted), Some(string));

        let guid = opcua::types::NodeId::new(1, opcua::types::Guid::new());
        assert_eq!(OpcUaStack::from_opcua_node_id(&guid), None);
    }

    #[test]
    fn test_variant_mapping() {
        assert_eq!(
            OpcUaStack::from_opcua_variant(&Variant::Int32(5)),
            UaValue::Int32(5)
        );
        assert_eq!(OpcUaStack::from_opcua_variant(&Variant::Empty), UaValue::Empty);
        assert!(matches!(
            OpcUaStack::from_opcua_variant(&Variant::DateTime(Box::new(opcua::types::DateTime::now()))),
            UaValue::Other(_)
        ));
        assert_eq!(
            OpcUaStack::to_opcua_variant(&UaValue::Double(1.5)),
            Variant::Double(1.5)
        );
    }

    #[tokio::test]
    async fn test_operations_require_session() {
        let mut stack = OpcUaStack::new(UaClientConfig::default());
        let result = stack.read_value(&NodeId::numeric(2, 1)).await;
        assert_eq!(result.err().map(|e| e.category()), Some("connection"));
        assert!(stack.disconnect().await.is_ok());
    }
}
