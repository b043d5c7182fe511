// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Value model exchanged across the client boundary.
//!
//! - **NodeId**: structured node identifier with its canonical text form
//! - **NodeClass**: node class reported by browse
//! - **TypeTag**: the fixed type vocabulary used in read results
//! - **BrowseEntry**: one browsed variable (identifier + human label)
//! - **ReadResult**: a value rendered as text plus its type tag
//!
//! # Examples
//!
//! ```
//! use ualink::types::{NodeId, ReadResult, TypeTag};
//!
//! let node_id: NodeId = "ns=2;s=Device1.Var1".parse().unwrap();
//! assert_eq!(node_id, NodeId::string(2, "Device1.Var1"));
//! assert_eq!(NodeId::numeric(2, 7).to_string(), "ns=2;i=7");
//!
//! let failed = ReadResult::error();
//! assert_eq!(failed.value, "<error>");
//! assert_eq!(failed.type_tag, TypeTag::Missing);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConversionError, UaError};

// =============================================================================
// NodeId
// =============================================================================

/// OPC UA node identifier.
///
/// A namespace index plus either a numeric or a string discriminator. The
/// canonical text form always carries the namespace: `ns=<index>;i=<number>`
/// or `ns=<index>;s=<text>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId {
    /// Namespace index (0 = OPC UA standard namespace).
    pub namespace_index: u16,

    /// The node identifier.
    pub identifier: NodeIdentifier,
}

impl NodeId {
    /// Numeric id of the standard Objects folder (`ns=0;i=85`).
    pub const OBJECTS_FOLDER: u32 = 85;

    /// Creates a numeric node ID.
    #[inline]
    pub fn numeric(namespace_index: u16, value: u32) -> Self {
        Self {
            namespace_index,
            identifier: NodeIdentifier::Numeric(value),
        }
    }

    /// Creates a string node ID.
    #[inline]
    pub fn string(namespace_index: u16, value: impl Into<String>) -> Self {
        Self {
            namespace_index,
            identifier: NodeIdentifier::String(value.into()),
        }
    }

    /// The root "Objects" folder every server exposes.
    #[inline]
    pub fn objects_folder() -> Self {
        Self::numeric(0, Self::OBJECTS_FOLDER)
    }

    /// Returns `true` if this is in the standard namespace (ns=0).
    #[inline]
    pub const fn is_standard(&self) -> bool {
        self.namespace_index == 0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ns={};{}", self.namespace_index, self.identifier)
    }
}

impl FromStr for NodeId {
    type Err = UaError;

    /// Parses a NodeId from its text form.
    ///
    /// Supported formats:
    /// - `ns=2;i=1001` (numeric)
    /// - `ns=2;s=MyNode` (string)
    /// - `i=85` / `s=MyNode` (namespace 0)
    ///
    /// String identifiers are taken verbatim, surrounding whitespace included.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid =
            |reason: &str| UaError::conversion(ConversionError::invalid_node_id(s, reason));

        let (namespace_index, identifier_part) = match s.strip_prefix("ns=") {
            Some(rest) => {
                let (ns_str, identifier_part) = rest
                    .split_once(';')
                    .ok_or_else(|| invalid("Missing identifier after namespace"))?;
                let ns: u16 = ns_str
                    .parse()
                    .map_err(|_| invalid("Invalid namespace index"))?;
                (ns, identifier_part)
            }
            None => (0, s),
        };

        let identifier = if let Some(id) = identifier_part.strip_prefix("i=") {
            let value: u32 = id
                .parse()
                .map_err(|_| invalid("Invalid numeric identifier"))?;
            NodeIdentifier::Numeric(value)
        } else if let Some(id) = identifier_part.strip_prefix("s=") {
            if id.is_empty() {
                return Err(invalid("Empty string identifier"));
            }
            NodeIdentifier::String(id.to_string())
        } else {
            return Err(invalid("Unknown identifier type. Expected i= or s="));
        };

        Ok(Self {
            namespace_index,
            identifier,
        })
    }
}

// =============================================================================
// NodeIdentifier
// =============================================================================

/// Identifier kinds with a canonical text form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum NodeIdentifier {
    /// Numeric identifier.
    Numeric(u32),

    /// String identifier.
    String(String),
}

impl fmt::Display for NodeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(v) => write!(f, "i={}", v),
            Self::String(v) => write!(f, "s={}", v),
        }
    }
}

// =============================================================================
// NodeClass
// =============================================================================

/// OPC UA node classes as reported by browse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeClass {
    /// Object node.
    Object,
    /// Variable node.
    Variable,
    /// Method node.
    Method,
    /// Object type node.
    ObjectType,
    /// Variable type node.
    VariableType,
    /// Reference type node.
    ReferenceType,
    /// Data type node.
    DataType,
    /// View node.
    View,
}

impl NodeClass {
    /// Creates from OPC UA value.
    pub fn from_value(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Object),
            2 => Some(Self::Variable),
            4 => Some(Self::Method),
            8 => Some(Self::ObjectType),
            16 => Some(Self::VariableType),
            32 => Some(Self::ReferenceType),
            64 => Some(Self::DataType),
            128 => Some(Self::View),
            _ => None,
        }
    }

    /// Returns `true` if this node class can have a value.
    pub const fn has_value(&self) -> bool {
        matches!(self, Self::Variable)
    }
}

// =============================================================================
// TypeTag
// =============================================================================

/// Type vocabulary reported alongside a read value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    /// Boolean.
    Boolean,
    /// 16-bit signed integer.
    Int16,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 16-bit unsigned integer.
    UInt16,
    /// 32-bit unsigned integer.
    UInt32,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// Text.
    String,
    /// Any other runtime type.
    Other,
    /// No value could be read. Rendered as `-`.
    #[serde(rename = "-")]
    Missing,
}

impl TypeTag {
    /// Returns the tag text.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Int16 => "Int16",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::UInt16 => "UInt16",
            Self::UInt32 => "UInt32",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::String => "String",
            Self::Other => "Other",
            Self::Missing => "-",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// BrowseEntry
// =============================================================================

/// One variable found by browsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BrowseEntry {
    /// Canonical node id text.
    pub node_id: String,

    /// Human-readable path, e.g. `Device1 / Temperature`.
    pub label: String,
}

impl BrowseEntry {
    /// Creates a browse entry.
    pub fn new(node_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            label: label.into(),
        }
    }

    /// Renders the composite display string `<label> | <node_id> = <value>`.
    ///
    /// [`crate::client::NodeResolver`] parses this shape back to the node id.
    pub fn composite_label(&self, value: &str) -> String {
        format!("{} | {} = {}", self.label, self.node_id, value)
    }
}

impl fmt::Display for BrowseEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.node_id)
    }
}

// =============================================================================
// ReadResult
// =============================================================================

/// A value read from a node, rendered as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadResult {
    /// The scalar rendered as text.
    pub value: String,

    /// The value's type tag.
    #[serde(rename = "type")]
    pub type_tag: TypeTag,
}

impl ReadResult {
    /// Value text of the failure sentinel.
    pub const ERROR_VALUE: &'static str = "<error>";

    /// Value text reported for runtime types outside the tag vocabulary.
    pub const UNSUPPORTED_VALUE: &'static str = "<unsupported>";

    /// Creates a read result.
    pub fn new(value: impl Into<String>, type_tag: TypeTag) -> Self {
        Self {
            value: value.into(),
            type_tag,
        }
    }

    /// The `{ "<error>", "-" }` sentinel.
    pub fn error() -> Self {
        Self::new(Self::ERROR_VALUE, TypeTag::Missing)
    }

    /// The `{ "<unsupported>", "Other" }` result.
    pub fn unsupported() -> Self {
        Self::new(Self::UNSUPPORTED_VALUE, TypeTag::Other)
    }

    /// Returns `true` if this is the failure sentinel.
    #[inline]
    pub fn is_error(&self) -> bool {
        self.type_tag == TypeTag::Missing
    }
}

impl Default for ReadResult {
    fn default() -> Self {
        Self::error()
    }
}

// =============================================================================
// Tests
// =============================================================================
