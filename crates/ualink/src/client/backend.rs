// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The capability set shared by every backend.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{BrowseEntry, ReadResult};

// =============================================================================
// BackendKind
// =============================================================================

/// Which implementation sits behind a [`UaBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Talks to a server through a protocol stack.
    Protocol,
    /// In-memory catalog.
    Simulation,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Protocol => write!(f, "protocol"),
            Self::Simulation => write!(f, "simulation"),
        }
    }
}

// =============================================================================
// UaBackend
// =============================================================================

/// Uniform capability set over a real or simulated server.
///
/// Nothing here returns an error. Failures surface as `false`, an empty
/// browse result, or [`ReadResult::error`].
#[async_trait]
pub trait UaBackend: Send {
    /// Returns which implementation this is.
    fn kind(&self) -> BackendKind;

    /// Establishes a session. `true` only on success.
    async fn connect(&mut self, url: &str) -> bool;

    /// Ends the session. Safe to call when not connected.
    async fn disconnect(&mut self);

    /// Returns `true` while a session is established.
    fn is_connected(&self) -> bool;

    /// Lists the variables under the Objects folder.
    async fn browse_objects(&mut self) -> Vec<BrowseEntry>;

    /// Reads the current value of a node.
    async fn read_value(&mut self, node_id: &str) -> ReadResult;

    /// Writes caller text to a node. `true` when the write was accepted.
    async fn write_value(&mut self, node_id: &str, value: &str) -> bool;
}
