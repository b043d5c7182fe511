// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Client abstraction layer.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          UaClient                               │
//! │        (fallback policy, label cache, operation counters)       │
//! └─────────────────────────────────────────────────────────────────┘
//!                 │                               │
//!                 ▼                               ▼
//! ┌───────────────────────────────┐ ┌───────────────────────────────┐
//! │        ProtocolBackend        │ │       SimulationBackend       │
//! │   (UaBackend over UaStack)    │ │  (seeded in-memory catalog)   │
//! └───────────────────────────────┘ └───────────────────────────────┘
//!                 │
//!                 ▼
//! ┌───────────────────────────────┐
//! │            UaStack            │
//! │  (OpcUaStack or test double)  │
//! └───────────────────────────────┘
//! ```

mod backend;
mod orchestrator;
mod protocol;
mod resolver;
mod simulation;
mod stack;
mod value;

#[cfg(feature = "real-transport")]
mod opcua_stack;

pub use backend::{BackendKind, UaBackend};
pub use orchestrator::{ClientStats, UaClient};
pub use protocol::ProtocolBackend;
pub use resolver::{parse_composite, NodeResolver};
pub use simulation::SimulationBackend;
pub use stack::{DefaultStackConnector, ReferenceEntry, StackConnector, UaStack};
pub use value::UaValue;

#[cfg(feature = "real-transport")]
pub use opcua_stack::OpcUaStack;
