// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Label to node id resolution.

use tracing::trace;

use crate::types::BrowseEntry;

/// Cache of the latest browse result, keyed by label.
///
/// Labels need not be unique; the first exact match wins. Labels not in the
/// cache are parsed as the composite display string
/// `<label> | <node_id> = <value>`.
#[derive(Debug, Clone, Default)]
pub struct NodeResolver {
    entries: Vec<BrowseEntry>,
}

impl NodeResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the cache with a new browse result.
    pub fn replace(&mut self, entries: Vec<BrowseEntry>) {
        self.entries = entries;
    }

    /// Empties the cache.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves a label to a node id.
    pub fn resolve(&self, label: &str) -> Option<String> {
        if let Some(entry) = self.entries.iter().find(|e| e.label == label) {
            return Some(entry.node_id.clone());
        }
        let parsed = parse_composite(label);
        trace!(label, resolved = ?parsed, "Label not cached, parsed composite form");
        parsed
    }
}

/// Extracts the node id from `<label> | <node_id> = <value>`.
///
/// Takes the text after the first `|`, cuts it at the last `=` and trims
/// spaces and tabs. Without any `=` the trimmed remainder is returned.
///
/// # Examples
///
/// ```
/// use ualink::client::parse_composite;
///
/// assert_eq!(
///     parse_composite("Device1 / Var1 | ns=2;s=Device1.Var1 = 42").as_deref(),
///     Some("ns=2;s=Device1.Var1")
/// );
/// assert_eq!(parse_composite("no separator"), None);
/// ```
pub fn parse_composite(label: &str) -> Option<String> {
    let (_, rest) = label.split_once('|')?;
    let id_part = match rest.rfind('=') {
        Some(pos) => &rest[..pos],
        None => rest,
    };
    let id = id_part.trim_matches(|c| c == ' ' || c == '\t');
    (!id.is_empty()).then(|| id.to_string())
}
