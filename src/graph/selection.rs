// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! Node selection and cascading deletion

use indexmap::IndexSet;
use serde::Serialize;

use super::{Connection, GraphNode, GraphStore};
use crate::errors::{PipegraphError, PipegraphResult};

/// Currently selected node ids, in selection order
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    nodes: IndexSet<String>,
}

/// What a deletion removed from the store
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeletionReport {
    pub nodes: Vec<GraphNode>,
    pub connections: Vec<Connection>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a node, replacing the selection unless `accumulate` is set
    pub fn select(&mut self, id: impl Into<String>, accumulate: bool) {
        if !accumulate {
            self.nodes.clear();
        }
        self.nodes.insert(id.into());
    }

    /// Returns true if the node was selected
    pub fn deselect(&mut self, id: &str) -> bool {
        self.nodes.shift_remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains(id)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    /// Drop ids that no longer exist in `store`
    pub fn retain_existing(&mut self, store: &GraphStore) {
        self.nodes.retain(|id| store.contains_node(id));
    }

    /// Remove every selected node and its connections, then clear the selection
    pub fn delete_selected(&mut self, store: &mut GraphStore) -> PipegraphResult<DeletionReport> {
        if self.nodes.is_empty() {
            return Err(PipegraphError::EmptySelection);
        }

        let mut report = DeletionReport::default();
        for id in self.nodes.drain(..) {
            if let Some((node, connections)) = store.remove_node(&id) {
                tracing::debug!("Deleted selected node '{}'", id);
                report.nodes.push(node);
                report.connections.extend(connections);
            }
        }

        Ok(report)
    }
}
