// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! Graph store
//!
//! Owns the nodes and connections of the loaded pipeline and keeps them
//! consistent: every connection references live nodes and declared ports,
//! and every input port has at most one incoming connection.

use indexmap::IndexMap;

use super::{Connection, ConnectionId, GraphNode, Position};
use crate::errors::{PipegraphError, PipegraphResult};

/// Canonical node and connection records, in insertion order
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    nodes: IndexMap<String, GraphNode>,
    connections: IndexMap<ConnectionId, Connection>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node; fails if the id is taken
    pub fn add_node(&mut self, node: GraphNode) -> PipegraphResult<()> {
        if self.nodes.contains_key(&node.id) {
            return Err(PipegraphError::DuplicateNode { id: node.id });
        }
        tracing::debug!("Adding {} node '{}'", node.kind, node.id);
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Remove a node and every connection touching it
    ///
    /// Removing an unknown id is a no-op and returns `None`.
    pub fn remove_node(&mut self, id: &str) -> Option<(GraphNode, Vec<Connection>)> {
        if !self.nodes.contains_key(id) {
            return None;
        }

        let incident: Vec<ConnectionId> = self
            .connections
            .values()
            .filter(|c| c.touches(id))
            .map(|c| c.id.clone())
            .collect();

        let removed: Vec<Connection> = incident
            .iter()
            .filter_map(|cid| self.connections.shift_remove(cid))
            .collect();

        let node = self.nodes.shift_remove(id)?;
        tracing::debug!(
            "Removed node '{}' and {} connection(s)",
            id,
            removed.len()
        );
        Some((node, removed))
    }

    /// Insert a connection after checking both endpoints and ports
    pub fn add_connection(&mut self, connection: Connection) -> PipegraphResult<ConnectionId> {
        let source = self
            .nodes
            .get(&connection.source)
            .ok_or_else(|| PipegraphError::UnknownNode {
                id: connection.source.clone(),
            })?;
        let target = self
            .nodes
            .get(&connection.target)
            .ok_or_else(|| PipegraphError::UnknownNode {
                id: connection.target.clone(),
            })?;

        if !source.has_output(&connection.source_port) {
            return Err(PipegraphError::socket_mismatch(
                &connection.source,
                &connection.source_port,
                &connection.target,
                &connection.target_port,
                format!(
                    "'{}' has no output '{}'",
                    connection.source, connection.source_port
                ),
            ));
        }

        if !target.has_input(&connection.target_port) {
            return Err(PipegraphError::socket_mismatch(
                &connection.source,
                &connection.source_port,
                &connection.target,
                &connection.target_port,
                format!(
                    "'{}' has no input '{}'",
                    connection.target, connection.target_port
                ),
            ));
        }

        if self.connections.contains_key(&connection.id) {
            return Err(PipegraphError::DuplicateConnection {
                id: connection.id.to_string(),
            });
        }

        if self
            .input_connection(&connection.target, &connection.target_port)
            .is_some()
        {
            return Err(PipegraphError::PortAlreadyConnected {
                node: connection.target.clone(),
                port: connection.target_port.clone(),
            });
        }

        let id = connection.id.clone();
        tracing::debug!("Adding connection {}", id);
        self.connections.insert(id.clone(), connection);
        Ok(id)
    }

    /// Shorthand for [`add_connection`](Self::add_connection)
    pub fn connect(
        &mut self,
        source: &str,
        source_port: &str,
        target: &str,
        target_port: &str,
    ) -> PipegraphResult<ConnectionId> {
        self.add_connection(Connection::new(source, source_port, target, target_port))
    }

    /// Remove a specific connection
    pub fn remove_connection(&mut self, id: &ConnectionId) -> PipegraphResult<Connection> {
        self.connections
            .shift_remove(id)
            .ok_or_else(|| PipegraphError::UnknownConnection { id: id.to_string() })
    }

    /// Reset to an empty graph
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.connections.clear();
    }

    pub fn get_node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get_connection(&self, id: &ConnectionId) -> Option<&Connection> {
        self.connections.get(id)
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> + '_ {
        self.nodes.values()
    }

    /// Connections in insertion order
    pub fn connections(&self) -> impl Iterator<Item = &Connection> + '_ {
        self.connections.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Connections arriving at `node`
    pub fn incoming<'a>(&'a self, node: &'a str) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.values().filter(move |c| c.target == node)
    }

    /// Connections leaving `node`
    pub fn outgoing<'a>(&'a self, node: &'a str) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.values().filter(move |c| c.source == node)
    }

    /// The connection feeding an input port, if any
    pub fn input_connection(&self, node: &str, port: &str) -> Option<&Connection> {
        self.connections
            .values()
            .find(|c| c.target == node && c.target_port == port)
    }

    /// Move a node; returns false if it does not exist
    pub fn set_position(&mut self, id: &str, position: Position) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }
}
