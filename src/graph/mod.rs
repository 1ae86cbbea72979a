// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! Editor graph model
//!
//! Nodes and connections owned by the editor core. Renderers (text, DOT,
//! Mermaid, JSON) are adapters over this model and never own graph state.

mod dag;
mod layout;
mod resolver;
mod selection;
mod store;
mod viewport;

pub use dag::DagBuilder;
pub use layout::{
    FixedHeight, Layout, LayoutEngine, LayoutSettings, NodeMeasure, PortRowEstimate, SettleReport,
};
pub use resolver::ConnectionResolver;
pub use selection::{DeletionReport, SelectionSet};
pub use store::GraphStore;
pub use viewport::{Bounds, ZoomTransform};

use indexmap::IndexMap;
use serde::Serialize;

use crate::pipeline::{input_node_id, output_node_id, PortSet};

/// What a node stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Pipeline-level input (outputs only)
    Input,
    /// Pipeline-level output (inputs only)
    Output,
    /// A catalog step
    Processing,
    /// A step running a nested pipeline
    Pipeline,
}

impl NodeKind {
    /// Processing and nested pipeline nodes share the layout columns
    pub fn is_processing(self) -> bool {
        matches!(self, Self::Processing | Self::Pipeline)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input => write!(f, "input"),
            Self::Output => write!(f, "output"),
            Self::Processing => write!(f, "processing"),
            Self::Pipeline => write!(f, "pipeline"),
        }
    }
}

/// Side of a node a socket sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Input,
    Output,
}

/// A named port on a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Socket {
    pub name: String,
    pub direction: PortDirection,
}

impl Socket {
    pub fn input(name: &str) -> Self {
        Self {
            name: name.to_string(),
            direction: PortDirection::Input,
        }
    }

    pub fn output(name: &str) -> Self {
        Self {
            name: name.to_string(),
            direction: PortDirection::Output,
        }
    }
}

/// Canvas position (top-left corner of the node)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A node in the editor graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    /// Stable id: the step id, or `inputs.<name>` / `outputs.<name>`
    pub id: String,
    pub display_name: String,
    pub kind: NodeKind,
    /// Catalog type for processing and pipeline nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_type: Option<String>,
    pub inputs: IndexMap<String, Socket>,
    pub outputs: IndexMap<String, Socket>,
    pub position: Position,
}

impl GraphNode {
    /// Create a node with sockets for every port in `ports`
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, kind: NodeKind, ports: &PortSet) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            kind,
            step_type: None,
            inputs: ports
                .inputs
                .iter()
                .map(|name| (name.clone(), Socket::input(name)))
                .collect(),
            outputs: ports
                .outputs
                .iter()
                .map(|name| (name.clone(), Socket::output(name)))
                .collect(),
            position: Position::default(),
        }
    }

    /// Node for a pipeline-level input
    pub fn global_input(name: &str) -> Self {
        let id = input_node_id(name);
        Self::new(id.clone(), id, NodeKind::Input, &PortSet::global_input(name))
    }

    /// Node for a pipeline-level output
    pub fn global_output(name: &str) -> Self {
        let id = output_node_id(name);
        Self::new(id.clone(), id, NodeKind::Output, &PortSet::global_output(name))
    }

    pub fn with_step_type(mut self, step_type: impl Into<String>) -> Self {
        self.step_type = Some(step_type.into());
        self
    }

    pub fn has_input(&self, port: &str) -> bool {
        self.inputs.contains_key(port)
    }

    pub fn has_output(&self, port: &str) -> bool {
        self.outputs.contains_key(port)
    }
}

/// Deterministic connection id: `<source>.<port>-><target>.<port>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(source: &str, source_port: &str, target: &str, target_port: &str) -> Self {
        Self(format!("{}.{}->{}.{}", source, source_port, target, target_port))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A directed edge from an output port to an input port
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub source: String,
    pub source_port: String,
    pub target: String,
    pub target_port: String,
}

impl Connection {
    pub fn new(source: &str, source_port: &str, target: &str, target_port: &str) -> Self {
        Self {
            id: ConnectionId::new(source, source_port, target, target_port),
            source: source.to_string(),
            source_port: source_port.to_string(),
            target: target.to_string(),
            target_port: target_port.to_string(),
        }
    }

    /// Whether `node` is either endpoint
    pub fn touches(&self, node: &str) -> bool {
        self.source == node || self.target == node
    }
}

/// Shorten a display name to `max` characters, appending `...`
pub fn truncate_name(name: &str, max: usize) -> String {
    if name.chars().count() > max {
        let head: String = name.chars().take(max).collect();
        format!("{}...", head)
    } else {
        name.to_string()
    }
}
