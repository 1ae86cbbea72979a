// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! DAG view of the editor graph
//!
//! Mirrors the store's nodes and connections into a petgraph graph for
//! cycle detection, dependency queries and the text/DOT/Mermaid renderers.

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

use super::{GraphStore, NodeKind};
use crate::errors::PipegraphError;

/// Node payload in the petgraph mirror
#[derive(Debug, Clone)]
struct DagNode {
    id: String,
    label: String,
    kind: NodeKind,
}

/// Edge payload: the ports a connection joins
#[derive(Debug, Clone)]
struct DagEdge {
    source_port: String,
    target_port: String,
}

/// Petgraph mirror of a [`GraphStore`]
pub struct DagBuilder {
    graph: DiGraph<DagNode, DagEdge>,
    id_to_index: HashMap<String, NodeIndex>,
}

impl DagBuilder {
    /// Build the mirror from the store's current contents
    pub fn from_store(store: &GraphStore) -> Self {
        let mut graph = DiGraph::new();
        let mut id_to_index = HashMap::new();

        for node in store.nodes() {
            let index = graph.add_node(DagNode {
                id: node.id.clone(),
                label: node.display_name.clone(),
                kind: node.kind,
            });
            id_to_index.insert(node.id.clone(), index);
        }

        for conn in store.connections() {
            // The store guarantees both endpoints exist
            if let (Some(&from), Some(&to)) =
                (id_to_index.get(&conn.source), id_to_index.get(&conn.target))
            {
                graph.add_edge(
                    from,
                    to,
                    DagEdge {
                        source_port: conn.source_port.clone(),
                        target_port: conn.target_port.clone(),
                    },
                );
            }
        }

        Self { graph, id_to_index }
    }

    /// Strongly connected components that form cycles, members in store order
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut cycles: Vec<Vec<String>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0])
            })
            .map(|mut scc| {
                scc.sort();
                scc.into_iter().map(|n| self.graph[n].id.clone()).collect()
            })
            .collect();
        cycles.sort();
        cycles
    }

    pub fn is_acyclic(&self) -> bool {
        toposort(&self.graph, None).is_ok()
    }

    /// Node ids in dependency order
    pub fn topological_order(&self) -> Result<Vec<String>, PipegraphError> {
        toposort(&self.graph, None)
            .map(|nodes| nodes.into_iter().map(|n| self.graph[n].id.clone()).collect())
            .map_err(|_| PipegraphError::CircularDependency {
                nodes: self.cycles().into_iter().next().unwrap_or_default(),
            })
    }

    /// Direct upstream nodes of `id`
    pub fn dependencies(&self, id: &str) -> Option<Vec<String>> {
        let node = self.id_to_index.get(id)?;
        let mut deps: Vec<String> = self
            .graph
            .neighbors_directed(*node, petgraph::Direction::Incoming)
            .map(|n| self.graph[n].id.clone())
            .collect();
        deps.sort();
        deps.dedup();
        Some(deps)
    }

    /// Direct downstream nodes of `id`
    pub fn dependents(&self, id: &str) -> Option<Vec<String>> {
        let node = self.id_to_index.get(id)?;
        let mut deps: Vec<String> = self
            .graph
            .neighbors_directed(*node, petgraph::Direction::Outgoing)
            .map(|n| self.graph[n].id.clone())
            .collect();
        deps.sort();
        deps.dedup();
        Some(deps)
    }

    /// Check if `a` depends (directly or transitively) on `b`
    pub fn depends_on(&self, a: &str, b: &str) -> bool {
        let (Some(node_a), Some(node_b)) = (self.id_to_index.get(a), self.id_to_index.get(b)) else {
            return false;
        };
        a != b && petgraph::algo::has_path_connecting(&self.graph, *node_b, *node_a, None)
    }

    /// Generate a Mermaid flowchart
    pub fn to_mermaid(&self) -> String {
        let mut out = String::from("graph LR\n");

        for index in self.graph.node_indices() {
            let node = &self.graph[index];
            let key = mermaid_key(&node.id);
            let label = node.label.replace('"', "'");
            let shape = match node.kind {
                NodeKind::Input => format!("{}([\"{}\"])", key, label),
                NodeKind::Output => format!("{}[[\"{}\"]]", key, label),
                NodeKind::Processing => format!("{}[\"{}\"]", key, label),
                NodeKind::Pipeline => format!("{}{{{{\"{}\"}}}}", key, label),
            };
            out.push_str(&format!("    {}\n", shape));
        }

        for edge in self.graph.edge_indices() {
            if let Some((from, to)) = self.graph.edge_endpoints(edge) {
                let ports = &self.graph[edge];
                out.push_str(&format!(
                    "    {} -->|{}:{}| {}\n",
                    mermaid_key(&self.graph[from].id),
                    ports.source_port,
                    ports.target_port,
                    mermaid_key(&self.graph[to].id)
                ));
            }
        }

        out
    }

    /// Generate a DOT digraph
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph pipeline {\n");
        out.push_str("    rankdir=LR;\n");
        out.push_str("    node [shape=box, style=rounded];\n\n");

        for index in self.graph.node_indices() {
            let node = &self.graph[index];
            let shape = match node.kind {
                NodeKind::Input => "invhouse",
                NodeKind::Output => "house",
                NodeKind::Processing => "box",
                NodeKind::Pipeline => "box3d",
            };
            out.push_str(&format!(
                "    \"{}\" [label=\"{}\", shape={}];\n",
                node.id, node.label, shape
            ));
        }

        out.push('\n');

        for edge in self.graph.edge_indices() {
            if let Some((from, to)) = self.graph.edge_endpoints(edge) {
                let ports = &self.graph[edge];
                out.push_str(&format!(
                    "    \"{}\" -> \"{}\" [label=\"{} → {}\"];\n",
                    self.graph[from].id, self.graph[to].id, ports.source_port, ports.target_port
                ));
            }
        }

        out.push_str("}\n");
        out
    }

    /// Generate a text listing in dependency order
    pub fn to_text(&self) -> Result<String, PipegraphError> {
        let order = self.topological_order()?;
        let mut out = String::new();

        for (i, id) in order.iter().enumerate() {
            let node = &self.graph[self.id_to_index[id]];
            out.push_str(&format!("{}. {} ({})", i + 1, node.id, node.kind));

            let deps = self.dependencies(id).unwrap_or_default();
            if !deps.is_empty() {
                out.push_str(&format!(" [depends: {}]", deps.join(", ")));
            }

            out.push('\n');
        }

        Ok(out)
    }
}

/// Mermaid node ids cannot contain dots
fn mermaid_key(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}
