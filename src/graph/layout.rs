// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! Auto-layout
//!
//! Assigns every node a canvas position so the graph reads left to right by
//! dependency depth:
//!
//! - processing nodes are placed in columns by BFS depth from the root nodes
//! - pipeline inputs sit in one column left of depth 0
//! - pipeline outputs sit in one column right of the deepest column
//!
//! Each column is stacked vertically around `y = 0` using measured node
//! heights, falling back to a default height when a node cannot be measured.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use super::{GraphNode, GraphStore, NodeKind, Position};

/// Source of rendered node heights
pub trait NodeMeasure {
    /// Height of `node`, or `None` if it cannot be measured yet
    fn node_height(&self, node: &GraphNode) -> Option<f64>;
}

impl<F> NodeMeasure for F
where
    F: Fn(&GraphNode) -> Option<f64>,
{
    fn node_height(&self, node: &GraphNode) -> Option<f64> {
        self(node)
    }
}

/// Every node has the same height
#[derive(Debug, Clone, Copy)]
pub struct FixedHeight(pub f64);

impl NodeMeasure for FixedHeight {
    fn node_height(&self, _node: &GraphNode) -> Option<f64> {
        Some(self.0)
    }
}

/// Height estimated from a title bar plus one row per socket
#[derive(Debug, Clone, Copy)]
pub struct PortRowEstimate {
    pub header: f64,
    pub row: f64,
}

impl Default for PortRowEstimate {
    fn default() -> Self {
        Self {
            header: 40.0,
            row: 36.0,
        }
    }
}

impl NodeMeasure for PortRowEstimate {
    fn node_height(&self, node: &GraphNode) -> Option<f64> {
        let rows = node.inputs.len() + node.outputs.len();
        Some(self.header + self.row * rows as f64)
    }
}

/// Layout geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Horizontal distance between depth columns
    pub column_width: f64,
    /// Vertical gap between stacked nodes
    pub margin: f64,
    /// Height used when a node cannot be measured
    pub default_node_height: f64,
    /// Node width, for bounding boxes
    pub node_width: f64,
    /// Upper bound on re-layout passes while heights settle
    pub max_settle_passes: usize,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            column_width: 250.0,
            margin: 50.0,
            default_node_height: 250.0,
            node_width: 180.0,
            max_settle_passes: 5,
        }
    }
}

/// Result of one layout pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    /// Position per node, in store order
    pub positions: IndexMap<String, Position>,
    /// Depth per processing node
    pub depths: IndexMap<String, usize>,
    pub max_depth: usize,
    /// Processing nodes no root could reach; placed at depth 0
    pub unreached: Vec<String>,
    /// True if depth relaxation hit the node-count bound (graph has a cycle)
    pub cycle_bounded: bool,
}

impl Layout {
    pub fn position(&self, id: &str) -> Option<Position> {
        self.positions.get(id).copied()
    }

    pub fn depth(&self, id: &str) -> Option<usize> {
        self.depths.get(id).copied()
    }
}

/// Outcome of [`LayoutEngine::settle`]
#[derive(Debug, Clone)]
pub struct SettleReport {
    pub layout: Layout,
    pub passes: usize,
    pub converged: bool,
}

/// Computes and applies node positions
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    settings: LayoutSettings,
}

impl LayoutEngine {
    pub fn new(settings: LayoutSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    /// Compute positions without touching the store
    pub fn compute(&self, store: &GraphStore, measure: &dyn NodeMeasure) -> Layout {
        let mut layout = Layout::default();
        self.assign_depths(store, &mut layout);

        let mut columns: BTreeMap<usize, Vec<&GraphNode>> = BTreeMap::new();
        let mut inputs = Vec::new();
        let mut outputs = Vec::new();

        for node in store.nodes() {
            match node.kind {
                NodeKind::Input => inputs.push(node),
                NodeKind::Output => outputs.push(node),
                NodeKind::Processing | NodeKind::Pipeline => {
                    let depth = layout.depths.get(&node.id).copied().unwrap_or(0);
                    columns.entry(depth).or_default().push(node);
                }
            }
        }

        let mut placed: IndexMap<String, Position> = IndexMap::new();

        for (depth, column) in &columns {
            let x = *depth as f64 * self.settings.column_width;
            self.stack(column, x, measure, &mut placed);
        }

        self.stack(&inputs, -self.settings.column_width, measure, &mut placed);

        let outputs_x = (layout.max_depth + 1) as f64 * self.settings.column_width;
        self.stack(&outputs, outputs_x, measure, &mut placed);

        // Report in store order
        layout.positions = store
            .nodes()
            .filter_map(|n| placed.get(&n.id).map(|p| (n.id.clone(), *p)))
            .collect();

        tracing::debug!(
            "Computed layout: {} node(s), max depth {}, {} unreached",
            layout.positions.len(),
            layout.max_depth,
            layout.unreached.len()
        );

        layout
    }

    /// Compute positions and write them into the store
    pub fn arrange(&self, store: &mut GraphStore, measure: &dyn NodeMeasure) -> Layout {
        let layout = self.compute(store, measure);
        for (id, position) in &layout.positions {
            store.set_position(id, *position);
        }
        layout
    }

    /// Re-arrange until positions stop changing, up to `max_settle_passes`
    pub fn settle(&self, store: &mut GraphStore, measure: &dyn NodeMeasure) -> SettleReport {
        let mut layout = self.arrange(store, measure);
        let mut passes = 1;

        while passes < self.settings.max_settle_passes.max(1) {
            let next = self.arrange(store, measure);
            passes += 1;
            if next.positions == layout.positions {
                return SettleReport {
                    layout: next,
                    passes,
                    converged: true,
                };
            }
            layout = next;
        }

        let converged = self.compute(store, measure).positions == layout.positions;
        if !converged {
            tracing::warn!("Layout did not settle after {} pass(es)", passes);
        }
        SettleReport {
            layout,
            passes,
            converged,
        }
    }

    fn assign_depths(&self, store: &GraphStore, layout: &mut Layout) {
        let processing: Vec<&GraphNode> = store.nodes().filter(|n| n.kind.is_processing()).collect();
        let bound = processing.len().saturating_sub(1);

        let is_processing = |id: &str| {
            store
                .get_node(id)
                .map(|n| n.kind.is_processing())
                .unwrap_or(false)
        };

        let mut depths: IndexMap<String, usize> = IndexMap::new();
        let mut queue = VecDeque::new();

        // Roots: every incoming connection comes from a pipeline input
        for node in &processing {
            let is_root = store.incoming(&node.id).all(|c| {
                store
                    .get_node(&c.source)
                    .map(|s| s.kind == NodeKind::Input)
                    .unwrap_or(false)
            });
            if is_root {
                depths.insert(node.id.clone(), 0);
                queue.push_back(node.id.clone());
            }
        }

        while let Some(id) = queue.pop_front() {
            let depth = depths.get(&id).copied().unwrap_or(0);
            for conn in store.outgoing(&id) {
                if !is_processing(&conn.target) {
                    continue;
                }
                let candidate = depth + 1;
                if candidate > bound {
                    layout.cycle_bounded = true;
                    continue;
                }
                let current = depths.get(&conn.target).copied();
                if current.map_or(true, |d| candidate > d) {
                    depths.insert(conn.target.clone(), candidate);
                    queue.push_back(conn.target.clone());
                }
            }
        }

        for node in &processing {
            match depths.get(&node.id) {
                Some(depth) => {
                    layout.depths.insert(node.id.clone(), *depth);
                }
                None => {
                    tracing::warn!("Node '{}' is not reachable from any root; placing at depth 0", node.id);
                    layout.unreached.push(node.id.clone());
                    layout.depths.insert(node.id.clone(), 0);
                }
            }
        }

        layout.max_depth = layout.depths.values().copied().max().unwrap_or(0);
    }

    fn stack(
        &self,
        column: &[&GraphNode],
        x: f64,
        measure: &dyn NodeMeasure,
        placed: &mut IndexMap<String, Position>,
    ) {
        if column.is_empty() {
            return;
        }

        let heights: Vec<f64> = column
            .iter()
            .map(|n| {
                measure
                    .node_height(n)
                    .filter(|h| h.is_finite() && *h > 0.0)
                    .unwrap_or(self.settings.default_node_height)
            })
            .collect();

        let total: f64 =
            heights.iter().sum::<f64>() + self.settings.margin * (column.len() - 1) as f64;
        let mut y = -total / 2.0;

        for (node, height) in column.iter().zip(&heights) {
            placed.insert(node.id.clone(), Position::new(x, y));
            y += height + self.settings.margin;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PortSet;

    fn step(id: &str) -> GraphNode {
        let ports = PortSet {
            inputs: vec!["a".into(), "b".into()],
            outputs: vec!["out".into()],
        };
        GraphNode::new(id, id, NodeKind::Processing, &ports)
    }

    fn engine() -> LayoutEngine {
        LayoutEngine::default()
    }

    fn summarize_graph() -> GraphStore {
        let mut store = GraphStore::new();
        store.add_node(GraphNode::global_input("doc")).unwrap();
        store.add_node(GraphNode::global_output("summary")).unwrap();
        store.add_node(step("step1")).unwrap();
        store.connect("inputs.doc", "doc", "step1", "a").unwrap();
        store.connect("step1", "out", "outputs.summary", "summary").unwrap();
        store
    }

    #[test]
    fn test_summarize_scenario_columns() {
        let layout = engine().compute(&summarize_graph(), &FixedHeight(250.0));

        assert_eq!(layout.depth("step1"), Some(0));
        assert_eq!(layout.position("inputs.doc").unwrap().x, -250.0);
        assert_eq!(layout.position("step1").unwrap().x, 0.0);
        assert_eq!(layout.position("outputs.summary").unwrap().x, 250.0);
        assert!(layout.unreached.is_empty());
    }

    #[test]
    fn test_depth_is_longest_path() {
        // a -> b -> c and a -> c: c must sit right of b
        let mut store = GraphStore::new();
        for id in ["a", "b", "c"] {
            store.add_node(step(id)).unwrap();
        }
        store.connect("a", "out", "b", "a").unwrap();
        store.connect("b", "out", "c", "a").unwrap();
        store.connect("a", "out", "c", "b").unwrap();

        let layout = engine().compute(&store, &FixedHeight(100.0));
        assert_eq!(layout.depth("a"), Some(0));
        assert_eq!(layout.depth("b"), Some(1));
        assert_eq!(layout.depth("c"), Some(2));
        assert_eq!(layout.max_depth, 2);

        for conn in store.connections() {
            assert!(layout.depth(&conn.target).unwrap() >= layout.depth(&conn.source).unwrap() + 1);
        }
    }

    #[test]
    fn test_column_is_centered() {
        let mut store = GraphStore::new();
        store.add_node(step("a")).unwrap();
        store.add_node(step("b")).unwrap();

        let layout = engine().compute(&store, &FixedHeight(100.0));
        // 100 + 50 + 100 = 250 tall, starting at -125
        assert_eq!(layout.position("a").unwrap(), Position::new(0.0, -125.0));
        assert_eq!(layout.position("b").unwrap(), Position::new(0.0, 25.0));
    }

    #[test]
    fn test_unmeasured_nodes_use_default_height() {
        let mut store = GraphStore::new();
        store.add_node(step("a")).unwrap();
        store.add_node(step("b")).unwrap();

        let measure = |node: &GraphNode| if node.id == "a" { Some(50.0) } else { None };
        let layout = engine().compute(&store, &measure);
        // 50 + 50 + 250 = 350 tall
        assert_eq!(layout.position("a").unwrap().y, -175.0);
        assert_eq!(layout.position("b").unwrap().y, -75.0);
    }

    #[test]
    fn test_cycle_without_root_is_unreached() {
        let mut store = GraphStore::new();
        store.add_node(step("a")).unwrap();
        store.add_node(step("b")).unwrap();
        store.connect("a", "out", "b", "a").unwrap();
        store.connect("b", "out", "a", "a").unwrap();

        let layout = engine().compute(&store, &FixedHeight(100.0));
        assert_eq!(layout.unreached, vec!["a", "b"]);
        assert_eq!(layout.depth("a"), Some(0));
    }

    #[test]
    fn test_cycle_below_root_terminates() {
        let mut store = GraphStore::new();
        for id in ["r", "a", "b"] {
            store.add_node(step(id)).unwrap();
        }
        store.connect("r", "out", "a", "a").unwrap();
        store.connect("a", "out", "b", "a").unwrap();
        store.connect("b", "out", "a", "b").unwrap();

        let layout = engine().compute(&store, &FixedHeight(100.0));
        assert!(layout.cycle_bounded);
        assert!(layout.max_depth <= 2);
    }

    #[test]
    fn test_layout_is_deterministic() {
        let store = summarize_graph();
        let measure = PortRowEstimate::default();
        assert_eq!(engine().compute(&store, &measure), engine().compute(&store, &measure));
    }

    #[test]
    fn test_arrange_and_settle_apply_positions() {
        let mut store = summarize_graph();
        let report = engine().settle(&mut store, &FixedHeight(120.0));

        assert!(report.converged);
        assert_eq!(report.passes, 2);
        assert_eq!(
            store.get_node("outputs.summary").unwrap().position,
            report.layout.position("outputs.summary").unwrap()
        );
    }

    #[test]
    fn test_empty_graph() {
        let layout = engine().compute(&GraphStore::new(), &FixedHeight(100.0));
        assert!(layout.positions.is_empty());
        assert_eq!(layout.max_depth, 0);
    }
}
