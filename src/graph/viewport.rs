// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! Viewport fitting for auto-zoom

use serde::{Deserialize, Serialize};

use super::{GraphStore, NodeMeasure};

/// Axis-aligned box around node rectangles
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Box around every node in `store`, or `None` for an empty graph
    pub fn from_store(
        store: &GraphStore,
        node_width: f64,
        default_height: f64,
        measure: &dyn NodeMeasure,
    ) -> Option<Self> {
        store.nodes().fold(None, |acc, node| {
            let height = measure
                .node_height(node)
                .filter(|h| h.is_finite() && *h > 0.0)
                .unwrap_or(default_height);
            let rect = Bounds {
                min_x: node.position.x,
                min_y: node.position.y,
                max_x: node.position.x + node_width,
                max_y: node.position.y + height,
            };
            Some(match acc {
                Some(b) => b.union(&rect),
                None => rect,
            })
        })
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

/// Scale and translation applied to the canvas: `screen = k * canvas + (x, y)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomTransform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self {
            k: 1.0,
            x: 0.0,
            y: 0.0,
        }
    }
}

impl ZoomTransform {
    /// Fit `bounds` inside a `width` x `height` viewport
    ///
    /// `padding` is the fraction of the viewport left empty around the box.
    /// The scale never exceeds 1.0, so small graphs are centered, not enlarged.
    pub fn fit(bounds: &Bounds, width: f64, height: f64, padding: f64) -> Self {
        let usable = (1.0 - padding.clamp(0.0, 0.9)).max(0.1);
        let fit_w = if bounds.width() > 0.0 {
            width * usable / bounds.width()
        } else {
            1.0
        };
        let fit_h = if bounds.height() > 0.0 {
            height * usable / bounds.height()
        } else {
            1.0
        };

        let k = fit_w.min(fit_h).min(1.0);
        let (cx, cy) = bounds.center();

        Self {
            k,
            x: width / 2.0 - k * cx,
            y: height / 2.0 - k * cy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{FixedHeight, GraphNode, Position};

    fn bounds(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Bounds {
        Bounds {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    #[test]
    fn test_bounds_from_store() {
        let mut store = GraphStore::new();
        store.add_node(GraphNode::global_input("doc")).unwrap();
        store.add_node(GraphNode::global_output("out")).unwrap();
        store.set_position("inputs.doc", Position::new(-250.0, -50.0));
        store.set_position("outputs.out", Position::new(250.0, 0.0));

        let b = Bounds::from_store(&store, 180.0, 250.0, &FixedHeight(100.0)).unwrap();
        assert_eq!(b, bounds(-250.0, -50.0, 430.0, 100.0));
    }

    #[test]
    fn test_empty_store_has_no_bounds() {
        assert!(Bounds::from_store(&GraphStore::new(), 180.0, 250.0, &FixedHeight(1.0)).is_none());
    }

    #[test]
    fn test_fit_shrinks_large_graph() {
        let b = bounds(0.0, 0.0, 2000.0, 500.0);
        let t = ZoomTransform::fit(&b, 1000.0, 1000.0, 0.0);
        assert_eq!(t.k, 0.5);
        // center (1000, 250) lands on (500, 500)
        assert_eq!(t.x, 0.0);
        assert_eq!(t.y, 375.0);
    }

    #[test]
    fn test_fit_never_zooms_in() {
        let b = bounds(-100.0, -100.0, 100.0, 100.0);
        let t = ZoomTransform::fit(&b, 1000.0, 800.0, 0.1);
        assert_eq!(t.k, 1.0);
        assert_eq!(t.x, 500.0);
        assert_eq!(t.y, 400.0);
    }
}
