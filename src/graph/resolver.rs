// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! Connection resolver
//!
//! Turns a [`PipelineDefinition`] into graph nodes and connections. Nodes
//! are created in a first pass and wired in a second, so a step may
//! reference the output of a step declared after it. Anything that does
//! not resolve is recorded as a diagnostic and left out of the graph.

use super::{truncate_name, Connection, DagBuilder, GraphNode, GraphStore, NodeKind};
use crate::errors::{Diagnostics, PipegraphError};
use crate::pipeline::{
    output_node_id, PipelineDefinition, PortSet, SourceRef, StepCatalog, StepDefinition,
    NESTED_PIPELINE_TYPE,
};

/// Default display name length before truncation
pub const DEFAULT_MAX_NAME_LENGTH: usize = 15;

/// Builds graph records from pipeline definitions
pub struct ConnectionResolver<'a> {
    catalog: &'a StepCatalog,
    max_name_length: usize,
}

impl<'a> ConnectionResolver<'a> {
    pub fn new(catalog: &'a StepCatalog) -> Self {
        Self {
            catalog,
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
        }
    }

    pub fn with_max_name_length(mut self, max: usize) -> Self {
        self.max_name_length = max;
        self
    }

    /// Clear `store` and rebuild it from `pipeline`
    pub fn resolve(&self, pipeline: &PipelineDefinition, store: &mut GraphStore) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        store.clear();

        for name in pipeline.inputs.keys() {
            self.add_node(store, GraphNode::global_input(name), &mut diagnostics);
        }

        for name in pipeline.outputs.keys() {
            self.add_node(store, GraphNode::global_output(name), &mut diagnostics);
        }

        // First pass: one node per resolvable step
        let mut placed = Vec::with_capacity(pipeline.steps.len());
        for step in &pipeline.steps {
            let added = match self.step_node(step) {
                Ok(node) => self.add_node(store, node, &mut diagnostics),
                Err(e) => {
                    diagnostics.push(e);
                    false
                }
            };
            placed.push(added);
        }

        // Second pass: wire step inputs
        for (step, _) in pipeline.steps.iter().zip(&placed).filter(|(_, p)| **p) {
            for (port, expression) in &step.inputs {
                self.wire(store, expression, &step.id, port, &mut diagnostics);
            }
        }

        for (name, expression) in &pipeline.outputs {
            let node_id = output_node_id(name);
            if store.contains_node(&node_id) {
                self.wire(store, expression, &node_id, name, &mut diagnostics);
            }
        }

        for cycle in DagBuilder::from_store(store).cycles() {
            diagnostics.push(PipegraphError::CircularDependency { nodes: cycle });
        }

        tracing::info!(
            "Resolved pipeline '{}': {} node(s), {} connection(s), {} diagnostic(s)",
            pipeline.id,
            store.node_count(),
            store.connection_count(),
            diagnostics.len()
        );

        diagnostics
    }

    /// Build the node for a step, or explain why it has none
    pub fn step_node(&self, step: &StepDefinition) -> Result<GraphNode, PipegraphError> {
        let step_type = step.step_type();
        let entry = self.catalog.get(step_type);

        let (kind, ports, name) = if step.is_nested_pipeline() {
            match (&step.definition, entry) {
                (Some(def), _) => {
                    let name = if def.name.is_empty() { def.id.clone() } else { def.name.clone() };
                    (NodeKind::Pipeline, PortSet::nested(def), name)
                }
                (None, Some(entry)) => (NodeKind::Pipeline, entry.ports(), entry.display_name().to_string()),
                (None, None) => return Err(self.unknown_type(step)),
            }
        } else {
            match entry {
                Some(entry) => (NodeKind::Processing, entry.ports(), entry.display_name().to_string()),
                None => return Err(self.unknown_type(step)),
            }
        };

        Ok(GraphNode::new(
            step.id.clone(),
            truncate_name(&name, self.max_name_length),
            kind,
            &ports,
        )
        .with_step_type(step_type))
    }

    fn unknown_type(&self, step: &StepDefinition) -> PipegraphError {
        PipegraphError::UnknownStepType {
            step: step.id.clone(),
            step_type: if step.is_nested_pipeline() {
                NESTED_PIPELINE_TYPE.to_string()
            } else {
                step.step_type().to_string()
            },
        }
    }

    fn add_node(&self, store: &mut GraphStore, node: GraphNode, diagnostics: &mut Diagnostics) -> bool {
        match store.add_node(node) {
            Ok(()) => true,
            Err(e) => {
                diagnostics.push(e);
                false
            }
        }
    }

    /// Connect the source named by `expression` to `target.target_port`
    fn wire(
        &self,
        store: &mut GraphStore,
        expression: &str,
        target: &str,
        target_port: &str,
        diagnostics: &mut Diagnostics,
    ) {
        let Some(source) = SourceRef::parse(expression) else {
            diagnostics.push(PipegraphError::MalformedExpression {
                target: format!("{}.{}", target, target_port),
                expression: expression.to_string(),
            });
            return;
        };

        let source_id = source.node_id();
        if !store.contains_node(&source_id) {
            diagnostics.push(PipegraphError::UnresolvedReference {
                target: format!("{}.{}", target, target_port),
                reference: expression.to_string(),
            });
            return;
        }

        let connection = Connection::new(&source_id, source.port(), target, target_port);
        if let Err(e) = store.add_connection(connection) {
            diagnostics.push(e);
        }
    }
}
