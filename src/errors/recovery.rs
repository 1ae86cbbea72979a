// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! Error recovery suggestions
//!
//! Provides actionable suggestions for recovering from load diagnostics.

use super::PipegraphError;

/// A recovery suggestion with concrete steps
#[derive(Debug, Clone)]
pub struct RecoverySuggestion {
    /// Brief description of what to do
    pub action: String,
    /// Detailed steps
    pub steps: Vec<String>,
    /// Commands to run
    pub commands: Vec<String>,
}

impl RecoverySuggestion {
    /// Build a suggestion for an error, if one applies
    pub fn for_error(error: &PipegraphError) -> Option<Self> {
        match error {
            PipegraphError::UnknownStepType { step, step_type } => {
                Some(Self::register_step_type(step, step_type))
            }
            PipegraphError::SocketMismatch {
                target_node,
                target_port,
                ..
            } => Some(Self::fix_port_name(target_node, target_port)),
            PipegraphError::UnresolvedReference { reference, .. } => {
                Some(Self::fix_reference(reference))
            }
            PipegraphError::CircularDependency { nodes } => {
                Some(Self::fix_circular_dependency(nodes))
            }
            PipegraphError::DataFetch { .. } | PipegraphError::Http { .. } => {
                Some(Self::check_service())
            }
            _ => None,
        }
    }

    /// Suggest registering a missing step type
    pub fn register_step_type(step: &str, step_type: &str) -> Self {
        Self {
            action: format!("Register step type '{}'", step_type),
            steps: vec![
                format!("Step '{}' was left out of the graph", step),
                "The step catalog has no entry for its type".into(),
                "Check the spelling of 'type' or add the step to the catalog".into(),
            ],
            commands: vec![
                "# List registered step types:".into(),
                "pipegraph catalog".into(),
            ],
        }
    }

    /// Suggest fixing a port name
    pub fn fix_port_name(node: &str, port: &str) -> Self {
        Self {
            action: format!("Fix port '{}' on '{}'", port, node),
            steps: vec![
                "Input names in a step must match the ports its catalog entry declares".into(),
                "Source expressions must name a declared output port".into(),
            ],
            commands: vec!["pipegraph catalog".into()],
        }
    }

    /// Suggest fixing a dangling reference
    pub fn fix_reference(reference: &str) -> Self {
        Self {
            action: format!("Fix reference '{}'", reference),
            steps: vec![
                "The referenced step or pipeline input does not exist".into(),
                "Referenced steps must themselves resolve against the catalog".into(),
            ],
            commands: vec![],
        }
    }

    /// Suggest fixing a circular dependency
    pub fn fix_circular_dependency(nodes: &[String]) -> Self {
        Self {
            action: "Remove circular dependency".into(),
            steps: vec![
                format!("Detected cycle: {}", nodes.join(" → ")),
                "Review the step inputs".into(),
            ],
            commands: vec![
                "# Visualize the pipeline:".into(),
                "pipegraph graph <id> --format mermaid".into(),
            ],
        }
    }

    /// Suggest checking the pipeline service
    pub fn check_service() -> Self {
        Self {
            action: "Check the pipeline service".into(),
            steps: vec![
                "The editor keeps its previous state when a fetch fails".into(),
                "Point --api at a running service, or use --dir with local files".into(),
            ],
            commands: vec!["PIPEGRAPH_API_URL=http://localhost:4003 pipegraph list".into()],
        }
    }
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "→ {}", self.action)?;

        for step in &self.steps {
            writeln!(f, "  {}", step)?;
        }

        if !self.commands.is_empty() {
            writeln!(f)?;
            for cmd in &self.commands {
                writeln!(f, "  {}", cmd)?;
            }
        }

        Ok(())
    }
}
