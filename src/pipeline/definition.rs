// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! Pipeline definition structures
//!
//! Mirrors the JSON served by the pipeline service (`GET /pipeline/{id}`).
//! Definitions are immutable once fetched; the editor replaces them
//! wholesale when a different pipeline is selected.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::{PipegraphError, PipegraphResult};

/// Prefix of source expressions that reference a pipeline-level input
pub const INPUTS_PREFIX: &str = "inputs.";

/// Prefix of the node ids synthesized for pipeline-level outputs
pub const OUTPUTS_PREFIX: &str = "outputs.";

/// Step type that marks a nested pipeline
pub const NESTED_PIPELINE_TYPE: &str = "pipeline";

/// Entry of the pipeline list (`GET /pipelines`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A full pipeline definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    /// Pipeline id
    pub id: String,

    /// Human readable name
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Pipeline-level inputs, in declaration order
    #[serde(default)]
    pub inputs: IndexMap<String, InputSpec>,

    /// Pipeline-level outputs: output name -> source expression
    #[serde(default)]
    pub outputs: IndexMap<String, String>,

    /// Steps in declaration order
    #[serde(default)]
    pub steps: Vec<StepDefinition>,
}

impl PipelineDefinition {
    /// Create an empty pipeline
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            inputs: IndexMap::new(),
            outputs: IndexMap::new(),
            steps: Vec::new(),
        }
    }

    /// Declare a pipeline-level input
    pub fn with_input(mut self, name: impl Into<String>, spec: InputSpec) -> Self {
        self.inputs.insert(name.into(), spec);
        self
    }

    /// Declare a pipeline-level output
    pub fn with_output(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.outputs.insert(name.into(), source.into());
        self
    }

    /// Append a step
    pub fn with_step(mut self, step: StepDefinition) -> Self {
        self.steps.push(step);
        self
    }

    /// Load a pipeline from a JSON or YAML file (chosen by extension)
    pub fn from_file(path: &Path) -> PipegraphResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| PipegraphError::FileReadError {
                path: path.to_path_buf(),
                error: e.to_string(),
            })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            _ => Self::from_json(&content),
        }
    }

    /// Parse pipeline from a JSON string
    pub fn from_json(json: &str) -> PipegraphResult<Self> {
        serde_json::from_str(json).map_err(Into::into)
    }

    /// Parse pipeline from a YAML string
    pub fn from_yaml(yaml: &str) -> PipegraphResult<Self> {
        serde_yaml::from_str(yaml).map_err(Into::into)
    }

    /// Serialize pipeline to pretty JSON
    pub fn to_json(&self) -> PipegraphResult<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    /// Get a step by id
    pub fn get_step(&self, id: &str) -> Option<&StepDefinition> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Get all step ids
    pub fn step_ids(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.id.as_str()).collect()
    }

    /// Summary entry for this pipeline
    pub fn summary(&self) -> PipelineSummary {
        PipelineSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

/// Declaration of a pipeline-level input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
    /// Declared value type, if any
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Default value used when the caller supplies none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

/// A single pipeline step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    /// Step id (must be unique within pipeline)
    pub id: String,

    /// Catalog type; older definitions omit it and use the id as the type
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub step_type: Option<String>,

    /// Input port -> source expression
    #[serde(default)]
    pub inputs: IndexMap<String, String>,

    /// Opaque step configuration
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub config: serde_json::Value,

    /// Inline definition for nested pipeline steps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<Box<PipelineDefinition>>,
}

impl StepDefinition {
    pub fn new(id: impl Into<String>, step_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            step_type: Some(step_type.into()),
            inputs: IndexMap::new(),
            config: serde_json::Value::Null,
            definition: None,
        }
    }

    /// Wire an input port to a source expression
    pub fn with_input(mut self, port: impl Into<String>, source: impl Into<String>) -> Self {
        self.inputs.insert(port.into(), source.into());
        self
    }

    /// Attach an inline nested pipeline
    pub fn with_definition(mut self, definition: PipelineDefinition) -> Self {
        self.definition = Some(Box::new(definition));
        self
    }

    /// The catalog type of this step
    pub fn step_type(&self) -> &str {
        self.step_type.as_deref().unwrap_or(&self.id)
    }

    /// Whether this step runs a nested pipeline
    pub fn is_nested_pipeline(&self) -> bool {
        self.step_type() == NESTED_PIPELINE_TYPE
    }
}

/// A parsed source expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRef<'a> {
    /// `inputs.<name>`
    PipelineInput { name: &'a str },
    /// `<stepId>.<port>`
    StepOutput { step: &'a str, port: &'a str },
}

impl<'a> SourceRef<'a> {
    /// Parse a source expression; `None` when it is malformed
    pub fn parse(expression: &'a str) -> Option<Self> {
        if let Some(name) = expression.strip_prefix(INPUTS_PREFIX) {
            return (!name.is_empty()).then_some(Self::PipelineInput { name });
        }

        let (step, port) = expression.split_once('.')?;
        if step.is_empty() || port.is_empty() {
            return None;
        }
        Some(Self::StepOutput { step, port })
    }

    /// Id of the graph node the expression points at
    pub fn node_id(&self) -> String {
        match self {
            Self::PipelineInput { name } => input_node_id(name),
            Self::StepOutput { step, .. } => step.to_string(),
        }
    }

    /// Output port on that node
    pub fn port(&self) -> &'a str {
        match self {
            Self::PipelineInput { name } => name,
            Self::StepOutput { port, .. } => port,
        }
    }
}

/// Node id synthesized for a pipeline-level input
pub fn input_node_id(name: &str) -> String {
    format!("{}{}", INPUTS_PREFIX, name)
}

/// Node id synthesized for a pipeline-level output
pub fn output_node_id(name: &str) -> String {
    format!("{}{}", OUTPUTS_PREFIX, name)
}
