// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! Error types and load diagnostics
//!
//! Pipeline loading is best-effort: most problems become entries in a
//! [`Diagnostics`] list instead of aborting. Only data fetch failures stop
//! a load outright.

mod recovery;

pub use recovery::RecoverySuggestion;

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for pipegraph operations
pub type PipegraphResult<T> = Result<T, PipegraphError>;

/// Main error type for pipegraph
#[derive(Error, Debug, Diagnostic)]
pub enum PipegraphError {
    // ─────────────────────────────────────────────────────────────────────────
    // Fetch Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to fetch {what}: {message}")]
    #[diagnostic(
        code(pipegraph::data_fetch),
        help("Check that the pipeline service is reachable and returns valid JSON")
    )]
    DataFetch { what: String, message: String },

    #[error("HTTP request failed: {message}")]
    #[diagnostic(code(pipegraph::http_error))]
    Http { message: String },

    #[error("Pipeline '{id}' not found")]
    #[diagnostic(
        code(pipegraph::pipeline_not_found),
        help("Run 'pipegraph list' to see the available pipelines")
    )]
    PipelineNotFound { id: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Graph Integrity Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Node '{id}' already exists")]
    #[diagnostic(code(pipegraph::duplicate_node))]
    DuplicateNode { id: String },

    #[error("Node '{id}' does not exist")]
    #[diagnostic(code(pipegraph::unknown_node))]
    UnknownNode { id: String },

    #[error("Cannot connect {source_node}.{source_port} -> {target_node}.{target_port}: {reason}")]
    #[diagnostic(
        code(pipegraph::socket_mismatch),
        help("Port names must match those declared in the step catalog")
    )]
    SocketMismatch {
        source_node: String,
        source_port: String,
        target_node: String,
        target_port: String,
        reason: String,
    },

    #[error("Input '{port}' on node '{node}' is already connected")]
    #[diagnostic(
        code(pipegraph::port_already_connected),
        help("An input port accepts a single incoming connection; remove the existing one first")
    )]
    PortAlreadyConnected { node: String, port: String },

    #[error("Connection '{id}' already exists")]
    #[diagnostic(code(pipegraph::duplicate_connection))]
    DuplicateConnection { id: String },

    #[error("Connection '{id}' does not exist")]
    #[diagnostic(code(pipegraph::unknown_connection))]
    UnknownConnection { id: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Resolution Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Step '{step}' has unknown type '{step_type}'")]
    #[diagnostic(
        code(pipegraph::unknown_step_type),
        help("Run 'pipegraph catalog' to list the registered step types")
    )]
    UnknownStepType { step: String, step_type: String },

    #[error("'{target}' references '{reference}', which does not resolve to a node")]
    #[diagnostic(code(pipegraph::unresolved_reference))]
    UnresolvedReference { target: String, reference: String },

    #[error("Malformed source expression '{expression}' for '{target}'")]
    #[diagnostic(
        code(pipegraph::malformed_expression),
        help("Use 'inputs.<name>' or '<stepId>.<outputPort>'")
    )]
    MalformedExpression { target: String, expression: String },

    #[error("Circular dependency detected: {}", .nodes.join(" -> "))]
    #[diagnostic(
        code(pipegraph::circular_dependency),
        help("Review the step inputs to remove the cycle")
    )]
    CircularDependency { nodes: Vec<String> },

    // ─────────────────────────────────────────────────────────────────────────
    // Editor Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("No nodes selected for deletion")]
    #[diagnostic(code(pipegraph::empty_selection))]
    EmptySelection,

    #[error("No pipeline loaded")]
    #[diagnostic(code(pipegraph::no_pipeline))]
    NoPipelineLoaded,

    #[error("Invalid configuration: {reason}")]
    #[diagnostic(code(pipegraph::invalid_config))]
    InvalidConfig { reason: String },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/System Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to read file '{path}': {error}")]
    #[diagnostic(code(pipegraph::file_read_error))]
    FileReadError { path: PathBuf, error: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(pipegraph::io_error))]
    Io { message: String },

    #[error("YAML parsing error: {message}")]
    #[diagnostic(code(pipegraph::yaml_error))]
    Yaml { message: String },

    #[error("JSON parsing error: {message}")]
    #[diagnostic(code(pipegraph::json_error))]
    Json { message: String },

    #[error("TOML parsing error: {message}")]
    #[diagnostic(code(pipegraph::toml_error))]
    Toml { message: String },

    #[error("Glob pattern error: {message}")]
    #[diagnostic(code(pipegraph::glob_error))]
    GlobPattern { message: String },

    #[error("File watcher error: {message}")]
    #[diagnostic(code(pipegraph::watch_error))]
    Watch { message: String },
}

impl From<std::io::Error> for PipegraphError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for PipegraphError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<serde_json::Error> for PipegraphError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl From<toml::de::Error> for PipegraphError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml { message: e.to_string() }
    }
}

impl From<glob::PatternError> for PipegraphError {
    fn from(e: glob::PatternError) -> Self {
        Self::GlobPattern { message: e.to_string() }
    }
}

impl From<reqwest::Error> for PipegraphError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http { message: e.to_string() }
    }
}

impl From<notify::Error> for PipegraphError {
    fn from(e: notify::Error) -> Self {
        Self::Watch { message: e.to_string() }
    }
}

impl PipegraphError {
    /// Wrap a lower-level error as a fetch failure for `what`
    pub fn fetch(what: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::DataFetch {
            what: what.into(),
            message: error.to_string(),
        }
    }

    /// Socket mismatch with a reason
    pub fn socket_mismatch(
        source_node: &str,
        source_port: &str,
        target_node: &str,
        target_port: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self::SocketMismatch {
            source_node: source_node.to_string(),
            source_port: source_port.to_string(),
            target_node: target_node.to_string(),
            target_port: target_port.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether this error is one of the non-fatal load diagnostics
    pub fn is_load_diagnostic(&self) -> bool {
        matches!(
            self,
            Self::UnknownStepType { .. }
                | Self::UnresolvedReference { .. }
                | Self::MalformedExpression { .. }
                | Self::SocketMismatch { .. }
                | Self::PortAlreadyConnected { .. }
                | Self::DuplicateNode { .. }
                | Self::DuplicateConnection { .. }
                | Self::CircularDependency { .. }
        )
    }
}

/// Non-fatal problems collected while building a graph
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<PipegraphError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and log it
    pub fn push(&mut self, error: PipegraphError) {
        tracing::warn!("{}", error);
        self.entries.push(error);
    }

    pub fn iter(&self) -> impl Iterator<Item = &PipegraphError> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Human readable messages, in recording order
    pub fn messages(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.to_string()).collect()
    }
}

impl IntoIterator for Diagnostics {
    type Item = PipegraphError;
    type IntoIter = std::vec::IntoIter<PipegraphError>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
