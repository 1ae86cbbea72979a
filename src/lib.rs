// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! # pipegraph - Pipeline Graph Model & Auto-Layout
//!
//! `pipegraph` turns content-generation pipeline definitions into a typed
//! node graph and lays it out left to right by dependency depth.
//!
//! ## Features
//!
//! - **Graph model** - Input, output, processing and nested pipeline nodes with declared sockets
//! - **Connection resolution** - `inputs.<name>` and `<stepId>.<port>` expressions become edges
//! - **Auto-layout** - BFS depth columns, centered stacks, viewport fitting
//! - **Editor session** - Selection, cascading deletion, last-request-wins loading
//! - **Sources** - The pipeline service over HTTP, or a local folder of files
//!
//! ## Quick Start
//!
//! ```bash
//! # List pipelines served by the pipeline service
//! pipegraph list
//!
//! # Resolve a pipeline from local files
//! pipegraph --dir ./pipelines show summarize-doc
//!
//! # Compute positions
//! pipegraph layout summarize-doc --format json
//! ```

pub mod cli;
pub mod config;
pub mod editor;
pub mod errors;
pub mod graph;
pub mod pipeline;
pub mod source;
pub mod utils;

// Re-export commonly used types
pub use config::EditorConfig;
pub use editor::EditorSession;
pub use errors::{PipegraphError, PipegraphResult};
pub use graph::{GraphNode, GraphStore, LayoutEngine};
pub use pipeline::{PipelineDefinition, StepCatalog};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
