// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! Graph command - visualize pipeline as a graph

use miette::Result;

use super::{open_pipeline, GraphFormat};
use crate::config::EditorConfig;
use crate::graph::DagBuilder;

/// Run the graph command
pub async fn run(config: EditorConfig, id: String, format: GraphFormat, verbose: bool) -> Result<()> {
    let session = open_pipeline(config, &id).await?;

    if verbose && !session.diagnostics().is_empty() {
        for message in session.diagnostics().messages() {
            eprintln!("warning: {}", message);
        }
    }

    let dag = DagBuilder::from_store(session.store());

    // Output in requested format
    let output = match format {
        GraphFormat::Text => dag.to_text()?,
        GraphFormat::Dot => dag.to_dot(),
        GraphFormat::Mermaid => dag.to_mermaid(),
    };

    print!("{}", output);

    Ok(())
}
