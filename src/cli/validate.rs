// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! Validate command - check a pipeline against the step catalog

use colored::Colorize;
use miette::Result;

use super::open_pipeline;
use crate::config::EditorConfig;
use crate::pipeline::PipelineValidator;
use crate::utils::{print_error, print_success, print_warning};

/// Run the validate command
pub async fn run(config: EditorConfig, id: String, verbose: bool) -> Result<()> {
    println!("{}", "Validating pipeline...".bold());
    println!();

    let session = open_pipeline(config, &id).await?;
    let pipeline = session.require_pipeline()?;

    print_success(&format!("Pipeline '{}' parsed", pipeline.id));
    print_success(&format!("Step catalog has {} type(s)", session.catalog().len()));

    let validation = PipelineValidator::validate(pipeline, session.catalog());

    if !validation.errors.is_empty() {
        println!();
        println!("{}:", "Errors".red().bold());
        for error in &validation.errors {
            print_error(error);
        }
    }

    if !validation.warnings.is_empty() {
        println!();
        println!("{}:", "Warnings".yellow().bold());
        for warning in &validation.warnings {
            print_warning(warning);
        }
    }

    if verbose {
        println!();
        println!("{}:", "Pipeline summary".bold());
        println!("  Name: {}", pipeline.name);
        println!("  Inputs: {}", pipeline.inputs.len());
        println!("  Outputs: {}", pipeline.outputs.len());
        println!("  Steps: {}", pipeline.steps.len());
        for step in &pipeline.steps {
            let sources: Vec<&str> = step.inputs.values().map(String::as_str).collect();
            let deps = if sources.is_empty() {
                String::new()
            } else {
                format!(" [from: {}]", sources.join(", "))
            };
            println!("    - {} ({}){}", step.id, step.step_type(), deps.dimmed());
        }
    }

    println!();

    if !validation.is_valid() {
        Err(miette::miette!("Pipeline validation failed"))
    } else if validation.has_warnings() {
        println!("{}", "Pipeline is valid but has warnings.".yellow().bold());
        Ok(())
    } else {
        println!("{}", "Pipeline is valid!".green().bold());
        Ok(())
    }
}
