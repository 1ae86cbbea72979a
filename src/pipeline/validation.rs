// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! Pipeline validation
//!
//! Checks a definition against the step catalog without loading it into an
//! editor. Anything the resolver would drop becomes an error; suspicious but
//! loadable constructs become warnings.

use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::errors::PipegraphError;
use crate::graph::{ConnectionResolver, GraphStore};
use crate::pipeline::{PipelineDefinition, SourceRef, StepCatalog};

/// Step ids must be referenceable as the left side of `<stepId>.<port>`
const STEP_ID_PATTERN: &str = r"^[A-Za-z0-9_\-]+$";

static STEP_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(STEP_ID_PATTERN).expect("step id pattern is a valid regex"));

/// Pipeline validator
pub struct PipelineValidator;

impl PipelineValidator {
    /// Validate a pipeline definition against a catalog
    pub fn validate(pipeline: &PipelineDefinition, catalog: &StepCatalog) -> ValidationResult {
        let mut result = ValidationResult::new();

        if pipeline.steps.is_empty() {
            result.add_error("Pipeline has no steps defined");
        }

        if pipeline.outputs.is_empty() {
            result.add_warning("Pipeline declares no outputs");
        }

        let mut seen_ids = HashSet::new();
        for step in &pipeline.steps {
            if !seen_ids.insert(step.id.as_str()) {
                result.add_error(&format!("Duplicate step id: '{}'", step.id));
            }

            if !STEP_ID.is_match(&step.id) {
                result.add_error(&format!(
                    "Step id '{}' must only contain letters, digits, '_' or '-' \
                     so other steps can reference it",
                    step.id
                ));
            }
        }

        // Everything the resolver drops is an error; duplicates are reported above
        let mut store = GraphStore::new();
        let diagnostics = ConnectionResolver::new(catalog).resolve(pipeline, &mut store);
        for diagnostic in diagnostics.iter() {
            if !matches!(diagnostic, PipegraphError::DuplicateNode { .. }) {
                result.add_error(&diagnostic.to_string());
            }
        }

        Self::check_unused_inputs(pipeline, &mut result);

        // Unwired step inputs load fine but will have no value at run time
        for node in store.nodes().filter(|n| n.kind.is_processing()) {
            for port in node.inputs.keys() {
                if store.input_connection(&node.id, port).is_none() {
                    result.add_warning(&format!(
                        "Step '{}': input '{}' is not connected",
                        node.id, port
                    ));
                }
            }
        }

        for step in &pipeline.steps {
            if let Some(nested) = step.definition.as_deref() {
                let inner = Self::validate(nested, catalog);
                result.merge_nested(&step.id, inner);
            }
        }

        result
    }

    fn check_unused_inputs(pipeline: &PipelineDefinition, result: &mut ValidationResult) {
        let referenced: HashSet<&str> = pipeline
            .steps
            .iter()
            .flat_map(|s| s.inputs.values())
            .chain(pipeline.outputs.values())
            .filter_map(|expr| match SourceRef::parse(expr) {
                Some(SourceRef::PipelineInput { name }) => Some(name),
                _ => None,
            })
            .collect();

        for name in pipeline.inputs.keys() {
            if !referenced.contains(name.as_str()) {
                result.add_warning(&format!("Pipeline input '{}' is never used", name));
            }
        }
    }
}

/// Result of pipeline validation
#[derive(Debug, Default, Serialize)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    pub fn add_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    fn merge_nested(&mut self, step: &str, nested: ValidationResult) {
        self.errors
            .extend(nested.errors.into_iter().map(|e| format!("Step '{}' (nested): {}", step, e)));
        self.warnings
            .extend(nested.warnings.into_iter().map(|w| format!("Step '{}' (nested): {}", step, w)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{InputSpec, StepCatalogEntry, StepDefinition};

    fn catalog() -> StepCatalog {
        StepCatalog::new(vec![
            StepCatalogEntry::new("summarize", ["text"], ["text"]),
            StepCatalogEntry::new("translate", ["text", "language"], ["text"]),
        ])
    }

    fn summarize() -> PipelineDefinition {
        PipelineDefinition::new("summarize-doc", "Summarize")
            .with_input("doc", InputSpec::default())
            .with_output("summary", "step1.text")
            .with_step(StepDefinition::new("step1", "summarize").with_input("text", "inputs.doc"))
    }

    #[test]
    fn test_valid_pipeline() {
        let result = PipelineValidator::validate(&summarize(), &catalog());
        assert!(result.is_valid(), "{:?}", result.errors);
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_validate_empty_pipeline() {
        let result = PipelineValidator::validate(&PipelineDefinition::new("empty", ""), &catalog());
        assert!(!result.is_valid());
        assert!(result.errors[0].contains("no steps"));
    }

    #[test]
    fn test_validate_duplicate_ids() {
        let pipeline = summarize().with_step(StepDefinition::new("step1", "summarize"));
        let result = PipelineValidator::validate(&pipeline, &catalog());

        assert!(!result.is_valid());
        assert_eq!(
            result.errors.iter().filter(|e| e.contains("Duplicate")).count(),
            1
        );
    }

    #[test]
    fn test_validate_dotted_step_id() {
        let pipeline = summarize().with_step(StepDefinition::new("bad.id", "summarize"));
        let result = PipelineValidator::validate(&pipeline, &catalog());
        assert!(result.errors.iter().any(|e| e.contains("'bad.id'")));
    }

    #[test]
    fn test_step_id_pattern_always_applies() {
        assert!(STEP_ID.is_match("step_1-a"));
        for bad in ["a/b", "a?b", "a b", ""] {
            assert!(!STEP_ID.is_match(bad), "{:?} should be rejected", bad);
        }

        let pipeline = summarize().with_step(StepDefinition::new("a/b", "summarize"));
        let result = PipelineValidator::validate(&pipeline, &catalog());
        assert!(result.errors.iter().any(|e| e.contains("'a/b'")));
    }

    #[test]
    fn test_validate_unknown_type_and_bad_port() {
        let pipeline = summarize()
            .with_step(StepDefinition::new("mystery", "does-not-exist"))
            .with_step(StepDefinition::new("step2", "summarize").with_input("bogus", "inputs.doc"));
        let result = PipelineValidator::validate(&pipeline, &catalog());

        assert!(result.errors.iter().any(|e| e.contains("does-not-exist")));
        assert!(result.errors.iter().any(|e| e.contains("bogus")));
        assert!(result
            .warnings
            .iter()
            .any(|w| w == "Step 'step2': input 'text' is not connected"));
    }

    #[test]
    fn test_validate_cycle() {
        let pipeline = PipelineDefinition::new("loop", "Loop")
            .with_output("out", "a.text")
            .with_step(StepDefinition::new("a", "summarize").with_input("text", "b.text"))
            .with_step(StepDefinition::new("b", "summarize").with_input("text", "a.text"));
        let result = PipelineValidator::validate(&pipeline, &catalog());

        assert!(result.errors.iter().any(|e| e.contains("Circular dependency")));
    }

    #[test]
    fn test_unused_input_warning() {
        let pipeline = summarize().with_input("unused", InputSpec::default());
        let result = PipelineValidator::validate(&pipeline, &catalog());

        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.contains("'unused'")));
    }

    #[test]
    fn test_nested_definition_is_validated() {
        let inner = PipelineDefinition::new("inner", "Inner")
            .with_input("text", InputSpec::default())
            .with_output("text", "x.text")
            .with_step(StepDefinition::new("x", "nope").with_input("text", "inputs.text"));
        let pipeline = summarize().with_step(
            StepDefinition::new("nested", "pipeline")
                .with_input("text", "step1.text")
                .with_definition(inner),
        );
        let result = PipelineValidator::validate(&pipeline, &catalog());

        assert!(result
            .errors
            .iter()
            .any(|e| e.starts_with("Step 'nested' (nested):") && e.contains("nope")));
    }
}
