// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! Content fingerprints for pipeline definitions
//!
//! Uses BLAKE3 over the canonical JSON form. Watch mode compares
//! fingerprints to skip rebuilding a graph whose inputs did not change.

use blake3::Hasher;

use crate::errors::PipegraphResult;
use crate::pipeline::{PipelineDefinition, StepCatalog};

/// Incremental fingerprint builder
pub struct Fingerprinter {
    hasher: Hasher,
}

impl Fingerprinter {
    pub fn new() -> Self {
        Self {
            hasher: Hasher::new(),
        }
    }

    /// Hash a pipeline definition
    pub fn pipeline(mut self, pipeline: &PipelineDefinition) -> PipegraphResult<Self> {
        let json = serde_json::to_vec(pipeline)?;
        self.hasher.update(b"pipeline\0");
        self.hasher.update(&json);
        Ok(self)
    }

    /// Hash the catalog entries, in catalog order
    pub fn catalog(mut self, catalog: &StepCatalog) -> PipegraphResult<Self> {
        self.hasher.update(b"catalog\0");
        for entry in catalog.entries() {
            let json = serde_json::to_vec(entry)?;
            self.hasher.update(&json);
        }
        Ok(self)
    }

    /// Finalize and get the hex digest
    pub fn finalize(self) -> String {
        self.hasher.finalize().to_hex().to_string()
    }
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new()
    }
}

/// Fingerprint of everything that determines a resolved graph
pub fn graph_fingerprint(
    pipeline: &PipelineDefinition,
    catalog: &StepCatalog,
) -> PipegraphResult<String> {
    Ok(Fingerprinter::new()
        .pipeline(pipeline)?
        .catalog(catalog)?
        .finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{StepCatalogEntry, StepDefinition};

    fn catalog() -> StepCatalog {
        StepCatalog::new(vec![StepCatalogEntry::new("summarize", ["text"], ["text"])])
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let pipeline = PipelineDefinition::new("p", "P")
            .with_step(StepDefinition::new("step1", "summarize").with_input("text", "inputs.doc"));

        let a = graph_fingerprint(&pipeline, &catalog()).unwrap();
        let b = graph_fingerprint(&pipeline.clone(), &catalog()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_changes_with_wiring() {
        let base = PipelineDefinition::new("p", "P")
            .with_step(StepDefinition::new("step1", "summarize").with_input("text", "inputs.doc"));
        let rewired = PipelineDefinition::new("p", "P")
            .with_step(StepDefinition::new("step1", "summarize").with_input("text", "inputs.other"));

        assert_ne!(
            graph_fingerprint(&base, &catalog()).unwrap(),
            graph_fingerprint(&rewired, &catalog()).unwrap()
        );
    }

    #[test]
    fn test_fingerprint_changes_with_catalog() {
        let pipeline = PipelineDefinition::new("p", "P");
        let other = StepCatalog::new(vec![StepCatalogEntry::new("summarize", ["text"], ["summary"])]);

        assert_ne!(
            graph_fingerprint(&pipeline, &catalog()).unwrap(),
            graph_fingerprint(&pipeline, &other).unwrap()
        );
    }
}
