// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! Local folder of pipeline files
//!
//! Every `*.json`, `*.yaml` and `*.yml` file below the root is a pipeline
//! definition keyed by its `id`, except the catalog file
//! (`pipeline-steps.json`) at the root.

use async_trait::async_trait;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

use super::PipelineSource;
use crate::errors::{PipegraphError, PipegraphResult};
use crate::pipeline::{PipelineDefinition, PipelineSummary, StepCatalog};

/// Catalog file name at the root of a pipeline folder
pub const CATALOG_FILE_NAME: &str = "pipeline-steps.json";

const PIPELINE_PATTERNS: &[&str] = &["**/*.json", "**/*.yaml", "**/*.yml"];

/// Pipelines and catalog read from disk on every request
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.root.join(CATALOG_FILE_NAME)
    }

    /// Pipeline files below the root, sorted by path
    pub fn pipeline_files(&self) -> PipegraphResult<Vec<PathBuf>> {
        let catalog = self.catalog_path();
        let mut files = Vec::new();

        for pattern in PIPELINE_PATTERNS {
            let full_pattern = self.root.join(pattern).to_string_lossy().to_string();
            files.extend(
                glob::glob(&full_pattern)?
                    .filter_map(Result::ok)
                    .filter(|path| path.is_file() && *path != catalog),
            );
        }

        files.sort();
        Ok(files)
    }

    /// Parse every pipeline file, keyed by pipeline id
    ///
    /// Unparseable files are skipped with a warning; when two files declare
    /// the same id the first one (by path) wins.
    pub fn load_all(&self) -> PipegraphResult<IndexMap<String, (PathBuf, PipelineDefinition)>> {
        if !self.root.is_dir() {
            return Err(PipegraphError::fetch(
                "pipelines",
                format!("'{}' is not a directory", self.root.display()),
            ));
        }

        let mut pipelines = IndexMap::new();
        for path in self.pipeline_files()? {
            let pipeline = match PipelineDefinition::from_file(&path) {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };

            if pipelines.contains_key(&pipeline.id) {
                tracing::warn!(
                    "Pipeline '{}' in {} already defined, ignoring",
                    pipeline.id,
                    path.display()
                );
                continue;
            }

            tracing::debug!("Loaded pipeline '{}' from {}", pipeline.id, path.display());
            pipelines.insert(pipeline.id.clone(), (path, pipeline));
        }

        Ok(pipelines)
    }

    /// File that defines pipeline `id`
    pub fn pipeline_path(&self, id: &str) -> PipegraphResult<PathBuf> {
        self.load_all()?
            .swap_remove(id)
            .map(|(path, _)| path)
            .ok_or_else(|| PipegraphError::PipelineNotFound { id: id.to_string() })
    }
}

#[async_trait]
impl PipelineSource for DirectorySource {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    async fn list_pipelines(&self) -> PipegraphResult<Vec<PipelineSummary>> {
        Ok(self
            .load_all()?
            .values()
            .map(|(_, pipeline)| pipeline.summary())
            .collect())
    }

    async fn fetch_pipeline(&self, id: &str) -> PipegraphResult<PipelineDefinition> {
        self.load_all()?
            .swap_remove(id)
            .map(|(_, pipeline)| pipeline)
            .ok_or_else(|| PipegraphError::PipelineNotFound { id: id.to_string() })
    }

    async fn fetch_catalog(&self) -> PipegraphResult<StepCatalog> {
        let path = self.catalog_path();
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| PipegraphError::fetch("step catalog", format!("{}: {}", path.display(), e)))?;

        StepCatalog::from_json(&content).map_err(|e| PipegraphError::fetch("step catalog", e))
    }
}
