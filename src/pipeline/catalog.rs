// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! Step catalog and port registry
//!
//! The catalog (`GET /pipeline-steps`) is fetched once per editor session
//! and serves as a read-only lookup table of step types and their ports.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use super::PipelineDefinition;

/// A step type as described by the pipeline service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCatalogEntry")]
pub struct StepCatalogEntry {
    /// Step type identifier
    pub id: String,

    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Input port names, in declaration order
    pub inputs: Vec<String>,

    /// Output port names; the service sends `null` when it cannot infer them
    pub outputs: Vec<String>,
}

/// Wire shape of a catalog entry. The service may send `id`, `type` or
/// both, and any metadata field may be `null`.
#[derive(Deserialize)]
struct RawCatalogEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "type")]
    step_type: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    inputs: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    outputs: Vec<String>,
}

impl TryFrom<RawCatalogEntry> for StepCatalogEntry {
    type Error = String;

    fn try_from(raw: RawCatalogEntry) -> Result<Self, Self::Error> {
        let id = raw
            .id
            .or(raw.step_type)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| "catalog entry has neither 'id' nor 'type'".to_string())?;

        Ok(Self {
            id,
            name: raw.name.unwrap_or_default(),
            description: raw.description,
            inputs: raw.inputs,
            outputs: raw.outputs,
        })
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl StepCatalogEntry {
    pub fn new<I, O>(id: &str, inputs: I, outputs: O) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        O: IntoIterator,
        O::Item: Into<String>,
    {
        Self {
            id: id.to_string(),
            name: String::new(),
            description: None,
            inputs: inputs.into_iter().map(Into::into).collect(),
            outputs: outputs.into_iter().map(Into::into).collect(),
        }
    }

    /// Name shown to users, falling back to the type id
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    pub fn ports(&self) -> PortSet {
        PortSet {
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
        }
    }
}

/// Ordered input and output port names of a node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortSet {
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

impl PortSet {
    /// Ports of a global input node: a single output named after the input
    pub fn global_input(name: &str) -> Self {
        Self {
            inputs: vec![],
            outputs: vec![name.to_string()],
        }
    }

    /// Ports of a global output node: a single input named after the output
    pub fn global_output(name: &str) -> Self {
        Self {
            inputs: vec![name.to_string()],
            outputs: vec![],
        }
    }

    /// Ports of a nested pipeline node, taken from the inner definition
    pub fn nested(definition: &PipelineDefinition) -> Self {
        Self {
            inputs: definition.inputs.keys().cloned().collect(),
            outputs: definition.outputs.keys().cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.outputs.is_empty()
    }
}

/// Read-only lookup table of step types
#[derive(Debug, Clone, Default)]
pub struct StepCatalog {
    entries: IndexMap<String, StepCatalogEntry>,
}

impl StepCatalog {
    /// Build a catalog; the first entry wins when a type is listed twice
    pub fn new(entries: Vec<StepCatalogEntry>) -> Self {
        let mut map = IndexMap::with_capacity(entries.len());
        for entry in entries {
            if map.contains_key(&entry.id) {
                tracing::warn!("Step type '{}' listed twice in catalog, keeping first", entry.id);
                continue;
            }
            map.insert(entry.id.clone(), entry);
        }
        Self { entries: map }
    }

    /// Parse the catalog from the service's JSON array
    ///
    /// Only a body that is not a JSON array is an error; entries that do not
    /// parse are skipped.
    pub fn from_json(json: &str) -> crate::PipegraphResult<Self> {
        let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
        Ok(Self::from_values(values))
    }

    /// Build a catalog from raw JSON entries, skipping malformed ones
    pub fn from_values(values: Vec<serde_json::Value>) -> Self {
        let entries = values
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value(value) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Skipping step catalog entry #{}: {}", index, e);
                    None
                }
            })
            .collect();
        Self::new(entries)
    }

    pub fn get(&self, step_type: &str) -> Option<&StepCatalogEntry> {
        self.entries.get(step_type)
    }

    pub fn contains(&self, step_type: &str) -> bool {
        self.entries.contains_key(step_type)
    }

    /// Ports for a step type; empty when the type is not registered
    pub fn ports(&self, step_type: &str) -> PortSet {
        self.get(step_type).map(StepCatalogEntry::ports).unwrap_or_default()
    }

    pub fn entries(&self) -> impl Iterator<Item = &StepCatalogEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_catalog_with_null_outputs() {
        let json = r#"[
            {"id": "fetch_html", "name": "Fetch HTML", "inputs": ["url"], "outputs": ["html", "screenshot"]},
            {"id": "save_page", "name": "Save Page", "inputs": ["html"], "outputs": null}
        ]"#;

        let catalog = StepCatalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.ports("fetch_html").outputs, vec!["html", "screenshot"]);
        assert!(catalog.ports("save_page").outputs.is_empty());
    }

    #[test]
    fn test_type_alias_for_id() {
        let json = r#"[{"type": "summarize", "inputs": ["text"], "outputs": ["text"]}]"#;
        let catalog = StepCatalog::from_json(json).unwrap();
        let entry = catalog.get("summarize").unwrap();
        assert_eq!(entry.display_name(), "summarize");
    }

    #[test]
    fn test_entry_with_both_id_and_type() {
        let json = r#"[{"id": "summarize", "type": "summarize", "inputs": ["text"], "outputs": ["text"]}]"#;
        let catalog = StepCatalog::from_json(json).unwrap();
        assert_eq!(catalog.ports("summarize").inputs, vec!["text"]);
    }

    #[test]
    fn test_id_preferred_over_type() {
        let json = r#"[{"id": "summarize_v2", "type": "summarize", "inputs": [], "outputs": []}]"#;
        let catalog = StepCatalog::from_json(json).unwrap();
        assert!(catalog.contains("summarize_v2"));
        assert!(!catalog.contains("summarize"));
    }

    #[test]
    fn test_null_metadata_tolerated() {
        let json = r#"[{"id": "translate", "name": null, "description": null, "inputs": null, "outputs": ["text"]}]"#;
        let catalog = StepCatalog::from_json(json).unwrap();
        let entry = catalog.get("translate").unwrap();
        assert_eq!(entry.display_name(), "translate");
        assert!(entry.inputs.is_empty());
        assert!(entry.description.is_none());
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let json = r#"[
            {"id": "good", "inputs": ["a"], "outputs": ["b"]},
            {"name": "No identifier", "inputs": []},
            {"id": "bad_ports", "inputs": "not-a-list"},
            42,
            {"type": "also_good", "inputs": [], "outputs": null}
        ]"#;

        let catalog = StepCatalog::from_json(json).unwrap();
        let ids: Vec<_> = catalog.entries().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["good", "also_good"]);
    }

    #[test]
    fn test_non_array_body_is_error() {
        assert!(StepCatalog::from_json(r#"{"steps": []}"#).is_err());
    }

    #[test]
    fn test_unknown_type_has_empty_ports() {
        let catalog = StepCatalog::new(vec![StepCatalogEntry::new("a", ["x"], ["y"])]);
        assert!(!catalog.contains("b"));
        assert!(catalog.ports("b").is_empty());
    }

    #[test]
    fn test_first_duplicate_wins() {
        let catalog = StepCatalog::new(vec![
            StepCatalogEntry::new("a", ["first"], Vec::<String>::new()),
            StepCatalogEntry::new("a", ["second"], Vec::<String>::new()),
        ]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.ports("a").inputs, vec!["first"]);
    }

    #[test]
    fn test_global_port_sets() {
        assert_eq!(PortSet::global_input("doc").outputs, vec!["doc"]);
        assert!(PortSet::global_input("doc").inputs.is_empty());
        assert_eq!(PortSet::global_output("summary").inputs, vec!["summary"]);
        assert!(PortSet::global_output("summary").outputs.is_empty());
    }
}
