//! Registration of component definitions into a named pipeline.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::info;

use crate::component::{ComponentDefinition, ComponentManifest};
use crate::digest;
use crate::error::{ComponentError, Result};

/// An immutable, ordered set of component definitions with unique node ids.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    name: String,
    components: Vec<ComponentDefinition>,
}

#[derive(Debug, Serialize)]
pub struct PipelineManifest<'a> {
    pub name: &'a str,
    pub components: Vec<ComponentManifest<'a>>,
}

impl Pipeline {
    pub fn new(name: impl Into<String>, components: Vec<ComponentDefinition>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ComponentError::InvalidPipeline(
                "pipeline name cannot be empty".to_string(),
            ));
        }

        let mut seen = BTreeSet::new();
        for component in &components {
            let node_id = component.node_id();
            if !seen.insert(node_id.clone()) {
                return Err(ComponentError::DuplicateNodeId(node_id));
            }
        }

        info!(pipeline = %name, components = components.len(), "Pipeline registered");
        Ok(Self { name, components })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn components(&self) -> &[ComponentDefinition] {
        &self.components
    }

    pub fn component(&self, node_id: &str) -> Option<&ComponentDefinition> {
        self.components.iter().find(|c| c.node_id() == node_id)
    }

    pub fn manifest(&self) -> PipelineManifest<'_> {
        PipelineManifest {
            name: &self.name,
            components: self.components.iter().map(|c| c.manifest()).collect(),
        }
    }

    pub fn digest(&self) -> Result<String> {
        digest::digest_of(&self.manifest())
    }
}
