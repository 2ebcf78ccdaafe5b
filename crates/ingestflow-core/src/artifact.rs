//! Artifact references and the channels that carry them between components.

use serde::Serialize;

use crate::error::{ComponentError, Result};

/// Artifact type produced by ingestion components.
pub const EXAMPLES: &str = "Examples";
/// Artifact type pointing at data that lives outside the pipeline.
pub const EXTERNAL_ARTIFACT: &str = "ExternalArtifact";

/// Name given to channels built from a bare source location.
pub const EXTERNAL_CHANNEL_NAME: &str = "external";

/// An opaque reference to materialized data. Nothing here reads or writes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Artifact {
    pub type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

impl Artifact {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            split: None,
            uri: None,
        }
    }

    pub fn with_split(mut self, split: impl Into<String>) -> Self {
        self.split = Some(split.into());
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }
}

/// A typed, named conduit of artifact references.
///
/// Channels are immutable once built: fields are only reachable through
/// accessors, and every artifact is checked against the channel type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactChannel {
    name: String,
    artifact_type: String,
    artifacts: Vec<Artifact>,
}

impl ArtifactChannel {
    pub fn new(
        name: impl Into<String>,
        artifact_type: impl Into<String>,
        artifacts: Vec<Artifact>,
    ) -> Result<Self> {
        let name = name.into();
        let artifact_type = artifact_type.into();

        if name.trim().is_empty() {
            return Err(ComponentError::InvalidSpecification(
                "channel name cannot be empty".to_string(),
            ));
        }
        if let Some(bad) = artifacts.iter().find(|a| a.type_name != artifact_type) {
            return Err(ComponentError::TypeMismatch {
                field: format!("channel {name}"),
                expected: artifact_type,
                actual: bad.type_name.clone(),
            });
        }

        Ok(Self {
            name,
            artifact_type,
            artifacts,
        })
    }

    /// Channel carrying a single `Examples` artifact tagged with `split`.
    pub fn examples_for_split(split: &str) -> Result<Self> {
        Self::new(split, EXAMPLES, vec![Artifact::new(EXAMPLES).with_split(split)])
    }

    /// Channel carrying a single `ExternalArtifact` located at `uri`.
    pub fn external(uri: &str) -> Result<Self> {
        if uri.trim().is_empty() {
            return Err(ComponentError::InvalidSpecification(
                "external source location cannot be empty".to_string(),
            ));
        }
        Self::new(
            EXTERNAL_CHANNEL_NAME,
            EXTERNAL_ARTIFACT,
            vec![Artifact::new(EXTERNAL_ARTIFACT).with_uri(uri)],
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn artifact_type(&self) -> &str {
        &self.artifact_type
    }

    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    /// First artifact URI carried by this channel, if any.
    pub fn uri(&self) -> Option<&str> {
        self.artifacts.iter().find_map(|a| a.uri.as_deref())
    }
}
