//! Executor specifications: how a component's logic runs.
//!
//! A specification is either an in-process executable unit or a container
//! invocation. Both are validated once at construction and never change
//! afterwards; template expansion of container `command`/`args` happens at
//! execution time and is not performed here.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::artifact::Artifact;
use crate::error::{ComponentError, Result};

/// Artifacts keyed by input/output name, as handed to an executable unit.
pub type ArtifactMap = BTreeMap<String, Vec<Artifact>>;

/// Execution properties keyed by parameter name.
pub type ExecProperties = BTreeMap<String, serde_json::Value>;

/// An in-process unit of component logic.
///
/// Construction only keeps a reference; the orchestration engine is the one
/// that eventually calls [`ExecutableUnit::execute`].
#[async_trait]
pub trait ExecutableUnit: Send + Sync {
    /// Stable identifier, used for equality and manifests.
    fn name(&self) -> &str;

    async fn execute(
        &self,
        inputs: &ArtifactMap,
        outputs: &ArtifactMap,
        exec_properties: &ExecProperties,
    ) -> anyhow::Result<()>;
}

/// Reference to an in-process executable unit.
#[derive(Clone)]
pub struct ExecutorClassSpec {
    executor: Arc<dyn ExecutableUnit>,
}

impl ExecutorClassSpec {
    pub fn new(executor: Option<Arc<dyn ExecutableUnit>>) -> Result<Self> {
        let executor = executor.ok_or_else(|| {
            ComponentError::InvalidSpecification("executor class is required".to_string())
        })?;
        if executor.name().trim().is_empty() {
            return Err(ComponentError::InvalidSpecification(
                "executor class must have a non-empty name".to_string(),
            ));
        }
        Ok(Self { executor })
    }

    pub fn executor(&self) -> &Arc<dyn ExecutableUnit> {
        &self.executor
    }

    pub fn name(&self) -> &str {
        self.executor.name()
    }
}

impl fmt::Debug for ExecutorClassSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutorClassSpec")
            .field("executor", &self.name())
            .finish()
    }
}

impl PartialEq for ExecutorClassSpec {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for ExecutorClassSpec {}

impl Serialize for ExecutorClassSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ExecutorClassSpec", 1)?;
        state.serialize_field("executor", self.name())?;
        state.end()
    }
}

/// A container image plus optional entrypoint override and arguments.
///
/// `None` for `command` or `args` means the image's own ENTRYPOINT/CMD apply,
/// which is different from an explicitly empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutorContainerSpec {
    image: String,
    command: Option<Vec<String>>,
    args: Option<Vec<String>>,
}

impl ExecutorContainerSpec {
    pub fn new(
        image: impl Into<String>,
        command: Option<Vec<String>>,
        args: Option<Vec<String>>,
    ) -> Result<Self> {
        let image = image.into();
        if image.trim().is_empty() {
            return Err(ComponentError::InvalidSpecification(
                "image cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            image,
            command,
            args,
        })
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn command(&self) -> Option<&[String]> {
        self.command.as_deref()
    }

    pub fn args(&self) -> Option<&[String]> {
        self.args.as_deref()
    }
}

/// How a component executes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExecutorSpec {
    Class(ExecutorClassSpec),
    Container(ExecutorContainerSpec),
}

impl ExecutorSpec {
    /// In-process executor. Fails if `executor` is absent.
    pub fn class(executor: Option<Arc<dyn ExecutableUnit>>) -> Result<Self> {
        Ok(ExecutorSpec::Class(ExecutorClassSpec::new(executor)?))
    }

    /// Containerized executor. Fails if `image` is empty.
    pub fn container(
        image: impl Into<String>,
        command: Option<Vec<String>>,
        args: Option<Vec<String>>,
    ) -> Result<Self> {
        Ok(ExecutorSpec::Container(ExecutorContainerSpec::new(
            image, command, args,
        )?))
    }

    pub fn is_container(&self) -> bool {
        matches!(self, ExecutorSpec::Container(_))
    }

    /// Short label for logs, e.g. `class:BaseExampleGenExecutor`.
    pub fn describe(&self) -> String {
        match self {
            ExecutorSpec::Class(spec) => format!("class:{}", spec.name()),
            ExecutorSpec::Container(spec) => format!("container:{}", spec.image()),
        }
    }
}
