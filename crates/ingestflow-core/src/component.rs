//! Component kinds and fully assembled component definitions.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::component_spec::{ComponentSpec, SpecSchema};
use crate::digest;
use crate::driver::Driver;
use crate::error::{ComponentError, Result};
use crate::executor_spec::ExecutorSpec;

/// Immutable descriptor of a component type.
///
/// Holds what every instance of the type shares: its schema, the executor
/// used when an instance does not override it, and the default driver.
/// Kinds are built once and handed to instance construction; nothing
/// mutates them afterwards.
#[derive(Clone)]
pub struct ComponentKind {
    schema: SpecSchema,
    default_executor: ExecutorSpec,
    default_driver: Option<Arc<dyn Driver>>,
}

impl ComponentKind {
    pub fn new(schema: SpecSchema, default_executor: ExecutorSpec) -> Self {
        Self {
            schema,
            default_executor,
            default_driver: None,
        }
    }

    pub fn with_driver(mut self, driver: Arc<dyn Driver>) -> Self {
        self.default_driver = Some(driver);
        self
    }

    /// Same interface under a new type name, e.g. a format-specific variant
    /// of a generic ingestion kind.
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.schema.component = name.into();
        self
    }

    /// Same interface with a different default executor.
    pub fn with_default_executor(mut self, executor: ExecutorSpec) -> Self {
        self.default_executor = executor;
        self
    }

    pub fn name(&self) -> &str {
        &self.schema.component
    }

    pub fn schema(&self) -> &SpecSchema {
        &self.schema
    }

    pub fn default_executor(&self) -> &ExecutorSpec {
        &self.default_executor
    }

    pub fn default_driver(&self) -> Option<&Arc<dyn Driver>> {
        self.default_driver.as_ref()
    }
}

impl fmt::Debug for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentKind")
            .field("name", &self.name())
            .field("default_executor", &self.default_executor.describe())
            .field("default_driver", &self.default_driver.as_ref().map(|d| d.name()))
            .finish()
    }
}

fn validate_instance_name(instance_name: &Option<String>) -> Result<()> {
    if let Some(name) = instance_name {
        if name.trim().is_empty() || name.contains('.') {
            return Err(ComponentError::InvalidInstanceName(name.clone()));
        }
    }
    Ok(())
}

/// A component instance ready to hand to an orchestration engine.
#[derive(Clone)]
pub struct ComponentDefinition {
    spec: ComponentSpec,
    executor_spec: ExecutorSpec,
    driver: Option<Arc<dyn Driver>>,
    instance_name: Option<String>,
}

/// Serializable view of a [`ComponentDefinition`].
#[derive(Debug, Serialize)]
pub struct ComponentManifest<'a> {
    pub node_id: String,
    pub component: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_name: Option<&'a str>,
    pub executor: &'a ExecutorSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<&'a str>,
    pub spec: &'a ComponentSpec,
}

impl ComponentDefinition {
    /// Attach the executor (instance override or kind default) and the
    /// kind's driver to a bound spec.
    pub fn assemble(
        kind: &ComponentKind,
        spec: ComponentSpec,
        custom_executor_spec: Option<ExecutorSpec>,
        instance_name: Option<String>,
    ) -> Result<Self> {
        if spec.component() != kind.name() {
            return Err(ComponentError::TypeMismatch {
                field: "spec".to_string(),
                expected: kind.name().to_string(),
                actual: spec.component().to_string(),
            });
        }
        validate_instance_name(&instance_name)?;

        let executor_spec =
            custom_executor_spec.unwrap_or_else(|| kind.default_executor().clone());

        let definition = Self {
            spec,
            executor_spec,
            driver: kind.default_driver().cloned(),
            instance_name,
        };

        info!(
            node_id = %definition.node_id(),
            executor = %definition.executor_spec.describe(),
            "Component defined"
        );
        Ok(definition)
    }

    /// `<Kind>` or `<Kind>.<instance_name>`; unique within a pipeline.
    pub fn node_id(&self) -> String {
        match &self.instance_name {
            Some(name) => format!("{}.{}", self.spec.component(), name),
            None => self.spec.component().to_string(),
        }
    }

    pub fn component_type(&self) -> &str {
        self.spec.component()
    }

    pub fn spec(&self) -> &ComponentSpec {
        &self.spec
    }

    pub fn executor_spec(&self) -> &ExecutorSpec {
        &self.executor_spec
    }

    pub fn driver(&self) -> Option<&Arc<dyn Driver>> {
        self.driver.as_ref()
    }

    pub fn instance_name(&self) -> Option<&str> {
        self.instance_name.as_deref()
    }

    pub fn manifest(&self) -> ComponentManifest<'_> {
        ComponentManifest {
            node_id: self.node_id(),
            component: self.spec.component(),
            instance_name: self.instance_name.as_deref(),
            executor: &self.executor_spec,
            driver: self.driver.as_ref().map(|d| d.name()),
            spec: &self.spec,
        }
    }

    /// SHA-256 of the canonical manifest; equal definitions share it.
    pub fn digest(&self) -> Result<String> {
        digest::digest_of(&self.manifest())
    }
}

impl PartialEq for ComponentDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.spec == other.spec
            && self.executor_spec == other.executor_spec
            && self.instance_name == other.instance_name
            && self.driver.as_ref().map(|d| d.name()) == other.driver.as_ref().map(|d| d.name())
    }
}

impl fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("node_id", &self.node_id())
            .field("executor_spec", &self.executor_spec)
            .field("driver", &self.driver.as_ref().map(|d| d.name()))
            .field("spec", &self.spec)
            .finish()
    }
}
