//! ExampleGen declarations.
//!
//! Both variants share one assembly sequence:
//! resolve split defaults → build output channels → bind the `ComponentSpec` →
//! attach the executor → attach the kind's driver. They differ in which
//! source they require and in their default kind.

use std::collections::BTreeMap;
use std::sync::Arc;

use ingestflow_core::{
    ArtifactChannel, ChannelParameter, ComponentDefinition, ComponentError, ComponentKind,
    ComponentSpec, ExecutableUnit, ExecutionParameter, ExecutorSpec, ParameterType, Result,
    SpecSchema, EXAMPLES, EXTERNAL_ARTIFACT,
};
use tracing::{debug, warn};

use crate::driver::FileSystemDriver;
use crate::executor::BaseExampleGenExecutor;
use crate::split::{resolve_splits, InputConfig, OutputConfig};

pub const INPUT_KEY: &str = "input";
pub const INPUT_BASE_KEY: &str = "input_base";
pub const EXAMPLES_KEY: &str = "examples";
pub const INPUT_CONFIG_KEY: &str = "input_config";
pub const OUTPUT_CONFIG_KEY: &str = "output_config";
pub const CUSTOM_CONFIG_KEY: &str = "custom_config";

fn config_parameters(schema: SpecSchema) -> SpecSchema {
    schema
        .parameter(ExecutionParameter::required(
            INPUT_CONFIG_KEY,
            ParameterType::Message("Input".to_string()),
        ))
        .parameter(ExecutionParameter::required(
            OUTPUT_CONFIG_KEY,
            ParameterType::Message("Output".to_string()),
        ))
        .parameter(ExecutionParameter::optional(
            CUSTOM_CONFIG_KEY,
            ParameterType::Message("CustomConfig".to_string()),
        ))
        .output(ChannelParameter::required(EXAMPLES_KEY, EXAMPLES))
}

fn base_executor() -> Result<ExecutorSpec> {
    let executor: Arc<dyn ExecutableUnit> = Arc::new(BaseExampleGenExecutor);
    ExecutorSpec::class(Some(executor))
}

/// Which declaration-time variant is being assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExampleGenVariant {
    QueryBased,
    FileBased,
}

/// Namespace for the query-based ingestion kind.
pub struct QueryBasedExampleGen;

impl QueryBasedExampleGen {
    pub const NAME: &'static str = "QueryBasedExampleGen";

    /// Default kind: no source input, placeholder executor, no driver.
    pub fn kind() -> Result<ComponentKind> {
        Ok(ComponentKind::new(
            config_parameters(SpecSchema::new(Self::NAME)),
            base_executor()?,
        ))
    }

    /// Each input split's `pattern` carries its query.
    pub fn builder(input_config: InputConfig) -> ExampleGenBuilder {
        let mut builder = ExampleGenBuilder::new(ExampleGenVariant::QueryBased);
        builder.input_config = Some(input_config);
        builder
    }
}

/// Namespace for the file-based ingestion kind.
pub struct FileBasedExampleGen;

impl FileBasedExampleGen {
    pub const NAME: &'static str = "FileBasedExampleGen";

    /// Default kind: requires an external source, placeholder executor,
    /// file-system driver.
    pub fn kind() -> Result<ComponentKind> {
        let schema = config_parameters(SpecSchema::new(Self::NAME))
            .input(ChannelParameter::required(INPUT_KEY, EXTERNAL_ARTIFACT));
        Ok(ComponentKind::new(schema, base_executor()?).with_driver(Arc::new(FileSystemDriver)))
    }

    pub fn builder() -> ExampleGenBuilder {
        ExampleGenBuilder::new(ExampleGenVariant::FileBased)
    }
}

/// Declaration-time arguments of an ExampleGen instance.
#[derive(Debug, Clone)]
pub struct ExampleGenBuilder {
    variant: ExampleGenVariant,
    kind: Option<ComponentKind>,
    input: Option<ArtifactChannel>,
    input_base: Option<String>,
    input_config: Option<InputConfig>,
    output_config: Option<OutputConfig>,
    custom_config: Option<serde_json::Value>,
    example_artifacts: Option<Vec<ArtifactChannel>>,
    custom_executor_spec: Option<ExecutorSpec>,
    instance_name: Option<String>,
}

impl ExampleGenBuilder {
    fn new(variant: ExampleGenVariant) -> Self {
        Self {
            variant,
            kind: None,
            input: None,
            input_base: None,
            input_config: None,
            output_config: None,
            custom_config: None,
            example_artifacts: None,
            custom_executor_spec: None,
            instance_name: None,
        }
    }

    /// Use a specific kind (e.g. a CSV kind) instead of the variant default.
    pub fn kind(mut self, kind: ComponentKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Source channel of `ExternalArtifact`s.
    pub fn input(mut self, channel: ArtifactChannel) -> Self {
        self.input = Some(channel);
        self
    }

    /// Source directory. Deprecated alias of [`ExampleGenBuilder::input`].
    pub fn input_base(mut self, path: impl Into<String>) -> Self {
        self.input_base = Some(path.into());
        self
    }

    pub fn input_config(mut self, config: InputConfig) -> Self {
        self.input_config = Some(config);
        self
    }

    pub fn output_config(mut self, config: OutputConfig) -> Self {
        self.output_config = Some(config);
        self
    }

    /// Opaque executor configuration, passed through untouched.
    pub fn custom_config(mut self, config: serde_json::Value) -> Self {
        self.custom_config = Some(config);
        self
    }

    /// Replace the generated per-split output channels.
    pub fn example_artifacts(mut self, channels: Vec<ArtifactChannel>) -> Self {
        self.example_artifacts = Some(channels);
        self
    }

    pub fn custom_executor_spec(mut self, spec: ExecutorSpec) -> Self {
        self.custom_executor_spec = Some(spec);
        self
    }

    pub fn instance_name(mut self, name: impl Into<String>) -> Self {
        self.instance_name = Some(name.into());
        self
    }

    fn default_kind(&self) -> Result<ComponentKind> {
        match self.variant {
            ExampleGenVariant::QueryBased => QueryBasedExampleGen::kind(),
            ExampleGenVariant::FileBased => FileBasedExampleGen::kind(),
        }
    }

    /// Resolve the source inputs; exactly one of `input`/`input_base` for
    /// file-based ingestion, none for query-based.
    fn source_inputs(
        &self,
        component: &str,
        input: Option<ArtifactChannel>,
        input_base: Option<String>,
    ) -> Result<BTreeMap<String, Vec<ArtifactChannel>>> {
        match self.variant {
            ExampleGenVariant::QueryBased => {
                if input.is_some() || input_base.is_some() {
                    let field = if input.is_some() { INPUT_KEY } else { INPUT_BASE_KEY };
                    return Err(ComponentError::UnknownField {
                        component: component.to_string(),
                        field: field.to_string(),
                    });
                }
                Ok(BTreeMap::new())
            }
            ExampleGenVariant::FileBased => {
                let channel = match (input, input_base) {
                    (Some(_), Some(_)) => {
                        return Err(ComponentError::ConflictingFields {
                            first: INPUT_KEY.to_string(),
                            second: INPUT_BASE_KEY.to_string(),
                        })
                    }
                    (None, None) => return Err(ComponentError::missing(component, INPUT_KEY)),
                    (Some(channel), None) => channel,
                    (None, Some(path)) => {
                        warn!(
                            component,
                            "`input_base` is deprecated; pass the source as an `input` channel"
                        );
                        ArtifactChannel::external(&path)?
                    }
                };
                Ok(BTreeMap::from([(INPUT_KEY.to_string(), vec![channel])]))
            }
        }
    }

    fn check_queries(&self, input_config: &InputConfig, component: &str) -> Result<()> {
        if self.variant != ExampleGenVariant::QueryBased {
            return Ok(());
        }
        for split in &input_config.splits {
            let has_query = split
                .pattern
                .as_deref()
                .is_some_and(|q| !q.trim().is_empty());
            if !has_query {
                return Err(ComponentError::missing(
                    component,
                    format!("{INPUT_CONFIG_KEY}.splits[{}].pattern", split.name),
                ));
            }
        }
        Ok(())
    }

    /// Assemble the immutable definition. Fails on the first invalid field.
    pub fn build(mut self) -> Result<ComponentDefinition> {
        let kind = match self.kind.take() {
            Some(kind) => kind,
            None => self.default_kind()?,
        };
        let component = kind.name().to_string();

        let (input, input_base) = (self.input.take(), self.input_base.take());
        let inputs = self.source_inputs(&component, input, input_base)?;

        let resolved = resolve_splits(self.input_config.take(), self.output_config.take())?;
        self.check_queries(&resolved.input_config, &component)?;
        debug!(
            component = %component,
            splits = ?resolved.output_split_names,
            "Resolved output splits"
        );

        let examples = match self.example_artifacts.take() {
            Some(channels) => channels,
            None => resolved
                .output_split_names
                .iter()
                .map(|split| ArtifactChannel::examples_for_split(split))
                .collect::<Result<Vec<_>>>()?,
        };
        let outputs = BTreeMap::from([(EXAMPLES_KEY.to_string(), examples)]);

        let mut exec_properties = BTreeMap::new();
        exec_properties.insert(
            INPUT_CONFIG_KEY.to_string(),
            serde_json::to_value(&resolved.input_config)?,
        );
        exec_properties.insert(
            OUTPUT_CONFIG_KEY.to_string(),
            serde_json::to_value(&resolved.output_config)?,
        );
        if let Some(custom) = self.custom_config.take() {
            exec_properties.insert(CUSTOM_CONFIG_KEY.to_string(), custom);
        }

        let spec = ComponentSpec::bind(kind.schema(), inputs, outputs, exec_properties)?;
        ComponentDefinition::assemble(
            &kind,
            spec,
            self.custom_executor_spec.take(),
            self.instance_name.take(),
        )
    }
}

/// Output channels of an ExampleGen definition, one per split, in order.
pub fn example_channels(definition: &ComponentDefinition) -> &[ArtifactChannel] {
    definition.spec().output(EXAMPLES_KEY)
}

/// Source location of a file-based definition.
pub fn source_uri(definition: &ComponentDefinition) -> Option<&str> {
    definition
        .spec()
        .input(INPUT_KEY)
        .iter()
        .find_map(|c| c.uri())
}

/// Resolved input configuration stored in a definition.
pub fn input_config_of(definition: &ComponentDefinition) -> Result<InputConfig> {
    let value = definition
        .spec()
        .exec_properties()
        .get(INPUT_CONFIG_KEY)
        .cloned()
        .ok_or_else(|| ComponentError::missing(definition.component_type(), INPUT_CONFIG_KEY))?;
    Ok(serde_json::from_value(value)?)
}

/// Resolved output configuration stored in a definition.
pub fn output_config_of(definition: &ComponentDefinition) -> Result<OutputConfig> {
    let value = definition
        .spec()
        .exec_properties()
        .get(OUTPUT_CONFIG_KEY)
        .cloned()
        .ok_or_else(|| ComponentError::missing(definition.component_type(), OUTPUT_CONFIG_KEY))?;
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split::{InputSplit, OutputSplit};

    #[test]
    fn test_file_based_kind_schema() {
        let kind = FileBasedExampleGen::kind().unwrap();
        assert_eq!(kind.name(), "FileBasedExampleGen");
        assert_eq!(kind.schema().inputs.len(), 1);
        assert_eq!(kind.default_driver().map(|d| d.name()), Some("FileSystemDriver"));
        assert_eq!(kind.default_executor().describe(), "class:BaseExampleGenExecutor");
    }

    #[test]
    fn test_query_based_kind_has_no_source_or_driver() {
        let kind = QueryBasedExampleGen::kind().unwrap();
        assert!(kind.schema().inputs.is_empty());
        assert!(kind.default_driver().is_none());
    }

    #[test]
    fn test_query_based_rejects_source_path() {
        let input = InputConfig::new(vec![InputSplit::new("single", "SELECT * FROM t")]);
        let result = QueryBasedExampleGen::builder(input).input_base("/data/x").build();
        match result {
            Err(ComponentError::UnknownField { field, .. }) => assert_eq!(field, "input_base"),
            other => panic!("expected UnknownField, got {other:?}"),
        }
    }

    #[test]
    fn test_query_based_requires_query_per_split() {
        let input = InputConfig::new(vec![InputSplit {
            name: "single".to_string(),
            pattern: None,
        }]);
        let result = QueryBasedExampleGen::builder(input).build();
        match result {
            Err(ComponentError::MissingRequiredField { field, .. }) => {
                assert_eq!(field, "input_config.splits[single].pattern")
            }
            other => panic!("expected MissingRequiredField, got {other:?}"),
        }
    }

    #[test]
    fn test_config_accessors_roundtrip_resolved_values() {
        let output =
            OutputConfig::new(vec![OutputSplit::new("train", 4), OutputSplit::new("eval", 1)]);
        let def = FileBasedExampleGen::builder()
            .input_base("/data/x")
            .output_config(output.clone())
            .build()
            .unwrap();
        assert_eq!(input_config_of(&def).unwrap(), InputConfig::single());
        assert_eq!(output_config_of(&def).unwrap(), output);
        assert_eq!(source_uri(&def), Some("/data/x"));
    }
}
