//! Pipeline declaration files.
//!
//! A declaration lists ExampleGen instances and their arguments. JSON and
//! TOML are accepted; the format is picked from the file extension.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use ingestflow_core::{ArtifactChannel, ComponentDefinition, ExecutableUnit, ExecutorSpec, Pipeline};
use ingestflow_example_gen::{
    BaseExampleGenExecutor, ExampleGenBuilder, FileBasedExampleGen, InputConfig, OutputConfig,
    QueryBasedExampleGen,
};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineDeclaration {
    pub name: String,
    #[serde(default)]
    pub components: Vec<ComponentDeclaration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindName {
    FileBased,
    QueryBased,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentDeclaration {
    pub kind: KindName,
    pub instance_name: Option<String>,
    /// Source location, declared as an external channel.
    pub input: Option<String>,
    /// Deprecated alias of `input`.
    pub input_base: Option<String>,
    pub input_config: Option<InputConfig>,
    pub output_config: Option<OutputConfig>,
    pub custom_config: Option<serde_json::Value>,
    pub executor: Option<ExecutorDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum ExecutorDeclaration {
    /// In-process executor, looked up by unit name.
    Class { executor: String },
    Container {
        image: String,
        command: Option<Vec<String>>,
        args: Option<Vec<String>>,
    },
}

impl ExecutorDeclaration {
    fn to_spec(&self) -> Result<ExecutorSpec> {
        let spec = match self {
            ExecutorDeclaration::Class { executor } => {
                let unit: Arc<dyn ExecutableUnit> = match executor.as_str() {
                    BaseExampleGenExecutor::NAME => Arc::new(BaseExampleGenExecutor),
                    other => bail!("Unknown executor class: {other}"),
                };
                ExecutorSpec::class(Some(unit))?
            }
            ExecutorDeclaration::Container {
                image,
                command,
                args,
            } => ExecutorSpec::container(image.as_str(), command.clone(), args.clone())?,
        };
        Ok(spec)
    }
}

impl ComponentDeclaration {
    fn builder(&self) -> Result<ExampleGenBuilder> {
        let builder = match self.kind {
            KindName::QueryBased => {
                let Some(input_config) = self.input_config.clone() else {
                    bail!("query_based components need an input_config with one query per split");
                };
                QueryBasedExampleGen::builder(input_config)
            }
            KindName::FileBased => {
                let mut builder = FileBasedExampleGen::builder();
                if let Some(config) = &self.input_config {
                    builder = builder.input_config(config.clone());
                }
                builder
            }
        };
        Ok(builder)
    }

    pub fn to_definition(&self) -> Result<ComponentDefinition> {
        let mut builder = self.builder()?;

        if let Some(uri) = &self.input {
            builder = builder.input(ArtifactChannel::external(uri)?);
        }
        if let Some(path) = &self.input_base {
            builder = builder.input_base(path.as_str());
        }
        if let Some(config) = &self.output_config {
            builder = builder.output_config(config.clone());
        }
        if let Some(config) = &self.custom_config {
            builder = builder.custom_config(config.clone());
        }
        if let Some(executor) = &self.executor {
            builder = builder.custom_executor_spec(executor.to_spec()?);
        }
        if let Some(name) = &self.instance_name {
            builder = builder.instance_name(name.as_str());
        }

        Ok(builder.build()?)
    }
}

impl PipelineDeclaration {
    pub fn parse(content: &str, format: Format) -> Result<Self> {
        let declaration = match format {
            Format::Json => serde_json::from_str(content)?,
            Format::Toml => toml::from_str(content)?,
        };
        Ok(declaration)
    }

    /// Assemble every component and register them as one pipeline.
    pub fn to_pipeline(&self) -> Result<Pipeline> {
        let components = self
            .components
            .iter()
            .enumerate()
            .map(|(i, c)| {
                c.to_definition()
                    .with_context(|| format!("Invalid component #{i} in pipeline '{}'", self.name))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Pipeline::new(self.name.as_str(), components)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Toml,
}

impl Format {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Format::Toml,
            _ => Format::Json,
        }
    }
}

pub fn load_pipeline(path: &Path) -> Result<Pipeline> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read declaration file: {:?}", path))?;
    let format = Format::from_path(path);
    debug!(path = ?path, format = ?format, "Loading pipeline declaration");

    let declaration = PipelineDeclaration::parse(&content, format)
        .with_context(|| format!("Invalid declaration in {:?}", path))?;
    declaration.to_pipeline()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ingestflow_core::ComponentError;

    const TOML_DECLARATION: &str = r#"
name = "taxi"

[[components]]
kind = "file_based"
instance_name = "csv"
input_base = "/data/x"
[components.output_config]
splits = [{ name = "train", hash_buckets = 3 }, { name = "eval", hash_buckets = 1 }]
[components.executor]
type = "container"
image = "gcr.io/ingest/csv:1.0"
args = ["--input", "{{input}}"]

[[components]]
kind = "query_based"
instance_name = "bq"
[components.input_config]
splits = [{ name = "single", pattern = "SELECT * FROM trips" }]
"#;

    #[test]
    fn test_toml_declaration_builds_pipeline() {
        let declaration = PipelineDeclaration::parse(TOML_DECLARATION, Format::Toml).unwrap();
        let pipeline = declaration.to_pipeline().unwrap();

        assert_eq!(pipeline.name(), "taxi");
        let csv = pipeline.component("FileBasedExampleGen.csv").unwrap();
        assert_eq!(csv.executor_spec().describe(), "container:gcr.io/ingest/csv:1.0");
        let bq = pipeline.component("QueryBasedExampleGen.bq").unwrap();
        assert_eq!(bq.executor_spec().describe(), "class:BaseExampleGenExecutor");
    }

    #[test]
    fn test_json_and_toml_agree() {
        let json = r#"{
            "name": "taxi",
            "components": [{
                "kind": "file_based",
                "input": "/data/x",
                "custom_config": {"delimiter": ";"}
            }]
        }"#;
        let toml = r#"
name = "taxi"
[[components]]
kind = "file_based"
input = "/data/x"
custom_config = { delimiter = ";" }
"#;
        let from_json = PipelineDeclaration::parse(json, Format::Json)
            .unwrap()
            .to_pipeline()
            .unwrap();
        let from_toml = PipelineDeclaration::parse(toml, Format::Toml)
            .unwrap()
            .to_pipeline()
            .unwrap();
        assert_eq!(from_json.digest().unwrap(), from_toml.digest().unwrap());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let json = r#"{"name": "p", "components": [{"kind": "file_based", "inptu": "/x"}]}"#;
        assert!(PipelineDeclaration::parse(json, Format::Json).is_err());
    }

    #[test]
    fn test_component_errors_surface() {
        let json = r#"{"name": "p", "components": [{"kind": "file_based"}]}"#;
        let err = PipelineDeclaration::parse(json, Format::Json)
            .unwrap()
            .to_pipeline()
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ComponentError>(),
            Some(ComponentError::MissingRequiredField { .. })
        ));
    }

    #[test]
    fn test_query_based_requires_input_config() {
        let json = r#"{"name": "p", "components": [{"kind": "query_based"}]}"#;
        let err = PipelineDeclaration::parse(json, Format::Json)
            .unwrap()
            .to_pipeline()
            .unwrap_err();
        assert!(format!("{err:#}").contains("input_config"));
    }

    #[test]
    fn test_unknown_class_executor() {
        let executor = ExecutorDeclaration::Class {
            executor: "NoSuchExecutor".to_string(),
        };
        assert!(executor.to_spec().is_err());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_path(Path::new("p.toml")), Format::Toml);
        assert_eq!(Format::from_path(Path::new("p.json")), Format::Json);
        assert_eq!(Format::from_path(Path::new("p")), Format::Json);
    }
}
