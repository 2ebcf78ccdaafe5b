//! End-to-end declaration tests for the ExampleGen family.

use std::sync::Arc;

use async_trait::async_trait;
use ingestflow_core::{
    ArtifactChannel, ArtifactMap, ComponentError, ExecProperties, ExecutableUnit, ExecutorSpec,
    Pipeline,
};
use ingestflow_example_gen::{
    example_channels, input_config_of, output_config_of, FileBasedExampleGen, InputConfig,
    InputSplit, OutputConfig, OutputSplit, QueryBasedExampleGen,
};
use serde_json::json;

struct CsvExecutor;

#[async_trait]
impl ExecutableUnit for CsvExecutor {
    fn name(&self) -> &str {
        "CsvExampleGenExecutor"
    }

    async fn execute(
        &self,
        _inputs: &ArtifactMap,
        _outputs: &ArtifactMap,
        _exec_properties: &ExecProperties,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}

fn split_names(def: &ingestflow_core::ComponentDefinition) -> Vec<String> {
    example_channels(def)
        .iter()
        .map(|c| c.name().to_string())
        .collect()
}

/// Source path only: single input split, train/eval at 2:1, default executor.
#[test]
fn test_file_based_with_only_source_path() {
    let def = FileBasedExampleGen::builder()
        .input_base("/data/x")
        .build()
        .expect("declare");

    let input = input_config_of(&def).unwrap();
    assert_eq!(input.split_names(), vec!["single"]);
    assert!(input.splits[0].pattern.is_none());

    let output = output_config_of(&def).unwrap();
    assert_eq!(
        output.splits,
        vec![OutputSplit::new("train", 2), OutputSplit::new("eval", 1)]
    );

    assert_eq!(split_names(&def), vec!["train", "eval"]);
    for channel in example_channels(&def) {
        assert_eq!(channel.artifact_type(), "Examples");
        assert_eq!(channel.artifacts()[0].split.as_deref(), Some(channel.name()));
    }

    match def.executor_spec() {
        ExecutorSpec::Class(class) => assert_eq!(class.name(), "BaseExampleGenExecutor"),
        ExecutorSpec::Container(_) => panic!("expected the in-process default executor"),
    }
    assert_eq!(def.driver().map(|d| d.name()), Some("FileSystemDriver"));
    assert_eq!(def.node_id(), "FileBasedExampleGen");
}

/// Three explicit output splits keep their names and order.
#[test]
fn test_three_output_splits_preserved() {
    let output = OutputConfig::new(vec![
        OutputSplit::new("train", 1),
        OutputSplit::new("eval", 1),
        OutputSplit::new("test", 1),
    ]);
    let def = FileBasedExampleGen::builder()
        .input_base("/data/x")
        .output_config(output)
        .build()
        .expect("declare");

    assert_eq!(split_names(&def), vec!["train", "eval", "test"]);
}

#[test]
fn test_channel_and_path_sources_are_equivalent() {
    let from_path = FileBasedExampleGen::builder()
        .input_base("/data/x")
        .build()
        .expect("declare from path");
    let from_channel = FileBasedExampleGen::builder()
        .input(ArtifactChannel::external("/data/x").unwrap())
        .build()
        .expect("declare from channel");

    assert_eq!(from_path, from_channel);
    assert_eq!(from_path.spec(), from_channel.spec());
}

#[test]
fn test_file_based_without_source_fails() {
    let result = FileBasedExampleGen::builder().build();
    match result {
        Err(ComponentError::MissingRequiredField { component, field }) => {
            assert_eq!(component, "FileBasedExampleGen");
            assert_eq!(field, "input");
        }
        other => panic!("expected MissingRequiredField, got {other:?}"),
    }
}

#[test]
fn test_file_based_with_both_sources_fails() {
    let result = FileBasedExampleGen::builder()
        .input_base("/data/x")
        .input(ArtifactChannel::external("/data/x").unwrap())
        .build();
    assert!(matches!(result, Err(ComponentError::ConflictingFields { .. })));
}

#[test]
fn test_source_channel_of_wrong_type_fails() {
    let result = FileBasedExampleGen::builder()
        .input(ArtifactChannel::examples_for_split("train").unwrap())
        .build();
    assert!(matches!(result, Err(ComponentError::TypeMismatch { .. })));
}

#[test]
fn test_declaration_is_idempotent() {
    let declare = || {
        FileBasedExampleGen::builder()
            .input_base("/data/x")
            .custom_config(json!({"delimiter": ","}))
            .instance_name("csv")
            .build()
            .expect("declare")
    };
    let first = declare();
    let second = declare();
    assert_eq!(first, second);
    assert_eq!(first.digest().unwrap(), second.digest().unwrap());
}

#[test]
fn test_mirrored_output_for_multiple_input_splits() {
    let input = InputConfig::new(vec![
        InputSplit::new("train", "train/*"),
        InputSplit::new("eval", "eval/*"),
    ]);
    let def = FileBasedExampleGen::builder()
        .input_base("/data/x")
        .input_config(input)
        .output_config(OutputConfig::mirrored())
        .build()
        .expect("declare");
    assert_eq!(split_names(&def), vec!["train", "eval"]);
}

/// Pre-split source without an output config: train/eval at 2:1 over all
/// input splits, the input splits themselves kept as declared.
#[test]
fn test_multiple_input_splits_without_output_config() {
    let input = InputConfig::new(vec![
        InputSplit::new("train", "train/*"),
        InputSplit::new("eval", "eval/*"),
    ]);
    let def = FileBasedExampleGen::builder()
        .input_base("/data/x")
        .input_config(input.clone())
        .build()
        .expect("declare");

    assert_eq!(input_config_of(&def).unwrap(), input);
    assert_eq!(output_config_of(&def).unwrap(), OutputConfig::train_eval());
    assert_eq!(split_names(&def), vec!["train", "eval"]);
}

#[test]
fn test_explicit_output_with_multiple_input_splits_is_rejected() {
    let input = InputConfig::new(vec![
        InputSplit::new("train", "train/*"),
        InputSplit::new("eval", "eval/*"),
    ]);
    let result = FileBasedExampleGen::builder()
        .input_base("/data/x")
        .input_config(input)
        .output_config(OutputConfig::train_eval())
        .build();
    assert!(matches!(
        result,
        Err(ComponentError::AmbiguousSplitConfiguration(_))
    ));
}

#[test]
fn test_custom_executor_overrides_default() {
    let container = ExecutorSpec::container(
        "gcr.io/ingest/csv:1.0",
        None,
        Some(vec!["--output={{output_dict['examples'][0].uri}}".to_string()]),
    )
    .unwrap();
    let def = FileBasedExampleGen::builder()
        .input_base("/data/x")
        .custom_executor_spec(container.clone())
        .build()
        .expect("declare");
    assert_eq!(def.executor_spec(), &container);
    // the rest of the definition does not depend on the executor choice
    let default = FileBasedExampleGen::builder()
        .input_base("/data/x")
        .build()
        .unwrap();
    assert_eq!(def.spec(), default.spec());
}

#[test]
fn test_format_specific_kind_replaces_default_executor() {
    let executor: Arc<dyn ExecutableUnit> = Arc::new(CsvExecutor);
    let csv_kind = FileBasedExampleGen::kind()
        .unwrap()
        .renamed("CsvExampleGen")
        .with_default_executor(ExecutorSpec::class(Some(executor)).unwrap());

    let def = FileBasedExampleGen::builder()
        .kind(csv_kind)
        .input_base("/data/x")
        .build()
        .expect("declare");
    assert_eq!(def.node_id(), "CsvExampleGen");
    assert_eq!(def.executor_spec().describe(), "class:CsvExampleGenExecutor");
}

#[test]
fn test_example_artifacts_override() {
    let channels = vec![ArtifactChannel::examples_for_split("all").unwrap()];
    let def = FileBasedExampleGen::builder()
        .input_base("/data/x")
        .example_artifacts(channels.clone())
        .build()
        .expect("declare");
    assert_eq!(example_channels(&def), channels.as_slice());
}

#[test]
fn test_empty_example_artifacts_override_fails() {
    let result = FileBasedExampleGen::builder()
        .input_base("/data/x")
        .example_artifacts(vec![])
        .build();
    assert!(matches!(result, Err(ComponentError::MissingRequiredField { .. })));
}

#[test]
fn test_custom_config_must_be_an_object() {
    let result = FileBasedExampleGen::builder()
        .input_base("/data/x")
        .custom_config(json!(["not", "an", "object"]))
        .build();
    assert!(matches!(result, Err(ComponentError::TypeMismatch { .. })));
}

#[test]
fn test_query_based_declaration() {
    let input = InputConfig::new(vec![InputSplit::new(
        "single",
        "SELECT * FROM `chicago_taxi_trips.taxi_trips`",
    )]);
    let def = QueryBasedExampleGen::builder(input)
        .instance_name("bq")
        .build()
        .expect("declare");

    assert_eq!(def.node_id(), "QueryBasedExampleGen.bq");
    assert!(def.spec().inputs().is_empty());
    assert!(def.driver().is_none());
    assert_eq!(split_names(&def), vec!["train", "eval"]);
}

#[test]
fn test_two_ingestion_components_in_one_pipeline() {
    let csv = FileBasedExampleGen::builder()
        .input_base("/data/csv")
        .instance_name("csv")
        .build()
        .unwrap();
    let avro = FileBasedExampleGen::builder()
        .input_base("/data/avro")
        .instance_name("avro")
        .build()
        .unwrap();
    let pipeline = Pipeline::new("taxi", vec![csv, avro]).expect("pipeline");
    assert!(pipeline.component("FileBasedExampleGen.avro").is_some());

    let unnamed_a = FileBasedExampleGen::builder().input_base("/a").build().unwrap();
    let unnamed_b = FileBasedExampleGen::builder().input_base("/b").build().unwrap();
    assert!(matches!(
        Pipeline::new("taxi", vec![unnamed_a, unnamed_b]),
        Err(ComponentError::DuplicateNodeId(_))
    ));
}
