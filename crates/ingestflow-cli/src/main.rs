//! ingestflow - pipeline declaration CLI
//!
//! Loads a pipeline declaration file and works with its ingestion
//! components without running them.
//!
//! ## Commands
//!
//! - `resolve`: Print the assembled pipeline manifest
//! - `digest`: Print content digests of the pipeline and each component
//! - `scan`: Run a component's driver against its source

mod declaration;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ingestflow_core::{init_logging, DriverResolution, LogFormat, Pipeline, VersionToken};
use ingestflow_example_gen::source_uri;
use tracing::{info, Level};

use crate::declaration::load_pipeline;

#[derive(Parser)]
#[command(name = "ingestflow")]
#[command(author = "Ingestflow Developers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Declarative ingestion components for ML pipelines", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true, env = "INGESTFLOW_LOG_JSON")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble a declaration and print its manifest as JSON
    Resolve {
        /// Declaration file (.json or .toml)
        file: PathBuf,
    },

    /// Print content digests of the pipeline and its components
    Digest {
        /// Declaration file (.json or .toml)
        file: PathBuf,
    },

    /// Resolve the concrete input files of one component
    Scan {
        /// Declaration file (.json or .toml)
        file: PathBuf,

        /// Node id of the component, e.g. `FileBasedExampleGen.csv`
        #[arg(short, long)]
        component: String,

        /// Output of an earlier scan; the new version is ordered after it
        #[arg(long)]
        previous: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let format = if cli.json {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    init_logging(format, level);

    match cli.command {
        Commands::Resolve { file } => cmd_resolve(&file),
        Commands::Digest { file } => cmd_digest(&file),
        Commands::Scan {
            file,
            component,
            previous,
        } => {
            let previous = previous.as_deref().map(read_resolution).transpose()?;
            let resolution =
                cmd_scan(&file, &component, previous.as_ref().map(|r| &r.version)).await?;
            println!("{}", serde_json::to_string_pretty(&resolution)?);
            Ok(())
        }
    }
}

fn cmd_resolve(file: &Path) -> Result<()> {
    let pipeline = load_pipeline(file)?;
    println!("{}", serde_json::to_string_pretty(&pipeline.manifest())?);
    Ok(())
}

fn cmd_digest(file: &Path) -> Result<()> {
    let pipeline = load_pipeline(file)?;
    for (node_id, digest) in component_digests(&pipeline)? {
        println!("{node_id}: {digest}");
    }
    println!("Pipeline {}: {}", pipeline.name(), pipeline.digest()?);
    Ok(())
}

fn component_digests(pipeline: &Pipeline) -> Result<Vec<(String, String)>> {
    pipeline
        .components()
        .iter()
        .map(|c| -> Result<(String, String)> { Ok((c.node_id(), c.digest()?)) })
        .collect()
}

fn read_resolution(path: &Path) -> Result<DriverResolution> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scan output: {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid scan output in {:?}", path))
}

async fn cmd_scan(
    file: &Path,
    node_id: &str,
    previous: Option<&VersionToken>,
) -> Result<DriverResolution> {
    let pipeline = load_pipeline(file)?;
    let definition = pipeline
        .component(node_id)
        .with_context(|| format!("No component '{node_id}' in pipeline '{}'", pipeline.name()))?;
    let driver = definition
        .driver()
        .with_context(|| format!("Component '{node_id}' has no driver"))?;
    let source = source_uri(definition)
        .with_context(|| format!("Component '{node_id}' declares no source location"))?;

    let resolution = driver
        .resolve(source, definition.spec().exec_properties(), previous)
        .await
        .with_context(|| format!("Driver {} failed for '{node_id}'", driver.name()))?;
    info!(
        component = %node_id,
        files = resolution.file_count(),
        "Scan complete"
    );
    Ok(resolution)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_declaration(dir: &Path, source: &Path) -> PathBuf {
        let path = dir.join("pipeline.toml");
        let content = format!(
            r#"
name = "taxi"

[[components]]
kind = "file_based"
instance_name = "csv"
input = "{}"
[components.input_config]
splits = [{{ name = "train", pattern = "train/*" }}, {{ name = "eval", pattern = "eval/*" }}]
[components.output_config]
splits = []
"#,
            source.display()
        );
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_scan_resolves_declared_source() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("data");
        std::fs::create_dir_all(source.join("train")).unwrap();
        std::fs::create_dir_all(source.join("eval")).unwrap();
        std::fs::write(source.join("train/a.csv"), "x\n1\n").unwrap();
        std::fs::write(source.join("eval/b.csv"), "x\n2\n").unwrap();
        let file = write_declaration(temp_dir.path(), &source);

        let resolution = cmd_scan(&file, "FileBasedExampleGen.csv", None).await.unwrap();
        assert_eq!(resolution.file_count(), 2);
        assert_eq!(resolution.files["train"].len(), 1);

        // an earlier scan written to disk feeds the next one
        let saved = temp_dir.path().join("scan.json");
        std::fs::write(&saved, serde_json::to_string_pretty(&resolution).unwrap()).unwrap();
        std::fs::remove_file(source.join("eval/b.csv")).unwrap();
        std::fs::write(source.join("eval/c.csv"), "x\n3\n").unwrap();

        let previous = read_resolution(&saved).unwrap();
        let next = cmd_scan(&file, "FileBasedExampleGen.csv", Some(&previous.version))
            .await
            .unwrap();
        assert_eq!(next.version.sequence, previous.version.sequence + 1);
        assert!(next.version > previous.version);
    }

    #[tokio::test]
    async fn test_scan_unknown_component() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = write_declaration(temp_dir.path(), temp_dir.path());

        let err = cmd_scan(&file, "FileBasedExampleGen.avro", None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No component"));
    }

    #[test]
    fn test_digests_cover_every_component() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = write_declaration(temp_dir.path(), Path::new("/data/x"));
        let pipeline = load_pipeline(&file).unwrap();

        let digests = component_digests(&pipeline).unwrap();
        assert_eq!(digests.len(), 1);
        assert_eq!(digests[0].0, "FileBasedExampleGen.csv");
        assert_eq!(digests[0].1.len(), 64);
    }

    #[test]
    fn test_missing_declaration_file() {
        let err = load_pipeline(Path::new("/nonexistent/pipeline.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read declaration file"));
    }
}
