//! Input/output split configuration and its resolution.
//!
//! Resolution turns possibly-absent user configuration into a concrete
//! `(InputConfig, OutputConfig)` pair and the ordered list of output split
//! names. It is pure: same input, same output, no I/O.

use std::collections::BTreeSet;

use ingestflow_core::{ComponentError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Name of the synthesized input split covering the whole source.
pub const DEFAULT_INPUT_SPLIT: &str = "single";
pub const TRAIN_SPLIT: &str = "train";
pub const EVAL_SPLIT: &str = "eval";

/// A named slice of the source, optionally filtered by a pattern.
///
/// For file-based ingestion the pattern is a glob relative to the source
/// directory; for query-based ingestion it is the query itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSplit {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl InputSplit {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: Some(pattern.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    pub splits: Vec<InputSplit>,
}

/// A named output partition; `hash_buckets` is its relative size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSplit {
    pub name: String,
    pub hash_buckets: u32,
}

impl OutputSplit {
    pub fn new(name: impl Into<String>, hash_buckets: u32) -> Self {
        Self {
            name: name.into(),
            hash_buckets,
        }
    }
}

/// Output partitioning. An empty split list means "one output split per
/// input split, same names".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub splits: Vec<OutputSplit>,
}

fn check_names<'a>(what: &str, names: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = BTreeSet::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(ComponentError::InvalidSplitConfiguration(format!(
                "{what} split name cannot be empty"
            )));
        }
        if !seen.insert(name) {
            return Err(ComponentError::InvalidSplitConfiguration(format!(
                "duplicate {what} split name: {name}"
            )));
        }
    }
    Ok(())
}

impl InputConfig {
    pub fn new(splits: Vec<InputSplit>) -> Self {
        Self { splits }
    }

    /// One split named `single` spanning the entire source.
    pub fn single() -> Self {
        Self {
            splits: vec![InputSplit {
                name: DEFAULT_INPUT_SPLIT.to_string(),
                pattern: None,
            }],
        }
    }

    pub fn split_names(&self) -> Vec<String> {
        self.splits.iter().map(|s| s.name.clone()).collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.splits.is_empty() {
            return Err(ComponentError::InvalidSplitConfiguration(
                "input config must define at least one split".to_string(),
            ));
        }
        check_names("input", self.splits.iter().map(|s| s.name.as_str()))
    }
}

impl OutputConfig {
    pub fn new(splits: Vec<OutputSplit>) -> Self {
        Self { splits }
    }

    /// `train` and `eval` at a 2:1 ratio.
    pub fn train_eval() -> Self {
        Self {
            splits: vec![OutputSplit::new(TRAIN_SPLIT, 2), OutputSplit::new(EVAL_SPLIT, 1)],
        }
    }

    /// Output splits that mirror the input splits one to one.
    pub fn mirrored() -> Self {
        Self::default()
    }

    pub fn split_names(&self) -> Vec<String> {
        self.splits.iter().map(|s| s.name.clone()).collect()
    }

    pub fn validate(&self) -> Result<()> {
        check_names("output", self.splits.iter().map(|s| s.name.as_str()))?;
        if let Some(split) = self.splits.iter().find(|s| s.hash_buckets == 0) {
            return Err(ComponentError::InvalidSplitConfiguration(format!(
                "output split {} must have a positive hash_buckets",
                split.name
            )));
        }
        Ok(())
    }

    /// Share of the data each split receives, in declaration order.
    pub fn proportions(&self) -> Vec<(String, f64)> {
        let total: u64 = self.splits.iter().map(|s| u64::from(s.hash_buckets)).sum();
        if total == 0 {
            return Vec::new();
        }
        self.splits
            .iter()
            .map(|s| (s.name.clone(), f64::from(s.hash_buckets) / total as f64))
            .collect()
    }
}

/// Ordered names of the output splits for a caller-supplied output config.
///
/// Explicit output splits require exactly one input split to re-partition;
/// mirrored output requires more than one input split.
pub fn output_split_names(input: &InputConfig, output: &OutputConfig) -> Result<Vec<String>> {
    if !output.splits.is_empty() {
        if input.splits.len() != 1 {
            return Err(ComponentError::AmbiguousSplitConfiguration(format!(
                "output config defines splits [{}] but input config has {} splits; \
                 leave output splits empty to mirror the input splits",
                output.split_names().join(", "),
                input.splits.len()
            )));
        }
        return Ok(output.split_names());
    }

    if input.splits.len() <= 1 {
        return Err(ComponentError::AmbiguousSplitConfiguration(
            "output config has no splits to mirror; more than one input split is required"
                .to_string(),
        ));
    }
    Ok(input.split_names())
}

/// Concrete split configuration of one ingestion component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSplits {
    pub input_config: InputConfig,
    pub output_config: OutputConfig,
    pub output_split_names: Vec<String>,
}

/// Fill in defaults and derive the output split names.
pub fn resolve_splits(
    input_config: Option<InputConfig>,
    output_config: Option<OutputConfig>,
) -> Result<ResolvedSplits> {
    let input_config = match input_config {
        Some(config) => {
            config.validate()?;
            config
        }
        None => {
            debug!("No input config; using a single split over the whole source");
            InputConfig::single()
        }
    };

    // Synthesized output re-partitions every input split; no cardinality check.
    let (output_config, output_split_names) = match output_config {
        Some(config) => {
            config.validate()?;
            let names = output_split_names(&input_config, &config)?;
            (config, names)
        }
        None => {
            debug!(
                input_splits = input_config.splits.len(),
                "No output config; using train/eval at 2:1"
            );
            let config = OutputConfig::train_eval();
            let names = config.split_names();
            (config, names)
        }
    };

    Ok(ResolvedSplits {
        input_config,
        output_config,
        output_split_names,
    })
}
