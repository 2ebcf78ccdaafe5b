//! Pre-execution drivers.
//!
//! A driver is invoked by the orchestration engine before the executor runs.
//! Given the resolved source location it reports which files belong to this
//! run and a version token that orders successive snapshots of the source.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::executor_spec::ExecProperties;

/// Errors surfaced by drivers.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("source not found: {0}")]
    SourceNotFound(String),

    #[error("split {split} does not match any files (pattern {pattern:?})")]
    NoMatchingFiles { split: String, pattern: String },

    #[error("invalid split pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("invalid driver configuration: {0}")]
    InvalidConfiguration(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Version marker for one snapshot of a source.
///
/// `sequence` counts content changes relative to the token handed to the
/// driver as `previous`, so ordering follows the order in which snapshots
/// were observed even when files are deleted or replaced by older ones.
/// Modification time and fingerprint only break ties between tokens that
/// were not derived from one another.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VersionToken {
    pub sequence: u64,
    pub last_modified_nanos: u128,
    pub fingerprint: String,
}

impl VersionToken {
    /// Token for a snapshot observed after `previous`.
    ///
    /// An unchanged fingerprint keeps the previous token; any other change
    /// moves one step past it.
    pub fn observed_after(
        previous: Option<&VersionToken>,
        last_modified_nanos: u128,
        fingerprint: String,
    ) -> Self {
        match previous {
            Some(prev) if prev.fingerprint == fingerprint => prev.clone(),
            Some(prev) => Self {
                sequence: prev.sequence + 1,
                last_modified_nanos,
                fingerprint,
            },
            None => Self {
                sequence: 0,
                last_modified_nanos,
                fingerprint,
            },
        }
    }
}

/// Concrete inputs for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverResolution {
    pub version: VersionToken,
    /// Files per input split, sorted.
    pub files: BTreeMap<String, Vec<PathBuf>>,
}

impl DriverResolution {
    pub fn file_count(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }
}

#[async_trait]
pub trait Driver: Send + Sync {
    /// Stable identifier, used for equality and manifests.
    fn name(&self) -> &str;

    /// `previous` is the token of the last snapshot the caller acted on.
    async fn resolve(
        &self,
        source_uri: &str,
        exec_properties: &ExecProperties,
        previous: Option<&VersionToken>,
    ) -> Result<DriverResolution, DriverError>;
}
