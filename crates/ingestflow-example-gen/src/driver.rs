//! File-system driver for file-based ingestion.
//!
//! Walks the source directory, assigns files to input splits by glob pattern
//! and fingerprints the matched set so the orchestrator can tell whether new
//! data arrived since the previous run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use ingestflow_core::{Driver, DriverError, DriverResolution, ExecProperties, VersionToken};
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::component::INPUT_CONFIG_KEY;
use crate::split::InputConfig;

#[derive(Debug, Clone)]
struct SourceFile {
    relative: String,
    path: PathBuf,
    size: u64,
    modified_nanos: u128,
}

/// Translate a glob into an anchored regex over `/`-separated paths.
///
/// `*` and `?` stay within one path segment, `**` crosses segments and
/// `**/` also matches zero directories.
pub fn glob_to_regex(pattern: &str) -> Result<Regex, DriverError> {
    let mut re = String::from("^");
    let mut chars = pattern.trim_start_matches('/').chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                if chars.peek() == Some(&'/') {
                    chars.next();
                    re.push_str("(?:.*/)?");
                } else {
                    re.push_str(".*");
                }
            }
            '*' => re.push_str("[^/]*"),
            '?' => re.push_str("[^/]"),
            other => re.push_str(&regex::escape(other.encode_utf8(&mut [0u8; 4]))),
        }
    }
    re.push('$');

    Regex::new(&re).map_err(|e| DriverError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

async fn list_files(root: &Path) -> Result<Vec<SourceFile>, DriverError> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            // `file_type` does not follow symlinks; linked entries are skipped.
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                pending.push(path);
                continue;
            }
            if !file_type.is_file() {
                continue;
            }
            let metadata = entry.metadata().await?;

            let relative = path
                .strip_prefix(root)
                .unwrap_or(path.as_path())
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            let modified_nanos = metadata
                .modified()?
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0);

            files.push(SourceFile {
                relative,
                path,
                size: metadata.len(),
                modified_nanos,
            });
        }
    }

    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(files)
}

fn input_config_from(exec_properties: &ExecProperties) -> Result<InputConfig, DriverError> {
    match exec_properties.get(INPUT_CONFIG_KEY) {
        None | Some(serde_json::Value::Null) => Ok(InputConfig::single()),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| DriverError::InvalidConfiguration(format!("{INPUT_CONFIG_KEY}: {e}"))),
    }
}

/// Default driver of the file-based ExampleGen kind.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSystemDriver;

impl FileSystemDriver {
    pub const NAME: &'static str = "FileSystemDriver";
}

#[async_trait]
impl Driver for FileSystemDriver {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn resolve(
        &self,
        source_uri: &str,
        exec_properties: &ExecProperties,
        previous: Option<&VersionToken>,
    ) -> Result<DriverResolution, DriverError> {
        let root = Path::new(source_uri);
        match tokio::fs::metadata(root).await {
            Ok(m) if m.is_dir() => {}
            _ => return Err(DriverError::SourceNotFound(source_uri.to_string())),
        }

        let input_config = input_config_from(exec_properties)?;
        let available = list_files(root).await?;

        let mut hasher = Sha256::new();
        let mut last_modified_nanos = 0u128;
        let mut files = BTreeMap::new();

        for split in &input_config.splits {
            let matcher = match &split.pattern {
                Some(pattern) => Some(glob_to_regex(pattern)?),
                None => None,
            };
            let matched: Vec<&SourceFile> = available
                .iter()
                .filter(|f| matcher.as_ref().map_or(true, |re| re.is_match(&f.relative)))
                .collect();

            if matched.is_empty() {
                return Err(DriverError::NoMatchingFiles {
                    split: split.name.clone(),
                    pattern: split.pattern.clone().unwrap_or_else(|| "*".to_string()),
                });
            }
            debug!(split = %split.name, files = matched.len(), "Matched split files");

            for file in &matched {
                hasher.update(split.name.as_bytes());
                hasher.update(b"\0");
                hasher.update(file.relative.as_bytes());
                hasher.update(b"\0");
                hasher.update(file.size.to_le_bytes());
                hasher.update(file.modified_nanos.to_le_bytes());
                hasher.update(b"\n");
                last_modified_nanos = last_modified_nanos.max(file.modified_nanos);
            }
            files.insert(
                split.name.clone(),
                matched.iter().map(|f| f.path.clone()).collect(),
            );
        }

        let resolution = DriverResolution {
            version: VersionToken::observed_after(
                previous,
                last_modified_nanos,
                hex::encode(hasher.finalize()),
            ),
            files,
        };
        info!(
            source = %source_uri,
            files = resolution.file_count(),
            sequence = resolution.version.sequence,
            fingerprint = %resolution.version.fingerprint,
            "Resolved ingestion source"
        );
        Ok(resolution)
    }
}
