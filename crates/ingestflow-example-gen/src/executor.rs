//! Default in-process executor for the ExampleGen kinds.

use async_trait::async_trait;
use ingestflow_core::{ArtifactMap, ExecProperties, ExecutableUnit};

/// Placeholder executor attached to the generic ExampleGen kinds.
///
/// The generic kinds only describe the ingestion interface. Format-specific
/// kinds (CSV, TFRecord, a query engine) replace this through
/// `ComponentKind::with_default_executor` or a per-instance override, so
/// running it is always a wiring mistake.
#[derive(Debug, Default, Clone, Copy)]
pub struct BaseExampleGenExecutor;

impl BaseExampleGenExecutor {
    pub const NAME: &'static str = "BaseExampleGenExecutor";
}

#[async_trait]
impl ExecutableUnit for BaseExampleGenExecutor {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn execute(
        &self,
        _inputs: &ArtifactMap,
        outputs: &ArtifactMap,
        _exec_properties: &ExecProperties,
    ) -> anyhow::Result<()> {
        anyhow::bail!(
            "{} has no ingestion logic; declare the component with a concrete executor \
             (outputs: {:?})",
            Self::NAME,
            outputs.keys().collect::<Vec<_>>()
        )
    }
}
