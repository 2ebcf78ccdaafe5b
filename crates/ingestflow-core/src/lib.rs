//! ingestflow core
//!
//! Framework pieces shared by every component kind:
//! - `ExecutorSpec`: in-process or containerized execution strategy
//! - `ArtifactChannel`: typed conduits of artifact references
//! - `SpecSchema` / `ComponentSpec`: declared interface and eager binding
//! - `ComponentKind` / `ComponentDefinition`: immutable type descriptors and instances
//! - `Driver`: pre-execution input resolution
//! - `Pipeline`: registration with unique node ids
//!
//! Nothing in this crate performs I/O while a component is being declared.

pub mod artifact;
pub mod component;
pub mod component_spec;
pub mod digest;
pub mod driver;
pub mod error;
pub mod executor_spec;
pub mod pipeline;
pub mod telemetry;

pub use artifact::{Artifact, ArtifactChannel, EXAMPLES, EXTERNAL_ARTIFACT};
pub use component::{ComponentDefinition, ComponentKind, ComponentManifest};
pub use component_spec::{
    ChannelParameter, ComponentSpec, ExecutionParameter, ParameterType, SpecSchema,
};
pub use driver::{Driver, DriverError, DriverResolution, VersionToken};
pub use error::{ComponentError, Result};
pub use executor_spec::{
    ArtifactMap, ExecProperties, ExecutableUnit, ExecutorClassSpec, ExecutorContainerSpec,
    ExecutorSpec,
};
pub use pipeline::{Pipeline, PipelineManifest};
pub use telemetry::{init_logging, LogFormat};
