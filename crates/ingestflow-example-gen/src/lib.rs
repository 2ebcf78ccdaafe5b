//! ingestflow ExampleGen
//!
//! Ingestion components that bring data into a pipeline and partition it
//! into splits:
//! - split configuration and default resolution (`split`)
//! - query-based and file-based declarations (`component`)
//! - the default placeholder executor (`executor`)
//! - the file-system driver that discovers source files (`driver`)

pub mod component;
pub mod driver;
pub mod executor;
pub mod split;

pub use component::{
    example_channels, input_config_of, output_config_of, source_uri, ExampleGenBuilder,
    ExampleGenVariant, FileBasedExampleGen, QueryBasedExampleGen,
};
pub use driver::{glob_to_regex, FileSystemDriver};
pub use executor::BaseExampleGenExecutor;
pub use split::{
    output_split_names, resolve_splits, InputConfig, InputSplit, OutputConfig, OutputSplit,
    ResolvedSplits,
};
