//! Build-time generator for the Pkl builtins aggregator and metadata sidecar.
//!
//! Two passes run over `pkl/builtins/*.pkl`. The first writes
//! `pkl/Builtins.pkl`, which binds every fragment under one module, and runs
//! `pkl format` over it. The second reflects over each fragment with
//! `pkl eval` and writes `pkl/builtins_meta.json` atomically. Fragments that
//! fail reflection are left out of the sidecar without failing the run.

pub mod aggregator;
pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod fragment;
pub mod fs_helpers;
pub mod generate;
pub mod layout;
pub mod logging;
pub mod metadata;
pub mod output;
pub mod pkl;
pub mod process;
pub mod uri;

pub use config::GenConfig;
pub use error::{GenError, GenResult};
pub use generate::{GenerationReport, generate};
pub use metadata::{MetadataEntry, ProjectIndicator};
pub use output::load_metadata;
