//! Command-line interface definitions for `pkl-builtins-gen`.

use camino::Utf8PathBuf;
use clap::Parser;
use serde::Serialize;

/// Parsed CLI arguments for `pkl-builtins-gen`.
///
/// Every value is optional so that only flags the user actually passed
/// override the lower configuration layers.
#[derive(Debug, Default, Parser, Serialize)]
#[command(name = "pkl-builtins-gen")]
#[command(about = "Generate pkl/Builtins.pkl and pkl/builtins_meta.json from pkl/builtins")]
#[command(version)]
pub struct Args {
    /// Project root containing the `pkl/` and `scripts/` directories.
    #[arg(long, value_name = "path")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<Utf8PathBuf>,
    /// Pkl executable used for formatting and reflection.
    #[arg(long, value_name = "program")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pkl: Option<String>,
    /// Seconds to wait for each reflection before skipping the fragment.
    #[arg(long = "timeout-secs", value_name = "seconds")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Configuration file to load instead of `pkl-builtins-gen.toml`.
    #[arg(long, value_name = "path")]
    #[serde(skip)]
    pub config: Option<Utf8PathBuf>,
}
