//! Orchestration of the two generation passes.

use camino::Utf8PathBuf;

use crate::aggregator;
use crate::config::GenConfig;
use crate::error::GenResult;
use crate::extractor::{self, Skipped};
use crate::fragment::{self, Fragment};
use crate::layout::Layout;
use crate::output;
use crate::pkl::PklTool;

/// Summary of a completed generation run.
#[derive(Debug)]
pub struct GenerationReport {
    /// Aggregator module that was written and formatted.
    pub aggregator_path: Utf8PathBuf,
    /// Metadata sidecar that was written.
    pub metadata_path: Utf8PathBuf,
    /// Fragments bound in the aggregator module.
    pub fragments: Vec<Fragment>,
    /// Number of metadata entries written.
    pub entries: usize,
    /// Fragments left out of the metadata sidecar.
    pub skipped: Vec<Skipped>,
}

/// Runs the aggregator pass and then the metadata pass.
///
/// Each pass discovers the fragment set afresh. The aggregator pass,
/// including the formatter, finishes before any reflection starts.
///
/// # Errors
///
/// Fails when the fragment directory cannot be read, the aggregator module
/// cannot be written, the formatter cannot be started, or the metadata
/// sidecar cannot be persisted. Per-fragment reflection failures are
/// reported in [`GenerationReport::skipped`] instead.
pub fn generate(config: &GenConfig) -> GenResult<GenerationReport> {
    let layout = Layout::new(config.root.clone());
    let tool = PklTool::new(config.pkl.clone(), config.root.clone(), config.timeout());

    let fragments = fragment::discover(&layout.builtins_dir())?;
    let aggregator_path = aggregator::generate(&layout, &tool, &fragments)?;

    let metadata_fragments = fragment::discover(&layout.builtins_dir())?;
    let extraction = extractor::extract_all(&layout, &tool, &metadata_fragments)?;
    let metadata_path = layout.metadata_path();
    output::write_metadata(&metadata_path, &extraction.entries)?;

    tracing::info!(
        fragments = fragments.len(),
        entries = extraction.entries.len(),
        skipped = extraction.skipped.len(),
        "generated builtins"
    );

    Ok(GenerationReport {
        aggregator_path,
        metadata_path,
        fragments,
        entries: extraction.entries.len(),
        skipped: extraction.skipped,
    })
}
