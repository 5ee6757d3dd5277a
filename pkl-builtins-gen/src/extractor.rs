//! The metadata pass: reflect over each fragment and collect its entry.

use crate::error::GenResult;
use crate::fragment::Fragment;
use crate::layout::Layout;
use crate::metadata::{MetadataEntry, SkipReason, extract_entry};
use crate::pkl::{PklTool, reflection_expression};
use crate::uri::file_uri;

/// A fragment that produced no metadata, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    /// Fragment that was skipped.
    pub fragment: Fragment,
    /// Why no entry was produced.
    pub reason: SkipReason,
}

/// Result of the metadata pass.
#[derive(Debug, Default)]
pub struct Extraction {
    /// Entries in fragment order.
    pub entries: Vec<MetadataEntry>,
    /// Fragments left out of `entries`.
    pub skipped: Vec<Skipped>,
}

/// Extracts metadata for every fragment, in order.
///
/// A fragment that cannot be reflected or decoded is logged and skipped; it
/// never stops the pass.
///
/// # Errors
///
/// Fails only when the reflection script path cannot be resolved.
pub fn extract_all(
    layout: &Layout,
    tool: &PklTool,
    fragments: &[Fragment],
) -> GenResult<Extraction> {
    let expression = reflection_expression(&file_uri(&layout.reflect_script()?));
    let mut extraction = Extraction::default();

    for fragment in fragments {
        match extract_one(tool, &expression, fragment) {
            Ok(entry) => extraction.entries.push(entry),
            Err(reason) => {
                tracing::warn!(
                    fragment = %fragment.file_name,
                    reason = %reason,
                    "skipping builtin metadata"
                );
                extraction.skipped.push(Skipped {
                    fragment: fragment.clone(),
                    reason,
                });
            }
        }
    }

    Ok(extraction)
}

/// Reflects over one fragment and decodes its entry.
///
/// # Errors
///
/// Returns the [`SkipReason`] for a fragment that yields no entry.
pub fn extract_one(
    tool: &PklTool,
    expression: &str,
    fragment: &Fragment,
) -> Result<MetadataEntry, SkipReason> {
    let json = tool.reflect(&Layout::fragment_arg(&fragment.file_name), expression)?;
    extract_entry(&json)
}
