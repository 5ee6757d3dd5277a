//! Generation of the `Builtins.pkl` aggregator module.

use camino::Utf8PathBuf;

use crate::error::GenResult;
use crate::fragment::Fragment;
use crate::fs_helpers::overwrite_file;
use crate::layout::Layout;
use crate::pkl::PklTool;

/// Fixed preamble of the aggregator module.
///
/// Besides importing every fragment it declares the `ProjectIndicator` and
/// `meta` classes that fragments use to describe themselves.
pub const HEADER: &str = r#"// THIS FILE IS GENERATED: Run 'mise run pkl:gen' to generate.

import* "builtins/*.pkl" as Builtins

/// Indicator for detecting if a builtin is relevant to a project
class ProjectIndicator {
  /// Exact file path to check for existence
  file: String?

  /// Glob pattern to match any file
  glob: String?

  /// Content pattern to grep for (requires file to be set)
  contains: String?
}

/// Internal class for annotating hk builtins for documentation generation
class meta extends Annotation {
  /// Category for documentation grouping (e.g., "JavaScript/TypeScript", "Python", "Rust")
  category: String?

  /// Human-readable description of the step for documentation
  description: String?

  /// Project indicators for auto-detection
  project_indicators: Listing<ProjectIndicator>?
}

"#;

/// Name the glob import binds in [`HEADER`].
pub const NAMESPACE: &str = "Builtins";

/// Binding that re-exports a fragment's builtin from the aggregator.
#[must_use]
pub fn binding_line(fragment: &Fragment) -> String {
    format!(
        "{identifier} = {NAMESPACE}[\"{path}\"].{identifier}",
        identifier = fragment.identifier,
        path = fragment.relative_path(),
    )
}

/// Renders the aggregator module for `fragments` in the given order.
#[must_use]
pub fn render(fragments: &[Fragment]) -> String {
    let mut module = String::from(HEADER);
    for fragment in fragments {
        module.push_str(&binding_line(fragment));
        module.push('\n');
    }
    module
}

/// Writes the aggregator module, replacing any previous contents.
///
/// # Errors
///
/// Returns the underlying filesystem error.
pub fn write(layout: &Layout, fragments: &[Fragment]) -> GenResult<Utf8PathBuf> {
    let path = layout.aggregator_path();
    overwrite_file(&path, &render(fragments))?;
    tracing::debug!(path = %path, fragments = fragments.len(), "wrote aggregator module");
    Ok(path)
}

/// Writes the aggregator module and runs the formatter over it.
///
/// # Errors
///
/// Returns filesystem errors and a failure to start the formatter. The
/// formatter's exit status is logged and otherwise ignored.
pub fn generate(
    layout: &Layout,
    tool: &PklTool,
    fragments: &[Fragment],
) -> GenResult<Utf8PathBuf> {
    let path = write(layout, fragments)?;
    let output = tool.format_in_place(&Layout::aggregator_arg())?;
    tracing::debug!(
        status = ?output.status.code(),
        stderr = %String::from_utf8_lossy(&output.stderr).trim(),
        "formatter finished"
    );
    Ok(path)
}
