//! Conversion of filesystem paths into `file:` URIs for Pkl imports.

use camino::Utf8Path;

/// Builds a `file:` URI for an absolute path on the current platform.
///
/// Windows paths such as `C:\repo\x.pkl` have their separators normalised
/// and gain the extra slash required before a drive letter.
#[must_use]
pub fn file_uri(path: &Utf8Path) -> String {
    file_uri_for(path.as_str(), cfg!(windows))
}

fn file_uri_for(path: &str, is_windows: bool) -> String {
    if is_windows {
        format!("file:///{}", path.replace('\\', "/"))
    } else {
        format!("file://{path}")
    }
}
