//! Discovery of builtin fragments and derivation of their identifiers.

use camino::Utf8Path;

use crate::error::{GenError, GenResult};
use crate::fs_helpers::open_dir;

/// File extension that marks a fragment.
pub const FRAGMENT_EXTENSION: &str = "pkl";

/// A single builtin configuration fragment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Fragment {
    /// File name within the builtins directory, e.g. `node-js.pkl`.
    pub file_name: String,
    /// Pkl identifier derived from the file stem, e.g. `node_js`.
    pub identifier: String,
}

impl Fragment {
    /// Builds a fragment from its file name.
    ///
    /// Returns `None` unless the name has the fragment extension and a
    /// non-empty stem.
    #[must_use]
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let path = Utf8Path::new(file_name);
        if path.extension() != Some(FRAGMENT_EXTENSION) {
            return None;
        }
        let stem = path.file_stem().filter(|stem| !stem.is_empty())?;
        Some(Self {
            file_name: file_name.to_owned(),
            identifier: identifier_for(stem),
        })
    }

    /// Import path of the fragment relative to the aggregator module.
    ///
    /// Pkl module paths always use `/`, whatever the host platform.
    #[must_use]
    pub fn relative_path(&self) -> String {
        format!("builtins/{}", self.file_name)
    }
}

/// Converts a fragment file stem into a Pkl identifier.
#[must_use]
pub fn identifier_for(stem: &str) -> String {
    stem.replace('-', "_")
}

/// Lists the fragments directly inside `dir`, sorted by file name.
///
/// Only files (or symlinks) ending in `.pkl` are returned. Hidden files are
/// skipped, as a `*.pkl` shell glob would skip them.
///
/// # Errors
///
/// Any failure to read the directory or an entry is returned; a fragment
/// whose name is not UTF-8 is reported as [`GenError::NonUtf8Path`].
pub fn discover(dir: &Utf8Path) -> GenResult<Vec<Fragment>> {
    let handle = open_dir(dir)?;
    let mut fragments = Vec::new();
    for entry_result in handle.read_dir(".").map_err(|err| GenError::io(dir, err))? {
        let entry = entry_result.map_err(|err| GenError::io(dir, err))?;
        let file_type = entry.file_type().map_err(|err| GenError::io(dir, err))?;
        if file_type.is_dir() {
            continue;
        }
        let file_name = entry.file_name().map_err(|err| match err.kind() {
            std::io::ErrorKind::InvalidData => GenError::NonUtf8Path(format!("entry in {dir}")),
            _ => GenError::io(dir, err),
        })?;
        if file_name.starts_with('.') {
            continue;
        }
        if let Some(fragment) = Fragment::from_file_name(&file_name) {
            fragments.push(fragment);
        }
    }

    fragments.sort_by(|left, right| left.file_name.cmp(&right.file_name));
    Ok(fragments)
}
