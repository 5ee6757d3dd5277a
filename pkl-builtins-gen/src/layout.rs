//! Fixed repository layout the generator reads from and writes to.

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::{GenError, GenResult};

/// Directory holding one `.pkl` fragment per builtin.
pub const BUILTINS_DIR: &str = "pkl/builtins";
/// Generated aggregator module.
pub const AGGREGATOR_FILE: &str = "pkl/Builtins.pkl";
/// Generated metadata sidecar.
pub const METADATA_FILE: &str = "pkl/builtins_meta.json";
/// Pkl script that renders a module's reflected structure.
pub const REFLECT_SCRIPT: &str = "scripts/reflect.pkl";

/// Paths used by a generation run, anchored at the project root.
///
/// Subprocesses run with the root as their working directory, so the
/// `*_arg` accessors return root-relative paths for use on command lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: Utf8PathBuf,
}

impl Layout {
    /// Creates a layout rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Fragment directory.
    #[must_use]
    pub fn builtins_dir(&self) -> Utf8PathBuf {
        self.resolve(BUILTINS_DIR)
    }

    /// Aggregator module output.
    #[must_use]
    pub fn aggregator_path(&self) -> Utf8PathBuf {
        self.resolve(AGGREGATOR_FILE)
    }

    /// Metadata sidecar output.
    #[must_use]
    pub fn metadata_path(&self) -> Utf8PathBuf {
        self.resolve(METADATA_FILE)
    }

    /// Aggregator module path relative to the root.
    #[must_use]
    pub fn aggregator_arg() -> Utf8PathBuf {
        Utf8PathBuf::from(AGGREGATOR_FILE)
    }

    /// Fragment path relative to the root.
    #[must_use]
    pub fn fragment_arg(file_name: &str) -> Utf8PathBuf {
        Utf8Path::new(BUILTINS_DIR).join(file_name)
    }

    /// Absolute path of the reflection script.
    ///
    /// The path is made absolute against the current directory without
    /// resolving symlinks.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::Io`] if the current directory cannot be read and
    /// [`GenError::NonUtf8Path`] if the result is not UTF-8.
    pub fn reflect_script(&self) -> GenResult<Utf8PathBuf> {
        let relative = self.resolve(REFLECT_SCRIPT);
        let absolute = std::path::absolute(relative.as_std_path())
            .map_err(|err| GenError::io(relative.clone(), err))?;
        Utf8PathBuf::from_path_buf(absolute)
            .map_err(|path| GenError::NonUtf8Path(path.display().to_string()))
    }

    fn resolve(&self, relative: &str) -> Utf8PathBuf {
        if self.root.as_str().is_empty() || self.root == "." {
            Utf8PathBuf::from(relative)
        } else {
            self.root.join(relative)
        }
    }
}
