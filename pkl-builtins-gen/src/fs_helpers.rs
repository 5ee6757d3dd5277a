//! Filesystem helpers shared across `pkl-builtins-gen` modules.

use std::io::Write;

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::{Dir, OpenOptions};

use crate::error::{GenError, GenResult};

/// Opens an existing directory with ambient authority.
pub fn open_dir(path: &Utf8Path) -> GenResult<Dir> {
    Dir::open_ambient_dir(path, ambient_authority()).map_err(|err| GenError::io(path, err))
}

/// Splits a file path into its directory (`.` for bare names) and file name.
pub fn split_file_path(path: &Utf8Path) -> GenResult<(&Utf8Path, &str)> {
    let file_name = path.file_name().ok_or_else(|| {
        GenError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        )
    })?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    Ok((parent, file_name))
}

/// Opens the parent directory of `path` and returns it with the file name.
pub fn open_parent(path: &Utf8Path) -> GenResult<(Dir, &str)> {
    let (parent, file_name) = split_file_path(path)?;
    Ok((open_dir(parent)?, file_name))
}

/// Replaces the contents of `path`, creating it when missing.
pub fn overwrite_file(path: &Utf8Path, contents: &str) -> GenResult<()> {
    let (dir, file_name) = open_parent(path)?;
    let mut file = dir
        .open_with(
            file_name,
            OpenOptions::new().write(true).create(true).truncate(true),
        )
        .map_err(|err| GenError::io(path, err))?;
    file.write_all(contents.as_bytes())
        .map_err(|err| GenError::io(path, err))?;
    Ok(())
}
