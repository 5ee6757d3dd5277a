//! Serialisation and atomic persistence of the metadata sidecar.

use std::io::{self, Write};

use camino::Utf8Path;
use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use tempfile::NamedTempFile;

use crate::error::{GenError, GenResult};
use crate::fs_helpers::{open_parent, split_file_path};
use crate::metadata::MetadataEntry;

/// Renders entries as a single-line JSON array followed by a newline.
///
/// The layout matches the sidecar already checked in: `", "` and `": "`
/// separators, with every non-ASCII character written as a `\uXXXX` escape.
///
/// # Errors
///
/// Returns [`GenError::MetadataJson`] if serialisation fails.
pub fn render_metadata(entries: &[MetadataEntry]) -> GenResult<String> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, SidecarFormatter);
    entries.serialize(&mut serializer)?;
    buf.push(b'\n');
    // Every byte written is ASCII.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Single-line JSON with spaced separators and ASCII-only strings.
struct SidecarFormatter;

impl Formatter for SidecarFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(ch.encode_utf8(&mut [0_u8; 4]).as_bytes())?;
            } else {
                for unit in ch.encode_utf16(&mut [0_u16; 2]) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}

/// Writes the metadata sidecar so readers never see a partial file.
///
/// # Errors
///
/// See [`write_atomically`].
pub fn write_metadata(path: &Utf8Path, entries: &[MetadataEntry]) -> GenResult<()> {
    let contents = render_metadata(entries)?;
    write_atomically(path, contents.as_bytes())
}

/// Writes `contents` to a temporary file beside `path`, then renames it over
/// `path`.
///
/// The temporary file lives in the destination directory so the rename stays
/// on one filesystem. It is removed if any step fails.
///
/// # Errors
///
/// Returns [`GenError::Io`] if the temporary file cannot be created or
/// written, and [`GenError::Persist`] if the final rename fails.
pub fn write_atomically(path: &Utf8Path, contents: &[u8]) -> GenResult<()> {
    let (dir, file_name) = split_file_path(path)?;
    let mut temp = temp_file_in(dir, file_name).map_err(|err| GenError::io(dir, err))?;
    temp.write_all(contents)
        .and_then(|()| temp.flush())
        .map_err(|err| GenError::io(temp_path(&temp), err))?;
    temp.persist(path).map_err(|err| GenError::Persist {
        path: path.to_path_buf(),
        source: err.error,
    })?;
    Ok(())
}

/// Reads a metadata sidecar back into entries.
///
/// # Errors
///
/// Returns [`GenError::Io`] if the file cannot be read and
/// [`GenError::MetadataParse`] if it is not a valid entry list.
pub fn load_metadata(path: &Utf8Path) -> GenResult<Vec<MetadataEntry>> {
    let (dir, file_name) = open_parent(path)?;
    let json = dir
        .read_to_string(file_name)
        .map_err(|err| GenError::io(path, err))?;
    serde_json::from_str(&json).map_err(|source| GenError::MetadataParse {
        path: path.to_path_buf(),
        source,
    })
}

fn temp_file_in(dir: &Utf8Path, file_name: &str) -> std::io::Result<NamedTempFile> {
    tempfile::Builder::new()
        .prefix(&format!("{file_name}."))
        .suffix(".tmp")
        .tempfile_in(dir)
}

fn temp_path(temp: &NamedTempFile) -> String {
    temp.path().display().to_string()
}
