//! Bounded filesystem reads

use std::fs;

use crate::{Error, NormalizedPath, Result};

/// Largest definition or fixture file polsync will read.
pub const MAX_FILE_SIZE: u64 = 4 * 1024 * 1024;

/// Read text content from a file, refusing files above [`MAX_FILE_SIZE`].
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    let metadata = fs::metadata(&native_path).map_err(|e| Error::io(&native_path, e))?;
    if metadata.len() > MAX_FILE_SIZE {
        return Err(Error::TooLarge {
            path: native_path,
            size: metadata.len(),
            max: MAX_FILE_SIZE,
        });
    }
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// List the regular files below `dir`, recursively, in sorted order.
///
/// A symlink to a regular file is listed; a symlink to a directory is
/// never descended into, so link cycles cannot recurse. A missing
/// directory yields an empty list.
pub fn list_files(dir: &NormalizedPath) -> Result<Vec<NormalizedPath>> {
    let mut files = Vec::new();
    if !dir.is_dir() {
        return Ok(files);
    }
    collect_files(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_files(dir: &NormalizedPath, files: &mut Vec<NormalizedPath>) -> Result<()> {
    let native = dir.to_native();
    let entries = fs::read_dir(&native).map_err(|e| Error::io(&native, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| Error::io(&native, e))?;
        let path = NormalizedPath::new(entry.path());
        let file_type = entry.file_type().map_err(|e| Error::io(entry.path(), e))?;
        if file_type.is_dir() {
            collect_files(&path, files)?;
        } else if file_type.is_file() || (file_type.is_symlink() && path.is_file()) {
            files.push(path);
        } else if file_type.is_symlink() && path.is_dir() {
            tracing::debug!("Skipping symlinked directory {}", path);
        } else {
            tracing::debug!("Skipping non-regular file {}", path);
        }
    }

    Ok(())
}
