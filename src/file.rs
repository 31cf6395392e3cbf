// src/file.rs

use std::{
    fs,
    path::Path,
};

use crate::{Error, Result};

pub fn ensure_directory(dir: &Path) -> Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(Error::Io(std::io::Error::other(format!(
            "Path exists but is not a directory: {}",
            dir.display()
        ))));
    }
    if !dir.exists() { fs::create_dir_all(dir)?; }
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }
    Ok(())
}

/// Remove every regular file directly inside `dir` (subdirectories stay).
/// A missing directory is created. Returns how many files went.
pub fn clear_dir_files(dir: &Path) -> Result<usize> {
    ensure_directory(dir)?;
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    if removed > 0 { logd!("cleared {removed} file(s) from {}", dir.display()); }
    Ok(removed)
}

/// Copy `src` to `dst` (parents created, existing file replaced) and check
/// that the sizes agree. Returns the byte count.
pub fn copy_verified(src: &Path, dst: &Path) -> Result<u64> {
    // Copying a file onto itself truncates it.
    if dst.exists() && fs::canonicalize(src)? == fs::canonicalize(dst)? {
        logd!("{} is already in place", dst.display());
        return Ok(fs::metadata(dst)?.len());
    }
    ensure_parent(dst)?;
    let copied = fs::copy(src, dst)?;
    let expected = fs::metadata(src)?.len();
    if copied != expected || file_size(dst) != Some(expected) {
        return Err(Error::Io(std::io::Error::other(format!(
            "copy of {} to {} is incomplete ({copied} of {expected} bytes)",
            src.display(),
            dst.display()
        ))));
    }
    Ok(copied)
}

/// Size of a regular file, `None` if it is missing or not a file.
pub fn file_size(path: &Path) -> Option<u64> {
    fs::metadata(path).ok().filter(|m| m.is_file()).map(|m| m.len())
}
