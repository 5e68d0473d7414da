//! Source discovery.
//!
//! Lists the raw source directory (flat, not recursive) and keeps files whose
//! name ends in one of the accepted extensions, compared case-insensitively.
//! Hidden files are *not* skipped: `.png` is a valid source that ends up with
//! a synthetic id.
//!
//! ## Ordering
//!
//! Entries are returned sorted by file name. That order is the *discovery
//! order*: it drives the manifest's record order and the `n` in synthetic
//! `cat_{n}` ids. Sorting is byte-wise on the file name, so `B.jpg` comes
//! before `a.jpg`.

use crate::naming::derive_id;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Source directory not found: {0}")]
    NotFound(PathBuf),
    #[error("Source path is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Failed to list source directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A discovered source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// 1-based discovery position.
    pub index: usize,
    pub path: PathBuf,
    pub file_name: String,
    /// File name with the accepted extension stripped. May be empty.
    pub stem: String,
}

/// Discover source images directly inside `raw_dir`.
pub fn discover(raw_dir: &Path, extensions: &[String]) -> Result<Vec<SourceFile>, ScanError> {
    if !raw_dir.exists() {
        return Err(ScanError::NotFound(raw_dir.to_path_buf()));
    }
    if !raw_dir.is_dir() {
        return Err(ScanError::NotADirectory(raw_dir.to_path_buf()));
    }

    let mut sources = Vec::new();
    for entry in WalkDir::new(raw_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let path = match entry {
            Ok(entry) if entry.file_type().is_file() => entry.into_path(),
            Ok(_) => continue,
            // A broken symlink or unstattable entry is still a source: reading
            // it fails later and the source is skipped. Only the root is fatal.
            Err(err) => match unreadable_entry_path(&err) {
                Some(path) => path,
                None => return Err(ScanError::Walk(err)),
            },
        };
        let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        if !has_accepted_extension(&file_name, extensions) {
            continue;
        }
        sources.push(SourceFile {
            index: sources.len() + 1,
            stem: derive_id(&file_name, extensions),
            path,
            file_name,
        });
    }

    Ok(sources)
}

/// Path of a failed entry below the root, or `None` when the walk itself failed.
fn unreadable_entry_path(err: &walkdir::Error) -> Option<PathBuf> {
    if err.depth() == 0 {
        return None;
    }
    err.path().map(Path::to_path_buf)
}

fn has_accepted_extension(file_name: &str, extensions: &[String]) -> bool {
    let lower = file_name.to_ascii_lowercase();
    extensions
        .iter()
        .any(|ext| lower.ends_with(&format!(".{}", ext.to_ascii_lowercase())))
}
