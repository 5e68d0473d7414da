//! The manifest consumed by the frontend.
//!
//! A single JSON array, one record per successfully processed source, in
//! discovery order:
//!
//! ```json
//! [
//!   {
//!     "id": "cat_123",
//!     "name": "cat_123",
//!     "aspectRatio": 1.0,
//!     "placeholder": { "thumbhashDataURL": "data:image/png;base64,..." },
//!     "images": {
//!       "avifSrcset": "/img/cat_123.9a1f2b3c.160.avif 160w, /img/cat_123.9a1f2b3c.320.avif 320w",
//!       "src": "/img/cat_123.9a1f2b3c.320.avif"
//!     }
//!   }
//! ]
//! ```
//!
//! `images` carries one `{format}Srcset` key per configured output format,
//! so adding a fallback format is a config change, not a schema change.
//! `src` always points into the primary (first) format.
//!
//! The file is rewritten wholesale on every run, never merged.

use crate::naming::srcset_entry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One source's entry in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestRecord {
    pub id: String,
    /// Display name: the file stem, empty for stem-less files like `.png`.
    pub name: String,
    pub aspect_ratio: f64,
    pub placeholder: PlaceholderData,
    pub images: ImageSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderData {
    #[serde(rename = "thumbhashDataURL")]
    pub thumbhash_data_url: String,
}

/// Responsive candidates for one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSet {
    /// `{format}Srcset` → `"path1 w1w, path2 w2w, ..."`.
    #[serde(flatten)]
    pub srcsets: BTreeMap<String, String>,
    /// Default variant path.
    pub src: String,
}

/// A generated file as it appears in the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Configured target width (the `w` descriptor).
    pub width: u32,
    /// Root-relative URL.
    pub path: String,
}

/// Manifest key for a format's srcset, e.g. `avifSrcset`.
pub fn srcset_key(extension: &str) -> String {
    format!("{}Srcset", extension)
}

/// Join candidates as a `srcset` attribute value, preserving order.
pub fn format_srcset(candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .map(|c| srcset_entry(&c.path, c.width))
        .collect::<Vec<_>>()
        .join(", ")
}

/// The candidate whose width equals `default_width`, else the first one.
pub fn select_default(candidates: &[Candidate], default_width: u32) -> Option<&Candidate> {
    candidates
        .iter()
        .find(|c| c.width == default_width)
        .or_else(|| candidates.first())
}

/// Serialize the manifest as indented JSON, replacing any existing file.
///
/// Writes to a sibling `.tmp` file first and renames it into place, so a
/// failed write never leaves a truncated manifest behind.
pub fn write_manifest(records: &[ManifestRecord], path: &Path) -> Result<(), ManifestError> {
    let io_err = |source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let json = serde_json::to_string_pretty(records)?;
    let mut tmp_name = OsString::from(path.as_os_str());
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    fs::write(&tmp_path, json).map_err(io_err)?;
    fs::rename(&tmp_path, path).map_err(|err| {
        let _ = fs::remove_file(&tmp_path);
        io_err(err)
    })
}
