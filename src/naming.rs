//! Source ids and output file names.
//!
//! Every generated file is named from four parts:
//!
//! ```text
//! {id}.{fingerprint}.{width}.{format}
//! cat_123.9a1f2b3c.320.avif
//! ```
//!
//! - **id**: the source file name with its image extension stripped
//!   (`cat_123.JPG` → `cat_123`). A file whose stem is empty (`.png`) gets
//!   a synthetic id `{prefix}_{n}` from its 1-based discovery position.
//! - **fingerprint**: see [`crate::fingerprint`].
//! - **width**: the *configured* target width, even when the source was
//!   narrower and the variant kept its native size.
//! - **format**: the output format's file extension.
//!
//! Everything here is a pure function of its inputs, so re-running the
//! pipeline on unchanged sources yields the same names.

/// Strip a trailing `.{ext}` (case-insensitive) for the first matching
/// extension. Returns the name unchanged when nothing matches.
///
/// Works on the raw file name rather than [`Path::file_stem`](std::path::Path::file_stem),
/// which treats `.png` as a stem with no extension.
pub fn derive_id(file_name: &str, extensions: &[String]) -> String {
    let lower = file_name.to_ascii_lowercase();
    for ext in extensions {
        let suffix = format!(".{}", ext.to_ascii_lowercase());
        if lower.ends_with(&suffix) {
            return file_name[..file_name.len() - suffix.len()].to_string();
        }
    }
    file_name.to_string()
}

/// Use `stem` as the id, or `{prefix}_{index}` when it is empty.
pub fn resolve_id(stem: &str, index: usize, prefix: &str) -> String {
    if stem.is_empty() {
        format!("{}_{}", prefix, index)
    } else {
        stem.to_string()
    }
}

/// Output file name for one variant.
pub fn asset_name(id: &str, fingerprint: &str, width: u32, extension: &str) -> String {
    format!("{}.{}.{}.{}", id, fingerprint, width, extension)
}

/// Root-relative URL for a file under the public prefix.
///
/// ```
/// # use srcsetter::naming::public_path;
/// assert_eq!(public_path("/img", "a.1.320.avif"), "/img/a.1.320.avif");
/// assert_eq!(public_path("/img/", "a.1.320.avif"), "/img/a.1.320.avif");
/// assert_eq!(public_path("", "a.1.320.avif"), "/a.1.320.avif");
/// ```
pub fn public_path(prefix: &str, file_name: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), file_name)
}

/// One `srcset` candidate: `"{path} {width}w"`.
pub fn srcset_entry(path: &str, width: u32) -> String {
    format!("{} {}w", path, width)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exts() -> Vec<String> {
        vec!["jpg".into(), "jpeg".into(), "png".into()]
    }

    #[test]
    fn derive_id_strips_extension() {
        assert_eq!(derive_id("cat_123.jpg", &exts()), "cat_123");
        assert_eq!(derive_id("sunset.jpeg", &exts()), "sunset");
        assert_eq!(derive_id("logo.png", &exts()), "logo");
    }

    #[test]
    fn derive_id_is_case_insensitive() {
        assert_eq!(derive_id("Beach.JPG", &exts()), "Beach");
        assert_eq!(derive_id("x.JpEg", &exts()), "x");
    }

    #[test]
    fn derive_id_keeps_inner_dots() {
        assert_eq!(derive_id("my.cat.photo.png", &exts()), "my.cat.photo");
    }

    #[test]
    fn derive_id_empty_stem() {
        assert_eq!(derive_id(".png", &exts()), "");
        assert_eq!(derive_id(".JPG", &exts()), "");
    }

    #[test]
    fn derive_id_unmatched_extension_unchanged() {
        assert_eq!(derive_id("notes.txt", &exts()), "notes.txt");
    }

    #[test]
    fn resolve_id_prefers_stem() {
        assert_eq!(resolve_id("tabby", 3, "cat"), "tabby");
    }

    #[test]
    fn resolve_id_falls_back_to_discovery_position() {
        assert_eq!(resolve_id("", 1, "cat"), "cat_1");
        assert_eq!(resolve_id("", 7, "cat"), "cat_7");
    }

    #[test]
    fn asset_name_format() {
        assert_eq!(
            asset_name("cat_123", "9a1f2b3c", 320, "avif"),
            "cat_123.9a1f2b3c.320.avif"
        );
    }

    #[test]
    fn asset_name_is_deterministic() {
        let a = asset_name("x", "deadbeef", 160, "webp");
        let b = asset_name("x", "deadbeef", 160, "webp");
        assert_eq!(a, b);
    }

    #[test]
    fn srcset_entry_format() {
        assert_eq!(
            srcset_entry("/img/a.deadbeef.160.avif", 160),
            "/img/a.deadbeef.160.avif 160w"
        );
    }
}
