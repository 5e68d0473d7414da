//! # srcsetter
//!
//! A build-time responsive image pipeline. Point it at a flat directory of
//! raw JPEG/PNG sources and it writes content-addressed, resized variants
//! plus a single JSON manifest a frontend can turn into `<img srcset>` markup
//! with a ThumbHash placeholder.
//!
//! # Architecture
//!
//! ```text
//! assets/raw/*.{jpg,jpeg,png}
//!     │  scan: flat, sorted, case-insensitive extension match
//!     ▼
//! per source (parallel)
//!     ├── fingerprint   SHA-256 of the bytes, truncated
//!     ├── placeholder   64x64 cover sample → ThumbHash → PNG data URL
//!     └── variants      every width × format → public/img/{id}.{fp}.{w}.{ext}
//!     ▼
//! public/categories.json   one record per processed source, discovery order
//! ```
//!
//! Every run reprocesses every source and rewrites the manifest wholesale.
//! Unchanged inputs produce byte-identical outputs under identical names, so
//! the pipeline is idempotent without a cache.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Discovers source files in the raw directory |
//! | [`fingerprint`] | Content hash used to cache-bust file names |
//! | [`naming`] | Ids, `{id}.{fingerprint}.{width}.{ext}` names, public paths |
//! | [`imaging`] | Decode, resize, encode, and sample via the [`imaging::ImageBackend`] trait |
//! | [`placeholder`] | ThumbHash encoding and preview data URLs |
//! | [`process`] | The orchestrator: parallel per-source work, failure isolation |
//! | [`manifest`] | Manifest record model and the atomic manifest writer |
//! | [`config`] | `srcsetter.toml` loading, merging over defaults, validation |
//! | [`output`] | CLI output formatting |
//! | [`logging`] | `tracing` subscriber setup |
//!
//! # Design Decisions
//!
//! ## Content-Addressed Names
//!
//! Variant names embed a fingerprint of the *source* bytes, so an edited
//! source gets new URLs and can be served with far-future cache headers. The
//! fingerprint is a cache-buster, not an integrity check.
//!
//! ## Skip, Don't Abort
//!
//! A corrupt or unreadable source is logged, reported, and left out of the
//! manifest. Only failures that make the output itself untrustworthy (an
//! unwritable output directory, a failed variant or manifest write) stop the
//! run.
//!
//! ## N Formats, One Schema
//!
//! `images` in each manifest record carries one `{ext}Srcset` key per
//! configured format. Adding a WebP fallback is a config change.

pub mod config;
pub mod fingerprint;
pub mod imaging;
pub mod logging;
pub mod manifest;
pub mod naming;
pub mod output;
pub mod placeholder;
pub mod process;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
