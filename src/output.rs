//! CLI output formatting.
//!
//! Output is **source-centric**: each entry leads with its discovery index
//! and resolved id, with the source path and generated files as indented
//! context lines beneath it.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! 001 cat_123
//!     Source: assets/raw/cat_123.jpg
//!     160w avif: cat_123.9a1f2b3c.160.avif (3.1 KB)
//!     320w avif: cat_123.9a1f2b3c.320.avif (8.4 KB)
//! 002 skipped
//!     Source: assets/raw/broken.jpg
//!     Error: Failed to decode image: ...
//! Done. Wrote 1 items, 1 skipped.
//! ```
//!
//! ## Check
//!
//! ```text
//! Sources in assets/raw
//! 001 cat_123
//!     Source: cat_123.jpg
//! 002 cat_2
//!     Source: .png
//! 2 sources, 4 widths, 1 format: 8 variants
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>` or `String`)
//! for testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure.

use crate::naming::resolve_id;
use crate::process::{ProcessEvent, ProcessResult};
use crate::scan::SourceFile;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte count: `512 B`, `3.1 KB`, `2.4 MB`.
pub fn format_bytes(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{} B", bytes)
    } else if b < MB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / MB)
    }
}

/// Render one progress event as output lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::SourceProcessed {
            index,
            id,
            source_path,
            variants,
        } => {
            let mut lines = vec![
                format!("{} {}", format_index(*index), id),
                format!("{}Source: {}", indent(1), source_path),
            ];
            for variant in variants {
                lines.push(format!(
                    "{}{}w {}: {} ({})",
                    indent(1),
                    variant.width,
                    variant.format.extension(),
                    variant.file_name,
                    format_bytes(variant.bytes)
                ));
            }
            lines
        }
        ProcessEvent::SourceFailed {
            index,
            source_path,
            error,
        } => vec![
            format!("{} skipped", format_index(*index)),
            format!("{}Source: {}", indent(1), source_path),
            format!("{}Error: {}", indent(1), error),
        ],
    }
}

/// The one-line completion summary.
pub fn format_summary(result: &ProcessResult) -> String {
    let written = result.manifest.len();
    match result.failures.len() {
        0 => format!("Done. Wrote {} items.", written),
        skipped => format!("Done. Wrote {} items, {} skipped.", written, skipped),
    }
}

pub fn print_summary(result: &ProcessResult) {
    println!("{}", format_summary(result));
}

/// Discovery listing for the `check` command.
pub fn format_check_output(
    sources: &[SourceFile],
    raw_dir: &Path,
    fallback_prefix: &str,
    widths: usize,
    formats: usize,
) -> Vec<String> {
    let mut lines = vec![format!("Sources in {}", raw_dir.display())];
    for source in sources {
        lines.push(format!(
            "{} {}",
            format_index(source.index),
            resolve_id(&source.stem, source.index, fallback_prefix)
        ));
        lines.push(format!("{}Source: {}", indent(1), source.file_name));
    }
    lines.push(format!(
        "{} {}, {} {}, {} {}: {} variants",
        sources.len(),
        plural(sources.len(), "source"),
        widths,
        plural(widths, "width"),
        formats,
        plural(formats, "format"),
        sources.len() * widths * formats
    ));
    lines
}

pub fn print_check_output(
    sources: &[SourceFile],
    raw_dir: &Path,
    fallback_prefix: &str,
    widths: usize,
    formats: usize,
) {
    for line in format_check_output(sources, raw_dir, fallback_prefix, widths, formats) {
        println!("{}", line);
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}
