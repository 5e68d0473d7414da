//! Responsive variant generation.
//!
//! The orchestrator: discovers sources, renders every (width × format)
//! variant plus a placeholder for each, writes the variants to the output
//! directory, and assembles one [`ManifestRecord`] per source.
//!
//! ## Output Structure
//!
//! ```text
//! public/
//! ├── categories.json                 # Manifest (written last)
//! └── img/
//!     ├── cat_123.9a1f2b3c.160.avif   # {id}.{fingerprint}.{width}.{ext}
//!     ├── cat_123.9a1f2b3c.320.avif
//!     ├── cat_123.9a1f2b3c.480.avif
//!     └── cat_123.9a1f2b3c.640.avif
//! ```
//!
//! ## Parallel Processing
//!
//! Work runs on a dedicated [rayon](https://docs.rs/rayon) pool sized from
//! `processing.max_processes`. Sources are processed in parallel, and within
//! a source the placeholder and every planned variant are fanned out in the
//! same pool. Results are collected in discovery and configured order, so the
//! manifest does not depend on scheduling.
//!
//! ## Failure Isolation
//!
//! A source that cannot be read, decoded, encoded, or sampled is skipped and
//! reported as [`SourceOutcome::Failed`]; the rest of the batch continues.
//! Anything that makes the output untrustworthy (discovery, the output
//! directory, a variant write, the manifest write) aborts the run.

use crate::config::{AspectRatioMode, PipelineConfig, effective_threads};
use crate::fingerprint::fingerprint;
use crate::imaging::{
    BackendError, EncodedVariant, EncodingTarget, ImageBackend, OutputFormat, Quality,
    RustBackend, create_placeholder_sample, encode_variant, plan_variants,
};
use crate::manifest::{
    Candidate, ImageSet, ManifestError, ManifestRecord, PlaceholderData, format_srcset,
    select_default, srcset_key, write_manifest,
};
use crate::naming::{asset_name, public_path, resolve_id};
use crate::placeholder::{Placeholder, PlaceholderError, generate_placeholder};
use crate::scan::{ScanError, SourceFile, discover};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Fatal errors: the run stops and no manifest is written.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("Cannot create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Manifest write failed: {0}")]
    Manifest(#[from] ManifestError),
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Per-source errors: the source is skipped, the run continues.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("read failed: {0}")]
    Read(#[from] std::io::Error),
    #[error("{0}")]
    Imaging(#[from] BackendError),
    #[error("placeholder failed: {0}")]
    Placeholder(#[from] PlaceholderError),
}

/// Configuration for variant generation
#[derive(Debug, Clone)]
pub struct ProcessConfig {
    pub widths: Vec<u32>,
    pub default_width: u32,
    /// Ordered; the first target is the primary format used for `src`.
    pub targets: Vec<EncodingTarget>,
    pub extensions: Vec<String>,
    pub fingerprint_length: usize,
    pub fallback_prefix: String,
    pub public_prefix: String,
    pub placeholder_size: u32,
    pub aspect_ratio: AspectRatioMode,
    pub threads: usize,
    /// AVIF encoder speed handed to [`RustBackend`].
    pub speed: u8,
}

impl ProcessConfig {
    /// Build a ProcessConfig from PipelineConfig values.
    pub fn from_pipeline_config(config: &PipelineConfig) -> Self {
        Self {
            widths: config.images.widths.clone(),
            default_width: config.images.default_width,
            targets: config
                .images
                .formats
                .iter()
                .map(|spec| EncodingTarget {
                    format: spec.format,
                    quality: Quality::new(spec.quality),
                })
                .collect(),
            extensions: config.images.extensions.clone(),
            fingerprint_length: config.naming.fingerprint_length,
            fallback_prefix: config.naming.fallback_prefix.clone(),
            public_prefix: config.public_prefix.clone(),
            placeholder_size: config.placeholder.size,
            aspect_ratio: config.placeholder.aspect_ratio,
            threads: effective_threads(&config.processing),
            speed: config.processing.speed,
        }
    }
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self::from_pipeline_config(&PipelineConfig::default())
    }
}

/// Progress events emitted as each source finishes.
///
/// Sources finish in scheduling order, not discovery order; `index` carries
/// the discovery position.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    SourceProcessed {
        index: usize,
        id: String,
        source_path: String,
        variants: Vec<VariantInfo>,
    },
    SourceFailed {
        index: usize,
        source_path: String,
        error: String,
    },
}

/// One written variant, as reported to the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantInfo {
    /// Configured target width.
    pub width: u32,
    pub format: OutputFormat,
    pub file_name: String,
    pub bytes: usize,
}

/// A source that was skipped.
#[derive(Debug)]
pub struct SourceFailure {
    pub index: usize,
    pub path: PathBuf,
    pub error: SourceError,
}

#[derive(Debug)]
pub enum SourceOutcome {
    Processed {
        record: ManifestRecord,
        variants: Vec<VariantInfo>,
    },
    Failed(SourceFailure),
}

#[derive(Debug)]
pub struct ProcessResult {
    /// One record per processed source, in discovery order.
    pub manifest: Vec<ManifestRecord>,
    /// Skipped sources, in discovery order.
    pub failures: Vec<SourceFailure>,
    pub variants_written: usize,
}

/// Everything computed for one source before anything touches the disk.
struct RenderedSource {
    id: String,
    fingerprint: String,
    placeholder: Placeholder,
    variants: Vec<EncodedVariant>,
}

pub fn process(
    raw_dir: &Path,
    out_dir: &Path,
    config: &ProcessConfig,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    let backend = RustBackend::with_speed(config.speed);
    process_with_backend(&backend, raw_dir, out_dir, config, progress)
}

/// Process sources using a specific backend (allows testing with mock).
pub fn process_with_backend(
    backend: &impl ImageBackend,
    raw_dir: &Path,
    out_dir: &Path,
    config: &ProcessConfig,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    let sources = discover(raw_dir, &config.extensions)?;
    fs::create_dir_all(out_dir).map_err(|source| ProcessError::OutputDir {
        path: out_dir.to_path_buf(),
        source,
    })?;

    info!(
        sources = sources.len(),
        threads = config.threads,
        raw_dir = %raw_dir.display(),
        "processing sources"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;

    let outcomes: Vec<SourceOutcome> = pool.install(|| {
        sources
            .par_iter()
            .map(|source| process_source(backend, source, out_dir, config, progress.as_ref()))
            .collect::<Result<_, _>>()
    })?;

    let mut result = ProcessResult {
        manifest: Vec::new(),
        failures: Vec::new(),
        variants_written: 0,
    };
    for outcome in outcomes {
        match outcome {
            SourceOutcome::Processed { record, variants } => {
                result.variants_written += variants.len();
                result.manifest.push(record);
            }
            SourceOutcome::Failed(failure) => result.failures.push(failure),
        }
    }

    info!(
        processed = result.manifest.len(),
        skipped = result.failures.len(),
        variants = result.variants_written,
        "processing finished"
    );
    Ok(result)
}

/// Process every source, then write the manifest.
///
/// The manifest is only written once all variants are on disk, so it never
/// references a file that does not exist.
pub fn run(
    raw_dir: &Path,
    out_dir: &Path,
    manifest_path: &Path,
    config: &ProcessConfig,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    let backend = RustBackend::with_speed(config.speed);
    run_with_backend(&backend, raw_dir, out_dir, manifest_path, config, progress)
}

pub fn run_with_backend(
    backend: &impl ImageBackend,
    raw_dir: &Path,
    out_dir: &Path,
    manifest_path: &Path,
    config: &ProcessConfig,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    let result = process_with_backend(backend, raw_dir, out_dir, config, progress)?;
    write_manifest(&result.manifest, manifest_path)?;
    info!(path = %manifest_path.display(), records = result.manifest.len(), "manifest written");
    Ok(result)
}

fn process_source(
    backend: &impl ImageBackend,
    source: &SourceFile,
    out_dir: &Path,
    config: &ProcessConfig,
    progress: Option<&Sender<ProcessEvent>>,
) -> Result<SourceOutcome, ProcessError> {
    let source_path = source.path.display().to_string();

    let rendered = match render_source(backend, source, config) {
        Ok(rendered) => rendered,
        Err(error) => {
            warn!(source = %source_path, %error, "skipping source");
            if let Some(tx) = progress {
                let _ = tx.send(ProcessEvent::SourceFailed {
                    index: source.index,
                    source_path,
                    error: error.to_string(),
                });
            }
            return Ok(SourceOutcome::Failed(SourceFailure {
                index: source.index,
                path: source.path.clone(),
                error,
            }));
        }
    };

    let mut variants = Vec::with_capacity(rendered.variants.len());
    let mut candidates: HashMap<OutputFormat, Vec<Candidate>> = HashMap::new();
    for variant in &rendered.variants {
        let width = variant.plan.target_width;
        let format = variant.plan.params.target.format;
        let file_name = asset_name(
            &rendered.id,
            &rendered.fingerprint,
            width,
            format.extension(),
        );
        let path = out_dir.join(&file_name);
        fs::write(&path, &variant.bytes).map_err(|source| ProcessError::Write {
            path: path.clone(),
            source,
        })?;
        debug!(
            file = %file_name,
            width = variant.plan.params.width,
            height = variant.plan.params.height,
            bytes = variant.bytes.len(),
            "variant written"
        );

        candidates.entry(format).or_default().push(Candidate {
            width,
            path: public_path(&config.public_prefix, &file_name),
        });
        variants.push(VariantInfo {
            width,
            format,
            file_name,
            bytes: variant.bytes.len(),
        });
    }

    let record = build_record(source, &rendered, &candidates, config);

    if let Some(tx) = progress {
        let _ = tx.send(ProcessEvent::SourceProcessed {
            index: source.index,
            id: record.id.clone(),
            source_path,
            variants: variants.clone(),
        });
    }

    Ok(SourceOutcome::Processed { record, variants })
}

/// Read, fingerprint, sample, and encode one source. No filesystem writes.
fn render_source(
    backend: &impl ImageBackend,
    source: &SourceFile,
    config: &ProcessConfig,
) -> Result<RenderedSource, SourceError> {
    let bytes = fs::read(&source.path)?;
    let fingerprint = fingerprint(&bytes, config.fingerprint_length);
    let image = backend.decode(&bytes)?;
    let dimensions = (image.width(), image.height());
    let plans = plan_variants(dimensions, &config.widths, &config.targets);

    let (placeholder, variants) = rayon::join(
        || -> Result<Placeholder, SourceError> {
            let sample = create_placeholder_sample(backend, &image, config.placeholder_size)?;
            Ok(generate_placeholder(&sample, dimensions, config.aspect_ratio)?)
        },
        || {
            plans
                .par_iter()
                .map(|plan| encode_variant(backend, &image, plan))
                .collect::<Result<Vec<_>, _>>()
        },
    );

    Ok(RenderedSource {
        id: resolve_id(&source.stem, source.index, &config.fallback_prefix),
        fingerprint,
        placeholder: placeholder?,
        variants: variants?,
    })
}

fn build_record(
    source: &SourceFile,
    rendered: &RenderedSource,
    candidates: &HashMap<OutputFormat, Vec<Candidate>>,
    config: &ProcessConfig,
) -> ManifestRecord {
    let srcsets = config
        .targets
        .iter()
        .filter_map(|target| {
            let set = candidates.get(&target.format)?;
            Some((srcset_key(target.format.extension()), format_srcset(set)))
        })
        .collect();

    let src = config
        .targets
        .first()
        .and_then(|primary| candidates.get(&primary.format))
        .and_then(|set| select_default(set, config.default_width))
        .map(|candidate| candidate.path.clone())
        .unwrap_or_default();

    ManifestRecord {
        id: rendered.id.clone(),
        name: source.stem.clone(),
        aspect_ratio: rendered.placeholder.aspect_ratio,
        placeholder: PlaceholderData {
            thumbhash_data_url: rendered.placeholder.data_url.clone(),
        },
        images: ImageSet { srcsets, src },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use std::sync::mpsc;
    use tempfile::TempDir;

    fn avif() -> EncodingTarget {
        EncodingTarget {
            format: OutputFormat::Avif,
            quality: Quality::new(50),
        }
    }

    fn webp() -> EncodingTarget {
        EncodingTarget {
            format: OutputFormat::Webp,
            quality: Quality::new(70),
        }
    }

    fn test_config(widths: &[u32]) -> ProcessConfig {
        ProcessConfig {
            widths: widths.to_vec(),
            threads: 2,
            ..Default::default()
        }
    }

    /// Raw dir with the given (name, content) files. MockBackend reads the
    /// `WxH` prefix of the content as the decoded size.
    fn setup(files: &[(&str, &str)]) -> (TempDir, PathBuf, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let raw = tmp.path().join("raw");
        let out = tmp.path().join("out");
        fs::create_dir_all(&raw).unwrap();
        for (name, content) in files {
            fs::write(raw.join(name), content).unwrap();
        }
        (tmp, raw, out)
    }

    fn output_files(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    // =========================================================================
    // ProcessConfig
    // =========================================================================

    #[test]
    fn process_config_default_values() {
        let config = ProcessConfig::default();
        assert_eq!(config.widths, vec![160, 320, 480, 640]);
        assert_eq!(config.default_width, 320);
        assert_eq!(config.targets, vec![avif()]);
        assert_eq!(config.fingerprint_length, 8);
        assert_eq!(config.fallback_prefix, "cat");
        assert_eq!(config.public_prefix, "/img");
        assert_eq!(config.placeholder_size, 64);
        assert_eq!(config.aspect_ratio, AspectRatioMode::Sample);
        assert!(config.threads >= 1);
    }

    #[test]
    fn process_config_from_custom_pipeline_config() {
        let mut pipeline = PipelineConfig::default();
        pipeline.images.formats.push(crate::config::FormatSpec {
            format: OutputFormat::Webp,
            quality: 70,
        });
        pipeline.processing.max_processes = Some(1);
        let config = ProcessConfig::from_pipeline_config(&pipeline);
        assert_eq!(config.targets, vec![avif(), webp()]);
        assert_eq!(config.threads, 1);
    }

    // =========================================================================
    // Manifest assembly
    // =========================================================================

    #[test]
    fn default_src_is_exact_width_match() {
        let (_tmp, raw, out) = setup(&[("a.jpg", "1000x750:a")]);
        let result = process_with_backend(
            &MockBackend::new(),
            &raw,
            &out,
            &test_config(&[160, 320, 480, 640]),
            None,
        )
        .unwrap();

        let fp = fingerprint(b"1000x750:a", 8);
        assert_eq!(result.manifest[0].images.src, format!("/img/a.{fp}.320.avif"));
    }

    #[test]
    fn default_src_falls_back_to_first_width() {
        let (_tmp, raw, out) = setup(&[("a.jpg", "1000x750:a")]);
        let result = process_with_backend(
            &MockBackend::new(),
            &raw,
            &out,
            &test_config(&[200, 400]),
            None,
        )
        .unwrap();

        let fp = fingerprint(b"1000x750:a", 8);
        let images = &result.manifest[0].images;
        assert_eq!(images.src, format!("/img/a.{fp}.200.avif"));
        assert_eq!(
            images.srcsets["avifSrcset"],
            format!("/img/a.{fp}.200.avif 200w, /img/a.{fp}.400.avif 400w")
        );
    }

    #[test]
    fn record_fields() {
        let (_tmp, raw, out) = setup(&[("tabby.JPG", "1600x900:x")]);
        let result = process_with_backend(
            &MockBackend::new(),
            &raw,
            &out,
            &test_config(&[160]),
            None,
        )
        .unwrap();

        let record = &result.manifest[0];
        assert_eq!(record.id, "tabby");
        assert_eq!(record.name, "tabby");
        // Square sample under the default aspect-ratio mode
        assert_eq!(record.aspect_ratio, 1.0);
        assert!(
            record
                .placeholder
                .thumbhash_data_url
                .starts_with("data:image/png;base64,")
        );
    }

    #[test]
    fn source_aspect_ratio_mode() {
        let (_tmp, raw, out) = setup(&[("a.jpg", "1600x900:x")]);
        let config = ProcessConfig {
            aspect_ratio: AspectRatioMode::Source,
            ..test_config(&[160])
        };
        let result =
            process_with_backend(&MockBackend::new(), &raw, &out, &config, None).unwrap();
        assert_eq!(result.manifest[0].aspect_ratio, 1600.0 / 900.0);
    }

    #[test]
    fn empty_stem_gets_fallback_id() {
        let (_tmp, raw, out) = setup(&[(".png", "100x100:p"), ("b.jpg", "100x100:b")]);
        let result = process_with_backend(
            &MockBackend::new(),
            &raw,
            &out,
            &test_config(&[160]),
            None,
        )
        .unwrap();

        let ids: Vec<&str> = result.manifest.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["cat_1", "b"]);
        assert_eq!(result.manifest[0].name, "");
        let fp = fingerprint(b"100x100:p", 8);
        assert!(out.join(format!("cat_1.{fp}.160.avif")).exists());
    }

    #[test]
    fn manifest_follows_discovery_order() {
        let files: Vec<(String, String)> = (0..12)
            .map(|i| (format!("img{:02}.jpg", i), format!("800x600:{}", i)))
            .collect();
        let refs: Vec<(&str, &str)> = files
            .iter()
            .map(|(n, c)| (n.as_str(), c.as_str()))
            .collect();
        let (_tmp, raw, out) = setup(&refs);

        let result = process_with_backend(
            &MockBackend::new(),
            &raw,
            &out,
            &test_config(&[160, 320]),
            None,
        )
        .unwrap();

        let ids: Vec<String> = result.manifest.iter().map(|r| r.id.clone()).collect();
        let expected: Vec<String> = (0..12).map(|i| format!("img{:02}", i)).collect();
        assert_eq!(ids, expected);
        assert_eq!(result.variants_written, 24);
        assert_eq!(output_files(&out).len(), 24);
    }

    #[test]
    fn multiple_formats_produce_one_srcset_each() {
        let (_tmp, raw, out) = setup(&[("a.jpg", "1000x750:a")]);
        let config = ProcessConfig {
            targets: vec![avif(), webp()],
            ..test_config(&[160, 320])
        };
        let result =
            process_with_backend(&MockBackend::new(), &raw, &out, &config, None).unwrap();

        let fp = fingerprint(b"1000x750:a", 8);
        let images = &result.manifest[0].images;
        assert_eq!(images.srcsets.len(), 2);
        assert_eq!(
            images.srcsets["webpSrcset"],
            format!("/img/a.{fp}.160.webp 160w, /img/a.{fp}.320.webp 320w")
        );
        // `src` comes from the primary format
        assert_eq!(images.src, format!("/img/a.{fp}.320.avif"));
        assert_eq!(output_files(&out).len(), 4);
    }

    // =========================================================================
    // Backend interaction
    // =========================================================================

    #[test]
    fn records_expected_operations() {
        let (_tmp, raw, out) = setup(&[("a.jpg", "2000x1500:a")]);
        let backend = MockBackend::new();
        process_with_backend(&backend, &raw, &out, &test_config(&[160, 320]), None).unwrap();

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 4);
        assert_eq!(ops[0], RecordedOp::Decode { width: 2000, height: 1500 });
        assert!(ops.contains(&RecordedOp::Sample { size: 64 }));
        assert!(ops.contains(&RecordedOp::Resize {
            width: 160,
            height: 120,
            format: OutputFormat::Avif,
            quality: 50,
        }));
        assert!(ops.contains(&RecordedOp::Resize {
            width: 320,
            height: 240,
            format: OutputFormat::Avif,
            quality: 50,
        }));
    }

    #[test]
    fn narrow_source_is_not_upscaled() {
        let (_tmp, raw, out) = setup(&[("a.jpg", "300x200:a")]);
        let backend = MockBackend::new();
        let result =
            process_with_backend(&backend, &raw, &out, &test_config(&[160, 320, 480]), None)
                .unwrap();

        let resize_widths: Vec<u32> = backend
            .get_operations()
            .iter()
            .filter_map(|op| match op {
                RecordedOp::Resize { width, .. } => Some(*width),
                _ => None,
            })
            .collect();
        assert_eq!(resize_widths.len(), 3);
        assert!(resize_widths.iter().all(|&w| w <= 300));

        // Names and descriptors still use the configured widths
        let fp = fingerprint(b"300x200:a", 8);
        assert!(out.join(format!("a.{fp}.480.avif")).exists());
        assert!(
            result.manifest[0].images.srcsets["avifSrcset"].ends_with(".480.avif 480w")
        );
    }

    // =========================================================================
    // Failure isolation
    // =========================================================================

    #[test]
    fn corrupt_source_is_skipped() {
        let (_tmp, raw, out) = setup(&[
            ("a.jpg", "800x600:a"),
            ("b.jpg", "corrupt"),
            ("c.png", "400x300:c"),
        ]);
        let result = process_with_backend(
            &MockBackend::new(),
            &raw,
            &out,
            &test_config(&[160, 320]),
            None,
        )
        .unwrap();

        let ids: Vec<&str> = result.manifest.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].index, 2);
        assert!(matches!(
            result.failures[0].error,
            SourceError::Imaging(BackendError::Decode(_))
        ));
        assert_eq!(output_files(&out).len(), 4);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_source_is_skipped() {
        let (_tmp, raw, out) = setup(&[("a.jpg", "800x600:a")]);
        std::os::unix::fs::symlink(raw.join("missing.jpg"), raw.join("b.jpg")).unwrap();
        let (tx, rx) = mpsc::channel();

        let result = process_with_backend(
            &MockBackend::new(),
            &raw,
            &out,
            &test_config(&[160]),
            Some(tx),
        )
        .unwrap();

        assert_eq!(result.manifest.len(), 1);
        assert_eq!(result.manifest[0].id, "a");
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].index, 2);
        assert_eq!(result.failures[0].path, raw.join("b.jpg"));
        assert!(matches!(result.failures[0].error, SourceError::Read(_)));
        assert!(
            rx.iter()
                .any(|e| matches!(e, ProcessEvent::SourceFailed { index: 2, .. }))
        );
    }

    #[test]
    fn variant_write_failure_is_fatal_and_no_manifest() {
        let (tmp, raw, out) = setup(&[("a.jpg", "800x600:a")]);
        let fp = fingerprint(b"800x600:a", 8);
        // A directory squatting on the variant's file name makes the write fail
        fs::create_dir_all(out.join(format!("a.{fp}.160.avif"))).unwrap();
        let manifest = tmp.path().join("public/categories.json");

        let result = run_with_backend(
            &MockBackend::new(),
            &raw,
            &out,
            &manifest,
            &test_config(&[160, 320]),
            None,
        );

        match result {
            Err(ProcessError::Write { path, .. }) => {
                assert_eq!(path, out.join(format!("a.{fp}.160.avif")));
            }
            other => panic!("expected ProcessError::Write, got {other:?}"),
        }
        assert!(!manifest.exists());
    }

    #[test]
    fn all_sources_failing_yields_empty_manifest() {
        let (tmp, raw, out) = setup(&[("a.jpg", "corrupt"), ("b.jpg", "corrupt too")]);
        let manifest = tmp.path().join("m.json");
        let result = run_with_backend(
            &MockBackend::new(),
            &raw,
            &out,
            &manifest,
            &test_config(&[160]),
            None,
        )
        .unwrap();

        assert!(result.manifest.is_empty());
        assert_eq!(result.failures.len(), 2);
        assert_eq!(fs::read_to_string(&manifest).unwrap(), "[]");
    }

    #[test]
    fn missing_raw_dir_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let result = process_with_backend(
            &MockBackend::new(),
            &tmp.path().join("nope"),
            &tmp.path().join("out"),
            &test_config(&[160]),
            None,
        );
        assert!(matches!(
            result,
            Err(ProcessError::Scan(ScanError::NotFound(_)))
        ));
    }

    #[test]
    fn unwritable_output_dir_is_fatal() {
        let (tmp, raw, _out) = setup(&[("a.jpg", "800x600:a")]);
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "not a dir").unwrap();

        let result = process_with_backend(
            &MockBackend::new(),
            &raw,
            &blocker.join("img"),
            &test_config(&[160]),
            None,
        );
        assert!(matches!(result, Err(ProcessError::OutputDir { .. })));
    }

    // =========================================================================
    // Progress events
    // =========================================================================

    #[test]
    fn emits_one_event_per_source() {
        let (_tmp, raw, out) = setup(&[("a.jpg", "800x600:a"), ("b.jpg", "corrupt")]);
        let (tx, rx) = mpsc::channel();
        process_with_backend(
            &MockBackend::new(),
            &raw,
            &out,
            &test_config(&[160, 320]),
            Some(tx),
        )
        .unwrap();

        let mut events: Vec<ProcessEvent> = rx.iter().collect();
        events.sort_by_key(|e| match e {
            ProcessEvent::SourceProcessed { index, .. } => *index,
            ProcessEvent::SourceFailed { index, .. } => *index,
        });
        assert_eq!(events.len(), 2);
        match &events[0] {
            ProcessEvent::SourceProcessed { index, id, variants, .. } => {
                assert_eq!(*index, 1);
                assert_eq!(id, "a");
                let widths: Vec<u32> = variants.iter().map(|v| v.width).collect();
                assert_eq!(widths, vec![160, 320]);
            }
            other => panic!("expected SourceProcessed, got {other:?}"),
        }
        assert!(matches!(
            &events[1],
            ProcessEvent::SourceFailed { index: 2, .. }
        ));
    }

    // =========================================================================
    // Idempotence
    // =========================================================================

    #[test]
    fn rerun_reproduces_names_and_manifest() {
        let (tmp, raw, out) = setup(&[("a.jpg", "800x600:a"), ("b.png", "640x480:b")]);
        let manifest = tmp.path().join("public/categories.json");
        let config = test_config(&[160, 320]);

        run_with_backend(&MockBackend::new(), &raw, &out, &manifest, &config, None).unwrap();
        let first_files = output_files(&out);
        let first_manifest = fs::read_to_string(&manifest).unwrap();

        run_with_backend(&MockBackend::new(), &raw, &out, &manifest, &config, None).unwrap();
        assert_eq!(output_files(&out), first_files);
        assert_eq!(fs::read_to_string(&manifest).unwrap(), first_manifest);
        assert_eq!(first_files.len(), 4);
    }

    #[test]
    fn changed_content_changes_names() {
        let (_tmp, raw, out) = setup(&[("a.jpg", "800x600:v1")]);
        let config = test_config(&[160]);
        let first = process_with_backend(&MockBackend::new(), &raw, &out, &config, None).unwrap();

        fs::write(raw.join("a.jpg"), "800x600:v2").unwrap();
        let second =
            process_with_backend(&MockBackend::new(), &raw, &out, &config, None).unwrap();

        assert_ne!(first.manifest[0].images.src, second.manifest[0].images.src);
    }

    // =========================================================================
    // Real backend
    // =========================================================================

    #[test]
    fn rust_backend_writes_decodable_variants() {
        use crate::test_helpers::{encode_test_png, raw_dir_with};

        let tmp = raw_dir_with(&[("tiny.png", encode_test_png(40, 30))]);
        let out = tmp.path().join("out");
        let config = ProcessConfig {
            targets: vec![webp()],
            speed: 10,
            ..test_config(&[16, 32])
        };

        let result = process(&tmp.path().join("raw"), &out, &config, None).unwrap();
        assert_eq!(result.manifest.len(), 1);
        assert_eq!(result.variants_written, 2);

        let files = output_files(&out);
        let small = image::open(out.join(&files[0])).unwrap();
        assert_eq!((small.width(), small.height()), (16, 12));
    }
}
