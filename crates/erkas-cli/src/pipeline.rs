//! Run orchestration with explicit stages.
//!
//! 1. **Discover**: list region files per source kind
//! 2. **Process**: analyze every region on a bounded thread pool
//! 3. **Classify**: split outcomes into rows, skips and fatal errors
//! 4. **Finalize**: per-kind tables, national table, skip manifest, merge
//!
//! Stage 4 starts only after every region task has returned.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, info, info_span, warn};

use erkas_core::{CancellationToken, CoreError, ProcessedRegion, RegionProcessor};
use erkas_ingest::{FileStore, GeoStore, RegionFile, discover_region_files};
use erkas_model::{OutputLayout, PipelineConfig, SkipCategory, SkippedRegion, SourceKind};
use erkas_report::{
    SummaryTable, combine_kind_tables, merge_artifacts, prepare_layout, write_skip_manifest,
};

use crate::types::{NationalOutputs, RegionRow, RunResult, RunStatus};

/// Everything a run needs besides the cancellation token.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub config: PipelineConfig,
    /// Worker threads; `None` uses one per CPU.
    pub jobs: Option<usize>,
    pub finalize_partial: bool,
    pub show_progress: bool,
}

impl RunOptions {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            config: PipelineConfig::default(),
            jobs: None,
            finalize_partial: false,
            show_progress: false,
        }
    }
}

/// Result of one region task.
#[derive(Debug)]
pub enum RegionOutcome {
    Processed(ProcessedRegion),
    Skipped(SkippedRegion),
    /// Stopped by the cancellation token before finishing.
    Cancelled(PathBuf),
    Failed { file: RegionFile, error: CoreError },
}

/// Regions split by outcome, each list in discovery order.
#[derive(Debug, Default)]
pub struct ClassifiedOutcomes {
    pub processed: Vec<ProcessedRegion>,
    pub skipped: Vec<SkippedRegion>,
    pub cancelled: Vec<PathBuf>,
}

// ============================================================================
// Entry point
// ============================================================================

/// Runs the whole pipeline.
///
/// Returns `Ok` with [`RunStatus::Cancelled`] when `cancel` fired and no
/// region failed. A fatal region error cancels the remaining tasks and is
/// returned as the run error.
pub fn run_pipeline(options: &RunOptions, cancel: &CancellationToken) -> Result<RunResult> {
    let span = info_span!(
        "run",
        input_dir = %options.input_dir.display(),
        output_dir = %options.output_dir.display()
    );
    let _guard = span.enter();
    let start = Instant::now();

    let layout = OutputLayout::new(&options.output_dir);
    prepare_layout(&layout).context("prepare output layout")?;

    let files = discover(&options.input_dir, &options.config)?;
    let store = FileStore::from_config(&options.config);
    let outcomes = process_regions(&files, options, &store, &layout, cancel)?;
    let classified = classify(outcomes)?;

    let status = if cancel.is_cancelled() {
        RunStatus::Cancelled
    } else {
        RunStatus::Completed
    };

    let outputs = if status == RunStatus::Completed || options.finalize_partial {
        finalize(&layout, &store, &classified)?
    } else {
        warn!(
            completed = classified.processed.len(),
            "run cancelled; national outputs not written"
        );
        NationalOutputs::default()
    };

    info!(
        regions = classified.processed.len(),
        skipped = classified.skipped.len(),
        cancelled = classified.cancelled.len(),
        duration_ms = start.elapsed().as_millis(),
        "run finished"
    );

    Ok(RunResult {
        output_dir: options.output_dir.clone(),
        status,
        regions: classified
            .processed
            .into_iter()
            .map(|region| RegionRow {
                source_file: region.file.path,
                segments: region.segments,
                summary: region.summary,
            })
            .collect(),
        skipped: classified.skipped,
        not_processed: classified.cancelled.len(),
        outputs,
    })
}

// ============================================================================
// Stage 1: Discover
// ============================================================================

pub fn discover(input_dir: &Path, config: &PipelineConfig) -> Result<Vec<RegionFile>> {
    let files = discover_region_files(input_dir, &config.input)
        .with_context(|| format!("discover region files in {}", input_dir.display()))?;
    for kind in SourceKind::ALL {
        let count = files.iter().filter(|file| file.kind == kind).count();
        info!(kind = %kind, file_count = count, "region files discovered");
    }
    Ok(files)
}

// ============================================================================
// Stage 2: Process
// ============================================================================

/// Maps each file whose subset path is already taken by an earlier file to
/// that earlier file's path.
pub fn subset_collisions(
    files: &[RegionFile],
    layout: &OutputLayout,
) -> BTreeMap<usize, PathBuf> {
    let mut owners: BTreeMap<PathBuf, &Path> = BTreeMap::new();
    let mut collisions = BTreeMap::new();
    for (idx, file) in files.iter().enumerate() {
        let subset = layout.region_subset(file.kind, &file.stem);
        match owners.get(&subset) {
            Some(first) => {
                collisions.insert(idx, first.to_path_buf());
            }
            None => {
                owners.insert(subset, &file.path);
            }
        }
    }
    collisions
}

fn duplicate_outcome(file: &RegionFile, first: &Path) -> RegionOutcome {
    warn!(
        region = %file.region_token,
        source_file = %file.path.display(),
        first = %first.display(),
        "duplicate file stem; region skipped"
    );
    RegionOutcome::Skipped(SkippedRegion {
        source_file: file.path.clone(),
        region: file.region_token.clone(),
        source_kind: file.kind,
        category: SkipCategory::DuplicateStem,
        reason: format!("stem '{}' already used by {}", file.stem, first.display()),
    })
}

/// Processes every file on a dedicated pool. Outcomes keep the order of
/// `files`, independent of completion order.
///
/// Files that would overwrite an earlier file's subset are skipped without
/// being read.
pub fn process_regions(
    files: &[RegionFile],
    options: &RunOptions,
    store: &dyn GeoStore,
    layout: &OutputLayout,
    cancel: &CancellationToken,
) -> Result<Vec<RegionOutcome>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.jobs.unwrap_or(0))
        .build()
        .context("build worker pool")?;
    debug!(threads = pool.current_num_threads(), "worker pool ready");

    let progress = progress_bar(files.len(), options.show_progress)?;
    let processor = RegionProcessor::new(&options.config, store, layout, cancel);
    let collisions = subset_collisions(files, layout);

    let outcomes = pool.install(|| {
        files
            .par_iter()
            .enumerate()
            .map(|(idx, file)| {
                let outcome = match collisions.get(&idx) {
                    Some(first) => duplicate_outcome(file, first),
                    None => run_region(&processor, file, cancel),
                };
                progress.set_message(file.region_token.clone());
                progress.inc(1);
                outcome
            })
            .collect::<Vec<_>>()
    });
    progress.finish_and_clear();
    Ok(outcomes)
}

fn run_region(
    processor: &RegionProcessor<'_>,
    file: &RegionFile,
    cancel: &CancellationToken,
) -> RegionOutcome {
    match processor.process(file) {
        Ok(processed) => RegionOutcome::Processed(processed),
        Err(CoreError::Cancelled) => RegionOutcome::Cancelled(file.path.clone()),
        Err(error) => match error.skip_category() {
            Some(category) => {
                warn!(
                    region = %file.region_token,
                    source_file = %file.path.display(),
                    category = ?category,
                    error = %error,
                    "region skipped"
                );
                RegionOutcome::Skipped(SkippedRegion {
                    source_file: file.path.clone(),
                    region: file.region_token.clone(),
                    source_kind: file.kind,
                    category,
                    reason: error.to_string(),
                })
            }
            None => {
                // Stop the other tasks early.
                cancel.cancel();
                RegionOutcome::Failed {
                    file: file.clone(),
                    error,
                }
            }
        },
    }
}

fn progress_bar(len: usize, visible: bool) -> Result<ProgressBar> {
    if !visible {
        return Ok(ProgressBar::hidden());
    }
    let progress = ProgressBar::new(len as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("progress bar template")?
            .progress_chars("=> "),
    );
    Ok(progress)
}

// ============================================================================
// Stage 3: Classify
// ============================================================================

/// Splits outcomes by kind of result. The first failure in discovery order
/// becomes the run error.
pub fn classify(outcomes: Vec<RegionOutcome>) -> Result<ClassifiedOutcomes> {
    let mut classified = ClassifiedOutcomes::default();
    let mut failure = None;
    for outcome in outcomes {
        match outcome {
            RegionOutcome::Processed(region) => classified.processed.push(region),
            RegionOutcome::Skipped(skipped) => classified.skipped.push(skipped),
            RegionOutcome::Cancelled(path) => classified.cancelled.push(path),
            RegionOutcome::Failed { file, error } => {
                if failure.is_none() {
                    failure = Some((file, error));
                }
            }
        }
    }
    if let Some((file, error)) = failure {
        return Err(anyhow::Error::new(error)).with_context(|| {
            format!(
                "region {} ({}) failed",
                file.region_token,
                file.path.display()
            )
        });
    }
    Ok(classified)
}

// ============================================================================
// Stage 4: Finalize
// ============================================================================

/// Writes per-kind tables, the national table, the skip manifest and the
/// merged national dataset, in that order.
pub fn finalize(
    layout: &OutputLayout,
    store: &dyn GeoStore,
    classified: &ClassifiedOutcomes,
) -> Result<NationalOutputs> {
    let mut outputs = NationalOutputs::default();

    for kind in SourceKind::ALL {
        let table = SummaryTable::from_summaries(
            classified
                .processed
                .iter()
                .filter(|region| region.file.kind == kind)
                .map(|region| &region.summary),
        );
        let path = layout.kind_table(kind);
        table
            .write_csv(&path)
            .with_context(|| format!("write {kind} summary table"))?;
        info!(kind = %kind, rows = table.len(), path = %path.display(), "summary table written");
        outputs.kind_tables.push(path);
    }

    let national = combine_kind_tables(layout).context("combine summary tables")?;
    let table_path = layout.national_table();
    national
        .write_csv(&table_path)
        .context("write national table")?;
    outputs.table = Some(table_path);

    let manifest_path = layout.skip_manifest();
    write_skip_manifest(&manifest_path, &classified.skipped).context("write skip manifest")?;
    outputs.skip_manifest = Some(manifest_path);

    let mut seen = BTreeSet::new();
    let artifacts: Vec<PathBuf> = classified
        .processed
        .iter()
        .map(|region| region.subset_path.clone())
        .filter(|path| seen.insert(path.clone()))
        .collect();
    let merged = merge_artifacts(store, &artifacts).context("merge region datasets")?;
    let dataset_path = layout.national_dataset();
    store
        .write_dataset(&dataset_path, &merged)
        .context("write national dataset")?;
    info!(
        features = merged.len(),
        path = %dataset_path.display(),
        "national dataset written"
    );
    outputs.dataset = Some(dataset_path);

    Ok(outputs)
}
