use std::path::{Path, PathBuf};

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use thiserror::Error;
use tracing::debug;

use crate::barcode::store::BarcodeTable;
use crate::batch::progress::ProgressSink;
use crate::core::types::{BatchResult, SampleResult};
use crate::matching::{CallResolver, LevelMatcher, ResolutionRules};
use crate::parsing::vcf::{check_vcf, read_vcf_file, validate_vcf, VcfContents};

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Failed to start worker threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Why a file contributed no rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Wrong extension, not VCF-shaped, or unparseable
    InvalidInputFile(String),
    /// Parsed fine but carries no genotype call at any barcode site
    EmptyResultFile,
}

impl SkipReason {
    /// One-line notice naming the file and the reason
    pub fn notice(&self, path: &Path) -> String {
        format!("{} {self}. Skipping...", path.display())
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInputFile(reason) => write!(f, "{reason}"),
            Self::EmptyResultFile => write!(f, "does not have any genotyping SNPs"),
        }
    }
}

/// Result of running one file through the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// One row per sample, in sample name order
    Genotyped(Vec<SampleResult>),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

impl SkippedFile {
    pub fn notice(&self) -> String {
        self.reason.notice(&self.path)
    }
}

/// Configuration for a batch run
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Worker threads; `None` uses the global rayon pool
    pub threads: Option<usize>,
    pub rules: ResolutionRules,
}

/// Aggregated rows plus the files that were left out
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub result: BatchResult,
    /// Skipped files, in input order
    pub skipped: Vec<SkippedFile>,
    pub files_genotyped: usize,
}

impl BatchReport {
    /// True when every input was skipped (or there were none)
    pub fn no_valid_inputs(&self) -> bool {
        self.files_genotyped == 0
    }
}

/// Structural sniff test for an input path
pub fn validate_input_file(path: &Path) -> bool {
    validate_vcf(path)
}

/// Match and resolve the records of one parsed VCF.
///
/// A file with no record at a barcode site, or whose rows are all empty, is
/// reported as [`SkipReason::EmptyResultFile`].
pub fn genotype_contents(
    contents: &VcfContents,
    table: &BarcodeTable,
    resolver: &CallResolver,
) -> FileOutcome {
    if contents.records.is_empty() {
        return FileOutcome::Skipped(SkipReason::EmptyResultFile);
    }

    let raw = LevelMatcher::new(table).match_records(&contents.records);
    let rows = resolver.resolve(&raw);

    if rows.iter().all(SampleResult::is_uncalled) {
        return FileOutcome::Skipped(SkipReason::EmptyResultFile);
    }
    FileOutcome::Genotyped(rows)
}

/// Validate, read, match and resolve a single VCF
pub fn genotype_file(path: &Path, table: &BarcodeTable, resolver: &CallResolver) -> FileOutcome {
    if let Err(e) = check_vcf(path) {
        return FileOutcome::Skipped(SkipReason::InvalidInputFile(e.to_string()));
    }

    match read_vcf_file(path, table.valid_positions()) {
        Ok(contents) => {
            debug!(
                "{}: {} records at barcode sites",
                path.display(),
                contents.records.len()
            );
            genotype_contents(&contents, table, resolver)
        }
        Err(e) => FileOutcome::Skipped(SkipReason::InvalidInputFile(format!(
            "could not be parsed ({e})"
        ))),
    }
}

/// Concatenate per-file rows in input order and sort them by level
pub fn aggregate(outcomes: Vec<(PathBuf, FileOutcome)>) -> BatchReport {
    let mut rows = Vec::new();
    let mut skipped = Vec::new();
    let mut files_genotyped = 0;

    for (path, outcome) in outcomes {
        match outcome {
            FileOutcome::Genotyped(file_rows) => {
                files_genotyped += 1;
                rows.extend(file_rows);
            }
            FileOutcome::Skipped(reason) => skipped.push(SkippedFile { path, reason }),
        }
    }

    BatchReport {
        result: BatchResult::from_rows(rows),
        skipped,
        files_genotyped,
    }
}

/// Run every file through the pipeline in parallel, keeping input order
fn genotype_files<S: ProgressSink + ?Sized>(
    paths: &[PathBuf],
    table: &BarcodeTable,
    resolver: &CallResolver,
    sink: &S,
) -> Vec<(PathBuf, FileOutcome)> {
    paths
        .par_iter()
        .map(|path| {
            let outcome = genotype_file(path, table, resolver);
            sink.file_finished(path, &outcome);
            (path.clone(), outcome)
        })
        .collect()
}

/// Genotype a batch of files with explicit options and a progress sink.
///
/// Files are independent; the only shared state is the read-only barcode.
/// The final sort happens after every file has finished.
///
/// # Errors
///
/// Returns `BatchError::ThreadPool` if a dedicated pool of `options.threads`
/// workers cannot be built.
pub fn process_batch<S: ProgressSink + ?Sized>(
    paths: &[PathBuf],
    table: &BarcodeTable,
    options: &BatchOptions,
    sink: &S,
) -> Result<BatchReport, BatchError> {
    let resolver = CallResolver::new(options.rules.clone());
    let run = || genotype_files(paths, table, &resolver, sink);

    let outcomes = match options.threads {
        Some(threads) => ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()?
            .install(run),
        None => run(),
    };

    let report = aggregate(outcomes);
    debug!(
        "Genotyped {} of {} files, {} rows",
        report.files_genotyped,
        paths.len(),
        report.result.len()
    );
    Ok(report)
}

/// Genotype a batch of files with default rules on the global pool.
///
/// Skipped files are left out of the result.
pub fn process_files(paths: &[PathBuf], table: &BarcodeTable) -> BatchResult {
    let resolver = CallResolver::default();
    aggregate(genotype_files(paths, table, &resolver, &())).result
}
