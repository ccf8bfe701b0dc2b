use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::batch::{process_batch, BatchOptions, FileOutcome, ProgressSink};
use crate::cli::{load_barcode, OutputFormat};
use crate::core::types::{BatchResult, RESULT_HEADER};
use crate::utils::validation::output_delimiter;

#[derive(Args)]
pub struct GenotypeArgs {
    /// One or more VCF files (.vcf or .vcf.gz)
    #[arg(required = true)]
    pub vcf_files: Vec<PathBuf>,

    /// Write results to a '.txt', '.tsv', or '.csv' file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of worker threads (defaults to one per core)
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Path to custom barcode file
    #[arg(long)]
    pub barcode: Option<PathBuf>,

    /// Do not show a progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// File-level progress bar on stderr; skip notices are printed above it
struct FileProgress {
    bar: ProgressBar,
}

impl FileProgress {
    fn new(total: usize, visible: bool) -> Self {
        if !visible {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }

        let bar = ProgressBar::new(total as u64);
        bar.set_draw_target(ProgressDrawTarget::stderr());
        if let Ok(style) =
            ProgressStyle::default_bar().template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        {
            bar.set_style(style.progress_chars("=>-"));
        }
        bar.set_message("Processing VCF files");
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for FileProgress {
    fn file_finished(&self, path: &Path, outcome: &FileOutcome) {
        if let FileOutcome::Skipped(reason) = outcome {
            let notice = reason.notice(path);
            self.bar.suspend(|| eprintln!("{notice}"));
        }
        self.bar.inc(1);
    }
}

/// Execute genotype subcommand
///
/// # Errors
///
/// Returns an error if the output path has an unsupported extension, the
/// barcode cannot be loaded, or the results cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: GenotypeArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    // Reject a bad output path before doing any work
    let output = match &args.output {
        Some(path) => {
            let Some(delimiter) = output_delimiter(path) else {
                anyhow::bail!("Output file must have extension 'txt', 'tsv', or 'csv'");
            };
            eprintln!("Writing results to {}", path.display());
            Some((path.as_path(), delimiter))
        }
        None => None,
    };

    let table = load_barcode(args.barcode.as_deref())?;

    if verbose {
        eprintln!(
            "Loaded barcode with {} entries at {} positions",
            table.len(),
            table.valid_positions().len()
        );
    }

    let options = BatchOptions {
        threads: args.threads,
        ..BatchOptions::default()
    };
    let progress = FileProgress::new(
        args.vcf_files.len(),
        args.vcf_files.len() > 1 && !args.no_progress,
    );
    let report = process_batch(&args.vcf_files, &table, &options, &progress)?;
    progress.finish();

    if verbose {
        eprintln!(
            "Genotyped {} of {} files ({} skipped)",
            report.files_genotyped,
            args.vcf_files.len(),
            report.skipped.len()
        );
    }

    if report.no_valid_inputs() {
        println!("No valid VCF files were found!");
    }

    match output {
        Some((path, delimiter)) => write_results(&report.result, path, delimiter),
        None => print_results(&report.result, format),
    }
}

fn write_rows<W: Write>(writer: &mut csv::Writer<W>, result: &BatchResult) -> csv::Result<()> {
    writer.write_record(RESULT_HEADER)?;
    for row in result {
        writer.write_record(row.to_row())?;
    }
    Ok(())
}

fn write_results(result: &BatchResult, path: &Path, delimiter: u8) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_rows(&mut writer, result)?;
    writer.flush()?;

    Ok(())
}

fn print_results(result: &BatchResult, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            if result.is_empty() {
                println!("No lineages were called!");
            } else {
                println!("{}", render_grid(result));
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result)?);
        }
        OutputFormat::Tsv => {
            let mut writer = csv::WriterBuilder::new()
                .delimiter(b'\t')
                .from_writer(std::io::stdout());
            write_rows(&mut writer, result)?;
            writer.flush()?;
        }
    }

    Ok(())
}

/// Render rows as a boxed grid, one bordered line per sample
fn render_grid(result: &BatchResult) -> String {
    let mut builder = Builder::default();
    builder.push_record(RESULT_HEADER);
    for row in result {
        builder.push_record(row.to_row());
    }
    builder.build().with(Style::ascii()).to_string()
}
