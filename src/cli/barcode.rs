use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::barcode::store::{BarcodeTable, BARCODE_NOTE, BARCODE_VERSION};
use crate::cli::{load_barcode, OutputFormat};
use crate::core::types::Level;

#[derive(Args)]
pub struct BarcodeArgs {
    #[command(subcommand)]
    pub command: BarcodeCommands,
}

#[derive(Subcommand)]
pub enum BarcodeCommands {
    /// Count entries and lineages at each level
    Summary {
        /// Path to custom barcode file
        #[arg(long)]
        barcode: Option<PathBuf>,
    },

    /// List the diagnostic sites of one level
    Show {
        /// Barcode level (1-5)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        level: u8,

        /// Path to custom barcode file
        #[arg(long)]
        barcode: Option<PathBuf>,
    },

    /// Export the barcode to a TSV file
    Export {
        /// Output file path
        #[arg(required = true)]
        output: PathBuf,

        /// Path to custom barcode file to export (defaults to embedded)
        #[arg(long)]
        barcode: Option<PathBuf>,
    },
}

/// Per-level counts shown by `barcode summary`
#[derive(Debug, serde::Serialize)]
struct LevelSummary<'a> {
    level: u8,
    entries: usize,
    lineages: Vec<&'a str>,
}

fn summarize(table: &BarcodeTable) -> Vec<LevelSummary<'_>> {
    Level::ALL
        .iter()
        .map(|&level| LevelSummary {
            level: level.number(),
            entries: table.entries(level).len(),
            lineages: table.lineages(level),
        })
        .collect()
}

/// Execute barcode subcommand
///
/// # Errors
///
/// Returns an error if the barcode cannot be loaded or exported.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: BarcodeArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    match args.command {
        BarcodeCommands::Summary { barcode } => run_summary(barcode, format, verbose),
        BarcodeCommands::Show { level, barcode } => run_show(level, barcode, format),
        BarcodeCommands::Export { output, barcode } => run_export(output, barcode),
    }
}

fn run_summary(
    barcode_path: Option<PathBuf>,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let (version, note) = if barcode_path.is_some() {
        ("custom", None)
    } else {
        (BARCODE_VERSION, Some(BARCODE_NOTE))
    };
    let table = load_barcode(barcode_path.as_deref())?;
    let levels = summarize(&table);

    match format {
        OutputFormat::Text => {
            println!(
                "Lineage barcode {version} ({} entries, {} positions)",
                table.len(),
                table.valid_positions().len()
            );
            if let Some(note) = note {
                println!("Note: {note}");
            }
            println!();
            println!("{:<8} {:>8} {:>9}", "Level", "Entries", "Lineages");
            println!("{}", "-".repeat(27));
            for summary in &levels {
                println!(
                    "{:<8} {:>8} {:>9}",
                    summary.level,
                    summary.entries,
                    summary.lineages.len()
                );
                if verbose {
                    println!("  └─ {}", summary.lineages.join(", "));
                }
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "version": version,
                "note": note,
                "entries": table.len(),
                "positions": table.valid_positions().len(),
                "levels": levels,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("level\tentries\tlineages");
            for summary in &levels {
                println!(
                    "{}\t{}\t{}",
                    summary.level,
                    summary.entries,
                    summary.lineages.join(",")
                );
            }
        }
    }

    Ok(())
}

fn run_show(level: u8, barcode_path: Option<PathBuf>, format: OutputFormat) -> anyhow::Result<()> {
    let Some(level) = Level::new(level) else {
        anyhow::bail!("Level must be between 1 and 5, got {level}");
    };
    let table = load_barcode(barcode_path.as_deref())?;
    let entries = table.entries(level);

    match format {
        OutputFormat::Text => {
            let lineage_width = entries
                .iter()
                .map(|e| e.lineage.len())
                .max()
                .unwrap_or(7)
                .max(7);

            println!("{level} ({} entries)\n", entries.len());
            println!(
                "{:>9} {:<4} {:<4} {:<lin_w$}",
                "POS",
                "REF",
                "ALT",
                "Lineage",
                lin_w = lineage_width
            );
            println!("{}", "-".repeat(20 + lineage_width));
            for e in entries {
                println!(
                    "{:>9} {:<4} {:<4} {:<lin_w$}",
                    e.position,
                    e.ref_allele,
                    e.alt_allele,
                    e.lineage,
                    lin_w = lineage_width
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(entries)?);
        }
        OutputFormat::Tsv => {
            println!("POS\tREF\tALT\tlineage");
            for e in entries {
                println!(
                    "{}\t{}\t{}\t{}",
                    e.position, e.ref_allele, e.alt_allele, e.lineage
                );
            }
        }
    }

    Ok(())
}

fn run_export(output: PathBuf, barcode_path: Option<PathBuf>) -> anyhow::Result<()> {
    let table = load_barcode(barcode_path.as_deref())?;

    let tsv = table.to_tsv()?;
    std::fs::write(&output, tsv)?;

    println!("Exported {} entries to {}", table.len(), output.display());

    Ok(())
}
