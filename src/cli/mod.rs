//! Command-line interface for tblg.
//!
//! Available commands:
//!
//! - **genotype**: Call lineages for every sample in one or more VCF files
//! - **barcode**: Summarize, show, or export the lineage barcode
//!
//! ## Usage
//!
//! ```text
//! # Genotype a single VCF
//! tblg genotype sample.vcf.gz
//!
//! # Genotype a cohort and write a CSV
//! tblg genotype vcfs/*.vcf -o results/lineages.csv
//!
//! # JSON output for scripting
//! tblg --format json genotype sample.vcf
//!
//! # Inspect the bundled barcode
//! tblg barcode summary
//! tblg barcode show --level 2
//! ```

use std::path::Path;

use clap::{Parser, Subcommand};

use crate::barcode::store::BarcodeTable;

pub mod barcode;
pub mod genotype;

#[derive(Parser)]
#[command(name = "tblg")]
#[command(version)]
#[command(about = "Genotype Mycobacterium tuberculosis lineages from VCF files")]
#[command(
    long_about = "tblg calls Mycobacterium tuberculosis lineages and sublineages for every sample in one or more VCF files.\n\nEach sample's alleles at diagnostic positions are matched against a five-level SNP barcode and resolved into one call string per level:\n- Level 1 and 2 calls are deduplicated; calls seen only once are marked with '*'\n- Lineage 4 is inferred from the absence of its markers\n- Levels 3 to 5 list every matching sublineage"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Call lineages from one or more VCF files
    Genotype(genotype::GenotypeArgs),

    /// Inspect the lineage barcode
    Barcode(barcode::BarcodeArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Load a custom barcode file, or the embedded one when no path is given
pub(crate) fn load_barcode(path: Option<&Path>) -> anyhow::Result<BarcodeTable> {
    let table = if let Some(path) = path {
        BarcodeTable::load_from_file(path)?
    } else {
        BarcodeTable::load_embedded()?
    };
    Ok(table)
}
