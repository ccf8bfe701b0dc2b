//! Reader for multi-sample VCF genotype calls.
//!
//! Only the columns needed for barcoding are read: `POS`, `REF`, `ALT` and the
//! `GT` subfield of every sample column. Each sample's genotype is collapsed to
//! a single called allele:
//!
//! | GT        | Called allele              |
//! |-----------|----------------------------|
//! | `1`       | first ALT                  |
//! | `0/1`     | first ALT                  |
//! | `1/0`     | REF                        |
//! | `./1`     | first ALT                  |
//! | `1\|2`    | second ALT                 |
//! | `.`, `./.`| none (uncalled)            |
//!
//! In other words the last non-missing allele wins. Sites whose position is
//! not part of the barcode are dropped while reading.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use thiserror::Error;
use tracing::debug;

use crate::core::types::VariantRecord;
use crate::utils::validation::{is_gzipped, is_vcf_path, MIN_VCF_FIELDS};

const POS_COLUMN: usize = 1;
const REF_COLUMN: usize = 3;
const ALT_COLUMN: usize = 4;
const FIRST_SAMPLE_COLUMN: usize = 9;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No column header line found")]
    MissingHeader,

    #[error("Invalid VCF format on line {line}: {message}")]
    InvalidFormat { line: usize, message: String },

    #[error("Invalid genotype '{genotype}' on line {line}")]
    InvalidGenotype { line: usize, genotype: String },
}

/// Why a file failed the structural pre-check
#[derive(Error, Debug)]
pub enum InvalidVcf {
    #[error("does not end with .vcf or .vcf.gz")]
    UnsupportedExtension,

    #[error("could not be read ({0})")]
    Unreadable(#[from] std::io::Error),

    #[error("does not have typical VCF structure")]
    AtypicalStructure,

    #[error("does not contain any variant records")]
    NoDataLines,
}

/// Samples and retained records of one VCF
#[derive(Debug, Clone, Default)]
pub struct VcfContents {
    /// Sample names from the column header, in column order
    pub samples: Vec<String>,

    /// One record per (site, sample), in file order
    pub records: Vec<VariantRecord>,
}

/// Open a plain or gzip/bgzip compressed VCF
pub fn open_vcf(path: &Path) -> std::io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if is_gzipped(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Structural sniff test for a VCF file.
///
/// The path must end in `.vcf` or `.vcf.gz`, and the first line not starting
/// with `#` must have at least 8 tab-separated fields.
///
/// # Errors
///
/// Returns the reason the file should be skipped.
pub fn check_vcf(path: &Path) -> Result<(), InvalidVcf> {
    if !is_vcf_path(path) {
        return Err(InvalidVcf::UnsupportedExtension);
    }

    let first_data_line = open_vcf(path)?
        .lines()
        .find(|line| !matches!(line, Ok(l) if l.starts_with('#')))
        .transpose()?;

    match first_data_line {
        None => Err(InvalidVcf::NoDataLines),
        Some(line) if line.trim().split('\t').count() < MIN_VCF_FIELDS => {
            Err(InvalidVcf::AtypicalStructure)
        }
        Some(_) => Ok(()),
    }
}

/// Boolean form of [`check_vcf`]
#[must_use]
pub fn validate_vcf(path: &Path) -> bool {
    check_vcf(path).is_ok()
}

/// Read a VCF file, keeping only sites at `positions`
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if a retained line is malformed.
pub fn read_vcf_file(path: &Path, positions: &HashSet<u32>) -> Result<VcfContents, ParseError> {
    let reader = open_vcf(path)?;
    read_vcf(reader, positions)
}

/// Parse VCF text, keeping only sites at `positions`
///
/// # Errors
///
/// See [`read_vcf`].
pub fn parse_vcf_text(text: &str, positions: &HashSet<u32>) -> Result<VcfContents, ParseError> {
    read_vcf(text.as_bytes(), positions)
}

/// Read VCF lines from any buffered reader.
///
/// `##` meta lines are skipped; the next line is the column header and names
/// the samples (columns 10 onwards).
///
/// # Errors
///
/// Returns `ParseError::MissingHeader` when there is no column header,
/// `ParseError::InvalidFormat` for a short line or non-integer `POS`, and
/// `ParseError::InvalidGenotype` for a `GT` index that is not a number or
/// does not name an allele.
pub fn read_vcf<R: BufRead>(reader: R, positions: &HashSet<u32>) -> Result<VcfContents, ParseError> {
    let mut lines = reader.lines().enumerate();

    let samples: Vec<String> = loop {
        let Some((_, line)) = lines.next() else {
            return Err(ParseError::MissingHeader);
        };
        let line = line?;
        if line.starts_with("##") {
            continue;
        }
        break line
            .trim()
            .split('\t')
            .skip(9)
            .map(str::to_string)
            .collect();
    };

    let mut records = Vec::new();
    let mut sites_kept = 0usize;

    for (i, line) in lines {
        let line = line?;
        // Line numbers in errors are 1-based for user friendliness
        let line_num = i + 1;

        if line.starts_with("##") {
            continue;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        let Some(pos_field) = fields.get(POS_COLUMN) else {
            continue;
        };

        let position: u64 = pos_field.parse().map_err(|_| ParseError::InvalidFormat {
            line: line_num,
            message: format!("invalid POS '{pos_field}'"),
        })?;

        // Positions beyond u32 cannot be in the barcode
        let Ok(position) = u32::try_from(position) else {
            continue;
        };
        if !positions.contains(&position) {
            continue;
        }
        if fields.len() <= ALT_COLUMN {
            return Err(ParseError::InvalidFormat {
                line: line_num,
                message: format!("expected REF and ALT columns, found {} fields", fields.len()),
            });
        }
        sites_kept += 1;

        let ref_allele = fields[REF_COLUMN];
        let alleles: Vec<&str> = std::iter::once(ref_allele)
            .chain(fields[ALT_COLUMN].split(','))
            .collect();

        let genotypes = fields.get(FIRST_SAMPLE_COLUMN..).unwrap_or_default();
        for (sample, genotype) in samples.iter().zip(genotypes) {
            let called = call_allele(genotype, &alleles).ok_or_else(|| {
                ParseError::InvalidGenotype {
                    line: line_num,
                    genotype: (*genotype).to_string(),
                }
            })?;

            records.push(VariantRecord {
                sample: sample.clone(),
                position,
                ref_allele: ref_allele.to_string(),
                called_allele: called.map(str::to_string),
            });
        }
    }

    debug!(
        "Read {} samples, kept {sites_kept} barcode sites ({} records)",
        samples.len(),
        records.len()
    );

    Ok(VcfContents { samples, records })
}

/// Collapse a sample column to a single called allele.
///
/// Only the `GT` subfield (before the first `:`) is used. Indices are split on
/// both `/` and `|`; missing indices (`.`) are dropped and the last remaining
/// allele is the call. Returns `Some(None)` when every index is missing and
/// `None` when an index is not a valid allele number.
fn call_allele<'a>(genotype: &str, alleles: &[&'a str]) -> Option<Option<&'a str>> {
    let gt = genotype.split(':').next().unwrap_or_default();

    let mut called = None;
    for index in gt.split(['/', '|']) {
        if index == "." {
            continue;
        }
        let allele = index
            .parse::<usize>()
            .ok()
            .and_then(|i| alleles.get(i).copied())?;
        called = Some(allele);
    }

    Some(called)
}
