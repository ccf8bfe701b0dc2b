//! # tblg
//!
//! A library for genotyping *Mycobacterium tuberculosis* lineages from VCF files.
//!
//! Lineages are called with a SNP barcode: a table of diagnostic
//! `(position, REF, ALT)` sites, each tagged with the lineage it marks and one of
//! five hierarchical levels (lineage, sublineage, and three finer levels).
//! Every sample's called allele at each barcode position is matched against the
//! table, and the raw matches are resolved into one display string per level.
//!
//! ## Features
//!
//! - **Exact-match barcode**: Hash-indexed join on `(position, REF, ALT)`
//! - **Lineage 4 by absence**: `L4` rows are sites every other lineage carries, so
//!   lineage 4 is called when none of them are seen
//! - **Low-confidence marking**: Level 1 and 2 calls supported by a single site get a `*`
//! - **Lineage 2.2 precedence**: Modern and ancient calls together collapse to modern
//! - **Batch processing**: Many VCFs (plain or gzipped) genotyped in parallel
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use tblg::{process_files, BarcodeTable};
//!
//! // Load the embedded barcode
//! let table = BarcodeTable::load_embedded().unwrap();
//!
//! let paths = vec![PathBuf::from("sample1.vcf.gz"), PathBuf::from("sample2.vcf")];
//! let result = process_files(&paths, &table);
//!
//! for row in &result {
//!     println!("{}\t{}\t{}", row.sample, row.level_1, row.level_2);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`barcode`]: Barcode table loading and per-level indexing
//! - [`core`]: Core data types for levels, sites, records, and results
//! - [`parsing`]: VCF validation and genotype extraction
//! - [`matching`]: Level matching and call resolution
//! - [`batch`]: Parallel multi-file processing and aggregation
//! - [`cli`]: Command-line interface implementation

pub mod barcode;
pub mod batch;
pub mod cli;
pub mod core;
pub mod matching;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use barcode::store::{BarcodeTable, ReferenceLoadError};
pub use batch::{process_batch, process_files, validate_input_file, BatchOptions, BatchReport};
pub use core::types::*;
pub use matching::{CallResolver, LevelMatcher, ResolutionRules};
