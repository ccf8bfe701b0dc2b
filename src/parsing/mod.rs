//! Parsers for variant-call input.
//!
//! - **VCF files**: plain `.vcf` or gzip/bgzip `.vcf.gz`, any number of samples
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tblg::barcode::store::BarcodeTable;
//! use tblg::parsing::vcf::{read_vcf_file, validate_vcf};
//!
//! let table = BarcodeTable::load_embedded().unwrap();
//! let path = Path::new("calls.vcf.gz");
//!
//! if validate_vcf(path) {
//!     let contents = read_vcf_file(path, table.valid_positions()).unwrap();
//!     println!("{} records at barcode sites", contents.records.len());
//! }
//! ```

pub mod vcf;
