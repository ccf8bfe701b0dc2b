//! Core data types for lineage barcoding.
//!
//! - [`ReferenceEntry`]: one diagnostic site of the barcode table
//! - [`VariantRecord`]: one sample's called allele at a VCF site
//! - [`SampleResult`]: the resolved lineage string for each level of one sample
//! - [`BatchResult`]: all sample rows of a run, sorted by level columns
//!
//! ## Levels
//!
//! The barcode is split into five levels. Level 1 holds the main lineages
//! (`L1` .. `L8`), deeper levels hold their sublineages (`L4.3`, `L4.3.4`, ...).
//! Each level is matched independently.
//!
//! [`ReferenceEntry`]: types::ReferenceEntry
//! [`VariantRecord`]: types::VariantRecord
//! [`SampleResult`]: types::SampleResult
//! [`BatchResult`]: types::BatchResult

pub mod types;
