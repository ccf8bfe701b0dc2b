//! Barcode matching and call resolution.
//!
//! - [`LevelMatcher`]: exact join of variant records against the barcode,
//!   producing [`RawCalls`] per sample and level
//! - [`CallResolver`]: collapses raw calls into one display string per level
//!
//! ## Example
//!
//! ```rust
//! use tblg::barcode::store::BarcodeTable;
//! use tblg::core::types::VariantRecord;
//! use tblg::matching::{CallResolver, LevelMatcher};
//!
//! let table = BarcodeTable::from_tsv("level\tPOS\tREF\tALT\tlineage\n1\t100\tA\tT\tL1\n").unwrap();
//! let records = vec![VariantRecord {
//!     sample: "S1".to_string(),
//!     position: 100,
//!     ref_allele: "A".to_string(),
//!     called_allele: Some("T".to_string()),
//! }];
//!
//! let raw = LevelMatcher::new(&table).match_records(&records);
//! let rows = CallResolver::default().resolve(&raw);
//! assert_eq!(rows[0].level_1, "L1*, L4");
//! ```

pub mod engine;
pub mod resolution;

pub use engine::{LevelMatcher, RawCalls};
pub use resolution::{CallResolver, ResolutionRules};
