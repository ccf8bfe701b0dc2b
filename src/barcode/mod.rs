//! Lineage barcode storage and indexing.
//!
//! The barcode is a tab-separated table of diagnostic SNPs with the columns
//! `level`, `POS`, `REF`, `ALT` and `lineage` (in any order). A copy is
//! embedded in the binary and loaded once per run; it is read-only afterwards
//! and can be shared between worker threads.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tblg::barcode::store::BarcodeTable;
//! use tblg::core::types::Level;
//!
//! let table = BarcodeTable::load_embedded().unwrap();
//! for level in Level::ALL {
//!     println!("{level}: {} sites", table.entries(level).len());
//! }
//! ```

pub mod index;
pub mod store;
