//! Batch genotyping across many VCF files.
//!
//! Each file is validated, parsed, matched and resolved independently on a
//! rayon pool. Rows from all genotyped files are then concatenated in input
//! order and stably sorted by the five level strings.

pub mod pipeline;
pub mod progress;

pub use pipeline::{
    process_batch, process_files, validate_input_file, BatchError, BatchOptions, BatchReport,
    FileOutcome, SkipReason, SkippedFile,
};
pub use progress::ProgressSink;
