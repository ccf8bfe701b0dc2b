use std::path::Path;

use crate::batch::pipeline::FileOutcome;

/// Observer notified as each file of a batch finishes.
///
/// Called from worker threads, in completion order rather than input order.
pub trait ProgressSink: Sync {
    fn file_finished(&self, _path: &Path, _outcome: &FileOutcome) {}
}

/// Silent sink
impl ProgressSink for () {}
