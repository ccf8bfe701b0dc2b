use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

use crate::barcode::index::{LevelIndex, SiteKey};
use crate::core::types::{Level, ReferenceEntry, LEVEL_COUNT};

#[derive(Error, Debug)]
pub enum ReferenceLoadError {
    #[error("Failed to read barcode table: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse barcode table: {0}")]
    ParseError(#[from] csv::Error),

    #[error("Barcode table is missing required column '{0}'")]
    MissingColumn(&'static str),
}

/// Columns the barcode table must provide, looked up by name
pub const REQUIRED_COLUMNS: [&str; 5] = ["level", "POS", "REF", "ALT", "lineage"];

/// Version tag of the bundled barcode table
pub const BARCODE_VERSION: &str = "0.1.0-demo";

/// Caveat printed alongside the bundled table.
///
/// The bundled sites show the table layout and the resolution rules. Load a
/// published barcode with `--barcode` for real genotyping.
pub const BARCODE_NOTE: &str =
    "demo subset of diagnostic sites; use --barcode with a published table for real genotyping";

/// One row of the barcode TSV
#[derive(Debug, Deserialize)]
struct BarcodeRow {
    level: u8,
    #[serde(rename = "POS")]
    position: u32,
    #[serde(rename = "REF")]
    ref_allele: String,
    #[serde(rename = "ALT")]
    alt_allele: String,
    lineage: String,
}

/// The lineage barcode: diagnostic sites split into five levels
#[derive(Debug, Default, Clone)]
pub struct BarcodeTable {
    /// Entries per level, in table order
    levels: [Vec<ReferenceEntry>; LEVEL_COUNT],

    /// Index: (POS, REF, ALT) -> entry indices, per level
    indexes: [LevelIndex; LEVEL_COUNT],

    /// Every POS in the table, whatever its level
    valid_positions: HashSet<u32>,
}

impl BarcodeTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the demo barcode bundled with the binary.
    ///
    /// Level 1 `L4` and level 2 `L4.9` rows are sites every strain outside
    /// that lineage carries, so seeing one rules the reference lineage out.
    pub fn load_embedded() -> Result<Self, ReferenceLoadError> {
        // Validated at compile time by build.rs
        const EMBEDDED_BARCODE: &str = include_str!("../../data/levels.tsv");
        Self::from_tsv(EMBEDDED_BARCODE)
    }

    /// Load a barcode table from a TSV file
    pub fn load_from_file(path: &Path) -> Result<Self, ReferenceLoadError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parse a barcode table from TSV text
    pub fn from_tsv(text: &str) -> Result<Self, ReferenceLoadError> {
        Self::from_reader(text.as_bytes())
    }

    /// Parse a barcode table with columns `level, POS, REF, ALT, lineage` in any order.
    ///
    /// Rows whose level is outside 1..=5 are not matched against, but their
    /// position still counts as a valid position.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ReferenceLoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(ReferenceLoadError::MissingColumn(column));
            }
        }

        let mut table = Self::new();
        let mut ignored = 0usize;

        for result in reader.deserialize::<BarcodeRow>() {
            let row = result?;
            table.valid_positions.insert(row.position);

            match Level::new(row.level) {
                Some(level) => table.add_entry(ReferenceEntry::new(
                    level,
                    row.position,
                    row.ref_allele,
                    row.alt_allele,
                    row.lineage,
                )),
                None => ignored += 1,
            }
        }

        if ignored > 0 {
            warn!("Ignored {ignored} barcode rows with a level outside 1-5");
        }
        debug!(
            "Loaded barcode table: {} entries at {} positions",
            table.len(),
            table.valid_positions.len()
        );

        Ok(table)
    }

    /// Add an entry to its level
    pub fn add_entry(&mut self, entry: ReferenceEntry) {
        let slot = entry.level.index();
        let entry_index = self.levels[slot].len();

        self.valid_positions.insert(entry.position);
        self.indexes[slot].insert(&entry, entry_index);
        self.levels[slot].push(entry);
    }

    /// Entries of a level, in table order
    pub fn entries(&self, level: Level) -> &[ReferenceEntry] {
        &self.levels[level.index()]
    }

    /// Entries of a level whose (POS, REF, ALT) equals `key`
    pub fn matching_entries<'a>(
        &'a self,
        level: Level,
        key: &SiteKey,
    ) -> impl Iterator<Item = &'a ReferenceEntry> + 'a {
        let entries = &self.levels[level.index()];
        self.indexes[level.index()]
            .lookup(key)
            .iter()
            .map(move |&i| &entries[i])
    }

    /// Every position present in the table
    pub fn valid_positions(&self) -> &HashSet<u32> {
        &self.valid_positions
    }

    pub fn is_valid_position(&self, position: u32) -> bool {
        self.valid_positions.contains(&position)
    }

    /// Distinct lineage labels of a level, in first-seen order
    pub fn lineages(&self, level: Level) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.entries(level)
            .iter()
            .map(|e| e.lineage.as_str())
            .filter(|l| seen.insert(*l))
            .collect()
    }

    /// Export the table as TSV, levels in order
    pub fn to_tsv(&self) -> Result<String, ReferenceLoadError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(Vec::new());

        writer.write_record(REQUIRED_COLUMNS)?;
        for level in Level::ALL {
            for entry in self.entries(level) {
                writer.write_record([
                    level.number().to_string().as_str(),
                    entry.position.to_string().as_str(),
                    entry.ref_allele.as_str(),
                    entry.alt_allele.as_str(),
                    entry.lineage.as_str(),
                ])?;
            }
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ReferenceLoadError::ReadError(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Total number of entries across all levels
    pub fn len(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(Vec::is_empty)
    }
}
