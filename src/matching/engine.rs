use std::collections::BTreeMap;

use crate::barcode::store::BarcodeTable;
use crate::core::types::{Level, VariantRecord, LEVEL_COUNT};

/// Lineage labels of one sample, one list per level
pub type LevelCalls = [Vec<String>; LEVEL_COUNT];

/// Raw lineage labels per sample and level, before resolution.
///
/// Samples are kept in name order; labels within a level keep record order,
/// duplicates included.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RawCalls {
    samples: BTreeMap<String, LevelCalls>,
}

impl RawCalls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sample, even if it never gets a label
    pub fn sample_mut(&mut self, sample: &str) -> &mut LevelCalls {
        self.samples.entry(sample.to_string()).or_default()
    }

    pub fn push(&mut self, sample: &str, level: Level, lineage: impl Into<String>) {
        self.sample_mut(sample)[level.index()].push(lineage.into());
    }

    /// Labels of a sample at a level; empty for unknown samples
    pub fn calls(&self, sample: &str, level: Level) -> &[String] {
        self.samples
            .get(sample)
            .map_or(&[][..], |levels| levels[level.index()].as_slice())
    }

    pub fn samples(&self) -> impl Iterator<Item = &str> {
        self.samples.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LevelCalls)> {
        self.samples.iter().map(|(s, levels)| (s.as_str(), levels))
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Joins variant records against the barcode, level by level
pub struct LevelMatcher<'a> {
    table: &'a BarcodeTable,
}

impl<'a> LevelMatcher<'a> {
    pub fn new(table: &'a BarcodeTable) -> Self {
        Self { table }
    }

    /// Emit the lineage of every barcode entry whose (POS, REF, ALT) equals a
    /// record's (position, REF, called allele).
    ///
    /// Every sample seen in `records` gets an entry, including samples whose
    /// calls are all missing.
    pub fn match_records(&self, records: &[VariantRecord]) -> RawCalls {
        let mut calls = RawCalls::new();

        for record in records {
            let levels = calls.sample_mut(&record.sample);

            let Some(called) = &record.called_allele else {
                continue;
            };
            let key = (record.position, record.ref_allele.clone(), called.clone());

            for level in Level::ALL {
                for entry in self.table.matching_entries(level, &key) {
                    if !entry.lineage.is_empty() {
                        levels[level.index()].push(entry.lineage.clone());
                    }
                }
            }
        }

        calls
    }
}
