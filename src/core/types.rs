use serde::Serialize;

/// Number of hierarchical levels in the lineage barcode
pub const LEVEL_COUNT: usize = 5;

/// Column headers used when a batch is written out
pub const RESULT_HEADER: [&str; LEVEL_COUNT + 1] =
    ["Sample", "Level 1", "Level 2", "Level 3", "Level 4", "Level 5"];

/// A barcode level, numbered 1 through 5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Level(u8);

impl Level {
    pub const ALL: [Level; LEVEL_COUNT] = [Level(1), Level(2), Level(3), Level(4), Level(5)];

    /// Returns `None` for numbers outside 1..=5
    #[must_use]
    pub fn new(number: u8) -> Option<Self> {
        if (1..=LEVEL_COUNT as u8).contains(&number) {
            Some(Self(number))
        } else {
            None
        }
    }

    #[must_use]
    pub fn number(self) -> u8 {
        self.0
    }

    /// Zero-based slot for per-level arrays
    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Level {}", self.0)
    }
}

/// One diagnostic site of the barcode table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceEntry {
    pub position: u32,
    pub ref_allele: String,
    pub alt_allele: String,
    pub lineage: String,
    pub level: Level,
}

impl ReferenceEntry {
    pub fn new(
        level: Level,
        position: u32,
        ref_allele: impl Into<String>,
        alt_allele: impl Into<String>,
        lineage: impl Into<String>,
    ) -> Self {
        Self {
            position,
            ref_allele: ref_allele.into(),
            alt_allele: alt_allele.into(),
            lineage: lineage.into(),
            level,
        }
    }
}

/// A single sample's call at one VCF site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRecord {
    pub sample: String,
    pub position: u32,
    pub ref_allele: String,

    /// `None` when the genotype was uncalled
    pub called_allele: Option<String>,
}

/// Final lineage calls for one sample of one input file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleResult {
    pub sample: String,
    pub level_1: String,
    pub level_2: String,
    pub level_3: String,
    pub level_4: String,
    pub level_5: String,
}

impl SampleResult {
    #[must_use]
    pub fn new(sample: impl Into<String>, levels: [String; LEVEL_COUNT]) -> Self {
        let [level_1, level_2, level_3, level_4, level_5] = levels;
        Self {
            sample: sample.into(),
            level_1,
            level_2,
            level_3,
            level_4,
            level_5,
        }
    }

    #[must_use]
    pub fn levels(&self) -> [&str; LEVEL_COUNT] {
        [
            self.level_1.as_str(),
            self.level_2.as_str(),
            self.level_3.as_str(),
            self.level_4.as_str(),
            self.level_5.as_str(),
        ]
    }

    /// True when no level carries a call
    #[must_use]
    pub fn is_uncalled(&self) -> bool {
        self.levels().iter().all(|l| l.is_empty())
    }

    /// Sample name followed by the five level strings, in output column order
    #[must_use]
    pub fn to_row(&self) -> [&str; LEVEL_COUNT + 1] {
        let [l1, l2, l3, l4, l5] = self.levels();
        [self.sample.as_str(), l1, l2, l3, l4, l5]
    }
}

/// Sample rows of a whole batch, sorted by level columns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BatchResult {
    rows: Vec<SampleResult>,
}

impl BatchResult {
    /// Sort rows by level 1 through level 5.
    ///
    /// The sort is stable, so rows with identical levels keep the order they
    /// were given in. Plain byte-wise string comparison puts empty strings
    /// ahead of any call.
    #[must_use]
    pub fn from_rows(mut rows: Vec<SampleResult>) -> Self {
        rows.sort_by(|a, b| a.levels().cmp(&b.levels()));
        Self { rows }
    }

    #[must_use]
    pub fn rows(&self) -> &[SampleResult] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SampleResult> {
        self.rows.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<'a> IntoIterator for &'a BatchResult {
    type Item = &'a SampleResult;
    type IntoIter = std::slice::Iter<'a, SampleResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
