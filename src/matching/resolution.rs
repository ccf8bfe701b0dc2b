//! Resolution of raw per-level labels into one display string per level.
//!
//! Levels 1 and 2 go through three rules, in order:
//!
//! 1. **Lineage-4 presence/absence**: the reference genome is lineage 4, so
//!    the barcode marks it by the *absence* of SNPs that every other strain
//!    carries. If the marker label (`L4` at level 1, `L4.9` at level 2) was
//!    called it is removed; otherwise it is added twice, so that it survives
//!    the singleton rule unmarked.
//! 2. **Singleton marking**: labels are counted case-insensitively and kept in
//!    first-seen order. A label seen only once gets the low-confidence marker
//!    (`*`) unless it starts with one of the level's unmarked prefixes.
//! 3. **Lineage-2 precedence** (level 2 only): when both `L2.2 (modern)` and
//!    `L2.2 (ancient)` remain, only `L2.2 (modern)` is reported.
//!
//! The surviving labels are joined with `", "`. Levels 3 to 5 are reported as
//! called, joined with `","`.

use std::collections::HashMap;

use crate::core::types::{Level, SampleResult, LEVEL_COUNT};
use crate::matching::engine::{LevelCalls, RawCalls};

/// Suffix flagging a label supported by a single site
pub const LOW_CONFIDENCE_MARKER: &str = "*";

/// Labels and prefixes driving call resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRules {
    /// Label whose absence signals lineage 4 at level 1
    pub level_1_absence_marker: String,
    /// Label whose absence signals lineage 4.9 at level 2
    pub level_2_absence_marker: String,
    /// Level 1 labels starting with these are never marked as singletons
    pub level_1_unmarked_prefixes: Vec<String>,
    /// Level 2 labels starting with these are never marked as singletons
    pub level_2_unmarked_prefixes: Vec<String>,
    pub modern_label: String,
    pub ancient_label: String,
    pub marker: String,
}

impl Default for ResolutionRules {
    fn default() -> Self {
        Self {
            level_1_absence_marker: "L4".to_string(),
            level_2_absence_marker: "L4.9".to_string(),
            level_1_unmarked_prefixes: vec!["L8".to_string()],
            level_2_unmarked_prefixes: vec![
                "L2.2 (modern)".to_string(),
                "L2.2 (ancient)".to_string(),
            ],
            modern_label: "L2.2 (modern)".to_string(),
            ancient_label: "L2.2 (ancient)".to_string(),
            marker: LOW_CONFIDENCE_MARKER.to_string(),
        }
    }
}

/// Remove `target` if it was called, otherwise append it twice
pub fn apply_absence_rule(calls: &[String], target: &str) -> Vec<String> {
    if calls.iter().any(|c| c == target) {
        calls.iter().filter(|c| *c != target).cloned().collect()
    } else {
        let mut calls = calls.to_vec();
        calls.extend([target.to_string(), target.to_string()]);
        calls
    }
}

/// Collapse duplicate labels and mark the ones seen only once.
///
/// Counting is case-insensitive; each label keeps the casing it was first
/// seen with. Empty labels are dropped.
pub fn mark_singletons(calls: &[String], unmarked_prefixes: &[String], marker: &str) -> Vec<String> {
    let mut counted: Vec<(&str, usize)> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();

    for call in calls.iter().filter(|c| !c.is_empty()) {
        let folded = call.to_lowercase();
        if let Some(&slot) = slots.get(&folded) {
            counted[slot].1 += 1;
        } else {
            slots.insert(folded, counted.len());
            counted.push((call.as_str(), 1));
        }
    }

    counted
        .into_iter()
        .map(|(label, count)| {
            let unmarked = unmarked_prefixes.iter().any(|p| label.starts_with(p.as_str()));
            if count == 1 && !unmarked {
                format!("{label}{marker}")
            } else {
                label.to_string()
            }
        })
        .collect()
}

/// Report only `modern` when both `modern` and `ancient` are present.
///
/// The comparison ignores a trailing `marker`. Other labels keep their order
/// and `modern` moves to the end.
pub fn collapse_modern_ancient(
    labels: Vec<String>,
    modern: &str,
    ancient: &str,
    marker: &str,
) -> Vec<String> {
    let unmarked = |label: &str| label.strip_suffix(marker).unwrap_or(label).to_string();

    let has_modern = labels.iter().any(|l| unmarked(l.as_str()) == modern);
    let has_ancient = labels.iter().any(|l| unmarked(l.as_str()) == ancient);
    if !(has_modern && has_ancient) {
        return labels;
    }

    let mut kept: Vec<String> = labels
        .into_iter()
        .filter(|l| {
            let label = unmarked(l.as_str());
            label != modern && label != ancient
        })
        .collect();
    kept.push(modern.to_string());
    kept
}

/// Applies [`ResolutionRules`] to raw calls
#[derive(Debug, Clone, Default)]
pub struct CallResolver {
    rules: ResolutionRules,
}

impl CallResolver {
    pub fn new(rules: ResolutionRules) -> Self {
        Self { rules }
    }

    /// Display string of one level
    pub fn resolve_level(&self, level: Level, calls: &[String]) -> String {
        let rules = &self.rules;
        match level.number() {
            1 => {
                let calls = apply_absence_rule(calls, &rules.level_1_absence_marker);
                mark_singletons(&calls, &rules.level_1_unmarked_prefixes, &rules.marker)
                    .join(", ")
            }
            2 => {
                let calls = apply_absence_rule(calls, &rules.level_2_absence_marker);
                let labels =
                    mark_singletons(&calls, &rules.level_2_unmarked_prefixes, &rules.marker);
                collapse_modern_ancient(
                    labels,
                    &rules.modern_label,
                    &rules.ancient_label,
                    &rules.marker,
                )
                .join(", ")
            }
            _ => calls.join(","),
        }
    }

    pub fn resolve_sample(&self, sample: &str, levels: &LevelCalls) -> SampleResult {
        let resolved: [String; LEVEL_COUNT] =
            Level::ALL.map(|level| self.resolve_level(level, &levels[level.index()]));
        SampleResult::new(sample, resolved)
    }

    /// One row per sample, in sample name order
    pub fn resolve(&self, raw: &RawCalls) -> Vec<SampleResult> {
        raw.iter()
            .map(|(sample, levels)| self.resolve_sample(sample, levels))
            .collect()
    }
}
