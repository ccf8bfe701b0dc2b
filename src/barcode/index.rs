use std::collections::HashMap;

use crate::core::types::ReferenceEntry;

/// Exact `(position, REF, ALT)` key of a diagnostic site
pub type SiteKey = (u32, String, String);

/// Hash index from a site to the entries of one level carrying it
#[derive(Debug, Default, Clone)]
pub struct LevelIndex {
    sites: HashMap<SiteKey, Vec<usize>>,
}

impl LevelIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: &ReferenceEntry, entry_index: usize) {
        self.sites
            .entry((
                entry.position,
                entry.ref_allele.clone(),
                entry.alt_allele.clone(),
            ))
            .or_default()
            .push(entry_index);
    }

    /// Indices of the entries matching a site exactly, in table order
    pub fn lookup(&self, key: &SiteKey) -> &[usize] {
        self.sites.get(key).map_or(&[][..], Vec::as_slice)
    }

    /// Number of distinct sites
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}
