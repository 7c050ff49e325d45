//! Submodel selection over a run-length "batches per submodel" table.
//!
//! A body part lays out its batches submodel after submodel, so submodel
//! `k` owns the contiguous range starting at the sum of the counts before
//! it. Selection is stored as a single index; the per-batch and
//! per-submodel flag views are derived from it.

use std::ops::Range;

/// Run-length table of batch counts, one entry per submodel
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubmodelTable {
    counts: Vec<usize>,
}

impl SubmodelTable {
    pub fn new(counts: Vec<usize>) -> Self {
        Self { counts }
    }

    pub fn submodel_count(&self) -> usize {
        self.counts.len()
    }

    /// Total batches across all submodels
    pub fn batch_count(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Batch index range owned by `submodel`, or `None` if out of range
    pub fn range(&self, submodel: usize) -> Option<Range<usize>> {
        let count = *self.counts.get(submodel)?;
        let start: usize = self.counts[..submodel].iter().sum();
        Some(start..start + count)
    }

    /// One flag per batch: set exactly for the batches of `selected`.
    /// An out-of-range selection enables nothing.
    pub fn enabled_mask(&self, selected: usize) -> Vec<bool> {
        let mut mask = vec![false; self.batch_count()];
        if let Some(range) = self.range(selected) {
            mask[range].fill(true);
        }
        mask
    }

    /// One flag per submodel: whether any of its batches is set in `mask`.
    /// Batches past the end of `mask` count as disabled.
    pub fn active_submodels(&self, mask: &[bool]) -> Vec<bool> {
        let mut start = 0;
        self.counts
            .iter()
            .map(|&count| {
                let end = start + count;
                let any = (start..end).any(|i| mask.get(i).copied().unwrap_or(false));
                start = end;
                any
            })
            .collect()
    }

    /// Submodel that owns batch `index`
    pub fn submodel_of(&self, index: usize) -> Option<usize> {
        let mut end = 0;
        for (k, &count) in self.counts.iter().enumerate() {
            end += count;
            if index < end {
                return Some(k);
            }
        }
        None
    }
}
