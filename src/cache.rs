//! Finished optimizer results, one slot per cycle of a season.

use std::sync::Arc;

use tracing::debug;

use crate::value::WorkshopsItemSets;

/// Ranked results per cycle.
///
/// A slot is either empty (not solved yet) or holds the final ranking for
/// that cycle. Filled slots are trusted until explicitly invalidated.
#[derive(Debug, Clone, Default)]
pub struct ItemSetsCache {
    entries: Vec<Option<Arc<[WorkshopsItemSets]>>>,
}

impl ItemSetsCache {
    pub fn new(cycles: usize) -> Self {
        ItemSetsCache {
            entries: vec![None; cycles],
        }
    }

    pub fn cycles(&self) -> usize {
        self.entries.len()
    }

    fn check(&self, cycle: usize) {
        assert!(
            cycle < self.entries.len(),
            "cycle {cycle} out of range (limit {})",
            self.entries.len()
        );
    }

    pub fn get(&self, cycle: usize) -> Option<Arc<[WorkshopsItemSets]>> {
        self.check(cycle);
        self.entries[cycle].clone()
    }

    pub fn is_ready(&self, cycle: usize) -> bool {
        self.check(cycle);
        self.entries[cycle].is_some()
    }

    pub fn store(&mut self, cycle: usize, results: Arc<[WorkshopsItemSets]>) {
        self.check(cycle);
        self.entries[cycle] = Some(results);
    }

    /// Empties `from_cycle` and every later slot.
    ///
    /// A `from_cycle` past the last cycle clears nothing.
    pub fn invalidate_from(&mut self, from_cycle: usize) {
        let cleared = self
            .entries
            .iter_mut()
            .skip(from_cycle)
            .filter_map(Option::take)
            .count();
        if cleared > 0 {
            debug!(from_cycle, cleared, "invalidated cached results");
        }
    }

    pub fn clear(&mut self) {
        self.invalidate_from(0);
    }
}
