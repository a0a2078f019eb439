//! The produced-items grid: what each workshop crafts, step by step, in every
//! cycle of a season.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Catalog;
use crate::models::{ItemId, WorkshopLimits};
use crate::value::{ItemSet, WorkshopsItemSets};

/// Rejected schedule edits.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("item {0} is not in the catalog")]
    UnknownItem(ItemId),
    #[error("step {step} of workshop {workshop} follows an empty step")]
    Gap { workshop: usize, step: usize },
    #[error("{item} does not chain from {previous}")]
    NotChainable { item: String, previous: String },
    #[error("workshop {workshop} would need {hours} hours, only {limit} are available")]
    OverBudget {
        workshop: usize,
        hours: u32,
        limit: u32,
    },
}

/// Items assigned to every (cycle, workshop, step) slot of one season.
///
/// Edits go through [`ProducedItems::set`], which keeps each workshop's
/// sequence gap-free, within its hour budget and chain-compatible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducedItems {
    cycles: usize,
    workshops: usize,
    steps: usize,
    hours: u32,
    slots: Vec<Option<ItemId>>,
}

impl ProducedItems {
    pub fn new(limits: &WorkshopLimits) -> Self {
        ProducedItems {
            cycles: limits.cycles,
            workshops: limits.workshops,
            steps: limits.steps,
            hours: limits.hours,
            slots: vec![None; limits.cycles * limits.workshops * limits.steps],
        }
    }

    fn base(&self, cycle: usize, workshop: usize) -> usize {
        assert!(cycle < self.cycles, "cycle {cycle} out of range");
        assert!(workshop < self.workshops, "workshop {workshop} out of range");
        (cycle * self.workshops + workshop) * self.steps
    }

    /// The slots of one workshop in one cycle.
    pub fn workshop(&self, cycle: usize, workshop: usize) -> &[Option<ItemId>] {
        let base = self.base(cycle, workshop);
        &self.slots[base..base + self.steps]
    }

    pub fn get(&self, cycle: usize, workshop: usize, step: usize) -> Option<ItemId> {
        assert!(step < self.steps, "step {step} out of range");
        self.workshop(cycle, workshop)[step]
    }

    /// Sets one step, clearing every later step of that workshop.
    ///
    /// `None` clears the step itself as well.
    ///
    /// # Errors
    ///
    /// Fails if the item is unknown, the previous step is empty, the item
    /// does not chain from the previous one, or the workshop would run over
    /// its hour budget. The grid is unchanged on error.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of range.
    pub fn set(
        &mut self,
        catalog: &Catalog,
        cycle: usize,
        workshop: usize,
        step: usize,
        item: Option<ItemId>,
    ) -> Result<(), ScheduleError> {
        assert!(step < self.steps, "step {step} out of range");
        let base = self.base(cycle, workshop);

        if let Some(id) = item {
            let chosen = catalog.item(id).ok_or(ScheduleError::UnknownItem(id))?;
            if step > 0 {
                let previous = self.slots[base + step - 1]
                    .ok_or(ScheduleError::Gap { workshop, step })?;
                let previous = &catalog[previous];
                if !chosen.chains_from(previous) {
                    return Err(ScheduleError::NotChainable {
                        item: chosen.name.clone(),
                        previous: previous.name.clone(),
                    });
                }
            }
            let before: u32 = self.slots[base..base + step]
                .iter()
                .flatten()
                .map(|&id| catalog[id].hours)
                .sum();
            let hours = before + chosen.hours;
            if hours > self.hours {
                return Err(ScheduleError::OverBudget {
                    workshop,
                    hours,
                    limit: self.hours,
                });
            }
        }

        self.slots[base + step] = item;
        self.slots[base + step + 1..base + self.steps].fill(None);
        Ok(())
    }

    pub fn clear_workshop(&mut self, cycle: usize, workshop: usize) {
        let base = self.base(cycle, workshop);
        self.slots[base..base + self.steps].fill(None);
    }

    /// Overwrites a whole cycle with an optimizer result.
    ///
    /// # Panics
    ///
    /// Panics if the assignment does not fit the grid's shape.
    pub fn assign(&mut self, cycle: usize, assignment: &WorkshopsItemSets) {
        assert_eq!(
            assignment.item_sets().len(),
            self.workshops,
            "assignment has the wrong number of workshops"
        );
        for (workshop, set) in assignment.item_sets().iter().enumerate() {
            assert!(set.len() <= self.steps, "sequence longer than the step limit");
            let base = self.base(cycle, workshop);
            let row = &mut self.slots[base..base + self.steps];
            row.fill(None);
            for (slot, item) in row.iter_mut().zip(set.items()) {
                *slot = Some(item.id);
            }
        }
    }

    /// Returns true if any workshop crafts anything in `cycle`.
    pub fn has_items(&self, cycle: usize) -> bool {
        (0..self.workshops).any(|w| self.workshop(cycle, w).iter().any(Option::is_some))
    }

    /// Chained steps across all workshops in `cycle`.
    pub fn efficient_steps(&self, cycle: usize) -> usize {
        (0..self.workshops)
            .map(|w| {
                let crafted = self.workshop(cycle, w).iter().flatten().count();
                crafted.saturating_sub(1)
            })
            .sum()
    }

    /// The sequence one workshop crafts in `cycle`.
    ///
    /// # Panics
    ///
    /// Panics if the grid refers to an item missing from `catalog`.
    pub fn item_set(&self, catalog: &Catalog, cycle: usize, workshop: usize) -> ItemSet {
        ItemSet::new(
            self.workshop(cycle, workshop)
                .iter()
                .flatten()
                .map(|&id| catalog[id].clone())
                .collect(),
        )
    }

    pub fn item_sets(&self, catalog: &Catalog, cycle: usize) -> Vec<ItemSet> {
        (0..self.workshops)
            .map(|w| self.item_set(catalog, cycle, w))
            .collect()
    }
}
