//! Value model for workshop schedules.
//!
//! [`ItemSet`] is one workshop's ordered sequence of crafts for a cycle and
//! [`WorkshopsItemSets`] pairs one sequence per workshop with the groove the
//! cycle starts at. Both are plain values: they trust their caller to have
//! built chain-compatible, within-budget sequences (the optimizer and the
//! schedule editor only ever produce those).

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::models::{Groove, Item, Material};

/// An ordered sequence of items crafted by one workshop in one cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemSet {
    items: Vec<Arc<Item>>,
}

impl ItemSet {
    pub fn new(items: Vec<Arc<Item>>) -> Self {
        ItemSet { items }
    }

    pub fn empty() -> Self {
        ItemSet::default()
    }

    pub fn items(&self) -> &[Arc<Item>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total hours the sequence occupies.
    pub fn hours(&self) -> u32 {
        self.items.iter().map(|i| i.hours).sum()
    }

    /// Sum of intrinsic item values; zero when empty.
    pub fn value(&self) -> u32 {
        self.items.iter().map(|i| i.value).sum()
    }

    /// Value sold in `cycle`, each item scaled by its own demand pattern.
    pub fn effective_value(&self, cycle: usize) -> f64 {
        self.items
            .iter()
            .map(|i| f64::from(i.value) * i.find_pattern(cycle).bonus(cycle))
            .sum()
    }

    /// Steps that chain off a previous step and so build groove.
    pub fn efficient_steps(&self) -> usize {
        self.items.len().saturating_sub(1)
    }

    /// Accumulates this sequence's materials into `totals`.
    pub fn add_materials(&self, totals: &mut BTreeMap<Material, u32>) {
        for item in &self.items {
            for cost in &item.materials {
                *totals.entry(cost.material.clone()).or_insert(0) += cost.count;
            }
        }
    }

    /// Item names joined with `/`.
    pub fn describe(&self) -> String {
        self.items
            .iter()
            .map(|i| i.short_name())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// One sequence per workshop for a cycle, started at a given groove.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use isleplan::models::{Category, Groove, Item, ItemId};
/// use isleplan::value::{ItemSet, WorkshopsItemSets};
///
/// let pot = Arc::new(Item::new(ItemId(1), "Pot", 4, 10, vec![Category::new("Sundries")]));
/// let set = ItemSet::new(vec![pot.clone(), pot]);
/// let all = WorkshopsItemSets::new(vec![set, ItemSet::empty()], 0, Groove::new(0), 35);
///
/// assert_eq!(all.effective_value(), 20.0);
/// assert_eq!(all.end_groove(), Groove::new(1));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WorkshopsItemSets {
    item_sets: Vec<ItemSet>,
    cycle: usize,
    start_groove: Groove,
    end_groove: Groove,
    effective_value: f64,
}

impl WorkshopsItemSets {
    pub fn new(item_sets: Vec<ItemSet>, cycle: usize, start_groove: Groove, max_groove: u8) -> Self {
        let raw: f64 = item_sets.iter().map(|s| s.effective_value(cycle)).sum();
        let efficient: usize = item_sets.iter().map(ItemSet::efficient_steps).sum();
        WorkshopsItemSets {
            cycle,
            start_groove,
            end_groove: start_groove.advance(efficient, max_groove),
            effective_value: raw * start_groove.multiplier(),
            item_sets,
        }
    }

    /// Every workshop idle: the shape of a rest cycle.
    pub fn idle(workshops: usize, cycle: usize, start_groove: Groove, max_groove: u8) -> Self {
        WorkshopsItemSets::new(
            vec![ItemSet::empty(); workshops],
            cycle,
            start_groove,
            max_groove,
        )
    }

    pub fn item_sets(&self) -> &[ItemSet] {
        &self.item_sets
    }

    pub fn cycle(&self) -> usize {
        self.cycle
    }

    pub fn start_groove(&self) -> Groove {
        self.start_groove
    }

    /// Groove handed to the next cycle.
    pub fn end_groove(&self) -> Groove {
        self.end_groove
    }

    /// Sum of the workshops' effective values times the start groove multiplier.
    pub fn effective_value(&self) -> f64 {
        self.effective_value
    }

    /// Total intrinsic value, ignoring patterns and groove.
    pub fn value(&self) -> u32 {
        self.item_sets.iter().map(ItemSet::value).sum()
    }

    pub fn is_idle(&self) -> bool {
        self.item_sets.iter().all(ItemSet::is_empty)
    }

    /// Materials consumed across all workshops.
    pub fn materials(&self) -> BTreeMap<Material, u32> {
        let mut totals = BTreeMap::new();
        for set in &self.item_sets {
            set.add_materials(&mut totals);
        }
        totals
    }
}
