//! The planner owns everything keyed by (season, cycle): the produced-items
//! grids, the result caches, and the optimizers still working.
//!
//! Groove flows forward through a season: cycle `c` starts at the groove
//! cycle `c - 1` ends at. So an edit to cycle `c` invalidates `c` and every
//! later cycle of that season, while changing strictness or rest cycles
//! invalidates everything.

use std::sync::Arc;

use tracing::debug;

use crate::cache::ItemSetsCache;
use crate::catalog::Catalog;
use crate::models::{Groove, ItemId, Season, WorkshopLimits};
use crate::optimizer::{Generation, Optimizer, OptimizerOptions};
use crate::schedule::{ProducedItems, ScheduleError};
use crate::strictness::Strictness;
use crate::value::WorkshopsItemSets;

struct SeasonState {
    produced: ProducedItems,
    cache: ItemSetsCache,
    optimizers: Vec<Option<Optimizer>>,
    initial_groove: Groove,
}

impl SeasonState {
    fn new(limits: &WorkshopLimits) -> Self {
        SeasonState {
            produced: ProducedItems::new(limits),
            cache: ItemSetsCache::new(limits.cycles),
            optimizers: (0..limits.cycles).map(|_| None).collect(),
            initial_groove: Groove::ZERO,
        }
    }

    fn invalidate(&mut self, from_cycle: usize) {
        self.cache.invalidate_from(from_cycle);
        for slot in self.optimizers.iter_mut().skip(from_cycle) {
            *slot = None;
        }
    }
}

/// Schedules and cached optimizer results for both seasons.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use isleplan::catalog::Catalog;
/// use isleplan::models::{Category, Item, ItemId, Season};
/// use isleplan::optimizer::OptimizerOptions;
/// use isleplan::planner::Planner;
///
/// let catalog = Catalog::new(vec![
///     Item::new(ItemId(1), "Isleworks Pie", 4, 30, vec![Category::new("Foodstuffs")]),
/// ]).unwrap();
/// let mut planner = Planner::new(Arc::new(catalog), OptimizerOptions::default());
///
/// let best = planner.complete(Season::Current, 0)[0].clone();
/// planner.apply(Season::Current, 0, &best);
/// assert_eq!(planner.start_groove(Season::Current, 1), best.end_groove());
/// ```
pub struct Planner {
    catalog: Arc<Catalog>,
    options: OptimizerOptions,
    seasons: [SeasonState; 2],
}

impl Planner {
    pub fn new(catalog: Arc<Catalog>, mut options: OptimizerOptions) -> Self {
        let limits = options.limits;
        options.rest_cycles.resize(limits.cycles, false);
        Planner {
            catalog,
            options,
            seasons: [SeasonState::new(&limits), SeasonState::new(&limits)],
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn options(&self) -> &OptimizerOptions {
        &self.options
    }

    pub fn limits(&self) -> &WorkshopLimits {
        &self.options.limits
    }

    fn season(&self, season: Season) -> &SeasonState {
        &self.seasons[season.index()]
    }

    fn check_cycle(&self, cycle: usize) {
        assert!(
            cycle < self.options.limits.cycles,
            "cycle {cycle} out of range (limit {})",
            self.options.limits.cycles
        );
    }

    pub fn produced(&self, season: Season) -> &ProducedItems {
        &self.season(season).produced
    }

    /// Finished results for a cycle, without starting any work.
    pub fn cached(&self, season: Season, cycle: usize) -> Option<Arc<[WorkshopsItemSets]>> {
        self.season(season).cache.get(cycle)
    }

    pub fn initial_groove(&self, season: Season) -> Groove {
        self.season(season).initial_groove
    }

    /// Groove `cycle` starts at, carried forward from the produced schedule.
    pub fn start_groove(&self, season: Season, cycle: usize) -> Groove {
        self.check_cycle(cycle);
        let state = self.season(season);
        let max = self.options.limits.max_groove;
        (0..cycle)
            .filter(|&c| !self.options.is_rest(c))
            .fold(state.initial_groove, |groove, c| {
                groove.advance(state.produced.efficient_steps(c), max)
            })
    }

    /// Values the produced schedule of one cycle.
    pub fn workshops_item_sets(&self, season: Season, cycle: usize) -> WorkshopsItemSets {
        let start = self.start_groove(season, cycle);
        let limits = &self.options.limits;
        if self.options.is_rest(cycle) {
            return WorkshopsItemSets::idle(limits.workshops, cycle, start, limits.max_groove);
        }
        let sets = self.season(season).produced.item_sets(&self.catalog, cycle);
        WorkshopsItemSets::new(sets, cycle, start, limits.max_groove)
    }

    /// Returns the cached ranking, or advances that cycle's search by one
    /// slice of work.
    pub fn poll(&mut self, season: Season, cycle: usize) -> Generation {
        self.check_cycle(cycle);
        if let Some(results) = self.season(season).cache.get(cycle) {
            return Generation::Complete(results);
        }

        let start = self.start_groove(season, cycle);
        let Planner {
            catalog,
            options,
            seasons,
        } = self;
        let state = &mut seasons[season.index()];
        let optimizer = state.optimizers[cycle].get_or_insert_with(|| {
            debug!(%season, cycle, %start, "starting optimizer");
            Optimizer::new(Arc::clone(catalog), cycle, start, options)
        });

        let generation = optimizer.generate_all_workshops();
        if let Generation::Complete(results) = &generation {
            state.cache.store(cycle, Arc::clone(results));
            state.optimizers[cycle] = None;
        }
        generation
    }

    /// Polls until the cycle's ranking is finished.
    pub fn complete(&mut self, season: Season, cycle: usize) -> Arc<[WorkshopsItemSets]> {
        loop {
            if let Generation::Complete(results) = self.poll(season, cycle) {
                return results;
            }
        }
    }

    /// Edits one step of the produced schedule.
    ///
    /// # Errors
    ///
    /// See [`ProducedItems::set`]; nothing is invalidated on error.
    pub fn set_produced(
        &mut self,
        season: Season,
        cycle: usize,
        workshop: usize,
        step: usize,
        item: Option<ItemId>,
    ) -> Result<(), ScheduleError> {
        let state = &mut self.seasons[season.index()];
        state
            .produced
            .set(&self.catalog, cycle, workshop, step, item)?;
        self.invalidate(season, cycle);
        Ok(())
    }

    pub fn clear_workshop(&mut self, season: Season, cycle: usize, workshop: usize) {
        self.seasons[season.index()]
            .produced
            .clear_workshop(cycle, workshop);
        self.invalidate(season, cycle);
    }

    /// Adopts an optimizer result as the produced schedule of `cycle`.
    ///
    /// The cycle's own ranking stays valid (its starting groove did not
    /// change); later cycles are invalidated.
    pub fn apply(&mut self, season: Season, cycle: usize, assignment: &WorkshopsItemSets) {
        self.seasons[season.index()]
            .produced
            .assign(cycle, assignment);
        self.invalidate(season, cycle + 1);
    }

    pub fn set_initial_groove(&mut self, season: Season, groove: Groove) {
        if self.seasons[season.index()].initial_groove != groove {
            self.seasons[season.index()].initial_groove = groove;
            self.invalidate(season, 0);
        }
    }

    pub fn set_rest(&mut self, cycle: usize, rest: bool) {
        self.check_cycle(cycle);
        if self.options.rest_cycles[cycle] != rest {
            self.options.rest_cycles[cycle] = rest;
            self.invalidate_all();
        }
    }

    pub fn set_strictness(&mut self, strictness: Strictness) {
        if self.options.strictness != strictness {
            self.options.strictness = strictness;
            self.invalidate_all();
        }
    }

    /// Clears `from_cycle` and every later cycle of `season`.
    pub fn invalidate(&mut self, season: Season, from_cycle: usize) {
        debug!(%season, from_cycle, "invalidating");
        self.seasons[season.index()].invalidate(from_cycle);
    }

    /// Clears every cycle of both seasons.
    pub fn invalidate_all(&mut self) {
        debug!("invalidating both seasons");
        for state in &mut self.seasons {
            state.invalidate(0);
        }
    }
}
