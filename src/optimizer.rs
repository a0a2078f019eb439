//! Workshop optimization for one cycle of one season.
//!
//! The [`Optimizer`] works in three stages:
//!
//! 1. **Candidates**: every sequence a single workshop could craft: start
//!    from the empty sequence, extend with any admitted item (or, after the
//!    first step, any admitted item chaining from the previous one) while the
//!    hours stay within budget. Every prefix is itself a candidate.
//! 2. **Combination**: walk all ways of handing one candidate to each
//!    workshop. Workshops are interchangeable, so the walk covers multisets:
//!    non-decreasing index tuples over the candidates sorted by value.
//! 3. **Ranking**: keep the best `result_limit` assignments, ties going to the
//!    assignment reached first.
//!
//! Combination is resumable. Each call to
//! [`Optimizer::generate_all_workshops`] performs at most `work_per_call`
//! steps and returns the fraction of the space covered so far, so a caller
//! refreshing a view can poll it without ever blocking for long. Subtrees of
//! the walk that cannot beat the current cut-off are counted as covered and
//! skipped.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::models::{Groove, WorkshopLimits};
use crate::strictness::{CandidateFilter, Strictness};
use crate::value::{ItemSet, WorkshopsItemSets};

/// Largest progress reported before the walk has actually finished.
const ALMOST_DONE: f64 = 1.0 - f64::EPSILON;

/// Options shared by every optimizer a planner creates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerOptions {
    pub strictness: Strictness,
    /// Cycles the workshops are rested; indexed by cycle
    pub rest_cycles: Vec<bool>,
    pub limits: WorkshopLimits,
    /// Combination steps performed per call
    pub work_per_call: u64,
    /// Number of ranked assignments kept
    pub result_limit: usize,
}

impl OptimizerOptions {
    pub fn is_rest(&self, cycle: usize) -> bool {
        self.rest_cycles.get(cycle).copied().unwrap_or(false)
    }
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        let limits = WorkshopLimits::default();
        OptimizerOptions {
            strictness: Strictness::default(),
            rest_cycles: vec![false; limits.cycles],
            limits,
            work_per_call: 250_000,
            result_limit: 100,
        }
    }
}

/// Outcome of one call into the optimizer.
#[derive(Debug, Clone)]
pub enum Generation {
    /// Still searching; the fraction covered so far, in `[0, 1)`
    InProgress(f64),
    /// Finished; best first
    Complete(Arc<[WorkshopsItemSets]>),
}

impl Generation {
    pub fn progress(&self) -> f64 {
        match self {
            Generation::InProgress(p) => *p,
            Generation::Complete(_) => 1.0,
        }
    }

    pub fn results(&self) -> Option<&Arc<[WorkshopsItemSets]>> {
        match self {
            Generation::Complete(r) => Some(r),
            Generation::InProgress(_) => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Generation::Complete(_))
    }
}

/// A single workshop's sequence, as catalog positions.
#[derive(Debug, Clone)]
struct Candidate {
    items: Vec<usize>,
    value: f64,
}

/// Per-item data read while extending sequences.
struct Extension<'a> {
    catalog: &'a Catalog,
    admitted: Vec<bool>,
    hours: Vec<u32>,
    values: Vec<f64>,
    limits: &'a WorkshopLimits,
}

impl Extension<'_> {
    fn new<'a>(
        catalog: &'a Catalog,
        cycle: usize,
        limits: &'a WorkshopLimits,
        filter: &dyn CandidateFilter,
    ) -> Extension<'a> {
        let items = catalog.items();
        Extension {
            catalog,
            admitted: items.iter().map(|i| filter.admits(i, cycle)).collect(),
            hours: items.iter().map(|i| i.hours).collect(),
            values: items
                .iter()
                .map(|i| f64::from(i.value) * i.find_pattern(cycle).bonus(cycle))
                .collect(),
            limits,
        }
    }

    fn generate(&self) -> Vec<Candidate> {
        let mut out = vec![Candidate {
            items: Vec::new(),
            value: 0.0,
        }];
        if self.limits.steps == 0 {
            return out;
        }
        let mut path = Vec::with_capacity(self.limits.steps);
        for first in 0..self.catalog.len() {
            self.try_push(first, &mut path, 0, 0.0, &mut out);
        }
        out
    }

    fn try_push(
        &self,
        next: usize,
        path: &mut Vec<usize>,
        hours: u32,
        value: f64,
        out: &mut Vec<Candidate>,
    ) {
        if !self.admitted[next] {
            return;
        }
        let hours = hours + self.hours[next];
        if hours > self.limits.hours {
            return;
        }
        let value = value + self.values[next];
        path.push(next);
        out.push(Candidate {
            items: path.clone(),
            value,
        });
        if path.len() < self.limits.steps {
            for &successor in self.catalog.successors_of(next) {
                self.try_push(successor, path, hours, value, out);
            }
        }
        path.pop();
    }
}

/// Every sequence one workshop could craft in `cycle`, in generation order.
///
/// The first entry is always the empty sequence.
pub fn generate_item_sets(
    catalog: &Catalog,
    cycle: usize,
    limits: &WorkshopLimits,
    filter: &dyn CandidateFilter,
) -> Vec<ItemSet> {
    Extension::new(catalog, cycle, limits, filter)
        .generate()
        .into_iter()
        .map(|c| to_item_set(catalog, &c))
        .collect()
}

fn to_item_set(catalog: &Catalog, candidate: &Candidate) -> ItemSet {
    ItemSet::new(
        candidate
            .items
            .iter()
            .map(|&p| Arc::clone(&catalog.items()[p]))
            .collect(),
    )
}

/// Number of multisets of size `r` drawn from `n` kinds: C(n + r - 1, r).
fn multisets(n: usize, r: usize) -> u128 {
    if r == 0 {
        return 1;
    }
    if n == 0 {
        return 0;
    }
    let mut count: u128 = 1;
    for i in 1..=r as u128 {
        count = count.saturating_mul(n as u128 - 1 + i) / i;
    }
    count
}

#[derive(Debug)]
struct Ranked {
    value: f64,
    picks: Vec<usize>,
}

/// Resumable walk over non-decreasing candidate tuples.
#[derive(Debug)]
struct Combination {
    candidates: Vec<Candidate>,
    cursor: Vec<usize>,
    /// First cursor position reset by the last advance
    fresh: usize,
    considered: u128,
    total: u128,
    finished: bool,
    top: Vec<Ranked>,
    limit: usize,
}

impl Combination {
    fn new(mut candidates: Vec<Candidate>, workshops: usize, limit: usize) -> Self {
        // Stable: equal values keep generation order.
        candidates.sort_by(|a, b| b.value.total_cmp(&a.value));
        let total = multisets(candidates.len(), workshops);
        Combination {
            candidates,
            cursor: vec![0; workshops],
            fresh: 0,
            considered: 0,
            total,
            finished: false,
            top: Vec::with_capacity(limit.min(1024)),
            limit,
        }
    }

    fn progress(&self) -> f64 {
        if self.finished {
            return 1.0;
        }
        (self.considered as f64 / self.total as f64).min(ALMOST_DONE)
    }

    /// Value an assignment must beat to enter a full ranking.
    fn cut_off(&self) -> Option<f64> {
        if self.top.len() < self.limit {
            None
        } else {
            self.top.last().map(|r| r.value)
        }
    }

    /// Moves to the next tuple, incrementing at or left of `level`.
    fn advance(&mut self, level: usize) {
        let k = self.candidates.len();
        for pos in (0..=level).rev() {
            if self.cursor[pos] + 1 < k {
                let next = self.cursor[pos] + 1;
                self.cursor[pos..].fill(next);
                self.fresh = pos;
                return;
            }
        }
        self.finished = true;
    }

    /// Finds the shallowest freshly entered subtree that cannot reach `cut_off`.
    fn prunable_level(&self, cut_off: f64) -> Option<usize> {
        let n = self.cursor.len();
        let mut prefix = 0.0;
        for j in 0..n {
            let value = self.candidates[self.cursor[j]].value;
            prefix += value;
            if j >= self.fresh {
                let bound = prefix + (n - 1 - j) as f64 * value;
                if bound < cut_off {
                    return Some(j);
                }
            }
        }
        None
    }

    fn offer(&mut self, value: f64) {
        if self.limit == 0 {
            return;
        }
        if let Some(cut_off) = self.cut_off() {
            if value <= cut_off {
                return;
            }
        }
        let pos = self.top.partition_point(|r| r.value >= value);
        if self.top.len() == self.limit {
            self.top.pop();
        }
        self.top.insert(
            pos,
            Ranked {
                value,
                picks: self.cursor.clone(),
            },
        );
    }

    /// Runs up to `budget` steps of the walk.
    fn run(&mut self, budget: u64) {
        let n = self.cursor.len();
        let mut steps = 0;
        while !self.finished && steps < budget {
            steps += 1;

            if let Some(level) = self.cut_off().and_then(|c| self.prunable_level(c)) {
                // Later siblings at this level are bounded no higher: skip them all.
                self.considered +=
                    multisets(self.candidates.len() - self.cursor[level], n - level);
                if level == 0 {
                    self.finished = true;
                } else {
                    self.advance(level - 1);
                }
                continue;
            }

            let value: f64 = self.cursor.iter().map(|&c| self.candidates[c].value).sum();
            self.offer(value);
            self.considered += 1;
            self.advance(n - 1);
        }
    }
}

enum Phase {
    Pending,
    Combining(Combination),
    Done(Arc<[WorkshopsItemSets]>),
}

/// Resumable search for the best workshop assignments of one cycle.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use isleplan::catalog::Catalog;
/// use isleplan::models::{Category, Groove, Item, ItemId};
/// use isleplan::optimizer::{Generation, Optimizer, OptimizerOptions};
///
/// let catalog = Arc::new(Catalog::new(vec![
///     Item::new(ItemId(1), "Isleworks Pie", 4, 30, vec![Category::new("Foodstuffs")]),
/// ]).unwrap());
/// let mut optimizer = Optimizer::new(catalog, 0, Groove::ZERO, &OptimizerOptions::default());
///
/// let results = loop {
///     if let Generation::Complete(results) = optimizer.generate_all_workshops() {
///         break results;
///     }
/// };
/// assert!(results[0].effective_value() > 0.0);
/// ```
pub struct Optimizer {
    catalog: Arc<Catalog>,
    cycle: usize,
    start_groove: Groove,
    limits: WorkshopLimits,
    rest: bool,
    work_per_call: u64,
    result_limit: usize,
    filter: Box<dyn CandidateFilter + Send + Sync>,
    phase: Phase,
}

impl Optimizer {
    /// Creates an optimizer filtering items by the cycle's strictness rule.
    ///
    /// # Panics
    ///
    /// Panics if `cycle` is outside the configured limits.
    pub fn new(
        catalog: Arc<Catalog>,
        cycle: usize,
        start_groove: Groove,
        options: &OptimizerOptions,
    ) -> Self {
        let when = options.strictness.for_cycle(cycle);
        Optimizer::with_filter(catalog, cycle, start_groove, options, when)
    }

    /// Creates an optimizer with a custom candidate filter.
    pub fn with_filter<F>(
        catalog: Arc<Catalog>,
        cycle: usize,
        start_groove: Groove,
        options: &OptimizerOptions,
        filter: F,
    ) -> Self
    where
        F: CandidateFilter + Send + Sync + 'static,
    {
        let limits = options.limits;
        assert!(
            cycle < limits.cycles,
            "cycle {cycle} out of range (limit {})",
            limits.cycles
        );
        assert!(limits.workshops > 0, "at least one workshop is required");
        Optimizer {
            catalog,
            cycle,
            start_groove,
            limits,
            rest: options.is_rest(cycle),
            work_per_call: options.work_per_call.max(1),
            result_limit: options.result_limit,
            filter: Box::new(filter),
            phase: Phase::Pending,
        }
    }

    pub fn cycle(&self) -> usize {
        self.cycle
    }

    pub fn start_groove(&self) -> Groove {
        self.start_groove
    }

    pub fn progress(&self) -> f64 {
        match &self.phase {
            Phase::Pending => 0.0,
            Phase::Combining(search) => search.progress(),
            Phase::Done(_) => 1.0,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.phase, Phase::Done(_))
    }

    /// Advances the search by one slice of work.
    ///
    /// Once complete, every further call returns the same shared results.
    pub fn generate_all_workshops(&mut self) -> Generation {
        self.phase = match std::mem::replace(&mut self.phase, Phase::Pending) {
            Phase::Pending => {
                let phase = self.begin();
                self.step(phase)
            }
            phase => self.step(phase),
        };

        match &self.phase {
            Phase::Done(results) => Generation::Complete(Arc::clone(results)),
            _ => Generation::InProgress(self.progress()),
        }
    }

    fn begin(&self) -> Phase {
        if self.rest {
            debug!(cycle = self.cycle, "rest cycle, workshops idle");
            let idle = WorkshopsItemSets::idle(
                self.limits.workshops,
                self.cycle,
                self.start_groove,
                self.limits.max_groove,
            );
            return Phase::Done(Arc::from(vec![idle]));
        }

        let candidates =
            Extension::new(&self.catalog, self.cycle, &self.limits, self.filter.as_ref())
                .generate();
        debug!(
            cycle = self.cycle,
            candidates = candidates.len(),
            "generated workshop candidates"
        );
        if candidates.len() <= 1 {
            return Phase::Done(Arc::from(Vec::new()));
        }

        let search = Combination::new(candidates, self.limits.workshops, self.result_limit);
        debug!(
            cycle = self.cycle,
            combinations = %search.total,
            "starting combination search"
        );
        Phase::Combining(search)
    }

    fn step(&self, phase: Phase) -> Phase {
        match phase {
            Phase::Combining(mut search) => {
                search.run(self.work_per_call);
                if search.finished {
                    Phase::Done(self.finish(search))
                } else {
                    Phase::Combining(search)
                }
            }
            other => other,
        }
    }

    fn finish(&self, search: Combination) -> Arc<[WorkshopsItemSets]> {
        let results: Vec<WorkshopsItemSets> = search
            .top
            .iter()
            .map(|ranked| {
                let sets = ranked
                    .picks
                    .iter()
                    .map(|&c| to_item_set(&self.catalog, &search.candidates[c]))
                    .collect();
                WorkshopsItemSets::new(sets, self.cycle, self.start_groove, self.limits.max_groove)
            })
            .collect();
        info!(
            cycle = self.cycle,
            results = results.len(),
            best = results.first().map(|r| r.effective_value()).unwrap_or(0.0),
            "workshop search complete"
        );
        Arc::from(results)
    }
}
