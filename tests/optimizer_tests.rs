//! Tests for the workshop search.

use std::path::Path;
use std::sync::Arc;

use approx::assert_relative_eq;
use isleplan::catalog::Catalog;
use isleplan::data::load_catalog;
use isleplan::models::{
    Category, Groove, Item, ItemId, Pattern, PatternMatch, PeakStrength, WorkshopLimits,
};
use isleplan::optimizer::{generate_item_sets, Generation, Optimizer, OptimizerOptions};
use isleplan::strictness::{Strictness, When};
use isleplan::value::{ItemSet, WorkshopsItemSets};

fn item(id: u32, name: &str, hours: u32, value: u32, categories: &[&str]) -> Item {
    Item::new(
        ItemId(id),
        name,
        hours,
        value,
        categories.iter().map(|c| Category::new(*c)).collect(),
    )
}

fn workshop_catalog() -> Catalog {
    let mut tart = item(2, "Isleworks Tart", 6, 45, &["Confections"]);
    tart.set_pattern(0, PatternMatch::Known(Pattern::new(1, PeakStrength::Strong)));
    tart.set_pattern(1, PatternMatch::Known(Pattern::new(1, PeakStrength::Strong)));

    Catalog::new(vec![
        item(1, "Isleworks Pie", 4, 30, &["Foodstuffs", "Confections"]),
        tart,
        item(3, "Isleworks Rope", 4, 20, &["Sundries"]),
        item(4, "Isleworks Brush", 4, 25, &["Sundries", "Woodworks"]),
        item(5, "Isleworks Chair", 8, 70, &["Furnishings", "Woodworks"]),
        item(6, "Isleworks Anvil", 30, 500, &["Sundries"]),
    ])
    .expect("valid catalog")
}

fn options(workshops: usize, steps: usize, hours: u32) -> OptimizerOptions {
    OptimizerOptions {
        strictness: Strictness::uniform(When::Never, 7),
        rest_cycles: vec![false; 7],
        limits: WorkshopLimits {
            workshops,
            steps,
            hours,
            ..WorkshopLimits::default()
        },
        work_per_call: 1_000_000,
        result_limit: 100,
    }
}

fn run(optimizer: &mut Optimizer) -> Arc<[WorkshopsItemSets]> {
    loop {
        if let Generation::Complete(results) = optimizer.generate_all_workshops() {
            return results;
        }
    }
}

fn ids(set: &ItemSet) -> Vec<u32> {
    set.items().iter().map(|i| i.id.0).collect()
}

fn assert_feasible(set: &ItemSet, limits: &WorkshopLimits) {
    assert!(set.len() <= limits.steps, "too many steps: {:?}", ids(set));
    let mut hours = 0;
    for (step, item) in set.items().iter().enumerate() {
        hours += item.hours;
        assert!(hours <= limits.hours, "over budget: {:?}", ids(set));
        if step > 0 {
            assert!(
                item.chains_from(&set.items()[step - 1]),
                "broken chain: {:?}",
                ids(set)
            );
        }
    }
}

#[test]
fn test_two_item_chain_fills_both_workshops() {
    let catalog = Arc::new(
        Catalog::new(vec![
            item(1, "A", 4, 10, &["X"]),
            item(2, "B", 6, 20, &["X"]),
        ])
        .expect("valid catalog"),
    );
    let options = options(2, 2, 10);
    let mut optimizer = Optimizer::new(catalog, 0, Groove::ZERO, &options);

    let results = run(&mut optimizer);
    let best = &results[0];

    assert_eq!(best.item_sets().len(), 2);
    for set in best.item_sets() {
        assert_eq!(ids(set), vec![1, 2]);
    }
    assert_relative_eq!(best.effective_value(), 60.0);
    // Every assignment as good as the best keeps both workshops fully busy.
    for tied in results.iter().filter(|r| r.effective_value() >= best.effective_value()) {
        assert!(tied.item_sets().iter().all(|set| set.len() == 2));
    }
    assert!(results.iter().any(|r| r.item_sets().iter().any(ItemSet::is_empty)));
}

#[test]
fn test_generated_sets_are_feasible_and_prefix_closed() {
    let catalog = workshop_catalog();
    let limits = options(2, 3, 12).limits;
    let sets = generate_item_sets(&catalog, 0, &limits, &When::Never);

    assert!(sets[0].is_empty());
    let all: Vec<Vec<u32>> = sets.iter().map(ids).collect();
    for set in &sets {
        assert_feasible(set, &limits);
        assert!(!ids(set).contains(&6), "over-budget item scheduled");
        if set.len() > 1 {
            let prefix = ids(set)[..set.len() - 1].to_vec();
            assert!(all.contains(&prefix), "missing prefix of {:?}", ids(set));
        }
    }
    assert!(all.contains(&vec![1, 2]));
    assert!(all.contains(&vec![1, 1, 1]));
    assert!(all.contains(&vec![3, 4, 4]));
    assert!(!all.contains(&vec![1, 3]));
}

#[test]
fn test_results_are_feasible_and_ranked() {
    let catalog = Arc::new(workshop_catalog());
    let options = options(3, 4, 12);
    let mut optimizer = Optimizer::new(catalog, 1, Groove::new(5), &options);

    let results = run(&mut optimizer);

    assert_eq!(results.len(), options.result_limit);
    for window in results.windows(2) {
        assert!(window[0].effective_value() >= window[1].effective_value());
    }
    for assignment in results.iter() {
        assert_eq!(assignment.cycle(), 1);
        assert_eq!(assignment.start_groove(), Groove::new(5));
        assert_eq!(assignment.item_sets().len(), 3);
        for set in assignment.item_sets() {
            assert_feasible(set, &options.limits);
        }
    }
}

#[test]
fn test_ranking_matches_exhaustive_search() {
    let catalog = workshop_catalog();
    let options = options(2, 3, 12);
    let groove = Groove::new(8);
    let sets = generate_item_sets(&catalog, 1, &options.limits, &When::Never);

    let mut expected = Vec::new();
    for (i, a) in sets.iter().enumerate() {
        for b in &sets[i..] {
            let assignment = WorkshopsItemSets::new(vec![a.clone(), b.clone()], 1, groove, 35);
            expected.push(assignment.effective_value());
        }
    }
    expected.sort_by(|a, b| b.total_cmp(a));

    let mut optimizer = Optimizer::new(Arc::new(catalog), 1, groove, &options);
    let results = run(&mut optimizer);

    assert_eq!(results.len(), options.result_limit);
    for (got, want) in results.iter().zip(&expected) {
        assert_relative_eq!(got.effective_value(), *want, max_relative = 1e-9);
    }
}

#[test]
fn test_groove_scales_every_result() {
    let catalog = Arc::new(workshop_catalog());
    let options = options(2, 3, 12);

    let flat = run(&mut Optimizer::new(catalog.clone(), 0, Groove::ZERO, &options));
    let grooved = run(&mut Optimizer::new(catalog, 0, Groove::new(20), &options));

    assert_relative_eq!(
        grooved[0].effective_value(),
        flat[0].effective_value() * 1.2,
        max_relative = 1e-9
    );
}

#[test]
fn test_rest_cycle_yields_single_idle_result() {
    let catalog = Arc::new(workshop_catalog());
    let mut options = options(4, 6, 24);
    options.rest_cycles[3] = true;
    let mut optimizer = Optimizer::new(catalog, 3, Groove::new(9), &options);

    let results = run(&mut optimizer);

    assert_eq!(results.len(), 1);
    assert!(results[0].is_idle());
    assert_eq!(results[0].item_sets().len(), 4);
    assert_eq!(results[0].effective_value(), 0.0);
    assert_eq!(results[0].end_groove(), Groove::new(9));
}

#[test]
fn test_empty_catalog_has_no_results() {
    let catalog = Arc::new(Catalog::new(Vec::new()).expect("empty catalog is valid"));
    let mut optimizer = Optimizer::new(catalog, 0, Groove::ZERO, &options(4, 6, 24));

    assert!(run(&mut optimizer).is_empty());
    assert!(optimizer.is_complete());
}

#[test]
fn test_filter_rejecting_everything_has_no_results() {
    let catalog = Arc::new(workshop_catalog());
    let mut optimizer = Optimizer::with_filter(
        catalog,
        0,
        Groove::ZERO,
        &options(2, 3, 12),
        |_: &Item, _: usize| false,
    );

    assert!(run(&mut optimizer).is_empty());
}

#[test]
fn test_custom_filter_restricts_candidates() {
    let catalog = Arc::new(workshop_catalog());
    let options = options(2, 3, 12);
    let mut optimizer = Optimizer::with_filter(
        catalog,
        0,
        Groove::ZERO,
        &options,
        |item: &Item, _: usize| item.categories.iter().any(|c| c.name() == "Sundries"),
    );

    let results = run(&mut optimizer);
    assert!(!results.is_empty());
    for assignment in results.iter() {
        for set in assignment.item_sets() {
            assert!(ids(set).iter().all(|id| *id == 3 || *id == 4));
        }
    }
}

#[test]
fn test_strictness_holds_back_upcoming_peak() {
    let catalog = Arc::new(workshop_catalog());
    let mut options = options(2, 3, 12);
    options.strictness = Strictness::uniform(When::Strong, 7);

    let held = run(&mut Optimizer::new(catalog.clone(), 0, Groove::ZERO, &options));
    assert!(held
        .iter()
        .flat_map(|a| a.item_sets())
        .all(|set| !ids(set).contains(&2)));

    // Cycle 1 is the tart's peak, so it is back in play.
    let peak = run(&mut Optimizer::new(catalog, 1, Groove::ZERO, &options));
    assert!(peak
        .iter()
        .flat_map(|a| a.item_sets())
        .any(|set| ids(set).contains(&2)));
}

#[test]
fn test_required_without_peaks_has_no_results() {
    let catalog = Arc::new(workshop_catalog());
    let mut options = options(2, 3, 12);
    options.strictness = Strictness::uniform(When::Required, 7);

    assert!(run(&mut Optimizer::new(catalog, 4, Groove::ZERO, &options)).is_empty());
}

#[test]
fn test_progress_is_monotonic_until_complete() {
    let catalog = Arc::new(workshop_catalog());
    let mut options = options(3, 3, 12);
    options.work_per_call = 1;
    let mut optimizer = Optimizer::new(catalog, 0, Groove::ZERO, &options);

    assert_eq!(optimizer.progress(), 0.0);
    let mut last = 0.0;
    let mut polls = 0;
    let results = loop {
        polls += 1;
        match optimizer.generate_all_workshops() {
            Generation::InProgress(progress) => {
                assert!(progress >= last);
                assert!(progress < 1.0);
                last = progress;
            }
            Generation::Complete(results) => break results,
        }
    };

    assert!(polls > 1);
    assert!(!results.is_empty());
    assert_eq!(optimizer.progress(), 1.0);
}

#[test]
fn test_sliced_search_matches_single_pass() {
    let catalog = Arc::new(workshop_catalog());
    let whole = options(3, 4, 12);
    let mut sliced = whole.clone();
    sliced.work_per_call = 3;

    let a = run(&mut Optimizer::new(catalog.clone(), 2, Groove::ZERO, &whole));
    let b = run(&mut Optimizer::new(catalog, 2, Groove::ZERO, &sliced));

    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b.iter()) {
        assert_eq!(x, y);
    }
}

#[test]
fn test_completed_results_are_shared() {
    let catalog = Arc::new(workshop_catalog());
    let mut optimizer = Optimizer::new(catalog, 0, Groove::ZERO, &options(2, 3, 12));

    let first = run(&mut optimizer);
    let again = optimizer.generate_all_workshops();

    assert!(again.is_complete());
    assert_eq!(again.progress(), 1.0);
    let again = again.results().expect("complete");
    assert!(Arc::ptr_eq(&first, again));
}

#[test]
fn test_shipped_catalog_plans_a_cycle() {
    let data_dir = Path::new("data");
    if !data_dir.exists() {
        return;
    }

    let catalog = Arc::new(load_catalog(data_dir).expect("Failed to load data"));
    let mut options = OptimizerOptions::default();
    options.result_limit = 10;
    let mut optimizer = Optimizer::new(catalog, 2, Groove::new(4), &options);

    let results = run(&mut optimizer);

    assert_eq!(results.len(), 10);
    let best = &results[0];
    assert_eq!(best.item_sets().len(), options.limits.workshops);
    for set in best.item_sets() {
        assert!(!set.is_empty());
        assert_feasible(set, &options.limits);
    }
    assert!(best.end_groove() > best.start_groove());
}
