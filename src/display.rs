//! Display and formatting utilities for Isleplan.
//!
//! This module provides functions for formatting optimizer output and
//! printing it to the terminal in a readable format.

use crate::value::{ItemSet, WorkshopsItemSets};

/// Formats search progress the way the planner reports it: rounded down to
/// steps of five percent.
///
/// # Example
///
/// ```
/// use isleplan::display::format_progress;
///
/// assert_eq!(format_progress(0.0), "Calculating, please wait... 0%");
/// assert_eq!(format_progress(0.42), "Calculating, please wait... 40%");
/// assert_eq!(format_progress(1.0), "Calculating, please wait... 100%");
/// ```
pub fn format_progress(progress: f64) -> String {
    let stepped = (progress.clamp(0.0, 1.0) * 20.0).floor() * 5.0;
    format!("Calculating, please wait... {:.0}%", stepped)
}

/// Pattern labels of a sequence, joined with `/`.
pub fn format_patterns(set: &ItemSet, cycle: usize) -> String {
    set.items()
        .iter()
        .map(|i| i.find_pattern(cycle).label())
        .collect::<Vec<_>>()
        .join("/")
}

/// Per-step hours of a sequence, joined with `/`.
pub fn format_hours(set: &ItemSet) -> String {
    set.items()
        .iter()
        .map(|i| i.hours.to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Prints the best `top` assignments of a cycle.
pub fn display_results(results: &[WorkshopsItemSets], cycle: usize, top: usize) {
    println!();
    println!("+================================================================+");
    println!("|              WORKSHOP COMBINATIONS FOR CYCLE {:<2}                |", cycle + 1);
    println!("+================================================================+");

    if results.is_empty() {
        println!();
        println!("[WARNING] No item can be scheduled in this cycle.");
        return;
    }

    for (rank, assignment) in results.iter().take(top).enumerate() {
        println!();
        println!(
            "#{:<3} Total {:>9.2}   Groove: {} -> {}",
            rank + 1,
            assignment.effective_value(),
            assignment.start_groove(),
            assignment.end_groove()
        );
        println!("----------------------------------------------------------------");
        for (w, set) in assignment.item_sets().iter().enumerate() {
            if set.is_empty() {
                println!("  Workshop {}: (idle)", w + 1);
                continue;
            }
            println!(
                "  Workshop {}: {:<40} {:<20} {}",
                w + 1,
                set.describe(),
                format_patterns(set, assignment.cycle()),
                format_hours(set)
            );
        }
    }
}

/// Prints one cycle's produced schedule with its values.
pub fn display_schedule(assignment: &WorkshopsItemSets) {
    println!();
    println!("[CYCLE {}]", assignment.cycle() + 1);
    println!("----------------------------------------------------------------");
    for (w, set) in assignment.item_sets().iter().enumerate() {
        println!(
            "  Workshop {}: {:<40} {:>3}hs  base {:>4}",
            w + 1,
            if set.is_empty() { "(idle)".to_string() } else { set.describe() },
            set.hours(),
            set.value()
        );
    }
    println!(
        "  Total Value: {:.2}   Groove: {} -> {}",
        assignment.effective_value(),
        assignment.start_groove(),
        assignment.end_groove()
    );
}

/// Prints the materials an assignment consumes, gatherable and rare apart.
pub fn display_materials(assignment: &WorkshopsItemSets) {
    let totals = assignment.materials();
    if totals.is_empty() {
        return;
    }

    println!();
    println!("{:<24} {:>8}", "Gatherable Material", "Amount");
    println!("----------------------------------------------------------------");
    for (material, count) in totals.iter().filter(|(m, _)| !m.source.is_rare()) {
        println!("{:<24} {:>8}", material.name, count);
    }

    println!();
    println!("{:<24} {:<12} {:>8}", "Rare Material", "Source", "Amount");
    println!("----------------------------------------------------------------");
    for (material, count) in totals.iter().filter(|(m, _)| m.source.is_rare()) {
        println!(
            "{:<24} {:<12} {:>8}",
            material.name,
            material.source.to_string(),
            count
        );
    }
}
