//! Isleplan - Command Line Interface
//!
//! This is the main entry point for the workshop planner.
//! Run with `--help` to see all available options.

use clap::{Parser, ValueEnum};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use isleplan::{
    config::Configuration,
    data::load_catalog,
    display::{display_materials, display_results, display_schedule, format_progress},
    models::{Groove, Season},
    optimizer::Generation,
    planner::Planner,
    strictness::{Strictness, When},
    value::WorkshopsItemSets,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SeasonArg {
    Current,
    Previous,
}

impl From<SeasonArg> for Season {
    fn from(arg: SeasonArg) -> Self {
        match arg {
            SeasonArg::Current => Season::Current,
            SeasonArg::Previous => Season::Previous,
        }
    }
}

/// Command-line arguments for Isleplan.
#[derive(Parser, Debug)]
#[command(name = "isleplan")]
#[command(author, version, about = "Plan island workshop schedules for maximum value", long_about = None)]
struct Args {
    /// Directory holding materials.csv, items.csv and patterns.csv
    #[arg(short, long, default_value = "data")]
    data: PathBuf,

    /// Configuration file (JSON); defaults are used if it does not exist
    #[arg(long, default_value = "isleplan.json")]
    config: PathBuf,

    /// Season to plan
    #[arg(short, long, value_enum, default_value = "current")]
    season: SeasonArg,

    /// Cycle to optimize (1-based)
    #[arg(short, long, default_value = "1")]
    cycle: usize,

    /// Groove at the start of the season
    #[arg(short, long, default_value = "0")]
    groove: u8,

    /// Use the strict strictness preset
    #[arg(long, default_value = "false")]
    strict: bool,

    /// Apply one strictness rule to every cycle (Never, Weak, Strong, Either, Always, Required)
    #[arg(long)]
    strictness: Option<When>,

    /// Rested cycles (1-based, comma separated)
    #[arg(long, value_delimiter = ',')]
    rest: Vec<usize>,

    /// Number of ranked combinations to show
    #[arg(short, long, default_value = "10")]
    top: usize,

    /// Plan every cycle in turn, adopting the best combination each time
    #[arg(long, default_value = "false")]
    plan_week: bool,
}

fn run_to_completion(planner: &mut Planner, season: Season, cycle: usize) -> Arc<[WorkshopsItemSets]> {
    let mut last = String::new();
    loop {
        match planner.poll(season, cycle) {
            Generation::Complete(results) => return results,
            Generation::InProgress(progress) => {
                let line = format_progress(progress);
                if line != last {
                    info!(cycle = cycle + 1, "{line}");
                    last = line;
                }
            }
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "isleplan=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    if !args.data.exists() {
        eprintln!(
            "Error: '{}' directory not found. Please run from the project root.",
            args.data.display()
        );
        std::process::exit(1);
    }

    let mut config = Configuration::load_or_default(&args.config)?;
    if args.strict {
        config.strict = true;
    }
    for &cycle in &args.rest {
        if cycle == 0 {
            return Err("rest cycles are 1-based".into());
        }
        config.rest_cycles.push(cycle - 1);
    }
    let mut options = config.options()?;
    if let Some(when) = args.strictness {
        options.strictness = Strictness::uniform(when, config.limits.cycles);
    }

    let cycles = options.limits.cycles;
    if args.cycle == 0 || args.cycle > cycles {
        return Err(format!("cycle must be between 1 and {cycles}").into());
    }

    let catalog = Arc::new(load_catalog(&args.data)?);
    let season = Season::from(args.season);

    println!("Isleplan - Island Workshop Planner");
    println!("================================================================");
    println!();
    println!("Configuration:");
    println!("  Season:          {}", season);
    println!("  Starting Groove: {}", args.groove);
    println!("  Strictness:      {}", if config.strict { "strict" } else { "relaxed" });
    println!(
        "  Workshops:       {} x {} steps, {}hs",
        options.limits.workshops, options.limits.steps, options.limits.hours
    );
    println!("  Items:           {}", catalog.len());

    let mut planner = Planner::new(catalog, options);
    planner.set_initial_groove(season, Groove::new(args.groove));

    if args.plan_week {
        if !season.accepts_results() {
            return Err(format!("cannot plan the {season} season, only record it").into());
        }
        let mut total = 0.0;
        for cycle in 0..cycles {
            let results = run_to_completion(&mut planner, season, cycle);
            if let Some(best) = results.first() {
                planner.apply(season, cycle, best);
            }
            let produced = planner.workshops_item_sets(season, cycle);
            total += produced.effective_value();
            display_schedule(&produced);
        }
        println!();
        println!("[SUMMARY]");
        println!("----------------------------------------------------------------");
        println!("  Season Value:     {:.2}", total);
        return Ok(());
    }

    let cycle = args.cycle - 1;
    let results = run_to_completion(&mut planner, season, cycle);
    display_results(&results, cycle, args.top);
    if let Some(best) = results.first() {
        display_materials(best);
    }

    Ok(())
}
