//! # Isleplan
//!
//! A command-line tool and library for planning island workshop schedules.
//!
//! Every cycle of a season, each workshop crafts a short sequence of items
//! within its hour budget. This crate finds the assignments of sequences to
//! workshops that earn the most, based on:
//!
//! - Item values and crafting hours
//! - Production chains (consecutive items must share a category)
//! - Demand patterns, which raise or lower an item's value per cycle
//! - Groove, the momentum chained crafts build up across a season
//! - A strictness rule per cycle that holds back items still due to peak
//!
//! ## Modules
//!
//! - [`models`] - Core data structures for items, materials, patterns and groove
//! - [`catalog`] - Indexed reference data and production-chain lookups
//! - [`data`] - CSV data loading functionality
//! - [`value`] - Valuation of item sequences and full workshop assignments
//! - [`strictness`] - Per-cycle candidate filters
//! - [`optimizer`] - The resumable search for the best assignments
//! - [`schedule`] - The produced-items grid of a season
//! - [`cache`] - Finished results per cycle
//! - [`planner`] - Ties schedules, caches and optimizers together
//! - [`config`] - Persisted settings
//! - [`display`] - Output formatting and display utilities
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use isleplan::{
//!     data::load_catalog,
//!     display::display_results,
//!     models::Season,
//!     optimizer::OptimizerOptions,
//!     planner::Planner,
//! };
//!
//! // Load reference data
//! let catalog = load_catalog(Path::new("data")).unwrap();
//!
//! // Rank assignments for the first cycle of the current season
//! let mut planner = Planner::new(Arc::new(catalog), OptimizerOptions::default());
//! let results = planner.complete(Season::Current, 0);
//! display_results(&results, 0, 5);
//!
//! // Adopt the best one; the next cycle now starts at its end groove
//! if let Some(best) = results.first() {
//!     planner.apply(Season::Current, 0, best);
//! }
//! ```
//!
//! ## Incremental Search
//!
//! [`optimizer::Optimizer::generate_all_workshops`] does a bounded slice of
//! work per call and reports progress until the ranking is complete, so a UI
//! can keep polling it from its frame loop. [`planner::Planner::poll`] wraps
//! this and caches finished rankings until an edit invalidates them.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod data;
pub mod display;
pub mod models;
pub mod optimizer;
pub mod planner;
pub mod schedule;
pub mod strictness;
pub mod value;
pub mod wasm;
