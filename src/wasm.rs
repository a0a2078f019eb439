//! WebAssembly bindings for Isleplan.
//!
//! This module exposes a [`WasmPlanner`] that a browser UI drives from its
//! frame loop: call `poll` each frame until it reports `ready`, then show the
//! ranked combinations. All inputs and outputs are JSON strings.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::config::Configuration;
use crate::data::catalog_from_json;
use crate::display::format_progress;
use crate::models::{Groove, ItemId, Season};
use crate::optimizer::Generation;
use crate::planner::Planner;
use crate::strictness::When;
use crate::value::{ItemSet, WorkshopsItemSets};

/// JavaScript-friendly view of one workshop's sequence.
#[derive(Debug, Clone, Serialize)]
pub struct JsWorkshop {
    pub item_ids: Vec<u32>,
    pub items: Vec<String>,
    pub patterns: Vec<String>,
    pub hours: u32,
    pub value: u32,
}

/// JavaScript-friendly view of a full assignment.
#[derive(Debug, Clone, Serialize)]
pub struct JsCombination {
    pub workshops: Vec<JsWorkshop>,
    pub value: u32,
    pub effective_value: f64,
    pub start_groove: u8,
    pub end_groove: u8,
}

/// JavaScript-friendly poll output.
#[derive(Debug, Clone, Serialize)]
pub struct JsPollResult {
    pub success: bool,
    pub error: Option<String>,
    pub ready: bool,
    pub progress: f64,
    pub progress_text: String,
    pub combinations: Vec<JsCombination>,
}

/// JavaScript-friendly material total.
#[derive(Debug, Clone, Serialize)]
pub struct JsMaterial {
    pub name: String,
    pub source: String,
    pub rare: bool,
    pub count: u32,
}

/// JavaScript-friendly schedule edit.
#[derive(Debug, Clone, Deserialize)]
pub struct JsStepEdit {
    pub season: String,
    pub cycle: usize,
    pub workshop: usize,
    pub step: usize,
    #[serde(default)]
    pub item_id: Option<u32>,
}

impl JsWorkshop {
    fn new(set: &ItemSet, cycle: usize) -> Self {
        JsWorkshop {
            item_ids: set.items().iter().map(|i| i.id.0).collect(),
            items: set.items().iter().map(|i| i.short_name().to_string()).collect(),
            patterns: set
                .items()
                .iter()
                .map(|i| i.find_pattern(cycle).label())
                .collect(),
            hours: set.hours(),
            value: set.value(),
        }
    }
}

impl From<&WorkshopsItemSets> for JsCombination {
    fn from(assignment: &WorkshopsItemSets) -> Self {
        JsCombination {
            workshops: assignment
                .item_sets()
                .iter()
                .map(|set| JsWorkshop::new(set, assignment.cycle()))
                .collect(),
            value: assignment.value(),
            effective_value: assignment.effective_value(),
            start_groove: assignment.start_groove().level(),
            end_groove: assignment.end_groove().level(),
        }
    }
}

impl JsPollResult {
    fn failure(message: String) -> Self {
        JsPollResult {
            success: false,
            error: Some(message),
            ready: false,
            progress: 0.0,
            progress_text: String::new(),
            combinations: vec![],
        }
    }
}

fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

fn parse_season(season: &str) -> Result<Season, JsValue> {
    match season.to_ascii_lowercase().as_str() {
        "current" => Ok(Season::Current),
        "previous" => Ok(Season::Previous),
        other => Err(JsValue::from_str(&format!("Unknown season: {}", other))),
    }
}

/// A planner held on the JavaScript side between frames.
#[wasm_bindgen]
pub struct WasmPlanner {
    planner: Planner,
    config: Configuration,
}

#[wasm_bindgen]
impl WasmPlanner {
    /// Builds a planner from a JSON item array and a JSON configuration
    /// (an empty string uses the defaults).
    #[wasm_bindgen(constructor)]
    pub fn new(catalog_json: &str, config_json: &str) -> Result<WasmPlanner, JsValue> {
        let catalog = catalog_from_json(catalog_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid catalog: {}", e)))?;
        let config: Configuration = if config_json.trim().is_empty() {
            Configuration::default()
        } else {
            serde_json::from_str(config_json)
                .map_err(|e| JsValue::from_str(&format!("Invalid configuration: {}", e)))?
        };
        let options = config
            .options()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        log(&format!("isleplan: loaded {} items", catalog.len()));
        Ok(WasmPlanner {
            planner: Planner::new(Arc::new(catalog), options),
            config,
        })
    }

    /// Advances the search for a cycle by one slice and returns a
    /// [`JsPollResult`] as JSON.
    pub fn poll(&mut self, season: &str, cycle: usize, top: usize) -> String {
        let result = match parse_season(season) {
            Err(_) => JsPollResult::failure(format!("Unknown season: {}", season)),
            Ok(_) if cycle >= self.planner.limits().cycles => {
                JsPollResult::failure(format!("Cycle {} is out of range", cycle + 1))
            }
            Ok(season) => match self.planner.poll(season, cycle) {
                Generation::InProgress(progress) => JsPollResult {
                    success: true,
                    error: None,
                    ready: false,
                    progress,
                    progress_text: format_progress(progress),
                    combinations: vec![],
                },
                Generation::Complete(results) => JsPollResult {
                    success: true,
                    error: None,
                    ready: true,
                    progress: 1.0,
                    progress_text: String::new(),
                    combinations: results.iter().take(top).map(JsCombination::from).collect(),
                },
            },
        };
        serde_json::to_string(&result).unwrap_or_default()
    }

    /// Adopts the `rank`-th (zero-based) cached result as the produced
    /// schedule of `cycle`.
    pub fn apply(&mut self, season: &str, cycle: usize, rank: usize) -> Result<(), JsValue> {
        let season = parse_season(season)?;
        if !season.accepts_results() {
            return Err(JsValue::from_str("Results cannot be applied to the previous season"));
        }
        if cycle >= self.planner.limits().cycles {
            return Err(JsValue::from_str("Cycle out of range"));
        }
        let results = self
            .planner
            .cached(season, cycle)
            .ok_or_else(|| JsValue::from_str("Results for this cycle are not ready"))?;
        let chosen = results
            .get(rank)
            .ok_or_else(|| JsValue::from_str("No result at that rank"))?;
        self.planner.apply(season, cycle, chosen);
        Ok(())
    }

    /// Edits one step of the produced schedule; a missing `item_id` clears it.
    pub fn set_produced(&mut self, edit_json: &str) -> Result<(), JsValue> {
        let edit: JsStepEdit = serde_json::from_str(edit_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid input: {}", e)))?;
        let season = parse_season(&edit.season)?;
        let limits = *self.planner.limits();
        if edit.cycle >= limits.cycles || edit.workshop >= limits.workshops || edit.step >= limits.steps
        {
            return Err(JsValue::from_str("Slot out of range"));
        }
        self.planner
            .set_produced(season, edit.cycle, edit.workshop, edit.step, edit.item_id.map(ItemId))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Produced schedule of one cycle as a [`JsCombination`] JSON object.
    pub fn produced(&self, season: &str, cycle: usize) -> Result<String, JsValue> {
        let season = parse_season(season)?;
        if cycle >= self.planner.limits().cycles {
            return Err(JsValue::from_str("Cycle out of range"));
        }
        let assignment = self.planner.workshops_item_sets(season, cycle);
        serde_json::to_string(&JsCombination::from(&assignment))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Materials the produced schedule of one cycle consumes.
    pub fn materials(&self, season: &str, cycle: usize) -> Result<String, JsValue> {
        let season = parse_season(season)?;
        if cycle >= self.planner.limits().cycles {
            return Err(JsValue::from_str("Cycle out of range"));
        }
        let materials: Vec<JsMaterial> = self
            .planner
            .workshops_item_sets(season, cycle)
            .materials()
            .into_iter()
            .map(|(material, count)| JsMaterial {
                rare: material.source.is_rare(),
                source: material.source.to_string(),
                name: material.name,
                count,
            })
            .collect();
        serde_json::to_string(&materials).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn set_rest(&mut self, cycle: usize, rest: bool) -> Result<(), JsValue> {
        if cycle >= self.planner.limits().cycles {
            return Err(JsValue::from_str("Cycle out of range"));
        }
        self.planner.set_rest(cycle, rest);
        self.config.rest_cycles.retain(|&c| c != cycle);
        if rest {
            self.config.rest_cycles.push(cycle);
            self.config.rest_cycles.sort_unstable();
        }
        Ok(())
    }

    /// Switches between the strict and relaxed strictness presets.
    pub fn set_strict(&mut self, strict: bool) {
        self.config.strict = strict;
        self.planner.set_strictness(self.config.strictness().clone());
    }

    /// Overrides the rule of a single cycle in the active preset.
    pub fn set_cycle_strictness(&mut self, cycle: usize, when: &str) -> Result<(), JsValue> {
        let when: When = when.parse().map_err(|e: String| JsValue::from_str(&e))?;
        let mut strictness = self.config.strictness().clone();
        let slot = strictness
            .per_cycle
            .get_mut(cycle)
            .ok_or_else(|| JsValue::from_str("Cycle out of range"))?;
        *slot = when;
        if self.config.strict {
            self.config.strict_defaults = strictness.clone();
        } else {
            self.config.relaxed_defaults = strictness.clone();
        }
        self.planner.set_strictness(strictness);
        Ok(())
    }

    pub fn set_initial_groove(&mut self, season: &str, groove: u8) -> Result<(), JsValue> {
        let season = parse_season(season)?;
        self.planner.set_initial_groove(season, Groove::new(groove));
        Ok(())
    }

    /// The current configuration, for the UI to persist.
    pub fn config(&self) -> String {
        serde_json::to_string(&self.config).unwrap_or_default()
    }
}

/// Get the version of the planner.
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
