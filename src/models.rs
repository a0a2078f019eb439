//! Data models and structures for Isleplan.
//!
//! This module contains the reference data types (items, materials, demand
//! patterns), the groove state carried between cycles, and the limits that
//! shape a workshop schedule.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a craftable item in the reference catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A production-chain tag.
///
/// An item exposes one or more categories; any item exposing a category the
/// previous step's item exposes may follow it in a workshop.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Category(pub String);

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Category(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Where a material comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MaterialSource {
    /// Gathered by hand around the island
    Gatherable,
    /// Expedition returns
    Granary,
    /// Animal leavings
    Pasture,
    /// Harvested produce
    Cropland,
}

impl MaterialSource {
    /// Returns true for everything that is not hand-gathered.
    pub fn is_rare(&self) -> bool {
        !matches!(self, MaterialSource::Gatherable)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gatherable" => Some(MaterialSource::Gatherable),
            "granary" => Some(MaterialSource::Granary),
            "pasture" => Some(MaterialSource::Pasture),
            "cropland" => Some(MaterialSource::Cropland),
            _ => None,
        }
    }
}

impl fmt::Display for MaterialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MaterialSource::Gatherable => "Gatherable",
            MaterialSource::Granary => "Granary",
            MaterialSource::Pasture => "Pasture",
            MaterialSource::Cropland => "Cropland",
        };
        f.write_str(name)
    }
}

/// A raw material consumed by crafting.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub source: MaterialSource,
}

/// A material requirement of one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialCost {
    pub material: Material,
    pub count: u32,
}

/// How pronounced a demand peak is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeakStrength {
    Weak,
    Strong,
}

/// Supply level of an item in one cycle; lower supply sells for more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Supply {
    Nonexistent,
    Insufficient,
    Sufficient,
    Surplus,
}

impl Supply {
    /// Value multiplier applied to an item sold at this supply level.
    pub fn multiplier(&self) -> f64 {
        match self {
            Supply::Nonexistent => 1.6,
            Supply::Insufficient => 1.3,
            Supply::Sufficient => 1.0,
            Supply::Surplus => 0.8,
        }
    }
}

/// A weekly demand pattern: the cycle in which an item peaks and how hard.
///
/// Cycles are zero-based internally; names use the one-based form players
/// read in game, e.g. `"4 Strong"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pattern {
    pub peak_cycle: usize,
    pub strength: PeakStrength,
}

impl Pattern {
    pub fn new(peak_cycle: usize, strength: PeakStrength) -> Self {
        Pattern {
            peak_cycle,
            strength,
        }
    }

    /// Supply level this pattern predicts for `cycle`.
    pub fn supply(&self, cycle: usize) -> Supply {
        if cycle < self.peak_cycle {
            Supply::Sufficient
        } else if cycle == self.peak_cycle {
            match self.strength {
                PeakStrength::Strong => Supply::Nonexistent,
                PeakStrength::Weak => Supply::Insufficient,
            }
        } else {
            Supply::Surplus
        }
    }

    pub fn name(&self) -> String {
        self.to_string()
    }

    /// Parses the compact form used in data files: `4S`, `2W`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let tail = s.chars().last()?;
        let digits = &s[..s.len() - tail.len_utf8()];
        let strength = match tail {
            'S' | 's' => PeakStrength::Strong,
            'W' | 'w' => PeakStrength::Weak,
            _ => return None,
        };
        let peak: usize = digits.parse().ok()?;
        if peak == 0 {
            return None;
        }
        Some(Pattern::new(peak - 1, strength))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let strength = match self.strength {
            PeakStrength::Weak => "Weak",
            PeakStrength::Strong => "Strong",
        };
        write!(f, "{} {}", self.peak_cycle + 1, strength)
    }
}

/// Result of looking up an item's demand pattern for a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PatternMatch {
    /// Nothing observed yet
    #[default]
    Unknown,
    /// Observations fit more than one pattern
    Ambiguous,
    /// Exactly one pattern fits
    Known(Pattern),
}

impl PatternMatch {
    /// The `(pattern, found)` pair: `found` is false only for [`PatternMatch::Unknown`].
    pub fn as_lookup(&self) -> (Option<Pattern>, bool) {
        match self {
            PatternMatch::Unknown => (None, false),
            PatternMatch::Ambiguous => (None, true),
            PatternMatch::Known(p) => (Some(*p), true),
        }
    }

    /// Per-item value multiplier in `cycle`.
    pub fn bonus(&self, cycle: usize) -> f64 {
        match self {
            PatternMatch::Known(p) => p.supply(cycle).multiplier(),
            _ => 1.0,
        }
    }

    /// Short label: the pattern name, `*` when ambiguous and `?` when unknown.
    pub fn label(&self) -> String {
        match self {
            PatternMatch::Unknown => "?".to_string(),
            PatternMatch::Ambiguous => "*".to_string(),
            PatternMatch::Known(p) => p.name(),
        }
    }

    /// Parses `?`, `*` or a compact pattern such as `4S`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "?" | "" => Some(PatternMatch::Unknown),
            "*" => Some(PatternMatch::Ambiguous),
            other => Pattern::parse(other).map(PatternMatch::Known),
        }
    }
}

/// Represents a single craftable item in the reference catalog.
///
/// # Example
///
/// ```
/// use isleplan::models::{Category, Item, ItemId, Pattern, PatternMatch, PeakStrength};
///
/// let mut item = Item::new(ItemId(1), "Isleworks Potion", 4, 28, vec![Category::new("Concoctions")]);
/// item.set_pattern(2, PatternMatch::Known(Pattern::new(2, PeakStrength::Strong)));
///
/// assert_eq!(item.find_pattern(2).label(), "3 Strong");
/// assert_eq!(item.find_pattern(0), PatternMatch::Unknown);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    /// Display name (e.g., "Isleworks Potion")
    pub name: String,
    /// Hours one craft occupies a workshop
    pub hours: u32,
    /// Intrinsic value of one craft
    pub value: u32,
    /// Production-chain categories this item exposes
    pub categories: Vec<Category>,
    /// Materials consumed per craft
    #[serde(default)]
    pub materials: Vec<MaterialCost>,
    /// Pattern lookup indexed by cycle; missing cycles are unknown
    #[serde(default)]
    pub patterns: Vec<PatternMatch>,
}

impl Item {
    pub fn new(
        id: ItemId,
        name: impl Into<String>,
        hours: u32,
        value: u32,
        categories: Vec<Category>,
    ) -> Self {
        Item {
            id,
            name: name.into(),
            hours,
            value,
            categories,
            materials: Vec::new(),
            patterns: Vec::new(),
        }
    }

    /// Looks up the demand pattern this item follows as of `cycle`.
    pub fn find_pattern(&self, cycle: usize) -> PatternMatch {
        self.patterns.get(cycle).copied().unwrap_or_default()
    }

    /// Records the pattern lookup for `cycle`, growing the table as needed.
    pub fn set_pattern(&mut self, cycle: usize, pattern: PatternMatch) {
        if self.patterns.len() <= cycle {
            self.patterns.resize(cycle + 1, PatternMatch::Unknown);
        }
        self.patterns[cycle] = pattern;
    }

    /// Returns true if this item shares at least one category with `other`.
    pub fn chains_from(&self, other: &Item) -> bool {
        self.categories.iter().any(|c| other.categories.contains(c))
    }

    /// Name without the in-game `Isleworks ` prefix.
    pub fn short_name(&self) -> &str {
        self.name.strip_prefix("Isleworks ").unwrap_or(&self.name)
    }
}

/// Carried momentum that multiplies a cycle's total value.
///
/// # Example
///
/// ```
/// use isleplan::models::Groove;
///
/// let groove = Groove::new(10);
/// assert_eq!(Groove::new(50).multiplier(), 1.5);
/// assert_eq!(groove.advance(30, 35), Groove::new(35));
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Groove(pub u8);

impl Groove {
    pub const ZERO: Groove = Groove(0);

    pub fn new(level: u8) -> Self {
        Groove(level)
    }

    pub fn level(&self) -> u8 {
        self.0
    }

    /// Value multiplier for a cycle started at this groove.
    pub fn multiplier(&self) -> f64 {
        1.0 + f64::from(self.0) / 100.0
    }

    /// Groove after `efficient_steps` chained crafts, capped at `max`.
    pub fn advance(&self, efficient_steps: usize, max: u8) -> Groove {
        let gained = u8::try_from(efficient_steps).unwrap_or(u8::MAX);
        Groove(self.0.saturating_add(gained).min(max))
    }
}

impl fmt::Display for Groove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shape of the schedule: how many workshops, steps and hours per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkshopLimits {
    pub workshops: usize,
    pub steps: usize,
    pub hours: u32,
    pub cycles: usize,
    pub max_groove: u8,
}

impl Default for WorkshopLimits {
    fn default() -> Self {
        WorkshopLimits {
            workshops: 4,
            steps: 6,
            hours: 24,
            cycles: 7,
            max_groove: 35,
        }
    }
}

/// One of the two parallel timelines a schedule is kept for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Current,
    Previous,
}

impl Season {
    pub const ALL: [Season; 2] = [Season::Current, Season::Previous];

    pub fn index(&self) -> usize {
        match self {
            Season::Current => 0,
            Season::Previous => 1,
        }
    }

    /// Whether optimizer results may be applied to this season's schedule.
    /// The previous season is a record of what was crafted and is only
    /// edited step by step.
    pub fn accepts_results(&self) -> bool {
        matches!(self, Season::Current)
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Season::Current => f.write_str("current"),
            Season::Previous => f.write_str("previous"),
        }
    }
}

// ============================================================================
// CSV Row Structures
// ============================================================================

/// CSV row structure for `materials.csv`.
#[derive(Debug, Deserialize)]
pub struct MaterialRow {
    pub name: String,
    pub source: String,
}

/// CSV row structure for `items.csv`.
#[derive(Debug, Deserialize)]
pub struct ItemRow {
    pub id: u32,
    pub name: String,
    pub hours: u32,
    pub value: u32,
    /// `;`-separated category names
    pub categories: String,
    /// `;`-separated `material:count` pairs (may be empty)
    pub materials: Option<String>,
}

/// CSV row structure for `patterns.csv`.
#[derive(Debug, Deserialize)]
pub struct PatternRow {
    /// Item name
    pub item: String,
    /// One-based cycle the observation applies to
    pub cycle: usize,
    /// `?`, `*`, or a compact pattern such as `4S`
    pub pattern: String,
}
