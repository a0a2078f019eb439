//! Strictness rules that filter which items the optimizer may schedule.
//!
//! Producing an item before its demand peak raises its supply for the peak
//! itself, so the optimizer can be told to hold such items back. [`When`]
//! names how aggressively that happens; [`Strictness`] picks a `When` per
//! cycle. Anything implementing [`CandidateFilter`] can stand in for the
//! built-in rules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{Item, PatternMatch, PeakStrength};

/// Decides whether an item may appear in a candidate sequence for a cycle.
///
/// Filters are only read during candidate generation.
pub trait CandidateFilter {
    fn admits(&self, item: &Item, cycle: usize) -> bool;
}

impl<F> CandidateFilter for F
where
    F: Fn(&Item, usize) -> bool,
{
    fn admits(&self, item: &Item, cycle: usize) -> bool {
        self(item, cycle)
    }
}

/// How strictly demand patterns constrain item choice.
///
/// | Value    | Admits                                                   |
/// |----------|----------------------------------------------------------|
/// | Never    | every item                                               |
/// | Weak     | all but items whose weak peak is still ahead             |
/// | Strong   | all but items whose strong peak is still ahead           |
/// | Either   | all but items with any peak still ahead                  |
/// | Always   | as `Either`, and only items with a matched pattern       |
/// | Required | only items peaking in this very cycle                    |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum When {
    #[default]
    Never,
    Weak,
    Strong,
    Either,
    Always,
    Required,
}

impl When {
    pub const ALL: [When; 6] = [
        When::Never,
        When::Weak,
        When::Strong,
        When::Either,
        When::Always,
        When::Required,
    ];

    fn holds_back(&self, strength: PeakStrength) -> bool {
        match self {
            When::Never => false,
            When::Weak => strength == PeakStrength::Weak,
            When::Strong => strength == PeakStrength::Strong,
            When::Either | When::Always | When::Required => true,
        }
    }
}

impl CandidateFilter for When {
    fn admits(&self, item: &Item, cycle: usize) -> bool {
        match item.find_pattern(cycle) {
            PatternMatch::Known(p) if p.peak_cycle > cycle => {
                *self != When::Required && !self.holds_back(p.strength)
            }
            PatternMatch::Known(p) => *self != When::Required || p.peak_cycle == cycle,
            PatternMatch::Unknown | PatternMatch::Ambiguous => {
                !matches!(self, When::Always | When::Required)
            }
        }
    }
}

impl fmt::Display for When {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            When::Never => "Never",
            When::Weak => "Weak",
            When::Strong => "Strong",
            When::Either => "Either",
            When::Always => "Always",
            When::Required => "Required",
        };
        f.write_str(name)
    }
}

impl FromStr for When {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        When::ALL
            .into_iter()
            .find(|w| w.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown strictness '{s}'"))
    }
}

/// One [`When`] per cycle of a season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strictness {
    pub per_cycle: Vec<When>,
}

impl Strictness {
    /// Holds back every item whose peak is still ahead until late in the week.
    pub fn strict_defaults() -> Self {
        Strictness {
            per_cycle: vec![
                When::Either,
                When::Either,
                When::Either,
                When::Either,
                When::Strong,
                When::Never,
                When::Never,
            ],
        }
    }

    /// Only protects strong peaks, and only early in the week.
    pub fn relaxed_defaults() -> Self {
        Strictness {
            per_cycle: vec![
                When::Strong,
                When::Strong,
                When::Strong,
                When::Never,
                When::Never,
                When::Never,
                When::Never,
            ],
        }
    }

    pub fn uniform(when: When, cycles: usize) -> Self {
        Strictness {
            per_cycle: vec![when; cycles],
        }
    }

    /// The rule for `cycle`; cycles past the table are unconstrained.
    pub fn for_cycle(&self, cycle: usize) -> When {
        self.per_cycle.get(cycle).copied().unwrap_or_default()
    }
}

impl Default for Strictness {
    fn default() -> Self {
        Strictness::relaxed_defaults()
    }
}
