//! Final aggregation: percentages, per-element levels and the balance index.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{
    EPSILON, LEVEL_STRONG, LEVEL_VERY_STRONG, LEVEL_VERY_WEAK, LEVEL_WEAK,
};
use crate::element::{ALL_ELEMENTS, Element};
use crate::tally::{ElementTally, LogEntry};

/// Strength of one element relative to the mean of all five.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    VeryWeak,
    Weak,
    Balanced,
    Strong,
    VeryStrong,
}

impl Level {
    /// Classify `score` against `mean`. A zero mean is balanced.
    pub fn classify(score: f64, mean: f64) -> Self {
        if mean <= EPSILON {
            return Level::Balanced;
        }
        let ratio = score / mean;
        if ratio >= LEVEL_VERY_STRONG {
            Level::VeryStrong
        } else if ratio >= LEVEL_STRONG {
            Level::Strong
        } else if ratio <= LEVEL_VERY_WEAK {
            Level::VeryWeak
        } else if ratio <= LEVEL_WEAK {
            Level::Weak
        } else {
            Level::Balanced
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Level::VeryWeak => "very weak",
            Level::Weak => "weak",
            Level::Balanced => "balanced",
            Level::Strong => "strong",
            Level::VeryStrong => "very strong",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementSummary {
    pub score: f64,
    pub percentage: f64,
    pub level: Level,
    pub log: Vec<LogEntry>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub per_element: BTreeMap<Element, ElementSummary>,
    pub total_score: f64,
    pub balance_index: f64,
}

pub fn aggregate(tallies: &[ElementTally; 5]) -> Summary {
    let total: f64 = tallies.iter().map(|t| t.score).sum();
    let mean = total / 5.0;

    let per_element = ALL_ELEMENTS
        .iter()
        .map(|&e| {
            let t = &tallies[e.index()];
            let percentage = if total > EPSILON { t.score / total * 100.0 } else { 0.0 };
            let summary = ElementSummary {
                score: t.score,
                percentage,
                level: Level::classify(t.score, mean),
                log: t.log.clone(),
            };
            (e, summary)
        })
        .collect();

    Summary {
        per_element,
        total_score: total,
        balance_index: balance_index(tallies.each_ref().map(|t| t.score)),
    }
}

/// `100 − (population stddev / mean) × 50`, clamped to `[0, 100]`.
/// Zero when every score is zero.
pub fn balance_index(scores: [f64; 5]) -> f64 {
    let mean = scores.iter().sum::<f64>() / 5.0;
    if mean <= EPSILON {
        return 0.0;
    }
    let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / 5.0;
    (100.0 - variance.sqrt() / mean * 50.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tallies(scores: [f64; 5]) -> [ElementTally; 5] {
        scores.map(|score| ElementTally {
            score,
            log: Vec::new(),
        })
    }

    #[test]
    fn test_level_thresholds() {
        assert_eq!(Level::classify(16.0, 10.0), Level::VeryStrong);
        assert_eq!(Level::classify(12.5, 10.0), Level::Strong);
        assert_eq!(Level::classify(10.0, 10.0), Level::Balanced);
        assert_eq!(Level::classify(8.0, 10.0), Level::Weak);
        assert_eq!(Level::classify(5.5, 10.0), Level::VeryWeak);
        assert_eq!(Level::classify(0.0, 0.0), Level::Balanced);
    }

    #[test]
    fn test_percentages_close_to_100() {
        let s = aggregate(&tallies([10.0, 20.0, 30.0, 25.0, 15.0]));
        let sum: f64 = s.per_element.values().map(|e| e.percentage).sum();
        assert_relative_eq!(sum, 100.0, epsilon = 1e-9);
        assert_relative_eq!(s.total_score, 100.0);
        assert_relative_eq!(s.per_element[&Element::Earth].percentage, 30.0);
    }

    #[test]
    fn test_even_scores_are_fully_balanced() {
        assert_relative_eq!(balance_index([7.0; 5]), 100.0);
    }

    #[test]
    fn test_balance_index_clamps_at_zero() {
        // stddev / mean = 2.0 → 100 − 100
        assert_relative_eq!(balance_index([50.0, 0.0, 0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_zero_total_summary() {
        let s = aggregate(&tallies([0.0; 5]));
        assert_eq!(s.total_score, 0.0);
        assert_eq!(s.balance_index, 0.0);
        for e in s.per_element.values() {
            assert_eq!(e.percentage, 0.0);
            assert_eq!(e.level, Level::Balanced);
        }
    }
}
