//! Per-call energy accumulator: element tallies, their derivation logs, and
//! the hidden-stem contributions behind them.

use serde::{Deserialize, Serialize};

use crate::branch::{Branch, QiLevel};
use crate::element::{ALL_ELEMENTS, Element};
use crate::stem::Stem;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    Add,
    Multiply,
}

/// One step of an element's derivation. For `Multiply`, `delta` is the factor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub delta: f64,
    pub reason: String,
    pub op: Op,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementTally {
    pub score: f64,
    pub log: Vec<LogEntry>,
}

/// One hidden-stem deposit. Only `coefficient` changes after stage 1.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub pillar_index: usize,
    pub branch: Branch,
    pub stem: Stem,
    pub qi_level: QiLevel,
    pub base_amount: f64,
    pub coefficient: f64,
}

impl Contribution {
    pub fn element(&self) -> Element {
        self.stem.element()
    }

    pub fn live(&self) -> f64 {
        self.base_amount * self.coefficient
    }
}

/// Fresh accumulator for one pipeline run.
#[derive(Debug, Default)]
pub struct Ledger {
    tallies: [ElementTally; 5],
    contributions: Vec<Contribution>,
    notes: Vec<String>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self, element: Element) -> f64 {
        self.tallies[element.index()].score
    }

    pub fn scores(&self) -> [f64; 5] {
        ALL_ELEMENTS.map(|e| self.score(e))
    }

    pub fn tally(&self, element: Element) -> &ElementTally {
        &self.tallies[element.index()]
    }

    pub fn add(&mut self, element: Element, delta: f64, reason: impl Into<String>) {
        let t = &mut self.tallies[element.index()];
        t.score += delta;
        t.log.push(LogEntry {
            delta,
            reason: reason.into(),
            op: Op::Add,
        });
    }

    pub fn multiply(&mut self, element: Element, factor: f64, reason: impl Into<String>) {
        let t = &mut self.tallies[element.index()];
        t.score *= factor;
        t.log.push(LogEntry {
            delta: factor,
            reason: reason.into(),
            op: Op::Multiply,
        });
    }

    /// Record a hidden-stem deposit and add its amount to the element.
    pub fn deposit(&mut self, contribution: Contribution, reason: impl Into<String>) {
        self.add(contribution.element(), contribution.live(), reason);
        self.contributions.push(contribution);
    }

    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }

    /// Scale one contribution's coefficient and move its element's score by
    /// the change in live value. Returns the (signed) change.
    pub fn rescale_contribution(&mut self, idx: usize, factor: f64, reason: &str) -> f64 {
        let c = &mut self.contributions[idx];
        let before = c.live();
        c.coefficient *= factor;
        let after = c.live();
        let element = c.element();
        let delta = after - before;
        self.add(element, delta, reason.to_string());
        delta
    }

    /// Scale one contribution's coefficient without touching any score.
    /// Returns the contribution's element.
    pub fn scale_coefficient(&mut self, idx: usize, factor: f64) -> Element {
        let c = &mut self.contributions[idx];
        c.coefficient *= factor;
        c.element()
    }

    /// Reset an element's score to `fixed` plus the live value of its
    /// contributions, logged as one entry. Returns the change.
    pub fn rederive(&mut self, element: Element, fixed: f64, reason: impl Into<String>) -> f64 {
        let live: f64 = self
            .contributions
            .iter()
            .filter(|c| c.element() == element)
            .map(Contribution::live)
            .sum();
        let delta = fixed + live - self.score(element);
        self.add(element, delta, reason);
        delta
    }

    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    /// Clamp negative scores to zero at a stage boundary.
    pub fn clamp_negative(&mut self, stage: &str) {
        for e in ALL_ELEMENTS {
            let score = self.score(e);
            if score < 0.0 {
                tracing::warn!(stage, element = %e, score, "negative element score clamped to 0");
                self.add(e, -score, format!("clamp negative score after {stage}"));
                self.note(format!("{stage}: {e} score {score:.4} clamped to 0"));
            }
        }
    }

    pub fn into_parts(self) -> ([ElementTally; 5], Vec<Contribution>, Vec<String>) {
        (self.tallies, self.contributions, self.notes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contribution(base: f64) -> Contribution {
        Contribution {
            pillar_index: 0,
            branch: Branch::Chen,
            stem: Stem::Wu,
            qi_level: QiLevel::Main,
            base_amount: base,
            coefficient: 1.0,
        }
    }

    #[test]
    fn test_add_and_multiply_are_logged() {
        let mut l = Ledger::new();
        l.add(Element::Fire, 10.0, "stem");
        l.multiply(Element::Fire, 1.5, "season");
        assert!((l.score(Element::Fire) - 15.0).abs() < 1e-12);
        let log = &l.tally(Element::Fire).log;
        assert_eq!(log.len(), 2);
        assert_eq!(log[1].op, Op::Multiply);
        assert_eq!(log[1].delta, 1.5);
    }

    #[test]
    fn test_rescale_tracks_live_value() {
        let mut l = Ledger::new();
        l.deposit(contribution(12.0), "deposit");
        let d1 = l.rescale_contribution(0, 0.5, "void");
        assert!((d1 + 6.0).abs() < 1e-12);
        let d2 = l.rescale_contribution(0, 1.4, "earth clash");
        assert!((d2 - 2.4).abs() < 1e-12);
        assert!((l.contributions()[0].coefficient - 0.7).abs() < 1e-12);
        assert!((l.score(Element::Earth) - 8.4).abs() < 1e-12);
    }

    #[test]
    fn test_rederive_discards_whole_element_factors() {
        let mut l = Ledger::new();
        l.add(Element::Earth, 10.0, "stem");
        l.deposit(contribution(12.0), "deposit");
        l.multiply(Element::Earth, 1.5, "season");
        assert!((l.score(Element::Earth) - 33.0).abs() < 1e-12);

        assert_eq!(l.scale_coefficient(0, 1.4), Element::Earth);
        assert!((l.score(Element::Earth) - 33.0).abs() < 1e-12);

        let delta = l.rederive(Element::Earth, 10.0, "earth clash");
        assert!((l.score(Element::Earth) - 26.8).abs() < 1e-12);
        assert!((delta + 6.2).abs() < 1e-12);
        assert_eq!(l.tally(Element::Earth).log.len(), 4);
    }

    #[test]
    fn test_clamp_negative_records_note() {
        let mut l = Ledger::new();
        l.add(Element::Water, -3.0, "over-transfer");
        l.clamp_negative("test stage");
        assert_eq!(l.score(Element::Water), 0.0);
        let (_, _, notes) = l.into_parts();
        assert_eq!(notes.len(), 1);
    }
}
