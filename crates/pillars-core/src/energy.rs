//! Five-element energy scoring pipeline.
//!
//! Ten stages run in a fixed order over a fresh [`Ledger`]:
//!
//! 1. deposit stem and hidden-stem energy
//! 2. halve void branches
//! 3. seasonal weighting from the month branch
//! 4. three-branch groups and half harmonies
//! 5. stem pairing by transformation success ratio
//! 6. residual stem pairing by seasonal support
//! 7. rooting of unconsumed stems
//! 8. branch clashes
//! 9. minor branch relations
//! 10. aggregation (see [`crate::summary`])
//!
//! Every stage ends by clamping negative scores to zero.

use serde::Serialize;

use crate::branch::{Branch, HiddenStem, QiLevel};
use crate::constants::*;
use crate::element::{ALL_ELEMENTS, Element};
use crate::error::Result;
use crate::matcher::{RelationMatch, match_branches, match_stems};
use crate::pillar::{Chart, DAY, MONTH, POSITIONS, Pillar, void_branches};
use crate::rules::{RelationKind, is_earth_clash};
use crate::season::Season;
use crate::summary::{ElementSummary, aggregate};
use crate::tally::{Contribution, Ledger};

use std::collections::BTreeMap;

/// What a stage did with a matched relation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Three-branch group moved its participants' energy into the target.
    Grouped,
    /// Half harmony holding its center branch added the flat bonus.
    HalfHarmony,
    /// Half harmony without its center branch; no effect.
    MissingCenter,
    FullMerge,
    PartialMerge,
    /// Stem pair failed the ratio test; both sources damped.
    Entangled,
    /// Residual pass merged with seasonal support.
    SeasonalMerge,
    /// Residual pass without seasonal support; both sources damped.
    Damped,
    EarthClash,
    Clash,
    /// Minor relation nudge (stage 9).
    Nudge,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StageEvent {
    pub stage: u8,
    pub kind: RelationKind,
    pub participants: Vec<usize>,
    pub outcome: Outcome,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Element>,
}

/// Output of the scoring pipeline.
#[derive(Clone, Debug, Serialize)]
pub struct EnergyResult {
    pub per_element: BTreeMap<Element, ElementSummary>,
    pub total_score: f64,
    pub balance_index: f64,
    pub season: Season,
    pub void_branches: Vec<Branch>,
    /// Pillar indices whose branches were consumed by stage 4.
    pub combined_branches: Vec<usize>,
    /// Pillar indices whose stems were consumed by stages 5 and 6.
    pub combined_stems: Vec<usize>,
    pub contributions: Vec<Contribution>,
    pub events: Vec<StageEvent>,
    /// Diagnostic notes, e.g. negative scores clamped at a stage boundary.
    pub notes: Vec<String>,
}

impl EnergyResult {
    pub fn score(&self, element: Element) -> f64 {
        self.per_element.get(&element).map_or(0.0, |s| s.score)
    }

    pub fn scores(&self) -> [f64; 5] {
        ALL_ELEMENTS.map(|e| self.score(e))
    }
}

/// Score four pillars with explicit hidden stems.
pub fn score(pillars: [Pillar; 4], hidden: [Vec<HiddenStem>; 4]) -> Result<EnergyResult> {
    let chart = Chart::new(pillars, hidden)?;
    Ok(score_chart(&chart))
}

/// Score an already validated chart.
pub fn score_chart(chart: &Chart) -> EnergyResult {
    let branch_matches = match_branches(chart.branches());
    let stem_matches = match_stems(chart.stems());
    Pipeline::new(chart).run(&branch_matches, &stem_matches)
}

const STAGES: [&str; 9] = [
    "deposit",
    "void",
    "season",
    "branch combination",
    "stem pairing",
    "residual stem pairing",
    "rooting",
    "clash",
    "minor relations",
];

struct Pipeline<'a> {
    chart: &'a Chart,
    ledger: Ledger,
    season: Season,
    voids: Vec<Branch>,
    void_pillar: [bool; 4],
    void_main_removed: [f64; 4],
    branch_consumed: [bool; 4],
    stem_consumed: [bool; 4],
    resolved_clashes: Vec<Vec<usize>>,
    events: Vec<StageEvent>,
}

impl<'a> Pipeline<'a> {
    fn new(chart: &'a Chart) -> Self {
        Self {
            chart,
            ledger: Ledger::new(),
            season: Season::of_month(chart.month_branch()),
            voids: Vec::new(),
            void_pillar: [false; 4],
            void_main_removed: [0.0; 4],
            branch_consumed: [false; 4],
            stem_consumed: [false; 4],
            resolved_clashes: Vec::new(),
            events: Vec::new(),
        }
    }

    fn run(mut self, branch_matches: &[RelationMatch], stem_matches: &[RelationMatch]) -> EnergyResult {
        for stage in 1..=STAGES.len() as u8 {
            self.run_stage(stage, branch_matches, stem_matches);
        }
        self.finish()
    }

    fn run_stage(&mut self, stage: u8, branch_matches: &[RelationMatch], stem_matches: &[RelationMatch]) {
        match stage {
            1 => self.deposit(),
            2 => self.apply_void(),
            3 => self.apply_season(),
            4 => self.combine_branches(branch_matches),
            5 => self.pair_stems(stem_matches),
            6 => self.pair_stems_residual(stem_matches),
            7 => self.apply_rooting(),
            8 => self.apply_clashes(branch_matches),
            9 => self.apply_minor_relations(branch_matches),
            _ => return,
        }
        self.end_stage(STAGES[usize::from(stage) - 1]);
    }

    fn end_stage(&mut self, stage: &str) {
        self.ledger.clamp_negative(stage);
        tracing::debug!(stage, scores = ?self.ledger.scores(), "stage complete");
    }

    fn event(&mut self, stage: u8, m: &RelationMatch, outcome: Outcome) {
        self.events.push(StageEvent {
            stage,
            kind: m.kind(),
            participants: m.participants.clone(),
            outcome,
            description: m.rule.description,
            target: m.rule.result,
        });
    }

    fn any_branch_consumed(&self, m: &RelationMatch) -> bool {
        m.participants.iter().any(|&i| self.branch_consumed[i])
    }

    fn any_stem_consumed(&self, m: &RelationMatch) -> bool {
        m.participants.iter().any(|&i| self.stem_consumed[i])
    }

    // -- stage 1 --

    fn deposit(&mut self) {
        let pillars = *self.chart.pillars();
        for (i, pillar) in pillars.iter().enumerate() {
            let pos = POSITIONS[i].name();
            self.ledger.add(
                pillar.stem.element(),
                STEM_UNITS,
                format!("{pos} stem {}", pillar.stem),
            );

            let units = if i == MONTH { MONTH_BRANCH_UNITS } else { BRANCH_UNITS };
            for h in &self.chart.hidden_stems()[i] {
                let Some(ratio) = pillar.branch.qi_ratio(h.qi_level) else {
                    tracing::debug!(branch = %pillar.branch, level = ?h.qi_level, "no ratio for qi level");
                    continue;
                };
                let contribution = Contribution {
                    pillar_index: i,
                    branch: pillar.branch,
                    stem: h.stem,
                    qi_level: h.qi_level,
                    base_amount: units * ratio,
                    coefficient: 1.0,
                };
                self.ledger.deposit(
                    contribution,
                    format!("{pos} branch {} hidden {} ({:?})", pillar.branch, h.stem, h.qi_level),
                );
            }
        }
    }

    // -- stage 2 --

    fn apply_void(&mut self) {
        let day = self.chart.pillars()[DAY];
        let Some(voids) = void_branches(day) else {
            tracing::debug!(day = %day, "no void entry for day pillar");
            return;
        };
        self.voids = voids.to_vec();

        let branches = self.chart.branches();
        for (i, branch) in branches.iter().enumerate() {
            if !voids.contains(branch) {
                continue;
            }
            self.void_pillar[i] = true;
            let reason = format!("{} branch {branch} is void", POSITIONS[i].name());
            let owned: Vec<usize> = self
                .ledger
                .contributions()
                .iter()
                .enumerate()
                .filter(|(_, c)| c.pillar_index == i)
                .map(|(idx, _)| idx)
                .collect();
            for idx in owned {
                let is_main = self.ledger.contributions()[idx].qi_level == QiLevel::Main;
                let delta = self.ledger.rescale_contribution(idx, VOID_FACTOR, &reason);
                if is_main {
                    self.void_main_removed[i] += -delta;
                }
            }
        }
    }

    // -- stage 3 --

    fn apply_season(&mut self) {
        let month = self.chart.month_branch();
        for e in ALL_ELEMENTS {
            let phase = self.season.phase(e);
            self.ledger.multiply(
                e,
                phase.multiplier(),
                format!("season: {phase:?} in {month} month"),
            );
        }
    }

    // -- stage 4 --

    fn combine_branches(&mut self, matches: &[RelationMatch]) {
        for kind in [RelationKind::Directional, RelationKind::TripleHarmony] {
            for m in matches.iter().filter(|m| m.kind() == kind) {
                if self.any_branch_consumed(m) {
                    continue;
                }
                self.apply_group(m);
            }
        }

        for m in matches.iter().filter(|m| m.kind() == RelationKind::HalfHarmony) {
            if self.any_branch_consumed(m) {
                continue;
            }
            let (Some(target), Some(center)) = (m.rule.result, m.rule.center) else {
                continue;
            };
            let branches = self.chart.branches();
            if !m.participants.iter().any(|&i| branches[i] == center) {
                self.event(4, m, Outcome::MissingCenter);
                continue;
            }
            self.ledger.add(target, HALF_HARMONY_BONUS, m.rule.description);
            for &i in &m.participants {
                self.branch_consumed[i] = true;
            }
            self.event(4, m, Outcome::HalfHarmony);
        }
    }

    fn apply_group(&mut self, m: &RelationMatch) {
        let Some(target) = m.rule.result else {
            return;
        };
        let branches = self.chart.branches();

        let mut moved = 0.0;
        for &i in &m.participants {
            let e = branches[i].element();
            let take = self.ledger.score(e).clamp(0.0, GROUP_TRANSFER_CAP);
            self.ledger.add(
                e,
                -take,
                format!("{} feeds {}", branches[i], m.rule.description),
            );
            moved += take;
        }
        self.ledger.add(target, moved, m.rule.description);

        for &i in &m.participants {
            let removed = self.void_main_removed[i];
            if removed > 0.0 {
                let main = self.main_element(i).unwrap_or(branches[i].element());
                self.ledger.add(
                    main,
                    removed * VOID_RESTORE_RATIO,
                    format!("void {} partly restored by {}", branches[i], m.rule.description),
                );
            }
            self.branch_consumed[i] = true;
        }
        self.event(4, m, Outcome::Grouped);
    }

    fn main_element(&self, pillar: usize) -> Option<Element> {
        self.chart.hidden_stems()[pillar]
            .iter()
            .find(|h| h.qi_level == QiLevel::Main)
            .map(|h| h.stem.element())
    }

    // -- stage 5 --

    fn pair_stems(&mut self, matches: &[RelationMatch]) {
        let stems = self.chart.stems();
        for m in matches.iter().filter(|m| m.kind() == RelationKind::StemCombination) {
            if self.any_stem_consumed(m) {
                continue;
            }
            let Some(target) = m.rule.result else {
                continue;
            };
            let (a, b) = (stems[m.participants[0]].element(), stems[m.participants[1]].element());
            let ratio = self.ledger.score(target)
                / (self.ledger.score(a) + self.ledger.score(b) + self.ledger.score(target) + RATIO_EPSILON);
            tracing::debug!(rule = m.rule.description, ratio, "stem pairing ratio");

            if ratio >= MERGE_FULL_RATIO {
                for src in [a, b] {
                    let take = self.ledger.score(src).clamp(0.0, MERGE_SOURCE_CAP);
                    self.ledger.add(src, -take, format!("{} full merge", m.rule.description));
                }
                self.ledger.add(target, MERGE_FULL_GAIN, format!("{} full merge", m.rule.description));
                self.consume_stems(m);
                self.event(5, m, Outcome::FullMerge);
            } else if ratio >= MERGE_PARTIAL_RATIO {
                let amount = (ratio - MERGE_PARTIAL_RATIO) / (MERGE_FULL_RATIO - MERGE_PARTIAL_RATIO)
                    * MERGE_PARTIAL_MAX;
                let mut moved = 0.0;
                for src in [a, b] {
                    let take = self.ledger.score(src).clamp(0.0, amount / 2.0);
                    self.ledger.add(
                        src,
                        -take,
                        format!("{} partial merge (ratio {ratio:.3})", m.rule.description),
                    );
                    moved += take;
                }
                self.ledger.add(
                    target,
                    moved,
                    format!("{} partial merge (ratio {ratio:.3})", m.rule.description),
                );
                self.consume_stems(m);
                self.event(5, m, Outcome::PartialMerge);
            } else {
                for src in [a, b] {
                    self.ledger.multiply(
                        src,
                        ENTANGLE_FACTOR,
                        format!("{} entangled (ratio {ratio:.3})", m.rule.description),
                    );
                }
                self.event(5, m, Outcome::Entangled);
            }
        }
    }

    // -- stage 6 --

    // Re-tests every pair stage 5 left unconsumed, with a seasonal criterion
    // instead of the ratio. Entangled pairs are damped again here.
    fn pair_stems_residual(&mut self, matches: &[RelationMatch]) {
        let stems = self.chart.stems();
        for m in matches.iter().filter(|m| m.kind() == RelationKind::StemCombination) {
            if self.any_stem_consumed(m) {
                continue;
            }
            let Some(target) = m.rule.result else {
                continue;
            };
            let (a, b) = (stems[m.participants[0]].element(), stems[m.participants[1]].element());

            if self.season.multiplier(target) >= SEASON_WANG {
                for src in [a, b] {
                    let take = self.ledger.score(src).clamp(0.0, MERGE_SOURCE_CAP);
                    self.ledger.add(src, -take, format!("{} merges in season", m.rule.description));
                }
                self.ledger.add(
                    target,
                    RESIDUAL_MERGE_GAIN,
                    format!("{} merges in season", m.rule.description),
                );
                self.consume_stems(m);
                self.event(6, m, Outcome::SeasonalMerge);
            } else {
                for src in [a, b] {
                    self.ledger.multiply(
                        src,
                        RESIDUAL_DAMPING,
                        format!("{} lacks seasonal support", m.rule.description),
                    );
                }
                self.event(6, m, Outcome::Damped);
            }
        }
    }

    fn consume_stems(&mut self, m: &RelationMatch) {
        for &i in &m.participants {
            self.stem_consumed[i] = true;
        }
    }

    // -- stage 7 --

    fn apply_rooting(&mut self) {
        let pillars = *self.chart.pillars();
        for (i, pillar) in pillars.iter().enumerate() {
            if self.stem_consumed[i] {
                continue;
            }
            let e = pillar.stem.element();
            let best = self
                .chart
                .hidden_stems()
                .iter()
                .enumerate()
                .filter(|(j, _)| !self.void_pillar[*j])
                .flat_map(|(_, hidden)| hidden.iter())
                .filter(|h| h.stem.element() == e)
                .map(|h| h.qi_level)
                .min();

            let (factor, label) = match best {
                Some(QiLevel::Main) => (ROOT_STRONG, "strong root"),
                Some(QiLevel::Middle) => (ROOT_MEDIUM, "medium root"),
                Some(QiLevel::Residual) => (ROOT_WEAK, "weak root"),
                None => (ROOT_NONE, "no root"),
            };
            self.ledger.multiply(
                e,
                factor,
                format!("{} stem {}: {label}", POSITIONS[i].name(), pillar.stem),
            );
        }
    }

    // -- stage 8 --

    fn apply_clashes(&mut self, matches: &[RelationMatch]) {
        let branches = self.chart.branches();
        for m in matches.iter().filter(|m| m.kind() == RelationKind::Clash) {
            if self.any_branch_consumed(m) {
                continue;
            }
            let (i, j) = (m.participants[0], m.participants[1]);

            if is_earth_clash(branches[i], branches[j]) {
                self.apply_earth_clash(m);
                self.event(8, m, Outcome::EarthClash);
            } else {
                let (ea, eb) = (branches[i].element(), branches[j].element());
                let (sa, sb) = (self.ledger.score(ea), self.ledger.score(eb));
                let reason = m.rule.description;
                if (sa - sb).abs() < CLASH_EVEN_MARGIN {
                    self.ledger.multiply(ea, CLASH_EVEN_FACTOR, format!("{reason}: even"));
                    self.ledger.multiply(eb, CLASH_EVEN_FACTOR, format!("{reason}: even"));
                } else {
                    let (winner, loser) = if sa > sb { (ea, eb) } else { (eb, ea) };
                    self.ledger.multiply(winner, CLASH_WINNER_FACTOR, format!("{reason}: prevails"));
                    self.ledger.multiply(loser, CLASH_LOSER_FACTOR, format!("{reason}: overcome"));
                }
                self.event(8, m, Outcome::Clash);
            }
            self.resolved_clashes.push(m.participants.clone());
        }
    }

    /// Rewrites the coefficients of both branches' contributions, then resets
    /// every touched element to its stem deposits plus its live contributions.
    fn apply_earth_clash(&mut self, m: &RelationMatch) {
        let reason = format!("{}: earth stirred", m.rule.description);
        let owned: Vec<usize> = self
            .ledger
            .contributions()
            .iter()
            .enumerate()
            .filter(|(_, c)| m.involves(c.pillar_index))
            .map(|(idx, _)| idx)
            .collect();
        let mut touched = [false; 5];
        for idx in owned {
            let c = &self.ledger.contributions()[idx];
            let factor = match c.qi_level {
                QiLevel::Main if c.element() == Element::Earth => EARTH_CLASH_MAIN,
                QiLevel::Main => continue,
                QiLevel::Middle | QiLevel::Residual => EARTH_CLASH_OTHER,
            };
            let e = self.ledger.scale_coefficient(idx, factor);
            touched[e.index()] = true;
        }

        let stems = self.chart.stems();
        for e in ALL_ELEMENTS.into_iter().filter(|e| touched[e.index()]) {
            let deposits = stems.iter().filter(|s| s.element() == e).count() as f64 * STEM_UNITS;
            self.ledger.rederive(e, deposits, reason.as_str());
        }
    }

    // -- stage 9 --

    fn apply_minor_relations(&mut self, matches: &[RelationMatch]) {
        let branches = self.chart.branches();
        for m in matches {
            let percent = match m.kind() {
                RelationKind::SixCombination => MINOR_COMBINE,
                // Unreached: stage 8 resolves every clash it does not skip.
                RelationKind::Clash => MINOR_CLASH,
                RelationKind::Harm => MINOR_HARM,
                k if k.is_punishment() => MINOR_PUNISHMENT,
                RelationKind::Break => MINOR_BREAK,
                _ => continue,
            };
            if self.any_branch_consumed(m) {
                continue;
            }
            if m.kind() == RelationKind::Clash && self.resolved_clashes.contains(&m.participants) {
                continue;
            }

            // Once per participant: a same-element pair nudges twice.
            for &i in &m.participants {
                let e = branches[i].element();
                let delta = self.ledger.score(e) * percent;
                self.ledger.add(e, delta, format!("{} ({:+.0}%)", m.rule.description, percent * 100.0));
            }
            self.event(9, m, Outcome::Nudge);
        }
    }

    // -- stage 10 --

    fn finish(self) -> EnergyResult {
        let combined_branches = (0..4).filter(|&i| self.branch_consumed[i]).collect();
        let combined_stems = (0..4).filter(|&i| self.stem_consumed[i]).collect();
        let (tallies, contributions, notes) = self.ledger.into_parts();
        let summary = aggregate(&tallies);

        EnergyResult {
            per_element: summary.per_element,
            total_score: summary.total_score,
            balance_index: summary.balance_index,
            season: self.season,
            void_branches: self.voids,
            combined_branches,
            combined_stems,
            contributions,
            events: self.events,
            notes,
        }
    }
}
