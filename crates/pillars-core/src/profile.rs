//! One-call chart analysis: energy, relations, day-master strength and a
//! short textual diagnosis.

use serde::Serialize;

use crate::element::{ALL_ELEMENTS, Element};
use crate::energy::{EnergyResult, Outcome, StageEvent, score_chart};
use crate::matcher::{RelationMatch, match_branches, match_stems};
use crate::pillar::{Chart, DAY, POSITIONS, Position};
use crate::rules::RelationKind;
use crate::strength::{DayMaster, TenGod, assess};
use crate::summary::Level;

/// A matched relation as reported to callers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Relation {
    pub participants: Vec<usize>,
    pub kind: RelationKind,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Element>,
}

impl From<&RelationMatch> for Relation {
    fn from(m: &RelationMatch) -> Self {
        Self {
            participants: m.participants.clone(),
            kind: m.kind(),
            description: m.rule.description,
            result: m.rule.result,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PillarGods {
    pub position: Position,
    /// `None` for the day stem itself.
    pub stem: Option<TenGod>,
    pub hidden: Vec<TenGod>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Profile {
    pub chart: String,
    pub energy: EnergyResult,
    pub stem_relations: Vec<Relation>,
    pub branch_relations: Vec<Relation>,
    pub day_master: DayMaster,
    pub ten_gods: Vec<PillarGods>,
    pub diagnosis: Vec<String>,
}

/// Stem and branch relations of a chart, in rule-table order.
pub fn relations(chart: &Chart) -> (Vec<Relation>, Vec<Relation>) {
    let stems = match_stems(chart.stems()).iter().map(Relation::from).collect();
    let branches = match_branches(chart.branches()).iter().map(Relation::from).collect();
    (stems, branches)
}

pub fn ten_gods(chart: &Chart) -> Vec<PillarGods> {
    let dm = chart.day_master();
    chart
        .pillars()
        .iter()
        .zip(chart.hidden_stems())
        .enumerate()
        .map(|(i, (pillar, hidden))| PillarGods {
            position: POSITIONS[i],
            stem: (i != DAY).then(|| TenGod::of(dm, pillar.stem)),
            hidden: hidden.iter().map(|h| TenGod::of(dm, h.stem)).collect(),
        })
        .collect()
}

pub fn analyze(chart: &Chart) -> Profile {
    let energy = score_chart(chart);
    let (stem_relations, branch_relations) = relations(chart);
    let day_master = assess(chart.day_master(), energy.scores());
    let diagnosis = diagnose(&energy, &day_master);
    tracing::debug!(chart = %chart, strength = ?day_master.strength, "chart analyzed");

    Profile {
        chart: chart.to_string(),
        energy,
        stem_relations,
        branch_relations,
        day_master,
        ten_gods: ten_gods(chart),
        diagnosis,
    }
}

fn join(elements: &[Element]) -> String {
    elements.iter().map(|e| e.name()).collect::<Vec<_>>().join(", ")
}

fn diagnose(energy: &EnergyResult, dm: &DayMaster) -> Vec<String> {
    let mut lines = Vec::new();

    let mut headline = format!(
        "Day master {} ({}) is {}",
        dm.stem,
        dm.element,
        dm.strength.label()
    );
    let dominant: Vec<Element> = ALL_ELEMENTS
        .into_iter()
        .filter(|e| energy.per_element[e].level >= Level::Strong)
        .collect();
    if !dominant.is_empty() {
        headline.push_str(&format!("; dominant {}", join(&dominant)));
    }
    let missing: Vec<Element> = ALL_ELEMENTS
        .into_iter()
        .filter(|e| energy.per_element[e].score <= 0.0)
        .collect();
    if !missing.is_empty() {
        headline.push_str(&format!("; missing {}", join(&missing)));
    }
    let weak: Vec<Element> = ALL_ELEMENTS
        .into_iter()
        .filter(|e| !missing.contains(e) && energy.per_element[e].level <= Level::Weak)
        .collect();
    if !weak.is_empty() {
        headline.push_str(&format!("; weak {}", join(&weak)));
    }
    headline.push_str(&format!(
        "; useful {}; avoid {}.",
        join(&dm.useful),
        join(&dm.avoid)
    ));
    lines.push(headline);

    lines.extend(energy.events.iter().filter_map(describe_event));
    lines
}

fn describe_event(ev: &StageEvent) -> Option<String> {
    let target = ev.target.map(|e| e.name()).unwrap_or_default();
    let line = match ev.outcome {
        Outcome::Grouped => format!("{} transforms into {target}.", ev.description),
        Outcome::HalfHarmony => format!("{} leans toward {target}.", ev.description),
        Outcome::FullMerge => format!("{} fully transforms into {target}.", ev.description),
        Outcome::PartialMerge => format!("{} partly transforms into {target}.", ev.description),
        Outcome::SeasonalMerge => {
            format!("{} transforms into {target} with seasonal support.", ev.description)
        }
        Outcome::EarthClash => format!("{} stirs the stored earth.", ev.description),
        Outcome::Clash => format!("{} weakens both sides.", ev.description),
        Outcome::MissingCenter
        | Outcome::Entangled
        | Outcome::Damped
        | Outcome::Nudge => return None,
    };
    Some(line)
}
