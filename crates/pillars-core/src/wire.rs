//! JSON wire format.
//!
//! Field names are camelCase. A pillar's hidden stems travel as
//! `hideHeavenStems: [{name, level, tenStar}]`; `tenStar` is output only and
//! ignored on input, and an omitted list falls back to the standard table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::branch::{Branch, HiddenStem, QiLevel};
use crate::element::Element;
use crate::error::{ChartError, Result};
use crate::pillar::{Chart, DAY, POSITIONS, Pillar, Position};
use crate::profile::{Profile, Relation};
use crate::season::Season;
use crate::stem::Stem;
use crate::strength::{Strength, TenGod};
use crate::summary::Level;
use crate::tally::LogEntry;

// --- Input ---

/// Either `{"pillars": [...]}` or a bare array of four pillars.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum WireChart {
    Object { pillars: Vec<WirePillar> },
    Bare(Vec<WirePillar>),
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WirePillar {
    pub stem: String,
    pub branch: String,
    #[serde(
        rename = "hideHeavenStems",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub hide_heaven_stems: Option<Vec<WireHiddenStem>>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WireHiddenStem {
    pub name: String,
    pub level: String,
    #[serde(rename = "tenStar", default, skip_serializing_if = "Option::is_none")]
    pub ten_star: Option<String>,
}

impl WireChart {
    pub fn into_chart(self) -> Result<Chart> {
        let pillars = match self {
            WireChart::Object { pillars } | WireChart::Bare(pillars) => pillars,
        };
        if pillars.len() != 4 {
            return Err(ChartError::invalid(format!(
                "expected 4 pillars, got {}",
                pillars.len()
            )));
        }

        let mut parsed = Vec::with_capacity(4);
        let mut hidden = Vec::with_capacity(4);
        for p in pillars {
            let stem: Stem = p.stem.parse()?;
            let branch: Branch = p.branch.parse()?;
            let list = match p.hide_heaven_stems {
                Some(list) => list
                    .iter()
                    .map(WireHiddenStem::to_domain)
                    .collect::<Result<Vec<_>>>()?,
                None => branch.hidden_stems().to_vec(),
            };
            parsed.push(Pillar::new(stem, branch));
            hidden.push(list);
        }

        let pillars: [Pillar; 4] = parsed
            .try_into()
            .map_err(|_| ChartError::invalid("expected 4 pillars"))?;
        let hidden: [Vec<HiddenStem>; 4] = hidden
            .try_into()
            .map_err(|_| ChartError::invalid("expected 4 hidden-stem lists"))?;
        Chart::new(pillars, hidden)
    }
}

impl WireHiddenStem {
    fn to_domain(&self) -> Result<HiddenStem> {
        Ok(HiddenStem {
            stem: self.name.parse()?,
            qi_level: parse_level(&self.level)?,
        })
    }

    fn from_domain(h: &HiddenStem, day_master: Stem) -> Self {
        Self {
            name: h.stem.hanzi().to_string(),
            level: level_name(h.qi_level).to_string(),
            ten_star: Some(TenGod::of(day_master, h.stem).hanzi().to_string()),
        }
    }
}

/// Accepts `main`/`middle`/`residual` or 本气/中气/余气.
fn parse_level(s: &str) -> Result<QiLevel> {
    match s.trim().to_lowercase().as_str() {
        "main" | "本气" => Ok(QiLevel::Main),
        "middle" | "中气" => Ok(QiLevel::Middle),
        "residual" | "余气" => Ok(QiLevel::Residual),
        other => Err(ChartError::invalid(format!("unknown qi level '{other}'"))),
    }
}

const fn level_name(level: QiLevel) -> &'static str {
    match level {
        QiLevel::Main => "main",
        QiLevel::Middle => "middle",
        QiLevel::Residual => "residual",
    }
}

// --- Output ---

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct WireProfile {
    pub chart: String,
    pub pillars: Vec<WirePillarOut>,
    pub elements: BTreeMap<Element, WireElement>,
    pub total_score: f64,
    pub balance_index: f64,
    pub season: Season,
    pub void_branches: Vec<String>,
    pub notes: Vec<String>,
    pub stem_relations: Vec<Relation>,
    pub branch_relations: Vec<Relation>,
    pub day_master: WireDayMaster,
    pub diagnosis: Vec<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct WirePillarOut {
    pub position: Position,
    pub stem: String,
    pub branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ten_star: Option<String>,
    pub hide_heaven_stems: Vec<WireHiddenStem>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct WireElement {
    pub score: f64,
    pub percentage: f64,
    pub level: Level,
    pub derivation_log: Vec<LogEntry>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct WireDayMaster {
    pub stem: String,
    pub element: Element,
    pub strength: Strength,
    pub support: f64,
    pub share: f64,
    pub useful: Vec<Element>,
    pub avoid: Vec<Element>,
}

impl WireProfile {
    pub fn new(chart: &Chart, profile: &Profile) -> Self {
        let dm = chart.day_master();
        let pillars = chart
            .pillars()
            .iter()
            .zip(chart.hidden_stems())
            .enumerate()
            .map(|(i, (p, hidden))| WirePillarOut {
                position: POSITIONS[i],
                stem: p.stem.hanzi().to_string(),
                branch: p.branch.hanzi().to_string(),
                ten_star: (i != DAY).then(|| TenGod::of(dm, p.stem).hanzi().to_string()),
                hide_heaven_stems: hidden
                    .iter()
                    .map(|h| WireHiddenStem::from_domain(h, dm))
                    .collect(),
            })
            .collect();

        let energy = &profile.energy;
        let elements = energy
            .per_element
            .iter()
            .map(|(e, s)| {
                let wire = WireElement {
                    score: s.score,
                    percentage: s.percentage,
                    level: s.level,
                    derivation_log: s.log.clone(),
                };
                (*e, wire)
            })
            .collect();

        let d = &profile.day_master;
        Self {
            chart: profile.chart.clone(),
            pillars,
            elements,
            total_score: energy.total_score,
            balance_index: energy.balance_index,
            season: energy.season,
            void_branches: energy.void_branches.iter().map(|b| b.hanzi().to_string()).collect(),
            notes: energy.notes.clone(),
            stem_relations: profile.stem_relations.clone(),
            branch_relations: profile.branch_relations.clone(),
            day_master: WireDayMaster {
                stem: d.stem.hanzi().to_string(),
                element: d.element,
                strength: d.strength,
                support: d.support,
                share: d.share,
                useful: d.useful.clone(),
                avoid: d.avoid.clone(),
            },
            diagnosis: profile.diagnosis.clone(),
        }
    }
}

// --- Public API ---

pub fn import_chart(json: &str) -> Result<Chart> {
    let wire: WireChart = serde_json::from_str(json)
        .map_err(|e| ChartError::invalid(format!("malformed chart JSON: {e}")))?;
    wire.into_chart()
}

pub fn export_profile(chart: &Chart, profile: &Profile) -> std::result::Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&WireProfile::new(chart, profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::analyze;

    const CANONICAL: &str = r#"{"pillars": [
        {"stem": "甲", "branch": "子"},
        {"stem": "丙", "branch": "寅"},
        {"stem": "戊", "branch": "辰"},
        {"stem": "庚", "branch": "午"}
    ]}"#;

    #[test]
    fn test_omitted_hidden_stems_use_table() {
        let chart = import_chart(CANONICAL).unwrap();
        assert_eq!(chart, Chart::parse("甲子 丙寅 戊辰 庚午").unwrap());
    }

    #[test]
    fn test_bare_array_and_pinyin() {
        let json = r#"[
            {"stem": "jia", "branch": "zi"},
            {"stem": "bing", "branch": "yin"},
            {"stem": "wu", "branch": "chen"},
            {"stem": "geng", "branch": "wu"}
        ]"#;
        assert_eq!(import_chart(json).unwrap(), import_chart(CANONICAL).unwrap());
    }

    #[test]
    fn test_explicit_hidden_stems_and_ignored_ten_star() {
        let json = r#"[
            {"stem": "甲", "branch": "子", "hideHeavenStems": [{"name": "癸", "level": "main", "tenStar": "正印"}]},
            {"stem": "丙", "branch": "寅", "hideHeavenStems": [{"name": "甲", "level": "本气"}]},
            {"stem": "戊", "branch": "辰"},
            {"stem": "庚", "branch": "午"}
        ]"#;
        let chart = import_chart(json).unwrap();
        assert_eq!(chart.hidden_stems()[1].len(), 1);
        assert_eq!(chart.hidden_stems()[2].len(), 3);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(import_chart("{").is_err());
        assert!(import_chart(r#"[{"stem": "甲", "branch": "子"}]"#).is_err());
        let bad_level = CANONICAL.replace(
            r#"{"stem": "甲", "branch": "子"}"#,
            r#"{"stem": "甲", "branch": "子", "hideHeavenStems": [{"name": "癸", "level": "top"}]}"#,
        );
        assert!(matches!(import_chart(&bad_level), Err(ChartError::InvalidInput(_))));
    }

    #[test]
    fn test_export_is_camel_case() {
        let chart = import_chart(CANONICAL).unwrap();
        let json = export_profile(&chart, &analyze(&chart)).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(v["totalScore"].is_number());
        assert!(v["balanceIndex"].is_number());
        assert_eq!(v["pillars"][2]["stem"], "戊");
        assert!(v["pillars"][2].get("tenStar").is_none());
        assert_eq!(v["pillars"][0]["tenStar"], "七杀");
        assert_eq!(v["pillars"][0]["hideHeavenStems"][0]["tenStar"], "正财");
        assert!(v["elements"]["wood"]["derivationLog"].is_array());
    }
}
