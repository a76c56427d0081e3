//! Pillars, the validated four-pillar chart, and the void (xun-kong) lookup.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::branch::{Branch, HiddenStem};
use crate::error::{ChartError, Result};
use crate::stem::{ALL_STEMS, Stem};

/// Pillar position in chart order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Year,
    Month,
    Day,
    Hour,
}

pub const POSITIONS: [Position; 4] = [Position::Year, Position::Month, Position::Day, Position::Hour];

pub const MONTH: usize = 1;
pub const DAY: usize = 2;

impl Position {
    pub const fn name(self) -> &'static str {
        match self {
            Position::Year => "year",
            Position::Month => "month",
            Position::Day => "day",
            Position::Hour => "hour",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pillar {
    pub stem: Stem,
    pub branch: Branch,
}

impl Pillar {
    pub const fn new(stem: Stem, branch: Branch) -> Self {
        Self { stem, branch }
    }
}

impl fmt::Display for Pillar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.stem, self.branch)
    }
}

impl FromStr for Pillar {
    type Err = ChartError;

    /// Parses `甲子`, `jia-zi`, `jia zi` or `jiazi`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some((stem, branch)) = s.split_once(['-', ' ', '_']) {
            return Ok(Self::new(stem.parse()?, branch.parse()?));
        }

        let mut chars = s.chars();
        if let (Some(a), Some(b), None) = (chars.next(), chars.next(), chars.next()) {
            return Ok(Self::new(
                a.to_string().parse()?,
                b.to_string().parse()?,
            ));
        }

        let lower = s.to_lowercase();
        for stem in ALL_STEMS {
            if let Some(rest) = lower.strip_prefix(stem.pinyin())
                && let Ok(branch) = rest.parse::<Branch>()
            {
                return Ok(Self::new(stem, branch));
            }
        }
        Err(ChartError::invalid(format!("cannot parse pillar '{s}'")))
    }
}

/// Void branches for a day pillar: the two branches left over by its
/// ten-day decade. `None` when stem and branch differ in polarity, since no
/// such pillar exists in the sixty cycle.
pub fn void_branches(day: Pillar) -> Option<[Branch; 2]> {
    let s = day.stem.index();
    let b = day.branch.index();
    if s % 2 != b % 2 {
        return None;
    }
    let decade_start = (b + 12 - s) % 12;
    Some([
        Branch::from_index(decade_start + 10),
        Branch::from_index(decade_start + 11),
    ])
}

/// A validated four-pillar chart with the hidden stems of each branch.
#[derive(Clone, Debug, PartialEq)]
pub struct Chart {
    pillars: [Pillar; 4],
    hidden: [Vec<HiddenStem>; 4],
}

impl Chart {
    /// Build a chart from pillars and caller-supplied hidden stems.
    ///
    /// Each hidden-stem list must hold 1–3 entries in strictly increasing qi
    /// level, and no more entries than the branch's ratio table.
    pub fn new(pillars: [Pillar; 4], hidden: [Vec<HiddenStem>; 4]) -> Result<Self> {
        for (i, (pillar, list)) in pillars.iter().zip(hidden.iter()).enumerate() {
            validate_hidden(POSITIONS[i], pillar.branch, list)?;
        }
        Ok(Self { pillars, hidden })
    }

    /// Build a chart using the standard hidden-stem table.
    pub fn with_canonical_hidden_stems(pillars: [Pillar; 4]) -> Self {
        let hidden = pillars.map(|p| p.branch.hidden_stems().to_vec());
        Self { pillars, hidden }
    }

    /// Build from a slice that must hold exactly four pillars.
    pub fn from_slice(pillars: &[Pillar]) -> Result<Self> {
        let arr: [Pillar; 4] = pillars.try_into().map_err(|_| {
            ChartError::invalid(format!("expected 4 pillars, got {}", pillars.len()))
        })?;
        Ok(Self::with_canonical_hidden_stems(arr))
    }

    /// Parse whitespace-separated pillars: `"甲子 丙寅 戊辰 庚午"`.
    pub fn parse(s: &str) -> Result<Self> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        Self::from_tokens(&tokens)
    }

    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self> {
        let pillars = tokens
            .iter()
            .map(|t| t.as_ref().parse::<Pillar>())
            .collect::<Result<Vec<_>>>()?;
        Self::from_slice(&pillars)
    }

    pub fn pillars(&self) -> &[Pillar; 4] {
        &self.pillars
    }

    pub fn hidden_stems(&self) -> &[Vec<HiddenStem>; 4] {
        &self.hidden
    }

    pub fn stems(&self) -> [Stem; 4] {
        self.pillars.map(|p| p.stem)
    }

    pub fn branches(&self) -> [Branch; 4] {
        self.pillars.map(|p| p.branch)
    }

    pub fn day_master(&self) -> Stem {
        self.pillars[DAY].stem
    }

    pub fn month_branch(&self) -> Branch {
        self.pillars[MONTH].branch
    }
}

impl fmt::Display for Chart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [y, m, d, h] = self.pillars;
        write!(f, "{y} {m} {d} {h}")
    }
}

fn validate_hidden(position: Position, branch: Branch, list: &[HiddenStem]) -> Result<()> {
    if list.is_empty() || list.len() > 3 {
        return Err(ChartError::invalid(format!(
            "{} pillar: expected 1-3 hidden stems, got {}",
            position.name(),
            list.len()
        )));
    }
    if list.len() > branch.qi_ratios().len() {
        return Err(ChartError::invalid(format!(
            "{} pillar: branch {branch} holds at most {} hidden stems, got {}",
            position.name(),
            branch.qi_ratios().len(),
            list.len()
        )));
    }
    if let Some(h) = list.iter().find(|h| branch.qi_ratio(h.qi_level).is_none()) {
        return Err(ChartError::invalid(format!(
            "{} pillar: branch {branch} has no {:?} qi level (hidden stem {})",
            position.name(),
            h.qi_level,
            h.stem
        )));
    }
    if list.windows(2).any(|w| w[0].qi_level >= w[1].qi_level) {
        return Err(ChartError::invalid(format!(
            "{} pillar: hidden stems must be ordered main, middle, residual",
            position.name()
        )));
    }
    Ok(())
}
