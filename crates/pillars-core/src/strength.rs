//! Day-master strength, useful/avoid elements and ten-god labels.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{DM_STRONG, DM_VERY_STRONG, DM_VERY_WEAK, DM_WEAK, EPSILON};
use crate::element::{ALL_ELEMENTS, Element};
use crate::stem::Stem;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    VeryWeak,
    Weak,
    Balanced,
    Strong,
    VeryStrong,
}

impl Strength {
    /// Classify the share of the total held by the day master and its resource.
    pub fn from_support(support: f64, total: f64) -> Self {
        if total <= EPSILON {
            return Strength::Balanced;
        }
        let share = support / total;
        if share >= DM_VERY_STRONG {
            Strength::VeryStrong
        } else if share >= DM_STRONG {
            Strength::Strong
        } else if share <= DM_VERY_WEAK {
            Strength::VeryWeak
        } else if share <= DM_WEAK {
            Strength::Weak
        } else {
            Strength::Balanced
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Strength::VeryWeak => "very weak",
            Strength::Weak => "weak",
            Strength::Balanced => "balanced",
            Strength::Strong => "strong",
            Strength::VeryStrong => "very strong",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DayMaster {
    pub stem: Stem,
    pub element: Element,
    pub support: f64,
    pub share: f64,
    pub strength: Strength,
    pub useful: Vec<Element>,
    pub avoid: Vec<Element>,
}

/// Assess the day master against final element scores in wood..water order.
pub fn assess(day_master: Stem, scores: [f64; 5]) -> DayMaster {
    let element = day_master.element();
    let resource = element.generated_by();
    let total: f64 = scores.iter().sum();
    let support = scores[element.index()] + scores[resource.index()];
    let strength = Strength::from_support(support, total);

    let drains = vec![element.generates(), element.controls(), element.controlled_by()];
    let helps = vec![element, resource];
    let (useful, avoid) = match strength {
        Strength::Strong | Strength::VeryStrong => (drains, helps),
        Strength::Weak | Strength::VeryWeak => {
            (helps, vec![element.controlled_by(), element.controls(), element.generates()])
        }
        Strength::Balanced => (vec![weakest(scores)], vec![strongest(scores)]),
    };

    DayMaster {
        stem: day_master,
        element,
        support,
        share: if total > EPSILON { support / total } else { 0.0 },
        strength,
        useful,
        avoid,
    }
}

// Ties resolve to the earlier element in generating order.
fn weakest(scores: [f64; 5]) -> Element {
    let mut best = Element::Wood;
    for e in ALL_ELEMENTS {
        if scores[e.index()] < scores[best.index()] {
            best = e;
        }
    }
    best
}

fn strongest(scores: [f64; 5]) -> Element {
    let mut best = Element::Wood;
    for e in ALL_ELEMENTS {
        if scores[e.index()] > scores[best.index()] {
            best = e;
        }
    }
    best
}

/// Relation of a stem to the day master.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TenGod {
    #[serde(rename = "比肩")]
    Companion,
    #[serde(rename = "劫财")]
    RobWealth,
    #[serde(rename = "食神")]
    EatingGod,
    #[serde(rename = "伤官")]
    HurtingOfficer,
    #[serde(rename = "偏财")]
    IndirectWealth,
    #[serde(rename = "正财")]
    DirectWealth,
    #[serde(rename = "七杀")]
    SevenKillings,
    #[serde(rename = "正官")]
    DirectOfficer,
    #[serde(rename = "偏印")]
    IndirectResource,
    #[serde(rename = "正印")]
    DirectResource,
}

impl TenGod {
    pub fn of(day_master: Stem, other: Stem) -> Self {
        let dm = day_master.element();
        let e = other.element();
        let same = day_master.is_yang() == other.is_yang();
        let pick = |same_polarity, opposite| if same { same_polarity } else { opposite };

        if e == dm {
            pick(TenGod::Companion, TenGod::RobWealth)
        } else if e == dm.generates() {
            pick(TenGod::EatingGod, TenGod::HurtingOfficer)
        } else if e == dm.controls() {
            pick(TenGod::IndirectWealth, TenGod::DirectWealth)
        } else if e == dm.controlled_by() {
            pick(TenGod::SevenKillings, TenGod::DirectOfficer)
        } else {
            pick(TenGod::IndirectResource, TenGod::DirectResource)
        }
    }

    pub const fn hanzi(self) -> &'static str {
        match self {
            TenGod::Companion => "比肩",
            TenGod::RobWealth => "劫财",
            TenGod::EatingGod => "食神",
            TenGod::HurtingOfficer => "伤官",
            TenGod::IndirectWealth => "偏财",
            TenGod::DirectWealth => "正财",
            TenGod::SevenKillings => "七杀",
            TenGod::DirectOfficer => "正官",
            TenGod::IndirectResource => "偏印",
            TenGod::DirectResource => "正印",
        }
    }
}

impl fmt::Display for TenGod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hanzi())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strength_thresholds() {
        assert_eq!(Strength::from_support(60.0, 100.0), Strength::VeryStrong);
        assert_eq!(Strength::from_support(50.0, 100.0), Strength::Strong);
        assert_eq!(Strength::from_support(40.0, 100.0), Strength::Balanced);
        assert_eq!(Strength::from_support(36.0, 100.0), Strength::Weak);
        assert_eq!(Strength::from_support(20.0, 100.0), Strength::VeryWeak);
        assert_eq!(Strength::from_support(0.0, 0.0), Strength::Balanced);
    }

    #[test]
    fn test_strong_wood_day_master_wants_drain() {
        // wood 50, water 20 → support 70 of 100
        let dm = assess(Stem::Jia, [50.0, 10.0, 10.0, 10.0, 20.0]);
        assert_eq!(dm.strength, Strength::VeryStrong);
        assert_eq!(dm.useful, vec![Element::Fire, Element::Earth, Element::Metal]);
        assert_eq!(dm.avoid, vec![Element::Wood, Element::Water]);
    }

    #[test]
    fn test_weak_day_master_wants_support() {
        let dm = assess(Stem::Bing, [5.0, 10.0, 40.0, 20.0, 25.0]);
        assert_eq!(dm.strength, Strength::VeryWeak);
        assert_eq!(dm.useful, vec![Element::Fire, Element::Wood]);
        assert_eq!(dm.avoid, vec![Element::Water, Element::Metal, Element::Earth]);
    }

    #[test]
    fn test_balanced_picks_extremes() {
        // metal day master: metal 20 + earth 20 = 40%
        let dm = assess(Stem::Geng, [10.0, 30.0, 20.0, 20.0, 20.0]);
        assert_eq!(dm.strength, Strength::Balanced);
        assert_eq!(dm.useful, vec![Element::Wood]);
        assert_eq!(dm.avoid, vec![Element::Fire]);
    }

    #[test]
    fn test_ten_gods_for_jia() {
        let cases = [
            (Stem::Jia, TenGod::Companion),
            (Stem::Yi, TenGod::RobWealth),
            (Stem::Bing, TenGod::EatingGod),
            (Stem::Ding, TenGod::HurtingOfficer),
            (Stem::Wu, TenGod::IndirectWealth),
            (Stem::Ji, TenGod::DirectWealth),
            (Stem::Geng, TenGod::SevenKillings),
            (Stem::Xin, TenGod::DirectOfficer),
            (Stem::Ren, TenGod::IndirectResource),
            (Stem::Gui, TenGod::DirectResource),
        ];
        for (other, want) in cases {
            assert_eq!(TenGod::of(Stem::Jia, other), want, "{other}");
        }
    }

    #[test]
    fn test_ten_gods_for_yin_day_master() {
        assert_eq!(TenGod::of(Stem::Yi, Stem::Geng), TenGod::DirectOfficer);
        assert_eq!(TenGod::of(Stem::Yi, Stem::Xin), TenGod::SevenKillings);
    }
}
