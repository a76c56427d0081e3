//! Seasonal command: how the month branch scales each element.

use serde::{Deserialize, Serialize};

use crate::branch::Branch;
use crate::constants::{SEASON_QIU, SEASON_SI, SEASON_WANG, SEASON_XIANG, SEASON_XIU};
use crate::element::Element;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
    /// The four storage months closing each season.
    EarthTransition,
}

/// Seasonal phase of an element relative to the ruling element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Wang,
    Xiang,
    Xiu,
    Qiu,
    Si,
}

impl Phase {
    pub const fn multiplier(self) -> f64 {
        match self {
            Phase::Wang => SEASON_WANG,
            Phase::Xiang => SEASON_XIANG,
            Phase::Xiu => SEASON_XIU,
            Phase::Qiu => SEASON_QIU,
            Phase::Si => SEASON_SI,
        }
    }
}

impl Season {
    pub const fn of_month(month: Branch) -> Self {
        match month {
            Branch::Yin | Branch::Mao => Season::Spring,
            Branch::Si | Branch::Wu => Season::Summer,
            Branch::Shen | Branch::You => Season::Autumn,
            Branch::Hai | Branch::Zi => Season::Winter,
            Branch::Chen | Branch::Wei | Branch::Xu | Branch::Chou => Season::EarthTransition,
        }
    }

    pub const fn ruling_element(self) -> Element {
        match self {
            Season::Spring => Element::Wood,
            Season::Summer => Element::Fire,
            Season::Autumn => Element::Metal,
            Season::Winter => Element::Water,
            Season::EarthTransition => Element::Earth,
        }
    }

    pub fn phase(self, element: Element) -> Phase {
        let ruler = self.ruling_element();
        if element == ruler {
            Phase::Wang
        } else if ruler.generates() == element {
            Phase::Xiang
        } else if element.generates() == ruler {
            Phase::Xiu
        } else if element.controls() == ruler {
            Phase::Qiu
        } else {
            Phase::Si
        }
    }

    pub fn multiplier(self, element: Element) -> f64 {
        self.phase(element).multiplier()
    }
}
