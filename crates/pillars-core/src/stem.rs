//! The ten heavenly stems.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::error::ChartError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stem {
    #[serde(rename = "甲", alias = "jia")]
    Jia,
    #[serde(rename = "乙", alias = "yi")]
    Yi,
    #[serde(rename = "丙", alias = "bing")]
    Bing,
    #[serde(rename = "丁", alias = "ding")]
    Ding,
    #[serde(rename = "戊", alias = "wu")]
    Wu,
    #[serde(rename = "己", alias = "ji")]
    Ji,
    #[serde(rename = "庚", alias = "geng")]
    Geng,
    #[serde(rename = "辛", alias = "xin")]
    Xin,
    #[serde(rename = "壬", alias = "ren")]
    Ren,
    #[serde(rename = "癸", alias = "gui")]
    Gui,
}

/// All ten stems in cycle order (index 0 = 甲).
pub const ALL_STEMS: [Stem; 10] = [
    Stem::Jia,
    Stem::Yi,
    Stem::Bing,
    Stem::Ding,
    Stem::Wu,
    Stem::Ji,
    Stem::Geng,
    Stem::Xin,
    Stem::Ren,
    Stem::Gui,
];

const HANZI: [&str; 10] = ["甲", "乙", "丙", "丁", "戊", "己", "庚", "辛", "壬", "癸"];
const PINYIN: [&str; 10] = [
    "jia", "yi", "bing", "ding", "wu", "ji", "geng", "xin", "ren", "gui",
];

impl Stem {
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn from_index(i: usize) -> Self {
        ALL_STEMS[i % 10]
    }

    /// Two consecutive stems per element, starting at wood.
    pub const fn element(self) -> Element {
        Element::from_index(self.index() / 2)
    }

    /// Even-indexed stems are yang.
    pub const fn is_yang(self) -> bool {
        self.index() % 2 == 0
    }

    pub const fn hanzi(self) -> &'static str {
        HANZI[self.index()]
    }

    pub const fn pinyin(self) -> &'static str {
        PINYIN[self.index()]
    }
}

impl fmt::Display for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hanzi())
    }
}

impl FromStr for Stem {
    type Err = ChartError;

    /// Accepts the hanzi or the toneless pinyin (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let lower = s.to_lowercase();
        ALL_STEMS
            .iter()
            .copied()
            .find(|stem| stem.hanzi() == s || stem.pinyin() == lower)
            .ok_or_else(|| ChartError::invalid(format!("unknown stem '{s}'")))
    }
}
