//! The twelve earthly branches and the stems hidden inside them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::error::ChartError;
use crate::stem::Stem;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Branch {
    #[serde(rename = "子", alias = "zi")]
    Zi,
    #[serde(rename = "丑", alias = "chou")]
    Chou,
    #[serde(rename = "寅", alias = "yin")]
    Yin,
    #[serde(rename = "卯", alias = "mao")]
    Mao,
    #[serde(rename = "辰", alias = "chen")]
    Chen,
    #[serde(rename = "巳", alias = "si")]
    Si,
    #[serde(rename = "午", alias = "wu")]
    Wu,
    #[serde(rename = "未", alias = "wei")]
    Wei,
    #[serde(rename = "申", alias = "shen")]
    Shen,
    #[serde(rename = "酉", alias = "you")]
    You,
    #[serde(rename = "戌", alias = "xu")]
    Xu,
    #[serde(rename = "亥", alias = "hai")]
    Hai,
}

/// All twelve branches in cycle order (index 0 = 子).
pub const ALL_BRANCHES: [Branch; 12] = [
    Branch::Zi,
    Branch::Chou,
    Branch::Yin,
    Branch::Mao,
    Branch::Chen,
    Branch::Si,
    Branch::Wu,
    Branch::Wei,
    Branch::Shen,
    Branch::You,
    Branch::Xu,
    Branch::Hai,
];

const HANZI: [&str; 12] = [
    "子", "丑", "寅", "卯", "辰", "巳", "午", "未", "申", "酉", "戌", "亥",
];
const PINYIN: [&str; 12] = [
    "zi", "chou", "yin", "mao", "chen", "si", "wu", "wei", "shen", "you", "xu", "hai",
];

/// Qi level of a hidden stem, strongest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QiLevel {
    Main,
    Middle,
    Residual,
}

impl QiLevel {
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A stem stored inside a branch at a given qi level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenStem {
    pub stem: Stem,
    pub qi_level: QiLevel,
}

const fn hs(stem: Stem, qi_level: QiLevel) -> HiddenStem {
    HiddenStem { stem, qi_level }
}

use QiLevel::{Main, Middle, Residual};

const HIDDEN_ZI: [HiddenStem; 1] = [hs(Stem::Gui, Main)];
const HIDDEN_CHOU: [HiddenStem; 3] = [hs(Stem::Ji, Main), hs(Stem::Gui, Middle), hs(Stem::Xin, Residual)];
const HIDDEN_YIN: [HiddenStem; 3] = [hs(Stem::Jia, Main), hs(Stem::Bing, Middle), hs(Stem::Wu, Residual)];
const HIDDEN_MAO: [HiddenStem; 1] = [hs(Stem::Yi, Main)];
const HIDDEN_CHEN: [HiddenStem; 3] = [hs(Stem::Wu, Main), hs(Stem::Yi, Middle), hs(Stem::Gui, Residual)];
const HIDDEN_SI: [HiddenStem; 3] = [hs(Stem::Bing, Main), hs(Stem::Geng, Middle), hs(Stem::Wu, Residual)];
const HIDDEN_WU: [HiddenStem; 2] = [hs(Stem::Ding, Main), hs(Stem::Ji, Middle)];
const HIDDEN_WEI: [HiddenStem; 3] = [hs(Stem::Ji, Main), hs(Stem::Ding, Middle), hs(Stem::Yi, Residual)];
const HIDDEN_SHEN: [HiddenStem; 3] = [hs(Stem::Geng, Main), hs(Stem::Ren, Middle), hs(Stem::Wu, Residual)];
const HIDDEN_YOU: [HiddenStem; 1] = [hs(Stem::Xin, Main)];
const HIDDEN_XU: [HiddenStem; 3] = [hs(Stem::Wu, Main), hs(Stem::Xin, Middle), hs(Stem::Ding, Residual)];
const HIDDEN_HAI: [HiddenStem; 2] = [hs(Stem::Ren, Main), hs(Stem::Jia, Middle)];

const RATIO_PURE: [f64; 1] = [1.0];
const RATIO_PAIR: [f64; 2] = [0.7, 0.3];
const RATIO_GROWTH: [f64; 3] = [0.6, 0.3, 0.1];
const RATIO_STORAGE: [f64; 3] = [0.6, 0.25, 0.15];

impl Branch {
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn from_index(i: usize) -> Self {
        ALL_BRANCHES[i % 12]
    }

    pub const fn element(self) -> Element {
        match self {
            Branch::Zi | Branch::Hai => Element::Water,
            Branch::Yin | Branch::Mao => Element::Wood,
            Branch::Si | Branch::Wu => Element::Fire,
            Branch::Shen | Branch::You => Element::Metal,
            Branch::Chou | Branch::Chen | Branch::Wei | Branch::Xu => Element::Earth,
        }
    }

    /// Hidden stems in main → middle → residual order.
    pub const fn hidden_stems(self) -> &'static [HiddenStem] {
        match self {
            Branch::Zi => &HIDDEN_ZI,
            Branch::Chou => &HIDDEN_CHOU,
            Branch::Yin => &HIDDEN_YIN,
            Branch::Mao => &HIDDEN_MAO,
            Branch::Chen => &HIDDEN_CHEN,
            Branch::Si => &HIDDEN_SI,
            Branch::Wu => &HIDDEN_WU,
            Branch::Wei => &HIDDEN_WEI,
            Branch::Shen => &HIDDEN_SHEN,
            Branch::You => &HIDDEN_YOU,
            Branch::Xu => &HIDDEN_XU,
            Branch::Hai => &HIDDEN_HAI,
        }
    }

    /// Energy ratio per qi level, indexed by [`QiLevel::index`].
    pub const fn qi_ratios(self) -> &'static [f64] {
        match self {
            Branch::Zi | Branch::Mao | Branch::You => &RATIO_PURE,
            Branch::Wu | Branch::Hai => &RATIO_PAIR,
            Branch::Yin | Branch::Shen | Branch::Si => &RATIO_GROWTH,
            Branch::Chen | Branch::Xu | Branch::Chou | Branch::Wei => &RATIO_STORAGE,
        }
    }

    pub fn qi_ratio(self, level: QiLevel) -> Option<f64> {
        self.qi_ratios().get(level.index()).copied()
    }

    pub const fn hanzi(self) -> &'static str {
        HANZI[self.index()]
    }

    pub const fn pinyin(self) -> &'static str {
        PINYIN[self.index()]
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hanzi())
    }
}

impl FromStr for Branch {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let lower = s.to_lowercase();
        ALL_BRANCHES
            .iter()
            .copied()
            .find(|b| b.hanzi() == s || b.pinyin() == lower)
            .ok_or_else(|| ChartError::invalid(format!("unknown branch '{s}'")))
    }
}
