//! The five elements and their generating/controlling cycles.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

/// All five elements in generating-cycle order (index 0 = Wood).
pub const ALL_ELEMENTS: [Element; 5] = [
    Element::Wood,
    Element::Fire,
    Element::Earth,
    Element::Metal,
    Element::Water,
];

impl Element {
    /// 0-based position in the generating cycle.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn from_index(i: usize) -> Self {
        ALL_ELEMENTS[i % 5]
    }

    /// The element this one feeds: wood → fire → earth → metal → water → wood.
    pub const fn generates(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub const fn generated_by(self) -> Self {
        Self::from_index(self.index() + 4)
    }

    /// The element this one restrains: wood → earth → water → fire → metal → wood.
    pub const fn controls(self) -> Self {
        Self::from_index(self.index() + 2)
    }

    pub const fn controlled_by(self) -> Self {
        Self::from_index(self.index() + 3)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Element::Wood => "wood",
            Element::Fire => "fire",
            Element::Earth => "earth",
            Element::Metal => "metal",
            Element::Water => "water",
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
