//! Four Pillars five-element energy engine.
//!
//! Scores the wood/fire/earth/metal/water distribution of a four-pillar
//! chart through a fixed multi-stage pipeline (deposit, void, season,
//! branch groups, stem pairing, rooting, clashes, minor relations), matches
//! stem and branch relations against a static rule table, and classifies
//! day-master strength.
//!
//! Pure computation: no I/O, no persistence. Transports live in `pillars-cli`.

pub mod branch;
pub mod constants;
pub mod element;
pub mod energy;
pub mod error;
pub mod matcher;
pub mod pillar;
pub mod profile;
pub mod rules;
pub mod season;
pub mod stem;
pub mod strength;
pub mod summary;
pub mod tally;
pub mod wire;

pub use branch::{ALL_BRANCHES, Branch, HiddenStem, QiLevel};
pub use element::{ALL_ELEMENTS, Element};
pub use energy::{EnergyResult, Outcome, StageEvent, score, score_chart};
pub use error::{ChartError, Result};
pub use matcher::{RelationMatch, match_branches, match_relations, match_stems};
pub use pillar::{Chart, POSITIONS, Pillar, Position, void_branches};
pub use profile::{PillarGods, Profile, Relation, analyze, relations, ten_gods};
pub use rules::{Domain, RULES, RelationKind, RelationRule, Symbol};
pub use season::{Phase, Season};
pub use stem::{ALL_STEMS, Stem};
pub use strength::{DayMaster, Strength, TenGod, assess};
pub use summary::{ElementSummary, Level};
pub use tally::{Contribution, LogEntry, Op};
pub use wire::{WireChart, WireProfile, export_profile, import_chart};
