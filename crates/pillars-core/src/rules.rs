//! Static relation rule table for stems and branches.
//!
//! Order matters: the matcher accepts candidates in table order, and the
//! suppression pass only sees matches accepted before the candidate. Every
//! three-branch group is therefore listed ahead of the pairs it subsumes.

use std::fmt;

use serde::Serialize;

use crate::branch::Branch as Br;
use crate::element::Element;
use crate::stem::Stem as St;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Stem,
    Branch,
}

/// A stem or branch value as seen by the matcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum Symbol {
    Stem(St),
    Branch(Br),
}

impl Symbol {
    pub const fn domain(self) -> Domain {
        match self {
            Symbol::Stem(_) => Domain::Stem,
            Symbol::Branch(_) => Domain::Branch,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Stem(s) => s.fmt(f),
            Symbol::Branch(b) => b.fmt(f),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    StemCombination,
    StemClash,
    Directional,
    TripleHarmony,
    HalfHarmony,
    SixCombination,
    Clash,
    Harm,
    TriplePunishment,
    PairPunishment,
    SelfPunishment,
    Break,
}

impl RelationKind {
    pub const fn label(self) -> &'static str {
        match self {
            RelationKind::StemCombination => "stem combination",
            RelationKind::StemClash => "stem clash",
            RelationKind::Directional => "directional group",
            RelationKind::TripleHarmony => "triple harmony",
            RelationKind::HalfHarmony => "half harmony",
            RelationKind::SixCombination => "six combination",
            RelationKind::Clash => "clash",
            RelationKind::Harm => "harm",
            RelationKind::TriplePunishment => "triple punishment",
            RelationKind::PairPunishment => "punishment",
            RelationKind::SelfPunishment => "self punishment",
            RelationKind::Break => "break",
        }
    }

    pub const fn is_punishment(self) -> bool {
        matches!(
            self,
            RelationKind::TriplePunishment
                | RelationKind::PairPunishment
                | RelationKind::SelfPunishment
        )
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct RelationRule {
    pub domain: Domain,
    pub kind: RelationKind,
    pub required: &'static [Symbol],
    pub result: Option<Element>,
    /// Center branch of a harmony group; a half harmony only transforms
    /// when it holds this branch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<Br>,
    pub description: &'static str,
}

/// (candidate kind, kind that suppresses it on a shared participant).
pub const EXCLUSIONS: &[(RelationKind, RelationKind)] = &[
    (RelationKind::HalfHarmony, RelationKind::Directional),
    (RelationKind::HalfHarmony, RelationKind::TripleHarmony),
    (RelationKind::SixCombination, RelationKind::Directional),
    (RelationKind::SixCombination, RelationKind::TripleHarmony),
    (RelationKind::PairPunishment, RelationKind::TriplePunishment),
];

use Symbol::{Branch as B, Stem as S};

const fn stem_rule(
    kind: RelationKind,
    required: &'static [Symbol],
    result: Option<Element>,
    description: &'static str,
) -> RelationRule {
    RelationRule {
        domain: Domain::Stem,
        kind,
        required,
        result,
        center: None,
        description,
    }
}

const fn branch_rule(
    kind: RelationKind,
    required: &'static [Symbol],
    result: Option<Element>,
    center: Option<Br>,
    description: &'static str,
) -> RelationRule {
    RelationRule {
        domain: Domain::Branch,
        kind,
        required,
        result,
        center,
        description,
    }
}

use Element::{Earth, Fire, Metal, Water, Wood};
use RelationKind::*;

pub static RULES: &[RelationRule] = &[
    // -- stems --
    stem_rule(StemCombination, &[S(St::Jia), S(St::Ji)], Some(Earth), "甲己 combine into earth"),
    stem_rule(StemCombination, &[S(St::Yi), S(St::Geng)], Some(Metal), "乙庚 combine into metal"),
    stem_rule(StemCombination, &[S(St::Bing), S(St::Xin)], Some(Water), "丙辛 combine into water"),
    stem_rule(StemCombination, &[S(St::Ding), S(St::Ren)], Some(Wood), "丁壬 combine into wood"),
    stem_rule(StemCombination, &[S(St::Wu), S(St::Gui)], Some(Fire), "戊癸 combine into fire"),
    stem_rule(StemClash, &[S(St::Jia), S(St::Geng)], None, "甲庚 clash"),
    stem_rule(StemClash, &[S(St::Yi), S(St::Xin)], None, "乙辛 clash"),
    stem_rule(StemClash, &[S(St::Bing), S(St::Ren)], None, "丙壬 clash"),
    stem_rule(StemClash, &[S(St::Ding), S(St::Gui)], None, "丁癸 clash"),
    // -- directional groups --
    branch_rule(Directional, &[B(Br::Yin), B(Br::Mao), B(Br::Chen)], Some(Wood), None, "寅卯辰 eastern wood group"),
    branch_rule(Directional, &[B(Br::Si), B(Br::Wu), B(Br::Wei)], Some(Fire), None, "巳午未 southern fire group"),
    branch_rule(Directional, &[B(Br::Shen), B(Br::You), B(Br::Xu)], Some(Metal), None, "申酉戌 western metal group"),
    branch_rule(Directional, &[B(Br::Hai), B(Br::Zi), B(Br::Chou)], Some(Water), None, "亥子丑 northern water group"),
    // -- triple harmonies --
    branch_rule(TripleHarmony, &[B(Br::Shen), B(Br::Zi), B(Br::Chen)], Some(Water), Some(Br::Zi), "申子辰 water frame"),
    branch_rule(TripleHarmony, &[B(Br::Hai), B(Br::Mao), B(Br::Wei)], Some(Wood), Some(Br::Mao), "亥卯未 wood frame"),
    branch_rule(TripleHarmony, &[B(Br::Yin), B(Br::Wu), B(Br::Xu)], Some(Fire), Some(Br::Wu), "寅午戌 fire frame"),
    branch_rule(TripleHarmony, &[B(Br::Si), B(Br::You), B(Br::Chou)], Some(Metal), Some(Br::You), "巳酉丑 metal frame"),
    // -- half harmonies --
    branch_rule(HalfHarmony, &[B(Br::Shen), B(Br::Zi)], Some(Water), Some(Br::Zi), "申子 half water frame"),
    branch_rule(HalfHarmony, &[B(Br::Zi), B(Br::Chen)], Some(Water), Some(Br::Zi), "子辰 half water frame"),
    branch_rule(HalfHarmony, &[B(Br::Shen), B(Br::Chen)], Some(Water), Some(Br::Zi), "申辰 arching water frame"),
    branch_rule(HalfHarmony, &[B(Br::Hai), B(Br::Mao)], Some(Wood), Some(Br::Mao), "亥卯 half wood frame"),
    branch_rule(HalfHarmony, &[B(Br::Mao), B(Br::Wei)], Some(Wood), Some(Br::Mao), "卯未 half wood frame"),
    branch_rule(HalfHarmony, &[B(Br::Hai), B(Br::Wei)], Some(Wood), Some(Br::Mao), "亥未 arching wood frame"),
    branch_rule(HalfHarmony, &[B(Br::Yin), B(Br::Wu)], Some(Fire), Some(Br::Wu), "寅午 half fire frame"),
    branch_rule(HalfHarmony, &[B(Br::Wu), B(Br::Xu)], Some(Fire), Some(Br::Wu), "午戌 half fire frame"),
    branch_rule(HalfHarmony, &[B(Br::Yin), B(Br::Xu)], Some(Fire), Some(Br::Wu), "寅戌 arching fire frame"),
    branch_rule(HalfHarmony, &[B(Br::Si), B(Br::You)], Some(Metal), Some(Br::You), "巳酉 half metal frame"),
    branch_rule(HalfHarmony, &[B(Br::You), B(Br::Chou)], Some(Metal), Some(Br::You), "酉丑 half metal frame"),
    branch_rule(HalfHarmony, &[B(Br::Si), B(Br::Chou)], Some(Metal), Some(Br::You), "巳丑 arching metal frame"),
    // -- six combinations --
    branch_rule(SixCombination, &[B(Br::Zi), B(Br::Chou)], Some(Earth), None, "子丑 combine into earth"),
    branch_rule(SixCombination, &[B(Br::Yin), B(Br::Hai)], Some(Wood), None, "寅亥 combine into wood"),
    branch_rule(SixCombination, &[B(Br::Mao), B(Br::Xu)], Some(Fire), None, "卯戌 combine into fire"),
    branch_rule(SixCombination, &[B(Br::Chen), B(Br::You)], Some(Metal), None, "辰酉 combine into metal"),
    branch_rule(SixCombination, &[B(Br::Si), B(Br::Shen)], Some(Water), None, "巳申 combine into water"),
    branch_rule(SixCombination, &[B(Br::Wu), B(Br::Wei)], Some(Earth), None, "午未 combine into earth"),
    // -- clashes --
    branch_rule(Clash, &[B(Br::Zi), B(Br::Wu)], None, None, "子午 clash"),
    branch_rule(Clash, &[B(Br::Chou), B(Br::Wei)], None, None, "丑未 clash"),
    branch_rule(Clash, &[B(Br::Yin), B(Br::Shen)], None, None, "寅申 clash"),
    branch_rule(Clash, &[B(Br::Mao), B(Br::You)], None, None, "卯酉 clash"),
    branch_rule(Clash, &[B(Br::Chen), B(Br::Xu)], None, None, "辰戌 clash"),
    branch_rule(Clash, &[B(Br::Si), B(Br::Hai)], None, None, "巳亥 clash"),
    // -- harms --
    branch_rule(Harm, &[B(Br::Zi), B(Br::Wei)], None, None, "子未 harm"),
    branch_rule(Harm, &[B(Br::Chou), B(Br::Wu)], None, None, "丑午 harm"),
    branch_rule(Harm, &[B(Br::Yin), B(Br::Si)], None, None, "寅巳 harm"),
    branch_rule(Harm, &[B(Br::Mao), B(Br::Chen)], None, None, "卯辰 harm"),
    branch_rule(Harm, &[B(Br::Shen), B(Br::Hai)], None, None, "申亥 harm"),
    branch_rule(Harm, &[B(Br::You), B(Br::Xu)], None, None, "酉戌 harm"),
    // -- punishments --
    branch_rule(TriplePunishment, &[B(Br::Yin), B(Br::Si), B(Br::Shen)], None, None, "寅巳申 ungrateful punishment"),
    branch_rule(TriplePunishment, &[B(Br::Chou), B(Br::Xu), B(Br::Wei)], None, None, "丑戌未 bullying punishment"),
    branch_rule(PairPunishment, &[B(Br::Zi), B(Br::Mao)], None, None, "子卯 rude punishment"),
    branch_rule(PairPunishment, &[B(Br::Yin), B(Br::Si)], None, None, "寅巳 punishment"),
    branch_rule(PairPunishment, &[B(Br::Si), B(Br::Shen)], None, None, "巳申 punishment"),
    branch_rule(PairPunishment, &[B(Br::Shen), B(Br::Yin)], None, None, "申寅 punishment"),
    branch_rule(PairPunishment, &[B(Br::Chou), B(Br::Xu)], None, None, "丑戌 punishment"),
    branch_rule(PairPunishment, &[B(Br::Xu), B(Br::Wei)], None, None, "戌未 punishment"),
    branch_rule(PairPunishment, &[B(Br::Wei), B(Br::Chou)], None, None, "未丑 punishment"),
    branch_rule(SelfPunishment, &[B(Br::Chen), B(Br::Chen)], None, None, "辰辰 self punishment"),
    branch_rule(SelfPunishment, &[B(Br::Wu), B(Br::Wu)], None, None, "午午 self punishment"),
    branch_rule(SelfPunishment, &[B(Br::You), B(Br::You)], None, None, "酉酉 self punishment"),
    branch_rule(SelfPunishment, &[B(Br::Hai), B(Br::Hai)], None, None, "亥亥 self punishment"),
    // -- breaks --
    branch_rule(Break, &[B(Br::Zi), B(Br::You)], None, None, "子酉 break"),
    branch_rule(Break, &[B(Br::Mao), B(Br::Wu)], None, None, "卯午 break"),
    branch_rule(Break, &[B(Br::Chen), B(Br::Chou)], None, None, "辰丑 break"),
    branch_rule(Break, &[B(Br::Wei), B(Br::Xu)], None, None, "未戌 break"),
    branch_rule(Break, &[B(Br::Yin), B(Br::Hai)], None, None, "寅亥 break"),
    branch_rule(Break, &[B(Br::Si), B(Br::Shen)], None, None, "巳申 break"),
];

/// The two clashes between storage branches, where both sides are earth.
pub fn is_earth_clash(a: Br, b: Br) -> bool {
    matches!(
        (a, b),
        (Br::Chou, Br::Wei) | (Br::Wei, Br::Chou) | (Br::Chen, Br::Xu) | (Br::Xu, Br::Chen)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_are_single_domain() {
        for rule in RULES {
            assert!(
                rule.required.iter().all(|s| s.domain() == rule.domain),
                "{}",
                rule.description
            );
        }
    }

    #[test]
    fn test_transforming_rules_have_results() {
        for rule in RULES {
            let transforms = matches!(
                rule.kind,
                StemCombination | Directional | TripleHarmony | HalfHarmony | SixCombination
            );
            assert_eq!(transforms, rule.result.is_some(), "{}", rule.description);
        }
    }

    #[test]
    fn test_groups_precede_subsumed_pairs() {
        let last_group = RULES
            .iter()
            .rposition(|r| matches!(r.kind, Directional | TripleHarmony | TriplePunishment))
            .unwrap();
        let first_pair_punish = RULES.iter().position(|r| r.kind == PairPunishment).unwrap();
        let first_half = RULES.iter().position(|r| r.kind == HalfHarmony).unwrap();
        let last_triple_harmony = RULES.iter().rposition(|r| r.kind == TripleHarmony).unwrap();
        assert!(last_triple_harmony < first_half);
        assert!(last_group < first_pair_punish);
    }

    #[test]
    fn test_harmony_centers_belong_to_their_rules() {
        for rule in RULES.iter().filter(|r| r.kind == TripleHarmony) {
            let center = rule.center.unwrap();
            assert!(rule.required.contains(&B(center)));
        }
    }

    #[test]
    fn test_rule_count() {
        assert_eq!(RULES.len(), 66);
    }
}
