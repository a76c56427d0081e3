//! Relation matcher: finds every rule whose required values are covered by
//! the four stems (or four branches) of a chart.

use serde::Serialize;

use crate::branch::Branch;
use crate::error::{ChartError, Result};
use crate::rules::{Domain, EXCLUSIONS, RULES, RelationKind, RelationRule, Symbol};
use crate::stem::Stem;

/// One fired rule and the pillar indices taking part in it (ascending).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RelationMatch {
    pub participants: Vec<usize>,
    pub rule: &'static RelationRule,
}

impl RelationMatch {
    pub fn kind(&self) -> RelationKind {
        self.rule.kind
    }

    pub fn involves(&self, index: usize) -> bool {
        self.participants.contains(&index)
    }

    pub fn shares_any(&self, indices: &[usize]) -> bool {
        self.participants.iter().any(|p| indices.contains(p))
    }
}

/// Match every rule of `domain` against four values in pillar order.
///
/// Matches come back in rule-table order. Candidates of a kind listed in
/// [`EXCLUSIONS`] are dropped when an already accepted match of the
/// excluding kind shares a participant.
pub fn match_relations(domain: Domain, values: &[Symbol]) -> Result<Vec<RelationMatch>> {
    let values: &[Symbol; 4] = values.try_into().map_err(|_| {
        ChartError::invalid(format!("expected 4 values, got {}", values.len()))
    })?;
    if let Some(bad) = values.iter().find(|v| v.domain() != domain) {
        return Err(ChartError::invalid(format!(
            "symbol {bad} does not belong to the {domain:?} domain"
        )));
    }
    Ok(match_checked(domain, values))
}

pub fn match_stems(stems: [Stem; 4]) -> Vec<RelationMatch> {
    match_checked(Domain::Stem, &stems.map(Symbol::Stem))
}

pub fn match_branches(branches: [Branch; 4]) -> Vec<RelationMatch> {
    match_checked(Domain::Branch, &branches.map(Symbol::Branch))
}

fn match_checked(domain: Domain, values: &[Symbol; 4]) -> Vec<RelationMatch> {
    let mut accepted: Vec<RelationMatch> = Vec::new();

    for rule in RULES.iter().filter(|r| r.domain == domain) {
        let need = rule.required.len();
        let matched: Vec<usize> = (0..values.len())
            .filter(|&i| rule.required.contains(&values[i]))
            .collect();
        if matched.len() < need {
            continue;
        }

        for candidate in combinations(&matched, need) {
            if !covers_exactly(values, &candidate, rule.required) {
                continue;
            }
            if is_suppressed(rule.kind, &candidate, &accepted) {
                continue;
            }
            accepted.push(RelationMatch {
                participants: candidate,
                rule,
            });
        }
    }

    accepted
}

/// True when the values at `indices` form exactly the `required` multiset.
fn covers_exactly(values: &[Symbol; 4], indices: &[usize], required: &[Symbol]) -> bool {
    let mut have: Vec<Symbol> = indices.iter().map(|&i| values[i]).collect();
    let mut want = required.to_vec();
    have.sort();
    want.sort();
    have == want
}

fn is_suppressed(kind: RelationKind, candidate: &[usize], accepted: &[RelationMatch]) -> bool {
    EXCLUSIONS
        .iter()
        .filter(|(cand, _)| *cand == kind)
        .any(|(_, excluding)| {
            accepted
                .iter()
                .any(|m| m.kind() == *excluding && m.shares_any(candidate))
        })
}

/// All `k`-element subsets of `items`, in lexicographic order.
fn combinations(items: &[usize], k: usize) -> Vec<Vec<usize>> {
    if k == 0 {
        return vec![Vec::new()];
    }
    if items.len() < k {
        return Vec::new();
    }
    let mut out = Vec::new();
    for (i, &first) in items.iter().enumerate() {
        for mut rest in combinations(&items[i + 1..], k - 1) {
            rest.insert(0, first);
            out.push(rest);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::branch::Branch::*;
    use crate::rules::RelationKind::*;
    use crate::stem::Stem::{Bing, Ding, Ji, Jia, Ren};

    fn kinds(matches: &[RelationMatch]) -> Vec<RelationKind> {
        matches.iter().map(|m| m.kind()).collect()
    }

    #[test]
    fn test_combinations_lexicographic() {
        assert_eq!(
            combinations(&[0, 1, 2, 3], 2),
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
        assert_eq!(combinations(&[1, 2], 3), Vec::<Vec<usize>>::new());
    }

    #[test]
    fn test_stem_combination_found() {
        let m = match_stems([Jia, Ji, Bing, Ding]);
        assert_eq!(kinds(&m), vec![StemCombination]);
        assert_eq!(m[0].participants, vec![0, 1]);
        assert_eq!(m[0].rule.result, Some(crate::element::Element::Earth));
    }

    #[test]
    fn test_repeated_stem_fires_per_pair() {
        let m = match_stems([Jia, Ji, Jia, Ren]);
        let pairs: Vec<_> = m.iter().map(|m| m.participants.clone()).collect();
        assert_eq!(pairs, vec![vec![0, 1], vec![1, 2]]);
    }

    #[test]
    fn test_self_punishment_once_per_pair() {
        let m = match_branches([Chen, Chen, Chen, Zi]);
        let selfs: Vec<_> = m
            .iter()
            .filter(|m| m.kind() == SelfPunishment)
            .map(|m| m.participants.clone())
            .collect();
        assert_eq!(selfs, vec![vec![0, 1], vec![0, 2], vec![1, 2]]);
    }

    #[test]
    fn test_single_value_never_satisfies_self_relation() {
        let m = match_branches([Chen, Zi, Mao, Wu]);
        assert!(!kinds(&m).contains(&SelfPunishment));
    }

    #[test]
    fn test_partial_cover_does_not_fire() {
        // 寅 寅 巳 covers two of 寅巳申 three times over but never 申
        let m = match_branches([Yin, Yin, Si, Zi]);
        assert!(!kinds(&m).contains(&TriplePunishment));
    }

    #[test]
    fn test_triple_harmony_suppresses_half_and_six() {
        // 寅午戌 + 亥: 寅亥 six combination shares 寅
        let m = match_branches([Yin, Wu, Xu, Hai]);
        assert!(kinds(&m).contains(&TripleHarmony));
        assert!(!kinds(&m).contains(&HalfHarmony));
        assert!(!kinds(&m).contains(&SixCombination));
        // the break between 寅 and 亥 is not a combination and survives
        assert!(kinds(&m).contains(&Break));
    }

    #[test]
    fn test_triple_punishment_suppresses_nested_pairs() {
        let m = match_branches([Yin, Si, Shen, Zi]);
        assert!(kinds(&m).contains(&TriplePunishment));
        assert!(!kinds(&m).contains(&PairPunishment));
        assert!(kinds(&m).contains(&Harm), "寅巳 harm is not a punishment");
    }

    #[test]
    fn test_pair_punishment_without_group() {
        let m = match_branches([Yin, Si, Zi, Wu]);
        assert!(kinds(&m).contains(&PairPunishment));
    }

    #[test]
    fn test_output_in_rule_order() {
        let m = match_branches([Zi, Wu, Mao, You]);
        let idx: Vec<usize> = m
            .iter()
            .map(|m| RULES.iter().position(|r| std::ptr::eq(r, m.rule)).unwrap())
            .collect();
        let mut sorted = idx.clone();
        sorted.sort();
        assert_eq!(idx, sorted);
    }

    #[test]
    fn test_wrong_length_is_invalid() {
        let values = [Symbol::Branch(Zi), Symbol::Branch(Wu)];
        assert!(matches!(
            match_relations(Domain::Branch, &values),
            Err(ChartError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_wrong_domain_is_invalid() {
        let values = [
            Symbol::Branch(Zi),
            Symbol::Stem(Jia),
            Symbol::Branch(Wu),
            Symbol::Branch(Mao),
        ];
        assert!(match_relations(Domain::Branch, &values).is_err());
    }

    #[test]
    fn test_idempotent() {
        let values = [Zi, Wu, Chen, Xu].map(Symbol::Branch);
        let a = match_relations(Domain::Branch, &values).unwrap();
        let b = match_relations(Domain::Branch, &values).unwrap();
        assert_eq!(a, b);
    }
}
