//! Plain-text rendering of a profile for the terminal.

use std::fmt::Write;

use pillars_core::{ALL_ELEMENTS, Element, Profile, Relation};

fn join(elements: &[Element]) -> String {
    elements.iter().map(|e| e.name()).collect::<Vec<_>>().join(", ")
}

fn relation_line(r: &Relation) -> String {
    let idx = r
        .participants
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(",");
    match r.result {
        Some(e) => format!("  [{idx}] {}: {} -> {}", r.kind.label(), r.description, e.name()),
        None => format!("  [{idx}] {}: {}", r.kind.label(), r.description),
    }
}

pub fn relations(profile: &Profile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "stem relations:");
    if profile.stem_relations.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for r in &profile.stem_relations {
        let _ = writeln!(out, "{}", relation_line(r));
    }
    let _ = writeln!(out, "branch relations:");
    if profile.branch_relations.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for r in &profile.branch_relations {
        let _ = writeln!(out, "{}", relation_line(r));
    }
    out
}

pub fn render(profile: &Profile, verbose: bool) -> String {
    let energy = &profile.energy;
    let dm = &profile.day_master;
    let mut out = String::new();

    let _ = writeln!(out, "chart:      {}", profile.chart);
    let _ = writeln!(out, "day master: {} ({})", dm.stem, dm.element.name());
    let _ = writeln!(out, "season:     {:?}", energy.season);
    if !energy.void_branches.is_empty() {
        let voids: Vec<String> = energy.void_branches.iter().map(|b| b.to_string()).collect();
        let _ = writeln!(out, "void:       {}", voids.join(" "));
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "{:<8}{:>10}{:>9}  level", "element", "score", "pct");
    for e in ALL_ELEMENTS {
        let s = &energy.per_element[&e];
        let _ = writeln!(
            out,
            "{:<8}{:>10.2}{:>8.1}%  {}",
            e.name(),
            s.score,
            s.percentage,
            s.level.label()
        );
        if verbose {
            for entry in &s.log {
                let _ = writeln!(out, "          {:?} {:.3}  {}", entry.op, entry.delta, entry.reason);
            }
        }
    }
    let _ = writeln!(
        out,
        "total:      {:.2}   balance: {:.1}",
        energy.total_score, energy.balance_index
    );
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "strength:   {} (support {:.1}%)",
        dm.strength.label(),
        dm.share * 100.0
    );
    let _ = writeln!(out, "useful:     {}", join(&dm.useful));
    let _ = writeln!(out, "avoid:      {}", join(&dm.avoid));
    let _ = writeln!(out);

    out.push_str(&relations(profile));
    let _ = writeln!(out);

    let _ = writeln!(out, "diagnosis:");
    for line in &profile.diagnosis {
        let _ = writeln!(out, "  {line}");
    }
    for note in &energy.notes {
        let _ = writeln!(out, "note: {note}");
    }
    out
}
