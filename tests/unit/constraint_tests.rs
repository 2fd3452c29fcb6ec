use std::collections::BTreeSet;

use agency::selection::{ConstraintResolver, ExcludedSkill, ScoredMap, ScoredSkill, SelectionSets};
use agency::test_utils::SkillBuilder;

fn ids(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn scored(entries: &[(&str, f64, &[&str])]) -> ScoredMap {
    entries
        .iter()
        .map(|(id, score, conflicts)| {
            (
                (*id).to_string(),
                ScoredSkill {
                    score: *score,
                    reasons: Vec::new(),
                    skill: SkillBuilder::new(id).conflicts(conflicts).build(),
                },
            )
        })
        .collect()
}

fn excluded(id: &str, winner: &str) -> ExcludedSkill {
    ExcludedSkill {
        id: id.to_string(),
        reason: format!("conflicts_with:{winner}"),
    }
}

#[test]
fn mutual_conflict_tie_keeps_the_target() {
    let mut map = scored(&[("a", 0.6, &["b"]), ("b", 0.6, &["a"])]);
    let sets = SelectionSets::default();
    let resolution = ConstraintResolver::new(&sets, 0.35).resolve(&mut map);

    assert_eq!(resolution.selected, ids(&["b"]));
    assert_eq!(resolution.excluded, vec![excluded("a", "b")]);
}

#[test]
fn strictly_lower_score_loses() {
    let mut map = scored(&[("a", 0.7, &["b"]), ("b", 0.6, &[])]);
    let sets = SelectionSets::default();
    let resolution = ConstraintResolver::new(&sets, 0.35).resolve(&mut map);

    assert_eq!(resolution.selected, ids(&["a"]));
    assert_eq!(resolution.excluded, vec![excluded("b", "a")]);
}

#[test]
fn protected_target_always_wins() {
    let mut map = scored(&[("a", 0.9, &["b"]), ("b", 0.1, &[])]);
    let sets = SelectionSets {
        required: ids(&["b"]),
        ..SelectionSets::default()
    };
    let resolution = ConstraintResolver::new(&sets, 0.35).resolve(&mut map);

    assert_eq!(resolution.selected, ids(&["b"]));
    assert_eq!(resolution.excluded, vec![excluded("a", "b")]);
}

#[test]
fn conflict_between_protected_drops_current() {
    let mut map = scored(&[("a", 0.9, &["b"]), ("b", 0.1, &[])]);
    let sets = SelectionSets {
        include: ids(&["a"]),
        guardrails: ids(&["b"]),
        ..SelectionSets::default()
    };
    let resolution = ConstraintResolver::new(&sets, 0.35).resolve(&mut map);
    assert_eq!(resolution.selected, ids(&["b"]));
}

#[test]
fn conflicts_with_unselected_ids_are_ignored() {
    let mut map = scored(&[("a", 0.9, &["b", "c"]), ("b", 0.1, &[]), ("c", 0.9, &[])]);
    let sets = SelectionSets {
        exclude: ids(&["c"]),
        ..SelectionSets::default()
    };
    let resolution = ConstraintResolver::new(&sets, 0.35).resolve(&mut map);

    // b is below the threshold, c is excluded before conflicts run.
    assert_eq!(resolution.selected, ids(&["a"]));
    assert!(resolution.excluded.is_empty());
}

#[test]
fn dropped_skills_do_not_initiate_checks() {
    // a loses to b on the tie; a's second conflict with c is never checked.
    let mut map = scored(&[("a", 0.5, &["b", "c"]), ("b", 0.5, &[]), ("c", 0.4, &[])]);
    let sets = SelectionSets::default();
    let resolution = ConstraintResolver::new(&sets, 0.35).resolve(&mut map);

    assert_eq!(resolution.selected, ids(&["b", "c"]));
    assert_eq!(resolution.excluded, vec![excluded("a", "b")]);
}

#[test]
fn included_ghost_is_admitted_at_min_score() {
    let mut map = ScoredMap::new();
    let sets = SelectionSets {
        include: ids(&["house-style"]),
        ..SelectionSets::default()
    };
    let resolution = ConstraintResolver::new(&sets, 0.5).resolve(&mut map);

    assert_eq!(resolution.selected, ids(&["house-style"]));
    let ghost = &map["house-style"];
    assert!((ghost.score - 0.5).abs() < f64::EPSILON);
    assert_eq!(ghost.reasons, vec!["missing_registry"]);
    assert_eq!(ghost.skill.name, "house-style");
}

#[test]
fn guardrails_are_never_ghosted() {
    let mut map = ScoredMap::new();
    let sets = SelectionSets {
        guardrails: ids(&["security-basics"]),
        inferred: ids(&["unknown"]),
        ..SelectionSets::default()
    };
    let resolution = ConstraintResolver::new(&sets, 0.35).resolve(&mut map);
    assert!(resolution.selected.is_empty());
    assert!(map.is_empty());
}

#[test]
fn min_score_extremes() {
    let map = scored(&[("zero", 0.0, &[]), ("one", 1.0, &[])]);
    let sets = SelectionSets::default();
    assert_eq!(ConstraintResolver::new(&sets, 0.0).admit(&map), ids(&["one", "zero"]));
    assert_eq!(ConstraintResolver::new(&sets, 1.0).admit(&map), ids(&["one"]));
}
