use std::collections::BTreeSet;

use agency::config::AgencyConfig;
use agency::profile::Profile;
use agency::selection::{BudgetAllocator, ScoredMap, ScoredSkill, coverage_count, coverage_terms};
use agency::test_utils::{SkillBuilder, TestCase, run_table_tests};

fn ids(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn pool() -> ScoredMap {
    [
        ("alpha", 0.90, SkillBuilder::new("alpha").build()),
        ("beta", 0.80, SkillBuilder::new("beta").build()),
        ("gamma", 0.70, SkillBuilder::new("gamma").provides(&["observability", "tracing"]).build()),
        ("delta", 0.20, SkillBuilder::new("delta").build()),
        ("guard", 0.00, SkillBuilder::new("guard").build()),
    ]
    .into_iter()
    .map(|(id, score, skill)| {
        (
            id.to_string(),
            ScoredSkill {
                score,
                reasons: Vec::new(),
                skill,
            },
        )
    })
    .collect()
}

fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

#[test]
fn budget_allocation_table() -> Result<(), String> {
    let all = ["alpha", "beta", "gamma", "delta", "guard"];
    let cases = vec![
        TestCase::new(
            "fits_budget",
            (10usize, vec![], vec![]),
            names(&["alpha", "beta", "delta", "gamma", "guard"]),
        ),
        TestCase::new("top_two", (2, vec![], vec![]), names(&["alpha", "beta"])),
        TestCase::new(
            "protected_first",
            (2, vec!["guard"], vec![]),
            names(&["alpha", "guard"]),
        ),
        TestCase::new(
            // gamma: 0.70 + 0.10 does not beat beta's 0.80
            "coverage_bonus_below_next_score",
            (2, vec![], vec!["observability", "tracing"]),
            names(&["alpha", "beta"]),
        ),
        TestCase::new(
            "protected_plus_top_ranked",
            (3, vec!["guard"], vec!["observability", "tracing"]),
            names(&["alpha", "beta", "guard"]),
        ),
        TestCase::new(
            "protected_overflow_exceeds_budget",
            (1, vec!["guard", "delta"], vec![]),
            names(&["delta", "guard"]),
        ),
    ];

    run_table_tests(cases, |(max_skills, protected, terms)| {
        let map = pool();
        let selected = ids(&all);
        let kept = BudgetAllocator::new(max_skills).allocate(
            &selected,
            &map,
            &ids(&protected),
            &ids(&terms),
        );
        kept.into_iter().collect::<Vec<_>>()
    })
}

#[test]
fn coverage_lifts_lower_score_over_plain() {
    let mut map = pool();
    map.get_mut("gamma").unwrap().score = 0.75;
    let kept = BudgetAllocator::new(2).allocate(
        &ids(&["alpha", "beta", "gamma"]),
        &map,
        &BTreeSet::new(),
        &ids(&["observability", "tracing"]),
    );
    // gamma 0.85 > beta 0.80
    assert_eq!(kept, ids(&["alpha", "gamma"]));
}

#[test]
fn zero_budget_is_clamped_to_one() {
    assert_eq!(BudgetAllocator::new(0).max_skills(), 1);
}

#[test]
fn coverage_terms_come_from_capabilities_and_nonfunctional() {
    let config = AgencyConfig::from_yaml_str(
        "capabilities: [Distributed Tracing]\nrequirements:\n  nonfunctional: [observability, low-latency]\n",
    )
    .unwrap();
    let terms = coverage_terms(&Profile::from_config(&config));
    assert_eq!(
        terms,
        ids(&["distributed", "latency", "low", "observability", "tracing"])
    );

    let skill = SkillBuilder::new("otel")
        .tags(&["tracing"])
        .keywords(&["Observability"])
        .build();
    assert_eq!(coverage_count(&skill, &terms), 2);
}
