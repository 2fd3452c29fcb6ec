use agency::AgencyError;
use agency::config::{AgencyConfig, SelectionMode};
use agency::test_utils::{HqFixture, TestCase, run_table_tests};

use crate::fixture_path;

#[test]
fn config_policy_from_fixture() -> Result<(), String> {
    let cases = vec![
        TestCase::new(
            "yaml",
            "configs/payments.yaml",
            (SelectionMode::SafetyFirst, 8usize, 0.3f64, vec!["legacy-orm".to_string()]),
        ),
        TestCase::new(
            // max_skills 0 -> 1, min_score 1.7 -> 1.0
            "toml_clamped",
            "configs/minimal.toml",
            (SelectionMode::Minimal, 1usize, 1.0f64, vec![]),
        ),
    ];

    run_table_tests(cases, |relative| {
        let config = AgencyConfig::load(&fixture_path(relative)).expect("load config");
        let policy = config.skill_policy;
        (policy.mode, policy.max_skills, policy.min_score, policy.exclude_skills)
    })
}

#[test]
fn yaml_fixture_fields() {
    let config = AgencyConfig::load(&fixture_path("configs/payments.yaml")).expect("load config");
    assert_eq!(config.project_name.as_deref(), Some("payments-api"));
    assert_eq!(config.required_skill_names(), vec!["python-basics", "api-design"]);
    assert_eq!(config.required_agent_names(), vec!["backend-dev", "architect"]);
    assert_eq!(config.project_profile.tech_stack.frameworks, vec!["fastapi"]);
    assert_eq!(config.requirements.nonfunctional, vec!["auditability", "latency"]);
    assert!((config.skill_policy.weights.embedding - 0.45).abs() < f64::EPSILON);
    assert!((config.skill_policy.boosts.guardrail - 0.20).abs() < f64::EPSILON);
}

#[test]
fn toml_guardrails_replace_defaults() {
    let config = AgencyConfig::load(&fixture_path("configs/minimal.toml")).expect("load config");
    let guardrails: Vec<_> = config.skill_policy.guardrail_ids().into_iter().collect();
    assert_eq!(guardrails, vec!["testing-basics"]);
}

#[test]
fn discover_prefers_yaml_and_reports_missing() {
    let fixture = HqFixture::new();
    let err = AgencyConfig::discover(&fixture.project_root).unwrap_err();
    assert!(matches!(err, AgencyError::MissingConfig(_)));

    fixture.write_project_file("agency.toml", "project_name = \"from-toml\"\n");
    fixture.write_project_file("agency.yaml", "project_name: from-yaml\n");
    let config = AgencyConfig::discover(&fixture.project_root).expect("discover config");
    assert_eq!(config.project_name.as_deref(), Some("from-yaml"));
}

#[test]
fn malformed_config_is_a_config_error() {
    let fixture = HqFixture::new();
    let path = fixture.write_project_file("agency.yaml", "skill_policy: [not, a, map]\n");
    let err = AgencyConfig::load(&path).unwrap_err();
    assert!(matches!(err, AgencyError::Config(_)));
}

#[test]
fn nan_min_score_falls_back_to_default() {
    let config = AgencyConfig::from_yaml_str("skill_policy:\n  min_score: .nan\n").unwrap();
    assert!((config.skill_policy.min_score - 0.35).abs() < f64::EPSILON);
}

#[test]
fn mode_parsing_table() -> Result<(), String> {
    let cases = vec![
        TestCase::new("snake", "safety_first", Some(SelectionMode::SafetyFirst)),
        TestCase::new("kebab", "Safety-First", Some(SelectionMode::SafetyFirst)),
        TestCase::new("minimal", " minimal ", Some(SelectionMode::Minimal)),
        TestCase::new("unknown", "reckless", None),
    ];
    run_table_tests(cases, |raw| raw.parse::<SelectionMode>().ok())
}
