use agency::AgencyError;
use agency::registry::{LEGACY_REGISTRY_FILE, RiskLevel, SkillRegistry};
use agency::test_utils::{HqFixture, SkillBuilder, TestCase, run_table_tests};

use crate::fixture_path;

fn fixture_registry() -> SkillRegistry {
    SkillRegistry::load_file(&fixture_path("registry/skills.index.json")).expect("load registry")
}

#[test]
fn fixture_registry_is_decoded_leniently() {
    let registry = fixture_registry();
    // one entry without id and one duplicate are dropped
    assert_eq!(registry.len(), 7);

    let python = registry.get("python-basics").unwrap();
    assert_eq!(python.description, "Idiomatic python for services");
    assert_eq!(python.version, "1.2.0");

    let api = registry.get("api-design").unwrap();
    assert_eq!(api.name, "Api Design");
    assert_eq!(api.version, "0.0.0");
    assert_eq!(api.requires, vec!["python-basics", "http-fundamentals"]);

    let testing = registry.get("testing-basics").unwrap();
    assert!(testing.guardrail);
    assert!(testing.tags.contains("testing"));

    assert_eq!(registry.get("security-basics").unwrap().risk_level, RiskLevel::High);
    assert_eq!(registry.get("modern-orm").unwrap().risk_level, RiskLevel::Low);
}

#[test]
fn registry_order_is_preserved() {
    let ids: Vec<_> = fixture_registry().iter().map(|s| s.id.clone()).collect();
    assert_eq!(ids[0], "python-basics");
    assert_eq!(ids[6], "modern-orm");
}

#[test]
fn ids_fold_case_on_insert_and_lookup() {
    let registry = SkillRegistry::from_json_str(
        r#"{"skills": [{"id": "Docker-Basics", "description": "first"}, {"id": "docker-basics", "description": "second"}]}"#,
    )
    .unwrap();

    assert_eq!(registry.len(), 1);
    let skill = registry.get(" DOCKER-basics ").unwrap();
    assert_eq!(skill.id, "docker-basics");
    assert_eq!(skill.description, "first");
    assert!(registry.contains("Docker-Basics"));
}

#[test]
fn load_falls_back_to_legacy_file_then_empty() {
    let fixture = HqFixture::new();
    let skills_dir = fixture.hq_root.join("skills");
    assert!(SkillRegistry::load(&skills_dir).unwrap().is_empty());

    std::fs::write(
        skills_dir.join(LEGACY_REGISTRY_FILE),
        r#"[{"id": "legacy-skill"}]"#,
    )
    .unwrap();
    assert!(SkillRegistry::load(&skills_dir).unwrap().contains("legacy-skill"));

    fixture.write_registry(&[SkillBuilder::new("indexed-skill").build()]);
    let registry = SkillRegistry::load(&skills_dir).unwrap();
    assert!(registry.contains("indexed-skill"));
    assert!(!registry.contains("legacy-skill"));
}

#[test]
fn non_registry_json_is_rejected() {
    let err = SkillRegistry::from_json_str(r#"{"entries": []}"#).unwrap_err();
    assert!(matches!(err, AgencyError::Registry(_)));
    let err = SkillRegistry::from_json_str("42").unwrap_err();
    assert!(matches!(err, AgencyError::Registry(_)));
}

#[test]
fn inference_search_table() -> Result<(), String> {
    let cases = vec![
        TestCase::new(
            "name_beats_keyword",
            "ledger python",
            vec![("ledger-patterns".to_string(), 16u32), ("python-basics".to_string(), 11)],
        ),
        TestCase::new(
            "description_substring",
            "versioning",
            vec![("api-design".to_string(), 1)],
        ),
        TestCase::new("empty_query", "   ", vec![]),
        TestCase::new("no_match", "kubernetes", vec![]),
    ];

    run_table_tests(cases, |query| {
        fixture_registry()
            .search(query, 5)
            .into_iter()
            .map(|found| (found.id, found.score))
            .collect::<Vec<_>>()
    })
}

#[test]
fn inference_respects_top_k_and_registry_order() {
    let registry = SkillRegistry::from_skills([
        SkillBuilder::new("b-skill").description("docker images").build(),
        SkillBuilder::new("a-skill").description("docker compose").build(),
        SkillBuilder::new("c-skill").description("docker swarm").build(),
    ]);
    let found: Vec<_> = registry.search("docker", 2).into_iter().map(|m| m.id).collect();
    assert_eq!(found, vec!["b-skill", "a-skill"]);
}
