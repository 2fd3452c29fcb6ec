//! Unit tests for the manifest, the lock and artifact writing.

use std::collections::BTreeSet;

use agency::config::{AgencyConfig, SelectionMode};
use agency::profile::Profile;
use agency::registry::SkillRegistry;
use agency::selection::{
    LOCK_FILE, MANIFEST_FILE, Manifest, ManifestInputs, ScoredMap, SelectionOutcome,
    SelectionSets, SkillLock, SkillSelector,
};
use agency::test_utils::logging::capture_logs;
use serde_json::Value;
use tempfile::TempDir;
use tracing::Level;

use crate::fixture_path;

const PINNED: &str = "2026-03-01T12:00:00.000000";

fn payments_outcome() -> SelectionOutcome {
    let config = AgencyConfig::load(&fixture_path("configs/payments.yaml")).expect("load config");
    let registry =
        SkillRegistry::load_file(&fixture_path("registry/skills.index.json")).expect("load registry");
    SkillSelector::new(&config, &registry).generated_at(PINNED).run()
}

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn write_artifacts_creates_all_three_files() {
    let dir = TempDir::new().unwrap();
    let context_root = dir.path().join(".ai-context");
    let paths = payments_outcome().write_artifacts(&context_root).unwrap();

    assert_eq!(paths.manifest, context_root.join(MANIFEST_FILE));
    assert_eq!(paths.lock, context_root.join(LOCK_FILE));
    assert_eq!(paths.profile, context_root.join("project.profile.json"));
    for path in [&paths.profile, &paths.manifest, &paths.lock] {
        assert!(path.is_file(), "{} missing", path.display());
    }
}

#[test]
fn manifest_json_shape() {
    let dir = TempDir::new().unwrap();
    let paths = payments_outcome().write_artifacts(dir.path()).unwrap();
    let manifest = read_json(&paths.manifest);

    assert_eq!(manifest["project"], "payments-api");
    assert_eq!(manifest["generated_at"], PINNED);
    assert_eq!(manifest["policy"]["mode"], "safety_first");
    assert_eq!(manifest["policy"]["max_skills"], 8);
    assert_eq!(manifest["excluded"], Value::Array(Vec::new()));
    assert!(manifest["profile_snapshot"].is_object());

    let ids: Vec<&str> = manifest["skills"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["id"].as_str().unwrap())
        .collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);

    for entry in manifest["skills"].as_array().unwrap() {
        assert!(entry["score"].is_number());
        assert!(entry["reasons"].is_array());
        assert!(entry["required_by"].is_array());
    }
}

#[test]
fn manifest_round_trips_through_serde() {
    let outcome = payments_outcome();
    let raw = serde_json::to_string(&outcome.manifest).unwrap();
    let parsed: Manifest = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed.skill_ids(), outcome.manifest.skill_ids());
    assert_eq!(parsed.policy.mode, SelectionMode::SafetyFirst);
}

#[test]
fn lock_pins_registry_versions() {
    let outcome = payments_outcome();
    let lock = SkillLock::from_manifest(&outcome.manifest, &outcome.scored);

    assert_eq!(lock.generated_at, PINNED);
    assert_eq!(lock.skills.len(), outcome.manifest.skills.len());
    let python = lock.skills.iter().find(|s| s.id == "python-basics").unwrap();
    assert_eq!(python.version, "1.2.0");
    let api = lock.skills.iter().find(|s| s.id == "api-design").unwrap();
    assert_eq!(api.version, "0.0.0");
}

#[test]
fn scores_are_rounded_to_four_places() {
    let outcome = payments_outcome();
    for entry in &outcome.manifest.skills {
        let scaled = entry.score * 10_000.0;
        assert!((scaled - scaled.round()).abs() < 1e-6, "{} = {}", entry.id, entry.score);
    }
}

#[test]
fn selected_id_without_score_is_left_out() {
    let config = AgencyConfig::default();
    let profile = Profile::from_config(&config);
    let sets = SelectionSets::from_config(&config, BTreeSet::new());
    let scored = ScoredMap::new();
    let selected: BTreeSet<String> = std::iter::once("phantom".to_string()).collect();

    let (manifest, logs) = capture_logs(|| {
        Manifest::build(ManifestInputs {
            profile: &profile,
            policy: &config.skill_policy,
            sets: &sets,
            scored: &scored,
            selected: &selected,
            excluded: &[],
            generated_at: PINNED,
        })
    });

    assert!(manifest.skills.is_empty());
    assert!(manifest.project.is_none());
    assert!(logs.has_warnings());
    assert!(!logs.at_level(Level::WARN).is_empty());
}
