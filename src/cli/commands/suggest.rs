//! agency suggest - select skills for a project

use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use tracing::{info, warn};

use crate::app::{AppContext, context_root};
use crate::cli::output::{HumanLayout, emit_human, emit_robot, robot_ok};
use crate::config::{AgencyConfig, SelectionMode};
use crate::error::Result;
use crate::profile::{Profile, RepoScan};
use crate::quality::QualityIndex;
use crate::registry::SkillRegistry;
use crate::search::{CachedEmbeddings, HashEmbedder};
use crate::selection::{ArtifactPaths, Manifest, SkillSelector};
use crate::utils::format::truncate_string;

#[derive(Args, Debug)]
pub struct SuggestArgs {
    /// Project directory
    #[arg(long, default_value = ".")]
    pub project: PathBuf,

    /// Config file (default: agency.yaml, agency.yml or agency.toml in the project)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the policy's selection mode
    #[arg(long)]
    pub mode: Option<SelectionMode>,

    /// Score on keywords and roles only
    #[arg(long)]
    pub no_embeddings: bool,

    /// Use only the declared profile; skip detecting languages, frameworks
    /// and infra from the project tree
    #[arg(long)]
    pub no_scan: bool,

    /// Write profile, manifest and lock into <project>/.ai-context
    #[arg(long)]
    pub write: bool,
}

#[derive(Serialize)]
struct SuggestOutput<'a> {
    selected: &'a [String],
    manifest: &'a Manifest,
    #[serde(skip_serializing_if = "Option::is_none")]
    written: Option<WrittenPaths>,
}

#[derive(Serialize)]
struct WrittenPaths {
    profile: String,
    manifest: String,
    lock: String,
}

impl From<ArtifactPaths> for WrittenPaths {
    fn from(paths: ArtifactPaths) -> Self {
        Self {
            profile: paths.profile.display().to_string(),
            manifest: paths.manifest.display().to_string(),
            lock: paths.lock.display().to_string(),
        }
    }
}

pub fn run(ctx: &AppContext, args: &SuggestArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref(), &args.project)?;
    if let Some(mode) = args.mode {
        config.skill_policy.mode = mode;
    }

    let registry = SkillRegistry::load(&ctx.skills_dir())?;
    let quality = QualityIndex::load(&ctx.quality_path());
    let profile = if args.no_scan {
        Profile::from_config(&config)
    } else {
        Profile::build(&config, &RepoScan::scan(&args.project))
    };

    let embedder = CachedEmbeddings::new(HashEmbedder::default(), ctx.embedding_store());
    let mut selector = SkillSelector::new(&config, &registry)
        .with_profile(profile)
        .with_quality(&quality);
    if !args.no_embeddings {
        selector = selector.with_embeddings(&embedder);
    }
    let outcome = selector.run();

    let written = if args.write {
        Some(outcome.write_artifacts(&context_root(&args.project))?)
    } else {
        None
    };

    if ctx.robot_mode {
        let mut warnings = Vec::new();
        if registry.is_empty() {
            warnings.push(format!("no skill registry under {}", ctx.skills_dir().display()));
        }
        let output = SuggestOutput {
            selected: &outcome.selected,
            manifest: &outcome.manifest,
            written: written.map(WrittenPaths::from),
        };
        return emit_robot(&robot_ok(output).with_warnings(warnings));
    }

    let manifest = &outcome.manifest;
    let mut layout = HumanLayout::new();
    layout
        .title("Skill Selection")
        .kv("Project", manifest.project.as_deref().unwrap_or("-"))
        .kv("Mode", manifest.policy.mode.as_str())
        .kv(
            "Selected",
            &format!("{} (max {})", manifest.skills.len(), manifest.policy.max_skills),
        )
        .kv("Min score", &format!("{:.2}", manifest.policy.min_score))
        .blank()
        .section("Skills");
    if manifest.skills.is_empty() {
        layout.push_line("(none)");
    }
    for entry in &manifest.skills {
        let tags = if entry.required_by.is_empty() {
            String::new()
        } else {
            format!(" [{}]", entry.required_by.join(", "))
        };
        layout.push_line(format!(
            "{:<32} {:>7.4}{tags}",
            truncate_string(&entry.id, 32),
            entry.score
        ));
        if ctx.verbosity > 0 && !entry.reasons.is_empty() {
            layout.push_line(format!("    {}", entry.reasons.join(", ")));
        }
    }
    if !manifest.excluded.is_empty() {
        layout.blank().section("Excluded");
        for excluded in &manifest.excluded {
            layout.bullet(&format!("{} ({})", excluded.id, excluded.reason));
        }
    }
    if let Some(paths) = written {
        layout
            .blank()
            .kv("Manifest", &paths.manifest.display().to_string())
            .kv("Lock", &paths.lock.display().to_string());
    }
    emit_human(layout);
    Ok(())
}

/// Explicit path, else the project's config file, else defaults with
/// environment overrides.
fn load_config(explicit: Option<&Path>, project: &Path) -> Result<AgencyConfig> {
    if let Some(path) = explicit {
        return AgencyConfig::load(path);
    }
    if let Some(path) = AgencyConfig::locate(project) {
        info!(config = %path.display(), "using project config");
        return AgencyConfig::load(&path);
    }
    warn!(dir = %project.display(), "no project config found; using defaults");
    let mut config = AgencyConfig::default();
    config.apply_overrides(|key| std::env::var(key).ok())?;
    Ok(config.finalize())
}
