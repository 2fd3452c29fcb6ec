//! agency quality - aggregate feedback into the quality index

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_robot, robot_ok};
use crate::error::Result;
use crate::quality::QualityIndex;

#[derive(Args, Debug)]
pub struct QualityArgs {
    /// Show the index without consuming pending feedback
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Serialize)]
struct QualityRow {
    skill_id: String,
    use_count: u32,
    helpful_count: u32,
    harmful_count: u32,
    helpful_ratio: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    adjustment: Option<&'static str>,
}

#[derive(Serialize)]
struct QualityOutput {
    applied: usize,
    skills: Vec<QualityRow>,
}

pub fn run(ctx: &AppContext, args: &QualityArgs) -> Result<()> {
    let index_path = ctx.quality_path();
    let applied = if args.dry_run {
        0
    } else {
        ctx.feedback_log()
            .aggregate_into(&index_path, &ctx.archive_dir())?
    };

    let index = QualityIndex::load(&index_path);
    let skills: Vec<QualityRow> = index
        .skills
        .iter()
        .map(|(skill_id, record)| QualityRow {
            skill_id: skill_id.clone(),
            use_count: record.use_count,
            helpful_count: record.helpful_count,
            harmful_count: record.harmful_count,
            helpful_ratio: record.helpful_ratio(),
            adjustment: record.adjustment().map(|adj| adj.reason()),
        })
        .collect();

    if ctx.robot_mode {
        return emit_robot(&robot_ok(QualityOutput { applied, skills }));
    }

    let mut layout = HumanLayout::new();
    layout
        .title("Skill Quality")
        .kv("Events applied", &applied.to_string())
        .kv("Skills tracked", &skills.len().to_string())
        .blank();
    for row in &skills {
        layout.push_line(format!(
            "{:<32} uses {:>4}  helpful {:>4}  harmful {:>4}  ratio {:.2}{}",
            row.skill_id,
            row.use_count,
            row.helpful_count,
            row.harmful_count,
            row.helpful_ratio,
            row.adjustment.map(|adj| format!("  {adj}")).unwrap_or_default()
        ));
    }
    emit_human(layout);
    Ok(())
}
