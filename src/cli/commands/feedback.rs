//! agency feedback - record a skill outcome

use clap::Args;
use tracing::debug;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_robot, robot_ok};
use crate::error::{AgencyError, Result};
use crate::quality::{FeedbackEvent, FeedbackVerdict};
use crate::utils::text::normalize_id;

#[derive(Args, Debug)]
pub struct FeedbackArgs {
    /// Skill id
    pub skill: String,

    /// helpful, harmful or neutral
    pub result: String,

    /// Project the skill was used in
    #[arg(long, default_value = "")]
    pub project: String,

    /// Free-form note
    #[arg(long, default_value = "")]
    pub note: String,
}

pub fn run(ctx: &AppContext, args: &FeedbackArgs) -> Result<()> {
    let skill_id = normalize_id(&args.skill);
    if skill_id.is_empty() {
        return Err(AgencyError::ValidationFailed("skill id must not be empty".to_string()));
    }
    let verdict = FeedbackVerdict::parse_lenient(&args.result);
    if verdict == FeedbackVerdict::Neutral && !args.result.trim().eq_ignore_ascii_case("neutral") {
        debug!(result = %args.result, "unrecognized feedback result recorded as neutral");
    }

    let event = FeedbackEvent::new(&args.project, &skill_id, verdict, &args.note);
    let log = ctx.feedback_log();
    log.append(&event)?;

    if ctx.robot_mode {
        return emit_robot(&robot_ok(&event));
    }
    let mut layout = HumanLayout::new();
    layout
        .title("Feedback recorded")
        .kv("Skill", &event.skill_id)
        .kv("Result", event.result.as_str())
        .kv("Context", &event.context_hash)
        .kv("Log", &log.path().display().to_string());
    emit_human(layout);
    Ok(())
}
