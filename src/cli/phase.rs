use chrono::NaiveDate;
use serde_json::json;

use crate::cli::commands::PhaseCommands;
use crate::cli::Context;
use crate::error::{Result, TrackerError};
use crate::graph::DependencyGraph;
use crate::models::{now_timestamp, Phase, PhaseStatus};
use crate::output;
use crate::report;
use crate::store::{loader, phase_repo};
use crate::validate;

pub fn run(cmd: PhaseCommands, ctx: &Context) -> i32 {
    let result = match cmd {
        PhaseCommands::Create {
            id,
            name,
            goal,
            start_date,
            end_date,
        } => run_create(
            ctx,
            &id,
            name.as_deref(),
            goal.as_deref(),
            start_date.as_deref(),
            end_date.as_deref(),
        ),
        PhaseCommands::Show { id } => run_show(ctx, &id),
        PhaseCommands::Update {
            id,
            name,
            goal,
            status,
            start_date,
            end_date,
        } => run_update(
            ctx,
            &id,
            PhaseEdits {
                name,
                goal,
                status,
                start_date,
                end_date,
            },
        ),
    };
    crate::cli::finish(result, ctx.json)
}

struct PhaseEdits {
    name: Option<String>,
    goal: Option<String>,
    status: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

fn parse_date(field: &str, value: &str) -> Result<String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| TrackerError::validation(format!("Invalid {field} '{value}'. Expected YYYY-MM-DD")))
}

fn run_create(
    ctx: &Context,
    id: &str,
    name: Option<&str>,
    goal: Option<&str>,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<()> {
    validate::validate_phase_id(id)?;
    let name = name.unwrap_or(id);
    validate::validate_text("name", name)?;
    if let Some(goal) = goal {
        validate::validate_text("goal", goal)?;
    }
    let start_date = start_date.map(|d| parse_date("start date", d)).transpose()?;
    let end_date = end_date.map(|d| parse_date("end date", d)).transpose()?;
    let project_id = ctx.project_id()?;

    let mut phase = Phase::new(id, &project_id, name, &now_timestamp());
    phase.goal = goal.map(str::to_string);
    phase.start_date = start_date;
    phase.end_date = end_date;
    let phase = phase_repo::create_phase(&ctx.store, &phase)?;

    if ctx.json {
        output::json::emit(&output::json::success(json!({
            "phase": output::json::phase_json(&phase)
        })));
    } else {
        println!("Created phase: {} ({}) in {}", phase.name, phase.id, phase.project_id);
    }
    Ok(())
}

fn run_show(ctx: &Context, id: &str) -> Result<()> {
    validate::validate_phase_id(id)?;
    let project_id = ctx.project_id()?;
    let phase = phase_repo::get_phase(&ctx.store, &project_id, id)?;

    let loaded = loader::load_project_tasks(&ctx.store, &project_id);
    let graph = DependencyGraph::build(&loaded.tasks, ctx.config.unresolved);
    let summary = report::project_summary(&project_id, &graph, &loaded.warnings, Some(id));

    if ctx.json {
        output::json::emit(&output::json::success_with_warnings(
            json!({
                "phase": output::json::phase_json(&phase),
                "progress": output::json::counts_json(&summary.counts)
            }),
            &loaded.warnings,
        ));
    } else {
        output::text::print_phase(&phase);
        println!();
        output::text::print_counts(&summary.counts);
        output::text::print_warnings(&loaded.warnings);
    }
    Ok(())
}

fn run_update(ctx: &Context, id: &str, edits: PhaseEdits) -> Result<()> {
    validate::validate_phase_id(id)?;
    let status = edits
        .status
        .as_deref()
        .map(|s| {
            PhaseStatus::from_str(s).ok_or_else(|| {
                TrackerError::validation(format!(
                    "Invalid phase status '{s}'. Expected one of: planning, active, completed, cancelled"
                ))
            })
        })
        .transpose()?;
    if edits.name.is_none()
        && edits.goal.is_none()
        && status.is_none()
        && edits.start_date.is_none()
        && edits.end_date.is_none()
    {
        return Err(TrackerError::validation(
            "Nothing to update. Pass at least one of --name, --goal, --status, --start-date, --end-date",
        ));
    }
    let project_id = ctx.project_id()?;

    let mut phase = phase_repo::get_phase(&ctx.store, &project_id, id)?;
    if let Some(name) = edits.name {
        validate::validate_text("name", &name)?;
        phase.name = name;
    }
    if let Some(goal) = edits.goal {
        validate::validate_text("goal", &goal)?;
        phase.goal = Some(goal);
    }
    if let Some(status) = status {
        phase.status = status;
    }
    if let Some(date) = edits.start_date {
        phase.start_date = Some(parse_date("start date", &date)?);
    }
    if let Some(date) = edits.end_date {
        phase.end_date = Some(parse_date("end date", &date)?);
    }
    phase.updated = now_timestamp();
    phase_repo::save_phase(&ctx.store, &phase)?;
    tracing::info!(project = %project_id, phase = %id, "updated phase");

    if ctx.json {
        output::json::emit(&output::json::success(json!({
            "phase": output::json::phase_json(&phase)
        })));
    } else {
        println!("Updated phase: {} ({})", phase.name, phase.id);
    }
    Ok(())
}
