use serde_json::json;

use crate::cli::commands::ListCommands;
use crate::cli::Context;
use crate::error::{Result, TrackerError};
use crate::graph::{Classification, DependencyGraph};
use crate::models::{Task, TaskStatus};
use crate::output;
use crate::store::{loader, phase_repo, project_repo};
use crate::validate;

pub fn run(cmd: ListCommands, ctx: &Context) -> i32 {
    let result = match cmd {
        ListCommands::Projects => run_projects(ctx),
        ListCommands::Phases => run_phases(ctx),
        ListCommands::Tasks { phase, status } => run_tasks(ctx, phase.as_deref(), status.as_deref()),
    };
    crate::cli::finish(result, ctx.json)
}

/// `--status` accepts stored statuses plus the derived `ready` / `blocked`.
enum StatusFilter {
    Stored(TaskStatus),
    Derived(Classification),
}

impl StatusFilter {
    fn parse(s: &str) -> Result<Self> {
        match s {
            "ready" => Ok(Self::Derived(Classification::Ready)),
            "blocked" => Ok(Self::Derived(Classification::Blocked)),
            _ => TaskStatus::from_str(s).map(Self::Stored).ok_or_else(|| {
                TrackerError::validation(format!(
                    "Invalid status filter '{s}'. Expected one of: todo, in_progress, review, done, ready, blocked"
                ))
            }),
        }
    }

    fn matches(&self, task: &Task, graph: &DependencyGraph<'_>) -> bool {
        match self {
            Self::Stored(status) => task.status == *status,
            Self::Derived(c) => graph.classification(&task.id) == Some(*c),
        }
    }
}

fn run_projects(ctx: &Context) -> Result<()> {
    let projects = project_repo::list_projects(&ctx.store)?;
    if ctx.json {
        let projects_json: Vec<_> = projects.iter().map(output::json::project_json).collect();
        output::json::emit(&output::json::success(json!({ "projects": projects_json })));
    } else {
        output::text::print_project_list(&projects);
    }
    Ok(())
}

fn run_phases(ctx: &Context) -> Result<()> {
    let project_id = ctx.project_id()?;
    let phases = phase_repo::list_phases(&ctx.store, &project_id)?;
    if ctx.json {
        let phases_json: Vec<_> = phases.iter().map(output::json::phase_json).collect();
        output::json::emit(&output::json::success(json!({
            "project_id": project_id,
            "phases": phases_json
        })));
    } else {
        output::text::print_phase_list(&phases);
    }
    Ok(())
}

fn run_tasks(ctx: &Context, phase: Option<&str>, status: Option<&str>) -> Result<()> {
    if let Some(phase) = phase {
        validate::validate_phase_id(phase)?;
    }
    let filter = status.map(StatusFilter::parse).transpose()?;
    let project_id = ctx.project_id()?;

    let loaded = loader::load_project_tasks(&ctx.store, &project_id);
    let graph = DependencyGraph::build(&loaded.tasks, ctx.config.unresolved);
    let tasks: Vec<Task> = loaded
        .tasks
        .iter()
        .filter(|t| phase.map_or(true, |p| t.phase_id.as_deref() == Some(p)))
        .filter(|t| filter.as_ref().map_or(true, |f| f.matches(t, &graph)))
        .cloned()
        .collect();

    if ctx.json {
        let tasks_json: Vec<_> = tasks
            .iter()
            .map(|t| {
                let mut v = output::json::task_summary(t);
                if let Some(c) = graph.classification(&t.id) {
                    v["classification"] = json!(c.as_str());
                }
                v
            })
            .collect();
        output::json::emit(&output::json::success_with_warnings(
            json!({
                "project_id": project_id,
                "tasks": tasks_json,
                "progress": output::json::counts_json(&graph.counts())
            }),
            &loaded.warnings,
        ));
    } else {
        output::text::print_task_list(&tasks);
        output::text::print_warnings(&loaded.warnings);
    }
    Ok(())
}
