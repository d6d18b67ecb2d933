use serde_json::json;

use crate::cli::commands::StatusCommands;
use crate::cli::Context;
use crate::error::Result;
use crate::graph::DependencyGraph;
use crate::output;
use crate::report;
use crate::store::{loader, PartialRead};
use crate::validate;

pub fn run(cmd: StatusCommands, ctx: &Context) -> i32 {
    let result = match cmd {
        StatusCommands::Project { project_id, phase } => {
            run_project(ctx, project_id.as_deref(), phase.as_deref())
        }
        StatusCommands::Blocked { phase } => run_report(ctx, Report::Blocked, phase.as_deref()),
        StatusCommands::Dependencies { phase } => {
            run_report(ctx, Report::Dependencies, phase.as_deref())
        }
        StatusCommands::Active { phase } => run_report(ctx, Report::Active, phase.as_deref()),
    };
    crate::cli::finish(result, ctx.json)
}

#[derive(Clone, Copy)]
enum Report {
    Blocked,
    Dependencies,
    Active,
}

fn run_project(ctx: &Context, project_id: Option<&str>, phase: Option<&str>) -> Result<()> {
    if let Some(phase) = phase {
        validate::validate_phase_id(phase)?;
    }
    let project_id = match project_id {
        Some(id) => {
            ctx.require_project(id)?;
            id.to_string()
        }
        None => ctx.project_id()?,
    };

    let loaded = loader::load_project_tasks(&ctx.store, &project_id);
    let graph = DependencyGraph::build(&loaded.tasks, ctx.config.unresolved);
    let summary = report::project_summary(&project_id, &graph, &loaded.warnings, phase);
    for cycle in &summary.cycles {
        tracing::warn!(project = %project_id, cycle = %cycle.join(" -> "), "dependency cycle");
    }

    if ctx.json {
        output::json::emit(&output::json::success(output::json::to_value(&summary)?));
    } else {
        output::text::print_summary(&summary);
    }
    Ok(())
}

fn run_report(ctx: &Context, kind: Report, phase: Option<&str>) -> Result<()> {
    if let Some(phase) = phase {
        validate::validate_phase_id(phase)?;
    }
    let projects = ctx.project_scope()?;

    let mut reports = Vec::with_capacity(projects.len());
    let mut warnings: Vec<PartialRead> = Vec::new();
    for (i, project_id) in projects.iter().enumerate() {
        let loaded = loader::load_project_tasks(&ctx.store, project_id);
        let graph = DependencyGraph::build(&loaded.tasks, ctx.config.unresolved);
        warnings.extend(loaded.warnings.iter().cloned());

        if !ctx.json && i > 0 {
            println!();
        }
        match kind {
            Report::Blocked => {
                let r = report::blocked_report(project_id, &graph, phase);
                if !ctx.json {
                    output::text::print_blocked(&r);
                }
                reports.push(output::json::to_value(&r)?);
            }
            Report::Dependencies => {
                let r = report::dependency_report(project_id, &graph, phase);
                if !ctx.json {
                    output::text::print_dependencies(&r);
                }
                reports.push(output::json::to_value(&r)?);
            }
            Report::Active => {
                let r = report::active_report(project_id, &graph, phase);
                if !ctx.json {
                    output::text::print_active(&r);
                }
                reports.push(output::json::to_value(&r)?);
            }
        }
    }

    if ctx.json {
        output::json::emit(&output::json::success_with_warnings(
            json!({ "projects": reports }),
            &warnings,
        ));
    } else {
        if projects.is_empty() {
            println!("No projects found.");
        }
        output::text::print_warnings(&warnings);
    }
    Ok(())
}
