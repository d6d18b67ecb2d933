use serde_json::json;

use crate::cli::commands::ProjectCommands;
use crate::cli::Context;
use crate::error::{Result, TrackerError};
use crate::graph::DependencyGraph;
use crate::models::{now_timestamp, Project, ProjectStatus};
use crate::output;
use crate::store::{loader, phase_repo, project_repo};
use crate::validate;

pub fn run(cmd: ProjectCommands, ctx: &Context) -> i32 {
    let result = match cmd {
        ProjectCommands::Create {
            id,
            name,
            owner,
            description,
        } => run_create(ctx, &id, name.as_deref(), owner.as_deref(), description.as_deref()),
        ProjectCommands::Show { id } => run_show(ctx, &id),
        ProjectCommands::Update {
            id,
            name,
            owner,
            description,
            status,
        } => run_update(
            ctx,
            &id,
            name.as_deref(),
            owner.as_deref(),
            description.as_deref(),
            status.as_deref(),
        ),
    };
    crate::cli::finish(result, ctx.json)
}

fn run_create(
    ctx: &Context,
    id: &str,
    name: Option<&str>,
    owner: Option<&str>,
    description: Option<&str>,
) -> Result<()> {
    validate::validate_project_id(id)?;
    let name = name.unwrap_or(id);
    validate::validate_text("name", name)?;
    validate::validate_text("owner", owner.unwrap_or(""))?;
    validate::validate_text("description", description.unwrap_or(""))?;

    let project = Project::new(
        id,
        name,
        owner.unwrap_or(""),
        description.unwrap_or(""),
        &now_timestamp(),
    );
    let project = project_repo::create_project(&ctx.store, &project)?;

    if ctx.json {
        output::json::emit(&output::json::success(json!({
            "project": output::json::project_json(&project)
        })));
    } else {
        println!("Created project: {} ({})", project.name, project.id);
    }
    Ok(())
}

fn run_show(ctx: &Context, id: &str) -> Result<()> {
    validate::validate_project_id(id)?;
    let project = project_repo::get_project(&ctx.store, id)?;
    let phases = phase_repo::list_phases(&ctx.store, id)?;
    let loaded = loader::load_project_tasks(&ctx.store, id);
    let graph = DependencyGraph::build(&loaded.tasks, ctx.config.unresolved);
    let counts = graph.counts();

    if ctx.json {
        let phases_json: Vec<_> = phases.iter().map(output::json::phase_json).collect();
        output::json::emit(&output::json::success_with_warnings(
            json!({
                "project": output::json::project_json(&project),
                "phases": phases_json,
                "progress": output::json::counts_json(&counts)
            }),
            &loaded.warnings,
        ));
    } else {
        output::text::print_project(&project);
        println!("\nPhases:");
        output::text::print_phase_list(&phases);
        println!();
        output::text::print_counts(&counts);
        output::text::print_warnings(&loaded.warnings);
    }
    Ok(())
}

fn run_update(
    ctx: &Context,
    id: &str,
    name: Option<&str>,
    owner: Option<&str>,
    description: Option<&str>,
    status: Option<&str>,
) -> Result<()> {
    validate::validate_project_id(id)?;
    let status = status
        .map(|s| {
            ProjectStatus::from_str(s).ok_or_else(|| {
                TrackerError::validation(format!(
                    "Invalid project status '{s}'. Expected one of: active, completed, paused, archived, cancelled"
                ))
            })
        })
        .transpose()?;
    if name.is_none() && owner.is_none() && description.is_none() && status.is_none() {
        return Err(TrackerError::validation(
            "Nothing to update. Pass at least one of --name, --owner, --description, --status",
        ));
    }

    let mut project = project_repo::get_project(&ctx.store, id)?;
    if let Some(name) = name {
        validate::validate_text("name", name)?;
        project.name = name.to_string();
    }
    if let Some(owner) = owner {
        validate::validate_text("owner", owner)?;
        project.owner = owner.to_string();
    }
    if let Some(description) = description {
        validate::validate_text("description", description)?;
        project.description = description.to_string();
    }
    if let Some(status) = status {
        project.status = status;
    }
    project.updated = now_timestamp();
    project_repo::save_project(&ctx.store, &project)?;
    tracing::info!(project = %id, "updated project");

    if ctx.json {
        output::json::emit(&output::json::success(json!({
            "project": output::json::project_json(&project)
        })));
    } else {
        println!("Updated project: {} ({})", project.name, project.id);
    }
    Ok(())
}
