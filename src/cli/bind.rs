use serde_json::json;

use crate::cli::Context;
use crate::config::{self, Binding};
use crate::error::{Result, TrackerError};
use crate::graph::UnresolvedPolicy;
use crate::output;
use crate::store::project_repo;
use crate::validate;

pub fn run(
    ctx: &Context,
    project_id: &str,
    force: bool,
    require_review: bool,
    block_unresolved: bool,
) -> i32 {
    let result = run_inner(ctx, project_id, force, require_review, block_unresolved);
    crate::cli::finish(result, ctx.json)
}

fn run_inner(
    ctx: &Context,
    project_id: &str,
    force: bool,
    require_review: bool,
    block_unresolved: bool,
) -> Result<()> {
    validate::validate_project_id(project_id)?;
    if !project_repo::project_exists(&ctx.store, project_id) {
        return Err(TrackerError::project_not_found(project_id));
    }

    let existing = ctx.cwd.join(config::BINDING_DIR).join(config::BINDING_FILE);
    if existing.is_file() && !force {
        return Err(TrackerError::already_exists(
            "Binding",
            &existing.display().to_string(),
        ));
    }

    let binding = Binding {
        project_id: Some(project_id.to_string()),
        store_root: ctx.root_flag.as_ref().map(|root| ctx.cwd.join(root)),
        require_review,
        unresolved_dependencies: if block_unresolved {
            UnresolvedPolicy::Blocking
        } else {
            UnresolvedPolicy::Satisfied
        },
    };
    let path = config::write_binding(&ctx.cwd, &binding)?;
    tracing::info!(project = %project_id, path = %path.display(), "bound directory");

    if ctx.json {
        output::json::emit(&output::json::success(json!({
            "path": path.to_string_lossy(),
            "project_id": project_id,
            "store_root": ctx.store.root().to_string_lossy(),
            "require_review": require_review,
            "unresolved_dependencies": binding.unresolved_dependencies.as_str()
        })));
    } else {
        println!("Bound {} to project {}", ctx.cwd.display(), project_id);
        println!("  Binding: {}", path.display());
        println!("  Store: {}", ctx.store.root().display());
    }
    Ok(())
}
