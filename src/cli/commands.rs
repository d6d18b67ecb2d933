use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::ROOT_ENV;

const VERSION: &str = env!("PROJTRACK_VERSION");

#[derive(Parser)]
#[command(
    name = "projtrack",
    version = VERSION,
    about = "File-based project, phase and task tracker with dependency-aware status",
    after_help = "\
STORE LAYOUT:
  projects/<project>/project.yaml
  projects/<project>/phases/<phase>/phase.yaml
  projects/<project>/phases/<phase>/tasks/<task>.yaml
  projects/<project>/tasks/<task>.yaml        (legacy flat mode)

ROOT:
  --root, then PROJTRACK_ROOT, then store_root from .projtrack/config.json,
  then ~/Dropbox/project-management.

EXIT CODES:
  0  Success
  1  Error (validation, not found, rejected transition, store failure)

STATUS RULES:
  todo -> in_progress -> [review ->] done. `done` is terminal.
  A todo task is blocked while any dependency is not done; blocked is never stored.
  Dependency ids that match no task count as satisfied unless the binding sets
  \"unresolved_dependencies\": \"blocking\"."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Project id (defaults to the bound project)
    #[arg(long, global = true)]
    pub project: Option<String>,

    /// Store root directory
    #[arg(long, global = true, env = ROOT_ENV)]
    pub root: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Bind the current directory to a project
    #[command(after_help = "\
NOTE:
  Writes .projtrack/config.json in the current directory. Commands run here or
  in any subdirectory then default to this project. When --root is given it is
  recorded as the store root too.")]
    Bind {
        project_id: String,
        /// Overwrite an existing binding
        #[arg(long)]
        force: bool,
        /// Require review before a task can be marked done
        #[arg(long)]
        require_review: bool,
        /// Treat dependency ids that match no task as blocking
        #[arg(long)]
        block_unresolved: bool,
    },

    /// Project management
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Phase management
    #[command(subcommand)]
    Phase(PhaseCommands),

    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// List projects, phases or tasks
    #[command(subcommand)]
    List(ListCommands),

    /// Dependency-aware status reports
    #[command(subcommand)]
    Status(StatusCommands),

    /// Get the next ready task (highest priority, then lowest id)
    #[command(after_help = "\
NOTE:
  Without --claim: read-only.
  With    --claim: moves the task to in_progress through the normal transition rules.")]
    Next {
        /// Move the task to in_progress
        #[arg(long)]
        claim: bool,

        /// Assignee recorded on claim
        #[arg(long)]
        assignee: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Create a new project
    Create {
        /// Project id (letters, digits, hyphens, underscores)
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        owner: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Show project details and progress
    Show { id: String },
    /// Update project fields
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        owner: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// active | completed | paused | archived | cancelled
        #[arg(long)]
        status: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum PhaseCommands {
    /// Create a phase in the project
    Create {
        /// Phase id: P<number>[-suffix] or BUGS
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        goal: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        start_date: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        end_date: Option<String>,
    },
    /// Show phase details
    Show { id: String },
    /// Update phase fields
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        goal: Option<String>,
        /// planning | active | completed | cancelled
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        start_date: Option<String>,
        #[arg(long)]
        end_date: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Create a task
    Create {
        /// Task id: T<phase>.<n>[.<sub>|.B<n>][-suffix]
        id: String,
        /// Phase to create the task in (omit for legacy flat layout)
        #[arg(long)]
        phase: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// low | medium | high | critical
        #[arg(long, default_value = "medium")]
        priority: String,
        #[arg(long)]
        assignee: Option<String>,
        /// Add dependency: task runs after this task id
        #[arg(long)]
        after: Vec<String>,
    },
    /// Show task details with computed state
    Show { id: String },
    /// Update task fields; --status goes through the transition rules
    Update {
        id: String,
        /// todo | in_progress | review | done
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Start a task (todo → in_progress)
    Start { id: String },
    /// Complete a task (→ done)
    Done { id: String },
    /// Manage task dependencies
    #[command(subcommand)]
    Dep(DepCommands),
}

#[derive(Subcommand)]
pub enum DepCommands {
    /// Add a dependency
    Add {
        /// Task ID
        id: String,
        /// Dependency task ID
        dep_id: String,
    },
    /// Remove a dependency
    Remove {
        /// Task ID
        id: String,
        /// Dependency task ID
        dep_id: String,
    },
}

#[derive(Subcommand)]
pub enum ListCommands {
    /// All projects in the store
    Projects,
    /// Phases of the project
    Phases,
    /// Tasks of the project
    Tasks {
        #[arg(long)]
        phase: Option<String>,
        /// Filter by stored status, or `blocked` / `ready`
        #[arg(long)]
        status: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum StatusCommands {
    /// Counts, blocked and ready tasks for one project
    Project {
        /// Project id (defaults to --project or the bound project)
        project_id: Option<String>,
        #[arg(long)]
        phase: Option<String>,
    },
    /// Blocked tasks and what blocks them (all projects without --project)
    Blocked {
        #[arg(long)]
        phase: Option<String>,
    },
    /// Each task's dependencies and their status (all projects without --project)
    Dependencies {
        #[arg(long)]
        phase: Option<String>,
    },
    /// Tasks that can be worked on now (all projects without --project)
    Active {
        #[arg(long)]
        phase: Option<String>,
    },
}
