use std::process;

use anyhow::Context as _;
use clap::Parser;

use projtrack::cli::commands::{Cli, Commands};
use projtrack::cli::{self, Context};
use projtrack::config::Config;
use projtrack::error::TrackerError;

fn main() {
    let cli_args = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let json_output = cli_args.json;
    let cwd = match std::env::current_dir().context("cannot determine working directory") {
        Ok(cwd) => cwd,
        Err(e) => {
            eprintln!("error: {e:#}");
            process::exit(1);
        }
    };

    let config = match Config::resolve(cli_args.root.as_deref(), &cwd) {
        Ok(config) => config,
        Err(e) => process::exit(cli::finish(Err::<(), TrackerError>(e), json_output)),
    };
    let ctx = Context::new(config, json_output, cli_args.project, cli_args.root, cwd);

    let exit_code = match cli_args.command {
        Commands::Bind {
            project_id,
            force,
            require_review,
            block_unresolved,
        } => cli::bind::run(&ctx, &project_id, force, require_review, block_unresolved),
        Commands::Project(cmd) => cli::project::run(cmd, &ctx),
        Commands::Phase(cmd) => cli::phase::run(cmd, &ctx),
        Commands::Task(cmd) => cli::task::run(cmd, &ctx),
        Commands::List(cmd) => cli::list::run(cmd, &ctx),
        Commands::Status(cmd) => cli::status::run(cmd, &ctx),
        Commands::Next { claim, assignee } => cli::next::run(claim, assignee.as_deref(), &ctx),
    };

    process::exit(exit_code);
}
