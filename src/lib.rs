// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod env;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod tasks;
pub mod types;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::load_and_validate;
use crate::engine::Scheduler;
use crate::env::join_paths;
use crate::exec::{CommandRunner, ProcessRunner};
use crate::types::TaskName;

/// High-level entry point used by `main.rs`. Returns the process exit code.
///
/// This wires together:
/// - config loading
/// - Ctrl-C handling (kills and reaps the running child)
/// - the process runner, environment registry and scheduler
pub async fn run(args: CliArgs) -> Result<i32> {
    let cfg = load_and_validate(&args.config)?;
    let mode = args.mode();
    let requested = args.task_names()?;

    // Ctrl-C → the runner kills its current child and the run stops.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        info!("interrupt received; stopping");
        let _ = shutdown_tx.send(true);
    });

    let runner = Arc::new(ProcessRunner::new(shutdown_rx));
    let mut scheduler = Scheduler::new(&cfg, runner, mode, args.targets.clone())?;

    let tasks = if requested.is_empty() {
        scheduler.default_tasks().to_vec()
    } else {
        requested
    };

    if args.envs {
        print_environments(&scheduler).await?;
        return Ok(0);
    }

    if args.list {
        print_plan(&scheduler, &tasks, &args.extra)?;
        return Ok(0);
    }

    info!(?tasks, %mode, "running tasks");
    let report = if args.tasks.is_empty() && args.extra.is_empty() {
        scheduler.run_default_suite().await
    } else {
        scheduler.run_named(&tasks, &args.extra).await
    };

    eprint!("{report}");
    Ok(report.exit_code())
}

/// `--list`: every step each task would run, wrapped as it will execute.
fn print_plan<R: CommandRunner>(
    scheduler: &Scheduler<R>,
    tasks: &[TaskName],
    extra: &[String],
) -> Result<()> {
    let inv = scheduler.invocation(extra);
    let placeholder = Path::new("<requirements>");

    println!("venvtask plan ({} mode)", inv.mode);
    for name in tasks {
        let graph = scheduler.graph();
        let reqs = graph.needs_requirements(*name).then_some(placeholder);
        let task = graph.build(*name, &inv, reqs)?;

        match &task.environment {
            Some(env) => println!("  - {name} (env: {env})"),
            None => println!("  - {name}"),
        }
        if task.steps.is_empty() {
            println!("      (no steps)");
        }
        for step in &task.steps {
            let mut flags = Vec::new();
            if step.tolerate_failure {
                flags.push("tolerated");
            }
            if !step.stream {
                flags.push("quiet");
            }
            let spec = scheduler.command_for(&task, step);
            if flags.is_empty() {
                println!("      {spec}");
            } else {
                println!("      {spec}  [{}]", flags.join(", "));
            }
        }
    }

    debug!("plan printed (no execution)");
    Ok(())
}

/// `--envs`: what the environment manager reports for the default set.
async fn print_environments<R: CommandRunner>(scheduler: &Scheduler<R>) -> Result<()> {
    let registry = scheduler.registry();
    let names = registry.defined_environments().await?;
    let paths = registry.resolve_requirements_paths(&names).await?;
    let extension = registry.resolve_file_extension(&names).await?;

    println!("environments ({}):", names.len());
    for name in &names {
        match paths.get(name) {
            Some(path) => println!("  - {name}: {}", path.display()),
            None => println!("  - {name}"),
        }
    }
    println!("requirements: {}", join_paths(&paths));
    if let Some(ext) = extension {
        println!("file extension: {ext}");
    }
    Ok(())
}
