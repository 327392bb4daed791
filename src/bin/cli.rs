use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use gantt_engine::logging::{LogLevel, init_logging};
use gantt_engine::{
    DependencyType, EngineConfig, MemoryStore, ProjectSchedule, ScheduleEngine, TaskStore,
    export_schedule_to_csv, load_snapshot_from_json,
};

#[derive(Debug, Parser)]
#[command(name = "gantt-engine", about = "Schedule a project snapshot and inspect its dependency graph")]
struct CliArgs {
    /// Engine configuration (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute dates, slack and the critical path.
    Schedule {
        #[arg(long)]
        snapshot: PathBuf,
        /// Also write the schedule rows to this CSV file.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Check whether a new dependency would be accepted.
    Validate {
        #[arg(long)]
        snapshot: PathBuf,
        #[arg(long)]
        pred: i64,
        #[arg(long)]
        succ: i64,
        #[arg(long = "type", default_value = "FS")]
        dependency_type: DependencyType,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        lag: i64,
    },
    /// Print the chart projection as JSON.
    Gantt {
        #[arg(long)]
        snapshot: PathBuf,
    },
    /// Print the weighted progress rollup and overdue tasks.
    Progress {
        #[arg(long)]
        snapshot: PathBuf,
        /// Reference date for overdue checks (defaults to today).
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_level);

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let engine = ScheduleEngine::new(config)?;

    match args.command {
        Command::Schedule { snapshot, csv } => {
            let (store, project_id) = open_snapshot(&snapshot)?;
            let graph = engine.load_graph(&store, project_id)?;
            let schedule = engine.schedule_graph(&store, &graph)?;
            println!("{}", schedule.summary(&graph).to_cli_summary());
            print_schedule_table(&store, &schedule)?;
            if let Some(path) = csv {
                let tasks = store.list_tasks(project_id)?;
                export_schedule_to_csv(&schedule, &tasks, &path)?;
                println!("Schedule written to {}", path.display());
            }
        }
        Command::Validate {
            snapshot,
            pred,
            succ,
            dependency_type,
            lag,
        } => {
            let (store, project_id) = open_snapshot(&snapshot)?;
            let outcome =
                engine.validate_new_dependency(&store, project_id, pred, succ, dependency_type, lag)?;
            println!("{}", serde_json::to_string(&outcome)?);
        }
        Command::Gantt { snapshot } => {
            let (store, project_id) = open_snapshot(&snapshot)?;
            let schedule = engine.compute_schedule(&store, project_id)?;
            let projection = engine.project_to_gantt(&store, &schedule)?;
            println!("{}", serde_json::to_string_pretty(&projection)?);
        }
        Command::Progress { snapshot, today } => {
            let (store, project_id) = open_snapshot(&snapshot)?;
            let schedule = engine.compute_schedule(&store, project_id)?;
            let today = today.unwrap_or_else(|| chrono::Local::now().date_naive());
            let summary = engine.progress_summary(&store, &schedule, today)?;
            let overdue = summary
                .overdue
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            println!(
                "progress={:.1}%, not_started={}, in_progress={}, completed={}, overdue=[{}]",
                summary.weighted_percent,
                summary.not_started,
                summary.in_progress,
                summary.completed,
                overdue
            );
        }
    }

    Ok(())
}

fn open_snapshot(path: &Path) -> Result<(MemoryStore, i64)> {
    let snapshot = load_snapshot_from_json(path)
        .with_context(|| format!("loading snapshot {}", path.display()))?;
    let project_id = snapshot.project_id;
    Ok((snapshot.into_store()?, project_id))
}

fn print_schedule_table(store: &MemoryStore, schedule: &ProjectSchedule) -> Result<()> {
    println!(
        "{:>6}  {:<24}  {:<10}  {:<10}  {:>5}  {}",
        "id", "name", "start", "end", "slack", "critical"
    );
    for result in &schedule.tasks {
        let name = store
            .get_task(result.task_id)?
            .map(|task| task.name)
            .unwrap_or_default();
        println!(
            "{:>6}  {:<24}  {:<10}  {:<10}  {:>5}  {}",
            result.task_id,
            name,
            result.computed_start,
            result.computed_end,
            result.slack_days,
            if result.on_critical_path { "yes" } else { "" }
        );
    }
    Ok(())
}
