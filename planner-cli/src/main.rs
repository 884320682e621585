use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scheduling_engine::{
    Absence, Employee, Engine, InMemoryHistory, LockInput, PlanRequest, Settings, ShiftAssignment,
    ShiftType, SolverStatus, Team,
};

/// Exit codes of the `plan` subcommand.
const EXIT_INFEASIBLE: u8 = 2;
const EXIT_VALIDATION_FAILED: u8 = 3;

#[derive(Parser, Debug)]
#[command(author, version, about = "Monthly shift roster planner")]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Plan a roster for a calendar window
    Plan {
        /// First day of the window (ISO date)
        #[arg(long)]
        start: NaiveDate,
        /// Last day of the window (ISO date)
        #[arg(long)]
        end: NaiveDate,
        /// JSON snapshot with employees, teams, absences and locks
        #[arg(long)]
        input: PathBuf,
        /// Solver time limit in seconds
        #[arg(long)]
        time_limit: Option<u64>,
        /// Parallel solver workers
        #[arg(long)]
        workers: Option<usize>,
        /// Solve and validate, but do not write the roster anywhere
        #[arg(long)]
        dry_run: bool,
        /// Where to write the roster JSON (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// The on-disk snapshot format consumed by `plan --input`.
#[derive(Debug, Deserialize)]
struct Snapshot {
    employees: Vec<Employee>,
    teams: Vec<Team>,
    #[serde(default)]
    shift_types: Option<Vec<ShiftType>>,
    #[serde(default)]
    absences: Vec<Absence>,
    #[serde(default)]
    locks: LockInput,
    /// Persisted assignments from previous periods, consulted only for
    /// the consecutive-day lookback.
    #[serde(default)]
    history: Vec<ShiftAssignment>,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "planner_cli=info,scheduling_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run() {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Plan {
            start,
            end,
            input,
            time_limit,
            workers,
            dry_run,
            output,
        } => plan(start, end, input, time_limit, workers, dry_run, output),
    }
}

fn plan(
    start: NaiveDate,
    end: NaiveDate,
    input: PathBuf,
    time_limit: Option<u64>,
    workers: Option<usize>,
    dry_run: bool,
    output: Option<PathBuf>,
) -> Result<ExitCode> {
    let raw = std::fs::read_to_string(&input)
        .with_context(|| format!("reading snapshot {}", input.display()))?;
    let snapshot: Snapshot =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", input.display()))?;

    let settings = Settings::new().unwrap_or_default();
    let mut engine = Engine::new(settings);
    let history = InMemoryHistory::new(snapshot.history);

    let report = engine.plan(
        PlanRequest {
            start,
            end,
            employees: snapshot.employees,
            teams: snapshot.teams,
            shift_types: snapshot.shift_types,
            absences: snapshot.absences,
            locks: snapshot.locks,
            time_limit_s: time_limit,
            workers,
        },
        &history,
    )?;

    match report.outcome.status {
        SolverStatus::Infeasible | SolverStatus::Unknown => {
            eprintln!("no roster produced: {:?}", report.outcome.status);
            for reason in &report.outcome.diagnostics.infeasibility_reasons {
                eprintln!("  - {reason}");
            }
            return Ok(ExitCode::from(EXIT_INFEASIBLE));
        }
        SolverStatus::Optimal | SolverStatus::Feasible => {}
    }

    if let Some(validation) = &report.validation {
        for warning in &validation.warnings {
            tracing::warn!("{warning}");
        }
        if !validation.is_valid() {
            eprintln!(
                "solver accepted a roster the validator rejects ({} violations):",
                validation.violations.len()
            );
            for violation in &validation.violations {
                eprintln!("  - {violation}");
            }
            return Ok(ExitCode::from(EXIT_VALIDATION_FAILED));
        }
    }

    let rendered = serde_json::to_string_pretty(&report.outcome)?;
    if dry_run {
        tracing::info!(
            assignments = report.outcome.assignments.len(),
            notifications = report.notifications.len(),
            "dry run: roster not persisted"
        );
    } else if let Some(path) = output {
        std::fs::write(&path, rendered).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(path = %path.display(), "roster written");
    } else {
        println!("{rendered}");
    }

    Ok(ExitCode::SUCCESS)
}
