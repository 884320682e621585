use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use shared::EngineResult;

use crate::domain::{Absence, Employee, LockInput, ShiftAssignment, ShiftCatalog, ShiftType, Team};
use crate::lookback::{collect_lookback, ShiftHistory};
use crate::model::ModelBuilder;
use crate::notifications::{Notification, NotificationQueue};
use crate::settings::Settings;
use crate::solver::{PlanOutcome, SolveLimits, SolverDriver};
use crate::springer::{handle_absence_after_scheduling, RangeLock, ReplacementOutcome};
use crate::validation::{validate_plan, ValidationInput, ValidationResult};
use crate::window::PlanningWindow;

/// The operator inputs of one planning run: the window, the entity
/// snapshots, the absence pool and the four lock dictionaries.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanRequest {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub employees: Vec<Employee>,
    pub teams: Vec<Team>,
    /// `None` selects the standard shift catalog.
    #[serde(default)]
    pub shift_types: Option<Vec<ShiftType>>,
    #[serde(default)]
    pub absences: Vec<Absence>,
    #[serde(default)]
    pub locks: LockInput,
    #[serde(default)]
    pub time_limit_s: Option<u64>,
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Outcome of a planning run: the solver artifacts, the independent
/// validation verdict and the notifications queued along the way.
#[derive(Debug)]
pub struct PlanReport {
    pub outcome: PlanOutcome,
    pub validation: Option<ValidationResult>,
    pub notifications: Vec<Notification>,
}

impl PlanReport {
    /// A roster is usable only when the solver produced one and the
    /// validator accepted it.
    pub fn is_accepted(&self) -> bool {
        self.outcome.has_roster()
            && self
                .validation
                .as_ref()
                .map(|v| v.is_valid())
                .unwrap_or(false)
    }
}

/// The scheduling engine. Single-threaded at the driver level; only the
/// solve call blocks, bounded by its time limit.
pub struct Engine {
    settings: Settings,
    queue: NotificationQueue,
    range_lock: RangeLock,
}

impl Engine {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            queue: NotificationQueue::new(),
            range_lock: RangeLock::new(),
        }
    }

    pub fn with_default_settings() -> Self {
        Self::new(Settings::default())
    }

    /// Produces a roster for the requested window: expand → consolidate
    /// locks → build model → solve → validate. The validator observes
    /// the exact solution the driver extracted.
    pub fn plan(
        &mut self,
        request: PlanRequest,
        history: &dyn ShiftHistory,
    ) -> EngineResult<PlanReport> {
        let window = PlanningWindow::expand(request.start, request.end)?;
        let catalog = match request.shift_types {
            Some(types) => ShiftCatalog::new(types)?,
            None => ShiftCatalog::standard(),
        };

        let lookback = collect_lookback(
            history,
            window.extended_start,
            catalog.max_consecutive_limit(),
        );

        let model = ModelBuilder::build(
            window,
            request.employees,
            request.teams,
            catalog,
            request.absences,
            &request.locks,
            lookback,
            self.settings.clone(),
        )?;

        for conflict in &model.lock_warnings {
            self.queue.trigger_locked_assignment_conflict(conflict);
        }

        let limits = SolveLimits {
            time_limit: Duration::from_secs(
                request
                    .time_limit_s
                    .unwrap_or(self.settings.solver.time_limit_s),
            ),
            workers: request.workers.unwrap_or(self.settings.solver.workers),
        };

        let outcome = SolverDriver::new(&model).solve(limits);

        let validation = if outcome.has_roster() {
            Some(validate_plan(&ValidationInput {
                outcome: &outcome,
                employees: &model.context.employees,
                teams: &model.context.teams,
                catalog: &model.context.catalog,
                absences: &model.context.absences,
                window: &model.context.window,
                locks: &model.context.locks,
                settings: &model.context.settings,
            }))
        } else {
            None
        };

        if let Some(validation) = &validation {
            info!(
                violations = validation.violations.len(),
                warnings = validation.warnings.len(),
                "validation finished"
            );
        }

        Ok(PlanReport {
            outcome,
            validation,
            notifications: self.queue.drain(),
        })
    }

    /// Runs the springer replacement workflow against an already
    /// persisted roster.
    #[allow(clippy::too_many_arguments)]
    pub fn replace_after_absence(
        &mut self,
        absence: &Absence,
        employees: &[Employee],
        teams: &[Team],
        catalog: &ShiftCatalog,
        all_absences: &[Absence],
        roster: &mut Vec<ShiftAssignment>,
    ) -> EngineResult<ReplacementOutcome> {
        handle_absence_after_scheduling(
            absence,
            employees,
            teams,
            catalog,
            all_absences,
            roster,
            &mut self.queue,
            &self.range_lock,
        )
    }

    pub fn pending_notifications(&self) -> &[Notification] {
        self.queue.pending()
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.queue.drain()
    }
}
