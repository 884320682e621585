mod construct;
mod extract;
mod preflight;
mod search;

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use shared::{EmployeeId, ShiftCode, TeamId};

use crate::domain::ShiftAssignment;
use crate::locks::LockConflict;
use crate::model::PlanningModel;
use crate::rules::RuleScore;

pub use construct::build_initial;
pub use preflight::preflight;
pub use search::{improve, SearchOutcome};

/// Solver verdict, mirroring the CP-SAT status surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolverStatus {
    /// The search converged before the time limit.
    Optimal,
    /// A roster without hard violations was found.
    Feasible,
    /// The structural analysis proved the inputs unsolvable.
    Infeasible,
    /// The time limit expired with hard violations remaining.
    Unknown,
}

#[derive(Debug, Clone, Copy)]
pub struct SolveLimits {
    pub time_limit: Duration,
    pub workers: usize,
}

impl Default for SolveLimits {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(60),
            workers: 4,
        }
    }
}

/// Per-shift eligibility counts for the infeasibility diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct ShiftEligibility {
    pub shift: ShiftCode,
    pub weekday_min: u32,
    pub weekend_min: u32,
    pub eligible_employees: usize,
}

/// Team capability summary for the infeasibility diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct TeamCapability {
    pub team_id: TeamId,
    pub name: String,
    pub members: usize,
    pub is_virtual: bool,
    /// Empty means the team may operate any shift.
    pub allowed_codes: Vec<ShiftCode>,
    pub td_qualified: usize,
    pub bmt_qualified: usize,
    pub bsb_qualified: usize,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct Diagnostics {
    pub shift_eligibility: Vec<ShiftEligibility>,
    pub team_capabilities: Vec<TeamCapability>,
    pub lock_warnings: Vec<LockConflict>,
    pub infeasibility_reasons: Vec<String>,
}

/// A special-function holding (TD, BMT or BSB) on one date.
#[derive(Debug, Clone, Serialize)]
pub struct SpecialFunctionAssignment {
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
    pub code: String,
}

/// Dense mapping over employees × extended-window dates. Every employee
/// appears on every date: a shift code, an absence code, `TD` or the
/// `+` rest marker.
#[derive(Debug, Clone, Default)]
pub struct CompleteSchedule {
    entries: BTreeMap<(EmployeeId, NaiveDate), String>,
}

impl CompleteSchedule {
    pub fn insert(&mut self, employee_id: EmployeeId, date: NaiveDate, code: String) {
        self.entries.insert((employee_id, date), code);
    }

    pub fn get(&self, employee_id: EmployeeId, date: NaiveDate) -> Option<&str> {
        self.entries.get(&(employee_id, date)).map(|s| s.as_str())
    }

    pub fn contains(&self, employee_id: EmployeeId, date: NaiveDate) -> bool {
        self.entries.contains_key(&(employee_id, date))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(EmployeeId, NaiveDate), &String)> {
        self.entries.iter()
    }
}

impl Serialize for CompleteSchedule {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Row<'a> {
            employee_id: EmployeeId,
            date: NaiveDate,
            code: &'a str,
        }
        serializer.collect_seq(self.entries.iter().map(|((employee_id, date), code)| Row {
            employee_id: *employee_id,
            date: *date,
            code,
        }))
    }
}

/// What the driver hands back: status, extracted artifacts and the
/// diagnostic record.
#[derive(Debug, Clone, Serialize)]
pub struct PlanOutcome {
    pub status: SolverStatus,
    pub assignments: Vec<ShiftAssignment>,
    pub special_functions: Vec<SpecialFunctionAssignment>,
    pub complete_schedule: CompleteSchedule,
    pub objective: Option<i64>,
    pub diagnostics: Diagnostics,
}

impl PlanOutcome {
    pub fn has_roster(&self) -> bool {
        matches!(self.status, SolverStatus::Optimal | SolverStatus::Feasible)
    }
}

/// Runs the solver: structural pre-flight, then `workers` seeded
/// construction-plus-improvement searches in parallel, best roster
/// wins. Only the `solve` call blocks, bounded by the time limit.
pub struct SolverDriver<'a> {
    model: &'a PlanningModel,
}

impl<'a> SolverDriver<'a> {
    pub fn new(model: &'a PlanningModel) -> Self {
        Self { model }
    }

    pub fn solve(&self, limits: SolveLimits) -> PlanOutcome {
        let ctx = &self.model.context;
        let mut diagnostics = preflight::build_diagnostics(ctx, self.model.lock_warnings.clone());

        let reasons = preflight(ctx);
        if !reasons.is_empty() {
            info!(reasons = reasons.len(), "planning inputs are infeasible");
            diagnostics.infeasibility_reasons = reasons;
            return PlanOutcome {
                status: SolverStatus::Infeasible,
                assignments: Vec::new(),
                special_functions: Vec::new(),
                complete_schedule: CompleteSchedule::default(),
                objective: None,
                diagnostics,
            };
        }

        let deadline = Instant::now() + limits.time_limit;
        let workers = limits.workers.max(1);
        let base_seed = ctx.settings.solver.seed;

        let results: Vec<search::SearchOutcome> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|worker| {
                    let model = self.model;
                    scope.spawn(move || {
                        let initial = build_initial(&model.context);
                        improve(model, initial, base_seed.wrapping_add(worker as u64), deadline)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let best = results
            .into_iter()
            .min_by_key(|r| (r.score.hard, r.score.penalty))
            .expect("at least one worker");

        info!(
            hard = best.score.hard,
            penalty = best.score.penalty,
            converged = best.converged,
            "solver finished"
        );

        if best.score.hard > 0 {
            diagnostics
                .infeasibility_reasons
                .push(format!(
                    "time limit reached with {} hard violation(s) remaining",
                    best.score.hard
                ));
            return PlanOutcome {
                status: SolverStatus::Unknown,
                assignments: Vec::new(),
                special_functions: Vec::new(),
                complete_schedule: CompleteSchedule::default(),
                objective: None,
                diagnostics,
            };
        }

        let status = if best.converged {
            SolverStatus::Optimal
        } else {
            SolverStatus::Feasible
        };
        extract::extract(ctx, &best.roster, status, best.score, diagnostics)
    }
}

/// Re-exported for tests that want to score a roster the way the
/// driver does.
pub fn score_of(model: &PlanningModel, roster: &crate::roster::RosterState) -> RuleScore {
    crate::rules::evaluate_all(&model.rules, &model.context, roster)
}
