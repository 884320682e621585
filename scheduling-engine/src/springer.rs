use std::collections::HashSet;
use std::sync::Mutex;

use chrono::{Duration, NaiveDate};
use tracing::info;

use shared::{AssignmentId, EmployeeId, EngineError, EngineResult, ShiftCode};

use crate::domain::{Absence, Employee, ShiftAssignment, ShiftCatalog, Team};
use crate::notifications::NotificationQueue;

/// Advisory lock over (employee, date) pairs so a concurrent operator
/// edit cannot re-introduce a removed assignment while a replacement is
/// being worked out.
#[derive(Debug, Default)]
pub struct RangeLock {
    held: Mutex<HashSet<(EmployeeId, NaiveDate)>>,
}

pub struct RangeLockGuard<'a> {
    lock: &'a RangeLock,
    pairs: Vec<(EmployeeId, NaiveDate)>,
}

impl RangeLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(
        &self,
        pairs: Vec<(EmployeeId, NaiveDate)>,
    ) -> Option<RangeLockGuard<'_>> {
        let mut held = self.held.lock().unwrap();
        if pairs.iter().any(|p| held.contains(p)) {
            return None;
        }
        held.extend(pairs.iter().copied());
        drop(held);
        Some(RangeLockGuard { lock: self, pairs })
    }
}

impl Drop for RangeLockGuard<'_> {
    fn drop(&mut self) {
        let mut held = self.lock.held.lock().unwrap();
        for pair in &self.pairs {
            held.remove(pair);
        }
    }
}

/// Result of one replacement run. "No candidate" is a normal business
/// state, not an error.
#[derive(Debug, Clone)]
pub struct ReplacementOutcome {
    pub removed: Vec<ShiftAssignment>,
    pub replacements: Vec<ShiftAssignment>,
    pub uncovered: Vec<(NaiveDate, ShiftCode)>,
}

/// Handles an absence entered after the monthly plan was persisted:
/// removes the absent employee's conflicting shifts, then searches for
/// qualified, legally-eligible substitutes and creates fixed springer
/// assignments for them.
pub fn handle_absence_after_scheduling(
    absence: &Absence,
    employees: &[Employee],
    teams: &[Team],
    catalog: &ShiftCatalog,
    all_absences: &[Absence],
    roster: &mut Vec<ShiftAssignment>,
    queue: &mut NotificationQueue,
    range_lock: &RangeLock,
) -> EngineResult<ReplacementOutcome> {
    let employee = employees
        .iter()
        .find(|e| e.id == absence.employee_id)
        .ok_or(EngineError::UnknownEmployee(absence.employee_id.0))?;
    let team = employee
        .team_id
        .and_then(|id| teams.iter().find(|t| t.id == id));

    let affected_pairs: Vec<(EmployeeId, NaiveDate)> =
        absence.dates().map(|d| (employee.id, d)).collect();
    let _guard = range_lock
        .try_acquire(affected_pairs)
        .ok_or(EngineError::ReplacementInProgress(employee.id.0))?;

    // Step 1: remove every assignment of the absent employee inside the
    // absence range.
    let mut removed = Vec::new();
    roster.retain(|a| {
        if a.employee_id == employee.id && absence.overlaps(a.date) {
            removed.push(a.clone());
            false
        } else {
            true
        }
    });
    removed.sort_by_key(|a| a.date);

    let affected_dates: Vec<NaiveDate> = removed.iter().map(|a| a.date).collect();
    let schedule_month = absence.start_date.format("%B %Y").to_string();
    queue.trigger_absence_after_scheduling(
        employee,
        absence,
        affected_dates,
        schedule_month,
        !removed.is_empty(),
    );

    info!(
        employee = %employee.full_name(),
        absence = %absence.code,
        removed = removed.len(),
        "springer replacement started"
    );

    let mut replacements = Vec::new();
    let mut uncovered = Vec::new();

    for assignment in &removed {
        let date = assignment.date;
        let code = assignment.shift_code.clone();

        let candidates = candidate_order(employee, team, teams, employees, &code);
        let mut reasons = Vec::new();
        let mut chosen: Option<&Employee> = None;
        for candidate in &candidates {
            match eligibility(candidate, date, &code, roster, all_absences, catalog) {
                Ok(()) => {
                    chosen = Some(candidate);
                    break;
                }
                Err(reason) => reasons.push(format!("{}: {reason}", candidate.full_name())),
            }
        }

        match chosen {
            Some(springer) => {
                let next_id = roster
                    .iter()
                    .map(|a| a.id.0)
                    .max()
                    .unwrap_or(0)
                    + 1;
                let replacement = ShiftAssignment {
                    id: AssignmentId(next_id),
                    employee_id: springer.id,
                    shift_code: code.clone(),
                    date,
                    is_manual: false,
                    is_fixed: true,
                    is_springer_assignment: true,
                    notes: Some(format!(
                        "Automatic springer replacement for {} ({})",
                        employee.full_name(),
                        absence.code
                    )),
                };
                roster.push(replacement.clone());
                replacements.push(replacement);
                queue.trigger_springer_assigned(
                    springer,
                    employee,
                    date,
                    code.to_string(),
                    absence.code,
                );
            }
            None => {
                let staffed = roster
                    .iter()
                    .filter(|a| a.date == date && a.shift_code == code)
                    .count();
                let min = catalog
                    .by_code(&code)
                    .map(|t| t.staffing_for(date).min)
                    .unwrap_or(0);
                queue.trigger_no_replacement_available(
                    employee,
                    date,
                    code.to_string(),
                    team.map(|t| t.name.clone())
                        .unwrap_or_else(|| "unattached".to_string()),
                    absence.code,
                    reasons.join("; "),
                    format!("Shift {code} on {date}: {staffed}/{min} staffed"),
                );
                uncovered.push((date, code));
            }
        }
    }

    Ok(ReplacementOutcome {
        removed,
        replacements,
        uncovered,
    })
}

/// Candidate search order: free members of the same team first (when
/// the team operates the shift), then unattached floaters, then members
/// of other teams allowed to run the shift.
fn candidate_order<'a>(
    absent: &Employee,
    team: Option<&Team>,
    teams: &[Team],
    employees: &'a [Employee],
    code: &ShiftCode,
) -> Vec<&'a Employee> {
    let mut ordered: Vec<&Employee> = Vec::new();

    if let Some(team) = team {
        if team.allows(code) {
            let mut same_team: Vec<&Employee> = employees
                .iter()
                .filter(|e| e.id != absent.id && e.team_id == Some(team.id))
                .collect();
            same_team.sort_by_key(|e| e.id);
            ordered.extend(same_team);
        }
    }

    let mut floaters: Vec<&Employee> = employees
        .iter()
        .filter(|e| e.id != absent.id && e.team_id.is_none())
        .collect();
    floaters.sort_by_key(|e| e.id);
    ordered.extend(floaters);

    let mut others: Vec<&Employee> = employees
        .iter()
        .filter(|e| e.id != absent.id)
        .filter(|e| match e.team_id {
            Some(id) => {
                Some(id) != team.map(|t| t.id)
                    && teams
                        .iter()
                        .find(|t| t.id == id)
                        .map(|t| t.allows(code))
                        .unwrap_or(false)
            }
            None => false,
        })
        .collect();
    others.sort_by_key(|e| (e.team_id, e.id));
    ordered.extend(others);

    ordered
}

/// The four eligibility predicates for a substitute on one shift.
fn eligibility(
    candidate: &Employee,
    date: NaiveDate,
    code: &ShiftCode,
    roster: &[ShiftAssignment],
    absences: &[Absence],
    catalog: &ShiftCatalog,
) -> Result<(), String> {
    for absence in absences {
        if absence.employee_id == candidate.id && absence.overlaps(date) {
            return Err(format!("Absent ({})", absence.code));
        }
    }

    if roster
        .iter()
        .any(|a| a.employee_id == candidate.id && a.date == date)
    {
        return Err("Already assigned to another shift".to_string());
    }

    let shift_on = |d: NaiveDate| {
        roster
            .iter()
            .find(|a| a.employee_id == candidate.id && a.date == d)
            .map(|a| a.shift_code.clone())
    };
    if let Some(previous) = shift_on(date - Duration::days(1)) {
        if forbidden(&previous, code) {
            return Err(format!("Rest time violation ({previous}->{code})"));
        }
    }
    if let Some(next) = shift_on(date + Duration::days(1)) {
        if forbidden(code, &next) {
            return Err(format!("Rest time violation ({code}->{next})"));
        }
    }

    let total_limit = catalog.max_consecutive_limit();
    let type_limit = catalog
        .by_code(code)
        .map(|t| t.max_consecutive_days)
        .unwrap_or(total_limit);

    // Count consecutive working days around the gap, backward and
    // forward, as if the shift were taken.
    let mut consecutive = 1u32;
    let mut day = date - Duration::days(1);
    while shift_on(day).is_some() {
        consecutive += 1;
        day -= Duration::days(1);
    }
    let mut day = date + Duration::days(1);
    while shift_on(day).is_some() {
        consecutive += 1;
        day += Duration::days(1);
    }
    if consecutive > total_limit {
        return Err(format!(
            "Maximum consecutive shifts ({total_limit} days) exceeded"
        ));
    }

    let mut same_type = 1u32;
    let mut day = date - Duration::days(1);
    while shift_on(day).as_ref() == Some(code) {
        same_type += 1;
        day -= Duration::days(1);
    }
    let mut day = date + Duration::days(1);
    while shift_on(day).as_ref() == Some(code) {
        same_type += 1;
        day += Duration::days(1);
    }
    if same_type > type_limit {
        return Err(format!(
            "Maximum consecutive {code} shifts ({type_limit}) exceeded"
        ));
    }

    Ok(())
}

fn forbidden(from: &ShiftCode, to: &ShiftCode) -> bool {
    matches!(
        (from, to),
        (ShiftCode::S, ShiftCode::F) | (ShiftCode::N, ShiftCode::F)
    )
}
