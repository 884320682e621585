use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use shared::{EmployeeId, ShiftCode, TeamId};

use crate::domain::{Absence, Employee, LockInput, ShiftCatalog, Team};
use crate::window::{is_weekday, PlanningWindow};

/// A lock that could not be reconciled with the rest of the input. The
/// losing lock is dropped and the engine continues.
#[derive(Debug, Clone, Serialize)]
pub struct LockConflict {
    pub locked_type: &'static str,
    pub entity_id: i64,
    pub entity_name: String,
    pub locked_date_or_week: String,
    pub locked_value: String,
    pub conflict_description: String,
}

/// The surviving locks after conflict resolution, keyed for the model
/// builder.
#[derive(Debug, Clone, Default)]
pub struct ConsolidatedLocks {
    pub team_shift: HashMap<(TeamId, usize), ShiftCode>,
    pub employee_shift: HashMap<(EmployeeId, NaiveDate), ShiftCode>,
    pub employee_weekend: HashMap<(EmployeeId, NaiveDate), bool>,
    pub td: HashMap<(EmployeeId, usize), bool>,
}

/// Merges the four operator lock dictionaries into one consistent input.
///
/// Precedence: absences shadow every lock; team-week locks beat
/// employee-day locks inside the same week; the first of two locks on
/// the same key wins. Every dropped lock is returned as a conflict.
pub fn consolidate(
    input: &LockInput,
    employees: &[Employee],
    teams: &[Team],
    catalog: &ShiftCatalog,
    absences: &[Absence],
    window: &PlanningWindow,
) -> (ConsolidatedLocks, Vec<LockConflict>) {
    let employee_by_id: HashMap<EmployeeId, &Employee> =
        employees.iter().map(|e| (e.id, e)).collect();
    let team_by_id: HashMap<TeamId, &Team> = teams.iter().map(|t| (t.id, t)).collect();

    let mut locks = ConsolidatedLocks::default();
    let mut conflicts = Vec::new();

    let is_absent = |employee_id: EmployeeId, date: NaiveDate| {
        absences
            .iter()
            .any(|a| a.employee_id == employee_id && a.overlaps(date))
    };

    let employee_name = |id: EmployeeId| {
        employee_by_id
            .get(&id)
            .map(|e| e.full_name())
            .unwrap_or_else(|| format!("employee {id}"))
    };

    // Team-week shift locks first; they rank above employee-day locks.
    for lock in &input.team_shift {
        let key = (lock.team_id, lock.week_index);
        let team = match team_by_id.get(&lock.team_id) {
            Some(team) => *team,
            None => {
                conflicts.push(LockConflict {
                    locked_type: "team_shift",
                    entity_id: lock.team_id.0,
                    entity_name: format!("team {}", lock.team_id),
                    locked_date_or_week: format!("week {}", lock.week_index),
                    locked_value: lock.shift.to_string(),
                    conflict_description: "lock references an unknown team".to_string(),
                });
                continue;
            }
        };
        let description = if lock.week_index >= window.weeks.len() {
            Some("week index is outside the planning window".to_string())
        } else if team.is_virtual {
            Some("virtual teams are excluded from rotation".to_string())
        } else if catalog.by_code(&lock.shift).is_none() || !lock.shift.is_main() {
            Some(format!("'{}' is not an active main shift", lock.shift))
        } else if !team.allows(&lock.shift) {
            Some(format!("team may not operate shift '{}'", lock.shift))
        } else if let Some(existing) = locks.team_shift.get(&key) {
            Some(format!("team already locked to '{existing}' in this week"))
        } else {
            None
        };
        if let Some(conflict_description) = description {
            warn!(
                team = %team.name,
                week = lock.week_index,
                shift = %lock.shift,
                "dropping team shift lock: {conflict_description}"
            );
            conflicts.push(LockConflict {
                locked_type: "team_shift",
                entity_id: lock.team_id.0,
                entity_name: team.name.clone(),
                locked_date_or_week: format!("week {}", lock.week_index),
                locked_value: lock.shift.to_string(),
                conflict_description,
            });
            continue;
        }
        locks.team_shift.insert(key, lock.shift.clone());
    }

    // Employee-day shift locks.
    for lock in &input.employee_shift {
        let key = (lock.employee_id, lock.date);
        let employee = employee_by_id.get(&lock.employee_id).copied();
        let week_index = window.week_index_of(lock.date);

        let team_week_shift = employee
            .and_then(|e| e.team_id)
            .zip(week_index)
            .and_then(|(team_id, week)| locks.team_shift.get(&(team_id, week)));

        let description = if employee.is_none() {
            Some("lock references an unknown employee".to_string())
        } else if !window.contains(lock.date) {
            Some("date is outside the extended planning window".to_string())
        } else if catalog.by_code(&lock.shift).is_none() {
            Some(format!("unknown shift code '{}'", lock.shift))
        } else if is_absent(lock.employee_id, lock.date) {
            Some("employee is absent on the locked date; the absence takes precedence".to_string())
        } else if let Some(team_shift) = team_week_shift {
            if is_weekday(lock.date) && *team_shift != lock.shift && lock.shift.is_main() {
                Some(format!(
                    "employee's team is locked to '{team_shift}' in the same week"
                ))
            } else {
                None
            }
        } else if let Some(existing) = locks.employee_shift.get(&key) {
            Some(format!("employee already locked to '{existing}' on this date"))
        } else {
            None
        };

        if let Some(conflict_description) = description {
            warn!(
                employee = %employee_name(lock.employee_id),
                date = %lock.date,
                shift = %lock.shift,
                "dropping employee shift lock: {conflict_description}"
            );
            conflicts.push(LockConflict {
                locked_type: "employee_shift",
                entity_id: lock.employee_id.0,
                entity_name: employee_name(lock.employee_id),
                locked_date_or_week: lock.date.to_string(),
                locked_value: lock.shift.to_string(),
                conflict_description,
            });
            continue;
        }
        locks.employee_shift.insert(key, lock.shift.clone());
    }

    // Weekend locks.
    for lock in &input.employee_weekend {
        let key = (lock.employee_id, lock.date);
        let description = if !employee_by_id.contains_key(&lock.employee_id) {
            Some("lock references an unknown employee".to_string())
        } else if !window.contains(lock.date) {
            Some("date is outside the extended planning window".to_string())
        } else if is_weekday(lock.date) {
            Some("weekend lock on a weekday date".to_string())
        } else if lock.working && is_absent(lock.employee_id, lock.date) {
            Some("employee is absent on the locked date; the absence takes precedence".to_string())
        } else if locks
            .employee_shift
            .get(&key)
            .map(|_| !lock.working)
            .unwrap_or(false)
        {
            Some("conflicts with an employee shift lock on the same date".to_string())
        } else {
            None
        };

        if let Some(conflict_description) = description {
            warn!(
                employee = %employee_name(lock.employee_id),
                date = %lock.date,
                working = lock.working,
                "dropping weekend lock: {conflict_description}"
            );
            conflicts.push(LockConflict {
                locked_type: "employee_weekend",
                entity_id: lock.employee_id.0,
                entity_name: employee_name(lock.employee_id),
                locked_date_or_week: lock.date.to_string(),
                locked_value: lock.working.to_string(),
                conflict_description,
            });
            continue;
        }
        locks.employee_weekend.insert(key, lock.working);
    }

    // TD locks. At most one positive TD lock survives per week.
    for lock in &input.td {
        let key = (lock.employee_id, lock.week_index);
        let employee = employee_by_id.get(&lock.employee_id).copied();
        let other_positive = lock.holds_td
            && locks
                .td
                .iter()
                .any(|((_, week), held)| *week == lock.week_index && *held);

        let description = match employee {
            None => Some("lock references an unknown employee".to_string()),
            Some(e) if lock.holds_td && !e.can_do_td() => {
                Some("employee is not qualified for TD".to_string())
            }
            Some(_) if lock.week_index >= window.weeks.len() => {
                Some("week index is outside the planning window".to_string())
            }
            Some(_) if other_positive => {
                Some("another employee is already locked to TD in this week".to_string())
            }
            Some(e)
                if lock.holds_td
                    && window.weeks[lock.week_index]
                        .weekdays()
                        .all(|d| is_absent(e.id, d)) =>
            {
                Some("employee is absent on every weekday of the locked week".to_string())
            }
            _ => None,
        };

        if let Some(conflict_description) = description {
            warn!(
                employee = %employee_name(lock.employee_id),
                week = lock.week_index,
                holds_td = lock.holds_td,
                "dropping TD lock: {conflict_description}"
            );
            conflicts.push(LockConflict {
                locked_type: "td",
                entity_id: lock.employee_id.0,
                entity_name: employee_name(lock.employee_id),
                locked_date_or_week: format!("week {}", lock.week_index),
                locked_value: lock.holds_td.to_string(),
                conflict_description,
            });
            continue;
        }
        locks.td.insert(key, lock.holds_td);
    }

    (locks, conflicts)
}
