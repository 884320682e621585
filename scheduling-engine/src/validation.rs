use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;
use tracing::warn;

use shared::{EmployeeId, ShiftCode, HOURS_SCALE};

use crate::domain::{Absence, Employee, ShiftAssignment, ShiftCatalog, Team};
use crate::locks::ConsolidatedLocks;
use crate::settings::Settings;
use crate::solver::{CompleteSchedule, PlanOutcome, SpecialFunctionAssignment};
use crate::window::{is_weekday, PlanningWindow};

const DEFAULT_WEEKLY_TARGET_SCALED: i64 = 40 * HOURS_SCALE;

/// Outcome of the independent re-check. Violations block persistence;
/// warnings are informational.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationResult {
    pub violations: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    fn violation(&mut self, message: String) {
        warn!(violation = %message, "roster validation");
        self.violations.push(message);
    }

    fn warning(&mut self, message: String) {
        self.warnings.push(message);
    }
}

/// Everything the validator needs; it observes the exact artifacts the
/// driver extracted and never re-reads persisted state.
pub struct ValidationInput<'a> {
    pub outcome: &'a PlanOutcome,
    pub employees: &'a [Employee],
    pub teams: &'a [Team],
    pub catalog: &'a ShiftCatalog,
    pub absences: &'a [Absence],
    pub window: &'a PlanningWindow,
    pub locks: &'a ConsolidatedLocks,
    pub settings: &'a Settings,
}

/// Re-derives every hard rule from the extracted outputs, independently
/// of the solver's own scoring.
pub fn validate_plan(input: &ValidationInput<'_>) -> ValidationResult {
    let mut result = ValidationResult::default();

    let by_employee = group_by_employee(&input.outcome.assignments);
    let specials_by_employee = group_specials(&input.outcome.special_functions);

    check_one_per_day(&mut result, input, &by_employee, &specials_by_employee);
    check_absences(&mut result, input, &by_employee, &specials_by_employee);
    check_rest_transitions(&mut result, input, &by_employee);
    check_consecutive(&mut result, input, &by_employee, &specials_by_employee);
    check_working_hours(&mut result, input, &by_employee, &specials_by_employee);
    check_staffing(&mut result, input);
    check_special_functions(&mut result, input);
    check_td(&mut result, input);
    check_springer_availability(&mut result, input, &by_employee, &specials_by_employee);
    check_schedule_totality(&mut result, input);
    check_weekend_consistency(&mut result, input, &by_employee);
    check_lock_fidelity(&mut result, input, &by_employee, &specials_by_employee);
    check_shift_ratio(&mut result, input);

    result
}

type AssignmentsByEmployee<'a> = HashMap<EmployeeId, Vec<&'a ShiftAssignment>>;
type SpecialsByEmployee<'a> = HashMap<EmployeeId, Vec<&'a SpecialFunctionAssignment>>;

fn group_by_employee(assignments: &[ShiftAssignment]) -> AssignmentsByEmployee<'_> {
    let mut map: AssignmentsByEmployee = HashMap::new();
    for assignment in assignments {
        map.entry(assignment.employee_id).or_default().push(assignment);
    }
    for list in map.values_mut() {
        list.sort_by_key(|a| a.date);
    }
    map
}

fn group_specials(specials: &[SpecialFunctionAssignment]) -> SpecialsByEmployee<'_> {
    let mut map: SpecialsByEmployee = HashMap::new();
    for special in specials {
        map.entry(special.employee_id).or_default().push(special);
    }
    map
}

fn employee_name(employees: &[Employee], id: EmployeeId) -> String {
    employees
        .iter()
        .find(|e| e.id == id)
        .map(|e| e.full_name())
        .unwrap_or_else(|| format!("employee {id}"))
}

fn check_one_per_day(
    result: &mut ValidationResult,
    input: &ValidationInput<'_>,
    by_employee: &AssignmentsByEmployee<'_>,
    specials: &SpecialsByEmployee<'_>,
) {
    for employee in input.employees {
        let mut per_date: BTreeMap<NaiveDate, Vec<String>> = BTreeMap::new();
        if let Some(list) = by_employee.get(&employee.id) {
            for a in list {
                per_date
                    .entry(a.date)
                    .or_default()
                    .push(a.shift_code.to_string());
            }
        }
        if let Some(list) = specials.get(&employee.id) {
            for s in list {
                per_date.entry(s.date).or_default().push(s.code.clone());
            }
        }
        for (date, codes) in per_date {
            if codes.len() > 1 {
                result.violation(format!(
                    "{} has multiple assignments on {date}: {}",
                    employee.full_name(),
                    codes.join(", ")
                ));
            }
        }
    }
}

fn check_absences(
    result: &mut ValidationResult,
    input: &ValidationInput<'_>,
    by_employee: &AssignmentsByEmployee<'_>,
    specials: &SpecialsByEmployee<'_>,
) {
    for absence in input.absences {
        let name = employee_name(input.employees, absence.employee_id);
        if let Some(list) = by_employee.get(&absence.employee_id) {
            for a in list.iter().filter(|a| absence.overlaps(a.date)) {
                result.violation(format!(
                    "{name} assigned to {} on {} but is absent ({})",
                    a.shift_code, a.date, absence.code
                ));
            }
        }
        if let Some(list) = specials.get(&absence.employee_id) {
            for s in list.iter().filter(|s| absence.overlaps(s.date)) {
                result.violation(format!(
                    "{name} holds {} on {} but is absent ({})",
                    s.code, s.date, absence.code
                ));
            }
        }
    }
}

fn check_rest_transitions(
    result: &mut ValidationResult,
    input: &ValidationInput<'_>,
    by_employee: &AssignmentsByEmployee<'_>,
) {
    for (employee_id, list) in by_employee {
        let name = employee_name(input.employees, *employee_id);
        for pair in list.windows(2) {
            if (pair[1].date - pair[0].date).num_days() != 1 {
                continue;
            }
            let from = &pair[0].shift_code;
            let to = &pair[1].shift_code;
            let broken = matches!(
                (from, to),
                (ShiftCode::S, ShiftCode::F) | (ShiftCode::N, ShiftCode::F)
            );
            if !broken {
                continue;
            }
            if pair[1].date.weekday() == Weekday::Sun {
                result.warning(format!(
                    "{name}: tolerated rotation-boundary transition {from}->{to} on {}->{}",
                    pair[0].date, pair[1].date
                ));
            } else {
                result.violation(format!(
                    "{name}: forbidden transition {from}->{to} on {}->{} breaks minimum rest",
                    pair[0].date, pair[1].date
                ));
            }
        }
    }
}

fn check_consecutive(
    result: &mut ValidationResult,
    input: &ValidationInput<'_>,
    by_employee: &AssignmentsByEmployee<'_>,
    specials: &SpecialsByEmployee<'_>,
) {
    let total_limit = input.catalog.max_consecutive_limit();

    for employee in input.employees {
        let mut working: BTreeMap<NaiveDate, Option<ShiftCode>> = BTreeMap::new();
        if let Some(list) = by_employee.get(&employee.id) {
            for a in list {
                working.insert(a.date, Some(a.shift_code.clone()));
            }
        }
        if let Some(list) = specials.get(&employee.id) {
            for s in list {
                working.entry(s.date).or_insert(None);
            }
        }

        let name = employee.full_name();
        let mut run = 0u32;
        let mut last: Option<NaiveDate> = None;
        for date in working.keys() {
            run = match last {
                Some(prev) if (*date - prev).num_days() == 1 => run + 1,
                _ => 1,
            };
            if run == total_limit + 1 {
                result.violation(format!(
                    "{name} works more than {total_limit} consecutive days (chain reaches {date})"
                ));
            }
            last = Some(*date);
        }

        // Per-type chains over the main shifts.
        for shift_type in input.catalog.types() {
            if !shift_type.code.is_main() {
                continue;
            }
            let limit = shift_type.max_consecutive_days;
            let mut run = 0u32;
            let mut last: Option<NaiveDate> = None;
            for (date, code) in &working {
                if code.as_ref() != Some(&shift_type.code) {
                    continue;
                }
                run = match last {
                    Some(prev) if (*date - prev).num_days() == 1 => run + 1,
                    _ => 1,
                };
                if run == limit + 1 {
                    result.violation(format!(
                        "{name} exceeds {limit} consecutive {} shifts (chain reaches {date})",
                        shift_type.code
                    ));
                }
                last = Some(*date);
            }
        }
    }
}

fn check_working_hours(
    result: &mut ValidationResult,
    input: &ValidationInput<'_>,
    by_employee: &AssignmentsByEmployee<'_>,
    specials: &SpecialsByEmployee<'_>,
) {
    let window_days = input.settings.planning.monthly_window_days as i64;

    for employee in input.employees {
        let mut hours_by_date: BTreeMap<NaiveDate, i64> = BTreeMap::new();
        let mut main_counts: HashMap<ShiftCode, usize> = HashMap::new();
        if let Some(list) = by_employee.get(&employee.id) {
            for a in list {
                *hours_by_date.entry(a.date).or_default() +=
                    input.catalog.scaled_hours(&a.shift_code);
                if a.shift_code.is_main() {
                    *main_counts.entry(a.shift_code.clone()).or_default() += 1;
                }
            }
        }
        if let Some(list) = specials.get(&employee.id) {
            for s in list {
                let scaled = match s.code.as_str() {
                    "BSB" => input.catalog.scaled_hours(&ShiftCode::Bsb),
                    "BMT" => input.catalog.scaled_hours(&ShiftCode::Bmt),
                    _ => 8 * HOURS_SCALE,
                };
                *hours_by_date.entry(s.date).or_default() += scaled;
            }
        }
        if hours_by_date.is_empty() {
            continue;
        }

        let target = main_counts
            .into_iter()
            .max_by_key(|(code, n)| (*n, std::cmp::Reverse(code.as_str().to_string())))
            .and_then(|(code, _)| input.catalog.by_code(&code))
            .map(|t| t.weekly_target_scaled())
            .unwrap_or(DEFAULT_WEEKLY_TARGET_SCALED);
        let name = employee.full_name();

        // Weekly ceiling against the predominant-type target, weeks as
        // planned (Sunday-first).
        for week in &input.window.weeks {
            let hours: i64 = week
                .dates
                .iter()
                .filter_map(|d| hours_by_date.get(d))
                .sum();
            if hours > target {
                result.violation(format!(
                    "{name} works {:.1} h in week starting {} (max {:.1} h by shift configuration)",
                    hours as f64 / HOURS_SCALE as f64,
                    week.start(),
                    target as f64 / HOURS_SCALE as f64
                ));
            }
        }

        // Rolling monthly window, stepped week by week.
        let monthly_ceiling = (target * 4).min(input.settings.planning.max_monthly_scaled_hours);
        let mut start = input.window.extended_start;
        while start + Duration::days(window_days - 1) <= input.window.extended_end {
            let end = start + Duration::days(window_days - 1);
            let hours: i64 = hours_by_date
                .range(start..=end)
                .map(|(_, h)| *h)
                .sum();
            if hours > monthly_ceiling {
                result.violation(format!(
                    "{name} works {:.1} h in the {window_days}-day window {start} to {end} (max {:.1} h)",
                    hours as f64 / HOURS_SCALE as f64,
                    monthly_ceiling as f64 / HOURS_SCALE as f64
                ));
            }
            start += Duration::days(7);
        }
    }
}

fn check_staffing(result: &mut ValidationResult, input: &ValidationInput<'_>) {
    let attached: BTreeSet<EmployeeId> = input
        .employees
        .iter()
        .filter(|e| e.team_id.is_some())
        .map(|e| e.id)
        .collect();

    for date in &input.window.dates {
        for shift_type in input.catalog.types() {
            if !shift_type.code.is_main() || !shift_type.works_on(*date) {
                continue;
            }
            let bounds = shift_type.staffing_for(*date);
            let count = input
                .outcome
                .assignments
                .iter()
                .filter(|a| a.date == *date && a.shift_code == shift_type.code)
                .filter(|a| attached.contains(&a.employee_id))
                .count() as u32;
            if count < bounds.min {
                result.violation(format!(
                    "insufficient staffing for {} on {date}: {count} (min {})",
                    shift_type.code, bounds.min
                ));
            } else if count > bounds.max {
                result.violation(format!(
                    "overstaffing for {} on {date}: {count} (max {})",
                    shift_type.code, bounds.max
                ));
            }
        }
    }
}

fn check_special_functions(result: &mut ValidationResult, input: &ValidationInput<'_>) {
    let bmt_qualified: Vec<&Employee> = input
        .employees
        .iter()
        .filter(|e| e.is_fire_alarm_technician)
        .collect();
    let bsb_qualified: Vec<&Employee> = input
        .employees
        .iter()
        .filter(|e| e.is_fire_safety_officer)
        .collect();

    for date in &input.window.dates {
        let holders = |code: &str| {
            input
                .outcome
                .special_functions
                .iter()
                .filter(|s| s.date == *date && s.code == code)
                .collect::<Vec<_>>()
        };
        let bmt = holders("BMT");
        let bsb = holders("BSB");

        if !is_weekday(*date) {
            for s in bmt.iter().chain(bsb.iter()) {
                result.violation(format!(
                    "{} holds {} on the weekend date {date}",
                    employee_name(input.employees, s.employee_id),
                    s.code
                ));
            }
            continue;
        }

        for (qualified, holders, code) in
            [(&bmt_qualified, &bmt, "BMT"), (&bsb_qualified, &bsb, "BSB")]
        {
            for s in holders.iter() {
                if !qualified.iter().any(|e| e.id == s.employee_id) {
                    result.violation(format!(
                        "{} assigned to {code} on {date} but is not qualified",
                        employee_name(input.employees, s.employee_id)
                    ));
                }
            }
            let present = qualified.iter().any(|e| {
                !input
                    .absences
                    .iter()
                    .any(|a| a.employee_id == e.id && a.overlaps(*date))
            });
            if present && holders.len() != 1 {
                result.violation(format!(
                    "{code} count on {date} is {} (expected exactly 1)",
                    holders.len()
                ));
            }
        }
    }
}

fn check_td(result: &mut ValidationResult, input: &ValidationInput<'_>) {
    for week in &input.window.weeks {
        let weekday_dates: Vec<NaiveDate> = week.weekdays().collect();
        let mut holders: BTreeSet<EmployeeId> = BTreeSet::new();
        for s in &input.outcome.special_functions {
            if s.code == "TD" && weekday_dates.contains(&s.date) {
                holders.insert(s.employee_id);
            }
        }

        let any_qualified_present = input.employees.iter().filter(|e| e.can_do_td()).any(|e| {
            weekday_dates.iter().any(|d| {
                !input
                    .absences
                    .iter()
                    .any(|a| a.employee_id == e.id && a.overlaps(*d))
            })
        });

        if holders.is_empty() {
            if any_qualified_present {
                result.violation(format!(
                    "week {} ({} to {}) has no TD assignment (required: exactly 1)",
                    week.index,
                    week.start(),
                    week.end()
                ));
            }
        } else if holders.len() > 1 {
            result.violation(format!(
                "week {} has {} TD holders (should be exactly 1)",
                week.index,
                holders.len()
            ));
        } else {
            let holder = *holders.iter().next().unwrap();
            let qualified = input
                .employees
                .iter()
                .find(|e| e.id == holder)
                .map(|e| e.can_do_td())
                .unwrap_or(false);
            if !qualified {
                result.violation(format!(
                    "{} holds TD in week {} but is not qualified",
                    employee_name(input.employees, holder),
                    week.index
                ));
            }
        }
    }
}

fn check_springer_availability(
    result: &mut ValidationResult,
    input: &ValidationInput<'_>,
    by_employee: &AssignmentsByEmployee<'_>,
    specials: &SpecialsByEmployee<'_>,
) {
    let springers: Vec<&Employee> = input
        .employees
        .iter()
        .filter(|e| e.team_id.is_none())
        .collect();
    if springers.is_empty() {
        return;
    }

    for week in &input.window.weeks {
        let free = springers.iter().any(|springer| {
            let busy = |date: &NaiveDate| {
                by_employee
                    .get(&springer.id)
                    .map(|l| l.iter().any(|a| a.date == *date))
                    .unwrap_or(false)
                    || specials
                        .get(&springer.id)
                        .map(|l| l.iter().any(|s| s.date == *date))
                        .unwrap_or(false)
            };
            !week.dates.iter().any(busy)
        });
        if !free {
            result.violation(format!(
                "no free springer in week starting {} (at least 1 must stay free)",
                week.start()
            ));
        }
    }
}

fn check_schedule_totality(result: &mut ValidationResult, input: &ValidationInput<'_>) {
    let schedule: &CompleteSchedule = &input.outcome.complete_schedule;
    for employee in input.employees {
        for date in &input.window.dates {
            if !schedule.contains(employee.id, *date) {
                result.violation(format!(
                    "{} (id {}) is missing from the schedule on {date}",
                    employee.full_name(),
                    employee.id
                ));
            }
        }
    }
}

fn check_weekend_consistency(
    result: &mut ValidationResult,
    input: &ValidationInput<'_>,
    by_employee: &AssignmentsByEmployee<'_>,
) {
    for employee in input.employees {
        if employee.team_id.is_none() {
            continue;
        }
        let Some(list) = by_employee.get(&employee.id) else {
            continue;
        };
        for week in &input.window.weeks {
            let mut weekday_codes: BTreeSet<&ShiftCode> = BTreeSet::new();
            let mut weekend_codes: BTreeSet<&ShiftCode> = BTreeSet::new();
            for a in list.iter().filter(|a| a.shift_code.is_main()) {
                if !week.dates.contains(&a.date) {
                    continue;
                }
                if is_weekday(a.date) {
                    weekday_codes.insert(&a.shift_code);
                } else {
                    weekend_codes.insert(&a.shift_code);
                }
            }
            if weekend_codes.is_empty() {
                continue;
            }
            if weekday_codes.is_empty() {
                result.warning(format!(
                    "{} works the weekend of week {} without any weekday shift",
                    employee.full_name(),
                    week.index
                ));
                continue;
            }
            if !weekend_codes.is_subset(&weekday_codes) {
                result.violation(format!(
                    "weekend violation: {} week {}: weekday shifts {:?}, weekend shifts {:?} (weekend must carry the week)",
                    employee.full_name(),
                    week.index,
                    weekday_codes.iter().map(|c| c.to_string()).collect::<Vec<_>>(),
                    weekend_codes.iter().map(|c| c.to_string()).collect::<Vec<_>>()
                ));
            }
        }
    }
}

fn check_lock_fidelity(
    result: &mut ValidationResult,
    input: &ValidationInput<'_>,
    by_employee: &AssignmentsByEmployee<'_>,
    specials: &SpecialsByEmployee<'_>,
) {
    for ((team_id, week_index), expected) in &input.locks.team_shift {
        let Some(week) = input.window.weeks.get(*week_index) else {
            continue;
        };
        let members: Vec<EmployeeId> = input
            .employees
            .iter()
            .filter(|e| e.team_id == Some(*team_id))
            .map(|e| e.id)
            .collect();
        let mut actual: BTreeSet<&ShiftCode> = BTreeSet::new();
        for member in &members {
            if let Some(list) = by_employee.get(member) {
                for a in list {
                    if week.dates.contains(&a.date) && is_weekday(a.date) {
                        actual.insert(&a.shift_code);
                    }
                }
            }
        }
        if !actual.is_empty() && !actual.contains(expected) {
            let team_name = input
                .teams
                .iter()
                .find(|t| t.id == *team_id)
                .map(|t| t.name.clone())
                .unwrap_or_else(|| format!("team {team_id}"));
            result.violation(format!(
                "locked team shift violated: {team_name} week {week_index} should run '{expected}'"
            ));
        }
    }

    for ((employee_id, date), expected) in &input.locks.employee_shift {
        let honored = by_employee
            .get(employee_id)
            .map(|l| l.iter().any(|a| a.date == *date && &a.shift_code == expected))
            .unwrap_or(false);
        if !honored {
            result.violation(format!(
                "locked shift violated: {} should work '{expected}' on {date}",
                employee_name(input.employees, *employee_id)
            ));
        }
    }

    for ((employee_id, date), expected_working) in &input.locks.employee_weekend {
        let working = by_employee
            .get(employee_id)
            .map(|l| l.iter().any(|a| a.date == *date))
            .unwrap_or(false)
            || specials
                .get(employee_id)
                .map(|l| l.iter().any(|s| s.date == *date))
                .unwrap_or(false);
        if working != *expected_working {
            result.violation(format!(
                "locked weekend violated: {} should {}work on {date}",
                employee_name(input.employees, *employee_id),
                if *expected_working { "" } else { "not " }
            ));
        }
    }

    for ((employee_id, week_index), expected) in &input.locks.td {
        let Some(week) = input.window.weeks.get(*week_index) else {
            continue;
        };
        let has_td = specials
            .get(employee_id)
            .map(|l| {
                l.iter()
                    .any(|s| s.code == "TD" && week.dates.contains(&s.date))
            })
            .unwrap_or(false);
        if has_td != *expected {
            result.violation(format!(
                "locked TD violated: {} should {}hold TD in week {week_index}",
                employee_name(input.employees, *employee_id),
                if *expected { "" } else { "not " }
            ));
        }
    }
}

fn check_shift_ratio(result: &mut ValidationResult, input: &ValidationInput<'_>) {
    let attached: BTreeSet<EmployeeId> = input
        .employees
        .iter()
        .filter(|e| e.team_id.is_some())
        .map(|e| e.id)
        .collect();
    for date in &input.window.dates {
        if !is_weekday(*date) {
            continue;
        }
        let count = |code: ShiftCode| {
            input
                .outcome
                .assignments
                .iter()
                .filter(|a| a.date == *date && a.shift_code == code)
                .filter(|a| attached.contains(&a.employee_id))
                .count()
        };
        let f = count(ShiftCode::F);
        let s = count(ShiftCode::S);
        let n = count(ShiftCode::N);
        if s > f || n > s {
            result.warning(format!(
                "shift ratio out of order on {date}: F={f}, S={s}, N={n} (expected F >= S >= N)"
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locks::ConsolidatedLocks;
    use crate::rules::test_support::{employee, team};
    use crate::solver::{Diagnostics, SolverStatus};
    use shared::AssignmentId;

    fn window() -> PlanningWindow {
        PlanningWindow::expand(
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 28).unwrap(),
        )
        .unwrap()
    }

    fn outcome_with(assignments: Vec<ShiftAssignment>) -> PlanOutcome {
        let mut complete_schedule = CompleteSchedule::default();
        for a in &assignments {
            complete_schedule.insert(a.employee_id, a.date, a.shift_code.to_string());
        }
        PlanOutcome {
            status: SolverStatus::Feasible,
            assignments,
            special_functions: Vec::new(),
            complete_schedule,
            objective: Some(0),
            diagnostics: Diagnostics::default(),
        }
    }

    fn assignment(id: i64, employee: i64, date: NaiveDate, code: ShiftCode) -> ShiftAssignment {
        ShiftAssignment {
            id: AssignmentId(id),
            employee_id: EmployeeId(employee),
            shift_code: code,
            date,
            is_manual: false,
            is_fixed: false,
            is_springer_assignment: false,
            notes: None,
        }
    }

    #[test]
    fn test_forbidden_transition_is_flagged() {
        let employees = vec![employee(1, Some(1))];
        let teams = vec![team(1)];
        let catalog = ShiftCatalog::standard();
        let window = window();
        let outcome = outcome_with(vec![
            assignment(
                1,
                1,
                NaiveDate::from_ymd_opt(2026, 2, 3).unwrap(),
                ShiftCode::N,
            ),
            assignment(
                2,
                1,
                NaiveDate::from_ymd_opt(2026, 2, 4).unwrap(),
                ShiftCode::F,
            ),
        ]);
        let locks = ConsolidatedLocks::default();
        let settings = Settings::default();
        let result = validate_plan(&ValidationInput {
            outcome: &outcome,
            employees: &employees,
            teams: &teams,
            catalog: &catalog,
            absences: &[],
            window: &window,
            locks: &locks,
            settings: &settings,
        });
        assert!(result
            .violations
            .iter()
            .any(|v| v.contains("forbidden transition N->F")));
    }

    #[test]
    fn test_absent_day_assignment_is_flagged() {
        let employees = vec![employee(1, Some(1))];
        let teams = vec![team(1)];
        let catalog = ShiftCatalog::standard();
        let window = window();
        let date = NaiveDate::from_ymd_opt(2026, 2, 3).unwrap();
        let outcome = outcome_with(vec![assignment(1, 1, date, ShiftCode::F)]);
        let absences = vec![Absence {
            id: 1,
            employee_id: EmployeeId(1),
            code: shared::AbsenceCode::U,
            start_date: date,
            end_date: date,
            notes: None,
        }];
        let locks = ConsolidatedLocks::default();
        let settings = Settings::default();
        let result = validate_plan(&ValidationInput {
            outcome: &outcome,
            employees: &employees,
            teams: &teams,
            catalog: &catalog,
            absences: &absences,
            window: &window,
            locks: &locks,
            settings: &settings,
        });
        assert!(!result.is_valid());
    }

    #[test]
    fn test_schedule_totality_enforced() {
        let employees = vec![employee(1, Some(1))];
        let teams = vec![team(1)];
        let catalog = ShiftCatalog::standard();
        let window = window();
        let outcome = outcome_with(vec![]);
        let locks = ConsolidatedLocks::default();
        let settings = Settings::default();
        let result = validate_plan(&ValidationInput {
            outcome: &outcome,
            employees: &employees,
            teams: &teams,
            catalog: &catalog,
            absences: &[],
            window: &window,
            locks: &locks,
            settings: &settings,
        });
        // Every date of the window is missing for the employee.
        assert_eq!(
            result
                .violations
                .iter()
                .filter(|v| v.contains("missing from the schedule"))
                .count(),
            window.dates.len()
        );
    }

    #[test]
    fn test_consecutive_chain_detected() {
        let employees = vec![employee(1, Some(1))];
        let teams = vec![team(1)];
        let catalog = ShiftCatalog::standard();
        let window = window();
        let start = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();
        let assignments: Vec<_> = (0..7)
            .map(|i| assignment(i, 1, start + Duration::days(i), ShiftCode::S))
            .collect();
        let outcome = outcome_with(assignments);
        let locks = ConsolidatedLocks::default();
        let settings = Settings::default();
        let result = validate_plan(&ValidationInput {
            outcome: &outcome,
            employees: &employees,
            teams: &teams,
            catalog: &catalog,
            absences: &[],
            window: &window,
            locks: &locks,
            settings: &settings,
        });
        assert!(result
            .violations
            .iter()
            .any(|v| v.contains("consecutive days")));
    }
}
