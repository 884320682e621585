mod common;

use chrono::{Datelike, Duration};

use common::{catalog_with_48h_targets, date, employee, team, three_teams_of_five};
use scheduling_engine::{
    Absence, Engine, EmployeeShiftLock, InMemoryHistory, LockInput, NoHistory, PlanRequest,
    ShiftAssignment, SolverStatus, TeamShiftLock,
};
use shared::{AbsenceCode, AssignmentId, EmployeeId, ShiftCode, TeamId, HOURS_SCALE};

fn january_request() -> PlanRequest {
    let (employees, teams) = three_teams_of_five();
    PlanRequest {
        start: date(2026, 1, 1),
        end: date(2026, 1, 31),
        employees,
        teams,
        shift_types: Some(catalog_with_48h_targets()),
        absences: vec![],
        locks: LockInput::default(),
        time_limit_s: Some(2),
        workers: Some(2),
    }
}

#[test]
fn test_basic_month_is_feasible_and_validated() {
    let mut engine = Engine::with_default_settings();
    let report = engine.plan(january_request(), &NoHistory).unwrap();

    assert!(
        matches!(
            report.outcome.status,
            SolverStatus::Feasible | SolverStatus::Optimal
        ),
        "unexpected status {:?}",
        report.outcome.status
    );
    let validation = report.validation.as_ref().unwrap();
    assert!(
        validation.is_valid(),
        "validator rejected the roster: {:?}",
        validation.violations
    );
    assert!(report.is_accepted());

    // Every employee appears on every extended-window date.
    assert_eq!(report.outcome.complete_schedule.len(), 15 * 35);
}

#[test]
fn test_basic_month_hour_envelope() {
    let mut engine = Engine::with_default_settings();
    let request = january_request();
    let employees = request.employees.clone();
    let report = engine.plan(request, &NoHistory).unwrap();
    assert!(report.is_accepted());

    for employee in &employees {
        let scaled: i64 = report
            .outcome
            .assignments
            .iter()
            .filter(|a| a.employee_id == employee.id)
            .filter(|a| a.date >= date(2026, 1, 1) && a.date <= date(2026, 1, 31))
            .map(|_| 8 * HOURS_SCALE)
            .sum();
        assert!(
            (1100..=2000).contains(&scaled),
            "{} works {scaled} scaled hours in January",
            employee.full_name()
        );
    }
}

#[test]
fn test_cross_month_chain_is_not_extended() {
    // Six consecutive S days persisted right before the extended April
    // window; the lookback must refuse a seventh working day.
    let (employees, teams) = three_teams_of_five();
    let start = date(2026, 4, 1);
    // April 1st 2026 is a Wednesday; the extended window opens on
    // Sunday March 29th.
    let extended_start = date(2026, 3, 29);
    let chained = EmployeeId(10);

    let history: Vec<ShiftAssignment> = (1..=6)
        .map(|i| ShiftAssignment {
            id: AssignmentId(i),
            employee_id: chained,
            shift_code: ShiftCode::S,
            date: extended_start - Duration::days(i),
            is_manual: false,
            is_fixed: true,
            is_springer_assignment: false,
            notes: None,
        })
        .collect();

    let mut engine = Engine::with_default_settings();
    let report = engine
        .plan(
            PlanRequest {
                start,
                end: date(2026, 4, 30),
                employees,
                teams,
                shift_types: Some(catalog_with_48h_targets()),
                absences: vec![],
                locks: LockInput::default(),
                time_limit_s: Some(2),
                workers: Some(2),
            },
            &InMemoryHistory::new(history),
        )
        .unwrap();

    assert!(report.is_accepted());
    // The first window day would be the seventh consecutive working
    // day for the chained employee; it must stay a rest day.
    assert_eq!(
        report
            .outcome
            .complete_schedule
            .get(chained, extended_start),
        Some("+")
    );
}

#[test]
fn test_night_overflow_guard_and_ratio() {
    let mut engine = Engine::with_default_settings();
    let report = engine.plan(january_request(), &NoHistory).unwrap();
    assert!(report.is_accepted());

    for d in 0..35 {
        let day = date(2025, 12, 28) + Duration::days(d);
        let count = |code: &ShiftCode| {
            report
                .outcome
                .assignments
                .iter()
                .filter(|a| a.date == day && &a.shift_code == code)
                .count()
        };
        let n = count(&ShiftCode::N);
        if day.weekday().num_days_from_monday() < 5 {
            assert!(n <= 3, "{day}: {n} employees on N exceeds the maximum of 3");
            let f = count(&ShiftCode::F);
            let s = count(&ShiftCode::S);
            assert!(
                f >= s && s >= n,
                "{day}: ratio F={f} S={s} N={n} out of order"
            );
        }
    }
}

#[test]
fn test_lock_conflict_drops_employee_lock() {
    // Week 0 of the extended window starts Sunday Dec 28; lock team 1
    // to F and a member of team 1 to S on a weekday of that week.
    let locks = LockInput {
        team_shift: vec![TeamShiftLock {
            team_id: TeamId(1),
            week_index: 0,
            shift: ShiftCode::F,
        }],
        employee_shift: vec![EmployeeShiftLock {
            employee_id: EmployeeId(10),
            date: date(2025, 12, 29),
            shift: ShiftCode::S,
        }],
        ..Default::default()
    };

    let mut engine = Engine::with_default_settings();
    let report = engine
        .plan(
            PlanRequest {
                locks,
                ..january_request()
            },
            &NoHistory,
        )
        .unwrap();

    assert!(report.is_accepted());
    assert!(report
        .notifications
        .iter()
        .any(|n| n.trigger_type() == "locked_assignment_conflict"));

    // The dropped employee lock must not surface in the roster; the
    // team lock must.
    assert!(!report
        .outcome
        .assignments
        .iter()
        .any(|a| a.employee_id == EmployeeId(10)
            && a.date == date(2025, 12, 29)
            && a.shift_code == ShiftCode::S));
    let team_codes: Vec<ShiftCode> = report
        .outcome
        .assignments
        .iter()
        .filter(|a| (10..15).contains(&a.employee_id.0))
        .filter(|a| a.date >= date(2025, 12, 28) && a.date <= date(2026, 1, 3))
        .map(|a| a.shift_code.clone())
        .collect();
    assert!(!team_codes.is_empty());
    assert!(team_codes.iter().all(|c| *c == ShiftCode::F));
}

#[test]
fn test_training_absence_counts_toward_hours() {
    let (employees, teams) = three_teams_of_five();
    let absences = vec![Absence {
        id: 1,
        employee_id: EmployeeId(10),
        code: AbsenceCode::L,
        start_date: date(2026, 1, 12),
        end_date: date(2026, 1, 18),
        notes: None,
    }];

    let mut engine = Engine::with_default_settings();
    let report = engine
        .plan(
            PlanRequest {
                absences: absences.clone(),
                employees: employees.clone(),
                teams,
                ..january_request()
            },
            &NoHistory,
        )
        .unwrap();
    assert!(report.is_accepted());

    // No shift during the training week.
    assert!(!report
        .outcome
        .assignments
        .iter()
        .any(|a| a.employee_id == EmployeeId(10)
            && a.date >= date(2026, 1, 12)
            && a.date <= date(2026, 1, 18)));

    let catalog = scheduling_engine::ShiftCatalog::standard();
    let stats = scheduling_engine::compute_statistics(
        &employees,
        &report.outcome.assignments,
        &absences,
        &catalog,
        date(2026, 1, 1),
        date(2026, 1, 31),
    );
    let stat = stats
        .iter()
        .find(|s| s.employee_id == EmployeeId(10))
        .unwrap();
    // Training days count 8 h apiece on top of worked shifts.
    assert_eq!(stat.training_scaled_hours, 7 * 8 * HOURS_SCALE);
    assert_eq!(
        stat.total_scaled_hours,
        stat.worked_scaled_hours + 7 * 8 * HOURS_SCALE
    );
}

#[test]
fn test_replanning_never_worsens_the_objective() {
    // A single seeded worker with a small convergence budget and a
    // generous deadline finishes deterministically, so replanning the
    // same inputs cannot yield a higher objective.
    let mut settings = scheduling_engine::Settings::default();
    settings.solver.improvement_budget = 500;
    let mut engine = Engine::new(settings);

    let request = || PlanRequest {
        time_limit_s: Some(30),
        workers: Some(1),
        ..january_request()
    };
    let first = engine.plan(request(), &NoHistory).unwrap();
    let second = engine.plan(request(), &NoHistory).unwrap();

    let a = first.outcome.objective.unwrap();
    let b = second.outcome.objective.unwrap();
    assert!(b <= a, "replanning worsened the objective: {a} -> {b}");
}

#[test]
fn test_infeasible_inputs_produce_diagnostics() {
    // One team of five cannot run a 24×7 triple-shift operation.
    let employees: Vec<_> = (1..=5).map(|i| employee(i, Some(1))).collect();
    let mut engine = Engine::with_default_settings();
    let report = engine
        .plan(
            PlanRequest {
                start: date(2026, 1, 1),
                end: date(2026, 1, 31),
                employees,
                teams: vec![team(1)],
                shift_types: None,
                absences: vec![],
                locks: LockInput::default(),
                time_limit_s: Some(1),
                workers: Some(1),
            },
            &NoHistory,
        )
        .unwrap();

    assert_eq!(report.outcome.status, SolverStatus::Infeasible);
    assert!(report.outcome.assignments.is_empty());
    assert!(!report.outcome.diagnostics.infeasibility_reasons.is_empty());
    assert_eq!(report.outcome.diagnostics.shift_eligibility.len(), 3);
    assert!(report.validation.is_none());
}
