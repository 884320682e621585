mod common;

use chrono::NaiveDate;

use common::{date, employee, team};
use scheduling_engine::{Absence, Engine, ShiftAssignment, ShiftCatalog};
use shared::{AbsenceCode, AssignmentId, EmployeeId, ShiftCode};

fn assignment(id: i64, emp: i64, date: NaiveDate, code: ShiftCode) -> ShiftAssignment {
    ShiftAssignment {
        id: AssignmentId(id),
        employee_id: EmployeeId(emp),
        shift_code: code,
        date,
        is_manual: false,
        is_fixed: false,
        is_springer_assignment: false,
        notes: None,
    }
}

#[test]
fn test_springer_substitution_covers_both_shifts() {
    // A persisted roster, then a three-day vacation covering two
    // shifts. Employee 2 worked N the night before the first shift, so
    // an F replacement would break the rest rule; employee 3 is clean
    // and takes both shifts.
    let employees = vec![
        employee(1, Some(1)),
        employee(2, Some(1)),
        employee(3, Some(1)),
    ];
    let teams = vec![team(1)];
    let catalog = ShiftCatalog::standard();

    let mut roster = vec![
        assignment(1, 1, date(2026, 2, 10), ShiftCode::F),
        assignment(2, 1, date(2026, 2, 11), ShiftCode::F),
        assignment(3, 2, date(2026, 2, 9), ShiftCode::N),
    ];
    let vacation = Absence {
        id: 7,
        employee_id: EmployeeId(1),
        code: AbsenceCode::U,
        start_date: date(2026, 2, 10),
        end_date: date(2026, 2, 12),
        notes: None,
    };

    let mut engine = Engine::with_default_settings();
    let outcome = engine
        .replace_after_absence(
            &vacation,
            &employees,
            &teams,
            &catalog,
            &[vacation.clone()],
            &mut roster,
        )
        .unwrap();

    assert_eq!(outcome.removed.len(), 2);
    assert_eq!(outcome.replacements.len(), 2);
    assert!(outcome.uncovered.is_empty());

    // Feb 10: employee 2 is rejected (N on Feb 9 -> F would leave no
    // rest), employee 3 steps in.
    let first = &outcome.replacements[0];
    assert_eq!(first.date, date(2026, 2, 10));
    assert_eq!(first.employee_id, EmployeeId(3));
    assert!(first.is_fixed);
    assert!(first.is_springer_assignment);

    // Feb 11: employee 2 is free of the rest conflict by then, and
    // ranks first again.
    let second = &outcome.replacements[1];
    assert_eq!(second.date, date(2026, 2, 11));
    assert_eq!(second.employee_id, EmployeeId(2));

    // The absent employee no longer appears inside the absence range.
    assert!(!roster
        .iter()
        .any(|a| a.employee_id == EmployeeId(1) && vacation.overlaps(a.date)));

    let notifications = engine.drain_notifications();
    assert_eq!(
        notifications
            .iter()
            .filter(|n| n.trigger_type() == "springer_assigned")
            .count(),
        2
    );
    assert!(notifications
        .iter()
        .any(|n| n.trigger_type() == "absence_after_scheduling"));
}

#[test]
fn test_unattached_floater_used_when_team_is_busy() {
    let employees = vec![
        employee(1, Some(1)),
        employee(2, Some(1)),
        employee(9, None),
    ];
    let teams = vec![team(1)];
    let catalog = ShiftCatalog::standard();

    let shift_date = date(2026, 2, 10);
    let mut roster = vec![
        assignment(1, 1, shift_date, ShiftCode::S),
        // The only teammate already works that day.
        assignment(2, 2, shift_date, ShiftCode::F),
    ];
    let sick = Absence {
        id: 8,
        employee_id: EmployeeId(1),
        code: AbsenceCode::Au,
        start_date: shift_date,
        end_date: shift_date,
        notes: None,
    };

    let mut engine = Engine::with_default_settings();
    let outcome = engine
        .replace_after_absence(&sick, &employees, &teams, &catalog, &[sick.clone()], &mut roster)
        .unwrap();

    assert_eq!(outcome.replacements.len(), 1);
    assert_eq!(outcome.replacements[0].employee_id, EmployeeId(9));
}

#[test]
fn test_uncovered_shift_reports_understaffing() {
    let employees = vec![employee(1, Some(1)), employee(2, Some(1))];
    let teams = vec![team(1)];
    let catalog = ShiftCatalog::standard();

    let shift_date = date(2026, 2, 10);
    let mut roster = vec![
        assignment(1, 1, shift_date, ShiftCode::N),
        assignment(2, 2, shift_date, ShiftCode::N),
    ];
    let sick = Absence {
        id: 9,
        employee_id: EmployeeId(1),
        code: AbsenceCode::Au,
        start_date: shift_date,
        end_date: shift_date,
        notes: None,
    };

    let mut engine = Engine::with_default_settings();
    let outcome = engine
        .replace_after_absence(&sick, &employees, &teams, &catalog, &[sick.clone()], &mut roster)
        .unwrap();

    assert!(outcome.replacements.is_empty());
    assert_eq!(outcome.uncovered, vec![(shift_date, ShiftCode::N)]);

    let notifications = engine.drain_notifications();
    let record = notifications
        .iter()
        .find(|n| n.trigger_type() == "no_replacement_available")
        .unwrap();
    assert!(record.description.contains("NO REPLACEMENT AVAILABLE"));
}
