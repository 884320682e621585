#![allow(dead_code)]

use chrono::NaiveDate;

use scheduling_engine::{Employee, ShiftCatalog, ShiftType, Team};
use shared::{EmployeeId, ShiftCode, TeamId};

pub fn employee(id: i64, team: Option<i64>) -> Employee {
    Employee {
        id: EmployeeId(id),
        personnel_number: format!("PN{id:03}"),
        first_name: "Alex".to_string(),
        last_name: format!("Muster{id}"),
        email: Some(format!("alex.muster{id}@example.org")),
        team_id: team.map(TeamId),
        is_td_qualified: false,
        is_fire_alarm_technician: false,
        is_fire_safety_officer: false,
        is_team_leader: false,
        is_temporary_worker: false,
    }
}

pub fn team(id: i64) -> Team {
    Team {
        id: TeamId(id),
        name: format!("Team {id}"),
        description: None,
        is_virtual: false,
        allowed_shift_codes: vec![],
        rotation_group: None,
    }
}

/// Three teams of five, the standard staffing arrangement.
pub fn three_teams_of_five() -> (Vec<Employee>, Vec<Team>) {
    let mut employees = Vec::new();
    for t in 1..=3 {
        for i in 0..5 {
            employees.push(employee(t * 10 + i, Some(t)));
        }
    }
    (employees, (1..=3).map(team).collect())
}

/// The standard catalog with the main shifts raised to a 48 h weekly
/// target.
pub fn catalog_with_48h_targets() -> Vec<ShiftType> {
    ShiftCatalog::standard()
        .types()
        .iter()
        .cloned()
        .map(|mut t| {
            if t.code.is_main() {
                t.weekly_working_hours = 48.0;
            }
            t
        })
        .collect()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn main_codes() -> [ShiftCode; 3] {
    [ShiftCode::F, ShiftCode::S, ShiftCode::N]
}
