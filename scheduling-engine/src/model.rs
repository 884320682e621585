use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use tracing::info;

use shared::{AbsenceCode, EmployeeId, EngineError, EngineResult, ShiftCode, TeamId, HOURS_SCALE};

use crate::domain::{Absence, Employee, LockInput, RotationGroup, ShiftCatalog, Team};
use crate::locks::{consolidate, ConsolidatedLocks, LockConflict};
use crate::roster::DayCell;
use crate::rules::{standard_rules, ConstraintRule};
use crate::settings::Settings;
use crate::window::PlanningWindow;

/// Everything the constraint rules, the solver and the validator need to
/// know about one planning run. Decision variables exist implicitly as
/// the roster cells over `employees × dates`, the per-week team shift
/// choices and the per-week TD holders; locks and absences pin parts of
/// that domain.
pub struct PlanningContext {
    pub employees: Vec<Employee>,
    pub teams: Vec<Team>,
    pub catalog: ShiftCatalog,
    pub window: PlanningWindow,
    pub absences: Vec<Absence>,
    pub locks: ConsolidatedLocks,
    pub lookback: HashMap<(EmployeeId, NaiveDate), ShiftCode>,
    pub settings: Settings,
    pub rotation: RotationGroup,
    pub main_codes: Vec<ShiftCode>,

    emp_index: HashMap<EmployeeId, usize>,
    pub team_members: HashMap<TeamId, Vec<usize>>,
    /// Unattached employees, counted separately as floaters.
    pub springers: Vec<usize>,
    absence_cells: HashMap<(usize, usize), AbsenceCode>,
}

impl PlanningContext {
    pub fn n_employees(&self) -> usize {
        self.employees.len()
    }

    pub fn n_days(&self) -> usize {
        self.window.dates.len()
    }

    pub fn n_weeks(&self) -> usize {
        self.window.weeks.len()
    }

    pub fn date(&self, day: usize) -> NaiveDate {
        self.window.dates[day]
    }

    pub fn employee_index(&self, id: EmployeeId) -> Option<usize> {
        self.emp_index.get(&id).copied()
    }

    pub fn absence_on(&self, employee: usize, day: usize) -> Option<AbsenceCode> {
        self.absence_cells.get(&(employee, day)).copied()
    }

    pub fn is_absent(&self, employee: usize, day: usize) -> bool {
        self.absence_cells.contains_key(&(employee, day))
    }

    /// Teams that take part in the weekly rotation: non-virtual, with at
    /// least one member, ordered by id.
    pub fn rotation_teams(&self) -> Vec<&Team> {
        let mut teams: Vec<&Team> = self
            .teams
            .iter()
            .filter(|t| !t.is_virtual)
            .filter(|t| {
                self.team_members
                    .get(&t.id)
                    .map(|m| !m.is_empty())
                    .unwrap_or(false)
            })
            .collect();
        teams.sort_by_key(|t| t.id);
        teams
    }

    pub fn scaled_hours_for_cell(&self, cell: &DayCell) -> i64 {
        match cell {
            DayCell::Shift(code) => self.catalog.scaled_hours(code),
            DayCell::Td => 8 * HOURS_SCALE,
            DayCell::Bmt => self.catalog.scaled_hours(&ShiftCode::Bmt),
            DayCell::Bsb => self.catalog.scaled_hours(&ShiftCode::Bsb),
            DayCell::Rest | DayCell::Absent(_) => 0,
        }
    }

    pub fn per_type_limit(&self, code: &ShiftCode) -> u32 {
        if let Some(limit) = self.settings.planning.max_consecutive_days_override {
            return limit;
        }
        self.catalog
            .by_code(code)
            .map(|t| t.max_consecutive_days)
            .unwrap_or(6)
    }

    /// Cross-type limit on total consecutive working days.
    pub fn total_consecutive_limit(&self) -> u32 {
        self.settings
            .planning
            .max_consecutive_days_override
            .unwrap_or_else(|| self.catalog.max_consecutive_limit())
    }

    /// The persisted shift on the day right before the extended window.
    pub fn lookback_shift_before_window(&self, employee: usize) -> Option<&ShiftCode> {
        let id = self.employees[employee].id;
        let day_before = self.window.extended_start - Duration::days(1);
        self.lookback.get(&(id, day_before))
    }

    /// Length of the consecutive working chain that ends on the day
    /// before the extended window.
    pub fn lookback_trailing_total(&self, employee: usize) -> u32 {
        let id = self.employees[employee].id;
        let mut count = 0;
        let mut day = self.window.extended_start - Duration::days(1);
        while self.lookback.contains_key(&(id, day)) {
            count += 1;
            day -= Duration::days(1);
        }
        count
    }

    /// Length of the same-type chain that ends right before the window.
    pub fn lookback_trailing_same(&self, employee: usize, code: &ShiftCode) -> u32 {
        let id = self.employees[employee].id;
        let mut count = 0;
        let mut day = self.window.extended_start - Duration::days(1);
        while self.lookback.get(&(id, day)) == Some(code) {
            count += 1;
            day -= Duration::days(1);
        }
        count
    }

    pub fn is_springer(&self, employee: usize) -> bool {
        self.employees[employee].is_unattached()
    }

    /// Qualified floaters and members eligible for TD.
    pub fn td_qualified(&self) -> Vec<usize> {
        (0..self.n_employees())
            .filter(|e| self.employees[*e].can_do_td())
            .collect()
    }

    pub fn bmt_qualified(&self) -> Vec<usize> {
        (0..self.n_employees())
            .filter(|e| self.employees[*e].is_fire_alarm_technician)
            .collect()
    }

    pub fn bsb_qualified(&self) -> Vec<usize> {
        (0..self.n_employees())
            .filter(|e| self.employees[*e].is_fire_safety_officer)
            .collect()
    }
}

/// The assembled model: pinned domains plus the rule set the solver
/// scores candidate rosters against.
pub struct PlanningModel {
    pub context: PlanningContext,
    pub rules: Vec<Box<dyn ConstraintRule>>,
    pub lock_warnings: Vec<LockConflict>,
}

pub struct ModelBuilder;

impl ModelBuilder {
    /// Validates the input snapshot eagerly, consolidates the operator
    /// locks and assembles the planning model. Structural input problems
    /// raise; lock conflicts are accumulated as warnings.
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        window: PlanningWindow,
        employees: Vec<Employee>,
        teams: Vec<Team>,
        catalog: ShiftCatalog,
        absences: Vec<Absence>,
        lock_input: &LockInput,
        lookback: HashMap<(EmployeeId, NaiveDate), ShiftCode>,
        settings: Settings,
    ) -> EngineResult<PlanningModel> {
        let mut employees = employees;
        employees.sort_by_key(|e| e.id);
        for pair in employees.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(EngineError::InvalidInput(format!(
                    "duplicate employee id {}",
                    pair[0].id
                )));
            }
        }

        let team_ids: Vec<TeamId> = teams.iter().map(|t| t.id).collect();
        for employee in &employees {
            if let Some(team_id) = employee.team_id {
                if !team_ids.contains(&team_id) {
                    return Err(EngineError::UnknownTeam(team_id.0));
                }
            }
        }
        for team in &teams {
            for code in &team.allowed_shift_codes {
                if catalog.by_code(code).is_none() {
                    return Err(EngineError::UnknownShiftCode(code.to_string()));
                }
            }
        }

        let emp_index: HashMap<EmployeeId, usize> = employees
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id, i))
            .collect();

        for absence in &absences {
            if absence.start_date > absence.end_date {
                return Err(EngineError::InvalidDateRange {
                    start: absence.start_date,
                    end: absence.end_date,
                });
            }
            if !emp_index.contains_key(&absence.employee_id) {
                return Err(EngineError::UnknownEmployee(absence.employee_id.0));
            }
        }

        let (locks, lock_warnings) = consolidate(
            lock_input,
            &employees,
            &teams,
            &catalog,
            &absences,
            &window,
        );

        let mut team_members: HashMap<TeamId, Vec<usize>> = HashMap::new();
        let mut springers = Vec::new();
        for (i, employee) in employees.iter().enumerate() {
            match employee.team_id {
                Some(team_id) => team_members.entry(team_id).or_default().push(i),
                None => springers.push(i),
            }
        }

        let mut absence_cells = HashMap::new();
        for absence in &absences {
            let employee = emp_index[&absence.employee_id];
            for date in absence.dates() {
                if let Some(day) = window.day_index(date) {
                    absence_cells.insert((employee, day), absence.code);
                }
            }
        }

        let rotation = settings
            .planning
            .rotation_pattern
            .iter()
            .map(|c| c.parse::<ShiftCode>())
            .collect::<Result<Vec<_>, _>>()
            .ok()
            .and_then(|codes| RotationGroup::from_codes(&codes))
            .unwrap_or_else(RotationGroup::standard);

        let main_codes = catalog.main_codes();
        if main_codes.is_empty() {
            return Err(EngineError::InvalidInput(
                "catalog contains none of the rotating main shifts".to_string(),
            ));
        }

        info!(
            employees = employees.len(),
            teams = teams.len(),
            weeks = window.weeks.len(),
            absences = absences.len(),
            lock_conflicts = lock_warnings.len(),
            "planning model assembled"
        );

        let context = PlanningContext {
            employees,
            teams,
            catalog,
            window,
            absences,
            locks,
            lookback,
            settings,
            rotation,
            main_codes,
            emp_index,
            team_members,
            springers,
            absence_cells,
        };

        Ok(PlanningModel {
            rules: standard_rules(),
            context,
            lock_warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::PlanningWindow;

    fn employee(id: i64, team: Option<i64>) -> Employee {
        Employee {
            id: EmployeeId(id),
            personnel_number: format!("PN{id:03}"),
            first_name: "Jo".to_string(),
            last_name: format!("Nagel{id}"),
            email: None,
            team_id: team.map(TeamId),
            is_td_qualified: false,
            is_fire_alarm_technician: false,
            is_fire_safety_officer: false,
            is_team_leader: false,
            is_temporary_worker: false,
        }
    }

    fn team(id: i64) -> Team {
        Team {
            id: TeamId(id),
            name: format!("Team {id}"),
            description: None,
            is_virtual: false,
            allowed_shift_codes: vec![],
            rotation_group: None,
        }
    }

    fn window() -> PlanningWindow {
        PlanningWindow::expand(
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 28).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_unknown_team_reference_is_input_error() {
        let result = ModelBuilder::build(
            window(),
            vec![employee(1, Some(7))],
            vec![team(1)],
            ShiftCatalog::standard(),
            vec![],
            &LockInput::default(),
            HashMap::new(),
            Settings::default(),
        );
        assert!(matches!(result, Err(EngineError::UnknownTeam(7))));
    }

    #[test]
    fn test_absence_with_unknown_employee_rejected() {
        let result = ModelBuilder::build(
            window(),
            vec![employee(1, Some(1))],
            vec![team(1)],
            ShiftCatalog::standard(),
            vec![Absence {
                id: 1,
                employee_id: EmployeeId(99),
                code: AbsenceCode::U,
                start_date: NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2026, 2, 3).unwrap(),
                notes: None,
            }],
            &LockInput::default(),
            HashMap::new(),
            Settings::default(),
        );
        assert!(matches!(result, Err(EngineError::UnknownEmployee(99))));
    }

    #[test]
    fn test_springers_are_unattached_employees() {
        let model = ModelBuilder::build(
            window(),
            vec![employee(1, Some(1)), employee(2, None)],
            vec![team(1)],
            ShiftCatalog::standard(),
            vec![],
            &LockInput::default(),
            HashMap::new(),
            Settings::default(),
        )
        .unwrap();
        assert_eq!(model.context.springers.len(), 1);
        assert!(model.context.is_springer(model.context.springers[0]));
    }

    #[test]
    fn test_absence_cells_indexed_per_day() {
        let model = ModelBuilder::build(
            window(),
            vec![employee(1, Some(1))],
            vec![team(1)],
            ShiftCatalog::standard(),
            vec![Absence {
                id: 1,
                employee_id: EmployeeId(1),
                code: AbsenceCode::L,
                start_date: NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2026, 2, 4).unwrap(),
                notes: None,
            }],
            &LockInput::default(),
            HashMap::new(),
            Settings::default(),
        )
        .unwrap();
        let ctx = &model.context;
        let day = ctx
            .window
            .day_index(NaiveDate::from_ymd_opt(2026, 2, 3).unwrap())
            .unwrap();
        assert_eq!(ctx.absence_on(0, day), Some(AbsenceCode::L));
    }
}
