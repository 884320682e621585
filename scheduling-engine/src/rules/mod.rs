pub mod absence_mask_rule;
pub mod consecutive_days_rule;
pub mod fairness_rule;
pub mod lock_fidelity_rule;
pub mod rest_transition_rule;
pub mod shift_ratio_rule;
pub mod special_function_rule;
pub mod springer_availability_rule;
pub mod staffing_bounds_rule;
pub mod team_rotation_rule;
pub mod working_hours_rule;

use crate::model::PlanningContext;
use crate::roster::RosterState;

pub use absence_mask_rule::AbsenceMaskRule;
pub use consecutive_days_rule::ConsecutiveDaysRule;
pub use fairness_rule::FairnessRule;
pub use lock_fidelity_rule::LockFidelityRule;
pub use rest_transition_rule::RestTransitionRule;
pub use shift_ratio_rule::ShiftRatioRule;
pub use special_function_rule::SpecialFunctionRule;
pub use springer_availability_rule::SpringerAvailabilityRule;
pub use staffing_bounds_rule::StaffingBoundsRule;
pub use team_rotation_rule::TeamRotationRule;
pub use working_hours_rule::WorkingHoursRule;

/// Accumulated score of one rule over one candidate roster. Hard units
/// must reach zero for a roster to count as feasible; penalties are
/// summed into the weighted objective.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleScore {
    pub hard: u64,
    pub penalty: i64,
}

impl RuleScore {
    pub fn add_hard(&mut self, units: u64) {
        self.hard += units;
    }

    pub fn add_penalty(&mut self, weight: i64) {
        self.penalty += weight;
    }
}

/// One rule family of the constraint library. Rules score a complete
/// candidate roster; the solver never sees rule internals.
pub trait ConstraintRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn evaluate(&self, ctx: &PlanningContext, roster: &RosterState, score: &mut RuleScore);
}

/// The full rule set in evaluation order.
pub fn standard_rules() -> Vec<Box<dyn ConstraintRule>> {
    vec![
        Box::new(AbsenceMaskRule),
        Box::new(LockFidelityRule),
        Box::new(StaffingBoundsRule),
        Box::new(RestTransitionRule),
        Box::new(ConsecutiveDaysRule),
        Box::new(WorkingHoursRule),
        Box::new(TeamRotationRule),
        Box::new(SpecialFunctionRule),
        Box::new(SpringerAvailabilityRule),
        Box::new(ShiftRatioRule),
        Box::new(FairnessRule),
    ]
}

/// Evaluates every rule and sums the scores.
pub fn evaluate_all(
    rules: &[Box<dyn ConstraintRule>],
    ctx: &PlanningContext,
    roster: &RosterState,
) -> RuleScore {
    let mut total = RuleScore::default();
    for rule in rules {
        rule.evaluate(ctx, roster, &mut total);
    }
    total
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;

    use chrono::NaiveDate;

    use shared::{EmployeeId, ShiftCode, TeamId};

    use crate::domain::{Absence, Employee, LockInput, ShiftCatalog, Team};
    use crate::model::{ModelBuilder, PlanningContext, PlanningModel};
    use crate::roster::{DayCell, RosterState};
    use crate::settings::Settings;
    use crate::window::PlanningWindow;

    pub fn employee(id: i64, team: Option<i64>) -> Employee {
        Employee {
            id: EmployeeId(id),
            personnel_number: format!("PN{id:03}"),
            first_name: "Kim".to_string(),
            last_name: format!("Beispiel{id}"),
            email: None,
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

    /// One aligned four-week window (Feb 2026) with the given staff.
    pub fn model_for(
        employees: Vec<Employee>,
        teams: Vec<Team>,
        absences: Vec<Absence>,
    ) -> PlanningModel {
        let window = PlanningWindow::expand(
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 28).unwrap(),
        )
        .unwrap();
        ModelBuilder::build(
            window,
            employees,
            teams,
            ShiftCatalog::standard(),
            absences,
            &LockInput::default(),
            HashMap::new(),
            Settings::default(),
        )
        .unwrap()
    }

    pub fn empty_roster(ctx: &PlanningContext) -> RosterState {
        let mut roster = RosterState::new(ctx.n_employees(), ctx.n_days(), ctx.n_weeks());
        for e in 0..ctx.n_employees() {
            for d in 0..ctx.n_days() {
                if let Some(code) = ctx.absence_on(e, d) {
                    roster.set_cell(e, d, DayCell::Absent(code));
                }
            }
        }
        roster
    }

    /// Paints a whole week of one shift for an employee, weekdays only.
    pub fn paint_weekdays(
        ctx: &PlanningContext,
        roster: &mut RosterState,
        employee: usize,
        week: usize,
        code: ShiftCode,
    ) {
        let week = &ctx.window.weeks[week];
        for date in week.weekdays() {
            let day = ctx.window.day_index(date).unwrap();
            roster.set_cell(employee, day, DayCell::Shift(code.clone()));
        }
    }
}
