use chrono::{Datelike, Weekday};

use shared::ShiftCode;

use super::{ConstraintRule, RuleScore};
use crate::model::PlanningContext;
use crate::roster::RosterState;

/// Transitions that break the 11-hour minimum rest: late→early leaves
/// 8 h, night→early leaves none.
const FORBIDDEN: [(ShiftCode, ShiftCode); 2] = [
    (ShiftCode::S, ShiftCode::F),
    (ShiftCode::N, ShiftCode::F),
];

/// Forbids the rest-breaking day-to-day transitions. The single
/// tolerated case is the rotation flip at the week boundary: a Saturday
/// shift followed by the opening Sunday of the next rotation week, when
/// the Sunday matches the employee's team shift for that week. That
/// pair is tracked as a soft penalty instead.
pub struct RestTransitionRule;

impl RestTransitionRule {
    fn is_rotation_boundary(
        ctx: &PlanningContext,
        roster: &RosterState,
        employee: usize,
        to_day: usize,
        to_code: &ShiftCode,
    ) -> bool {
        let to_date = ctx.date(to_day);
        if to_date.weekday() != Weekday::Sun {
            return false;
        }
        let Some(team_id) = ctx.employees[employee].team_id else {
            return false;
        };
        let Some(week) = ctx.window.week_index_of(to_date) else {
            return false;
        };
        roster.team_week_shift.get(&(team_id, week)) == Some(to_code)
    }
}

impl ConstraintRule for RestTransitionRule {
    fn name(&self) -> &'static str {
        "rest_transition"
    }

    fn evaluate(&self, ctx: &PlanningContext, roster: &RosterState, score: &mut RuleScore) {
        let exception_weight = ctx.settings.penalties.rest_exception;
        for e in 0..ctx.n_employees() {
            for d in 0..ctx.n_days() {
                let Some(to_code) = roster.cell(e, d).shift_code() else {
                    continue;
                };
                let from_code = if d == 0 {
                    ctx.lookback_shift_before_window(e)
                } else {
                    roster.cell(e, d - 1).shift_code()
                };
                let Some(from_code) = from_code else {
                    continue;
                };
                let forbidden = FORBIDDEN
                    .iter()
                    .any(|(from, to)| from == from_code && to == to_code);
                if !forbidden {
                    continue;
                }
                if Self::is_rotation_boundary(ctx, roster, e, d, to_code) {
                    score.add_penalty(exception_weight);
                } else {
                    score.add_hard(1);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::DayCell;
    use crate::rules::test_support::{employee, empty_roster, model_for, team};
    use chrono::NaiveDate;
    use shared::TeamId;

    #[test]
    fn test_late_to_early_is_forbidden() {
        let model = model_for(vec![employee(1, Some(1))], vec![team(1)], vec![]);
        let ctx = &model.context;
        let mut roster = empty_roster(ctx);
        // Tuesday and Wednesday of the first week.
        let tue = ctx
            .window
            .day_index(NaiveDate::from_ymd_opt(2026, 2, 3).unwrap())
            .unwrap();
        roster.set_cell(0, tue, DayCell::Shift(ShiftCode::S));
        roster.set_cell(0, tue + 1, DayCell::Shift(ShiftCode::F));

        let mut score = RuleScore::default();
        RestTransitionRule.evaluate(ctx, &roster, &mut score);
        assert_eq!(score.hard, 1);
    }

    #[test]
    fn test_night_to_night_is_allowed() {
        let model = model_for(vec![employee(1, Some(1))], vec![team(1)], vec![]);
        let ctx = &model.context;
        let mut roster = empty_roster(ctx);
        let tue = ctx
            .window
            .day_index(NaiveDate::from_ymd_opt(2026, 2, 3).unwrap())
            .unwrap();
        roster.set_cell(0, tue, DayCell::Shift(ShiftCode::N));
        roster.set_cell(0, tue + 1, DayCell::Shift(ShiftCode::N));

        let mut score = RuleScore::default();
        RestTransitionRule.evaluate(ctx, &roster, &mut score);
        assert_eq!(score.hard, 0);
        assert_eq!(score.penalty, 0);
    }

    #[test]
    fn test_week_boundary_rotation_flip_is_soft() {
        let model = model_for(vec![employee(1, Some(1))], vec![team(1)], vec![]);
        let ctx = &model.context;
        let mut roster = empty_roster(ctx);
        // Saturday Feb 7 closes week 0; Sunday Feb 8 opens week 1.
        let sat = ctx
            .window
            .day_index(NaiveDate::from_ymd_opt(2026, 2, 7).unwrap())
            .unwrap();
        roster.set_cell(0, sat, DayCell::Shift(ShiftCode::S));
        roster.set_cell(0, sat + 1, DayCell::Shift(ShiftCode::F));
        roster.team_week_shift.insert((TeamId(1), 1), ShiftCode::F);

        let mut score = RuleScore::default();
        RestTransitionRule.evaluate(ctx, &roster, &mut score);
        assert_eq!(score.hard, 0);
        assert_eq!(score.penalty, ctx.settings.penalties.rest_exception);
    }

    #[test]
    fn test_lookback_shift_feeds_first_window_day() {
        use std::collections::HashMap;

        use crate::domain::{LockInput, ShiftCatalog};
        use crate::model::ModelBuilder;
        use crate::settings::Settings;
        use crate::window::PlanningWindow;
        use shared::EmployeeId;

        let window = PlanningWindow::expand(
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 28).unwrap(),
        )
        .unwrap();
        let mut lookback = HashMap::new();
        lookback.insert(
            (EmployeeId(1), NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()),
            ShiftCode::N,
        );
        let model = ModelBuilder::build(
            window,
            vec![employee(1, Some(1))],
            vec![team(1)],
            ShiftCatalog::standard(),
            vec![],
            &LockInput::default(),
            lookback,
            Settings::default(),
        )
        .unwrap();
        let ctx = &model.context;
        let mut roster = empty_roster(ctx);
        // F on the first window day right after a persisted N: the team
        // holds S that week, so no rotation-boundary tolerance applies.
        roster.set_cell(0, 0, DayCell::Shift(ShiftCode::F));
        roster.team_week_shift.insert((TeamId(1), 0), ShiftCode::S);

        let mut score = RuleScore::default();
        RestTransitionRule.evaluate(ctx, &roster, &mut score);
        assert_eq!(score.hard, 1);
    }
}
