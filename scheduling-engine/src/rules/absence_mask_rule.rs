use super::{ConstraintRule, RuleScore};
use crate::model::PlanningContext;
use crate::roster::RosterState;

/// Absences are authoritative: no regular or special shift may touch an
/// absent (employee, day) pair.
pub struct AbsenceMaskRule;

impl ConstraintRule for AbsenceMaskRule {
    fn name(&self) -> &'static str {
        "absence_mask"
    }

    fn evaluate(&self, ctx: &PlanningContext, roster: &RosterState, score: &mut RuleScore) {
        for e in 0..ctx.n_employees() {
            for d in 0..ctx.n_days() {
                if ctx.is_absent(e, d) && roster.cell(e, d).is_working() {
                    score.add_hard(1);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Absence;
    use crate::roster::DayCell;
    use crate::rules::test_support::{employee, empty_roster, model_for, team};
    use chrono::NaiveDate;
    use shared::{AbsenceCode, EmployeeId, ShiftCode};

    #[test]
    fn test_shift_on_absent_day_is_hard_violation() {
        let model = model_for(
            vec![employee(1, Some(1))],
            vec![team(1)],
            vec![Absence {
                id: 1,
                employee_id: EmployeeId(1),
                code: AbsenceCode::U,
                start_date: NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
                notes: None,
            }],
        );
        let ctx = &model.context;
        let mut roster = empty_roster(ctx);
        let day = ctx
            .window
            .day_index(NaiveDate::from_ymd_opt(2026, 2, 2).unwrap())
            .unwrap();
        roster.set_cell(0, day, DayCell::Shift(ShiftCode::F));

        let mut score = RuleScore::default();
        AbsenceMaskRule.evaluate(ctx, &roster, &mut score);
        assert_eq!(score.hard, 1);
    }

    #[test]
    fn test_absent_cell_is_clean() {
        let model = model_for(
            vec![employee(1, Some(1))],
            vec![team(1)],
            vec![Absence {
                id: 1,
                employee_id: EmployeeId(1),
                code: AbsenceCode::Au,
                start_date: NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2026, 2, 6).unwrap(),
                notes: None,
            }],
        );
        let ctx = &model.context;
        let roster = empty_roster(ctx);
        let mut score = RuleScore::default();
        AbsenceMaskRule.evaluate(ctx, &roster, &mut score);
        assert_eq!(score.hard, 0);
    }
}
