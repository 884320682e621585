use super::{ConstraintRule, RuleScore};
use crate::model::PlanningContext;
use crate::roster::{DayCell, RosterState};

/// Per-date staffing bounds for the main shifts, split by
/// weekday/weekend. Only team-affiliated employees count. Minimum
/// bounds are hard; maximum bounds are soft with a very high penalty so
/// operator-locked inputs cannot make the model unsolvable.
pub struct StaffingBoundsRule;

impl ConstraintRule for StaffingBoundsRule {
    fn name(&self) -> &'static str {
        "staffing_bounds"
    }

    fn evaluate(&self, ctx: &PlanningContext, roster: &RosterState, score: &mut RuleScore) {
        let weight = ctx.settings.penalties.staffing_max;
        for d in 0..ctx.n_days() {
            let date = ctx.date(d);
            for code in &ctx.main_codes {
                let Some(shift_type) = ctx.catalog.by_code(code) else {
                    continue;
                };
                if !shift_type.works_on(date) {
                    continue;
                }
                let bounds = shift_type.staffing_for(date);
                let count = (0..ctx.n_employees())
                    .filter(|e| !ctx.is_springer(*e))
                    .filter(|e| roster.cell(*e, d) == &DayCell::Shift(code.clone()))
                    .count() as u32;

                if count < bounds.min {
                    score.add_hard(u64::from(bounds.min - count));
                }
                if count > bounds.max {
                    score.add_penalty(weight * i64::from(count - bounds.max));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{employee, empty_roster, model_for, paint_weekdays, team};
    use shared::ShiftCode;

    #[test]
    fn test_understaffed_day_is_hard() {
        let employees = (1..=5).map(|i| employee(i, Some(1))).collect();
        let model = model_for(employees, vec![team(1)], vec![]);
        let ctx = &model.context;
        let roster = empty_roster(ctx);

        let mut score = RuleScore::default();
        StaffingBoundsRule.evaluate(ctx, &roster, &mut score);
        // Every day misses the minimum for F, S and N.
        assert!(score.hard > 0);
    }

    #[test]
    fn test_overstaffing_is_penalized_not_hard() {
        // Eight employees all on F for one week's weekdays: max is 5.
        let employees = (1..=8).map(|i| employee(i, Some(1))).collect();
        let model = model_for(employees, vec![team(1)], vec![]);
        let ctx = &model.context;
        let mut roster = empty_roster(ctx);
        for e in 0..8 {
            paint_weekdays(ctx, &mut roster, e, 1, ShiftCode::F);
        }

        let mut full = RuleScore::default();
        StaffingBoundsRule.evaluate(ctx, &roster, &mut full);

        let mut five = RuleScore::default();
        let mut trimmed = empty_roster(ctx);
        for e in 0..5 {
            paint_weekdays(ctx, &mut trimmed, e, 1, ShiftCode::F);
        }
        StaffingBoundsRule.evaluate(ctx, &trimmed, &mut five);

        // Three extra employees on five weekdays at the staffing weight.
        let weight = ctx.settings.penalties.staffing_max;
        assert_eq!(full.penalty - five.penalty, weight * 3 * 5);
        assert_eq!(full.hard, five.hard);
    }

    #[test]
    fn test_springers_do_not_count_toward_staffing() {
        let mut employees: Vec<_> = (1..=5).map(|i| employee(i, Some(1))).collect();
        employees.push(employee(9, None));
        let model = model_for(employees, vec![team(1)], vec![]);
        let ctx = &model.context;

        let mut with_springer = empty_roster(ctx);
        for e in 0..5 {
            paint_weekdays(ctx, &mut with_springer, e, 1, ShiftCode::F);
        }
        let springer = ctx.springers[0];
        paint_weekdays(ctx, &mut with_springer, springer, 1, ShiftCode::F);

        let mut without = empty_roster(ctx);
        for e in 0..5 {
            paint_weekdays(ctx, &mut without, e, 1, ShiftCode::F);
        }

        let mut a = RuleScore::default();
        StaffingBoundsRule.evaluate(ctx, &with_springer, &mut a);
        let mut b = RuleScore::default();
        StaffingBoundsRule.evaluate(ctx, &without, &mut b);
        assert_eq!(a, b);
    }
}
