use super::{ConstraintRule, RuleScore};
use crate::model::PlanningContext;
use crate::roster::RosterState;

/// Pairwise fairness over total shift counts: the objective charges the
/// absolute difference in assigned shifts between every pair of
/// team-affiliated employees. Floaters are excluded; their job is to
/// stay free.
pub struct FairnessRule;

impl ConstraintRule for FairnessRule {
    fn name(&self) -> &'static str {
        "fairness"
    }

    fn evaluate(&self, ctx: &PlanningContext, roster: &RosterState, score: &mut RuleScore) {
        let weight = ctx.settings.penalties.fairness;
        let totals: Vec<i64> = (0..ctx.n_employees())
            .filter(|e| !ctx.is_springer(*e))
            .map(|e| roster.total_shifts(e) as i64)
            .collect();
        for i in 0..totals.len() {
            for j in i + 1..totals.len() {
                score.add_penalty(weight * (totals[i] - totals[j]).abs());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::DayCell;
    use crate::rules::test_support::{employee, empty_roster, model_for, team};
    use shared::ShiftCode;

    #[test]
    fn test_equal_loads_cost_nothing() {
        let employees = (1..=3).map(|i| employee(i, Some(1))).collect();
        let model = model_for(employees, vec![team(1)], vec![]);
        let ctx = &model.context;
        let mut roster = empty_roster(ctx);
        for e in 0..3 {
            roster.set_cell(e, 0, DayCell::Shift(ShiftCode::F));
        }
        let mut score = RuleScore::default();
        FairnessRule.evaluate(ctx, &roster, &mut score);
        assert_eq!(score.penalty, 0);
    }

    #[test]
    fn test_lopsided_loads_are_charged_pairwise() {
        let employees = (1..=3).map(|i| employee(i, Some(1))).collect();
        let model = model_for(employees, vec![team(1)], vec![]);
        let ctx = &model.context;
        let mut roster = empty_roster(ctx);
        for d in 0..4 {
            roster.set_cell(0, d, DayCell::Shift(ShiftCode::F));
        }
        let mut score = RuleScore::default();
        FairnessRule.evaluate(ctx, &roster, &mut score);
        // |4-0| + |4-0| + |0-0|
        assert_eq!(score.penalty, ctx.settings.penalties.fairness * 8);
    }

    #[test]
    fn test_springers_not_in_fairness_pool() {
        let employees = vec![employee(1, Some(1)), employee(2, Some(1)), employee(9, None)];
        let model = model_for(employees, vec![team(1)], vec![]);
        let ctx = &model.context;
        let roster = empty_roster(ctx);
        let mut score = RuleScore::default();
        FairnessRule.evaluate(ctx, &roster, &mut score);
        assert_eq!(score.penalty, 0);
    }
}
