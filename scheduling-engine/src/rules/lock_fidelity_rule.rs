use super::{ConstraintRule, RuleScore};
use crate::model::PlanningContext;
use crate::roster::{DayCell, RosterState};

/// Every lock that survived consolidation must be honored by the
/// roster.
pub struct LockFidelityRule;

impl ConstraintRule for LockFidelityRule {
    fn name(&self) -> &'static str {
        "lock_fidelity"
    }

    fn evaluate(&self, ctx: &PlanningContext, roster: &RosterState, score: &mut RuleScore) {
        for ((team_id, week), shift) in &ctx.locks.team_shift {
            if roster.team_week_shift.get(&(*team_id, *week)) != Some(shift) {
                score.add_hard(1);
            }
        }

        for ((employee_id, date), shift) in &ctx.locks.employee_shift {
            let (Some(e), Some(d)) = (
                ctx.employee_index(*employee_id),
                ctx.window.day_index(*date),
            ) else {
                continue;
            };
            if roster.cell(e, d) != &DayCell::Shift(shift.clone()) {
                score.add_hard(1);
            }
        }

        for ((employee_id, date), working) in &ctx.locks.employee_weekend {
            let (Some(e), Some(d)) = (
                ctx.employee_index(*employee_id),
                ctx.window.day_index(*date),
            ) else {
                continue;
            };
            if roster.is_working(e, d) != *working {
                score.add_hard(1);
            }
        }

        for ((employee_id, week), holds_td) in &ctx.locks.td {
            let Some(e) = ctx.employee_index(*employee_id) else {
                continue;
            };
            let holds = roster.td_holder.get(*week).copied().flatten() == Some(e);
            if holds != *holds_td {
                score.add_hard(1);
            }
        }
    }
}
