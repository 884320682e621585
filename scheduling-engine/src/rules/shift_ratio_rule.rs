use shared::ShiftCode;

use super::{ConstraintRule, RuleScore};
use crate::model::PlanningContext;
use crate::roster::{DayCell, RosterState};
use crate::window::is_weekday;

/// On weekdays the daily headcounts must be ordered F ≥ S ≥ N,
/// mirroring the maximum-staffing ordering, so the lowest-capacity
/// shift never over-fills while higher-capacity shifts have headroom.
/// Soft with a heavy penalty.
pub struct ShiftRatioRule;

impl ConstraintRule for ShiftRatioRule {
    fn name(&self) -> &'static str {
        "shift_ratio"
    }

    fn evaluate(&self, ctx: &PlanningContext, roster: &RosterState, score: &mut RuleScore) {
        let weight = ctx.settings.penalties.ratio;
        for d in 0..ctx.n_days() {
            if !is_weekday(ctx.date(d)) {
                continue;
            }
            let count = |code: ShiftCode| {
                (0..ctx.n_employees())
                    .filter(|e| !ctx.is_springer(*e))
                    .filter(|e| roster.cell(*e, d) == &DayCell::Shift(code.clone()))
                    .count() as i64
            };
            let f = count(ShiftCode::F);
            let s = count(ShiftCode::S);
            let n = count(ShiftCode::N);
            if s > f {
                score.add_penalty(weight * (s - f));
            }
            if n > s {
                score.add_penalty(weight * (n - s));
            }
        }
    }
}
