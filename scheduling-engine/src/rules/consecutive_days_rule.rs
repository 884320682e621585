use shared::ShiftCode;

use super::{ConstraintRule, RuleScore};
use crate::model::PlanningContext;
use crate::roster::{DayCell, RosterState};

/// Rolling consecutive-day limits: per shift type (`max_consecutive_days`
/// of the type) and across all shift identities (the largest per-type
/// limit). Chains that began in a previous planning period are counted
/// through the injected lookback constants. Soft with a heavy penalty,
/// so locked overloads keep the model solvable; the validator still
/// rejects violations.
pub struct ConsecutiveDaysRule;

impl ConsecutiveDaysRule {
    fn penalize_runs<F>(
        ctx: &PlanningContext,
        score: &mut RuleScore,
        limit: u32,
        seed: u32,
        mut counts: F,
    ) where
        F: FnMut(usize) -> bool,
    {
        let weight = ctx.settings.penalties.consecutive;
        let mut run = 0u32;
        for d in 0..ctx.n_days() {
            if counts(d) {
                run = if d == 0 { seed + 1 } else { run + 1 };
                if run > limit {
                    score.add_penalty(weight);
                }
            } else {
                run = 0;
            }
        }
    }
}

impl ConstraintRule for ConsecutiveDaysRule {
    fn name(&self) -> &'static str {
        "consecutive_days"
    }

    fn evaluate(&self, ctx: &PlanningContext, roster: &RosterState, score: &mut RuleScore) {
        let total_limit = ctx.total_consecutive_limit();

        for e in 0..ctx.n_employees() {
            // Cross-type total: any working day counts.
            Self::penalize_runs(
                ctx,
                score,
                total_limit,
                ctx.lookback_trailing_total(e),
                |d| roster.is_working(e, d),
            );

            // Per-type runs for every shift code present in the roster.
            let mut codes: Vec<ShiftCode> = Vec::new();
            for d in 0..ctx.n_days() {
                if let DayCell::Shift(code) = roster.cell(e, d) {
                    if !codes.contains(code) {
                        codes.push(code.clone());
                    }
                }
            }
            for code in codes {
                let limit = ctx.per_type_limit(&code);
                Self::penalize_runs(
                    ctx,
                    score,
                    limit,
                    ctx.lookback_trailing_same(e, &code),
                    |d| roster.cell(e, d) == &DayCell::Shift(code.clone()),
                );
            }
        }
    }
}
