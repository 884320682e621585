use super::{ConstraintRule, RuleScore};
use crate::model::PlanningContext;
use crate::roster::RosterState;

/// Unattached employees act as floaters for absence coverage. Whenever
/// floaters exist, at least one of them must stay completely free in
/// every week.
pub struct SpringerAvailabilityRule;

impl ConstraintRule for SpringerAvailabilityRule {
    fn name(&self) -> &'static str {
        "springer_availability"
    }

    fn evaluate(&self, ctx: &PlanningContext, roster: &RosterState, score: &mut RuleScore) {
        if ctx.springers.is_empty() {
            return;
        }
        for week in &ctx.window.weeks {
            let free = ctx.springers.iter().any(|&springer| {
                week.dates.iter().all(|date| {
                    let day = ctx.window.day_index(*date).unwrap();
                    !roster.is_working(springer, day)
                })
            });
            if !free {
                score.add_hard(1);
            }
        }
    }
}
