use std::collections::HashMap;

use shared::ShiftCode;

use super::{ConstraintRule, RuleScore};
use crate::model::PlanningContext;
use crate::roster::{DayCell, RosterState};

/// Working-hour bounds in scaled integer hours. Weekly and rolling
/// monthly ceilings are hard; the weekly minimum against the
/// predominant shift type's target is soft with a high per-hour
/// penalty. A hard monthly minimum is the documented cause of past
/// infeasibilities and must never be introduced.
pub struct WorkingHoursRule;

/// The weekly-hours target of the shift type the employee works most.
pub fn predominant_weekly_target(
    ctx: &PlanningContext,
    roster: &RosterState,
    employee: usize,
) -> Option<i64> {
    let mut counts: HashMap<&ShiftCode, usize> = HashMap::new();
    for d in 0..ctx.n_days() {
        if let DayCell::Shift(code) = roster.cell(employee, d) {
            if code.is_main() {
                *counts.entry(code).or_default() += 1;
            }
        }
    }
    let (code, _) = counts
        .into_iter()
        .max_by_key(|(code, n)| (*n, std::cmp::Reverse(code.as_str().to_string())))?;
    ctx.catalog.by_code(code).map(|t| t.weekly_target_scaled())
}

impl WorkingHoursRule {
    fn weekly_ceiling(ctx: &PlanningContext, target: Option<i64>) -> i64 {
        let cap = ctx.settings.planning.max_weekly_scaled_hours;
        target.map(|t| t.min(cap)).unwrap_or(cap)
    }

    fn monthly_ceiling(ctx: &PlanningContext, target: Option<i64>) -> i64 {
        let cap = ctx.settings.planning.max_monthly_scaled_hours;
        target.map(|t| (t * 4).min(cap)).unwrap_or(cap)
    }
}

impl ConstraintRule for WorkingHoursRule {
    fn name(&self) -> &'static str {
        "working_hours"
    }

    fn evaluate(&self, ctx: &PlanningContext, roster: &RosterState, score: &mut RuleScore) {
        let minimum_weight = ctx.settings.penalties.weekly_minimum;
        let window_days = ctx.settings.planning.monthly_window_days as usize;

        for e in 0..ctx.n_employees() {
            let target = predominant_weekly_target(ctx, roster, e);
            let weekly_cap = Self::weekly_ceiling(ctx, target);
            let monthly_cap = Self::monthly_ceiling(ctx, target);

            let day_hours: Vec<i64> = (0..ctx.n_days())
                .map(|d| ctx.scaled_hours_for_cell(roster.cell(e, d)))
                .collect();

            for week in &ctx.window.weeks {
                let start = ctx.window.day_index(week.start()).unwrap();
                let hours: i64 = day_hours[start..start + week.dates.len()].iter().sum();
                if hours > weekly_cap {
                    score.add_hard((hours - weekly_cap) as u64);
                }

                // Weekly minimum, softened: absences shrink the target,
                // and floaters are exempt so they can stay free.
                if let Some(target) = target {
                    if !ctx.is_springer(e) {
                        let absent_days = (start..start + week.dates.len())
                            .filter(|d| ctx.is_absent(e, *d))
                            .count() as i64;
                        let week_target = (target - absent_days * 80).max(0);
                        let deficit = week_target - hours;
                        if deficit > 0 {
                            score.add_penalty(minimum_weight * deficit);
                        }
                    }
                }
            }

            if ctx.n_days() >= window_days {
                for start in 0..=(ctx.n_days() - window_days) {
                    let hours: i64 = day_hours[start..start + window_days].iter().sum();
                    if hours > monthly_cap {
                        score.add_hard((hours - monthly_cap) as u64);
                    }
                }
            }
        }
    }
}
