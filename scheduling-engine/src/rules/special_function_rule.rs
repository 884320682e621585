use super::{ConstraintRule, RuleScore};
use crate::model::PlanningContext;
use crate::roster::{DayCell, RosterState};
use crate::window::is_weekday;

/// BMT and BSB specialist coverage and the weekly TD day duty. On every
/// weekday with qualified, present staff there is exactly one BMT and
/// one BSB; TD is held by exactly one qualified employee per week. All
/// three are mutually exclusive with regular shifts, which the day-cell
/// domain already guarantees; the rule checks coverage, qualification
/// and holder consistency.
pub struct SpecialFunctionRule;

impl SpecialFunctionRule {
    fn check_daily_function(
        ctx: &PlanningContext,
        roster: &RosterState,
        score: &mut RuleScore,
        qualified: &[usize],
        matches: impl Fn(&DayCell) -> bool,
    ) {
        for d in 0..ctx.n_days() {
            let date = ctx.date(d);
            let weekday = is_weekday(date);
            let holders: Vec<usize> = (0..ctx.n_employees())
                .filter(|e| matches(roster.cell(*e, d)))
                .collect();

            if !weekday {
                // Specialist functions are weekday-only.
                score.add_hard(holders.len() as u64);
                continue;
            }

            for holder in &holders {
                if !qualified.contains(holder) {
                    score.add_hard(1);
                }
            }

            let any_present = qualified.iter().any(|e| !ctx.is_absent(*e, d));
            if any_present {
                let count = holders.len() as u64;
                score.add_hard(count.abs_diff(1));
            }
        }
    }
}

impl ConstraintRule for SpecialFunctionRule {
    fn name(&self) -> &'static str {
        "special_functions"
    }

    fn evaluate(&self, ctx: &PlanningContext, roster: &RosterState, score: &mut RuleScore) {
        Self::check_daily_function(ctx, roster, score, &ctx.bmt_qualified(), |cell| {
            cell == &DayCell::Bmt
        });
        Self::check_daily_function(ctx, roster, score, &ctx.bsb_qualified(), |cell| {
            cell == &DayCell::Bsb
        });

        let td_qualified = ctx.td_qualified();
        for week in &ctx.window.weeks {
            let holder = roster.td_holder.get(week.index).copied().flatten();

            let any_qualified_present = td_qualified.iter().any(|e| {
                week.weekdays()
                    .any(|date| !ctx.is_absent(*e, ctx.window.day_index(date).unwrap()))
            });

            match holder {
                None => {
                    if any_qualified_present {
                        score.add_hard(1);
                    }
                }
                Some(holder) => {
                    if !td_qualified.contains(&holder) {
                        score.add_hard(1);
                    }
                    let td_days = week
                        .weekdays()
                        .filter(|date| {
                            let day = ctx.window.day_index(*date).unwrap();
                            roster.cell(holder, day) == &DayCell::Td
                        })
                        .count();
                    if td_days == 0 {
                        score.add_hard(1);
                    }
                }
            }

            // Td cells belong to the week's holder, on weekdays only.
            for date in &week.dates {
                let day = ctx.window.day_index(*date).unwrap();
                for e in 0..ctx.n_employees() {
                    if roster.cell(e, day) == &DayCell::Td
                        && (Some(e) != holder || !is_weekday(*date))
                    {
                        score.add_hard(1);
                    }
                }
            }
        }
    }
}
