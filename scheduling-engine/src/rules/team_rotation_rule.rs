use std::collections::BTreeSet;

use shared::ShiftCode;

use super::{ConstraintRule, RuleScore};
use crate::model::PlanningContext;
use crate::roster::{DayCell, RosterState};
use crate::window::is_weekday;

/// Weekly team rotation. Every rotation team holds exactly one main
/// shift per week; active members work only that shift on weekdays, and
/// an employee's weekend shifts must stay within their weekday shifts
/// of the same week (the weekend carries the week's rotation).
/// Week-to-week transitions outside the rotation order and members
/// pulled away for specialist duty are tracked as soft penalties.
pub struct TeamRotationRule;

impl ConstraintRule for TeamRotationRule {
    fn name(&self) -> &'static str {
        "team_rotation"
    }

    fn evaluate(&self, ctx: &PlanningContext, roster: &RosterState, score: &mut RuleScore) {
        let rotation_weight = ctx.settings.penalties.rotation_preference;
        let cross_team_weight = ctx.settings.penalties.cross_team;

        for team in ctx.rotation_teams() {
            let members = &ctx.team_members[&team.id];
            let mut previous: Option<&ShiftCode> = None;

            for week in &ctx.window.weeks {
                let chosen = roster.team_week_shift.get(&(team.id, week.index));
                let Some(chosen) = chosen else {
                    score.add_hard(1);
                    previous = None;
                    continue;
                };
                if !chosen.is_main() || !team.allows(chosen) {
                    score.add_hard(1);
                }

                if let Some(previous) = previous {
                    if !ctx.rotation.is_compliant_transition(previous, chosen) {
                        score.add_penalty(rotation_weight);
                    }
                }
                previous = Some(chosen);

                for &member in members {
                    for date in week.weekdays() {
                        let day = ctx.window.day_index(date).unwrap();
                        match roster.cell(member, day) {
                            DayCell::Shift(code) if code.is_main() && code != chosen => {
                                score.add_hard(1);
                            }
                            // Non-main duty pulls the member out of the
                            // team's weekly shift.
                            DayCell::Shift(_) | DayCell::Bmt | DayCell::Bsb => {
                                score.add_penalty(cross_team_weight);
                            }
                            _ => {}
                        }
                    }
                }
            }
        }

        // Weekend carry, per employee and week.
        for e in 0..ctx.n_employees() {
            for week in &ctx.window.weeks {
                let mut weekday_codes: BTreeSet<&ShiftCode> = BTreeSet::new();
                let mut weekend_codes: BTreeSet<&ShiftCode> = BTreeSet::new();
                for date in &week.dates {
                    let day = ctx.window.day_index(*date).unwrap();
                    if let DayCell::Shift(code) = roster.cell(e, day) {
                        if is_weekday(*date) {
                            weekday_codes.insert(code);
                        } else {
                            weekend_codes.insert(code);
                        }
                    }
                }
                for code in weekend_codes {
                    if !weekday_codes.contains(code) {
                        score.add_hard(1);
                    }
                }
            }
        }
    }
}
