use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate, Weekday};
use tracing::debug;

use shared::{ShiftCode, TeamId};

use crate::model::PlanningContext;
use crate::roster::{DayCell, RosterState};
use crate::window::is_weekday;

/// Deterministic rotation-driven construction. The heuristic honors the
/// pinned inputs (absences, surviving locks), walks the weeks in order
/// and staffs minimums first, then fills toward the maximums while the
/// hour and consecutive-day budgets allow. The improvement search only
/// ever has to polish soft objectives.
pub fn build_initial(ctx: &PlanningContext) -> RosterState {
    let mut builder = Builder::new(ctx);
    builder.paint_absences();
    builder.paint_locked_shifts();
    builder.plan_team_weeks();
    for week in 0..ctx.n_weeks() {
        builder.prepare_week(week);
    }
    // Staff every week's minimums before filling anywhere, so early
    // weeks cannot exhaust the rolling monthly hour budget that later
    // minimums depend on.
    for fill in [false, true] {
        for week in 0..ctx.n_weeks() {
            for date in ctx.window.weeks[week].dates.clone() {
                builder.staff_date(week, date, fill);
            }
        }
    }
    debug!("initial roster constructed");
    builder.roster
}

struct Builder<'a> {
    ctx: &'a PlanningContext,
    roster: RosterState,
    /// Cells fixed by locks; never reconsidered.
    pinned: HashSet<(usize, usize)>,
    day_hours: Vec<Vec<i64>>,
    td_counts: Vec<u32>,
    special_counts: Vec<u32>,
    reserved_springer: Vec<Option<usize>>,
}

impl<'a> Builder<'a> {
    fn new(ctx: &'a PlanningContext) -> Self {
        Self {
            ctx,
            roster: RosterState::new(ctx.n_employees(), ctx.n_days(), ctx.n_weeks()),
            pinned: HashSet::new(),
            day_hours: vec![vec![0; ctx.n_days()]; ctx.n_employees()],
            td_counts: vec![0; ctx.n_employees()],
            special_counts: vec![0; ctx.n_employees()],
            reserved_springer: vec![None; ctx.n_weeks()],
        }
    }

    fn paint_absences(&mut self) {
        for e in 0..self.ctx.n_employees() {
            for d in 0..self.ctx.n_days() {
                if let Some(code) = self.ctx.absence_on(e, d) {
                    self.roster.set_cell(e, d, DayCell::Absent(code));
                }
            }
        }
    }

    fn paint_locked_shifts(&mut self) {
        for ((employee_id, date), code) in &self.ctx.locks.employee_shift {
            let (Some(e), Some(d)) = (
                self.ctx.employee_index(*employee_id),
                self.ctx.window.day_index(*date),
            ) else {
                continue;
            };
            self.set_working(e, d, DayCell::Shift(code.clone()));
            self.pinned.insert((e, d));
        }
        for ((employee_id, date), working) in &self.ctx.locks.employee_weekend {
            let (Some(e), Some(d)) = (
                self.ctx.employee_index(*employee_id),
                self.ctx.window.day_index(*date),
            ) else {
                continue;
            };
            if !*working {
                // Pin the rest marker so no pass assigns the day.
                self.pinned.insert((e, d));
            }
        }
    }

    fn set_working(&mut self, e: usize, d: usize, cell: DayCell) {
        self.day_hours[e][d] = self.ctx.scaled_hours_for_cell(&cell);
        self.roster.set_cell(e, d, cell);
    }

    /// Chooses each rotation team's weekly shift: locked values first,
    /// otherwise the rotation successor of the previous week, filtered
    /// by the team's allowed codes. A fix-up pass repairs weeks where a
    /// demanded main shift ended up uncovered.
    fn plan_team_weeks(&mut self) {
        let ctx = self.ctx;
        let teams = ctx.rotation_teams();

        // Employee-day locks on weekday main shifts imply the team's
        // weekly shift when the team itself is not locked.
        let mut implied: HashMap<(TeamId, usize), ShiftCode> = HashMap::new();
        let mut employee_locks: Vec<_> = ctx.locks.employee_shift.iter().collect();
        employee_locks.sort_by_key(|((id, date), _)| (*id, *date));
        for ((employee_id, date), code) in employee_locks {
            if !code.is_main() || !is_weekday(*date) {
                continue;
            }
            let Some(e) = ctx.employee_index(*employee_id) else {
                continue;
            };
            let (Some(team_id), Some(week)) =
                (ctx.employees[e].team_id, ctx.window.week_index_of(*date))
            else {
                continue;
            };
            implied.entry((team_id, week)).or_insert_with(|| code.clone());
        }

        for (offset, team) in teams.iter().enumerate() {
            let mut previous: Option<ShiftCode> = None;
            for week in 0..ctx.n_weeks() {
                let code = if let Some(locked) = ctx.locks.team_shift.get(&(team.id, week)) {
                    locked.clone()
                } else if let Some(implied) = implied.get(&(team.id, week)) {
                    implied.clone()
                } else {
                    let desired = match &previous {
                        None => ctx.rotation.shift_for_week(offset, week).clone(),
                        Some(p) => ctx
                            .rotation
                            .next_after(p)
                            .cloned()
                            .unwrap_or_else(|| p.clone()),
                    };
                    if team.allows(&desired) && ctx.catalog.by_code(&desired).is_some() {
                        desired
                    } else if previous
                        .as_ref()
                        .map(|p| team.allows(p))
                        .unwrap_or(false)
                    {
                        previous.clone().unwrap()
                    } else {
                        ctx.main_codes
                            .iter()
                            .find(|c| team.allows(c))
                            .cloned()
                            .unwrap_or(desired)
                    }
                };
                self.roster
                    .team_week_shift
                    .insert((team.id, week), code.clone());
                previous = Some(code);
            }
        }

        // Coverage fix-up: every main shift with a weekday minimum needs
        // at least one team per week.
        let demanded: Vec<ShiftCode> = ctx
            .main_codes
            .iter()
            .filter(|c| {
                ctx.catalog
                    .by_code(c)
                    .map(|t| t.weekday_staffing.min > 0)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        for week in 0..ctx.n_weeks() {
            for missing in &demanded {
                let covered = teams
                    .iter()
                    .any(|t| self.roster.team_week_shift.get(&(t.id, week)) == Some(missing));
                if covered {
                    continue;
                }
                // Move a team off a doubly-covered code.
                let donor = teams.iter().find(|t| {
                    if ctx.locks.team_shift.contains_key(&(t.id, week))
                        || implied.contains_key(&(t.id, week))
                        || !t.allows(missing)
                    {
                        return false;
                    }
                    let code = &self.roster.team_week_shift[&(t.id, week)];
                    teams
                        .iter()
                        .filter(|o| self.roster.team_week_shift.get(&(o.id, week)) == Some(code))
                        .count()
                        > 1
                });
                if let Some(donor) = donor {
                    self.roster
                        .team_week_shift
                        .insert((donor.id, week), missing.clone());
                }
            }
        }
    }

    /// Weekly duties before any staffing: the TD holder, the reserved
    /// floater and the daily specialist functions.
    fn prepare_week(&mut self, week: usize) {
        self.choose_td_holder(week);
        self.reserve_springer(week);

        let dates: Vec<NaiveDate> = self.ctx.window.weeks[week].dates.clone();
        for date in &dates {
            if is_weekday(*date) {
                self.assign_special(*date, true);
                self.assign_special(*date, false);
            }
        }
    }

    fn choose_td_holder(&mut self, week: usize) {
        let ctx = self.ctx;
        let locked_holder = ctx
            .locks
            .td
            .iter()
            .find(|((_, w), held)| *w == week && **held)
            .and_then(|((id, _), _)| ctx.employee_index(*id));
        let blocked: Vec<usize> = ctx
            .locks
            .td
            .iter()
            .filter(|((_, w), held)| *w == week && !**held)
            .filter_map(|((id, _), _)| ctx.employee_index(*id))
            .collect();

        let weekdays: Vec<usize> = ctx.window.weeks[week]
            .weekdays()
            .map(|d| ctx.window.day_index(d).unwrap())
            .collect();

        let holder = locked_holder.or_else(|| {
            let mut candidates: Vec<usize> = ctx
                .td_qualified()
                .into_iter()
                .filter(|e| !blocked.contains(e))
                .filter(|e| {
                    weekdays.iter().any(|d| {
                        !ctx.is_absent(*e, *d)
                            && self.roster.cell(*e, *d) == &DayCell::Rest
                            && !self.pinned.contains(&(*e, *d))
                    })
                })
                .collect();
            candidates.sort_by_key(|e| {
                (
                    // Floaters first: day duty keeps them off the teams.
                    usize::from(!ctx.is_springer(*e)),
                    self.td_counts[*e],
                    *e,
                )
            });
            candidates.first().copied()
        });

        let Some(holder) = holder else {
            return;
        };
        self.roster.td_holder[week] = Some(holder);
        self.td_counts[holder] += 1;
        for d in weekdays {
            if !ctx.is_absent(holder, d) && !self.pinned.contains(&(holder, d)) {
                self.set_working(holder, d, DayCell::Td);
            }
        }
    }

    fn reserve_springer(&mut self, week: usize) {
        let ctx = self.ctx;
        if ctx.springers.is_empty() {
            return;
        }
        let week_days: Vec<usize> = ctx.window.weeks[week]
            .dates
            .iter()
            .map(|d| ctx.window.day_index(*d).unwrap())
            .collect();
        let mut free: Vec<usize> = ctx
            .springers
            .iter()
            .copied()
            .filter(|e| Some(*e) != self.roster.td_holder[week])
            .filter(|e| week_days.iter().all(|d| !self.roster.is_working(*e, *d)))
            .collect();
        free.sort_by_key(|e| (self.roster.total_shifts(*e), *e));
        self.reserved_springer[week] = free.first().copied();
    }

    fn assign_special(&mut self, date: NaiveDate, bmt: bool) {
        let ctx = self.ctx;
        let d = ctx.window.day_index(date).unwrap();
        let week = ctx.window.week_index_of(date).unwrap();
        let qualified = if bmt {
            ctx.bmt_qualified()
        } else {
            ctx.bsb_qualified()
        };
        if qualified.is_empty() {
            return;
        }
        let cell = if bmt { DayCell::Bmt } else { DayCell::Bsb };
        let duration = ctx.scaled_hours_for_cell(&cell);

        let mut candidates: Vec<usize> = qualified
            .into_iter()
            .filter(|e| self.roster.cell(*e, d) == &DayCell::Rest)
            .filter(|e| !self.pinned.contains(&(*e, d)))
            .filter(|e| !ctx.is_absent(*e, d))
            .filter(|e| Some(*e) != self.reserved_springer[week])
            .filter(|e| self.fits_hour_budget(*e, d, duration))
            .filter(|e| self.total_run_with(*e, d) <= ctx.total_consecutive_limit())
            .collect();
        candidates.sort_by_key(|e| {
            (
                usize::from(!ctx.is_springer(*e)),
                self.team_is_tight(*e, date),
                self.special_counts[*e],
                *e,
            )
        });
        if let Some(choice) = candidates.first().copied() {
            self.special_counts[choice] += 1;
            self.set_working(choice, d, cell);
        }
    }

    /// Whether pulling this member would leave their team at or below
    /// the weekday minimum for its weekly shift.
    fn team_is_tight(&self, e: usize, date: NaiveDate) -> bool {
        let ctx = self.ctx;
        let Some(team_id) = ctx.employees[e].team_id else {
            return false;
        };
        let Some(week) = ctx.window.week_index_of(date) else {
            return false;
        };
        let Some(code) = self.roster.team_week_shift.get(&(team_id, week)) else {
            return false;
        };
        let Some(shift_type) = ctx.catalog.by_code(code) else {
            return false;
        };
        let d = ctx.window.day_index(date).unwrap();
        let available = ctx.team_members[&team_id]
            .iter()
            .filter(|m| !ctx.is_absent(**m, d))
            .filter(|m| {
                self.roster.cell(**m, d) == &DayCell::Rest
                    || self.roster.cell(**m, d).shift_code().is_some()
            })
            .count() as u32;
        available <= shift_type.staffing_for(date).min
    }

    fn staff_date(&mut self, week: usize, date: NaiveDate, fill: bool) {
        let ctx = self.ctx;
        let d = ctx.window.day_index(date).unwrap();
        let weekday = is_weekday(date);

        let mut previous_count: Option<u32> = None;
        for code in ctx.main_codes.clone() {
            let Some(shift_type) = ctx.catalog.by_code(&code) else {
                continue;
            };
            if !shift_type.works_on(date) {
                continue;
            }
            let bounds = shift_type.staffing_for(date);

            let current = self.attached_count(&code, d);
            let mut target = if fill { bounds.max } else { bounds.min };
            if fill && weekday {
                // Keep the daily ordering F ≥ S ≥ N while filling.
                if let Some(previous) = previous_count {
                    target = target.min(previous).max(bounds.min);
                }
            }

            if current < target {
                self.select_for_shift(week, date, &code, target - current, fill);
            }
            previous_count = Some(self.attached_count(&code, d));
        }
    }

    fn attached_count(&self, code: &ShiftCode, d: usize) -> u32 {
        (0..self.ctx.n_employees())
            .filter(|e| !self.ctx.is_springer(*e))
            .filter(|e| self.roster.cell(*e, d) == &DayCell::Shift(code.clone()))
            .count() as u32
    }

    fn select_for_shift(
        &mut self,
        week: usize,
        date: NaiveDate,
        code: &ShiftCode,
        needed: u32,
        fill: bool,
    ) {
        let ctx = self.ctx;
        let d = ctx.window.day_index(date).unwrap();
        let weekday = is_weekday(date);

        let member_teams: Vec<TeamId> = ctx
            .rotation_teams()
            .iter()
            .filter(|t| self.roster.team_week_shift.get(&(t.id, week)) == Some(code))
            .map(|t| t.id)
            .collect();
        let mut pool: Vec<usize> = member_teams
            .iter()
            .flat_map(|t| ctx.team_members[t].iter().copied())
            .collect();
        pool.sort_unstable();

        let mut remaining = needed;
        // Weekend carries the week: prefer (then require) members who
        // already hold the code on a weekday of this week. The relaxed
        // round only runs for the minimum pass.
        let passes: &[(bool, bool)] = if weekday {
            &[(false, false)]
        } else if fill {
            &[(true, false)]
        } else {
            &[(true, false), (false, true)]
        };

        for &(require_weekday_code, allow_boundary) in passes {
            if remaining == 0 {
                break;
            }
            let mut candidates: Vec<usize> = pool
                .iter()
                .copied()
                .filter(|e| self.roster.cell(*e, d) == &DayCell::Rest)
                .filter(|e| !self.pinned.contains(&(*e, d)))
                .filter(|e| !ctx.is_absent(*e, d))
                .filter(|e| Some(*e) != self.reserved_springer[week])
                .filter(|e| !require_weekday_code || self.has_weekday_code(*e, week, code))
                .filter(|e| {
                    weekday
                        || require_weekday_code
                        || self.can_still_work_a_weekday(*e, week, d)
                })
                .filter(|e| self.can_take(*e, d, code, allow_boundary))
                .collect();

            // Locked weekend workers first, then weekend holders of the
            // code (so their weekday carry materializes), then balance.
            candidates.sort_by_key(|e| {
                let id = ctx.employees[*e].id;
                let locked_on = ctx
                    .locks
                    .employee_weekend
                    .get(&(id, date))
                    .copied()
                    .unwrap_or(false);
                (
                    usize::from(!locked_on),
                    usize::from(!self.has_weekend_code(*e, week, code)),
                    self.roster.total_shifts(*e),
                    *e,
                )
            });

            for e in candidates {
                if remaining == 0 {
                    break;
                }
                self.set_working(e, d, DayCell::Shift(code.clone()));
                remaining -= 1;
            }
        }
    }

    fn has_weekday_code(&self, e: usize, week: usize, code: &ShiftCode) -> bool {
        self.ctx.window.weeks[week].weekdays().any(|date| {
            let d = self.ctx.window.day_index(date).unwrap();
            self.roster.cell(e, d) == &DayCell::Shift(code.clone())
        })
    }

    fn has_weekend_code(&self, e: usize, week: usize, code: &ShiftCode) -> bool {
        self.ctx.window.weeks[week].weekend_days().any(|date| {
            let d = self.ctx.window.day_index(date).unwrap();
            self.roster.cell(e, d) == &DayCell::Shift(code.clone())
        })
    }

    /// A Sunday pick must still be able to take a weekday this week,
    /// otherwise the weekend could not carry the week's shift.
    fn can_still_work_a_weekday(&self, e: usize, week: usize, day: usize) -> bool {
        self.ctx.window.weeks[week].weekdays().any(|date| {
            let d = self.ctx.window.day_index(date).unwrap();
            d > day
                && !self.ctx.is_absent(e, d)
                && self.roster.cell(e, d) == &DayCell::Rest
                && !self.pinned.contains(&(e, d))
        }) || self.ctx.window.weeks[week].weekdays().any(|date| {
            let d = self.ctx.window.day_index(date).unwrap();
            self.roster.cell(e, d).shift_code().is_some()
        })
    }

    fn can_take(&self, e: usize, d: usize, code: &ShiftCode, allow_boundary: bool) -> bool {
        let ctx = self.ctx;

        // Rest transitions against both neighbors.
        let from = if d == 0 {
            ctx.lookback_shift_before_window(e).cloned()
        } else {
            self.roster.cell(e, d - 1).shift_code().cloned()
        };
        if let Some(from) = from {
            if forbidden_transition(&from, code) {
                let sunday = ctx.date(d).weekday() == Weekday::Sun;
                if !(allow_boundary && sunday) {
                    return false;
                }
            }
        }
        if d + 1 < ctx.n_days() {
            if let Some(next) = self.roster.cell(e, d + 1).shift_code() {
                if forbidden_transition(code, next) {
                    return false;
                }
            }
        }

        if self.same_code_run_with(e, d, code) > ctx.per_type_limit(code) {
            return false;
        }
        if self.total_run_with(e, d) > ctx.total_consecutive_limit() {
            return false;
        }

        let duration = ctx.catalog.scaled_hours(code);
        self.fits_hour_budget(e, d, duration)
    }

    fn same_code_run_with(&self, e: usize, d: usize, code: &ShiftCode) -> u32 {
        let mut back = 0u32;
        let mut i = d;
        while i > 0 {
            i -= 1;
            if self.roster.cell(e, i) == &DayCell::Shift(code.clone()) {
                back += 1;
            } else {
                break;
            }
        }
        if back as usize == d {
            back += self.ctx.lookback_trailing_same(e, code);
        }
        let mut forward = 0u32;
        let mut i = d + 1;
        while i < self.ctx.n_days() {
            if self.roster.cell(e, i) == &DayCell::Shift(code.clone()) {
                forward += 1;
                i += 1;
            } else {
                break;
            }
        }
        back + 1 + forward
    }

    fn total_run_with(&self, e: usize, d: usize) -> u32 {
        let mut back = 0u32;
        let mut i = d;
        while i > 0 {
            i -= 1;
            if self.roster.is_working(e, i) {
                back += 1;
            } else {
                break;
            }
        }
        if back as usize == d {
            back += self.ctx.lookback_trailing_total(e);
        }
        let mut forward = 0u32;
        let mut i = d + 1;
        while i < self.ctx.n_days() {
            if self.roster.is_working(e, i) {
                forward += 1;
                i += 1;
            } else {
                break;
            }
        }
        back + 1 + forward
    }

    /// Weekly and rolling monthly ceilings for one extra working day.
    fn fits_hour_budget(&self, e: usize, d: usize, duration: i64) -> bool {
        let ctx = self.ctx;
        let week = d / 7;
        let week_start = week * 7;
        let week_end = (week_start + 7).min(ctx.n_days());
        let weekly: i64 = self.day_hours[e][week_start..week_end].iter().sum();

        let team_target = self.weekly_target_for(e, week);
        let weekly_cap = team_target
            .unwrap_or(ctx.settings.planning.max_weekly_scaled_hours)
            .min(ctx.settings.planning.max_weekly_scaled_hours);
        if weekly + duration > weekly_cap {
            return false;
        }

        let window_days = ctx.settings.planning.monthly_window_days as usize;
        if ctx.n_days() >= window_days {
            let monthly_cap = team_target
                .map(|t| t * 4)
                .unwrap_or(ctx.settings.planning.max_monthly_scaled_hours)
                .min(ctx.settings.planning.max_monthly_scaled_hours);
            let lo = d.saturating_sub(window_days - 1);
            let hi = d.min(ctx.n_days() - window_days);
            for start in lo..=hi {
                let sum: i64 = self.day_hours[e][start..start + window_days].iter().sum();
                if sum + duration > monthly_cap {
                    return false;
                }
            }
        }
        true
    }

    /// The hour target backing the budget: the weekly hours of the
    /// employee's team shift for that week, if any.
    fn weekly_target_for(&self, e: usize, week: usize) -> Option<i64> {
        let team_id = self.ctx.employees[e].team_id?;
        let code = self.roster.team_week_shift.get(&(team_id, week))?;
        self.ctx
            .catalog
            .by_code(code)
            .map(|t| t.weekly_target_scaled())
    }
}

fn forbidden_transition(from: &ShiftCode, to: &ShiftCode) -> bool {
    matches!(
        (from, to),
        (ShiftCode::S, ShiftCode::F) | (ShiftCode::N, ShiftCode::F)
    )
}
