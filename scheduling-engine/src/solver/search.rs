use std::collections::HashSet;
use std::time::Instant;

use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::model::PlanningModel;
use crate::roster::{DayCell, RosterState};
use crate::rules::{evaluate_all, RuleScore};
use crate::window::is_weekday;

pub struct SearchOutcome {
    pub roster: RosterState,
    pub score: RuleScore,
    pub converged: bool,
}

/// Late-acceptance local search over the soft objective. Moves are
/// domain-shaped (swap a worker, move the TD holder, reseat a
/// specialist); acceptance never lets the hard-violation count grow, so
/// a feasible construction stays feasible throughout.
pub fn improve(
    model: &PlanningModel,
    initial: RosterState,
    seed: u64,
    deadline: Instant,
) -> SearchOutcome {
    let ctx = &model.context;
    let settings = &ctx.settings.solver;

    // Cells fixed by operator locks are off-limits for every move.
    let mut pinned: HashSet<(usize, usize)> = HashSet::new();
    for (employee_id, date) in ctx.locks.employee_shift.keys() {
        if let (Some(e), Some(d)) = (ctx.employee_index(*employee_id), ctx.window.day_index(*date))
        {
            pinned.insert((e, d));
        }
    }
    for (employee_id, date) in ctx.locks.employee_weekend.keys() {
        if let (Some(e), Some(d)) = (ctx.employee_index(*employee_id), ctx.window.day_index(*date))
        {
            pinned.insert((e, d));
        }
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut current = initial;
    let mut current_score = evaluate_all(&model.rules, ctx, &current);
    let mut best = current.clone();
    let mut best_score = current_score;

    let late_size = settings.late_acceptance_size.max(1);
    let mut late = vec![current_score.penalty; late_size];
    let mut step: usize = 0;
    let mut stale: u64 = 0;
    let mut converged = false;

    while Instant::now() < deadline {
        if stale >= settings.improvement_budget {
            converged = true;
            break;
        }

        let Some(candidate) = propose_move(ctx, &current, &pinned, &mut rng) else {
            stale += 1;
            continue;
        };
        let candidate_score = evaluate_all(&model.rules, ctx, &candidate);

        let late_value = late[step % late_size];
        let accept = candidate_score.hard < current_score.hard
            || (candidate_score.hard == current_score.hard
                && (candidate_score.penalty <= current_score.penalty
                    || candidate_score.penalty <= late_value));

        if accept {
            current = candidate;
            current_score = candidate_score;
            if (current_score.hard, current_score.penalty) < (best_score.hard, best_score.penalty) {
                best = current.clone();
                best_score = current_score;
                stale = 0;
            } else {
                stale += 1;
            }
        } else {
            stale += 1;
        }
        late[step % late_size] = current_score.penalty;
        step += 1;
    }

    debug!(
        steps = step,
        hard = best_score.hard,
        penalty = best_score.penalty,
        converged,
        "search finished"
    );
    SearchOutcome {
        roster: best,
        score: best_score,
        converged,
    }
}

fn propose_move(
    ctx: &crate::model::PlanningContext,
    current: &RosterState,
    pinned: &HashSet<(usize, usize)>,
    rng: &mut ChaCha8Rng,
) -> Option<RosterState> {
    match rng.gen_range(0..4u8) {
        0 => swap_worker(ctx, current, pinned, rng),
        1 => move_rest_day(ctx, current, pinned, rng),
        2 => swap_td_holder(ctx, current, rng),
        _ => swap_specialist(ctx, current, pinned, rng),
    }
}

/// Replace one worker of a (day, shift) slot with a resting teammate.
fn swap_worker(
    ctx: &crate::model::PlanningContext,
    current: &RosterState,
    pinned: &HashSet<(usize, usize)>,
    rng: &mut ChaCha8Rng,
) -> Option<RosterState> {
    let d = rng.gen_range(0..ctx.n_days());
    let code = ctx.main_codes[rng.gen_range(0..ctx.main_codes.len())].clone();

    let workers: Vec<usize> = (0..ctx.n_employees())
        .filter(|e| current.cell(*e, d) == &DayCell::Shift(code.clone()))
        .filter(|e| !pinned.contains(&(*e, d)))
        .collect();
    let worker = *pick(rng, &workers)?;

    let team_id = ctx.employees[worker].team_id?;
    let resters: Vec<usize> = ctx.team_members[&team_id]
        .iter()
        .copied()
        .filter(|e| current.cell(*e, d) == &DayCell::Rest)
        .filter(|e| !pinned.contains(&(*e, d)))
        .filter(|e| !ctx.is_absent(*e, d))
        .collect();
    let rester = *pick(rng, &resters)?;

    let mut next = current.clone();
    next.set_cell(worker, d, DayCell::Rest);
    next.set_cell(rester, d, DayCell::Shift(code));
    Some(next)
}

/// Shift one of an employee's working days to a resting day in the same
/// week, keeping the code.
fn move_rest_day(
    ctx: &crate::model::PlanningContext,
    current: &RosterState,
    pinned: &HashSet<(usize, usize)>,
    rng: &mut ChaCha8Rng,
) -> Option<RosterState> {
    let e = rng.gen_range(0..ctx.n_employees());
    let week = rng.gen_range(0..ctx.n_weeks());
    let days: Vec<usize> = ctx.window.weeks[week]
        .dates
        .iter()
        .map(|d| ctx.window.day_index(*d).unwrap())
        .collect();

    let worked: Vec<usize> = days
        .iter()
        .copied()
        .filter(|d| current.cell(e, *d).shift_code().is_some())
        .filter(|d| !pinned.contains(&(e, *d)))
        .collect();
    let from = *pick(rng, &worked)?;
    let code = current.cell(e, from).shift_code().cloned()?;

    // Keep weekday/weekend parity so staffing bounds stay comparable.
    let from_weekday = is_weekday(ctx.date(from));
    let free: Vec<usize> = days
        .iter()
        .copied()
        .filter(|d| is_weekday(ctx.date(*d)) == from_weekday)
        .filter(|d| current.cell(e, *d) == &DayCell::Rest)
        .filter(|d| !pinned.contains(&(e, *d)))
        .filter(|d| !ctx.is_absent(e, *d))
        .collect();
    let to = *pick(rng, &free)?;

    let mut next = current.clone();
    next.set_cell(e, from, DayCell::Rest);
    next.set_cell(e, to, DayCell::Shift(code));
    Some(next)
}

/// Hand the week's TD duty to a different qualified employee.
fn swap_td_holder(
    ctx: &crate::model::PlanningContext,
    current: &RosterState,
    rng: &mut ChaCha8Rng,
) -> Option<RosterState> {
    let week = rng.gen_range(0..ctx.n_weeks());
    let holder = current.td_holder[week]?;
    if ctx
        .locks
        .td
        .iter()
        .any(|((_, w), held)| *w == week && *held)
    {
        return None;
    }

    let candidates: Vec<usize> = ctx
        .td_qualified()
        .into_iter()
        .filter(|e| *e != holder)
        .filter(|e| {
            ctx.window.weeks[week].weekdays().all(|date| {
                let d = ctx.window.day_index(date).unwrap();
                ctx.is_absent(*e, d) || current.cell(*e, d) == &DayCell::Rest
            })
        })
        .filter(|e| {
            !ctx.locks
                .td
                .iter()
                .any(|((id, w), held)| *w == week && !*held && ctx.employee_index(*id) == Some(*e))
        })
        .collect();
    let next_holder = *pick(rng, &candidates)?;

    let mut next = current.clone();
    next.td_holder[week] = Some(next_holder);
    for date in ctx.window.weeks[week].weekdays() {
        let d = ctx.window.day_index(date).unwrap();
        if current.cell(holder, d) == &DayCell::Td {
            next.set_cell(holder, d, DayCell::Rest);
        }
        if !ctx.is_absent(next_holder, d) {
            next.set_cell(next_holder, d, DayCell::Td);
        }
    }
    Some(next)
}

/// Reseat a day's BMT or BSB duty on another qualified employee.
fn swap_specialist(
    ctx: &crate::model::PlanningContext,
    current: &RosterState,
    pinned: &HashSet<(usize, usize)>,
    rng: &mut ChaCha8Rng,
) -> Option<RosterState> {
    let d = rng.gen_range(0..ctx.n_days());
    if !is_weekday(ctx.date(d)) {
        return None;
    }
    let bmt = rng.gen_bool(0.5);
    let cell = if bmt { DayCell::Bmt } else { DayCell::Bsb };
    let qualified = if bmt {
        ctx.bmt_qualified()
    } else {
        ctx.bsb_qualified()
    };

    let holder = (0..ctx.n_employees()).find(|e| current.cell(*e, d) == &cell)?;
    let candidates: Vec<usize> = qualified
        .into_iter()
        .filter(|e| *e != holder)
        .filter(|e| current.cell(*e, d) == &DayCell::Rest)
        .filter(|e| !pinned.contains(&(*e, d)))
        .filter(|e| !ctx.is_absent(*e, d))
        .collect();
    let next_holder = *pick(rng, &candidates)?;

    let mut next = current.clone();
    next.set_cell(holder, d, DayCell::Rest);
    next.set_cell(next_holder, d, cell);
    Some(next)
}

fn pick<'a, T>(rng: &mut ChaCha8Rng, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    Some(&items[rng.gen_range(0..items.len())])
}
