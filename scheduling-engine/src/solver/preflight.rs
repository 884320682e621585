use crate::locks::LockConflict;
use crate::model::PlanningContext;

use super::{Diagnostics, ShiftEligibility, TeamCapability};

/// Builds the diagnostic record attached to every solve: per-shift
/// eligibility counts, team capability summary and the accumulated
/// lock-consolidation warnings.
pub fn build_diagnostics(ctx: &PlanningContext, lock_warnings: Vec<LockConflict>) -> Diagnostics {
    let shift_eligibility = ctx
        .main_codes
        .iter()
        .map(|code| {
            let shift_type = ctx.catalog.by_code(code).unwrap();
            let eligible = ctx
                .employees
                .iter()
                .filter(|e| {
                    e.team_id
                        .and_then(|id| ctx.teams.iter().find(|t| t.id == id))
                        .map(|t| !t.is_virtual && t.allows(code))
                        .unwrap_or(false)
                })
                .count();
            ShiftEligibility {
                shift: code.clone(),
                weekday_min: shift_type.weekday_staffing.min,
                weekend_min: shift_type.weekend_staffing.min,
                eligible_employees: eligible,
            }
        })
        .collect();

    let team_capabilities = ctx
        .teams
        .iter()
        .map(|team| {
            let members = ctx
                .team_members
                .get(&team.id)
                .map(|m| m.len())
                .unwrap_or(0);
            let member_indices = ctx.team_members.get(&team.id).cloned().unwrap_or_default();
            TeamCapability {
                team_id: team.id,
                name: team.name.clone(),
                members,
                is_virtual: team.is_virtual,
                allowed_codes: team.allowed_shift_codes.clone(),
                td_qualified: member_indices
                    .iter()
                    .filter(|e| ctx.employees[**e].can_do_td())
                    .count(),
                bmt_qualified: member_indices
                    .iter()
                    .filter(|e| ctx.employees[**e].is_fire_alarm_technician)
                    .count(),
                bsb_qualified: member_indices
                    .iter()
                    .filter(|e| ctx.employees[**e].is_fire_safety_officer)
                    .count(),
            }
        })
        .collect();

    Diagnostics {
        shift_eligibility,
        team_capabilities,
        lock_warnings,
        infeasibility_reasons: Vec::new(),
    }
}

/// Structural feasibility analysis, run before any search. Returns the
/// reasons the inputs cannot be staffed; an empty list means the search
/// is worth starting.
pub fn preflight(ctx: &PlanningContext) -> Vec<String> {
    let mut reasons = Vec::new();

    let rotation_teams = ctx.rotation_teams();
    let demanded: Vec<_> = ctx
        .main_codes
        .iter()
        .filter(|code| {
            ctx.catalog
                .by_code(code)
                .map(|t| t.weekday_staffing.min > 0)
                .unwrap_or(false)
        })
        .collect();

    if rotation_teams.len() < demanded.len() {
        reasons.push(format!(
            "{} rotation team(s) cannot cover the {} main shifts with minimum staffing",
            rotation_teams.len(),
            demanded.len()
        ));
    }

    // Per-shift aggregate eligibility against the weekday minimum.
    for code in &ctx.main_codes {
        let Some(shift_type) = ctx.catalog.by_code(code) else {
            continue;
        };
        let min = shift_type.weekday_staffing.min as usize;
        if min == 0 {
            continue;
        }
        let eligible = rotation_teams
            .iter()
            .filter(|t| t.allows(code))
            .map(|t| ctx.team_members[&t.id].len())
            .sum::<usize>();
        if eligible < min {
            reasons.push(format!(
                "shift {code}: only {eligible} eligible team member(s) for a weekday minimum of {min}"
            ));
        }
    }

    // Per-day presence: absences can starve a date below the combined
    // minimum headcount.
    for (d, date) in ctx.window.dates.iter().enumerate() {
        let combined_min: usize = ctx
            .main_codes
            .iter()
            .filter_map(|code| ctx.catalog.by_code(code))
            .map(|t| t.staffing_for(*date).min as usize)
            .sum();
        let present = (0..ctx.n_employees())
            .filter(|e| !ctx.is_springer(*e))
            .filter(|e| !ctx.is_absent(*e, d))
            .count();
        if present < combined_min {
            reasons.push(format!(
                "{date}: {present} team member(s) present against a combined minimum of {combined_min}"
            ));
        }
    }

    reasons
}
