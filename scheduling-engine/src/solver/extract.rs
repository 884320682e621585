use shared::AssignmentId;

use crate::domain::ShiftAssignment;
use crate::model::PlanningContext;
use crate::roster::{DayCell, RosterState};
use crate::rules::RuleScore;

use super::{CompleteSchedule, Diagnostics, PlanOutcome, SolverStatus, SpecialFunctionAssignment};

/// Converts the winning roster into the output artifacts: the
/// assignment list, the special-function map and the dense schedule
/// covering every employee on every extended-window date.
pub fn extract(
    ctx: &PlanningContext,
    roster: &RosterState,
    status: SolverStatus,
    score: RuleScore,
    diagnostics: Diagnostics,
) -> PlanOutcome {
    let mut assignments = Vec::new();
    let mut special_functions = Vec::new();
    let mut complete_schedule = CompleteSchedule::default();
    let mut next_id = 1i64;

    for e in 0..ctx.n_employees() {
        let employee_id = ctx.employees[e].id;
        for d in 0..ctx.n_days() {
            let date = ctx.date(d);
            let cell = roster.cell(e, d);
            complete_schedule.insert(employee_id, date, cell.render());

            match cell {
                DayCell::Shift(code) => {
                    let locked = ctx
                        .locks
                        .employee_shift
                        .contains_key(&(employee_id, date));
                    assignments.push(ShiftAssignment {
                        id: AssignmentId(next_id),
                        employee_id,
                        shift_code: code.clone(),
                        date,
                        is_manual: locked,
                        is_fixed: locked,
                        is_springer_assignment: false,
                        notes: None,
                    });
                    next_id += 1;
                }
                DayCell::Td | DayCell::Bmt | DayCell::Bsb => {
                    special_functions.push(SpecialFunctionAssignment {
                        employee_id,
                        date,
                        code: cell.render(),
                    });
                }
                DayCell::Rest | DayCell::Absent(_) => {}
            }
        }
    }

    PlanOutcome {
        status,
        assignments,
        special_functions,
        complete_schedule,
        objective: Some(score.penalty),
        diagnostics,
    }
}
