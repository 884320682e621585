use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use shared::{AbsenceCode, EmployeeId, HOURS_SCALE};

use crate::domain::{Absence, Employee, ShiftAssignment, ShiftCatalog};

/// Per-employee hour accounting over a date range. Training days (`L`)
/// count 8 h toward the statistic even though no shift is assigned;
/// vacation and sick days contribute nothing.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeHourStatistics {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub worked_scaled_hours: i64,
    pub training_scaled_hours: i64,
    pub total_scaled_hours: i64,
    pub shift_days: u32,
    pub absence_days: BTreeMap<String, u32>,
}

pub fn compute_statistics(
    employees: &[Employee],
    assignments: &[ShiftAssignment],
    absences: &[Absence],
    catalog: &ShiftCatalog,
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<EmployeeHourStatistics> {
    let mut stats: Vec<EmployeeHourStatistics> = employees
        .iter()
        .map(|employee| {
            let mut worked = 0i64;
            let mut shift_days = 0u32;
            for assignment in assignments
                .iter()
                .filter(|a| a.employee_id == employee.id)
                .filter(|a| a.date >= from && a.date <= to)
            {
                worked += catalog.scaled_hours(&assignment.shift_code);
                shift_days += 1;
            }

            let mut training = 0i64;
            let mut absence_days: BTreeMap<String, u32> = BTreeMap::new();
            for absence in absences.iter().filter(|a| a.employee_id == employee.id) {
                for _ in absence.dates().filter(|d| *d >= from && *d <= to) {
                    *absence_days.entry(absence.code.to_string()).or_default() += 1;
                    if absence.code == AbsenceCode::L {
                        training += 8 * HOURS_SCALE;
                    }
                }
            }

            EmployeeHourStatistics {
                employee_id: employee.id,
                employee_name: employee.full_name(),
                worked_scaled_hours: worked,
                training_scaled_hours: training,
                total_scaled_hours: worked + training,
                shift_days,
                absence_days,
            }
        })
        .collect();

    // Alphabetical by display name for stable reporting.
    stats.sort_by(|a, b| a.employee_name.cmp(&b.employee_name));
    stats
}
