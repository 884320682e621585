use std::collections::HashMap;

use shared::{AbsenceCode, ShiftCode, TeamId};

/// What one employee does on one day of the extended window.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DayCell {
    /// Explicit rest marker, rendered as `+`.
    #[default]
    Rest,
    Absent(AbsenceCode),
    Shift(ShiftCode),
    /// Weekly day duty, rendered as `TD`.
    Td,
    Bmt,
    Bsb,
}

impl DayCell {
    pub fn is_working(&self) -> bool {
        matches!(
            self,
            DayCell::Shift(_) | DayCell::Td | DayCell::Bmt | DayCell::Bsb
        )
    }

    pub fn shift_code(&self) -> Option<&ShiftCode> {
        match self {
            DayCell::Shift(code) => Some(code),
            _ => None,
        }
    }

    /// The code string shown in the dense schedule.
    pub fn render(&self) -> String {
        match self {
            DayCell::Rest => "+".to_string(),
            DayCell::Absent(code) => code.to_string(),
            DayCell::Shift(code) => code.to_string(),
            DayCell::Td => "TD".to_string(),
            DayCell::Bmt => "BMT".to_string(),
            DayCell::Bsb => "BSB".to_string(),
        }
    }
}

/// A candidate roster over the extended window: one cell per
/// (employee, day), the chosen weekly shift per team, and the TD holder
/// per week. Employees and days are dense indices into the planning
/// context.
#[derive(Debug, Clone)]
pub struct RosterState {
    n_days: usize,
    cells: Vec<DayCell>,
    pub team_week_shift: HashMap<(TeamId, usize), ShiftCode>,
    pub td_holder: Vec<Option<usize>>,
}

impl RosterState {
    pub fn new(n_employees: usize, n_days: usize, n_weeks: usize) -> Self {
        Self {
            n_days,
            cells: vec![DayCell::Rest; n_employees * n_days],
            team_week_shift: HashMap::new(),
            td_holder: vec![None; n_weeks],
        }
    }

    pub fn n_days(&self) -> usize {
        self.n_days
    }

    pub fn n_employees(&self) -> usize {
        if self.n_days == 0 {
            0
        } else {
            self.cells.len() / self.n_days
        }
    }

    pub fn cell(&self, employee: usize, day: usize) -> &DayCell {
        &self.cells[employee * self.n_days + day]
    }

    pub fn set_cell(&mut self, employee: usize, day: usize, cell: DayCell) {
        self.cells[employee * self.n_days + day] = cell;
    }

    pub fn is_working(&self, employee: usize, day: usize) -> bool {
        self.cell(employee, day).is_working()
    }

    /// Days `employee` works in the half-open index range.
    pub fn working_days_in(&self, employee: usize, range: std::ops::Range<usize>) -> usize {
        range.filter(|d| self.is_working(employee, *d)).count()
    }

    pub fn total_shifts(&self, employee: usize) -> usize {
        (0..self.n_days)
            .filter(|d| matches!(self.cell(employee, *d), DayCell::Shift(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cells_default_to_rest() {
        let roster = RosterState::new(3, 7, 1);
        assert_eq!(roster.n_employees(), 3);
        assert_eq!(*roster.cell(2, 6), DayCell::Rest);
        assert!(!roster.is_working(0, 0));
    }

    #[test]
    fn test_render_codes() {
        assert_eq!(DayCell::Rest.render(), "+");
        assert_eq!(DayCell::Td.render(), "TD");
        assert_eq!(DayCell::Shift(ShiftCode::N).render(), "N");
        assert_eq!(DayCell::Absent(AbsenceCode::Au).render(), "AU");
    }

    #[test]
    fn test_working_day_counts() {
        let mut roster = RosterState::new(1, 7, 1);
        roster.set_cell(0, 1, DayCell::Shift(ShiftCode::F));
        roster.set_cell(0, 2, DayCell::Td);
        roster.set_cell(0, 3, DayCell::Absent(AbsenceCode::U));
        assert_eq!(roster.working_days_in(0, 0..7), 2);
        assert_eq!(roster.total_shifts(0), 1);
    }
}
