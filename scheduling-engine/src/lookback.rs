use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use tracing::debug;

use shared::{EmployeeId, ShiftCode, MAX_LOOKBACK_DAYS};

use crate::domain::ShiftAssignment;

/// Port to the previous periods' persisted rosters. The engine only ever
/// reads from history; lookback days are never modified.
pub trait ShiftHistory {
    /// Stored assignments with dates in `[from, to]`, any order.
    fn shifts_between(&self, from: NaiveDate, to: NaiveDate) -> Vec<ShiftAssignment>;
}

/// History source for fresh deployments with no prior periods.
pub struct NoHistory;

impl ShiftHistory for NoHistory {
    fn shifts_between(&self, _from: NaiveDate, _to: NaiveDate) -> Vec<ShiftAssignment> {
        Vec::new()
    }
}

/// Simple in-memory history, used by tests and the CLI snapshot loader.
#[derive(Debug, Default, Clone)]
pub struct InMemoryHistory {
    assignments: Vec<ShiftAssignment>,
}

impl InMemoryHistory {
    pub fn new(assignments: Vec<ShiftAssignment>) -> Self {
        Self { assignments }
    }
}

impl ShiftHistory for InMemoryHistory {
    fn shifts_between(&self, from: NaiveDate, to: NaiveDate) -> Vec<ShiftAssignment> {
        self.assignments
            .iter()
            .filter(|a| a.date >= from && a.date <= to)
            .cloned()
            .collect()
    }
}

/// Collects the shifts persisted before `extended_start` that the
/// consecutive-day rules must account for.
///
/// The initial lookback covers `base_days` days. While the earliest day
/// of the fetched range is itself an active shift day for any employee,
/// the chain may extend further back, so the range is widened until a
/// rest day is found for every employee or the 60-day cap is reached.
/// This is what lets the engine see a consecutive chain that straddles
/// two monthly plans.
pub fn collect_lookback(
    history: &dyn ShiftHistory,
    extended_start: NaiveDate,
    base_days: u32,
) -> HashMap<(EmployeeId, NaiveDate), ShiftCode> {
    let lookback_end = extended_start - Duration::days(1);
    let mut lookback_days = i64::from(base_days.max(1));

    loop {
        let lookback_start = extended_start - Duration::days(lookback_days);
        let shifts = history.shifts_between(lookback_start, lookback_end);

        let chain_reaches_range_start = shifts.iter().any(|a| a.date == lookback_start);
        if chain_reaches_range_start && lookback_days < MAX_LOOKBACK_DAYS {
            lookback_days = (lookback_days + i64::from(base_days.max(1))).min(MAX_LOOKBACK_DAYS);
            continue;
        }

        if !shifts.is_empty() {
            debug!(
                from = %lookback_start,
                to = %lookback_end,
                count = shifts.len(),
                "collected lookback shifts"
            );
        }
        return shifts
            .into_iter()
            .map(|a| ((a.employee_id, a.date), a.shift_code))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::AssignmentId;

    fn assignment(employee: i64, date: NaiveDate, code: ShiftCode) -> ShiftAssignment {
        ShiftAssignment {
            id: AssignmentId(date.num_days_from_ce() as i64 * 100 + employee),
            employee_id: EmployeeId(employee),
            shift_code: code,
            date,
            is_manual: false,
            is_fixed: false,
            is_springer_assignment: false,
            notes: None,
        }
    }

    use chrono::Datelike;

    #[test]
    fn test_short_chain_uses_base_lookback() {
        let start = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        let history = InMemoryHistory::new(vec![
            assignment(1, NaiveDate::from_ymd_opt(2026, 3, 30).unwrap(), ShiftCode::S),
            assignment(1, NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(), ShiftCode::S),
        ]);
        let lookback = collect_lookback(&history, start, 6);
        assert_eq!(lookback.len(), 2);
    }

    #[test]
    fn test_long_chain_extends_lookback() {
        // 22 consecutive S days ending the day before the window; the
        // base lookback of 6 days must be widened until the whole chain
        // is visible.
        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let mut assignments = Vec::new();
        let mut day = NaiveDate::from_ymd_opt(2026, 2, 7).unwrap();
        while day < start {
            assignments.push(assignment(1, day, ShiftCode::S));
            day += Duration::days(1);
        }
        let history = InMemoryHistory::new(assignments);
        let lookback = collect_lookback(&history, start, 6);
        assert_eq!(lookback.len(), 22);
        assert!(lookback
            .contains_key(&(EmployeeId(1), NaiveDate::from_ymd_opt(2026, 2, 7).unwrap())));
    }

    #[test]
    fn test_lookback_is_capped_at_sixty_days() {
        let start = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let mut assignments = Vec::new();
        let mut day = start - Duration::days(90);
        while day < start {
            assignments.push(assignment(1, day, ShiftCode::F));
            day += Duration::days(1);
        }
        let history = InMemoryHistory::new(assignments);
        let lookback = collect_lookback(&history, start, 6);
        assert_eq!(lookback.len(), 60);
    }

    #[test]
    fn test_empty_history() {
        let start = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        let lookback = collect_lookback(&NoHistory, start, 6);
        assert!(lookback.is_empty());
    }

    mockall::mock! {
        pub History {}
        impl ShiftHistory for History {
            fn shifts_between(&self, from: NaiveDate, to: NaiveDate) -> Vec<ShiftAssignment>;
        }
    }

    #[test]
    fn test_widening_queries_history_again() {
        // A 10-day chain with a 6-day base lookback needs exactly one
        // widening round trip against the history port.
        let start = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        let chain_start = start - Duration::days(10);
        let mut history = MockHistory::new();
        history
            .expect_shifts_between()
            .times(2)
            .returning(move |from, to| {
                let mut shifts = Vec::new();
                let mut day = chain_start.max(from);
                while day <= to {
                    shifts.push(assignment(1, day, ShiftCode::S));
                    day += Duration::days(1);
                }
                shifts
            });
        let lookback = collect_lookback(&history, start, 6);
        assert_eq!(lookback.len(), 10);
    }
}
