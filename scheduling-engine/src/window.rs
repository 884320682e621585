use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use shared::{EngineError, EngineResult};

/// One rotation week of the extended window. Weeks are Sunday-first:
/// the Sunday opens the week and the following Saturday closes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Week {
    pub index: usize,
    pub dates: Vec<NaiveDate>,
    /// A week is a boundary week when any of its dates falls outside the
    /// requested window; such weeks are re-planned, not locked.
    pub is_boundary: bool,
}

impl Week {
    pub fn weekdays(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.dates
            .iter()
            .copied()
            .filter(|d| d.weekday().num_days_from_monday() < 5)
    }

    pub fn weekend_days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.dates
            .iter()
            .copied()
            .filter(|d| d.weekday().num_days_from_monday() >= 5)
    }

    pub fn start(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn end(&self) -> NaiveDate {
        *self.dates.last().unwrap()
    }
}

/// The requested planning window widened to whole Sunday→Saturday weeks,
/// so week-level constraints are well-defined at both edges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningWindow {
    pub requested_start: NaiveDate,
    pub requested_end: NaiveDate,
    pub extended_start: NaiveDate,
    pub extended_end: NaiveDate,
    pub dates: Vec<NaiveDate>,
    pub weeks: Vec<Week>,
}

impl PlanningWindow {
    pub fn expand(start: NaiveDate, end: NaiveDate) -> EngineResult<Self> {
        if start > end {
            return Err(EngineError::InvalidDateRange { start, end });
        }

        // Widen backward to the nearest Sunday and forward to the
        // nearest Saturday. chrono weekday indices are Monday-based:
        // Mon=0 … Sat=5, Sun=6.
        let start_wd = start.weekday().num_days_from_monday() as i64;
        let extended_start = if start_wd == 6 {
            start
        } else {
            start - Duration::days((start_wd + 1) % 7)
        };

        let end_wd = end.weekday().num_days_from_monday() as i64;
        let extended_end = if end_wd == 5 {
            end
        } else {
            end + Duration::days((5 - end_wd).rem_euclid(7))
        };

        let mut dates = Vec::new();
        let mut current = extended_start;
        while current <= extended_end {
            dates.push(current);
            current += Duration::days(1);
        }

        let mut weeks = Vec::new();
        for (index, chunk) in dates.chunks(7).enumerate() {
            let is_boundary = chunk.iter().any(|d| *d < start || *d > end);
            weeks.push(Week {
                index,
                dates: chunk.to_vec(),
                is_boundary,
            });
        }

        Ok(Self {
            requested_start: start,
            requested_end: end,
            extended_start,
            extended_end,
            dates,
            weeks,
        })
    }

    pub fn day_index(&self, date: NaiveDate) -> Option<usize> {
        if date < self.extended_start || date > self.extended_end {
            return None;
        }
        Some((date - self.extended_start).num_days() as usize)
    }

    pub fn week_index_of(&self, date: NaiveDate) -> Option<usize> {
        self.day_index(date).map(|i| i / 7)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.extended_start && date <= self.extended_end
    }

    pub fn in_requested(&self, date: NaiveDate) -> bool {
        date >= self.requested_start && date <= self.requested_end
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    date.weekday().num_days_from_monday() >= 5
}

pub fn is_weekday(date: NaiveDate) -> bool {
    !is_weekend(date)
}
