use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use shared::{EngineError, EngineResult, ShiftCode, HOURS_SCALE};

/// Minimum/maximum headcount for a shift on a single day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StaffingBounds {
    pub min: u32,
    pub max: u32,
}

impl StaffingBounds {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

fn default_weekly_hours() -> f64 {
    40.0
}

fn default_max_consecutive() -> u32 {
    6
}

fn default_works_days() -> [bool; 7] {
    [true; 7]
}

/// A shift type with timing, staffing bounds and working-hour rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftType {
    pub id: i64,
    pub code: ShiftCode,
    pub name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub weekday_staffing: StaffingBounds,
    pub weekend_staffing: StaffingBounds,
    /// Expected weekly working hours for employees predominantly on this
    /// shift type.
    #[serde(default = "default_weekly_hours")]
    pub weekly_working_hours: f64,
    /// Per-type limit on same-type consecutive days.
    #[serde(default = "default_max_consecutive")]
    pub max_consecutive_days: u32,
    /// Which weekdays the shift operates, Monday first.
    #[serde(default = "default_works_days")]
    pub works_days: [bool; 7],
}

impl ShiftType {
    pub fn works_on(&self, date: NaiveDate) -> bool {
        self.works_days[date.weekday().num_days_from_monday() as usize]
    }

    /// Duration in scaled hours (hours × 10). Overnight shifts roll over
    /// midnight.
    pub fn duration_scaled_hours(&self) -> i64 {
        let start = self.start_time.num_seconds_from_midnight() as i64 / 60;
        let mut end = self.end_time.num_seconds_from_midnight() as i64 / 60;
        if end <= start {
            end += 24 * 60;
        }
        (end - start) * HOURS_SCALE / 60
    }

    pub fn weekly_target_scaled(&self) -> i64 {
        (self.weekly_working_hours * HOURS_SCALE as f64).round() as i64
    }

    pub fn staffing_for(&self, date: NaiveDate) -> StaffingBounds {
        if date.weekday().num_days_from_monday() >= 5 {
            self.weekend_staffing
        } else {
            self.weekday_staffing
        }
    }
}

/// The catalog of shift types active in a planning run, keyed by code.
#[derive(Debug, Clone)]
pub struct ShiftCatalog {
    types: Vec<ShiftType>,
}

impl ShiftCatalog {
    pub fn new(types: Vec<ShiftType>) -> EngineResult<Self> {
        for (i, a) in types.iter().enumerate() {
            for b in &types[i + 1..] {
                if a.code == b.code {
                    return Err(EngineError::InvalidInput(format!(
                        "duplicate shift type code '{}'",
                        a.code
                    )));
                }
                if a.id == b.id {
                    return Err(EngineError::InvalidInput(format!(
                        "duplicate shift type id {}",
                        a.id
                    )));
                }
            }
        }
        Ok(Self { types })
    }

    /// The standard catalog: F/S/N rotating triad, the intermediate ZD
    /// shift, the TA assistant shift, and the BMT/BSB specialist
    /// functions.
    pub fn standard() -> Self {
        let t = |h: u32, m: u32| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        let weekdays_only = [true, true, true, true, true, false, false];
        Self {
            types: vec![
                ShiftType {
                    id: 1,
                    code: ShiftCode::F,
                    name: "Frühdienst".to_string(),
                    start_time: t(5, 45),
                    end_time: t(13, 45),
                    weekday_staffing: StaffingBounds::new(3, 5),
                    weekend_staffing: StaffingBounds::new(2, 3),
                    weekly_working_hours: 40.0,
                    max_consecutive_days: 6,
                    works_days: [true; 7],
                },
                ShiftType {
                    id: 2,
                    code: ShiftCode::S,
                    name: "Spätdienst".to_string(),
                    start_time: t(13, 45),
                    end_time: t(21, 45),
                    weekday_staffing: StaffingBounds::new(3, 5),
                    weekend_staffing: StaffingBounds::new(2, 3),
                    weekly_working_hours: 40.0,
                    max_consecutive_days: 6,
                    works_days: [true; 7],
                },
                ShiftType {
                    id: 3,
                    code: ShiftCode::N,
                    name: "Nachtdienst".to_string(),
                    start_time: t(21, 45),
                    end_time: t(5, 45),
                    weekday_staffing: StaffingBounds::new(3, 3),
                    weekend_staffing: StaffingBounds::new(2, 3),
                    weekly_working_hours: 40.0,
                    max_consecutive_days: 3,
                    works_days: [true; 7],
                },
                ShiftType {
                    id: 4,
                    code: ShiftCode::Zd,
                    name: "Zwischendienst".to_string(),
                    start_time: t(8, 0),
                    end_time: t(16, 0),
                    weekday_staffing: StaffingBounds::new(0, 5),
                    weekend_staffing: StaffingBounds::new(0, 0),
                    weekly_working_hours: 40.0,
                    max_consecutive_days: 6,
                    works_days: weekdays_only,
                },
                ShiftType {
                    id: 5,
                    code: ShiftCode::Ta,
                    name: "Technischer Assistent".to_string(),
                    start_time: t(7, 0),
                    end_time: t(15, 0),
                    weekday_staffing: StaffingBounds::new(0, 2),
                    weekend_staffing: StaffingBounds::new(0, 0),
                    weekly_working_hours: 40.0,
                    max_consecutive_days: 6,
                    works_days: weekdays_only,
                },
                ShiftType {
                    id: 6,
                    code: ShiftCode::Bmt,
                    name: "Brandmeldetechniker".to_string(),
                    start_time: t(6, 0),
                    end_time: t(14, 0),
                    weekday_staffing: StaffingBounds::new(1, 2),
                    weekend_staffing: StaffingBounds::new(0, 0),
                    weekly_working_hours: 40.0,
                    max_consecutive_days: 6,
                    works_days: weekdays_only,
                },
                ShiftType {
                    id: 7,
                    code: ShiftCode::Bsb,
                    name: "Brandschutzbeauftragter".to_string(),
                    start_time: t(7, 0),
                    end_time: t(16, 30),
                    weekday_staffing: StaffingBounds::new(1, 2),
                    weekend_staffing: StaffingBounds::new(0, 0),
                    weekly_working_hours: 40.0,
                    max_consecutive_days: 6,
                    works_days: weekdays_only,
                },
            ],
        }
    }

    pub fn by_code(&self, code: &ShiftCode) -> Option<&ShiftType> {
        self.types.iter().find(|t| &t.code == code)
    }

    pub fn by_id(&self, id: i64) -> Option<&ShiftType> {
        self.types.iter().find(|t| t.id == id)
    }

    pub fn types(&self) -> &[ShiftType] {
        &self.types
    }

    /// The main rotating shift codes (F, S, N) present in the catalog.
    pub fn main_codes(&self) -> Vec<ShiftCode> {
        [ShiftCode::F, ShiftCode::S, ShiftCode::N]
            .into_iter()
            .filter(|c| self.by_code(c).is_some())
            .collect()
    }

    pub fn scaled_hours(&self, code: &ShiftCode) -> i64 {
        self.by_code(code)
            .map(|t| t.duration_scaled_hours())
            .unwrap_or(8 * HOURS_SCALE)
    }

    /// The largest per-type consecutive-day limit; also used as the
    /// cross-type total limit on consecutive working days.
    pub fn max_consecutive_limit(&self) -> u32 {
        self.types
            .iter()
            .map(|t| t.max_consecutive_days)
            .max()
            .unwrap_or(6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_night_shift_duration_rolls_over_midnight() {
        let catalog = ShiftCatalog::standard();
        let night = catalog.by_code(&ShiftCode::N).unwrap();
        assert_eq!(night.duration_scaled_hours(), 80);
    }

    #[test]
    fn test_bsb_keeps_half_hours_integral() {
        let catalog = ShiftCatalog::standard();
        let bsb = catalog.by_code(&ShiftCode::Bsb).unwrap();
        assert_eq!(bsb.duration_scaled_hours(), 95);
    }

    #[test]
    fn test_weekend_bounds_selected_on_saturday() {
        let catalog = ShiftCatalog::standard();
        let early = catalog.by_code(&ShiftCode::F).unwrap();
        // 2026-01-03 is a Saturday
        let saturday = NaiveDate::from_ymd_opt(2026, 1, 3).unwrap();
        assert_eq!(early.staffing_for(saturday), StaffingBounds::new(2, 3));
        let monday = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(early.staffing_for(monday), StaffingBounds::new(3, 5));
    }

    #[test]
    fn test_duplicate_codes_rejected() {
        let catalog = ShiftCatalog::standard();
        let mut types = catalog.types().to_vec();
        let mut dup = types[0].clone();
        dup.id = 99;
        types.push(dup);
        assert!(ShiftCatalog::new(types).is_err());
    }

    #[test]
    fn test_specialists_do_not_work_weekends() {
        let catalog = ShiftCatalog::standard();
        let bmt = catalog.by_code(&ShiftCode::Bmt).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2026, 1, 3).unwrap();
        assert!(!bmt.works_on(saturday));
    }
}
