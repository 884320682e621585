use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown shift code '{0}'")]
    UnknownShiftCode(String),

    #[error("unknown absence code '{0}' (accepted: U, AU, L)")]
    UnknownAbsenceCode(String),

    #[error("forbidden absence code '{0}' (V and K must not be used)")]
    ForbiddenAbsenceCode(String),

    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("unknown team id {0}")]
    UnknownTeam(i64),

    #[error("unknown employee id {0}")]
    UnknownEmployee(i64),

    #[error("schedule validation failed with {0} violation(s)")]
    ValidationFailed(usize),

    #[error("a replacement is already in progress for employee {0}")]
    ReplacementInProgress(i64),

    #[error("configuration error: {0}")]
    Configuration(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
