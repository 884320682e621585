pub mod error;
pub mod types;

// Re-export commonly used items
pub use error::{EngineError, EngineResult};
pub use types::{
    AbsenceCode, AssignmentId, EmployeeId, ShiftCode, TeamId, HOURS_SCALE, MAX_LOOKBACK_DAYS,
};
