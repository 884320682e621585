pub mod catalog;
pub mod entities;
pub mod rotation;

pub use catalog::{ShiftCatalog, ShiftType, StaffingBounds};
pub use entities::{
    Absence, Employee, EmployeeShiftLock, EmployeeWeekendLock, LockInput, ShiftAssignment, TdLock,
    Team, TeamShiftLock,
};
pub use rotation::RotationGroup;
