//! Monthly shift-roster engine for a three-team 24×7 operations
//! workforce.
//!
//! The engine takes entity snapshots, absences and operator locks,
//! widens the requested window to whole rotation weeks, builds a
//! constraint model, searches for a roster, re-validates every hard
//! rule independently of the solver, and queues structured
//! notifications for downstream delivery. The springer replacement
//! workflow covers absences entered after a plan was persisted.

pub mod domain;
pub mod engine;
pub mod locks;
pub mod lookback;
pub mod model;
pub mod notifications;
pub mod roster;
pub mod rules;
pub mod settings;
pub mod solver;
pub mod springer;
pub mod statistics;
pub mod validation;
pub mod window;

pub use domain::{
    Absence, Employee, EmployeeShiftLock, EmployeeWeekendLock, LockInput, RotationGroup,
    ShiftAssignment, ShiftCatalog, ShiftType, StaffingBounds, TdLock, Team, TeamShiftLock,
};
pub use engine::{Engine, PlanReport, PlanRequest};
pub use lookback::{InMemoryHistory, NoHistory, ShiftHistory};
pub use notifications::{Notification, NotificationPayload, NotificationQueue};
pub use settings::Settings;
pub use solver::{PlanOutcome, SolveLimits, SolverStatus};
pub use springer::{RangeLock, ReplacementOutcome};
pub use statistics::{compute_statistics, EmployeeHourStatistics};
pub use validation::ValidationResult;
pub use window::PlanningWindow;
