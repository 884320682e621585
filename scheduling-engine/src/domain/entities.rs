use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use shared::{AbsenceCode, AssignmentId, EmployeeId, ShiftCode, TeamId};

/// An employee in the shift system. Created by admin operations, never
/// mutated by the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub personnel_number: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    /// `None` means unattached; unattached employees act as springers.
    #[serde(default)]
    pub team_id: Option<TeamId>,
    #[serde(default)]
    pub is_td_qualified: bool,
    /// BMT (fire-alarm technician) qualification
    #[serde(default)]
    pub is_fire_alarm_technician: bool,
    /// BSB (fire-safety officer) qualification
    #[serde(default)]
    pub is_fire_safety_officer: bool,
    #[serde(default)]
    pub is_team_leader: bool,
    #[serde(default)]
    pub is_temporary_worker: bool,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// TD qualification is implied by either specialist qualification.
    pub fn can_do_td(&self) -> bool {
        self.is_td_qualified || self.is_fire_alarm_technician || self.is_fire_safety_officer
    }

    pub fn is_unattached(&self) -> bool {
        self.team_id.is_none()
    }
}

/// A team of employees. Virtual teams exist for display grouping only and
/// are excluded from rotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_virtual: bool,
    /// Shift codes this team may operate; an empty set means "any".
    #[serde(default)]
    pub allowed_shift_codes: Vec<ShiftCode>,
    #[serde(default)]
    pub rotation_group: Option<String>,
}

impl Team {
    pub fn allows(&self, code: &ShiftCode) -> bool {
        self.allowed_shift_codes.is_empty() || self.allowed_shift_codes.contains(code)
    }
}

/// An employee absence. Absences are authoritative: on any date in range
/// the employee can hold no regular or special shift, and absences always
/// shadow locks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Absence {
    pub id: i64,
    pub employee_id: EmployeeId,
    pub code: AbsenceCode,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Absence {
    pub fn overlaps(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start_date.iter_days().take_while(|d| *d <= self.end_date)
    }
}

/// A concrete shift assignment, created by the solver or the springer
/// replacer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftAssignment {
    pub id: AssignmentId,
    pub employee_id: EmployeeId,
    pub shift_code: ShiftCode,
    pub date: NaiveDate,
    #[serde(default)]
    pub is_manual: bool,
    #[serde(default)]
    pub is_fixed: bool,
    #[serde(default)]
    pub is_springer_assignment: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Operator lock: a team holds a given main shift for a whole week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamShiftLock {
    pub team_id: TeamId,
    pub week_index: usize,
    pub shift: ShiftCode,
}

/// Operator lock: an employee holds a given shift on a given date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeShiftLock {
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
    pub shift: ShiftCode,
}

/// Operator lock: an employee works (or must not work) a weekend date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeWeekendLock {
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
    pub working: bool,
}

/// Operator lock: an employee holds (or must not hold) TD in a week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TdLock {
    pub employee_id: EmployeeId,
    pub week_index: usize,
    pub holds_td: bool,
}

/// The raw operator locks as passed into the engine, before
/// consolidation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LockInput {
    #[serde(default)]
    pub team_shift: Vec<TeamShiftLock>,
    #[serde(default)]
    pub employee_shift: Vec<EmployeeShiftLock>,
    #[serde(default)]
    pub employee_weekend: Vec<EmployeeWeekendLock>,
    #[serde(default)]
    pub td: Vec<TdLock>,
}

impl LockInput {
    pub fn is_empty(&self) -> bool {
        self.team_shift.is_empty()
            && self.employee_shift.is_empty()
            && self.employee_weekend.is_empty()
            && self.td.is_empty()
    }
}
