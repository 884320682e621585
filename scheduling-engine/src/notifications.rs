use chrono::{NaiveDate, Utc};
use serde::Serialize;

use shared::{AbsenceCode, EmployeeId};

use crate::domain::{Absence, Employee};
use crate::locks::LockConflict;

/// Typed payload of one notification trigger. Delivery (email, push) is
/// an external collaborator; the engine only queues structured records.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationPayload {
    AbsenceAfterScheduling {
        employee_id: EmployeeId,
        employee_name: String,
        personnel_number: String,
        absence_code: AbsenceCode,
        start_date: NaiveDate,
        end_date: NaiveDate,
        affected_dates: Vec<NaiveDate>,
        schedule_month: String,
        replacement_attempted: bool,
    },
    SpringerAssigned {
        springer_id: EmployeeId,
        springer_name: String,
        springer_email: Option<String>,
        original_employee_id: EmployeeId,
        original_employee_name: String,
        shift_date: NaiveDate,
        shift_code: String,
        absence_reason: AbsenceCode,
    },
    NoReplacementAvailable {
        employee_id: EmployeeId,
        employee_name: String,
        team_name: String,
        shift_date: NaiveDate,
        shift_code: String,
        absence_reason: AbsenceCode,
        reason_no_replacement: String,
        understaffing_impact: String,
        priority: &'static str,
    },
    LockedAssignmentConflict {
        locked_type: &'static str,
        entity_id: i64,
        entity_name: String,
        locked_date_or_week: String,
        locked_value: String,
        conflict_description: String,
        priority: &'static str,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub created_on: NaiveDate,
    pub description: String,
    pub recipients: Vec<String>,
    pub payload: NotificationPayload,
}

impl Notification {
    pub fn trigger_type(&self) -> &'static str {
        match &self.payload {
            NotificationPayload::AbsenceAfterScheduling { .. } => "absence_after_scheduling",
            NotificationPayload::SpringerAssigned { .. } => "springer_assigned",
            NotificationPayload::NoReplacementAvailable { .. } => "no_replacement_available",
            NotificationPayload::LockedAssignmentConflict { .. } => "locked_assignment_conflict",
        }
    }
}

/// Per-engine append-only queue of pending notifications.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    pending: Vec<Notification>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &[Notification] {
        &self.pending
    }

    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending)
    }

    pub fn trigger_absence_after_scheduling(
        &mut self,
        employee: &Employee,
        absence: &Absence,
        affected_dates: Vec<NaiveDate>,
        schedule_month: String,
        replacement_attempted: bool,
    ) {
        let description = format!(
            "{} marked as {} from {} to {} after the schedule for {} was generated",
            employee.full_name(),
            absence.code,
            absence.start_date,
            absence.end_date,
            schedule_month
        );
        self.pending.push(Notification {
            created_on: Utc::now().date_naive(),
            description,
            recipients: vec!["Admin".to_string(), "Disponent".to_string()],
            payload: NotificationPayload::AbsenceAfterScheduling {
                employee_id: employee.id,
                employee_name: employee.full_name(),
                personnel_number: employee.personnel_number.clone(),
                absence_code: absence.code,
                start_date: absence.start_date,
                end_date: absence.end_date,
                affected_dates,
                schedule_month,
                replacement_attempted,
            },
        });
    }

    pub fn trigger_springer_assigned(
        &mut self,
        springer: &Employee,
        original: &Employee,
        shift_date: NaiveDate,
        shift_code: String,
        absence_reason: AbsenceCode,
    ) {
        let description = format!(
            "Springer {} automatically assigned to {} shift on {} replacing {} ({})",
            springer.full_name(),
            shift_code,
            shift_date,
            original.full_name(),
            absence_reason
        );
        self.pending.push(Notification {
            created_on: Utc::now().date_naive(),
            description,
            recipients: vec![
                "Admin".to_string(),
                "Disponent".to_string(),
                format!("employee_{}", springer.id),
            ],
            payload: NotificationPayload::SpringerAssigned {
                springer_id: springer.id,
                springer_name: springer.full_name(),
                springer_email: springer.email.clone(),
                original_employee_id: original.id,
                original_employee_name: original.full_name(),
                shift_date,
                shift_code,
                absence_reason,
            },
        });
    }

    #[allow(clippy::too_many_arguments)]
    pub fn trigger_no_replacement_available(
        &mut self,
        employee: &Employee,
        shift_date: NaiveDate,
        shift_code: String,
        team_name: String,
        absence_reason: AbsenceCode,
        reason_no_replacement: String,
        understaffing_impact: String,
    ) {
        let description = format!(
            "NO REPLACEMENT AVAILABLE for {} ({} shift on {}). Reason: {}",
            employee.full_name(),
            shift_code,
            shift_date,
            reason_no_replacement
        );
        self.pending.push(Notification {
            created_on: Utc::now().date_naive(),
            description,
            recipients: vec!["Admin".to_string(), "Disponent".to_string()],
            payload: NotificationPayload::NoReplacementAvailable {
                employee_id: employee.id,
                employee_name: employee.full_name(),
                team_name,
                shift_date,
                shift_code,
                absence_reason,
                reason_no_replacement,
                understaffing_impact,
                priority: "HIGH",
            },
        });
    }

    pub fn trigger_locked_assignment_conflict(&mut self, conflict: &LockConflict) {
        let description = format!(
            "Locked assignment for {} on {} causes conflict: {}",
            conflict.entity_name, conflict.locked_date_or_week, conflict.conflict_description
        );
        self.pending.push(Notification {
            created_on: Utc::now().date_naive(),
            description,
            recipients: vec!["Admin".to_string(), "Disponent".to_string()],
            payload: NotificationPayload::LockedAssignmentConflict {
                locked_type: conflict.locked_type,
                entity_id: conflict.entity_id,
                entity_name: conflict.entity_name.clone(),
                locked_date_or_week: conflict.locked_date_or_week.clone(),
                locked_value: conflict.locked_value.clone(),
                conflict_description: conflict.conflict_description.clone(),
                priority: "MEDIUM",
            },
        });
    }
}
