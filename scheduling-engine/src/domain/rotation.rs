use serde::{Deserialize, Serialize};

use shared::ShiftCode;

/// An ordered, cyclic sequence of main shift codes. A team using the
/// group cycles through its shifts one per week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationGroup {
    pub name: String,
    pub sequence: Vec<ShiftCode>,
}

impl RotationGroup {
    /// The hardcoded fallback rotation: F → N → S.
    pub fn standard() -> Self {
        Self {
            name: "standard".to_string(),
            sequence: vec![ShiftCode::F, ShiftCode::N, ShiftCode::S],
        }
    }

    pub fn from_codes(codes: &[ShiftCode]) -> Option<Self> {
        if codes.is_empty() {
            return None;
        }
        Some(Self {
            name: "configured".to_string(),
            sequence: codes.to_vec(),
        })
    }

    pub fn position(&self, code: &ShiftCode) -> Option<usize> {
        self.sequence.iter().position(|c| c == code)
    }

    /// The cyclic successor of `code`, or `None` if the code is not part
    /// of the rotation.
    pub fn next_after(&self, code: &ShiftCode) -> Option<&ShiftCode> {
        let pos = self.position(code)?;
        Some(&self.sequence[(pos + 1) % self.sequence.len()])
    }

    /// The shift a team starting at `offset` holds in `week`.
    pub fn shift_for_week(&self, offset: usize, week: usize) -> &ShiftCode {
        &self.sequence[(offset + week) % self.sequence.len()]
    }

    /// A week-to-week transition is compliant when the team keeps its
    /// shift or advances to the next code in the rotation.
    pub fn is_compliant_transition(&self, from: &ShiftCode, to: &ShiftCode) -> bool {
        if from == to {
            return true;
        }
        self.next_after(from) == Some(to)
    }
}
