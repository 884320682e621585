use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Working hours are carried as scaled integers (hours × 10) so that
/// half-hour shift durations such as 9.5 h stay integral in the model.
pub const HOURS_SCALE: i64 = 10;

/// Hard cap on how far the cross-period lookback may extend backwards
/// when a consecutive chain straddles planning periods.
pub const MAX_LOOKBACK_DAYS: i64 = 60;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct EmployeeId(pub i64);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct TeamId(pub i64);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct AssignmentId(pub i64);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shift-type code. `F`, `S` and `N` are the rotating main shifts; the
/// remaining standard codes cover intermediate and specialist duties.
/// Non-standard codes are allowed but must declare their own staffing
/// bounds in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShiftCode {
    /// Early shift (Frühdienst)
    F,
    /// Late shift (Spätdienst)
    S,
    /// Night shift (Nachtdienst)
    N,
    /// Intermediate shift (Zwischendienst)
    Zd,
    /// Technical assistant
    Ta,
    /// Fire-alarm technician, weekday-only specialist function
    Bmt,
    /// Fire-safety officer, weekday-only specialist function
    Bsb,
    /// Catalog-declared custom code
    Custom(String),
}

impl ShiftCode {
    pub fn as_str(&self) -> &str {
        match self {
            ShiftCode::F => "F",
            ShiftCode::S => "S",
            ShiftCode::N => "N",
            ShiftCode::Zd => "ZD",
            ShiftCode::Ta => "TA",
            ShiftCode::Bmt => "BMT",
            ShiftCode::Bsb => "BSB",
            ShiftCode::Custom(code) => code,
        }
    }

    /// The rotating triad that team rotation and staffing bounds apply to.
    pub fn is_main(&self) -> bool {
        matches!(self, ShiftCode::F | ShiftCode::S | ShiftCode::N)
    }

    pub fn is_special_function(&self) -> bool {
        matches!(self, ShiftCode::Bmt | ShiftCode::Bsb)
    }
}

impl fmt::Display for ShiftCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShiftCode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "F" => Ok(ShiftCode::F),
            "S" => Ok(ShiftCode::S),
            "N" => Ok(ShiftCode::N),
            "ZD" => Ok(ShiftCode::Zd),
            "TA" => Ok(ShiftCode::Ta),
            "BMT" => Ok(ShiftCode::Bmt),
            "BSB" => Ok(ShiftCode::Bsb),
            "" => Err(EngineError::UnknownShiftCode(s.to_string())),
            // TD is a weekly day-duty marker, never a shift code
            "TD" => Err(EngineError::UnknownShiftCode(s.to_string())),
            other => Ok(ShiftCode::Custom(other.to_string())),
        }
    }
}

impl Serialize for ShiftCode {
    fn serialize<Ser: serde::Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ShiftCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Absence codes. The surface is closed: `U` (vacation), `AU` (sick),
/// `L` (training). The legacy codes `V` and `K` are rejected on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbsenceCode {
    U,
    Au,
    L,
}

impl AbsenceCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbsenceCode::U => "U",
            AbsenceCode::Au => "AU",
            AbsenceCode::L => "L",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AbsenceCode::U => "Urlaub",
            AbsenceCode::Au => "Krank / AU",
            AbsenceCode::L => "Lehrgang",
        }
    }

    /// Training days count 8 h toward hour statistics; vacation and
    /// sick days count nothing.
    pub fn counts_toward_hours(&self) -> bool {
        matches!(self, AbsenceCode::L)
    }
}

impl fmt::Display for AbsenceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AbsenceCode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "U" => Ok(AbsenceCode::U),
            "AU" => Ok(AbsenceCode::Au),
            "L" => Ok(AbsenceCode::L),
            "V" | "K" => Err(EngineError::ForbiddenAbsenceCode(s.to_string())),
            other => Err(EngineError::UnknownAbsenceCode(other.to_string())),
        }
    }
}

impl Serialize for AbsenceCode {
    fn serialize<Ser: serde::Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AbsenceCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_absence_codes_rejected() {
        assert!(matches!(
            "V".parse::<AbsenceCode>(),
            Err(EngineError::ForbiddenAbsenceCode(_))
        ));
        assert!(matches!(
            "K".parse::<AbsenceCode>(),
            Err(EngineError::ForbiddenAbsenceCode(_))
        ));
    }

    #[test]
    fn test_standard_absence_codes_parse() {
        assert_eq!("U".parse::<AbsenceCode>().unwrap(), AbsenceCode::U);
        assert_eq!("AU".parse::<AbsenceCode>().unwrap(), AbsenceCode::Au);
        assert_eq!("L".parse::<AbsenceCode>().unwrap(), AbsenceCode::L);
    }

    #[test]
    fn test_td_is_not_a_shift_code() {
        assert!("TD".parse::<ShiftCode>().is_err());
    }

    #[test]
    fn test_custom_shift_code_round_trips() {
        let code: ShiftCode = "XY".parse().unwrap();
        assert_eq!(code, ShiftCode::Custom("XY".to_string()));
        assert_eq!(code.as_str(), "XY");
        assert!(!code.is_main());
    }
}
