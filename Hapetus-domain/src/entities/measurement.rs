use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a set of vitals cannot form a measurement
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VitalsError {
    #[error("A measurement needs SpO2 and heart rate, or systolic and diastolic")]
    Empty,

    #[error("SpO2 and heart rate must be provided together")]
    IncompleteOxygenGroup,

    #[error("Systolic and diastolic must be provided together")]
    IncompleteBloodPressure,

    #[error("Systolic pressure must be greater than diastolic pressure")]
    SystolicNotAboveDiastolic,
}

/// The vitals carried by one measurement
///
/// At least one complete group is always present, so an empty
/// measurement cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Vitals {
    VitalsOnly {
        spo2: i32,
        heart_rate: i32,
    },
    BloodPressureOnly {
        systolic: i32,
        diastolic: i32,
    },
    Combined {
        spo2: i32,
        heart_rate: i32,
        systolic: i32,
        diastolic: i32,
    },
}

impl Vitals {
    /// Build vitals from optional parts, rejecting half-filled groups
    pub fn from_parts(
        spo2: Option<i32>,
        heart_rate: Option<i32>,
        systolic: Option<i32>,
        diastolic: Option<i32>,
    ) -> Result<Self, VitalsError> {
        let oxygen = match (spo2, heart_rate) {
            (Some(spo2), Some(heart_rate)) => Some((spo2, heart_rate)),
            (None, None) => None,
            _ => return Err(VitalsError::IncompleteOxygenGroup),
        };

        let pressure = match (systolic, diastolic) {
            (Some(systolic), Some(diastolic)) => {
                if systolic <= diastolic {
                    return Err(VitalsError::SystolicNotAboveDiastolic);
                }
                Some((systolic, diastolic))
            }
            (None, None) => None,
            _ => return Err(VitalsError::IncompleteBloodPressure),
        };

        match (oxygen, pressure) {
            (Some((spo2, heart_rate)), Some((systolic, diastolic))) => Ok(Vitals::Combined {
                spo2,
                heart_rate,
                systolic,
                diastolic,
            }),
            (Some((spo2, heart_rate)), None) => Ok(Vitals::VitalsOnly { spo2, heart_rate }),
            (None, Some((systolic, diastolic))) => Ok(Vitals::BloodPressureOnly { systolic, diastolic }),
            (None, None) => Err(VitalsError::Empty),
        }
    }

    pub fn spo2(&self) -> Option<i32> {
        match self {
            Vitals::VitalsOnly { spo2, .. } | Vitals::Combined { spo2, .. } => Some(*spo2),
            Vitals::BloodPressureOnly { .. } => None,
        }
    }

    pub fn heart_rate(&self) -> Option<i32> {
        match self {
            Vitals::VitalsOnly { heart_rate, .. } | Vitals::Combined { heart_rate, .. } => Some(*heart_rate),
            Vitals::BloodPressureOnly { .. } => None,
        }
    }

    /// Systolic and diastolic, when the blood pressure group is present
    pub fn blood_pressure(&self) -> Option<(i32, i32)> {
        match self {
            Vitals::BloodPressureOnly { systolic, diastolic }
            | Vitals::Combined { systolic, diastolic, .. } => Some((*systolic, *diastolic)),
            Vitals::VitalsOnly { .. } => None,
        }
    }
}

/// One before/after group of an exercise measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseVitals {
    pub spo2: i32,
    pub heart_rate: i32,
    pub blood_pressure: Option<(i32, i32)>,
}

impl ExerciseVitals {
    /// SpO2 and heart rate are mandatory, blood pressure is all-or-nothing
    pub fn from_parts(
        spo2: i32,
        heart_rate: i32,
        systolic: Option<i32>,
        diastolic: Option<i32>,
    ) -> Result<Self, VitalsError> {
        let vitals = Vitals::from_parts(Some(spo2), Some(heart_rate), systolic, diastolic)?;
        Ok(Self {
            spo2,
            heart_rate,
            blood_pressure: vitals.blood_pressure(),
        })
    }
}
