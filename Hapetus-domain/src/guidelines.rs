//! Blood pressure guideline tables.
//!
//! This is the only copy of the clinical lookup data. The classifier reads it
//! directly and `GET /api/guidelines` exports it for non-Rust clients.

use serde::Serialize;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::entities::classification::BpCategory;
use crate::entities::settings::Gender;

/// Age brackets that select a guideline table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AgeBracket {
    /// Under 40
    YoungAdult,
    /// 40 to 59
    MiddleAge,
    /// 60 to 79
    OlderAdult,
    /// 80 and over
    Elderly,
}

impl AgeBracket {
    pub fn from_age(age: i32) -> Self {
        match age {
            a if a < 40 => AgeBracket::YoungAdult,
            a if a < 60 => AgeBracket::MiddleAge,
            a if a < 80 => AgeBracket::OlderAdult,
            _ => AgeBracket::Elderly,
        }
    }
}

/// One band of a guideline table, bounds inclusive, in mmHg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BpRange {
    pub systolic_min: i32,
    pub systolic_max: i32,
    pub systolic_optimal: i32,
    pub diastolic_min: i32,
    pub diastolic_max: i32,
    pub diastolic_optimal: i32,
    pub category: BpCategory,
    pub description: &'static str,
}

/// The five ordered bands for one bracket, plus free-text notes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BpGuidelines {
    pub bracket: AgeBracket,
    /// Set only on the gender-specific variants of the older adult table
    pub gender: Option<Gender>,
    pub optimal: BpRange,
    pub normal: BpRange,
    pub high_normal: BpRange,
    pub hypertension_grade1: BpRange,
    pub hypertension_grade2: BpRange,
    pub notes: &'static [&'static str],
}

impl BpGuidelines {
    /// Bands in classification order
    pub fn ranges(&self) -> [&BpRange; 5] {
        [
            &self.optimal,
            &self.normal,
            &self.high_normal,
            &self.hypertension_grade1,
            &self.hypertension_grade2,
        ]
    }
}

const fn band(
    systolic: (i32, i32, i32),
    diastolic: (i32, i32, i32),
    category: BpCategory,
    description: &'static str,
) -> BpRange {
    BpRange {
        systolic_min: systolic.0,
        systolic_max: systolic.1,
        systolic_optimal: systolic.2,
        diastolic_min: diastolic.0,
        diastolic_max: diastolic.1,
        diastolic_optimal: diastolic.2,
        category,
        description,
    }
}

pub static YOUNG_ADULT: BpGuidelines = BpGuidelines {
    bracket: AgeBracket::YoungAdult,
    gender: None,
    optimal: band((90, 119, 110), (60, 79, 70), BpCategory::Optimal, "Optimal for adults under 40"),
    normal: band((120, 129, 125), (80, 84, 82), BpCategory::Normal, "Normal for adults under 40"),
    high_normal: band((130, 139, 135), (85, 89, 87), BpCategory::HighNormal, "High-normal, lifestyle review advised"),
    hypertension_grade1: band((140, 159, 150), (90, 99, 95), BpCategory::HypertensionGrade1, "Grade 1 hypertension"),
    hypertension_grade2: band((160, 179, 170), (100, 109, 105), BpCategory::HypertensionGrade2, "Grade 2 hypertension"),
    notes: &[
        "Elevated pressure at a young age deserves early attention.",
        "Regular activity and low salt intake keep pressure in range.",
    ],
};

pub static MIDDLE_AGE: BpGuidelines = BpGuidelines {
    bracket: AgeBracket::MiddleAge,
    gender: None,
    optimal: band((90, 124, 115), (60, 79, 75), BpCategory::Optimal, "Optimal for adults aged 40 to 59"),
    normal: band((125, 134, 130), (80, 84, 82), BpCategory::Normal, "Normal for adults aged 40 to 59"),
    high_normal: band((135, 139, 137), (85, 89, 87), BpCategory::HighNormal, "High-normal, lifestyle review advised"),
    hypertension_grade1: band((140, 159, 150), (90, 99, 95), BpCategory::HypertensionGrade1, "Grade 1 hypertension"),
    hypertension_grade2: band((160, 179, 170), (100, 109, 105), BpCategory::HypertensionGrade2, "Grade 2 hypertension"),
    notes: &[
        "Cardiovascular risk rises in this age group; measure regularly.",
        "Weight, alcohol and stress have a visible effect on readings.",
    ],
};

const OLDER_ADULT_OPTIMAL: BpRange =
    band((90, 129, 120), (60, 79, 75), BpCategory::Optimal, "Optimal for adults aged 60 to 79");
const OLDER_ADULT_NORMAL: BpRange =
    band((130, 139, 135), (80, 84, 82), BpCategory::Normal, "Normal for adults aged 60 to 79");
const OLDER_ADULT_HIGH_NORMAL: BpRange =
    band((140, 149, 145), (85, 89, 87), BpCategory::HighNormal, "High-normal, lifestyle review advised");
const OLDER_ADULT_GRADE1: BpRange =
    band((150, 169, 160), (90, 99, 95), BpCategory::HypertensionGrade1, "Grade 1 hypertension");
const OLDER_ADULT_GRADE2: BpRange =
    band((170, 189, 180), (100, 109, 105), BpCategory::HypertensionGrade2, "Grade 2 hypertension");

const OLDER_ADULT_BASE: BpGuidelines = BpGuidelines {
    bracket: AgeBracket::OlderAdult,
    gender: None,
    optimal: OLDER_ADULT_OPTIMAL,
    normal: OLDER_ADULT_NORMAL,
    high_normal: OLDER_ADULT_HIGH_NORMAL,
    hypertension_grade1: OLDER_ADULT_GRADE1,
    hypertension_grade2: OLDER_ADULT_GRADE2,
    notes: &[
        "Arteries stiffen with age, so slightly higher systolic values are tolerated.",
        "Stand up slowly if you notice dizziness after standing.",
    ],
};

pub static OLDER_ADULT: BpGuidelines = OLDER_ADULT_BASE;

pub static OLDER_ADULT_MALE: BpGuidelines = BpGuidelines {
    gender: Some(Gender::Male),
    notes: &[
        "Arteries stiffen with age, so slightly higher systolic values are tolerated.",
        "Men in this age group carry a higher risk of heart disease; keep regular check-ups.",
    ],
    ..OLDER_ADULT_BASE
};

pub static OLDER_ADULT_FEMALE: BpGuidelines = BpGuidelines {
    gender: Some(Gender::Female),
    notes: &[
        "Arteries stiffen with age, so slightly higher systolic values are tolerated.",
        "After menopause blood pressure tends to rise; monitor it more often.",
    ],
    ..OLDER_ADULT_BASE
};

pub static ELDERLY: BpGuidelines = BpGuidelines {
    bracket: AgeBracket::Elderly,
    gender: None,
    optimal: band((90, 139, 125), (60, 79, 75), BpCategory::Optimal, "Optimal for adults aged 80 and over"),
    normal: band((140, 149, 145), (80, 84, 82), BpCategory::Normal, "Normal for adults aged 80 and over"),
    high_normal: band((150, 159, 155), (85, 89, 87), BpCategory::HighNormal, "High-normal, discuss with your doctor"),
    hypertension_grade1: band((160, 179, 170), (90, 99, 95), BpCategory::HypertensionGrade1, "Grade 1 hypertension"),
    hypertension_grade2: band((180, 199, 190), (100, 114, 107), BpCategory::HypertensionGrade2, "Grade 2 hypertension"),
    notes: &[
        "Treatment targets are individual at this age; avoid lowering pressure too fast.",
        "Falls and dizziness can signal pressure that is too low.",
    ],
};

/// Select the guideline table for an age and optional gender
pub fn guidelines_for(age: i32, gender: Option<Gender>) -> &'static BpGuidelines {
    match AgeBracket::from_age(age) {
        AgeBracket::YoungAdult => &YOUNG_ADULT,
        AgeBracket::MiddleAge => &MIDDLE_AGE,
        AgeBracket::OlderAdult => match gender {
            Some(Gender::Male) => &OLDER_ADULT_MALE,
            Some(Gender::Female) => &OLDER_ADULT_FEMALE,
            _ => &OLDER_ADULT,
        },
        AgeBracket::Elderly => &ELDERLY,
    }
}

/// Every table, for export
pub fn all_guidelines() -> Vec<&'static BpGuidelines> {
    vec![
        &YOUNG_ADULT,
        &MIDDLE_AGE,
        &OLDER_ADULT,
        &OLDER_ADULT_MALE,
        &OLDER_ADULT_FEMALE,
        &ELDERLY,
    ]
}
