use chrono::{Datelike, Utc};

use crate::entities::classification::{BpCategory, Classification};
use crate::entities::settings::Gender;
use crate::guidelines::guidelines_for;

/// Age assumed when none is known
pub const DEFAULT_AGE: i32 = 50;

/// Classify one blood pressure reading against the age-adjusted guidelines.
///
/// The first matching rule wins:
/// 1. systolic below 90 or diastolic below 60 is hypotension, for any age
/// 2. optimal, normal and high-normal require both values inside the band
/// 3. grade 1 requires either value inside its band
/// 4. anything else is grade 2
pub fn classify(systolic: i32, diastolic: i32, age: Option<i32>, gender: Option<Gender>) -> Classification {
    let table = guidelines_for(age.unwrap_or(DEFAULT_AGE), gender);

    let category = if systolic < 90 || diastolic < 60 {
        BpCategory::Hypotension
    } else if systolic <= table.optimal.systolic_max && diastolic <= table.optimal.diastolic_max {
        BpCategory::Optimal
    } else if systolic <= table.normal.systolic_max && diastolic <= table.normal.diastolic_max {
        BpCategory::Normal
    } else if systolic <= table.high_normal.systolic_max && diastolic <= table.high_normal.diastolic_max {
        BpCategory::HighNormal
    } else if systolic <= table.hypertension_grade1.systolic_max
        || diastolic <= table.hypertension_grade1.diastolic_max
    {
        BpCategory::HypertensionGrade1
    } else {
        BpCategory::HypertensionGrade2
    };

    Classification::from_category(category, table.bracket)
}

pub fn calculate_age(birth_year: i32, reference_year: i32) -> i32 {
    reference_year - birth_year
}

/// Age today, by calendar year
pub fn current_age(birth_year: i32) -> i32 {
    calculate_age(birth_year, Utc::now().year())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::classification::Severity;
    use crate::guidelines::AgeBracket;

    const GENDERS: [Option<Gender>; 4] = [None, Some(Gender::Male), Some(Gender::Female), Some(Gender::Other)];

    #[test]
    fn test_hypotension_wins_for_every_age_and_gender() {
        for age in [18, 39, 40, 59, 60, 79, 80, 95] {
            for gender in GENDERS {
                for (systolic, diastolic) in [(89, 70), (120, 59), (85, 55), (180, 50)] {
                    let result = classify(systolic, diastolic, Some(age), gender);
                    assert_eq!(result.category, BpCategory::Hypotension, "{}/{} age {}", systolic, diastolic, age);
                    assert_eq!(result.severity, Severity::Warning);
                }
            }
        }
    }

    #[test]
    fn test_young_adult_optimal_band() {
        for age in [18, 25, 39] {
            for systolic in 90..=119 {
                for diastolic in 60..=79 {
                    let result = classify(systolic, diastolic, Some(age), Some(Gender::Other));
                    assert_eq!(result.category, BpCategory::Optimal);
                }
            }
        }
    }

    #[test]
    fn test_grade1_uses_or_check() {
        let result = classify(145, 95, Some(45), Some(Gender::Other));
        assert_eq!(result.category, BpCategory::HypertensionGrade1);
        assert_eq!(result.severity, Severity::Warning);

        // Systolic far above grade 1, diastolic still inside it
        let result = classify(190, 95, Some(45), None);
        assert_eq!(result.category, BpCategory::HypertensionGrade1);
    }

    #[test]
    fn test_grade2_when_both_exceed_grade1() {
        let result = classify(165, 100, Some(45), Some(Gender::Other));
        assert_eq!(result.category, BpCategory::HypertensionGrade2);
        assert_eq!(result.severity, Severity::Danger);
        assert_eq!(result.color, "#F44336");
    }

    #[test]
    fn test_age_defaults_to_middle_age() {
        let result = classify(122, 78, None, None);
        assert_eq!(result.guidelines_bracket, AgeBracket::MiddleAge);
        assert_eq!(result.category, BpCategory::Optimal);

        // Same reading is only normal for a young adult
        let result = classify(122, 78, Some(30), None);
        assert_eq!(result.category, BpCategory::Normal);
    }

    #[test]
    fn test_older_adults_tolerate_higher_systolic() {
        assert_eq!(classify(145, 86, Some(70), Some(Gender::Female)).category, BpCategory::HighNormal);
        assert_eq!(classify(145, 86, Some(45), Some(Gender::Female)).category, BpCategory::HypertensionGrade1);
        assert_eq!(classify(135, 75, Some(85), None).category, BpCategory::Optimal);
    }

    #[test]
    fn test_calculate_age() {
        assert_eq!(calculate_age(1960, 2026), 66);
        assert_eq!(calculate_age(2000, 2000), 0);
    }

    #[test]
    fn test_current_age_is_positive_for_past_years() {
        assert!(current_age(1960) >= 66);
    }
}
