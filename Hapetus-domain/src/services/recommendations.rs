use crate::entities::classification::BpCategory;
use crate::entities::settings::Gender;
use crate::guidelines::AgeBracket;
use crate::services::classifier::DEFAULT_AGE;

/// Advice for a classified reading.
///
/// Category advice comes first, then advice for the age bracket, then at most
/// one gender note.
pub fn recommendations(age: Option<i32>, gender: Option<Gender>, category: BpCategory) -> Vec<String> {
    let age = age.unwrap_or(DEFAULT_AGE);
    let mut advice: Vec<&'static str> = Vec::new();

    advice.extend_from_slice(match category {
        BpCategory::Optimal => &["Keep up your current healthy habits."][..],
        BpCategory::Normal => &[
            "Your readings are in a healthy range.",
            "Keep measuring regularly to spot changes early.",
        ],
        BpCategory::HighNormal => &[
            "Reduce salt and processed food in your diet.",
            "Aim for at least 150 minutes of moderate activity per week.",
            "Measure again within a week.",
        ],
        BpCategory::HypertensionGrade1 => &[
            "Talk to your doctor about these readings.",
            "Limit alcohol and stop smoking.",
            "Measure twice a day for a week and share the results.",
        ],
        BpCategory::HypertensionGrade2 => &[
            "Consult a doctor as soon as possible.",
            "Seek emergency care if you have chest pain, shortness of breath or severe headache.",
        ],
        BpCategory::Hypotension => &[
            "Drink enough fluids throughout the day.",
            "Stand up slowly to avoid dizziness.",
            "See a doctor if you feel faint or confused.",
        ],
    });

    match AgeBracket::from_age(age) {
        AgeBracket::YoungAdult => advice.push("Build habits now: regular exercise and sleep pay off later."),
        AgeBracket::MiddleAge => advice.push("Have your blood pressure checked by a professional once a year."),
        AgeBracket::OlderAdult => advice.push("Review your medication with your doctor regularly."),
        AgeBracket::Elderly => {
            advice.push("Avoid sudden position changes and watch for dizziness.");
            advice.push("Discuss individual targets with your doctor.");
        }
    }

    match (gender, AgeBracket::from_age(age)) {
        (Some(Gender::Female), AgeBracket::MiddleAge | AgeBracket::OlderAdult) => {
            advice.push("Hormonal changes around menopause can raise blood pressure.")
        }
        (Some(Gender::Male), AgeBracket::MiddleAge | AgeBracket::OlderAdult) => {
            advice.push("Men in this age group have a higher cardiovascular risk; keep regular check-ups.")
        }
        _ => {}
    }

    advice.into_iter().map(String::from).collect()
}
