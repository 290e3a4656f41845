use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::guidelines::AgeBracket;

/// Blood pressure categories, ordered from lowest to highest pressure
/// with hypotension kept as a separate branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BpCategory {
    Optimal,
    Normal,
    HighNormal,
    HypertensionGrade1,
    HypertensionGrade2,
    Hypotension,
}

impl BpCategory {
    /// Display color used by every client
    pub fn color(&self) -> &'static str {
        match self {
            BpCategory::Optimal => "#4CAF50",
            BpCategory::Normal => "#8BC34A",
            BpCategory::HighNormal => "#FFC107",
            BpCategory::HypertensionGrade1 => "#FF9800",
            BpCategory::HypertensionGrade2 => "#F44336",
            BpCategory::Hypotension => "#2196F3",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            BpCategory::Optimal | BpCategory::Normal => Severity::Good,
            BpCategory::HighNormal | BpCategory::HypertensionGrade1 | BpCategory::Hypotension => {
                Severity::Warning
            }
            BpCategory::HypertensionGrade2 => Severity::Danger,
        }
    }

    /// User-facing message template for the category
    pub fn message(&self) -> &'static str {
        match self {
            BpCategory::Optimal => "Your blood pressure is optimal for your age.",
            BpCategory::Normal => "Your blood pressure is normal for your age.",
            BpCategory::HighNormal => {
                "Your blood pressure is high-normal. Keep an eye on it and review your lifestyle."
            }
            BpCategory::HypertensionGrade1 => {
                "Your blood pressure indicates grade 1 hypertension. Consider talking to your doctor."
            }
            BpCategory::HypertensionGrade2 => {
                "Your blood pressure indicates grade 2 hypertension. Please consult a doctor soon."
            }
            BpCategory::Hypotension => {
                "Your blood pressure is low. If you feel dizzy or faint, consult a doctor."
            }
        }
    }
}

impl fmt::Display for BpCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BpCategory::Optimal => write!(f, "Optimal"),
            BpCategory::Normal => write!(f, "Normal"),
            BpCategory::HighNormal => write!(f, "High Normal"),
            BpCategory::HypertensionGrade1 => write!(f, "Hypertension Grade 1"),
            BpCategory::HypertensionGrade2 => write!(f, "Hypertension Grade 2"),
            BpCategory::Hypotension => write!(f, "Hypotension"),
        }
    }
}

/// Coarse traffic-light severity of a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Good,
    Warning,
    Danger,
}

/// Result of classifying one blood pressure reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Classification {
    pub category: BpCategory,
    pub severity: Severity,
    pub message: String,
    pub color: String,
    /// Age bracket whose guideline table was applied
    pub guidelines_bracket: AgeBracket,
}

impl Classification {
    pub fn from_category(category: BpCategory, bracket: AgeBracket) -> Self {
        Self {
            category,
            severity: category.severity(),
            message: category.message().to_string(),
            color: category.color().to_string(),
            guidelines_bracket: bracket,
        }
    }
}
