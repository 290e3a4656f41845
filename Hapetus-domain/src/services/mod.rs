// Pure blood pressure classification and advice
pub mod classifier;
pub mod recommendations;

// Input validation shared by server and clients
pub mod validation;

// Repository-backed services
#[cfg(feature = "with-data")]
pub mod measurements;
#[cfg(feature = "with-data")]
pub mod settings;
#[cfg(feature = "with-data")]
pub mod stats;

pub use classifier::{calculate_age, classify, current_age, DEFAULT_AGE};
pub use recommendations::recommendations;
