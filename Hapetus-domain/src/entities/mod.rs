// Domain entities and wire DTOs
pub mod classification;
pub mod dto;
pub mod measurement;
pub mod settings;
pub mod stats;

#[cfg(feature = "with-data")]
pub mod conversions;
