// Hapetus Domain
// Business rules shared by the API server and the sync client

// Domain entities and wire DTOs
pub mod entities;

// Age- and gender-bucketed blood pressure guideline table
pub mod guidelines;

// Domain error taxonomy
pub mod errors;

// Services that implement business logic
pub mod services;

// Authentication
pub mod auth;

// Health checks and system status
#[cfg(feature = "with-data")]
pub mod health;

// Re-export the database module from the data crate for convenience
#[cfg(feature = "with-data")]
pub use hapetus_data::database;
