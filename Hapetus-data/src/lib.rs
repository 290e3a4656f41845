// Hapetus Data
// This crate owns measurement storage: the SQLite pool, migrations and repositories

// Database connection management
pub mod database;

// Repository implementations for data access
pub mod repository;

// Data storage models
pub mod models;
