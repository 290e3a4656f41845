use rusqlite::Connection;
use tracing::info;

use crate::database::DatabaseError;

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Running SQLite migrations");

    create_daily_measurements_table(conn)?;
    create_exercise_measurements_table(conn)?;
    create_user_settings_table(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

/// Create the daily measurements table
fn create_daily_measurements_table(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Creating daily_measurements table if not exists");

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS daily_measurements (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            spo2 INTEGER,
            heart_rate INTEGER,
            systolic INTEGER,
            diastolic INTEGER,
            notes TEXT,
            measured_at INTEGER NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_daily_measurements_user_measured
        ON daily_measurements (user_id, measured_at DESC);",
    )
    .map_err(|e| DatabaseError::MigrationError(format!("daily_measurements: {}", e)))
}

/// Create the exercise measurements table
fn create_exercise_measurements_table(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Creating exercise_measurements table if not exists");

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS exercise_measurements (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            before_spo2 INTEGER NOT NULL,
            before_heart_rate INTEGER NOT NULL,
            before_systolic INTEGER,
            before_diastolic INTEGER,
            after_spo2 INTEGER NOT NULL,
            after_heart_rate INTEGER NOT NULL,
            after_systolic INTEGER,
            after_diastolic INTEGER,
            exercise_details TEXT NOT NULL,
            notes TEXT,
            measured_at INTEGER NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_exercise_measurements_user_measured
        ON exercise_measurements (user_id, measured_at DESC);",
    )
    .map_err(|e| DatabaseError::MigrationError(format!("exercise_measurements: {}", e)))
}

/// Create the per-user settings table
fn create_user_settings_table(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Creating user_settings table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS user_settings (
            user_id TEXT PRIMARY KEY,
            birth_year INTEGER,
            gender TEXT,
            display_name TEXT,
            reminders_enabled INTEGER NOT NULL DEFAULT 0,
            updated_at INTEGER NOT NULL
        )",
        [],
    )
    .map_err(|e| DatabaseError::MigrationError(format!("user_settings: {}", e)))?;

    Ok(())
}
