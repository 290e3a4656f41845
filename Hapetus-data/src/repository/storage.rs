use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::models::{DailyMeasurementRecord, ExerciseMeasurementRecord, UserSettingsRecord};
use super::errors::RepositoryError;

const DAILY_COLUMNS: &str =
    "id, user_id, spo2, heart_rate, systolic, diastolic, notes, measured_at, created_at, updated_at";

const EXERCISE_COLUMNS: &str = "id, user_id, before_spo2, before_heart_rate, before_systolic, \
     before_diastolic, after_spo2, after_heart_rate, after_systolic, after_diastolic, \
     exercise_details, notes, measured_at, created_at, updated_at";

/// SQLite storage operations for measurements and settings
pub struct DatabaseStorage;

impl DatabaseStorage {
    fn daily_from_row(row: &Row<'_>) -> rusqlite::Result<DailyMeasurementRecord> {
        Ok(DailyMeasurementRecord {
            id: row.get(0)?,
            user_id: row.get(1)?,
            spo2: row.get(2)?,
            heart_rate: row.get(3)?,
            systolic: row.get(4)?,
            diastolic: row.get(5)?,
            notes: row.get(6)?,
            measured_at: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    fn exercise_from_row(row: &Row<'_>) -> rusqlite::Result<ExerciseMeasurementRecord> {
        Ok(ExerciseMeasurementRecord {
            id: row.get(0)?,
            user_id: row.get(1)?,
            before_spo2: row.get(2)?,
            before_heart_rate: row.get(3)?,
            before_systolic: row.get(4)?,
            before_diastolic: row.get(5)?,
            after_spo2: row.get(6)?,
            after_heart_rate: row.get(7)?,
            after_systolic: row.get(8)?,
            after_diastolic: row.get(9)?,
            exercise_details: row.get(10)?,
            notes: row.get(11)?,
            measured_at: row.get(12)?,
            created_at: row.get(13)?,
            updated_at: row.get(14)?,
        })
    }

    /// Insert a daily measurement
    pub fn insert_daily(conn: &Connection, record: &DailyMeasurementRecord) -> Result<(), RepositoryError> {
        debug!("Storing daily measurement in database: id={}", record.id);

        conn.execute(
            "INSERT INTO daily_measurements
             (id, user_id, spo2, heart_rate, systolic, diastolic, notes, measured_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                record.id,
                record.user_id,
                record.spo2,
                record.heart_rate,
                record.systolic,
                record.diastolic,
                record.notes,
                record.measured_at,
                record.created_at,
                record.updated_at,
            ],
        )?;

        Ok(())
    }

    /// Fetch a daily measurement by id
    pub fn get_daily(conn: &Connection, id: &str) -> Result<Option<DailyMeasurementRecord>, RepositoryError> {
        let sql = format!("SELECT {} FROM daily_measurements WHERE id = ?1", DAILY_COLUMNS);
        let record = conn
            .query_row(&sql, params![id], Self::daily_from_row)
            .optional()?;
        Ok(record)
    }

    /// All daily measurements of a user, newest first
    pub fn list_daily(conn: &Connection, user_id: &str) -> Result<Vec<DailyMeasurementRecord>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM daily_measurements WHERE user_id = ?1 ORDER BY measured_at DESC",
            DAILY_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id], Self::daily_from_row)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// Daily measurements of a user with `start <= measured_at <= end`, oldest first
    pub fn list_daily_between(
        conn: &Connection,
        user_id: &str,
        start: i64,
        end: i64,
    ) -> Result<Vec<DailyMeasurementRecord>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM daily_measurements
             WHERE user_id = ?1 AND measured_at >= ?2 AND measured_at <= ?3
             ORDER BY measured_at ASC",
            DAILY_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id, start, end], Self::daily_from_row)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// Overwrite a daily measurement; returns false if no row matched
    pub fn update_daily(conn: &Connection, record: &DailyMeasurementRecord) -> Result<bool, RepositoryError> {
        debug!("Updating daily measurement in database: id={}", record.id);

        let changed = conn.execute(
            "UPDATE daily_measurements
             SET spo2 = ?2, heart_rate = ?3, systolic = ?4, diastolic = ?5, notes = ?6,
                 measured_at = ?7, updated_at = ?8
             WHERE id = ?1",
            params![
                record.id,
                record.spo2,
                record.heart_rate,
                record.systolic,
                record.diastolic,
                record.notes,
                record.measured_at,
                record.updated_at,
            ],
        )?;

        Ok(changed > 0)
    }

    /// Delete a daily measurement; returns false if no row matched
    pub fn delete_daily(conn: &Connection, id: &str) -> Result<bool, RepositoryError> {
        let changed = conn.execute("DELETE FROM daily_measurements WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// Insert an exercise measurement
    pub fn insert_exercise(conn: &Connection, record: &ExerciseMeasurementRecord) -> Result<(), RepositoryError> {
        debug!("Storing exercise measurement in database: id={}", record.id);

        conn.execute(
            "INSERT INTO exercise_measurements
             (id, user_id, before_spo2, before_heart_rate, before_systolic, before_diastolic,
              after_spo2, after_heart_rate, after_systolic, after_diastolic,
              exercise_details, notes, measured_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                record.id,
                record.user_id,
                record.before_spo2,
                record.before_heart_rate,
                record.before_systolic,
                record.before_diastolic,
                record.after_spo2,
                record.after_heart_rate,
                record.after_systolic,
                record.after_diastolic,
                record.exercise_details,
                record.notes,
                record.measured_at,
                record.created_at,
                record.updated_at,
            ],
        )?;

        Ok(())
    }

    /// Fetch an exercise measurement by id
    pub fn get_exercise(conn: &Connection, id: &str) -> Result<Option<ExerciseMeasurementRecord>, RepositoryError> {
        let sql = format!("SELECT {} FROM exercise_measurements WHERE id = ?1", EXERCISE_COLUMNS);
        let record = conn
            .query_row(&sql, params![id], Self::exercise_from_row)
            .optional()?;
        Ok(record)
    }

    /// All exercise measurements of a user, newest first
    pub fn list_exercise(conn: &Connection, user_id: &str) -> Result<Vec<ExerciseMeasurementRecord>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM exercise_measurements WHERE user_id = ?1 ORDER BY measured_at DESC",
            EXERCISE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id], Self::exercise_from_row)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// Delete an exercise measurement; returns false if no row matched
    pub fn delete_exercise(conn: &Connection, id: &str) -> Result<bool, RepositoryError> {
        let changed = conn.execute("DELETE FROM exercise_measurements WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// Fetch the settings row of a user
    pub fn get_settings(conn: &Connection, user_id: &str) -> Result<Option<UserSettingsRecord>, RepositoryError> {
        let record = conn
            .query_row(
                "SELECT user_id, birth_year, gender, display_name, reminders_enabled, updated_at
                 FROM user_settings WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(UserSettingsRecord {
                        user_id: row.get(0)?,
                        birth_year: row.get(1)?,
                        gender: row.get(2)?,
                        display_name: row.get(3)?,
                        reminders_enabled: row.get::<_, i64>(4)? != 0,
                        updated_at: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    /// Insert or replace the settings row of a user
    pub fn upsert_settings(conn: &Connection, record: &UserSettingsRecord) -> Result<(), RepositoryError> {
        debug!("Upserting settings for user: {}", record.user_id);

        conn.execute(
            "INSERT INTO user_settings (user_id, birth_year, gender, display_name, reminders_enabled, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(user_id) DO UPDATE SET
                birth_year = excluded.birth_year,
                gender = excluded.gender,
                display_name = excluded.display_name,
                reminders_enabled = excluded.reminders_enabled,
                updated_at = excluded.updated_at",
            params![
                record.user_id,
                record.birth_year,
                record.gender,
                record.display_name,
                record.reminders_enabled as i64,
                record.updated_at,
            ],
        )?;

        Ok(())
    }
}
