//! Database connection module for the Hapetus API
//!
//! The pool is created once at startup and handed to the repositories that
//! need it. There is no process-wide pool.

use std::env;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use thiserror::Error;
use tracing::{error, info, warn};

use super::migrations::run_sqlite_migrations;

/// Pooled SQLite connection
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Database error
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// SQLite error
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    /// SQLite connection pool error
    #[error("SQLite connection pool error: {0}")]
    SqlitePoolError(#[from] r2d2::Error),

    /// Migration error
    #[error("Database migration error: {0}")]
    MigrationError(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    ConfigError(String),
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file; `None` selects an in-memory database
    pub sqlite_path: Option<String>,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Connection checkout timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            sqlite_path: Some("./data/hapetus.db".to_string()),
            max_connections: 10,
            timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// Create a new database configuration from environment variables
    pub fn from_env() -> Result<Self, DatabaseError> {
        let defaults = Self::default();

        let sqlite_path = match env::var("DB_SQLITE_PATH") {
            Ok(path) if path == ":memory:" => None,
            Ok(path) => Some(path),
            Err(_) => defaults.sqlite_path,
        };

        let max_connections = parse_env("DB_MAX_CONNECTIONS", defaults.max_connections)?;
        let timeout_seconds = parse_env("DB_TIMEOUT_SECONDS", defaults.timeout_seconds)?;

        if max_connections == 0 {
            return Err(DatabaseError::ConfigError(
                "DB_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }

        info!(
            "Database configuration: path={:?}, max_connections={}, timeout={}s",
            sqlite_path, max_connections, timeout_seconds
        );

        Ok(Self {
            sqlite_path,
            max_connections,
            timeout_seconds,
        })
    }

    /// Configuration for a private in-memory database
    pub fn in_memory() -> Self {
        Self {
            sqlite_path: None,
            max_connections: 1,
            timeout_seconds: 5,
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, DatabaseError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| DatabaseError::ConfigError(format!("{} is not a valid number: {}", name, raw))),
        Err(_) => Ok(default),
    }
}

/// Shared SQLite connection pool
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: Arc<r2d2::Pool<SqliteConnectionManager>>,
    in_memory: bool,
}

impl DatabasePool {
    /// Open the pool described by `config` and run migrations.
    ///
    /// Falls back to an in-memory database when the file cannot be opened.
    pub fn initialize(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let pool = match &config.sqlite_path {
            Some(path) => Self::open_file(path, config)?,
            None => Self::open_in_memory(config)?,
        };

        pool.migrate()?;
        Ok(pool)
    }

    /// In-memory database with migrations applied
    pub fn in_memory() -> Result<Self, DatabaseError> {
        Self::initialize(&DatabaseConfig::in_memory())
    }

    fn open_file(path: &str, config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        info!("Initializing SQLite database at: {}", path);

        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                info!("Creating parent directory: {:?}", parent);
                if let Err(e) = fs::create_dir_all(parent) {
                    warn!("Failed to create directory: {}, falling back to in-memory database", e);
                    return Self::open_in_memory(config);
                }
            }
        }

        let manager = SqliteConnectionManager::file(path)
            .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE)
            .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

        match r2d2::Pool::builder()
            .max_size(config.max_connections)
            .connection_timeout(Duration::from_secs(config.timeout_seconds))
            .build(manager)
        {
            Ok(pool) => {
                info!("SQLite connection pool created successfully");
                Ok(Self {
                    pool: Arc::new(pool),
                    in_memory: false,
                })
            }
            Err(e) => {
                error!("Failed to create SQLite connection pool: {}", e);
                warn!("Falling back to in-memory SQLite database");
                Self::open_in_memory(config)
            }
        }
    }

    fn open_in_memory(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        info!("Initializing in-memory SQLite database");

        // Every in-memory connection is a separate database, so the pool holds exactly one
        // and never recycles it.
        let pool = r2d2::Pool::builder()
            .max_size(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connection_timeout(Duration::from_secs(config.timeout_seconds))
            .build(SqliteConnectionManager::memory())?;

        Ok(Self {
            pool: Arc::new(pool),
            in_memory: true,
        })
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        let conn = self.get()?;
        run_sqlite_migrations(&conn)
    }

    /// Check out a connection
    pub fn get(&self) -> Result<PooledConnection, DatabaseError> {
        Ok(self.pool.get()?)
    }

    /// Whether this pool is backed by an in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.in_memory
    }

    /// Human-readable description of the connection, used by health checks
    pub fn connection_info(&self) -> Result<String, DatabaseError> {
        let conn = self.get()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;

        let location = if self.in_memory {
            "SQLite in-memory database".to_string()
        } else {
            match conn.query_row("PRAGMA database_list", [], |row| row.get::<_, String>(2)) {
                Ok(path) => format!("SQLite database at {}", path),
                Err(_) => "SQLite database (path unknown)".to_string(),
            }
        };

        let state = self.pool.state();
        Ok(format!(
            "{} (connections: active={}, idle={})",
            location, state.connections, state.idle_connections
        ))
    }
}
