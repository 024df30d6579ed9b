use std::str::FromStr;

use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::config::DatabaseConfig;

mod schedule;
mod student;
mod teacher;

/// Handle to the record store. Cloning shares the underlying pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the database described by `config` and creates the tables if needed.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, String> {
        let options = match SqliteConnectOptions::from_str(&config.url) {
            Ok(o) => o.create_if_missing(true),
            Err(e) => return Err(format!("Invalid database url {}: {e}", config.url)),
        };

        let in_memory = config.url.contains(":memory:");
        if !in_memory {
            if let Some(dir) = options.get_filename().parent() {
                if !dir.as_os_str().is_empty() {
                    if let Err(e) = std::fs::create_dir_all(dir) {
                        return Err(format!("Could not create data directory {}: {e}", dir.display()));
                    }
                }
            }
        }

        // An in-memory database lives only as long as its connection
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(config.max_connections)
        };

        let pool = match pool_options.connect_with(options).await {
            Ok(p) => p,
            Err(e) => return Err(format!("Could not open database: {e}")),
        };

        let database = Self { pool };
        database.init().await?;
        Ok(database)
    }

    async fn init(&self) -> Result<(), String> {
        let mut transaction = match self.pool.begin().await {
            Ok(t) => t,
            Err(e) => return Err(format!("Could not begin schema transaction: {e}")),
        };

        if let Err(e) = sqlx::query(
            "CREATE TABLE IF NOT EXISTS teachers(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            grades TEXT NOT NULL,
            subjects TEXT NOT NULL,
            availability TEXT NOT NULL
        );",
        )
        .execute(&mut *transaction)
        .await
        {
            return Err(format!("Could not create table teachers: {e}"));
        }

        if let Err(e) = sqlx::query(
            "CREATE TABLE IF NOT EXISTS students(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            grade INTEGER NOT NULL,
            subject TEXT NOT NULL,
            course_type TEXT NOT NULL,
            preferred_teacher TEXT,
            availability TEXT NOT NULL
        );",
        )
        .execute(&mut *transaction)
        .await
        {
            return Err(format!("Could not create table students: {e}"));
        }

        // One record per name, grade, subject and course type
        if let Err(e) = sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS students_record
            ON students(name, grade, subject, course_type);",
        )
        .execute(&mut *transaction)
        .await
        {
            return Err(format!("Could not create index students_record: {e}"));
        }

        // Sessions of the last generated schedule, in generation order
        if let Err(e) = sqlx::query(
            "CREATE TABLE IF NOT EXISTS schedule_slots(
            position INTEGER PRIMARY KEY,
            time_slot TEXT NOT NULL,
            teacher TEXT NOT NULL,
            students TEXT NOT NULL,
            course_type TEXT NOT NULL,
            grade INTEGER NOT NULL,
            subject TEXT NOT NULL
        );",
        )
        .execute(&mut *transaction)
        .await
        {
            return Err(format!("Could not create table schedule_slots: {e}"));
        }

        if let Err(e) = transaction.commit().await {
            return Err(format!("Could not commit table-creation transaction: {e}"));
        }

        tracing::info!("Database initialized");
        Ok(())
    }

    /// Deletes every teacher, student and schedule session.
    pub async fn clear_all(&self) -> sqlx::Result<()> {
        let mut transaction = self.pool.begin().await?;
        sqlx::query("DELETE FROM schedule_slots;")
            .execute(&mut *transaction)
            .await?;
        sqlx::query("DELETE FROM students;")
            .execute(&mut *transaction)
            .await?;
        sqlx::query("DELETE FROM teachers;")
            .execute(&mut *transaction)
            .await?;
        transaction.commit().await
    }
}

// Set-valued columns hold JSON arrays

fn encode_json<T: Serialize>(value: &T) -> sqlx::Result<String> {
    serde_json::to_string(value).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

fn decode_json<T: DeserializeOwned>(column: &str) -> sqlx::Result<T> {
    serde_json::from_str(column).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

fn decode_value<T: FromStr<Err = String>>(column: &str) -> sqlx::Result<T> {
    column.parse().map_err(|e: String| sqlx::Error::Decode(e.into()))
}

fn decode_grade(column: i64) -> sqlx::Result<crate::model::Grade> {
    u8::try_from(column)
        .ok()
        .and_then(crate::model::Grade::new)
        .ok_or_else(|| sqlx::Error::Decode(format!("invalid grade {column}").into()))
}
