//! SQLite-based session log and reward index.
//!
//! Provides persistent storage for:
//! - Completed focus sessions with the tip shown at the end
//! - Reward assets earned per session (paths only; bytes live on disk)

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::data_dir;
use crate::error::{DatabaseError, Result};
use crate::rewards::RewardRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusSessionRecord {
    pub id: String,
    pub user_id: String,
    pub minutes: u32,
    pub tip_text: String,
    pub created_at: DateTime<Utc>,
}

/// SQLite database for sessions and rewards.
///
/// The connection sits behind a mutex so one handle can be shared by
/// request handlers.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open the database at `~/.config/focusbuddy/focusbuddy.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("focusbuddy.db"))
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| DatabaseError::Poisoned.into())
    }

    #[cfg(test)]
    pub(crate) fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn()?.execute_batch(sql)?;
        Ok(())
    }

    fn migrate(&self) -> Result<()> {
        self.conn()?.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL,
                minutes     INTEGER NOT NULL,
                tip_text    TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS rewards (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id     TEXT NOT NULL,
                session_id  TEXT NOT NULL,
                asset_path  TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id, created_at);
            CREATE INDEX IF NOT EXISTS idx_rewards_user ON rewards(user_id, created_at);",
        )?;
        Ok(())
    }

    /// Log a finished focus session and return its new id.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_session(&self, user_id: &str, minutes: u32, tip_text: &str) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.conn()?.execute(
            "INSERT INTO sessions (id, user_id, minutes, tip_text, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, user_id, minutes, tip_text, Utc::now().to_rfc3339()],
        )?;
        Ok(id)
    }

    /// Newest first.
    pub fn list_sessions(&self, user_id: &str) -> Result<Vec<FocusSessionRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, minutes, tip_text, created_at
             FROM sessions
             WHERE user_id = ?1
             ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, user_id, minutes, tip_text, created_at) = row?;
            out.push(FocusSessionRecord {
                id,
                user_id,
                minutes,
                tip_text,
                created_at: parse_timestamp(&created_at)?,
            });
        }
        Ok(out)
    }

    pub fn insert_reward(
        &self,
        user_id: &str,
        session_id: &str,
        asset_path: &str,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        self.conn()?.execute(
            "INSERT INTO rewards (user_id, session_id, asset_path, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![user_id, session_id, asset_path, created_at.to_rfc3339()],
        )?;
        Ok(())
    }

    /// Rewards for `user_id` in the order they were earned.
    pub fn list_rewards(&self, user_id: &str) -> Result<Vec<RewardRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT asset_path, created_at
             FROM rewards
             WHERE user_id = ?1
             ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (asset_path, created_at) = row?;
            out.push(RewardRecord {
                asset_path,
                created_at: parse_timestamp(&created_at)?,
            });
        }
        Ok(out)
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::QueryFailed(format!("bad timestamp '{raw}': {e}")).into())
}
