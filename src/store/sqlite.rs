use super::{ApplicationRecord, Store};
use crate::status::{RowColor, StatusLabel};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Application log kept in a single SQLite table. Row colour is stored
/// alongside each row as a hex string.
pub struct SqliteStore {
    conn: Connection,
}

type RawRow = (String, String, String, String, String, String);

impl SqliteStore {
    pub fn open(db_path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create store directory: {}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open application store: {db_path}"))?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS applications (
                row_id INTEGER PRIMARY KEY AUTOINCREMENT,
                company TEXT NOT NULL,
                job_title TEXT NOT NULL DEFAULT '',
                date_applied TEXT NOT NULL,
                status TEXT NOT NULL,
                thread_id TEXT NOT NULL UNIQUE,
                last_updated TEXT NOT NULL,
                row_color TEXT NOT NULL DEFAULT '#ffffff'
            )",
            [],
        )?;
        Ok(Self { conn })
    }

    fn parse_row(raw: RawRow) -> Result<ApplicationRecord> {
        let (company, job_title, applied, status, thread_id, updated) = raw;
        Ok(ApplicationRecord {
            date_applied: NaiveDate::parse_from_str(&applied, "%Y-%m-%d")
                .with_context(|| format!("Bad date_applied '{applied}' for {thread_id}"))?,
            status: status
                .parse::<StatusLabel>()
                .with_context(|| format!("Bad status for {thread_id}"))?,
            last_updated: DateTime::parse_from_rfc3339(&updated)
                .with_context(|| format!("Bad last_updated '{updated}' for {thread_id}"))?
                .with_timezone(&Utc),
            company,
            job_title,
            thread_id,
        })
    }
}

impl Store for SqliteStore {
    fn read_all(&self) -> Result<Vec<ApplicationRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT company, job_title, date_applied, status, thread_id, last_updated
             FROM applications ORDER BY row_id",
        )?;

        let raw_rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            })?
            .collect::<Result<Vec<RawRow>, _>>()?;

        raw_rows.into_iter().map(Self::parse_row).collect()
    }

    fn append(&mut self, record: &ApplicationRecord) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO applications
                 (company, job_title, date_applied, status, thread_id, last_updated)
                 VALUES (?, ?, ?, ?, ?, ?)",
                params![
                    record.company,
                    record.job_title,
                    record.date_applied.format("%Y-%m-%d").to_string(),
                    record.status.as_str(),
                    record.thread_id,
                    record.last_updated.to_rfc3339(),
                ],
            )
            .with_context(|| format!("Failed to append row for thread {}", record.thread_id))?;
        Ok(())
    }

    fn update_status(
        &mut self,
        thread_id: &str,
        status: StatusLabel,
        last_updated: DateTime<Utc>,
    ) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE applications SET status = ?, last_updated = ? WHERE thread_id = ?",
            params![status.as_str(), last_updated.to_rfc3339(), thread_id],
        )?;
        if changed == 0 {
            anyhow::bail!("No row for thread {}", thread_id);
        }
        Ok(())
    }

    fn set_row_color(&mut self, thread_id: &str, color: RowColor) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE applications SET row_color = ? WHERE thread_id = ?",
            params![color.hex(), thread_id],
        )?;
        if changed == 0 {
            anyhow::bail!("No row for thread {}", thread_id);
        }
        Ok(())
    }

    fn row_color(&self, thread_id: &str) -> Result<Option<RowColor>> {
        let hex: Option<String> = self
            .conn
            .query_row(
                "SELECT row_color FROM applications WHERE thread_id = ?",
                params![thread_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(hex.as_deref().and_then(RowColor::from_hex))
    }

    fn clear(&mut self) -> Result<usize> {
        let removed = self.conn.execute("DELETE FROM applications", [])?;
        Ok(removed)
    }
}
