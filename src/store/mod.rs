pub mod sqlite;

use crate::status::{RowColor, StatusLabel};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub use sqlite::SqliteStore;

/// Column layout of the application log.
pub const HEADER: [&str; 6] = [
    "Company",
    "Job Title",
    "Date Applied",
    "Status",
    "Thread ID",
    "Last Updated",
];

/// One tracked job application, keyed by its mailbox thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub company: String,
    pub job_title: String,
    pub date_applied: NaiveDate,
    pub status: StatusLabel,
    pub thread_id: String,
    pub last_updated: DateTime<Utc>,
}

impl ApplicationRecord {
    /// Cells in [`HEADER`] order.
    pub fn to_row(&self) -> [String; 6] {
        [
            self.company.clone(),
            self.job_title.clone(),
            self.date_applied.format("%Y-%m-%d").to_string(),
            self.status.to_string(),
            self.thread_id.clone(),
            self.last_updated.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        ]
    }
}

/// Row storage for the application log. `thread_id` is unique.
pub trait Store {
    /// All rows in insertion order.
    fn read_all(&self) -> anyhow::Result<Vec<ApplicationRecord>>;

    /// Append a row; fails if the thread is already tracked.
    fn append(&mut self, record: &ApplicationRecord) -> anyhow::Result<()>;

    fn update_status(
        &mut self,
        thread_id: &str,
        status: StatusLabel,
        last_updated: DateTime<Utc>,
    ) -> anyhow::Result<()>;

    fn set_row_color(&mut self, thread_id: &str, color: RowColor) -> anyhow::Result<()>;

    fn row_color(&self, thread_id: &str) -> anyhow::Result<Option<RowColor>>;

    /// Delete every row. Returns how many were removed.
    fn clear(&mut self) -> anyhow::Result<usize>;
}
