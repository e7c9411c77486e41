use crate::classifier::StatusClassifier;
use crate::config::Config;
use crate::extractors::{extract_company, extract_job_title};
use crate::mailbox::{Mailbox, SearchQuery, Thread};
use crate::scheduler::Scheduler;
use crate::status::{is_advance, StatusLabel};
use crate::store::{ApplicationRecord, Store};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

const READ_LOG_FAILED: &str = "Failed to read application log";

/// In-memory view of the store for one run, keyed by thread id.
#[derive(Debug, Default)]
pub struct RecordIndex {
    records: Vec<ApplicationRecord>,
    by_thread: HashMap<String, usize>,
}

impl RecordIndex {
    pub fn from_records(records: Vec<ApplicationRecord>) -> Self {
        let mut index = Self::default();
        for record in records {
            if index.contains(&record.thread_id) {
                log::warn!(
                    "Duplicate thread id in store, ignoring: {}",
                    record.thread_id
                );
                continue;
            }
            index.insert(record);
        }
        index
    }

    pub fn contains(&self, thread_id: &str) -> bool {
        self.by_thread.contains_key(thread_id)
    }

    pub fn get(&self, thread_id: &str) -> Option<&ApplicationRecord> {
        self.by_thread.get(thread_id).map(|&i| &self.records[i])
    }

    fn get_mut(&mut self, thread_id: &str) -> Option<&mut ApplicationRecord> {
        match self.by_thread.get(thread_id) {
            Some(&i) => self.records.get_mut(i),
            None => None,
        }
    }

    pub fn insert(&mut self, record: ApplicationRecord) {
        self.by_thread.insert(record.thread_id.clone(), self.records.len());
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ApplicationRecord] {
        &self.records
    }
}

/// Counters reported at the end of a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Threads returned by the discovery search
    pub scanned_threads: usize,
    pub created: usize,
    /// New threads that did not classify as application mail
    pub skipped: usize,
    pub updated: usize,
    pub fetch_failures: usize,
    /// Rows in the log once the run finished
    pub tracked: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scan complete: {} new, {} updated, {} skipped, {} tracked",
            self.created, self.updated, self.skipped, self.tracked
        )?;
        if self.fetch_failures > 0 {
            write!(f, " ({} thread fetches failed)", self.fetch_failures)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetSummary {
    pub rows_removed: usize,
    pub triggers_removed: usize,
}

/// Keeps the application log in sync with the mailbox.
pub struct Tracker<'a, M: Mailbox, S: Store> {
    config: &'a Config,
    classifier: StatusClassifier,
    mailbox: &'a M,
    store: &'a mut S,
}

impl<'a, M: Mailbox, S: Store> Tracker<'a, M, S> {
    pub fn new(config: &'a Config, mailbox: &'a M, store: &'a mut S) -> Self {
        Self {
            config,
            classifier: StatusClassifier::new(&config.rules),
            mailbox,
            store,
        }
    }

    /// Discovery followed by reconciliation. Search and store failures abort
    /// the run; a thread that cannot be re-fetched is skipped.
    pub fn run_scan(&mut self, now: DateTime<Utc>) -> Result<RunSummary> {
        let records = self.store.read_all().context(READ_LOG_FAILED)?;
        let mut index = RecordIndex::from_records(records);
        let mut summary = RunSummary::default();

        self.discover(&mut index, now, &mut summary)?;
        self.reconcile(&mut index, now, &mut summary)?;

        summary.tracked = index.len();
        log::info!("{}", summary);
        Ok(summary)
    }

    fn discover(
        &mut self,
        index: &mut RecordIndex,
        now: DateTime<Utc>,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let config = self.config;
        let query = SearchQuery::new(&config.search_subjects, config.lookback_days, now)
            .context("Failed to build mailbox search")?
            .render();
        log::debug!("Searching mailbox: {}", query);

        let threads = self
            .mailbox
            .search(&query)
            .context("Mailbox search failed")?;
        summary.scanned_threads = threads.len();

        for thread in &threads {
            if index.contains(&thread.id) {
                continue;
            }
            match self.record_for_new_thread(thread, now) {
                Some(record) => {
                    self.store.append(&record)?;
                    self.store.set_row_color(&record.thread_id, record.status.row_color())?;
                    log::info!(
                        "Tracking new application: {} / '{}' ({})",
                        record.company,
                        record.job_title,
                        record.status
                    );
                    index.insert(record);
                    summary.created += 1;
                }
                None => {
                    log::debug!("Skipping thread {}: not application mail", thread.id);
                    summary.skipped += 1;
                }
            }
        }
        Ok(())
    }

    /// Build a record from the first message of a thread, if it classifies.
    pub fn record_for_new_thread(
        &self,
        thread: &Thread,
        now: DateTime<Utc>,
    ) -> Option<ApplicationRecord> {
        let message = thread.first_message()?;
        let status = self
            .classifier
            .classify(&message.subject, &message.plain_body)?;

        Some(ApplicationRecord {
            company: extract_company(
                &message.subject,
                &message.from,
                &self.config.generic_domain_tokens,
            ),
            job_title: extract_job_title(&message.subject, &message.plain_body),
            date_applied: message.date.date_naive(),
            status,
            thread_id: thread.id.clone(),
            last_updated: now,
        })
    }

    fn reconcile(
        &mut self,
        index: &mut RecordIndex,
        now: DateTime<Utc>,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let open: Vec<(String, StatusLabel)> = index
            .records()
            .iter()
            .filter(|r| !r.status.is_terminal())
            .map(|r| (r.thread_id.clone(), r.status))
            .collect();

        for (thread_id, current) in open {
            let thread = match self.mailbox.thread(&thread_id) {
                Ok(thread) => thread,
                Err(e) => {
                    log::warn!("Failed to fetch thread {}: {:#}", thread_id, e);
                    summary.fetch_failures += 1;
                    continue;
                }
            };

            let best = match self.classifier.best_status(&thread.messages) {
                Some(best) => best,
                None => continue,
            };
            if !is_advance(best, current) {
                continue;
            }

            self.store.update_status(&thread_id, best, now)?;
            self.store.set_row_color(&thread_id, best.row_color())?;
            if let Some(record) = index.get_mut(&thread_id) {
                record.status = best;
                record.last_updated = now;
                log::info!("{}: {} -> {}", record.company, current, best);
            }
            summary.updated += 1;
        }
        Ok(())
    }

    /// Reapply the status colour to every row. Safe to repeat.
    pub fn recolor_all_rows(&mut self) -> Result<usize> {
        recolor_all_rows(&mut *self.store)
    }
}

pub fn recolor_all_rows<S: Store + ?Sized>(store: &mut S) -> Result<usize> {
    let records = store.read_all().context(READ_LOG_FAILED)?;
    for record in &records {
        store.set_row_color(&record.thread_id, record.status.row_color())?;
    }
    log::info!("Recolored {} rows", records.len());
    Ok(records.len())
}

/// Number of tracked applications per status; every status is present.
pub fn status_counts<S: Store + ?Sized>(store: &S) -> Result<BTreeMap<StatusLabel, usize>> {
    let mut counts = BTreeMap::new();
    for status in StatusLabel::ALL {
        counts.insert(status, 0);
    }
    for record in store.read_all().context(READ_LOG_FAILED)? {
        *counts.entry(record.status).or_insert(0) += 1;
    }
    Ok(counts)
}

/// Delete every tracked record, then every scheduled trigger. Irreversible;
/// callers must obtain confirmation first. Triggers are left in place when
/// the store cannot be cleared.
pub fn full_reset<S: Store + ?Sized, T: Scheduler + ?Sized>(
    store: &mut S,
    scheduler: &mut T,
) -> Result<ResetSummary> {
    let rows_removed = store.clear().context("Failed to clear application log")?;
    let triggers_removed = scheduler.clear().context("Failed to clear schedule")?;
    log::warn!(
        "Full reset: removed {} rows and {} triggers",
        rows_removed,
        triggers_removed
    );
    Ok(ResetSummary {
        rows_removed,
        triggers_removed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailbox::{JsonMailbox, Message};
    use crate::scheduler::{enable_auto_scan, FileScheduler};
    use crate::status::RowColor;
    use crate::store::SqliteStore;
    use chrono::TimeZone;

    /// Store that refuses to be cleared.
    struct LockedStore(SqliteStore);

    impl Store for LockedStore {
        fn read_all(&self) -> Result<Vec<ApplicationRecord>> {
            self.0.read_all()
        }

        fn append(&mut self, record: &ApplicationRecord) -> Result<()> {
            self.0.append(record)
        }

        fn update_status(
            &mut self,
            thread_id: &str,
            status: StatusLabel,
            last_updated: DateTime<Utc>,
        ) -> Result<()> {
            self.0.update_status(thread_id, status, last_updated)
        }

        fn set_row_color(&mut self, thread_id: &str, color: RowColor) -> Result<()> {
            self.0.set_row_color(thread_id, color)
        }

        fn row_color(&self, thread_id: &str) -> Result<Option<RowColor>> {
            self.0.row_color(thread_id)
        }

        fn clear(&mut self) -> Result<usize> {
            anyhow::bail!("application log is locked")
        }
    }

    fn applied(thread_id: &str) -> ApplicationRecord {
        ApplicationRecord {
            company: "Acme".to_string(),
            job_title: String::new(),
            date_applied: now().date_naive(),
            status: StatusLabel::Applied,
            thread_id: thread_id.to_string(),
            last_updated: now(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap()
    }

    fn message(subject: &str, body: &str, day: u32) -> Message {
        Message {
            subject: subject.to_string(),
            plain_body: body.to_string(),
            from: "Acme Careers <careers@acme.com>".to_string(),
            date: Utc.with_ymd_and_hms(2026, 10, day, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_record_index_dedups() {
        let record = applied("t1");
        let index = RecordIndex::from_records(vec![record.clone(), record]);
        assert_eq!(index.len(), 1);
        assert!(index.contains("t1"));
        assert!(index.get("t2").is_none());
    }

    #[test]
    fn test_new_thread_record_uses_first_message() {
        let config = Config::default();
        let mailbox = JsonMailbox::default();
        let mut store = SqliteStore::open_in_memory().unwrap();
        let tracker = Tracker::new(&config, &mailbox, &mut store);

        let thread = Thread {
            id: "t1".to_string(),
            messages: vec![
                message(
                    "Thank you for applying to Acme Corp!",
                    "We received your application for the Platform Engineer role.",
                    14,
                ),
                message("Offer", "We are pleased to offer you the job", 18),
            ],
        };
        let record = tracker.record_for_new_thread(&thread, now()).unwrap();
        assert_eq!(record.company, "Acme Corp");
        assert_eq!(record.job_title, "Platform Engineer");
        assert_eq!(record.status, StatusLabel::Applied);
        assert_eq!(
            record.date_applied,
            chrono::NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
        );
        assert_eq!(record.last_updated, now());

        let empty = Thread {
            id: "t2".to_string(),
            messages: vec![],
        };
        assert!(tracker.record_for_new_thread(&empty, now()).is_none());
    }

    #[test]
    fn test_run_summary_display() {
        let summary = RunSummary {
            scanned_threads: 4,
            created: 2,
            skipped: 1,
            updated: 1,
            fetch_failures: 0,
            tracked: 5,
        };
        assert_eq!(
            summary.to_string(),
            "Scan complete: 2 new, 1 updated, 1 skipped, 5 tracked"
        );
        let failed = RunSummary {
            fetch_failures: 2,
            ..summary
        };
        let text = failed.to_string();
        assert!(text.ends_with("(2 thread fetches failed)"));
    }

    #[test]
    fn test_full_reset_keeps_triggers_when_store_cannot_be_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let mut scheduler = FileScheduler::new(dir.path().join("schedule.yaml"));
        enable_auto_scan(&mut scheduler, 9).unwrap();

        let mut store = LockedStore(SqliteStore::open_in_memory().unwrap());
        store.append(&applied("t1")).unwrap();

        assert!(full_reset(&mut store, &mut scheduler).is_err());
        assert_eq!(scheduler.triggers().unwrap().len(), 1);
        assert_eq!(store.read_all().unwrap().len(), 1);
    }

    #[test]
    fn test_full_reset_removes_every_trigger() {
        let dir = tempfile::tempdir().unwrap();
        let mut scheduler = FileScheduler::new(dir.path().join("schedule.yaml"));
        scheduler.create_daily("export", 22).unwrap();
        enable_auto_scan(&mut scheduler, 9).unwrap();

        let mut store = SqliteStore::open_in_memory().unwrap();
        store.append(&applied("t1")).unwrap();
        store.append(&applied("t2")).unwrap();

        let summary = full_reset(&mut store, &mut scheduler).unwrap();
        assert_eq!(
            summary,
            ResetSummary {
                rows_removed: 2,
                triggers_removed: 2,
            }
        );
        assert!(scheduler.triggers().unwrap().is_empty());
        assert!(store.read_all().unwrap().is_empty());
    }
}
