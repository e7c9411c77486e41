use anyhow::{Context, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Handler name bound to the daily scan trigger.
pub const SCAN_HANDLER: &str = "run_scan";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    pub handler: String,
    /// Local hour of day (0-23) at which the trigger fires
    pub hour: u32,
    pub created_at: DateTime<Utc>,
}

/// Registry of once-daily triggers.
pub trait Scheduler {
    fn triggers(&self) -> Result<Vec<Trigger>>;

    fn create_daily(&mut self, handler: &str, hour: u32) -> Result<Trigger>;

    /// Remove every trigger bound to `handler`. Returns how many were removed.
    fn remove(&mut self, handler: &str) -> Result<usize>;

    /// Remove all triggers whatever their handler.
    fn clear(&mut self) -> Result<usize>;
}

/// Trigger registry persisted as a YAML file.
pub struct FileScheduler {
    path: PathBuf,
}

impl FileScheduler {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    fn save(&self, triggers: &[Trigger]) -> Result<()> {
        let content = serde_yaml::to_string(triggers)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write schedule: {}", self.path.display()))?;
        Ok(())
    }
}

impl Scheduler for FileScheduler {
    fn triggers(&self) -> Result<Vec<Trigger>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read schedule: {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let triggers = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid schedule file: {}", self.path.display()))?;
        Ok(triggers)
    }

    fn create_daily(&mut self, handler: &str, hour: u32) -> Result<Trigger> {
        if hour > 23 {
            anyhow::bail!("Trigger hour must be 0-23, got {}", hour);
        }
        let mut triggers = self.triggers()?;
        let trigger = Trigger {
            handler: handler.to_string(),
            hour,
            created_at: Utc::now(),
        };
        triggers.push(trigger.clone());
        self.save(&triggers)?;
        Ok(trigger)
    }

    fn remove(&mut self, handler: &str) -> Result<usize> {
        let mut triggers = self.triggers()?;
        let before = triggers.len();
        triggers.retain(|t| t.handler != handler);
        let removed = before - triggers.len();
        if removed > 0 {
            self.save(&triggers)?;
        }
        Ok(removed)
    }

    fn clear(&mut self) -> Result<usize> {
        let removed = self.triggers()?.len();
        if removed > 0 {
            self.save(&[])?;
        }
        Ok(removed)
    }
}

/// Register the daily scan. Any existing scan trigger is removed first so
/// repeated calls never leave duplicates behind.
pub fn enable_auto_scan<S: Scheduler + ?Sized>(scheduler: &mut S, hour: u32) -> Result<Trigger> {
    let removed = scheduler.remove(SCAN_HANDLER)?;
    if removed > 0 {
        log::debug!("Replaced {} existing scan trigger(s)", removed);
    }
    let trigger = scheduler.create_daily(SCAN_HANDLER, hour)?;
    log::info!("Daily scan scheduled at {:02}:00", hour);
    Ok(trigger)
}

pub fn disable_auto_scan<S: Scheduler + ?Sized>(scheduler: &mut S) -> Result<usize> {
    let removed = scheduler.remove(SCAN_HANDLER)?;
    log::info!("Removed {} scan trigger(s)", removed);
    Ok(removed)
}

/// The first `hour:00` strictly after `now`, in `now`'s timezone. Skips a
/// day whose `hour:00` does not exist locally (DST gap).
pub fn next_fire_after<Tz: TimeZone>(now: &DateTime<Tz>, hour: u32) -> Option<DateTime<Tz>> {
    let tz = now.timezone();
    let today = now.date_naive();
    for offset in 0..=2 {
        let naive = (today + Duration::days(offset)).and_hms_opt(hour, 0, 0)?;
        if let Some(candidate) = tz.from_local_datetime(&naive).earliest() {
            if candidate > *now {
                return Some(candidate);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler() -> (tempfile::TempDir, FileScheduler) {
        let dir = tempfile::tempdir().unwrap();
        let scheduler = FileScheduler::new(dir.path().join("schedule.yaml"));
        (dir, scheduler)
    }

    #[test]
    fn test_empty_registry() {
        let (_dir, scheduler) = scheduler();
        assert!(scheduler.triggers().unwrap().is_empty());
    }

    #[test]
    fn test_enable_is_idempotent() {
        let (_dir, mut scheduler) = scheduler();
        enable_auto_scan(&mut scheduler, 9).unwrap();
        enable_auto_scan(&mut scheduler, 10).unwrap();
        enable_auto_scan(&mut scheduler, 10).unwrap();

        let triggers = scheduler.triggers().unwrap();
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].handler, SCAN_HANDLER);
        assert_eq!(triggers[0].hour, 10);
    }

    #[test]
    fn test_disable_leaves_other_handlers() {
        let (_dir, mut scheduler) = scheduler();
        scheduler.create_daily("export", 22).unwrap();
        enable_auto_scan(&mut scheduler, 9).unwrap();

        assert_eq!(disable_auto_scan(&mut scheduler).unwrap(), 1);
        assert_eq!(disable_auto_scan(&mut scheduler).unwrap(), 0);

        let triggers = scheduler.triggers().unwrap();
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].handler, "export");
    }

    #[test]
    fn test_clear_removes_every_handler() {
        let (_dir, mut scheduler) = scheduler();
        scheduler.create_daily("export", 22).unwrap();
        enable_auto_scan(&mut scheduler, 9).unwrap();

        assert_eq!(scheduler.clear().unwrap(), 2);
        assert!(scheduler.triggers().unwrap().is_empty());
        assert_eq!(scheduler.clear().unwrap(), 0);
    }

    #[test]
    fn test_invalid_hour_rejected() {
        let (_dir, mut scheduler) = scheduler();
        assert!(enable_auto_scan(&mut scheduler, 24).is_err());
        assert!(scheduler.triggers().unwrap().is_empty());
    }

    #[test]
    fn test_next_fire_after() {
        let before = Utc.with_ymd_and_hms(2026, 10, 19, 7, 30, 0).unwrap();
        assert_eq!(
            next_fire_after(&before, 9),
            Some(Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap())
        );

        let exactly = Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap();
        assert_eq!(
            next_fire_after(&exactly, 9),
            Some(Utc.with_ymd_and_hms(2026, 10, 20, 9, 0, 0).unwrap())
        );

        let year_end = Utc.with_ymd_and_hms(2026, 12, 31, 23, 0, 0).unwrap();
        assert_eq!(
            next_fire_after(&year_end, 0),
            Some(Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(next_fire_after(&before, 25), None);
    }
}
