use crate::config::Config;
use crate::mailbox::JsonMailbox;
use crate::scheduler::{next_fire_after, FileScheduler, Scheduler, SCAN_HANDLER};
use crate::store::SqliteStore;
use crate::tracker::{RunSummary, Tracker};
use anyhow::{Context, Result};
use chrono::{Local, Utc};
use std::future::Future;

/// One scan against the mailbox export and store named in `config`.
pub fn run_configured_scan(config: &Config) -> Result<RunSummary> {
    let mailbox = JsonMailbox::load_from_file(&config.mailbox_path)?;
    let mut store = SqliteStore::open(&config.store_path)?;
    let mut tracker = Tracker::new(config, &mailbox, &mut store);
    tracker.run_scan(Utc::now())
}

/// Run scans at the registered daily hour until `shutdown` resolves or the
/// scan trigger is removed. A failed scan is logged and retried at the
/// next scheduled hour.
pub async fn run_daemon<F>(config: Config, shutdown: F) -> Result<()>
where
    F: Future<Output = std::io::Result<()>>,
{
    tokio::pin!(shutdown);

    loop {
        let scheduler = FileScheduler::new(&config.schedule_path);
        let trigger = match scheduler
            .triggers()?
            .into_iter()
            .find(|t| t.handler == SCAN_HANDLER)
        {
            Some(trigger) => trigger,
            None => {
                log::info!("No scan trigger registered, daemon exiting");
                return Ok(());
            }
        };

        let now = Local::now();
        let next = match next_fire_after(&now, trigger.hour) {
            Some(next) => next,
            None => anyhow::bail!("Cannot compute next run for hour {}", trigger.hour),
        };
        let wait = (next - now).to_std().unwrap_or_default();
        log::info!("Next scan at {}", next.format("%Y-%m-%d %H:%M %Z"));

        tokio::select! {
            _ = tokio::time::sleep(wait) => {
                let scan_config = config.clone();
                let result = tokio::task::spawn_blocking(move || run_configured_scan(&scan_config))
                    .await
                    .context("Scan task panicked")?;
                match result {
                    Ok(summary) => log::info!("Scheduled scan finished: {}", summary),
                    Err(e) => log::error!("Scheduled scan failed: {:#}", e),
                }
            }
            result = &mut shutdown => {
                result.context("Failed to listen for shutdown signal")?;
                log::info!("Received shutdown signal, stopping daemon");
                return Ok(());
            }
        }
    }
}
