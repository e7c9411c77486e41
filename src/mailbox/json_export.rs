use super::{Mailbox, SearchQuery, Thread};
use anyhow::Context;
use std::path::Path;

/// Mailbox backed by a JSON export: an array of threads, each with its
/// messages oldest first.
#[derive(Debug, Clone, Default)]
pub struct JsonMailbox {
    threads: Vec<Thread>,
}

impl JsonMailbox {
    pub fn new(threads: Vec<Thread>) -> Self {
        let mut threads = threads;
        for thread in &mut threads {
            thread.messages.sort_by_key(|m| m.date);
        }
        Self { threads }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read mailbox export: {}", path.display()))?;
        let threads: Vec<Thread> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid mailbox export: {}", path.display()))?;
        log::debug!("Loaded {} threads from {}", threads.len(), path.display());
        Ok(Self::new(threads))
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }
}

impl Mailbox for JsonMailbox {
    fn search(&self, query: &str) -> anyhow::Result<Vec<Thread>> {
        let query = SearchQuery::parse(query)?;
        Ok(self
            .threads
            .iter()
            .filter(|t| query.matches(t))
            .cloned()
            .collect())
    }

    fn thread(&self, id: &str) -> anyhow::Result<Thread> {
        self.threads
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Thread not found: {}", id))
    }
}
