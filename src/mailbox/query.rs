use super::Thread;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SUBJECT_TERM: Regex = Regex::new(r#"subject:"([^"]*)""#).unwrap();
    static ref AFTER_DATE: Regex = Regex::new(r"after:(\d{4}/\d{1,2}/\d{1,2})").unwrap();
}

const DATE_FORMAT: &str = "%Y/%m/%d";

/// Confirmation-style mailbox search: any subject clause, restricted to
/// messages on or after a date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub subjects: Vec<String>,
    pub after: NaiveDate,
}

impl SearchQuery {
    pub fn new(subjects: &[String], lookback_days: u32, now: DateTime<Utc>) -> Result<Self> {
        let window = Duration::days(i64::from(lookback_days));
        let after = match now.date_naive().checked_sub_signed(window) {
            Some(after) => after,
            None => anyhow::bail!("Lookback of {} days is out of range", lookback_days),
        };
        Ok(Self {
            subjects: subjects.to_vec(),
            after,
        })
    }

    /// `(subject:"a" OR subject:"b") after:YYYY/MM/DD`
    pub fn render(&self) -> String {
        let clauses: Vec<String> = self
            .subjects
            .iter()
            .map(|s| format!("subject:\"{}\"", s))
            .collect();
        format!(
            "({}) after:{}",
            clauses.join(" OR "),
            self.after.format(DATE_FORMAT)
        )
    }

    pub fn parse(query: &str) -> Result<Self> {
        let subjects: Vec<String> = SUBJECT_TERM
            .captures_iter(query)
            .map(|c| c[1].to_string())
            .collect();
        if subjects.is_empty() {
            anyhow::bail!("Query has no subject clauses: {}", query);
        }

        let date = AFTER_DATE
            .captures(query)
            .map(|c| c[1].to_string())
            .ok_or_else(|| anyhow::anyhow!("Query has no after: date: {}", query))?;
        let after = NaiveDate::parse_from_str(&date, DATE_FORMAT)
            .with_context(|| format!("Invalid after: date '{}'", date))?;

        Ok(Self { subjects, after })
    }

    pub fn matches(&self, thread: &Thread) -> bool {
        thread.messages.iter().any(|message| {
            if message.date.date_naive() < self.after {
                return false;
            }
            let subject = message.subject.to_lowercase();
            self.subjects
                .iter()
                .any(|term| subject.contains(&term.to_lowercase()))
        })
    }
}
