pub mod json_export;
pub mod query;
pub mod rfc822;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use json_export::JsonMailbox;
pub use query::SearchQuery;
pub use rfc822::{parse_rfc822, ParsedEmail};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub subject: String,
    #[serde(default)]
    pub plain_body: String,
    pub from: String,
    pub date: DateTime<Utc>,
}

/// A conversation; messages are ordered oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub messages: Vec<Message>,
}

impl Thread {
    pub fn first_message(&self) -> Option<&Message> {
        self.messages.first()
    }
}

/// Query-based access to a mailbox.
pub trait Mailbox {
    /// Threads matching a search query such as the one built by
    /// [`SearchQuery::render`].
    fn search(&self, query: &str) -> anyhow::Result<Vec<Thread>>;

    /// Re-fetch a single thread with all of its messages.
    fn thread(&self, id: &str) -> anyhow::Result<Thread>;
}
