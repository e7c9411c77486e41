pub mod classifier;
pub mod config;
pub mod domain_utils;
pub mod extractors;
pub mod mailbox;
pub mod runner;
pub mod scheduler;
pub mod status;
pub mod store;
pub mod tracker;


pub use classifier::{Classification, StatusClassifier};
pub use config::{ClassificationRule, Config};
pub use mailbox::{JsonMailbox, Mailbox, Message, Thread};
pub use status::{is_advance, RowColor, StatusLabel};
pub use store::{ApplicationRecord, SqliteStore, Store};
pub use tracker::{RunSummary, Tracker};
