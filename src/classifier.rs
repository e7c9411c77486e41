use crate::config::ClassificationRule;
use crate::mailbox::Message;
use crate::status::StatusLabel;
use regex::{Regex, RegexBuilder};

/// A single compiled classification pattern.
#[derive(Debug, Clone)]
enum Matcher {
    Regex(Regex),
    /// Fallback for patterns that fail to compile; holds the lowercased pattern
    Substring(String),
}

impl Matcher {
    fn compile(pattern: &str) -> Self {
        match RegexBuilder::new(pattern).case_insensitive(true).build() {
            Ok(regex) => Matcher::Regex(regex),
            Err(e) => {
                log::warn!(
                    "Invalid classification pattern '{}', falling back to substring match: {}",
                    pattern,
                    e
                );
                Matcher::Substring(pattern.to_lowercase())
            }
        }
    }

    fn is_match(&self, text: &str) -> bool {
        match self {
            Matcher::Regex(regex) => regex.is_match(text),
            Matcher::Substring(needle) => text.contains(needle.as_str()),
        }
    }
}

struct RuleGroup {
    status: StatusLabel,
    patterns: Vec<(String, Matcher)>,
}

/// Outcome of a successful classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub status: StatusLabel,
    pub pattern: String,
}

/// Maps message text to a [`StatusLabel`] with first-match-wins rule groups.
pub struct StatusClassifier {
    groups: Vec<RuleGroup>,
}

impl StatusClassifier {
    /// Compile all rule groups. Groups are reordered into
    /// [`StatusLabel::EVALUATION_ORDER`]; several groups for the same status
    /// keep their configured order relative to each other.
    pub fn new(rules: &[ClassificationRule]) -> Self {
        let mut groups = Vec::new();
        for status in StatusLabel::EVALUATION_ORDER {
            for rule in rules.iter().filter(|r| r.status == status) {
                let patterns = rule
                    .patterns
                    .iter()
                    .map(|p| (p.clone(), Matcher::compile(p)))
                    .collect();
                groups.push(RuleGroup { status, patterns });
            }
        }
        Self { groups }
    }

    pub fn classify(&self, subject: &str, body: &str) -> Option<StatusLabel> {
        self.classify_with_evidence(subject, body).map(|c| c.status)
    }

    pub fn classify_with_evidence(&self, subject: &str, body: &str) -> Option<Classification> {
        let text = format!("{} {}", subject, body).to_lowercase();

        for group in &self.groups {
            for (pattern, matcher) in &group.patterns {
                if matcher.is_match(&text) {
                    log::debug!(
                        "Pattern '{}' classified message as {}",
                        pattern,
                        group.status
                    );
                    return Some(Classification {
                        status: group.status,
                        pattern: pattern.clone(),
                    });
                }
            }
        }

        None
    }

    /// Highest-priority classification across a thread; ties keep the
    /// earliest message.
    pub fn best_status(&self, messages: &[Message]) -> Option<StatusLabel> {
        let mut best: Option<StatusLabel> = None;
        for message in messages {
            if let Some(status) = self.classify(&message.subject, &message.plain_body) {
                match best {
                    Some(current) if status.priority() <= current.priority() => {}
                    _ => best = Some(status),
                }
            }
        }
        best
    }

    pub fn pattern_count(&self) -> usize {
        self.groups.iter().map(|g| g.patterns.len()).sum()
    }

    /// Patterns that could not be compiled and run as substring checks.
    pub fn degraded_patterns(&self) -> Vec<String> {
        self.groups
            .iter()
            .flat_map(|g| g.patterns.iter())
            .filter(|(_, m)| matches!(m, Matcher::Substring(_)))
            .map(|(p, _)| p.clone())
            .collect()
    }
}
