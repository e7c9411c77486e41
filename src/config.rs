use crate::status::StatusLabel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SQLite file holding the application log
    pub store_path: String,
    /// JSON mailbox export searched by the scan
    pub mailbox_path: String,
    /// YAML registry of scheduled triggers
    pub schedule_path: String,
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    #[serde(default = "default_schedule_hour")]
    pub schedule_hour: u32,
    pub search_subjects: Vec<String>,
    #[serde(default = "default_generic_domain_tokens")]
    pub generic_domain_tokens: Vec<String>,
    pub rules: Vec<ClassificationRule>,
}

/// One rule group: every pattern maps a message to `status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationRule {
    pub status: StatusLabel,
    pub patterns: Vec<String>,
}

/// Longest lookback window accepted by `validate`
pub const MAX_LOOKBACK_DAYS: u32 = 3650;

fn default_lookback_days() -> u32 {
    7
}

fn default_schedule_hour() -> u32 {
    9
}

fn default_generic_domain_tokens() -> Vec<String> {
    [
        "mail",
        "noreply",
        "no-reply",
        "careers",
        "jobs",
        "hr",
        "recruiting",
        "talent",
        "apply",
        "hire",
        "hiring",
        "notifications",
        // applicant tracking systems
        "greenhouse",
        "lever",
        "workday",
        "myworkday",
        "myworkdayjobs",
        "icims",
        "smartrecruiters",
        "jobvite",
        "taleo",
        "ashbyhq",
        "bamboohr",
        "workable",
        "breezy",
        "successfactors",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            store_path: "job-tracker.db".to_string(),
            mailbox_path: "mailbox.json".to_string(),
            schedule_path: "job-tracker-schedule.yaml".to_string(),
            lookback_days: default_lookback_days(),
            schedule_hour: default_schedule_hour(),
            search_subjects: strings(&[
                "thank you for applying",
                "thanks for applying",
                "application received",
                "application confirmation",
                "your application",
                "we received your application",
                "application submitted",
                "thank you for your interest",
            ]),
            generic_domain_tokens: default_generic_domain_tokens(),
            rules: vec![
                ClassificationRule {
                    status: StatusLabel::Offer,
                    patterns: strings(&[
                        "offer letter",
                        "pleased to offer",
                        "job offer",
                        "offer of employment",
                        r"extend (?:an|the) offer",
                        r"congratulations.{0,80}\boffer\b",
                    ]),
                },
                ClassificationRule {
                    status: StatusLabel::Interview,
                    patterns: strings(&[
                        r"\binterview",
                        "schedule a call",
                        "schedule a time",
                        "phone screen",
                        "your availability",
                        "coding challenge",
                        "technical assessment",
                        "calendly.com",
                    ]),
                },
                ClassificationRule {
                    status: StatusLabel::Rejected,
                    patterns: strings(&[
                        "unfortunately",
                        "not moving forward",
                        "regret to inform",
                        "other candidates",
                        "not been selected",
                        "will not be proceeding",
                        "decided to pursue",
                        "no longer under consideration",
                        "position has been filled",
                    ]),
                },
                ClassificationRule {
                    status: StatusLabel::Applied,
                    patterns: strings(&[
                        "thank you for applying",
                        "thanks for applying",
                        "application received",
                        "received your application",
                        "application has been received",
                        "application submitted",
                        "application confirmation",
                        "thank you for your interest",
                    ]),
                },
            ],
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(1..=MAX_LOOKBACK_DAYS).contains(&self.lookback_days) {
            anyhow::bail!(
                "lookback_days must be 1-{}, got {}",
                MAX_LOOKBACK_DAYS,
                self.lookback_days
            );
        }
        if self.schedule_hour > 23 {
            anyhow::bail!("schedule_hour must be 0-23, got {}", self.schedule_hour);
        }
        if self.search_subjects.is_empty() {
            anyhow::bail!("search_subjects must list at least one subject clause");
        }
        if let Some(bad) = self.search_subjects.iter().find(|s| s.contains('"')) {
            anyhow::bail!("search subject may not contain quotes: {}", bad);
        }
        if self.rules.is_empty() {
            anyhow::bail!("at least one classification rule group is required");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.search_subjects.len(), 8);
        assert_eq!(config.rules.len(), 4);
    }

    #[test]
    fn test_yaml_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let path = path.to_str().unwrap();

        let mut config = Config::default();
        config.lookback_days = 30;
        config.to_file(path).unwrap();

        let loaded = Config::from_file(path).unwrap();
        assert_eq!(loaded.lookback_days, 30);
        assert_eq!(loaded.rules[0].status, StatusLabel::Offer);
    }

    #[test]
    fn test_missing_optional_fields_use_defaults() {
        let yaml = r#"
store_path: a.db
mailbox_path: m.json
schedule_path: s.yaml
search_subjects: ["thank you for applying"]
rules:
  - status: Applied
    patterns: ["thank you for applying"]
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.lookback_days, 7);
        assert_eq!(config.schedule_hour, 9);
        let tokens = &config.generic_domain_tokens;
        assert!(tokens.contains(&"greenhouse".to_string()));
    }

    #[test]
    fn test_invalid_schedule_hour() {
        let config = Config {
            schedule_hour: 24,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_lookback_days_bounds() {
        for lookback_days in [0, MAX_LOOKBACK_DAYS + 1, 200_000_000] {
            let config = Config {
                lookback_days,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "{}", lookback_days);
        }
        let config = Config {
            lookback_days: MAX_LOOKBACK_DAYS,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
