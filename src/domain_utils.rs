/// Sender address and domain helpers
pub struct DomainUtils;

/// Second-level labels that sit in front of a country-code TLD (acme.co.uk)
const SECOND_LEVEL_LABELS: &[&str] = &["co", "com", "org", "net", "ac", "gov"];

impl DomainUtils {
    /// Extract the bare address from `Name <user@host>` or `user@host`
    pub fn extract_email(sender: &str) -> Option<String> {
        let candidate = match (sender.rfind('<'), sender.rfind('>')) {
            (Some(start), Some(end)) if start < end => &sender[start + 1..end],
            _ => sender,
        };
        let candidate = candidate.trim().trim_matches(['"', '\'']);
        if candidate.contains('@') {
            Some(candidate.to_string())
        } else {
            None
        }
    }

    /// Extract domain from email address
    pub fn extract_domain(email: &str) -> Option<String> {
        let address = Self::extract_email(email)?;
        address
            .rsplit('@')
            .next()
            .map(|s| s.trim().trim_end_matches('.').to_lowercase())
            .filter(|s| !s.is_empty())
    }

    /// Labels of a domain with the public suffix removed
    ///
    /// - `careers.acme.com` -> `["careers", "acme"]`
    /// - `jobs.acme.co.uk` -> `["jobs", "acme"]`
    /// - `co.uk` -> `[]`
    pub fn registrable_labels(domain: &str) -> Vec<String> {
        let mut labels: Vec<String> = domain
            .to_lowercase()
            .split('.')
            .filter(|l| !l.is_empty())
            .map(|l| l.to_string())
            .collect();

        if labels.len() < 2 {
            return labels;
        }

        let tld = labels.pop().unwrap_or_default();
        let second_level = labels
            .last()
            .is_some_and(|last| SECOND_LEVEL_LABELS.contains(&last.as_str()));
        if tld.len() == 2 && second_level {
            labels.pop();
        }
        labels
    }

    /// The organisation label of a sender domain once generic tokens
    /// (mail, careers, ATS vendors...) are removed, if any remains
    pub fn organisation_label(domain: &str, generic_tokens: &[String]) -> Option<String> {
        Self::registrable_labels(domain)
            .into_iter()
            .filter(|label| !generic_tokens.iter().any(|t| t.eq_ignore_ascii_case(label)))
            .last()
    }
}
