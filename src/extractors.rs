use crate::domain_utils::DomainUtils;
use lazy_static::lazy_static;
use regex::Regex;

/// Returned when neither the subject nor the sender names a company
pub const UNKNOWN_COMPANY: &str = "Unknown";

/// Characters of body text considered when looking for a job title
pub const TITLE_BODY_PREFIX_CHARS: usize = 500;

/// Longer captures are almost always sentence fragments rather than titles
pub const MAX_TITLE_WORDS: usize = 8;

lazy_static! {
    // Each pattern captures the company in group 1 and stops at sentence
    // punctuation or a spaced dash ("Acme Corp - Software Engineer").
    static ref COMPANY_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)thanks?(?: you)? for applying (?:to|at|with) ([^!.,;?\n]+?)(?:\s+-\s|[!.,;?\n]|$)").unwrap(),
        Regex::new(r"(?i)your application (?:to|at|with) ([^!.,;?\n]+?)(?:\s+-\s|[!.,;?\n]|$)").unwrap(),
        Regex::new(r"(?i)^\s*([^!.,;?\n|:-]+?)\s*[-|:]\s*application (?:received|confirmation)").unwrap(),
        Regex::new(r"(?i)application (?:received|confirmation)\s*[-|:]\s*([^!.,;?\n]+?)(?:\s+-\s|[!.,;?\n]|$)").unwrap(),
        Regex::new(r"(?i)interview (?:invitation|request)\s*(?:[-|:]|from|with)\s*([^!.,;?\n]+?)(?:\s+-\s|[!.,;?\n]|$)").unwrap(),
    ];

    static ref REPLY_PREFIX: Regex = Regex::new(r"(?i)^\s*(?:(?:re|fwd?)\s*:\s*)+").unwrap();

    static ref LEGAL_SUFFIX: Regex =
        Regex::new(r"(?i)^,\s*(inc|llc|ltd|corp|co)\b\.?").unwrap();

    static ref TITLE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)applying for (?:the |a |an )?(.+?)(?:\s+(?:position|role|job|opening))?(?:\s+(?:at|with)\b|[.!,;:?(\n]|$)").unwrap(),
        Regex::new(r"(?i)application for (?:the |a |an )?(.+?)(?:\s+(?:position|role|job|opening))?(?:\s+(?:at|with)\b|[.!,;:?(\n]|$)").unwrap(),
        Regex::new(r"(?i)(?:position|role) of (?:the |a |an )?(.+?)(?:\s+(?:at|with)\b|[.!,;:?(\n]|$)").unwrap(),
        Regex::new(r"(?i)job title:\s*(.+?)(?:[.!,;?(\n]|$)").unwrap(),
        Regex::new(r"(?i)(?:position|role):\s*(.+?)(?:[.!,;?(\n]|$)").unwrap(),
    ];
}

/// Lowercase everything, then capitalise the first letter after the start,
/// whitespace, or a hyphen.
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut at_boundary = true;
    for c in text.to_lowercase().chars() {
        if at_boundary && c.is_alphabetic() {
            result.extend(c.to_uppercase());
        } else {
            result.push(c);
        }
        at_boundary = c.is_whitespace() || c == '-';
    }
    result
}

/// Company name from a subject line, falling back to the sender's domain.
pub fn extract_company(subject: &str, sender: &str, generic_tokens: &[String]) -> String {
    let stripped = REPLY_PREFIX.replace(subject, "");
    let subject: &str = &stripped;
    for pattern in COMPANY_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(subject) {
            if let Some(m) = caps.get(1) {
                let mut name = m.as_str().trim().to_string();
                if let Some(suffix) = LEGAL_SUFFIX.captures(&subject[m.end()..]) {
                    name = format!("{}, {}", name, &suffix[1]);
                }
                if !name.is_empty() {
                    return title_case(&name);
                }
            }
        }
    }

    DomainUtils::extract_domain(sender)
        .and_then(|domain| DomainUtils::organisation_label(&domain, generic_tokens))
        .map(|label| title_case(&label))
        .unwrap_or_else(|| UNKNOWN_COMPANY.to_string())
}

/// Job title following a phrasal cue in the subject or the start of the
/// body. Empty when nothing plausible is found.
pub fn extract_job_title(subject: &str, body: &str) -> String {
    let prefix: String = body.chars().take(TITLE_BODY_PREFIX_CHARS).collect();
    let text = format!("{} {}", subject, prefix);

    for pattern in TITLE_PATTERNS.iter() {
        for caps in pattern.captures_iter(&text) {
            let candidate = match caps.get(1) {
                Some(m) => m.as_str().trim(),
                None => continue,
            };
            let words = candidate.split_whitespace().count();
            if words == 0 || words > MAX_TITLE_WORDS {
                log::debug!("Rejected title '{}' ({} words)", candidate, words);
                continue;
            }
            return title_case(candidate);
        }
    }

    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> Vec<String> {
        crate::config::Config::default().generic_domain_tokens
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("ACME corp"), "Acme Corp");
        assert_eq!(
            title_case("senior back-end engineer"),
            "Senior Back-End Engineer"
        );
        assert_eq!(title_case("  "), "  ");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_company_from_thank_you_subject() {
        assert_eq!(
            extract_company(
                "Thank you for applying to Acme Corp!",
                "careers@acme.com",
                &tokens()
            ),
            "Acme Corp"
        );
        assert_eq!(
            extract_company("Thanks for applying at globex", "x@y.com", &tokens()),
            "Globex"
        );
    }

    #[test]
    fn test_company_keeps_legal_suffix() {
        assert_eq!(
            extract_company("Thank you for applying to Acme, Inc.", "x@y.io", &tokens()),
            "Acme, Inc"
        );
        assert_eq!(
            extract_company(
                "Thank you for applying to Acme, we will be in touch",
                "x@y.com",
                &tokens()
            ),
            "Acme"
        );
    }

    #[test]
    fn test_company_stops_at_spaced_dash() {
        assert_eq!(
            extract_company(
                "Thank you for applying to Acme Corp - Software Engineer",
                "x@y.com",
                &tokens()
            ),
            "Acme Corp"
        );
        assert_eq!(
            extract_company(
                "Your application to Coca-Cola - Data Analyst",
                "x@y.com",
                &tokens()
            ),
            "Coca-Cola"
        );
    }

    #[test]
    fn test_company_from_application_received_subjects() {
        assert_eq!(
            extract_company("Initech - Application Received", "x@y.com", &tokens()),
            "Initech"
        );
        assert_eq!(
            extract_company("Application confirmation: Hooli", "x@y.com", &tokens()),
            "Hooli"
        );
        assert_eq!(
            extract_company("Interview invitation - Acme Corp", "x@y.com", &tokens()),
            "Acme Corp"
        );
    }

    #[test]
    fn test_company_behind_reply_prefix() {
        assert_eq!(
            extract_company("Re: Acme - Application Received", "x@y.com", &tokens()),
            "Acme"
        );
        assert_eq!(
            extract_company("Re: Application received: Hooli", "x@y.com", &tokens()),
            "Hooli"
        );
        assert_eq!(
            extract_company(
                "FW: RE: Initech | Application Received",
                "x@y.com",
                &tokens()
            ),
            "Initech"
        );
    }

    #[test]
    fn test_company_domain_fallback() {
        assert_eq!(
            extract_company(
                "Update on your candidacy",
                "Talent <talent@mail.umbrella.com>",
                &tokens()
            ),
            "Umbrella"
        );
    }

    #[test]
    fn test_company_ats_domain_is_unknown() {
        assert_eq!(
            extract_company("We got it", "noreply@greenhouse.io", &tokens()),
            UNKNOWN_COMPANY
        );
        assert_eq!(
            extract_company("We got it", "noreply@hire.lever.co", &tokens()),
            UNKNOWN_COMPANY
        );
        assert_eq!(
            extract_company("We got it", "not an address", &tokens()),
            UNKNOWN_COMPANY
        );
    }

    #[test]
    fn test_job_title_cues() {
        assert_eq!(
            extract_job_title(
                "Thanks!",
                "Thank you for applying for the Senior Data Engineer position at Acme."
            ),
            "Senior Data Engineer"
        );
        assert_eq!(
            extract_job_title("Your application for Product Designer", ""),
            "Product Designer"
        );
        assert_eq!(
            extract_job_title(
                "Update",
                "We reviewed you for the position of site reliability engineer, and"
            ),
            "Site Reliability Engineer"
        );
        assert_eq!(
            extract_job_title(
                "Update",
                "Candidate: Jane\nJob Title: Backend Developer\nLocation: Remote"
            ),
            "Backend Developer"
        );
    }

    #[test]
    fn test_job_title_rejects_long_fragments() {
        let title = extract_job_title(
            "Hello",
            "Thank you for applying for this exciting opportunity to join our growing team of talented engineers in the cloud",
        );
        assert_eq!(title, "");
    }

    #[test]
    fn test_job_title_never_exceeds_word_limit() {
        let bodies = [
            "applying for a b c d e f g h i j k l m n o p",
            "applying for one two three four five six seven eight",
            "position: alpha beta gamma delta epsilon zeta eta theta iota kappa",
            "job title: x",
        ];
        for body in bodies {
            let title = extract_job_title("", body);
            assert!(
                title.split_whitespace().count() <= MAX_TITLE_WORDS,
                "{}",
                title
            );
        }
        assert_eq!(
            extract_job_title("", "applying for one two three four five six seven eight"),
            "One Two Three Four Five Six Seven Eight"
        );
    }

    #[test]
    fn test_job_title_only_reads_body_prefix() {
        let body = format!("{}applying for Staff Engineer.", "x".repeat(600));
        assert_eq!(extract_job_title("Hello", &body), "");
    }
}
