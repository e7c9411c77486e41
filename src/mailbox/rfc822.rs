/// Subject, sender and plain body of a single saved email.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedEmail {
    pub subject: String,
    pub from: String,
    pub body: String,
}

/// Split a raw RFC 822 message into the headers the classifier needs and
/// the body. Folded header lines are joined with a single space; header
/// names are case-insensitive.
pub fn parse_rfc822(content: &str) -> ParsedEmail {
    let mut email = ParsedEmail::default();
    let mut in_headers = true;
    let mut last_header_key: Option<String> = None;

    for line in content.lines() {
        if !in_headers {
            email.body.push_str(line);
            email.body.push('\n');
            continue;
        }

        if line.trim().is_empty() {
            in_headers = false;
            continue;
        }

        if line.starts_with(' ') || line.starts_with('\t') {
            // Folded header continuation
            let target = match last_header_key.as_deref() {
                Some("subject") => &mut email.subject,
                Some("from") => &mut email.from,
                _ => continue,
            };
            target.push(' ');
            target.push_str(line.trim());
            continue;
        }

        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim().to_lowercase();
            match key.as_str() {
                "subject" => email.subject = value.trim().to_string(),
                "from" => email.from = value.trim().to_string(),
                _ => {}
            }
            last_header_key = Some(key);
        }
    }

    email
}
