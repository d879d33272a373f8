use std::collections::HashSet;
use std::sync::LazyLock;
use regex::Regex;

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?1[\s.-]?)?(?:\(\d{3}\)|\d{3})[\s.-]?\d{3}[\s.-]?\d{4}").unwrap()
});

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:https?://|www\.)[^\s<>"'`]+"#).unwrap()
});

const BLOCK_SEPARATOR: &str = "---";

/// Extract North American phone numbers, normalized to 10 digits and
/// deduplicated in order of first appearance.
pub fn extract_phone_numbers(text: &str) -> Vec<String> {
    let bytes = text.as_bytes();
    let mut seen = HashSet::new();
    let mut numbers = Vec::new();

    for m in PHONE_RE.find_iter(text) {
        // Reject matches that are a slice of a longer digit run.
        let before = m.start().checked_sub(1).map(|i| bytes[i]);
        let after = bytes.get(m.end()).copied();
        if before.is_some_and(|b| b.is_ascii_digit()) || after.is_some_and(|b| b.is_ascii_digit()) {
            continue;
        }

        let digits: String = m.as_str().chars().filter(|c| c.is_ascii_digit()).collect();
        let normalized = match digits.len() {
            10 => digits,
            11 if digits.starts_with('1') => digits[1..].to_string(),
            _ => continue,
        };
        if seen.insert(normalized.clone()) {
            numbers.push(normalized);
        }
    }
    numbers
}

/// Render a 10-digit number as `(555) 123-4567`.
pub fn format_phone_number(digits: &str) -> String {
    if digits.len() != 10 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return digits.to_string();
    }
    format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..])
}

/// Extract URLs, trimming trailing punctuation, deduplicated in order.
pub fn extract_urls(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    URL_RE.find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ':', ')', '!', '?', ']']).to_string())
        .filter(|u| u.len() > "www.".len())
        .filter(|u| seen.insert(u.to_lowercase()))
        .collect()
}

/// Host part of a URL, without scheme, port, path or a leading `www.`.
pub fn url_domain(url: &str) -> String {
    let after_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let host_port = after_scheme.split(['/', '?', '#']).next().unwrap_or(after_scheme);
    let host = host_port.rsplit_once('@').map(|(_, h)| h).unwrap_or(host_port);
    let host = host.split(':').next().unwrap_or(host).to_lowercase();
    host.strip_prefix("www.").map(str::to_string).unwrap_or(host)
}

/// Split pasted text into non-empty blocks separated by `---` lines.
pub fn split_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim() == BLOCK_SEPARATOR {
            push_block(&mut blocks, &current);
            current.clear();
        } else {
            current.push(line);
        }
    }
    push_block(&mut blocks, &current);
    blocks
}

fn push_block(blocks: &mut Vec<String>, lines: &[&str]) {
    let block = lines.join("\n").trim().to_string();
    if !block.is_empty() {
        blocks.push(block);
    }
}

/// An email pasted as raw text: a header section, a blank line, then the body.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEmail {
    pub sender: String,
    pub subject: String,
    pub reply_to: Option<String>,
    pub body: String,
}

pub fn parse_email(block: &str) -> ParsedEmail {
    let mut sender = None;
    let mut subject = None;
    let mut reply_to = None;
    let mut body_lines = Vec::new();
    let mut in_headers = true;

    for line in block.lines() {
        if in_headers {
            if line.trim().is_empty() {
                in_headers = false;
                continue;
            }
            if let Some((name, value)) = line.split_once(':') {
                let value = value.trim().to_string();
                match name.trim().to_lowercase().as_str() {
                    "from" => { sender = Some(value); continue; }
                    "subject" => { subject = Some(value); continue; }
                    "reply-to" => { reply_to = Some(value); continue; }
                    "to" | "date" | "cc" | "return-path" | "message-id" => continue,
                    _ => {}
                }
            }
            // First non-header line starts the body.
            in_headers = false;
        }
        body_lines.push(line);
    }

    ParsedEmail {
        sender: sender.unwrap_or_else(|| "unknown sender".to_string()),
        subject: subject.unwrap_or_else(|| "(no subject)".to_string()),
        reply_to,
        body: body_lines.join("\n").trim().to_string(),
    }
}

/// A news article pasted as text: headline first, optional `Source:` line.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedArticle {
    pub headline: String,
    pub source: Option<String>,
    pub body: String,
}

pub fn parse_article(block: &str) -> ParsedArticle {
    let mut lines = block.lines().map(str::trim).filter(|l| !l.is_empty());
    let headline = lines.next().unwrap_or_default().to_string();
    let mut source = None;
    let mut body = Vec::new();
    for line in lines {
        match line.strip_prefix("Source:").or_else(|| line.strip_prefix("source:")) {
            Some(s) if source.is_none() => source = Some(s.trim().to_string()),
            _ => body.push(line),
        }
    }
    ParsedArticle { headline, source, body: body.join("\n") }
}
